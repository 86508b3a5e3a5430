use reqwest::StatusCode;

use sqlx::PgPool;

use crate::helpers::TestApp;

#[sqlx::test]
async fn removing_latest_requires_credentials(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app.remove_latest_history(None).await.unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn removing_from_empty_history_returns_nothing(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app.remove_latest_history(Some(&app.admin)).await.unwrap();

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["removed"].is_null());

    Ok(())
}

#[sqlx::test]
async fn removed_game_is_announced_again(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_emails().await;
    app.subscribe(Some("a@x.com")).await.unwrap();
    app.serve_free_game("Alpha").await;

    app.check_game().await.unwrap();

    let res = app.latest_history().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["latest"]["title"], "Alpha");

    let res = app.remove_latest_history(Some(&app.admin)).await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["removed"]["title"], "Alpha");

    let res = app.check_game().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "notified");
    assert_eq!(app.sent_emails().await.len(), 2);

    Ok(())
}
