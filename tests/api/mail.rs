use reqwest::StatusCode;

use sqlx::PgPool;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{accepted_email, Credentials, Mail, MailContent, TestApp};

fn valid_mail() -> Mail {
    Mail {
        subject: Some("Maintenance".into()),
        content: Some(MailContent {
            text: Some("We will be down tonight".into()),
            html: Some("<p>We will be down tonight</p>".into()),
        }),
    }
}

#[sqlx::test]
async fn requests_without_credentials_are_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let res = app.send_mail(None, &valid_mail()).await.unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    assert_eq!(
        r#"Basic realm="admin""#,
        res.headers()["WWW-Authenticate"]
    );

    Ok(())
}

#[sqlx::test]
async fn requests_with_wrong_password_are_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let credentials = Credentials {
        username: app.admin.username.clone(),
        password: "not-the-password".into(),
    };
    let res = app.send_mail(Some(&credentials), &valid_mail()).await.unwrap();

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn mail_is_delivered_to_subscribers(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.subscribe(Some("a@x.com")).await.unwrap();
    app.subscribe(Some("b@x.com")).await.unwrap();

    Mock::given(path("/email"))
        .and(body_partial_json(serde_json::json!({
            "Subject": "Maintenance",
            "Bcc": "a@x.com,b@x.com"
        })))
        .respond_with(accepted_email())
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .send_mail(Some(&app.admin), &valid_mail())
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["recipients"], 2);

    Ok(())
}

#[sqlx::test]
async fn malformed_mail_is_rejected(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (
            "Missing Subject",
            Mail {
                subject: None,
                ..valid_mail()
            },
        ),
        (
            "Blank Subject",
            Mail {
                subject: Some("  ".into()),
                ..valid_mail()
            },
        ),
        (
            "Missing Content",
            Mail {
                content: None,
                ..valid_mail()
            },
        ),
        (
            "Missing Text Body",
            Mail {
                content: Some(MailContent {
                    text: None,
                    html: Some("<p>Body</p>".into()),
                }),
                ..valid_mail()
            },
        ),
    ];

    for (test_name, mail) in test_cases {
        let res = app
            .send_mail(Some(&app.admin), &mail)
            .await
            .expect("Failed to send request");

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "{}", test_name);
        let body: serde_json::Value = res.json().await.expect("Error body is not JSON");
        assert_eq!(body["error"], "validation", "{}", test_name);
    }

    Ok(())
}
