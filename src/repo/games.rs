use chrono::{DateTime, NaiveDate, Utc};

use sqlx::{PgPool, Postgres, Transaction};

use uuid::Uuid;

use crate::domain::{GameRecord, HistoryEntry};
use crate::error::Result;

/// Store for announced games: an append-only history plus a single current-game pointer
#[async_trait::async_trait]
pub trait GameHistoryStore: Send + Sync {
    /// The game announced most recently, if any
    async fn current(&self) -> Result<Option<GameRecord>>;

    /// Newest entry of the history log
    async fn find_latest(&self) -> Result<Option<HistoryEntry>>;

    /// Advance the current game to `game` only if it still equals `expected`,
    /// then append `game` to the history. Returns `false` if the swap lost.
    async fn compare_and_append(
        &self,
        expected: Option<&GameRecord>,
        game: &GameRecord,
    ) -> Result<bool>;

    /// Drop the newest history entry and roll the current game back to the one before it
    async fn remove_latest(&self) -> Result<Option<HistoryEntry>>;
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    recorded_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            game: GameRecord {
                title: row.title,
                start_date: row.start_date,
                end_date: row.end_date,
            },
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CurrentRow {
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl From<CurrentRow> for GameRecord {
    fn from(row: CurrentRow) -> Self {
        Self {
            title: row.title,
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

/// Postgres game history repository
#[derive(Debug, Clone)]
pub struct PgGameHistoryRepo {
    pool: PgPool,
}

impl PgGameHistoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn latest_entry(tx: &mut Transaction<'_, Postgres>) -> sqlx::Result<Option<HistoryRow>> {
        sqlx::query_as(
            "select id, title, start_date, end_date, recorded_at from game_history \
             order by recorded_at desc, id desc limit 1",
        )
        .fetch_optional(&mut **tx)
        .await
    }
}

#[async_trait::async_trait]
impl GameHistoryStore for PgGameHistoryRepo {
    #[tracing::instrument(name = "Fetch current game", skip(self))]
    async fn current(&self) -> Result<Option<GameRecord>> {
        let row: Option<CurrentRow> =
            sqlx::query_as("select title, start_date, end_date from current_game where id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(name = "Fetch latest history entry", skip(self))]
    async fn find_latest(&self) -> Result<Option<HistoryEntry>> {
        let mut tx = self.pool.begin().await?;
        let row = Self::latest_entry(&mut tx).await?;
        tx.commit().await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(name = "Compare and append game", skip(self))]
    async fn compare_and_append(
        &self,
        expected: Option<&GameRecord>,
        game: &GameRecord,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // The update holds the row lock, so a concurrent swap re-checks the title after commit
        let swapped = match expected {
            Some(expected) => sqlx::query(
                "update current_game set title=$1, start_date=$2, end_date=$3, updated_at=$4 \
                 where id = 1 and title = $5",
            )
            .bind(&game.title)
            .bind(game.start_date)
            .bind(game.end_date)
            .bind(now)
            .bind(&expected.title)
            .execute(&mut *tx)
            .await?,
            None => sqlx::query(
                "insert into current_game(id, title, start_date, end_date, updated_at) \
                 values (1, $1, $2, $3, $4) on conflict (id) do nothing",
            )
            .bind(&game.title)
            .bind(game.start_date)
            .bind(game.end_date)
            .bind(now)
            .execute(&mut *tx)
            .await?,
        }
        .rows_affected()
            == 1;

        if !swapped {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "insert into game_history(id, title, start_date, end_date, recorded_at) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(&game.title)
        .bind(game.start_date)
        .bind(game.end_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    #[tracing::instrument(name = "Remove latest history entry", skip(self))]
    async fn remove_latest(&self) -> Result<Option<HistoryEntry>> {
        let mut tx = self.pool.begin().await?;

        let Some(removed) = Self::latest_entry(&mut tx).await? else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("delete from game_history where id = $1")
            .bind(removed.id)
            .execute(&mut *tx)
            .await?;

        match Self::latest_entry(&mut tx).await? {
            Some(previous) => {
                sqlx::query(
                    "insert into current_game(id, title, start_date, end_date, updated_at) \
                     values (1, $1, $2, $3, $4) on conflict (id) do update set \
                     title = excluded.title, start_date = excluded.start_date, \
                     end_date = excluded.end_date, updated_at = excluded.updated_at",
                )
                .bind(&previous.title)
                .bind(previous.start_date)
                .bind(previous.end_date)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("delete from current_game")
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(removed.into()))
    }
}
