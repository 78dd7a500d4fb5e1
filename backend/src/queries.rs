use rocket::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;
use shared::models::*;

use crate::store::{ElectionStore, StoreError, SwapOutcome};

const SELECT_ELECTION: &str =
    "SELECT id, title, starts_at, ends_at, created_at, candidates, total_votes, voted_by, version
     FROM elections";

/// PostgreSQL-backed election store. Each election is a single row, so a
/// conditional `UPDATE ... WHERE version = $n` is the whole transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("database error: {e}"))
}

fn to_i64(value: u64, column: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Unavailable(format!("{column} out of range: {value}")))
}

fn to_u64(value: i64, column: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Unavailable(format!("{column} is negative: {value}")))
}

fn row_to_election(row: PgRow) -> Result<Election, StoreError> {
    let candidates: Json<Vec<Candidate>> = row.try_get("candidates").map_err(db_error)?;
    let total_votes: i64 = row.try_get("total_votes").map_err(db_error)?;
    let version: i64 = row.try_get("version").map_err(db_error)?;

    let record = ElectionRecord {
        id: row.try_get::<Uuid, _>("id").map_err(db_error)?,
        title: row.try_get("title").map_err(db_error)?,
        starts_at: row.try_get::<OffsetDateTime, _>("starts_at").map_err(db_error)?,
        ends_at: row.try_get::<OffsetDateTime, _>("ends_at").map_err(db_error)?,
        created_at: row.try_get::<OffsetDateTime, _>("created_at").map_err(db_error)?,
        candidates: candidates.0,
        total_votes: to_u64(total_votes, "total_votes")?,
        voted_by: row.try_get("voted_by").map_err(db_error)?,
        version: to_u64(version, "version")?,
    };
    Ok(Election::try_from(record)?)
}

#[async_trait]
impl ElectionStore for PgStore {
    async fn insert(&self, election: &Election) -> Result<(), StoreError> {
        let record = election.to_record();
        sqlx::query(
            "INSERT INTO elections
             (id, title, starts_at, ends_at, created_at, candidates, total_votes, voted_by, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(record.starts_at)
        .bind(record.ends_at)
        .bind(record.created_at)
        .bind(Json(&record.candidates))
        .bind(to_i64(record.total_votes, "total_votes")?)
        .bind(&record.voted_by)
        .bind(to_i64(record.version, "version")?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate { StoreError::DuplicateId(record.id) } else { db_error(e) }
        })?;
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Election>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_ELECTION} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(row_to_election).transpose()
    }

    async fn fetch_all(&self) -> Result<Vec<Election>, StoreError> {
        sqlx::query(&format!("{SELECT_ELECTION} ORDER BY created_at DESC, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(row_to_election)
            .collect()
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM elections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_swap(&self, election: &Election, expected_version: u64) -> Result<SwapOutcome, StoreError> {
        let record = election.to_record();
        let result = sqlx::query(
            "UPDATE elections
             SET candidates = $2, total_votes = $3, voted_by = $4, version = $5
             WHERE id = $1 AND version = $6",
        )
        .bind(record.id)
        .bind(Json(&record.candidates))
        .bind(to_i64(record.total_votes, "total_votes")?)
        .bind(&record.voted_by)
        .bind(to_i64(record.version, "version")?)
        .bind(to_i64(expected_version, "version")?)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 1 {
            return Ok(SwapOutcome::Swapped);
        }

        let exists = sqlx::query("SELECT 1 FROM elections WHERE id = $1")
            .bind(record.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .is_some();
        Ok(if exists { SwapOutcome::Conflict } else { SwapOutcome::Missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_must_fit_both_ways() {
        assert_eq!(to_u64(7, "version").unwrap(), 7);
        assert!(matches!(to_u64(-1, "total_votes"), Err(StoreError::Unavailable(msg)) if msg.contains("total_votes")));
        assert!(to_i64(u64::MAX, "version").is_err());
        assert_eq!(to_i64(42, "version").unwrap(), 42);
    }
}
