use chrono::Utc;
use sqlx::Row;

use expertise_core::domain::expertise::{
    ExpertiseKey, ExpertiseRecord, ExpertiseUpdate, TeamId, UserId,
};

use super::{ExpertiseRepository, RepositoryError};
use crate::DbPool;

#[derive(Clone)]
pub struct SqlExpertiseRepository {
    pool: DbPool,
}

impl SqlExpertiseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn encode_expertise(expertise: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(expertise).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ExpertiseRecord, RepositoryError> {
    let team_id: String =
        row.try_get("team_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: String =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_name: String =
        row.try_get("user_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expertise_json: String =
        row.try_get("expertise").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let expertise = serde_json::from_str::<Vec<String>>(&expertise_json).map_err(|e| {
        RepositoryError::Decode(format!("expertise column for {team_id}/{user_id}: {e}"))
    })?;

    Ok(ExpertiseRecord { team_id: TeamId(team_id), user_id: UserId(user_id), user_name, expertise })
}

#[async_trait::async_trait]
impl ExpertiseRepository for SqlExpertiseRepository {
    async fn find_by_key(
        &self,
        key: &ExpertiseKey,
    ) -> Result<Option<ExpertiseRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT team_id, user_id, user_name, expertise
             FROM user_expertise WHERE team_id = ? AND user_id = ?",
        )
        .bind(&key.team_id.0)
        .bind(&key.user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ExpertiseRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT team_id, user_id, user_name, expertise
             FROM user_expertise ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect::<Result<Vec<_>, _>>()
    }

    async fn upsert(&self, update: ExpertiseUpdate) -> Result<ExpertiseRecord, RepositoryError> {
        let expertise_json = encode_expertise(update.fields.as_slice())?;
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(
            "INSERT INTO user_expertise (team_id, user_id, user_name, expertise, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(team_id, user_id) DO UPDATE SET
                 user_name = excluded.user_name,
                 expertise = excluded.expertise,
                 updated_at = excluded.updated_at
             RETURNING team_id, user_id, user_name, expertise",
        )
        .bind(&update.key.team_id.0)
        .bind(&update.key.user_id.0)
        .bind(&update.user_name)
        .bind(&expertise_json)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        row_to_record(&row)
    }
}
