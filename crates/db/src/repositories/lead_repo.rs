//! Repository for the `leads` table.

use homestead_core::types::DbId;
use sqlx::PgPool;

use crate::models::lead::{Lead, LeadListParams, NewLead};

const COLUMNS: &str = "\
    id, property_id, name, email, phone, message, budget_cents, move_in_date, \
    source, score, temperature, status, qualification_json, created_at, updated_at";

pub struct LeadRepo;

impl LeadRepo {
    pub async fn create(pool: &PgPool, input: &NewLead) -> Result<Lead, sqlx::Error> {
        let query = format!(
            "INSERT INTO leads \
                (property_id, name, email, phone, message, budget_cents, move_in_date, \
                 source, score, temperature, qualification_json) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(input.property_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.message)
            .bind(input.budget_cents)
            .bind(input.move_in_date)
            .bind(&input.source)
            .bind(input.score)
            .bind(&input.temperature)
            .bind(&input.qualification_json)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leads WHERE id = $1");
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List leads, hottest first then newest.
    pub async fn list(
        pool: &PgPool,
        params: &LeadListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if params.temperature.is_some() {
            conditions.push(format!("temperature = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM leads {where_clause} \
             ORDER BY score DESC, created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Lead>(&query);
        if let Some(ref status) = params.status {
            q = q.bind(status);
        }
        if let Some(ref temperature) = params.temperature {
            q = q.bind(temperature);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!("UPDATE leads SET status = $1 WHERE id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Lead>(&query)
            .bind(status)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the qualification result after a re-score.
    pub async fn update_qualification(
        pool: &PgPool,
        id: DbId,
        score: i16,
        temperature: &str,
        qualification_json: &serde_json::Value,
    ) -> Result<Option<Lead>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET score = $2, temperature = $3, qualification_json = $4 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(score)
            .bind(temperature)
            .bind(qualification_json)
            .fetch_optional(pool)
            .await
    }
}
