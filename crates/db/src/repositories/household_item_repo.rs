//! Repository for the `household_items` table.

use homestead_core::marketplace::{STATUS_AVAILABLE, STATUS_UNDER_REVIEW};
use homestead_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::household_item::{
    CreateHouseholdItem, HouseholdItem, ItemListParams, ItemScreening, UpdateHouseholdItem,
};

const COLUMNS: &str = "\
    id, seller_id, title, description, category, condition, price_cents, city, \
    status, fraud_score, fraud_flags, created_at, updated_at";

pub struct HouseholdItemRepo;

impl HouseholdItemRepo {
    /// Insert an item together with its fraud screening verdict.
    pub async fn create(
        pool: &PgPool,
        seller_id: UserId,
        input: &CreateHouseholdItem,
        screening: &ItemScreening,
    ) -> Result<HouseholdItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO household_items \
                (seller_id, title, description, category, condition, price_cents, city, \
                 status, fraud_score, fraud_flags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(seller_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.condition)
            .bind(input.price_cents)
            .bind(&input.city)
            .bind(&screening.status)
            .bind(screening.fraud_score)
            .bind(&screening.fraud_flags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HouseholdItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM household_items WHERE id = $1");
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Public browse: only `available` items, newest first.
    pub async fn list_available(
        pool: &PgPool,
        params: &ItemListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HouseholdItem>, sqlx::Error> {
        let mut conditions: Vec<String> = vec!["status = $1".to_string()];
        let mut param_idx: usize = 2;

        if params.category.is_some() {
            conditions.push(format!("category = ${param_idx}"));
            param_idx += 1;
        }
        if params.city.is_some() {
            conditions.push(format!("LOWER(city) = LOWER(${param_idx})"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM household_items WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, HouseholdItem>(&query).bind(STATUS_AVAILABLE);
        if let Some(ref category) = params.category {
            q = q.bind(category);
        }
        if let Some(ref city) = params.city {
            q = q.bind(city);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Items awaiting moderation, riskiest first.
    pub async fn list_under_review(pool: &PgPool) -> Result<Vec<HouseholdItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM household_items WHERE status = $1 \
             ORDER BY fraud_score DESC, created_at ASC"
        );
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(STATUS_UNDER_REVIEW)
            .fetch_all(pool)
            .await
    }

    /// Patch the descriptive fields. Status changes go through [`Self::set_status`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHouseholdItem,
    ) -> Result<Option<HouseholdItem>, sqlx::Error> {
        let query = format!(
            "UPDATE household_items SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                condition = COALESCE($5, condition), \
                price_cents = COALESCE($6, price_cents), \
                city = COALESCE($7, city) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.condition)
            .bind(input.price_cents)
            .bind(&input.city)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<HouseholdItem>, sqlx::Error> {
        let query =
            format!("UPDATE household_items SET status = $1 WHERE id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(status)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored fraud verdict after a re-screen.
    pub async fn record_screening(
        pool: &PgPool,
        id: DbId,
        screening: &ItemScreening,
    ) -> Result<Option<HouseholdItem>, sqlx::Error> {
        let query = format!(
            "UPDATE household_items SET status = $2, fraud_score = $3, fraud_flags = $4 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HouseholdItem>(&query)
            .bind(id)
            .bind(&screening.status)
            .bind(screening.fraud_score)
            .bind(&screening.fraud_flags)
            .fetch_optional(pool)
            .await
    }
}
