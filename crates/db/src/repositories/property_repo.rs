//! Repository for the `properties` table.

use homestead_core::listing::{STATUS_DRAFT, STATUS_PUBLISHED};
use homestead_core::types::{DbId, Timestamp, UserId};
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property, PropertyListParams, UpdateProperty};

const COLUMNS: &str = "\
    id, owner_id, title, description, property_type, city, address, \
    monthly_rent_cents, bedrooms, bathrooms, status, created_at, updated_at";

pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a new draft property owned by `owner_id`.
    pub async fn create(
        pool: &PgPool,
        owner_id: UserId,
        input: &CreateProperty,
    ) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties \
                (owner_id, title, description, property_type, city, address, \
                 monthly_rent_cents, bedrooms, bathrooms, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.property_type)
            .bind(&input.city)
            .bind(&input.address)
            .bind(input.monthly_rent_cents)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(STATUS_DRAFT)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search published properties with optional filters, newest first.
    pub async fn list_published(
        pool: &PgPool,
        params: &PropertyListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let mut conditions: Vec<String> = vec!["status = $1".to_string()];
        let mut param_idx: usize = 2;

        if params.city.is_some() {
            conditions.push(format!("LOWER(city) = LOWER(${param_idx})"));
            param_idx += 1;
        }
        if params.property_type.is_some() {
            conditions.push(format!("property_type = ${param_idx}"));
            param_idx += 1;
        }
        if params.min_rent_cents.is_some() {
            conditions.push(format!("monthly_rent_cents >= ${param_idx}"));
            param_idx += 1;
        }
        if params.max_rent_cents.is_some() {
            conditions.push(format!("monthly_rent_cents <= ${param_idx}"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM properties WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Property>(&query).bind(STATUS_PUBLISHED);
        if let Some(ref city) = params.city {
            q = q.bind(city);
        }
        if let Some(ref property_type) = params.property_type {
            q = q.bind(property_type);
        }
        if let Some(min) = params.min_rent_cents {
            q = q.bind(min);
        }
        if let Some(max) = params.max_rent_cents {
            q = q.bind(max);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// All properties of one owner regardless of status.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: UserId,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a property whose status is still `expected_status`.
    ///
    /// Returns `None` when the row is gone or its status moved on since the
    /// caller read it, so checks made against that read still hold.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        expected_status: &str,
        input: &UpdateProperty,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                property_type = COALESCE($5, property_type), \
                city = COALESCE($6, city), \
                address = COALESCE($7, address), \
                monthly_rent_cents = COALESCE($8, monthly_rent_cents), \
                bedrooms = COALESCE($9, bedrooms), \
                bathrooms = COALESCE($10, bathrooms) \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(expected_status)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.property_type)
            .bind(&input.city)
            .bind(&input.address)
            .bind(input.monthly_rent_cents)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .fetch_optional(pool)
            .await
    }

    /// Move `from` → `to`. `None` when the status is no longer `from`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET status = $3 WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Publish only the exact revision that was compliance-checked.
    ///
    /// `seen_updated_at` is the `updated_at` of the row whose text passed the
    /// check; any edit in between bumps it and the publish matches nothing.
    pub async fn publish_revision(
        pool: &PgPool,
        id: DbId,
        from: &str,
        seen_updated_at: Timestamp,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET status = $4 \
             WHERE id = $1 AND status = $2 AND updated_at = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(from)
            .bind(seen_updated_at)
            .bind(STATUS_PUBLISHED)
            .fetch_optional(pool)
            .await
    }
}
