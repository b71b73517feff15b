//! Repository for the `availability_slots` table.

use homestead_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::slot::{AvailabilitySlot, CreateSlot};

const COLUMNS: &str = "id, property_id, starts_at, ends_at, is_booked, created_at";

pub struct SlotRepo;

impl SlotRepo {
    pub async fn create(
        pool: &PgPool,
        property_id: DbId,
        input: &CreateSlot,
    ) -> Result<AvailabilitySlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO availability_slots (property_id, starts_at, ends_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AvailabilitySlot>(&query)
            .bind(property_id)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AvailabilitySlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM availability_slots WHERE id = $1");
        sqlx::query_as::<_, AvailabilitySlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Unbooked slots of a property starting after `now`, soonest first.
    pub async fn list_open(
        pool: &PgPool,
        property_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_slots \
             WHERE property_id = $1 AND is_booked = FALSE AND starts_at > $2 \
             ORDER BY starts_at ASC"
        );
        sqlx::query_as::<_, AvailabilitySlot>(&query)
            .bind(property_id)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    /// Delete an unbooked slot. Returns `false` if it is booked or missing.
    pub async fn delete_unbooked(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM availability_slots WHERE id = $1 AND is_booked = FALSE")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
