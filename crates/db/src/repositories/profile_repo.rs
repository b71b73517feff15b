//! Repository for the `profiles` table.

use homestead_core::types::UserId;
use sqlx::PgPool;

use crate::models::profile::{Profile, UpsertProfile};

const COLUMNS: &str = "id, full_name, phone, role, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert the caller's profile or update its editable fields.
    ///
    /// `role` is only used on first insert; existing roles are never changed
    /// here.
    pub async fn upsert(
        pool: &PgPool,
        id: UserId,
        role: &str,
        input: &UpsertProfile,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, full_name, phone, role) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                full_name = COALESCE(EXCLUDED.full_name, profiles.full_name), \
                phone = COALESCE(EXCLUDED.phone, profiles.phone) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(role)
            .fetch_one(pool)
            .await
    }
}
