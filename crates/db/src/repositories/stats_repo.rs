//! Aggregate queries for the admin summary.

use sqlx::PgPool;

use crate::models::stats::{LabelCount, PlatformStats};

pub struct StatsRepo;

impl StatsRepo {
    pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
        let properties_by_status = sqlx::query_as::<_, LabelCount>(
            "SELECT status AS label, COUNT(*) AS count FROM properties \
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await?;

        let bookings_by_status = sqlx::query_as::<_, LabelCount>(
            "SELECT status AS label, COUNT(*) AS count FROM bookings \
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await?;

        let leads_by_temperature = sqlx::query_as::<_, LabelCount>(
            "SELECT temperature AS label, COUNT(*) AS count FROM leads \
             GROUP BY temperature ORDER BY temperature",
        )
        .fetch_all(pool)
        .await?;

        let (items_under_review,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM household_items WHERE status = 'under_review'",
        )
        .fetch_one(pool)
        .await?;

        Ok(PlatformStats {
            properties_by_status,
            bookings_by_status,
            leads_by_temperature,
            items_under_review,
        })
    }
}
