//! Repository for the `bookings` table.
//!
//! Booking creation claims the slot and writes the row in one transaction so
//! two concurrent requests can never both hold the same slot.

use homestead_core::booking::STATUS_PENDING;
use homestead_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::booking::{Booking, BookingListParams, BookingOutcome, NewBooking};

const COLUMNS: &str = "\
    id, property_id, slot_id, customer_name, customer_phone, customer_email, \
    notes, status, idempotency_key, client_ip, created_at, updated_at";

pub struct BookingRepo;

impl BookingRepo {
    /// Create a booking exactly once per idempotency key.
    ///
    /// A repeated key returns the stored row as [`BookingOutcome::Duplicate`]
    /// without touching the slot. A slot that is already booked, in the past,
    /// or not on this property yields [`BookingOutcome::SlotUnavailable`].
    pub async fn create_idempotent(
        pool: &PgPool,
        input: &NewBooking,
    ) -> Result<BookingOutcome, sqlx::Error> {
        if let Some(existing) = Self::find_by_key(pool, &input.idempotency_key).await? {
            return Ok(BookingOutcome::Duplicate(existing));
        }

        let mut tx = pool.begin().await?;

        let claimed: Option<(DbId,)> = sqlx::query_as(
            "UPDATE availability_slots SET is_booked = TRUE \
             WHERE id = $1 AND property_id = $2 AND is_booked = FALSE AND starts_at > NOW() \
             RETURNING id",
        )
        .bind(input.slot_id)
        .bind(input.property_id)
        .fetch_optional(&mut *tx)
        .await?;

        if claimed.is_none() {
            tx.rollback().await?;
            // The slot may have been claimed by an identical request racing us.
            return Ok(match Self::find_by_key(pool, &input.idempotency_key).await? {
                Some(existing) => BookingOutcome::Duplicate(existing),
                None => BookingOutcome::SlotUnavailable,
            });
        }

        let query = format!(
            "INSERT INTO bookings \
                (property_id, slot_id, customer_name, customer_phone, customer_email, \
                 notes, status, idempotency_key, client_ip) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (idempotency_key) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Booking>(&query)
            .bind(input.property_id)
            .bind(input.slot_id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(&input.customer_email)
            .bind(&input.notes)
            .bind(STATUS_PENDING)
            .bind(&input.idempotency_key)
            .bind(&input.client_ip)
            .fetch_optional(&mut *tx)
            .await?;

        match inserted {
            Some(booking) => {
                tx.commit().await?;
                Ok(BookingOutcome::Created(booking))
            }
            None => {
                tx.rollback().await?;
                match Self::find_by_key(pool, &input.idempotency_key).await? {
                    Some(existing) => Ok(BookingOutcome::Duplicate(existing)),
                    None => Ok(BookingOutcome::SlotUnavailable),
                }
            }
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE idempotency_key = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List bookings, newest first. `owner_id` restricts the result to
    /// bookings on that owner's properties.
    pub async fn list(
        pool: &PgPool,
        params: &BookingListParams,
        owner_id: Option<UserId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if params.property_id.is_some() {
            conditions.push(format!("property_id = ${param_idx}"));
            param_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if owner_id.is_some() {
            conditions.push(format!(
                "property_id IN (SELECT id FROM properties WHERE owner_id = ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM bookings {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Booking>(&query);
        if let Some(property_id) = params.property_id {
            q = q.bind(property_id);
        }
        if let Some(ref status) = params.status {
            q = q.bind(status);
        }
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Move a booking from `expected` to `status`, freeing its slot when
    /// `release_slot` is set.
    ///
    /// Returns `None` when the booking is missing or no longer in `expected`,
    /// so a transition validated against a stale read never lands.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        status: &str,
        release_slot: bool,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(status)
            .bind(id)
            .bind(expected)
            .fetch_optional(&mut *tx)
            .await?;

        if let (Some(booking), true) = (&updated, release_slot) {
            sqlx::query("UPDATE availability_slots SET is_booked = FALSE WHERE id = $1")
                .bind(booking.slot_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }
}
