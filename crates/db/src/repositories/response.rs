use std::collections::HashMap;

use crate::models::{DbAvailabilitySlot, DbResponse, DbResponseWithSlots};
use chrono::Utc;
use eyre::{eyre, Result};
use meetgrid_core::slots::TimeSlot;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Where a submission is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTarget {
    /// Replace the slots of this existing response
    Existing(Uuid),
    /// Start a new response
    New,
}

async fn fetch_slots(pool: &Pool<Postgres>, response_id: Uuid) -> Result<Vec<DbAvailabilitySlot>> {
    let slots = sqlx::query_as::<_, DbAvailabilitySlot>(
        r#"
        SELECT response_id, date, start_minutes, end_minutes
        FROM availability_slots
        WHERE response_id = $1
        ORDER BY date ASC, start_minutes ASC
        "#,
    )
    .bind(response_id)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

async fn with_slots(
    pool: &Pool<Postgres>,
    response: Option<DbResponse>,
) -> Result<Option<DbResponseWithSlots>> {
    match response {
        Some(response) => {
            let slots = fetch_slots(pool, response.id).await?;
            Ok(Some(DbResponseWithSlots { response, slots }))
        }
        None => Ok(None),
    }
}

/// Writes a response and replaces its slots in one transaction.
///
/// `edit_token_hash` is stored only when a new response is inserted; an
/// existing response keeps the hash it was created with.
pub async fn save_response(
    pool: &Pool<Postgres>,
    meeting_id: Uuid,
    target: ResponseTarget,
    user_id: Option<Uuid>,
    name: &str,
    edit_token_hash: Option<&str>,
    slots: &[TimeSlot],
) -> Result<DbResponse> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let response = match target {
        ResponseTarget::Existing(id) => {
            let response = sqlx::query_as::<_, DbResponse>(
                r#"
                UPDATE meeting_responses
                SET name = $3, user_id = $4, updated_at = $5
                WHERE id = $1 AND meeting_id = $2
                RETURNING id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(meeting_id)
            .bind(name)
            .bind(user_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| eyre!("Response {} does not belong to meeting {}", id, meeting_id))?;

            sqlx::query("DELETE FROM availability_slots WHERE response_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            response
        }
        ResponseTarget::New => {
            sqlx::query_as::<_, DbResponse>(
                r#"
                INSERT INTO meeting_responses (id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                RETURNING id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(meeting_id)
            .bind(name)
            .bind(user_id)
            .bind(edit_token_hash)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    for slot in slots {
        sqlx::query(
            r#"
            INSERT INTO availability_slots (response_id, date, start_minutes, end_minutes)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(response.id)
        .bind(slot.date)
        .bind(i32::from(slot.start_time.minutes()))
        .bind(i32::from(slot.end_time.minutes()))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        "Response saved: id={}, meeting_id={}, slots={}",
        response.id,
        meeting_id,
        slots.len()
    );
    Ok(response)
}

pub async fn get_response(
    pool: &Pool<Postgres>,
    meeting_id: Uuid,
    response_id: Uuid,
) -> Result<Option<DbResponseWithSlots>> {
    let response = sqlx::query_as::<_, DbResponse>(
        r#"
        SELECT id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at
        FROM meeting_responses
        WHERE id = $1 AND meeting_id = $2
        "#,
    )
    .bind(response_id)
    .bind(meeting_id)
    .fetch_optional(pool)
    .await?;

    with_slots(pool, response).await
}

pub async fn get_response_by_user(
    pool: &Pool<Postgres>,
    meeting_id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbResponseWithSlots>> {
    let response = sqlx::query_as::<_, DbResponse>(
        r#"
        SELECT id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at
        FROM meeting_responses
        WHERE meeting_id = $1 AND user_id = $2
        "#,
    )
    .bind(meeting_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    with_slots(pool, response).await
}

/// All responses of a meeting in submission order, each with its slots.
pub async fn list_responses(
    pool: &Pool<Postgres>,
    meeting_id: Uuid,
) -> Result<Vec<DbResponseWithSlots>> {
    let responses = sqlx::query_as::<_, DbResponse>(
        r#"
        SELECT id, meeting_id, name, user_id, edit_token_hash, created_at, updated_at
        FROM meeting_responses
        WHERE meeting_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;

    let slots = sqlx::query_as::<_, DbAvailabilitySlot>(
        r#"
        SELECT s.response_id, s.date, s.start_minutes, s.end_minutes
        FROM availability_slots s
        JOIN meeting_responses r ON r.id = s.response_id
        WHERE r.meeting_id = $1
        ORDER BY s.date ASC, s.start_minutes ASC
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;

    Ok(group_slots(responses, slots))
}

fn group_slots(
    responses: Vec<DbResponse>,
    slots: Vec<DbAvailabilitySlot>,
) -> Vec<DbResponseWithSlots> {
    let mut by_response: HashMap<Uuid, Vec<DbAvailabilitySlot>> = HashMap::new();
    for slot in slots {
        by_response.entry(slot.response_id).or_default().push(slot);
    }

    responses
        .into_iter()
        .map(|response| {
            let slots = by_response.remove(&response.id).unwrap_or_default();
            DbResponseWithSlots { response, slots }
        })
        .collect()
}
