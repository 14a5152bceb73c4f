use crate::models::{DbMeeting, DbMeetingInvite, DbMeetingWithCount, DbRespondedMeeting};
use chrono::Utc;
use eyre::{Result, WrapErr};
use meetgrid_core::{models::meeting::MeetingDraft, slots::TimeWindow};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

/// Length of the public share link
pub const SHARE_LINK_LENGTH: usize = 8;

const MEETING_COLUMNS: &str = "m.id, m.title, m.description, m.location, m.start_date, m.end_date, \
    m.window_start, m.window_end, m.creator_id, m.share_link, m.is_private, m.created_at";

pub fn generate_share_link() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_LINK_LENGTH)
        .map(char::from)
        .collect()
}

fn window_minutes(window: Option<TimeWindow>) -> (Option<i32>, Option<i32>) {
    match window {
        Some(w) => (
            Some(i32::from(w.start().minutes())),
            Some(i32::from(w.end().minutes())),
        ),
        None => (None, None),
    }
}

async fn replace_invites(
    tx: &mut Transaction<'_, Postgres>,
    meeting_id: Uuid,
    emails: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM meeting_invites WHERE meeting_id = $1")
        .bind(meeting_id)
        .execute(&mut **tx)
        .await?;

    for email in emails {
        sqlx::query(
            r#"
            INSERT INTO meeting_invites (meeting_id, email)
            VALUES ($1, $2)
            ON CONFLICT (meeting_id, email) DO NOTHING
            "#,
        )
        .bind(meeting_id)
        .bind(email)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn create_meeting(
    pool: &Pool<Postgres>,
    draft: &MeetingDraft,
    creator_id: Option<Uuid>,
) -> Result<DbMeeting> {
    let id = Uuid::new_v4();
    let share_link = generate_share_link();
    let (window_start, window_end) = window_minutes(draft.time_window);

    tracing::debug!(
        "Creating meeting: id={}, share_link={}, invites={}",
        id,
        share_link,
        draft.invited_emails.len()
    );

    let mut tx = pool.begin().await?;

    let meeting = sqlx::query_as::<_, DbMeeting>(
        r#"
        INSERT INTO meetings (id, title, description, location, start_date, end_date,
                              window_start, window_end, creator_id, share_link, is_private, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, title, description, location, start_date, end_date,
                  window_start, window_end, creator_id, share_link, is_private, created_at
        "#,
    )
    .bind(id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.location)
    .bind(draft.start_date)
    .bind(draft.end_date)
    .bind(window_start)
    .bind(window_end)
    .bind(creator_id)
    .bind(&share_link)
    .bind(draft.is_private)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .wrap_err("Failed to insert meeting")?;

    replace_invites(&mut tx, id, &draft.invited_emails).await?;
    tx.commit().await?;

    Ok(meeting)
}

pub async fn get_meeting_by_share_link(
    pool: &Pool<Postgres>,
    share_link: &str,
) -> Result<Option<DbMeeting>> {
    let meeting = sqlx::query_as::<_, DbMeeting>(&format!(
        "SELECT {MEETING_COLUMNS} FROM meetings m WHERE m.share_link = $1"
    ))
    .bind(share_link)
    .fetch_optional(pool)
    .await?;

    if meeting.is_none() {
        tracing::debug!("Meeting not found: share_link={}", share_link);
    }

    Ok(meeting)
}

pub async fn get_invites(pool: &Pool<Postgres>, meeting_id: Uuid) -> Result<Vec<DbMeetingInvite>> {
    let invites = sqlx::query_as::<_, DbMeetingInvite>(
        r#"
        SELECT meeting_id, email
        FROM meeting_invites
        WHERE meeting_id = $1
        ORDER BY email ASC
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;

    Ok(invites)
}

/// Replaces every editable field and the invite list in one transaction.
pub async fn update_meeting(
    pool: &Pool<Postgres>,
    id: Uuid,
    draft: &MeetingDraft,
) -> Result<DbMeeting> {
    let (window_start, window_end) = window_minutes(draft.time_window);
    let mut tx = pool.begin().await?;

    let meeting = sqlx::query_as::<_, DbMeeting>(
        r#"
        UPDATE meetings
        SET title = $2, description = $3, location = $4, start_date = $5, end_date = $6,
            window_start = $7, window_end = $8, is_private = $9
        WHERE id = $1
        RETURNING id, title, description, location, start_date, end_date,
                  window_start, window_end, creator_id, share_link, is_private, created_at
        "#,
    )
    .bind(id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.location)
    .bind(draft.start_date)
    .bind(draft.end_date)
    .bind(window_start)
    .bind(window_end)
    .bind(draft.is_private)
    .fetch_one(&mut *tx)
    .await
    .wrap_err_with(|| format!("Failed to update meeting {}", id))?;

    replace_invites(&mut tx, id, &draft.invited_emails).await?;
    tx.commit().await?;

    Ok(meeting)
}

/// Invites, responses and their slots go with the meeting.
pub async fn delete_meeting(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM meetings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    tracing::debug!("Meeting deleted: id={}", id);
    Ok(())
}

pub async fn list_meetings_by_creator(
    pool: &Pool<Postgres>,
    creator_id: Uuid,
) -> Result<Vec<DbMeetingWithCount>> {
    let meetings = sqlx::query_as::<_, DbMeetingWithCount>(&format!(
        r#"
        SELECT {MEETING_COLUMNS}, COUNT(r.id) AS response_count
        FROM meetings m
        LEFT JOIN meeting_responses r ON r.meeting_id = m.id
        WHERE m.creator_id = $1
        GROUP BY m.id
        ORDER BY m.created_at DESC
        "#
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    Ok(meetings)
}

/// Meetings the user answered but did not create.
pub async fn list_meetings_responded(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<DbRespondedMeeting>> {
    let meetings = sqlx::query_as::<_, DbRespondedMeeting>(&format!(
        r#"
        SELECT {MEETING_COLUMNS}, r.id AS response_id
        FROM meetings m
        JOIN meeting_responses r ON r.meeting_id = m.id
        WHERE r.user_id = $1 AND m.creator_id IS DISTINCT FROM $1
        ORDER BY m.created_at DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(meetings)
}
