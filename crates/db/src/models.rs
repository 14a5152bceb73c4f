use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result, WrapErr};
use meetgrid_core::{
    models::{meeting::Meeting, response::ResponseView, user::User},
    slots::{SlotTime, TimeSlot, TimeWindow},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        User {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMeeting {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window_start: Option<i32>,
    pub window_end: Option<i32>,
    pub creator_id: Option<Uuid>,
    pub share_link: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

fn minutes(value: i32) -> Result<u16> {
    u16::try_from(value).map_err(|_| eyre!("Stored minute value {} is out of range", value))
}

impl TryFrom<DbMeeting> for Meeting {
    type Error = eyre::Report;

    fn try_from(meeting: DbMeeting) -> Result<Self> {
        let time_window = match (meeting.window_start, meeting.window_end) {
            (Some(start), Some(end)) => Some(
                TimeWindow::from_minutes(minutes(start)?, minutes(end)?)
                    .wrap_err_with(|| format!("Meeting {} has an invalid time window", meeting.id))?,
            ),
            _ => None,
        };

        Ok(Meeting {
            id: meeting.id,
            title: meeting.title,
            description: meeting.description,
            location: meeting.location,
            start_date: meeting.start_date,
            end_date: meeting.end_date,
            time_window,
            creator_id: meeting.creator_id,
            share_link: meeting.share_link,
            is_private: meeting.is_private,
            created_at: meeting.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMeetingWithCount {
    #[sqlx(flatten)]
    pub meeting: DbMeeting,
    pub response_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRespondedMeeting {
    #[sqlx(flatten)]
    pub meeting: DbMeeting,
    pub response_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMeetingInvite {
    pub meeting_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbResponse {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub name: String,
    pub user_id: Option<Uuid>,
    /// Argon2 hash of a guest's edit token
    #[serde(skip_serializing)]
    pub edit_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilitySlot {
    pub response_id: Uuid,
    pub date: NaiveDate,
    pub start_minutes: i32,
    pub end_minutes: i32,
}

impl TryFrom<&DbAvailabilitySlot> for TimeSlot {
    type Error = eyre::Report;

    fn try_from(slot: &DbAvailabilitySlot) -> Result<Self> {
        let start = SlotTime::from_minutes(minutes(slot.start_minutes)?)?;
        let end = SlotTime::from_minutes(minutes(slot.end_minutes)?)?;
        Ok(TimeSlot::from_parts(slot.date, start, end)?)
    }
}

/// A response together with its slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbResponseWithSlots {
    pub response: DbResponse,
    pub slots: Vec<DbAvailabilitySlot>,
}

impl TryFrom<DbResponseWithSlots> for ResponseView {
    type Error = eyre::Report;

    fn try_from(row: DbResponseWithSlots) -> Result<Self> {
        let slots = row
            .slots
            .iter()
            .map(TimeSlot::try_from)
            .collect::<Result<Vec<_>>>()
            .wrap_err_with(|| format!("Response {} has an invalid slot", row.response.id))?;

        Ok(ResponseView {
            id: row.response.id,
            meeting_id: row.response.meeting_id,
            name: row.response.name,
            user_id: row.response.user_id,
            slots,
            updated_at: row.response.updated_at,
        })
    }
}
