use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    aggregate::Grid,
    slots::{Boundary, SlotTime, TimeWindow},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_window: Option<TimeWindow>,
    pub creator_id: Option<Uuid>,
    pub share_link: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    /// Configured window, or the full day when none was set
    pub fn window(&self) -> TimeWindow {
        self.time_window.unwrap_or_default()
    }

    pub fn grid(&self) -> Grid {
        Grid::for_meeting(self.start_date, self.end_date, &self.window())
    }
}

/// A meeting that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_window: Option<TimeWindow>,
    pub is_private: bool,
    pub invited_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<SlotTime>,
    pub end_time: Option<SlotTime>,
    #[serde(default)]
    pub time_boundary: Boundary,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub invited_emails: Vec<String>,
}

/// Updates replace every field of the meeting, invites included.
pub type UpdateMeetingRequest = CreateMeetingRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingResponse {
    pub id: Uuid,
    pub share_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<SlotTime>,
    pub end_time: Option<SlotTime>,
    pub creator_id: Option<Uuid>,
    pub share_link: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Meeting> for MeetingSummary {
    fn from(meeting: &Meeting) -> Self {
        Self {
            id: meeting.id,
            title: meeting.title.clone(),
            description: meeting.description.clone(),
            location: meeting.location.clone(),
            start_date: meeting.start_date,
            end_date: meeting.end_date,
            start_time: meeting.time_window.map(|w| w.start()),
            end_time: meeting.time_window.map(|w| w.end()),
            creator_id: meeting.creator_id,
            share_link: meeting.share_link.clone(),
            is_private: meeting.is_private,
            created_at: meeting.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteResponse {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMeetingResponse {
    pub meeting: MeetingSummary,
    pub invites: Vec<InviteResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMeetingResponse {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedMeeting {
    #[serde(flatten)]
    pub meeting: MeetingSummary,
    pub response_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondedMeeting {
    #[serde(flatten)]
    pub meeting: MeetingSummary,
    pub response_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub created: Vec<CreatedMeeting>,
    pub responded: Vec<RespondedMeeting>,
}
