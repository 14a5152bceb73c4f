use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{aggregate::ParticipantResponse, slots::TimeSlot};

/// A stored response. Identity is `id` (or `user_id` for accounts); `name`
/// is display text only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseView {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub name: String,
    pub user_id: Option<Uuid>,
    pub slots: Vec<TimeSlot>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResponseView> for ParticipantResponse {
    fn from(view: &ResponseView) -> Self {
        ParticipantResponse::new(view.id, view.name.clone(), view.slots.iter().map(TimeSlot::key))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAvailabilityRequest {
    /// Required when the submitter is not signed in
    pub guest_name: Option<String>,
    /// A guest's earlier response to replace
    pub response_id: Option<Uuid>,
    /// Secret returned when the guest response was created; required with `response_id`
    pub edit_token: Option<String>,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAvailabilityResponse {
    pub response_id: Uuid,
    pub name: String,
    pub slot_count: usize,
    /// Issued once, when a guest response is first created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponsesQuery {
    pub response_id: Option<Uuid>,
    pub edit_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponsesResponse {
    pub responses: Vec<ResponseView>,
    /// Set when a private meeting only exposes the viewer's own response
    #[serde(default)]
    pub user_response_only: bool,
    pub can_view_all_results: bool,
}
