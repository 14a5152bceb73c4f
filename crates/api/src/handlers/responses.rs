use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use meetgrid_core::{
    access::{
        ensure_can_edit_guest_response, ensure_can_read_response, ensure_can_view,
        ensure_own_results, response_name, results_access, ResultsAccess,
    },
    aggregate::{AvailabilityMatrix, ParticipantResponse},
    errors::MeetError,
    models::response::{
        ListResponsesQuery, ListResponsesResponse, ResponseView, SubmitAvailabilityRequest,
        SubmitAvailabilityResponse,
    },
    validation::validate_slots,
};
use meetgrid_db::{models::DbResponseWithSlots, repositories::response::ResponseTarget};

use crate::{
    handlers::meetings::load_meeting,
    middleware::{
        auth::{issue_edit_token, verify_secret, MaybeUser},
        error_handling::AppError,
    },
    ApiState,
};

fn into_views(rows: Vec<DbResponseWithSlots>) -> eyre::Result<Vec<ResponseView>> {
    rows.into_iter().map(ResponseView::try_from).collect()
}

/// Whether `edit_token` matches the hash stored on a guest response.
fn holds_edit_token(row: &DbResponseWithSlots, edit_token: Option<&str>) -> bool {
    match (row.response.edit_token_hash.as_deref(), edit_token) {
        (Some(hash), Some(token)) => verify_secret(hash, token),
        _ => false,
    }
}

/// Creates or replaces the caller's response.
///
/// Signed-in users have one response per meeting, found by account. Guests
/// start a new response and get an edit token back; to change it later they
/// send its `response_id` together with that token.
pub async fn submit_response(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
    Json(payload): Json<SubmitAvailabilityRequest>,
) -> Result<(StatusCode, Json<SubmitAvailabilityResponse>), AppError> {
    let (meeting, invites) = load_meeting(&state, &share_link).await?;
    let viewer = user.viewer();
    ensure_can_view(&meeting, &invites, viewer.as_ref())?;

    let name = response_name(viewer.as_ref(), payload.guest_name.as_deref())?;
    let slots = validate_slots(&payload.slots, &meeting.grid())?;

    let mut edit_token = None;
    let mut edit_token_hash = None;
    let target = match (&viewer, payload.response_id) {
        (Some(viewer), _) => match state.store.get_response_by_user(meeting.id, viewer.user_id).await? {
            Some(existing) => ResponseTarget::Existing(existing.response.id),
            None => ResponseTarget::New,
        },
        (None, Some(response_id)) => {
            let existing = state
                .store
                .get_response(meeting.id, response_id)
                .await?
                .ok_or_else(|| MeetError::NotFound(format!("Response {} not found", response_id)))?;
            ensure_can_edit_guest_response(
                existing.response.user_id,
                holds_edit_token(&existing, payload.edit_token.as_deref()),
            )?;
            ResponseTarget::Existing(response_id)
        }
        (None, None) => {
            let (token, hash) = issue_edit_token()?;
            edit_token = Some(token);
            edit_token_hash = Some(hash);
            ResponseTarget::New
        }
    };

    let user_id = viewer.as_ref().map(|viewer| viewer.user_id);
    let saved = state
        .store
        .save_response(meeting.id, target, user_id, &name, edit_token_hash, &slots)
        .await?;

    tracing::info!(
        "Saved response {} for meeting {} with {} slots",
        saved.id,
        meeting.id,
        slots.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitAvailabilityResponse {
            response_id: saved.id,
            name: saved.name,
            slot_count: slots.len(),
            edit_token,
        }),
    ))
}

/// Lists a meeting's responses, or the one named by `?response_id=`.
///
/// On a private meeting everyone but the creator sees only their own
/// response: by account when signed in, or by `response_id` plus
/// `edit_token` for guests.
pub async fn list_responses(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
    Query(query): Query<ListResponsesQuery>,
) -> Result<Json<ListResponsesResponse>, AppError> {
    let (meeting, invites) = load_meeting(&state, &share_link).await?;
    let viewer = user.viewer();
    ensure_can_view(&meeting, &invites, viewer.as_ref())?;

    let access = results_access(&meeting, viewer.as_ref());
    let can_view_all_results = access == ResultsAccess::All;

    if let Some(response_id) = query.response_id {
        let row = state
            .store
            .get_response(meeting.id, response_id)
            .await?
            .ok_or_else(|| MeetError::NotFound(format!("Response {} not found", response_id)))?;
        ensure_can_read_response(
            access,
            viewer.as_ref(),
            row.response.user_id,
            holds_edit_token(&row, query.edit_token.as_deref()),
        )?;
        return Ok(Json(ListResponsesResponse {
            responses: vec![ResponseView::try_from(row)?],
            user_response_only: true,
            can_view_all_results,
        }));
    }

    let response = match access {
        ResultsAccess::All => ListResponsesResponse {
            responses: into_views(state.store.list_responses(meeting.id).await?)?,
            user_response_only: false,
            can_view_all_results,
        },
        ResultsAccess::OwnOnly => {
            let own: Vec<DbResponseWithSlots> = match &viewer {
                Some(viewer) => state
                    .store
                    .get_response_by_user(meeting.id, viewer.user_id)
                    .await?
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            };
            ensure_own_results(access, !own.is_empty())?;
            ListResponsesResponse {
                responses: into_views(own)?,
                user_response_only: true,
                can_view_all_results,
            }
        }
    };

    Ok(Json(response))
}

/// Aggregated availability over the meeting grid, rebuilt on every call.
pub async fn get_grid(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
) -> Result<Json<AvailabilityMatrix>, AppError> {
    let (meeting, invites) = load_meeting(&state, &share_link).await?;
    let viewer = user.viewer();
    ensure_can_view(&meeting, &invites, viewer.as_ref())?;

    if results_access(&meeting, viewer.as_ref()) == ResultsAccess::OwnOnly {
        return Err(MeetError::Authorization(
            "Only the creator can view results for this meeting".to_string(),
        )
        .into());
    }

    let views = into_views(state.store.list_responses(meeting.id).await?)?;
    let participants: Vec<ParticipantResponse> = views.iter().map(ParticipantResponse::from).collect();

    Ok(Json(meeting.grid().aggregate(&participants)))
}
