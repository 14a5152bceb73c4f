use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use meetgrid_core::{
    access::{ensure_can_view, ensure_creator},
    errors::MeetError,
    models::meeting::{
        CreateMeetingRequest, CreateMeetingResponse, CreatedMeeting, DashboardResponse,
        GetMeetingResponse, InviteResponse, Meeting, MeetingSummary, RespondedMeeting,
        UpdateMeetingRequest, UpdateMeetingResponse,
    },
    validation::validate_meeting,
};

use crate::{
    middleware::{
        auth::{AuthUser, MaybeUser},
        error_handling::AppError,
    },
    ApiState,
};

/// A meeting by share link, with its invited e-mails.
pub(crate) async fn load_meeting(state: &ApiState, share_link: &str) -> Result<(Meeting, Vec<String>), AppError> {
    let db_meeting = state
        .store
        .get_meeting_by_share_link(share_link)
        .await?
        .ok_or_else(|| MeetError::NotFound(format!("Meeting {} not found", share_link)))?;
    let meeting = Meeting::try_from(db_meeting)?;

    let invites = state
        .store
        .get_invites(meeting.id)
        .await?
        .into_iter()
        .map(|invite| invite.email)
        .collect();

    Ok((meeting, invites))
}

pub async fn create_meeting(
    State(state): State<Arc<ApiState>>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<CreateMeetingResponse>), AppError> {
    let draft = validate_meeting(&payload)?;

    // Private and invite-only meetings need a creator account
    if user.is_none() && (draft.is_private || !draft.invited_emails.is_empty()) {
        return Err(MeetError::Authentication(
            "Sign in to create a private or invite-only meeting".to_string(),
        )
        .into());
    }

    let creator_id = user.as_ref().map(|auth| auth.user.id);
    let db_meeting = state.store.create_meeting(&draft, creator_id).await?;

    tracing::info!(
        "Created meeting {} ({}) with {} invites",
        db_meeting.id,
        db_meeting.share_link,
        draft.invited_emails.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateMeetingResponse {
            id: db_meeting.id,
            share_link: db_meeting.share_link,
        }),
    ))
}

pub async fn list_meetings(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let created = state
        .store
        .list_meetings_by_creator(auth.user.id)
        .await?
        .into_iter()
        .map(|row| -> eyre::Result<CreatedMeeting> {
            let meeting = Meeting::try_from(row.meeting)?;
            Ok(CreatedMeeting {
                meeting: MeetingSummary::from(&meeting),
                response_count: row.response_count,
            })
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    let responded = state
        .store
        .list_meetings_responded(auth.user.id)
        .await?
        .into_iter()
        .map(|row| -> eyre::Result<RespondedMeeting> {
            let meeting = Meeting::try_from(row.meeting)?;
            Ok(RespondedMeeting {
                meeting: MeetingSummary::from(&meeting),
                response_id: row.response_id,
            })
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    Ok(Json(DashboardResponse { created, responded }))
}

pub async fn get_meeting(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
) -> Result<Json<GetMeetingResponse>, AppError> {
    let (meeting, invites) = load_meeting(&state, &share_link).await?;
    ensure_can_view(&meeting, &invites, user.viewer().as_ref())?;

    Ok(Json(GetMeetingResponse {
        meeting: MeetingSummary::from(&meeting),
        invites: invites
            .into_iter()
            .map(|email| InviteResponse { email })
            .collect(),
    }))
}

pub async fn update_meeting(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
    Json(payload): Json<UpdateMeetingRequest>,
) -> Result<Json<UpdateMeetingResponse>, AppError> {
    let (meeting, _) = load_meeting(&state, &share_link).await?;
    ensure_creator(&meeting, user.viewer().as_ref())?;

    let draft = validate_meeting(&payload)?;
    state.store.update_meeting(meeting.id, &draft).await?;

    tracing::info!("Updated meeting {}", meeting.id);
    Ok(Json(UpdateMeetingResponse {
        id: meeting.id,
        updated_at: Utc::now(),
    }))
}

pub async fn delete_meeting(
    State(state): State<Arc<ApiState>>,
    user: MaybeUser,
    Path(share_link): Path<String>,
) -> Result<StatusCode, AppError> {
    let (meeting, _) = load_meeting(&state, &share_link).await?;
    ensure_creator(&meeting, user.viewer().as_ref())?;

    state.store.delete_meeting(meeting.id).await?;

    tracing::info!("Deleted meeting {}", meeting.id);
    Ok(StatusCode::NO_CONTENT)
}
