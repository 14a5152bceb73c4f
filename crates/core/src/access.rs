//! Who may see and change a meeting.
//!
//! Pure checks over the meeting, its invite list and the (optional) signed-in
//! viewer. Handlers call these before touching responses.

use uuid::Uuid;

use crate::{
    errors::{MeetError, MeetResult},
    models::{meeting::Meeting, user::User},
    validation::validate_guest_name,
};

/// The signed-in user making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsAccess {
    /// Every response and the aggregated grid
    All,
    /// Only the viewer's own response
    OwnOnly,
}

pub fn is_creator(meeting: &Meeting, viewer: Option<&Viewer>) -> bool {
    match (meeting.creator_id, viewer) {
        (Some(creator_id), Some(viewer)) => creator_id == viewer.user_id,
        _ => false,
    }
}

/// Invite-only meetings are open to the creator and to invited accounts.
pub fn ensure_can_view(meeting: &Meeting, invites: &[String], viewer: Option<&Viewer>) -> MeetResult<()> {
    if invites.is_empty() || is_creator(meeting, viewer) {
        return Ok(());
    }

    let viewer = viewer.ok_or_else(|| {
        MeetError::Authentication("This meeting requires authentication".to_string())
    })?;

    if invites
        .iter()
        .any(|email| email.eq_ignore_ascii_case(&viewer.email))
    {
        Ok(())
    } else {
        Err(MeetError::Authorization(
            "You are not invited to this meeting".to_string(),
        ))
    }
}

pub fn ensure_creator(meeting: &Meeting, viewer: Option<&Viewer>) -> MeetResult<()> {
    if viewer.is_none() {
        return Err(MeetError::Authentication("Authentication required".to_string()));
    }
    if !is_creator(meeting, viewer) {
        return Err(MeetError::Authorization(
            "Only the creator can modify this meeting".to_string(),
        ));
    }
    Ok(())
}

pub fn results_access(meeting: &Meeting, viewer: Option<&Viewer>) -> ResultsAccess {
    if meeting.is_private && !is_creator(meeting, viewer) {
        ResultsAccess::OwnOnly
    } else {
        ResultsAccess::All
    }
}

/// Display name recorded on a submission: the account name when signed in,
/// otherwise the trimmed guest name.
pub fn response_name(viewer: Option<&Viewer>, guest_name: Option<&str>) -> MeetResult<String> {
    match viewer {
        Some(viewer) => Ok(viewer.display_name.clone()),
        None => validate_guest_name(guest_name),
    }
}

fn results_forbidden() -> MeetError {
    MeetError::Authorization("Only the creator can view results for this meeting".to_string())
}

/// Rejects a private meeting's results for viewers limited to their own
/// response who have none.
pub fn ensure_own_results(access: ResultsAccess, has_own_response: bool) -> MeetResult<()> {
    match access {
        ResultsAccess::OwnOnly if !has_own_response => Err(results_forbidden()),
        _ => Ok(()),
    }
}

/// A single response is readable when results are open, otherwise only by
/// its owner: the account that wrote it, or the guest holding its edit token.
pub fn ensure_can_read_response(
    access: ResultsAccess,
    viewer: Option<&Viewer>,
    owner: Option<Uuid>,
    holds_edit_token: bool,
) -> MeetResult<()> {
    if access == ResultsAccess::All {
        return Ok(());
    }
    let is_owner = match owner {
        Some(owner) => viewer.is_some_and(|viewer| viewer.user_id == owner),
        None => holds_edit_token,
    };
    if is_owner {
        Ok(())
    } else {
        Err(results_forbidden())
    }
}

/// Guests change a response only with the edit token issued when it was
/// created; account responses are changed by signing in.
pub fn ensure_can_edit_guest_response(owner: Option<Uuid>, holds_edit_token: bool) -> MeetResult<()> {
    if owner.is_some() {
        return Err(MeetError::Authorization(
            "This response belongs to an account; sign in to change it".to_string(),
        ));
    }
    if !holds_edit_token {
        return Err(MeetError::Authorization(
            "A valid edit token is required to change this response".to_string(),
        ));
    }
    Ok(())
}
