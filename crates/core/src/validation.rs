//! Input validation for data entering the service.
//!
//! Every request is checked here before it reaches storage or the
//! aggregator; failures are [`MeetError::Validation`] with a message that is
//! safe to show the submitter.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::{
    aggregate::Grid,
    errors::{MeetError, MeetResult},
    models::{
        meeting::{CreateMeetingRequest, MeetingDraft},
        user::RegisterRequest,
    },
    slots::{days_inclusive, Boundary, SlotTime, TimeSlot, TimeWindow},
};

/// Longest poll a meeting may span, in days
pub const MAX_MEETING_DAYS: i64 = 14;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_title(title: &str) -> MeetResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(MeetError::Validation(
            "A meeting name must be provided".to_string(),
        ));
    }
    Ok(title.to_string())
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> MeetResult<()> {
    let days = days_inclusive(start, end);
    if days < 1 || days > MAX_MEETING_DAYS {
        return Err(MeetError::Validation(format!(
            "Meeting duration must be between 1 and {} days",
            MAX_MEETING_DAYS
        )));
    }
    Ok(())
}

/// Both ends or neither: a missing window means the full day.
pub fn validate_window(
    start: Option<SlotTime>,
    end: Option<SlotTime>,
    boundary: Boundary,
) -> MeetResult<Option<TimeWindow>> {
    match (start, end) {
        (Some(start), Some(end)) => TimeWindow::new(start, end, boundary).map(Some),
        (None, None) => Ok(None),
        _ => Err(MeetError::Validation(
            "start_time and end_time must be provided together".to_string(),
        )),
    }
}

pub fn normalize_email(email: &str) -> MeetResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(MeetError::Validation(format!(
            "Invalid e-mail address '{}'",
            email
        )));
    }
    Ok(email)
}

/// Lower-cases, trims and de-duplicates invite addresses, keeping first-seen order.
pub fn normalize_invites(emails: &[String]) -> MeetResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut invites = Vec::with_capacity(emails.len());
    for email in emails {
        let email = normalize_email(email)?;
        if seen.insert(email.clone()) {
            invites.push(email);
        }
    }
    Ok(invites)
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn validate_meeting(request: &CreateMeetingRequest) -> MeetResult<MeetingDraft> {
    let title = validate_title(&request.title)?;
    validate_date_range(request.start_date, request.end_date)?;
    let time_window = validate_window(request.start_time, request.end_time, request.time_boundary)?;
    let invited_emails = normalize_invites(&request.invited_emails)?;

    Ok(MeetingDraft {
        title,
        description: optional_text(request.description.as_deref()),
        location: optional_text(request.location.as_deref()),
        start_date: request.start_date,
        end_date: request.end_date,
        time_window,
        is_private: request.is_private,
        invited_emails,
    })
}

pub fn validate_guest_name(name: Option<&str>) -> MeetResult<String> {
    optional_text(name).ok_or_else(|| MeetError::Validation("Guest name is required".to_string()))
}

/// Rejects slots outside the meeting grid and collapses duplicates.
/// The result is ordered by date, then time.
pub fn validate_slots(slots: &[TimeSlot], grid: &Grid) -> MeetResult<Vec<TimeSlot>> {
    let mut keys = BTreeSet::new();
    for slot in slots {
        let key = slot.key();
        if !grid.contains(&key) {
            return Err(MeetError::Validation(format!(
                "Slot {} {} is outside the meeting's dates or time window",
                slot.date, slot.start_time
            )));
        }
        keys.insert(key);
    }
    Ok(keys.into_iter().map(TimeSlot::from).collect())
}

/// Validated registration fields: `(email, first_name, last_name)`.
pub fn validate_registration(request: &RegisterRequest) -> MeetResult<(String, String, String)> {
    let email = normalize_email(&request.email)?;
    let first_name = optional_text(Some(request.first_name.as_str()))
        .ok_or_else(|| MeetError::Validation("First name is required".to_string()))?;
    let last_name = optional_text(Some(request.last_name.as_str()))
        .ok_or_else(|| MeetError::Validation("Last name is required".to_string()))?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(MeetError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok((email, first_name, last_name))
}

