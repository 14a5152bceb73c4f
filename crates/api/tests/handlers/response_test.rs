use axum::http::{Method, StatusCode};
use chrono::Utc;
use meetgrid_api::middleware::auth::hash_password;
use meetgrid_db::{
    models::{DbResponse, DbResponseWithSlots},
    repositories::response::ResponseTarget,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{db_meeting, db_response, db_user, send, TestContext, SHARE_LINK};

fn responses_uri() -> String {
    format!("/api/meetings/{}/responses", SHARE_LINK)
}

fn grid_uri() -> String {
    format!("/api/meetings/{}/grid", SHARE_LINK)
}

fn saved(meeting_id: Uuid, name: &str, user_id: Option<Uuid>) -> DbResponse {
    DbResponse {
        id: Uuid::new_v4(),
        meeting_id,
        name: name.to_string(),
        user_id,
        edit_token_hash: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test_log::test(tokio::test)]
async fn test_guest_submission_dedupes_slots() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let response = saved(meeting_id, "Alice", None);
    let response_id = response.id;
    ctx.store
        .expect_save_response()
        .withf(move |id, target, user_id, name, hash, slots| {
            *id == meeting_id
                && *target == ResponseTarget::New
                && user_id.is_none()
                && name == "Alice"
                && hash.as_deref().is_some_and(|h| h.starts_with("$argon2"))
                && slots.len() == 2
                && slots[0].start_time.to_string() == "09:00"
        })
        .times(1)
        .returning(move |_, _, _, _, _, _| Ok(response.clone()));

    let (status, body) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({
            "guest_name": " Alice ",
            "slots": [
                { "date": "2024-01-01", "start_time": "09:30", "end_time": "10:00" },
                { "date": "2024-01-01", "start_time": "09:00", "end_time": "09:30" },
                { "date": "2024-01-01", "start_time": "09:00", "end_time": "09:30" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["response_id"], json!(response_id));
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["slot_count"], 2);
    assert_eq!(body["edit_token"].as_str().map(str::len), Some(32));
}

#[tokio::test]
async fn test_guest_submission_requires_name() {
    let mut ctx = TestContext::new();
    ctx.with_meeting(&db_meeting(None), &[]);

    let (status, body) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({ "guest_name": "   ", "slots": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error: Guest name is required");
}

#[tokio::test]
async fn test_slot_outside_grid_rejected() {
    let mut ctx = TestContext::new();
    ctx.with_meeting(&db_meeting(None), &[]);

    let (status, _) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({
            "guest_name": "Bob",
            "slots": [{ "date": "2024-01-01", "start_time": "10:00", "end_time": "10:30" }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_in_submission_replaces_own_response() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let user = db_user();
    let user_id = user.id;
    let display_name = format!("{} {}", user.first_name, user.last_name);
    let token = ctx.sign_in(&user);

    let existing = db_response(meeting_id, &display_name, Some(user_id), &[("2024-01-02", 540)]);
    let existing_id = existing.response.id;
    ctx.store
        .expect_get_response_by_user()
        .withf(move |m, u| *m == meeting_id && *u == user_id)
        .returning(move |_, _| Ok(Some(existing.clone())));

    let mut updated = saved(meeting_id, &display_name, Some(user_id));
    updated.id = existing_id;
    let expected_name = display_name.clone();
    ctx.store
        .expect_save_response()
        .withf(move |_, target, uid, name, hash, slots| {
            *target == ResponseTarget::Existing(existing_id)
                && *uid == Some(user_id)
                && name == expected_name
                && hash.is_none()
                && slots.is_empty()
        })
        .times(1)
        .returning(move |_, _, _, _, _, _| Ok(updated.clone()));

    // a guest name sent by a signed-in user is ignored
    let (status, body) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        Some(token),
        Some(json!({ "guest_name": "Someone else", "slots": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["response_id"], json!(existing_id));
    assert_eq!(body["name"], json!(display_name));
    assert!(body.get("edit_token").is_none());
}

#[tokio::test]
async fn test_guest_cannot_edit_account_response() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let owned = db_response(meeting_id, "Carol", Some(Uuid::new_v4()), &[]);
    let owned_id = owned.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(owned.clone())));

    let (status, _) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({ "guest_name": "Carol", "response_id": owned_id, "slots": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guest_edits_unknown_response() {
    let mut ctx = TestContext::new();
    ctx.with_meeting(&db_meeting(None), &[]);
    ctx.store.expect_get_response().returning(|_, _| Ok(None));

    let (status, _) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({ "guest_name": "Dan", "response_id": Uuid::new_v4(), "slots": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_same_name_guests_stay_distinct() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let rows = vec![
        db_response(meeting_id, "Sam", None, &[("2024-01-01", 540)]),
        db_response(meeting_id, "Sam", None, &[("2024-01-02", 570)]),
    ];
    ctx.store
        .expect_list_responses()
        .returning(move |_| Ok(rows.clone()));

    let (status, body) = send(ctx.app(), Method::GET, &responses_uri(), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"].as_array().unwrap().len(), 2);
    assert_eq!(body["can_view_all_results"], true);
    assert_eq!(body["user_response_only"], false);
    assert_eq!(body["responses"][1]["slots"][0]["start_time"], "09:30");
}

/// Dates 2024-01-01..02, window 09:00-10:00; A is free at 09:00 both days,
/// B at 09:00 and 09:30 on the first day.
#[test_log::test(tokio::test)]
async fn test_grid_aggregates_responses() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let rows = vec![
        db_response(meeting_id, "A", None, &[("2024-01-01", 540), ("2024-01-02", 540)]),
        db_response(meeting_id, "B", None, &[("2024-01-01", 540), ("2024-01-01", 570)]),
    ];
    ctx.store
        .expect_list_responses()
        .returning(move |_| Ok(rows.clone()));

    let (status, body) = send(ctx.app(), Method::GET, &grid_uri(), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dates"], json!(["2024-01-01", "2024-01-02"]));
    assert_eq!(body["times"], json!(["09:00", "09:30"]));
    assert_eq!(body["response_count"], 2);

    // rows[time][date]
    let cell = |t: usize, d: usize| &body["rows"][t][d];
    assert_eq!(cell(0, 0)["count"], 2);
    assert_eq!(cell(0, 0)["ratio"], 1.0);
    assert_eq!(cell(0, 0)["names"], json!(["A", "B"]));
    assert_eq!(cell(1, 0)["count"], 1);
    assert_eq!(cell(1, 0)["ratio"], 0.5);
    assert_eq!(cell(0, 1)["count"], 1);
    assert_eq!(cell(1, 1)["count"], 0);
    assert_eq!(cell(1, 1)["names"], json!([]));

    assert_eq!(
        body["best_slots"],
        json!([{ "date": "2024-01-01", "time": "09:00" }])
    );
}

#[tokio::test]
async fn test_grid_without_responses() {
    let mut ctx = TestContext::new();
    ctx.with_meeting(&db_meeting(None), &[]);
    ctx.store.expect_list_responses().returning(|_| Ok(vec![]));

    let (status, body) = send(ctx.app(), Method::GET, &grid_uri(), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response_count"], 0);
    assert_eq!(body["rows"][0][0]["ratio"], 0.0);
    assert_eq!(body["best_slots"], json!([]));
}

#[tokio::test]
async fn test_private_grid_hidden_from_participants() {
    let mut ctx = TestContext::new();
    let mut meeting = db_meeting(Some(Uuid::new_v4()));
    meeting.is_private = true;
    ctx.with_meeting(&meeting, &[]);
    let token = ctx.sign_in(&db_user());

    let (status, _) = send(ctx.app(), Method::GET, &grid_uri(), Some(token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_private_listing_shows_own_response_only() {
    let mut ctx = TestContext::new();
    let mut meeting = db_meeting(Some(Uuid::new_v4()));
    meeting.is_private = true;
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let user = db_user();
    let user_id = user.id;
    let token = ctx.sign_in(&user);
    let own = db_response(meeting_id, "Me", Some(user_id), &[("2024-01-01", 540)]);
    ctx.store
        .expect_get_response_by_user()
        .withf(move |_, u| *u == user_id)
        .returning(move |_, _| Ok(Some(own.clone())));

    let (status, body) = send(ctx.app(), Method::GET, &responses_uri(), Some(token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"].as_array().unwrap().len(), 1);
    assert_eq!(body["responses"][0]["name"], "Me");
    assert_eq!(body["user_response_only"], true);
    assert_eq!(body["can_view_all_results"], false);
}

#[tokio::test]
async fn test_creator_sees_private_grid() {
    let mut ctx = TestContext::new();
    let creator = db_user();
    let mut meeting = db_meeting(Some(creator.id));
    meeting.is_private = true;
    ctx.with_meeting(&meeting, &[]);
    let token = ctx.sign_in(&creator);
    ctx.store.expect_list_responses().returning(|_| Ok(vec![]));

    let (status, _) = send(ctx.app(), Method::GET, &grid_uri(), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_single_response_by_id() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let row = db_response(meeting_id, "Guest", None, &[("2024-01-02", 570)]);
    let row_id = row.response.id;
    ctx.store
        .expect_get_response()
        .withf(move |m, r| *m == meeting_id && *r == row_id)
        .returning(move |_, _| Ok(Some(row.clone())));

    let (status, body) = send(
        ctx.app(),
        Method::GET,
        &format!("{}?response_id={}", responses_uri(), row_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"][0]["id"], json!(row_id));
    assert_eq!(
        body["responses"][0]["slots"],
        json!([{ "date": "2024-01-02", "start_time": "09:30", "end_time": "10:00" }])
    );
}

fn guest_with_token(meeting_id: Uuid, name: &str, token: &str) -> DbResponseWithSlots {
    let mut row = db_response(meeting_id, name, None, &[("2024-01-01", 540)]);
    row.response.edit_token_hash = Some(hash_password(token).unwrap());
    row
}

fn private_meeting() -> meetgrid_db::models::DbMeeting {
    let mut meeting = db_meeting(Some(Uuid::new_v4()));
    meeting.is_private = true;
    meeting
}

#[rstest]
#[case::no_token(None)]
#[case::wrong_token(Some("not-the-token"))]
#[tokio::test]
async fn test_guest_overwrite_needs_edit_token(#[case] edit_token: Option<&str>) {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let victim = guest_with_token(meeting_id, "Vera", "vera-secret");
    let victim_id = victim.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(victim.clone())));
    ctx.store.expect_save_response().never();

    let (status, _) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({
            "guest_name": "Mallory",
            "response_id": victim_id,
            "edit_token": edit_token,
            "slots": []
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guest_updates_with_edit_token() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let own = guest_with_token(meeting_id, "Vera", "vera-secret");
    let own_id = own.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(own.clone())));

    let updated = saved(meeting_id, "Vera K", None);
    ctx.store
        .expect_save_response()
        .withf(move |_, target, _, name, hash, _| {
            *target == ResponseTarget::Existing(own_id) && name == "Vera K" && hash.is_none()
        })
        .times(1)
        .returning(move |_, _, _, _, _, _| Ok(updated.clone()));

    let (status, body) = send(
        ctx.app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({
            "guest_name": "Vera K",
            "response_id": own_id,
            "edit_token": "vera-secret",
            "slots": []
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("edit_token").is_none());
}

#[tokio::test]
async fn test_listing_never_exposes_edit_token() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let rows = vec![guest_with_token(meeting_id, "Vera", "vera-secret")];
    ctx.store
        .expect_list_responses()
        .returning(move |_| Ok(rows.clone()));

    let (status, body) = send(ctx.app(), Method::GET, &responses_uri(), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains("edit_token"));
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_private_response_by_id_hidden_from_anonymous() {
    let mut ctx = TestContext::new();
    let meeting = private_meeting();
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let account_row = db_response(meeting_id, "Alice Account", Some(Uuid::new_v4()), &[("2024-01-01", 540)]);
    let row_id = account_row.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(account_row.clone())));

    let (status, body) = send(
        ctx.app(),
        Method::GET,
        &format!("{}?response_id={}", responses_uri(), row_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("responses").is_none());
}

#[tokio::test]
async fn test_private_response_by_id_hidden_from_other_user() {
    let mut ctx = TestContext::new();
    let meeting = private_meeting();
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);
    let token = ctx.sign_in(&db_user());

    let account_row = db_response(meeting_id, "Alice Account", Some(Uuid::new_v4()), &[]);
    let row_id = account_row.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(account_row.clone())));

    let (status, _) = send(
        ctx.app(),
        Method::GET,
        &format!("{}?response_id={}", responses_uri(), row_id),
        Some(token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_private_guest_reads_back_own_response() {
    let mut ctx = TestContext::new();
    let meeting = private_meeting();
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);

    let own = guest_with_token(meeting_id, "Vera", "vera-secret");
    let own_id = own.response.id;
    ctx.store
        .expect_get_response()
        .returning(move |_, _| Ok(Some(own.clone())));

    let (status, body) = send(
        ctx.app(),
        Method::GET,
        &format!("{}?response_id={}&edit_token=vera-secret", responses_uri(), own_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"][0]["name"], "Vera");
    assert_eq!(body["can_view_all_results"], false);
}

#[rstest]
#[case::anonymous(false)]
#[case::signed_in(true)]
#[tokio::test]
async fn test_private_listing_without_own_response_forbidden(#[case] signed_in: bool) {
    let mut ctx = TestContext::new();
    let meeting = private_meeting();
    ctx.with_meeting(&meeting, &[]);
    let token = signed_in.then(|| ctx.sign_in(&db_user()));
    ctx.store
        .expect_get_response_by_user()
        .returning(|_, _| Ok(None));

    let (status, body) = send(ctx.app(), Method::GET, &responses_uri(), token, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Authorization error: Only the creator can view results for this meeting"
    );
}

#[rstest]
#[case::short_hour(json!({ "date": "2024-01-01", "start_time": "9:00", "end_time": "09:30" }))]
#[case::past_midnight(json!({ "date": "2024-01-01", "start_time": "25:00", "end_time": "25:30" }))]
#[case::off_boundary(json!({ "date": "2024-01-01", "start_time": "09:15", "end_time": "09:45" }))]
#[case::long_span(json!({ "date": "2024-01-01", "start_time": "09:00", "end_time": "10:00" }))]
#[tokio::test]
async fn test_malformed_slot_rejected_at_boundary(#[case] slot: Value) {
    let (status, _) = send(
        TestContext::new().app(),
        Method::POST,
        &responses_uri(),
        None,
        Some(json!({ "guest_name": "Eve", "slots": [slot] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
