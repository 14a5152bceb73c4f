use axum::http::{Method, StatusCode};
use meetgrid_core::slots::SlotTime;
use meetgrid_db::models::{DbMeetingWithCount, DbRespondedMeeting};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{db_meeting, db_user, send, TestContext, SHARE_LINK};

fn meeting_body() -> Value {
    json!({
        "title": "  Planning  ",
        "start_date": "2024-01-01",
        "end_date": "2024-01-02",
        "start_time": "09:00",
        "end_time": "10:00"
    })
}

#[test_log::test(tokio::test)]
async fn test_anonymous_create_public_meeting() {
    let mut ctx = TestContext::new();
    let stored = db_meeting(None);
    let stored_id = stored.id;

    ctx.store
        .expect_create_meeting()
        .withf(|draft, creator| {
            draft.title == "Planning"
                && creator.is_none()
                && draft.time_window.map(|w| w.end()) == Some(SlotTime::from_hm(10, 0).unwrap())
        })
        .times(1)
        .returning(move |_, _| Ok(stored.clone()));

    let (status, body) = send(ctx.app(), Method::POST, "/api/meetings", None, Some(meeting_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": stored_id, "share_link": SHARE_LINK }));
}

#[tokio::test]
async fn test_inclusive_boundary_extends_window() {
    let mut ctx = TestContext::new();
    let user = db_user();
    let user_id = user.id;
    let token = ctx.sign_in(&user);
    let stored = db_meeting(Some(user_id));

    ctx.store
        .expect_create_meeting()
        .withf(move |draft, creator| {
            *creator == Some(user_id)
                && draft.time_window.map(|w| w.end()) == Some(SlotTime::from_hm(10, 30).unwrap())
        })
        .returning(move |_, _| Ok(stored.clone()));

    let mut body = meeting_body();
    body["time_boundary"] = json!("inclusive");
    let (status, _) = send(ctx.app(), Method::POST, "/api/meetings", Some(token), Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_anonymous_private_meeting_requires_sign_in() {
    let mut body = meeting_body();
    body["is_private"] = json!(true);

    let (status, _) = send(TestContext::new().app(), Method::POST, "/api/meetings", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case::too_long("2024-01-01", "2024-01-15")]
#[case::inverted("2024-01-05", "2024-01-01")]
#[tokio::test]
async fn test_invalid_date_range_rejected(#[case] start: &str, #[case] end: &str) {
    let mut body = meeting_body();
    body["start_date"] = json!(start);
    body["end_date"] = json!(end);

    let (status, body) = send(TestContext::new().app(), Method::POST, "/api/meetings", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Validation error: Meeting duration must be between 1 and 14 days"
    );
}

#[tokio::test]
async fn test_unknown_share_link() {
    let mut ctx = TestContext::new();
    ctx.store
        .expect_get_meeting_by_share_link()
        .returning(|_| Ok(None));

    let (status, _) = send(ctx.app(), Method::GET, "/api/meetings/missing1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_public_meeting() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(None);
    ctx.with_meeting(&meeting, &[]);

    let (status, body) = send(
        ctx.app(),
        Method::GET,
        &format!("/api/meetings/{}", SHARE_LINK),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meeting"]["title"], "Team sync");
    assert_eq!(body["meeting"]["start_time"], "09:00");
    assert_eq!(body["meeting"]["end_time"], "10:00");
    assert_eq!(body["invites"], json!([]));
}

#[tokio::test]
async fn test_invite_only_meeting_anonymous() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(Some(Uuid::new_v4()));
    ctx.with_meeting(&meeting, &["guest@example.com"]);

    let (status, _) = send(
        ctx.app(),
        Method::GET,
        &format!("/api/meetings/{}", SHARE_LINK),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invite_only_meeting_uninvited_user() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(Some(Uuid::new_v4()));
    ctx.with_meeting(&meeting, &["guest@example.com"]);
    let mut outsider = db_user();
    outsider.email = "outsider@example.com".to_string();
    let token = ctx.sign_in(&outsider);

    let (status, _) = send(
        ctx.app(),
        Method::GET,
        &format!("/api/meetings/{}", SHARE_LINK),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invite_only_meeting_invited_user() {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(Some(Uuid::new_v4()));
    ctx.with_meeting(&meeting, &["guest@example.com"]);
    let mut invited = db_user();
    invited.email = "Guest@Example.com".to_string();
    let token = ctx.sign_in(&invited);

    let (status, body) = send(
        ctx.app(),
        Method::GET,
        &format!("/api/meetings/{}", SHARE_LINK),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invites"], json!([{ "email": "guest@example.com" }]));
}

#[rstest]
#[case::anonymous(false, StatusCode::UNAUTHORIZED)]
#[case::other_user(true, StatusCode::FORBIDDEN)]
#[tokio::test]
async fn test_only_creator_updates(#[case] signed_in: bool, #[case] expected: StatusCode) {
    let mut ctx = TestContext::new();
    let meeting = db_meeting(Some(Uuid::new_v4()));
    ctx.with_meeting(&meeting, &[]);
    let token = signed_in.then(|| ctx.sign_in(&db_user()));

    let (status, _) = send(
        ctx.app(),
        Method::PUT,
        &format!("/api/meetings/{}", SHARE_LINK),
        token,
        Some(meeting_body()),
    )
    .await;
    assert_eq!(status, expected);
}

#[tokio::test]
async fn test_creator_updates_meeting() {
    let mut ctx = TestContext::new();
    let creator = db_user();
    let meeting = db_meeting(Some(creator.id));
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);
    let token = ctx.sign_in(&creator);

    let updated = meeting.clone();
    ctx.store
        .expect_update_meeting()
        .withf(move |id, draft| {
            *id == meeting_id && draft.invited_emails == vec!["a@example.com".to_string()]
        })
        .times(1)
        .returning(move |_, _| Ok(updated.clone()));

    let mut body = meeting_body();
    body["invited_emails"] = json!(["A@example.com", "a@example.com "]);
    let (status, body) = send(
        ctx.app(),
        Method::PUT,
        &format!("/api/meetings/{}", SHARE_LINK),
        Some(token),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(meeting_id));
}

#[tokio::test]
async fn test_creator_deletes_meeting() {
    let mut ctx = TestContext::new();
    let creator = db_user();
    let meeting = db_meeting(Some(creator.id));
    let meeting_id = meeting.id;
    ctx.with_meeting(&meeting, &[]);
    let token = ctx.sign_in(&creator);
    ctx.store
        .expect_delete_meeting()
        .withf(move |id| *id == meeting_id)
        .times(1)
        .returning(|_| Ok(()));

    let (status, _) = send(
        ctx.app(),
        Method::DELETE,
        &format!("/api/meetings/{}", SHARE_LINK),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_dashboard_lists_created_and_responded() {
    let mut ctx = TestContext::new();
    let user = db_user();
    let user_id = user.id;
    let token = ctx.sign_in(&user);

    let created = db_meeting(Some(user_id));
    let responded = db_meeting(Some(Uuid::new_v4()));
    let response_id = Uuid::new_v4();

    ctx.store
        .expect_list_meetings_by_creator()
        .withf(move |id| *id == user_id)
        .returning(move |_| {
            Ok(vec![DbMeetingWithCount {
                meeting: created.clone(),
                response_count: 3,
            }])
        });
    ctx.store
        .expect_list_meetings_responded()
        .withf(move |id| *id == user_id)
        .returning(move |_| {
            Ok(vec![DbRespondedMeeting {
                meeting: responded.clone(),
                response_id,
            }])
        });

    let (status, body) = send(ctx.app(), Method::GET, "/api/meetings", Some(token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"][0]["response_count"], 3);
    assert_eq!(body["created"][0]["title"], "Team sync");
    assert_eq!(body["responded"][0]["response_id"], json!(response_id));
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let (status, _) = send(TestContext::new().app(), Method::GET, "/api/meetings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
