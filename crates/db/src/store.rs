//! Storage seam used by the HTTP layer.
//!
//! [`PgStore`] forwards to the repository functions; tests substitute
//! [`crate::mock::MockStore`].

use async_trait::async_trait;
use chrono::Duration;
use eyre::Result;
use meetgrid_core::{models::meeting::MeetingDraft, slots::TimeSlot};
use uuid::Uuid;

use crate::{
    models::{
        DbMeeting, DbMeetingInvite, DbMeetingWithCount, DbRespondedMeeting, DbResponse,
        DbResponseWithSlots, DbSession, DbUser,
    },
    repositories::{self, response::ResponseTarget},
    DbPool,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<DbUser>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>>;
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<DbUser>>;
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<DbSession>;
    async fn get_session_user(&self, token: Uuid) -> Result<Option<DbUser>>;
    async fn delete_session(&self, token: Uuid) -> Result<()>;

    async fn create_meeting(&self, draft: &MeetingDraft, creator_id: Option<Uuid>) -> Result<DbMeeting>;
    async fn get_meeting_by_share_link(&self, share_link: &str) -> Result<Option<DbMeeting>>;
    async fn get_invites(&self, meeting_id: Uuid) -> Result<Vec<DbMeetingInvite>>;
    async fn update_meeting(&self, id: Uuid, draft: &MeetingDraft) -> Result<DbMeeting>;
    async fn delete_meeting(&self, id: Uuid) -> Result<()>;
    async fn list_meetings_by_creator(&self, creator_id: Uuid) -> Result<Vec<DbMeetingWithCount>>;
    async fn list_meetings_responded(&self, user_id: Uuid) -> Result<Vec<DbRespondedMeeting>>;

    async fn save_response(
        &self,
        meeting_id: Uuid,
        target: ResponseTarget,
        user_id: Option<Uuid>,
        name: &str,
        edit_token_hash: Option<String>,
        slots: &[TimeSlot],
    ) -> Result<DbResponse>;
    async fn get_response(&self, meeting_id: Uuid, response_id: Uuid) -> Result<Option<DbResponseWithSlots>>;
    async fn get_response_by_user(&self, meeting_id: Uuid, user_id: Uuid) -> Result<Option<DbResponseWithSlots>>;
    async fn list_responses(&self, meeting_id: Uuid) -> Result<Vec<DbResponseWithSlots>>;
}

/// PostgreSQL-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<DbUser> {
        repositories::user::create_user(&self.pool, email, first_name, last_name, password_hash).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>> {
        repositories::user::get_user_by_email(&self.pool, email).await
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<DbUser>> {
        repositories::user::verify_credentials(&self.pool, email, password).await
    }

    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<DbSession> {
        repositories::user::create_session(&self.pool, user_id, ttl).await
    }

    async fn get_session_user(&self, token: Uuid) -> Result<Option<DbUser>> {
        repositories::user::get_session_user(&self.pool, token).await
    }

    async fn delete_session(&self, token: Uuid) -> Result<()> {
        repositories::user::delete_session(&self.pool, token).await
    }

    async fn create_meeting(&self, draft: &MeetingDraft, creator_id: Option<Uuid>) -> Result<DbMeeting> {
        repositories::meeting::create_meeting(&self.pool, draft, creator_id).await
    }

    async fn get_meeting_by_share_link(&self, share_link: &str) -> Result<Option<DbMeeting>> {
        repositories::meeting::get_meeting_by_share_link(&self.pool, share_link).await
    }

    async fn get_invites(&self, meeting_id: Uuid) -> Result<Vec<DbMeetingInvite>> {
        repositories::meeting::get_invites(&self.pool, meeting_id).await
    }

    async fn update_meeting(&self, id: Uuid, draft: &MeetingDraft) -> Result<DbMeeting> {
        repositories::meeting::update_meeting(&self.pool, id, draft).await
    }

    async fn delete_meeting(&self, id: Uuid) -> Result<()> {
        repositories::meeting::delete_meeting(&self.pool, id).await
    }

    async fn list_meetings_by_creator(&self, creator_id: Uuid) -> Result<Vec<DbMeetingWithCount>> {
        repositories::meeting::list_meetings_by_creator(&self.pool, creator_id).await
    }

    async fn list_meetings_responded(&self, user_id: Uuid) -> Result<Vec<DbRespondedMeeting>> {
        repositories::meeting::list_meetings_responded(&self.pool, user_id).await
    }

    async fn save_response(
        &self,
        meeting_id: Uuid,
        target: ResponseTarget,
        user_id: Option<Uuid>,
        name: &str,
        edit_token_hash: Option<String>,
        slots: &[TimeSlot],
    ) -> Result<DbResponse> {
        repositories::response::save_response(&self.pool, meeting_id, target, user_id, name, edit_token_hash.as_deref(), slots)
            .await
    }

    async fn get_response(&self, meeting_id: Uuid, response_id: Uuid) -> Result<Option<DbResponseWithSlots>> {
        repositories::response::get_response(&self.pool, meeting_id, response_id).await
    }

    async fn get_response_by_user(&self, meeting_id: Uuid, user_id: Uuid) -> Result<Option<DbResponseWithSlots>> {
        repositories::response::get_response_by_user(&self.pool, meeting_id, user_id).await
    }

    async fn list_responses(&self, meeting_id: Uuid) -> Result<Vec<DbResponseWithSlots>> {
        repositories::response::list_responses(&self.pool, meeting_id).await
    }
}
