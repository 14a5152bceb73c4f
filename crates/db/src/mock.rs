use async_trait::async_trait;
use chrono::Duration;
use meetgrid_core::{models::meeting::MeetingDraft, slots::TimeSlot};
use mockall::mock;
use uuid::Uuid;

use crate::{
    models::{
        DbMeeting, DbMeetingInvite, DbMeetingWithCount, DbRespondedMeeting, DbResponse,
        DbResponseWithSlots, DbSession, DbUser,
    },
    repositories::response::ResponseTarget,
    store::Store,
};

// Mock store for testing
mock! {
    pub Store {}

    #[async_trait]
    impl Store for Store {
        async fn create_user(
            &self,
            email: &str,
            first_name: &str,
            last_name: &str,
            password_hash: &str,
        ) -> eyre::Result<DbUser>;
        async fn get_user_by_email(&self, email: &str) -> eyre::Result<Option<DbUser>>;
        async fn verify_credentials(&self, email: &str, password: &str) -> eyre::Result<Option<DbUser>>;
        async fn create_session(&self, user_id: Uuid, ttl: Duration) -> eyre::Result<DbSession>;
        async fn get_session_user(&self, token: Uuid) -> eyre::Result<Option<DbUser>>;
        async fn delete_session(&self, token: Uuid) -> eyre::Result<()>;

        async fn create_meeting(&self, draft: &MeetingDraft, creator_id: Option<Uuid>) -> eyre::Result<DbMeeting>;
        async fn get_meeting_by_share_link(&self, share_link: &str) -> eyre::Result<Option<DbMeeting>>;
        async fn get_invites(&self, meeting_id: Uuid) -> eyre::Result<Vec<DbMeetingInvite>>;
        async fn update_meeting(&self, id: Uuid, draft: &MeetingDraft) -> eyre::Result<DbMeeting>;
        async fn delete_meeting(&self, id: Uuid) -> eyre::Result<()>;
        async fn list_meetings_by_creator(&self, creator_id: Uuid) -> eyre::Result<Vec<DbMeetingWithCount>>;
        async fn list_meetings_responded(&self, user_id: Uuid) -> eyre::Result<Vec<DbRespondedMeeting>>;

        async fn save_response(
            &self,
            meeting_id: Uuid,
            target: ResponseTarget,
            user_id: Option<Uuid>,
            name: &str,
            edit_token_hash: Option<String>,
            slots: &[TimeSlot],
        ) -> eyre::Result<DbResponse>;
        async fn get_response(&self, meeting_id: Uuid, response_id: Uuid) -> eyre::Result<Option<DbResponseWithSlots>>;
        async fn get_response_by_user(&self, meeting_id: Uuid, user_id: Uuid) -> eyre::Result<Option<DbResponseWithSlots>>;
        async fn list_responses(&self, meeting_id: Uuid) -> eyre::Result<Vec<DbResponseWithSlots>>;
    }
}
