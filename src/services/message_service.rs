use chrono::Duration;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{FieldErrors, ServiceError, ServiceResult};
use crate::database::{paths, Direction, DocumentStore, Query, Repository, TenantScope};
use crate::identity::TenantContext;
use crate::models::message::Message;
use crate::models::registry::{GuardianRecord, StaffRecord};
use crate::types::{timestamp, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub child_cnp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
    #[serde(default)]
    pub subject: Option<String>,
}

pub struct MessageService {
    store: Arc<dyn DocumentStore>,
    scope: TenantScope,
    ctx: TenantContext,
    messages: Repository<Message>,
}

impl MessageService {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: TenantContext) -> ServiceResult<Self> {
        let scope = ctx.scope()?;
        let messages = Repository::new(scope.messages()?, store.clone());
        Ok(Self { store, scope, ctx, messages })
    }

    /// Role of a recipient inside the caller's location, if they belong to it.
    async fn recipient_role(&self, uid: &str) -> ServiceResult<Option<Role>> {
        if uid == self.scope.organization_id() {
            return Ok(Some(Role::Owner));
        }
        let staff: Repository<StaffRecord> = Repository::new(paths::CollectionPath::root(paths::STAFF_REGISTRY)?, self.store.clone());
        if let Some(record) = staff.find(uid).await? {
            let same_location = record.organization_id == self.scope.organization_id() && record.location_id == self.scope.location_id();
            return Ok(same_location.then_some(Role::Staff));
        }
        let guardians: Repository<GuardianRecord> =
            Repository::new(paths::CollectionPath::root(paths::GUARDIAN_REGISTRY)?, self.store.clone());
        if let Some(record) = guardians.find(uid).await? {
            let same_location = record.organization_id == self.scope.organization_id() && record.location_id == self.scope.location_id();
            return Ok(same_location.then_some(Role::Guardian));
        }
        Ok(None)
    }

    /// Creates a thread root in one write: the id is generated up front and
    /// doubles as the thread id.
    pub async fn send(&self, request: NewMessage) -> ServiceResult<Message> {
        let mut errors = FieldErrors::new();
        errors.require("recipientId", &request.recipient_id);
        errors.require("subject", &request.subject);
        errors.require("body", &request.body);
        errors.finish()?;

        if request.recipient_id == self.ctx.uid() {
            return Err(ServiceError::validation("recipientId", "Cannot send a message to yourself"));
        }

        let child_cnp = match self.ctx.guardian_child() {
            Some(own) => match request.child_cnp.as_deref() {
                Some(cnp) if cnp != own => {
                    return Err(ServiceError::forbidden("Guardians may only write about their own child"));
                }
                _ => Some(own.to_string()),
            },
            None => request.child_cnp.filter(|c| !c.trim().is_empty()),
        };

        let recipient_role = self
            .recipient_role(&request.recipient_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Recipient not found in this location"))?;
        if self.ctx.is_guardian() && recipient_role == Role::Guardian {
            return Err(ServiceError::forbidden("Guardians may only write to staff"));
        }

        let id = Uuid::new_v4().to_string();
        let message = Message {
            thread_id: id.clone(),
            id,
            sender_id: self.ctx.uid().to_string(),
            sender_role: self.ctx.role(),
            sender_name: self.ctx.display_name(),
            recipient_id: request.recipient_id,
            recipient_role,
            subject: request.subject.trim().to_string(),
            body: request.body,
            child_cnp,
            read: false,
            read_at: None,
            reply_to: None,
            thread_count: 1,
            created_at: timestamp::now(),
        };
        self.messages.insert(&message.id, &message).await?;
        info!("Message {} sent to {}", message.id, message.recipient_id);
        Ok(message)
    }

    async fn find(&self, id: &str) -> ServiceResult<Message> {
        self.messages
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Message '{}' not found", id)))
    }

    /// Replies go to the other participant of the parent message. The root's
    /// `threadCount` is refreshed afterwards in a separate write.
    pub async fn reply(&self, parent_id: &str, request: ReplyRequest) -> ServiceResult<Message> {
        let mut errors = FieldErrors::new();
        errors.require("body", &request.body);
        errors.finish()?;

        let parent = self.find(parent_id).await?;
        if !parent.involves(self.ctx.uid()) {
            return Err(ServiceError::forbidden("Only thread participants may reply"));
        }

        let (recipient_id, recipient_role) = if parent.sender_id == self.ctx.uid() {
            (parent.recipient_id.clone(), parent.recipient_role)
        } else {
            (parent.sender_id.clone(), parent.sender_role)
        };
        let subject = request
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| reply_subject(&parent.subject));

        // Never earlier than the parent, so thread order stays stable under clock skew.
        let created_at = timestamp::now().max(parent.created_at + Duration::microseconds(1));

        let message = Message {
            id: Uuid::new_v4().to_string(),
            thread_id: parent.thread_id.clone(),
            sender_id: self.ctx.uid().to_string(),
            sender_role: self.ctx.role(),
            sender_name: self.ctx.display_name(),
            recipient_id,
            recipient_role,
            subject,
            body: request.body,
            child_cnp: parent.child_cnp.clone(),
            read: false,
            read_at: None,
            reply_to: Some(parent.id.clone()),
            thread_count: 0,
            created_at,
        };
        self.messages.insert(&message.id, &message).await?;

        if let Err(e) = self.refresh_thread_count(&message.thread_id).await {
            warn!("Reply {} saved but thread count of {} not updated: {}", message.id, message.thread_id, e);
        }
        Ok(message)
    }

    async fn refresh_thread_count(&self, thread_id: &str) -> ServiceResult<()> {
        let count = self.messages.list(&Query::new().where_eq("threadId", thread_id)).await?.len();
        self.messages.merge(thread_id, json!({ "threadCount": count })).await?;
        Ok(())
    }

    /// All messages of the thread containing `message_id`, oldest first.
    /// Unread messages addressed to the viewer are marked read on the way out.
    pub async fn thread(&self, message_id: &str) -> ServiceResult<Vec<Message>> {
        let message = self.find(message_id).await?;
        let query = Query::new()
            .where_eq("threadId", message.thread_id.as_str())
            .order_by("createdAt", Direction::Asc);
        let mut thread = self.messages.list(&query).await?;

        let participant = thread.iter().any(|m| m.involves(self.ctx.uid()));
        if !participant && self.ctx.role() != Role::Owner {
            return Err(ServiceError::forbidden("Only thread participants may read it"));
        }

        let now = timestamp::now();
        for m in thread.iter_mut().filter(|m| m.recipient_id == self.ctx.uid() && !m.read) {
            let patch = json!({ "read": true, "readAt": timestamp::format(&now) });
            *m = self.messages.merge(&m.id, patch).await?;
        }
        Ok(thread)
    }

    pub async fn inbox(&self) -> ServiceResult<Vec<Message>> {
        let query = Query::new()
            .where_eq("recipientId", self.ctx.uid())
            .order_by("createdAt", Direction::Desc);
        Ok(self.messages.list(&query).await?)
    }

    pub async fn sent(&self) -> ServiceResult<Vec<Message>> {
        let query = Query::new()
            .where_eq("senderId", self.ctx.uid())
            .order_by("createdAt", Direction::Desc);
        Ok(self.messages.list(&query).await?)
    }

    pub async fn unread_count(&self) -> ServiceResult<usize> {
        let query = Query::new().where_eq("recipientId", self.ctx.uid()).where_eq("read", false);
        Ok(self.messages.list(&query).await?.len())
    }
}

fn reply_subject(subject: &str) -> String {
    if subject.to_lowercase().starts_with("re:") {
        subject.to_string()
    } else {
        format!("Re: {}", subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Principal, TenantCoordinates};
    use crate::services::child_service::tests::{seeded_store, CNP};

    fn staff_ctx() -> TenantContext {
        TenantContext::new(
            Principal::new("staff-1"),
            TenantCoordinates {
                role: Role::Staff,
                organization_id: "org".into(),
                location_id: "loc".into(),
                grupa_id: Some("g1".into()),
                copil_cnp: None,
            },
        )
    }

    fn guardian_ctx() -> TenantContext {
        TenantContext::new(
            Principal::new("parent-1"),
            TenantCoordinates {
                role: Role::Guardian,
                organization_id: "org".into(),
                location_id: "loc".into(),
                grupa_id: None,
                copil_cnp: Some(CNP.into()),
            },
        )
    }

    async fn store() -> Arc<dyn DocumentStore> {
        let store = seeded_store().await;
        store
            .set(
                &paths::staff_record("staff-1").unwrap(),
                json!({"organizationId": "org", "locationId": "loc", "name": "Ioana", "email": "i@x.ro"}),
            )
            .await
            .unwrap();
        store
            .set(
                &paths::guardian_record("parent-1").unwrap(),
                json!({"organizationId": "org", "locationId": "loc", "copilCnp": CNP, "name": "Mihai", "email": "m@x.ro"}),
            )
            .await
            .unwrap();
        store
    }

    fn new_message(to: &str) -> NewMessage {
        NewMessage {
            recipient_id: to.into(),
            subject: "Excursie".into(),
            body: "Vineri mergem la grădina botanică.".into(),
            child_cnp: Some(CNP.into()),
        }
    }

    #[tokio::test]
    async fn root_message_is_its_own_thread() {
        let staff = MessageService::new(store().await, staff_ctx()).unwrap();
        let root = staff.send(new_message("parent-1")).await.unwrap();
        assert_eq!(root.thread_id, root.id);
        assert!(root.is_root());
        assert_eq!(root.recipient_role, Role::Guardian);
    }

    #[tokio::test]
    async fn thread_is_ordered_and_reachable_from_any_message() {
        let store = store().await;
        let staff = MessageService::new(store.clone(), staff_ctx()).unwrap();
        let guardian = MessageService::new(store.clone(), guardian_ctx()).unwrap();

        let m1 = staff.send(new_message("parent-1")).await.unwrap();
        let m2 = guardian.reply(&m1.id, ReplyRequest { body: "Mulțumim!".into(), subject: None }).await.unwrap();
        assert_eq!(m2.thread_id, m1.id);
        assert_eq!(m2.reply_to.as_deref(), Some(m1.id.as_str()));
        assert_eq!(m2.recipient_id, "staff-1");
        assert_eq!(m2.subject, "Re: Excursie");

        for id in [&m1.id, &m2.id] {
            let ids: Vec<_> = staff.thread(id).await.unwrap().into_iter().map(|m| m.id).collect();
            assert_eq!(ids, vec![m1.id.clone(), m2.id.clone()]);
        }

        let root = staff.thread(&m1.id).await.unwrap().remove(0);
        assert_eq!(root.thread_count, 2);
    }

    #[tokio::test]
    async fn read_flag_flips_once_for_the_recipient() {
        let store = store().await;
        let staff = MessageService::new(store.clone(), staff_ctx()).unwrap();
        let guardian = MessageService::new(store.clone(), guardian_ctx()).unwrap();
        let m1 = staff.send(new_message("parent-1")).await.unwrap();

        // The sender viewing does not mark it read.
        assert!(!staff.thread(&m1.id).await.unwrap()[0].read);
        assert_eq!(guardian.unread_count().await.unwrap(), 1);

        let first = guardian.thread(&m1.id).await.unwrap().remove(0);
        assert!(first.read);
        let read_at = first.read_at;
        let again = guardian.thread(&m1.id).await.unwrap().remove(0);
        assert_eq!(again.read_at, read_at);
        assert_eq!(guardian.unread_count().await.unwrap(), 0);
        assert_eq!(guardian.inbox().await.unwrap().len(), 1);
        assert_eq!(staff.sent().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn guardians_write_only_about_their_child() {
        let guardian = MessageService::new(store().await, guardian_ctx()).unwrap();
        let mut request = new_message("staff-1");
        request.child_cnp = Some("6050101123451".into());
        assert!(matches!(guardian.send(request).await, Err(ServiceError::Forbidden(_))));

        let mut request = new_message("staff-1");
        request.child_cnp = None;
        let sent = guardian.send(request).await.unwrap();
        assert_eq!(sent.child_cnp.as_deref(), Some(CNP));

        assert!(matches!(guardian.send(new_message("stranger")).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn outsiders_cannot_read_a_thread() {
        let store = store().await;
        let staff = MessageService::new(store.clone(), staff_ctx()).unwrap();
        let m1 = staff.send(new_message("parent-1")).await.unwrap();

        let other = TenantContext::new(
            Principal::new("staff-2"),
            TenantCoordinates {
                role: Role::Staff,
                organization_id: "org".into(),
                location_id: "loc".into(),
                grupa_id: None,
                copil_cnp: None,
            },
        );
        let other = MessageService::new(store, other).unwrap();
        assert!(matches!(other.thread(&m1.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(other.reply(&m1.id, ReplyRequest { body: "x".into(), subject: None }).await, Err(ServiceError::Forbidden(_))));
    }
}
