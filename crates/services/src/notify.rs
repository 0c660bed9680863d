//! Notification fan-out for lifecycle transitions: persists a notification
//! record and pushes a message through the provider. Everything here is best
//! effort; a failure is logged and swallowed, never surfaced to the caller
//! that performed the transition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;
use tracing::{debug, warn};

use bloodlink_config::PushSettings;
use bloodlink_db::models::{BloodRequest, NotificationType};

use crate::dao::notification::NotificationDao;
use crate::dao::user::UserDao;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Recipient token is no longer registered")]
    InvalidToken,
    #[error("Push request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Push endpoint returned status {0}")]
    Status(u16),
}

/// Where a push message is addressed: a broadcast topic (every subscribed
/// donor) or one device token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Topic(String),
    Token(String),
}

#[derive(Debug, Clone)]
pub struct PushMessage {
    pub target: PushTarget,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// FCM-style HTTP push client.
pub struct HttpPush {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpPush {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl PushSender for HttpPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let to = match &message.target {
            PushTarget::Topic(topic) => format!("/topics/{topic}"),
            PushTarget::Token(token) => token.clone(),
        };

        let payload = serde_json::json!({
            "to": to,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // The provider reports stale tokens with 404/NotRegistered
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 || body.contains("NotRegistered") {
            return Err(PushError::InvalidToken);
        }
        Err(PushError::Status(status.as_u16()))
    }
}

/// Used when push is disabled in settings; messages are dropped after a
/// debug log so the rest of the dispatch path stays exercised.
pub struct NoopPush;

#[async_trait]
impl PushSender for NoopPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        debug!(?message.target, title = %message.title, "Push disabled, dropping message");
        Ok(())
    }
}

pub fn sender_from_settings(settings: &PushSettings) -> Arc<dyn PushSender> {
    if settings.enabled && !settings.api_key.is_empty() {
        Arc::new(HttpPush::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
        ))
    } else {
        Arc::new(NoopPush)
    }
}

pub struct NotificationDispatcher {
    notifications: Arc<NotificationDao>,
    users: Arc<UserDao>,
    push: Arc<dyn PushSender>,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<NotificationDao>,
        users: Arc<UserDao>,
        push: Arc<dyn PushSender>,
    ) -> Self {
        Self {
            notifications,
            users,
            push,
        }
    }

    /// New request: record + broadcast to the blood-group topic so every
    /// subscribed donor hears about it.
    pub async fn request_created(&self, request: &BloodRequest) {
        let Some(request_id) = request.id else {
            warn!("Dispatch skipped: request has no id");
            return;
        };

        let group = request.blood_group;
        let hospital = request.hospital.as_deref().unwrap_or("the hospital");
        let title = match request.note.as_deref() {
            Some(note) if !note.trim().is_empty() => {
                format!("🩸 {} {} Needed", capitalize_first_word(note), group)
            }
            _ => format!("🩸 {} Needed", group),
        };
        let body = format!(
            "{} blood needed at {}, {}",
            group, hospital, request.address.city
        );

        self.record(NotificationType::BloodRequest, request_id, &title, &body)
            .await;

        let mut data = HashMap::new();
        data.insert("type".to_string(), NotificationType::BloodRequest.as_str().to_string());
        data.insert("blood_group".to_string(), group.as_str().to_string());
        data.insert("city".to_string(), request.address.city.clone());
        data.insert(
            "hospital".to_string(),
            request.hospital.clone().unwrap_or_default(),
        );

        self.deliver(
            None,
            PushMessage {
                target: PushTarget::Topic(format!("blood_{}", group.topic_slug())),
                title,
                body,
                data,
            },
        )
        .await;
    }

    /// Booked: record + direct push to the request creator's device.
    pub async fn request_booked(&self, request: &BloodRequest) {
        let Some(request_id) = request.id else {
            warn!("Dispatch skipped: request has no id");
            return;
        };
        let Some(donor) = &request.donor else {
            warn!(%request_id, "Dispatch skipped: booked request has no donor snapshot");
            return;
        };

        let title = "🩸 Blood request booked".to_string();
        let body = format!(
            "{} has booked your blood request for {}",
            donor.name, request.blood_group
        );

        self.record(NotificationType::RequestBooked, request_id, &title, &body)
            .await;

        self.push_to_user(
            request.created_by,
            NotificationType::RequestBooked,
            request,
            title,
            body,
        )
        .await;
    }

    /// Completed: record + direct push thanking the donor.
    pub async fn donation_completed(&self, request: &BloodRequest) {
        let Some(request_id) = request.id else {
            warn!("Dispatch skipped: request has no id");
            return;
        };
        let Some(donor) = &request.donor else {
            warn!(%request_id, "Dispatch skipped: completed request has no donor snapshot");
            return;
        };

        let title = "✅ Donation completed".to_string();
        let body = format!(
            "Your blood donation for {} has been marked as completed. Thank you, {}!",
            request.blood_group, donor.name
        );

        self.record(NotificationType::DonationCompleted, request_id, &title, &body)
            .await;

        self.push_to_user(
            donor.user_id,
            NotificationType::DonationCompleted,
            request,
            title,
            body,
        )
        .await;
    }

    async fn record(
        &self,
        notification_type: NotificationType,
        request_id: ObjectId,
        title: &str,
        body: &str,
    ) {
        if let Err(e) = self
            .notifications
            .create(notification_type, request_id, title.to_string(), body.to_string())
            .await
        {
            warn!(error = %e, %request_id, "Failed to record notification");
        }
    }

    /// Token-addressed delivery to one user; a stale token is cleared from
    /// the profile, any other failure is only logged.
    async fn push_to_user(
        &self,
        user_id: ObjectId,
        notification_type: NotificationType,
        request: &BloodRequest,
        title: String,
        body: String,
    ) {
        let token = match self.users.try_find(user_id).await {
            Ok(Some(profile)) => profile.device_token,
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, %user_id, "Failed to load push recipient");
                return;
            }
        };
        let Some(token) = token else {
            debug!(%user_id, "No device token, skipping push");
            return;
        };

        let mut data = HashMap::new();
        data.insert("type".to_string(), notification_type.as_str().to_string());
        data.insert(
            "blood_group".to_string(),
            request.blood_group.as_str().to_string(),
        );
        data.insert("city".to_string(), request.address.city.clone());
        if let Some(request_id) = request.id {
            data.insert("request_id".to_string(), request_id.to_hex());
        }

        let message = PushMessage {
            target: PushTarget::Token(token),
            title,
            body,
            data,
        };
        self.deliver(Some(user_id), message).await;
    }

    async fn deliver(&self, recipient: Option<ObjectId>, message: PushMessage) {
        match self.push.send(&message).await {
            Ok(()) => {}
            Err(PushError::InvalidToken) => {
                if let Some(user_id) = recipient {
                    if let Err(e) = self.users.clear_device_token(user_id).await {
                        warn!(error = %e, %user_id, "Failed to clear stale device token");
                    } else {
                        debug!(%user_id, "Cleared stale device token");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Push delivery failed");
            }
        }
    }
}

fn capitalize_first_word(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
