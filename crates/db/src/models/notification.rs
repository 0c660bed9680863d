use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Fire-and-forget record of a request lifecycle event. Created exactly once
/// per human-facing transition; only the read flag ever changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub notification_type: NotificationType,
    pub request_id: ObjectId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BloodRequest,
    RequestBooked,
    DonationCompleted,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::BloodRequest => "blood_request",
            NotificationType::RequestBooked => "request_booked",
            NotificationType::DonationCompleted => "donation_completed",
        }
    }
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}
