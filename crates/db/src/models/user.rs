use bson::{DateTime, oid::ObjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::request::{Address, BloodGroup};

/// A person who may request and/or donate blood. Created sparse at first
/// login and filled in via profile updates; most fields stay optional until
/// the profile-completeness gate is satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub contact: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<BloodGroup>,
    pub address: Option<Address>,
    #[serde(default)]
    pub is_donor: bool,
    #[serde(default)]
    pub approval: Approval,
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub donated_count: u32,
    pub device_token: Option<String>,
    #[serde(default)]
    pub bookings: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl UserProfile {
    pub const COLLECTION: &'static str = "users";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    #[default]
    Pending,
    Approved,
}
