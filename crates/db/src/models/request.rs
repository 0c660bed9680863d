use bson::{DateTime, oid::ObjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A posted need for blood of a given group at a location/date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub patient_name: String,
    pub medical_condition: Option<String>,
    pub blood_group: BloodGroup,
    #[serde(default = "default_unit")]
    pub unit: u32,
    pub address: Address,
    pub hospital: Option<String>,
    pub contact: String,
    pub note: Option<String>,
    pub donation_date: NaiveDate,
    #[serde(default)]
    pub status: RequestStatus,
    pub created_by: ObjectId,
    /// Present iff status is booked or completed.
    pub donor: Option<DonorSnapshot>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl BloodRequest {
    pub const COLLECTION: &'static str = "blood_requests";
}

fn default_unit() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Booked,
    Completed,
    Expired,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Booked => "booked",
            RequestStatus::Completed => "completed",
            RequestStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Expired)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
}

/// Snapshot of the donor who booked a request, embedded at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorSnapshot {
    pub user_id: ObjectId,
    pub name: String,
    pub blood_group: BloodGroup,
    pub booked_at: DateTime,
}

/// The eight canonical blood groups. Wire representation keeps the
/// conventional `A+`/`O-` strings; push topics use the slug form since
/// topic names cannot contain `+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }

    pub fn topic_slug(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "a_pos",
            BloodGroup::ANegative => "a_neg",
            BloodGroup::BPositive => "b_pos",
            BloodGroup::BNegative => "b_neg",
            BloodGroup::AbPositive => "ab_pos",
            BloodGroup::AbNegative => "ab_neg",
            BloodGroup::OPositive => "o_pos",
            BloodGroup::ONegative => "o_neg",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blood group: {0}")]
pub struct ParseBloodGroupError(pub String);

impl FromStr for BloodGroup {
    type Err = ParseBloodGroupError;

    /// Case-insensitive; URL-mangled `A ` (space for `+`) is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim_start().to_uppercase().replace(' ', "+");
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| ParseBloodGroupError(s.to_string()))
    }
}
