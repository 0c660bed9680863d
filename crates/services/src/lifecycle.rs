//! The blood-request state machine: create -> pending -> booked ->
//! completed, or pending -> expired. All temporal and eligibility gates are
//! enforced here before a transition commits; notification dispatch runs
//! after the commit and never fails the operation.

use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use bloodlink_db::models::{
    Address, BloodGroup, BloodRequest, DonorSnapshot, RequestStatus, UserProfile,
};

use crate::dao::base::{DaoError, DaoResult};
use crate::dao::request::RequestDao;
use crate::dao::user::UserDao;
use crate::eligibility::{self, Cooldown};
use crate::notify::NotificationDispatcher;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Permission(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    RateLimited(String),
    #[error(transparent)]
    Dao(#[from] DaoError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Incoming request payload. Everything is optional so validation can report
/// every violated rule at once instead of failing at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRequest {
    pub patient_name: Option<String>,
    pub medical_condition: Option<String>,
    pub blood_group: Option<String>,
    pub unit: Option<u32>,
    pub address: Option<NewAddress>,
    pub hospital: Option<String>,
    pub contact: Option<String>,
    pub note: Option<String>,
    pub donation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// `NewRequest` after all field rules passed.
#[derive(Debug, Clone)]
struct ValidRequest {
    patient_name: String,
    medical_condition: Option<String>,
    blood_group: BloodGroup,
    unit: u32,
    address: Address,
    hospital: Option<String>,
    contact: String,
    note: Option<String>,
    donation_date: NaiveDate,
}

pub struct LifecycleService {
    requests: Arc<RequestDao>,
    users: Arc<UserDao>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl LifecycleService {
    pub fn new(
        requests: Arc<RequestDao>,
        users: Arc<UserDao>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            requests,
            users,
            dispatcher,
        }
    }

    /// Create a request in `pending` status. Gates: complete requester
    /// profile, field validation (all violations reported), 24h creation
    /// cooldown. Emits the creation notification best-effort.
    pub async fn create(
        &self,
        requester_id: ObjectId,
        input: NewRequest,
    ) -> LifecycleResult<BloodRequest> {
        let now = Utc::now();
        self.require_complete_profile(requester_id, now).await?;

        let valid = validate(input).map_err(LifecycleError::Validation)?;

        let last_created = self
            .requests
            .last_created_by(requester_id)
            .await?
            .map(|r| r.created_at.to_chrono());
        if let Some(hours) = eligibility::creation_cooldown(last_created, now) {
            return Err(LifecycleError::RateLimited(format!(
                "You can create another request after {hours} hour(s)"
            )));
        }

        let created_at = bson::DateTime::from_chrono(now);
        let request = BloodRequest {
            id: None,
            patient_name: valid.patient_name,
            medical_condition: valid.medical_condition,
            blood_group: valid.blood_group,
            unit: valid.unit,
            address: valid.address,
            hospital: valid.hospital,
            contact: valid.contact,
            note: valid.note,
            donation_date: valid.donation_date,
            status: RequestStatus::Pending,
            created_by: requester_id,
            donor: None,
            created_at,
            updated_at: created_at,
        };

        let saved = self.requests.insert(&request).await?;
        info!(request_id = ?saved.id, blood_group = %saved.blood_group, "Blood request created");

        self.dispatcher.request_created(&saved).await;
        Ok(saved)
    }

    /// Book a pending request for a donor. The commit is an atomic
    /// conditional update keyed on the absence of a donor, so of two
    /// concurrent bookings exactly one succeeds.
    pub async fn book(
        &self,
        request_id: ObjectId,
        donor_id: ObjectId,
    ) -> LifecycleResult<BloodRequest> {
        let now = Utc::now();

        let request = self.find_request(request_id).await?;

        if request.created_by == donor_id {
            return Err(LifecycleError::Permission(
                "You cannot book your own blood request".to_string(),
            ));
        }
        if request.donor.is_some() {
            return Err(LifecycleError::Conflict(
                "This request is already booked".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(LifecycleError::Conflict(
                "This request is no longer open".to_string(),
            ));
        }

        let donor = self.require_complete_profile(donor_id, now).await?;

        if let Cooldown::Waiting { remaining_days } =
            eligibility::donation_cooldown(donor.last_donation_date, now)
        {
            return Err(LifecycleError::RateLimited(format!(
                "You can donate again after {remaining_days} day(s)"
            )));
        }

        // Completeness guarantees the group is present
        let donor_group = donor
            .blood_group
            .ok_or_else(|| LifecycleError::Permission("Blood group missing from profile".to_string()))?;
        if donor_group != request.blood_group {
            return Err(LifecycleError::Permission(format!(
                "Blood group mismatch. Required: {}",
                request.blood_group
            )));
        }

        if self.requests.has_active_booking(donor_id).await? {
            return Err(LifecycleError::Conflict(
                "You already have an active booked request".to_string(),
            ));
        }

        let snapshot = DonorSnapshot {
            user_id: donor_id,
            name: donor.name.clone(),
            blood_group: donor_group,
            booked_at: bson::DateTime::from_chrono(now),
        };

        // Conditional commit; a concurrent winner leaves us with None
        let Some(booked) = self.requests.book(request_id, &snapshot).await? else {
            return Err(LifecycleError::Conflict(
                "This request is already booked".to_string(),
            ));
        };

        self.users.add_booking(donor_id, request_id).await?;
        info!(%request_id, %donor_id, "Blood request booked");

        self.dispatcher.request_booked(&booked).await;
        Ok(booked)
    }

    /// Mark a booked request completed. Only the creator may complete;
    /// increments the donor's donated count by exactly one.
    pub async fn complete(
        &self,
        request_id: ObjectId,
        requester_id: ObjectId,
    ) -> LifecycleResult<BloodRequest> {
        let request = self.find_request(request_id).await?;

        if request.created_by != requester_id {
            return Err(LifecycleError::Permission(
                "Only the request owner can complete this donation".to_string(),
            ));
        }
        let Some(donor) = request.donor.clone() else {
            return Err(LifecycleError::Conflict(
                "No donor has booked this request yet".to_string(),
            ));
        };
        if request.status == RequestStatus::Completed {
            return Err(LifecycleError::Conflict(
                "Donation already completed".to_string(),
            ));
        }

        // Guarded on booked status so a double-complete loses cleanly
        if !self.requests.complete(request_id).await? {
            return Err(LifecycleError::Conflict(
                "Donation already completed".to_string(),
            ));
        }

        self.users.increment_donated(donor.user_id).await?;
        info!(%request_id, donor_id = %donor.user_id, "Donation completed");

        let completed = self.find_request(request_id).await?;
        self.dispatcher.donation_completed(&completed).await;
        Ok(completed)
    }

    /// Expiry sweep: every pending request whose donation date's following
    /// midnight is at or before `now` becomes `expired`. Returns the number
    /// of requests updated; re-running with nothing newly due updates none.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> LifecycleResult<u64> {
        let pending = self.requests.find_pending().await?;

        let due: Vec<ObjectId> = pending
            .iter()
            .filter(|r| eligibility::expiry_instant(r.donation_date) <= now)
            .filter_map(|r| r.id)
            .collect();

        let updated = self.requests.expire(&due).await?;
        if updated > 0 {
            info!(updated, "Expired stale blood requests");
        }
        Ok(updated)
    }

    async fn find_request(&self, request_id: ObjectId) -> LifecycleResult<BloodRequest> {
        match self.requests.base.find_by_id(request_id).await {
            Ok(request) => Ok(request),
            Err(DaoError::NotFound) => Err(LifecycleError::NotFound(
                "Blood request not found".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn require_complete_profile(
        &self,
        user_id: ObjectId,
        now: DateTime<Utc>,
    ) -> LifecycleResult<UserProfile> {
        let profile = match self.users.try_find(user_id).await? {
            Some(profile) => profile,
            None => return Err(LifecycleError::NotFound("User not found".to_string())),
        };
        if !eligibility::profile_complete(&profile, now.date_naive()) {
            return Err(LifecycleError::Permission(
                "Please complete your profile to continue".to_string(),
            ));
        }
        Ok(profile)
    }
}

/// Field validation for request creation. Collects every violated rule.
fn validate(input: NewRequest) -> Result<ValidRequest, Vec<String>> {
    let mut errors = Vec::new();

    let patient_name = input
        .patient_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if patient_name.len() < 2 {
        errors.push("Valid patient name is required".to_string());
    }

    let blood_group = match input.blood_group.as_deref() {
        None | Some("") => {
            errors.push("Blood group is required".to_string());
            None
        }
        Some(raw) => match raw.parse::<BloodGroup>() {
            Ok(group) => Some(group),
            Err(_) => {
                errors.push(format!(
                    "Blood group must be one of {}",
                    BloodGroup::ALL.map(|g| g.as_str()).join(", ")
                ));
                None
            }
        },
    };

    let contact = input.contact.as_deref().map(str::trim).unwrap_or_default();
    if contact.len() < 8 {
        errors.push("Valid contact number is required".to_string());
    }

    if input.donation_date.is_none() {
        errors.push("Donation date is required".to_string());
    }

    let address = match &input.address {
        None => {
            errors.push("Address is required".to_string());
            None
        }
        Some(address) => {
            let line1 = address.line1.as_deref().map(str::trim).unwrap_or_default();
            let city = address.city.as_deref().map(str::trim).unwrap_or_default();
            let state = address.state.as_deref().map(str::trim).unwrap_or_default();
            if line1.is_empty() {
                errors.push("Address line1 is required".to_string());
            }
            if city.is_empty() {
                errors.push("City is required".to_string());
            }
            if state.is_empty() {
                errors.push("State is required".to_string());
            }
            if line1.is_empty() || city.is_empty() || state.is_empty() {
                None
            } else {
                Some(Address {
                    line1: line1.to_string(),
                    line2: address
                        .line2
                        .as_deref()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(ToString::to_string),
                    city: city.to_lowercase(),
                    state: state.to_string(),
                })
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidRequest {
        patient_name,
        medical_condition: input.medical_condition.filter(|m| !m.trim().is_empty()),
        blood_group: blood_group.expect("checked above"),
        unit: input.unit.filter(|u| *u > 0).unwrap_or(1),
        address: address.expect("checked above"),
        hospital: input.hospital.filter(|h| !h.trim().is_empty()),
        contact: contact.to_string(),
        note: input.note.filter(|n| !n.trim().is_empty()),
        donation_date: input.donation_date.expect("checked above"),
    })
}
