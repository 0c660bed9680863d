use axum::{Json, extract::State};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use bloodlink_db::models::{Address, BloodGroup, UserProfile};
use bloodlink_services::dao::user::ProfileUpdate;
use bloodlink_services::eligibility;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    pub name: String,
    pub contact: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_group: Option<String>,
    pub address: Option<AddressBody>,
    pub is_donor: Option<bool>,
    pub last_donation_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AddressBody {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
}

/// Create or update the caller's profile (merge semantics; unsupplied
/// fields keep their stored values).
pub async fn upsert_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ProfileBody>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = Vec::new();

    if body.name.trim().len() < 2 {
        errors.push("Valid name is required".to_string());
    }

    let blood_group = match body.blood_group.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<BloodGroup>() {
            Ok(group) => Some(group),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let update = ProfileUpdate {
        name: body.name.trim().to_string(),
        contact: body.contact,
        date_of_birth: body.date_of_birth,
        blood_group,
        address: body.address.map(|a| Address {
            line1: a.line1,
            line2: a.line2,
            // normalized for equality filtering, same as request addresses
            city: a.city.to_lowercase(),
            state: a.state,
        }),
        is_donor: body.is_donor,
        last_donation_date: body.last_donation_date,
    };

    let profile = state.users.upsert_profile(auth.user_id, update).await?;

    Ok(Json(json!({
        "message": "Profile created/updated successfully",
        "result": to_response(&profile),
    })))
}

pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = state
        .users
        .try_find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(json!({
        "message": "Profile fetched successfully",
        "result": to_response(&profile),
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeviceBody {
    pub device_token: String,
}

/// Refresh the caller's push token (done on login by the mobile client).
pub async fn update_device(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DeviceBody>,
) -> Result<Json<Value>, ApiError> {
    if body.device_token.trim().is_empty() {
        return Err(ApiError::BadRequest("Device token is required".to_string()));
    }

    // Upsert-friendly: the profile may not exist yet on first login
    if state.users.try_find(auth.user_id).await?.is_none() {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }
    state
        .users
        .set_device_token(auth.user_id, body.device_token.trim())
        .await?;

    Ok(Json(json!({ "message": "Device token updated successfully" })))
}

fn to_response(profile: &UserProfile) -> Value {
    json!({
        "id": profile.id.map(|id| id.to_hex()),
        "name": profile.name,
        "contact": profile.contact,
        "date_of_birth": profile.date_of_birth,
        "blood_group": profile.blood_group,
        "address": profile.address,
        "is_donor": profile.is_donor,
        "approval": profile.approval,
        "last_donation_date": profile.last_donation_date,
        "donated_count": profile.donated_count,
        "bookings": profile.bookings.iter().map(|b| b.to_hex()).collect::<Vec<_>>(),
        "profile_complete": eligibility::profile_complete(profile, Utc::now().date_naive()),
    })
}
