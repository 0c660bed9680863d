use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use bloodlink_db::models::{BloodGroup, UserProfile};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let donors = state.users.find_donors(None, None).await?;
    let items: Vec<Value> = donors.iter().map(to_response).collect();

    Ok(Json(json!({
        "message": "Donors fetched successfully",
        "result": items,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub blood_group: Option<String>,
    pub city: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let blood_group = query
        .blood_group
        .as_deref()
        .map(|s| s.parse::<BloodGroup>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let donors = state
        .users
        .find_donors(blood_group, query.city.as_deref())
        .await?;
    let items: Vec<Value> = donors.iter().map(to_response).collect();

    Ok(Json(json!({
        "total": items.len(),
        "message": "Donors fetched successfully",
        "result": items,
    })))
}

fn to_response(donor: &UserProfile) -> Value {
    json!({
        "id": donor.id.map(|id| id.to_hex()),
        "name": donor.name,
        "blood_group": donor.blood_group,
        "city": donor.address.as_ref().map(|a| a.city.clone()),
        "donated_count": donor.donated_count,
        "last_donation_date": donor.last_donation_date,
    })
}
