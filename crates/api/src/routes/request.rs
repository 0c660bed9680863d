use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use bloodlink_db::models::{BloodGroup, BloodRequest};
use bloodlink_services::dao::base::PaginationParams;
use bloodlink_services::lifecycle::NewRequest;

use crate::{error::ApiError, extractors::auth::AuthUser, routes, state::AppState};

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = state.lifecycle.create(auth.user_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Blood request created successfully",
            "result": { "id": request.id.map(|id| id.to_hex()) },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub city: Option<String>,
    pub blood_group: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Public listing of open requests: pending, donation date not yet passed,
/// optional city / blood-group filters, newest first.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let blood_group = query
        .blood_group
        .as_deref()
        .map(|s| s.parse::<BloodGroup>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let params = PaginationParams {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };
    let result = state
        .requests
        .list_open(
            Utc::now().date_naive(),
            query.city.as_deref(),
            blood_group,
            &params,
        )
        .await?;

    let items: Vec<Value> = result.items.iter().map(to_summary).collect();

    let base = routes::link_base(&state, &headers, uri.path());
    let links = routes::page_links(&base, result.page, result.total_pages, result.limit);

    Ok(Json(json!({
        "message": if result.total == 0 {
            "No blood requests found"
        } else {
            "Blood requests fetched successfully"
        },
        "result": items,
        "pagination": {
            "current_page": result.page,
            "total_pages": result.total_pages,
            "total_items": result.total,
        },
        "links": links,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let request_id = parse_id(&id)?;

    let request = match state.requests.base.find_by_id(request_id).await {
        Ok(request) => request,
        Err(bloodlink_services::dao::base::DaoError::NotFound) => {
            return Err(ApiError::NotFound("Blood request not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    // Creator contact details come from the live profile
    let created_by = match state.users.try_find(request.created_by).await? {
        Some(profile) => json!({
            "id": request.created_by.to_hex(),
            "name": profile.name,
            "contact": profile.contact,
        }),
        None => json!({ "id": request.created_by.to_hex(), "name": null }),
    };

    // Donor info when booked, preferring the live profile over the snapshot
    let donor = match &request.donor {
        Some(snapshot) => {
            let profile = state.users.try_find(snapshot.user_id).await?;
            Some(json!({
                "id": snapshot.user_id.to_hex(),
                "name": profile
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| snapshot.name.clone()),
                "contact": profile.and_then(|p| p.contact),
                "blood_group": snapshot.blood_group,
                "booked_at": snapshot.booked_at.try_to_rfc3339_string().unwrap_or_default(),
            }))
        }
        None => None,
    };

    Ok(Json(json!({
        "message": "Blood request fetched successfully",
        "result": {
            "id": request.id.map(|id| id.to_hex()),
            "patient_name": request.patient_name,
            "medical_condition": request.medical_condition,
            "blood_group": request.blood_group,
            "unit": request.unit,
            "hospital": request.hospital,
            "contact": request.contact,
            "address": request.address,
            "note": request.note,
            "status": request.status,
            "donor": donor,
            "donation_date": request.donation_date,
            "created_at": request.created_at.try_to_rfc3339_string().unwrap_or_default(),
            "created_by": created_by,
        },
    })))
}

pub async fn book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let request_id = parse_id(&id)?;
    state.lifecycle.book(request_id, auth.user_id).await?;

    Ok(Json(json!({ "message": "Blood request booked successfully" })))
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let request_id = parse_id(&id)?;
    state.lifecycle.complete(request_id, auth.user_id).await?;

    Ok(Json(json!({ "message": "Donation marked as completed successfully" })))
}

/// On-demand expiry sweep over pending requests.
pub async fn refresh(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let updated = state.lifecycle.expire_due(Utc::now()).await?;

    Ok(Json(json!({
        "message": "Expired blood requests refreshed successfully",
        "updated": updated,
    })))
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid request id".to_string()))
}

fn to_summary(request: &BloodRequest) -> Value {
    json!({
        "id": request.id.map(|id| id.to_hex()),
        "patient_name": request.patient_name,
        "blood_group": request.blood_group,
        "unit": request.unit,
        "hospital": request.hospital,
        "contact": request.contact,
        "note": request.note,
        "donation_date": request.donation_date,
        "city": request.address.city,
    })
}
