use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::HeaderMap,
};
use bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use bloodlink_services::dao::base::{DaoError, PaginationParams};

use crate::{error::ApiError, extractors::auth::AuthUser, routes, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PaginationParams {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };
    let result = state.notifications.list(&params).await?;

    let items: Vec<Value> = result
        .items
        .iter()
        .map(|n| {
            json!({
                "id": n.id.map(|id| id.to_hex()),
                "type": n.notification_type,
                "request_id": n.request_id.to_hex(),
                "title": n.title,
                "body": n.body,
                "is_read": n.is_read,
                "created_at": n.created_at.try_to_rfc3339_string().unwrap_or_default(),
            })
        })
        .collect();

    let base = routes::link_base(&state, &headers, uri.path());
    let links = routes::page_links(&base, result.page, result.total_pages, result.limit);

    Ok(Json(json!({
        "message": "Notifications fetched successfully",
        "result": items,
        "links": links,
    })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let notification_id = ObjectId::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid notification id".to_string()))?;

    match state.notifications.base.find_by_id(notification_id).await {
        Ok(_) => {}
        Err(DaoError::NotFound) => {
            return Err(ApiError::NotFound("Notification not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    state.notifications.mark_read(notification_id).await?;

    Ok(Json(json!({
        "message": "Notification marked as read",
        "result": { "id": id },
    })))
}
