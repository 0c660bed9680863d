pub mod donor;
pub mod notification;
pub mod request;
pub mod user;

use axum::http::{HeaderMap, header};

use crate::state::AppState;

/// Absolute base for pagination links: configured public URL when behind a
/// proxy, otherwise the request's Host header.
pub(crate) fn link_base(state: &AppState, headers: &HeaderMap, path: &str) -> String {
    if let Some(public_url) = &state.settings.app.public_url {
        return format!("{}{}", public_url.trim_end_matches('/'), path);
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}{path}")
}

/// `first`/`last`/`prev`/`next` links computed from the total page count;
/// `prev`/`next` are null at the edges.
pub(crate) fn page_links(
    base: &str,
    page: u64,
    total_pages: u64,
    limit: u64,
) -> serde_json::Value {
    let link = |p: u64| format!("{base}?page={p}&limit={limit}");
    serde_json::json!({
        "first": link(1),
        "last": link(total_pages),
        "prev": if page > 1 { Some(link(page - 1)) } else { None },
        "next": if page < total_pages { Some(link(page + 1)) } else { None },
    })
}
