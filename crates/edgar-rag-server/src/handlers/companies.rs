use axum::{extract::Extension, Json};
use std::sync::Arc;

use crate::services::CompanyCatalog;

/// `GET /api/companies/` — the configured company list.
pub async fn list_companies(
    Extension(catalog): Extension<Arc<CompanyCatalog>>,
) -> Json<Vec<String>> {
    Json(catalog.companies().to_vec())
}
