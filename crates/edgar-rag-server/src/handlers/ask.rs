use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::models::AnswerRecord;
use crate::services::CompanyCatalog;
use crate::utils::error::ApiError;

/// `POST /api/{company}/` — one question string, one best-match answer.
pub async fn ask_question(
    Path(company): Path<String>,
    Extension(catalog): Extension<Arc<CompanyCatalog>>,
    Json(question): Json<String>,
) -> Result<Json<AnswerRecord>, ApiError> {
    info!("question for {company}: {question}");
    let answer = catalog.answer(&company, &question).await?;
    Ok(Json(answer))
}

/// `POST /api/batch/{company}/` — a list of questions, answered in order.
pub async fn ask_batch(
    Path(company): Path<String>,
    Extension(catalog): Extension<Arc<CompanyCatalog>>,
    Json(questions): Json<Vec<String>>,
) -> Result<Json<Vec<AnswerRecord>>, ApiError> {
    info!("{} questions for {company}", questions.len());
    let answers = catalog.answer_batch(&company, &questions).await?;
    Ok(Json(answers))
}
