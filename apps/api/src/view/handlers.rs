//! Axum route handlers for the browser page and the analysis API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::encoder::ReadError;
use crate::errors::AppError;
use crate::state::AppState;
use crate::view::controller::Upload;
use crate::view::render::{render, ViewModel};

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";
/// Upper bound for a long-poll on `GET /api/v1/analysis?wait=true`.
const LONG_POLL: Duration = Duration::from_secs(25);

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub wait: bool,
}

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/v1/analysis
///
/// Current view. With `?wait=true`, holds the request while an analysis is
/// running and answers as soon as it settles.
pub async fn handle_get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Json<ViewModel> {
    let current = if query.wait {
        state.controller.settled(LONG_POLL).await
    } else {
        state.controller.snapshot()
    };
    Json(render(&current))
}

/// POST /api/v1/analysis
///
/// Accepts a multipart upload, gates its type, encodes it and starts the
/// analysis. Answers 202 with the Analyzing view; poll for the outcome.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ViewModel>), AppError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(field) => field,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(state
                    .controller
                    .reject_unreadable(None, ReadError::from(e)));
            }
            Err(e) => {
                return Err(AppError::Validation(format!(
                    "Malformed multipart body: {}",
                    e.body_text()
                )))
            }
        };

        let Some(mut field) = field else {
            return Err(AppError::Validation(format!(
                "Missing multipart field '{FILE_FIELD}'"
            )));
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared_type = field.content_type().map(str::to_string);

        state
            .controller
            .submit(
                Arc::clone(&state.analyzer),
                Upload {
                    file_name,
                    declared_type: declared_type.as_deref(),
                    source: &mut field,
                },
            )
            .await?;

        let view = render(&state.controller.snapshot());
        return Ok((StatusCode::ACCEPTED, Json(view)));
    }
}

/// POST /api/v1/analysis/reset
///
/// 409 while an analysis is running.
pub async fn handle_reset(State(state): State<AppState>) -> Result<Json<ViewModel>, AppError> {
    state.controller.reset()?;
    Ok(Json(render(&state.controller.snapshot())))
}
