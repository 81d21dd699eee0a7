//! HTTP interface.
//!
//! Routes (all JSON except the multipart upload):
//!
//! * `POST /api/v1/lectures` — multipart upload (`title`, `professor`,
//!   optional `description`, `file`); runs the full pipeline synchronously
//!   and answers `201` with the stored record.
//! * `GET /api/v1/lectures` — all lectures, newest first.
//! * `GET /api/v1/lectures/{id}` — one lecture; each fetch increments its
//!   view count.
//!
//! Error statuses map off [`ErrorClass`]: caller mistakes are `400`,
//! transient upstream trouble is `503`, everything else `500`.

use crate::config::GenerationConfig;
use crate::db::{Db, Lecture};
use crate::error::{ErrorClass, LectureError};
use crate::generate;
use crate::output::GenerationStats;
use crate::request::LectureRequest;
use crate::store::ObjectStore;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Uploaded PDFs up to 100 MiB.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared server state.
pub struct AppState {
    pub config: GenerationConfig,
    pub db: Db,
    pub store: ObjectStore,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/lectures", post(create_lecture).get(list_lectures))
        .route("/api/v1/lectures/{id}", get(get_lecture))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// `LectureError` carried across an axum handler boundary.
struct ApiError(LectureError);

impl From<LectureError> for ApiError {
    fn from(e: LectureError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.class() {
            ErrorClass::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
        } else {
            info!("request rejected ({status}): {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct CreateLectureResponse {
    lecture: Lecture,
    stats: GenerationStats,
}

async fn health() -> &'static str {
    "ok"
}

async fn list_lectures(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Lecture>>, ApiError> {
    Ok(Json(state.db.list_lectures()?))
}

async fn get_lecture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.db.get_lecture(&id)? {
        Some(lecture) => Ok(Json(lecture).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("no lecture with id '{id}'"),
            }),
        )
            .into_response()),
    }
}

async fn create_lecture(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request = read_request(multipart).await?;
    request.validate()?;

    // The final video lands in a temp file that outlives the pipeline's
    // workspace just long enough to be uploaded.
    let out_file = tempfile::Builder::new()
        .prefix("lecture_out_")
        .suffix(".mp4")
        .tempfile()
        .map_err(|e| LectureError::Internal(format!("output tempfile: {e}")))?;

    let output = generate::generate_to_file(&request, out_file.path(), &state.config).await?;

    let key = format!("class/{}.mp4", uuid::Uuid::new_v4());
    let video_url = state.store.upload_file(out_file.path(), &key).await?;

    let lecture = state.db.insert_lecture(
        &request.title,
        &request.professor,
        request.description.as_deref(),
        &video_url,
        &key,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLectureResponse {
            lecture,
            stats: output.stats,
        }),
    )
        .into_response())
}

/// Pull the lecture request out of the multipart form.
async fn read_request(mut multipart: Multipart) -> Result<LectureRequest, LectureError> {
    let mut title = String::new();
    let mut professor = String::new();
    let mut description: Option<String> = None;
    let mut pdf: Vec<u8> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => title = field.text().await.map_err(bad_multipart)?,
            "professor" => professor = field.text().await.map_err(bad_multipart)?,
            "description" => {
                let text = field.text().await.map_err(bad_multipart)?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            "file" => {
                require_pdf_content_type(field.content_type())?;
                pdf = field.bytes().await.map_err(bad_multipart)?.to_vec();
            }
            // unknown fields are ignored
            _ => {}
        }
    }

    Ok(LectureRequest {
        title,
        professor,
        description,
        pdf,
    })
}

/// The file part must declare `application/pdf`; the magic-byte check in
/// [`LectureRequest::validate`] is the second gate.
fn require_pdf_content_type(content_type: Option<&str>) -> Result<(), LectureError> {
    match content_type {
        Some("application/pdf") => Ok(()),
        other => Err(LectureError::InvalidPdf {
            detail: format!(
                "upload must declare content type 'application/pdf', got '{}'",
                other.unwrap_or("none")
            ),
        }),
    }
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> LectureError {
    LectureError::MissingField {
        field: format!("multipart form unreadable: {e}"),
    }
}
