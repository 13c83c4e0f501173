//! HTTP request handlers for API endpoints

use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{debug, error, info, warn};

use crate::types::{HealthResponse, Upload};

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List the sheet names of an uploaded workbook in document order
pub async fn list_sheets(multipart: Multipart) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = read_upload(multipart).await?;
    info!(
        "Sheet listing request: file={:?}, size={} bytes",
        upload.file_name,
        upload.bytes.len()
    );

    let names = run_blocking(move || sheetstyle_core::list_sheets(&upload.bytes[..])).await?;
    Ok(Json(names))
}

/// Extract content, address and style of every non-empty cell of one sheet
///
/// An absent or unknown `sheet_name` selects the first sheet.
pub async fn analyze_sheet(
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = read_upload(multipart).await?;
    info!(
        "Analyze request: file={:?}, size={} bytes, sheet_name={:?}",
        upload.file_name,
        upload.bytes.len(),
        upload.sheet_name
    );

    let sheet = run_blocking(move || {
        sheetstyle_core::analyze_sheet(&upload.bytes[..], upload.sheet_name.as_deref())
    })
    .await?;
    Ok(Json(sheet))
}

/// Same as [`analyze_sheet`], rendered as a Markdown table
pub async fn analyze_sheet_markdown(
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = read_upload(multipart).await?;
    info!(
        "Markdown request: file={:?}, size={} bytes, sheet_name={:?}",
        upload.file_name,
        upload.bytes.len(),
        upload.sheet_name
    );

    let sheet = run_blocking(move || {
        sheetstyle_core::analyze_sheet(&upload.bytes[..], upload.sheet_name.as_deref())
    })
    .await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        sheet.to_markdown(),
    ))
}

/// Collect the `file` and `sheet_name` fields; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, (StatusCode, String)> {
    let mut file = None;
    let mut sheet_name = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, bytes));
            }
            Some("sheet_name") => {
                let text = field.text().await.map_err(multipart_error)?;
                sheet_name = Some(text).filter(|s| !s.is_empty());
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Missing multipart field: file".to_string(),
        )
    })?;

    Ok(Upload {
        file_name,
        bytes,
        sheet_name,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> (StatusCode, String) {
    warn!("Failed to read multipart body: {}", e);
    (e.status(), e.body_text())
}

/// Run workbook parsing on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, (StatusCode, String)>
where
    F: FnOnce() -> sheetstyle_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| {
            error!("Workbook task failed to complete: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task join error: {e}"),
            )
        })?
        .map_err(|e| {
            warn!("Failed to process workbook: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })
}
