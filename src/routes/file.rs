//! # File Routes
//!
//! Serves stored posters at `/file/{file_name}`, the path embedded in every
//! `posterUrl`, and accepts standalone poster uploads.

use std::io;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::error::{AppError, AppResult};
use crate::routes::movie::MovieForm;
use crate::server::AppState;
use crate::storage::validate_file_name;

/// Content type from the file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// POST /file/upload
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, String)> {
    let form = MovieForm::from_multipart(multipart).await?;
    let upload = form.file.ok_or(AppError::EmptyFile)?;
    upload.check()?;

    if state.file_store.exists(&state.poster_dir, &upload.file_name).await? {
        return Err(AppError::FileAlreadyExists(upload.file_name));
    }
    let stored = state.file_store.store(&state.poster_dir, &upload).await?;

    tracing::info!("Uploaded poster {}", stored);
    Ok((StatusCode::OK, format!("File uploaded : {}", stored)))
}

/// GET /file/{file_name}
pub async fn serve_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> AppResult<Response> {
    if validate_file_name(&file_name).is_err() {
        return Err(AppError::FileNotFound(file_name));
    }

    let content = match state.file_store.read(&state.poster_dir.join(&file_name)).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::FileNotFound(file_name));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(&file_name))], content).into_response())
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/file/{file_name}", get(serve_file))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/file/upload", post(upload_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("dune.JPG"), "image/jpeg");
        assert_eq!(content_type_for("poster.png"), "image/png");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
