//! # Movie Routes
//!
//! Catalog endpoints under `/api/v1/movie`. Reads are public; add, update and
//! delete are mounted behind the JWT and admin middleware in `server.rs`.
//!
//! Add and update take `multipart/form-data` with a `movieDto` part holding
//! the movie JSON and a `file` part holding the poster.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use tracing::debug;

use crate::database::models::MovieDetails;
use crate::dto::{MovieDto, MoviePageResponse, PageQuery, PageSortQuery};
use crate::error::{AppError, AppResult};
use crate::server::AppState;
use crate::storage::PosterUpload;

/// Parts of a movie multipart form
#[derive(Debug, Default)]
pub struct MovieForm {
    pub movie_dto: Option<String>,
    pub file: Option<PosterUpload>,
}

impl MovieForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = MovieForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read file part: {}", e)))?;
                    form.file = Some(PosterUpload::new(file_name, data.to_vec()));
                }
                "movieDto" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read movieDto part: {}", e)))?;
                    form.movie_dto = Some(text);
                }
                other => debug!("Ignoring unknown multipart field {:?}", other),
            }
        }

        Ok(form)
    }

    pub fn details(&self) -> AppResult<MovieDetails> {
        let raw = self
            .movie_dto
            .as_deref()
            .ok_or_else(|| AppError::Validation("Missing required 'movieDto' part".to_string()))?;
        serde_json::from_str(raw).map_err(|e| AppError::Validation(format!("Invalid movieDto: {}", e)))
    }
}

/// POST /api/v1/movie/add-movie
pub async fn add_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<MovieDto>)> {
    let form = MovieForm::from_multipart(multipart).await?;
    let details = form.details()?;
    let upload = form.file.ok_or(AppError::EmptyFile)?;

    let dto = state.movie_service.add_movie(details, upload).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// GET /api/v1/movie/{movie_id}
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> AppResult<Json<MovieDto>> {
    Ok(Json(state.movie_service.get_movie(movie_id).await?))
}

/// GET /api/v1/movie/all
pub async fn get_all_movies(State(state): State<AppState>) -> AppResult<Json<Vec<MovieDto>>> {
    Ok(Json(state.movie_service.get_all_movies().await?))
}

/// PUT /api/v1/movie/update/{movie_id}
///
/// An absent or empty `file` part keeps the current poster.
pub async fn update_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<MovieDto>> {
    let form = MovieForm::from_multipart(multipart).await?;
    let details = form.details()?;
    let upload = form.file.and_then(PosterUpload::non_empty);

    Ok(Json(state.movie_service.update_movie(movie_id, details, upload).await?))
}

/// DELETE /api/v1/movie/delete/{movie_id}
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> AppResult<String> {
    state.movie_service.delete_movie(movie_id).await
}

/// GET /api/v1/movie/allMoviesPage?pageNumber=&pageSize=
pub async fn get_movies_with_pagination(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<MoviePageResponse>> {
    let page = state
        .movie_service
        .get_all_movies_with_pagination(query.page_number, query.page_size)
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/movie/allMoviesPageSort?pageNumber=&pageSize=&sortBy=&dir=
pub async fn get_movies_with_pagination_and_sorting(
    State(state): State<AppState>,
    Query(query): Query<PageSortQuery>,
) -> AppResult<Json<MoviePageResponse>> {
    let page = state
        .movie_service
        .get_all_movies_with_pagination_and_sorting(
            query.page_number,
            query.page_size,
            &query.sort_by,
            &query.dir,
        )
        .await?;
    Ok(Json(page))
}

/// Public read-only routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/movie/all", get(get_all_movies))
        .route("/api/v1/movie/allMoviesPage", get(get_movies_with_pagination))
        .route("/api/v1/movie/allMoviesPageSort", get(get_movies_with_pagination_and_sorting))
        .route("/api/v1/movie/{movie_id}", get(get_movie))
}

/// Mutating routes; callers wrap these in the admin middleware
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/movie/add-movie", post(add_movie))
        .route("/api/v1/movie/update/{movie_id}", put(update_movie))
        .route("/api/v1/movie/delete/{movie_id}", delete(delete_movie))
}
