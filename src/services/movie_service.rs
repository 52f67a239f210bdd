//! # Movie Service
//!
//! Orchestrates poster storage and movie persistence for the catalog API.
//! The poster directory and public base URL are fixed at construction.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::{Movie, MovieDetails};
use crate::dto::{MovieDto, MoviePageResponse};
use crate::error::{AppError, AppResult};
use crate::repositories::{Direction, MovieRepository, PageRequest, Sort, SortField};
use crate::storage::{FileStore, PosterUpload};

pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
    files: Arc<dyn FileStore>,
    poster_dir: PathBuf,
    base_url: String,
}

impl MovieService {
    pub fn new(
        movies: Arc<dyn MovieRepository>,
        files: Arc<dyn FileStore>,
        poster_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            movies,
            files,
            poster_dir: poster_dir.into(),
            base_url: base_url.into(),
        }
    }

    fn to_dto(&self, movie: Movie) -> MovieDto {
        MovieDto::from_movie(movie, &self.base_url)
    }

    async fn find_existing(&self, movie_id: i32) -> AppResult<Movie> {
        self.movies
            .find_by_id(movie_id)
            .await?
            .ok_or(AppError::MovieNotFound(movie_id))
    }

    /// Store the poster, persist the movie, and return it with its new id.
    ///
    /// Fails with `FileAlreadyExists` before touching storage when a poster
    /// with the same name is already in the poster directory.
    pub async fn add_movie(&self, details: MovieDetails, upload: PosterUpload) -> AppResult<MovieDto> {
        details.validate()?;
        upload.check()?;
        if self.files.exists(&self.poster_dir, &upload.file_name).await? {
            return Err(AppError::FileAlreadyExists(upload.file_name));
        }

        let poster = self.files.store(&self.poster_dir, &upload).await?;
        let saved = self.movies.save(Movie::new(details, poster)).await?;

        info!(movie_id = ?saved.movie_id, "Added movie {:?}", saved.details.title);
        Ok(self.to_dto(saved))
    }

    pub async fn get_movie(&self, movie_id: i32) -> AppResult<MovieDto> {
        let movie = self.find_existing(movie_id).await?;
        Ok(self.to_dto(movie))
    }

    pub async fn get_all_movies(&self) -> AppResult<Vec<MovieDto>> {
        let movies = self.movies.find_all().await?;
        Ok(movies.into_iter().map(|m| self.to_dto(m)).collect())
    }

    /// Replace the movie's fields. A supplied poster replaces the old file,
    /// otherwise the existing poster is kept.
    pub async fn update_movie(
        &self,
        movie_id: i32,
        details: MovieDetails,
        upload: Option<PosterUpload>,
    ) -> AppResult<MovieDto> {
        let existing = self.find_existing(movie_id).await?;
        details.validate()?;

        let mut poster = existing.poster;
        if let Some(upload) = upload {
            upload.check()?;
            // Reusing this movie's own name is a replacement; any other taken name belongs to another poster
            if upload.file_name != poster
                && self.files.exists(&self.poster_dir, &upload.file_name).await?
            {
                return Err(AppError::FileAlreadyExists(upload.file_name));
            }
            self.files.delete(&self.poster_dir.join(&poster)).await?;
            poster = self.files.store(&self.poster_dir, &upload).await?;
            debug!(movie_id, "Replaced poster with {}", poster);
        }

        let updated = self
            .movies
            .save(Movie {
                movie_id: existing.movie_id,
                details,
                poster,
            })
            .await?;

        info!(movie_id, "Updated movie");
        Ok(self.to_dto(updated))
    }

    /// Remove the poster file, then the record
    pub async fn delete_movie(&self, movie_id: i32) -> AppResult<String> {
        let movie = self.find_existing(movie_id).await?;

        self.files.delete(&self.poster_dir.join(&movie.poster)).await?;
        self.movies.delete(&movie).await?;

        info!(movie_id, "Deleted movie");
        Ok(format!("Movie deleted with id = {}", movie_id))
    }

    pub async fn get_all_movies_with_pagination(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> AppResult<MoviePageResponse> {
        let request = PageRequest::of(page_number, page_size)?;
        self.page(request).await
    }

    /// `direction` is compared case-insensitively; anything but "asc" sorts descending
    pub async fn get_all_movies_with_pagination_and_sorting(
        &self,
        page_number: u32,
        page_size: u32,
        sort_field: &str,
        direction: &str,
    ) -> AppResult<MoviePageResponse> {
        let sort = Sort {
            field: sort_field.parse::<SortField>()?,
            direction: Direction::from_param(direction),
        };
        let request = PageRequest::of(page_number, page_size)?.sorted(sort);
        self.page(request).await
    }

    async fn page(&self, request: PageRequest) -> AppResult<MoviePageResponse> {
        let page = self.movies.find_page(&request).await?;
        Ok(page.map(|m| self.to_dto(m)).into())
    }
}
