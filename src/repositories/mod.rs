//! # Repositories Module
//!
//! Storage collaborators behind async traits. Services only see the traits, so
//! PostgreSQL implementations serve production and in-memory fakes serve tests.

pub mod movie_repository;
pub mod user_repository;
pub mod forgot_password_repository;
pub mod refresh_token_repository;

#[cfg(test)]
pub mod memory;

use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;

use crate::database::models::{ForgotPassword, Movie, NewUser, RefreshToken, User};
use crate::error::AppError;

pub use forgot_password_repository::PgForgotPasswordRepository;
pub use movie_repository::PgMovieRepository;
pub use refresh_token_repository::PgRefreshTokenRepository;
pub use user_repository::PgUserRepository;

// ============================================================================
// PAGING & SORTING
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// "asc" in any case is ascending, every other value is descending
    pub fn from_param(dir: &str) -> Self {
        if dir.eq_ignore_ascii_case("asc") {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// Movie fields that listings can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    MovieId,
    Title,
    Director,
    Studio,
    ReleaseYear,
    Poster,
}

impl SortField {
    /// Column the field is stored in
    pub fn column(&self) -> &'static str {
        match self {
            SortField::MovieId => "movie_id",
            SortField::Title => "title",
            SortField::Director => "director",
            SortField::Studio => "studio",
            SortField::ReleaseYear => "release_year",
            SortField::Poster => "poster",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movieId" | "movie_id" => Ok(SortField::MovieId),
            "title" => Ok(SortField::Title),
            "director" => Ok(SortField::Director),
            "studio" => Ok(SortField::Studio),
            "releaseYear" | "release_year" => Ok(SortField::ReleaseYear),
            "poster" => Ok(SortField::Poster),
            other => Err(AppError::InvalidSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn of(page_number: u32, page_size: u32) -> Result<Self, AppError> {
        if page_size == 0 {
            return Err(AppError::InvalidPageRequest(
                "Page size must not be less than one".to_string(),
            ));
        }
        Ok(Self {
            page_number,
            page_size,
            sort: None,
        })
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }
}

/// One page of a listing plus the metadata needed to walk the rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub is_last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.page_size);
        let total_pages = total_elements.div_ceil(size) as u32;
        Self {
            content,
            page_number: request.page_number,
            page_size: request.page_size,
            total_elements,
            total_pages,
            is_last: request.page_number.saturating_add(1) >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            is_last: self.is_last,
        }
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Persistence for movie records
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert when `movie_id` is `None`, update otherwise. Returns the stored record.
    async fn save(&self, movie: Movie) -> Result<Movie>;
    async fn find_by_id(&self, movie_id: i32) -> Result<Option<Movie>>;
    async fn find_all(&self) -> Result<Vec<Movie>>;
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Movie>>;
    async fn delete(&self, movie: &Movie) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>>;
    /// Returns the number of rows updated
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<u64>;
}

#[async_trait]
pub trait ForgotPasswordRepository: Send + Sync {
    async fn save(&self, record: ForgotPassword) -> Result<ForgotPassword>;
    /// Matches on both the OTP value and the owning user
    async fn find_by_otp_and_user(&self, otp: i32, user_id: i32) -> Result<Option<ForgotPassword>>;
    async fn delete(&self, fpid: i32) -> Result<()>;
    async fn delete_for_user(&self, user_id: i32) -> Result<()>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken>;
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;
    async fn find_by_user(&self, user_id: i32) -> Result<Option<RefreshToken>>;
    async fn delete(&self, token_id: i32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_metadata_for_partial_last_page() {
        let request = PageRequest::of(0, 2).unwrap();
        let page = Page::new(vec![1, 2], &request, 5);
        assert_eq!(page.total_pages, 3);
        assert!(!page.is_last);

        let last = Page::new(vec![5], &PageRequest::of(2, 2).unwrap(), 5);
        assert!(last.is_last);
    }

    #[test]
    fn empty_listing_is_a_single_last_page() {
        let page: Page<i32> = Page::new(vec![], &PageRequest::of(0, 10).unwrap(), 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_last);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(PageRequest::of(0, 0), Err(AppError::InvalidPageRequest(_))));
    }

    #[test]
    fn direction_is_case_insensitive_and_defaults_to_descending() {
        assert_eq!(Direction::from_param("ASC"), Direction::Ascending);
        assert_eq!(Direction::from_param("asc"), Direction::Ascending);
        assert_eq!(Direction::from_param("desc"), Direction::Descending);
        assert_eq!(Direction::from_param("sideways"), Direction::Descending);
    }

    #[test]
    fn sort_field_accepts_wire_names_only() {
        assert_eq!("releaseYear".parse::<SortField>().unwrap(), SortField::ReleaseYear);
        assert_eq!("movieId".parse::<SortField>().unwrap().column(), "movie_id");
        assert!(matches!(
            "title; DROP TABLE movies".parse::<SortField>(),
            Err(AppError::InvalidSortField(_))
        ));
    }
}
