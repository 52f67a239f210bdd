// --- Response structs for the movie API ---
use serde::{Deserialize, Serialize};

use crate::database::models::Movie;
use crate::repositories::Page;

/// Movie as returned to clients, with the derived poster URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    #[serde(flatten)]
    pub movie: Movie,
    pub poster_url: String,
}

impl MovieDto {
    pub fn from_movie(movie: Movie, base_url: &str) -> Self {
        let poster_url = poster_url(base_url, &movie.poster);
        Self { movie, poster_url }
    }
}

/// `{base_url}/file/{poster}`
pub fn poster_url(base_url: &str, poster: &str) -> String {
    format!("{}/file/{}", base_url.trim_end_matches('/'), poster)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePageResponse {
    pub movie_dto: Vec<MovieDto>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub is_last: bool,
}

impl From<Page<MovieDto>> for MoviePageResponse {
    fn from(page: Page<MovieDto>) -> Self {
        Self {
            movie_dto: page.content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            is_last: page.is_last,
        }
    }
}

// --- Query structs ---

fn default_page_number() -> u32 {
    0
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_by() -> String {
    "movieId".to_string()
}

fn default_dir() -> String {
    "asc".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSortQuery {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_dir")]
    pub dir: String,
}
