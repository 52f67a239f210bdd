//! PostgreSQL storage for movie records.

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, Movie};
use crate::repositories::{MovieRepository, Page, PageRequest};

const MOVIE_COLUMNS: &str = "movie_id, title, director, studio, movie_cast, release_year, poster";

#[derive(Debug, Clone)]
pub struct PgMovieRepository {
    pool: Pool,
}

impl PgMovieRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn save(&self, movie: Movie) -> Result<Movie> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let cast: Vec<String> = movie.details.movie_cast.iter().cloned().collect();

        let row = match movie.movie_id {
            None => client
                .query_one(
                    &format!(
                        "INSERT INTO movies (title, director, studio, movie_cast, release_year, poster) \
                         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {MOVIE_COLUMNS}"
                    ),
                    &[
                        &movie.details.title,
                        &movie.details.director,
                        &movie.details.studio,
                        &cast,
                        &movie.details.release_year,
                        &movie.poster,
                    ],
                )
                .await
                .context("Failed to insert movie")?,
            Some(movie_id) => client
                .query_one(
                    &format!(
                        "UPDATE movies SET title = $2, director = $3, studio = $4, movie_cast = $5, \
                         release_year = $6, poster = $7 WHERE movie_id = $1 RETURNING {MOVIE_COLUMNS}"
                    ),
                    &[
                        &movie_id,
                        &movie.details.title,
                        &movie.details.director,
                        &movie.details.studio,
                        &cast,
                        &movie.details.release_year,
                        &movie.poster,
                    ],
                )
                .await
                .with_context(|| format!("Failed to update movie {movie_id}"))?,
        };

        Ok(Movie::from_row(&row)?)
    }

    async fn find_by_id(&self, movie_id: i32) -> Result<Option<Movie>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = $1"),
                &[&movie_id],
            )
            .await
            .context("Failed to query movie by id")?;
        Ok(row.map(|r| Movie::from_row(&r)).transpose()?)
    }

    async fn find_all(&self) -> Result<Vec<Movie>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY movie_id"), &[])
            .await
            .context("Failed to query movies")?;
        Ok(rows.iter().map(Movie::from_row).collect::<Result<_, _>>()?)
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Movie>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;

        let total: i64 = client
            .query_one("SELECT COUNT(*) FROM movies", &[])
            .await
            .context("Failed to count movies")?
            .get(0);

        // Column and direction come from closed enums, never from raw input
        let order_by = match request.sort {
            Some(sort) => format!("{} {}, movie_id", sort.field.column(), sort.direction.as_sql()),
            None => "movie_id".to_string(),
        };
        let limit = i64::from(request.page_size);
        let offset = i64::try_from(request.offset()).context("Page offset out of range")?;

        let rows = client
            .query(
                &format!(
                    "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY {order_by} LIMIT $1 OFFSET $2"
                ),
                &[&limit, &offset],
            )
            .await
            .context("Failed to query movie page")?;
        let content = rows.iter().map(Movie::from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, request, total.max(0) as u64))
    }

    async fn delete(&self, movie: &Movie) -> Result<()> {
        let Some(movie_id) = movie.movie_id else {
            anyhow::bail!("Cannot delete a movie that was never saved");
        };
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        client
            .execute("DELETE FROM movies WHERE movie_id = $1", &[&movie_id])
            .await
            .with_context(|| format!("Failed to delete movie {movie_id}"))?;
        Ok(())
    }
}
