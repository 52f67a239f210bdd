//! In-memory repository fakes for unit tests.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::database::models::{ForgotPassword, Movie, NewUser, RefreshToken, User};
use crate::repositories::{
    Direction, ForgotPasswordRepository, MovieRepository, Page, PageRequest, RefreshTokenRepository,
    SortField, UserRepository,
};

/// Rows keyed by id, plus the next id to hand out
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ============================================================================
// MOVIES
// ============================================================================

#[derive(Default)]
pub struct InMemoryMovieRepository {
    table: Mutex<Table<Movie>>,
    saves: Mutex<usize>,
}

impl InMemoryMovieRepository {
    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn len(&self) -> usize {
        self.table.lock().rows.len()
    }
}

fn compare_by(field: SortField, a: &Movie, b: &Movie) -> Ordering {
    match field {
        SortField::MovieId => a.movie_id.cmp(&b.movie_id),
        SortField::Title => a.details.title.cmp(&b.details.title),
        SortField::Director => a.details.director.cmp(&b.details.director),
        SortField::Studio => a.details.studio.cmp(&b.details.studio),
        SortField::ReleaseYear => a.details.release_year.cmp(&b.details.release_year),
        SortField::Poster => a.poster.cmp(&b.poster),
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn save(&self, mut movie: Movie) -> Result<Movie> {
        let mut table = self.table.lock();
        let id = match movie.movie_id {
            Some(id) if table.rows.contains_key(&id) => id,
            Some(id) => anyhow::bail!("no movie with id {id} to update"),
            None => table.allocate_id(),
        };
        movie.movie_id = Some(id);
        table.rows.insert(id, movie.clone());
        *self.saves.lock() += 1;
        Ok(movie)
    }

    async fn find_by_id(&self, movie_id: i32) -> Result<Option<Movie>> {
        Ok(self.table.lock().rows.get(&movie_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Movie>> {
        Ok(self.table.lock().rows.values().cloned().collect())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Movie>> {
        let mut movies: Vec<Movie> = self.table.lock().rows.values().cloned().collect();
        if let Some(sort) = request.sort {
            movies.sort_by(|a, b| {
                let ordering = compare_by(sort.field, a, b);
                let ordering = match sort.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                };
                ordering.then(a.movie_id.cmp(&b.movie_id))
            });
        }
        let total = movies.len() as u64;
        let content = movies
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn delete(&self, movie: &Movie) -> Result<()> {
        if let Some(id) = movie.movie_id {
            self.table.lock().rows.remove(&id);
        }
        Ok(())
    }
}

// ============================================================================
// USERS
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn password_of(&self, email: &str) -> Option<String> {
        self.table
            .lock()
            .rows
            .values()
            .find(|u| u.email == email)
            .map(|u| u.password.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut table = self.table.lock();
        if table.rows.values().any(|u| u.email == user.email || u.username == user.username) {
            anyhow::bail!("duplicate key value violates unique constraint");
        }
        let user = User {
            user_id: table.allocate_id(),
            name: user.name,
            email: user.email,
            username: user.username,
            password: user.password_hash,
            role: user.role,
        };
        table.rows.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.table.lock().rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.table.lock().rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        Ok(self.table.lock().rows.get(&user_id).cloned())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<u64> {
        let mut table = self.table.lock();
        let mut updated = 0;
        for user in table.rows.values_mut().filter(|u| u.email == email) {
            user.password = password_hash.to_string();
            updated += 1;
        }
        Ok(updated)
    }
}

// ============================================================================
// OTPS
// ============================================================================

#[derive(Default)]
pub struct InMemoryForgotPasswordRepository {
    table: Mutex<Table<ForgotPassword>>,
}

impl InMemoryForgotPasswordRepository {
    pub fn for_user(&self, user_id: i32) -> Option<ForgotPassword> {
        self.table.lock().rows.values().find(|fp| fp.user_id == user_id).cloned()
    }

    /// Overwrite the expiration of the user's record
    pub fn set_expiration(&self, user_id: i32, expiration: chrono::DateTime<chrono::Utc>) {
        for fp in self.table.lock().rows.values_mut().filter(|fp| fp.user_id == user_id) {
            fp.expiration_time = expiration;
        }
    }
}

#[async_trait]
impl ForgotPasswordRepository for InMemoryForgotPasswordRepository {
    async fn save(&self, mut record: ForgotPassword) -> Result<ForgotPassword> {
        let mut table = self.table.lock();
        table.rows.retain(|_, fp| fp.user_id != record.user_id);
        let id = table.allocate_id();
        record.fpid = Some(id);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_otp_and_user(&self, otp: i32, user_id: i32) -> Result<Option<ForgotPassword>> {
        Ok(self
            .table
            .lock()
            .rows
            .values()
            .find(|fp| fp.otp == otp && fp.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, fpid: i32) -> Result<()> {
        self.table.lock().rows.remove(&fpid);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<()> {
        self.table.lock().rows.retain(|_, fp| fp.user_id != user_id);
        Ok(())
    }
}

// ============================================================================
// REFRESH TOKENS
// ============================================================================

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    table: Mutex<Table<RefreshToken>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn set_expiration(&self, token: &str, expiration: chrono::DateTime<chrono::Utc>) {
        for rt in self.table.lock().rows.values_mut().filter(|rt| rt.refresh_token == token) {
            rt.expiration_time = expiration;
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().rows.len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn save(&self, mut token: RefreshToken) -> Result<RefreshToken> {
        let mut table = self.table.lock();
        table.rows.retain(|_, rt| rt.user_id != token.user_id);
        let id = table.allocate_id();
        token.token_id = Some(id);
        table.rows.insert(id, token.clone());
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self
            .table
            .lock()
            .rows
            .values()
            .find(|rt| rt.refresh_token == token)
            .cloned())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Option<RefreshToken>> {
        Ok(self.table.lock().rows.values().find(|rt| rt.user_id == user_id).cloned())
    }

    async fn delete(&self, token_id: i32) -> Result<()> {
        self.table.lock().rows.remove(&token_id);
        Ok(())
    }
}
