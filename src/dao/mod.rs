//! Asynchronous data-access handle over the catalog database.
//!
//! One `Dao` wraps the single long-lived SQLite connection. Every call runs on
//! tokio's blocking pool so callers never block on store I/O. Writes bump the
//! tracker for the tables they touched once they commit, which is what wakes
//! the [`LiveQuery`] streams.

mod live;
mod tracker;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::db;
use crate::error::{Result, StoreError};
use crate::models::{Actor, ActorWithMovies, Movie, MovieActor, MovieWithActors};

pub use live::LiveQuery;
pub use tracker::{InvalidationTracker, Table, TableVersions};

const MOVIE_TABLES: &[Table] = &[Table::Movie];
const ACTOR_TABLES: &[Table] = &[Table::Actor];
const LINK_TABLES: &[Table] = &[Table::MovieActor];
const MOVIE_DELETE_TABLES: &[Table] = &[Table::Movie, Table::MovieActor];
const ACTOR_DELETE_TABLES: &[Table] = &[Table::Actor, Table::MovieActor];

/// Cheap-to-clone handle to the catalog store.
#[derive(Clone)]
pub struct Dao {
    inner: Arc<DaoInner>,
}

struct DaoInner {
    conn: Mutex<Connection>,
    tracker: InvalidationTracker,
}

impl Dao {
    /// Take ownership of an already-initialized connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(DaoInner {
                conn: Mutex::new(conn),
                tracker: InvalidationTracker::new(),
            }),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        db::open_database(path).map(Self::new)
    }

    pub fn open_memory() -> Result<Self> {
        db::open_memory().map(Self::new)
    }

    pub fn versions(&self) -> TableVersions {
        self.inner.tracker.current()
    }

    /// Run a read on the blocking pool.
    pub(crate) async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        self.run_blocking(move |conn| f(conn)).await
    }

    /// Run a write on the blocking pool and invalidate `touched` once it has
    /// committed. Failed writes invalidate nothing.
    async fn write<T, F>(&self, touched: &'static [Table], f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let value = self.run_blocking(f).await?;
        self.inner.tracker.invalidate(touched);
        Ok(value)
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut conn = inner
                .conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
            f(&mut conn)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("store task failed: {err}")))?
    }

    // ---- live queries ----

    pub fn all_movies(&self) -> LiveQuery<Vec<Movie>> {
        LiveQuery::new(self.clone(), MOVIE_TABLES, db::fetch_movies)
    }

    pub fn all_actors(&self) -> LiveQuery<Vec<Actor>> {
        LiveQuery::new(self.clone(), ACTOR_TABLES, db::fetch_actors)
    }

    /// Live join of one movie with its actors. Emits `None` while the movie
    /// does not exist.
    pub fn movie_with_actors(&self, movie_id: i64) -> LiveQuery<Option<MovieWithActors>> {
        LiveQuery::new(self.clone(), Table::ALL, move |conn| {
            db::fetch_movie_with_actors(conn, movie_id)
        })
    }

    pub fn actor_with_movies(&self, actor_id: i64) -> LiveQuery<Option<ActorWithMovies>> {
        LiveQuery::new(self.clone(), Table::ALL, move |conn| {
            db::fetch_actor_with_movies(conn, actor_id)
        })
    }

    // ---- one-shot reads ----

    pub async fn movies(&self) -> Result<Vec<Movie>> {
        self.read(db::fetch_movies).await
    }

    pub async fn actors(&self) -> Result<Vec<Actor>> {
        self.read(db::fetch_actors).await
    }

    pub async fn links(&self) -> Result<Vec<MovieActor>> {
        self.read(db::fetch_links).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.read(db::is_empty).await
    }

    // ---- movies ----

    pub async fn insert_movie(&self, movie: Movie) -> Result<Movie> {
        self.write(MOVIE_TABLES, move |conn| db::insert_movie(conn, &movie))
            .await
    }

    pub async fn update_movie(&self, movie: Movie) -> Result<bool> {
        self.write(MOVIE_TABLES, move |conn| db::update_movie(conn, &movie))
            .await
    }

    pub async fn delete_movie(&self, movie: Movie) -> Result<bool> {
        self.write(MOVIE_DELETE_TABLES, move |conn| {
            db::delete_movie(conn, movie.id)
        })
        .await
    }

    pub async fn insert_movies(&self, movies: Vec<Movie>) -> Result<Vec<Movie>> {
        self.write(MOVIE_TABLES, move |conn| db::insert_movies(conn, &movies))
            .await
    }

    // ---- actors ----

    pub async fn insert_actor(&self, actor: Actor) -> Result<Actor> {
        self.write(ACTOR_TABLES, move |conn| db::insert_actor(conn, &actor))
            .await
    }

    pub async fn update_actor(&self, actor: Actor) -> Result<bool> {
        self.write(ACTOR_TABLES, move |conn| db::update_actor(conn, &actor))
            .await
    }

    pub async fn delete_actor(&self, actor: Actor) -> Result<bool> {
        self.write(ACTOR_DELETE_TABLES, move |conn| {
            db::delete_actor(conn, actor.id)
        })
        .await
    }

    pub async fn insert_actors(&self, actors: Vec<Actor>) -> Result<Vec<Actor>> {
        self.write(ACTOR_TABLES, move |conn| db::insert_actors(conn, &actors))
            .await
    }

    // ---- links ----

    pub async fn insert_movie_actor(&self, link: MovieActor) -> Result<bool> {
        self.write(LINK_TABLES, move |conn| db::insert_movie_actor(conn, link))
            .await
    }

    pub async fn delete_movie_actor(&self, link: MovieActor) -> Result<bool> {
        self.write(LINK_TABLES, move |conn| db::delete_movie_actor(conn, link))
            .await
    }

    pub async fn insert_movie_actors(&self, links: Vec<MovieActor>) -> Result<usize> {
        self.write(LINK_TABLES, move |conn| {
            db::insert_movie_actors(conn, &links)
        })
        .await
    }

    pub async fn seed_demo_data(&self) -> Result<db::SeedStats> {
        self.write(Table::ALL, db::seed_demo_data).await
    }
}
