//! Reactive bridge between the data-access layer and a front end.
//!
//! The view-model owns two pieces of transient state (the selected movie and
//! actor ids) and exposes four continuously updated [`SharedState`] values.
//! Reads come from live queries; writes go through a single FIFO queue and are
//! fire-and-forget for the caller.

mod state;
mod writer;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::dao::{Dao, LiveQuery};
use crate::error::StoreError;
use crate::models::{Actor, ActorWithMovies, Movie, MovieActor, MovieWithActors};

pub use state::{Observer, Publisher, SharedState};
pub use writer::{WriteFailure, WriteOp, WriteOutcome, WriteTicket};

use writer::{spawn_writer, WriteQueue};

/// How long a state keeps its live query after the last observer detaches.
pub const DEFAULT_IDLE_GRACE: Duration = Duration::from_secs(5);

/// Selection sentinel meaning "nothing selected".
pub const NO_SELECTION: i64 = 0;

/// Whether the store behind the view-model is still usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Health {
    #[default]
    Healthy,
    /// The store failed in a way the session cannot recover from.
    Fatal(String),
}

impl Health {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Health::Fatal(_))
    }
}

pub struct AppViewModel {
    dao: Dao,
    selected_movie: watch::Sender<i64>,
    selected_actor: watch::Sender<i64>,
    movies: SharedState<Vec<Movie>>,
    actors: SharedState<Vec<Actor>>,
    movie_with_actors: SharedState<MovieWithActors>,
    actor_with_movies: SharedState<ActorWithMovies>,
    health: SharedState<Health>,
    last_write_error: SharedState<Option<WriteFailure>>,
    writes: WriteQueue,
    _writer: JoinHandle<()>,
}

impl AppViewModel {
    /// Wire the view-model to `dao`. Spawns its background tasks, so it must be
    /// called from inside a tokio runtime (or with one entered).
    pub fn new(dao: Dao, idle_grace: Duration) -> Self {
        let health = SharedState::local("health", Health::Healthy);
        let last_write_error = SharedState::local("last_write_error", None);

        let (selected_movie, movie_selection) = watch::channel(NO_SELECTION);
        let (selected_actor, actor_selection) = watch::channel(NO_SELECTION);

        let movies = {
            let dao = dao.clone();
            let health = health.publisher();
            SharedState::new("movies", Vec::new(), idle_grace, move |publisher| {
                follow_table(dao.all_movies(), publisher, health.clone())
            })
        };

        let actors = {
            let dao = dao.clone();
            let health = health.publisher();
            SharedState::new("actors", Vec::new(), idle_grace, move |publisher| {
                follow_table(dao.all_actors(), publisher, health.clone())
            })
        };

        let movie_with_actors = {
            let dao = dao.clone();
            let health = health.publisher();
            SharedState::new(
                "movie_with_actors",
                MovieWithActors::default(),
                idle_grace,
                move |publisher| {
                    let dao = dao.clone();
                    follow_selection(
                        movie_selection.clone(),
                        move |id| dao.movie_with_actors(id),
                        publisher,
                        health.clone(),
                    )
                },
            )
        };

        let actor_with_movies = {
            let dao = dao.clone();
            let health = health.publisher();
            SharedState::new(
                "actor_with_movies",
                ActorWithMovies::default(),
                idle_grace,
                move |publisher| {
                    let dao = dao.clone();
                    follow_selection(
                        actor_selection.clone(),
                        move |id| dao.actor_with_movies(id),
                        publisher,
                        health.clone(),
                    )
                },
            )
        };

        let (writes, writer) = spawn_writer(
            dao.clone(),
            health.publisher(),
            last_write_error.publisher(),
        );

        Self {
            dao,
            selected_movie,
            selected_actor,
            movies,
            actors,
            movie_with_actors,
            actor_with_movies,
            health,
            last_write_error,
            writes,
            _writer: writer,
        }
    }

    pub fn dao(&self) -> &Dao {
        &self.dao
    }

    // ---- read interface ----

    pub fn movies(&self) -> &SharedState<Vec<Movie>> {
        &self.movies
    }

    pub fn actors(&self) -> &SharedState<Vec<Actor>> {
        &self.actors
    }

    pub fn movie_with_actors(&self) -> &SharedState<MovieWithActors> {
        &self.movie_with_actors
    }

    pub fn actor_with_movies(&self) -> &SharedState<ActorWithMovies> {
        &self.actor_with_movies
    }

    pub fn health(&self) -> &SharedState<Health> {
        &self.health
    }

    pub fn last_write_error(&self) -> &SharedState<Option<WriteFailure>> {
        &self.last_write_error
    }

    pub fn selected_movie_id(&self) -> i64 {
        *self.selected_movie.borrow()
    }

    pub fn selected_actor_id(&self) -> i64 {
        *self.selected_actor.borrow()
    }

    /// Forget the last unobserved write failure once it has been shown.
    pub fn clear_write_error(&self) {
        self.last_write_error.publisher().publish(None);
    }

    // ---- selection ----

    /// Point `movie_with_actors` at `movie_id`. The join for the previous id
    /// is dropped; none of its results are published after this call is seen.
    pub fn select_movie(&self, movie_id: i64) {
        self.selected_movie.send_replace(movie_id);
    }

    pub fn select_actor(&self, actor_id: i64) {
        self.selected_actor.send_replace(actor_id);
    }

    // ---- commands ----

    pub fn insert_movie(&self, movie: Movie) -> WriteTicket {
        self.writes.submit(WriteOp::InsertMovie(movie))
    }

    pub fn update_movie(&self, movie: Movie) -> WriteTicket {
        self.writes.submit(WriteOp::UpdateMovie(movie))
    }

    pub fn delete_movie(&self, movie: Movie) -> WriteTicket {
        self.writes.submit(WriteOp::DeleteMovie(movie))
    }

    pub fn insert_actor(&self, actor: Actor) -> WriteTicket {
        self.writes.submit(WriteOp::InsertActor(actor))
    }

    pub fn update_actor(&self, actor: Actor) -> WriteTicket {
        self.writes.submit(WriteOp::UpdateActor(actor))
    }

    pub fn delete_actor(&self, actor: Actor) -> WriteTicket {
        self.writes.submit(WriteOp::DeleteActor(actor))
    }

    pub fn insert_movie_actor(&self, link: MovieActor) -> WriteTicket {
        self.writes.submit(WriteOp::InsertMovieActor(link))
    }

    pub fn delete_movie_actor(&self, link: MovieActor) -> WriteTicket {
        self.writes.submit(WriteOp::DeleteMovieActor(link))
    }

    pub fn insert_movies(&self, movies: Vec<Movie>) -> WriteTicket {
        self.writes.submit(WriteOp::InsertMovies(movies))
    }

    pub fn insert_actors(&self, actors: Vec<Actor>) -> WriteTicket {
        self.writes.submit(WriteOp::InsertActors(actors))
    }

    pub fn insert_movie_actors(&self, links: Vec<MovieActor>) -> WriteTicket {
        self.writes.submit(WriteOp::InsertMovieActors(links))
    }

    /// Queue the demonstration dataset. Purely a convenience for an empty
    /// catalog.
    pub fn seed_demo_data(&self) -> WriteTicket {
        self.writes.submit(WriteOp::SeedDemoData)
    }
}

/// Publish every result of a table query. Failed refreshes keep the last good
/// value on screen.
async fn follow_table<T>(mut live: LiveQuery<T>, publisher: Publisher<T>, health: Publisher<Health>)
where
    T: PartialEq + Send + 'static,
{
    while let Some(result) = live.next().await {
        match result {
            Ok(value) => publisher.publish(value),
            Err(err) => report_read_error(&health, live.tables(), &err),
        }
    }
}

/// Follow the join for whichever id is currently selected.
///
/// The selection branch is polled first, so once a newer id has been observed
/// a result computed for the old id is dropped instead of published.
async fn follow_selection<T, Q>(
    mut selection: watch::Receiver<i64>,
    open: Q,
    publisher: Publisher<T>,
    health: Publisher<Health>,
) where
    T: Default + PartialEq + Send + 'static,
    Q: Fn(i64) -> LiveQuery<Option<T>>,
{
    loop {
        let id = *selection.borrow_and_update();
        log::debug!("join switched to id {id}");
        let mut live = open(id);

        loop {
            tokio::select! {
                biased;
                changed = selection.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                next = live.next() => match next {
                    Some(Ok(value)) => publisher.publish(value.unwrap_or_default()),
                    Some(Err(err)) => report_read_error(&health, live.tables(), &err),
                    None => return,
                },
            }
        }
    }
}

fn report_read_error(health: &Publisher<Health>, tables: &[crate::dao::Table], err: &StoreError) {
    log::warn!("refresh of {tables:?} failed, keeping last value: {err}");
    if err.is_fatal() {
        health.publish(Health::Fatal(err.to_string()));
    }
}
