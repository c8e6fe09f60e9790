//! Serialized write queue.
//!
//! Every mutation issued through the view-model lands on one unbounded FIFO
//! channel drained by a single task, so writes from a session complete in the
//! order they were issued. Each write resolves exactly one outcome: through its
//! [`WriteTicket`] when the caller still holds it, otherwise through the
//! view-model's `last_write_error` state.

use std::fmt;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::state::Publisher;
use super::Health;
use crate::dao::Dao;
use crate::db::SeedStats;
use crate::error::{Result, StoreError};
use crate::models::{Actor, Movie, MovieActor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    InsertMovie(Movie),
    UpdateMovie(Movie),
    DeleteMovie(Movie),
    InsertActor(Actor),
    UpdateActor(Actor),
    DeleteActor(Actor),
    InsertMovieActor(MovieActor),
    DeleteMovieActor(MovieActor),
    InsertMovies(Vec<Movie>),
    InsertActors(Vec<Actor>),
    InsertMovieActors(Vec<MovieActor>),
    SeedDemoData,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::InsertMovie(movie) => write!(f, "insert movie \"{}\"", movie.name),
            WriteOp::UpdateMovie(movie) => write!(f, "update movie {}", movie.id),
            WriteOp::DeleteMovie(movie) => write!(f, "delete movie {}", movie.id),
            WriteOp::InsertActor(actor) => write!(f, "insert actor \"{}\"", actor.name),
            WriteOp::UpdateActor(actor) => write!(f, "update actor {}", actor.id),
            WriteOp::DeleteActor(actor) => write!(f, "delete actor {}", actor.id),
            WriteOp::InsertMovieActor(link) => {
                write!(f, "link movie {} to actor {}", link.movie_id, link.actor_id)
            }
            WriteOp::DeleteMovieActor(link) => {
                write!(f, "unlink movie {} from actor {}", link.movie_id, link.actor_id)
            }
            WriteOp::InsertMovies(movies) => write!(f, "insert {} movies", movies.len()),
            WriteOp::InsertActors(actors) => write!(f, "insert {} actors", actors.len()),
            WriteOp::InsertMovieActors(links) => write!(f, "insert {} links", links.len()),
            WriteOp::SeedDemoData => write!(f, "seed demo data"),
        }
    }
}

/// What a completed write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Movie(Movie),
    Actor(Actor),
    Movies(Vec<Movie>),
    Actors(Vec<Actor>),
    /// Whether an update or delete touched a row.
    Changed(bool),
    Links(usize),
    Seeded(SeedStats),
}

/// A write failure nobody was waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub operation: String,
    pub message: String,
}

/// Handle to the outcome of one queued write. Dropping it is fine; the write
/// still runs.
pub struct WriteTicket {
    rx: oneshot::Receiver<Result<WriteOutcome>>,
}

impl WriteTicket {
    pub async fn wait(self) -> Result<WriteOutcome> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(StoreError::Unavailable("write queue closed".into())))
    }
}

pub(crate) struct Job {
    op: WriteOp,
    reply: oneshot::Sender<Result<WriteOutcome>>,
}

#[derive(Clone)]
pub(crate) struct WriteQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteQueue {
    pub(crate) fn submit(&self, op: WriteOp) -> WriteTicket {
        let (reply, rx) = oneshot::channel();
        log::debug!("queued write: {op}");
        if let Err(mpsc::error::SendError(job)) = self.tx.send(Job { op, reply }) {
            log::error!("write queue closed, dropping {}", job.op);
        }
        WriteTicket { rx }
    }
}

/// Start the writer task. It exits once every [`WriteQueue`] clone is dropped
/// and the queued jobs have drained.
pub(crate) fn spawn_writer(
    dao: Dao,
    health: Publisher<Health>,
    last_error: Publisher<Option<WriteFailure>>,
) -> (WriteQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    let handle = tokio::spawn(async move {
        while let Some(Job { op, reply }) = rx.recv().await {
            let label = op.to_string();
            let result = if let Health::Fatal(reason) = health.current() {
                Err(StoreError::Unavailable(reason))
            } else {
                apply(&dao, op).await
            };

            match &result {
                Ok(outcome) => log::debug!("{label}: {outcome:?}"),
                Err(err) => {
                    log::warn!("{label} failed: {err}");
                    if err.is_fatal() {
                        log::error!("store unavailable after {label}: {err}");
                        health.publish(Health::Fatal(err.to_string()));
                    }
                }
            }

            if let Err(Err(err)) = reply.send(result) {
                last_error.publish(Some(WriteFailure {
                    operation: label,
                    message: err.to_string(),
                }));
            }
        }
        log::debug!("write queue drained, writer exiting");
    });

    (WriteQueue { tx }, handle)
}

async fn apply(dao: &Dao, op: WriteOp) -> Result<WriteOutcome> {
    Ok(match op {
        WriteOp::InsertMovie(movie) => WriteOutcome::Movie(dao.insert_movie(movie).await?),
        WriteOp::UpdateMovie(movie) => WriteOutcome::Changed(dao.update_movie(movie).await?),
        WriteOp::DeleteMovie(movie) => WriteOutcome::Changed(dao.delete_movie(movie).await?),
        WriteOp::InsertActor(actor) => WriteOutcome::Actor(dao.insert_actor(actor).await?),
        WriteOp::UpdateActor(actor) => WriteOutcome::Changed(dao.update_actor(actor).await?),
        WriteOp::DeleteActor(actor) => WriteOutcome::Changed(dao.delete_actor(actor).await?),
        WriteOp::InsertMovieActor(link) => {
            WriteOutcome::Changed(dao.insert_movie_actor(link).await?)
        }
        WriteOp::DeleteMovieActor(link) => {
            WriteOutcome::Changed(dao.delete_movie_actor(link).await?)
        }
        WriteOp::InsertMovies(movies) => WriteOutcome::Movies(dao.insert_movies(movies).await?),
        WriteOp::InsertActors(actors) => WriteOutcome::Actors(dao.insert_actors(actors).await?),
        WriteOp::InsertMovieActors(links) => {
            WriteOutcome::Links(dao.insert_movie_actors(links).await?)
        }
        WriteOp::SeedDemoData => WriteOutcome::Seeded(dao.seed_demo_data().await?),
    })
}
