//! Core library surface for the movie catalog.
//!
//! Layers, leaves first: `models` and `db` hold the schema and the
//! synchronous SQLite operations, `dao` wraps the single connection in an
//! async handle with live queries, `viewmodel` turns those into observable
//! state plus a serialized write queue, and `ui` is the terminal front end.
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;
pub mod viewmodel;

pub use config::AppConfig;
pub use dao::{Dao, LiveQuery};
pub use error::StoreError;

/// The domain types every layer passes around.
pub use models::{Actor, ActorWithMovies, Movie, MovieActor, MovieWithActors};

pub use ui::{run_app, App};
pub use viewmodel::{AppViewModel, Health, SharedState, WriteTicket};
