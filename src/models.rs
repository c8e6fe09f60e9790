//! Domain models that mirror the SQLite schema and get passed between the
//! persistence layer, the view-model, and the terminal front end. These types
//! stay light-weight data holders; the join views are assembled by explicit
//! queries in `db::links` rather than by any relation mapping.

use std::fmt;

/// A movie row. An `id` of `0` means the row has not been persisted yet and the
/// store should assign one on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Movie {
    /// Primary key from the database. Issued by SQLite and never reused.
    pub id: i64,
    /// Display name shown in lists and detail views.
    pub name: String,
}

impl Movie {
    /// Build an unsaved movie. The store assigns the id on insert.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    /// Build a movie that refers to an existing row.
    pub fn with_id(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An actor row. Same lifecycle as [`Movie`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    pub fn with_id(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One edge of the many-to-many association. The pair is the primary key of
/// the `movie_actor` table, so the struct has no identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovieActor {
    pub movie_id: i64,
    pub actor_id: i64,
}

impl MovieActor {
    pub fn new(movie_id: i64, actor_id: i64) -> Self {
        Self { movie_id, actor_id }
    }
}

/// A movie together with every actor linked to it. Recomputed by the join
/// query whenever one of its tables changes; never persisted.
///
/// The `Default` value (id `0`, empty name, no actors) doubles as the
/// placeholder published while nothing is selected or when the selected movie
/// no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieWithActors {
    pub movie: Movie,
    /// Linked actors ordered by name, case-insensitively.
    pub actors: Vec<Actor>,
}

impl MovieWithActors {
    /// True for the placeholder value rather than a resolved movie.
    pub fn is_placeholder(&self) -> bool {
        self.movie.id == 0
    }
}

/// Mirror image of [`MovieWithActors`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorWithMovies {
    pub actor: Actor,
    pub movies: Vec<Movie>,
}

impl ActorWithMovies {
    pub fn is_placeholder(&self) -> bool {
        self.actor.id == 0
    }
}
