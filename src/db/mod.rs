//! Persistence module split across logical submodules. Every function takes a
//! `rusqlite::Connection` and runs one query, one statement, or one
//! transaction; the async handle in `dao` layers change tracking on top.

mod actors;
mod connection;
mod links;
mod movies;
mod seed;

pub use actors::{delete_actor, fetch_actor, fetch_actors, insert_actor, insert_actors, update_actor};
pub use connection::{ensure_schema, open_database, open_memory, SCHEMA_VERSION};
pub use links::{
    delete_movie_actor, fetch_actor_with_movies, fetch_links, fetch_movie_with_actors,
    insert_movie_actor, insert_movie_actors,
};
pub use movies::{delete_movie, fetch_movie, fetch_movies, insert_movie, insert_movies, update_movie};
pub use seed::{is_empty, seed_demo_data, SeedStats, DEMO_ACTORS, DEMO_LINKS, DEMO_MOVIES};
