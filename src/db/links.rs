use rusqlite::{params, Connection};

use crate::db::actors::{actor_from_row, fetch_actor};
use crate::db::movies::{fetch_movie, movie_from_row};
use crate::error::Result;
use crate::models::{ActorWithMovies, MovieActor, MovieWithActors};

/// Link a movie and an actor. `INSERT OR IGNORE` makes a repeated request a
/// no-op. Foreign keys are not covered by the conflict clause, so a dangling id
/// still fails as a constraint error. Returns whether a new edge was stored.
pub fn insert_movie_actor(conn: &Connection, link: MovieActor) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO movie_actor (movie_id, actor_id) VALUES (?1, ?2)",
        params![link.movie_id, link.actor_id],
    )?;
    Ok(inserted > 0)
}

/// Remove a single edge. A missing edge is a no-op.
pub fn delete_movie_actor(conn: &Connection, link: MovieActor) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM movie_actor WHERE movie_id = ?1 AND actor_id = ?2",
        params![link.movie_id, link.actor_id],
    )?;
    Ok(deleted > 0)
}

/// Insert a batch of edges in one transaction. Duplicates are ignored, but a
/// single edge pointing at a missing movie or actor rolls back the batch.
pub fn insert_movie_actors(conn: &mut Connection, links: &[MovieActor]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut inserted = 0;
    for link in links {
        if insert_movie_actor(&tx, *link)? {
            inserted += 1;
        }
    }
    tx.commit()?;
    Ok(inserted)
}

pub fn fetch_links(conn: &Connection) -> Result<Vec<MovieActor>> {
    let mut stmt = conn.prepare_cached(
        "SELECT movie_id, actor_id FROM movie_actor ORDER BY movie_id, actor_id",
    )?;

    let links = stmt
        .query_map([], |row| {
            Ok(MovieActor {
                movie_id: row.get(0)?,
                actor_id: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(links)
}

/// Load a movie with every linked actor. Returns `None` when the movie row does
/// not exist.
pub fn fetch_movie_with_actors(conn: &Connection, movie_id: i64) -> Result<Option<MovieWithActors>> {
    let Some(movie) = fetch_movie(conn, movie_id)? else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached(
        "SELECT a.id, a.name
         FROM actor a
         INNER JOIN movie_actor ma ON ma.actor_id = a.id
         WHERE ma.movie_id = ?1
         ORDER BY a.name COLLATE NOCASE, a.id",
    )?;

    let actors = stmt
        .query_map([movie_id], actor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(MovieWithActors { movie, actors }))
}

/// Load an actor with every linked movie. Returns `None` when the actor row
/// does not exist.
pub fn fetch_actor_with_movies(conn: &Connection, actor_id: i64) -> Result<Option<ActorWithMovies>> {
    let Some(actor) = fetch_actor(conn, actor_id)? else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached(
        "SELECT m.id, m.name
         FROM movie m
         INNER JOIN movie_actor ma ON ma.movie_id = m.id
         WHERE ma.actor_id = ?1
         ORDER BY m.name COLLATE NOCASE, m.id",
    )?;

    let movies = stmt
        .query_map([actor_id], movie_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ActorWithMovies { actor, movies }))
}
