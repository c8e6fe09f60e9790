use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{require_name, Result};
use crate::models::Movie;

pub(crate) fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Retrieve every movie ordered case-insensitively by name. The id breaks ties
/// so two movies sharing a name keep a stable order across refreshes.
pub fn fetch_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name FROM movie ORDER BY name COLLATE NOCASE, id",
    )?;

    let movies = stmt
        .query_map([], movie_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(movies)
}

pub fn fetch_movie(conn: &Connection, id: i64) -> Result<Option<Movie>> {
    let movie = conn
        .query_row(
            "SELECT id, name FROM movie WHERE id = ?1",
            [id],
            movie_from_row,
        )
        .optional()?;
    Ok(movie)
}

/// Insert a movie and return it with the id the store settled on. An id of `0`
/// lets SQLite assign the next one; any other id is inserted as given and
/// collides with an existing row as a constraint error.
pub fn insert_movie(conn: &Connection, movie: &Movie) -> Result<Movie> {
    require_name("Movie", &movie.name)?;
    let name = movie.name.trim();

    if movie.id == 0 {
        conn.execute("INSERT INTO movie (name) VALUES (?1)", params![name])?;
    } else {
        conn.execute(
            "INSERT INTO movie (id, name) VALUES (?1, ?2)",
            params![movie.id, name],
        )?;
    }

    Ok(Movie {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Replace the name of the movie with this id. Returns whether a row changed;
/// an unknown id is a no-op.
pub fn update_movie(conn: &Connection, movie: &Movie) -> Result<bool> {
    require_name("Movie", &movie.name)?;
    let updated = conn.execute(
        "UPDATE movie SET name = ?1 WHERE id = ?2",
        params![movie.name.trim(), movie.id],
    )?;
    Ok(updated > 0)
}

/// Remove a movie. The schema cascades to `movie_actor`, so links go with it.
pub fn delete_movie(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM movie WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Insert a batch of movies in one transaction. Every name is checked before
/// the transaction opens; a failing row rolls back the whole batch.
pub fn insert_movies(conn: &mut Connection, movies: &[Movie]) -> Result<Vec<Movie>> {
    for movie in movies {
        require_name("Movie", &movie.name)?;
    }

    let tx = conn.transaction()?;
    let inserted = movies
        .iter()
        .map(|movie| insert_movie(&tx, movie))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;

    Ok(inserted)
}
