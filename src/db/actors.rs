use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{require_name, Result};
use crate::models::Actor;

pub(crate) fn actor_from_row(row: &Row<'_>) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Retrieve every actor, ordered the same way as movies.
pub fn fetch_actors(conn: &Connection) -> Result<Vec<Actor>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name FROM actor ORDER BY name COLLATE NOCASE, id",
    )?;

    let actors = stmt
        .query_map([], actor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(actors)
}

pub fn fetch_actor(conn: &Connection, id: i64) -> Result<Option<Actor>> {
    let actor = conn
        .query_row(
            "SELECT id, name FROM actor WHERE id = ?1",
            [id],
            actor_from_row,
        )
        .optional()?;
    Ok(actor)
}

/// Insert an actor, letting SQLite assign the id when it is `0`.
pub fn insert_actor(conn: &Connection, actor: &Actor) -> Result<Actor> {
    require_name("Actor", &actor.name)?;
    let name = actor.name.trim();

    if actor.id == 0 {
        conn.execute("INSERT INTO actor (name) VALUES (?1)", params![name])?;
    } else {
        conn.execute(
            "INSERT INTO actor (id, name) VALUES (?1, ?2)",
            params![actor.id, name],
        )?;
    }

    Ok(Actor {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn update_actor(conn: &Connection, actor: &Actor) -> Result<bool> {
    require_name("Actor", &actor.name)?;
    let updated = conn.execute(
        "UPDATE actor SET name = ?1 WHERE id = ?2",
        params![actor.name.trim(), actor.id],
    )?;
    Ok(updated > 0)
}

/// Remove an actor; linked `movie_actor` rows cascade away.
pub fn delete_actor(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM actor WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn insert_actors(conn: &mut Connection, actors: &[Actor]) -> Result<Vec<Actor>> {
    for actor in actors {
        require_name("Actor", &actor.name)?;
    }

    let tx = conn.transaction()?;
    let inserted = actors
        .iter()
        .map(|actor| insert_actor(&tx, actor))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;

    Ok(inserted)
}
