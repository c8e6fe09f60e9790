//! Demonstration dataset used to bootstrap an empty catalog.

use rusqlite::Connection;

use crate::db::{actors::insert_actor, links::insert_movie_actor, movies::insert_movie};
use crate::error::{Result, StoreError};
use crate::models::{Actor, Movie, MovieActor};

pub const DEMO_ACTORS: &[&str] = &[
    "Leonardo DiCaprio",
    "Brad Pitt",
    "Johnny Depp",
    "Tom Hanks",
    "Morgan Freeman",
    "Robert Downey Jr.",
    "Will Smith",
    "Scarlett Johansson",
    "Jennifer Lawrence",
    "Tom Cruise",
    "Chris Hemsworth",
    "Chris Evans",
    "Mark Ruffalo",
    "Chris Pratt",
    "Ryan Reynolds",
    "Dwayne Johnson",
    "Hugh Jackman",
    "Christian Bale",
    "Matthew McConaughey",
    "Anne Hathaway",
    "Emma Stone",
    "Ryan Gosling",
    "Natalie Portman",
    "Gal Gadot",
    "Henry Cavill",
    "Ben Affleck",
    "Robert Pattinson",
    "Margot Robbie",
    "Brie Larson",
    "Zendaya",
];

pub const DEMO_MOVIES: &[&str] = &[
    "Inception",
    "Fight Club",
    "Pirates of the Caribbean",
    "The Dark Knight",
    "The Avengers",
    "Interstellar",
    "The Matrix",
    "Titanic",
    "Forrest Gump",
    "Gladiator",
    "The Wolf of Wall Street",
    "Avatar",
    "Black Panther",
    "Mad Max: Fury Road",
    "Wonder Woman",
];

/// Curated associations as 1-based positions into (`DEMO_MOVIES`,
/// `DEMO_ACTORS`). Positions are resolved to real ids at insert time.
pub const DEMO_LINKS: &[(usize, usize)] = &[
    (1, 1),
    (1, 20),
    (2, 2),
    (2, 18),
    (3, 3),
    (3, 28),
    (4, 18),
    (4, 5),
    (5, 8),
    (5, 6),
    (5, 10),
    (5, 11),
    (6, 1),
    (6, 20),
    (7, 30),
    (7, 24),
    (8, 1),
    (8, 28),
    (9, 4),
    (10, 29),
    (11, 1),
    (11, 27),
    (12, 24),
    (12, 25),
    (13, 25),
    (14, 30),
    (14, 27),
    (15, 24),
    (15, 28),
];

/// Summary of what a seed run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub actors: usize,
    pub movies: usize,
    pub links: usize,
}

/// Insert the demonstration dataset in a single transaction. Links are
/// resolved against the ids the store hands out, so the dataset stays
/// consistent even when the tables already hold rows.
pub fn seed_demo_data(conn: &mut Connection) -> Result<SeedStats> {
    let tx = conn.transaction()?;

    let actors = DEMO_ACTORS
        .iter()
        .map(|name| insert_actor(&tx, &Actor::new(*name)))
        .collect::<Result<Vec<_>>>()?;
    let movies = DEMO_MOVIES
        .iter()
        .map(|name| insert_movie(&tx, &Movie::new(*name)))
        .collect::<Result<Vec<_>>>()?;

    let mut links = 0;
    for &(movie_pos, actor_pos) in DEMO_LINKS {
        let (Some(movie), Some(actor)) = (
            movies.get(movie_pos.wrapping_sub(1)),
            actors.get(actor_pos.wrapping_sub(1)),
        ) else {
            return Err(StoreError::Invalid(format!(
                "seed link ({movie_pos}, {actor_pos}) is out of range"
            )));
        };
        if insert_movie_actor(&tx, MovieActor::new(movie.id, actor.id))? {
            links += 1;
        }
    }

    tx.commit()?;

    let stats = SeedStats {
        actors: actors.len(),
        movies: movies.len(),
        links,
    };
    log::info!(
        "seeded {} actors, {} movies, {} links",
        stats.actors,
        stats.movies,
        stats.links
    );
    Ok(stats)
}

/// True when neither entity table holds a row.
pub fn is_empty(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM movie) + (SELECT COUNT(*) FROM actor)",
        [],
        |row| row.get(0),
    )?;
    Ok(count == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_link_points_inside_the_dataset() {
        for &(movie_pos, actor_pos) in DEMO_LINKS {
            assert!((1..=DEMO_MOVIES.len()).contains(&movie_pos));
            assert!((1..=DEMO_ACTORS.len()).contains(&actor_pos));
        }
    }
}
