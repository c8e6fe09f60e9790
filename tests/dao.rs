use std::time::Duration;

use movie_catalog::dao::Table;
use movie_catalog::{Actor, Dao, Movie, MovieActor};
use tokio::time::timeout;

const QUIET: Duration = Duration::from_millis(150);

#[tokio::test]
async fn live_list_emits_immediately_then_after_each_write() {
    let dao = Dao::open_memory().unwrap();
    let mut movies = dao.all_movies();

    assert!(movies.next().await.unwrap().unwrap().is_empty());

    dao.insert_movie(Movie::new("Interstellar")).await.unwrap();
    let after = movies.next().await.unwrap().unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].name, "Interstellar");
}

#[tokio::test]
async fn writes_to_other_tables_do_not_wake_a_list() {
    let dao = Dao::open_memory().unwrap();
    let mut movies = dao.all_movies();
    movies.next().await.unwrap().unwrap();

    dao.insert_actor(Actor::new("Zoe Saldana")).await.unwrap();
    assert!(timeout(QUIET, movies.next()).await.is_err());

    // The cancelled wait above must not swallow the next real change.
    dao.insert_movie(Movie::new("Avatar")).await.unwrap();
    let after = movies.next().await.unwrap().unwrap();
    assert_eq!(after.len(), 1);
}

#[tokio::test]
async fn bursts_of_writes_coalesce_into_the_final_state() {
    let dao = Dao::open_memory().unwrap();
    let mut actors = dao.all_actors();
    actors.next().await.unwrap().unwrap();

    for name in ["Chris Pratt", "Vin Diesel", "Dave Bautista"] {
        dao.insert_actor(Actor::new(name)).await.unwrap();
    }

    assert_eq!(actors.next().await.unwrap().unwrap().len(), 3);
    assert!(timeout(QUIET, actors.next()).await.is_err());
}

#[tokio::test]
async fn join_follows_links_and_cascading_deletes() {
    let dao = Dao::open_memory().unwrap();
    let movie = dao.insert_movie(Movie::new("Joker")).await.unwrap();
    let actor = dao.insert_actor(Actor::new("Joaquin Phoenix")).await.unwrap();
    let mut joined = dao.movie_with_actors(movie.id);
    assert_eq!(joined.tables(), Table::ALL);

    let first = joined.next().await.unwrap().unwrap().unwrap();
    assert!(first.actors.is_empty());

    dao.insert_movie_actor(MovieActor::new(movie.id, actor.id))
        .await
        .unwrap();
    let linked = joined.next().await.unwrap().unwrap().unwrap();
    assert_eq!(linked.actors, vec![actor.clone()]);

    dao.delete_actor(actor).await.unwrap();
    let unlinked = joined.next().await.unwrap().unwrap().unwrap();
    assert!(unlinked.actors.is_empty());

    dao.delete_movie(movie).await.unwrap();
    assert!(joined.next().await.unwrap().unwrap().is_none());
}

#[tokio::test]
async fn failed_writes_invalidate_nothing() {
    let dao = Dao::open_memory().unwrap();
    let before = dao.versions();

    assert!(dao.insert_movie(Movie::new("")).await.is_err());
    assert!(dao
        .insert_movie_actor(MovieActor::new(1, 1))
        .await
        .is_err());
    assert_eq!(dao.versions(), before);

    dao.insert_movie(Movie::new("Up")).await.unwrap();
    assert_ne!(dao.versions(), before);
}

#[tokio::test]
async fn deletes_bump_the_link_table() {
    let dao = Dao::open_memory().unwrap();
    let movie = dao.insert_movie(Movie::new("Her")).await.unwrap();
    let before = dao.versions();

    dao.delete_movie(movie).await.unwrap();

    let after = dao.versions();
    assert!(before.differs_in(&after, &[Table::Movie]));
    assert!(before.differs_in(&after, &[Table::MovieActor]));
    assert!(!before.differs_in(&after, &[Table::Actor]));
}
