use std::future::Future;
use std::time::Duration;

use movie_catalog::viewmodel::{Observer, WriteOutcome};
use movie_catalog::{Actor, AppViewModel, Dao, Health, Movie, MovieActor, StoreError};
use rusqlite::{Connection, OpenFlags};

const GRACE: Duration = Duration::from_millis(200);

async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for the view-model")
}

async fn until<T: Clone>(observer: &mut Observer<T>, predicate: impl FnMut(&T) -> bool) -> T {
    within(observer.wait_for(predicate))
        .await
        .expect("state dropped")
}

fn view_model() -> AppViewModel {
    AppViewModel::new(Dao::open_memory().unwrap(), GRACE)
}

#[tokio::test]
async fn lists_follow_inserts_and_deletes() {
    let vm = view_model();
    let mut movies = vm.movies().subscribe();

    let Ok(WriteOutcome::Movie(movie)) = within(vm.insert_movie(Movie::new("Inception")).wait()).await
    else {
        panic!("movie insert failed");
    };
    until(&mut movies, |list| list.len() == 1).await;
    assert_eq!(vm.movies().value(), vec![movie.clone()]);

    vm.delete_movie(movie);
    until(&mut movies, |list| list.is_empty()).await;
}

#[tokio::test]
async fn selected_join_round_trips_a_new_link() {
    let vm = view_model();
    let mut joined = vm.movie_with_actors().subscribe();

    let Ok(WriteOutcome::Movie(inception)) = vm.insert_movie(Movie::new("Inception")).wait().await
    else {
        panic!("movie insert failed");
    };
    let Ok(WriteOutcome::Actor(leo)) = vm.insert_actor(Actor::new("Leonardo DiCaprio")).wait().await
    else {
        panic!("actor insert failed");
    };

    vm.select_movie(inception.id);
    vm.insert_movie_actor(MovieActor::new(inception.id, leo.id));

    let value = until(&mut joined, |value| value.actors.len() == 1).await;
    assert_eq!(value.movie, inception);
    assert_eq!(value.actors, vec![leo]);
}

#[tokio::test]
async fn latest_selection_wins() {
    let vm = view_model();
    let Ok(WriteOutcome::Movies(movies)) = vm
        .insert_movies(vec![Movie::new("Avatar"), Movie::new("Titanic")])
        .wait()
        .await
    else {
        panic!("bulk insert failed");
    };
    let (first, second) = (movies[0].id, movies[1].id);

    let mut joined = vm.movie_with_actors().subscribe();
    vm.select_movie(first);
    vm.select_movie(second);

    until(&mut joined, |value| value.movie.id == second).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(vm.movie_with_actors().value().movie.id, second);
    assert_eq!(vm.selected_movie_id(), second);
}

#[tokio::test]
async fn missing_selection_publishes_a_placeholder() {
    let vm = view_model();
    let Ok(WriteOutcome::Actor(actor)) = vm.insert_actor(Actor::new("Zendaya")).wait().await
    else {
        panic!("actor insert failed");
    };
    let mut joined = vm.actor_with_movies().subscribe();

    vm.select_actor(actor.id);
    until(&mut joined, |value| value.actor.id == actor.id).await;

    vm.select_actor(999);
    let value = until(&mut joined, |value| value.is_placeholder()).await;
    assert_eq!(value.actor.id, 0);
    assert!(value.actor.name.is_empty());
    assert!(value.movies.is_empty());
}

#[tokio::test]
async fn deleting_an_actor_empties_the_selected_movie() {
    let vm = view_model();
    let Ok(WriteOutcome::Seeded(stats)) = vm.seed_demo_data().wait().await else {
        panic!("seeding failed");
    };
    assert_eq!((stats.actors, stats.movies), (30, 15));

    let movies = vm.dao().movies().await.unwrap();
    let gump = movies.iter().find(|m| m.name == "Forrest Gump").unwrap().clone();
    let mut joined = vm.movie_with_actors().subscribe();
    vm.select_movie(gump.id);

    let value = until(&mut joined, |value| value.movie.id == gump.id).await;
    let tom = value.actors[0].clone();
    assert_eq!(tom.name, "Tom Hanks");

    vm.delete_actor(tom);
    let value = until(&mut joined, |value| value.actors.is_empty()).await;
    assert_eq!(value.movie, gump);
}

#[tokio::test]
async fn writes_apply_in_issue_order() {
    let vm = view_model();
    let mut movies = vm.movies().subscribe();

    vm.insert_movie(Movie::with_id(7, "Memento"));
    vm.delete_movie(Movie::with_id(7, "Memento"));
    let last = vm.insert_movie(Movie::with_id(7, "Tenet"));

    assert!(within(last.wait()).await.is_ok());
    let list = until(&mut movies, |list| list.len() == 1).await;
    assert_eq!(list, vec![Movie::with_id(7, "Tenet")]);
    assert_eq!(vm.last_write_error().value(), None);
}

#[tokio::test]
async fn held_ticket_receives_the_failure() {
    let vm = view_model();

    let err = within(vm.insert_movie(Movie::new("  ")).wait())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));

    let err = within(vm.insert_movie_actor(MovieActor::new(1, 1)).wait())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));

    assert_eq!(vm.last_write_error().value(), None);
    assert_eq!(vm.health().value(), Health::Healthy);
}

#[tokio::test]
async fn dropped_ticket_failure_lands_in_last_write_error() {
    let vm = view_model();
    let mut errors = vm.last_write_error().subscribe();

    vm.insert_movie_actor(MovieActor::new(3, 4));

    let failure = until(&mut errors, |value| value.is_some()).await.unwrap();
    assert_eq!(failure.operation, "link movie 3 to actor 4");
    assert!(failure.message.contains("constraint"));

    vm.clear_write_error();
    assert_eq!(vm.last_write_error().value(), None);
}

#[tokio::test]
async fn bulk_link_failure_changes_nothing() {
    let vm = view_model();
    let Ok(WriteOutcome::Movie(movie)) = vm.insert_movie(Movie::new("Gravity")).wait().await
    else {
        panic!("movie insert failed");
    };
    let Ok(WriteOutcome::Actor(actor)) = vm.insert_actor(Actor::new("Sandra Bullock")).wait().await
    else {
        panic!("actor insert failed");
    };

    let result = vm
        .insert_movie_actors(vec![
            MovieActor::new(movie.id, actor.id),
            MovieActor::new(movie.id, 404),
        ])
        .wait()
        .await;

    assert!(matches!(result, Err(StoreError::Constraint(_))));
    assert!(vm.dao().links().await.unwrap().is_empty());
}

#[tokio::test]
async fn read_only_store_turns_health_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");
    {
        let conn = movie_catalog::db::open_database(&path).unwrap();
        conn.execute_batch("PRAGMA journal_mode = DELETE;").unwrap();
    }
    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
    let vm = AppViewModel::new(Dao::new(conn), GRACE);
    let mut health = vm.health().subscribe();

    let err = within(vm.insert_movie(Movie::new("Dune")).wait())
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    until(&mut health, Health::is_fatal).await;

    // Later writes are refused without touching the store.
    let err = within(vm.insert_actor(Actor::new("Timothée Chalamet")).wait())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[tokio::test]
async fn lists_keep_their_value_across_an_idle_teardown() {
    let vm = view_model();
    let mut actors = vm.actors().subscribe();
    vm.insert_actor(Actor::new("Kate Winslet"));
    until(&mut actors, |list| list.len() == 1).await;
    drop(actors);

    tokio::time::sleep(GRACE * 2).await;
    vm.insert_actor(Actor::new("Billy Zane"));
    assert_eq!(vm.actors().value().len(), 1);

    let mut actors = vm.actors().subscribe();
    until(&mut actors, |list| list.len() == 2).await;
}
