use movie_catalog::db::*;
use movie_catalog::{Actor, Movie, MovieActor, StoreError};

fn count(conn: &rusqlite::Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn insert_assigns_increasing_ids() {
    let conn = open_memory().unwrap();
    let first = insert_movie(&conn, &Movie::new("Inception")).unwrap();
    let second = insert_movie(&conn, &Movie::new("Avatar")).unwrap();

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(first.name, "Inception");
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_memory().unwrap();
    let first = insert_actor(&conn, &Actor::new("Zendaya")).unwrap();
    delete_actor(&conn, first.id).unwrap();
    let second = insert_actor(&conn, &Actor::new("Brie Larson")).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn explicit_id_is_kept_and_duplicate_is_a_constraint_error() {
    let conn = open_memory().unwrap();
    let movie = insert_movie(&conn, &Movie::with_id(42, "Gladiator")).unwrap();
    assert_eq!(movie.id, 42);

    let err = insert_movie(&conn, &Movie::with_id(42, "Titanic")).unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
    assert_eq!(fetch_movie(&conn, 42).unwrap().unwrap().name, "Gladiator");
}

#[test]
fn blank_names_are_rejected_before_insert() {
    let conn = open_memory().unwrap();
    let err = insert_movie(&conn, &Movie::new("   ")).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(count(&conn, "movie"), 0);
}

#[test]
fn fetch_orders_by_name_ignoring_case() {
    let conn = open_memory().unwrap();
    for name in ["the Matrix", "Avatar", "Fight Club"] {
        insert_movie(&conn, &Movie::new(name)).unwrap();
    }

    let names: Vec<_> = fetch_movies(&conn)
        .unwrap()
        .into_iter()
        .map(|movie| movie.name)
        .collect();
    assert_eq!(names, ["Avatar", "Fight Club", "the Matrix"]);
}

#[test]
fn update_and_delete_of_missing_rows_are_no_ops() {
    let conn = open_memory().unwrap();
    let movie = insert_movie(&conn, &Movie::new("Titanic")).unwrap();

    assert!(!update_movie(&conn, &Movie::with_id(999, "Ghost")).unwrap());
    assert!(!delete_movie(&conn, 999).unwrap());
    assert!(!update_actor(&conn, &Actor::with_id(999, "Ghost")).unwrap());
    assert!(!delete_actor(&conn, 999).unwrap());
    assert!(!delete_movie_actor(&conn, MovieActor::new(movie.id, 999)).unwrap());

    assert_eq!(fetch_movies(&conn).unwrap(), vec![movie]);
}

#[test]
fn update_replaces_the_name() {
    let conn = open_memory().unwrap();
    let actor = insert_actor(&conn, &Actor::new("Tom Hank")).unwrap();

    assert!(update_actor(&conn, &Actor::with_id(actor.id, "Tom Hanks")).unwrap());
    assert_eq!(fetch_actor(&conn, actor.id).unwrap().unwrap().name, "Tom Hanks");
}

#[test]
fn duplicate_link_insert_keeps_a_single_row() {
    let conn = open_memory().unwrap();
    let movie = insert_movie(&conn, &Movie::new("Fight Club")).unwrap();
    let actor = insert_actor(&conn, &Actor::new("Brad Pitt")).unwrap();
    let link = MovieActor::new(movie.id, actor.id);

    assert!(insert_movie_actor(&conn, link).unwrap());
    assert!(!insert_movie_actor(&conn, link).unwrap());
    assert_eq!(fetch_links(&conn).unwrap(), vec![link]);
}

#[test]
fn link_to_missing_actor_is_a_constraint_error() {
    let conn = open_memory().unwrap();
    let movie = insert_movie(&conn, &Movie::new("Avatar")).unwrap();

    let err = insert_movie_actor(&conn, MovieActor::new(movie.id, 77)).unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
    assert_eq!(count(&conn, "movie_actor"), 0);
}

#[test]
fn deleting_a_movie_cascades_to_its_links() {
    let conn = open_memory().unwrap();
    let inception = insert_movie(&conn, &Movie::new("Inception")).unwrap();
    let titanic = insert_movie(&conn, &Movie::new("Titanic")).unwrap();
    let leo = insert_actor(&conn, &Actor::new("Leonardo DiCaprio")).unwrap();
    insert_movie_actor(&conn, MovieActor::new(inception.id, leo.id)).unwrap();
    insert_movie_actor(&conn, MovieActor::new(titanic.id, leo.id)).unwrap();

    delete_movie(&conn, inception.id).unwrap();

    assert_eq!(
        fetch_links(&conn).unwrap(),
        vec![MovieActor::new(titanic.id, leo.id)]
    );
    let leo_movies = fetch_actor_with_movies(&conn, leo.id).unwrap().unwrap();
    assert_eq!(leo_movies.movies, vec![titanic]);
}

#[test]
fn deleting_an_actor_leaves_the_movie_with_no_actors() {
    let conn = open_memory().unwrap();
    let tom = insert_actor(&conn, &Actor::new("Tom Hanks")).unwrap();
    let gump = insert_movie(&conn, &Movie::new("Forrest Gump")).unwrap();
    assert_eq!((tom.id, gump.id), (1, 1));
    insert_movie_actor(&conn, MovieActor::new(1, 1)).unwrap();

    delete_actor(&conn, 1).unwrap();

    let joined = fetch_movie_with_actors(&conn, 1).unwrap().unwrap();
    assert_eq!(joined.movie, Movie::with_id(1, "Forrest Gump"));
    assert!(joined.actors.is_empty());
}

#[test]
fn joins_list_linked_rows_in_name_order() {
    let conn = open_memory().unwrap();
    let avengers = insert_movie(&conn, &Movie::new("The Avengers")).unwrap();
    let names = ["Scarlett Johansson", "Chris Evans", "Mark Ruffalo"];
    for name in names {
        let actor = insert_actor(&conn, &Actor::new(name)).unwrap();
        insert_movie_actor(&conn, MovieActor::new(avengers.id, actor.id)).unwrap();
    }
    insert_actor(&conn, &Actor::new("Unrelated")).unwrap();

    let joined = fetch_movie_with_actors(&conn, avengers.id).unwrap().unwrap();
    let joined_names: Vec<_> = joined.actors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(joined_names, ["Chris Evans", "Mark Ruffalo", "Scarlett Johansson"]);
}

#[test]
fn joins_for_missing_rows_are_none() {
    let conn = open_memory().unwrap();
    assert!(fetch_movie_with_actors(&conn, 5).unwrap().is_none());
    assert!(fetch_actor_with_movies(&conn, 5).unwrap().is_none());
}

#[test]
fn bulk_link_insert_is_all_or_nothing() {
    let mut conn = open_memory().unwrap();
    let movies = insert_movies(
        &mut conn,
        &[Movie::new("Inception"), Movie::new("Interstellar")],
    )
    .unwrap();
    let actors = insert_actors(&mut conn, &[Actor::new("Anne Hathaway")]).unwrap();

    let err = insert_movie_actors(
        &mut conn,
        &[
            MovieActor::new(movies[0].id, actors[0].id),
            MovieActor::new(movies[1].id, actors[0].id),
            MovieActor::new(999, actors[0].id),
        ],
    )
    .unwrap_err();

    assert!(matches!(err, StoreError::Constraint(_)));
    assert_eq!(count(&conn, "movie_actor"), 0);
}

#[test]
fn bulk_entity_insert_rejects_the_whole_batch() {
    let mut conn = open_memory().unwrap();
    let err = insert_actors(&mut conn, &[Actor::new("Gal Gadot"), Actor::new("")]).unwrap_err();

    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(count(&conn, "actor"), 0);
}

#[test]
fn seed_inserts_the_demonstration_dataset() {
    let mut conn = open_memory().unwrap();
    assert!(is_empty(&conn).unwrap());

    let stats = seed_demo_data(&mut conn).unwrap();
    assert_eq!(stats.actors, DEMO_ACTORS.len());
    assert_eq!(stats.movies, DEMO_MOVIES.len());
    assert_eq!(stats.links, DEMO_LINKS.len());
    assert!(!is_empty(&conn).unwrap());

    let gump = fetch_movies(&conn)
        .unwrap()
        .into_iter()
        .find(|movie| movie.name == "Forrest Gump")
        .unwrap();
    let joined = fetch_movie_with_actors(&conn, gump.id).unwrap().unwrap();
    let names: Vec<_> = joined.actors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Tom Hanks"]);
}

#[test]
fn seeding_twice_resolves_links_against_new_ids() {
    let mut conn = open_memory().unwrap();
    seed_demo_data(&mut conn).unwrap();
    seed_demo_data(&mut conn).unwrap();

    assert_eq!(count(&conn, "movie"), 2 * DEMO_MOVIES.len() as i64);
    assert_eq!(count(&conn, "movie_actor"), 2 * DEMO_LINKS.len() as i64);
}

#[test]
fn reopening_a_file_database_keeps_rows_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("catalog.sqlite");

    {
        let conn = open_database(&path).unwrap();
        insert_movie(&conn, &Movie::new("Black Panther")).unwrap();
    }

    let conn = open_database(&path).unwrap();
    assert_eq!(fetch_movies(&conn).unwrap().len(), 1);
    let versions: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 1);
}

#[test]
fn newer_schema_versions_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");
    {
        let conn = open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION + 1],
        )
        .unwrap();
    }

    let err = open_database(&path).unwrap_err();
    assert!(matches!(err, StoreError::Schema { .. }));
    assert!(err.is_fatal());
}
