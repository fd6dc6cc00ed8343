//! Integration tests for database operations.

use tuiter::db::{
    add_reaction, add_to_watchlist, attach_image, bookmark_tuit, create_act, create_movie,
    create_review, create_session, create_tuit, create_user, delete_expired_sessions,
    delete_tuit, delete_user, delete_user_by_username, find_acts_by_movie, find_all_tuits,
    find_bookmarks_by_user, find_follow, find_followers, find_followings,
    find_images_by_tuit, find_messages_between, find_reactions_by_user, find_movie_by_imdb_id,
    find_reactions_by_tuit, find_received_messages, find_sent_messages, find_tuit_by_id,
    find_tuits_by_user, find_watchlist, follow_user, get_active_session, get_all_users,
    get_tuit, get_user_by_id, get_user_by_username, react_to_movie, remove_from_watchlist,
    send_message, unfollow_user, update_tuit, update_user, AccountType, Database, Location,
    NewMovie, NewReview, NewTuit, NewUser, Reaction, TuitUpdate, UserUpdate,
};
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

async fn insert_user(db: &Database, username: &str) -> i64 {
    let user = NewUser {
        username: username.to_string(),
        password: "unused".to_string(),
        email: format!("{username}@example.com"),
        ..Default::default()
    };
    create_user(db.pool(), &user, "hash")
        .await
        .expect("Failed to create user")
        .expect("Username already taken")
}

async fn insert_tuit(db: &Database, posted_by: i64, text: &str) -> i64 {
    let tuit = NewTuit {
        tuit: text.to_string(),
        image: None,
        youtube: None,
    };
    create_tuit(db.pool(), posted_by, &tuit)
        .await
        .expect("Failed to create tuit")
}

fn movie(title: &str, imdb_id: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        imdb_id: Some(imdb_id.to_string()),
        poster: None,
        rating: None,
    }
}

// ========== Users ==========

#[tokio::test]
async fn test_create_and_get_user() {
    let (db, _temp_dir) = setup_db().await;

    let new_user = NewUser {
        username: "alice".to_string(),
        password: "secret".to_string(),
        email: "alice@example.com".to_string(),
        first_name: Some("Alice".to_string()),
        account_type: AccountType::Actor,
        location: Some(Location {
            latitude: Some(42.36),
            longitude: Some(-71.06),
        }),
        ..Default::default()
    };
    let id = create_user(db.pool(), &new_user, "hashed")
        .await
        .expect("Failed to create user")
        .expect("Should be created");

    let user = get_user_by_id(db.pool(), id)
        .await
        .expect("Failed to get user")
        .expect("User not found");
    assert_eq!(user.username, "alice");
    assert_eq!(user.password_hash, "hashed");
    assert_eq!(user.account_type, "ACTOR");
    assert_eq!(user.first_name.as_deref(), Some("Alice"));
    assert_eq!(user.location.latitude, Some(42.36));

    let by_name = get_user_by_username(db.pool(), "alice")
        .await
        .expect("Failed to get user")
        .expect("User not found");
    assert_eq!(by_name.id, id);
}

#[tokio::test]
async fn test_duplicate_username_is_not_persisted() {
    let (db, _temp_dir) = setup_db().await;

    insert_user(&db, "alice").await;
    let again = create_user(
        db.pool(),
        &NewUser {
            username: "alice".to_string(),
            password: "other".to_string(),
            ..Default::default()
        },
        "other-hash",
    )
    .await
    .expect("Insert should not error");

    assert!(again.is_none());
    let users = get_all_users(db.pool()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].password_hash, "hash");
}

#[tokio::test]
async fn test_update_user_keeps_absent_fields() {
    let (db, _temp_dir) = setup_db().await;
    let id = insert_user(&db, "alice").await;

    let update = UserUpdate {
        biography: Some("Film buff".to_string()),
        ..Default::default()
    };
    let modified = update_user(db.pool(), id, &update, None).await.unwrap();
    assert_eq!(modified, 1);

    let user = get_user_by_id(db.pool(), id).await.unwrap().unwrap();
    assert_eq!(user.biography.as_deref(), Some("Film buff"));
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.password_hash, "hash");
}

#[tokio::test]
async fn test_delete_user_lowers_counters_on_liked_tuits() {
    let (db, _temp_dir) = setup_db().await;
    let author = insert_user(&db, "author").await;
    let fan = insert_user(&db, "fan").await;
    let other = insert_user(&db, "other").await;
    let tuit_id = insert_tuit(&db, author, "hello").await;

    add_reaction(db.pool(), Reaction::Like, fan, tuit_id).await.unwrap();
    add_reaction(db.pool(), Reaction::Like, other, tuit_id).await.unwrap();
    add_reaction(db.pool(), Reaction::Dislike, fan, tuit_id).await.unwrap();
    let tuit = get_tuit(db.pool(), tuit_id).await.unwrap().unwrap();
    assert_eq!(tuit.stats.likes, 2);
    assert_eq!(tuit.stats.dislikes, 1);

    assert_eq!(delete_user(db.pool(), fan).await.unwrap(), 1);

    let tuit = get_tuit(db.pool(), tuit_id).await.unwrap().unwrap();
    assert_eq!(tuit.stats.likes, 1);
    assert_eq!(tuit.stats.dislikes, 0);
    let likes = find_reactions_by_tuit(db.pool(), Reaction::Like, tuit_id, None)
        .await
        .unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].user.id, other);
}

#[tokio::test]
async fn test_delete_user_removes_their_tuits() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    insert_tuit(&db, alice, "one").await;
    insert_tuit(&db, alice, "two").await;

    assert_eq!(delete_user_by_username(db.pool(), "alice").await.unwrap(), 1);
    assert_eq!(delete_user_by_username(db.pool(), "alice").await.unwrap(), 0);
    assert!(find_all_tuits(db.pool(), None).await.unwrap().is_empty());
}

// ========== Sessions ==========

#[tokio::test]
async fn test_expired_sessions_are_ignored_and_purged() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;

    create_session(db.pool(), alice, "live", "2999-01-01 00:00:00")
        .await
        .unwrap();
    create_session(db.pool(), alice, "stale", "2000-01-01 00:00:00")
        .await
        .unwrap();

    assert!(get_active_session(db.pool(), "live").await.unwrap().is_some());
    assert!(get_active_session(db.pool(), "stale").await.unwrap().is_none());

    assert_eq!(delete_expired_sessions(db.pool()).await.unwrap(), 1);
    assert!(get_active_session(db.pool(), "live").await.unwrap().is_some());
}

// ========== Tuits ==========

#[tokio::test]
async fn test_tuits_are_populated_with_author_and_viewer_flags() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let tuit_id = insert_tuit(&db, alice, "first tuit").await;

    add_reaction(db.pool(), Reaction::Like, bob, tuit_id).await.unwrap();
    bookmark_tuit(db.pool(), bob, tuit_id).await.unwrap();

    let as_bob = find_tuit_by_id(db.pool(), tuit_id, Some(bob))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(as_bob.posted_by.as_ref().map(|u| u.id), Some(alice));
    assert!(as_bob.liked_by_me);
    assert!(as_bob.bookmarked_by_me);
    assert!(!as_bob.disliked_by_me);
    assert!(!as_bob.posted_by_me);

    let as_alice = find_tuit_by_id(db.pool(), tuit_id, Some(alice))
        .await
        .unwrap()
        .unwrap();
    assert!(as_alice.posted_by_me);
    assert!(!as_alice.liked_by_me);

    let anonymous = find_all_tuits(db.pool(), None).await.unwrap();
    assert_eq!(anonymous.len(), 1);
    assert!(!anonymous[0].liked_by_me);
    assert_eq!(anonymous[0].stats.likes, 1);
}

#[tokio::test]
async fn test_find_tuits_by_user_and_update() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let tuit_id = insert_tuit(&db, alice, "draft").await;
    insert_tuit(&db, bob, "bob's").await;

    let alices = find_tuits_by_user(db.pool(), alice, None).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].id, tuit_id);

    let update = TuitUpdate {
        tuit: Some("final".to_string()),
        ..Default::default()
    };
    assert_eq!(update_tuit(db.pool(), tuit_id, &update).await.unwrap(), 1);
    assert_eq!(update_tuit(db.pool(), 999, &update).await.unwrap(), 0);

    let tuit = get_tuit(db.pool(), tuit_id).await.unwrap().unwrap();
    assert_eq!(tuit.tuit, "final");
}

#[tokio::test]
async fn test_delete_tuit_cascades_to_relations() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let tuit_id = insert_tuit(&db, alice, "short-lived").await;

    add_reaction(db.pool(), Reaction::Like, alice, tuit_id).await.unwrap();
    bookmark_tuit(db.pool(), alice, tuit_id).await.unwrap();
    attach_image(db.pool(), tuit_id, "https://img.example.com/1.png")
        .await
        .unwrap()
        .expect("Tuit exists");

    assert_eq!(delete_tuit(db.pool(), tuit_id).await.unwrap(), 1);

    assert!(find_reactions_by_tuit(db.pool(), Reaction::Like, tuit_id, None)
        .await
        .unwrap()
        .is_empty());
    assert!(find_bookmarks_by_user(db.pool(), alice, None)
        .await
        .unwrap()
        .is_empty());
    assert!(find_images_by_tuit(db.pool(), tuit_id).await.unwrap().is_empty());
}

// ========== Follows, bookmarks, messages ==========

#[tokio::test]
async fn test_follow_is_idempotent() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;

    let first = follow_user(db.pool(), alice, bob).await.unwrap();
    let second = follow_user(db.pool(), alice, bob).await.unwrap();
    assert_eq!(first.id, second.id);

    let followings = find_followings(db.pool(), alice).await.unwrap();
    assert_eq!(followings.len(), 1);
    assert_eq!(followings[0].user_followed.username, "bob");

    let followers = find_followers(db.pool(), bob).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].user_following.username, "alice");

    assert!(find_follow(db.pool(), bob, alice).await.unwrap().is_none());
    assert_eq!(unfollow_user(db.pool(), alice, bob).await.unwrap(), 1);
    assert!(find_follow(db.pool(), alice, bob).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bookmark_missing_tuit_returns_none() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;

    assert!(bookmark_tuit(db.pool(), alice, 404).await.unwrap().is_none());
    assert!(attach_image(db.pool(), 404, "x").await.unwrap().is_none());
}

#[tokio::test]
async fn test_messages_by_direction() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;

    send_message(db.pool(), alice, bob, "hi bob").await.unwrap();
    send_message(db.pool(), bob, alice, "hi alice").await.unwrap();
    send_message(db.pool(), alice, bob, "lunch?").await.unwrap();

    let sent = find_sent_messages(db.pool(), alice).await.unwrap();
    assert_eq!(sent.len(), 2);
    let received = find_received_messages(db.pool(), alice).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, "hi alice");

    let to_bob = find_messages_between(db.pool(), alice, bob).await.unwrap();
    let texts: Vec<&str> = to_bob.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, ["hi bob", "lunch?"]);
}

// ========== Movies ==========

#[tokio::test]
async fn test_liking_movie_twice_counts_two() {
    let (db, _temp_dir) = setup_db().await;
    let heat = movie("Heat", "tt0113277");

    let first = react_to_movie(db.pool(), Reaction::Like, "tt0113277", &heat)
        .await
        .unwrap();
    assert_eq!(first.likes, 1);

    let second = react_to_movie(db.pool(), Reaction::Like, "tt0113277", &heat)
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.likes, 2);

    let disliked = react_to_movie(db.pool(), Reaction::Dislike, "tt0113277", &heat)
        .await
        .unwrap();
    assert_eq!(disliked.likes, 2);
    assert_eq!(disliked.dislikes, 1);

    let stored = find_movie_by_imdb_id(db.pool(), "tt0113277")
        .await
        .unwrap()
        .unwrap();
    assert_eq!((stored.likes, stored.dislikes), (2, 1));
}

#[tokio::test]
async fn test_create_movie_rejects_duplicate_imdb_id() {
    let (db, _temp_dir) = setup_db().await;

    assert!(create_movie(db.pool(), &movie("Alien", "tt0078748"))
        .await
        .unwrap()
        .is_some());
    assert!(create_movie(db.pool(), &movie("Alien again", "tt0078748"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_reviews_acts_and_watchlist() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let film = create_movie(db.pool(), &movie("Up", "tt1049413"))
        .await
        .unwrap()
        .unwrap();

    let review = create_review(
        db.pool(),
        alice,
        film.id,
        &NewReview {
            review: "Cried twice".to_string(),
            rating: Some(4.5),
        },
    )
    .await
    .unwrap()
    .expect("Movie exists");
    assert_eq!(review.to_movie, film.id);
    assert!((review.rating - 4.5).abs() < f64::EPSILON);
    assert!(create_review(db.pool(), alice, 999, &NewReview::default())
        .await
        .unwrap()
        .is_none());

    let act = create_act(db.pool(), alice, film.id).await.unwrap().unwrap();
    let again = create_act(db.pool(), alice, film.id).await.unwrap().unwrap();
    assert_eq!(act.id, again.id);
    let cast = find_acts_by_movie(db.pool(), film.id).await.unwrap();
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0].acted_by.username, "alice");

    assert!(add_to_watchlist(db.pool(), alice, film.id).await.unwrap());
    assert!(add_to_watchlist(db.pool(), alice, film.id).await.unwrap());
    assert!(!add_to_watchlist(db.pool(), alice, 999).await.unwrap());
    assert_eq!(find_watchlist(db.pool(), alice).await.unwrap().len(), 1);
    assert_eq!(remove_from_watchlist(db.pool(), alice, film.id).await.unwrap(), 1);
    assert!(find_watchlist(db.pool(), alice).await.unwrap().is_empty());
}

// ========== Large fan-out ==========

#[tokio::test]
async fn test_user_with_more_reactions_than_sqlite_variables() {
    let (db, _temp_dir) = setup_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let total: i64 = 33_000;

    sqlx::query(
        r"
        WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?2)
        INSERT INTO tuits (tuit, posted_by) SELECT 'bulk ' || n, ?1 FROM seq
        ",
    )
    .bind(alice)
    .bind(total)
    .execute(db.pool())
    .await
    .unwrap();
    sqlx::query("INSERT INTO likes (user_id, tuit_id) SELECT ?, id FROM tuits")
        .bind(bob)
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE tuits SET likes = 1")
        .execute(db.pool())
        .await
        .unwrap();

    let liked = find_reactions_by_user(db.pool(), Reaction::Like, bob, Some(bob))
        .await
        .expect("Listing a heavy user's likes should not fail");
    assert_eq!(i64::try_from(liked.len()).unwrap(), total);
    assert!(liked.iter().all(|r| r.tuit.liked_by_me && r.user.id == bob));

    assert_eq!(delete_user(db.pool(), bob).await.unwrap(), 1);

    let tuits = find_all_tuits(db.pool(), None).await.unwrap();
    assert_eq!(i64::try_from(tuits.len()).unwrap(), total);
    assert!(tuits.iter().all(|t| t.stats.likes == 0));
}

// ========== Startup ==========

#[tokio::test]
async fn test_reopening_database_keeps_data() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");

    let db = Database::new(&db_path).await.unwrap();
    insert_user(&db, "alice").await;
    db.pool().close().await;

    let reopened = Database::new(&db_path).await.expect("Reopen should succeed");
    assert!(get_user_by_username(reopened.pool(), "alice")
        .await
        .unwrap()
        .is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn test_read_only_database_is_rejected() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");

    let db = Database::new(&db_path).await.unwrap();
    db.pool().close().await;
    std::fs::set_permissions(&db_path, std::fs::Permissions::from_mode(0o444)).unwrap();

    // File modes do not bind root
    if std::fs::OpenOptions::new().write(true).open(&db_path).is_ok() {
        return;
    }

    assert!(Database::new(&db_path).await.is_err());
}
