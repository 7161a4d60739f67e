//! End-to-end runs of the binary against a mock backend, covering the view
//! surface, the session cache, and the owner gate.

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

fn record_json(id: i64, title: &str, username: &str, like: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "username": username,
        "user_password": "s3cret",
        "location": "Paris, France",
        "travel_type": "Cultural",
        "photos": null,
        "comments": null,
        "like": like,
        "description": null,
        "created_at": "2024-05-01T10:00:00+00:00",
        "updated_at": null
    })
}

fn wayfare(server: &MockServer, session_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wayfare").expect("binary");
    cmd.env("WAYFARE_BACKEND_URL", server.base_url())
        .env("WAYFARE_API_KEY", "anon-key")
        .env(
            "WAYFARE_SESSION_FILE",
            session_dir.path().join("session.json"),
        )
        .env_remove("WAYFARE_POST_SECRET")
        .env_remove("WAYFARE_PASSWORD");
    cmd
}

fn write_session(session_dir: &TempDir, username: &str) {
    let session = json!({
        "account": {
            "identity": {
                "id": "6fa459ea-ee8a-3ca4-894e-db77e160355e",
                "email": "a@example.com",
                "username": username
            },
            "access_token": "jwt-token"
        },
        "theme": "light"
    });
    std::fs::write(
        session_dir.path().join("session.json"),
        serde_json::to_string_pretty(&session).expect("session json"),
    )
    .expect("write session");
}

fn mock_feed(server: &MockServer) {
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("order", "created_at.desc");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([
                record_json(2, "Tokyo", "bob", 9),
                record_json(1, "Paris Trip", "alice", 5)
            ]));
    });
}

#[test]
#[serial]
fn feed_search_narrows_the_cards() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    mock_feed(&server);

    wayfare(&server, &dir)
        .args(["feed", "--search", "par"])
        .assert()
        .success()
        .stdout(contains("Paris Trip"))
        .stdout(contains("Tokyo").not())
        .stdout(contains("Total Journeys: 2"));
}

#[test]
#[serial]
fn missing_post_falls_back_to_the_feed() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.99");
        then.status(406)
            .header("content-type", "application/json")
            .json_body(json!({ "message": "0 rows", "code": "PGRST116", "details": null, "hint": null }));
    });
    mock_feed(&server);

    wayfare(&server, &dir)
        .args(["show", "99"])
        .assert()
        .success()
        .stdout(contains("Travel Collection"));
}

#[test]
#[serial]
fn delete_demands_a_secret_before_touching_the_backend() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    write_session(&dir, "alice");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(record_json(7, "Paris Trip", "alice", 5));
    });

    wayfare(&server, &dir)
        .args(["delete", "7", "--yes"])
        .assert()
        .failure()
        .stdout(contains("secret key"));
}

#[test]
#[serial]
fn delete_rejects_a_wrong_secret() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    write_session(&dir, "alice");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(record_json(7, "Paris Trip", "alice", 5));
    });

    wayfare(&server, &dir)
        .args(["delete", "7", "--secret", "nope", "--yes"])
        .assert()
        .failure()
        .stdout(contains("Incorrect secret key!"));
}

#[test]
#[serial]
fn delete_with_the_right_secret_removes_the_post() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    write_session(&dir, "alice");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(record_json(7, "Paris Trip", "alice", 5));
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(204);
    });
    mock_feed(&server);

    wayfare(&server, &dir)
        .args(["delete", "7", "--secret", "s3cret", "--yes"])
        .assert()
        .success()
        .stdout(contains("Post deleted."));
    delete.assert();
}

#[test]
#[serial]
fn owner_actions_stay_hidden_from_other_identities() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    write_session(&dir, "mallory");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(record_json(7, "Paris Trip", "alice", 5));
    });

    wayfare(&server, &dir)
        .args(["delete", "7", "--secret", "s3cret", "--yes"])
        .assert()
        .failure()
        .stdout(contains("only available to the post's author"));
}

#[test]
#[serial]
fn comment_is_stamped_with_the_anonymous_fallback() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    server.mock(|when, then| {
        when.method("GET")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(record_json(7, "Paris Trip", "alice", 5));
    });
    let patch = server.mock(|when, then| {
        when.method("PATCH")
            .path("/rest/v1/Travel")
            .query_param("id", "eq.7")
            .json_body_includes("{\"comments\":\"--- Comment by anonymous ---\\nlovely\"}");
        then.status(204);
    });

    wayfare(&server, &dir)
        .args(["comment", "7", "--text", "lovely"])
        .assert()
        .success()
        .stdout(contains("Comment by anonymous added"));
    patch.assert();
}

#[test]
#[serial]
fn create_requires_a_secret_before_any_network_call() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    wayfare(&server, &dir)
        .args(["create", "--title", "Sunset"])
        .assert()
        .failure()
        .stdout(contains("secret key"));
}

#[test]
#[serial]
fn login_caches_the_session() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    server.mock(|when, then| {
        when.method("POST")
            .path("/auth/v1/token")
            .query_param("grant_type", "password");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "access_token": "jwt-token",
                "user": {
                    "id": "6fa459ea-ee8a-3ca4-894e-db77e160355e",
                    "email": "a@example.com",
                    "user_metadata": { "username": "alice" }
                }
            }));
    });

    wayfare(&server, &dir)
        .args(["login", "--email", "a@example.com", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("Signed in as alice"));

    let cached =
        std::fs::read_to_string(dir.path().join("session.json")).expect("session cached");
    assert!(cached.contains("jwt-token"));

    wayfare(&server, &dir)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(contains("alice"));
}

#[test]
#[serial]
fn theme_toggles_and_persists() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    wayfare(&server, &dir)
        .args(["theme", "dark"])
        .assert()
        .success()
        .stdout(contains("Theme set to dark"));

    wayfare(&server, &dir)
        .args(["theme"])
        .assert()
        .success()
        .stdout(contains("Theme set to light"));
}

#[test]
#[serial]
fn whoami_defaults_to_anonymous() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    wayfare(&server, &dir)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(contains("anonymous"));
}
