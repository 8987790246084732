// tests/export_tests.rs
//
// Download, delete, and history flows over seeded generations.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use studydeck::{
    config::Config,
    gemini::GeminiClient,
    models::generation::StudyMode,
    routes,
    state::AppState,
    store::{GenerationStore, UserStore},
};

struct TestApp {
    address: String,
    pool: SqlitePool,
}

/// These tests seed generations directly, so the generation API is pointed
/// at an address that refuses connections.
const NO_GEMINI: &str = "http://127.0.0.1:1";

async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_api_url: NO_GEMINI.to_string(),
        port: 0,
        rust_log: "error".to_string(),
    };

    let gemini = GeminiClient::new(config.gemini_api_url.clone(), config.gemini_api_key.clone());
    let state = AppState {
        pool: pool.clone(),
        config,
        gemini,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, pool }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Registers a fresh account on the given client and returns its user id.
async fn register_user(app: &TestApp, client: &reqwest::Client) -> i64 {
    let email = format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
    client
        .post(format!("{}/register", app.address))
        .form(&[("email", email.as_str()), ("password", "password123")])
        .send()
        .await
        .expect("Failed to execute request");

    UserStore::get_by_email(&app.pool, &email)
        .await
        .unwrap()
        .expect("registered user missing")
        .id
}

async fn seed_generation(
    app: &TestApp,
    user_id: i64,
    topic: &str,
    mode: StudyMode,
    items_json: &str,
) -> i64 {
    GenerationStore::save(&app.pool, user_id, topic, mode, items_json)
        .await
        .expect("Failed to seed generation")
}

const MCQ_ITEMS: &str =
    r#"[{"question":"Q","options":["a","b","c","d"],"correct_answer":"b","explanation":""}]"#;
const FLASHCARD_ITEMS: &str =
    r#"[{"question":"What is Rust?","answer":"A language","explanation":""}]"#;

#[tokio::test]
async fn mcq_csv_download_has_six_columns() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id = seed_generation(&app, user_id, "Rust Basics", StudyMode::Mcq, MCQ_ITEMS).await;

    // Act
    let response = client
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id, "format": "csv" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, r#"attachment; filename="Rust Basics.csv""#);

    let body = response.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("Question,Option 1,Option 2,Option 3,Option 4,Answer")
    );
    assert_eq!(lines.next(), Some("Q,a,b,c,d,b"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn flashcard_csv_download_has_two_columns() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id =
        seed_generation(&app, user_id, "Rust", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    // Act
    let response = client
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id, "format": "csv" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    let body = response.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("Question,Answer"));
    assert_eq!(lines.next(), Some("What is Rust?,A language"));
}

#[tokio::test]
async fn pdf_download_is_a_pdf_attachment() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id =
        seed_generation(&app, user_id, "Rust", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    // Act
    let response = client
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id, "format": "pdf" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/pdf"));
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.ends_with(r#"filename="Rust.pdf""#));

    let bytes = response.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn download_defaults_to_pdf() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id =
        seed_generation(&app, user_id, "Rust", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    // Act: no format field
    let response = client
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.bytes().await.unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn download_rejects_unknown_formats() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id =
        seed_generation(&app, user_id, "Rust", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    // Act
    let response = client
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id, "format": "docx" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Invalid format");
}

#[tokio::test]
async fn download_of_a_foreign_generation_is_not_found() {
    // Arrange: owner seeds a generation, an unrelated user asks for it
    let app = spawn_app().await;
    let owner = client();
    let owner_id = register_user(&app, &owner).await;
    let generation_id =
        seed_generation(&app, owner_id, "Private set", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    let intruder = client();
    register_user(&app, &intruder).await;

    // Act
    let response = intruder
        .post(format!("{}/api/download", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id, "format": "csv" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: same 404 as a nonexistent id, and no content leaks
    assert_eq!(response.status().as_u16(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("Generation not found."));
    assert!(!body.contains("What is Rust?"));
}

#[tokio::test]
async fn download_with_unknown_or_missing_id_is_not_found() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    register_user(&app, &client).await;

    for body in [
        serde_json::json!({ "generation_id": 999_999, "format": "csv" }),
        serde_json::json!({ "format": "csv" }),
    ] {
        // Act
        let response = client
            .post(format!("{}/api/download", app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        // Assert
        assert_eq!(response.status().as_u16(), 404);
    }
}

#[tokio::test]
async fn delete_removes_own_generation() {
    // Arrange
    let app = spawn_app().await;
    let client = client();
    let user_id = register_user(&app, &client).await;
    let generation_id =
        seed_generation(&app, user_id, "Disposable", StudyMode::Flashcard, FLASHCARD_ITEMS).await;

    // Act
    let response = client
        .post(format!("{}/api/delete_generation", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["ok"], true);
    assert!(
        GenerationStore::get_by_id(&app.pool, generation_id)
            .await
            .unwrap()
            .is_none()
    );

    // And it no longer shows in history
    let history = client
        .get(format!("{}/history", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();
    assert!(!history.contains("Disposable"));
}

#[tokio::test]
async fn delete_of_a_foreign_generation_is_not_found_and_keeps_the_row() {
    // Arrange
    let app = spawn_app().await;
    let owner = client();
    let owner_id = register_user(&app, &owner).await;
    let generation_id =
        seed_generation(&app, owner_id, "Keep me", StudyMode::Mcq, MCQ_ITEMS).await;

    let intruder = client();
    register_user(&app, &intruder).await;

    // Act
    let response = intruder
        .post(format!("{}/api/delete_generation", app.address))
        .json(&serde_json::json!({ "generation_id": generation_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Generation not found.");
    assert!(
        GenerationStore::get_by_id(&app.pool, generation_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn history_lists_only_own_generations_newest_first() {
    // Arrange: two rows for this user, one for somebody else
    let app = spawn_app().await;
    let owner = client();
    let user_id = register_user(&app, &owner).await;
    seed_generation(&app, user_id, "Older topic", StudyMode::Flashcard, FLASHCARD_ITEMS).await;
    seed_generation(&app, user_id, "Newer topic", StudyMode::Mcq, MCQ_ITEMS).await;

    let other_client = client();
    let other = register_user(&app, &other_client).await;
    seed_generation(&app, other, "Foreign topic", StudyMode::Mcq, MCQ_ITEMS).await;

    // Act
    let history = owner
        .get(format!("{}/history", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    // Assert
    let newer = history.find("Newer topic").expect("newer row missing");
    let older = history.find("Older topic").expect("older row missing");
    assert!(newer < older, "newest generation should be listed first");
    assert!(!history.contains("Foreign topic"));
}
