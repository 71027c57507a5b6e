use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use diligence_backend::{
    config::{Config, SeedAdmin},
    database::Database,
    dto::user_dto::CreateUserPayload,
    models::user::Role,
    routes::build_router,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

fn test_state(extra: &[(&str, &str)]) -> AppState {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ("JWT_SECRET".to_string(), "test_secret_key".to_string()),
        ("FRONTEND_URL".to_string(), "http://localhost:3000".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    let config = Config::from_lookup(|name| vars.get(name).cloned()).expect("config");
    let db = Database::from_config(&config);
    AppState::new(db, config)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

fn diligence_body(titre: &str) -> JsonValue {
    json!({
        "titre": titre,
        "directionDestinataire": "Direction Générale",
        "dateDebut": "2024-01-10",
        "dateFin": "2024-02-10",
        "description": "Mission de contrôle",
        "priorite": "Haute",
        "statut": "En cours",
        "destinataire": ["Service courrier"],
        "progression": 25
    })
}

#[tokio::test]
async fn user_lifecycle_end_to_end() {
    let app = build_router(test_state(&[]));

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({
            "email": "admin@example.com",
            "password": "s3cret",
            "name": "Admin",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let id = created["id"].as_i64().unwrap();

    let (status, login_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login_body["user"]["id"], id);
    assert_eq!(login_body["user"]["role"], "admin");
    assert!(login_body["user"].get("password_hash").is_none());
    let token = login_body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@example.com");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(me["success"], false);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/users/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = build_router(test_state(&[]));
    let body = json!({ "email": "dup@example.com", "password": "p", "name": "Dup" });

    let (status, _) = send(&app, Method::POST, "/api/users", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = send(&app, Method::POST, "/api/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].is_string());

    let (_, users) = send(&app, Method::GET, "/api/users", None, None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn login_rejections() {
    let app = build_router(test_state(&[]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Email ou mot de passe incorrect");
}

#[tokio::test]
async fn bearer_routes_distinguish_missing_and_bad_tokens() {
    let app = build_router(test_state(&[]));

    let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::GET, "/api/auth/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_shows_up_in_me() {
    let state = test_state(&[]);
    let app = build_router(state.clone());
    state
        .user_service
        .create(CreateUserPayload {
            email: "agent@example.com".into(),
            password: "pw".into(),
            name: "Agent".into(),
            role: None,
        })
        .await
        .unwrap();
    let token = login(&app, "agent@example.com", "pw").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({ "name": "Agent Smith", "phone": "0102", "poste": "Auditeur" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["name"], "Agent Smith");
    assert_eq!(me["poste"], "Auditeur");
    assert_eq!(me["phone"], "0102");
}

#[tokio::test]
async fn admin_policy_guards_user_routes() {
    let state = test_state(&[("USERS_ACCESS", "admin")]);
    let app = build_router(state.clone());
    state
        .user_service
        .ensure_admin(&SeedAdmin {
            email: "root@example.com".into(),
            password: "rootpw".into(),
            name: "Root".into(),
        })
        .await
        .unwrap();
    state
        .user_service
        .create(CreateUserPayload {
            email: "plain@example.com".into(),
            password: "pw".into(),
            name: "Plain".into(),
            role: Some(Role::User),
        })
        .await
        .unwrap();

    let (status, _) = send(&app, Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = login(&app, "plain@example.com", "pw").await;
    let (status, _) = send(&app, Method::GET, "/api/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = login(&app, "root@example.com", "rootpw").await;
    let (status, users) = send(&app, Method::GET, "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    // diligences stay public
    let (status, _) = send(&app, Method::GET, "/api/diligences", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn diligence_crud() {
    let app = build_router(test_state(&[]));

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/diligences",
        None,
        Some(diligence_body("Audit des marchés")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, item) = send(&app, Method::GET, &format!("/api/diligences/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["titre"], "Audit des marchés");
    assert_eq!(item["statut"], "En cours");
    assert_eq!(item["destinataire"], json!(["Service courrier"]));

    let mut replacement = diligence_body("Audit révisé");
    replacement["statut"] = json!("Terminé");
    replacement["progression"] = json!(100);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/diligences/{}", id),
        None,
        Some(replacement),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, item) = send(&app, Method::GET, &format!("/api/diligences/{}", id), None, None).await;
    assert_eq!(item["titre"], "Audit révisé");
    assert_eq!(item["progression"], 100);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/diligences/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::DELETE, &format!("/api/diligences/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn replacing_a_missing_diligence_changes_nothing() {
    let app = build_router(test_state(&[]));
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/diligences",
        None,
        Some(diligence_body("Original")),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/diligences/{}", id + 1),
        None,
        Some(diligence_body("Intrus")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/api/diligences", None, None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["titre"], "Original");
}

#[tokio::test]
async fn diligence_names_come_from_joined_users() {
    let state = test_state(&[]);
    let app = build_router(state.clone());
    let owner = state
        .user_service
        .create(CreateUserPayload {
            email: "owner@example.com".into(),
            password: "pw".into(),
            name: "Owner".into(),
            role: None,
        })
        .await
        .unwrap();

    let mut body = diligence_body("Suivi");
    body["createdBy"] = json!(owner.id);
    body["assignedTo"] = json!(owner.id);
    let (_, created) = send(&app, Method::POST, "/api/diligences", None, Some(body)).await;
    let id = created["id"].as_i64().unwrap();

    let (_, item) = send(&app, Method::GET, &format!("/api/diligences/{}", id), None, None).await;
    assert_eq!(item["createdByName"], "Owner");
    assert_eq!(item["assignedName"], "Owner");

    let mut dangling = diligence_body("Orphelin");
    dangling["assignedTo"] = json!(9999);
    let (status, _) = send(&app, Method::POST, "/api/diligences", None, Some(dangling)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let app = build_router(test_state(&[]));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/diligences")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut missing = diligence_body("Sans date");
    missing.as_object_mut().unwrap().remove("dateFin");
    let (status, _) = send(&app, Method::POST, "/api/diligences", None, Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/users/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app, Method::GET, "/api/diligences", None, None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_filters_by_status() {
    let app = build_router(test_state(&[]));
    send(&app, Method::POST, "/api/diligences", None, Some(diligence_body("A"))).await;
    let mut done = diligence_body("B");
    done["statut"] = json!("Terminé");
    send(&app, Method::POST, "/api/diligences", None, Some(done)).await;

    let (status, list) = send(&app, Method::GET, "/api/diligences?statut=Termin%C3%A9", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["titre"], "B");

    let (status, _) = send(&app, Method::GET, "/api/diligences?statut=Inconnu", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_survives_extreme_pages_and_accented_search() {
    let app = build_router(test_state(&[]));
    send(
        &app,
        Method::POST,
        "/api/diligences",
        None,
        Some(diligence_body("Étude des marchés")),
    )
    .await;

    let (status, list) = send(
        &app,
        Method::GET,
        &format!("/api/diligences?page={}&per_page=10", i64::MAX),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, list) = send(&app, Method::GET, "/api/diligences?search=%C3%89TUDE", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = send(&app, Method::GET, "/api/diligences?search=%25", None, None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn updating_a_deactivated_user_is_not_found() {
    let state = test_state(&[]);
    let app = build_router(state.clone());
    let user = state
        .user_service
        .create(CreateUserPayload {
            email: "former@example.com".into(),
            password: "pw".into(),
            name: "Former".into(),
            role: None,
        })
        .await
        .unwrap();
    state.user_service.soft_delete(user.id).await.unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", user.id),
        None,
        Some(json!({ "email": "back@example.com", "name": "Back", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (email, name, role, is_active): (String, String, String, bool) =
        sqlx::query_as("SELECT email, name, role, is_active FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(state.db.pool().await.unwrap())
            .await
            .unwrap();
    assert_eq!(email, "former@example.com");
    assert_eq!(name, "Former");
    assert_eq!(role, "user");
    assert!(!is_active);
}

#[tokio::test]
async fn dashboard_stats_summarize_diligences() {
    let app = build_router(test_state(&[]));
    send(&app, Method::POST, "/api/diligences", None, Some(diligence_body("A"))).await;
    send(&app, Method::POST, "/api/diligences", None, Some(diligence_body("B"))).await;

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["byStatus"]["En cours"], 2);
    assert_eq!(stats["byStatus"]["Planifié"], 0);
    assert_eq!(stats["byPriority"]["Haute"], 2);
}

#[tokio::test]
async fn health_docs_and_fallback() {
    let app = build_router(test_state(&[]));

    let (status, health) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "connected");
    assert!(health["timestamp"].is_string());

    let (status, doc) = send(&app, Method::GET, "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/diligences"].is_object());

    let (status, body) = send(&app, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route non trouvée");
    assert_eq!(body["path"], "/api/nowhere");
}
