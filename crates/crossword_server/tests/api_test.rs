//! Tests for the REST API routes.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crossword_core::{CrosswordGenerator, Dictionary, GeneratorConfig};
use crossword_server::{CorsConfig, SessionManager, SessionSettings, router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(pairs: &[(&str, &str)]) -> (Router, SessionManager) {
    app_with_cors(pairs, &CorsConfig::default())
}

fn app_with_cors(pairs: &[(&str, &str)], cors: &CorsConfig) -> (Router, SessionManager) {
    let dictionary = Arc::new(Dictionary::from_pairs(pairs.iter().copied()));
    let generator = Arc::new(CrosswordGenerator::new(
        dictionary,
        GeneratorConfig::default(),
    ));
    let sessions = SessionManager::new(generator, SessionSettings::default(), Some(7));
    (router(sessions.clone(), cors), sessions)
}

fn app() -> (Router, SessionManager) {
    app_with(&[("casa", "Lugar onde se mora")])
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request");
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request");
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Creates a game for Ana and returns `(game_id, player_id)`.
async fn create(app: &Router) -> (String, String) {
    let (status, body) = post(
        app,
        "/game/create",
        json!({ "playerName": "Ana", "wordCount": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["gameId"].as_str().unwrap().to_string(),
        body["playerId"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_create_and_get_game() {
    let (app, _) = app();
    let (game_id, player_id) = create(&app).await;

    let (status, game) = get(&app, &format!("/game/{game_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["id"], game_id);
    assert_eq!(game["status"], "waiting");
    assert_eq!(game["creatorId"], player_id);
    assert_eq!(game["players"][0]["name"], "Ana");
    assert_eq!(game["players"][0]["isReady"], false);
}

#[tokio::test]
async fn test_full_game_over_http() {
    let (app, _) = app();
    let (game_id, ana) = create(&app).await;

    let (status, joined) = post(
        &app,
        "/game/join",
        json!({ "gameId": game_id, "playerName": "Bia" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["game"]["players"].as_array().unwrap().len(), 2);

    let (status, game) = post(
        &app,
        "/game/toggle-ready",
        json!({ "gameId": game_id, "playerId": ana }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["players"][0]["isReady"], true);

    let (status, game) = post(
        &app,
        "/game/start",
        json!({ "gameId": game_id, "playerId": ana }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["status"], "playing");
    assert_eq!(game["words"][0]["direction"], "horizontal");
    assert!(game["words"][0].get("word").is_none());

    let (status, outcome) = post(
        &app,
        "/game/attempt",
        json!({ "gameId": game_id, "playerId": ana, "wordId": 1, "attempt": "Casa" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["correct"], true);
    assert_eq!(outcome["game"]["status"], "finished");
    assert_eq!(outcome["game"]["players"][0]["score"], 10);
    assert_eq!(outcome["game"]["winner"]["id"], ana);
    assert_eq!(outcome["game"]["words"][0]["word"], "casa");
    assert_eq!(outcome["game"]["grid"][7][5]["letter"], "c");
}

#[tokio::test]
async fn test_pass_turn_route() {
    let (app, _) = app();
    let (game_id, ana) = create(&app).await;
    let (_, joined) = post(
        &app,
        "/game/join",
        json!({ "gameId": game_id, "playerName": "Bia" }),
    )
    .await;
    post(&app, "/game/start", json!({ "gameId": game_id, "playerId": ana })).await;

    let (status, game) = post(
        &app,
        "/game/pass",
        json!({ "gameId": game_id, "playerId": ana }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["currentTurnIndex"], 1);
    assert_eq!(game["currentPlayerId"], joined["playerId"]);
}

#[tokio::test]
async fn test_not_found_maps_to_404() {
    let (app, _) = app();

    let (status, body) = get(&app, "/game/ZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game not found");

    let (game_id, ana) = create(&app).await;
    post(&app, "/game/start", json!({ "gameId": game_id, "playerId": ana })).await;
    let (status, body) = post(
        &app,
        "/game/attempt",
        json!({ "gameId": game_id, "playerId": ana, "wordId": 99, "attempt": "casa" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Word not found");
}

#[tokio::test]
async fn test_rule_violations_map_to_400() {
    let (app, _) = app();

    let (status, body) = post(
        &app,
        "/game/create",
        json!({ "playerName": "Ana", "wordCount": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Word count must be between 1 and 100");

    let (game_id, _) = create(&app).await;
    let (_, joined) = post(
        &app,
        "/game/join",
        json!({ "gameId": game_id, "playerName": "Bia" }),
    )
    .await;
    let (status, body) = post(
        &app,
        "/game/start",
        json!({ "gameId": game_id, "playerId": joined["playerId"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only the creator can start the game");
}

#[tokio::test]
async fn test_generation_failure_maps_to_500() {
    let (app, _) = app_with(&[]);
    let (game_id, ana) = create(&app).await;

    let (status, body) = post(
        &app,
        "/game/start",
        json!({ "gameId": game_id, "playerId": ana }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("word pool is empty"));
}

#[tokio::test]
async fn test_routes_share_session_manager() {
    let (app, sessions) = app();
    let (game_id, _) = create(&app).await;
    assert_eq!(sessions.list_sessions(), vec![game_id]);
}

async fn preflight(app: &Router, origin: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/game/create")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .expect("Failed to build request");
    app.clone().oneshot(request).await.expect("Request failed")
}

#[tokio::test]
async fn test_preflight_from_dev_origin() {
    let (app, _) = app();
    let response = preflight(&app, "http://localhost:5173").await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
    let methods = headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_gets_no_grant() {
    let (app, _) = app();
    let response = preflight(&app, "http://elsewhere.example").await;
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_any_origin_mirrors_request() {
    let cors = CorsConfig::new(Vec::new(), true);
    let (app, _) = app_with_cors(&[("casa", "Lugar onde se mora")], &cors);
    let response = preflight(&app, "https://crosswords.example").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://crosswords.example"
    );
}

#[tokio::test]
async fn test_cors_headers_on_simple_request() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_mistyped_body_maps_to_400_json() {
    let (app, _) = app();
    let (status, body) = post(
        &app,
        "/game/create",
        json!({ "playerName": "Ana", "wordCount": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_maps_to_400_json() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/game/join")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/game/join")
        .body(Body::from(r#"{"gameId":"ABCD","playerName":"Bia"}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
