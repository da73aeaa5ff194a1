use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{books, users};

/// Upper bound on a single request, including the storage round-trip
/// and any hashing work. A slow store surfaces as a failure response
/// instead of holding the task.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/v1",
            Router::new()
                .merge(users::router())
                .merge(books::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_and_login(app: &Router) -> String {
        let res = app
            .clone()
            .oneshot(post_json(
                "/v1/register",
                json!({
                    "email": "a@b.com",
                    "password": "password123",
                    "username": "u1-reader",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(post_json(
                "/v1/login",
                json!({ "email": "a@b.com", "password": "password123" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let token = body_json(res).await["token"].as_str().unwrap().to_string();
        assert!(!token.is_empty());
        token
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app.oneshot(get_request("/v1/health", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_header() {
        let app = build_app(AppState::fake());
        for uri in [
            "/v1/auth/books",
            "/v1/auth/books/1",
            "/v1/auth/users",
            "/v1/auth/user/1",
        ] {
            let res = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "uri {uri}");
        }
    }

    #[tokio::test]
    async fn protected_routes_reject_garbage_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(get_request("/v1/auth/books", Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_and_fetch_user_flow() {
        let app = build_app(AppState::fake());
        let token = register_and_login(&app).await;

        let res = app
            .clone()
            .oneshot(get_request("/v1/auth/user/1", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["email"], "a@b.com");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = build_app(AppState::fake());
        register_and_login(&app).await;

        let res = app
            .oneshot(post_json(
                "/v1/register",
                json!({
                    "email": "a@b.com",
                    "password": "password123",
                    "username": "u1-reader",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_and_fetch_book_with_token() {
        let app = build_app(AppState::fake());
        let token = register_and_login(&app).await;

        let res = app
            .clone()
            .oneshot(post_json(
                "/v1/auth/books",
                json!({ "title": "T", "author": "A", "price": 10, "stock": 1 }),
                Some(&token),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let created = body_json(res).await;
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);

        let res = app
            .clone()
            .oneshot(get_request(&format!("/v1/auth/books/{id}"), Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let fetched = body_json(res).await;
        assert_eq!(fetched["title"], "T");
        assert_eq!(fetched["author"], "A");
        assert_eq!(fetched["price"], 10);
        assert_eq!(fetched["stock"], 1);
    }

    #[tokio::test]
    async fn missing_book_is_404_and_bad_id_is_400() {
        let app = build_app(AppState::fake());
        let token = register_and_login(&app).await;

        let res = app
            .clone()
            .oneshot(get_request("/v1/auth/books/99", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(get_request("/v1/auth/books/not-a-number", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
