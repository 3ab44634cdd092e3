use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::health;
use super::jwks;
use super::middleware::{metrics_middleware, security_headers_middleware, MAX_BODY_SIZE};
use super::resource;
use super::state::{AppState, ResourceState};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Router of the issuing server: register, login, JWKS and health
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::create_health_router())
        .merge(auth::create_auth_router())
        .merge(jwks::create_jwks_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Router of the resource server demo: `/hello` behind bearer tokens
pub fn create_resource_router(state: ResourceState) -> Router {
    Router::new()
        .merge(health::create_health_router())
        .merge(resource::create_resource_routes())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Add the Prometheus endpoint when metrics are enabled
pub fn with_metrics(router: Router, metrics: Option<PrometheusMetrics>, path: &str) -> Router {
    match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics, path)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use jsonwebtoken::decode_header;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::VerifierConfig;
    use crate::domain::credential::{MockUserStore, UserStore};
    use crate::infrastructure::auth::fixtures::signing_keys;
    use crate::infrastructure::auth::{
        JwksPublisher, JwksSource, StaticJwksSource, TokenIssuer, TokenVerifier,
    };
    use crate::infrastructure::credential::{fast_hasher, AuthService, InMemoryUserStore};

    fn app_with_store<R: UserStore + 'static>(store: Arc<R>) -> (Router, Arc<JwksPublisher>) {
        let keys = Arc::new(signing_keys());
        let issuer = Arc::new(TokenIssuer::new(keys.clone(), "http://localhost", "api", 900));
        let service = AuthService::new(store, Arc::new(fast_hasher()), issuer).unwrap();
        let jwks = Arc::new(JwksPublisher::new(&keys, 3600).unwrap());

        let state = AppState {
            auth_service: Arc::new(service),
            jwks: jwks.clone(),
        };

        (create_router(state), jwks)
    }

    fn app() -> Router {
        app_with_store(Arc::new(InMemoryUserStore::new())).0
    }

    fn resource_app(source: Arc<dyn JwksSource>) -> Router {
        let config = VerifierConfig {
            issuer: "http://localhost".to_string(),
            audience: "api".to_string(),
            ..VerifierConfig::default()
        };

        create_resource_router(ResourceState {
            verifier: Arc::new(TokenVerifier::new(source, &config)),
        })
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get(app: &Router, uri: &str, bearer: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn credentials(identifier: &str, secret: &str) -> Value {
        json!({ "identifier": identifier, "secret": secret })
    }

    async fn login_token(app: &Router) -> String {
        post_json(app, "/register", credentials("u@x.com", "pw1")).await;
        let response = post_json(app, "/login", credentials("u@x.com", "pw1")).await;
        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_login_flow() {
        let app = app();

        let response = post_json(&app, "/register", credentials("u@x.com", "pw1")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({ "message": "Success!" }));

        let response = post_json(&app, "/login", credentials("u@x.com", "pw1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let body = body_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 900);

        let token = body["access_token"].as_str().unwrap();
        let header = decode_header(token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("k1"));

        let response = post_json(&app, "/login", credentials("u@x.com", "wrong")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "incorrect_name_or_password" })
        );

        let response = post_json(&app, "/register", credentials("u@x.com", "pw1")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "user_is_already_registered" })
        );
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_secret_are_identical() {
        let app = app();
        post_json(&app, "/register", credentials("u@x.com", "pw1")).await;

        let wrong = post_json(&app, "/login", credentials("u@x.com", "wrong")).await;
        let unknown = post_json(&app, "/login", credentials("nobody@x.com", "pw1")).await;

        assert_eq!(wrong.status(), unknown.status());
        assert_eq!(body_bytes(wrong).await, body_bytes(unknown).await);
    }

    #[tokio::test]
    async fn test_login_with_aliases() {
        let app = app();
        post_json(&app, "/register", json!({ "email": "u@x.com", "password": "pw1" })).await;

        let response = post_json(&app, "/login", json!({ "login": "U@X.com", "password": "pw1" })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_jwks_endpoint() {
        let app = app();

        let response = get(&app, "/.well-known/jwks.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_json(response).await;
        let keys = body["keys"].as_array().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0]["kid"], "k1");
        assert_eq!(keys[0]["use"], "sig");
        assert_eq!(keys[0]["alg"], "RS256");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = app();

        let response = post_json(&app, "/register", json!({ "identifier": "u@x.com" })).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_register_invalid_identifier() {
        let app = app();

        let response = post_json(&app, "/register", credentials("not-an-email", "pw1")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = post_json(&app, "/login", credentials("not-an-email", "pw1")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let store = Arc::new(MockUserStore::new());
        let (app, _) = app_with_store(store.clone());
        store.set_should_fail(true).await;

        let response = post_json(&app, "/register", credentials("u@x.com", "pw1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "internal_server_error" })
        );

        let response = post_json(&app, "/login", credentials("u@x.com", "pw1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(&app(), "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_resource_accepts_issued_token() {
        let (app, jwks) = app_with_store(Arc::new(InMemoryUserStore::new()));
        let token = login_token(&app).await;

        let resource = resource_app(Arc::new(StaticJwksSource::new(jwks.serve().clone())));
        let response = get(&resource, "/hello", Some(&token)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Hello, u@x.com");
    }

    #[tokio::test]
    async fn test_resource_rejects_missing_and_bad_tokens() {
        let (_, jwks) = app_with_store(Arc::new(InMemoryUserStore::new()));
        let resource = resource_app(Arc::new(StaticJwksSource::new(jwks.serve().clone())));

        let response = get(&resource, "/hello", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "detail": "invalid_token" }));

        let response = get(&resource, "/hello", Some("not.a.token")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_resource_without_keys_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let app = app();
        let token = login_token(&app).await;

        let config = VerifierConfig {
            jwks_url: format!("{}/.well-known/jwks.json", server.uri()),
            issuer: "http://localhost".to_string(),
            audience: "api".to_string(),
            ..VerifierConfig::default()
        };
        let resource = create_resource_router(ResourceState {
            verifier: Arc::new(TokenVerifier::from_config(&config).unwrap()),
        });

        let response = get(&resource, "/hello", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_json(response).await,
            json!({ "detail": "verification_keys_unavailable" })
        );
    }
}
