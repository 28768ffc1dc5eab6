use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::iri::API_PREFIX;
use crate::state::AppState;
use crate::{auth, categories, products, search};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            API_PREFIX,
            Router::new()
                .merge(auth::router())
                .merge(categories::router())
                .merge(products::router())
                .merge(search::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::Role;
    use crate::auth::services::JwtKeys;
    use axum::{
        body::Body,
        extract::FromRef,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn bearer(state: &AppState, roles: &[Role]) -> String {
        let token = JwtKeys::from_ref(state)
            .sign_access(Uuid::new_v4(), roles)
            .expect("sign access");
        format!("Bearer {token}")
    }

    fn json_request(method: Method, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_writes_are_unauthorized() {
        let app = build_app(AppState::fake());
        for (method, uri) in [
            (Method::POST, "/api/categories"),
            (Method::PUT, "/api/categories/1"),
            (Method::PATCH, "/api/products/1"),
            (Method::DELETE, "/api/products/1"),
        ] {
            let res = app
                .clone()
                .oneshot(json_request(method.clone(), uri, None, r#"{"name":"Shoes"}"#))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn non_admin_writes_are_forbidden() {
        let state = AppState::fake();
        let auth = bearer(&state, &[Role::User]);
        let app = build_app(state);
        for (method, uri) in [
            (Method::POST, "/api/categories"),
            (Method::PUT, "/api/categories/1"),
            (Method::PATCH, "/api/categories/1"),
            (Method::DELETE, "/api/categories/1"),
            (Method::POST, "/api/products"),
            (Method::PUT, "/api/products/1"),
            (Method::PATCH, "/api/products/1"),
            (Method::DELETE, "/api/products/1"),
        ] {
            let res = app
                .clone()
                .oneshot(json_request(
                    method.clone(),
                    uri,
                    Some(&auth),
                    r#"{"name":"Shoes","descriptionInternal":"x"}"#,
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn out_of_range_page_is_a_validation_error() {
        let app = build_app(AppState::fake());
        for uri in [
            "/api/categories?page=9223372036854775807",
            "/api/products?page=9223372036854775807",
        ] {
            let res = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            let json = json_body(res).await;
            assert_eq!(json["violations"][0]["propertyPath"], "page");
        }
    }

    #[tokio::test]
    async fn search_returns_three_string_lists() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(
                Method::POST,
                "/api/test_searches",
                None,
                r#"{"from":"2024-01-01","to":"2024-01-31"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = json_body(res).await;
        for key in ["flights", "airports", "cities"] {
            let list = json[key].as_array().expect(key);
            assert!(!list.is_empty());
            assert!(list.iter().all(|v| v.is_string()));
        }
    }

    #[tokio::test]
    async fn reversed_search_range_is_a_validation_error() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(json_request(
                Method::POST,
                "/api/test_searches",
                None,
                r#"{"from":"2024-02-01","to":"2024-01-01"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(res).await;
        assert_eq!(json["violations"][0]["propertyPath"], "to");
    }
}
