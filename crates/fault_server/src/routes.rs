//! Route definitions
//!
//! Requests under [`ADMIN_PREFIX`] go to the admin API and never see a fault.
//! Everything else goes through the fault stack to the sample routes.

use axum::{
    Router,
    routing::{get, put},
};
use fault_core::Handler;
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Path prefix of the admin API
pub const ADMIN_PREFIX: &str = "/_faults";

/// Sample routes that faults are applied to
pub fn sample_router() -> Router {
    Router::new()
        .route("/", get(handlers::demo::root))
        .route("/health", get(handlers::demo::health))
        .layer(TraceLayer::new_for_http())
}

/// Admin API
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route(ADMIN_PREFIX, get(handlers::admin::list_faults))
        .route(
            &format!("{ADMIN_PREFIX}/metrics"),
            get(handlers::admin::metrics),
        )
        .route(
            &format!("{ADMIN_PREFIX}/{{name}}"),
            get(handlers::admin::get_fault),
        )
        .route(
            &format!("{ADMIN_PREFIX}/{{name}}/enabled"),
            put(handlers::admin::set_enabled),
        )
        .route(
            &format!("{ADMIN_PREFIX}/{{name}}/participation"),
            put(handlers::admin::set_participation),
        )
        .with_state(state)
}

fn is_admin_path(path: &str) -> bool {
    path.strip_prefix(ADMIN_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Complete application: admin API plus the fault-wrapped sample routes
pub fn create_app(state: AppState) -> Handler {
    let faulted = state.faults.wrap(Handler::from_service(sample_router()));
    let admin = Handler::from_service(admin_router(state));

    Handler::new(move |req| {
        if is_admin_path(req.uri().path()) {
            admin.handle(req)
        } else {
            faulted.handle(req)
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        extract::Request,
        http::{Method, StatusCode, header},
        response::Response,
    };
    use fault_core::{Aborted, FaultConfig, InjectorConfig, NoopReporter};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::stack::FaultStack;

    fn state() -> AppState {
        let configs = [
            FaultConfig {
                name: Some("errors".to_string()),
                participation: 1.0,
                injector: Some(InjectorConfig::Error {
                    status: 503,
                    text: None,
                }),
                ..FaultConfig::default()
            },
            FaultConfig {
                name: Some("drops".to_string()),
                participation: 1.0,
                injector: Some(InjectorConfig::Reject),
                ..FaultConfig::default()
            },
        ];
        let faults = FaultStack::from_configs(&configs, &NoopReporter::shared()).unwrap();
        AppState::new(faults, None)
    }

    fn get_request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    fn put_json(path: &str, body: &Value) -> Request {
        Request::builder()
            .method(Method::PUT)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn admin_prefix_matching() {
        assert!(is_admin_path("/_faults"));
        assert!(is_admin_path("/_faults/errors/enabled"));
        assert!(!is_admin_path("/_faultsx"));
        assert!(!is_admin_path("/"));
    }

    #[tokio::test]
    async fn sample_routes_pass_through_disabled_faults() {
        let app = create_app(state());

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "OK"}));

        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_faults_reports_state() {
        let app = create_app(state());
        let response = app.oneshot(get_request("/_faults")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "errors");
        assert_eq!(body[0]["injector"], "ErrorInjector");
        assert_eq!(body[0]["enabled"], false);
        assert_eq!(body[1]["name"], "drops");
    }

    #[tokio::test]
    async fn enabling_a_fault_changes_sample_responses() {
        let app = create_app(state());

        let response = app
            .clone()
            .oneshot(put_json("/_faults/errors/enabled", &json!({"enabled": true})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["enabled"], true);

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        // admin routes bypass the stack
        let response = app.oneshot(get_request("/_faults/errors")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn enabled_reject_aborts_sample_requests() {
        let app = create_app(state());
        app.clone()
            .oneshot(put_json("/_faults/drops/enabled", &json!({"enabled": true})))
            .await
            .unwrap();

        let err = app.oneshot(get_request("/")).await.unwrap_err();
        assert_eq!(err, Aborted);
    }

    #[tokio::test]
    async fn participation_updates_are_validated() {
        let app = create_app(state());

        let response = app
            .clone()
            .oneshot(put_json(
                "/_faults/errors/participation",
                &json!({"participation": 0.25}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["participation"], 0.25);

        let response = app
            .oneshot(put_json(
                "/_faults/errors/participation",
                &json!({"participation": 1.5}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_fault_is_not_found() {
        let app = create_app(state());
        let response = app
            .oneshot(put_json("/_faults/nope/enabled", &json!({"enabled": true})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "not_found");
    }

    #[tokio::test]
    async fn metrics_disabled_is_not_found() {
        let app = create_app(state());
        let response = app.oneshot(get_request("/_faults/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
