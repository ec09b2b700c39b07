//! Tower integration
//!
//! [`FaultLayer`] puts a [`Fault`] in front of any tower service whose errors
//! convert into [`Aborted`], which includes axum routers. The wrapped service
//! is itself a [`Handler`], so layers stack: the outermost layer evaluates
//! first.

use axum::{extract::Request, response::Response};
use tower::{Layer, Service};

use crate::{
    fault::Fault,
    handler::{Aborted, Handler},
};

/// Layer that wraps services with a fault
#[derive(Debug, Clone)]
pub struct FaultLayer {
    fault: Fault,
}

impl FaultLayer {
    pub const fn new(fault: Fault) -> Self {
        Self { fault }
    }

    pub const fn fault(&self) -> &Fault {
        &self.fault
    }
}

impl From<Fault> for FaultLayer {
    fn from(fault: Fault) -> Self {
        Self::new(fault)
    }
}

impl<S> Layer<S> for FaultLayer
where
    S: Service<Request, Response = Response> + Clone + Send + Sync + 'static,
    S::Error: Into<Aborted>,
    S::Future: Send,
{
    type Service = Handler;

    fn layer(&self, inner: S) -> Self::Service {
        self.fault.handler(Handler::from_service(inner))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::{ServiceBuilder, ServiceExt};

    use super::*;
    use crate::{
        injector::{ErrorInjector, RejectInjector},
        test_support::body_string,
        trail::FaultTrail,
    };

    fn fault(code: u16, enabled: bool) -> Fault {
        Fault::builder()
            .injector(ErrorInjector::new(code).unwrap())
            .enabled(enabled)
            .participation(1.0)
            .build()
            .unwrap()
    }

    fn app() -> Router {
        Router::new().route("/", get(|| async { "ok" }))
    }

    fn get_root() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn wraps_router() {
        let service = FaultLayer::new(fault(503, true)).layer(app());
        let response = service.oneshot(get_root()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn disabled_layer_reaches_router() {
        let service = FaultLayer::new(fault(503, false)).layer(app());
        let response = service.oneshot(get_root()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn outermost_layer_evaluates_first() {
        let service = ServiceBuilder::new()
            .layer(FaultLayer::new(fault(502, true)))
            .layer(FaultLayer::new(fault(504, true)))
            .service(app());

        let response = service.oneshot(get_root()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn inner_layer_sees_outer_trail() {
        let seen = Router::new().route(
            "/",
            get(|req: Request| async move {
                let trail = req.extensions().get::<FaultTrail>().cloned().unwrap_or_default();
                format!("{}", trail.entries().len())
            }),
        );

        let service = ServiceBuilder::new()
            .layer(FaultLayer::new(fault(500, false)))
            .layer(FaultLayer::new(fault(500, false)))
            .service(seen);

        let response = service.oneshot(get_root()).await.unwrap();
        assert_eq!(body_string(response).await, "2");
    }

    #[tokio::test]
    async fn reject_surfaces_as_service_error() {
        let reject = Fault::builder()
            .injector(RejectInjector::new())
            .enabled(true)
            .participation(1.0)
            .build()
            .unwrap();
        let service = FaultLayer::from(reject).layer(app());

        let err = service.oneshot(get_root()).await.unwrap_err();
        assert!(Aborted::is_abort(&err));
    }

    #[test]
    fn exposes_fault() {
        let layer = FaultLayer::new(fault(500, false));
        assert!(!layer.fault().is_enabled());
    }
}
