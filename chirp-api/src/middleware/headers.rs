/// Response headers middleware
///
/// Stamps every response with `Cache-Control: no-store` (session-bound
/// pages must never be served from a cache) plus a small set of security
/// headers.
///
/// # Headers Applied
///
/// - `Cache-Control: no-store`
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use chirp_api::middleware::headers::ResponseHeadersLayer;
///
/// let app: Router = Router::new().layer(ResponseHeadersLayer::new());
/// ```

use axum::{extract::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Response headers middleware layer
#[derive(Clone, Default)]
pub struct ResponseHeadersLayer;

impl ResponseHeadersLayer {
    /// Creates a new response headers layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for ResponseHeadersLayer {
    type Service = ResponseHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseHeadersMiddleware { inner }
    }
}

/// Response headers middleware service
#[derive(Clone)]
pub struct ResponseHeadersMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for ResponseHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;

            let headers = response.headers_mut();

            // Session-bound responses must not be cached
            headers.insert("Cache-Control", "no-store".parse().unwrap());

            headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());

            headers.insert("X-Frame-Options", "DENY".parse().unwrap());

            headers.insert(
                "Referrer-Policy",
                "strict-origin-when-cross-origin".parse().unwrap(),
            );

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::get, Router};
    use tower::Service as _;

    #[tokio::test]
    async fn test_headers_applied() {
        async fn handler() -> impl IntoResponse {
            (StatusCode::OK, "test")
        }

        let mut app = Router::new()
            .route("/test", get(handler))
            .layer(ResponseHeadersLayer::new());

        let response = app
            .call(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();

        assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            headers.get("Referrer-Policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
    }

    #[tokio::test]
    async fn test_no_store_on_errors_too() {
        async fn handler() -> impl IntoResponse {
            (StatusCode::NOT_FOUND, "missing")
        }

        let mut app = Router::new()
            .route("/missing", get(handler))
            .layer(ResponseHeadersLayer::new());

        let response = app
            .call(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    }
}
