use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod health;
pub mod messages;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub message_service: MessageService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

/// Configures and returns the primary application router.
pub fn app_router(message_service: MessageService) -> Router {
    let state = AppState { message_service };

    // matchit allows one parameter name per position, so `{id}` also carries
    // the window start on `/messages/{id}/{end}`.
    let message_routes = Router::new()
        .route(
            "/messages",
            get(messages::list_messages).post(messages::send_message).delete(messages::delete_messages),
        )
        .route("/messages/mark-read", patch(messages::mark_read))
        .route("/messages/mark-unread", patch(messages::mark_unread))
        .route("/messages/recipients", get(messages::list_recipients))
        .route("/messages/recipients/{address}", get(messages::list_recipient_messages))
        .route("/messages/recipients/{address}/unread", get(messages::list_recipient_unread))
        .route("/messages/recipients/{address}/unread/{start}/{end}", get(messages::list_recipient_unread_in_window))
        .route("/messages/recipients/{address}/{start}/{end}", get(messages::list_recipient_messages_in_window))
        .route("/messages/{id}", get(messages::get_message).delete(messages::delete_message))
        .route("/messages/{id}/{end}", get(messages::list_messages_in_window));

    Router::new()
        .nest("/v1", message_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .and_then(|id| id.header_value().to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = response.status();
                        span.record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
