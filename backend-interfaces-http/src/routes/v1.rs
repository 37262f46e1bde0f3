use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    checkin_handlers, courtesy_handlers, ops_handlers, purchase_handlers, ticket_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/orders/capture",
            axum::routing::post(purchase_handlers::capture_order),
        )
        .route(
            "/v1/courtesy/tickets",
            axum::routing::post(courtesy_handlers::issue_courtesy)
                .get(courtesy_handlers::list_courtesy),
        )
        .route(
            "/v1/users/:uid/tickets",
            axum::routing::get(ticket_handlers::get_user_tickets),
        )
        .route(
            "/v1/tickets/:ticket_id/attendee",
            axum::routing::put(ticket_handlers::configure_attendee),
        )
        .route(
            "/v1/account/link",
            axum::routing::post(ticket_handlers::link_account),
        )
        .route("/v1/checkin", axum::routing::post(checkin_handlers::checkin))
        .route(
            "/v1/qr/:qr",
            axum::routing::get(checkin_handlers::public_qr_lookup),
        )
        .route(
            "/v1/events/:event_id/tickets",
            axum::routing::get(ticket_handlers::list_event_tickets),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
