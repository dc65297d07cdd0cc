use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, bookings, vehicles};
use crate::middleware::auth::{auth_middleware, require_broker, require_renter};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::user_rate_limit::{create_user_governor, RateLimitedRole};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let renter_governor = create_user_governor(RateLimitedRole::Renter);
    let broker_governor = create_user_governor(RateLimitedRole::Broker);
    let public_governor = create_public_governor();

    // Public routes (IP-based rate limiting)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    let me_route = Router::new()
        .route("/me", get(auth::me))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Public catalog and pre-flight availability check
    let public_routes = Router::new()
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{id}", get(vehicles::get_vehicle))
        .route("/bookings/check", get(bookings::check_availability))
        .layer(public_governor);

    // Broker routes (requires auth + broker role)
    let broker_routes = Router::new()
        .route("/vehicles", get(vehicles::my_vehicles))
        .route("/vehicles", post(vehicles::create_vehicle))
        .route("/vehicles/{id}", put(vehicles::update_vehicle))
        .route("/vehicles/{id}", delete(vehicles::delete_vehicle))
        .route("/vehicles/{id}/availability", put(vehicles::set_availability))
        .layer(broker_governor)
        .layer(middleware::from_fn(require_broker))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Renter booking routes (requires auth + renter role)
    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/mine", get(bookings::my_bookings))
        .route("/{id}/cancel", put(bookings::cancel_booking))
        .layer(renter_governor)
        .layer(middleware::from_fn(require_renter))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes.merge(me_route))
        .nest("/api", public_routes)
        .nest("/api/broker", broker_routes)
        .nest("/api/bookings", booking_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vehicle;
    use crate::middleware::rate_limit::log_request;
    use crate::utils::locks::VehicleLocks;
    use crate::{AppState, Config};
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn state_with(db: DatabaseConnection) -> AppState {
        AppState {
            db: std::sync::Arc::new(db),
            config: Config {
                database_url: String::new(),
                db_max_connections: 1,
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 24,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
            },
            vehicle_locks: VehicleLocks::new(),
        }
    }

    fn request_from(addr: &str, uri: &str) -> Request<Body> {
        let addr: SocketAddr = addr.parse().unwrap();
        Request::builder()
            .uri(uri)
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap()
    }

    // Full middleware stack as main.rs assembles it: router, governors,
    // request logging.
    #[tokio::test]
    async fn public_catalog_serves_through_the_logging_stack() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vehicle::Model>::new()])
            .into_connection();

        let app = create_router(state_with(db)).layer(middleware::from_fn(log_request));

        let response = app
            .oneshot(request_from("127.0.0.1:4000", "/api/vehicles"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn booking_routes_reject_missing_credentials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let app = create_router(state_with(db)).layer(middleware::from_fn(log_request));

        let response = app
            .oneshot(request_from("127.0.0.1:4001", "/api/bookings/mine"))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
