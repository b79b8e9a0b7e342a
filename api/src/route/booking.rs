use axum::routing::{get, post, put};
use axum::Router;
use registry::AppRegistry;

use crate::handler::booking::{create_booking, show_user_bookings, update_booking_status};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(create_booking))
        .route("/", get(show_user_bookings))
        .route("/:booking_id/status", put(update_booking_status));

    Router::new().nest("/bookings", routers)
}
