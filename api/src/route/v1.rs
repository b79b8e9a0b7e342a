use axum::Router;
use registry::AppRegistry;

use crate::route::{booking, health, parking_lot, user};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(health::build_health_check_routers())
        .merge(user::build_user_routers())
        .merge(parking_lot::build_parking_lot_routers())
        .merge(booking::build_booking_routers());

    Router::new().nest("/api/v1", router)
}
