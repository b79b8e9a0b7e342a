use axum::routing::{delete, get, post, put};
use axum::Router;
use registry::AppRegistry;

use crate::handler::parking_lot::{
    delete_parking_lot, register_parking_lot, show_parking_lot, show_parking_lot_bookings,
    show_parking_lot_list, show_parking_lots_by_ids, update_parking_lot,
};

pub fn build_parking_lot_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", get(show_parking_lot_list))
        .route("/", post(register_parking_lot))
        .route("/batch", post(show_parking_lots_by_ids))
        .route("/:parking_lot_id", get(show_parking_lot))
        .route("/:parking_lot_id", put(update_parking_lot))
        .route("/:parking_lot_id", delete(delete_parking_lot))
        .route("/:parking_lot_id/bookings", get(show_parking_lot_bookings));

    Router::new().nest("/parking-lots", routers)
}
