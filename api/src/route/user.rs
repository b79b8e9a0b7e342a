use axum::routing::{get, put};
use axum::Router;
use registry::AppRegistry;

use crate::handler::user::{get_current_user, update_user_role};

pub fn build_user_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/me", get(get_current_user))
        .route("/:user_id/role", put(update_user_role));

    Router::new().nest("/users", routers)
}
