use axum::{routing::post, Router};
use registry::AppRegistry;

use crate::handler::auth::{login, login_admin, logout, register_admin, register_user};

pub fn routes() -> Router<AppRegistry> {
    let auth_routers = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/admin/register", post(register_admin))
        .route("/admin/login", post(login_admin));

    Router::new().nest("/auth", auth_routers)
}
