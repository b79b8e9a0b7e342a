pub mod auth;
pub mod booking;
pub mod health;
pub mod parking_lot;
pub mod user;
pub mod v1;
