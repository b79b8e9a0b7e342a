pub mod auth;
pub mod booking;
pub mod id;
pub mod parking_lot;
pub mod role;
pub mod user;
