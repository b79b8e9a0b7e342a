pub mod booking;
pub mod parking_lot;
pub mod user;
