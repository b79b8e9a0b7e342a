use crate::model::booking::BookingStatus;
use crate::model::id::{BookingId, ParkingLotId, UserId};
use derive_new::new;

#[derive(new)]
pub struct CreateBooking {
    pub parking_lot_id: ParkingLotId,
    pub booked_by: UserId,
    pub owner_name: String,
    pub mobile_no: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub timing_slot: String,
}

#[derive(new)]
pub struct UpdateBookingStatus {
    pub booking_id: BookingId,
    pub requested_user: UserId,
    pub status: BookingStatus,
}
