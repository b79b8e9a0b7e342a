use kernel::model::{
    booking::{Booking, BookingParkingLot, BookingStatus},
    id::{BookingId, ParkingLotId, UserId},
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};
use std::str::FromStr;

/// Booking record joined with its lot, used when listing bookings.
/// The lot's name and address are resolved at read time, never
/// stored redundantly on the booking itself. Bookings outlive their
/// lot, so the joined columns are nullable.
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub parking_lot_id: ParkingLotId,
    pub owner_name: String,
    pub mobile_no: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub timing_slot: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            booking_id,
            user_id,
            parking_lot_id,
            owner_name,
            mobile_no,
            vehicle_no,
            vehicle_type,
            timing_slot,
            status,
            created_at,
            name,
            address,
        } = value;
        let status = BookingStatus::from_str(&status)
            .map_err(|_| AppError::UnprocessableEntity(format!("unknown status: {status}")))?;
        Ok(Booking {
            booking_id,
            booked_by: user_id,
            owner_name,
            mobile_no,
            vehicle_no,
            vehicle_type,
            timing_slot,
            status,
            created_at,
            // a deleted lot leaves its display fields empty
            parking_lot: BookingParkingLot {
                parking_lot_id,
                name: name.unwrap_or_default(),
                address: address.unwrap_or_default(),
            },
        })
    }
}

/// Minimal projection used inside the transition transaction
/// to run ownership and state machine checks.
#[derive(sqlx::FromRow)]
pub struct BookingStateRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub parking_lot_id: ParkingLotId,
    pub status: String,
}
