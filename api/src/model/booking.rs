use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::booking::event::CreateBooking;
use kernel::model::booking::{Booking, BookingParkingLot};
use kernel::model::id::{BookingId, ParkingLotId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub parking_lot_id: ParkingLotId,
    #[garde(length(min = 1))]
    pub owner_name: String,
    #[garde(length(min = 1))]
    pub mobile_no: String,
    #[garde(length(min = 1))]
    pub vehicle_no: String,
    #[garde(length(min = 1))]
    pub vehicle_type: String,
    #[garde(length(min = 1))]
    pub timing_slot: String,
}

#[derive(new)]
pub struct CreateBookingRequestWithUserId(UserId, CreateBookingRequest);

impl From<CreateBookingRequestWithUserId> for CreateBooking {
    fn from(value: CreateBookingRequestWithUserId) -> Self {
        let CreateBookingRequestWithUserId(
            booked_by,
            CreateBookingRequest {
                parking_lot_id,
                owner_name,
                mobile_no,
                vehicle_no,
                vehicle_type,
                timing_slot,
            },
        ) = value;
        CreateBooking {
            parking_lot_id,
            booked_by,
            owner_name,
            mobile_no,
            vehicle_no,
            vehicle_type,
            timing_slot,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    #[garde(length(min = 1))]
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub parking_lot_id: ParkingLotId,
    pub parking_lot_name: String,
    pub parking_lot_address: String,
    pub owner_name: String,
    pub mobile_no: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub timing_slot: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            booked_by,
            owner_name,
            mobile_no,
            vehicle_no,
            vehicle_type,
            timing_slot,
            status,
            created_at,
            parking_lot:
                BookingParkingLot {
                    parking_lot_id,
                    name,
                    address,
                },
        } = value;
        Self {
            booking_id,
            user_id: booked_by,
            parking_lot_id,
            parking_lot_name: name,
            parking_lot_address: address,
            owner_name,
            mobile_no,
            vehicle_no,
            vehicle_type,
            timing_slot,
            status: status.to_string(),
            created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::booking::BookingStatus;

    #[test]
    fn booking_response_flattens_lot_and_upper_cases_status() {
        let booking = Booking {
            booking_id: BookingId::new(),
            booked_by: UserId::new(),
            owner_name: "Alice".into(),
            mobile_no: "0901234567".into(),
            vehicle_no: "ABC-123".into(),
            vehicle_type: "CAR".into(),
            timing_slot: "09:00-12:00".into(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
            parking_lot: BookingParkingLot {
                parking_lot_id: ParkingLotId::new(),
                name: "Central Garage".into(),
                address: "1 Main Street".into(),
            },
        };
        let res = BookingResponse::from(booking);
        assert_eq!(res.parking_lot_name, "Central Garage");
        assert_eq!(res.status, "PENDING");
    }
}
