use crate::model::{
    booking::{
        event::{CreateBooking, UpdateBookingStatus},
        Booking,
    },
    id::{BookingId, ParkingLotId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Admits a new booking against the lot's free capacity.
    /// The booking starts out PENDING and occupies one slot.
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    /// Moves a booking along its lifecycle; a transition into a
    /// terminal state releases the slot it held.
    async fn update_status(&self, event: UpdateBookingStatus) -> AppResult<()>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
    async fn find_by_parking_lot_id(
        &self,
        parking_lot_id: ParkingLotId,
    ) -> AppResult<Vec<Booking>>;
    /// Count of bookings currently holding a slot at the lot,
    /// i.e. those neither CANCELLED nor COMPLETED.
    async fn count_active_by_parking_lot_id(
        &self,
        parking_lot_id: ParkingLotId,
    ) -> AppResult<i64>;
}
