use crate::model::{
    id::ParkingLotId,
    parking_lot::{
        event::{CreateParkingLot, DeleteParkingLot, UpdateParkingLot},
        ParkingLot, ParkingLotSummary,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait ParkingLotRepository: Send + Sync {
    async fn create(&self, event: CreateParkingLot) -> AppResult<ParkingLotId>;
    async fn find_all(&self) -> AppResult<Vec<ParkingLot>>;
    async fn find_by_id(&self, parking_lot_id: ParkingLotId) -> AppResult<Option<ParkingLot>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<ParkingLot>>;
    async fn find_all_by_ids(&self, ids: &[ParkingLotId]) -> AppResult<Vec<ParkingLotSummary>>;
    async fn update(&self, event: UpdateParkingLot) -> AppResult<()>;
    /// Removes the lot. Fails while any booking at the lot is still active;
    /// historical bookings are left in place.
    async fn delete(&self, event: DeleteParkingLot) -> AppResult<()>;
}
