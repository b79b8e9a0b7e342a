use crate::model::id::ParkingLotId;

pub mod event;

#[derive(Debug)]
pub struct ParkingLot {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
    pub total_slots: i32,
    pub booked_slots: i32,
    pub is_open: bool,
}

impl ParkingLot {
    pub fn available_slots(&self) -> i32 {
        self.total_slots - self.booked_slots
    }
}

/// Trimmed view used when resolving many lots at once.
#[derive(Debug)]
pub struct ParkingLotSummary {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
}
