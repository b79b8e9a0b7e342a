use crate::model::id::ParkingLotId;
use derive_new::new;

#[derive(new)]
pub struct CreateParkingLot {
    pub name: String,
    pub address: String,
    pub total_slots: i32,
    pub is_open: bool,
}

/// Partial update. A `None` field means "leave as is";
/// presence is carried by the variant, never by a sentinel value.
#[derive(Debug, new)]
pub struct UpdateParkingLot {
    pub parking_lot_id: ParkingLotId,
    pub name: Option<String>,
    pub address: Option<String>,
    pub total_slots: Option<i32>,
    pub is_open: Option<bool>,
}

#[derive(Debug, new)]
pub struct DeleteParkingLot {
    pub parking_lot_id: ParkingLotId,
}
