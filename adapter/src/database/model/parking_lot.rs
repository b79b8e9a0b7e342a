use kernel::model::{
    id::ParkingLotId,
    parking_lot::{ParkingLot, ParkingLotSummary},
};

#[derive(sqlx::FromRow)]
pub struct ParkingLotRow {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
    pub total_slots: i32,
    pub booked_slots: i32,
    pub is_open: bool,
}

impl From<ParkingLotRow> for ParkingLot {
    fn from(value: ParkingLotRow) -> Self {
        let ParkingLotRow {
            parking_lot_id,
            name,
            address,
            total_slots,
            booked_slots,
            is_open,
        } = value;
        ParkingLot {
            parking_lot_id,
            name,
            address,
            total_slots,
            booked_slots,
            is_open,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ParkingLotSummaryRow {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
}

impl From<ParkingLotSummaryRow> for ParkingLotSummary {
    fn from(value: ParkingLotSummaryRow) -> Self {
        let ParkingLotSummaryRow {
            parking_lot_id,
            name,
            address,
        } = value;
        ParkingLotSummary {
            parking_lot_id,
            name,
            address,
        }
    }
}
