use derive_new::new;
use garde::Validate;
use kernel::model::id::ParkingLotId;
use kernel::model::parking_lot::event::{CreateParkingLot, UpdateParkingLot};
use kernel::model::parking_lot::{ParkingLot, ParkingLotSummary};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateParkingLotRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(length(min = 1))]
    pub address: String,
    #[garde(range(min = 1))]
    pub total_slots: i32,
    #[garde(skip)]
    pub is_open: bool,
}

impl From<CreateParkingLotRequest> for CreateParkingLot {
    fn from(value: CreateParkingLotRequest) -> Self {
        let CreateParkingLotRequest {
            name,
            address,
            total_slots,
            is_open,
        } = value;
        CreateParkingLot {
            name,
            address,
            total_slots,
            is_open,
        }
    }
}

/// Absent fields keep their current value.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParkingLotRequest {
    #[garde(inner(length(min = 1)))]
    pub name: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub address: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub total_slots: Option<i32>,
    #[garde(skip)]
    pub is_open: Option<bool>,
}

#[derive(new)]
pub struct UpdateParkingLotRequestWithId(ParkingLotId, UpdateParkingLotRequest);

impl From<UpdateParkingLotRequestWithId> for UpdateParkingLot {
    fn from(value: UpdateParkingLotRequestWithId) -> Self {
        let UpdateParkingLotRequestWithId(
            parking_lot_id,
            UpdateParkingLotRequest {
                name,
                address,
                total_slots,
                is_open,
            },
        ) = value;
        UpdateParkingLot {
            parking_lot_id,
            name,
            address,
            total_slots,
            is_open,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotIdsRequest {
    #[garde(length(min = 1))]
    pub parking_lot_ids: Vec<ParkingLotId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotResponse {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
    pub total_slots: i32,
    pub booked_slots: i32,
    pub available_slots: i32,
    pub is_open: bool,
}

impl From<ParkingLot> for ParkingLotResponse {
    fn from(value: ParkingLot) -> Self {
        let available_slots = value.available_slots();
        let ParkingLot {
            parking_lot_id,
            name,
            address,
            total_slots,
            booked_slots,
            is_open,
            ..
        } = value;
        Self {
            parking_lot_id,
            name,
            address,
            total_slots,
            booked_slots,
            available_slots,
            is_open,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotsResponse {
    pub items: Vec<ParkingLotResponse>,
}

impl From<Vec<ParkingLot>> for ParkingLotsResponse {
    fn from(value: Vec<ParkingLot>) -> Self {
        Self {
            items: value.into_iter().map(ParkingLotResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotSummaryResponse {
    pub parking_lot_id: ParkingLotId,
    pub name: String,
    pub address: String,
}

impl From<ParkingLotSummary> for ParkingLotSummaryResponse {
    fn from(value: ParkingLotSummary) -> Self {
        let ParkingLotSummary {
            parking_lot_id,
            name,
            address,
        } = value;
        Self {
            parking_lot_id,
            name,
            address,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotSummariesResponse {
    pub items: Vec<ParkingLotSummaryResponse>,
}

impl From<Vec<ParkingLotSummary>> for ParkingLotSummariesResponse {
    fn from(value: Vec<ParkingLotSummary>) -> Self {
        Self {
            items: value
                .into_iter()
                .map(ParkingLotSummaryResponse::from)
                .collect(),
        }
    }
}
