use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use kernel::model::id::ParkingLotId;
use kernel::model::parking_lot::event::DeleteParkingLot;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::extractor::AuthorizedUser;
use crate::model::booking::BookingsResponse;
use crate::model::parking_lot::{
    CreateParkingLotRequest, ParkingLotIdsRequest, ParkingLotResponse, ParkingLotsResponse,
    ParkingLotSummariesResponse, UpdateParkingLotRequest, UpdateParkingLotRequestWithId,
};

pub async fn register_parking_lot(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateParkingLotRequest>,
) -> AppResult<(StatusCode, Json<ParkingLotResponse>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "only admin users can create parking lots".into(),
        ));
    }
    req.validate(&())?;

    let parking_lot_id = registry.parking_lot_repository().create(req.into()).await?;
    let created = registry
        .parking_lot_repository()
        .find_by_id(parking_lot_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("parking lot not found".into()))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn show_parking_lot_list(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ParkingLotsResponse>> {
    registry
        .parking_lot_repository()
        .find_all()
        .await
        .map(ParkingLotsResponse::from)
        .map(Json)
}

pub async fn show_parking_lot(
    _user: AuthorizedUser,
    Path(parking_lot_id): Path<ParkingLotId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ParkingLotResponse>> {
    registry
        .parking_lot_repository()
        .find_by_id(parking_lot_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("parking lot not found".into()))
        .map(ParkingLotResponse::from)
        .map(Json)
}

pub async fn show_parking_lots_by_ids(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<ParkingLotIdsRequest>,
) -> AppResult<Json<ParkingLotSummariesResponse>> {
    req.validate(&())?;

    registry
        .parking_lot_repository()
        .find_all_by_ids(&req.parking_lot_ids)
        .await
        .map(ParkingLotSummariesResponse::from)
        .map(Json)
}

pub async fn update_parking_lot(
    user: AuthorizedUser,
    Path(parking_lot_id): Path<ParkingLotId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateParkingLotRequest>,
) -> AppResult<Json<ParkingLotResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "only admin users can update parking lots".into(),
        ));
    }
    req.validate(&())?;

    registry
        .parking_lot_repository()
        .update(UpdateParkingLotRequestWithId::new(parking_lot_id, req).into())
        .await?;

    registry
        .parking_lot_repository()
        .find_by_id(parking_lot_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("parking lot not found".into()))
        .map(ParkingLotResponse::from)
        .map(Json)
}

pub async fn delete_parking_lot(
    user: AuthorizedUser,
    Path(parking_lot_id): Path<ParkingLotId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "only admin users can delete parking lots".into(),
        ));
    }

    registry
        .parking_lot_repository()
        .delete(DeleteParkingLot { parking_lot_id })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn show_parking_lot_bookings(
    user: AuthorizedUser,
    Path(parking_lot_id): Path<ParkingLotId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "only admin users can list bookings for a lot".into(),
        ));
    }

    registry
        .parking_lot_repository()
        .find_by_id(parking_lot_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("parking lot not found".into()))?;

    registry
        .booking_repository()
        .find_by_parking_lot_id(parking_lot_id)
        .await
        .map(BookingsResponse::from)
        .map(Json)
}
