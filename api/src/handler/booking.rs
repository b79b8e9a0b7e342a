use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use kernel::model::booking::event::UpdateBookingStatus;
use kernel::model::booking::BookingStatus;
use kernel::model::id::BookingId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::extractor::AuthorizedUser;
use crate::model::booking::{
    BookingResponse, BookingsResponse, CreateBookingRequest, CreateBookingRequestWithUserId,
    UpdateBookingStatusRequest,
};

pub async fn create_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    req.validate(&())?;

    let booking_id = registry
        .booking_repository()
        .create(CreateBookingRequestWithUserId::new(user.id(), req).into())
        .await?;
    let created = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("booking not found".into()))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn show_user_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn update_booking_status(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<BookingResponse>> {
    req.validate(&())?;

    let status = BookingStatus::from_str(req.status.trim())
        .map_err(|_| AppError::UnprocessableEntity(format!("unknown status: {}", req.status)))?;

    registry
        .booking_repository()
        .update_status(UpdateBookingStatus::new(booking_id, user.id(), status))
        .await?;

    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("booking not found".into()))
        .map(BookingResponse::from)
        .map(Json)
}
