use crate::database::{
    model::booking::{BookingRow, BookingStateRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use kernel::model::booking::{
    event::{CreateBooking, UpdateBookingStatus},
    Booking, BookingStatus,
};
use kernel::model::id::{BookingId, ParkingLotId, UserId};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};
use std::str::FromStr;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // Admits a booking against the lot's remaining capacity.
    //
    // The whole admission runs in one SERIALIZABLE transaction so that two
    // concurrent admissions against the same lot cannot both observe stale
    // availability; one of them will be forced to retry by the database.
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        // Admission checks:
        // - the lot exists
        // - the lot is open
        // - active bookings (neither CANCELLED nor COMPLETED) have not
        //   used up total_slots
        {
            let lot: Option<(bool, i32)> = sqlx::query_as(
                r#"
                SELECT is_open, total_slots
                FROM parking_lots
                WHERE parking_lot_id = $1
                "#,
            )
            .bind(event.parking_lot_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let (is_open, total_slots) = match lot {
                None => {
                    return Err(AppError::EntityNotFound(format!(
                        "parking lot ({}) was not found",
                        event.parking_lot_id
                    )))
                }
                Some(lot) => lot,
            };

            if !is_open {
                return Err(AppError::UnprocessableEntity(format!(
                    "parking lot ({}) is currently closed",
                    event.parking_lot_id
                )));
            }

            let active_bookings: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM bookings
                WHERE parking_lot_id = $1
                  AND status NOT IN ('CANCELLED', 'COMPLETED')
                "#,
            )
            .bind(event.parking_lot_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if active_bookings >= i64::from(total_slots) {
                return Err(AppError::UnprocessableEntity(format!(
                    "no available slots in parking lot ({})",
                    event.parking_lot_id
                )));
            }
        }

        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO bookings
            (booking_id, user_id, parking_lot_id, owner_name, mobile_no,
             vehicle_no, vehicle_type, timing_slot, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(booking_id)
        .bind(event.booked_by)
        .bind(event.parking_lot_id)
        .bind(&event.owner_name)
        .bind(&event.mobile_no)
        .bind(&event.vehicle_no)
        .bind(&event.vehicle_type)
        .bind(&event.timing_slot)
        .bind(BookingStatus::Pending.as_ref())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no booking record has been created".into(),
            ));
        }

        // The booking insert and the counter bump commit or roll back
        // together; a failure here aborts the insert above as well.
        let res = sqlx::query(
            r#"
            UPDATE parking_lots
            SET booked_slots = booked_slots + 1
            WHERE parking_lot_id = $1
            "#,
        )
        .bind(event.parking_lot_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no parking lot capacity has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    async fn update_status(&self, event: UpdateBookingStatus) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        let row: Option<BookingStateRow> = sqlx::query_as(
            r#"
            SELECT booking_id, user_id, parking_lot_id, status
            FROM bookings
            WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(booking) = row else {
            return Err(AppError::EntityNotFound(format!(
                "booking ({}) was not found",
                event.booking_id
            )));
        };

        if booking.user_id != event.requested_user {
            return Err(AppError::ForbiddenOperation(
                "you can only update your own bookings".into(),
            ));
        }

        let current = BookingStatus::from_str(&booking.status).map_err(|_| {
            AppError::UnprocessableEntity(format!("unknown status: {}", booking.status))
        })?;

        if !current.can_transition_to(event.status) {
            return Err(AppError::UnprocessableEntity(format!(
                "invalid status transition from {} to {}",
                current, event.status
            )));
        }

        // Entering a terminal state releases the slot the booking held,
        // keeping booked_slots equal to the count of active bookings.
        // The transition check above guarantees the current state is
        // active, so the decrement happens at most once per booking.
        if event.status.is_terminal() {
            sqlx::query(
                r#"
                UPDATE parking_lots
                SET booked_slots = GREATEST(booked_slots - 1, 0)
                WHERE parking_lot_id = $1
                "#,
            )
            .bind(booking.parking_lot_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1
            WHERE booking_id = $2
            "#,
        )
        .bind(event.status.as_ref())
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no booking status has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.user_id,
                b.parking_lot_id,
                b.owner_name,
                b.mobile_no,
                b.vehicle_no,
                b.vehicle_type,
                b.timing_slot,
                b.status,
                b.created_at,
                p.name,
                p.address
            FROM bookings AS b
            LEFT JOIN parking_lots AS p ON b.parking_lot_id = p.parking_lot_id
            WHERE b.booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.user_id,
                b.parking_lot_id,
                b.owner_name,
                b.mobile_no,
                b.vehicle_no,
                b.vehicle_type,
                b.timing_slot,
                b.status,
                b.created_at,
                p.name,
                p.address
            FROM bookings AS b
            LEFT JOIN parking_lots AS p ON b.parking_lot_id = p.parking_lot_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_by_parking_lot_id(
        &self,
        parking_lot_id: ParkingLotId,
    ) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.user_id,
                b.parking_lot_id,
                b.owner_name,
                b.mobile_no,
                b.vehicle_no,
                b.vehicle_type,
                b.timing_slot,
                b.status,
                b.created_at,
                p.name,
                p.address
            FROM bookings AS b
            LEFT JOIN parking_lots AS p ON b.parking_lot_id = p.parking_lot_id
            WHERE b.parking_lot_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(parking_lot_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn count_active_by_parking_lot_id(
        &self,
        parking_lot_id: ParkingLotId,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE parking_lot_id = $1
              AND status NOT IN ('CANCELLED', 'COMPLETED')
            "#,
        )
        .bind(parking_lot_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }
}

impl BookingRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::parking_lot::ParkingLotRepositoryImpl;
    use kernel::model::parking_lot::event::DeleteParkingLot;
    use kernel::repository::parking_lot::ParkingLotRepository;

    fn user(raw: &str) -> UserId {
        UserId::from_str(raw).unwrap()
    }

    fn lot(raw: &str) -> ParkingLotId {
        ParkingLotId::from_str(raw).unwrap()
    }

    const USER_A: &str = "22222222-2222-2222-2222-222222222222";
    const USER_B: &str = "33333333-3333-3333-3333-333333333333";
    const USER_C: &str = "44444444-4444-4444-4444-444444444444";
    const LOT_OPEN: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
    const LOT_CLOSED: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";

    fn admission(lot_id: ParkingLotId, booked_by: UserId) -> CreateBooking {
        CreateBooking::new(
            lot_id,
            booked_by,
            "Test Owner".into(),
            "09012345678".into(),
            "ABC-1234".into(),
            "car".into(),
            "10:00-12:00".into(),
        )
    }

    async fn booked_slots(repo: &ParkingLotRepositoryImpl, lot_id: ParkingLotId) -> i32 {
        repo.find_by_id(lot_id).await.unwrap().unwrap().booked_slots
    }

    #[sqlx::test(fixtures("common"))]
    async fn admission_is_bounded_by_capacity(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);

        // capacity 2: two admissions succeed and bump the counter
        repo.create(admission(open, user(USER_A))).await.unwrap();
        assert_eq!(booked_slots(&lots, open).await, 1);
        repo.create(admission(open, user(USER_B))).await.unwrap();
        assert_eq!(booked_slots(&lots, open).await, 2);

        // the third admission is rejected and writes nothing
        let err = repo.create(admission(open, user(USER_C))).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert_eq!(booked_slots(&lots, open).await, 2);
        assert_eq!(repo.count_active_by_parking_lot_id(open).await.unwrap(), 2);
    }

    #[sqlx::test(fixtures("common"))]
    async fn closed_lot_rejects_admission(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let err = repo
            .create(admission(lot(LOT_CLOSED), user(USER_A)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[sqlx::test(fixtures("common"))]
    async fn unknown_lot_is_not_found(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));

        let err = repo
            .create(admission(ParkingLotId::new(), user(USER_A)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[sqlx::test(fixtures("common"))]
    async fn lifecycle_transitions_follow_the_state_machine(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);
        let owner = user(USER_A);

        let booking_id = repo.create(admission(open, owner)).await.unwrap();
        assert_eq!(booked_slots(&lots, open).await, 1);

        // PENDING -> COMPLETED has no edge
        let err = repo
            .update_status(UpdateBookingStatus::new(
                booking_id,
                owner,
                BookingStatus::Completed,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        // PENDING -> CONFIRMED
        repo.update_status(UpdateBookingStatus::new(
            booking_id,
            owner,
            BookingStatus::Confirmed,
        ))
        .await
        .unwrap();
        let booking = repo.find_by_id(booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        // CONFIRMED -> CANCELLED releases the slot exactly once
        repo.update_status(UpdateBookingStatus::new(
            booking_id,
            owner,
            BookingStatus::Cancelled,
        ))
        .await
        .unwrap();
        assert_eq!(booked_slots(&lots, open).await, 0);

        // CANCELLED is terminal
        let err = repo
            .update_status(UpdateBookingStatus::new(
                booking_id,
                owner,
                BookingStatus::Confirmed,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert_eq!(booked_slots(&lots, open).await, 0);
    }

    #[sqlx::test(fixtures("common"))]
    async fn only_the_owner_may_transition_a_booking(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);

        let booking_id = repo.create(admission(open, user(USER_A))).await.unwrap();

        let err = repo
            .update_status(UpdateBookingStatus::new(
                booking_id,
                user(USER_B),
                BookingStatus::Cancelled,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation(_)));

        // the booking and the lot counter are untouched
        let booking = repo.find_by_id(booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booked_slots(&lots, open).await, 1);
    }

    #[sqlx::test(fixtures("common"))]
    async fn cancellation_frees_capacity_for_new_admissions(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);

        let first = repo.create(admission(open, user(USER_A))).await.unwrap();
        repo.create(admission(open, user(USER_B))).await.unwrap();
        assert!(repo.create(admission(open, user(USER_C))).await.is_err());

        repo.update_status(UpdateBookingStatus::new(
            first,
            user(USER_A),
            BookingStatus::Cancelled,
        ))
        .await
        .unwrap();

        // the cancelled booking no longer counts against capacity
        repo.create(admission(open, user(USER_C))).await.unwrap();
        assert_eq!(repo.count_active_by_parking_lot_id(open).await.unwrap(), 2);
    }

    #[sqlx::test(fixtures("common"))]
    async fn completion_frees_capacity_like_cancellation(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);
        let owner = user(USER_A);

        let first = repo.create(admission(open, owner)).await.unwrap();
        repo.create(admission(open, user(USER_B))).await.unwrap();
        assert_eq!(booked_slots(&lots, open).await, 2);

        repo.update_status(UpdateBookingStatus::new(
            first,
            owner,
            BookingStatus::Confirmed,
        ))
        .await
        .unwrap();
        repo.update_status(UpdateBookingStatus::new(
            first,
            owner,
            BookingStatus::Completed,
        ))
        .await
        .unwrap();

        // the completed booking no longer holds a slot and the counter agrees
        assert_eq!(booked_slots(&lots, open).await, 1);
        assert_eq!(repo.count_active_by_parking_lot_id(open).await.unwrap(), 1);

        // the freed slot admits a new booking without tripping the
        // booked_slots <= total_slots constraint
        repo.create(admission(open, user(USER_C))).await.unwrap();
        assert_eq!(booked_slots(&lots, open).await, 2);
        assert_eq!(repo.count_active_by_parking_lot_id(open).await.unwrap(), 2);
    }

    #[sqlx::test(fixtures("common"))]
    async fn bookings_survive_lot_deletion(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);
        let owner = user(USER_A);

        let booking_id = repo.create(admission(open, owner)).await.unwrap();
        repo.update_status(UpdateBookingStatus::new(
            booking_id,
            owner,
            BookingStatus::Cancelled,
        ))
        .await
        .unwrap();
        lots.delete(DeleteParkingLot::new(open)).await.unwrap();

        // the historical booking is still listed, with empty lot details
        let bookings = repo.find_by_user_id(owner).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].status, BookingStatus::Cancelled);
        assert_eq!(bookings[0].parking_lot.parking_lot_id, open);
        assert_eq!(bookings[0].parking_lot.name, "");
        assert_eq!(bookings[0].parking_lot.address, "");

        let found = repo.find_by_id(booking_id).await.unwrap().unwrap();
        assert_eq!(found.parking_lot.name, "");
    }

    #[sqlx::test(fixtures("common"))]
    async fn bookings_are_listed_with_lot_details(pool: sqlx::PgPool) {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let open = lot(LOT_OPEN);

        repo.create(admission(open, user(USER_A))).await.unwrap();

        let bookings = repo.find_by_user_id(user(USER_A)).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].parking_lot.name, "Central Garage");
        assert_eq!(bookings[0].parking_lot.address, "1 Main Street");

        assert!(repo.find_by_user_id(user(USER_B)).await.unwrap().is_empty());
    }
}
