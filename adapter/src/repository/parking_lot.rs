use crate::database::{
    model::parking_lot::{ParkingLotRow, ParkingLotSummaryRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::ParkingLotId;
use kernel::model::parking_lot::{
    event::{CreateParkingLot, DeleteParkingLot, UpdateParkingLot},
    ParkingLot, ParkingLotSummary,
};
use kernel::repository::parking_lot::ParkingLotRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct ParkingLotRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ParkingLotRepository for ParkingLotRepositoryImpl {
    async fn create(&self, event: CreateParkingLot) -> AppResult<ParkingLotId> {
        if self.find_by_name(&event.name).await?.is_some() {
            return Err(AppError::UnprocessableEntity(format!(
                "parking lot with name '{}' already exists",
                event.name
            )));
        }

        let parking_lot_id = ParkingLotId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO parking_lots
            (parking_lot_id, name, address, total_slots, booked_slots, is_open)
            VALUES ($1, $2, $3, $4, 0, $5)
            "#,
        )
        .bind(parking_lot_id)
        .bind(&event.name)
        .bind(&event.address)
        .bind(event.total_slots)
        .bind(event.is_open)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no parking lot record has been created".into(),
            ));
        }

        Ok(parking_lot_id)
    }

    async fn find_all(&self) -> AppResult<Vec<ParkingLot>> {
        let rows: Vec<ParkingLotRow> = sqlx::query_as(
            r#"
            SELECT parking_lot_id, name, address, total_slots, booked_slots, is_open
            FROM parking_lots
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(ParkingLot::from).collect())
    }

    async fn find_by_id(&self, parking_lot_id: ParkingLotId) -> AppResult<Option<ParkingLot>> {
        let row: Option<ParkingLotRow> = sqlx::query_as(
            r#"
            SELECT parking_lot_id, name, address, total_slots, booked_slots, is_open
            FROM parking_lots
            WHERE parking_lot_id = $1
            "#,
        )
        .bind(parking_lot_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ParkingLot::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<ParkingLot>> {
        let row: Option<ParkingLotRow> = sqlx::query_as(
            r#"
            SELECT parking_lot_id, name, address, total_slots, booked_slots, is_open
            FROM parking_lots
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ParkingLot::from))
    }

    async fn find_all_by_ids(&self, ids: &[ParkingLotId]) -> AppResult<Vec<ParkingLotSummary>> {
        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.raw()).collect();
        let rows: Vec<ParkingLotSummaryRow> = sqlx::query_as(
            r#"
            SELECT parking_lot_id, name, address
            FROM parking_lots
            WHERE parking_lot_id = ANY($1)
            "#,
        )
        .bind(&raw_ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(ParkingLotSummary::from).collect())
    }

    // The shrink guard reads booked_slots before writing total_slots;
    // SERIALIZABLE keeps a concurrent admission from slipping between
    // the two.
    async fn update(&self, event: UpdateParkingLot) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        let current: Option<ParkingLotRow> = sqlx::query_as(
            r#"
            SELECT parking_lot_id, name, address, total_slots, booked_slots, is_open
            FROM parking_lots
            WHERE parking_lot_id = $1
            "#,
        )
        .bind(event.parking_lot_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(current) = current else {
            return Err(AppError::EntityNotFound(format!(
                "parking lot ({}) was not found",
                event.parking_lot_id
            )));
        };

        // name uniqueness is re-checked excluding the lot itself
        if let Some(name) = &event.name {
            let duplicate: Option<(ParkingLotId,)> = sqlx::query_as(
                r#"
                SELECT parking_lot_id
                FROM parking_lots
                WHERE name = $1 AND parking_lot_id <> $2
                "#,
            )
            .bind(name)
            .bind(event.parking_lot_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if duplicate.is_some() {
                return Err(AppError::UnprocessableEntity(format!(
                    "parking lot with name '{name}' already exists"
                )));
            }
        }

        // shrinking below the occupied count would break the
        // capacity invariant
        if let Some(total_slots) = event.total_slots {
            if total_slots < current.booked_slots {
                return Err(AppError::UnprocessableEntity(format!(
                    "total slots cannot be less than currently booked slots ({})",
                    current.booked_slots
                )));
            }
        }

        let res = sqlx::query(
            r#"
            UPDATE parking_lots
            SET name = $1, address = $2, total_slots = $3, is_open = $4
            WHERE parking_lot_id = $5
            "#,
        )
        .bind(event.name.unwrap_or(current.name))
        .bind(event.address.unwrap_or(current.address))
        .bind(event.total_slots.unwrap_or(current.total_slots))
        .bind(event.is_open.unwrap_or(current.is_open))
        .bind(event.parking_lot_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no parking lot record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn delete(&self, event: DeleteParkingLot) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        let exists: Option<(ParkingLotId,)> = sqlx::query_as(
            r#"
            SELECT parking_lot_id
            FROM parking_lots
            WHERE parking_lot_id = $1
            "#,
        )
        .bind(event.parking_lot_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if exists.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "parking lot ({}) was not found",
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

        if active_bookings > 0 {
            return Err(AppError::ConflictError(format!(
                "cannot delete parking lot with active bookings; there are {active_bookings} active bookings"
            )));
        }

        // historical bookings stay behind as orphans on purpose
        let res = sqlx::query(
            r#"
            DELETE FROM parking_lots
            WHERE parking_lot_id = $1
            "#,
        )
        .bind(event.parking_lot_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no parking lot record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl ParkingLotRepositoryImpl {
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
    use crate::repository::booking::BookingRepositoryImpl;
    use kernel::model::booking::event::{CreateBooking, UpdateBookingStatus};
    use kernel::model::booking::BookingStatus;
    use kernel::model::id::UserId;
    use kernel::repository::booking::BookingRepository;
    use std::str::FromStr;

    const USER_A: &str = "22222222-2222-2222-2222-222222222222";
    const LOT_OPEN: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
    const LOT_CLOSED: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";

    fn register_lot(name: &str, total_slots: i32) -> CreateParkingLot {
        CreateParkingLot::new(name.into(), "2 Side Street".into(), total_slots, true)
    }

    #[sqlx::test(fixtures("common"))]
    async fn create_rejects_duplicate_names(pool: sqlx::PgPool) {
        let repo = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));

        let id = repo.create(register_lot("North Lot", 10)).await.unwrap();
        let created = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(created.name, "North Lot");
        assert_eq!(created.booked_slots, 0);
        assert_eq!(created.available_slots(), 10);

        let err = repo.create(register_lot("North Lot", 5)).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[sqlx::test(fixtures("common"))]
    async fn update_applies_only_supplied_fields(pool: sqlx::PgPool) {
        let repo = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let lot_id = ParkingLotId::from_str(LOT_OPEN).unwrap();

        repo.update(UpdateParkingLot::new(
            lot_id,
            None,
            None,
            Some(5),
            Some(false),
        ))
        .await
        .unwrap();

        let lot = repo.find_by_id(lot_id).await.unwrap().unwrap();
        assert_eq!(lot.name, "Central Garage");
        assert_eq!(lot.address, "1 Main Street");
        assert_eq!(lot.total_slots, 5);
        assert!(!lot.is_open);
    }

    #[sqlx::test(fixtures("common"))]
    async fn update_rejects_name_already_taken_by_another_lot(pool: sqlx::PgPool) {
        let repo = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let lot_id = ParkingLotId::from_str(LOT_OPEN).unwrap();

        // renaming to the lot's own name stays legal
        repo.update(UpdateParkingLot::new(
            lot_id,
            Some("Central Garage".into()),
            None,
            None,
            None,
        ))
        .await
        .unwrap();

        let err = repo
            .update(UpdateParkingLot::new(
                lot_id,
                Some("Harbor Lot".into()),
                None,
                None,
                None,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[sqlx::test(fixtures("common"))]
    async fn update_cannot_shrink_capacity_below_booked_slots(pool: sqlx::PgPool) {
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let bookings = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let lot_id = ParkingLotId::from_str(LOT_OPEN).unwrap();
        let owner = UserId::from_str(USER_A).unwrap();

        bookings
            .create(CreateBooking::new(
                lot_id,
                owner,
                "Test Owner".into(),
                "09012345678".into(),
                "ABC-1234".into(),
                "car".into(),
                "10:00-12:00".into(),
            ))
            .await
            .unwrap();

        let err = lots
            .update(UpdateParkingLot::new(lot_id, None, None, Some(0), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[sqlx::test(fixtures("common"))]
    async fn delete_is_blocked_by_active_bookings(pool: sqlx::PgPool) {
        let lots = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let bookings = BookingRepositoryImpl::new(ConnectionPool::new(pool));
        let lot_id = ParkingLotId::from_str(LOT_OPEN).unwrap();
        let owner = UserId::from_str(USER_A).unwrap();

        let booking_id = bookings
            .create(CreateBooking::new(
                lot_id,
                owner,
                "Test Owner".into(),
                "09012345678".into(),
                "ABC-1234".into(),
                "car".into(),
                "10:00-12:00".into(),
            ))
            .await
            .unwrap();
        bookings
            .update_status(UpdateBookingStatus::new(
                booking_id,
                owner,
                BookingStatus::Confirmed,
            ))
            .await
            .unwrap();

        let err = lots
            .delete(DeleteParkingLot::new(lot_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConflictError(_)));

        // once the booking reaches a terminal state the lot can go
        bookings
            .update_status(UpdateBookingStatus::new(
                booking_id,
                owner,
                BookingStatus::Cancelled,
            ))
            .await
            .unwrap();
        lots.delete(DeleteParkingLot::new(lot_id)).await.unwrap();
        assert!(lots.find_by_id(lot_id).await.unwrap().is_none());
    }

    #[sqlx::test(fixtures("common"))]
    async fn find_all_by_ids_returns_summaries(pool: sqlx::PgPool) {
        let repo = ParkingLotRepositoryImpl::new(ConnectionPool::new(pool));
        let open = ParkingLotId::from_str(LOT_OPEN).unwrap();
        let closed = ParkingLotId::from_str(LOT_CLOSED).unwrap();

        let summaries = repo
            .find_all_by_ids(&[open, closed, ParkingLotId::new()])
            .await
            .unwrap();
        assert_eq!(summaries.len(), 2);
    }
}
