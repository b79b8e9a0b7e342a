use crate::database::{model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::UserId;
use kernel::model::user::{
    event::{CreateUser, UpdateUserRole},
    User,
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let hashed_password = bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?;

        let res = sqlx::query(
            r#"
            INSERT INTO users
            (user_id, first_name, last_name, email, mobile_no, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(&event.first_name)
        .bind(&event.last_name)
        .bind(&event.email)
        .bind(&event.mobile_no)
        .bind(&hashed_password)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no user record has been created".into(),
            ));
        }

        Ok(User {
            user_id,
            first_name: event.first_name,
            last_name: event.last_name,
            email: event.email,
            mobile_no: event.mobile_no,
            role: event.role,
        })
    }

    async fn find_current_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT user_id, first_name, last_name, email, mobile_no, role
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT user_id, first_name, last_name, email, mobile_no, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE users
            SET role = $1
            WHERE user_id = $2
            "#,
        )
        .bind(event.role.as_ref())
        .bind(event.user_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "specified user not found".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    fn register(email: &str, role: Role) -> CreateUser {
        CreateUser::new(
            "Test".into(),
            "User".into(),
            email.into(),
            "09012345678".into(),
            "hunter2hunter2".into(),
            role,
        )
    }

    #[sqlx::test]
    async fn create_and_look_up_user(pool: sqlx::PgPool) {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let created = repo
            .create(register("driver@example.com", Role::User))
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);

        let found = repo
            .find_by_email("driver@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);

        let current = repo
            .find_current_user(created.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.email, "driver@example.com");

        assert!(repo.exists_by_email("driver@example.com").await.unwrap());
        assert!(!repo.exists_by_email("nobody@example.com").await.unwrap());
    }

    #[sqlx::test]
    async fn role_can_be_promoted(pool: sqlx::PgPool) {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let created = repo
            .create(register("promoted@example.com", Role::User))
            .await
            .unwrap();

        repo.update_role(UpdateUserRole::new(created.user_id, Role::Admin))
            .await
            .unwrap();

        let current = repo
            .find_current_user(created.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.role, Role::Admin);

        let err = repo
            .update_role(UpdateUserRole::new(UserId::new(), Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }
}
