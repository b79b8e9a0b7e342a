use kernel::model::{id::UserId, role::Role, user::User};
use shared::error::AppError;
use std::str::FromStr;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_no: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            first_name,
            last_name,
            email,
            mobile_no,
            role,
        } = value;
        let role = Role::from_str(&role)
            .map_err(|_| AppError::UnprocessableEntity(format!("unknown role: {role}")))?;
        Ok(User {
            user_id,
            first_name,
            last_name,
            email,
            mobile_no,
            role,
        })
    }
}

/// Row used only while verifying credentials.
#[derive(sqlx::FromRow)]
pub struct UserCredentialRow {
    pub user_id: UserId,
    pub password_hash: String,
}
