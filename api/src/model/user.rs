use derive_new::new;
use garde::Validate;
use kernel::model::id::UserId;
use kernel::model::role::Role;
use kernel::model::user::event::UpdateUserRole;
use kernel::model::user::User;
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Admin,
    User,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Admin => Self::Admin,
            RoleName::User => Self::User,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_no: String,
    pub role: RoleName,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            first_name,
            last_name,
            email,
            mobile_no,
            role,
        } = value;
        Self {
            user_id,
            first_name,
            last_name,
            email,
            mobile_no,
            role: role.into(),
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleRequest {
    #[garde(skip)]
    pub role: RoleName,
}

#[derive(new)]
pub struct UpdateUserRoleRequestWithUserId(UserId, UpdateUserRoleRequest);

impl From<UpdateUserRoleRequestWithUserId> for UpdateUserRole {
    fn from(value: UpdateUserRoleRequestWithUserId) -> Self {
        let UpdateUserRoleRequestWithUserId(user_id, UpdateUserRoleRequest { role }) = value;
        UpdateUserRole {
            user_id,
            role: role.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_name_round_trips_through_kernel_role() {
        assert_eq!(RoleName::from(Role::Admin), RoleName::Admin);
        assert_eq!(Role::from(RoleName::User), Role::User);
    }

    #[test]
    fn role_name_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&RoleName::Admin).unwrap();
        assert_eq!(json, r#""ADMIN""#);
    }
}
