use derive_new::new;
use garde::Validate;
use kernel::model::id::UserId;
use kernel::model::role::Role;
use kernel::model::user::event::CreateUser;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[garde(length(min = 1))]
    pub first_name: String,
    #[garde(length(min = 1))]
    pub last_name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub mobile_no: String,
    #[garde(length(min = 8))]
    pub password: String,
}

#[derive(new)]
pub struct RegisterUserRequestWithRole(Role, RegisterUserRequest);

impl From<RegisterUserRequestWithRole> for CreateUser {
    fn from(value: RegisterUserRequestWithRole) -> Self {
        let RegisterUserRequestWithRole(
            role,
            RegisterUserRequest {
                first_name,
                last_name,
                email,
                mobile_no,
                password,
            },
        ) = value;
        CreateUser {
            first_name,
            last_name,
            email,
            mobile_no,
            password,
            role,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub user_id: UserId,
    pub access_token: String,
}
