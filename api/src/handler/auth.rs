use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::auth::event::CreateToken;
use kernel::model::role::Role;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::extractor::AuthorizedUser;
use crate::model::auth::{
    AccessTokenResponse, LoginRequest, RegisterUserRequest, RegisterUserRequestWithRole,
};
use crate::model::user::UserResponse;

pub async fn register_user(
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<AccessTokenResponse>)> {
    req.validate(&())?;

    if registry.user_repository().exists_by_email(&req.email).await? {
        return Err(AppError::ConflictError(
            "email is already registered".into(),
        ));
    }

    let user = registry
        .user_repository()
        .create(RegisterUserRequestWithRole::new(Role::User, req).into())
        .await?;
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessTokenResponse {
            user_id: user.user_id,
            access_token: access_token.0,
        }),
    ))
}

pub async fn login(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    req.validate(&())?;

    let user_id = registry
        .auth_repository()
        .verify_user(&req.email, &req.password)
        .await?;
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user_id))
        .await?;

    Ok(Json(AccessTokenResponse {
        user_id,
        access_token: access_token.0,
    }))
}

pub async fn logout(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .auth_repository()
        .delete_token(&user.access_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn register_admin(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation(
            "only admin users can register admin accounts".into(),
        ));
    }
    req.validate(&())?;

    if registry.user_repository().exists_by_email(&req.email).await? {
        return Err(AppError::ConflictError(
            "email is already registered".into(),
        ));
    }

    let created = registry
        .user_repository()
        .create(RegisterUserRequestWithRole::new(Role::Admin, req).into())
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn login_admin(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    req.validate(&())?;

    let user_id = registry
        .auth_repository()
        .verify_user(&req.email, &req.password)
        .await?;
    let user = registry
        .user_repository()
        .find_current_user(user_id)
        .await?
        .ok_or(AppError::UnauthenticatedError)?;
    if user.role != Role::Admin {
        return Err(AppError::ForbiddenOperation(
            "admin privileges required".into(),
        ));
    }

    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user_id))
        .await?;

    Ok(Json(AccessTokenResponse {
        user_id,
        access_token: access_token.0,
    }))
}
