use crate::database::{model::user::UserCredentialRow, ConnectionPool};
use crate::redis::{
    model::{AuthorizationKey, AuthorizedUserId},
    RedisClient,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
    ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        let key: AuthorizationKey = access_token.into();
        self.kv
            .get(&key)
            .await
            .map(|x| x.map(AuthorizedUserId::into_inner))
    }

    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let row: Option<UserCredentialRow> = sqlx::query_as(
            r#"
            SELECT user_id, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(AppError::UnauthenticatedError);
        };

        let valid = bcrypt::verify(password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(row.user_id)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        let access_token = AccessToken(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ));
        let key: AuthorizationKey = (&access_token).into();
        self.kv
            .set_ex(&key, &AuthorizedUserId::new(event.user_id), self.ttl)
            .await?;
        Ok(access_token)
    }

    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()> {
        let key: AuthorizationKey = access_token.into();
        self.kv.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;
    use kernel::model::user::event::CreateUser;
    use kernel::repository::user::UserRepository;
    use shared::config::RedisConfig;

    fn repo_with(pool: sqlx::PgPool) -> AuthRepositoryImpl {
        // the client connects lazily, so credential checks work
        // without a reachable Redis
        let kv = Arc::new(
            RedisClient::new(&RedisConfig {
                host: "localhost".into(),
                port: 6379,
            })
            .unwrap(),
        );
        AuthRepositoryImpl::new(ConnectionPool::new(pool), kv, 60)
    }

    #[sqlx::test]
    async fn verify_user_checks_the_password(pool: sqlx::PgPool) {
        let users = crate::repository::user::UserRepositoryImpl::new(ConnectionPool::new(
            pool.clone(),
        ));
        let created = users
            .create(CreateUser::new(
                "Test".into(),
                "User".into(),
                "login@example.com".into(),
                "09012345678".into(),
                "correct horse".into(),
                Role::User,
            ))
            .await
            .unwrap();

        let auth = repo_with(pool);

        let user_id = auth
            .verify_user("login@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(user_id, created.user_id);

        let err = auth
            .verify_user("login@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnauthenticatedError));

        let err = auth
            .verify_user("stranger@example.com", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnauthenticatedError));
    }
}
