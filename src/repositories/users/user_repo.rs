//! 사용자 저장소
//!
//! [`UserStore`]는 서비스 계층이 의존하는 추상화이고, [`UserRepository`]는
//! MongoDB `users` 컬렉션 위의 구현입니다. 이 계층은 캐시를 직접 다루지 않으며,
//! 프로필 캐싱은 서비스 계층의 cache-aside 조회가 담당합니다.

use std::sync::Arc;
use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    IndexModel,
};
use singleton_macro::repository;
use crate::core::registry::Repository;
use crate::db::Database;
use crate::domain::entities::users::user::User;
use crate::errors::errors::AppError;

/// 사용자 영속 저장소 추상화
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 새 사용자를 저장하고 `id`가 채워진 값을 반환합니다.
    ///
    /// 이메일 또는 사용자명이 이미 있으면 [`AppError::ConflictError`]입니다.
    async fn insert(&self, user: User) -> Result<User, AppError>;

    /// 비활성 사용자를 활성화합니다. 실제로 바뀌었으면 `true`입니다.
    async fn mark_active(&self, id: &ObjectId) -> Result<bool, AppError>;
}

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB 사용자 리포지토리
#[repository(name = "user", collection = "users")]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    /// 이메일/사용자명 유니크 인덱스와 생성일 인덱스를 만듭니다.
    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("username_unique".to_string())
                .build())
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        self.collection::<User>()
            .create_indexes([email_index, username_index, created_at_index])
            .await?;

        log::info!("✅ users 컬렉션 인덱스 확인 완료");
        Ok(())
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection::<User>().find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.collection::<User>().find_one(doc! { "username": username }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.collection::<User>().find_one(doc! { "email": email }).await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let result = self.collection::<User>().insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::ConflictError("이미 사용 중인 이메일 또는 사용자명입니다".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::DatabaseError("삽입된 문서의 _id가 ObjectId가 아닙니다".to_string()))?;
        user.id = Some(id);

        log::debug!("사용자 저장 - username: {}, id: {}", user.username, id);
        Ok(user)
    }

    async fn mark_active(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self.collection::<User>()
            .update_one(
                doc! { "_id": *id, "is_active": false },
                doc! { "$set": { "is_active": true, "updated_at": DateTime::now() } },
            )
            .await?;

        Ok(result.modified_count > 0)
    }
}
