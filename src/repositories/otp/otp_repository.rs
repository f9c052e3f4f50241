//! 계정 활성화 코드 저장소
//!
//! 코드는 데이터용 Redis(`REDIS_URL`)에 `otp-code:{user_id}` 키로 TTL과 함께
//! 저장됩니다. 만료는 Redis TTL에 맡기며, 만료된 코드와 존재하지 않는 코드는
//! 구분하지 않습니다.

use std::sync::Arc;
use std::time::Duration;
use crate::caching::{Cache, CacheError, get_value, set_value};

pub struct OtpRepository {
    store: Arc<dyn Cache>,
    ttl: Duration,
}

impl OtpRepository {
    pub fn with_ttl(store: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// 코드 유효 시간
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(user_id: &str) -> String {
        format!("otp-code:{}", user_id)
    }

    /// 코드를 저장합니다. 이전 코드는 덮어씁니다.
    pub async fn save_code(&self, user_id: &str, code: &str) -> Result<(), CacheError> {
        set_value(self.store.as_ref(), &Self::key(user_id), code, self.ttl).await?;
        log::debug!("활성화 코드 저장 - user_id: {}, ttl: {:?}", user_id, self.ttl);
        Ok(())
    }

    /// 유효한 코드를 조회합니다. 없거나 만료됐으면 `None`입니다.
    pub async fn find_code(&self, user_id: &str) -> Result<Option<String>, CacheError> {
        let lookup = get_value::<String, _>(self.store.as_ref(), &Self::key(user_id)).await?;
        Ok(lookup.into_option())
    }

    pub async fn delete_code(&self, user_id: &str) -> Result<(), CacheError> {
        self.store.delete(&Self::key(user_id)).await
    }
}
