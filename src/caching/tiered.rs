//! Redis 앞에 두는 프로세스 내부 로컬 계층
//!
//! `CACHE_LOCAL_TIER=true`이면 기본 캐시와 읽기 전용 캐시가 하나의 로컬
//! [`MemoryCache`]를 공유하는 [`TieredCache`]로 감싸집니다.
//!
//! - 조회: 로컬 → 원격. 원격 히트는 로컬에 채워 둡니다.
//! - 저장/삭제: 원격을 먼저 처리하고 성공하면 로컬에 반영합니다.
//! - 로컬 항목의 수명은 `min(ttl, CACHE_LOCAL_TIER_TTL_SECONDS)`입니다.
//!   다른 프로세스가 무효화한 키는 이 시간 동안 남아 있을 수 있습니다.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use super::error::CacheError;
use super::invalidation::{InvalidationReport, PatternInvalidation};
use super::memory::MemoryCache;
use super::store::{Cache, CacheLookup, ReadOnlyCache};

pub struct TieredCache<R> {
    local: Arc<MemoryCache>,
    remote: R,
    local_ttl: Duration,
}

impl<R> TieredCache<R> {
    pub fn new(local: Arc<MemoryCache>, remote: R, local_ttl: Duration) -> Self {
        Self { local, remote, local_ttl }
    }

    fn local_ttl_for(&self, ttl: Duration) -> Duration {
        ttl.min(self.local_ttl)
    }
}

#[async_trait]
impl<R: ReadOnlyCache> ReadOnlyCache for TieredCache<R> {
    async fn get_raw(&self, key: &str) -> Result<CacheLookup<String>, CacheError> {
        if let CacheLookup::Hit(payload) = self.local.get_raw(key).await? {
            return Ok(CacheLookup::Hit(payload));
        }

        let lookup = self.remote.get_raw(key).await?;
        if let CacheLookup::Hit(payload) = &lookup {
            self.local.set_raw(key, payload.clone(), self.local_ttl).await?;
        }
        Ok(lookup)
    }
}

#[async_trait]
impl<R: Cache> Cache for TieredCache<R> {
    async fn set_raw(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        self.remote.set_raw(key, payload.clone(), ttl).await?;
        self.local.set_raw(key, payload, self.local_ttl_for(ttl)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.remote.delete(key).await?;
        self.local.delete(key).await
    }
}

#[async_trait]
impl<R: PatternInvalidation> PatternInvalidation for TieredCache<R> {
    /// 보고서는 원격 결과입니다. 로컬 삭제 건수는 디버그 로그로만 남깁니다.
    async fn delete_keys(&self, pattern: &str) -> Result<InvalidationReport, CacheError> {
        let report = self.remote.delete_keys(pattern).await?;
        let local = self.local.delete_keys(pattern).await?;
        log::debug!("로컬 계층 무효화 - pattern: {}, deleted: {}", pattern, local.deleted);
        Ok(report)
    }
}
