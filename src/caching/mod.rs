//! 캐싱 계층 모듈
//!
//! Cache-aside 접근자와 패턴 기반 무효화, 그리고 이를 받쳐 주는 저장소
//! 백엔드(Redis 단일/클러스터, 메모리)를 제공합니다.
//!
//! # 주요 기능
//!
//! - [`use_cache`] / [`use_cache_with_ro`]: 조회 → 미스 시 재계산 → 비동기 되쓰기
//! - [`PatternInvalidation`]: `user:*` 같은 글롭 패턴으로 키 일괄 삭제
//! - 읽기 전용 복제본 분리: 조회는 복제본, 쓰기는 기본 캐시
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::caching::{CacheLayer, use_cache_with_ro};
//!
//! let layer = CacheLayer::initialize().await?;
//! let profile: UserResponse = use_cache_with_ro(
//!     layer.read_only.as_ref(),
//!     &layer.primary,
//!     "user:alice",
//!     CacheConfig::user_cache_ttl(),
//!     || async { repo.find_by_username("alice").await },
//! ).await?;
//!
//! layer.invalidator.delete_keys("user:*").await?;
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! CACHE_BACKEND=redis                            # redis | memory
//! REDIS_CACHE_URL=redis://localhost:6379         # 기본값: REDIS_URL
//! REDIS_CACHE_READONLY_URL=redis://replica:6379  # 기본값: REDIS_CACHE_URL
//! CLUSTER_REDIS_CACHE=redis://n1:7000,redis://n2:7001
//! CLUSTER_REDIS_CACHE_READONLY=redis://r1:7003,redis://r2:7004
//! CACHE_LOCAL_TIER=true                          # Redis 앞에 로컬 계층 (tiered)
//! ```

pub mod error;
pub mod store;
pub mod cache_aside;
pub mod invalidation;
pub mod memory;
pub mod redis;
pub mod tiered;

pub use error::CacheError;
pub use store::{Cache, CacheLookup, ReadOnlyCache, get_value, set_value};
pub use cache_aside::{use_cache, use_cache_with_ro};
pub use invalidation::{InvalidationReport, PatternInvalidation};

use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::OnceCell;
use crate::config::{CacheBackend, CacheConfig};
use crate::core::registry::ServiceLocator;
use self::memory::MemoryCache;
use self::redis::RedisCache;
use self::tiered::TieredCache;

/// 애플리케이션 전역 캐시 핸들 묶음
///
/// `primary`는 읽기/쓰기, `read_only`는 조회 전용, `invalidator`는 패턴 삭제에
/// 사용됩니다. 복제본이 따로 설정되지 않으면 세 핸들이 같은 저장소를 가리킵니다.
#[derive(Clone)]
pub struct CacheLayer {
    pub primary: Arc<dyn Cache>,
    pub read_only: Arc<dyn ReadOnlyCache>,
    pub invalidator: Arc<dyn PatternInvalidation>,
}

static CACHE_LAYER: OnceCell<Arc<CacheLayer>> = OnceCell::new();

impl CacheLayer {
    /// 하나의 저장소를 세 역할 모두에 사용합니다.
    pub fn single<C>(cache: Arc<C>) -> Self
    where
        C: Cache + PatternInvalidation + 'static,
    {
        Self {
            primary: cache.clone(),
            read_only: cache.clone(),
            invalidator: cache,
        }
    }

    /// 설정에 따라 백엔드에 연결합니다.
    pub async fn connect() -> Result<Self, CacheError> {
        match CacheConfig::backend() {
            CacheBackend::Memory => {
                log::info!("메모리 캐시 백엔드 사용");
                Ok(Self::single(Arc::new(MemoryCache::new())))
            }
            CacheBackend::Redis => Self::connect_redis().await,
        }
    }

    async fn connect_redis() -> Result<Self, CacheError> {
        let primary = match CacheConfig::cluster_nodes() {
            Some(nodes) => RedisCache::connect_cluster(&nodes, false).await?,
            None => RedisCache::connect(&CacheConfig::primary_url()).await?,
        };
        let primary = Arc::new(primary);

        let read_only: Arc<dyn ReadOnlyCache> = match CacheConfig::read_only_cluster_nodes() {
            Some(nodes) => Arc::new(RedisCache::connect_cluster(&nodes, true).await?),
            None => match CacheConfig::read_only_url() {
                Some(url) => Arc::new(RedisCache::connect(&url).await?),
                None => primary.clone(),
            },
        };

        if CacheConfig::local_tier_enabled() {
            return Ok(Self::with_local_tier(
                primary,
                read_only,
                CacheConfig::local_tier_capacity(),
                CacheConfig::local_tier_ttl(),
            ));
        }

        Ok(Self {
            primary: primary.clone(),
            read_only,
            invalidator: primary,
        })
    }

    /// 기본/읽기 전용 캐시 앞에 하나의 로컬 계층을 공유시켜 둡니다.
    pub fn with_local_tier<C>(
        primary: Arc<C>,
        read_only: Arc<dyn ReadOnlyCache>,
        capacity: u64,
        local_ttl: Duration,
    ) -> Self
    where
        C: Cache + PatternInvalidation + 'static,
    {
        log::info!("로컬 캐시 계층 사용 - capacity: {}, ttl: {:?}", capacity, local_ttl);
        let local = Arc::new(MemoryCache::bounded(capacity));
        let primary = Arc::new(TieredCache::new(local.clone(), primary, local_ttl));

        Self {
            primary: primary.clone(),
            read_only: Arc::new(TieredCache::new(local, read_only, local_ttl)),
            invalidator: primary,
        }
    }

    /// 전역 캐시 계층을 한 번만 초기화합니다.
    pub async fn initialize() -> Result<Arc<Self>, CacheError> {
        if let Some(layer) = CACHE_LAYER.get() {
            return Ok(layer.clone());
        }

        let layer = Arc::new(Self::connect().await?);
        let _ = CACHE_LAYER.set(layer.clone());
        ServiceLocator::set(layer.clone());

        Ok(CACHE_LAYER.get().cloned().unwrap_or(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_layer_shares_one_store() {
        let layer = CacheLayer::single(Arc::new(MemoryCache::new()));

        set_value(layer.primary.as_ref(), "user:alice", &"alice", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(layer.read_only.get_raw("user:alice").await.unwrap().is_hit());

        let report = layer.invalidator.delete_keys("user:*").await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(layer.read_only.get_raw("user:alice").await.unwrap(), CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_local_tier_layer_invalidates_replica_copies() {
        let remote = Arc::new(MemoryCache::new());
        let layer = CacheLayer::with_local_tier(remote.clone(), remote.clone(), 100, Duration::from_secs(60));
        set_value(remote.as_ref(), "user:alice", &"alice", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(layer.read_only.get_raw("user:alice").await.unwrap().is_hit());

        layer.primary.delete("user:alice").await.unwrap();

        assert_eq!(layer.read_only.get_raw("user:alice").await.unwrap(), CacheLookup::Miss);
    }
}
