//! Cache-aside 접근자
//!
//! 키로 캐시를 먼저 확인하고, 미스일 때만 재계산 콜백을 실행한 뒤 결과를
//! 캐시에 되돌려 씁니다.
//!
//! ```text
//! START → CHECK_CACHE ─┬─ HIT ──────────────────────────────→ RETURN
//!                      ├─ MISS → RECOMPUTE ─┬─ FAIL ────────→ RETURN_ERROR
//!                      │                    └─ OK → POPULATE → RETURN_VALUE
//!                      └─ HARD_ERROR ───────────────────────→ RETURN_ERROR
//! ```
//!
//! - 재계산은 호출자 경로에서 동기적으로 실행되며 타임아웃을 두지 않습니다.
//! - 되쓰기(POPULATE)는 별도 태스크로 발사만 하고 기다리지 않습니다.
//!   실패는 로그로만 남고 반환값에는 영향이 없습니다.
//! - 같은 키에 대한 동시 미스는 합쳐지지 않습니다. 각 호출이 재계산하고
//!   각자 되쓰며 마지막 쓰기가 남습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let profile: UserResponse = use_cache_with_ro(
//!     layer.read_only.as_ref(),
//!     &layer.primary,
//!     "user:alice",
//!     Duration::from_secs(300),
//!     || async { load_profile("alice").await },
//! ).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use serde::{Serialize, de::DeserializeOwned};
use crate::config::CacheConfig;
use super::error::CacheError;
use super::store::{Cache, CacheLookup, ReadOnlyCache, get_value};

/// 단일 계층 cache-aside 조회
///
/// # 반환값
///
/// * 캐시 히트 - 캐시된 값
/// * 캐시 미스 - `recompute` 결과 (되쓰기 성공 여부와 무관)
/// * 저장소 장애 - `E::from(CacheError)`, `recompute`는 호출되지 않음
/// * 재계산 실패 - `recompute`의 에러 그대로, 캐시 변경 없음
pub async fn use_cache<T, E, F, Fut>(
    cache: &Arc<dyn Cache>,
    key: &str,
    ttl: Duration,
    recompute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let CacheLookup::Hit(value) = get_value::<T, _>(cache.as_ref(), key).await? {
        return Ok(value);
    }

    recompute_and_populate(cache, key, ttl, recompute).await
}

/// 읽기 전용 복제본을 먼저 확인하는 2계층 cache-aside 조회
///
/// 복제본 히트면 기본 캐시는 건드리지 않습니다. 미스면 [`use_cache`]와 같은
/// 경로로 재계산하되, 되쓰기는 기본 캐시에만 합니다.
pub async fn use_cache_with_ro<T, E, F, Fut, R>(
    read_only: &R,
    cache: &Arc<dyn Cache>,
    key: &str,
    ttl: Duration,
    recompute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: ReadOnlyCache + ?Sized,
{
    if let CacheLookup::Hit(value) = get_value::<T, _>(read_only, key).await? {
        return Ok(value);
    }

    recompute_and_populate(cache, key, ttl, recompute).await
}

async fn recompute_and_populate<T, E, F, Fut>(
    cache: &Arc<dyn Cache>,
    key: &str,
    ttl: Duration,
    recompute: F,
) -> Result<T, E>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    log::debug!("캐시 미스 - 재계산: {}", key);

    let value = recompute().await?;
    spawn_populate(Arc::clone(cache), key, &value, ttl);

    Ok(value)
}

/// 재계산된 값을 백그라운드 태스크로 캐시에 씁니다.
///
/// 직렬화는 호출자 경로에서 끝내고, 태스크는 저장만 담당합니다.
/// 태스크는 감독되지 않으며 프로세스 종료 전에 끝난다는 보장이 없습니다.
fn spawn_populate<T: Serialize>(cache: Arc<dyn Cache>, key: &str, value: &T, ttl: Duration) {
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("캐시 저장 건너뜀 (직렬화 실패) - key: {}, error: {}", key, e);
            return;
        }
    };

    let key = key.to_string();
    let timeout = CacheConfig::populate_timeout();

    tokio::spawn(async move {
        populate(cache.as_ref(), &key, payload, ttl, timeout).await;
    });
}

/// 되쓰기 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopulateOutcome {
    Stored,
    Failed,
    TimedOut,
}

async fn populate(cache: &dyn Cache, key: &str, payload: String, ttl: Duration, timeout: Duration) -> PopulateOutcome {
    match tokio::time::timeout(timeout, cache.set_raw(key, payload, ttl)).await {
        Ok(Ok(())) => {
            log::debug!("캐시 저장 완료 - key: {}, ttl: {:?}", key, ttl);
            PopulateOutcome::Stored
        }
        Ok(Err(e)) => {
            log::warn!("캐시 저장 실패 - key: {}, error: {}", key, e);
            PopulateOutcome::Failed
        }
        Err(_) => {
            log::warn!("캐시 저장 시간 초과 - key: {}, timeout: {:?}", key, timeout);
            PopulateOutcome::TimedOut
        }
    }
}
