//! 관리자용 캐시 무효화 서비스

use std::sync::Arc;
use singleton_macro::service;
use crate::caching::{CacheLayer, InvalidationReport, PatternInvalidation};
use crate::errors::errors::AppError;

const MAX_PATTERN_LEN: usize = 256;

#[service(name = "cache")]
pub struct CacheService {
    cache_layer: Arc<CacheLayer>,
}

impl CacheService {
    /// 패턴과 일치하는 키를 모두 삭제합니다.
    pub async fn invalidate(&self, pattern: &str) -> Result<InvalidationReport, AppError> {
        invalidate_pattern(self.cache_layer.invalidator.as_ref(), pattern).await
    }
}

/// 패턴을 검증한 뒤 무효화합니다.
///
/// 노드 단위 실패는 리포트의 `failures`에 집계되며 에러로 바뀌지 않습니다.
pub async fn invalidate_pattern(
    invalidator: &dyn PatternInvalidation,
    pattern: &str,
) -> Result<InvalidationReport, AppError> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(AppError::ValidationError("pattern이 필요합니다".to_string()));
    }
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(AppError::ValidationError(format!(
            "pattern은 {}자 이하여야 합니다",
            MAX_PATTERN_LEN
        )));
    }

    log::info!("캐시 무효화 요청 - pattern: {}", pattern);
    Ok(invalidator.delete_keys(pattern).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::caching::memory::MemoryCache;
    use crate::caching::{ReadOnlyCache, set_value};

    #[tokio::test]
    async fn test_pattern_is_trimmed_before_matching() {
        let cache = MemoryCache::new();
        set_value(&cache, "user:alice", "v", Duration::from_secs(60)).await.unwrap();

        let report = invalidate_pattern(&cache, "  user:alice ").await.unwrap();

        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn test_wildcard_invalidation_keeps_other_namespaces() {
        let cache = Arc::new(MemoryCache::new());
        let ttl = Duration::from_secs(60);
        for key in ["user:alice", "user:bob", "order:1"] {
            set_value(cache.as_ref(), key, "v", ttl).await.unwrap();
        }

        let report = invalidate_pattern(cache.as_ref(), "user:*").await.unwrap();

        assert_eq!(report.deleted, 2);
        assert!(!cache.get_raw("user:alice").await.unwrap().is_hit());
        assert!(cache.get_raw("order:1").await.unwrap().is_hit());
    }

    #[tokio::test]
    async fn test_blank_pattern_is_rejected() {
        let cache = MemoryCache::new();

        assert!(matches!(invalidate_pattern(&cache, "  ").await, Err(AppError::ValidationError(_))));
        assert!(matches!(
            invalidate_pattern(&cache, &"x".repeat(300)).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
