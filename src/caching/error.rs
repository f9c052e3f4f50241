//! 캐시 계층 에러 타입
//!
//! 캐시 미스는 에러가 아니라 [`CacheLookup::Miss`](super::store::CacheLookup::Miss)
//! 로 표현되므로, 이 열거형에 담기는 값은 모두 호출자에게 그대로 전달되는
//! 저장소 장애입니다.

use thiserror::Error;

/// 캐시 백엔드 에러
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis 연결 또는 명령 실행 실패
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// 페이로드 직렬화/역직렬화 실패
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 잘못된 연결 설정 (URL, 클러스터 노드 목록 등)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_is_wrapped() {
        let err = serde_json::from_str::<u32>("not-a-number").unwrap_err();
        let cache_err = CacheError::from(err);

        assert!(matches!(cache_err, CacheError::Serialization(_)));
        assert!(cache_err.to_string().starts_with("Serialization error"));
    }
}
