//! 캐시 저장소 추상화
//!
//! 읽기 전용 복제본과 읽기/쓰기 가능한 기본 캐시를 각각의 trait으로 분리합니다.
//! 저장소는 JSON 문자열만 다루고, 타입 변환은 [`get_value`] / [`set_value`]
//! 경계에서 한 번만 일어납니다.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use super::error::CacheError;

/// 캐시 조회 결과
///
/// 미스는 에러가 아니라 별도의 분기입니다. `Err`로 돌아오는 값은
/// 모두 저장소 장애로 취급됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    /// 키가 존재하고 만료되지 않음
    Hit(T),
    /// 키가 없거나 TTL이 지남
    Miss,
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss => None,
        }
    }
}

impl<T> From<Option<T>> for CacheLookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => CacheLookup::Hit(v),
            None => CacheLookup::Miss,
        }
    }
}

/// 조회만 가능한 캐시 (읽기 전용 복제본)
#[async_trait]
pub trait ReadOnlyCache: Send + Sync {
    /// 직렬화된 페이로드를 조회합니다.
    async fn get_raw(&self, key: &str) -> Result<CacheLookup<String>, CacheError>;
}

/// 읽기/쓰기 가능한 기본 캐시
#[async_trait]
pub trait Cache: ReadOnlyCache {
    /// 페이로드를 TTL과 함께 저장합니다. 기존 값은 덮어씁니다.
    async fn set_raw(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError>;

    /// 키를 삭제합니다. 키가 없어도 성공입니다.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[async_trait]
impl<C: ReadOnlyCache + ?Sized> ReadOnlyCache for Arc<C> {
    async fn get_raw(&self, key: &str) -> Result<CacheLookup<String>, CacheError> {
        self.as_ref().get_raw(key).await
    }
}

#[async_trait]
impl<C: Cache + ?Sized> Cache for Arc<C> {
    async fn set_raw(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        self.as_ref().set_raw(key, payload, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.as_ref().delete(key).await
    }
}

/// 캐시에서 값을 조회하고 `T`로 역직렬화합니다.
///
/// 역직렬화 실패는 미스가 아니라 [`CacheError::Serialization`]입니다.
pub async fn get_value<T, C>(cache: &C, key: &str) -> Result<CacheLookup<T>, CacheError>
where
    T: DeserializeOwned,
    C: ReadOnlyCache + ?Sized,
{
    match cache.get_raw(key).await? {
        CacheLookup::Hit(payload) => Ok(CacheLookup::Hit(serde_json::from_str(&payload)?)),
        CacheLookup::Miss => Ok(CacheLookup::Miss),
    }
}

/// 값을 JSON으로 직렬화해 TTL과 함께 저장합니다.
pub async fn set_value<T, C>(cache: &C, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
where
    T: Serialize + ?Sized,
    C: Cache + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    cache.set_raw(key, payload, ttl).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_from_option() {
        assert_eq!(CacheLookup::from(Some(3)), CacheLookup::Hit(3));
        assert_eq!(CacheLookup::<i32>::from(None), CacheLookup::Miss);
    }

    #[test]
    fn test_lookup_into_option() {
        assert!(CacheLookup::Hit("a").is_hit());
        assert_eq!(CacheLookup::Hit("a").into_option(), Some("a"));
        assert_eq!(CacheLookup::<&str>::Miss.into_option(), None);
    }
}
