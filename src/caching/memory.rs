//! 프로세스 내부 메모리 캐시
//!
//! Redis 없이 로컬에서 서버를 띄우거나 테스트할 때 사용하는 백엔드이자
//! (`CACHE_BACKEND=memory`) Redis 앞에 두는 로컬 계층의 저장소입니다.
//! `moka::future::Cache` 위에 항목별 TTL을 얹었고, 키 단위 연산은 모두
//! moka가 원자적으로 처리합니다.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use super::error::CacheError;
use super::invalidation::{InvalidationReport, KeyspaceNode, PatternInvalidation, delete_keys_on_node};
use super::store::{Cache, CacheLookup, ReadOnlyCache};

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

/// 항목마다 저장 시점의 TTL을 적용
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// 메모리 기반 캐시
pub struct MemoryCache {
    entries: MokaCache<String, Entry>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// 용량 제한 없는 캐시
    pub fn new() -> Self {
        Self {
            entries: MokaCache::builder().expire_after(PerEntryTtl).build(),
        }
    }

    /// 최대 `max_entries`개까지 보관하는 캐시. 넘치면 TinyLFU 정책으로 축출됩니다.
    pub fn bounded(max_entries: u64) -> Self {
        Self {
            entries: MokaCache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// 만료되지 않은 항목 수
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadOnlyCache for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<CacheLookup<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| entry.payload).into())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set_raw(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), Entry { payload, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

#[async_trait]
impl KeyspaceNode for MemoryCache {
    fn label(&self) -> String {
        "memory".to_string()
    }

    /// 메모리 백엔드는 한 번에 전체를 돌려주므로 커서는 항상 0입니다.
    async fn scan_page(&self, _cursor: u64, pattern: &str, _count: usize) -> Result<(u64, Vec<String>), CacheError> {
        let keys = self
            .entries
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.as_ref().clone())
            .collect();
        Ok((0, keys))
    }

    async fn delete_key(&self, key: &str) -> Result<(), CacheError> {
        self.delete(key).await
    }
}

#[async_trait]
impl PatternInvalidation for MemoryCache {
    async fn delete_keys(&self, pattern: &str) -> Result<InvalidationReport, CacheError> {
        Ok(delete_keys_on_node(self, pattern).await)
    }
}

/// Redis `MATCH` 문법 중 `*`, `?`, `\` 이스케이프를 지원하는 글롭 매칭
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '\\' if pi + 1 < p.len() && p[pi + 1] == t[ti] => {
                    pi += 2;
                    ti += 1;
                    continue;
                }
                c if c != '\\' && c == t[ti] => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                _ => {}
            }
        }

        // 불일치: 마지막 `*`로 돌아가 한 글자 더 흡수
        match star {
            Some((star_pi, star_ti)) => {
                pi = star_pi + 1;
                ti = star_ti + 1;
                star = Some((star_pi, star_ti + 1));
            }
            None => return false,
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
