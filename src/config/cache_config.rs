//! 캐시 백엔드 설정
//!
//! ```bash
//! CACHE_BACKEND=redis                              # redis | memory
//! REDIS_URL=redis://localhost:6379                 # 데이터용 (활성화 코드)
//! REDIS_CACHE_URL=redis://localhost:6380           # 기본 캐시, 없으면 REDIS_URL
//! REDIS_CACHE_READONLY_URL=redis://replica:6380    # 없으면 기본 캐시를 그대로 읽음
//! CLUSTER_REDIS_CACHE=redis://n1:7000,redis://n2:7001
//! CLUSTER_REDIS_CACHE_READONLY=redis://r1:7003
//! CACHE_POPULATE_TIMEOUT_MS=2000
//! USER_CACHE_TTL_SECONDS=300
//! CACHE_LOCAL_TIER=true                            # Redis 앞에 프로세스 내부 캐시
//! CACHE_LOCAL_TIER_CAPACITY=10000
//! CACHE_LOCAL_TIER_TTL_SECONDS=60
//! ```
//!
//! 클러스터 변수가 있으면 같은 역할의 단일 서버 URL보다 우선합니다.

use std::env;
use std::time::Duration;

/// 캐시 저장소 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    /// 프로세스 내부 메모리 (로컬 개발/테스트용)
    Memory,
}

impl CacheBackend {
    /// 알 수 없는 값은 `Redis`입니다.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => CacheBackend::Memory,
            _ => CacheBackend::Redis,
        }
    }
}

pub struct CacheConfig;

impl CacheConfig {
    pub fn backend() -> CacheBackend {
        env::var("CACHE_BACKEND")
            .map(|raw| CacheBackend::from_str(&raw))
            .unwrap_or(CacheBackend::Redis)
    }

    /// 데이터 저장용 Redis URL
    pub fn data_url() -> String {
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// 기본(읽기/쓰기) 캐시 URL
    pub fn primary_url() -> String {
        env::var("REDIS_CACHE_URL").unwrap_or_else(|_| Self::data_url())
    }

    /// 읽기 전용 복제본 URL. `None`이면 기본 캐시를 함께 사용합니다.
    pub fn read_only_url() -> Option<String> {
        env::var("REDIS_CACHE_READONLY_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }

    pub fn cluster_nodes() -> Option<Vec<String>> {
        env::var("CLUSTER_REDIS_CACHE").ok().and_then(|raw| parse_node_list(&raw))
    }

    pub fn read_only_cluster_nodes() -> Option<Vec<String>> {
        env::var("CLUSTER_REDIS_CACHE_READONLY").ok().and_then(|raw| parse_node_list(&raw))
    }

    /// 백그라운드 되쓰기 한 건에 허용하는 시간. 기본값: 2초
    pub fn populate_timeout() -> Duration {
        let millis = env::var("CACHE_POPULATE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|millis: &u64| *millis > 0)
            .unwrap_or(2_000);
        Duration::from_millis(millis)
    }

    /// 사용자 프로필 캐시 TTL. 기본값: 5분
    pub fn user_cache_ttl() -> Duration {
        let seconds = env::var("USER_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|seconds: &u64| *seconds > 0)
            .unwrap_or(300);
        Duration::from_secs(seconds)
    }

    /// Redis 백엔드 앞에 로컬 계층을 둘지 여부. 기본값: 꺼짐
    pub fn local_tier_enabled() -> bool {
        env::var("CACHE_LOCAL_TIER")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false)
    }

    /// 로컬 계층 최대 항목 수. 기본값: 10000
    pub fn local_tier_capacity() -> u64 {
        env::var("CACHE_LOCAL_TIER_CAPACITY")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|capacity: &u64| *capacity > 0)
            .unwrap_or(10_000)
    }

    /// 로컬 계층 항목의 최대 수명. 기본값: 1분
    pub fn local_tier_ttl() -> Duration {
        let seconds = env::var("CACHE_LOCAL_TIER_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .filter(|seconds: &u64| *seconds > 0)
            .unwrap_or(60);
        Duration::from_secs(seconds)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// 쉼표로 구분된 노드 목록을 파싱합니다. 비어 있으면 `None`입니다.
fn parse_node_list(raw: &str) -> Option<Vec<String>> {
    let nodes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .map(|node| {
            if node.contains("://") {
                node.to_string()
            } else {
                format!("redis://{}", node)
            }
        })
        .collect();

    (!nodes.is_empty()).then_some(nodes)
}
