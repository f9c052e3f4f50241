//! # Redis 캐시 백엔드
//!
//! 단일 서버와 클러스터를 같은 인터페이스로 감싸는 캐시 구현입니다.
//! 값은 JSON 문자열로 저장되며 TTL은 `SET key value PX milliseconds`로 지정합니다.
//!
//! ## 연결 관리
//!
//! - **단일 서버**: `ConnectionManager` (멀티플렉싱 + 자동 재연결)
//! - **클러스터**: `cluster_async::ClusterConnection` (슬롯 기반 라우팅)
//! - **읽기 전용 복제본**: 클러스터는 `read_from_replicas`로 연결하고,
//!   단일 서버 복제본은 쓰기 시 Redis가 `READONLY` 에러를 돌려줍니다.
//!
//! ## 패턴 무효화
//!
//! 클러스터에서 SCAN은 노드 단위로 동작하므로, 시드 노드에 `CLUSTER NODES`를
//! 보내 마스터 목록을 얻은 뒤 마스터마다 별도 연결을 열어 순회합니다.

use std::time::Duration;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::{AsyncCommands, Client};
use super::error::CacheError;
use super::invalidation::{self, InvalidationReport, KeyspaceNode, PatternInvalidation};
use super::store::{Cache, CacheLookup, ReadOnlyCache};

#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

/// 연결 종류와 무관하게 같은 명령을 실행합니다.
macro_rules! with_connection {
    ($conn:expr, $c:ident => $body:expr) => {
        match $conn {
            Connection::Single(inner) => {
                let mut $c = inner.clone();
                $body
            }
            Connection::Cluster(inner) => {
                let mut $c = inner.clone();
                $body
            }
        }
    };
}

/// Redis 캐시 클라이언트
///
/// `Clone`은 연결 핸들만 복제하므로 가볍습니다.
///
/// ```rust,ignore
/// let primary = RedisCache::connect("redis://localhost:6379").await?;
/// set_value(&primary, "user:alice", &profile, Duration::from_secs(300)).await?;
/// let cached: CacheLookup<UserResponse> = get_value(&primary, "user:alice").await?;
/// ```
#[derive(Clone)]
pub struct RedisCache {
    connection: Connection,
    /// 연결에 사용한 첫 번째 URL (클러스터 마스터 주소 재구성에 사용)
    seed_url: String,
}

impl RedisCache {
    /// 단일 Redis 서버에 연결합니다.
    ///
    /// 생성 시 PING으로 서버 가용성을 확인합니다.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;

        log::info!("✅ Redis 연결 성공: {}", redact_url(url));

        Ok(Self {
            connection: Connection::Single(conn),
            seed_url: url.to_string(),
        })
    }

    /// Redis 클러스터에 연결합니다.
    ///
    /// `read_only`이면 읽기 명령을 복제본으로 보냅니다.
    pub async fn connect_cluster(nodes: &[String], read_only: bool) -> Result<Self, CacheError> {
        let seed_url = nodes
            .first()
            .cloned()
            .ok_or_else(|| CacheError::Configuration("클러스터 노드 목록이 비어 있습니다".to_string()))?;

        let mut builder = ClusterClientBuilder::new(nodes.to_vec());
        if read_only {
            builder = builder.read_from_replicas();
        }
        let client = builder.build()?;
        let mut conn = client.get_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;

        log::info!(
            "✅ Redis 클러스터 연결 성공: {} (노드 {}개, read_only: {})",
            redact_url(&seed_url), nodes.len(), read_only
        );

        Ok(Self {
            connection: Connection::Cluster(conn),
            seed_url,
        })
    }

    /// 패턴 무효화 대상 노드를 반환합니다.
    ///
    /// 단일 서버면 자기 자신 하나, 클러스터면 연결 가능한 모든 마스터입니다.
    /// 두 번째 값은 연결에 실패한 마스터 수입니다.
    pub async fn keyspace_nodes(&self) -> Result<(Vec<RedisNode>, usize), CacheError> {
        match &self.connection {
            Connection::Single(conn) => Ok((
                vec![RedisNode {
                    label: redact_url(&self.seed_url),
                    conn: conn.clone(),
                }],
                0,
            )),
            Connection::Cluster(_) => {
                let seed = Client::open(self.seed_url.as_str())?;
                let mut seed_conn = seed.get_multiplexed_async_connection().await?;
                let topology: String = redis::cmd("CLUSTER")
                    .arg("NODES")
                    .query_async(&mut seed_conn)
                    .await?;

                let mut nodes = Vec::new();
                let mut unreachable = 0;
                for (host, port) in parse_cluster_masters(&topology) {
                    let url = node_url(&self.seed_url, &host, port);
                    match RedisNode::connect(&url).await {
                        Ok(node) => nodes.push(node),
                        Err(e) => {
                            log::warn!("마스터 노드 연결 실패 - {}: {}", redact_url(&url), e);
                            unreachable += 1;
                        }
                    }
                }

                log::debug!("클러스터 마스터 {}개 확인 (연결 실패 {}개)", nodes.len(), unreachable);
                Ok((nodes, unreachable))
            }
        }
    }
}

#[async_trait]
impl ReadOnlyCache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<CacheLookup<String>, CacheError> {
        let value: Option<String> = with_connection!(&self.connection, c => c.get(key).await?);
        Ok(value.into())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn set_raw(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let millis = ttl_millis(ttl);
        with_connection!(&self.connection, c => c.pset_ex::<_, _, ()>(key, payload, millis).await?);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        with_connection!(&self.connection, c => c.del::<_, ()>(key).await?);
        Ok(())
    }
}

#[async_trait]
impl PatternInvalidation for RedisCache {
    async fn delete_keys(&self, pattern: &str) -> Result<InvalidationReport, CacheError> {
        let (nodes, unreachable) = self.keyspace_nodes().await?;
        let mut report = invalidation::delete_keys(&nodes, pattern).await;
        report.nodes += unreachable;
        report.failures += unreachable;
        Ok(report)
    }
}

/// `PX` 인자. 0은 Redis가 거부하므로 최소 1ms
pub fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// SCAN/DEL 대상이 되는 Redis 노드 하나
#[derive(Clone)]
pub struct RedisNode {
    label: String,
    conn: ConnectionManager,
}

impl RedisNode {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            label: redact_url(url),
            conn,
        })
    }
}

#[async_trait]
impl KeyspaceNode for RedisNode {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn scan_page(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>), CacheError> {
        let mut conn = self.conn.clone();
        let page: (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;
        Ok(page)
    }

    async fn delete_key(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// `CLUSTER NODES` 출력에서 정상 상태인 마스터의 (호스트, 포트)를 추출합니다.
///
/// 각 줄의 형식: `<id> <ip:port@cport[,hostname]> <flags> <master> ...`
pub fn parse_cluster_masters(output: &str) -> Vec<(String, u16)> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return None;
            }

            let flags: Vec<&str> = fields[2].split(',').collect();
            let is_master = flags.contains(&"master");
            let unusable = flags.iter().any(|f| matches!(*f, "fail" | "fail?" | "noaddr" | "handshake"));
            if !is_master || unusable {
                return None;
            }

            let addr = fields[1].split('@').next()?;
            let (host, port) = addr.rsplit_once(':')?;
            if host.is_empty() {
                return None;
            }
            Some((host.to_string(), port.parse().ok()?))
        })
        .collect()
}

/// 시드 URL의 스킴과 인증 정보를 유지한 채 주소만 바꾼 URL을 만듭니다.
pub fn node_url(seed_url: &str, host: &str, port: u16) -> String {
    let (scheme, rest) = seed_url.split_once("://").unwrap_or(("redis", seed_url));
    let authority = rest.split('/').next().unwrap_or_default();
    let credentials = authority
        .rsplit_once('@')
        .map(|(auth, _)| format!("{}@", auth))
        .unwrap_or_default();
    let host = if host.contains(':') { format!("[{}]", host) } else { host.to_string() };

    format!("{}://{}{}:{}", scheme, credentials, host, port)
}

/// 로그에 남기기 위해 URL에서 인증 정보를 제거합니다.
pub fn redact_url(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("redis", url));
    let authority = rest.split('/').next().unwrap_or_default();
    let address = authority.rsplit_once('@').map(|(_, addr)| addr).unwrap_or(authority);
    format!("{}://{}", scheme, address)
}
