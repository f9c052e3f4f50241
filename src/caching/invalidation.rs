//! 패턴 기반 대량 캐시 무효화
//!
//! 와일드카드(`*`)가 없으면 단일 삭제, 있으면 SCAN으로 페이지 단위 순회하며
//! 찾은 키를 하나씩 삭제합니다. 클러스터에서는 모든 마스터 노드를 각각
//! 독립적으로 순회하며, 한 노드의 실패가 다른 노드의 처리를 막지 않습니다.
//!
//! 트랜잭션이 아니므로 도중에 중단되면 일부 키만 삭제된 상태로 남습니다.

use async_trait::async_trait;
use serde::Serialize;
use super::error::CacheError;

/// SCAN 한 페이지당 요청하는 키 개수
pub const SCAN_BATCH_SIZE: usize = 10_000;

/// SCAN/DEL을 지원하는 단일 키 공간 (단일 서버 또는 클러스터 마스터 하나)
#[async_trait]
pub trait KeyspaceNode: Send + Sync {
    /// 노드 식별자 (로그용)
    fn label(&self) -> String;

    /// `cursor`부터 `pattern`과 일치하는 키 한 페이지를 조회합니다.
    ///
    /// 반환된 커서가 0이면 순회가 끝난 것입니다.
    async fn scan_page(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>), CacheError>;

    async fn delete_key(&self, key: &str) -> Result<(), CacheError>;
}

/// 패턴 무효화를 지원하는 캐시
#[async_trait]
pub trait PatternInvalidation: Send + Sync {
    async fn delete_keys(&self, pattern: &str) -> Result<InvalidationReport, CacheError>;
}

#[async_trait]
impl<P: PatternInvalidation + ?Sized> PatternInvalidation for std::sync::Arc<P> {
    async fn delete_keys(&self, pattern: &str) -> Result<InvalidationReport, CacheError> {
        self.as_ref().delete_keys(pattern).await
    }
}

/// 무효화 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    /// 순회한 노드 수
    pub nodes: usize,
    /// 삭제에 성공한 키 수 (단일 삭제는 존재 여부와 무관하게 1)
    pub deleted: usize,
    /// 삭제 또는 SCAN에 실패한 횟수
    pub failures: usize,
}

impl InvalidationReport {
    fn merge(&mut self, other: InvalidationReport) {
        self.nodes += other.nodes;
        self.deleted += other.deleted;
        self.failures += other.failures;
    }
}

pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// 모든 노드에서 `pattern`과 일치하는 키를 삭제합니다.
///
/// 노드별 실패는 로그와 리포트에만 남고 전체 작업을 중단시키지 않습니다.
pub async fn delete_keys<N>(nodes: &[N], pattern: &str) -> InvalidationReport
where
    N: KeyspaceNode,
{
    let mut report = InvalidationReport::default();

    for node in nodes {
        report.merge(delete_keys_on_node(node, pattern).await);
    }

    log::info!(
        "캐시 무효화 완료 - pattern: {}, nodes: {}, deleted: {}, failures: {}",
        pattern, report.nodes, report.deleted, report.failures
    );

    report
}

/// 단일 노드에서 `pattern`과 일치하는 키를 삭제합니다.
pub async fn delete_keys_on_node<N>(node: &N, pattern: &str) -> InvalidationReport
where
    N: KeyspaceNode + ?Sized,
{
    let mut report = InvalidationReport { nodes: 1, ..Default::default() };

    if !is_wildcard(pattern) {
        record_delete(node, pattern, &mut report).await;
        return report;
    }

    let mut cursor = 0u64;
    loop {
        let (next, keys) = match node.scan_page(cursor, pattern, SCAN_BATCH_SIZE).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("SCAN 실패 - node: {}, pattern: {}, error: {}", node.label(), pattern, e);
                report.failures += 1;
                break;
            }
        };

        for key in &keys {
            record_delete(node, key, &mut report).await;
        }

        if next == 0 {
            break;
        }
        cursor = next;
    }

    report
}

async fn record_delete<N>(node: &N, key: &str, report: &mut InvalidationReport)
where
    N: KeyspaceNode + ?Sized,
{
    match node.delete_key(key).await {
        Ok(()) => {
            log::debug!("키 삭제 - node: {}, key: {}", node.label(), key);
            report.deleted += 1;
        }
        Err(e) => {
            log::warn!("키 삭제 실패 - node: {}, key: {}, error: {}", node.label(), key, e);
            report.failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::caching::memory::glob_match;

    /// 한 페이지에 `page_size`개씩 돌려주는 가짜 노드.
    /// 커서는 키 목록에서의 위치이며, 삭제된 키도 자리를 유지합니다.
    struct PagedNode {
        name: &'static str,
        keys: Mutex<Vec<(String, bool)>>,
        page_size: usize,
        fail_scan: bool,
        fail_delete_for: Option<&'static str>,
        scan_calls: Mutex<Vec<(u64, usize)>>,
    }

    impl PagedNode {
        fn new(name: &'static str, keys: &[&str]) -> Self {
            Self {
                name,
                keys: Mutex::new(keys.iter().map(|k| (k.to_string(), false)).collect()),
                page_size: 2,
                fail_scan: false,
                fail_delete_for: None,
                scan_calls: Mutex::new(Vec::new()),
            }
        }

        fn remaining(&self) -> Vec<String> {
            self.keys
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, deleted)| !deleted)
                .map(|(k, _)| k.clone())
                .collect()
        }
    }

    #[async_trait]
    impl KeyspaceNode for PagedNode {
        fn label(&self) -> String {
            self.name.to_string()
        }

        async fn scan_page(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>), CacheError> {
            self.scan_calls.lock().unwrap().push((cursor, count));
            if self.fail_scan {
                return Err(CacheError::Configuration("node unreachable".to_string()));
            }

            let keys = self.keys.lock().unwrap();
            let start = (cursor as usize).min(keys.len());
            let end = (start + self.page_size).min(keys.len());
            let page = keys[start..end]
                .iter()
                .filter(|(k, deleted)| !deleted && glob_match(pattern, k))
                .map(|(k, _)| k.clone())
                .collect();
            let next = if end >= keys.len() { 0 } else { end as u64 };
            Ok((next, page))
        }

        async fn delete_key(&self, key: &str) -> Result<(), CacheError> {
            if self.fail_delete_for == Some(key) {
                return Err(CacheError::Configuration("READONLY".to_string()));
            }
            for entry in self.keys.lock().unwrap().iter_mut() {
                if entry.0 == key {
                    entry.1 = true;
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_wildcard_deletes_only_matching_keys() {
        let node = PagedNode::new("single", &["user:alice", "user:bob", "order:1"]);

        let report = delete_keys(std::slice::from_ref(&node), "user:*").await;

        assert_eq!(report.deleted, 2);
        assert_eq!(report.failures, 0);
        assert_eq!(node.remaining(), vec!["order:1".to_string()]);
    }

    #[tokio::test]
    async fn test_exact_pattern_issues_single_delete_without_scan() {
        let node = PagedNode::new("single", &["user:alice", "user:bob"]);

        let report = delete_keys_on_node(&node, "user:alice").await;

        assert_eq!(report.deleted, 1);
        assert!(node.scan_calls.lock().unwrap().is_empty());
        assert!(!node.remaining().contains(&"user:alice".to_string()));
    }

    #[tokio::test]
    async fn test_scan_uses_batch_size_and_follows_cursor() {
        let node = PagedNode::new("single", &["a:1", "a:2", "a:3", "a:4", "a:5"]);

        delete_keys_on_node(&node, "a:*").await;

        let calls = node.scan_calls.lock().unwrap().clone();
        assert!(calls.len() >= 3);
        assert_eq!(calls[0].0, 0);
        assert!(calls.iter().all(|(_, count)| *count == SCAN_BATCH_SIZE));
    }

    #[tokio::test]
    async fn test_shard_failure_does_not_abort_other_shards() {
        let mut broken = PagedNode::new("shard-a", &["user:alice"]);
        broken.fail_scan = true;
        let healthy = PagedNode::new("shard-b", &["user:bob", "order:1"]);

        let shards = [broken, healthy];

        let report = delete_keys(&shards, "user:*").await;

        assert_eq!(report.nodes, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(shards[0].remaining(), vec!["user:alice".to_string()]);
        assert_eq!(shards[1].remaining(), vec!["order:1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_is_counted_and_scan_continues() {
        let mut node = PagedNode::new("single", &["user:alice", "user:bob", "user:carol"]);
        node.fail_delete_for = Some("user:alice");

        let report = delete_keys(std::slice::from_ref(&node), "user:*").await;

        assert_eq!(report.failures, 1);
        assert_eq!(report.deleted, 2);
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("user:*"));
        assert!(!is_wildcard("user:alice"));
    }
}
