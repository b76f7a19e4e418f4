//! Cache Manager Module
//!
//! The facade callers talk to. It gates every operation through the policy,
//! dispatches to the data or response store, times the call, and feeds stats
//! and the monitor.
//!
//! No operation here returns an error. Store faults, encoding failures and
//! malformed responses are reported to the error tracker and surface as a
//! miss (`None`) or as "not cached" (`false`). Callers must always be ready to
//! fall through to the real data path.

use std::sync::Arc;
use std::time::Instant;

use axum::{body::Bytes, http::response};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{
    generate_cache_id, generate_response_cache_key, CacheBackend, CacheOptions, CachePolicy,
    CacheRequest, CacheStats, CachedResponse, DataCache, MetricsRecord, Operation, ResponseCache,
    StatsSnapshot,
};
use crate::error::{CacheError, Result};
use crate::monitor::{ErrorContext, ErrorTracker, MetricsSink, TracingMonitor, COMPONENT};

// == Cache Manager ==
pub struct CacheManager {
    policy: CachePolicy,
    data: Arc<dyn CacheBackend<Value>>,
    responses: Arc<dyn CacheBackend<CachedResponse>>,
    stats: CacheStats,
    errors: Arc<dyn ErrorTracker>,
    metrics: Arc<dyn MetricsSink>,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager over the given stores, reporting through `tracing`.
    pub fn new(
        policy: CachePolicy,
        data: Arc<dyn CacheBackend<Value>>,
        responses: Arc<dyn CacheBackend<CachedResponse>>,
    ) -> Self {
        Self {
            policy,
            data,
            responses,
            stats: CacheStats::new(),
            errors: Arc::new(TracingMonitor),
            metrics: Arc::new(TracingMonitor),
        }
    }

    /// Creates a manager over fresh unbounded in-memory stores.
    pub fn in_memory(policy: CachePolicy) -> Self {
        Self::new(
            policy,
            Arc::new(DataCache::new()),
            Arc::new(ResponseCache::new()),
        )
    }

    /// Replaces the error tracker.
    pub fn with_error_tracker(mut self, errors: Arc<dyn ErrorTracker>) -> Self {
        self.errors = errors;
        self
    }

    /// Replaces the metrics sink.
    pub fn with_metrics_sink(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // == Get ==
    /// Returns the cached value for `key`, or `None` on a miss, a policy
    /// denial, or any internal failure.
    pub async fn get<T>(&self, key: &str, options: &CacheOptions) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.policy.should_cache(key, options) {
            debug!(key, "get skipped by cache policy");
            return None;
        }

        let cache_id = generate_cache_id();
        let started = Instant::now();

        let result: Result<Option<T>> = async {
            match self.data.get(key).await? {
                Some(value) => Ok(Some(serde_json::from_value(value)?)),
                None => Ok(None),
            }
        }
        .await;

        match result {
            Ok(value) => {
                self.record(Operation::Get, key, value.is_some(), started, cache_id);
                value
            }
            Err(err) => {
                self.report(Operation::Get, key, cache_id, err);
                None
            }
        }
    }

    // == Set ==
    /// Caches `value` under `key`. Returns `true` only if the value was stored.
    ///
    /// When `options.size` is not given, the size of the encoded value is
    /// checked against the policy ceiling instead.
    pub async fn set<T>(&self, key: &str, value: &T, options: &CacheOptions) -> bool
    where
        T: Serialize + ?Sized,
    {
        if !self.policy.should_cache(key, options) {
            debug!(key, "set skipped by cache policy");
            return false;
        }

        let cache_id = generate_cache_id();
        let started = Instant::now();

        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.report(Operation::Set, key, cache_id, err.into());
                return false;
            }
        };

        let size = encoded.to_string().len();
        if !self.policy.should_cache(key, &options.or_size(size)) {
            debug!(key, size, "set skipped: value too large");
            return false;
        }

        match self.data.set(key, encoded, options.ttl).await {
            Ok(()) => {
                self.record(Operation::Set, key, true, started, cache_id);
                true
            }
            Err(err) => {
                self.report(Operation::Set, key, cache_id, err);
                false
            }
        }
    }

    // == Delete ==
    /// Drops `key` from the data cache. Returns whether an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let cache_id = generate_cache_id();
        let started = Instant::now();

        match self.data.delete(key).await {
            Ok(removed) => {
                self.record(Operation::Delete, key, removed, started, cache_id);
                removed
            }
            Err(err) => {
                self.report(Operation::Delete, key, cache_id, err);
                false
            }
        }
    }

    // == Cache Response ==
    /// Stores a handler's response so identical anonymous GETs can be replayed.
    ///
    /// `response` supplies status and headers; `data` is the body as sent.
    pub async fn cache_response(
        &self,
        request: &CacheRequest,
        response: &response::Parts,
        data: Bytes,
        options: &CacheOptions,
    ) -> bool {
        let key = generate_response_cache_key(request);
        if !self.policy.should_cache_response(request) {
            debug!(key = %key, "response not cacheable");
            return false;
        }

        let cache_id = generate_cache_id();
        let started = Instant::now();

        let result: Result<()> = async {
            let entry = CachedResponse::capture(response, data)?;
            self.responses.set(&key, entry, options.ttl).await
        }
        .await;

        match result {
            Ok(()) => {
                self.record(Operation::Response, &key, true, started, cache_id);
                true
            }
            Err(err) => {
                self.report(Operation::Response, &key, cache_id, err);
                false
            }
        }
    }

    // == Get Response ==
    /// Returns a stored response for `request`, or `None`.
    pub async fn get_response(&self, request: &CacheRequest) -> Option<CachedResponse> {
        let key = generate_response_cache_key(request);
        if !self.policy.should_serve_from_cache(request) {
            debug!(key = %key, "client asked to bypass the cache");
            return None;
        }

        let cache_id = generate_cache_id();
        let started = Instant::now();

        match self.responses.get(&key).await {
            Ok(cached) => {
                self.record(Operation::ResponseGet, &key, cached.is_some(), started, cache_id);
                cached
            }
            Err(err) => {
                self.report(Operation::ResponseGet, &key, cache_id, err);
                None
            }
        }
    }

    // == Purge Expired ==
    /// Drops expired entries from both stores. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let cache_id = generate_cache_id();
        let started = Instant::now();

        let result: Result<usize> = async {
            Ok(self.data.purge_expired().await? + self.responses.purge_expired().await?)
        }
        .await;

        match result {
            Ok(removed) => {
                self.record(Operation::Purge, "*", removed > 0, started, cache_id);
                removed
            }
            Err(err) => {
                self.report(Operation::Purge, "*", cache_id, err);
                0
            }
        }
    }

    // == Clear ==
    /// Empties both stores. Called once at shutdown.
    pub async fn clear(&self) {
        let cache_id = generate_cache_id();
        let started = Instant::now();

        let result: Result<()> = async {
            self.data.clear().await?;
            self.responses.clear().await
        }
        .await;

        match result {
            Ok(()) => {
                self.record(Operation::Clear, "*", true, started, cache_id);
                info!("cache cleared");
            }
            Err(err) => self.report(Operation::Clear, "*", cache_id, err),
        }
    }

    // == Stats ==
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn record(
        &self,
        operation: Operation,
        key: &str,
        hit: bool,
        started: Instant,
        cache_id: String,
    ) {
        let metrics = MetricsRecord {
            operation,
            key: key.to_string(),
            hit,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            cache_id,
            timestamp: Utc::now(),
        };

        self.stats.record(&metrics);
        self.metrics.track_cache(&metrics);
        self.metrics.track_stats(&self.stats.snapshot());
    }

    fn report(&self, operation: Operation, key: &str, cache_id: String, error: CacheError) {
        self.stats.record_error();

        let context = ErrorContext {
            component: COMPONENT,
            operation,
            key: key.to_string(),
            cache_id,
        };
        self.errors.track(&error, &context);
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("policy", &self.policy)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::{header, HeaderValue, Response, StatusCode};
    use serde::Deserialize;

    use crate::cache::{Clock, MemoryStore};

    #[derive(Default)]
    struct RecordingMonitor {
        errors: Mutex<Vec<ErrorContext>>,
        metrics: Mutex<Vec<MetricsRecord>>,
    }

    impl ErrorTracker for RecordingMonitor {
        fn track(&self, _error: &CacheError, context: &ErrorContext) {
            self.errors.lock().unwrap().push(context.clone());
        }
    }

    impl MetricsSink for RecordingMonitor {
        fn track_cache(&self, metrics: &MetricsRecord) {
            self.metrics.lock().unwrap().push(metrics.clone());
        }
    }

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl<V: Send + 'static> CacheBackend<V> for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<V>> {
            Err(CacheError::Storage("read failed".to_string()))
        }

        async fn set(&self, _key: &str, _value: V, _ttl: Option<Duration>) -> Result<()> {
            Err(CacheError::Storage("write failed".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<bool> {
            Err(CacheError::Storage("delete failed".to_string()))
        }

        async fn purge_expired(&self) -> Result<usize> {
            Err(CacheError::Storage("purge failed".to_string()))
        }

        async fn clear(&self) -> Result<()> {
            Err(CacheError::Storage("clear failed".to_string()))
        }

        async fn len(&self) -> Result<usize> {
            Err(CacheError::Storage("len failed".to_string()))
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    fn monitored(manager: CacheManager) -> (CacheManager, Arc<RecordingMonitor>) {
        let monitor = Arc::new(RecordingMonitor::default());
        let manager = manager
            .with_error_tracker(monitor.clone())
            .with_metrics_sink(monitor.clone());
        (manager, monitor)
    }

    fn frozen_manager() -> (CacheManager, Clock) {
        let clock = Clock::frozen_at(1_000_000);
        let manager = CacheManager::new(
            CachePolicy::default(),
            Arc::new(MemoryStore::with_clock(clock.clone())),
            Arc::new(MemoryStore::with_clock(clock.clone())),
        );
        (manager, clock)
    }

    fn ok_response() -> response::Parts {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_user_scenario_one_hit_one_miss() {
        let (manager, clock) = frozen_manager();
        let ann = User {
            name: "Ann".to_string(),
        };

        assert!(
            manager
                .set("user:42", &ann, &CacheOptions::with_ttl(Duration::from_millis(1000)))
                .await
        );
        let hit: Option<User> = manager.get("user:42", &CacheOptions::default()).await;
        assert_eq!(hit, Some(ann));

        clock.advance_millis(1001);
        let miss: Option<User> = manager.get("user:42", &CacheOptions::default()).await;
        assert_eq!(miss, None);

        let stats = manager.stats();
        assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
        assert_eq!(stats.hit_rate, Some(0.5));
    }

    #[tokio::test]
    async fn test_deny_list_is_a_full_noop() {
        let (manager, monitor) = monitored(CacheManager::in_memory(CachePolicy::default()));

        assert!(!manager.set("temp:x", &1, &CacheOptions::default()).await);
        let value: Option<i32> = manager.get("temp:x", &CacheOptions::default()).await;

        assert_eq!(value, None);
        assert_eq!(manager.stats().hits + manager.stats().misses, 0);
        assert_eq!(manager.stats().sets, 0);
        assert!(monitor.metrics.lock().unwrap().is_empty());
        assert!(monitor.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_value_not_cached() {
        let policy = CachePolicy::new(Vec::<String>::new(), 8).unwrap();
        let manager = CacheManager::in_memory(policy);

        assert!(!manager.set("k", &"0123456789", &CacheOptions::default()).await);
        assert!(!manager.set("k", &1, &CacheOptions::default().size(9)).await);
        assert!(manager.set("k", &1, &CacheOptions::default()).await);
    }

    #[tokio::test]
    async fn test_set_fault_is_contained_and_reported_once() {
        let (manager, monitor) = monitored(CacheManager::new(
            CachePolicy::default(),
            Arc::new(BrokenStore),
            Arc::new(BrokenStore),
        ));

        assert!(!manager.set("user:1", &"v", &CacheOptions::default()).await);

        let errors = monitor.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].operation, Operation::Set);
        assert_eq!(errors[0].key, "user:1");
        assert_eq!(errors[0].component, "cache-manager");
        assert!(errors[0].cache_id.starts_with("cache_"));
        assert_eq!(manager.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_unserializable_value_is_reported_not_thrown() {
        let (manager, monitor) = monitored(CacheManager::in_memory(CachePolicy::default()));
        // JSON object keys must be strings
        let value: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);

        assert!(!manager.set("grid", &value, &CacheOptions::default()).await);

        let errors = monitor.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].operation, Operation::Set);
        assert_eq!(errors[0].key, "grid");
        assert_eq!(manager.stats().errors, 1);
        assert_eq!(manager.stats().sets, 0);
    }

    #[tokio::test]
    async fn test_every_operation_survives_a_broken_store() {
        let (manager, monitor) = monitored(CacheManager::new(
            CachePolicy::default(),
            Arc::new(BrokenStore),
            Arc::new(BrokenStore),
        ));
        let request = CacheRequest::get("/a");

        let value: Option<String> = manager.get("k", &CacheOptions::default()).await;
        assert_eq!(value, None);
        assert!(!manager.delete("k").await);
        assert!(
            !manager
                .cache_response(&request, &ok_response(), Bytes::new(), &CacheOptions::default())
                .await
        );
        assert_eq!(manager.get_response(&request).await, None);
        assert_eq!(manager.purge_expired().await, 0);
        manager.clear().await;

        assert_eq!(monitor.errors.lock().unwrap().len(), 6);
        assert_eq!(manager.stats().errors, 6);
    }

    #[tokio::test]
    async fn test_decode_failure_reported_as_miss() {
        let (manager, monitor) = monitored(CacheManager::in_memory(CachePolicy::default()));

        assert!(manager.set("n", &"not a number", &CacheOptions::default()).await);
        let value: Option<u32> = manager.get("n", &CacheOptions::default()).await;

        assert_eq!(value, None);
        assert_eq!(monitor.errors.lock().unwrap()[0].operation, Operation::Get);
    }

    #[tokio::test]
    async fn test_response_replay_fidelity() {
        let manager = CacheManager::in_memory(CachePolicy::default());
        let request = CacheRequest::get("/api/items?page=2");
        let body = Bytes::from_static(br#"{"items":[1,2]}"#);

        assert!(
            manager
                .cache_response(&request, &ok_response(), body.clone(), &CacheOptions::default())
                .await
        );

        let cached = manager.get_response(&request).await.unwrap();
        assert_eq!(cached.status, 200);
        assert_eq!(cached.data, body);
        assert_eq!(cached.headers["content-type"], "application/json");
    }

    #[tokio::test]
    async fn test_response_expires_with_ttl() {
        let (manager, clock) = frozen_manager();
        let request = CacheRequest::get("/a");

        manager
            .cache_response(
                &request,
                &ok_response(),
                Bytes::from_static(b"x"),
                &CacheOptions::with_ttl(Duration::from_millis(50)),
            )
            .await;
        clock.advance_millis(51);

        assert_eq!(manager.get_response(&request).await, None);
        assert_eq!(manager.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_authenticated_response_not_stored() {
        let manager = CacheManager::in_memory(CachePolicy::default());
        let request = CacheRequest::get("/me").user("ann");

        assert!(
            !manager
                .cache_response(&request, &ok_response(), Bytes::new(), &CacheOptions::default())
                .await
        );
        assert_eq!(manager.stats().sets, 0);
    }

    #[tokio::test]
    async fn test_no_cache_request_bypasses_stored_response() {
        let manager = CacheManager::in_memory(CachePolicy::default());
        let request = CacheRequest::get("/a");
        manager
            .cache_response(&request, &ok_response(), Bytes::new(), &CacheOptions::default())
            .await;

        let bypass = request
            .clone()
            .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        assert_eq!(manager.get_response(&bypass).await, None);
        assert!(manager.get_response(&request).await.is_some());
    }

    #[tokio::test]
    async fn test_metrics_emitted_per_operation() {
        let (manager, monitor) = monitored(CacheManager::in_memory(CachePolicy::default()));

        manager.set("a", &1, &CacheOptions::default()).await;
        let _: Option<i32> = manager.get("a", &CacheOptions::default()).await;
        let _: Option<i32> = manager.get("b", &CacheOptions::default()).await;

        let metrics = monitor.metrics.lock().unwrap();
        let seen: Vec<(Operation, bool)> = metrics.iter().map(|m| (m.operation, m.hit)).collect();
        assert_eq!(
            seen,
            vec![
                (Operation::Set, true),
                (Operation::Get, true),
                (Operation::Get, false)
            ]
        );
        assert!(metrics.iter().all(|m| m.duration_ms >= 0.0));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let manager = CacheManager::in_memory(CachePolicy::default());

        manager.set("a", &1, &CacheOptions::default()).await;
        manager.set("b", &2, &CacheOptions::default()).await;
        assert!(manager.delete("a").await);
        manager.clear().await;

        let b: Option<i32> = manager.get("b", &CacheOptions::default()).await;
        assert_eq!(b, None);
    }

    #[tokio::test]
    async fn test_purge_expired_spans_both_stores() {
        let (manager, clock) = frozen_manager();
        let short = CacheOptions::with_ttl(Duration::from_millis(10));

        manager.set("a", &1, &short).await;
        manager.set("b", &2, &CacheOptions::default()).await;
        manager
            .cache_response(&CacheRequest::get("/a"), &ok_response(), Bytes::new(), &short)
            .await;
        clock.advance_millis(11);

        assert_eq!(manager.purge_expired().await, 2);
    }
}
