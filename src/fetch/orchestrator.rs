use super::result::{FetchResult, QueryError};
use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::config::{CacheTimeouts, FetchSettings, PlatformConfig};
use crate::platform::{Adapter, NormalizedRecord, QueryKind, Transport};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

type UnitKeys = HashMap<task::Id, (String, QueryKind)>;

/// Results keyed by platform id, then query kind.
pub type AggregateResult = BTreeMap<String, BTreeMap<QueryKind, FetchResult>>;

/// Runs one aggregation pass: cache lookups, bounded concurrent live
/// queries for whatever is missing or expired, and cache write-back.
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore<NormalizedRecord>>,
    clock: Arc<dyn Clock>,
    ttls: CacheTimeouts,
    settings: FetchSettings,
}

struct Unit {
    config: PlatformConfig,
    adapter: Adapter,
    kind: QueryKind,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<CacheStore<NormalizedRecord>>,
        clock: Arc<dyn Clock>,
        ttls: CacheTimeouts,
        settings: FetchSettings,
    ) -> Self {
        Self {
            transport,
            cache,
            clock,
            ttls,
            settings,
        }
    }

    /// Produces exactly one [`FetchResult`] per (platform, kind) for every
    /// platform with a known adapter, then flushes new values to the cache.
    pub async fn aggregate(&self, configs: &[PlatformConfig]) -> AggregateResult {
        let started = self.clock.now();
        let mut results = AggregateResult::new();
        let mut units = Vec::new();

        for config in configs {
            let Some(adapter) = Adapter::for_config(config) else {
                tracing::warn!(
                    platform = %config.id,
                    adapter = %config.adapter_key(),
                    "no adapter for platform, ignoring it"
                );
                continue;
            };

            let per_kind = results.entry(config.id.clone()).or_default();
            if !config.enabled || !adapter.has_credential(config) {
                for kind in adapter.query_kinds() {
                    per_kind.insert(*kind, FetchResult::Skipped);
                }
                continue;
            }

            for kind in adapter.query_kinds() {
                match self.cache.get(&config.id, *kind) {
                    Some(entry) if entry.is_fresh(started) => {
                        tracing::debug!(platform = %config.id, %kind, "cache hit");
                        per_kind.insert(
                            *kind,
                            FetchResult::Fresh {
                                age: entry.age(started),
                                value: entry.value,
                            },
                        );
                    }
                    _ => {
                        // Placeholder until the unit reports back.
                        per_kind.insert(
                            *kind,
                            FetchResult::Unavailable {
                                reason: "query did not complete".to_string(),
                            },
                        );
                        units.push(Unit {
                            config: config.clone(),
                            adapter,
                            kind: *kind,
                        });
                    }
                }
            }
        }

        if units.is_empty() {
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(self.settings.max_workers.max(1)));
        let timeout = self.settings.query_timeout();
        let mut set = JoinSet::new();
        let mut keys = UnitKeys::new();
        for unit in units {
            let semaphore = Arc::clone(&semaphore);
            let transport = Arc::clone(&self.transport);
            let key = (unit.config.id.clone(), unit.kind);
            let handle =
                set.spawn(async move { run_unit(semaphore, transport, &unit, timeout).await });
            keys.insert(handle.id(), key);
        }

        self.collect(set, keys, &mut results).await;
        self.flush_cache().await;
        results
    }

    /// Settles every unit as it finishes. A unit whose task died is keyed
    /// back through its task id and falls back to the cache like any failure.
    async fn collect(
        &self,
        mut set: JoinSet<Result<NormalizedRecord, QueryError>>,
        mut keys: UnitKeys,
        results: &mut AggregateResult,
    ) {
        while let Some(joined) = set.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => {
                    tracing::error!(error = %e, "fetch task failed to join");
                    (e.id(), Err(QueryError::Aborted(e.to_string())))
                }
            };
            let Some((platform, kind)) = keys.remove(&id) else {
                continue;
            };
            let result = self.settle(&platform, kind, outcome);
            results.entry(platform).or_default().insert(kind, result);
        }
    }

    fn settle(
        &self,
        platform: &str,
        kind: QueryKind,
        outcome: Result<NormalizedRecord, QueryError>,
    ) -> FetchResult {
        let now = self.clock.now();
        match outcome {
            Ok(record) => {
                tracing::debug!(platform, %kind, "fetched live");
                self.cache.put(
                    platform,
                    kind,
                    record.clone(),
                    now,
                    self.ttls.ttl_seconds(kind),
                );
                FetchResult::Fresh {
                    value: record,
                    age: Duration::ZERO,
                }
            }
            Err(e) => {
                tracing::error!(platform, %kind, error = %e, "platform query failed");
                match self.cache.get(platform, kind) {
                    Some(entry) => FetchResult::Stale {
                        age: entry.age(now),
                        value: entry.value,
                    },
                    None => FetchResult::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    async fn flush_cache(&self) {
        let cache = Arc::clone(&self.cache);
        match tokio::task::spawn_blocking(move || cache.flush()).await {
            Ok(Ok(written)) => tracing::debug!(written, "cache write-back done"),
            Ok(Err(e)) => tracing::warn!(error = %e, "cache write-back skipped"),
            Err(e) => tracing::warn!(error = %e, "cache write-back task failed"),
        }
    }
}

/// One live query: waits for a worker slot, then runs the blocking HTTP
/// exchange under its own timeout. The slot stays taken until the exchange
/// itself ends, even when the caller has already given up on it.
async fn run_unit(
    semaphore: Arc<Semaphore>,
    transport: Arc<dyn Transport>,
    unit: &Unit,
    timeout: Duration,
) -> Result<NormalizedRecord, QueryError> {
    let permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| QueryError::Aborted(e.to_string()))?;

    let request = unit.adapter.build_request(&unit.config, unit.kind)?;
    let adapter = unit.adapter;
    let kind = unit.kind;
    let platform = unit.config.id.clone();

    let handle = task::spawn_blocking(move || -> Result<NormalizedRecord, QueryError> {
        let _permit = permit;
        let raw = transport.execute(&request)?;
        adapter
            .parse_response(&platform, kind, &raw)
            .map_err(QueryError::from)
    });

    match tokio::time::timeout(timeout, handle).await {
        Err(_) => Err(QueryError::Timeout(timeout)),
        Ok(Err(join_error)) => Err(QueryError::Aborted(join_error.to_string())),
        Ok(Ok(result)) => result,
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
