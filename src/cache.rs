//! cache.rs - Intersection and Miter Cache
//!
//! Junction resolution is the most expensive step of the pipeline and the
//! most repetitive: dragging a wall re-resolves the same junctions with
//! identical inputs many times per second. This cache keys resolved
//! intersection records and miter calculations on the exact inputs and
//! serves repeats without touching the geometry kernels.
//!
//! Keys are deterministic strings built from the sorted wall ids, the
//! junction kind, a 6-decimal quantization of the intersection point, and
//! the tolerance in 2-digit exponential form. Eviction combines recency,
//! frequency, and age; expiry is enforced by a sweeper thread owned by
//! the cache and stopped on drop.
//!
//! This is the only shared-mutable component in the core. All state sits
//! behind one read-write lock; entries cross the boundary by value.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::CacheConfig;
use crate::geometry::types::{
    IntersectionKind, IntersectionRecord, IntersectionState, MiterCalculation, Point2D,
};

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    /// hits / (hits + misses); 0 when nothing was looked up yet
    pub hit_rate: f64,
    pub entry_count: usize,
    pub memory_estimate_bytes: usize,
    /// Age of the oldest entry in milliseconds
    pub oldest_entry_age_ms: u64,
    /// Age of the newest entry in milliseconds
    pub newest_entry_age_ms: u64,
}

struct CacheEntry<T> {
    value: T,
    created: Instant,
    last_access: Instant,
    access_count: u64,
    size_bytes: usize,
}

impl<T> CacheEntry<T> {
    fn new(value: T, size_bytes: usize) -> Self {
        let now = Instant::now();
        Self {
            value,
            created: now,
            last_access: now,
            access_count: 0,
            size_bytes,
        }
    }

    /// Retention-weighted staleness: high for stale, old, rarely used
    /// entries. Highest-scoring entries are evicted first.
    fn eviction_score(&self, now: Instant) -> f64 {
        let idle_seconds = now.duration_since(self.last_access).as_secs_f64();
        let age_ms = now.duration_since(self.created).as_millis() as f64;
        let age_hours = (age_ms / 3_600_000.0).max(1.0 / 3600.0);
        let accesses_per_hour = self.access_count as f64 / age_hours;
        idle_seconds - 100.0 * accesses_per_hour + age_ms / 10_000.0
    }
}

#[derive(Default)]
struct CacheMaps {
    intersections: HashMap<String, CacheEntry<IntersectionRecord>>,
    miters: HashMap<String, CacheEntry<MiterCalculation>>,
    hits: u64,
    misses: u64,
}

impl CacheMaps {
    fn entry_count(&self) -> usize {
        self.intersections.len() + self.miters.len()
    }

    fn memory_estimate(&self) -> usize {
        self.intersections
            .values()
            .map(|e| e.size_bytes)
            .chain(self.miters.values().map(|e| e.size_bytes))
            .sum()
    }
}

/// Keyed store for junction and miter results
///
/// TTL plus size-bounded eviction plus a memory budget; see the module
/// docs for the policy. Share across threads via `Arc`.
pub struct GeometryCache {
    maps: Arc<RwLock<CacheMaps>>,
    config: CacheConfig,
    stop: Arc<AtomicBool>,
    sweeper: Option<JoinHandle<()>>,
}

impl GeometryCache {
    /// Create a cache and start its sweeper thread
    pub fn new(config: CacheConfig) -> Self {
        let maps = Arc::new(RwLock::new(CacheMaps::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let sweeper = {
            let maps = Arc::clone(&maps);
            let stop = Arc::clone(&stop);
            let ttl = Duration::from_secs(config.ttl_minutes * 60);
            let interval = Duration::from_secs(config.cleanup_interval_minutes * 60);
            Some(std::thread::spawn(move || {
                let tick = Duration::from_millis(50);
                let mut waited = Duration::ZERO;
                loop {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    std::thread::sleep(tick);
                    waited += tick;
                    if waited >= interval {
                        waited = Duration::ZERO;
                        sweep_expired_maps(&maps, ttl);
                    }
                }
            }))
        };

        Self {
            maps,
            config,
            stop,
            sweeper,
        }
    }

    /// Deterministic key for an intersection record
    pub fn intersection_key(
        wall_ids: &[u64],
        kind: IntersectionKind,
        point: Point2D,
        tolerance: f64,
    ) -> String {
        let mut ids = wall_ids.to_vec();
        ids.sort_unstable();
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("-");
        format!(
            "{ids}|{kind:?}|{:.6},{:.6}|{:.2e}",
            point.0, point.1, tolerance
        )
    }

    /// Deterministic key for a miter calculation
    pub fn miter_key(wall_ids: &[u64], apex_hint: Point2D, tolerance: f64) -> String {
        let mut ids = wall_ids.to_vec();
        ids.sort_unstable();
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("-");
        format!(
            "{ids}|miter|{:.6},{:.6}|{:.2e}",
            apex_hint.0, apex_hint.1, tolerance
        )
    }

    /// Look up an intersection record
    pub fn get_intersection(&self, key: &str) -> Option<IntersectionRecord> {
        let mut maps = self.maps.write().expect("cache lock poisoned");
        let hit = if let Some(entry) = maps.intersections.get_mut(key) {
            entry.last_access = Instant::now();
            entry.access_count += 1;
            Some(entry.value.clone())
        } else {
            None
        };
        if self.config.enable_statistics {
            if hit.is_some() {
                maps.hits += 1;
            } else {
                maps.misses += 1;
            }
        }
        trace!("cache {} for {key}", if hit.is_some() { "hit" } else { "miss" });
        hit
    }

    /// Insert an intersection record, marking it cached
    pub fn put_intersection(&self, key: String, mut record: IntersectionRecord) {
        record.state = IntersectionState::Cached;
        let size = estimate_record_size(&key, &record);
        let mut maps = self.maps.write().expect("cache lock poisoned");
        maps.intersections.insert(key, CacheEntry::new(record, size));
        self.evict_if_needed(&mut maps);
    }

    /// Look up a miter calculation
    pub fn get_miter(&self, key: &str) -> Option<MiterCalculation> {
        let mut maps = self.maps.write().expect("cache lock poisoned");
        let hit = if let Some(entry) = maps.miters.get_mut(key) {
            entry.last_access = Instant::now();
            entry.access_count += 1;
            Some(entry.value)
        } else {
            None
        };
        if self.config.enable_statistics {
            if hit.is_some() {
                maps.hits += 1;
            } else {
                maps.misses += 1;
            }
        }
        hit
    }

    /// Insert a miter calculation
    pub fn put_miter(&self, key: String, miter: MiterCalculation) {
        let size = 96 + key.len();
        let mut maps = self.maps.write().expect("cache lock poisoned");
        maps.miters.insert(key, CacheEntry::new(miter, size));
        self.evict_if_needed(&mut maps);
    }

    /// Drop every record referencing the given wall
    ///
    /// Called on wall mutation and deletion; invalidated junction results
    /// must never be served again.
    pub fn invalidate_wall(&self, wall_id: u64) {
        let mut maps = self.maps.write().expect("cache lock poisoned");
        maps.intersections
            .retain(|_, entry| !entry.value.wall_ids.contains(&wall_id));
    }

    /// Drop records in the `Invalidated` state
    pub fn drop_invalidated(&self) {
        let mut maps = self.maps.write().expect("cache lock poisoned");
        maps.intersections
            .retain(|_, entry| entry.value.state != IntersectionState::Invalidated);
    }

    /// Remove everything, keeping statistics counters
    pub fn clear(&self) {
        let mut maps = self.maps.write().expect("cache lock poisoned");
        maps.intersections.clear();
        maps.miters.clear();
    }

    /// Remove entries older than the TTL immediately
    pub fn sweep_expired(&self) {
        let ttl = Duration::from_secs(self.config.ttl_minutes * 60);
        sweep_expired_maps(&self.maps, ttl);
    }

    pub fn entry_count(&self) -> usize {
        self.maps.read().expect("cache lock poisoned").entry_count()
    }

    /// Current statistics; `None` when statistics are disabled
    pub fn statistics(&self) -> Option<CacheStatistics> {
        if !self.config.enable_statistics {
            return None;
        }
        let maps = self.maps.read().expect("cache lock poisoned");
        let now = Instant::now();
        let ages: Vec<u64> = maps
            .intersections
            .values()
            .map(|e| e.created)
            .chain(maps.miters.values().map(|e| e.created))
            .map(|created| now.duration_since(created).as_millis() as u64)
            .collect();
        let total = maps.hits + maps.misses;
        Some(CacheStatistics {
            hits: maps.hits,
            misses: maps.misses,
            hit_rate: if total > 0 {
                maps.hits as f64 / total as f64
            } else {
                0.0
            },
            entry_count: maps.entry_count(),
            memory_estimate_bytes: maps.memory_estimate(),
            oldest_entry_age_ms: ages.iter().copied().max().unwrap_or(0),
            newest_entry_age_ms: ages.iter().copied().min().unwrap_or(0),
        })
    }

    fn evict_if_needed(&self, maps: &mut CacheMaps) {
        let memory_budget = self.config.max_memory_mb * 1024 * 1024;
        if maps.entry_count() < self.config.max_entries
            && maps.memory_estimate() < memory_budget
        {
            return;
        }
        // Evict a tenth of the population per trigger so bursts of
        // inserts do not thrash the maps one entry at a time.
        let target = (self.config.max_entries / 10).max(1);
        let now = Instant::now();

        let mut scored: Vec<(f64, bool, String)> = maps
            .intersections
            .iter()
            .map(|(k, e)| (e.eviction_score(now), true, k.clone()))
            .chain(
                maps.miters
                    .iter()
                    .map(|(k, e)| (e.eviction_score(now), false, k.clone())),
            )
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        for (_, is_intersection, key) in scored.into_iter().take(target) {
            if is_intersection {
                maps.intersections.remove(&key);
            } else {
                maps.miters.remove(&key);
            }
        }
        debug!(
            "cache evicted down to {} entries / {} bytes",
            maps.entry_count(),
            maps.memory_estimate()
        );
    }
}

impl Drop for GeometryCache {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.sweeper.take() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for GeometryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryCache")
            .field("entry_count", &self.entry_count())
            .field("config", &self.config)
            .finish()
    }
}

fn sweep_expired_maps(maps: &Arc<RwLock<CacheMaps>>, ttl: Duration) {
    let Ok(mut maps) = maps.write() else {
        return;
    };
    let now = Instant::now();
    let before = maps.entry_count();
    maps.intersections
        .retain(|_, entry| now.duration_since(entry.created) < ttl);
    maps.miters
        .retain(|_, entry| now.duration_since(entry.created) < ttl);
    let removed = before - maps.entry_count();
    if removed > 0 {
        debug!("cache sweeper removed {removed} expired entries");
    }
}

fn estimate_record_size(key: &str, record: &IntersectionRecord) -> usize {
    let coords: usize = record
        .resolved_geometry
        .iter()
        .map(|p| {
            p.outer.points.len() + p.holes.iter().map(|h| h.points.len()).sum::<usize>()
        })
        .sum();
    192 + key.len()
        + record.wall_ids.len() * 8
        + record.offset_intersections.len() * 16
        + coords * 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::types::ResolutionMethod;

    fn record(id: u64, wall_ids: &[u64]) -> IntersectionRecord {
        IntersectionRecord {
            id,
            kind: IntersectionKind::T,
            wall_ids: wall_ids.to_vec(),
            intersection_point: (1000.0, 0.0),
            miter_apex: Some((1000.0, 125.0)),
            offset_intersections: vec![(875.0, 125.0), (1125.0, 125.0)],
            resolved_geometry: Vec::new(),
            method: ResolutionMethod::ExactGeometric,
            accuracy: 0.95,
            state: IntersectionState::Validated,
        }
    }

    fn small_cache(max_entries: usize) -> GeometryCache {
        GeometryCache::new(CacheConfig {
            max_entries,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn keys_are_deterministic_and_order_insensitive() {
        let a = GeometryCache::intersection_key(&[2, 1], IntersectionKind::T, (1000.0, 0.0), 1e-6);
        let b = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (1000.0, 0.0), 1e-6);
        assert_eq!(a, b);
        assert!(a.contains("1-2"));
        assert!(a.contains("1000.000000"));
    }

    #[test]
    fn put_then_get_round_trips_until_clear() {
        let cache = small_cache(100);
        let key = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (0.0, 0.0), 1e-6);
        cache.put_intersection(key.clone(), record(1, &[1, 2]));

        let fetched = cache.get_intersection(&key).expect("hit");
        assert_eq!(fetched.id, 1);
        assert!(fetched.is_cached());

        cache.clear();
        assert!(cache.get_intersection(&key).is_none());
    }

    #[test]
    fn statistics_track_hits_and_misses() {
        let cache = small_cache(100);
        let key = GeometryCache::intersection_key(&[1, 2], IntersectionKind::L, (5.0, 5.0), 1e-6);
        assert!(cache.get_intersection(&key).is_none());
        cache.put_intersection(key.clone(), record(2, &[1, 2]));
        assert!(cache.get_intersection(&key).is_some());

        let stats = cache.statistics().expect("statistics enabled");
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.entry_count, 1);
        assert!(stats.memory_estimate_bytes > 0);
    }

    #[test]
    fn statistics_can_be_disabled() {
        let cache = GeometryCache::new(CacheConfig {
            enable_statistics: false,
            ..CacheConfig::default()
        });
        assert!(cache.statistics().is_none());
    }

    #[test]
    fn entry_cap_triggers_eviction() {
        let cache = small_cache(10);
        for i in 0..25u64 {
            let key = GeometryCache::intersection_key(
                &[i, i + 1],
                IntersectionKind::T,
                (i as f64, 0.0),
                1e-6,
            );
            cache.put_intersection(key, record(i, &[i, i + 1]));
        }
        assert!(cache.entry_count() <= 10);
    }

    #[test]
    fn wall_invalidation_drops_only_its_records() {
        let cache = small_cache(100);
        let key_a = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (0.0, 0.0), 1e-6);
        let key_b = GeometryCache::intersection_key(&[3, 4], IntersectionKind::T, (9.0, 9.0), 1e-6);
        cache.put_intersection(key_a.clone(), record(1, &[1, 2]));
        cache.put_intersection(key_b.clone(), record(2, &[3, 4]));

        cache.invalidate_wall(2);
        assert!(cache.get_intersection(&key_a).is_none());
        assert!(cache.get_intersection(&key_b).is_some());
    }
}
