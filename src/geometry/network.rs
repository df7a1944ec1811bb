//! geometry/network.rs - Intersection Network Optimizer
//!
//! Resolving every wall pair in a floor plan is quadratic; real plans put
//! most walls nowhere near each other. The optimizer builds an R-tree
//! over wall envelopes, enumerates only the candidate pairs whose boxes
//! touch, classifies each candidate junction, and dispatches to the
//! resolvers through the read-through cache.
//!
//! Walls are visited in sorted-id order so callers that lock per wall
//! never deadlock.

use std::time::Instant;

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::cache::GeometryCache;
use crate::config::OffsetConfig;
use crate::context::OperationContext;
use crate::error::BooleanOpResult;
use crate::geometry::junctions::{classify_junction, JunctionResolution, JunctionResolver};
use crate::geometry::types::{IntersectionKind, Point2D, WallSolid};

/// Outcome of resolving a wall network
#[derive(Debug, Clone)]
pub struct NetworkResult {
    /// One resolution per dispatched junction, cache hits included
    pub resolutions: Vec<JunctionResolution>,
    /// (original − optimized) / original, floored at zero
    pub performance_gain: f64,
    /// Pair checks a naive all-pairs sweep would perform
    pub original_complexity: usize,
    /// Pair checks actually performed after index pruning
    pub optimized_complexity: usize,
    /// Human-readable notes on what the optimizer did
    pub optimizations_applied: Vec<String>,
    pub processing_time_ms: f64,
}

struct WallEnvelope {
    index: usize,
    id: u64,
    corners: ([f64; 2], [f64; 2]),
}

impl RTreeObject for WallEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.corners.0, self.corners.1)
    }
}

/// Batched junction resolution over a wall set
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkOptimizer {
    resolver: JunctionResolver,
}

impl NetworkOptimizer {
    pub fn new(offset_config: OffsetConfig) -> Self {
        Self {
            resolver: JunctionResolver::new(offset_config),
        }
    }

    /// Resolve every junction among `walls`
    ///
    /// Record ids are allocated sequentially from `id_base` for junctions
    /// resolved fresh; cache hits keep their original ids. An empty wall
    /// set is a successful no-op with zero gain.
    pub fn resolve_network(
        &self,
        walls: &[WallSolid],
        cache: &GeometryCache,
        tolerance: f64,
        id_base: u64,
        ctx: &OperationContext,
    ) -> BooleanOpResult<NetworkResult> {
        let start = Instant::now();
        let mut optimizations = Vec::new();

        let n = walls.len();
        let original_complexity = n.saturating_sub(1) * n / 2;
        if n < 2 {
            return Ok(NetworkResult {
                resolutions: Vec::new(),
                performance_gain: 0.0,
                original_complexity,
                optimized_complexity: 0,
                optimizations_applied: optimizations,
                processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            });
        }

        // Envelopes cover the full offset band, not just the baseline, so
        // near-miss junctions still become candidates.
        let envelopes: Vec<WallEnvelope> = walls
            .iter()
            .enumerate()
            .map(|(index, wall)| {
                let bbox = wall.bounding_box().expanded(wall.thickness / 2.0);
                WallEnvelope {
                    index,
                    id: wall.id,
                    corners: ([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]),
                }
            })
            .collect();
        let tree = RTree::bulk_load(
            envelopes
                .iter()
                .map(|e| WallEnvelope {
                    index: e.index,
                    id: e.id,
                    corners: e.corners,
                })
                .collect(),
        );

        // Candidate pairs from envelope queries, deduplicated and sorted
        // by wall id so acquisition order is deterministic.
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for envelope in &envelopes {
            for other in tree.locate_in_envelope_intersecting(&envelope.envelope()) {
                if other.id > envelope.id {
                    candidates.push((envelope.index, other.index));
                }
            }
        }
        candidates.sort_by_key(|&(i, j)| (walls[i].id, walls[j].id));
        candidates.dedup();

        let optimized_complexity = candidates.len();
        if optimized_complexity < original_complexity {
            optimizations.push(format!(
                "spatial index pruned {} of {} candidate pairs",
                original_complexity - optimized_complexity,
                original_complexity
            ));
        }

        let mut resolutions = Vec::new();
        let mut cache_hits = 0usize;
        let mut next_id = id_base;

        for (i, j) in candidates {
            ctx.check()?;
            let a = &walls[i];
            let b = &walls[j];
            let Some(kind) = classify_junction(a, b, tolerance) else {
                continue;
            };

            let meeting = junction_probe_point(a, b);
            let key =
                GeometryCache::intersection_key(&[a.id, b.id], kind, meeting, tolerance);
            if let Some(record) = cache.get_intersection(&key) {
                cache_hits += 1;
                resolutions.push(JunctionResolution {
                    record,
                    miter: None,
                    modified_walls: Vec::new(),
                    warnings: Vec::new(),
                });
                continue;
            }

            let resolution = match kind {
                IntersectionKind::L => self.resolver.resolve_l(next_id, a, b, tolerance)?,
                IntersectionKind::T => {
                    // The branch is the wall that terminates at the
                    // junction; classification guarantees exactly one.
                    let (main, branch) = order_t_pair(a, b, tolerance);
                    self.resolver.resolve_t(next_id, main, branch, tolerance)?
                }
                IntersectionKind::Cross => {
                    self.resolver.resolve_cross(next_id, &[a, b], tolerance)?
                }
                IntersectionKind::ParallelOverlap => {
                    self.resolver.resolve_parallel_overlap(next_id, a, b, tolerance)?
                }
            };
            next_id += 1;

            // Insert under the lookup key so the next identical sweep hits.
            cache.put_intersection(key, resolution.record.clone());
            resolutions.push(resolution);
        }

        if cache_hits > 0 {
            optimizations.push(format!("{cache_hits} junction(s) served from cache"));
        }

        let performance_gain = if original_complexity > 0 {
            original_complexity.saturating_sub(optimized_complexity) as f64
                / original_complexity as f64
        } else {
            0.0
        };

        debug!(
            "network of {n} walls: {} junctions, {cache_hits} cache hits, gain {performance_gain:.2}",
            resolutions.len()
        );

        Ok(NetworkResult {
            resolutions,
            performance_gain,
            original_complexity,
            optimized_complexity,
            optimizations_applied: optimizations,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// A stable probe point for cache keying: where the baselines meet, or
/// the midpoint of the closest approach when they do not
fn junction_probe_point(a: &WallSolid, b: &WallSolid) -> Point2D {
    use crate::geometry::primitives::{curve_intersections, distance};
    let hits = curve_intersections(&a.baseline, &b.baseline, a.baseline.tolerance);
    if let Some(&p) = hits.first() {
        return p;
    }
    let mut best = (a.baseline.start(), b.baseline.start(), f64::INFINITY);
    for p in a.baseline.coords() {
        for q in b.baseline.coords() {
            let d = distance(p, q);
            if d < best.2 {
                best = (p, q, d);
            }
        }
    }
    ((best.0 .0 + best.1 .0) / 2.0, (best.0 .1 + best.1 .1) / 2.0)
}

/// Order a T-junction pair into (main, branch)
fn order_t_pair<'a>(
    a: &'a WallSolid,
    b: &'a WallSolid,
    tolerance: f64,
) -> (&'a WallSolid, &'a WallSolid) {
    use crate::geometry::primitives::{curve_intersections, distance};
    let hits = curve_intersections(&a.baseline, &b.baseline, tolerance);
    let p = hits.first().copied().unwrap_or(b.baseline.start());
    let slack = |w: &WallSolid| (w.thickness / 2.0).max(tolerance * 10.0);
    let b_terminates = distance(b.baseline.start(), p) <= slack(b)
        || distance(b.baseline.end(), p) <= slack(b);
    if b_terminates {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GeometryCache;
    use crate::config::{CacheConfig, OffsetConfig};
    use crate::geometry::offset::{JoinSelection, OffsetEngine};
    use crate::geometry::types::{Curve, JoinType, WallType};

    fn wall(id: u64, coords: &[Point2D]) -> WallSolid {
        let baseline = Curve::polyline(coords, 1e-6).unwrap();
        OffsetEngine::new(OffsetConfig::default())
            .sweep_solid(
                id,
                baseline,
                250.0,
                WallType::Zone,
                JoinSelection::Fixed(JoinType::Miter),
                1e-6,
            )
            .unwrap()
    }

    #[test]
    fn empty_wall_set_is_a_successful_no_op() {
        let optimizer = NetworkOptimizer::new(OffsetConfig::default());
        let cache = GeometryCache::new(CacheConfig::default());
        let result = optimizer
            .resolve_network(&[], &cache, 1e-6, 1, &OperationContext::new())
            .expect("no-op succeeds");
        assert_eq!(result.performance_gain, 0.0);
        assert_eq!(result.original_complexity, 0);
        assert!(result.resolutions.is_empty());
    }

    #[test]
    fn distant_walls_are_pruned_by_the_index() {
        let optimizer = NetworkOptimizer::new(OffsetConfig::default());
        let cache = GeometryCache::new(CacheConfig::default());
        let walls = vec![
            wall(1, &[(0.0, 0.0), (1000.0, 0.0)]),
            wall(2, &[(50_000.0, 50_000.0), (51_000.0, 50_000.0)]),
            wall(3, &[(0.0, 100_000.0), (1000.0, 100_000.0)]),
        ];
        let result = optimizer
            .resolve_network(&walls, &cache, 1e-6, 1, &OperationContext::new())
            .expect("resolution succeeds");
        assert_eq!(result.original_complexity, 3);
        assert_eq!(result.optimized_complexity, 0);
        assert!(result.performance_gain > 0.99);
        assert!(result.resolutions.is_empty());
    }

    #[test]
    fn t_network_resolves_and_caches() {
        let optimizer = NetworkOptimizer::new(OffsetConfig::default());
        let cache = GeometryCache::new(CacheConfig::default());
        let walls = vec![
            wall(1, &[(0.0, 0.0), (2000.0, 0.0)]),
            wall(2, &[(1000.0, 0.0), (1000.0, 1000.0)]),
        ];

        let first = optimizer
            .resolve_network(&walls, &cache, 1e-6, 1, &OperationContext::new())
            .expect("resolution succeeds");
        assert_eq!(first.resolutions.len(), 1);
        assert_eq!(first.resolutions[0].record.kind, IntersectionKind::T);

        // Identical inputs: the second pass is served from the cache.
        let stats_before = cache.statistics().unwrap();
        let second = optimizer
            .resolve_network(&walls, &cache, 1e-6, 10, &OperationContext::new())
            .expect("resolution succeeds");
        let stats_after = cache.statistics().unwrap();
        assert_eq!(second.resolutions.len(), 1);
        assert!(second.resolutions[0].record.is_cached());
        assert_eq!(stats_after.hits, stats_before.hits + 1);
        assert!(second
            .optimizations_applied
            .iter()
            .any(|o| o.contains("cache")));
    }

    #[test]
    fn cancelled_context_stops_the_sweep() {
        let optimizer = NetworkOptimizer::new(OffsetConfig::default());
        let cache = GeometryCache::new(CacheConfig::default());
        let walls = vec![
            wall(1, &[(0.0, 0.0), (2000.0, 0.0)]),
            wall(2, &[(1000.0, 0.0), (1000.0, 1000.0)]),
        ];
        let ctx = OperationContext::new();
        ctx.cancel();
        let result = optimizer.resolve_network(&walls, &cache, 1e-6, 1, &ctx);
        assert!(result.is_err());
    }
}
