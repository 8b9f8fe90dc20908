// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers for integrating 2D precise hit tests with the responder.
//!
//! This adapter is intentionally minimal: it bridges geometry-level
//! [`understory_precise_hit::PreciseHitTest`] implementations with the responder's
//! [`ResolvedHit`] type, without imposing a specific tree or index.

use alloc::vec::Vec;

use kurbo::Point;
use understory_precise_hit::{HitParams, PreciseHitTest};

use crate::types::{DepthKey, Localizer, ResolvedHit};

/// Narrow-phase hit result for a single key.
///
/// The generic `K` is typically your node or widget identifier.
#[derive(Clone, Debug)]
pub struct KeyHit<K> {
    /// The key that was hit (e.g., a `NodeId`).
    pub key: K,
    /// Distance score from the precise hit test.
    pub distance: f64,
}

/// Convert a list of precise key hits into resolver hits for the router.
///
/// This helper is agnostic to any particular tree; it assumes the caller has
/// already performed broad-phase culling and precise tests and simply wants
/// a convenient way to produce `ResolvedHit` values.
pub fn resolved_hits_from_precise<K>(hits: &[KeyHit<K>]) -> Vec<ResolvedHit<K, ()>>
where
    K: Copy,
{
    hits.iter()
        .map(|h| ResolvedHit {
            node: h.key,
            path: None,
            #[allow(
                clippy::cast_possible_truncation,
                reason = "DepthKey uses f32; precision loss is acceptable for hit sorting."
            )]
            depth_key: DepthKey::Distance(h.distance as f32),
            localizer: Localizer::default(),
            meta: (),
        })
        .collect()
}

/// Run precise hit tests for a collection of shaped keys.
///
/// The caller supplies an iterator of `(key, shape)` pairs, where each shape
/// implements [`PreciseHitTest`] in its local coordinate space and the
/// provided `local_point` is already transformed into that space.
pub fn precise_hits_for_point<K, S, I>(
    candidates: I,
    local_point: Point,
    params: HitParams,
) -> Vec<KeyHit<K>>
where
    K: Copy,
    S: PreciseHitTest,
    I: IntoIterator<Item = (K, S)>,
{
    let mut hits = Vec::new();
    for (key, shape) in candidates {
        if let Some(score) = shape.hit_test_local(local_point, &params) {
            hits.push(KeyHit {
                key,
                distance: score.distance,
            });
        }
    }
    hits
}
