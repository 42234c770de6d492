//! Closest-pair engine: exhaustive pairwise scan under haversine distance.

use serde::Serialize;

use crate::geo::{haversine_km, Coordinate};
use crate::observer::{NoopObserver, Observer};

/// The winning index pair and its distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosestPair {
    pub first: usize,
    pub second: usize,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClosestPairError {
    #[error("need at least 2 points to compare, got {0}")]
    InsufficientPoints(usize),
}

/// Find the two points with the smallest great-circle distance.
pub fn closest_pair(points: &[Coordinate]) -> Result<ClosestPair, ClosestPairError> {
    closest_pair_with(points, &NoopObserver)
}

/// Like [`closest_pair`], reporting the outcome to `observer`.
///
/// Pairs are visited as `(0,1), (0,2), .., (1,2), ..` and the running best
/// only moves on a strictly smaller distance, so among equal distances the
/// pair with the lowest `first`, then lowest `second`, wins.
pub fn closest_pair_with(
    points: &[Coordinate],
    observer: &dyn Observer,
) -> Result<ClosestPair, ClosestPairError> {
    let n = points.len();
    if n < 2 {
        return Err(ClosestPairError::InsufficientPoints(n));
    }

    let mut best = ClosestPair {
        first: 0,
        second: 1,
        distance_km: haversine_km(&points[0], &points[1]),
    };
    let mut compared = 1usize;

    for i in 0..n {
        for j in (i + 1)..n {
            if (i, j) == (0, 1) {
                continue;
            }
            compared += 1;
            let d = haversine_km(&points[i], &points[j]);
            if d < best.distance_km {
                best = ClosestPair { first: i, second: j, distance_km: d };
            }
        }
    }

    observer.closest_pair_found(&best, compared);
    Ok(best)
}
