//! R-tree over storm coordinates for candidate lookup.
//!
//! The tree works on raw `[lat, lon]` pairs with a squared Euclidean metric,
//! so the distance it reports is in coordinate degrees and is only good for
//! picking a candidate. Longitude wrap-around and meridian convergence are
//! not modelled; the matcher re-checks every candidate geodesically.

use firestorm_core::{GeoPoint, StormRecord};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A coordinate with its row position for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lon: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlon = self.lon - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Nearest point returned by [`GeoIndex::nearest_one`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the slice the index was built from.
    pub index: usize,
    /// Euclidean distance in degrees. Not kilometres.
    pub planar_distance: f64,
}

/// Immutable nearest-neighbour index, bulk-loaded once.
#[derive(Debug)]
pub struct GeoIndex {
    tree: RTree<IndexedPoint>,
}

impl GeoIndex {
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let indexed: Vec<IndexedPoint> = points
            .into_iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint {
                idx,
                lat: p.lat,
                lon: p.lon,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn from_storms(storms: &[StormRecord]) -> Self {
        Self::build(storms.iter().map(|s| s.position))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest indexed point to `(lat, lon)`, or `None` when the index is empty.
    pub fn nearest_one(&self, lat: f64, lon: f64) -> Option<Neighbor> {
        let query = [lat, lon];
        self.tree.nearest_neighbor(&query).map(|p| Neighbor {
            index: p.idx,
            planar_distance: p.distance_2(&query).sqrt(),
        })
    }
}
