//! Food clustering
//!
//! Single pass, first match wins. The merged centroid is the midpoint of the
//! item and the old centroid rather than a weighted mean, so the result
//! depends on input order.

use serde::Serialize;

use crate::bot::constants::nav::{CLUSTER_RADIUS_FACTOR, CLUSTER_WEIGHT_FACTOR};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodCluster {
    pub position: Vec2,
    /// Sum of the sizes of the items merged in
    pub weight: f64,
    /// Bearing from the agent
    pub bearing: f64,
}

impl FoodCluster {
    /// Higher is better: heavy clusters close by
    #[inline]
    pub fn score(&self, origin: Vec2) -> f64 {
        self.weight * CLUSTER_WEIGHT_FACTOR - origin.distance_to(self.position)
    }
}

/// Group food items `(position, size)` seen from `origin` by an agent of `self_size`
pub fn cluster_food(
    items: impl IntoIterator<Item = (Vec2, f64)>,
    origin: Vec2,
    self_size: f64,
) -> Vec<FoodCluster> {
    let reach = self_size * CLUSTER_RADIUS_FACTOR;
    let mut clusters: Vec<FoodCluster> = Vec::new();

    for (position, size) in items {
        match clusters
            .iter_mut()
            .find(|c| position.distance_to(c.position) < reach)
        {
            Some(cluster) => {
                cluster.position = position.midpoint(cluster.position);
                cluster.weight += size;
            }
            None => clusters.push(FoodCluster {
                position,
                weight: size,
                bearing: 0.0,
            }),
        }
    }

    for cluster in &mut clusters {
        cluster.bearing = origin.bearing_to(cluster.position);
    }
    clusters
}

/// Drop clusters within `radius` of any danger centre
pub fn discard_near(clusters: &mut Vec<FoodCluster>, dangers: &[(Vec2, f64)]) {
    clusters.retain(|c| {
        dangers
            .iter()
            .all(|&(centre, radius)| centre.distance_to(c.position) >= radius)
    });
}

/// Highest scoring cluster; the earliest one wins ties
pub fn best_cluster(clusters: &[FoodCluster], origin: Vec2) -> Option<&FoodCluster> {
    let mut best: Option<(&FoodCluster, f64)> = None;
    for cluster in clusters {
        let score = cluster.score(origin);
        if best.map_or(true, |(_, top)| top < score) {
            best = Some((cluster, score));
        }
    }
    best.map(|(cluster, _)| cluster)
}
