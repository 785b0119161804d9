//! Centroid initialization strategies

use crate::model::squared_distance;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// How the first set of centroids is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KMeansInit {
    /// `k` distinct records sampled uniformly
    Random,
    /// k-means++: each further centroid is sampled with probability
    /// proportional to its squared distance to the closest chosen centroid
    #[default]
    KMeansPlusPlus,
}

impl KMeansInit {
    pub(crate) fn run(
        &self,
        n_clusters: usize,
        observations: &ArrayView2<'_, f64>,
        rng: &mut impl Rng,
    ) -> Array2<f64> {
        match self {
            Self::Random => random_init(n_clusters, observations, rng),
            Self::KMeansPlusPlus => k_means_pp(n_clusters, observations, rng),
        }
    }
}

fn random_init(
    n_clusters: usize,
    observations: &ArrayView2<'_, f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let indices = rand::seq::index::sample(rng, observations.nrows(), n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

fn k_means_pp(
    n_clusters: usize,
    observations: &ArrayView2<'_, f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));
    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(first));

    let mut dists = Array1::from_elem(n_samples, f64::INFINITY);
    for c_cnt in 1..n_clusters {
        let latest = centroids.row(c_cnt - 1);
        for (observation, dist) in observations.outer_iter().zip(dists.iter_mut()) {
            *dist = dist.min(squared_distance(&observation, &latest));
        }
        // All weights are zero when every record coincides with a chosen centroid
        let centroid_idx = match WeightedIndex::<f64>::new(dists.iter()) {
            Ok(weights) => weights.sample(rng),
            Err(_) => rng.gen_range(0..n_samples),
        };
        centroids
            .row_mut(c_cnt)
            .assign(&observations.row(centroid_idx));
    }
    centroids
}
