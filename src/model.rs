//! K-Means clustering engine and fitted model

use crate::error::{Result, SegmentationError};
use crate::hyperparams::{KMeansParams, KMeansValidParams};
use crate::partition::Partition;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use tracing::{debug, warn};

/// Fitted K-Means model
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansModel {
    /// Group centroids in standardized space, one row per group
    centroids: Array2<f64>,
    /// Group assignment of every training record
    partition: Partition,
    /// Within-group sum of squared distances to the centroids
    inertia: f64,
    /// Update steps performed by the winning run
    n_iterations: u64,
    /// Whether the winning run stopped before the iteration cap
    converged: bool,
}

impl KMeansModel {
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn into_partition(self) -> Partition {
        self.partition
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn n_iterations(&self) -> u64 {
        self.n_iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.partition.group_sizes()
    }

    /// Nearest centroid of one standardized feature vector
    pub fn predict_one(&self, features: &ArrayView1<'_, f64>) -> Result<usize> {
        if features.len() != self.centroids.ncols() {
            return Err(SegmentationError::Schema(format!(
                "feature vector must have exactly {} dimensions, got {}",
                self.centroids.ncols(),
                features.len()
            )));
        }
        Ok(closest_centroid(&self.centroids, features))
    }

    /// Nearest centroid of every standardized row
    pub fn predict(&self, observations: &ArrayView2<'_, f64>) -> Result<Array1<usize>> {
        if observations.ncols() != self.centroids.ncols() {
            return Err(SegmentationError::Schema(format!(
                "observations must have exactly {} columns, got {}",
                self.centroids.ncols(),
                observations.ncols()
            )));
        }
        Ok(assign(observations, &self.centroids))
    }
}

impl KMeansParams {
    /// Validate the parameters, then fit
    pub fn fit(self, observations: &ArrayView2<'_, f64>) -> Result<KMeansModel> {
        self.check()?.fit(observations)
    }
}

impl KMeansValidParams {
    /// Partition `observations` into `n_clusters` non-empty groups.
    ///
    /// Runs `n_runs` restarts from a generator seeded with `seed` and keeps the
    /// lowest-inertia one (the earliest on ties). Identical inputs always give
    /// an identical model. Hitting the iteration cap returns the partition
    /// reached so far with `converged() == false`, unless
    /// `require_convergence` is set, in which case it is an error.
    pub fn fit(&self, observations: &ArrayView2<'_, f64>) -> Result<KMeansModel> {
        let n_records = observations.nrows();
        let k = self.n_clusters();
        if n_records < k {
            return Err(SegmentationError::InsufficientData {
                records: n_records,
                required: k,
            });
        }

        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed());
        let mut best: Option<KMeansModel> = None;
        for run in 0..self.n_runs() {
            let model = self.fit_once(observations, &mut rng);
            debug!(
                k,
                run,
                inertia = model.inertia,
                n_iterations = model.n_iterations,
                converged = model.converged,
                "k-means run finished"
            );
            if best.as_ref().map_or(true, |b| model.inertia < b.inertia) {
                best = Some(model);
            }
        }

        let best = best.ok_or(crate::error::ParamsError::NRuns)?;
        if !best.converged {
            if self.require_convergence() {
                return Err(SegmentationError::Convergence {
                    k,
                    iterations: self.max_n_iterations(),
                });
            }
            warn!(
                k,
                max_n_iterations = self.max_n_iterations(),
                "k-means stopped at the iteration cap, keeping the current partition"
            );
        }
        Ok(best)
    }

    fn fit_once(&self, observations: &ArrayView2<'_, f64>, rng: &mut impl Rng) -> KMeansModel {
        let k = self.n_clusters();
        let mut centroids = self.init_method().run(k, observations, rng);
        let mut memberships = assign(observations, &centroids);
        fill_empty_groups(observations, &mut centroids, &mut memberships);

        let mut n_iterations = 0;
        let mut converged = false;
        while n_iterations < self.max_n_iterations() {
            n_iterations += 1;
            let updated = compute_centroids(observations, &memberships, &centroids);
            let shift = centroid_shift(&centroids, &updated);
            centroids = updated;

            let mut next = assign(observations, &centroids);
            fill_empty_groups(observations, &mut centroids, &mut next);
            let stable = next == memberships;
            memberships = next;
            if stable || shift <= self.tolerance() {
                converged = true;
                break;
            }
        }

        // `memberships` is the nearest-centroid assignment against `centroids`
        let inertia = compute_inertia(observations, &memberships, &centroids);
        KMeansModel {
            centroids,
            partition: Partition::from_labels(memberships, k),
            inertia,
            n_iterations,
            converged,
        }
    }
}

/// Index of the nearest centroid; the lowest index wins ties
pub(crate) fn closest_centroid(
    centroids: &Array2<f64>,
    observation: &ArrayView1<'_, f64>,
) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut closest = 0;
    for (idx, centroid) in centroids.outer_iter().enumerate() {
        let distance = squared_distance(observation, &centroid);
        if distance < min_distance {
            min_distance = distance;
            closest = idx;
        }
    }
    closest
}

fn assign(observations: &ArrayView2<'_, f64>, centroids: &Array2<f64>) -> Array1<usize> {
    observations
        .outer_iter()
        .map(|observation| closest_centroid(centroids, &observation))
        .collect()
}

/// Move records into empty groups until every group has a member.
///
/// Each empty group takes the record farthest from its own centroid among
/// groups that keep at least one member, and is re-centred on it.
fn fill_empty_groups(
    observations: &ArrayView2<'_, f64>,
    centroids: &mut Array2<f64>,
    memberships: &mut Array1<usize>,
) {
    let k = centroids.nrows();
    loop {
        let mut sizes = vec![0usize; k];
        for &label in memberships.iter() {
            sizes[label] += 1;
        }
        let Some(empty) = sizes.iter().position(|&size| size == 0) else {
            break;
        };

        let mut donor: Option<(usize, f64)> = None;
        for (idx, observation) in observations.outer_iter().enumerate() {
            let label = memberships[idx];
            if sizes[label] < 2 {
                continue;
            }
            let distance = squared_distance(&observation, &centroids.row(label));
            if donor.map_or(true, |(_, best)| distance > best) {
                donor = Some((idx, distance));
            }
        }
        // Unreachable while there are at least as many records as groups
        let Some((donor, _)) = donor else {
            break;
        };

        warn!(group = empty, record = donor, "empty group reseeded with farthest record");
        memberships[donor] = empty;
        centroids.row_mut(empty).assign(&observations.row(donor));
    }
}

/// Mean of each group's members; a group without members keeps its previous centroid
fn compute_centroids(
    observations: &ArrayView2<'_, f64>,
    memberships: &Array1<usize>,
    previous: &Array2<f64>,
) -> Array2<f64> {
    let mut sums = Array2::zeros(previous.raw_dim());
    let mut counts = vec![0usize; previous.nrows()];
    for (observation, &label) in observations.outer_iter().zip(memberships.iter()) {
        let mut sum = sums.row_mut(label);
        sum += &observation;
        counts[label] += 1;
    }
    for (group, &count) in counts.iter().enumerate() {
        if count > 0 {
            sums.row_mut(group).mapv_inplace(|v| v / count as f64);
        } else {
            sums.row_mut(group).assign(&previous.row(group));
        }
    }
    sums
}

/// Total squared movement of the centroids
fn centroid_shift(old: &Array2<f64>, new: &Array2<f64>) -> f64 {
    old.iter().zip(new.iter()).map(|(a, b)| (a - b).powi(2)).sum()
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(
    observations: &ArrayView2<'_, f64>,
    memberships: &Array1<usize>,
    centroids: &Array2<f64>,
) -> f64 {
    observations
        .outer_iter()
        .zip(memberships.iter())
        .map(|(observation, &label)| squared_distance(&observation, &centroids.row(label)))
        .sum()
}

pub(crate) fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Calculate Euclidean distance between two points
pub(crate) fn euclidean_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    squared_distance(a, b).sqrt()
}
