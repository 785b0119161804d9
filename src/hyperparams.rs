//! Hyperparameters of the clustering engine

use crate::error::ParamsError;
use crate::init::KMeansInit;

/// Validated hyperparameters for a k-means fit.
///
/// Obtained from [`KMeansParams::check`]; every field is guaranteed usable.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansValidParams {
    /// Number of groups to partition the records into.
    n_clusters: usize,
    /// Number of independent restarts; the one with the lowest inertia wins.
    n_runs: usize,
    /// A run stops early once the total squared shift of the centroids
    /// between two iterations is at most `tolerance`.
    tolerance: f64,
    /// A run stops after `max_n_iterations` update steps even if the
    /// assignments are still changing.
    max_n_iterations: u64,
    /// Centroid initialization strategy.
    init: KMeansInit,
    /// Seed of the generator driving initialization. Every fit builds its
    /// own generator from it, so a fit never depends on outside state.
    seed: u64,
    /// Turn an iteration-cap stop into an error instead of a best-effort result.
    require_convergence: bool,
}

/// Builder for [`KMeansValidParams`]
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansParams(KMeansValidParams);

impl KMeansParams {
    /// Configure a fit looking for `n_clusters` groups.
    ///
    /// Defaults:
    /// * `n_runs = 10`
    /// * `tolerance = 1e-4`
    /// * `max_n_iterations = 300`
    /// * `init = KMeansPlusPlus`
    /// * `seed = 42`
    /// * `require_convergence = false`
    pub fn new(n_clusters: usize) -> Self {
        Self(KMeansValidParams {
            n_clusters,
            n_runs: 10,
            tolerance: 1e-4,
            max_n_iterations: 300,
            init: KMeansInit::KMeansPlusPlus,
            seed: 42,
            require_convergence: false,
        })
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    pub fn init_method(mut self, init: KMeansInit) -> Self {
        self.0.init = init;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn require_convergence(mut self, require_convergence: bool) -> Self {
        self.0.require_convergence = require_convergence;
        self
    }

    pub fn check_ref(&self) -> Result<&KMeansValidParams, ParamsError> {
        if self.0.n_clusters == 0 {
            Err(ParamsError::NClusters)
        } else if self.0.n_runs == 0 {
            Err(ParamsError::NRuns)
        } else if !(self.0.tolerance > 0.0) {
            Err(ParamsError::Tolerance)
        } else if self.0.max_n_iterations == 0 {
            Err(ParamsError::MaxIterations)
        } else {
            Ok(&self.0)
        }
    }

    pub fn check(self) -> Result<KMeansValidParams, ParamsError> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl KMeansValidParams {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    pub fn init_method(&self) -> KMeansInit {
        self.init
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn require_convergence(&self) -> bool {
        self.require_convergence
    }

    /// Same parameters with a different group count
    pub fn with_n_clusters(&self, n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<KMeansParams>();
        has_autotraits::<KMeansValidParams>();
    }

    #[test]
    fn n_clusters_cannot_be_zero() {
        let res = KMeansParams::new(0).check();
        assert_eq!(res, Err(ParamsError::NClusters));
    }

    #[test]
    fn tolerance_has_to_be_positive() {
        assert_eq!(
            KMeansParams::new(2).tolerance(-1.).check(),
            Err(ParamsError::Tolerance)
        );
        assert_eq!(
            KMeansParams::new(2).tolerance(0.).check(),
            Err(ParamsError::Tolerance)
        );
        assert_eq!(
            KMeansParams::new(2).tolerance(f64::NAN).check(),
            Err(ParamsError::Tolerance)
        );
    }

    #[test]
    fn max_n_iterations_cannot_be_zero() {
        let res = KMeansParams::new(2).max_n_iterations(0).check();
        assert_eq!(res, Err(ParamsError::MaxIterations));
    }

    #[test]
    fn n_runs_cannot_be_zero() {
        let res = KMeansParams::new(2).n_runs(0).check();
        assert_eq!(res, Err(ParamsError::NRuns));
    }

    #[test]
    fn with_n_clusters_keeps_other_fields() {
        let params = KMeansParams::new(2).seed(7).n_runs(3).check().unwrap();
        let other = params.with_n_clusters(5);
        assert_eq!(other.n_clusters(), 5);
        assert_eq!(other.seed(), 7);
        assert_eq!(other.n_runs(), 3);
    }
}
