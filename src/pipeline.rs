//! End-to-end segmentation run: standardize, select k, cluster, profile

use crate::analysis::{analyze, GroupSummary};
use crate::data::Dataset;
use crate::error::{ParamsError, Result};
use crate::hyperparams::KMeansParams;
use crate::init::KMeansInit;
use crate::partition::Partition;
use crate::scaling::StandardScaler;
use crate::selection::{ClusterCountSelector, Selection};
use serde::Serialize;
use tracing::info;

/// Unchecked pipeline configuration.
///
/// Defaults: candidates `2..=9`, seed `42`, `n_runs = 10`,
/// `max_n_iterations = 300`, `tolerance = 1e-4`, k-means++ initialization,
/// best-effort convergence, sequential selection.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationParams {
    k_min: usize,
    k_max: usize,
    kmeans: KMeansParams,
    parallel: bool,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            k_min: 2,
            k_max: 9,
            kmeans: KMeansParams::new(2),
            parallel: false,
        }
    }
}

impl SegmentationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate group counts, both ends included
    pub fn k_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.kmeans = self.kmeans.seed(seed);
        self
    }

    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.kmeans = self.kmeans.n_runs(n_runs);
        self
    }

    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.kmeans = self.kmeans.max_n_iterations(max_n_iterations);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.kmeans = self.kmeans.tolerance(tolerance);
        self
    }

    pub fn init_method(mut self, init: KMeansInit) -> Self {
        self.kmeans = self.kmeans.init_method(init);
        self
    }

    pub fn require_convergence(mut self, require_convergence: bool) -> Self {
        self.kmeans = self.kmeans.require_convergence(require_convergence);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn check(self) -> std::result::Result<Segmentation, ParamsError> {
        let kmeans = self.kmeans.check()?.with_n_clusters(self.k_min);
        let selector =
            ClusterCountSelector::new(self.k_min..=self.k_max, kmeans)?.parallel(self.parallel);
        Ok(Segmentation { selector })
    }
}

/// Validated pipeline, ready to run on any number of datasets
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    selector: ClusterCountSelector,
}

/// Everything a run produces, as plain values
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentationReport {
    pub n_records: usize,
    pub selection: Selection,
    /// Final group assignment of every record
    #[serde(skip)]
    pub partition: Partition,
    /// Within-group sum of squares of the final fit, in standardized space
    pub inertia: f64,
    pub summary: GroupSummary,
}

impl SegmentationReport {
    pub fn chosen_k(&self) -> usize {
        self.selection.chosen_k
    }
}

impl Segmentation {
    pub fn selector(&self) -> &ClusterCountSelector {
        &self.selector
    }

    /// Run the whole pipeline on `dataset`. The dataset is only read.
    pub fn run(&self, dataset: &Dataset) -> Result<SegmentationReport> {
        let scaler = StandardScaler::fit(dataset)?;
        let matrix = scaler.transform(dataset.values())?;
        info!(n_records = dataset.len(), "standardized features");

        let selection = self.selector.select(&matrix.view())?;
        let model = self
            .selector
            .kmeans()
            .with_n_clusters(selection.chosen_k)
            .fit(&matrix.view())?;
        let inertia = model.inertia();
        let partition = model.into_partition();

        let summary = analyze(dataset, &partition)?;
        if let Some(target) = summary.target() {
            info!(
                target_group = target.label,
                lift = target.lift,
                size = target.size,
                "identified target group"
            );
        }

        Ok(SegmentationReport {
            n_records: dataset.len(),
            selection,
            partition,
            inertia,
            summary,
        })
    }
}

/// Run the pipeline with the default configuration
pub fn segment(dataset: &Dataset) -> Result<SegmentationReport> {
    SegmentationParams::default().check()?.run(dataset)
}
