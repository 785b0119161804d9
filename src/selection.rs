//! Selection of the number of groups by silhouette score

use crate::error::{ParamsError, Result, SegmentationError};
use crate::hyperparams::KMeansValidParams;
use crate::silhouette::silhouette_score;
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::{info, warn};

/// Quality score obtained for one candidate group count
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CandidateScore {
    pub k: usize,
    pub score: f64,
}

/// Outcome of a selection run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Selection {
    /// Candidate with the highest score, the smallest one on ties
    pub chosen_k: usize,
    pub best_score: f64,
    /// Scores of the evaluated candidates, in increasing `k`
    pub trace: Vec<CandidateScore>,
    /// Candidates that could not be evaluated on this dataset
    pub skipped: Vec<usize>,
}

/// Evaluates every candidate group count and keeps the best-separated one
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterCountSelector {
    candidates: RangeInclusive<usize>,
    kmeans: KMeansValidParams,
    parallel: bool,
}

impl ClusterCountSelector {
    /// Candidates must start at 2 or more and be non-empty
    pub fn new(
        candidates: RangeInclusive<usize>,
        kmeans: KMeansValidParams,
    ) -> std::result::Result<Self, ParamsError> {
        let (min, max) = (*candidates.start(), *candidates.end());
        if min < 2 {
            return Err(ParamsError::MinCandidate(min));
        }
        if min > max {
            return Err(ParamsError::EmptyCandidateRange { min, max });
        }
        Ok(Self {
            candidates,
            kmeans,
            parallel: false,
        })
    }

    /// Fit the candidates on the rayon thread pool.
    ///
    /// Every fit seeds its own generator from the same seed, so the result
    /// does not depend on this setting.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn candidates(&self) -> &RangeInclusive<usize> {
        &self.candidates
    }

    pub fn kmeans(&self) -> &KMeansValidParams {
        &self.kmeans
    }

    /// Score each candidate `k` on the standardized `matrix`.
    ///
    /// A candidate is only evaluable when `k <= n_records - 1`; the others are
    /// skipped. Fails with `NoValidCandidate` when nothing is left.
    pub fn select(&self, matrix: &ArrayView2<'_, f64>) -> Result<Selection> {
        let n_records = matrix.nrows();
        let (valid, skipped): (Vec<usize>, Vec<usize>) = self
            .candidates
            .clone()
            .partition(|&k| k < n_records);

        if !skipped.is_empty() {
            warn!(
                ?skipped,
                n_records, "skipping candidate group counts not below the record count"
            );
        }
        if valid.is_empty() {
            return Err(SegmentationError::NoValidCandidate {
                min: *self.candidates.start(),
                max: *self.candidates.end(),
                records: n_records,
            });
        }

        let trace: Vec<CandidateScore> = if self.parallel {
            valid
                .par_iter()
                .map(|&k| self.evaluate(matrix, k))
                .collect::<Result<_>>()?
        } else {
            valid
                .iter()
                .map(|&k| self.evaluate(matrix, k))
                .collect::<Result<_>>()?
        };

        let mut best = trace[0];
        for candidate in &trace[1..] {
            if candidate.score > best.score {
                best = *candidate;
            }
        }
        info!(chosen_k = best.k, score = best.score, "selected number of groups");

        Ok(Selection {
            chosen_k: best.k,
            best_score: best.score,
            trace,
            skipped,
        })
    }

    fn evaluate(&self, matrix: &ArrayView2<'_, f64>, k: usize) -> Result<CandidateScore> {
        let model = self.kmeans.with_n_clusters(k).fit(matrix)?;
        let score = silhouette_score(matrix, model.partition())?;
        info!(k, score, inertia = model.inertia(), "evaluated candidate");
        Ok(CandidateScore { k, score })
    }
}
