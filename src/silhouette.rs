//! Silhouette score of a partition

use crate::error::{Result, SegmentationError};
use crate::model::euclidean_distance;
use crate::partition::Partition;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Running sum of the distances from one record to the members of a group
#[derive(Clone, Copy)]
struct DistanceCount {
    total_distance: f64,
    count: usize,
}

impl DistanceCount {
    fn new(count: usize) -> Self {
        Self {
            total_distance: 0.0,
            count,
        }
    }

    fn reset(&mut self) {
        self.total_distance = 0.0;
    }

    fn add_point(
        &mut self,
        eval_sample: &ArrayView1<'_, f64>,
        other_sample: &ArrayView1<'_, f64>,
    ) {
        self.total_distance += euclidean_distance(eval_sample, other_sample);
    }

    fn mean_distance(&self) -> f64 {
        self.total_distance / self.count as f64
    }

    /// The record itself contributes a zero distance and is excluded from the count
    fn same_label_mean_distance(&self) -> f64 {
        self.total_distance / (self.count - 1) as f64
    }
}

/// Silhouette value of every record.
///
/// For a record with mean distance `a` to the other members of its group and
/// smallest mean distance `b` to the members of another group, the value is
/// `(b - a) / max(a, b)`. Records alone in their group, and records with
/// `a = b = 0`, score 0. Every value lies in `[-1, 1]`.
///
/// Requires between 2 and `n_records - 1` non-empty groups.
pub fn silhouette_samples(
    observations: &ArrayView2<'_, f64>,
    partition: &Partition,
) -> Result<Array1<f64>> {
    let n_records = observations.nrows();
    if n_records != partition.n_records() {
        return Err(SegmentationError::InvalidInput(format!(
            "partition covers {} records, matrix has {}",
            partition.n_records(),
            n_records
        )));
    }

    let sizes = partition.group_sizes();
    let n_populated = sizes.iter().filter(|&&size| size > 0).count();
    if n_populated >= n_records {
        return Err(SegmentationError::InsufficientData {
            records: n_records,
            required: n_populated + 1,
        });
    }
    if n_populated < 2 {
        return Err(SegmentationError::InvalidInput(format!(
            "silhouette needs at least 2 non-empty groups, got {}",
            n_populated
        )));
    }

    let mut groups: Vec<DistanceCount> = sizes
        .iter()
        .map(|&size| DistanceCount::new(size))
        .collect();
    let labels = partition.labels();

    let scores = observations
        .outer_iter()
        .enumerate()
        .map(|(idx, sample)| {
            for (other, &other_label) in observations.outer_iter().zip(labels.iter()) {
                groups[other_label].add_point(&sample, &other);
            }

            let own = labels[idx];
            let own_group = groups[own];
            let b_x = groups
                .iter()
                .enumerate()
                .filter(|&(label, group)| label != own && group.count > 0)
                .map(|(_, group)| group.mean_distance())
                .fold(f64::INFINITY, f64::min);
            groups.iter_mut().for_each(DistanceCount::reset);

            if own_group.count == 1 {
                return 0.0;
            }
            let a_x = own_group.same_label_mean_distance();
            let denominator = a_x.max(b_x);
            if denominator == 0.0 {
                0.0
            } else {
                (b_x - a_x) / denominator
            }
        })
        .collect();
    Ok(scores)
}

/// Mean silhouette value over all records, higher is better
pub fn silhouette_score(observations: &ArrayView2<'_, f64>, partition: &Partition) -> Result<f64> {
    let samples = silhouette_samples(observations, partition)?;
    Ok(samples.sum() / samples.len() as f64)
}
