//! Assignment of every record to exactly one group

use ndarray::Array1;

/// Group labels for a fixed group count `k`, indexed by record position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    labels: Array1<usize>,
    n_groups: usize,
}

impl Partition {
    /// Wrap `labels`, returning `None` if any label falls outside `[0, n_groups)`
    pub fn new(labels: Array1<usize>, n_groups: usize) -> Option<Self> {
        if labels.iter().all(|&label| label < n_groups) {
            Some(Self { labels, n_groups })
        } else {
            None
        }
    }

    /// Labels produced by the clustering engine, already known to be in range
    pub(crate) fn from_labels(labels: Array1<usize>, n_groups: usize) -> Self {
        debug_assert!(labels.iter().all(|&label| label < n_groups));
        Self { labels, n_groups }
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn label(&self, index: usize) -> usize {
        self.labels[index]
    }

    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    pub fn n_records(&self) -> usize {
        self.labels.len()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_groups];
        for &label in self.labels.iter() {
            sizes[label] += 1;
        }
        sizes
    }

    /// Record indices belonging to `group`, in record order
    pub fn members(&self, group: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == group)
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether every one of the `n_groups` groups has at least one member
    pub fn is_complete(&self) -> bool {
        self.group_sizes().iter().all(|&size| size > 0)
    }
}
