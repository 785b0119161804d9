//! Per-group profiles and loan lift

use crate::data::{Attribute, Dataset, Record, N_ATTRIBUTES};
use crate::error::{Result, SegmentationError};
use crate::partition::Partition;
use serde::Serialize;

/// Running sums of the raw attributes of one group
#[derive(Clone, Copy, Debug, Default)]
struct GroupAccumulator {
    sums: [f64; N_ATTRIBUTES],
    count: usize,
}

impl GroupAccumulator {
    fn push(&mut self, record: &Record) {
        for (sum, value) in self.sums.iter_mut().zip(record.to_array()) {
            *sum += value;
        }
        self.count += 1;
    }

    fn means(&self) -> Record {
        let n = self.count as f64;
        Record::new(
            self.sums[Attribute::Age.index()] / n,
            self.sums[Attribute::Income.index()] / n,
            self.sums[Attribute::LoanAmount.index()] / n,
            self.sums[Attribute::TransactionCount.index()] / n,
        )
    }
}

/// Profile of one group
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupProfile {
    pub label: usize,
    pub size: usize,
    /// Mean of each raw attribute over the group's members
    pub means: Record,
    /// Group mean loan amount over the overall mean loan amount
    pub lift: f64,
}

/// Profiles of all non-empty groups, in increasing label order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub groups: Vec<GroupProfile>,
    pub overall_loan_mean: f64,
    /// Label with the highest mean loan amount, the lowest label on ties
    pub target_group: usize,
}

impl GroupSummary {
    pub fn group(&self, label: usize) -> Option<&GroupProfile> {
        self.groups.iter().find(|group| group.label == label)
    }

    pub fn target(&self) -> Option<&GroupProfile> {
        self.group(self.target_group)
    }
}

/// Summarize `partition` over the raw `dataset` values in one pass.
///
/// Groups without members are left out of the summary. Fails when the
/// partition does not cover the dataset or the overall mean loan amount is 0.
pub fn analyze(dataset: &Dataset, partition: &Partition) -> Result<GroupSummary> {
    if dataset.is_empty() {
        return Err(SegmentationError::InsufficientData {
            records: 0,
            required: 1,
        });
    }
    if dataset.len() != partition.n_records() {
        return Err(SegmentationError::InvalidInput(format!(
            "partition covers {} records, dataset has {}",
            partition.n_records(),
            dataset.len()
        )));
    }

    let mut accumulators = vec![GroupAccumulator::default(); partition.n_groups()];
    let mut overall = GroupAccumulator::default();
    for (record, &label) in dataset.records().zip(partition.labels().iter()) {
        accumulators[label].push(&record);
        overall.push(&record);
    }

    let overall_loan_mean = overall.means().loan_amount;
    if overall_loan_mean == 0.0 {
        return Err(SegmentationError::InvalidInput(
            "overall mean loan amount is 0, lift is undefined".to_string(),
        ));
    }

    let groups: Vec<GroupProfile> = accumulators
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(label, acc)| {
            let means = acc.means();
            GroupProfile {
                label,
                size: acc.count,
                means,
                lift: means.loan_amount / overall_loan_mean,
            }
        })
        .collect();

    let mut target = &groups[0];
    for group in &groups[1..] {
        if group.means.loan_amount > target.means.loan_amount {
            target = group;
        }
    }
    let target_group = target.label;

    Ok(GroupSummary {
        groups,
        overall_loan_mean,
        target_group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::from_records(&[
            Record::new(20.0, 100.0, 10.0, 1.0),
            Record::new(30.0, 200.0, 30.0, 3.0),
            Record::new(40.0, 300.0, 200.0, 5.0),
            Record::new(50.0, 400.0, 160.0, 7.0),
        ])
    }

    #[test]
    fn test_means_and_lift() {
        let partition = Partition::new(array![0, 0, 1, 1], 2).unwrap();
        let summary = analyze(&dataset(), &partition).unwrap();

        assert_abs_diff_eq!(summary.overall_loan_mean, 100.0);
        assert_eq!(summary.target_group, 1);

        let low = summary.group(0).unwrap();
        assert_eq!(low.size, 2);
        assert_eq!(low.means, Record::new(25.0, 150.0, 20.0, 2.0));
        assert_abs_diff_eq!(low.lift, 0.2);

        let high = summary.target().unwrap();
        assert_eq!(high.means, Record::new(45.0, 350.0, 180.0, 6.0));
        assert_abs_diff_eq!(high.lift, 1.8);
    }

    #[test]
    fn test_weighted_means_recover_overall_mean() {
        let partition = Partition::new(array![2, 0, 1, 2], 3).unwrap();
        let summary = analyze(&dataset(), &partition).unwrap();
        let total: f64 = summary
            .groups
            .iter()
            .map(|g| g.size as f64 * g.means.loan_amount)
            .sum();
        assert_abs_diff_eq!(total, 4.0 * summary.overall_loan_mean, epsilon = 1e-9);
    }

    #[test]
    fn test_single_member_group() {
        let partition = Partition::new(array![0, 0, 1, 0], 2).unwrap();
        let summary = analyze(&dataset(), &partition).unwrap();
        let single = summary.group(1).unwrap();
        assert_eq!(single.size, 1);
        assert_abs_diff_eq!(single.lift, 2.0);
        assert_eq!(summary.target_group, 1);
    }

    #[test]
    fn test_tie_prefers_lowest_label() {
        let dataset = Dataset::from_records(&[
            Record::new(1.0, 1.0, 50.0, 1.0),
            Record::new(2.0, 2.0, 50.0, 2.0),
            Record::new(3.0, 3.0, 10.0, 3.0),
        ]);
        let partition = Partition::new(array![2, 1, 0], 3).unwrap();
        let summary = analyze(&dataset, &partition).unwrap();
        assert_eq!(summary.target_group, 1);
    }

    #[test]
    fn test_empty_groups_are_left_out() {
        let partition = Partition::new(array![0, 0, 3, 3], 4).unwrap();
        let summary = analyze(&dataset(), &partition).unwrap();
        assert_eq!(
            summary.groups.iter().map(|g| g.label).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(summary.target_group, 3);
    }

    #[test]
    fn test_inputs_must_agree() {
        let partition = Partition::new(array![0, 1], 2).unwrap();
        assert!(matches!(
            analyze(&dataset(), &partition),
            Err(SegmentationError::InvalidInput(_))
        ));

        let zero_loans = Dataset::from_records(&[
            Record::new(1.0, 1.0, 0.0, 1.0),
            Record::new(2.0, 2.0, 0.0, 2.0),
        ]);
        let partition = Partition::new(array![0, 1], 2).unwrap();
        assert!(matches!(
            analyze(&zero_loans, &partition),
            Err(SegmentationError::InvalidInput(_))
        ));
    }
}
