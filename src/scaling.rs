//! Feature standardization to zero mean and unit variance

use crate::data::{Attribute, Dataset, N_ATTRIBUTES};
use crate::error::{Result, SegmentationError};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// A column is treated as constant when its standard deviation falls below
/// this fraction of its magnitude.
const RELATIVE_VARIANCE_FLOOR: f64 = 1e-12;

/// Per-column mean and population standard deviation fitted on a dataset
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics on `dataset`.
    ///
    /// Fails with `InsufficientData` on an empty dataset and with
    /// `InvalidInput` when a cell is not finite or a column is constant.
    /// Constant columns are never rescaled with a substitute deviation.
    pub fn fit(dataset: &Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(SegmentationError::InsufficientData {
                records: 0,
                required: 1,
            });
        }

        let values = dataset.values();
        if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SegmentationError::InvalidInput(format!(
                "record {} has non-finite `{}` value {}",
                row,
                Attribute::ALL[col],
                value
            )));
        }

        let means = values
            .mean_axis(Axis(0))
            .ok_or(SegmentationError::InsufficientData {
                records: 0,
                required: 1,
            })?;
        let stds = values.std_axis(Axis(0), 0.0);

        for attribute in Attribute::ALL {
            let (mean, std) = (means[attribute.index()], stds[attribute.index()]);
            if std <= RELATIVE_VARIANCE_FLOOR * mean.abs().max(1.0) {
                return Err(SegmentationError::InvalidInput(format!(
                    "column `{}` is constant (mean {}), cannot standardize",
                    attribute, mean
                )));
            }
        }

        Ok(Self { means, stds })
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    /// Population standard deviations
    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }

    /// Standardize raw rows with the fitted statistics
    pub fn transform(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if values.ncols() != N_ATTRIBUTES {
            return Err(SegmentationError::Schema(format!(
                "expected {} columns, got {}",
                N_ATTRIBUTES,
                values.ncols()
            )));
        }
        Ok((&values - &self.means) / &self.stds)
    }
}

/// Produce the standardized feature matrix of `dataset`
pub fn standardize(dataset: &Dataset) -> Result<Array2<f64>> {
    let scaler = StandardScaler::fit(dataset)?;
    scaler.transform(dataset.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use approx::assert_abs_diff_eq;

    fn dataset() -> Dataset {
        Dataset::from_records(&[
            Record::new(25.0, 40_000_000.0, 10_000_000.0, 20.0),
            Record::new(31.0, 52_000_000.0, 12_500_000.0, 35.0),
            Record::new(47.0, 88_000_000.0, 30_000_000.0, 71.0),
            Record::new(58.0, 95_000_000.0, 38_000_000.0, 90.0),
            Record::new(39.0, 61_000_000.0, 21_000_000.0, 44.0),
        ])
    }

    #[test]
    fn test_columns_have_zero_mean_unit_std() {
        let matrix = standardize(&dataset()).unwrap();
        assert_eq!(matrix.dim(), (5, N_ATTRIBUTES));

        for column in matrix.axis_iter(Axis(1)) {
            assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_population_std_is_used() {
        let dataset = Dataset::from_records(&[
            Record::new(1.0, 1.0, 1.0, 1.0),
            Record::new(3.0, 5.0, 2.0, 7.0),
        ]);
        let scaler = StandardScaler::fit(&dataset).unwrap();
        assert_abs_diff_eq!(scaler.stds()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.means()[1], 3.0, epsilon = 1e-12);

        let matrix = scaler.transform(dataset.values()).unwrap();
        assert_abs_diff_eq!(matrix[[0, 0]], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[[1, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let dataset = dataset();
        let before = dataset.clone();
        let _ = standardize(&dataset).unwrap();
        assert_eq!(dataset, before);
    }

    #[test]
    fn test_identical_records_are_rejected() {
        let record = Record::new(30.0, 50_000_000.0, 20_000_000.0, 40.0);
        let dataset = Dataset::from_records(&[record; 4]);
        let err = standardize(&dataset).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidInput(msg) if msg.contains("age")));
    }

    #[test]
    fn test_single_constant_column_is_rejected() {
        let dataset = Dataset::from_records(&[
            Record::new(20.0, 1.0, 0.1, 10.0),
            Record::new(30.0, 2.0, 0.1, 20.0),
            Record::new(40.0, 3.0, 0.1, 30.0),
        ]);
        let err = standardize(&dataset).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidInput(msg) if msg.contains("loan_amount")));
    }

    #[test]
    fn test_non_finite_and_empty_inputs() {
        let dataset = Dataset::from_records(&[
            Record::new(20.0, f64::NAN, 1.0, 10.0),
            Record::new(30.0, 2.0, 2.0, 20.0),
        ]);
        assert!(matches!(
            standardize(&dataset),
            Err(SegmentationError::InvalidInput(_))
        ));

        let empty = Dataset::from_records(&[]);
        assert!(matches!(
            standardize(&empty),
            Err(SegmentationError::InsufficientData { records: 0, .. })
        ));
    }

    #[test]
    fn test_transform_new_rows() {
        let scaler = StandardScaler::fit(&dataset()).unwrap();
        let row = Array2::from_shape_vec((1, 4), scaler.means().to_vec()).unwrap();
        let scaled = scaler.transform(row.view()).unwrap();
        assert_abs_diff_eq!(scaled.sum(), 0.0, epsilon = 1e-9);

        let wrong = Array2::<f64>::zeros((1, 3));
        assert!(matches!(
            scaler.transform(wrong.view()),
            Err(SegmentationError::Schema(_))
        ));
    }
}
