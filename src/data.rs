//! Customer records and dataset ingestion

use crate::error::{Result, SegmentationError};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of attributes every record carries
pub const N_ATTRIBUTES: usize = 4;

/// One numeric attribute of a customer record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Age,
    Income,
    LoanAmount,
    TransactionCount,
}

impl Attribute {
    /// All attributes in column order
    pub const ALL: [Attribute; N_ATTRIBUTES] = [
        Attribute::Age,
        Attribute::Income,
        Attribute::LoanAmount,
        Attribute::TransactionCount,
    ];

    /// Column name used by tabular sources
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Age => "age",
            Attribute::Income => "income",
            Attribute::LoanAmount => "loan_amount",
            Attribute::TransactionCount => "transaction_count",
        }
    }

    /// Column index inside a [`Dataset`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One customer observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Record {
    pub age: f64,
    pub income: f64,
    pub loan_amount: f64,
    pub transaction_count: f64,
}

impl Record {
    pub fn new(age: f64, income: f64, loan_amount: f64, transaction_count: f64) -> Self {
        Self {
            age,
            income,
            loan_amount,
            transaction_count,
        }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Age => self.age,
            Attribute::Income => self.income,
            Attribute::LoanAmount => self.loan_amount,
            Attribute::TransactionCount => self.transaction_count,
        }
    }

    /// Values in [`Attribute::ALL`] order
    pub fn to_array(&self) -> [f64; N_ATTRIBUTES] {
        [self.age, self.income, self.loan_amount, self.transaction_count]
    }
}

/// Ordered, immutable collection of records sharing the fixed four-attribute schema.
///
/// Values are held row-major as an `(n_records, 4)` matrix whose columns follow
/// [`Attribute::ALL`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    values: Array2<f64>,
}

impl Dataset {
    /// Build a dataset from records, preserving their order
    pub fn from_records(records: &[Record]) -> Self {
        let values = Array2::from_shape_fn((records.len(), N_ATTRIBUTES), |(row, col)| {
            records[row].get(Attribute::ALL[col])
        });
        Self { values }
    }

    /// Build a dataset from named columns.
    ///
    /// The names must be exactly the four attribute names, in any order, and
    /// every column must have the same length.
    pub fn from_columns<S: AsRef<str>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_ref()).collect();
        let mapping = resolve_columns(&names)?;

        let n_records = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != n_records) {
            return Err(SegmentationError::Schema(format!(
                "column `{}` has {} values, expected {}",
                name.as_ref(),
                values.len(),
                n_records
            )));
        }

        let values = Array2::from_shape_fn((n_records, N_ATTRIBUTES), |(row, col)| {
            columns[mapping[col]].1[row]
        });
        Ok(Self { values })
    }

    /// Read a dataset from CSV with a header row naming the four attributes
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();
        let mapping = resolve_columns(&names)?;

        let mut flat = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() != headers.len() {
                return Err(SegmentationError::Schema(format!(
                    "row {} has {} fields, header has {}",
                    row + 1,
                    record.len(),
                    headers.len()
                )));
            }
            for (attribute, &source) in Attribute::ALL.iter().zip(mapping.iter()) {
                let cell = &record[source];
                let value: f64 = cell.parse().map_err(|_| {
                    SegmentationError::Schema(format!(
                        "row {}: `{}` value `{}` is not numeric",
                        row + 1,
                        attribute,
                        cell
                    ))
                })?;
                flat.push(value);
            }
        }

        let n_records = flat.len() / N_ATTRIBUTES;
        let values = Array2::from_shape_vec((n_records, N_ATTRIBUTES), flat)
            .map_err(|e| SegmentationError::Schema(e.to_string()))?;
        Ok(Self { values })
    }

    /// Read a dataset from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Raw values as an `(n_records, 4)` view
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn column(&self, attribute: Attribute) -> ArrayView1<'_, f64> {
        self.values.column(attribute.index())
    }

    pub fn record(&self, index: usize) -> Option<Record> {
        if index >= self.len() {
            return None;
        }
        let row = self.values.row(index);
        Some(Record::new(row[0], row[1], row[2], row[3]))
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.values
            .axis_iter(Axis(0))
            .map(|row| Record::new(row[0], row[1], row[2], row[3]))
    }
}

/// Map each attribute (in column order) to its position among `names`
fn resolve_columns(names: &[&str]) -> Result<[usize; N_ATTRIBUTES]> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(SegmentationError::Schema(format!("duplicate column `{}`", name)));
        }
        if Attribute::from_name(name).is_none() {
            return Err(SegmentationError::Schema(format!("unexpected column `{}`", name)));
        }
    }

    let mut mapping = [0; N_ATTRIBUTES];
    for attribute in Attribute::ALL {
        mapping[attribute.index()] = names
            .iter()
            .position(|name| *name == attribute.name())
            .ok_or_else(|| {
                SegmentationError::Schema(format!("missing column `{}`", attribute))
            })?;
    }
    Ok(mapping)
}

/// Generate integer-valued demo records with a seeded generator.
///
/// Ranges: age in [20, 60), income in [30M, 100M), loan amount in [5M, 40M),
/// transaction count in [10, 100).
pub fn generate(n_records: usize, seed: u64) -> Dataset {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let records: Vec<Record> = (0..n_records)
        .map(|_| {
            Record::new(
                rng.gen_range(20..60) as f64,
                rng.gen_range(30_000_000..100_000_000) as f64,
                rng.gen_range(5_000_000..40_000_000) as f64,
                rng.gen_range(10..100) as f64,
            )
        })
        .collect();
    Dataset::from_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "age,income,loan_amount,transaction_count\n\
                       25,40000000,10000000,20\n\
                       52,90000000,35000000,80\n";

    #[test]
    fn test_from_csv_reader() {
        let dataset = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.record(1),
            Some(Record::new(52.0, 90_000_000.0, 35_000_000.0, 80.0))
        );
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "loan_amount,transaction_count,age,income\n10,20,30,40\n";
        let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.record(0), Some(Record::new(30.0, 40.0, 10.0, 20.0)));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "age,income,loan_amount\n1,2,3\n";
        let err = Dataset::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SegmentationError::Schema(msg) if msg.contains("transaction_count")));
    }

    #[test]
    fn test_extra_and_duplicate_columns_are_schema_errors() {
        let extra = "age,income,loan_amount,transaction_count,cluster\n1,2,3,4,0\n";
        assert!(matches!(
            Dataset::from_csv_reader(extra.as_bytes()),
            Err(SegmentationError::Schema(_))
        ));

        let duplicate = "age,age,income,loan_amount,transaction_count\n1,1,2,3,4\n";
        assert!(matches!(
            Dataset::from_csv_reader(duplicate.as_bytes()),
            Err(SegmentationError::Schema(_))
        ));
    }

    #[test]
    fn test_non_numeric_cell_is_schema_error() {
        let csv = "age,income,loan_amount,transaction_count\n1,abc,3,4\n";
        let err = Dataset::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SegmentationError::Schema(msg) if msg.contains("income")));
    }

    #[test]
    fn test_short_row_is_schema_error() {
        let csv = "age,income,loan_amount,transaction_count\n1,2,3\n";
        assert!(matches!(
            Dataset::from_csv_reader(csv.as_bytes()),
            Err(SegmentationError::Schema(_))
        ));
    }

    #[test]
    fn test_from_columns() {
        let dataset = Dataset::from_columns(vec![
            ("income", vec![1.0, 2.0]),
            ("age", vec![3.0, 4.0]),
            ("transaction_count", vec![5.0, 6.0]),
            ("loan_amount", vec![7.0, 8.0]),
        ])
        .unwrap();
        assert_eq!(dataset.column(Attribute::Age).to_vec(), vec![3.0, 4.0]);
        assert_eq!(dataset.column(Attribute::LoanAmount).to_vec(), vec![7.0, 8.0]);

        let ragged = Dataset::from_columns(vec![
            ("income", vec![1.0, 2.0]),
            ("age", vec![3.0]),
            ("transaction_count", vec![5.0, 6.0]),
            ("loan_amount", vec![7.0, 8.0]),
        ]);
        assert!(matches!(ragged, Err(SegmentationError::Schema(_))));
    }

    #[test]
    fn test_generate_is_seeded_and_in_range() {
        let first = generate(50, 7);
        assert_eq!(first, generate(50, 7));
        assert_eq!(first.len(), 50);

        for record in first.records() {
            assert!((20.0..60.0).contains(&record.age));
            assert!((30_000_000.0..100_000_000.0).contains(&record.income));
            assert!((5_000_000.0..40_000_000.0).contains(&record.loan_amount));
            assert!((10.0..100.0).contains(&record.transaction_count));
            assert_eq!(record.age.fract(), 0.0);
        }
    }
}
