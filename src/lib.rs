//! loanseg: customer segmentation with automatic cluster-count selection
//!
//! Customer records (age, income, loan amount, transaction count) are
//! standardized, partitioned with K-Means for every candidate number of groups,
//! and the best-separated partition by silhouette score is profiled: each
//! group gets its attribute means and a loan lift relative to the population.
//!
//! ```no_run
//! use loanseg::{Dataset, SegmentationParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::from_path("customers.csv")?;
//! let report = SegmentationParams::new().k_range(2, 9).seed(42).check()?.run(&dataset)?;
//! println!("k = {}, target group = {}", report.chosen_k(), report.summary.target_group);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod data;
pub mod error;
pub mod hyperparams;
pub mod init;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod scaling;
pub mod selection;
pub mod silhouette;

// Re-export public items for easier access
pub use analysis::{analyze, GroupProfile, GroupSummary};
pub use cli::Args;
pub use data::{Attribute, Dataset, Record};
pub use error::{ParamsError, Result, SegmentationError};
pub use hyperparams::{KMeansParams, KMeansValidParams};
pub use init::KMeansInit;
pub use model::KMeansModel;
pub use partition::Partition;
pub use pipeline::{segment, Segmentation, SegmentationParams, SegmentationReport};
pub use scaling::{standardize, StandardScaler};
pub use selection::{CandidateScore, ClusterCountSelector, Selection};
pub use silhouette::{silhouette_samples, silhouette_score};
