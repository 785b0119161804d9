//! Command-line interface definitions and argument parsing

use crate::init::KMeansInit;
use crate::pipeline::SegmentationParams;
use clap::{Parser, ValueEnum};

/// Centroid initialization choices exposed on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitArg {
    #[value(name = "kmeans++")]
    KMeansPlusPlus,
    Random,
}

impl From<InitArg> for KMeansInit {
    fn from(arg: InitArg) -> Self {
        match arg {
            InitArg::KMeansPlusPlus => KMeansInit::KMeansPlusPlus,
            InitArg::Random => KMeansInit::Random,
        }
    }
}

/// Output format of the report
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Customer segmentation with automatic cluster-count selection and loan lift profiling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a CSV file with columns age, income, loan_amount, transaction_count
    #[arg(short, long, conflicts_with = "generate")]
    pub input: Option<String>,

    /// Generate this many synthetic demo records instead of reading a file
    #[arg(short, long)]
    pub generate: Option<usize>,

    /// Seed for centroid initialization and for generated data
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Smallest number of clusters to try
    #[arg(long, default_value = "2")]
    pub k_min: usize,

    /// Largest number of clusters to try
    #[arg(long, default_value = "9")]
    pub k_max: usize,

    /// Maximum iterations for a K-Means run
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Number of K-Means restarts per cluster count
    #[arg(long, default_value = "10")]
    pub n_runs: usize,

    /// Centroid shift below which a run counts as converged
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Centroid initialization strategy
    #[arg(long, value_enum, default_value_t = InitArg::KMeansPlusPlus)]
    pub init: InitArg,

    /// Fail instead of keeping the current partition when a run hits the iteration cap
    #[arg(long)]
    pub strict_convergence: bool,

    /// Evaluate candidate cluster counts in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Pipeline configuration described by the arguments
    pub fn segmentation_params(&self) -> SegmentationParams {
        SegmentationParams::new()
            .k_range(self.k_min, self.k_max)
            .seed(self.seed)
            .max_n_iterations(self.max_iters)
            .n_runs(self.n_runs)
            .tolerance(self.tolerance)
            .init_method(self.init.into())
            .require_convergence(self.strict_convergence)
            .parallel(self.parallel)
    }

    /// Default `tracing` filter directive for the chosen verbosity
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "loanseg=debug"
        } else {
            "loanseg=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamsError;

    #[test]
    fn test_defaults_match_library_defaults() {
        let args = Args::parse_from(["loanseg", "--generate", "100"]);
        assert_eq!(args.generate, Some(100));
        assert_eq!(args.input, None);
        assert_eq!(args.format, OutputFormat::Table);
        assert_eq!(args.segmentation_params(), SegmentationParams::default());
        assert_eq!(args.log_directive(), "loanseg=info");
    }

    #[test]
    fn test_parse_all_options() {
        let args = Args::parse_from([
            "loanseg",
            "--input",
            "customers.csv",
            "--seed",
            "7",
            "--k-min",
            "3",
            "--k-max",
            "5",
            "--init",
            "random",
            "--strict-convergence",
            "--parallel",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(args.input.as_deref(), Some("customers.csv"));
        assert_eq!(args.init, InitArg::Random);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.log_directive(), "loanseg=debug");

        let segmentation = args.segmentation_params().check().unwrap();
        let selector = segmentation.selector();
        assert_eq!(selector.candidates(), &(3..=5));
        assert_eq!(selector.kmeans().seed(), 7);
        assert_eq!(selector.kmeans().init_method(), KMeansInit::Random);
        assert!(selector.kmeans().require_convergence());
    }

    #[test]
    fn test_invalid_range_is_reported_at_check() {
        let args = Args::parse_from(["loanseg", "--k-min", "1"]);
        assert_eq!(
            args.segmentation_params().check(),
            Err(ParamsError::MinCandidate(1))
        );
    }

    #[test]
    fn test_input_conflicts_with_generate() {
        let result = Args::try_parse_from(["loanseg", "--input", "a.csv", "--generate", "10"]);
        assert!(result.is_err());
    }
}
