//! Command-line interface definitions and argument parsing

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Sales ledger analytics: reports, customer segmentation and product
/// recommendations from a purchase CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output with step timing
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate sales metrics: products, categories, customers
    Analyze {
        /// Path to the purchase ledger CSV
        #[arg(short, long, default_value = "purchase_data.csv")]
        data: String,

        /// Which analysis to run
        #[arg(short, long, value_enum, default_value_t = AnalysisKind::Full)]
        kind: AnalysisKind,

        /// Limit for top products/customers
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Segment customers by spend, frequency and recency
    Classify {
        /// Path to the purchase ledger CSV
        #[arg(short, long, default_value = "purchase_data.csv")]
        data: String,

        /// Cluster-count hint (accepted for compatibility; the rule set
        /// always yields the six named segments)
        #[arg(short = 'k', long, default_value_t = 5)]
        clusters: usize,

        /// Report the segment of one customer instead of the whole population
        #[arg(short, long)]
        customer: Option<String>,

        /// Percentile for high-value thresholds
        #[arg(long, default_value_t = 0.75)]
        high_percentile: f64,

        /// Percentile for medium-value thresholds
        #[arg(long, default_value_t = 0.50)]
        medium_percentile: f64,

        /// Multiplier applied to the median recency threshold
        #[arg(long, default_value_t = 1.0)]
        recency_multiplier: f64,

        /// Analysis reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recommend unpurchased products for a customer
    Recommend {
        /// Path to the purchase ledger CSV
        #[arg(short, long, default_value = "purchase_data.csv")]
        data: String,

        /// Customer ID to recommend for
        #[arg(short, long)]
        customer: String,

        /// Number of recommendations
        #[arg(short, long, default_value_t = 5)]
        num: usize,

        /// Latent factor count for the matrix factorization
        #[arg(long, default_value_t = 10)]
        factors: usize,

        /// Seed for reproducible factor initialization
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate a synthetic purchase ledger
    Generate {
        /// Output CSV path
        #[arg(short, long, default_value = "purchase_data.csv")]
        output: String,

        /// Number of distinct customers
        #[arg(long, default_value_t = 500)]
        customers: usize,

        /// Number of distinct products
        #[arg(long, default_value_t = 50)]
        products: usize,

        /// Number of purchase records
        #[arg(long, default_value_t = 5000)]
        records: usize,

        /// Seed for reproducible generation
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Products,
    Categories,
    Customers,
    Full,
}
