//! Salescope: sales ledger analytics from the command line
//!
//! This library turns a CSV ledger of purchase events into three derived
//! views: aggregate sales metrics, a rule-based customer segmentation, and
//! per-customer product recommendations from a seeded matrix factorization.

pub mod analysis;
pub mod cli;
pub mod data;
pub mod error;
pub mod generate;
pub mod recommend;
pub mod report;
pub mod segmentation;

// Re-export public items for easier access
pub use cli::{Cli, Command};
pub use data::{build_profiles, load_events, CustomerProfile, PurchaseEvent};
pub use error::AnalyticsError;
pub use recommend::{RecommendConfig, Recommendation, Recommender};
pub use segmentation::{segment_customers, SegmentationConfig, SegmentationReport};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, AnalyticsError>;
