//! Rule-based customer segmentation over population-level thresholds
//!
//! Thresholds are percentiles of the observed spend/frequency distributions
//! plus a median-recency cutoff; every customer then falls through a fixed
//! six-way decision tree. The cluster-count hint from the CLI is accepted
//! for interface compatibility but the rule set always yields these six
//! named segments.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::CustomerProfile;
use crate::error::AnalyticsError;

/// The six segment labels, in report order.
pub const SEGMENT_LABELS: [&str; 6] = [
    "High-Value Frequent Buyers",
    "Big Spenders",
    "Inactive Customers",
    "Frequent Low-Value Buyers",
    "Regular Customers",
    "Occasional Buyers",
];

/// Tuning knobs for one segmentation run. Passed explicitly into each call
/// so repeated invocations with different settings cannot interfere.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationConfig {
    /// Advisory only; the rule set always produces the six fixed segments.
    pub cluster_hint: usize,
    pub high_percentile: f64,
    pub medium_percentile: f64,
    pub recency_multiplier: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            cluster_hint: 5,
            high_percentile: 0.75,
            medium_percentile: 0.50,
            recency_multiplier: 1.0,
        }
    }
}

impl SegmentationConfig {
    fn validate(&self) -> crate::Result<()> {
        for (name, p) in [
            ("high percentile", self.high_percentile),
            ("medium percentile", self.medium_percentile),
        ] {
            if !(0.0..1.0).contains(&p) || p == 0.0 {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "{name} must be in (0, 1), got {p}"
                )));
            }
        }
        if self.high_percentile <= self.medium_percentile {
            return Err(AnalyticsError::InvalidParameter(format!(
                "high percentile ({}) must exceed medium percentile ({})",
                self.high_percentile, self.medium_percentile
            )));
        }
        if self.recency_multiplier <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "recency multiplier must be positive, got {}",
                self.recency_multiplier
            )));
        }
        Ok(())
    }
}

/// Population-level cutoffs, computed once per run and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Thresholds {
    pub high_spend: f64,
    pub medium_spend: f64,
    pub high_frequency: f64,
    pub medium_frequency: f64,
    pub recency_days: f64,
}

/// One segment with its member set and aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub name: &'static str,
    pub customer_count: usize,
    /// Member customer identifiers, sorted.
    pub members: Vec<String>,
    pub avg_spend: f64,
    pub avg_frequency: f64,
    pub avg_order_value: f64,
    pub avg_recency_days: f64,
}

/// Full segmentation of the customer population. The six segments partition
/// the population: member counts always sum to `total_customers`.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    pub total_customers: usize,
    pub thresholds: Thresholds,
    pub segments: Vec<SegmentSummary>,
}

/// Segment lookup result for one customer.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSegment {
    pub customer_id: String,
    pub segment: &'static str,
    pub profile: CustomerProfile,
    pub thresholds: Thresholds,
}

/// Compute population thresholds from all profiles.
///
/// Fails with `InsufficientData` on an empty population rather than
/// returning degenerate percentiles.
pub fn compute_thresholds(
    profiles: &BTreeMap<String, CustomerProfile>,
    config: &SegmentationConfig,
) -> crate::Result<Thresholds> {
    config.validate()?;
    if profiles.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "segmentation requires at least one customer".to_string(),
        ));
    }

    let mut spends: Vec<f64> = profiles.values().map(|p| p.total_spend).collect();
    let mut frequencies: Vec<f64> = profiles.values().map(|p| p.purchase_count as f64).collect();
    let mut recencies: Vec<f64> = profiles.values().map(|p| p.recency_days as f64).collect();
    spends.sort_by(|a, b| a.total_cmp(b));
    frequencies.sort_by(|a, b| a.total_cmp(b));
    recencies.sort_by(|a, b| a.total_cmp(b));

    Ok(Thresholds {
        high_spend: percentile(&spends, config.high_percentile),
        medium_spend: percentile(&spends, config.medium_percentile),
        high_frequency: percentile(&frequencies, config.high_percentile),
        medium_frequency: percentile(&frequencies, config.medium_percentile),
        recency_days: percentile(&recencies, 0.5) * config.recency_multiplier,
    })
}

/// Assign every customer to exactly one of the six segments.
pub fn segment_customers(
    profiles: &BTreeMap<String, CustomerProfile>,
    config: &SegmentationConfig,
) -> crate::Result<SegmentationReport> {
    let thresholds = compute_thresholds(profiles, config)?;

    let mut buckets: Vec<Vec<&CustomerProfile>> = vec![Vec::new(); SEGMENT_LABELS.len()];
    for profile in profiles.values() {
        buckets[assign_index(profile, &thresholds)].push(profile);
    }

    let segments = SEGMENT_LABELS
        .iter()
        .zip(buckets)
        .map(|(&name, members)| summarize(name, members))
        .collect();

    Ok(SegmentationReport {
        total_customers: profiles.len(),
        thresholds,
        segments,
    })
}

/// Look up the segment of a single customer.
///
/// An identifier without a profile (no purchases, or unknown) is reported
/// as `CustomerNotFound`, distinct from other failures.
pub fn customer_segment(
    profiles: &BTreeMap<String, CustomerProfile>,
    config: &SegmentationConfig,
    customer_id: &str,
) -> crate::Result<CustomerSegment> {
    let profile = profiles
        .get(customer_id)
        .ok_or_else(|| AnalyticsError::CustomerNotFound(customer_id.to_string()))?;
    let thresholds = compute_thresholds(profiles, config)?;
    let segment = SEGMENT_LABELS[assign_index(profile, &thresholds)];

    Ok(CustomerSegment {
        customer_id: customer_id.to_string(),
        segment,
        profile: profile.clone(),
        thresholds,
    })
}

/// First-match-wins decision tree; the final arm makes it a total partition.
fn assign_index(profile: &CustomerProfile, t: &Thresholds) -> usize {
    let spend = profile.total_spend;
    let frequency = profile.purchase_count as f64;

    if spend >= t.high_spend && frequency >= t.high_frequency {
        0 // High-Value Frequent Buyers
    } else if spend >= t.high_spend {
        1 // Big Spenders
    } else if profile.recency_days as f64 > t.recency_days {
        2 // Inactive Customers
    } else if frequency >= t.high_frequency && spend < t.medium_spend {
        3 // Frequent Low-Value Buyers
    } else if spend >= t.medium_spend && frequency >= t.medium_frequency {
        4 // Regular Customers
    } else {
        5 // Occasional Buyers
    }
}

fn summarize(name: &'static str, members: Vec<&CustomerProfile>) -> SegmentSummary {
    let count = members.len();
    let mean = |f: fn(&CustomerProfile) -> f64| -> f64 {
        if count == 0 {
            0.0
        } else {
            members.iter().map(|p| f(p)).sum::<f64>() / count as f64
        }
    };

    SegmentSummary {
        name,
        customer_count: count,
        avg_spend: mean(|p| p.total_spend),
        avg_frequency: mean(|p| p.purchase_count as f64),
        avg_order_value: mean(|p| p.average_order_value),
        avg_recency_days: mean(|p| p.recency_days as f64),
        members: members.iter().map(|p| p.customer_id.clone()).collect(),
    }
}

/// Linear-interpolated percentile over a sorted, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] + weight * (sorted[upper] - sorted[lower])
}
