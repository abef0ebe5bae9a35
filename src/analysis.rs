//! Aggregate sales metrics over the purchase ledger

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::PurchaseEvent;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Serialize)]
pub struct ProductStats {
    pub product_id: String,
    pub revenue: f64,
    pub units: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub revenue: f64,
    pub units: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSpend {
    pub customer_id: String,
    pub total_spend: f64,
    pub purchases: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductAnalysis {
    pub top_products: Vec<ProductStats>,
    pub total_products: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAnalysis {
    pub categories: Vec<CategoryStats>,
    pub total_categories: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAnalysis {
    /// Mean of per-customer total spend.
    pub mean_spend: f64,
    /// Median of per-customer total spend.
    pub median_spend: f64,
    pub total_customers: usize,
    pub top_customers: Vec<CustomerSpend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullAnalysis {
    pub products: ProductAnalysis,
    pub categories: CategoryAnalysis,
    pub customers: CustomerAnalysis,
}

/// Top-N products by revenue, with unit counts.
pub fn top_products(events: &[PurchaseEvent], limit: usize) -> crate::Result<ProductAnalysis> {
    require_events(events)?;
    let mut rollup: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for event in events {
        let entry = rollup.entry(event.product_id.as_str()).or_insert((0.0, 0));
        entry.0 += event.amount;
        entry.1 += 1;
    }
    let total_products = rollup.len();

    let mut ranked: Vec<ProductStats> = rollup
        .into_iter()
        .map(|(product_id, (revenue, units))| ProductStats {
            product_id: product_id.to_string(),
            revenue,
            units,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);

    Ok(ProductAnalysis {
        top_products: ranked,
        total_products,
    })
}

/// All categories ranked by revenue, with unit counts.
pub fn category_analysis(events: &[PurchaseEvent]) -> crate::Result<CategoryAnalysis> {
    require_events(events)?;
    let mut rollup: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for event in events {
        let entry = rollup.entry(event.category.as_str()).or_insert((0.0, 0));
        entry.0 += event.amount;
        entry.1 += 1;
    }
    let total_categories = rollup.len();

    let mut ranked: Vec<CategoryStats> = rollup
        .into_iter()
        .map(|(category, (revenue, units))| CategoryStats {
            category: category.to_string(),
            revenue,
            units,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(CategoryAnalysis {
        categories: ranked,
        total_categories,
    })
}

/// Per-customer spend summary statistics plus the top-N spenders.
pub fn customer_analysis(events: &[PurchaseEvent], limit: usize) -> crate::Result<CustomerAnalysis> {
    require_events(events)?;
    let mut rollup: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for event in events {
        let entry = rollup.entry(event.customer_id.as_str()).or_insert((0.0, 0));
        entry.0 += event.amount;
        entry.1 += 1;
    }
    let total_customers = rollup.len();

    let mut spends: Vec<f64> = rollup.values().map(|&(spend, _)| spend).collect();
    spends.sort_by(|a, b| a.total_cmp(b));
    let mean_spend = spends.iter().sum::<f64>() / spends.len() as f64;
    let median_spend = median(&spends);

    let mut ranked: Vec<CustomerSpend> = rollup
        .into_iter()
        .map(|(customer_id, (total_spend, purchases))| CustomerSpend {
            customer_id: customer_id.to_string(),
            total_spend,
            purchases,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_spend
            .total_cmp(&a.total_spend)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    ranked.truncate(limit);

    Ok(CustomerAnalysis {
        mean_spend,
        median_spend,
        total_customers,
        top_customers: ranked,
    })
}

/// Combined report: products, categories and customers in one pass.
pub fn full_analysis(events: &[PurchaseEvent], limit: usize) -> crate::Result<FullAnalysis> {
    Ok(FullAnalysis {
        products: top_products(events, limit)?,
        categories: category_analysis(events)?,
        customers: customer_analysis(events, limit)?,
    })
}

fn require_events(events: &[PurchaseEvent]) -> crate::Result<()> {
    if events.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "analysis requires at least one purchase event".to_string(),
        ));
    }
    Ok(())
}

/// Median of a sorted, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(customer: &str, product: &str, category: &str, amount: f64) -> PurchaseEvent {
        PurchaseEvent {
            customer_id: customer.to_string(),
            product_id: product.to_string(),
            category: category.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
        }
    }

    fn sample_events() -> Vec<PurchaseEvent> {
        vec![
            event("C1", "P1", "Books", 20.0),
            event("C1", "P2", "Kitchen", 50.0),
            event("C2", "P1", "Books", 30.0),
            event("C2", "P3", "Sports", 10.0),
            event("C3", "P2", "Kitchen", 40.0),
        ]
    }

    #[test]
    fn test_top_products() {
        let report = top_products(&sample_events(), 2).unwrap();
        assert_eq!(report.total_products, 3);
        assert_eq!(report.top_products.len(), 2);
        // P2 revenue 90, P1 revenue 50.
        assert_eq!(report.top_products[0].product_id, "P2");
        assert_eq!(report.top_products[0].revenue, 90.0);
        assert_eq!(report.top_products[0].units, 2);
        assert_eq!(report.top_products[1].product_id, "P1");
    }

    #[test]
    fn test_revenue_tie_breaks_by_product_id() {
        let events = vec![
            event("C1", "P9", "Books", 10.0),
            event("C1", "P1", "Books", 10.0),
        ];
        let report = top_products(&events, 5).unwrap();
        assert_eq!(report.top_products[0].product_id, "P1");
        assert_eq!(report.top_products[1].product_id, "P9");
    }

    #[test]
    fn test_category_analysis() {
        let report = category_analysis(&sample_events()).unwrap();
        assert_eq!(report.total_categories, 3);
        assert_eq!(report.categories[0].category, "Kitchen");
        assert_eq!(report.categories[0].revenue, 90.0);
        assert_eq!(report.categories[2].category, "Sports");
    }

    #[test]
    fn test_customer_analysis() {
        let report = customer_analysis(&sample_events(), 2).unwrap();
        assert_eq!(report.total_customers, 3);
        // Totals: C1 = 70, C2 = 40, C3 = 40.
        assert_eq!(report.mean_spend, 50.0);
        assert_eq!(report.median_spend, 40.0);
        assert_eq!(report.top_customers[0].customer_id, "C1");
        assert_eq!(report.top_customers[0].total_spend, 70.0);
        // C2 and C3 tie on spend; identifier order decides.
        assert_eq!(report.top_customers[1].customer_id, "C2");
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_empty_events_rejected() {
        assert!(matches!(
            full_analysis(&[], 5).unwrap_err(),
            AnalyticsError::InsufficientData(_)
        ));
    }
}
