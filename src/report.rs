//! Plain-text rendering of analysis, segmentation and recommendation results
//!
//! The engines return structured values only; this module turns them into
//! the banner-framed reports the CLI prints. JSON output goes through serde
//! in the binary instead.

use std::fmt::Write;

use crate::analysis::{CategoryAnalysis, CustomerAnalysis, FullAnalysis, ProductAnalysis};
use crate::recommend::Recommendation;
use crate::segmentation::{CustomerSegment, SegmentationReport, Thresholds};

fn banner(title: &str) -> String {
    let frame = "=".repeat(title.len() + 6);
    format!("{frame}\n|| {title} ||\n{frame}\n")
}

pub fn render_product_analysis(report: &ProductAnalysis) -> String {
    let mut out = String::new();
    out.push_str("\n\t- Top Selling Products -\n");
    for product in &report.top_products {
        let _ = writeln!(
            out,
            "Product {}: ${:.2} ({} sales)",
            product.product_id, product.revenue, product.units
        );
    }
    let _ = writeln!(out, "Total products: {}", report.total_products);
    out
}

pub fn render_category_analysis(report: &CategoryAnalysis) -> String {
    let mut out = String::new();
    out.push_str("\n\t- Top Selling Categories -\n");
    for category in &report.categories {
        let _ = writeln!(
            out,
            "{}: ${:.2} ({} sales)",
            category.category, category.revenue, category.units
        );
    }
    out
}

pub fn render_customer_analysis(report: &CustomerAnalysis) -> String {
    let mut out = String::new();
    out.push_str("\n\t- Customer Spending Analysis -\n");
    let _ = writeln!(out, "Mean spend per customer: ${:.2}", report.mean_spend);
    let _ = writeln!(out, "Median spend per customer: ${:.2}", report.median_spend);
    out.push_str("\nTop Customers by Total Spend:\n");
    for customer in &report.top_customers {
        let _ = writeln!(
            out,
            "Customer {}: ${:.2} ({} purchases)",
            customer.customer_id, customer.total_spend, customer.purchases
        );
    }
    out
}

pub fn render_full_analysis(report: &FullAnalysis) -> String {
    let mut out = banner("Analysis Results");
    out.push_str(&render_product_analysis(&report.products));
    out.push_str(&render_category_analysis(&report.categories));
    out.push_str(&render_customer_analysis(&report.customers));
    out
}

fn render_thresholds(thresholds: &Thresholds) -> String {
    let mut out = String::new();
    out.push_str("\n\t- Segmentation Thresholds -\n");
    let _ = writeln!(out, "High Spending: ${:.2}", thresholds.high_spend);
    let _ = writeln!(out, "Medium Spending: ${:.2}", thresholds.medium_spend);
    let _ = writeln!(out, "High Frequency: {:.1}", thresholds.high_frequency);
    let _ = writeln!(out, "Medium Frequency: {:.1}", thresholds.medium_frequency);
    let _ = writeln!(out, "Recency Threshold: {:.1} days", thresholds.recency_days);
    out
}

pub fn render_segmentation(report: &SegmentationReport) -> String {
    let mut out = banner("Classification Results");
    out.push_str("\n\t- Customer Segmentation Analysis -\n");
    let _ = writeln!(out, "Total Customers: {}", report.total_customers);
    let _ = writeln!(out, "Number of Segments: {}", report.segments.len());
    out.push_str(&render_thresholds(&report.thresholds));
    out.push_str("\n\t- Segment Details -\n");
    for segment in &report.segments {
        let _ = writeln!(out, "{}", segment.name);
        let _ = writeln!(out, "\tCustomer Count: {}", segment.customer_count);
        let _ = writeln!(out, "\tAverage Spending: ${:.2}", segment.avg_spend);
        let _ = writeln!(out, "\tAverage Purchase Frequency: {:.1}", segment.avg_frequency);
        let _ = writeln!(out, "\tAverage Order Value: ${:.2}", segment.avg_order_value);
        let _ = writeln!(
            out,
            "\tAverage Days Since Purchase: {:.1}\n",
            segment.avg_recency_days
        );
    }
    out
}

pub fn render_customer_segment(result: &CustomerSegment) -> String {
    let mut out = banner("Classification Results");
    let _ = writeln!(
        out,
        "\n\t- Customer Segment Analysis for {} -",
        result.customer_id
    );
    let _ = writeln!(out, "Segment: {}", result.segment);
    let _ = writeln!(out, "Total Spending: ${:.2}", result.profile.total_spend);
    let _ = writeln!(out, "Purchase Frequency: {}", result.profile.purchase_count);
    let _ = writeln!(
        out,
        "Average Order Value: ${:.2}",
        result.profile.average_order_value
    );
    let _ = writeln!(
        out,
        "Days Since Last Purchase: {}",
        result.profile.recency_days
    );
    out.push_str(&render_thresholds(&result.thresholds));
    out
}

pub fn render_recommendations(customer_id: &str, recommendations: &[Recommendation]) -> String {
    let mut out = banner("Recommendation Results");
    let _ = writeln!(
        out,
        "\nTop {} Recommended Products for Customer {}:",
        recommendations.len(),
        customer_id
    );
    for (i, rec) in recommendations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. Product {} ({}) - Predicted Score: {:.4}",
            i + 1,
            rec.product_id,
            rec.category,
            rec.score
        );
    }
    if recommendations.is_empty() {
        out.push_str("No unpurchased products left to recommend.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ProductStats;

    #[test]
    fn test_banner_frames_title() {
        let text = banner("Analysis Results");
        assert!(text.contains("|| Analysis Results ||"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].len(), lines[1].len());
    }

    #[test]
    fn test_render_product_analysis() {
        let report = ProductAnalysis {
            top_products: vec![ProductStats {
                product_id: "P001".to_string(),
                revenue: 123.456,
                units: 3,
            }],
            total_products: 7,
        };
        let text = render_product_analysis(&report);
        assert!(text.contains("Product P001: $123.46 (3 sales)"));
        assert!(text.contains("Total products: 7"));
    }

    #[test]
    fn test_render_recommendations_empty() {
        let text = render_recommendations("C001", &[]);
        assert!(text.contains("No unpurchased products left"));
    }
}
