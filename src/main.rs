//! Salescope: sales ledger analytics from the command line
//!
//! This is the entrypoint that loads the ledger, dispatches to the analysis,
//! segmentation and recommendation engines, and renders the results.

use std::time::Instant;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;

use salescope::cli::{AnalysisKind, Cli, Command};
use salescope::generate::{generate_dataset, GeneratorConfig};
use salescope::segmentation::{customer_segment, SegmentationConfig};
use salescope::{analysis, report, RecommendConfig, Recommender};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            data,
            kind,
            limit,
            json,
        } => run_analyze(&data, kind, limit, json, cli.verbose),
        Command::Classify {
            data,
            clusters,
            customer,
            high_percentile,
            medium_percentile,
            recency_multiplier,
            as_of,
            json,
        } => {
            let config = SegmentationConfig {
                cluster_hint: clusters,
                high_percentile,
                medium_percentile,
                recency_multiplier,
            };
            run_classify(&data, &config, customer.as_deref(), as_of, json, cli.verbose)
        }
        Command::Recommend {
            data,
            customer,
            num,
            factors,
            seed,
            json,
        } => {
            let config = RecommendConfig {
                n_factors: factors,
                seed,
                ..RecommendConfig::default()
            };
            run_recommend(&data, &customer, num, &config, json, cli.verbose)
        }
        Command::Generate {
            output,
            customers,
            products,
            records,
            seed,
        } => {
            let config = GeneratorConfig {
                customers,
                products,
                records,
                seed,
                ..GeneratorConfig::default()
            };
            generate_dataset(&output, &config)?;
            println!("Synthetic dataset with {records} records saved to: {output}");
            Ok(())
        }
    }
}

fn run_analyze(
    data: &str,
    kind: AnalysisKind,
    limit: usize,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let start = Instant::now();
    let events = salescope::load_events(data)?;
    if verbose {
        println!("Loaded {} purchase events from {data}", events.len());
    }

    let output = match kind {
        AnalysisKind::Products => {
            let result = analysis::top_products(&events, limit)?;
            if json {
                serde_json::to_string_pretty(&result)?
            } else {
                report::render_product_analysis(&result)
            }
        }
        AnalysisKind::Categories => {
            let result = analysis::category_analysis(&events)?;
            if json {
                serde_json::to_string_pretty(&result)?
            } else {
                report::render_category_analysis(&result)
            }
        }
        AnalysisKind::Customers => {
            let result = analysis::customer_analysis(&events, limit)?;
            if json {
                serde_json::to_string_pretty(&result)?
            } else {
                report::render_customer_analysis(&result)
            }
        }
        AnalysisKind::Full => {
            let result = analysis::full_analysis(&events, limit)?;
            if json {
                serde_json::to_string_pretty(&result)?
            } else {
                report::render_full_analysis(&result)
            }
        }
    };

    println!("{output}");
    if verbose {
        println!("Processing time: {:.2}s", start.elapsed().as_secs_f64());
    }
    Ok(())
}

fn run_classify(
    data: &str,
    config: &SegmentationConfig,
    customer: Option<&str>,
    as_of: Option<NaiveDate>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let start = Instant::now();
    let events = salescope::load_events(data)?;
    let reference_date = as_of.unwrap_or_else(|| Local::now().date_naive());
    let profiles = salescope::build_profiles(&events, reference_date);
    if verbose {
        println!(
            "Loaded {} events, {} customers (reference date {reference_date})",
            events.len(),
            profiles.len()
        );
    }

    let output = if let Some(customer_id) = customer {
        let result = customer_segment(&profiles, config, customer_id)?;
        if json {
            serde_json::to_string_pretty(&result)?
        } else {
            report::render_customer_segment(&result)
        }
    } else {
        let result = salescope::segment_customers(&profiles, config)?;
        if json {
            serde_json::to_string_pretty(&result)?
        } else {
            report::render_segmentation(&result)
        }
    };

    println!("{output}");
    if verbose {
        println!("Processing time: {:.2}s", start.elapsed().as_secs_f64());
    }
    Ok(())
}

fn run_recommend(
    data: &str,
    customer: &str,
    num: usize,
    config: &RecommendConfig,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let start = Instant::now();
    let events = salescope::load_events(data)?;
    let recommender = Recommender::new(&events)?;
    if verbose {
        println!(
            "Loaded {} events: {} customers x {} products",
            events.len(),
            recommender.matrix().customer_count(),
            recommender.matrix().product_count()
        );
    }

    let recommendations = recommender.recommend(customer, num, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        println!("{}", report::render_recommendations(customer, &recommendations));
    }
    if verbose {
        println!("Processing time: {:.2}s", start.elapsed().as_secs_f64());
    }
    Ok(())
}
