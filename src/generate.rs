//! Seeded synthetic purchase ledger generation

use std::fs::File;
use std::io::{BufWriter, Write};

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AnalyticsError;

/// Categories with realistic per-category amount ranges.
const CATEGORIES: [(&str, f64, f64); 9] = [
    ("Electronics", 100.0, 1000.0),
    ("Furniture", 50.0, 500.0),
    ("Clothing", 10.0, 200.0),
    ("Books", 5.0, 50.0),
    ("Grocery", 1.0, 100.0),
    ("Beauty", 10.0, 100.0),
    ("Kitchen", 20.0, 300.0),
    ("Sports", 20.0, 500.0),
    ("Appliances", 50.0, 2000.0),
];

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub customers: usize,
    pub products: usize,
    pub records: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub span_days: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            customers: 500,
            products: 50,
            records: 5000,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap_or_default(),
            span_days: 31,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> crate::Result<()> {
        if self.customers == 0 || self.products == 0 || self.records == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "customers, products and records must all be at least 1".to_string(),
            ));
        }
        if self.span_days <= 0 {
            return Err(AnalyticsError::InvalidParameter(
                "date span must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

/// Write a synthetic five-column purchase ledger to `path`.
///
/// Fully reproducible: the same config (seed included) always produces the
/// same file.
pub fn generate_dataset(path: &str, config: &GeneratorConfig) -> crate::Result<()> {
    config.validate()?;
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "Customer ID,Product ID,Product Category,Purchase Amount,Purchase Date"
    )?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    for _ in 0..config.records {
        let customer = rng.gen_range(1..=config.customers);
        let product = rng.gen_range(1..=config.products);
        let (category, min_amount, max_amount) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let amount = (rng.gen_range(min_amount..max_amount) * 100.0).round() / 100.0;
        let date = config.start_date + Duration::days(rng.gen_range(0..config.span_days));

        writeln!(
            writer,
            "C{customer:03},P{product:03},{category},{amount:.2},{date}",
            date = date.format("%Y-%m-%d")
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_dataset_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let path = path.to_str().unwrap();

        let config = GeneratorConfig {
            customers: 10,
            products: 5,
            records: 100,
            ..GeneratorConfig::default()
        };
        generate_dataset(path, &config).unwrap();

        let events = crate::data::load_events(path).unwrap();
        assert_eq!(events.len(), 100);
        assert!(events.iter().all(|e| e.amount >= 0.0));
        assert!(events.iter().all(|e| e.customer_id.starts_with('C')));
    }

    #[test]
    fn test_same_seed_same_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let config = GeneratorConfig {
            customers: 5,
            products: 5,
            records: 50,
            ..GeneratorConfig::default()
        };

        generate_dataset(a.to_str().unwrap(), &config).unwrap();
        generate_dataset(b.to_str().unwrap(), &config).unwrap();
        assert_eq!(
            std::fs::read_to_string(a).unwrap(),
            std::fs::read_to_string(b).unwrap()
        );
    }

    #[test]
    fn test_zero_records_rejected() {
        let config = GeneratorConfig {
            records: 0,
            ..GeneratorConfig::default()
        };
        let err = generate_dataset("unused.csv", &config).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }
}
