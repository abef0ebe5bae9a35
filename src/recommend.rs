//! Product recommendations from seeded matrix factorization
//!
//! Observed customer/product spend becomes a sparse implicit-feedback
//! matrix, factorized into low-rank latent vectors by SGD. Raw dot-product
//! scores are blended with the customer's historical category spend share
//! to counter sparsity, and unpurchased products are ranked by the blended
//! score. Customers without history fall back to global popularity.

use std::collections::{BTreeMap, HashMap};

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::data::PurchaseEvent;
use crate::error::AnalyticsError;

/// Factorization hyperparameters, passed explicitly into each call.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendConfig {
    /// Latent dimensionality.
    pub n_factors: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Hard cap on SGD epochs; hitting it is not an error.
    pub max_iterations: usize,
    /// Stop early once the epoch-to-epoch squared-error delta drops below this.
    pub tolerance: f64,
    /// Blend weight for the category-affinity term, in [0, 1].
    pub category_weight: f64,
    /// Seed for factor initialization; fixed seed gives bit-identical output.
    pub seed: u64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            n_factors: 10,
            learning_rate: 0.01,
            regularization: 0.05,
            max_iterations: 200,
            tolerance: 1e-6,
            category_weight: 0.3,
            seed: 42,
        }
    }
}

impl RecommendConfig {
    fn validate(&self) -> crate::Result<()> {
        if self.n_factors == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "latent factor count must be at least 1".to_string(),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.category_weight) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "category weight must be in [0, 1], got {}",
                self.category_weight
            )));
        }
        Ok(())
    }
}

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub product_id: String,
    pub category: String,
    pub score: f64,
}

/// Sparse customer-by-product implicit-feedback matrix.
///
/// Entries map (customer index, product index) to cumulative spend, so
/// memory stays proportional to observed events. Index tables are built
/// from sorted identifiers, keeping every downstream iteration order
/// deterministic.
#[derive(Debug)]
pub struct InteractionMatrix {
    entries: BTreeMap<(usize, usize), f64>,
    customers: Vec<String>,
    customer_index: HashMap<String, usize>,
    products: Vec<String>,
    product_index: HashMap<String, usize>,
    /// Category of each product, parallel to `products`.
    product_categories: Vec<String>,
    max_strength: f64,
}

impl InteractionMatrix {
    /// Build the matrix fresh from the event ledger.
    pub fn from_events(events: &[PurchaseEvent]) -> crate::Result<Self> {
        let mut customer_ids: Vec<&str> = events.iter().map(|e| e.customer_id.as_str()).collect();
        customer_ids.sort();
        customer_ids.dedup();
        let mut product_ids: Vec<&str> = events.iter().map(|e| e.product_id.as_str()).collect();
        product_ids.sort();
        product_ids.dedup();

        if product_ids.is_empty() {
            return Err(AnalyticsError::EmptyCatalog);
        }

        let customers: Vec<String> = customer_ids.iter().map(|s| s.to_string()).collect();
        let products: Vec<String> = product_ids.iter().map(|s| s.to_string()).collect();
        let customer_index: HashMap<String, usize> = customers
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let product_index: HashMap<String, usize> = products
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut product_categories = vec![String::new(); products.len()];
        let mut entries: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        let mut max_strength: f64 = 0.0;
        for event in events {
            let row = customer_index[&event.customer_id];
            let col = product_index[&event.product_id];
            let strength = entries.entry((row, col)).or_insert(0.0);
            *strength += event.amount;
            max_strength = max_strength.max(*strength);
            // Last category label seen for the product wins; real ledgers
            // keep this stable per product.
            product_categories[col] = event.category.clone();
        }

        Ok(Self {
            entries,
            customers,
            customer_index,
            products,
            product_index,
            product_categories,
            max_strength,
        })
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Products the customer has interacted with, as column indices.
    fn purchased_columns(&self, customer: usize) -> Vec<usize> {
        self.entries
            .range((customer, 0)..=(customer, usize::MAX))
            .map(|(&(_, col), _)| col)
            .collect()
    }

    /// The customer's spend share per category, from observed interactions.
    fn category_shares(&self, customer: usize) -> HashMap<&str, f64> {
        let mut per_category: HashMap<&str, f64> = HashMap::new();
        let mut total = 0.0;
        for (&(_, col), &strength) in self.entries.range((customer, 0)..=(customer, usize::MAX)) {
            *per_category
                .entry(self.product_categories[col].as_str())
                .or_insert(0.0) += strength;
            total += strength;
        }
        if total > 0.0 {
            for share in per_category.values_mut() {
                *share /= total;
            }
        }
        per_category
    }

    /// Total implicit strength per product, summed over all customers.
    fn popularity(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.products.len()];
        for (&(_, col), &strength) in &self.entries {
            totals[col] += strength;
        }
        totals
    }
}

/// Dense latent factors, one row per customer and one per product. Owned by
/// a single recommendation call and discarded afterwards.
struct LatentFactors {
    customers: Array2<f64>,
    products: Array2<f64>,
}

/// The recommendation engine. Holds the interaction matrix for one run;
/// factors are learned per request.
pub struct Recommender {
    matrix: InteractionMatrix,
}

impl Recommender {
    pub fn new(events: &[PurchaseEvent]) -> crate::Result<Self> {
        Ok(Self {
            matrix: InteractionMatrix::from_events(events)?,
        })
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    /// Rank up to `n` unpurchased products for `customer_id`, best first.
    ///
    /// A customer with no interaction history (unknown identifier included)
    /// gets the global popularity ranking instead of an error.
    pub fn recommend(
        &self,
        customer_id: &str,
        n: usize,
        config: &RecommendConfig,
    ) -> crate::Result<Vec<Recommendation>> {
        config.validate()?;

        let customer = match self.matrix.customer_index.get(customer_id) {
            Some(&row) => row,
            None => return Ok(self.popularity_ranking(n)),
        };
        let purchased = self.matrix.purchased_columns(customer);
        if purchased.is_empty() {
            return Ok(self.popularity_ranking(n));
        }

        let factors = factorize(&self.matrix, config);
        let shares = self.matrix.category_shares(customer);
        let customer_row = factors.customers.row(customer);

        let mut ranked: Vec<Recommendation> = Vec::new();
        for col in 0..self.matrix.product_count() {
            if purchased.binary_search(&col).is_ok() {
                continue;
            }
            let dot = customer_row.dot(&factors.products.row(col));
            // A diverging or untouched factor row must not leak non-finite
            // scores into the ranking.
            if !dot.is_finite() {
                continue;
            }
            let category = self.matrix.product_categories[col].as_str();
            let affinity = shares.get(category).copied().unwrap_or(0.0);
            let score =
                (1.0 - config.category_weight) * dot + config.category_weight * affinity;

            ranked.push(Recommendation {
                product_id: self.matrix.products[col].clone(),
                category: category.to_string(),
                score,
            });
        }

        sort_ranked(&mut ranked);
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Cold-start fallback: products ranked by total strength across the
    /// whole population.
    fn popularity_ranking(&self, n: usize) -> Vec<Recommendation> {
        let totals = self.matrix.popularity();
        let mut ranked: Vec<Recommendation> = totals
            .into_iter()
            .enumerate()
            .map(|(col, total)| Recommendation {
                product_id: self.matrix.products[col].clone(),
                category: self.matrix.product_categories[col].clone(),
                score: total,
            })
            .collect();
        sort_ranked(&mut ranked);
        ranked.truncate(n);
        ranked
    }
}

fn sort_ranked(ranked: &mut [Recommendation]) {
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

/// Learn latent factors by SGD over the observed entries.
///
/// Strengths are normalized by the maximum observed strength so the update
/// magnitudes stay in a stable range regardless of currency scale. Entries
/// are visited in fixed (sorted) order and the initializer is seeded, so the
/// result is a pure function of the input and the config.
fn factorize(matrix: &InteractionMatrix, config: &RecommendConfig) -> LatentFactors {
    let k = config.n_factors;
    let mut rng = StdRng::seed_from_u64(config.seed);
    // Uniform init scaled by 1/sqrt(k) keeps the initial dot products near
    // the normalized target range.
    let init_scale = (1.0 / k as f64).sqrt();
    let mut customers =
        Array2::from_shape_fn((matrix.customer_count(), k), |_| rng.gen::<f64>() * init_scale);
    let mut products =
        Array2::from_shape_fn((matrix.product_count(), k), |_| rng.gen::<f64>() * init_scale);

    let scale = if matrix.max_strength > 0.0 {
        matrix.max_strength
    } else {
        1.0
    };
    let lr = config.learning_rate;
    let reg = config.regularization;

    let mut previous_sse = f64::INFINITY;
    for _ in 0..config.max_iterations {
        let mut sse = 0.0;
        for (&(row, col), &strength) in &matrix.entries {
            let target = strength / scale;
            let customer_row = customers.row(row).to_owned();
            let product_row = products.row(col).to_owned();
            let error = target - customer_row.dot(&product_row);
            sse += error * error;

            customers
                .row_mut(row)
                .zip_mut_with(&product_row, |c, &p| *c += lr * (error * p - reg * *c));
            products
                .row_mut(col)
                .zip_mut_with(&customer_row, |p, &c| *p += lr * (error * c - reg * *p));
        }
        if (previous_sse - sse).abs() < config.tolerance {
            break;
        }
        previous_sse = sse;
    }

    LatentFactors {
        customers,
        products,
    }
}
