use crate::{Product, RawProduct, Result, ScoreResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory product records keyed by identifier
///
/// Last write wins on upsert. Reads never fail: an unknown identifier is
/// reported as `None`.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: RwLock<HashMap<String, Product>>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score every raw record and upsert it, in feed order.
    pub fn from_raw(raw: impl IntoIterator<Item = RawProduct>) -> Result<Self> {
        let store = Self::new();
        for record in raw {
            store.upsert(Product::from_raw(record)?);
        }
        Ok(store)
    }

    pub fn count(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    /// Insert or replace a product by identifier
    pub fn upsert(&self, product: Product) {
        debug!(id = %product.id, name = %product.name, "upsert product");
        self.products.write().insert(product.id.clone(), product);
    }

    /// Get a product by identifier
    pub fn get(&self, id: &str) -> Option<Product> {
        self.products.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.read().contains_key(id)
    }

    /// Look up two products independently.
    ///
    /// Unknown identifiers map to `None`; the caller decides whether a
    /// partial result is acceptable.
    pub fn compare(&self, id_a: &str, id_b: &str) -> HashMap<String, Option<Product>> {
        let products = self.products.read();
        [id_a, id_b]
            .into_iter()
            .map(|id| (id.to_string(), products.get(id).cloned()))
            .collect()
    }

    /// Both score results of a product
    pub fn scores(&self, id: &str) -> Option<[ScoreResult; 2]> {
        self.products.read().get(id).map(Product::scores)
    }

    /// Snapshot of all products, sorted by identifier
    pub fn products(&self) -> Vec<Product> {
        let mut all: Vec<Product> = self.products.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}
