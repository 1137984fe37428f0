//! Question router
//!
//! Classifies a free-text question by case-insensitive keyword and answers
//! it from the product store, falling back to retrieval search when no
//! keyword matches. All state lives in an explicit [`AskContext`] built once
//! at startup.

use crate::{Error, IndexConfig, Product, ProductStore, RawProduct, Result, RetrievalIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

const APOLOGY: &str =
    "I'm sorry, I can only answer whether a product is vegan or vegetarian, compare two products, or list allergens.";

/// What a question is asking for, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Vegan,
    Vegetarian,
    Compare,
    Allergens,
    Similar,
}

impl Intent {
    /// First matching keyword wins.
    pub fn classify(query: &str) -> Self {
        let query = query.trim().to_lowercase();
        if query.contains("vegan") {
            Intent::Vegan
        } else if query.contains("vegetarian") {
            Intent::Vegetarian
        } else if query.contains("compare") || query.contains("difference") {
            Intent::Compare
        } else if query.contains("allergen") {
            Intent::Allergens
        } else {
            Intent::Similar
        }
    }
}

/// Answer text plus the identifiers it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub intent: Intent,
    pub answer: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Number of neighbors requested when falling back to retrieval
    pub fallback_k: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { fallback_k: 3 }
    }
}

/// Store, index and settings shared by every question
pub struct AskContext {
    store: ProductStore,
    index: Option<RetrievalIndex>,
    config: RouterConfig,
}

impl AskContext {
    pub fn new(store: ProductStore, index: Option<RetrievalIndex>, config: RouterConfig) -> Self {
        Self { store, index, config }
    }

    /// Score and store every raw record, then index the stored products.
    pub fn bootstrap(
        raw: impl IntoIterator<Item = RawProduct>,
        index_config: IndexConfig,
        config: RouterConfig,
    ) -> Result<Self> {
        let store = ProductStore::from_raw(raw)?;
        let index = RetrievalIndex::build(&store.products(), index_config)?;
        Ok(Self::new(store, Some(index), config))
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    pub fn index(&self) -> Option<&RetrievalIndex> {
        self.index.as_ref()
    }

    /// Answer a question about zero, one or two products.
    pub fn ask(&self, query: &str, ids: &[String]) -> Result<Answer> {
        let intent = Intent::classify(query);
        debug!(?intent, ids = ids.len(), "routing question");

        match intent {
            Intent::Vegan => {
                let product = self.single(ids, "a vegan check")?;
                let answer = if product.is_vegan() {
                    "Yes, it is vegan."
                } else {
                    "No, it is not vegan."
                };
                Ok(Answer {
                    intent,
                    answer: answer.to_string(),
                    citations: vec![product.id],
                })
            }
            Intent::Vegetarian => {
                let product = self.single(ids, "a vegetarian check")?;
                let answer = if product.is_vegetarian() {
                    "Yes, it is vegetarian."
                } else {
                    "No, it is not vegetarian."
                };
                Ok(Answer {
                    intent,
                    answer: answer.to_string(),
                    citations: vec![product.id],
                })
            }
            Intent::Compare => self.compare(ids),
            Intent::Allergens => {
                let product = self.single(ids, "an allergen lookup")?;
                let allergens: Vec<String> = product.allergens().into_iter().collect();
                let answer = if allergens.is_empty() {
                    "No known allergens.".to_string()
                } else {
                    format!("Allergens: {}.", allergens.join(", "))
                };
                Ok(Answer {
                    intent,
                    answer,
                    citations: vec![product.id],
                })
            }
            Intent::Similar => Ok(self.similar(query)),
        }
    }

    fn single(&self, ids: &[String], purpose: &str) -> Result<Product> {
        match ids {
            [id] => self.store.get(id).ok_or_else(|| Error::NotFound(id.clone())),
            _ => Err(Error::BadRequest(format!(
                "exactly one product identifier is required for {}, got {}",
                purpose,
                ids.len()
            ))),
        }
    }

    fn compare(&self, ids: &[String]) -> Result<Answer> {
        let [id_a, id_b] = ids else {
            return Err(Error::BadRequest(format!(
                "exactly two product identifiers are required for a comparison, got {}",
                ids.len()
            )));
        };
        let a = self.store.get(id_a).ok_or_else(|| Error::NotFound(id_a.clone()))?;
        let b = self.store.get(id_b).ok_or_else(|| Error::NotFound(id_b.clone()))?;

        let clauses = [
            compare_nutrient(&a, &b, "sugar", "g", |p| p.nutrients.sugars),
            compare_nutrient(&a, &b, "saturated fat", "g", |p| p.nutrients.saturated_fat),
            compare_nutrient(&a, &b, "sodium", "mg", |p| p.nutrients.sodium_mg),
        ];

        Ok(Answer {
            intent: Intent::Compare,
            answer: format!("{}.", clauses.join("; ")),
            citations: vec![a.id, b.id],
        })
    }

    fn similar(&self, query: &str) -> Answer {
        let hits = match &self.index {
            Some(index) => index.search(&query.trim().to_lowercase(), self.config.fallback_k),
            None => Vec::new(),
        };

        let (citations, names): (Vec<String>, Vec<String>) = hits
            .into_iter()
            .filter_map(|(id, _)| self.store.get(&id).map(|p| (id, p.name)))
            .unzip();

        let answer = if names.is_empty() {
            APOLOGY.to_string()
        } else {
            format!(
                "I'm not sure how to answer that question directly, but here are some related products: {}.",
                names.join(", ")
            )
        };

        Answer {
            intent: Intent::Similar,
            answer,
            citations,
        }
    }
}

/// One comparison clause; the strictly lower value is "better".
fn compare_nutrient(a: &Product, b: &Product, label: &str, unit: &str, value: impl Fn(&Product) -> f64) -> String {
    let (va, vb) = (value(a), value(b));
    if va < vb {
        format!("{} has less {} ({} vs {} {}/100g)", a.name, label, va, vb, unit)
    } else if vb < va {
        format!("{} has less {} ({} vs {} {}/100g)", b.name, label, vb, va, unit)
    } else {
        format!("Both have the same {} ({} {}/100g)", label, va, unit)
    }
}
