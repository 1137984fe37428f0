//! # NutriScan Core
//!
//! Core library for the NutriScan food product service.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`score_nutrition`] / [`score_ecology`] - Breakpoint-tiered grading
//! - [`Product`] - A scored product with ingredients and nutrients
//! - [`ProductStore`] - In-memory lookup and pairwise comparison
//! - [`RetrievalIndex`] - TF-IDF nearest-neighbor search over products
//! - [`AskContext`] - Keyword question routing with retrieval fallback
//!
//! ## Example
//!
//! ```rust
//! use nutriscan_core::{AskContext, Ingredient, IndexConfig, RawProduct, RouterConfig};
//!
//! let raw = vec![
//!     RawProduct::new("3017620422003", "Hazelnut spread")
//!         .with_ingredient(Ingredient::new("sugar").vegan())
//!         .with_ingredient(Ingredient::new("skimmed milk powder").vegetarian().with_allergen("milk")),
//! ];
//! let ctx = AskContext::bootstrap(raw, IndexConfig::default(), RouterConfig::default()).unwrap();
//!
//! let answer = ctx.ask("Is this vegan?", &["3017620422003".to_string()]).unwrap();
//! assert_eq!(answer.answer, "No, it is not vegan.");
//! ```

pub mod error;
pub mod nutrient;
pub mod score;
pub mod product;
pub mod store;
pub mod vector;
pub mod tfidf;
pub mod document;
pub mod index;
pub mod router;

pub use error::{Error, ErrorKind, Result};
pub use nutrient::NutrientProfile;
pub use score::{
    ecology_attributes_from_json, score_ecology, score_nutrition, tiered_points,
    EcologyAttributes, EcologyScore, Grade, NutritionScore, ScoreResult, Threshold,
};
pub use product::{Ingredient, Product, RawProduct};
pub use store::ProductStore;
pub use vector::SparseVector;
pub use tfidf::{TfIdfVectorizer, TokenizerConfig};
pub use document::RetrievalDocument;
pub use index::{IndexConfig, Metric, NeighborIndex, RetrievalIndex, TermWeightMatrix};
pub use router::{Answer, AskContext, Intent, RouterConfig};
