//! # NutriScan
//!
//! Grades food products and answers simple questions about them.
//!
//! NutriScan scores products on a Nutri-Score style nutrition scale and a
//! (placeholder) ecology scale, keeps them in an in-memory store for lookup
//! and comparison, and answers a handful of natural-language questions,
//! falling back to TF-IDF similarity search when no question pattern matches.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! nutriscan --data data/products.json product 737628064502
//! nutriscan --data data/products.json ask "Is this vegan?" --barcode 737628064502
//! nutriscan --data data/products.json --index-dir data/index ask "crunchy peanut snack"
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use nutriscan::prelude::*;
//!
//! let raw = vec![
//!     RawProduct::new("1", "Lentil soup").with_ingredient(Ingredient::new("lentils").vegan()),
//!     RawProduct::new("2", "Cheese pizza").with_ingredient(Ingredient::new("mozzarella").vegetarian()),
//! ];
//! let ctx = AskContext::bootstrap(raw, IndexConfig::default(), RouterConfig::default()).unwrap();
//!
//! let product = ctx.store().get("1").unwrap();
//! assert_eq!(product.nutrition.grade, Grade::B);
//!
//! let answer = ctx.ask("something with lentils", &[]).unwrap();
//! assert_eq!(answer.citations[0], "1");
//! ```
//!
//! ## Crate Structure
//!
//! - [`nutriscan-core`](https://docs.rs/nutriscan-core) - Scoring, product store, retrieval index, question routing
//! - [`nutriscan-storage`](https://docs.rs/nutriscan-storage) - Product feed loading and index snapshots

// Re-export core types
pub use nutriscan_core::{
    score_ecology, score_nutrition,
    Answer, AskContext, EcologyAttributes, EcologyScore, Error, ErrorKind, Grade,
    IndexConfig, Ingredient, Intent, Metric, NutrientProfile, NutritionScore,
    Product, ProductStore, RawProduct, Result, RetrievalIndex, RouterConfig, ScoreResult,
};

// Re-export storage
pub use nutriscan_storage::{load_products, IndexSnapshotStore};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        score_ecology, score_nutrition,
        Answer, AskContext, EcologyAttributes, Error, Grade,
        IndexConfig, Ingredient, Intent, NutrientProfile,
        Product, ProductStore, RawProduct, Result, RetrievalIndex, RouterConfig, ScoreResult,
        IndexSnapshotStore,
    };
}
