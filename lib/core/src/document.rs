use crate::Product;

/// Free-text rendering of a product used for retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalDocument {
    pub id: String,
    pub text: String,
}

impl RetrievalDocument {
    /// Concatenate name, brand, ingredient names, nutrient key/value pairs,
    /// labels and grade letters. Empty parts are skipped.
    pub fn from_product(product: &Product) -> Self {
        let mut parts: Vec<String> = Vec::new();
        parts.push(product.name.clone());
        parts.push(product.brand.clone());
        parts.extend(product.ingredients.iter().map(|i| i.name.clone()));
        parts.extend(product.nutrients.entries().iter().map(|(k, v)| format!("{} {}", k, v)));
        parts.extend(product.labels.iter().cloned());
        parts.push(format!("NutriScore {}", product.nutrition.grade));
        parts.push(format!("EcoScore {}", product.ecology.grade));

        parts.retain(|p| !p.trim().is_empty());

        Self {
            id: product.id.clone(),
            text: parts.join(" "),
        }
    }
}
