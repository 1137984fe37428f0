use crate::score::{score_ecology, score_nutrition, EcologyAttributes, EcologyScore, NutritionScore, ScoreResult};
use crate::{NutrientProfile, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single ingredient with its dietary flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, alias = "vegan_flag")]
    pub vegan: bool,
    #[serde(default, alias = "vegetarian_flag")]
    pub vegetarian: bool,
    #[serde(default, alias = "allergens_flags")]
    pub allergens: BTreeSet<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vegan: false,
            vegetarian: false,
            allergens: BTreeSet::new(),
        }
    }

    /// Mark as vegan, which implies vegetarian
    #[must_use]
    pub fn vegan(mut self) -> Self {
        self.vegan = true;
        self.vegetarian = true;
        self
    }

    #[must_use]
    pub fn vegetarian(mut self) -> Self {
        self.vegetarian = true;
        self
    }

    #[must_use]
    pub fn with_allergen(mut self, tag: impl Into<String>) -> Self {
        self.allergens.insert(tag.into());
        self
    }
}

/// Product record as delivered by the ingestion feed, before scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(alias = "barcode")]
    pub id: String,
    #[serde(alias = "product_name")]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub nutrients: NutrientProfile,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub eco_attributes: EcologyAttributes,
}

impl RawProduct {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: String::new(),
            ingredients: Vec::new(),
            nutrients: NutrientProfile::default(),
            labels: Vec::new(),
            eco_attributes: EcologyAttributes::new(),
        }
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    #[must_use]
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    #[must_use]
    pub fn with_nutrients(mut self, nutrients: NutrientProfile) -> Self {
        self.nutrients = nutrients;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

/// A scored product, as held by the product store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub ingredients: Vec<Ingredient>,
    pub nutrients: NutrientProfile,
    #[serde(default)]
    pub labels: Vec<String>,
    pub nutrition: NutritionScore,
    pub ecology: EcologyScore,
}

impl Product {
    /// Normalize a raw record and attach both scores.
    pub fn from_raw(raw: RawProduct) -> Result<Self> {
        let nutrition = score_nutrition(&raw.nutrients)?;
        let ecology = score_ecology(&raw.eco_attributes)?;

        let ingredients = raw
            .ingredients
            .into_iter()
            .map(|mut ingredient| {
                ingredient.allergens = normalize_allergens(ingredient.allergens.iter());
                ingredient
            })
            .collect();

        Ok(Self {
            id: raw.id,
            name: raw.name,
            brand: raw.brand,
            ingredients,
            nutrients: raw.nutrients,
            labels: raw.labels,
            nutrition,
            ecology,
        })
    }

    /// True when every ingredient is flagged vegan
    pub fn is_vegan(&self) -> bool {
        self.ingredients.iter().all(|i| i.vegan)
    }

    /// True when every ingredient is flagged vegetarian
    pub fn is_vegetarian(&self) -> bool {
        self.ingredients.iter().all(|i| i.vegetarian)
    }

    /// Sorted, deduplicated union of allergen tags across ingredients
    pub fn allergens(&self) -> BTreeSet<String> {
        normalize_allergens(self.ingredients.iter().flat_map(|i| i.allergens.iter()))
    }

    pub fn scores(&self) -> [ScoreResult; 2] {
        [self.nutrition.into(), self.ecology.into()]
    }
}

fn normalize_allergens<'a>(tags: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    tags.map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grade;
    use serde_json::json;

    #[test]
    fn test_from_raw_attaches_scores() {
        let product = Product::from_raw(RawProduct::new("1", "Water")).unwrap();
        assert_eq!(product.nutrition.grade, Grade::B);
        assert_eq!(product.ecology.grade, Grade::C);
    }

    #[test]
    fn test_from_raw_rejects_invalid_nutrients() {
        let raw = RawProduct::new("1", "Broken").with_nutrients(NutrientProfile {
            protein: -1.0,
            ..Default::default()
        });
        assert!(Product::from_raw(raw).is_err());
    }

    #[test]
    fn test_allergens_normalized_and_deduplicated() {
        let raw = RawProduct::new("1", "Cookie")
            .with_ingredient(Ingredient::new("flour").with_allergen("Gluten ").with_allergen("gluten"))
            .with_ingredient(Ingredient::new("butter").with_allergen("MILK"))
            .with_ingredient(Ingredient::new("wheat").with_allergen("Gluten"));
        let product = Product::from_raw(raw).unwrap();

        let allergens: Vec<_> = product.allergens().into_iter().collect();
        assert_eq!(allergens, vec!["gluten".to_string(), "milk".to_string()]);
        assert_eq!(product.ingredients[0].allergens.len(), 1);
    }

    #[test]
    fn test_dietary_flags() {
        let raw = RawProduct::new("1", "Omelette")
            .with_ingredient(Ingredient::new("egg").vegetarian())
            .with_ingredient(Ingredient::new("chive").vegan());
        let product = Product::from_raw(raw).unwrap();
        assert!(!product.is_vegan());
        assert!(product.is_vegetarian());
    }

    #[test]
    fn test_raw_product_accepts_feed_keys() {
        let raw: RawProduct = serde_json::from_value(json!({
            "barcode": "737628064502",
            "product_name": "Thai peanut noodle kit",
            "brand": "Simply Asia",
            "ingredients": [
                {"name": "rice noodles", "vegan_flag": true, "vegetarian_flag": true},
                {"name": "peanuts", "vegan_flag": true, "vegetarian_flag": true, "allergens_flags": ["peanuts"]}
            ],
            "nutrients": {"sugars_100g": 13.0, "sodium_100g": 720.0}
        }))
        .unwrap();
        assert_eq!(raw.id, "737628064502");
        assert_eq!(raw.ingredients.len(), 2);
        assert!(raw.ingredients[1].allergens.contains("peanuts"));
        assert_eq!(raw.nutrients.sodium_mg, 720.0);
    }
}
