use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nutrient values per 100 g/mL
///
/// Field names follow the ingestion feed (`sugars_100g`, `sat_fat_100g`, ...).
/// Missing fields default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientProfile {
    /// Energy in kcal
    #[serde(rename = "energy_kcal_100g")]
    pub energy_kcal: f64,
    /// Sugars in g
    #[serde(rename = "sugars_100g")]
    pub sugars: f64,
    /// Saturated fat in g
    #[serde(rename = "sat_fat_100g")]
    pub saturated_fat: f64,
    /// Sodium in mg
    #[serde(rename = "sodium_100g")]
    pub sodium_mg: f64,
    /// Fibre in g
    #[serde(rename = "fibre_100g")]
    pub fibre: f64,
    /// Protein in g
    #[serde(rename = "protein_100g")]
    pub protein: f64,
    /// Fruit/vegetable/nut/legume share in percent
    #[serde(rename = "fvnl_percent")]
    pub fruit_veg_percent: f64,
}

pub const ENERGY_KCAL: &str = "energy_kcal_100g";
pub const SUGARS: &str = "sugars_100g";
pub const SATURATED_FAT: &str = "sat_fat_100g";
pub const SODIUM: &str = "sodium_100g";
pub const FIBRE: &str = "fibre_100g";
pub const PROTEIN: &str = "protein_100g";
pub const FRUIT_VEG_PERCENT: &str = "fvnl_percent";

impl NutrientProfile {
    /// Parse a profile from a loosely-typed JSON object.
    ///
    /// Unknown keys are ignored, missing keys default to 0 and any
    /// non-numeric value for a known key is rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidInput("nutrient profile must be a JSON object".to_string()))?;

        let mut profile = Self::default();
        for (key, raw) in object {
            let slot = match key.as_str() {
                ENERGY_KCAL => &mut profile.energy_kcal,
                SUGARS => &mut profile.sugars,
                SATURATED_FAT => &mut profile.saturated_fat,
                SODIUM => &mut profile.sodium_mg,
                FIBRE => &mut profile.fibre,
                PROTEIN => &mut profile.protein,
                FRUIT_VEG_PERCENT => &mut profile.fruit_veg_percent,
                _ => continue,
            };
            *slot = raw.as_f64().ok_or_else(|| {
                Error::InvalidInput(format!("nutrient '{}' is not numeric: {}", key, raw))
            })?;
        }
        Ok(profile)
    }

    /// Key/value pairs in a fixed order, used for retrieval documents
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            (ENERGY_KCAL, self.energy_kcal),
            (SUGARS, self.sugars),
            (SATURATED_FAT, self.saturated_fat),
            (SODIUM, self.sodium_mg),
            (FIBRE, self.fibre),
            (PROTEIN, self.protein),
            (FRUIT_VEG_PERCENT, self.fruit_veg_percent),
        ]
    }

    /// Reject values that are not physically meaningful.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.entries() {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("nutrient '{}' is not a finite number", name)));
            }
            if value < 0.0 {
                return Err(Error::InvalidInput(format!("nutrient '{}' must not be negative, got {}", name, value)));
            }
        }
        if self.fruit_veg_percent > 100.0 {
            return Err(Error::InvalidInput(format!(
                "nutrient '{}' must lie in [0, 100], got {}",
                FRUIT_VEG_PERCENT, self.fruit_veg_percent
            )));
        }
        Ok(())
    }
}
