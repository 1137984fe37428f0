// Product feed loading (JSON array of raw product records)
use anyhow::{anyhow, Context, Result};
use nutriscan_core::{ecology_attributes_from_json, EcologyAttributes, NutrientProfile, RawProduct};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Load raw product records from a JSON file.
pub fn load_products<P: AsRef<Path>>(path: P) -> Result<Vec<RawProduct>> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("Failed to read product feed {:?}", path))?;
    let products = parse_products(&data).with_context(|| format!("Invalid product feed {:?}", path))?;
    info!(count = products.len(), path = ?path, "product feed loaded");
    Ok(products)
}

/// Parse a JSON array of raw product records.
///
/// Nutrient objects go through [`NutrientProfile::from_json`] and ecology
/// attributes through [`ecology_attributes_from_json`], so non-numeric
/// values are reported with the offending key and record index.
pub fn parse_products(data: &[u8]) -> Result<Vec<RawProduct>> {
    let value: Value = serde_json::from_slice(data)?;
    let records = value
        .as_array()
        .ok_or_else(|| anyhow!("product feed must be a JSON array"))?;

    records
        .iter()
        .enumerate()
        .map(|(i, record)| parse_record(record).with_context(|| format!("product record #{}", i)))
        .collect()
}

fn parse_record(record: &Value) -> Result<RawProduct> {
    let mut record = record.clone();
    let object = record
        .as_object_mut()
        .ok_or_else(|| anyhow!("product record must be a JSON object"))?;
    let nutrients = match object.remove("nutrients") {
        Some(raw) => NutrientProfile::from_json(&raw)?,
        None => NutrientProfile::default(),
    };
    let eco_attributes = match object.remove("eco_attributes") {
        Some(raw) => ecology_attributes_from_json(&raw)?,
        None => EcologyAttributes::new(),
    };
    let mut product: RawProduct = serde_json::from_value(record)?;
    product.nutrients = nutrients;
    product.eco_attributes = eco_attributes;
    Ok(product)
}
