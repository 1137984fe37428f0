//! Scoring engine
//!
//! Maps a [`NutrientProfile`] to a points-based nutrition grade and exposes
//! the ecology grade contract. Both scorers are pure functions.
//!
//! The nutrition profile is a simplified Nutri-Score: there is no special
//! handling for cheeses, added fats or beverages, and the fruit/vegetable
//! tiers are coarse (nothing is awarded at or below 40 %).

use crate::{Error, NutrientProfile, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Letter grade, `A` best to `E` worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }

    /// Grade for a nutrition point total (inclusive upper bounds)
    pub fn from_nutrition_points(total: i32) -> Self {
        match total {
            i32::MIN..=-1 => Grade::A,
            0..=2 => Grade::B,
            3..=10 => Grade::C,
            11..=18 => Grade::D,
            _ => Grade::E,
        }
    }

    /// Grade for an ecology score on the 0-100 scale
    pub fn from_ecology_score(score: f64) -> Self {
        if score <= 20.0 {
            Grade::A
        } else if score <= 40.0 {
            Grade::B
        } else if score <= 60.0 {
            Grade::C
        } else if score <= 80.0 {
            Grade::D
        } else {
            Grade::E
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a value is compared against each breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// One point per breakpoint strictly exceeded (`value > b`)
    Exceeds,
    /// One point per breakpoint met or exceeded (`value >= b`)
    Reaches,
}

/// Count the breakpoints of an ascending list that `value` passes.
#[inline]
pub fn tiered_points(value: f64, breakpoints: &[f64], mode: Threshold) -> u32 {
    breakpoints
        .iter()
        .take_while(|&&b| match mode {
            Threshold::Exceeds => value > b,
            Threshold::Reaches => value >= b,
        })
        .count() as u32
}

pub const ENERGY_BREAKPOINTS: [f64; 10] = [80.0, 160.0, 240.0, 320.0, 400.0, 480.0, 560.0, 640.0, 720.0, 800.0];
pub const SUGARS_BREAKPOINTS: [f64; 10] = [4.5, 9.0, 13.5, 18.0, 22.5, 27.0, 31.0, 36.0, 40.0, 45.0];
pub const SATURATED_FAT_BREAKPOINTS: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
pub const SODIUM_BREAKPOINTS: [f64; 10] = [90.0, 180.0, 270.0, 360.0, 450.0, 540.0, 630.0, 720.0, 810.0, 900.0];
pub const FIBRE_BREAKPOINTS: [f64; 5] = [0.9, 1.9, 2.8, 3.7, 4.7];
pub const PROTEIN_BREAKPOINTS: [f64; 5] = [1.6, 3.2, 4.8, 6.4, 8.0];

/// Fruit/vegetable/nut/legume points: >80 → 5, >60 → 2, >40 → 1, else 0
pub fn fruit_veg_points(percent: f64) -> u32 {
    if percent > 80.0 {
        5
    } else if percent > 60.0 {
        2
    } else if percent > 40.0 {
        1
    } else {
        0
    }
}

/// Nutrition score with its point breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionScore {
    /// Negative minus positive points
    pub points: i32,
    pub grade: Grade,
    /// Energy + sugars + saturated fat + sodium points
    pub negative_points: u32,
    /// Fibre + protein + fruit/vegetable points
    pub positive_points: u32,
}

/// Ecology score on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcologyScore {
    pub points: f64,
    pub grade: Grade,
    /// How much the score can be trusted, in [0, 1]
    pub confidence: f64,
}

/// Uniform envelope over both scorers, tagged by `kind` when serialized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreResult {
    Nutrition(NutritionScore),
    Ecology(EcologyScore),
}

impl ScoreResult {
    pub fn grade(&self) -> Grade {
        match self {
            ScoreResult::Nutrition(s) => s.grade,
            ScoreResult::Ecology(s) => s.grade,
        }
    }

    pub fn points(&self) -> f64 {
        match self {
            ScoreResult::Nutrition(s) => f64::from(s.points),
            ScoreResult::Ecology(s) => s.points,
        }
    }
}

impl From<NutritionScore> for ScoreResult {
    fn from(s: NutritionScore) -> Self {
        ScoreResult::Nutrition(s)
    }
}

impl From<EcologyScore> for ScoreResult {
    fn from(s: EcologyScore) -> Self {
        ScoreResult::Ecology(s)
    }
}

/// Compute the nutrition score of a profile.
///
/// Fails with [`Error::InvalidInput`] on negative, non-finite or
/// out-of-range values.
pub fn score_nutrition(profile: &NutrientProfile) -> Result<NutritionScore> {
    profile.validate()?;

    let negative_points = tiered_points(profile.energy_kcal, &ENERGY_BREAKPOINTS, Threshold::Exceeds)
        + tiered_points(profile.sugars, &SUGARS_BREAKPOINTS, Threshold::Exceeds)
        + tiered_points(profile.saturated_fat, &SATURATED_FAT_BREAKPOINTS, Threshold::Exceeds)
        + tiered_points(profile.sodium_mg, &SODIUM_BREAKPOINTS, Threshold::Exceeds);

    let positive_points = tiered_points(profile.fibre, &FIBRE_BREAKPOINTS, Threshold::Reaches)
        + tiered_points(profile.protein, &PROTEIN_BREAKPOINTS, Threshold::Reaches)
        + fruit_veg_points(profile.fruit_veg_percent);

    let points = negative_points as i32 - positive_points as i32;

    Ok(NutritionScore {
        points,
        grade: Grade::from_nutrition_points(points),
        negative_points,
        positive_points,
    })
}

/// Eco-impact attributes (carbon footprint, packaging, ...) keyed by name
pub type EcologyAttributes = BTreeMap<String, f64>;

const ECOLOGY_STUB_SCORE: f64 = 50.0;
const ECOLOGY_STUB_CONFIDENCE: f64 = 0.5;

/// Parse ecology attributes from a JSON object, rejecting non-numeric values.
pub fn ecology_attributes_from_json(value: &serde_json::Value) -> Result<EcologyAttributes> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::InvalidInput("ecology attributes must be a JSON object".to_string()))?;
    object
        .iter()
        .map(|(key, raw)| {
            raw.as_f64()
                .map(|v| (key.clone(), v))
                .ok_or_else(|| Error::InvalidInput(format!("ecology attribute '{}' is not numeric: {}", key, raw)))
        })
        .collect()
}

/// Compute the ecology score.
///
/// No life-cycle model backs this yet: every valid input scores 50 with
/// confidence 0.5, graded on the same 0-100 tiers a real model will use.
pub fn score_ecology(attributes: &EcologyAttributes) -> Result<EcologyScore> {
    if let Some((name, value)) = attributes.iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::InvalidInput(format!("ecology attribute '{}' is not a finite number: {}", name, value)));
    }

    Ok(EcologyScore {
        points: ECOLOGY_STUB_SCORE,
        grade: Grade::from_ecology_score(ECOLOGY_STUB_SCORE),
        confidence: ECOLOGY_STUB_CONFIDENCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tiered_points_modes() {
        let bps = [1.0, 2.0, 3.0];
        assert_eq!(tiered_points(2.0, &bps, Threshold::Exceeds), 1);
        assert_eq!(tiered_points(2.0, &bps, Threshold::Reaches), 2);
        assert_eq!(tiered_points(0.0, &bps, Threshold::Reaches), 0);
        assert_eq!(tiered_points(99.0, &bps, Threshold::Exceeds), 3);
    }

    #[test]
    fn test_all_zero_profile_is_b() {
        let score = score_nutrition(&NutrientProfile::default()).unwrap();
        assert_eq!(score.points, 0);
        assert_eq!(score.grade, Grade::B);
        assert_eq!(score.negative_points, 0);
        assert_eq!(score.positive_points, 0);
    }

    #[test]
    fn test_breakpoint_edges() {
        let mut profile = NutrientProfile::default();
        profile.energy_kcal = 80.0;
        assert_eq!(score_nutrition(&profile).unwrap().negative_points, 0);
        profile.energy_kcal = 80.01;
        assert_eq!(score_nutrition(&profile).unwrap().negative_points, 1);

        let mut profile = NutrientProfile::default();
        profile.fibre = 0.9;
        assert_eq!(score_nutrition(&profile).unwrap().positive_points, 1);
        profile.protein = 8.0;
        assert_eq!(score_nutrition(&profile).unwrap().positive_points, 6);
    }

    #[test]
    fn test_fruit_veg_tiers() {
        assert_eq!(fruit_veg_points(40.0), 0);
        assert_eq!(fruit_veg_points(40.5), 1);
        assert_eq!(fruit_veg_points(60.0), 1);
        assert_eq!(fruit_veg_points(61.0), 2);
        assert_eq!(fruit_veg_points(80.0), 2);
        assert_eq!(fruit_veg_points(81.0), 5);
    }

    #[test]
    fn test_worked_example() {
        let profile = NutrientProfile {
            energy_kcal: 250.0,
            sugars: 15.0,
            saturated_fat: 4.0,
            sodium_mg: 600.0,
            fibre: 3.0,
            protein: 5.0,
            fruit_veg_percent: 30.0,
        };
        let score = score_nutrition(&profile).unwrap();
        // energy 3, sugars 3, sat fat 3, sodium 6
        assert_eq!(score.negative_points, 15);
        // fibre 3, protein 3, fruit/veg 0
        assert_eq!(score.positive_points, 6);
        assert_eq!(score.points, 9);
        assert_eq!(score.grade, Grade::C);
    }

    #[test]
    fn test_maximum_profile_is_e() {
        let profile = NutrientProfile {
            energy_kcal: 900.0,
            sugars: 50.0,
            saturated_fat: 11.0,
            sodium_mg: 1000.0,
            ..Default::default()
        };
        let score = score_nutrition(&profile).unwrap();
        assert_eq!(score.points, 40);
        assert_eq!(score.grade, Grade::E);
    }

    #[test]
    fn test_grade_partition() {
        let expected = |p: i32| match p {
            p if p <= -1 => Grade::A,
            p if p <= 2 => Grade::B,
            p if p <= 10 => Grade::C,
            p if p <= 18 => Grade::D,
            _ => Grade::E,
        };
        for p in -15..=40 {
            assert_eq!(Grade::from_nutrition_points(p), expected(p), "points {}", p);
        }
        assert_eq!(Grade::from_nutrition_points(-1), Grade::A);
        assert_eq!(Grade::from_nutrition_points(2), Grade::B);
        assert_eq!(Grade::from_nutrition_points(3), Grade::C);
        assert_eq!(Grade::from_nutrition_points(18), Grade::D);
        assert_eq!(Grade::from_nutrition_points(19), Grade::E);
    }

    #[test]
    fn test_monotonic_in_each_nutrient() {
        let base = NutrientProfile {
            energy_kcal: 300.0,
            sugars: 10.0,
            saturated_fat: 3.5,
            sodium_mg: 400.0,
            fibre: 2.0,
            protein: 4.0,
            fruit_veg_percent: 50.0,
        };
        let points = |p: &NutrientProfile| score_nutrition(p).unwrap().points;

        for step in 1..60 {
            let delta = step as f64 * 17.3;

            let mut more_energy = base;
            more_energy.energy_kcal += delta;
            assert!(points(&more_energy) >= points(&base));

            let mut more_sodium = base;
            more_sodium.sodium_mg += delta;
            assert!(points(&more_sodium) >= points(&base));

            let mut more_sugar = base;
            more_sugar.sugars += delta / 10.0;
            assert!(points(&more_sugar) >= points(&base));

            let mut more_fat = base;
            more_fat.saturated_fat += delta / 20.0;
            assert!(points(&more_fat) >= points(&base));

            let mut more_fibre = base;
            more_fibre.fibre += delta / 50.0;
            assert!(points(&more_fibre) <= points(&base));

            let mut more_protein = base;
            more_protein.protein += delta / 50.0;
            assert!(points(&more_protein) <= points(&base));

            let mut more_fruit = base;
            more_fruit.fruit_veg_percent = (base.fruit_veg_percent + delta / 20.0).min(100.0);
            assert!(points(&more_fruit) <= points(&base));
        }
    }

    #[test]
    fn test_invalid_nutrition_input() {
        let profile = NutrientProfile { sodium_mg: -5.0, ..Default::default() };
        assert!(matches!(score_nutrition(&profile), Err(Error::InvalidInput(_))));

        let profile = NutrientProfile { sugars: f64::NAN, ..Default::default() };
        assert!(matches!(score_nutrition(&profile), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_ecology_is_constant() {
        let mut attributes = EcologyAttributes::new();
        for (i, name) in ["carbon_kg", "packaging", "transport_km"].iter().enumerate() {
            let score = score_ecology(&attributes).unwrap();
            assert_eq!(score.points, 50.0);
            assert_eq!(score.grade, Grade::C);
            assert_eq!(score.confidence, 0.5);
            attributes.insert(name.to_string(), (i as f64 + 1.0) * 123.4);
        }
    }

    #[test]
    fn test_ecology_rejects_malformed() {
        assert!(ecology_attributes_from_json(&json!({"carbon_kg": "n/a"})).is_err());

        let mut attributes = EcologyAttributes::new();
        attributes.insert("carbon_kg".to_string(), f64::INFINITY);
        assert!(score_ecology(&attributes).is_err());
    }

    #[test]
    fn test_ecology_tiers() {
        assert_eq!(Grade::from_ecology_score(20.0), Grade::A);
        assert_eq!(Grade::from_ecology_score(40.0), Grade::B);
        assert_eq!(Grade::from_ecology_score(60.0), Grade::C);
        assert_eq!(Grade::from_ecology_score(80.0), Grade::D);
        assert_eq!(Grade::from_ecology_score(80.1), Grade::E);
    }

    #[test]
    fn test_score_result_is_tagged() {
        let nutrition: ScoreResult = score_nutrition(&NutrientProfile::default()).unwrap().into();
        let value = serde_json::to_value(nutrition).unwrap();
        assert_eq!(value["kind"], "nutrition");
        assert_eq!(value["grade"], "B");

        let ecology: ScoreResult = score_ecology(&EcologyAttributes::new()).unwrap().into();
        let value = serde_json::to_value(ecology).unwrap();
        assert_eq!(value["kind"], "ecology");
        assert_eq!(value["confidence"], 0.5);
    }
}
