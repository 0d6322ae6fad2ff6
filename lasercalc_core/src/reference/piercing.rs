//! # Piercing Reference Data
//!
//! Seconds per pierce for optimized high-pressure piercing on a fiber laser,
//! by material family and thickness bucket, plus the strategy multipliers
//! and per-pierce gas consumption used by the pierce estimator.
//!
//! ## Thickness Buckets
//!
//! | Bucket   | Upper bound (inclusive) |
//! |----------|-------------------------|
//! | 0.5-1mm  | 1                       |
//! | 1-2mm    | 2                       |
//! | 2-3mm    | 3                       |
//! | 3-5mm    | 5                       |
//! | 5-8mm    | 8                       |
//! | 8-12mm   | 12                      |
//! | 12-20mm  | 20                      |
//! | 20-25mm  | 25                      |
//!
//! Not every material is tabulated in every bucket: only mild steel goes to
//! 25 mm, stainless to 20 mm, aluminum to 12 mm and copper/brass to 8 mm.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::reference::piercing::{get_pierce_time, PierceStrategy};
//! use lasercalc_core::materials::SheetMaterial;
//! use lasercalc_core::lookup::Estimate;
//!
//! let t = get_pierce_time(SheetMaterial::MildSteel, 3.0, PierceStrategy::HighPressure, Estimate::Typical);
//! assert_eq!(t.found(), Some(0.5));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::{Estimate, Lookup, RangeValue};
use crate::materials::SheetMaterial;

/// Pierce count above which hole reduction is worth raising with the customer
pub const HIGH_PIERCE_COUNT: u32 = 50;
/// Pierce count above which piercing dominates the job
pub const VERY_HIGH_PIERCE_COUNT: u32 = 200;
/// Thick perforated plate above this count is a plasma candidate
pub const PLASMA_THRESHOLD: u32 = 500;
/// Thin perforated sheet above this count is a turret punch candidate
pub const PUNCHING_THRESHOLD: u32 = 100;
/// Piercing wears nozzles 50% faster than cutting
pub const NOZZLE_WEAR_MULTIPLIER: f64 = 1.5;

/// Thickness bucket of the pierce time table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PierceBucket {
    #[serde(rename = "0.5-1mm")]
    UpTo1,
    #[serde(rename = "1-2mm")]
    From1To2,
    #[serde(rename = "2-3mm")]
    From2To3,
    #[serde(rename = "3-5mm")]
    From3To5,
    #[serde(rename = "5-8mm")]
    From5To8,
    #[serde(rename = "8-12mm")]
    From8To12,
    #[serde(rename = "12-20mm")]
    From12To20,
    #[serde(rename = "20-25mm")]
    From20To25,
}

impl PierceBucket {
    pub const ALL: [PierceBucket; 8] = [
        PierceBucket::UpTo1,
        PierceBucket::From1To2,
        PierceBucket::From2To3,
        PierceBucket::From3To5,
        PierceBucket::From5To8,
        PierceBucket::From8To12,
        PierceBucket::From12To20,
        PierceBucket::From20To25,
    ];

    /// Inclusive upper bound in mm.
    pub fn upper_mm(&self) -> f64 {
        match self {
            PierceBucket::UpTo1 => 1.0,
            PierceBucket::From1To2 => 2.0,
            PierceBucket::From2To3 => 3.0,
            PierceBucket::From3To5 => 5.0,
            PierceBucket::From5To8 => 8.0,
            PierceBucket::From8To12 => 12.0,
            PierceBucket::From12To20 => 20.0,
            PierceBucket::From20To25 => 25.0,
        }
    }

    /// Table label (e.g., "2-3mm")
    pub fn label(&self) -> &'static str {
        match self {
            PierceBucket::UpTo1 => "0.5-1mm",
            PierceBucket::From1To2 => "1-2mm",
            PierceBucket::From2To3 => "2-3mm",
            PierceBucket::From3To5 => "3-5mm",
            PierceBucket::From5To8 => "5-8mm",
            PierceBucket::From8To12 => "8-12mm",
            PierceBucket::From12To20 => "12-20mm",
            PierceBucket::From20To25 => "20-25mm",
        }
    }

    /// First bucket whose upper bound is ≥ the thickness.
    ///
    /// `None` for non-finite, non-positive or > 25 mm thickness.
    pub fn for_thickness(thickness_mm: f64) -> Option<PierceBucket> {
        if !thickness_mm.is_finite() || thickness_mm <= 0.0 {
            return None;
        }
        PierceBucket::ALL
            .into_iter()
            .find(|b| thickness_mm <= b.upper_mm())
    }
}

impl std::fmt::Display for PierceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Piercing technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PierceStrategy {
    /// Standard fiber laser pierce
    #[default]
    HighPressure,
    /// Ramped power, less splatter
    Ramped,
    /// Low power for delicate parts
    LowPower,
    /// Pulsed, for thick plate
    Pulsed,
    /// Lead-in from the sheet edge, no pierce at all
    EdgeStart,
}

impl PierceStrategy {
    pub const ALL: [PierceStrategy; 5] = [
        PierceStrategy::HighPressure,
        PierceStrategy::Ramped,
        PierceStrategy::LowPower,
        PierceStrategy::Pulsed,
        PierceStrategy::EdgeStart,
    ];

    /// The strategies that actually pierce, in comparison order.
    pub const PIERCING: [PierceStrategy; 4] = [
        PierceStrategy::HighPressure,
        PierceStrategy::Ramped,
        PierceStrategy::LowPower,
        PierceStrategy::Pulsed,
    ];

    /// Multiplier applied to the high-pressure base time.
    pub fn modifier(&self) -> f64 {
        match self {
            PierceStrategy::HighPressure => 1.0,
            PierceStrategy::Ramped => 1.15,
            PierceStrategy::LowPower => 1.3,
            PierceStrategy::Pulsed => 1.4,
            PierceStrategy::EdgeStart => 0.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PierceStrategy::HighPressure => "High Pressure (Standard)",
            PierceStrategy::Ramped => "Ramped (Low Splatter)",
            PierceStrategy::LowPower => "Low Power (Delicate)",
            PierceStrategy::Pulsed => "Pulsed (Thick Material)",
            PierceStrategy::EdgeStart => "Edge Start (No Pierce)",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "highpressure" | "standard" | "hp" => Ok(PierceStrategy::HighPressure),
            "ramped" | "ramp" => Ok(PierceStrategy::Ramped),
            "lowpower" | "delicate" => Ok(PierceStrategy::LowPower),
            "pulsed" | "pulse" => Ok(PierceStrategy::Pulsed),
            "edgestart" | "edge" => Ok(PierceStrategy::EdgeStart),
            _ => Err(CalcError::invalid_input(
                "strategy",
                s,
                "Expected high_pressure, ramped, low_power, pulsed or edge_start",
            )),
        }
    }
}

impl std::fmt::Display for PierceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Assist gas used while piercing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistGas {
    #[default]
    Nitrogen,
    Oxygen,
    Air,
}

impl AssistGas {
    pub const ALL: [AssistGas; 3] = [AssistGas::Nitrogen, AssistGas::Oxygen, AssistGas::Air];

    /// Extra gas burned per pierce (m³)
    pub fn gas_per_pierce_m3(&self) -> f64 {
        match self {
            AssistGas::Nitrogen => 0.002,
            AssistGas::Oxygen => 0.003,
            AssistGas::Air => 0.001,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssistGas::Nitrogen => "Nitrogen",
            AssistGas::Oxygen => "Oxygen",
            AssistGas::Air => "Compressed Air",
        }
    }
}

/// Raw min/typical/max row for a material in a bucket, if tabulated.
fn pierce_row(material: SheetMaterial, bucket: PierceBucket) -> Option<RangeValue> {
    use PierceBucket::*;
    use SheetMaterial::*;

    let r = RangeValue::new;
    let row = match (material, bucket) {
        (MildSteel, UpTo1) => r(0.1, 0.2, 0.3),
        (MildSteel, From1To2) => r(0.2, 0.3, 0.5),
        (MildSteel, From2To3) => r(0.3, 0.5, 0.8),
        (MildSteel, From3To5) => r(0.5, 0.8, 1.2),
        (MildSteel, From5To8) => r(0.8, 1.5, 2.5),
        (MildSteel, From8To12) => r(1.5, 2.5, 4.0),
        (MildSteel, From12To20) => r(2.5, 4.0, 6.0),
        (MildSteel, From20To25) => r(4.0, 6.0, 8.0),

        (StainlessSteel, UpTo1) => r(0.2, 0.3, 0.5),
        (StainlessSteel, From1To2) => r(0.3, 0.5, 0.8),
        (StainlessSteel, From2To3) => r(0.5, 0.8, 1.2),
        (StainlessSteel, From3To5) => r(0.8, 1.2, 2.0),
        (StainlessSteel, From5To8) => r(1.2, 2.0, 3.5),
        (StainlessSteel, From8To12) => r(2.0, 3.5, 5.5),
        (StainlessSteel, From12To20) => r(3.5, 5.5, 8.0),
        (StainlessSteel, From20To25) => return None,

        (Aluminum, UpTo1) => r(0.1, 0.2, 0.4),
        (Aluminum, From1To2) => r(0.2, 0.4, 0.6),
        (Aluminum, From2To3) => r(0.4, 0.6, 1.0),
        (Aluminum, From3To5) => r(0.6, 1.0, 1.5),
        (Aluminum, From5To8) => r(1.0, 1.5, 2.5),
        (Aluminum, From8To12) => r(1.5, 2.5, 4.0),
        (Aluminum, From12To20 | From20To25) => return None,

        (CopperBrass, UpTo1) => r(0.3, 0.5, 0.8),
        (CopperBrass, From1To2) => r(0.5, 0.8, 1.2),
        (CopperBrass, From2To3) => r(0.8, 1.2, 2.0),
        (CopperBrass, From3To5) => r(1.2, 2.0, 3.0),
        (CopperBrass, From5To8) => r(2.0, 3.0, 5.0),
        (CopperBrass, From8To12 | From12To20 | From20To25) => return None,
    };
    Some(row)
}

/// Look up the base (high-pressure) pierce time range for a material and thickness.
pub fn pierce_time_range(material: SheetMaterial, thickness_mm: f64) -> Lookup<RangeValue> {
    let Some(bucket) = PierceBucket::for_thickness(thickness_mm) else {
        return Lookup::not_found(
            "pierce time",
            format!("Thickness {}mm is outside the 0-25mm table", thickness_mm),
        );
    };
    tracing::debug!(material = material.code(), %bucket, "pierce bucket");
    match pierce_row(material, bucket) {
        Some(row) => Lookup::Found(row),
        None => Lookup::not_found(
            "pierce time",
            format!("Thickness {}mm not supported for {}", thickness_mm, material.code()),
        ),
    }
}

/// Seconds per pierce: tabulated base time × strategy modifier.
///
/// Edge start is tabulated like any other strategy and yields 0 s.
pub fn get_pierce_time(
    material: SheetMaterial,
    thickness_mm: f64,
    strategy: PierceStrategy,
    quality: Estimate,
) -> Lookup<f64> {
    pierce_time_range(material, thickness_mm).map(|row| row.pick(quality) * strategy.modifier())
}

/// Total pierce seconds for `hole_count` holes (linear, no batching effects).
pub fn calculate_total_pierce_time(
    hole_count: u32,
    material: SheetMaterial,
    thickness_mm: f64,
    strategy: PierceStrategy,
    quality: Estimate,
) -> Lookup<f64> {
    get_pierce_time(material, thickness_mm, strategy, quality).map(|t| f64::from(hole_count) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mild_steel_3mm_high_pressure() {
        let t = get_pierce_time(SheetMaterial::MildSteel, 3.0, PierceStrategy::HighPressure, Estimate::Typical);
        assert_eq!(t, Lookup::Found(0.5));
    }

    #[test]
    fn test_total_pierce_time_is_linear() {
        let total = calculate_total_pierce_time(
            20,
            SheetMaterial::MildSteel,
            3.0,
            PierceStrategy::HighPressure,
            Estimate::Typical,
        );
        assert!((total.found().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_bucket_boundaries_are_inclusive() {
        assert_eq!(PierceBucket::for_thickness(2.0), Some(PierceBucket::From1To2));
        assert_eq!(PierceBucket::for_thickness(2.0001), Some(PierceBucket::From2To3));
        assert_eq!(PierceBucket::for_thickness(0.3), Some(PierceBucket::UpTo1));
        assert_eq!(PierceBucket::for_thickness(25.0), Some(PierceBucket::From20To25));
        assert_eq!(PierceBucket::for_thickness(25.1), None);
        assert_eq!(PierceBucket::for_thickness(0.0), None);
        assert_eq!(PierceBucket::for_thickness(f64::NAN), None);

        // Same answer on every call
        for _ in 0..3 {
            let t = get_pierce_time(SheetMaterial::StainlessSteel, 2.0, PierceStrategy::Ramped, Estimate::Max);
            assert!((t.found().unwrap() - 0.8 * 1.15).abs() < 1e-12);
        }
    }

    #[test]
    fn test_untabulated_thickness_is_not_found() {
        assert!(!pierce_time_range(SheetMaterial::Aluminum, 15.0).is_found());
        assert!(!pierce_time_range(SheetMaterial::CopperBrass, 10.0).is_found());
        assert!(!pierce_time_range(SheetMaterial::StainlessSteel, 22.0).is_found());
        assert!(!pierce_time_range(SheetMaterial::MildSteel, 30.0).is_found());
        // Stainless is tabulated through 20mm
        assert_eq!(
            pierce_time_range(SheetMaterial::StainlessSteel, 15.0),
            Lookup::Found(RangeValue::new(3.5, 5.5, 8.0))
        );
    }

    #[test]
    fn test_strategy_modifiers() {
        let base = get_pierce_time(SheetMaterial::MildSteel, 10.0, PierceStrategy::HighPressure, Estimate::Typical)
            .found()
            .unwrap();
        let pulsed = get_pierce_time(SheetMaterial::MildSteel, 10.0, PierceStrategy::Pulsed, Estimate::Typical)
            .found()
            .unwrap();
        let edge = get_pierce_time(SheetMaterial::MildSteel, 10.0, PierceStrategy::EdgeStart, Estimate::Typical)
            .found()
            .unwrap();
        assert_eq!(base, 2.5);
        assert!((pulsed - 3.5).abs() < 1e-12);
        assert_eq!(edge, 0.0);
    }

    #[test]
    fn test_every_material_covers_thin_sheet() {
        for m in SheetMaterial::ALL {
            for thickness in [0.5, 1.0, 2.0, 3.0, 5.0, 8.0] {
                assert!(pierce_time_range(m, thickness).is_found(), "{} {}mm", m, thickness);
            }
        }
    }
}
