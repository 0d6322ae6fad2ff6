//! # Laser Marking Cost
//!
//! Cycle time and piece cost of marking or engraving an area with a fiber
//! marking laser.
//!
//! ## Marking Speed
//!
//! ```text
//! speed (mm²/s) = base(material, method) × 0.7^depth × 10 / fill_density
//! time (s)      = area / speed × passes
//! ```
//!
//! The base speed table has holes: foaming only works on plastics,
//! annealing only on bare metals, and so on. A missing cell is a
//! [`Lookup::NotFound`], which [`calculate`] turns into
//! `UnsupportedCombination`.
//!
//! ## Handling
//!
//! Loading, positioning and unloading take 12 s per piece, dropping to 8 s
//! above 10 pieces and 5 s above 100 (fixtured trays).
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::marking::{calculate, MarkingInput, MarkingMethod};
//! use lasercalc_core::materials::MarkingMaterial;
//!
//! let input = MarkingInput {
//!     material: MarkingMaterial::Wood,
//!     method: MarkingMethod::Carbonization,
//!     ..MarkingInput::default()
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.base_speed_mm2_s, 90.0);
//! ```

use serde::{Deserialize, Serialize};

use super::welding::format_batch_time;
use crate::errors::{ensure_range, CalcResult};
use crate::lookup::Lookup;
use crate::materials::MarkingMaterial;

/// Margin on price for the recommended price
pub const MARKING_PROFIT_MARGIN: f64 = 0.35;

/// Speed retained per mm of depth
pub const DEPTH_SPEED_FACTOR: f64 = 0.7;

/// Fill density the base speeds were measured at (lines/mm)
pub const REFERENCE_FILL_DENSITY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingMethod {
    /// Heat tint color marking on metals
    #[default]
    Annealing,
    Engraving,
    Etching,
    /// Coating or anodize removal
    Ablation,
    Foaming,
    Carbonization,
}

impl MarkingMethod {
    pub const ALL: [MarkingMethod; 6] = [
        MarkingMethod::Annealing,
        MarkingMethod::Engraving,
        MarkingMethod::Etching,
        MarkingMethod::Ablation,
        MarkingMethod::Foaming,
        MarkingMethod::Carbonization,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MarkingMethod::Annealing => "Annealing (Color Mark)",
            MarkingMethod::Engraving => "Deep Engraving",
            MarkingMethod::Etching => "Surface Etching",
            MarkingMethod::Ablation => "Coating Removal",
            MarkingMethod::Foaming => "Foaming (Plastics)",
            MarkingMethod::Carbonization => "Carbonization (Organic)",
        }
    }
}

/// What is being marked. Carried through for reports; it does not change
/// the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingJobType {
    Text,
    Logo,
    Barcode,
    QrCode,
    #[default]
    SerialNumber,
    Graphics,
    PhotoEngraving,
}

/// Base area rate (mm²/s) for a 30-50 W fiber marker.
pub fn marking_speed(material: MarkingMaterial, method: MarkingMethod) -> Lookup<f64> {
    use MarkingMaterial as M;
    use MarkingMethod::*;

    // annealing, engraving, etching, ablation, foaming, carbonization
    let row: [Option<f64>; 6] = match material {
        M::StainlessSteel => [Some(80.0), Some(25.0), Some(60.0), Some(50.0), None, None],
        M::Aluminum => [Some(90.0), Some(35.0), Some(70.0), Some(60.0), None, None],
        M::Brass => [Some(70.0), Some(30.0), Some(55.0), Some(45.0), None, None],
        M::Copper => [Some(65.0), Some(28.0), Some(50.0), Some(40.0), None, None],
        M::Titanium => [Some(75.0), Some(20.0), Some(55.0), Some(45.0), None, None],
        M::Plastics => [None, Some(40.0), Some(80.0), None, Some(100.0), Some(60.0)],
        M::CoatedMetal => [None, Some(30.0), Some(50.0), Some(90.0), None, None],
        M::AnodizedAluminum => [None, Some(35.0), Some(60.0), Some(95.0), None, None],
        M::Wood => [None, Some(50.0), Some(70.0), None, None, Some(90.0)],
        M::Leather => [None, Some(45.0), Some(65.0), None, None, Some(85.0)],
        M::Acrylic => [None, Some(55.0), Some(75.0), None, None, Some(70.0)],
        M::Glass => [None, Some(15.0), Some(30.0), None, None, None],
        M::Ceramic => [None, Some(12.0), Some(25.0), None, None, None],
    };
    let column = match method {
        Annealing => 0,
        Engraving => 1,
        Etching => 2,
        Ablation => 3,
        Foaming => 4,
        Carbonization => 5,
    };
    match row[column] {
        Some(speed) => Lookup::Found(speed),
        None => Lookup::not_found(
            "marking speed",
            format!("{} is not used on {}", method.display_name(), material.display_name()),
        ),
    }
}

/// Share of the rated power that does useful marking, by laser size.
pub fn marking_power_efficiency(power_w: f64) -> f64 {
    if power_w <= 20.0 {
        0.75
    } else if power_w <= 30.0 {
        0.85
    } else if power_w <= 50.0 {
        0.90
    } else if power_w <= 60.0 {
        0.92
    } else {
        0.95
    }
}

/// Handling seconds per piece by batch quantity.
pub fn handling_time_per_piece_s(quantity: u32) -> f64 {
    if quantity > 100 {
        5.0
    } else if quantity > 10 {
        8.0
    } else {
        12.0
    }
}

/// Input parameters for a marking cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingInput {
    #[serde(default)]
    pub label: String,
    pub material: MarkingMaterial,
    #[serde(default)]
    pub method: MarkingMethod,
    #[serde(default)]
    pub job_type: MarkingJobType,

    /// 1 to 1,000,000 mm²
    pub marking_area_mm2: f64,
    /// 0.01 to 5 mm
    pub marking_depth_mm: f64,
    /// 1 to 100,000
    pub quantity: u32,

    /// 10 to 100 W
    pub laser_power_w: f64,
    pub equipment_cost: f64,
    pub equipment_lifespan_years: f64,
    pub annual_working_hours: f64,

    pub electricity_rate: f64,
    pub labor_rate: f64,
    pub overhead_rate: f64,
    pub maintenance_rate: f64,

    /// Hatch lines per mm (1 to 20)
    pub fill_density: f64,
    /// 1 to 10
    pub passes: u32,
}

impl Default for MarkingInput {
    fn default() -> Self {
        MarkingInput {
            label: String::new(),
            material: MarkingMaterial::StainlessSteel,
            method: MarkingMethod::Annealing,
            job_type: MarkingJobType::SerialNumber,
            marking_area_mm2: 2500.0,
            marking_depth_mm: 0.1,
            quantity: 100,
            laser_power_w: 30.0,
            equipment_cost: 50_000.0,
            equipment_lifespan_years: 8.0,
            annual_working_hours: 2000.0,
            electricity_rate: 0.12,
            labor_rate: 20.0,
            overhead_rate: 5.0,
            maintenance_rate: 2.0,
            fill_density: 10.0,
            passes: 1,
        }
    }
}

impl MarkingInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("marking_area_mm2", self.marking_area_mm2, 1.0, 1_000_000.0)?;
        ensure_range("marking_depth_mm", self.marking_depth_mm, 0.01, 5.0)?;
        ensure_range("quantity", self.quantity as f64, 1.0, 100_000.0)?;
        ensure_range("laser_power_w", self.laser_power_w, 10.0, 100.0)?;
        ensure_range("equipment_cost", self.equipment_cost, 5000.0, 500_000.0)?;
        ensure_range("equipment_lifespan_years", self.equipment_lifespan_years, 1.0, 15.0)?;
        ensure_range("annual_working_hours", self.annual_working_hours, 100.0, 8760.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("labor_rate", self.labor_rate, 5.0, 200.0)?;
        ensure_range("overhead_rate", self.overhead_rate, 0.0, 100.0)?;
        ensure_range("maintenance_rate", self.maintenance_rate, 0.0, 50.0)?;
        ensure_range("fill_density", self.fill_density, 1.0, 20.0)?;
        ensure_range("passes", self.passes as f64, 1.0, 10.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingResult {
    pub base_speed_mm2_s: f64,
    /// After depth and fill density
    pub adjusted_speed_mm2_s: f64,
    pub marking_time_per_piece_s: f64,
    pub handling_time_per_piece_s: f64,
    pub total_time_per_piece_s: f64,
    pub total_job_time_s: f64,
    pub total_job_time_formatted: String,

    pub depreciation_per_hour: f64,
    pub electricity_per_hour: f64,
    pub total_hourly_cost: f64,
    pub cost_per_piece: f64,
    pub total_job_cost: f64,

    /// Margin on price (%)
    pub profit_margin_percent: f64,
    pub recommended_price: f64,

    pub pieces_per_hour: f64,
    pub revenue_per_hour: f64,
    /// Beam-on share of piece time (%)
    pub utilization_rate: f64,
}

/// Cost a marking job.
///
/// # Errors
///
/// * `InvalidInput` for out-of-range fields
/// * `UnsupportedCombination` when the method is not used on the material
pub fn calculate(input: &MarkingInput) -> CalcResult<MarkingResult> {
    input.validate()?;

    let base_speed_mm2_s = marking_speed(input.material, input.method).require()?;
    let adjusted_speed_mm2_s = base_speed_mm2_s
        * DEPTH_SPEED_FACTOR.powf(input.marking_depth_mm)
        * (REFERENCE_FILL_DENSITY / input.fill_density);
    tracing::debug!(
        material = %input.material,
        method = input.method.display_name(),
        adjusted_speed_mm2_s,
        "marking speed"
    );

    let marking_time_per_piece_s = input.marking_area_mm2 / adjusted_speed_mm2_s * input.passes as f64;
    let handling = handling_time_per_piece_s(input.quantity);
    let total_time_per_piece_s = marking_time_per_piece_s + handling;
    let qty = input.quantity as f64;
    let total_job_time_s = total_time_per_piece_s * qty;

    let depreciation_per_hour = input.equipment_cost / (input.equipment_lifespan_years * input.annual_working_hours);
    let electricity_per_hour =
        input.laser_power_w / 1000.0 * input.electricity_rate / marking_power_efficiency(input.laser_power_w);
    let total_hourly_cost =
        depreciation_per_hour + electricity_per_hour + input.labor_rate + input.overhead_rate + input.maintenance_rate;

    let cost_per_piece = total_time_per_piece_s / 3600.0 * total_hourly_cost;
    let recommended_price = cost_per_piece / (1.0 - MARKING_PROFIT_MARGIN);
    let pieces_per_hour = 3600.0 / total_time_per_piece_s;

    Ok(MarkingResult {
        base_speed_mm2_s,
        adjusted_speed_mm2_s,
        marking_time_per_piece_s,
        handling_time_per_piece_s: handling,
        total_time_per_piece_s,
        total_job_time_s,
        total_job_time_formatted: format_batch_time(total_job_time_s),
        depreciation_per_hour,
        electricity_per_hour,
        total_hourly_cost,
        cost_per_piece,
        total_job_cost: cost_per_piece * qty,
        profit_margin_percent: MARKING_PROFIT_MARGIN * 100.0,
        recommended_price,
        pieces_per_hour,
        revenue_per_hour: pieces_per_hour * recommended_price,
        utilization_rate: marking_time_per_piece_s / total_time_per_piece_s * 100.0,
    })
}
