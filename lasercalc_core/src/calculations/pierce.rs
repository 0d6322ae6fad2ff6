//! # Pierce Estimator
//!
//! Time and cost to pierce N holes in a sheet, under a chosen piercing
//! strategy and assist gas.
//!
//! ## Cost Model
//!
//! ```text
//! hours     = hole_count × seconds_per_pierce / 3600
//! labor     = hours × hourly_cost
//! gas       = hole_count × gas_per_pierce × gas_price
//! equipment = hours × (15% of hourly_cost) × 1.5 nozzle wear
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::pierce::{calculate, PierceInput};
//!
//! let input = PierceInput::default(); // 20 holes in 3mm mild steel
//! let result = calculate(&input).unwrap();
//! assert!((result.time_per_pierce_s - 0.5).abs() < 1e-9);
//! assert!((result.total_pierce_time_min - 10.0 / 60.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcError, CalcResult};
use crate::lookup::Estimate;
use crate::materials::SheetMaterial;
use crate::reference::piercing::{
    get_pierce_time, AssistGas, PierceStrategy, HIGH_PIERCE_COUNT, NOZZLE_WEAR_MULTIPLIER, PLASMA_THRESHOLD,
    PUNCHING_THRESHOLD, VERY_HIGH_PIERCE_COUNT,
};

/// Share of the hourly machine cost attributed to equipment wear
const EQUIPMENT_SHARE_OF_HOURLY: f64 = 0.15;

/// Parts per year assumed by the design optimization savings
pub const PARTS_PER_YEAR: f64 = 100.0;

/// Input parameters for a pierce estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Vent panel",
///   "material": "mild_steel",
///   "thickness_mm": 3.0,
///   "hole_count": 20,
///   "strategy": "high_pressure",
///   "quality": "typical",
///   "gas": "nitrogen",
///   "gas_price_per_m3": 1.5,
///   "hourly_cost": 60.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierceInput {
    #[serde(default)]
    pub label: String,
    pub material: SheetMaterial,
    /// Sheet thickness (0.5 to 25 mm)
    pub thickness_mm: f64,
    /// Pierces per part (1 to 10000)
    pub hole_count: u32,
    #[serde(default)]
    pub strategy: PierceStrategy,
    #[serde(default)]
    pub quality: Estimate,
    #[serde(default)]
    pub gas: AssistGas,
    /// Assist gas price ($/m³)
    pub gas_price_per_m3: f64,
    /// Machine hourly cost ($/h)
    pub hourly_cost: f64,
}

impl Default for PierceInput {
    fn default() -> Self {
        PierceInput {
            label: String::new(),
            material: SheetMaterial::MildSteel,
            thickness_mm: 3.0,
            hole_count: 20,
            strategy: PierceStrategy::HighPressure,
            quality: Estimate::Typical,
            gas: AssistGas::Nitrogen,
            gas_price_per_m3: 1.5,
            hourly_cost: 60.0,
        }
    }
}

impl PierceInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("thickness_mm", self.thickness_mm, 0.5, 25.0)?;
        if self.hole_count == 0 || self.hole_count > 10_000 {
            return Err(CalcError::invalid_input(
                "hole_count",
                self.hole_count.to_string(),
                "Hole count must be between 1 and 10000",
            ));
        }
        ensure_range("gas_price_per_m3", self.gas_price_per_m3, 0.0, 10.0)?;
        ensure_range("hourly_cost", self.hourly_cost, 0.0, 200.0)?;
        Ok(())
    }
}

/// How much of the job piercing represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PierceIntensity {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PierceIntensity {
    /// <10 low, <50 moderate, <200 high, else very high.
    pub fn for_hole_count(hole_count: u32) -> Self {
        match hole_count {
            n if n < 10 => PierceIntensity::Low,
            n if n < 50 => PierceIntensity::Moderate,
            n if n < 200 => PierceIntensity::High,
            _ => PierceIntensity::VeryHigh,
        }
    }

    /// Rule-of-thumb share of cutting time spent piercing (%).
    pub fn share_of_cutting_percent(&self) -> f64 {
        match self {
            PierceIntensity::Low => 5.0,
            PierceIntensity::Moderate => 15.0,
            PierceIntensity::High => 30.0,
            PierceIntensity::VeryHigh => 50.0,
        }
    }
}

/// Pierce time and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierceResult {
    /// Seconds per pierce after the strategy modifier
    pub time_per_pierce_s: f64,
    pub total_pierce_time_min: f64,
    pub total_pierce_time_h: f64,

    pub labor_cost: f64,
    pub gas_cost: f64,
    pub equipment_cost: f64,
    pub total_cost: f64,
    pub cost_per_pierce: f64,

    pub intensity: PierceIntensity,
    /// Estimated piercing time as a share of cutting time (%)
    pub share_of_cutting_percent: f64,

    pub recommendations: Vec<String>,
    pub optimization_opportunities: Vec<String>,
}

/// Estimate pierce time and cost.
///
/// # Errors
///
/// * `InvalidInput` for out-of-range fields
/// * `UnsupportedCombination` when the thickness is not tabulated for the material
pub fn calculate(input: &PierceInput) -> CalcResult<PierceResult> {
    input.validate()?;
    tracing::debug!(material = input.material.code(), thickness = input.thickness_mm, holes = input.hole_count, "pierce estimate");

    let time_per_pierce_s = get_pierce_time(input.material, input.thickness_mm, input.strategy, input.quality).require()?;
    let holes = f64::from(input.hole_count);

    let total_pierce_time_s = holes * time_per_pierce_s;
    let total_pierce_time_min = total_pierce_time_s / 60.0;
    let total_pierce_time_h = total_pierce_time_min / 60.0;

    let gas_cost = holes * input.gas.gas_per_pierce_m3() * input.gas_price_per_m3;
    let labor_cost = total_pierce_time_h * input.hourly_cost;
    let equipment_cost = total_pierce_time_h * input.hourly_cost * EQUIPMENT_SHARE_OF_HOURLY * NOZZLE_WEAR_MULTIPLIER;
    let total_cost = labor_cost + gas_cost + equipment_cost;
    let cost_per_pierce = total_cost / holes;

    let intensity = PierceIntensity::for_hole_count(input.hole_count);

    let mut recommendations = Vec::new();
    let mut optimization_opportunities = Vec::new();

    if input.hole_count >= VERY_HIGH_PIERCE_COUNT {
        recommendations.push(format!(
            "Very high pierce count ({}). Piercing time may exceed cutting time.",
            input.hole_count
        ));
        optimization_opportunities.push("Consider reducing hole count in design if functionally acceptable".to_string());
    } else if input.hole_count >= HIGH_PIERCE_COUNT {
        recommendations.push(
            "High pierce count detected. Piercing time will be significant portion of total job time.".to_string(),
        );
    }

    if matches!(input.strategy, PierceStrategy::Pulsed | PierceStrategy::LowPower) {
        recommendations.push(
            "Using slower piercing strategy. Consider high-pressure piercing if equipment allows for faster throughput."
                .to_string(),
        );
    }

    if input.strategy == PierceStrategy::HighPressure && input.quality == Estimate::Max {
        optimization_opportunities.push(
            "Using max quality with high-pressure piercing. Consider \"typical\" quality for 15-20% time savings if acceptable."
                .to_string(),
        );
    }

    if input.material == SheetMaterial::StainlessSteel && input.thickness_mm > 10.0 {
        recommendations.push(
            "Thick stainless steel piercing is slow (2-8 seconds per hole). Ensure adequate gas pressure and optimal focus."
                .to_string(),
        );
    }

    if input.material == SheetMaterial::CopperBrass {
        recommendations.push(
            "Copper/brass requires high power for piercing. Ensure laser power is sufficient (6kW+ recommended for >3mm)."
                .to_string(),
        );
    }

    if input.hole_count >= PUNCHING_THRESHOLD && input.thickness_mm <= 3.0 {
        optimization_opportunities.push(format!(
            "With {} holes in material ≤3mm, consider punching for faster production and lower cost.",
            input.hole_count
        ));
    }

    if input.hole_count >= PLASMA_THRESHOLD && input.thickness_mm >= 8.0 {
        optimization_opportunities
            .push("For heavily perforated thick plates, plasma cutting may be more economical than laser.".to_string());
    }

    if gas_cost > total_cost * 0.2 {
        optimization_opportunities.push(
            "Gas cost exceeds 20% of total piercing cost. Consider optimizing gas pressure or assist gas type.".to_string(),
        );
    }

    if input.strategy != PierceStrategy::EdgeStart && input.hole_count > 100 {
        optimization_opportunities.push(
            "With many holes, consider redesigning parts to allow edge-start cutting where possible (eliminates piercing)."
                .to_string(),
        );
    }

    if cost_per_pierce > 0.50 {
        recommendations.push(format!(
            "Cost per pierce is ${:.2}. With {} holes, piercing represents significant cost.",
            cost_per_pierce, input.hole_count
        ));
    }

    if intensity == PierceIntensity::VeryHigh {
        optimization_opportunities.push(
            "Consider batching multiple parts on a single sheet to amortize piercing time across multiple pieces."
                .to_string(),
        );
    }

    Ok(PierceResult {
        time_per_pierce_s,
        total_pierce_time_min,
        total_pierce_time_h,
        labor_cost,
        gas_cost,
        equipment_cost,
        total_cost,
        cost_per_pierce,
        intensity,
        share_of_cutting_percent: intensity.share_of_cutting_percent(),
        recommendations,
        optimization_opportunities,
    })
}

/// One row of a strategy comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub strategy: PierceStrategy,
    pub name: String,
    pub time_per_pierce_s: f64,
    /// Total minutes for all holes
    pub total_time_min: f64,
    /// Percent slower than the fastest strategy
    pub time_difference_percent: f64,
}

/// Run the four piercing strategies side by side.
///
/// # Errors
///
/// * `UnsupportedCombination` when the thickness is not tabulated
/// * `DivisionByZero` when the fastest total time is zero (no holes)
pub fn compare_pierce_strategies(
    material: SheetMaterial,
    thickness_mm: f64,
    hole_count: u32,
    quality: Estimate,
) -> CalcResult<Vec<StrategyComparison>> {
    let mut rows = Vec::with_capacity(PierceStrategy::PIERCING.len());
    for strategy in PierceStrategy::PIERCING {
        let time_per_pierce_s = get_pierce_time(material, thickness_mm, strategy, quality).require()?;
        rows.push(StrategyComparison {
            strategy,
            name: strategy.display_name().to_string(),
            time_per_pierce_s,
            total_time_min: time_per_pierce_s * f64::from(hole_count) / 60.0,
            time_difference_percent: 0.0,
        });
    }

    let fastest = rows.iter().map(|r| r.total_time_min).fold(f64::INFINITY, f64::min);
    if fastest <= 0.0 {
        return Err(CalcError::division_by_zero(
            "fastest pierce time",
            "No pierce time to compare against; hole count is zero",
        ));
    }
    for row in &mut rows {
        row.time_difference_percent = (row.total_time_min - fastest) / fastest * 100.0;
    }
    Ok(rows)
}

/// Savings from removing holes in the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignOptimizationSavings {
    /// Negative when the "optimized" design has more holes
    pub hole_reduction: i64,
    pub hole_reduction_percent: f64,
    /// Minutes saved per part
    pub time_savings_min: f64,
    /// Dollars saved per part
    pub cost_savings: f64,
    /// Dollars saved over [`PARTS_PER_YEAR`] parts
    pub annual_savings: f64,
}

/// Per-part and annual savings from cutting the hole count, at typical
/// high-pressure pierce times.
pub fn calculate_design_optimization_savings(
    current_hole_count: u32,
    optimized_hole_count: u32,
    material: SheetMaterial,
    thickness_mm: f64,
    hourly_cost: f64,
) -> CalcResult<DesignOptimizationSavings> {
    if current_hole_count == 0 {
        return Err(CalcError::division_by_zero(
            "current hole count",
            "Current design has no holes to reduce",
        ));
    }
    let time_per_pierce_s =
        get_pierce_time(material, thickness_mm, PierceStrategy::HighPressure, Estimate::Typical).require()?;

    let hole_reduction = i64::from(current_hole_count) - i64::from(optimized_hole_count);
    let time_savings_min = hole_reduction as f64 * time_per_pierce_s / 60.0;
    let cost_savings = time_savings_min / 60.0 * hourly_cost;

    Ok(DesignOptimizationSavings {
        hole_reduction,
        hole_reduction_percent: hole_reduction as f64 / f64::from(current_hole_count) * 100.0,
        time_savings_min,
        cost_savings,
        annual_savings: cost_savings * PARTS_PER_YEAR,
    })
}
