//! # CNC Machining Cost
//!
//! Per-part and batch cost of a machined part from its bounding box,
//! cycle time and shop rates, plus a volume pricing table.
//!
//! ## Cost Model
//!
//! | Component | Per part                                          |
//! |-----------|---------------------------------------------------|
//! | Material  | L × W × H × density × $/kg (bounding box)         |
//! | Setup     | setup h × machine rate / batch size               |
//! | Machine   | cycle h × machine rate                            |
//! | Labor     | cycle h × labor rate × 0.4                        |
//! | Tooling   | tool cost / tool life                             |
//! | Overhead  | direct costs × overhead %                         |
//!
//! Material uses the bounding-box volume, not the machined volume, so it
//! prices the stock the part is cut from.
//!
//! Each volume tier re-amortizes setup over the tier quantity rather than
//! scaling the base batch cost.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcError, CalcResult};
use crate::materials::StockMaterial;

/// Share of machine time an operator is attending the machine
pub const LABOR_UTILIZATION_FACTOR: f64 = 0.4;

/// Markup on single-piece price
pub const DEFAULT_MARKUP: f64 = 0.25;

/// Quantities priced in the volume table
pub const VOLUME_TIERS: [u32; 6] = [1, 10, 50, 100, 500, 1000];

/// Markup for a quantity: 25% for one piece down to 8% above 500.
pub fn volume_markup(quantity: u32) -> f64 {
    match quantity {
        0..=1 => 0.25,
        2..=10 => 0.20,
        11..=50 => 0.15,
        51..=100 => 0.12,
        101..=500 => 0.10,
        _ => 0.08,
    }
}

/// Input parameters for a CNC machining quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CncInput {
    #[serde(default)]
    pub label: String,
    /// 1 to 5000 mm
    pub part_length_mm: f64,
    /// 1 to 5000 mm
    pub part_width_mm: f64,
    /// 1 to 1000 mm
    pub part_height_mm: f64,
    pub material: StockMaterial,
    /// $/kg (0.1 to 1000)
    pub material_price_per_kg: f64,
    /// Cycle time per part (0.1 to 100 h)
    pub machining_time_h: f64,
    /// Setup per batch (0.1 to 10 h)
    pub setup_time_h: f64,
    /// 1 to 10,000
    pub batch_size: u32,
    /// 0 to 10,000 $
    pub tool_cost: f64,
    /// Parts per tool set (1 to 10,000)
    pub tool_life: u32,
    /// 1 to 500 $/h
    pub machine_rate: f64,
    /// 1 to 200 $/h
    pub labor_rate: f64,
    /// Overhead on direct costs (0 to 100 %)
    pub overhead_rate_percent: f64,
}

impl Default for CncInput {
    fn default() -> Self {
        CncInput {
            label: String::new(),
            part_length_mm: 100.0,
            part_width_mm: 50.0,
            part_height_mm: 25.0,
            material: StockMaterial::Aluminum,
            material_price_per_kg: 5.0,
            machining_time_h: 2.0,
            setup_time_h: 0.5,
            batch_size: 1,
            tool_cost: 100.0,
            tool_life: 100,
            machine_rate: 75.0,
            labor_rate: 30.0,
            overhead_rate_percent: 15.0,
        }
    }
}

impl CncInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("part_length_mm", self.part_length_mm, 1.0, 5000.0)?;
        ensure_range("part_width_mm", self.part_width_mm, 1.0, 5000.0)?;
        ensure_range("part_height_mm", self.part_height_mm, 1.0, 1000.0)?;
        ensure_range("material_price_per_kg", self.material_price_per_kg, 0.1, 1000.0)?;
        ensure_range("machining_time_h", self.machining_time_h, 0.1, 100.0)?;
        ensure_range("setup_time_h", self.setup_time_h, 0.1, 10.0)?;
        ensure_range("batch_size", self.batch_size as f64, 1.0, 10_000.0)?;
        ensure_range("tool_cost", self.tool_cost, 0.0, 10_000.0)?;
        ensure_range("tool_life", self.tool_life as f64, 1.0, 10_000.0)?;
        ensure_range("machine_rate", self.machine_rate, 1.0, 500.0)?;
        ensure_range("labor_rate", self.labor_rate, 1.0, 200.0)?;
        ensure_range("overhead_rate_percent", self.overhead_rate_percent, 0.0, 100.0)?;
        Ok(())
    }

    /// Bounding-box mass (kg)
    pub fn part_weight_kg(&self) -> f64 {
        let volume_m3 = self.part_length_mm * self.part_width_mm * self.part_height_mm / 1e9;
        volume_m3 * self.material.density_kg_m3()
    }

    fn cost_per_part(&self, quantity: u32) -> CostPerPart {
        let material = self.part_weight_kg() * self.material_price_per_kg;
        let setup = self.setup_time_h * self.machine_rate / quantity as f64;
        let machine = self.machining_time_h * self.machine_rate;
        let labor = self.machining_time_h * self.labor_rate * LABOR_UTILIZATION_FACTOR;
        let tooling = self.tool_cost / self.tool_life as f64;
        let direct = material + setup + machine + labor + tooling;
        let overhead = direct * self.overhead_rate_percent / 100.0;
        CostPerPart {
            material,
            setup,
            machine,
            labor,
            tooling,
            overhead,
            total: direct + overhead,
        }
    }
}

struct CostPerPart {
    material: f64,
    setup: f64,
    machine: f64,
    labor: f64,
    tooling: f64,
    overhead: f64,
    total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTier {
    pub quantity: u32,
    pub markup_percent: f64,
    pub price_per_part: f64,
    /// Saving against the single-piece price of the requested batch (%)
    pub discount_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CncResult {
    pub material_cost_per_part: f64,
    pub machine_cost_per_part: f64,
    pub labor_cost_per_part: f64,
    pub tooling_cost_per_part: f64,
    pub setup_cost_per_part: f64,
    pub overhead_per_part: f64,
    pub total_cost_per_part: f64,

    pub total_batch_cost: f64,
    /// Setup plus all cycles (h)
    pub total_batch_time_h: f64,
    pub total_material_cost: f64,

    pub suggested_price_per_part: f64,
    pub profit_per_part: f64,
    pub total_profit: f64,

    pub volume_pricing: Vec<VolumeTier>,

    pub part_weight_kg: f64,
    /// Cycle time share of batch time (%)
    pub machine_utilization: f64,
}

/// Cost a CNC machining batch.
pub fn calculate(input: &CncInput) -> CalcResult<CncResult> {
    input.validate()?;

    let batch = input.batch_size as f64;
    let cost = input.cost_per_part(input.batch_size);

    let total_batch_time_h = input.setup_time_h + input.machining_time_h * batch;
    if total_batch_time_h <= 0.0 {
        return Err(CalcError::division_by_zero("batch time", "Batch time must be positive"));
    }
    let machine_utilization = input.machining_time_h * batch / total_batch_time_h * 100.0;

    let suggested_price_per_part = cost.total * (1.0 + DEFAULT_MARKUP);
    let profit_per_part = suggested_price_per_part - cost.total;

    let volume_pricing = VOLUME_TIERS
        .iter()
        .map(|&quantity| {
            let markup = volume_markup(quantity);
            let price_per_part = input.cost_per_part(quantity).total * (1.0 + markup);
            VolumeTier {
                quantity,
                markup_percent: markup * 100.0,
                price_per_part,
                discount_percent: (suggested_price_per_part - price_per_part) / suggested_price_per_part * 100.0,
            }
        })
        .collect();

    tracing::debug!(material = %input.material, total_cost_per_part = cost.total, "cnc costed");

    Ok(CncResult {
        material_cost_per_part: cost.material,
        machine_cost_per_part: cost.machine,
        labor_cost_per_part: cost.labor,
        tooling_cost_per_part: cost.tooling,
        setup_cost_per_part: cost.setup,
        overhead_per_part: cost.overhead,
        total_cost_per_part: cost.total,
        total_batch_cost: cost.total * batch,
        total_batch_time_h,
        total_material_cost: cost.material * batch,
        suggested_price_per_part,
        profit_per_part,
        total_profit: profit_per_part * batch,
        volume_pricing,
        part_weight_kg: input.part_weight_kg(),
        machine_utilization,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_part() {
        let r = calculate(&CncInput::default()).unwrap();
        // 100 × 50 × 25 mm = 125 cm³ of aluminum
        assert!((r.part_weight_kg - 0.3375).abs() < 1e-12);
        assert!((r.material_cost_per_part - 1.6875).abs() < 1e-12);
        assert!((r.setup_cost_per_part - 37.5).abs() < 1e-12);
        assert!((r.machine_cost_per_part - 150.0).abs() < 1e-12);
        assert!((r.labor_cost_per_part - 24.0).abs() < 1e-12);
        assert!((r.tooling_cost_per_part - 1.0).abs() < 1e-12);
        let direct = 1.6875 + 37.5 + 150.0 + 24.0 + 1.0;
        assert!((r.overhead_per_part - direct * 0.15).abs() < 1e-9);
        assert!((r.total_cost_per_part - direct * 1.15).abs() < 1e-9);
        assert!((r.suggested_price_per_part - direct * 1.15 * 1.25).abs() < 1e-9);
        assert!((r.machine_utilization - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_tiers_reamortize_setup() {
        let r = calculate(&CncInput::default()).unwrap();
        assert_eq!(
            r.volume_pricing.iter().map(|t| t.quantity).collect::<Vec<_>>(),
            VOLUME_TIERS.to_vec()
        );
        // Single piece tier equals the batch-of-one price
        assert!(r.volume_pricing[0].discount_percent.abs() < 1e-9);
        assert!(r.volume_pricing.windows(2).all(|w| w[1].price_per_part < w[0].price_per_part));

        let input = CncInput::default();
        let direct_10 = 1.6875 + 37.5 / 10.0 + 150.0 + 24.0 + 1.0;
        assert!((r.volume_pricing[1].price_per_part - direct_10 * 1.15 * 1.20).abs() < 1e-9);
        assert_eq!(input.batch_size, 1);
    }

    #[test]
    fn test_markup_bands() {
        assert_eq!(volume_markup(1), 0.25);
        assert_eq!(volume_markup(10), 0.20);
        assert_eq!(volume_markup(11), 0.15);
        assert_eq!(volume_markup(100), 0.12);
        assert_eq!(volume_markup(500), 0.10);
        assert_eq!(volume_markup(501), 0.08);
    }

    #[test]
    fn test_steel_alias() {
        let input: CncInput = serde_json::from_value(serde_json::json!({
            "part_length_mm": 100.0,
            "part_width_mm": 100.0,
            "part_height_mm": 100.0,
            "material": "steel",
            "material_price_per_kg": 2.0,
            "machining_time_h": 1.0,
            "setup_time_h": 1.0,
            "batch_size": 10,
            "tool_cost": 0.0,
            "tool_life": 1,
            "machine_rate": 50.0,
            "labor_rate": 25.0,
            "overhead_rate_percent": 0.0
        }))
        .unwrap();
        let r = calculate(&input).unwrap();
        assert!((r.part_weight_kg - 7.85).abs() < 1e-9);
        assert!((r.total_batch_time_h - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        let bad = CncInput {
            batch_size: 0,
            ..CncInput::default()
        };
        assert_eq!(calculate(&bad).unwrap_err().error_code(), "INVALID_INPUT");
    }
}
