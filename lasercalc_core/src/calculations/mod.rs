//! # Cost Calculations
//!
//! Every calculator in this module follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable, with shop defaults)
//! - `*Result` - Calculation results (JSON-serializable, full precision)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! Inputs are validated before any arithmetic runs, so a `calculate` call
//! either returns a finite result or a typed [`CalcError`](crate::errors::CalcError).
//!
//! ## Cost Centers
//!
//! - [`pierce`] - Pierce time and cost per hole pattern
//! - [`kerf`] - Kerf width lookup and material lost to the cut
//! - [`setup`] - Setup time, cost per part and ideal batch size
//! - [`finishing`] - Deburring and edge finishing time
//! - [`hourly_rate`] - Machine hourly rate build-up
//! - [`overhead`] - Overhead allocation across jobs
//! - [`quotation`] - Margin, markup and volume pricing of a quote
//! - [`cnc`] - CNC machining cost and volume tiers
//!
//! ## Job Costing
//!
//! - [`laser_cutting`] - Cost of a single laser cut
//! - [`welding`] - Laser welding cycle time and piece cost
//! - [`marking`] - Laser marking and engraving cycle time and piece cost
//! - [`price_per_meter`] - Quick operating cost per meter of cut
//! - [`material_utilization`] - Sheet nesting and waste
//! - [`energy`] - Energy use, peak split and carbon
//! - [`roi`] - Equipment payback, NPV and IRR
//!
//! ## Heterogeneous Collections
//!
//! [`CalculationItem`] wraps any input so a worksheet can hold a mix of
//! calculations and evaluate them uniformly:
//!
//! ```rust
//! use lasercalc_core::calculations::{CalculationItem, CalculationOutcome, PierceInput};
//!
//! let item = CalculationItem::Pierce(PierceInput::default());
//! let outcome = item.evaluate().unwrap();
//! assert!(matches!(outcome, CalculationOutcome::Pierce(_)));
//! assert_eq!(item.calc_type(), "pierce");
//! ```

pub mod cnc;
pub mod energy;
pub mod finishing;
pub mod hourly_rate;
pub mod kerf;
pub mod laser_cutting;
pub mod marking;
pub mod material_utilization;
pub mod overhead;
pub mod pierce;
pub mod price_per_meter;
pub mod quotation;
pub mod roi;
pub mod setup;
pub mod welding;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;

// Re-export commonly used types
pub use cnc::{CncInput, CncResult};
pub use energy::{EnergyInput, EnergyResult};
pub use finishing::{FinishingInput, FinishingResult};
pub use hourly_rate::{HourlyRateInput, HourlyRateResult};
pub use kerf::{KerfInput, KerfResult};
pub use laser_cutting::{LaserCuttingInput, LaserCuttingResult};
pub use marking::{MarkingInput, MarkingResult};
pub use material_utilization::{MaterialUtilizationInput, MaterialUtilizationResult};
pub use overhead::{OverheadInput, OverheadResult};
pub use pierce::{PierceInput, PierceResult};
pub use price_per_meter::{PricePerMeterInput, PricePerMeterResult};
pub use quotation::{QuotationInput, QuotationResult};
pub use roi::{RoiInput, RoiResult};
pub use setup::{SetupInput, SetupResult};
pub use welding::{WeldingInput, WeldingResult};

/// Urgency of a recommendation. Orders `High < Medium < Low` so an
/// ascending sort puts the most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        write!(f, "{}", name)
    }
}

/// A recommendation with an estimated saving (currency per year unless the
/// calculator says otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedRecommendation {
    pub title: String,
    pub description: String,
    pub potential_savings: f64,
    pub priority: Priority,
}

/// Every calculation type that can be stored in a worksheet.
///
/// Serialized with an internal `type` tag:
///
/// ```json
/// { "type": "kerf", "material": "mild_steel", "thickness_mm": 3.0, "nozzle": "2.0mm_nozzle" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationItem {
    Pierce(PierceInput),
    Kerf(KerfInput),
    Setup(SetupInput),
    Finishing(FinishingInput),
    HourlyRate(HourlyRateInput),
    Overhead(OverheadInput),
    Quotation(QuotationInput),
    Cnc(CncInput),
    LaserCutting(LaserCuttingInput),
    Welding(WeldingInput),
    Marking(MarkingInput),
    PricePerMeter(PricePerMeterInput),
    MaterialUtilization(MaterialUtilizationInput),
    Energy(EnergyInput),
    Roi(RoiInput),
}

impl CalculationItem {
    /// Every `type` tag, in display order.
    pub const TYPES: [&'static str; 15] = [
        "pierce",
        "kerf",
        "setup",
        "finishing",
        "hourly_rate",
        "overhead",
        "quotation",
        "cnc",
        "laser_cutting",
        "welding",
        "marking",
        "price_per_meter",
        "material_utilization",
        "energy",
        "roi",
    ];

    /// Default input for a `type` tag, or `None` for an unknown tag.
    pub fn default_for(calc_type: &str) -> Option<Self> {
        let item = match calc_type {
            "pierce" => CalculationItem::Pierce(PierceInput::default()),
            "kerf" => CalculationItem::Kerf(KerfInput::default()),
            "setup" => CalculationItem::Setup(SetupInput::default()),
            "finishing" => CalculationItem::Finishing(FinishingInput::default()),
            "hourly_rate" => CalculationItem::HourlyRate(HourlyRateInput::default()),
            "overhead" => CalculationItem::Overhead(OverheadInput::default()),
            "quotation" => CalculationItem::Quotation(QuotationInput::default()),
            "cnc" => CalculationItem::Cnc(CncInput::default()),
            "laser_cutting" => CalculationItem::LaserCutting(LaserCuttingInput::default()),
            "welding" => CalculationItem::Welding(WeldingInput::default()),
            "marking" => CalculationItem::Marking(MarkingInput::default()),
            "price_per_meter" => CalculationItem::PricePerMeter(PricePerMeterInput::default()),
            "material_utilization" => CalculationItem::MaterialUtilization(MaterialUtilizationInput::default()),
            "energy" => CalculationItem::Energy(EnergyInput::default()),
            "roi" => CalculationItem::Roi(RoiInput::default()),
            _ => return None,
        };
        Some(item)
    }

    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Pierce(i) => &i.label,
            CalculationItem::Kerf(i) => &i.label,
            CalculationItem::Setup(i) => &i.label,
            CalculationItem::Finishing(i) => &i.label,
            CalculationItem::HourlyRate(i) => &i.label,
            CalculationItem::Overhead(i) => &i.label,
            CalculationItem::Quotation(i) => &i.label,
            CalculationItem::Cnc(i) => &i.label,
            CalculationItem::LaserCutting(i) => &i.label,
            CalculationItem::Welding(i) => &i.label,
            CalculationItem::Marking(i) => &i.label,
            CalculationItem::PricePerMeter(i) => &i.label,
            CalculationItem::MaterialUtilization(i) => &i.label,
            CalculationItem::Energy(i) => &i.label,
            CalculationItem::Roi(i) => &i.label,
        }
    }

    /// The serialized `type` tag
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Pierce(_) => "pierce",
            CalculationItem::Kerf(_) => "kerf",
            CalculationItem::Setup(_) => "setup",
            CalculationItem::Finishing(_) => "finishing",
            CalculationItem::HourlyRate(_) => "hourly_rate",
            CalculationItem::Overhead(_) => "overhead",
            CalculationItem::Quotation(_) => "quotation",
            CalculationItem::Cnc(_) => "cnc",
            CalculationItem::LaserCutting(_) => "laser_cutting",
            CalculationItem::Welding(_) => "welding",
            CalculationItem::Marking(_) => "marking",
            CalculationItem::PricePerMeter(_) => "price_per_meter",
            CalculationItem::MaterialUtilization(_) => "material_utilization",
            CalculationItem::Energy(_) => "energy",
            CalculationItem::Roi(_) => "roi",
        }
    }

    /// Human-readable calculator name for report titles
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculationItem::Pierce(_) => "Pierce Time",
            CalculationItem::Kerf(_) => "Kerf Width",
            CalculationItem::Setup(_) => "Setup Time",
            CalculationItem::Finishing(_) => "Finishing Time",
            CalculationItem::HourlyRate(_) => "Machine Hourly Rate",
            CalculationItem::Overhead(_) => "Overhead Allocation",
            CalculationItem::Quotation(_) => "Quotation Margin",
            CalculationItem::Cnc(_) => "CNC Machining Cost",
            CalculationItem::LaserCutting(_) => "Laser Cutting Cost",
            CalculationItem::Welding(_) => "Laser Welding Cost",
            CalculationItem::Marking(_) => "Laser Marking Cost",
            CalculationItem::PricePerMeter(_) => "Price per Meter",
            CalculationItem::MaterialUtilization(_) => "Material Utilization",
            CalculationItem::Energy(_) => "Energy Cost",
            CalculationItem::Roi(_) => "Equipment ROI",
        }
    }

    /// Run the matching calculator.
    pub fn evaluate(&self) -> CalcResult<CalculationOutcome> {
        tracing::debug!(calc_type = self.calc_type(), label = self.label(), "evaluating");
        let outcome = match self {
            CalculationItem::Pierce(i) => CalculationOutcome::Pierce(pierce::calculate(i)?),
            CalculationItem::Kerf(i) => CalculationOutcome::Kerf(kerf::calculate(i)?),
            CalculationItem::Setup(i) => CalculationOutcome::Setup(setup::calculate(i)?),
            CalculationItem::Finishing(i) => CalculationOutcome::Finishing(finishing::calculate(i)?),
            CalculationItem::HourlyRate(i) => CalculationOutcome::HourlyRate(hourly_rate::calculate(i)?),
            CalculationItem::Overhead(i) => CalculationOutcome::Overhead(overhead::calculate(i)?),
            CalculationItem::Quotation(i) => CalculationOutcome::Quotation(quotation::calculate(i)?),
            CalculationItem::Cnc(i) => CalculationOutcome::Cnc(cnc::calculate(i)?),
            CalculationItem::LaserCutting(i) => CalculationOutcome::LaserCutting(laser_cutting::calculate(i)?),
            CalculationItem::Welding(i) => CalculationOutcome::Welding(welding::calculate(i)?),
            CalculationItem::Marking(i) => CalculationOutcome::Marking(marking::calculate(i)?),
            CalculationItem::PricePerMeter(i) => CalculationOutcome::PricePerMeter(price_per_meter::calculate(i)?),
            CalculationItem::MaterialUtilization(i) => {
                CalculationOutcome::MaterialUtilization(material_utilization::calculate(i)?)
            }
            CalculationItem::Energy(i) => CalculationOutcome::Energy(energy::calculate(i)?),
            CalculationItem::Roi(i) => CalculationOutcome::Roi(roi::calculate(i)?),
        };
        Ok(outcome)
    }
}

/// Result of [`CalculationItem::evaluate`], tagged like the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Pierce(PierceResult),
    Kerf(KerfResult),
    Setup(SetupResult),
    Finishing(FinishingResult),
    HourlyRate(HourlyRateResult),
    Overhead(OverheadResult),
    Quotation(QuotationResult),
    Cnc(CncResult),
    LaserCutting(LaserCuttingResult),
    Welding(WeldingResult),
    Marking(MarkingResult),
    PricePerMeter(PricePerMeterResult),
    MaterialUtilization(MaterialUtilizationResult),
    Energy(EnergyResult),
    Roi(RoiResult),
}

impl CalculationOutcome {
    /// Recommendations and alerts as plain lines. Prioritized
    /// recommendations render as `[Priority] title: description`.
    pub fn recommendations(&self) -> Vec<String> {
        fn prioritized(recs: &[PrioritizedRecommendation]) -> Vec<String> {
            recs.iter()
                .map(|r| format!("[{}] {}: {}", r.priority, r.title, r.description))
                .collect()
        }

        match self {
            CalculationOutcome::Pierce(r) => r.recommendations.clone(),
            CalculationOutcome::Kerf(r) => r.recommendations.clone(),
            CalculationOutcome::Setup(r) => r.recommendations.clone(),
            CalculationOutcome::Finishing(r) => r.recommendations.clone(),
            CalculationOutcome::HourlyRate(r) => r.alerts.iter().chain(&r.recommendations).cloned().collect(),
            CalculationOutcome::Overhead(r) => r.recommendations.clone(),
            CalculationOutcome::Quotation(r) => r.recommendations.clone(),
            CalculationOutcome::LaserCutting(r) => r.recommendations.clone(),
            CalculationOutcome::MaterialUtilization(r) => prioritized(&r.recommendations),
            CalculationOutcome::Energy(r) => prioritized(&r.recommendations),
            CalculationOutcome::Cnc(_)
            | CalculationOutcome::Welding(_)
            | CalculationOutcome::Marking(_)
            | CalculationOutcome::PricePerMeter(_)
            | CalculationOutcome::Roi(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_type_has_a_default() {
        for calc_type in CalculationItem::TYPES {
            let item = CalculationItem::default_for(calc_type).unwrap();
            assert_eq!(item.calc_type(), calc_type);
        }
        assert!(CalculationItem::default_for("beam").is_none());
    }

    #[test]
    fn test_every_default_evaluates() {
        for calc_type in CalculationItem::TYPES {
            let item = CalculationItem::default_for(calc_type).unwrap();
            assert!(item.evaluate().is_ok(), "{} default failed", calc_type);
        }
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        for calc_type in CalculationItem::TYPES {
            let item = CalculationItem::default_for(calc_type).unwrap();
            assert_eq!(item.evaluate().unwrap(), item.evaluate().unwrap());
        }
    }

    #[test]
    fn test_tagged_serialization() {
        let item = CalculationItem::HourlyRate(HourlyRateInput {
            label: "Fiber 6kW".to_string(),
            ..HourlyRateInput::default()
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "hourly_rate");
        assert_eq!(json["label"], "Fiber 6kW");

        let back: CalculationItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.label(), "Fiber 6kW");
    }

    #[test]
    fn test_outcome_carries_tag() {
        let outcome = CalculationItem::Cnc(CncInput::default()).evaluate().unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "cnc");
    }

    #[test]
    fn test_invalid_input_surfaces_as_error() {
        let item = CalculationItem::Quotation(QuotationInput {
            base_cost: -1.0,
            ..QuotationInput::default()
        });
        assert!(item.evaluate().is_err());
    }

    #[test]
    fn test_marking_unsupported_method_is_an_error() {
        let item: CalculationItem = serde_json::from_value(serde_json::json!({
            "type": "marking",
            "material": "glass",
            "method": "foaming",
            "marking_area_mm2": 100.0,
            "marking_depth_mm": 0.1,
            "quantity": 5,
            "laser_power_w": 30.0,
            "equipment_cost": 50000.0,
            "equipment_lifespan_years": 8.0,
            "annual_working_hours": 2000.0,
            "electricity_rate": 0.12,
            "labor_rate": 20.0,
            "overhead_rate": 5.0,
            "maintenance_rate": 2.0,
            "fill_density": 10.0,
            "passes": 1
        }))
        .unwrap();
        assert_eq!(item.evaluate().unwrap_err().error_code(), "UNSUPPORTED_COMBINATION");
    }

    #[test]
    fn test_priority_ordering() {
        let mut p = vec![Priority::Low, Priority::High, Priority::Medium];
        p.sort();
        assert_eq!(p, vec![Priority::High, Priority::Medium, Priority::Low]);
    }
}
