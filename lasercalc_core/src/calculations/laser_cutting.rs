//! # Laser Cutting Cost
//!
//! Time and cost of a fiber laser cut from material, thickness, path length
//! and shop rates.
//!
//! ## Speed Model
//!
//! ```text
//! speed (mm/min) = base × √P × (1 − 0.3 × reflectivity) / √t
//! ```
//!
//! where `base` is the material's speed at 1 kW through 1 mm, `P` is laser
//! power in kW and `t` is thickness in mm. Setup adds `0.15 + 0.005·t` hours.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::laser_cutting::{calculate, LaserCuttingInput};
//!
//! let result = calculate(&LaserCuttingInput::default()).unwrap();
//! assert!(result.total_cost > 0.0);
//! assert!((result.suggested_price - result.total_cost * 1.3).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcResult};
use crate::lookup::percent_of;
use crate::materials::StockMaterial;

/// Kerf assumed for the removed material (mm)
pub const KERF_MM: f64 = 0.3;
/// Cooling and extraction draw on top of laser power
pub const AUXILIARY_POWER_FACTOR: f64 = 1.3;
/// Maintenance as a share of depreciation
pub const MAINTENANCE_FACTOR: f64 = 0.07;
pub const PRICE_MULTIPLIER: f64 = 1.3;

fn default_equipment_cost() -> f64 {
    150_000.0
}

fn default_lifespan() -> f64 {
    10.0
}

fn default_annual_hours() -> f64 {
    2000.0
}

/// Input parameters for a laser cutting cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserCuttingInput {
    #[serde(default)]
    pub label: String,
    /// Metals only; plastic has no fiber laser properties
    pub material: StockMaterial,
    /// 0.1 to 50 mm
    pub thickness_mm: f64,
    /// Total cut path (1 to 100,000 mm)
    pub cutting_length_mm: f64,
    /// 0.5 to 30 kW
    pub laser_power_kw: f64,
    /// $/kWh (0.01 to 1)
    pub electricity_rate: f64,
    /// $/h (1 to 200)
    pub labor_rate: f64,
    /// $/kg (0.1 to 1000); the material's market price when omitted
    #[serde(default)]
    pub material_price_per_kg: Option<f64>,
    /// m³/h (0 to 100)
    pub gas_consumption_m3_h: f64,
    /// $/m³ (0 to 50)
    pub gas_price_per_m3: f64,
    #[serde(default = "default_equipment_cost")]
    pub equipment_cost: f64,
    #[serde(default = "default_lifespan")]
    pub equipment_lifespan_years: f64,
    #[serde(default = "default_annual_hours")]
    pub annual_working_hours: f64,
}

impl Default for LaserCuttingInput {
    fn default() -> Self {
        LaserCuttingInput {
            label: String::new(),
            material: StockMaterial::StainlessSteel,
            thickness_mm: 3.0,
            cutting_length_mm: 1000.0,
            laser_power_kw: 3.0,
            electricity_rate: 0.12,
            labor_rate: 25.0,
            material_price_per_kg: Some(5.0),
            gas_consumption_m3_h: 2.0,
            gas_price_per_m3: 1.5,
            equipment_cost: default_equipment_cost(),
            equipment_lifespan_years: default_lifespan(),
            annual_working_hours: default_annual_hours(),
        }
    }
}

impl LaserCuttingInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("thickness_mm", self.thickness_mm, 0.1, 50.0)?;
        ensure_range("cutting_length_mm", self.cutting_length_mm, 1.0, 100_000.0)?;
        ensure_range("laser_power_kw", self.laser_power_kw, 0.5, 30.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("labor_rate", self.labor_rate, 1.0, 200.0)?;
        if let Some(price) = self.material_price_per_kg {
            ensure_range("material_price_per_kg", price, 0.1, 1000.0)?;
        }
        ensure_range("gas_consumption_m3_h", self.gas_consumption_m3_h, 0.0, 100.0)?;
        ensure_range("gas_price_per_m3", self.gas_price_per_m3, 0.0, 50.0)?;
        ensure_range("equipment_cost", self.equipment_cost, 0.0, 10_000_000.0)?;
        ensure_range("equipment_lifespan_years", self.equipment_lifespan_years, 1.0, 30.0)?;
        ensure_range("annual_working_hours", self.annual_working_hours, 100.0, 8760.0)?;
        Ok(())
    }
}

/// Energy per metre of cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyEfficiency {
    /// Under 0.1 kWh/m
    Excellent,
    /// Under 0.3 kWh/m
    Good,
    /// Under 0.5 kWh/m
    Average,
    Poor,
}

impl EnergyEfficiency {
    pub fn for_kwh_per_meter(kwh_per_m: f64) -> Self {
        if kwh_per_m < 0.1 {
            EnergyEfficiency::Excellent
        } else if kwh_per_m < 0.3 {
            EnergyEfficiency::Good
        } else if kwh_per_m < 0.5 {
            EnergyEfficiency::Average
        } else {
            EnergyEfficiency::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserCuttingResult {
    pub cutting_speed_mm_min: f64,
    pub cutting_time_h: f64,
    pub setup_time_h: f64,
    pub total_time_h: f64,

    pub material_cost: f64,
    pub power_cost: f64,
    pub labor_cost: f64,
    pub gas_cost: f64,
    pub depreciation: f64,
    pub maintenance_cost: f64,

    pub total_cost: f64,
    pub suggested_price: f64,
    /// Suggested price minus cost ($)
    pub profit_margin: f64,

    pub material_percent: f64,
    pub power_percent: f64,
    pub labor_percent: f64,
    pub gas_percent: f64,
    pub depreciation_percent: f64,
    pub maintenance_percent: f64,

    pub cost_per_meter: f64,
    pub cost_per_minute: f64,
    pub energy_kwh: f64,
    pub energy_per_meter_kwh: f64,
    pub energy_efficiency: EnergyEfficiency,

    /// Material removed by the kerf
    pub material_volume_cm3: f64,
    pub material_weight_kg: f64,
    pub material_price_per_kg: f64,

    pub recommendations: Vec<String>,
}

/// Cost a laser cut.
///
/// # Errors
///
/// * `UnsupportedCombination` for a material with no laser cutting properties
pub fn calculate(input: &LaserCuttingInput) -> CalcResult<LaserCuttingResult> {
    input.validate()?;
    let props = input.material.laser_properties().require()?;

    let reflectivity_penalty = 1.0 - props.reflectivity * 0.3;
    let cutting_speed_mm_min =
        props.base_speed_mm_min * input.laser_power_kw.sqrt() * reflectivity_penalty / input.thickness_mm.sqrt();
    let cutting_time_h = input.cutting_length_mm / cutting_speed_mm_min / 60.0;
    let setup_time_h = 0.15 + input.thickness_mm * 0.005;
    let total_time_h = cutting_time_h + setup_time_h;

    let material_volume_cm3 = input.cutting_length_mm * KERF_MM * input.thickness_mm / 1000.0;
    let material_weight_kg = material_volume_cm3 * input.material.density_kg_m3() / 1e6;
    let material_price_per_kg = input.material_price_per_kg.unwrap_or(props.default_price_per_kg);
    let material_cost = material_weight_kg * material_price_per_kg;

    let energy_kwh = input.laser_power_kw * AUXILIARY_POWER_FACTOR * cutting_time_h;
    let power_cost = energy_kwh * input.electricity_rate;
    let labor_cost = total_time_h * input.labor_rate;
    let gas_cost = input.gas_consumption_m3_h * cutting_time_h * input.gas_price_per_m3;
    let depreciation =
        input.equipment_cost / (input.equipment_lifespan_years * input.annual_working_hours) * total_time_h;
    let maintenance_cost = depreciation * MAINTENANCE_FACTOR;

    let total_cost = material_cost + power_cost + labor_cost + gas_cost + depreciation + maintenance_cost;
    let suggested_price = total_cost * PRICE_MULTIPLIER;

    let length_m = input.cutting_length_mm / 1000.0;
    let energy_per_meter_kwh = energy_kwh / length_m;
    let energy_efficiency = EnergyEfficiency::for_kwh_per_meter(energy_per_meter_kwh);

    tracing::debug!(
        material = %input.material,
        speed = cutting_speed_mm_min,
        total_cost,
        "laser cut costed"
    );

    let mut recommendations = Vec::new();
    if setup_time_h > cutting_time_h {
        recommendations.push(
            "Setup takes longer than cutting. Batch this job with others on the same material to share setup."
                .to_string(),
        );
    }
    if props.reflectivity >= 0.85 {
        recommendations.push(format!(
            "{} is highly reflective. Use a fiber laser with back-reflection protection and expect slower speeds.",
            input.material.display_name()
        ));
    }
    if energy_efficiency == EnergyEfficiency::Poor {
        recommendations.push(
            "Energy use per meter is high. Check that laser power matches the material thickness.".to_string(),
        );
    }
    if percent_of(labor_cost, total_cost) > 50.0 {
        recommendations.push("Labor dominates the cost. Consider automated loading or nesting more parts per sheet.".to_string());
    }

    Ok(LaserCuttingResult {
        cutting_speed_mm_min,
        cutting_time_h,
        setup_time_h,
        total_time_h,
        material_cost,
        power_cost,
        labor_cost,
        gas_cost,
        depreciation,
        maintenance_cost,
        total_cost,
        suggested_price,
        profit_margin: suggested_price - total_cost,
        material_percent: percent_of(material_cost, total_cost),
        power_percent: percent_of(power_cost, total_cost),
        labor_percent: percent_of(labor_cost, total_cost),
        gas_percent: percent_of(gas_cost, total_cost),
        depreciation_percent: percent_of(depreciation, total_cost),
        maintenance_percent: percent_of(maintenance_cost, total_cost),
        cost_per_meter: total_cost / length_m,
        cost_per_minute: total_cost / (total_time_h * 60.0),
        energy_kwh,
        energy_per_meter_kwh,
        energy_efficiency,
        material_volume_cm3,
        material_weight_kg,
        material_price_per_kg,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_stainless() {
        let r = calculate(&LaserCuttingInput::default()).unwrap();
        let speed = 800.0 * 3f64.sqrt() * (1.0 - 0.6 * 0.3) / 3f64.sqrt();
        assert!((r.cutting_speed_mm_min - speed).abs() < 1e-9);
        assert!((r.cutting_time_h - 1000.0 / speed / 60.0).abs() < 1e-12);
        assert!((r.setup_time_h - 0.165).abs() < 1e-12);
        // 1000 × 0.3 × 3 / 1000 = 0.9 cm³
        assert!((r.material_volume_cm3 - 0.9).abs() < 1e-12);
        assert!((r.material_weight_kg - 0.9 * 7900.0 / 1e6).abs() < 1e-15);
        assert!((r.depreciation - 7.5 * r.total_time_h).abs() < 1e-12);
        assert!((r.maintenance_cost - r.depreciation * 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_components_sum_to_total() {
        let r = calculate(&LaserCuttingInput::default()).unwrap();
        let sum = r.material_cost + r.power_cost + r.labor_cost + r.gas_cost + r.depreciation + r.maintenance_cost;
        assert!((sum - r.total_cost).abs() < 1e-9);
        let pct = r.material_percent
            + r.power_percent
            + r.labor_percent
            + r.gas_percent
            + r.depreciation_percent
            + r.maintenance_percent;
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_material_price() {
        let input = LaserCuttingInput {
            material: StockMaterial::Copper,
            material_price_per_kg: None,
            ..LaserCuttingInput::default()
        };
        let r = calculate(&input).unwrap();
        assert_eq!(r.material_price_per_kg, 15.0);
        assert!(r.recommendations.iter().any(|s| s.contains("highly reflective")));
    }

    #[test]
    fn test_plastic_is_unsupported() {
        let input = LaserCuttingInput {
            material: StockMaterial::Plastic,
            ..LaserCuttingInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "UNSUPPORTED_COMBINATION");
    }

    #[test]
    fn test_thicker_is_slower() {
        let thin = calculate(&LaserCuttingInput::default()).unwrap();
        let thick = calculate(&LaserCuttingInput {
            thickness_mm: 12.0,
            ..LaserCuttingInput::default()
        })
        .unwrap();
        assert!(thick.cutting_speed_mm_min < thin.cutting_speed_mm_min);
        assert!(thick.total_cost > thin.total_cost);
    }

    #[test]
    fn test_efficiency_bands() {
        assert_eq!(EnergyEfficiency::for_kwh_per_meter(0.05), EnergyEfficiency::Excellent);
        assert_eq!(EnergyEfficiency::for_kwh_per_meter(0.1), EnergyEfficiency::Good);
        assert_eq!(EnergyEfficiency::for_kwh_per_meter(0.3), EnergyEfficiency::Average);
        assert_eq!(EnergyEfficiency::for_kwh_per_meter(0.5), EnergyEfficiency::Poor);
    }
}
