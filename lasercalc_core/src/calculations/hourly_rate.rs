//! # Hourly Rate Builder
//!
//! Decomposes a shop's machine-hour rate into eight additive components.
//! No table lookups: every input is a rate or cost the shop supplies.
//!
//! | Component    | Formula                                                  |
//! |--------------|----------------------------------------------------------|
//! | Depreciation | equipment cost / (lifespan × annual hours)               |
//! | Labor        | operator rate × benefits multiplier                      |
//! | Energy       | total kW × electricity rate                              |
//! | Maintenance  | equipment cost × maintenance % / annual hours            |
//! | Consumables  | consumables $/h                                          |
//! | Facility     | (rent + utilities + insurance) / (annual hours / 12)     |
//! | Overhead     | monthly overhead / (annual hours / 12)                   |
//! | Gas          | m³/h × $/m³                                              |
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::hourly_rate::{calculate, HourlyRateInput};
//!
//! let result = calculate(&HourlyRateInput::default()).unwrap();
//! assert!((result.depreciation - 7.5).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_at_least, ensure_positive, ensure_range, CalcError, CalcResult};
use crate::lookup::percent_of;

/// Hours in the standard shop year used for break-even percentages
pub const STANDARD_ANNUAL_HOURS: f64 = 2000.0;

/// Assist gas the machine mostly runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopGas {
    #[default]
    Nitrogen,
    Oxygen,
    Air,
    Mixed,
}

/// Input parameters for the hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRateInput {
    #[serde(default)]
    pub label: String,

    /// Machine purchase price ($10k to $500k)
    pub equipment_cost: f64,
    /// Depreciation period (5 to 20 years)
    pub equipment_lifespan_years: f64,
    /// Machine hours per year (500 to 6000)
    pub annual_working_hours: f64,

    /// Operator base wage (10 to 100 $/h)
    pub operator_rate: f64,
    /// Benefits, taxes and insurance on top of wage (1.0 to 2.0)
    pub benefits_multiplier: f64,

    /// Total draw including chiller and extraction (1 to 50 kW)
    pub total_power_kw: f64,
    /// $/kWh (0.01 to 1.0)
    pub electricity_rate: f64,

    /// Annual maintenance as % of equipment cost (0 to 20)
    pub annual_maintenance_percent: f64,
    /// Nozzles, lenses, windows (0 to 10 $/h)
    pub consumables_per_hour: f64,

    pub facility_rent_monthly: f64,
    pub utilities_monthly: f64,
    pub insurance_monthly: f64,
    /// Office, admin and sales per month
    pub overhead_monthly: f64,

    #[serde(default)]
    pub gas: ShopGas,
    /// m³/h (0 to 10)
    pub gas_consumption_per_hour: f64,
    /// $/m³ (0 to 5)
    pub gas_price_per_m3: f64,
}

impl Default for HourlyRateInput {
    fn default() -> Self {
        HourlyRateInput {
            label: String::new(),
            equipment_cost: 150_000.0,
            equipment_lifespan_years: 10.0,
            annual_working_hours: 2000.0,
            operator_rate: 25.0,
            benefits_multiplier: 1.35,
            total_power_kw: 10.0,
            electricity_rate: 0.12,
            annual_maintenance_percent: 5.0,
            consumables_per_hour: 1.35,
            facility_rent_monthly: 3000.0,
            utilities_monthly: 1500.0,
            insurance_monthly: 2000.0,
            overhead_monthly: 15_000.0,
            gas: ShopGas::Nitrogen,
            gas_consumption_per_hour: 1.5,
            gas_price_per_m3: 1.5,
        }
    }
}

impl HourlyRateInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("equipment_cost", self.equipment_cost, 10_000.0, 500_000.0)?;
        ensure_range("equipment_lifespan_years", self.equipment_lifespan_years, 5.0, 20.0)?;
        ensure_range("annual_working_hours", self.annual_working_hours, 500.0, 6000.0)?;
        ensure_range("operator_rate", self.operator_rate, 10.0, 100.0)?;
        ensure_range("benefits_multiplier", self.benefits_multiplier, 1.0, 2.0)?;
        ensure_range("total_power_kw", self.total_power_kw, 1.0, 50.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("annual_maintenance_percent", self.annual_maintenance_percent, 0.0, 20.0)?;
        ensure_range("consumables_per_hour", self.consumables_per_hour, 0.0, 10.0)?;
        ensure_range("facility_rent_monthly", self.facility_rent_monthly, 0.0, 50_000.0)?;
        ensure_range("utilities_monthly", self.utilities_monthly, 0.0, 10_000.0)?;
        ensure_range("insurance_monthly", self.insurance_monthly, 0.0, 10_000.0)?;
        ensure_range("overhead_monthly", self.overhead_monthly, 0.0, 50_000.0)?;
        ensure_range("gas_consumption_per_hour", self.gas_consumption_per_hour, 0.0, 10.0)?;
        ensure_range("gas_price_per_m3", self.gas_price_per_m3, 0.0, 5.0)?;
        Ok(())
    }
}

/// One row of the sorted cost breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub category: String,
    pub cost: f64,
    pub percentage: f64,
}

/// Hourly rate decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRateResult {
    pub depreciation: f64,
    pub labor: f64,
    pub energy: f64,
    pub maintenance: f64,
    pub consumables: f64,
    pub facility: f64,
    pub overhead: f64,
    pub gas: f64,

    /// Sum of the eight components ($/h)
    pub total_hourly_cost: f64,

    pub depreciation_percent: f64,
    pub labor_percent: f64,
    pub energy_percent: f64,
    pub maintenance_percent: f64,
    pub consumables_percent: f64,
    pub facility_percent: f64,
    pub overhead_percent: f64,
    pub gas_percent: f64,

    /// Components sorted by cost, highest first
    pub cost_breakdown: Vec<CostComponent>,

    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Build the hourly shop rate.
pub fn calculate(input: &HourlyRateInput) -> CalcResult<HourlyRateResult> {
    input.validate()?;

    let hours_per_month = input.annual_working_hours / 12.0;

    let depreciation = input.equipment_cost / (input.equipment_lifespan_years * input.annual_working_hours);
    let labor = input.operator_rate * input.benefits_multiplier;
    let energy = input.total_power_kw * input.electricity_rate;
    let maintenance = input.equipment_cost * (input.annual_maintenance_percent / 100.0) / input.annual_working_hours;
    let consumables = input.consumables_per_hour;
    let facility = (input.facility_rent_monthly + input.utilities_monthly + input.insurance_monthly) / hours_per_month;
    let overhead = input.overhead_monthly / hours_per_month;
    let gas = input.gas_consumption_per_hour * input.gas_price_per_m3;

    let total_hourly_cost = depreciation + labor + energy + maintenance + consumables + facility + overhead + gas;
    tracing::debug!(total_hourly_cost, "hourly rate");

    let pct = |part: f64| percent_of(part, total_hourly_cost);
    let depreciation_percent = pct(depreciation);
    let labor_percent = pct(labor);
    let energy_percent = pct(energy);
    let maintenance_percent = pct(maintenance);
    let consumables_percent = pct(consumables);
    let facility_percent = pct(facility);
    let overhead_percent = pct(overhead);
    let gas_percent = pct(gas);

    let mut cost_breakdown: Vec<CostComponent> = [
        ("Labor", labor, labor_percent),
        ("Overhead", overhead, overhead_percent),
        ("Facility", facility, facility_percent),
        ("Depreciation", depreciation, depreciation_percent),
        ("Gas", gas, gas_percent),
        ("Maintenance", maintenance, maintenance_percent),
        ("Consumables", consumables, consumables_percent),
        ("Energy", energy, energy_percent),
    ]
    .into_iter()
    .map(|(category, cost, percentage)| CostComponent {
        category: category.to_string(),
        cost,
        percentage,
    })
    .collect();
    cost_breakdown.sort_by(|a, b| b.cost.total_cmp(&a.cost));

    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    if labor_percent > 50.0 {
        alerts.push("Labor cost is more than 50% of the hourly rate.".to_string());
        recommendations.push("Consider automation or process optimization to reduce labor dependency".to_string());
    } else if labor_percent < 25.0 {
        alerts.push(
            "Labor cost is less than 25% of the hourly rate; check that all relevant labor and overhead items are included."
                .to_string(),
        );
    }

    if energy_percent > 10.0 {
        alerts.push("Energy cost is more than 10% of the hourly rate.".to_string());
        recommendations.push("Review machine efficiency and consider energy-saving measures".to_string());
    }

    if depreciation_percent < 8.0 {
        alerts.push(
            "Equipment depreciation is less than 8% of the hourly rate; review your utilization and lifespan assumptions."
                .to_string(),
        );
        recommendations.push("Consider increasing machine utilization to improve ROI".to_string());
    } else if depreciation_percent > 20.0 {
        alerts.push(
            "Equipment depreciation is more than 20% of the hourly rate; review whether your lifespan assumption is too short."
                .to_string(),
        );
    }

    if overhead_percent > 25.0 {
        alerts.push("Overhead costs are more than 25% of the hourly rate.".to_string());
        recommendations.push("Review administrative costs and look for efficiency improvements".to_string());
    }

    if facility_percent > 20.0 {
        alerts.push("Facility costs are more than 20% of the hourly rate.".to_string());
        recommendations.push("Consider optimizing space utilization or negotiating rent".to_string());
    }

    if gas_percent > 8.0 && input.gas == ShopGas::Nitrogen {
        recommendations
            .push("Nitrogen costs are high. Consider on-site nitrogen generator if usage is consistent".to_string());
    }

    if total_hourly_cost < 40.0 {
        alerts.push(
            "Total hourly rate is below the lower benchmark band; double-check that all cost components and realistic utilization are included."
                .to_string(),
        );
    } else if total_hourly_cost > 100.0 {
        alerts.push(
            "Total hourly rate is at the high end of the benchmark bands; ensure your pricing and value proposition reflect this level."
                .to_string(),
        );
    }

    if input.annual_working_hours < 1500.0 {
        recommendations
            .push("Annual working hours are low. Consider strategies to increase machine utilization".to_string());
    }

    Ok(HourlyRateResult {
        depreciation,
        labor,
        energy,
        maintenance,
        consumables,
        facility,
        overhead,
        gas,
        total_hourly_cost,
        depreciation_percent,
        labor_percent,
        energy_percent,
        maintenance_percent,
        consumables_percent,
        facility_percent,
        overhead_percent,
        gas_percent,
        cost_breakdown,
        alerts,
        recommendations,
    })
}

/// Minimum utilization to reach a target hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenUtilization {
    /// Hours per year, rounded to a whole hour
    pub break_even_hours: f64,
    /// Break-even hours as a share of a 2000-hour year (%)
    pub break_even_percentage: f64,
    /// Break-even × 1.2, rounded
    pub recommended_minimum_hours: f64,
}

/// Solve `hours = fixed / (target rate − variable cost per hour)`.
///
/// Fixed costs are annual depreciation plus `fixed_costs_annual`.
///
/// # Errors
///
/// * `DivisionByZero` when the target rate does not exceed the variable cost
pub fn calculate_break_even_utilization(
    equipment_cost: f64,
    lifespan_years: f64,
    fixed_costs_annual: f64,
    variable_cost_per_hour: f64,
    target_hourly_rate: f64,
) -> CalcResult<BreakEvenUtilization> {
    ensure_at_least("equipment_cost", equipment_cost, 0.0)?;
    ensure_at_least("fixed_costs_annual", fixed_costs_annual, 0.0)?;
    ensure_positive("target_hourly_rate", target_hourly_rate)?;
    if !lifespan_years.is_finite() || lifespan_years <= 0.0 {
        return Err(CalcError::division_by_zero("lifespan", "Equipment lifespan must be positive"));
    }
    let margin = target_hourly_rate - variable_cost_per_hour;
    if !margin.is_finite() || margin <= 0.0 {
        return Err(CalcError::division_by_zero(
            "contribution per hour",
            "Target hourly rate must exceed the variable cost per hour",
        ));
    }

    let total_fixed = equipment_cost / lifespan_years + fixed_costs_annual;
    let hours = total_fixed / margin;
    Ok(BreakEvenUtilization {
        break_even_hours: hours.round(),
        break_even_percentage: hours / STANDARD_ANNUAL_HOURS * 100.0,
        recommended_minimum_hours: (hours * 1.2).round(),
    })
}

/// Band of an hourly rate against the benchmark ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkPosition {
    /// Under $40/h
    Below,
    /// $40 to $70/h
    Average,
    /// $70 to $100/h
    Above,
    /// Over $100/h
    Premium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub position: BenchmarkPosition,
    pub description: String,
    pub competitive_advantage: String,
}

/// Place a total hourly rate into one of four fixed bands (<40, ≤70, ≤100, >100).
pub fn compare_to_industry_benchmarks(total_hourly_cost: f64) -> BenchmarkComparison {
    let (position, description, competitive_advantage) = if total_hourly_cost < 40.0 {
        (
            BenchmarkPosition::Below,
            "Your hourly rate is below the lower benchmark band.",
            "Strong cost advantage, but ensure quality and sustainability",
        )
    } else if total_hourly_cost <= 70.0 {
        (
            BenchmarkPosition::Average,
            "Your hourly rate falls within the mid-range band.",
            "Competitive positioning, focus on service differentiation",
        )
    } else if total_hourly_cost <= 100.0 {
        (
            BenchmarkPosition::Above,
            "Your hourly rate is above the mid-range band.",
            "Premium positioning, emphasize quality and capabilities",
        )
    } else {
        (
            BenchmarkPosition::Premium,
            "Your hourly rate is at the high end of the benchmark bands.",
            "High-end positioning, must justify with exceptional quality/service",
        )
    };
    BenchmarkComparison {
        position,
        description: description.to_string(),
        competitive_advantage: competitive_advantage.to_string(),
    }
}
