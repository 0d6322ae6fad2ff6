//! # Energy Cost
//!
//! Electricity use, cost and carbon footprint of a machine running a
//! regular schedule with a peak-rate tariff.
//!
//! System power is the loaded machine draw plus cooling and extraction.
//! A fixed share of each day runs at the peak rate
//! `rate × (1 + premium%)`, the rest at the standard rate.

use serde::{Deserialize, Serialize};

use super::{PrioritizedRecommendation, Priority};
use crate::errors::{ensure_range, CalcResult};

/// Carbon price used for the annual carbon cost ($/t CO₂)
pub const CARBON_PRICE_PER_TONNE: f64 = 50.0;

/// First operating hour of the day in the hourly profile
pub const SHIFT_START_HOUR: u32 = 8;

/// Peak tariff window, `[start, end)`
pub const PEAK_WINDOW: (u32, u32) = (9, 17);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    #[default]
    LaserCutter,
    CncMill,
    PlasmaCutter,
    Waterjet,
    Other,
}

/// Input parameters for an energy cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub equipment_type: EquipmentType,
    /// 0.1 to 500 kW
    pub rated_power_kw: f64,
    /// Average load (10 to 100 %)
    pub average_load_percent: f64,
    /// 0.1 to 24 h
    pub daily_operating_hours: f64,
    /// 1 to 7
    pub operating_days_per_week: u32,
    /// 1 to 52
    pub weeks_per_year: u32,
    /// $/kWh (0.01 to 1)
    pub electricity_rate: f64,
    /// 0 to 200 %
    pub peak_rate_premium_percent: f64,
    /// Share of operating hours at the peak rate (0 to 100 %)
    pub peak_hours_percent: f64,
    /// 0 to 100 kW
    pub cooling_power_kw: f64,
    /// 0 to 50 kW
    pub extraction_power_kw: f64,
    /// g CO₂ per kWh (0 to 2000)
    pub grid_carbon_intensity: f64,
}

impl Default for EnergyInput {
    fn default() -> Self {
        EnergyInput {
            label: String::new(),
            equipment_type: EquipmentType::LaserCutter,
            rated_power_kw: 6.0,
            average_load_percent: 75.0,
            daily_operating_hours: 8.0,
            operating_days_per_week: 5,
            weeks_per_year: 50,
            electricity_rate: 0.12,
            peak_rate_premium_percent: 30.0,
            peak_hours_percent: 40.0,
            cooling_power_kw: 3.0,
            extraction_power_kw: 2.0,
            grid_carbon_intensity: 400.0,
        }
    }
}

impl EnergyInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("rated_power_kw", self.rated_power_kw, 0.1, 500.0)?;
        ensure_range("average_load_percent", self.average_load_percent, 10.0, 100.0)?;
        ensure_range("daily_operating_hours", self.daily_operating_hours, 0.1, 24.0)?;
        ensure_range("operating_days_per_week", self.operating_days_per_week as f64, 1.0, 7.0)?;
        ensure_range("weeks_per_year", self.weeks_per_year as f64, 1.0, 52.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("peak_rate_premium_percent", self.peak_rate_premium_percent, 0.0, 200.0)?;
        ensure_range("peak_hours_percent", self.peak_hours_percent, 0.0, 100.0)?;
        ensure_range("cooling_power_kw", self.cooling_power_kw, 0.0, 100.0)?;
        ensure_range("extraction_power_kw", self.extraction_power_kw, 0.0, 50.0)?;
        ensure_range("grid_carbon_intensity", self.grid_carbon_intensity, 0.0, 2000.0)?;
        Ok(())
    }

    fn auxiliary_power_kw(&self) -> f64 {
        self.cooling_power_kw + self.extraction_power_kw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUsage {
    pub hour: u32,
    pub consumption_kwh: f64,
    pub cost: f64,
    /// Operating and inside the peak window
    pub is_peak: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyResult {
    pub effective_load_kw: f64,
    pub total_system_power_kw: f64,

    pub daily_kwh: f64,
    pub weekly_kwh: f64,
    pub monthly_kwh: f64,
    pub annual_kwh: f64,

    pub daily_cost: f64,
    pub weekly_cost: f64,
    pub monthly_cost: f64,
    pub annual_cost: f64,

    pub standard_rate_cost: f64,
    pub peak_rate_cost: f64,
    /// Cooling and extraction share of the annual cost
    pub auxiliary_cost: f64,

    pub daily_co2_kg: f64,
    pub monthly_co2_kg: f64,
    pub annual_co2_tonnes: f64,
    pub carbon_cost_per_year: f64,

    /// Effective load over rated power (%)
    pub power_efficiency: f64,
    /// kWh per operating hour
    pub energy_intensity: f64,
    pub cost_per_operating_hour: f64,

    pub recommendations: Vec<PrioritizedRecommendation>,
    pub hourly_breakdown: Vec<HourlyUsage>,
}

/// Estimate energy use and cost.
pub fn calculate(input: &EnergyInput) -> CalcResult<EnergyResult> {
    input.validate()?;

    let effective_load_kw = input.rated_power_kw * input.average_load_percent / 100.0;
    let auxiliary_kw = input.auxiliary_power_kw();
    let total_system_power_kw = effective_load_kw + auxiliary_kw;

    let days = input.operating_days_per_week as f64;
    let weeks = input.weeks_per_year as f64;
    let annual_operating_hours = input.daily_operating_hours * days * weeks;

    let peak_share = (input.peak_hours_percent / 100.0).clamp(0.0, 1.0);
    let peak_hours = input.daily_operating_hours * peak_share;
    let off_peak_hours = (input.daily_operating_hours - peak_hours).max(0.0);
    let daily_peak_kwh = total_system_power_kw * peak_hours;
    let daily_off_peak_kwh = total_system_power_kw * off_peak_hours;

    let daily_kwh = daily_peak_kwh + daily_off_peak_kwh;
    let weekly_kwh = daily_kwh * days;
    let annual_kwh = weekly_kwh * weeks;
    let monthly_kwh = annual_kwh / 12.0;

    let peak_rate = input.electricity_rate * (1.0 + input.peak_rate_premium_percent / 100.0);
    let daily_cost = daily_peak_kwh * peak_rate + daily_off_peak_kwh * input.electricity_rate;
    let weekly_cost = daily_cost * days;
    let annual_cost = weekly_cost * weeks;
    let monthly_cost = annual_cost / 12.0;

    let standard_rate_cost = daily_off_peak_kwh * days * weeks * input.electricity_rate;
    let peak_rate_cost = daily_peak_kwh * days * weeks * peak_rate;
    let auxiliary_share = if total_system_power_kw > 0.0 {
        (auxiliary_kw / total_system_power_kw).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let auxiliary_cost = annual_cost * auxiliary_share;

    let daily_co2_kg = daily_kwh * input.grid_carbon_intensity / 1000.0;
    let monthly_co2_kg = monthly_kwh * input.grid_carbon_intensity / 1000.0;
    let annual_co2_tonnes = annual_kwh * input.grid_carbon_intensity / 1e6;

    let power_efficiency = effective_load_kw / input.rated_power_kw * 100.0;
    let cost_per_operating_hour = annual_cost / annual_operating_hours;

    let hourly_breakdown = (0..24u32)
        .map(|hour| {
            let h = hour as f64;
            let start = SHIFT_START_HOUR as f64;
            let operating = h >= start && h < start + input.daily_operating_hours;
            let in_window = hour >= PEAK_WINDOW.0 && hour < PEAK_WINDOW.1;
            let rate = if in_window { peak_rate } else { input.electricity_rate };
            let consumption_kwh = if operating { total_system_power_kw } else { 0.0 };
            HourlyUsage {
                hour,
                consumption_kwh,
                cost: consumption_kwh * rate,
                is_peak: in_window && operating,
            }
        })
        .collect();

    let recommendations = energy_recommendations(
        input,
        &Metrics {
            annual_cost,
            annual_kwh,
            power_efficiency,
            peak_rate_cost,
            auxiliary_cost,
        },
    );

    tracing::debug!(annual_kwh, annual_cost, "energy estimated");

    Ok(EnergyResult {
        effective_load_kw,
        total_system_power_kw,
        daily_kwh,
        weekly_kwh,
        monthly_kwh,
        annual_kwh,
        daily_cost,
        weekly_cost,
        monthly_cost,
        annual_cost,
        standard_rate_cost,
        peak_rate_cost,
        auxiliary_cost,
        daily_co2_kg,
        monthly_co2_kg,
        annual_co2_tonnes,
        carbon_cost_per_year: annual_co2_tonnes * CARBON_PRICE_PER_TONNE,
        power_efficiency,
        energy_intensity: total_system_power_kw,
        cost_per_operating_hour,
        recommendations,
        hourly_breakdown,
    })
}

struct Metrics {
    annual_cost: f64,
    annual_kwh: f64,
    power_efficiency: f64,
    peak_rate_cost: f64,
    auxiliary_cost: f64,
}

fn energy_recommendations(input: &EnergyInput, m: &Metrics) -> Vec<PrioritizedRecommendation> {
    let mut recs = Vec::new();
    let mut push = |title: &str, description: String, potential_savings: f64, priority: Priority| {
        recs.push(PrioritizedRecommendation {
            title: title.to_string(),
            description,
            potential_savings,
            priority,
        })
    };

    if input.peak_hours_percent > 30.0 {
        push(
            "Shift Operations to Off-Peak Hours",
            format!(
                "{}% of your operations occur during peak hours. Moving production to off-peak windows can significantly lower electricity costs, depending on your tariff and scheduling flexibility.",
                input.peak_hours_percent
            ),
            m.peak_rate_cost * 0.5,
            Priority::High,
        );
    }

    if m.power_efficiency < 70.0 {
        push(
            "Optimize Equipment Load Factor",
            format!(
                "The average load factor is {:.1}%. Reviewing batch sizes, idle time and shift scheduling may reduce time spent running without productive output.",
                m.power_efficiency
            ),
            m.annual_cost * 0.15,
            Priority::High,
        );
    }

    let auxiliary_kw = input.auxiliary_power_kw();
    if auxiliary_kw > input.rated_power_kw * 0.3 {
        push(
            "Upgrade Auxiliary Systems",
            format!(
                "Auxiliary systems draw {:.0}% of main equipment power. More efficient cooling and extraction or better controls could reduce this share.",
                auxiliary_kw / input.rated_power_kw * 100.0
            ),
            m.auxiliary_cost * 0.25,
            Priority::Medium,
        );
    }

    if m.annual_kwh > 20_000.0 {
        push(
            "Consider Solar Panel Installation",
            format!(
                "With annual consumption of {:.0} kWh, on-site generation may be worth evaluating with your energy provider.",
                m.annual_kwh
            ),
            m.annual_cost * 0.3,
            Priority::Medium,
        );
    }

    push(
        "Install Power Factor Correction",
        "Poor power factor can result in utility penalties and wasted energy. Review your utility bills and demand charges to decide whether correction equipment is justified."
            .to_string(),
        m.annual_cost * 0.08,
        Priority::Low,
    );

    if input.average_load_percent > 85.0 {
        push(
            "Implement Preventive Maintenance Schedule",
            "High load factors can lead to increased wear. Regular maintenance keeps efficiency up and prevents costly breakdowns."
                .to_string(),
            m.annual_cost * 0.12,
            Priority::Medium,
        );
    }

    recs.sort_by_key(|r| r.priority);
    recs
}

/// Sum of the potential savings of a set of recommendations ($/year).
pub fn calculate_total_potential_savings(recommendations: &[PrioritizedRecommendation]) -> f64 {
    recommendations.iter().map(|r| r.potential_savings).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_usage() {
        let r = calculate(&EnergyInput::default()).unwrap();
        assert!((r.effective_load_kw - 4.5).abs() < 1e-12);
        assert!((r.total_system_power_kw - 9.5).abs() < 1e-12);
        assert!((r.daily_kwh - 76.0).abs() < 1e-9);
        assert!((r.annual_kwh - 76.0 * 250.0).abs() < 1e-6);
        // 30.4 kWh at 0.156 + 45.6 kWh at 0.12
        assert!((r.daily_cost - (30.4 * 0.156 + 45.6 * 0.12)).abs() < 1e-9);
        assert!((r.standard_rate_cost + r.peak_rate_cost - r.annual_cost).abs() < 1e-6);
        assert!((r.annual_co2_tonnes - 19_000.0 * 400.0 / 1e6).abs() < 1e-9);
        assert!((r.carbon_cost_per_year - r.annual_co2_tonnes * 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_profile() {
        let r = calculate(&EnergyInput::default()).unwrap();
        assert_eq!(r.hourly_breakdown.len(), 24);
        let operating: Vec<u32> = r
            .hourly_breakdown
            .iter()
            .filter(|h| h.consumption_kwh > 0.0)
            .map(|h| h.hour)
            .collect();
        assert_eq!(operating, (8..16).collect::<Vec<_>>());
        assert!(!r.hourly_breakdown[8].is_peak);
        assert!(r.hourly_breakdown[9].is_peak);
        assert!(!r.hourly_breakdown[17].is_peak);
    }

    #[test]
    fn test_recommendations_sorted_by_priority() {
        let input = EnergyInput {
            average_load_percent: 50.0,
            ..EnergyInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!(r.recommendations.windows(2).all(|w| w[0].priority <= w[1].priority));
        assert_eq!(r.recommendations[0].priority, Priority::High);
        assert_eq!(r.recommendations.last().unwrap().title, "Install Power Factor Correction");
    }

    #[test]
    fn test_total_savings() {
        let r = calculate(&EnergyInput::default()).unwrap();
        let total = calculate_total_potential_savings(&r.recommendations);
        assert!(total > 0.0);
        let manual: f64 = r.recommendations.iter().map(|x| x.potential_savings).sum();
        assert_eq!(total, manual);
    }

    #[test]
    fn test_validation() {
        let bad = EnergyInput {
            operating_days_per_week: 8,
            ..EnergyInput::default()
        };
        assert!(calculate(&bad).is_err());
    }
}
