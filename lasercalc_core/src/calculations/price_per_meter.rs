//! # Quick Price per Meter
//!
//! Ballpark operating cost of one meter of cut: electricity and labor over
//! the time the head needs to travel a meter. Material and assist gas are
//! left out; use [`laser_cutting`](super::laser_cutting) for a full job cost.
//!
//! ```text
//! speed (m/min)  = base(material, thickness band) × min(1.4, 0.7 + kW / 10)
//! minutes / m    = 1 / max(0.1, speed)
//! cost / minute  = kW × 1.6 × rate / 60 + labor / 60 + 0.05
//! ```
//!
//! The 1.6 multiplier covers chiller and extraction on top of the source.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcResult};
use crate::lookup::Lookup;
use crate::materials::StockMaterial;

/// Wall power of the whole cell per kW of laser
pub const SYSTEM_POWER_MULTIPLIER: f64 = 1.6;

/// Consumables allowance ($/min)
pub const CONSUMABLES_PER_MINUTE: f64 = 0.05;

/// Floor on cutting speed (m/min) so very thick plate stays finite
pub const MIN_SPEED_M_MIN: f64 = 0.1;

/// Base cutting speed (m/min) by thickness band: ≤1, ≤3, ≤6, ≤10 mm, thicker.
pub fn base_speed_m_min(material: StockMaterial, thickness_mm: f64) -> Lookup<f64> {
    let bands: [f64; 5] = match material {
        StockMaterial::MildSteel => [18.0, 5.0, 2.2, 1.0, 0.6],
        StockMaterial::StainlessSteel => [12.0, 3.5, 1.6, 0.8, 0.4],
        StockMaterial::Aluminum => [14.0, 4.5, 2.0, 1.0, 0.5],
        StockMaterial::Brass => [10.0, 3.0, 1.4, 0.7, 0.35],
        StockMaterial::Copper => [8.0, 2.5, 1.1, 0.55, 0.3],
        StockMaterial::Plastic => {
            return Lookup::not_found("cutting speed", "Plastic is not cut on a fiber laser");
        }
    };
    let band = if thickness_mm <= 1.0 {
        0
    } else if thickness_mm <= 3.0 {
        1
    } else if thickness_mm <= 6.0 {
        2
    } else if thickness_mm <= 10.0 {
        3
    } else {
        4
    };
    Lookup::Found(bands[band])
}

/// Minutes to cut one meter, with speed floored at [`MIN_SPEED_M_MIN`].
pub fn minutes_per_meter(speed_m_min: f64) -> f64 {
    1.0 / speed_m_min.max(MIN_SPEED_M_MIN)
}

/// Speed scaling for source power, relative to a 3 kW reference.
pub fn power_speed_factor(laser_power_kw: f64) -> f64 {
    (0.7 + laser_power_kw / 10.0).min(1.4)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePerMeterInput {
    #[serde(default)]
    pub label: String,
    pub material: StockMaterial,
    /// 0.1 to 50 mm
    pub thickness_mm: f64,
    pub electricity_rate: f64,
    pub labor_rate: f64,
    /// 0.5 to 30 kW
    pub laser_power_kw: f64,
}

impl Default for PricePerMeterInput {
    fn default() -> Self {
        PricePerMeterInput {
            label: String::new(),
            material: StockMaterial::MildSteel,
            thickness_mm: 3.0,
            electricity_rate: 0.12,
            labor_rate: 25.0,
            laser_power_kw: 6.0,
        }
    }
}

impl PricePerMeterInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("thickness_mm", self.thickness_mm, 0.1, 50.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("labor_rate", self.labor_rate, 1.0, 200.0)?;
        ensure_range("laser_power_kw", self.laser_power_kw, 0.5, 30.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePerMeterResult {
    pub speed_m_min: f64,
    pub minutes_per_meter: f64,
    pub system_power_kw: f64,
    pub electricity_per_meter: f64,
    pub labor_per_meter: f64,
    pub consumables_per_meter: f64,
    pub cost_per_meter: f64,
}

/// Estimate the operating cost of one meter of cut.
pub fn calculate(input: &PricePerMeterInput) -> CalcResult<PricePerMeterResult> {
    input.validate()?;

    let speed_m_min =
        base_speed_m_min(input.material, input.thickness_mm).require()? * power_speed_factor(input.laser_power_kw);
    let minutes_per_meter = minutes_per_meter(speed_m_min);
    tracing::debug!(material = %input.material, thickness = input.thickness_mm, speed_m_min, "price per meter");

    let system_power_kw = input.laser_power_kw * SYSTEM_POWER_MULTIPLIER;
    let electricity_per_minute = system_power_kw * input.electricity_rate / 60.0;
    let labor_per_minute = input.labor_rate / 60.0;
    let operating_cost_per_minute = electricity_per_minute + labor_per_minute + CONSUMABLES_PER_MINUTE;

    Ok(PricePerMeterResult {
        speed_m_min,
        minutes_per_meter,
        system_power_kw,
        electricity_per_meter: electricity_per_minute * minutes_per_meter,
        labor_per_meter: labor_per_minute * minutes_per_meter,
        consumables_per_meter: CONSUMABLES_PER_MINUTE * minutes_per_meter,
        cost_per_meter: operating_cost_per_minute * minutes_per_meter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_cut() {
        // 3 mm mild steel at 6 kW: 5 × 1.3 = 6.5 m/min
        let r = calculate(&PricePerMeterInput::default()).unwrap();
        assert!((r.speed_m_min - 6.5).abs() < 1e-12);
        assert!((r.minutes_per_meter - 1.0 / 6.5).abs() < 1e-12);
        assert!((r.system_power_kw - 9.6).abs() < 1e-12);
        let per_minute = 9.6 * 0.12 / 60.0 + 25.0 / 60.0 + 0.05;
        assert!((r.cost_per_meter - per_minute / 6.5).abs() < 1e-12);
        assert!(
            (r.electricity_per_meter + r.labor_per_meter + r.consumables_per_meter - r.cost_per_meter).abs() < 1e-12
        );
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let m = StockMaterial::MildSteel;
        assert_eq!(base_speed_m_min(m, 1.0), Lookup::Found(18.0));
        assert_eq!(base_speed_m_min(m, 1.01), Lookup::Found(5.0));
        assert_eq!(base_speed_m_min(m, 3.0), Lookup::Found(5.0));
        assert_eq!(base_speed_m_min(m, 6.0), Lookup::Found(2.2));
        assert_eq!(base_speed_m_min(m, 10.0), Lookup::Found(1.0));
        assert_eq!(base_speed_m_min(m, 10.5), Lookup::Found(0.6));
        assert_eq!(base_speed_m_min(StockMaterial::Copper, 25.0), Lookup::Found(0.3));
    }

    #[test]
    fn test_power_factor_caps() {
        assert!((power_speed_factor(3.0) - 1.0).abs() < 1e-12);
        assert_eq!(power_speed_factor(7.0), 1.4);
        assert_eq!(power_speed_factor(30.0), 1.4);
    }

    #[test]
    fn test_speed_floor() {
        // 0.3 m/min copper × 0.75 at 0.5 kW = 0.225, above the floor
        let r = calculate(&PricePerMeterInput {
            material: StockMaterial::Copper,
            thickness_mm: 40.0,
            laser_power_kw: 0.5,
            ..PricePerMeterInput::default()
        })
        .unwrap();
        assert!((r.minutes_per_meter - 1.0 / 0.225).abs() < 1e-9);

        assert_eq!(minutes_per_meter(0.05), 10.0);
        assert_eq!(minutes_per_meter(0.0), 10.0);
        assert_eq!(minutes_per_meter(0.1), 10.0);
        assert_eq!(minutes_per_meter(0.5), 2.0);
    }

    #[test]
    fn test_plastic_is_unsupported() {
        let input = PricePerMeterInput {
            material: StockMaterial::Plastic,
            ..PricePerMeterInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "UNSUPPORTED_COMBINATION");
    }

    #[test]
    fn test_thicker_costs_more() {
        let mut last = 0.0;
        for thickness_mm in [1.0, 3.0, 6.0, 10.0, 20.0] {
            let r = calculate(&PricePerMeterInput {
                thickness_mm,
                ..PricePerMeterInput::default()
            })
            .unwrap();
            assert!(r.cost_per_meter > last);
            last = r.cost_per_meter;
        }
    }
}
