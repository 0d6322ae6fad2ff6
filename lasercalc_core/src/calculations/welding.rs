//! # Laser Welding Cost
//!
//! Cycle time and piece cost of a laser weld.
//!
//! ## Weld Speed
//!
//! Continuous processes use a capped linear function of power:
//!
//! ```text
//! speed (mm/s) = min(cap, P / P_ref × k(t))
//! ```
//!
//! `P_ref` is 1 kW (1.5 kW for copper and brass) and `k(t)` is one of three
//! steps by thickness. Spot welding is time based: each spot takes a fixed
//! dwell and spots are 5 mm apart, so the equivalent speed is `5 / dwell`.
//!
//! ## Machine Hour
//!
//! Depreciation, electricity at the wall (laser power over wall-plug
//! efficiency), shielding gas, labor, overhead and maintenance.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcResult};
use crate::materials::WeldMaterial;

/// Margin on price for the recommended price
pub const WELDING_PROFIT_MARGIN: f64 = 0.40;

/// Distance between spot welds (mm)
pub const SPOT_SPACING_MM: f64 = 5.0;

pub const PREHEAT_MINUTES: f64 = 5.0;
pub const POST_HEAT_TREATMENT_MINUTES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldProcess {
    Conduction,
    Keyhole,
    #[default]
    Seam,
    Spot,
    Overlap,
    Butt,
}

impl WeldProcess {
    pub const ALL: [WeldProcess; 6] = [
        WeldProcess::Conduction,
        WeldProcess::Keyhole,
        WeldProcess::Seam,
        WeldProcess::Spot,
        WeldProcess::Overlap,
        WeldProcess::Butt,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WeldProcess::Conduction => "Conduction Welding",
            WeldProcess::Keyhole => "Keyhole Welding",
            WeldProcess::Seam => "Seam Welding",
            WeldProcess::Spot => "Spot Welding",
            WeldProcess::Overlap => "Lap Joint Welding",
            WeldProcess::Butt => "Butt Joint Welding",
        }
    }

    /// Upper thickness bound of the first two speed steps (mm)
    fn thickness_steps(&self) -> (f64, f64) {
        match self {
            WeldProcess::Conduction | WeldProcess::Overlap => (1.0, 3.0),
            WeldProcess::Keyhole => (2.0, 5.0),
            WeldProcess::Seam | WeldProcess::Butt | WeldProcess::Spot => (1.5, 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    #[default]
    ButtJoint,
    LapJoint,
    CornerJoint,
    TJoint,
    EdgeJoint,
}

impl JointType {
    pub fn display_name(&self) -> &'static str {
        match self {
            JointType::ButtJoint => "Butt Joint",
            JointType::LapJoint => "Lap Joint",
            JointType::CornerJoint => "Corner Joint",
            JointType::TJoint => "T-Joint",
            JointType::EdgeJoint => "Edge Joint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldingGas {
    #[default]
    Argon,
    Helium,
    Nitrogen,
    None,
}

/// Speed cap (mm/s) and per-step speed factors for a continuous process.
///
/// Spot welding has no speed entry; see [`WeldMaterial::spot_time_s`].
fn speed_table(material: WeldMaterial, process: WeldProcess) -> Option<(f64, [f64; 3])> {
    use WeldMaterial as M;
    use WeldProcess as P;
    let entry = match (material, process) {
        (_, P::Spot) => return None,

        (M::MildSteel, P::Conduction) => (50.0, [40.0, 20.0, 10.0]),
        (M::MildSteel, P::Keyhole) => (80.0, [50.0, 30.0, 15.0]),
        (M::MildSteel, P::Seam) => (60.0, [35.0, 18.0, 10.0]),
        (M::MildSteel, P::Overlap) => (45.0, [30.0, 15.0, 8.0]),
        (M::MildSteel, P::Butt) => (55.0, [35.0, 20.0, 12.0]),

        (M::StainlessSteel304, P::Conduction) => (40.0, [30.0, 15.0, 8.0]),
        (M::StainlessSteel304, P::Keyhole) => (70.0, [45.0, 25.0, 12.0]),
        (M::StainlessSteel304, P::Seam) => (50.0, [30.0, 15.0, 8.0]),
        (M::StainlessSteel304, P::Overlap) => (40.0, [25.0, 12.0, 6.0]),
        (M::StainlessSteel304, P::Butt) => (50.0, [30.0, 18.0, 10.0]),

        (M::StainlessSteel316, P::Conduction) => (38.0, [28.0, 14.0, 7.0]),
        (M::StainlessSteel316, P::Keyhole) => (65.0, [42.0, 23.0, 11.0]),
        (M::StainlessSteel316, P::Seam) => (48.0, [28.0, 14.0, 7.0]),
        (M::StainlessSteel316, P::Overlap) => (38.0, [23.0, 11.0, 5.0]),
        (M::StainlessSteel316, P::Butt) => (48.0, [28.0, 16.0, 9.0]),

        (M::Aluminum5052, P::Conduction) => (45.0, [35.0, 18.0, 9.0]),
        (M::Aluminum5052, P::Keyhole) => (75.0, [48.0, 28.0, 14.0]),
        (M::Aluminum5052, P::Seam) => (55.0, [32.0, 16.0, 9.0]),
        (M::Aluminum5052, P::Overlap) => (42.0, [28.0, 14.0, 7.0]),
        (M::Aluminum5052, P::Butt) => (52.0, [32.0, 19.0, 11.0]),

        (M::Aluminum6061, P::Conduction) => (43.0, [33.0, 17.0, 8.0]),
        (M::Aluminum6061, P::Keyhole) => (72.0, [46.0, 26.0, 13.0]),
        (M::Aluminum6061, P::Seam) => (53.0, [30.0, 15.0, 8.0]),
        (M::Aluminum6061, P::Overlap) => (40.0, [26.0, 13.0, 6.0]),
        (M::Aluminum6061, P::Butt) => (50.0, [30.0, 18.0, 10.0]),

        (M::Titanium, P::Conduction) => (30.0, [20.0, 10.0, 5.0]),
        (M::Titanium, P::Keyhole) => (50.0, [30.0, 18.0, 9.0]),
        (M::Titanium, P::Seam) => (40.0, [22.0, 12.0, 6.0]),
        (M::Titanium, P::Overlap) => (28.0, [18.0, 9.0, 4.0]),
        (M::Titanium, P::Butt) => (38.0, [22.0, 13.0, 7.0]),

        (M::Copper, P::Conduction) => (35.0, [25.0, 12.0, 6.0]),
        (M::Copper, P::Keyhole) => (55.0, [35.0, 20.0, 10.0]),
        (M::Copper, P::Seam) => (45.0, [26.0, 14.0, 7.0]),
        (M::Copper, P::Overlap) => (33.0, [20.0, 10.0, 5.0]),
        (M::Copper, P::Butt) => (43.0, [26.0, 15.0, 8.0]),

        (M::Brass, P::Conduction) => (38.0, [27.0, 13.0, 6.0]),
        (M::Brass, P::Keyhole) => (60.0, [38.0, 22.0, 11.0]),
        (M::Brass, P::Seam) => (48.0, [28.0, 15.0, 7.0]),
        (M::Brass, P::Overlap) => (36.0, [22.0, 11.0, 5.0]),
        (M::Brass, P::Butt) => (46.0, [28.0, 16.0, 9.0]),

        (M::GalvanizedSteel, P::Conduction) => (45.0, [35.0, 18.0, 9.0]),
        (M::GalvanizedSteel, P::Keyhole) => (75.0, [45.0, 28.0, 14.0]),
        (M::GalvanizedSteel, P::Seam) => (55.0, [32.0, 16.0, 9.0]),
        (M::GalvanizedSteel, P::Overlap) => (42.0, [28.0, 14.0, 7.0]),
        (M::GalvanizedSteel, P::Butt) => (52.0, [32.0, 18.0, 10.0]),
    };
    Some(entry)
}

/// Weld speed in mm/s for a material, process, thickness and laser power.
pub fn weld_speed_mm_s(material: WeldMaterial, process: WeldProcess, thickness_mm: f64, power_w: f64) -> f64 {
    match speed_table(material, process) {
        Some((cap, factors)) => {
            let (first, second) = process.thickness_steps();
            let k = if thickness_mm <= first {
                factors[0]
            } else if thickness_mm <= second {
                factors[1]
            } else {
                factors[2]
            };
            (power_w / material.power_reference_w() * k).min(cap)
        }
        None => SPOT_SPACING_MM / material.spot_time_s(thickness_mm),
    }
}

/// Wall-plug efficiency of a laser source by output power.
pub fn power_efficiency(power_w: f64) -> f64 {
    if power_w <= 500.0 {
        0.25
    } else if power_w <= 1000.0 {
        0.30
    } else if power_w <= 2000.0 {
        0.35
    } else if power_w <= 5000.0 {
        0.40
    } else {
        0.45
    }
}

/// `Xh Ym`, `Ym Zs` or `Zs`, truncating each unit.
pub fn format_batch_time(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Input parameters for a welding cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldingInput {
    #[serde(default)]
    pub label: String,
    pub process: WeldProcess,
    pub material: WeldMaterial,
    #[serde(default)]
    pub joint_type: JointType,
    /// 0.1 to 50 mm
    pub thickness_mm: f64,
    /// Length of each weld (1 to 10,000 mm)
    pub weld_length_mm: f64,
    /// Welds per piece (1 to 10,000)
    pub number_of_welds: u32,
    /// Measured speed (1 to 200 mm/s) replacing the table value
    #[serde(default)]
    pub weld_speed_override_mm_s: Option<f64>,

    /// 100 to 20,000 W
    pub laser_power_w: f64,
    pub equipment_cost: f64,
    pub equipment_lifespan_years: f64,
    pub annual_working_hours: f64,

    pub electricity_rate: f64,
    #[serde(default)]
    pub shielding_gas: ShieldingGas,
    /// L/min (0 to 50)
    pub gas_flow_l_min: f64,
    /// $/m³ (0 to 500)
    pub gas_cost_per_m3: f64,

    pub labor_rate: f64,
    pub overhead_rate: f64,
    pub maintenance_rate: f64,

    #[serde(default)]
    pub requires_preheat: bool,
    #[serde(default)]
    pub requires_post_heat_treatment: bool,
    /// Per piece (0 to 60 min)
    #[serde(default)]
    pub inspection_minutes: f64,

    /// 0 to 240 min
    pub setup_minutes_per_batch: f64,
    /// 1 to 10,000
    pub quantity_per_batch: u32,
}

impl Default for WeldingInput {
    fn default() -> Self {
        WeldingInput {
            label: String::new(),
            process: WeldProcess::Seam,
            material: WeldMaterial::StainlessSteel304,
            joint_type: JointType::ButtJoint,
            thickness_mm: 2.0,
            weld_length_mm: 500.0,
            number_of_welds: 1,
            weld_speed_override_mm_s: None,
            laser_power_w: 1500.0,
            equipment_cost: 150_000.0,
            equipment_lifespan_years: 10.0,
            annual_working_hours: 2000.0,
            electricity_rate: 0.12,
            shielding_gas: ShieldingGas::Argon,
            gas_flow_l_min: 15.0,
            gas_cost_per_m3: 50.0,
            labor_rate: 35.0,
            overhead_rate: 10.0,
            maintenance_rate: 5.0,
            requires_preheat: false,
            requires_post_heat_treatment: false,
            inspection_minutes: 0.0,
            setup_minutes_per_batch: 15.0,
            quantity_per_batch: 1,
        }
    }
}

impl WeldingInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("thickness_mm", self.thickness_mm, 0.1, 50.0)?;
        ensure_range("weld_length_mm", self.weld_length_mm, 1.0, 10_000.0)?;
        ensure_range("number_of_welds", self.number_of_welds as f64, 1.0, 10_000.0)?;
        if let Some(speed) = self.weld_speed_override_mm_s {
            ensure_range("weld_speed_override_mm_s", speed, 1.0, 200.0)?;
        }
        ensure_range("laser_power_w", self.laser_power_w, 100.0, 20_000.0)?;
        ensure_range("equipment_cost", self.equipment_cost, 10_000.0, 5_000_000.0)?;
        ensure_range("equipment_lifespan_years", self.equipment_lifespan_years, 1.0, 20.0)?;
        ensure_range("annual_working_hours", self.annual_working_hours, 100.0, 8760.0)?;
        ensure_range("electricity_rate", self.electricity_rate, 0.01, 1.0)?;
        ensure_range("gas_flow_l_min", self.gas_flow_l_min, 0.0, 50.0)?;
        ensure_range("gas_cost_per_m3", self.gas_cost_per_m3, 0.0, 500.0)?;
        ensure_range("labor_rate", self.labor_rate, 5.0, 300.0)?;
        ensure_range("overhead_rate", self.overhead_rate, 0.0, 200.0)?;
        ensure_range("maintenance_rate", self.maintenance_rate, 0.0, 100.0)?;
        ensure_range("inspection_minutes", self.inspection_minutes, 0.0, 60.0)?;
        ensure_range("setup_minutes_per_batch", self.setup_minutes_per_batch, 0.0, 240.0)?;
        ensure_range("quantity_per_batch", self.quantity_per_batch as f64, 1.0, 10_000.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldingResult {
    pub weld_speed_mm_s: f64,
    pub weld_time_per_piece_s: f64,
    pub setup_time_per_piece_min: f64,
    /// Inspection, preheat and post heat treatment per piece
    pub additional_time_min: f64,
    pub total_time_per_piece_s: f64,
    pub total_batch_time_s: f64,
    pub total_batch_time_formatted: String,

    pub depreciation_per_hour: f64,
    pub electricity_per_hour: f64,
    pub gas_cost_per_hour: f64,
    pub total_hourly_cost: f64,
    pub cost_per_piece: f64,
    pub total_batch_cost: f64,

    /// Margin on price (%)
    pub profit_margin_percent: f64,
    pub recommended_price: f64,

    pub pieces_per_hour: f64,
    pub revenue_per_hour: f64,
    /// Weld time share of piece time (%)
    pub utilization_rate: f64,
}

/// Cost a laser weld.
pub fn calculate(input: &WeldingInput) -> CalcResult<WeldingResult> {
    input.validate()?;

    let weld_speed_mm_s = input.weld_speed_override_mm_s.unwrap_or_else(|| {
        weld_speed_mm_s(input.material, input.process, input.thickness_mm, input.laser_power_w)
    });
    tracing::debug!(
        material = %input.material,
        process = input.process.display_name(),
        weld_speed_mm_s,
        "weld speed"
    );

    let qty = input.quantity_per_batch as f64;
    let weld_time_per_piece_s = input.weld_length_mm / weld_speed_mm_s * input.number_of_welds as f64;
    let setup_time_per_piece_min = input.setup_minutes_per_batch / qty;

    let mut additional_time_min = input.inspection_minutes;
    if input.requires_preheat {
        additional_time_min += PREHEAT_MINUTES;
    }
    if input.requires_post_heat_treatment {
        additional_time_min += POST_HEAT_TREATMENT_MINUTES;
    }

    let total_time_per_piece_s = weld_time_per_piece_s + (setup_time_per_piece_min + additional_time_min) * 60.0;
    let total_batch_time_s = total_time_per_piece_s * qty;

    let depreciation_per_hour = input.equipment_cost / (input.equipment_lifespan_years * input.annual_working_hours);
    let electricity_per_hour =
        input.laser_power_w / 1000.0 * input.electricity_rate / power_efficiency(input.laser_power_w);
    let gas_cost_per_hour = match input.shielding_gas {
        ShieldingGas::None => 0.0,
        _ => input.gas_flow_l_min * 60.0 * input.gas_cost_per_m3 / 1000.0,
    };
    let total_hourly_cost = depreciation_per_hour
        + electricity_per_hour
        + gas_cost_per_hour
        + input.labor_rate
        + input.overhead_rate
        + input.maintenance_rate;

    let cost_per_piece = total_time_per_piece_s / 3600.0 * total_hourly_cost;
    let recommended_price = cost_per_piece / (1.0 - WELDING_PROFIT_MARGIN);
    let pieces_per_hour = 3600.0 / total_time_per_piece_s;

    Ok(WeldingResult {
        weld_speed_mm_s,
        weld_time_per_piece_s,
        setup_time_per_piece_min,
        additional_time_min,
        total_time_per_piece_s,
        total_batch_time_s,
        total_batch_time_formatted: format_batch_time(total_batch_time_s),
        depreciation_per_hour,
        electricity_per_hour,
        gas_cost_per_hour,
        total_hourly_cost,
        cost_per_piece,
        total_batch_cost: cost_per_piece * qty,
        profit_margin_percent: WELDING_PROFIT_MARGIN * 100.0,
        recommended_price,
        pieces_per_hour,
        revenue_per_hour: pieces_per_hour * recommended_price,
        utilization_rate: weld_time_per_piece_s / total_time_per_piece_s * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_seam_speed_capped() {
        // 1.5 kW × 30 for ≤1.5 mm stainless 304 = 45 mm/s, under the 50 cap
        assert_eq!(weld_speed_mm_s(WeldMaterial::StainlessSteel304, WeldProcess::Seam, 1.5, 1500.0), 45.0);
        assert_eq!(weld_speed_mm_s(WeldMaterial::StainlessSteel304, WeldProcess::Seam, 1.5, 3000.0), 50.0);
        // 2 mm falls in the middle step
        assert_eq!(weld_speed_mm_s(WeldMaterial::StainlessSteel304, WeldProcess::Seam, 2.0, 1500.0), 22.5);
    }

    #[test]
    fn test_keyhole_steps() {
        assert_eq!(weld_speed_mm_s(WeldMaterial::MildSteel, WeldProcess::Keyhole, 2.0, 1000.0), 50.0);
        assert_eq!(weld_speed_mm_s(WeldMaterial::MildSteel, WeldProcess::Keyhole, 5.0, 1000.0), 30.0);
        assert_eq!(weld_speed_mm_s(WeldMaterial::MildSteel, WeldProcess::Keyhole, 5.1, 1000.0), 15.0);
    }

    #[test]
    fn test_copper_reference_power() {
        // copper normalises to 1.5 kW: 1500 / 1500 × 25
        assert_eq!(weld_speed_mm_s(WeldMaterial::Copper, WeldProcess::Conduction, 1.0, 1500.0), 25.0);
    }

    #[test]
    fn test_spot_speed() {
        // 2 mm mild steel spot: 1.0 s per 5 mm
        assert_eq!(weld_speed_mm_s(WeldMaterial::MildSteel, WeldProcess::Spot, 2.0, 1500.0), 5.0);
    }

    #[test]
    fn test_default_job() {
        let r = calculate(&WeldingInput::default()).unwrap();
        assert_eq!(r.weld_speed_mm_s, 22.5);
        assert!((r.weld_time_per_piece_s - 500.0 / 22.5).abs() < 1e-9);
        assert!((r.total_time_per_piece_s - (500.0 / 22.5 + 900.0)).abs() < 1e-9);
        assert!((r.depreciation_per_hour - 7.5).abs() < 1e-12);
        assert!((r.electricity_per_hour - 1.5 * 0.12 / 0.35).abs() < 1e-12);
        assert!((r.gas_cost_per_hour - 45.0).abs() < 1e-12);
        assert!((r.recommended_price - r.cost_per_piece / 0.6).abs() < 1e-9);
        assert_eq!(r.total_batch_time_formatted, "15m 22s");
    }

    #[test]
    fn test_extras_and_no_gas() {
        let input = WeldingInput {
            requires_preheat: true,
            requires_post_heat_treatment: true,
            inspection_minutes: 2.0,
            shielding_gas: ShieldingGas::None,
            ..WeldingInput::default()
        };
        let r = calculate(&input).unwrap();
        assert_eq!(r.additional_time_min, 17.0);
        assert_eq!(r.gas_cost_per_hour, 0.0);
    }

    #[test]
    fn test_speed_override() {
        let input = WeldingInput {
            weld_speed_override_mm_s: Some(100.0),
            ..WeldingInput::default()
        };
        assert_eq!(calculate(&input).unwrap().weld_time_per_piece_s, 5.0);
    }

    #[test]
    fn test_format_batch_time() {
        assert_eq!(format_batch_time(42.9), "42s");
        assert_eq!(format_batch_time(125.0), "2m 5s");
        assert_eq!(format_batch_time(3_725.0), "1h 2m");
    }

    #[test]
    fn test_efficiency_bands() {
        assert_eq!(power_efficiency(500.0), 0.25);
        assert_eq!(power_efficiency(1000.0), 0.30);
        assert_eq!(power_efficiency(2000.0), 0.35);
        assert_eq!(power_efficiency(5000.0), 0.40);
        assert_eq!(power_efficiency(5001.0), 0.45);
    }
}
