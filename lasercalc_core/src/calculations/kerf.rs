//! # Kerf Reference Calculator
//!
//! Looks up the measured kerf width for a material, thickness and nozzle,
//! applies the optional process modifiers and reports the material lost
//! along a cut.
//!
//! A kerf miss is not an error here: the result carries the
//! [`Lookup::NotFound`] and the generic process range instead.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::kerf::{calculate, KerfInput};
//! use lasercalc_core::lookup::Lookup;
//!
//! let result = calculate(&KerfInput::default()).unwrap();
//! assert_eq!(result.kerf_width_mm, Lookup::Found(0.32));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcResult};
use crate::lookup::{Lookup, RangeValue};
use crate::materials::SheetMaterial;
use crate::reference::kerf::{
    calculate_kerf_material_loss, get_kerf_width, kerf_material_loss_for, laser_power_factor, recommended_nozzles,
    CuttingProcess, FocusPosition, GasPressure, KerfMaterialLoss, Nozzle, SpeedSetting, DEFAULT_DENSITY_G_CM3,
};

fn default_cutting_length() -> f64 {
    10.0
}

/// Input parameters for a kerf lookup.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": "mild_steel",
///   "thickness_mm": 3.0,
///   "nozzle": "2.0mm_nozzle",
///   "cutting_length_m": 10.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KerfInput {
    #[serde(default)]
    pub label: String,
    pub material: SheetMaterial,
    /// Sheet thickness (0.5 to 25 mm)
    pub thickness_mm: f64,
    pub nozzle: Nozzle,
    /// Total cut length for the loss estimate (0 to 1000 m)
    #[serde(default = "default_cutting_length")]
    pub cutting_length_m: f64,

    /// Laser power (kW); no power adjustment when omitted
    #[serde(default)]
    pub laser_power_kw: Option<f64>,
    #[serde(default)]
    pub speed: SpeedSetting,
    #[serde(default)]
    pub focus: FocusPosition,
    #[serde(default)]
    pub gas_pressure: GasPressure,
    /// Process whose generic kerf range is reported alongside
    #[serde(default)]
    pub process: CuttingProcess,
    /// Use the material's density for the mass loss instead of steel
    #[serde(default)]
    pub use_material_density: bool,
}

impl Default for KerfInput {
    fn default() -> Self {
        KerfInput {
            label: String::new(),
            material: SheetMaterial::MildSteel,
            thickness_mm: 3.0,
            nozzle: Nozzle::D2_0,
            cutting_length_m: default_cutting_length(),
            laser_power_kw: None,
            speed: SpeedSetting::Optimal,
            focus: FocusPosition::OnSurface,
            gas_pressure: GasPressure::Optimal,
            process: CuttingProcess::FiberLaser,
            use_material_density: false,
        }
    }
}

impl KerfInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("thickness_mm", self.thickness_mm, 0.5, 25.0)?;
        ensure_range("cutting_length_m", self.cutting_length_m, 0.0, 1000.0)?;
        if let Some(kw) = self.laser_power_kw {
            ensure_range("laser_power_kw", kw, 0.5, 30.0)?;
        }
        Ok(())
    }

    /// Combined speed × focus × gas pressure × power multiplier.
    pub fn modifier(&self) -> f64 {
        let power = self.laser_power_kw.map(laser_power_factor).unwrap_or(1.0);
        self.speed.factor() * self.focus.factor() * self.gas_pressure.factor() * power
    }
}

/// Kerf lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KerfResult {
    /// Measured kerf for the exact nozzle, or why there is none
    pub kerf_width_mm: Lookup<f64>,
    /// Measured kerf × process modifiers
    pub adjusted_kerf_width_mm: Option<f64>,
    pub modifier: f64,
    pub recommended_nozzles: [Nozzle; 2],
    pub nozzle_is_recommended: bool,
    /// Generic min/typical/max kerf for the selected process
    pub process_range_mm: RangeValue,
    /// Loss along the cut, from the adjusted kerf
    pub material_loss: Option<KerfMaterialLoss>,
    /// Density used for the mass loss (g/cm³)
    pub density_g_cm3: f64,
    pub recommendations: Vec<String>,
}

/// Look up kerf width and material loss.
pub fn calculate(input: &KerfInput) -> CalcResult<KerfResult> {
    input.validate()?;

    let kerf_width_mm = get_kerf_width(input.material, input.thickness_mm, input.nozzle);
    let modifier = input.modifier();
    let adjusted = kerf_width_mm.clone().found().map(|k| k * modifier);

    let density_g_cm3 = if input.use_material_density {
        input.material.density_g_cm3()
    } else {
        DEFAULT_DENSITY_G_CM3
    };
    let material_loss = adjusted.map(|k| {
        if input.use_material_density {
            kerf_material_loss_for(input.material, k, input.cutting_length_m, input.thickness_mm)
        } else {
            calculate_kerf_material_loss(k, input.cutting_length_m, input.thickness_mm, None)
        }
    });

    let nozzles = recommended_nozzles(input.thickness_mm);
    let nozzle_is_recommended = nozzles.contains(&input.nozzle);
    let process_range_mm = input.process.kerf_range(input.thickness_mm);

    let mut recommendations = Vec::new();
    if let Lookup::NotFound { reason, .. } = &kerf_width_mm {
        recommendations.push(format!(
            "{}. Typical {} kerf at this thickness is {:.2}-{:.2}mm.",
            reason,
            input.process.display_name(),
            process_range_mm.min,
            process_range_mm.max
        ));
    }
    if !nozzle_is_recommended {
        recommendations.push(format!(
            "{} is outside the usual range for {}mm. Recommended: {} or {}.",
            input.nozzle, input.thickness_mm, nozzles[0], nozzles[1]
        ));
    }
    if !input.use_material_density && input.material != SheetMaterial::MildSteel {
        recommendations.push(format!(
            "Mass loss uses steel density ({} g/cm³). Enable material density for {} ({} g/cm³).",
            DEFAULT_DENSITY_G_CM3,
            input.material.display_name(),
            input.material.density_g_cm3()
        ));
    }
    if input.focus == FocusPosition::AboveSurface && input.thickness_mm > 6.0 {
        recommendations.push("Focus above the surface widens the kerf. Thick plate usually cuts with focus inside the material.".to_string());
    }

    Ok(KerfResult {
        kerf_width_mm,
        adjusted_kerf_width_mm: adjusted,
        modifier,
        recommended_nozzles: nozzles,
        nozzle_is_recommended,
        process_range_mm,
        material_loss,
        density_g_cm3,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup_and_loss() {
        let r = calculate(&KerfInput::default()).unwrap();
        assert_eq!(r.kerf_width_mm, Lookup::Found(0.32));
        assert_eq!(r.modifier, 1.0);
        assert!(r.nozzle_is_recommended);
        let loss = r.material_loss.unwrap();
        // 0.032cm × 1000cm = 32cm², × 0.3cm = 9.6cm³, × 7.85 / 1000
        assert!((loss.linear_area_loss_cm2 - 32.0).abs() < 1e-9);
        assert!((loss.volume_loss_cm3 - 9.6).abs() < 1e-9);
        assert!((loss.mass_loss_kg - 9.6 * 7.85 / 1000.0).abs() < 1e-12);
        assert!(r.recommendations.is_empty());
    }

    #[test]
    fn test_miss_reports_process_range() {
        let input = KerfInput {
            thickness_mm: 4.0,
            ..KerfInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!(!r.kerf_width_mm.is_found());
        assert_eq!(r.adjusted_kerf_width_mm, None);
        assert_eq!(r.material_loss, None);
        assert!(r.recommendations[0].contains("Fiber Laser"));
    }

    #[test]
    fn test_modifiers_multiply() {
        let input = KerfInput {
            laser_power_kw: Some(8.0),
            speed: SpeedSetting::Slow,
            focus: FocusPosition::InMaterial,
            ..KerfInput::default()
        };
        let r = calculate(&input).unwrap();
        let expected = 1.05 * 0.95 * 1.0 * 1.05;
        assert!((r.modifier - expected).abs() < 1e-12);
        assert!((r.adjusted_kerf_width_mm.unwrap() - 0.32 * expected).abs() < 1e-12);
    }

    #[test]
    fn test_material_density_is_opt_in() {
        let steel_density = calculate(&KerfInput {
            material: SheetMaterial::Aluminum,
            ..KerfInput::default()
        })
        .unwrap();
        assert_eq!(steel_density.density_g_cm3, 7.85);
        assert!(steel_density.recommendations.iter().any(|s| s.contains("steel density")));

        let own_density = calculate(&KerfInput {
            material: SheetMaterial::Aluminum,
            use_material_density: true,
            ..KerfInput::default()
        })
        .unwrap();
        assert_eq!(own_density.density_g_cm3, 2.7);
        let a = steel_density.material_loss.unwrap().mass_loss_kg;
        let b = own_density.material_loss.unwrap().mass_loss_kg;
        assert!((b / a - 2.7 / 7.85).abs() < 1e-9);
    }

    #[test]
    fn test_unusual_nozzle_is_flagged() {
        let input = KerfInput {
            thickness_mm: 1.0,
            nozzle: Nozzle::D2_5,
            ..KerfInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!(!r.nozzle_is_recommended);
        assert!(r.recommendations.iter().any(|s| s.contains("Recommended")));
    }

    #[test]
    fn test_validation() {
        let bad = KerfInput {
            cutting_length_m: -1.0,
            ..KerfInput::default()
        };
        assert!(calculate(&bad).is_err());
    }
}
