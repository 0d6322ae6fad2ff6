//! # Kerf Width Reference Data
//!
//! Measured fiber laser kerf widths (mm) by material, nominal sheet
//! thickness and nozzle diameter, with the process modifiers that widen or
//! narrow the cut. Accuracy is about ±0.02 mm.
//!
//! Unlike the pierce table this one is not bucketed: a lookup matches the
//! first tabulated thickness within 0.5 mm of the request, so 4 mm steel
//! (halfway between the 3 mm and 5 mm rows) has no entry.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::reference::kerf::{get_kerf_width, Nozzle};
//! use lasercalc_core::materials::SheetMaterial;
//!
//! let w = get_kerf_width(SheetMaterial::MildSteel, 3.0, Nozzle::D2_0);
//! assert_eq!(w.found(), Some(0.32));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::{Lookup, RangeValue};
use crate::materials::SheetMaterial;

/// Thickness keys match within this distance (exclusive)
pub const THICKNESS_MATCH_TOLERANCE_MM: f64 = 0.5;

/// Density assumed by [`calculate_kerf_material_loss`] when none is given (steel, g/cm³)
pub const DEFAULT_DENSITY_G_CM3: f64 = 7.85;

/// Nozzle orifice diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nozzle {
    #[serde(rename = "1.0mm_nozzle", alias = "1.0mm")]
    D1_0,
    #[serde(rename = "1.5mm_nozzle", alias = "1.5mm")]
    D1_5,
    #[serde(rename = "2.0mm_nozzle", alias = "2.0mm")]
    D2_0,
    #[serde(rename = "2.5mm_nozzle", alias = "2.5mm")]
    D2_5,
    #[serde(rename = "3.0mm_nozzle", alias = "3.0mm")]
    D3_0,
    #[serde(rename = "3.5mm_nozzle", alias = "3.5mm")]
    D3_5,
    #[serde(rename = "4.0mm_nozzle", alias = "4.0mm")]
    D4_0,
}

impl Nozzle {
    pub const ALL: [Nozzle; 7] = [
        Nozzle::D1_0,
        Nozzle::D1_5,
        Nozzle::D2_0,
        Nozzle::D2_5,
        Nozzle::D3_0,
        Nozzle::D3_5,
        Nozzle::D4_0,
    ];

    pub fn diameter_mm(&self) -> f64 {
        match self {
            Nozzle::D1_0 => 1.0,
            Nozzle::D1_5 => 1.5,
            Nozzle::D2_0 => 2.0,
            Nozzle::D2_5 => 2.5,
            Nozzle::D3_0 => 3.0,
            Nozzle::D3_5 => 3.5,
            Nozzle::D4_0 => 4.0,
        }
    }

    /// Table key (e.g., "2.0mm_nozzle")
    pub fn code(&self) -> &'static str {
        match self {
            Nozzle::D1_0 => "1.0mm_nozzle",
            Nozzle::D1_5 => "1.5mm_nozzle",
            Nozzle::D2_0 => "2.0mm_nozzle",
            Nozzle::D2_5 => "2.5mm_nozzle",
            Nozzle::D3_0 => "3.0mm_nozzle",
            Nozzle::D3_5 => "3.5mm_nozzle",
            Nozzle::D4_0 => "4.0mm_nozzle",
        }
    }

    /// Parse "2.0mm_nozzle", "2.0mm", "2.0" or "2"
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let trimmed = s.trim().trim_end_matches("_nozzle").trim_end_matches("mm");
        let diameter: f64 = trimmed
            .parse()
            .map_err(|_| CalcError::invalid_input("nozzle", s, "Expected a diameter like 2.0mm_nozzle"))?;
        Nozzle::ALL
            .into_iter()
            .find(|n| (n.diameter_mm() - diameter).abs() < 1e-9)
            .ok_or_else(|| CalcError::invalid_input("nozzle", s, "Nozzle diameters run 1.0 to 4.0 mm in 0.5 steps"))
    }
}

impl std::fmt::Display for Nozzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}mm nozzle", self.diameter_mm())
    }
}

/// One tabulated thickness with the nozzles measured at it.
#[derive(Debug, Clone, Copy)]
pub struct KerfRow {
    pub thickness_mm: f64,
    pub widths: &'static [(Nozzle, f64)],
}

const fn row(thickness_mm: f64, widths: &'static [(Nozzle, f64)]) -> KerfRow {
    KerfRow { thickness_mm, widths }
}

use Nozzle::*;

static MILD_STEEL: [KerfRow; 10] = [
    row(0.5, &[(D1_0, 0.10), (D1_5, 0.15), (D2_0, 0.20)]),
    row(1.0, &[(D1_0, 0.12), (D1_5, 0.18), (D2_0, 0.24)]),
    row(2.0, &[(D1_0, 0.15), (D1_5, 0.22), (D2_0, 0.28)]),
    row(3.0, &[(D1_5, 0.25), (D2_0, 0.32), (D2_5, 0.38)]),
    row(5.0, &[(D1_5, 0.28), (D2_0, 0.35), (D2_5, 0.42)]),
    row(8.0, &[(D2_0, 0.38), (D2_5, 0.45), (D3_0, 0.52)]),
    row(10.0, &[(D2_0, 0.42), (D2_5, 0.50), (D3_0, 0.58)]),
    row(12.0, &[(D2_5, 0.52), (D3_0, 0.60), (D3_5, 0.68)]),
    row(15.0, &[(D2_5, 0.58), (D3_0, 0.65), (D3_5, 0.75)]),
    row(20.0, &[(D3_0, 0.70), (D3_5, 0.80), (D4_0, 0.90)]),
];

static STAINLESS_STEEL: [KerfRow; 9] = [
    row(0.5, &[(D1_0, 0.12), (D1_5, 0.18), (D2_0, 0.24)]),
    row(1.0, &[(D1_0, 0.15), (D1_5, 0.20), (D2_0, 0.28)]),
    row(2.0, &[(D1_0, 0.18), (D1_5, 0.25), (D2_0, 0.32)]),
    row(3.0, &[(D1_5, 0.28), (D2_0, 0.35), (D2_5, 0.42)]),
    row(5.0, &[(D1_5, 0.32), (D2_0, 0.40), (D2_5, 0.48)]),
    row(8.0, &[(D2_0, 0.42), (D2_5, 0.50), (D3_0, 0.58)]),
    row(10.0, &[(D2_0, 0.48), (D2_5, 0.55), (D3_0, 0.65)]),
    row(12.0, &[(D2_5, 0.55), (D3_0, 0.65), (D3_5, 0.75)]),
    row(15.0, &[(D3_0, 0.70), (D3_5, 0.80), (D4_0, 0.90)]),
];

static ALUMINUM: [KerfRow; 8] = [
    row(0.5, &[(D1_0, 0.10), (D1_5, 0.15), (D2_0, 0.22)]),
    row(1.0, &[(D1_0, 0.12), (D1_5, 0.18), (D2_0, 0.25)]),
    row(2.0, &[(D1_0, 0.15), (D1_5, 0.22), (D2_0, 0.30)]),
    row(3.0, &[(D1_5, 0.25), (D2_0, 0.32), (D2_5, 0.40)]),
    row(5.0, &[(D1_5, 0.30), (D2_0, 0.38), (D2_5, 0.45)]),
    row(8.0, &[(D2_0, 0.40), (D2_5, 0.48), (D3_0, 0.55)]),
    row(10.0, &[(D2_5, 0.50), (D3_0, 0.58), (D3_5, 0.68)]),
    row(12.0, &[(D3_0, 0.60), (D3_5, 0.70), (D4_0, 0.80)]),
];

static COPPER_BRASS: [KerfRow; 6] = [
    row(0.5, &[(D1_0, 0.12), (D1_5, 0.18), (D2_0, 0.25)]),
    row(1.0, &[(D1_0, 0.15), (D1_5, 0.22), (D2_0, 0.30)]),
    row(2.0, &[(D1_5, 0.22), (D2_0, 0.30), (D2_5, 0.38)]),
    row(3.0, &[(D1_5, 0.28), (D2_0, 0.35), (D2_5, 0.45)]),
    row(5.0, &[(D2_0, 0.38), (D2_5, 0.48), (D3_0, 0.58)]),
    row(8.0, &[(D2_5, 0.50), (D3_0, 0.60), (D3_5, 0.70)]),
];

/// All tabulated rows for a material, thinnest first.
pub fn kerf_rows(material: SheetMaterial) -> &'static [KerfRow] {
    match material {
        SheetMaterial::MildSteel => &MILD_STEEL,
        SheetMaterial::StainlessSteel => &STAINLESS_STEEL,
        SheetMaterial::Aluminum => &ALUMINUM,
        SheetMaterial::CopperBrass => &COPPER_BRASS,
    }
}

/// Kerf width in mm for a material, thickness and nozzle.
///
/// Picks the first (thinnest) tabulated thickness within
/// [`THICKNESS_MATCH_TOLERANCE_MM`]; misses when no row is close enough or the
/// nozzle was not measured at that thickness.
pub fn get_kerf_width(material: SheetMaterial, thickness_mm: f64, nozzle: Nozzle) -> Lookup<f64> {
    let Some(row) = kerf_rows(material)
        .iter()
        .find(|r| (r.thickness_mm - thickness_mm).abs() < THICKNESS_MATCH_TOLERANCE_MM)
    else {
        return Lookup::not_found(
            "kerf width",
            format!("No {} row within 0.5mm of {}mm", material.code(), thickness_mm),
        );
    };
    match row.widths.iter().find(|(n, _)| *n == nozzle) {
        Some((_, width)) => Lookup::Found(*width),
        None => Lookup::not_found(
            "kerf width",
            format!("{} not tabulated for {}mm {}", nozzle.code(), row.thickness_mm, material.code()),
        ),
    }
}

/// The two nozzles usually run at this thickness.
pub fn recommended_nozzles(thickness_mm: f64) -> [Nozzle; 2] {
    if thickness_mm <= 1.0 {
        [D1_0, D1_5]
    } else if thickness_mm <= 3.0 {
        [D1_5, D2_0]
    } else if thickness_mm <= 6.0 {
        [D2_0, D2_5]
    } else if thickness_mm <= 10.0 {
        [D2_5, D3_0]
    } else if thickness_mm <= 15.0 {
        [D3_0, D3_5]
    } else {
        [D3_5, D4_0]
    }
}

/// Cutting speed relative to the optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedSetting {
    /// Below 50% of optimal
    Slow,
    #[default]
    Optimal,
    /// Above optimal
    Fast,
}

impl SpeedSetting {
    pub fn factor(&self) -> f64 {
        match self {
            SpeedSetting::Slow => 1.05,
            SpeedSetting::Optimal => 1.0,
            SpeedSetting::Fast => 0.95,
        }
    }
}

/// Beam focus relative to the sheet surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPosition {
    #[default]
    OnSurface,
    /// Narrower kerf, for thick plate
    InMaterial,
    /// Wider kerf, for thin sheet
    AboveSurface,
}

impl FocusPosition {
    pub fn factor(&self) -> f64 {
        match self {
            FocusPosition::OnSurface => 1.0,
            FocusPosition::InMaterial => 0.95,
            FocusPosition::AboveSurface => 1.08,
        }
    }
}

/// Assist gas pressure relative to the material optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasPressure {
    Low,
    #[default]
    Optimal,
    High,
}

impl GasPressure {
    pub fn factor(&self) -> f64 {
        match self {
            GasPressure::Low => 1.05,
            GasPressure::Optimal => 1.0,
            GasPressure::High => 0.98,
        }
    }
}

/// Laser power modifier: 1-3 kW 0.95, 3-6 kW baseline, 6-12 kW 1.05, above 1.10.
pub fn laser_power_factor(power_kw: f64) -> f64 {
    if power_kw < 3.0 {
        0.95
    } else if power_kw < 6.0 {
        1.0
    } else if power_kw < 12.0 {
        1.05
    } else {
        1.10
    }
}

/// Cutting process family, for rough kerf ranges when no measured row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuttingProcess {
    #[default]
    FiberLaser,
    Co2Laser,
    Plasma,
}

impl CuttingProcess {
    pub const ALL: [CuttingProcess; 3] = [CuttingProcess::FiberLaser, CuttingProcess::Co2Laser, CuttingProcess::Plasma];

    pub fn display_name(&self) -> &'static str {
        match self {
            CuttingProcess::FiberLaser => "Fiber Laser",
            CuttingProcess::Co2Laser => "CO2 Laser",
            CuttingProcess::Plasma => "Plasma",
        }
    }

    /// Kerf range for thin (<3 mm), medium (3-10 mm) and thick (>10 mm) stock.
    pub fn kerf_range(&self, thickness_mm: f64) -> RangeValue {
        let class = if thickness_mm < 3.0 {
            0
        } else if thickness_mm <= 10.0 {
            1
        } else {
            2
        };
        let table: [RangeValue; 3] = match self {
            CuttingProcess::FiberLaser => [
                RangeValue::new(0.08, 0.12, 0.20),
                RangeValue::new(0.20, 0.30, 0.40),
                RangeValue::new(0.40, 0.55, 0.70),
            ],
            CuttingProcess::Co2Laser => [
                RangeValue::new(0.15, 0.22, 0.30),
                RangeValue::new(0.30, 0.45, 0.60),
                RangeValue::new(0.60, 0.80, 1.00),
            ],
            CuttingProcess::Plasma => [
                RangeValue::new(0.50, 1.00, 1.50),
                RangeValue::new(1.50, 2.20, 3.00),
                RangeValue::new(3.00, 4.50, 6.00),
            ],
        };
        table[class]
    }
}

/// Material removed by the beam along a cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KerfMaterialLoss {
    /// Kerf width × cut length (cm²)
    pub linear_area_loss_cm2: f64,
    /// Area × thickness (cm³)
    pub volume_loss_cm3: f64,
    /// Volume × density (kg)
    pub mass_loss_kg: f64,
}

/// Geometry of the kerf slot: width × length × thickness, converted to cm.
///
/// `density_g_cm3` defaults to steel ([`DEFAULT_DENSITY_G_CM3`]) regardless of
/// the material being cut; use [`kerf_material_loss_for`] to take the
/// material's own density.
pub fn calculate_kerf_material_loss(
    kerf_width_mm: f64,
    cutting_length_m: f64,
    thickness_mm: f64,
    density_g_cm3: Option<f64>,
) -> KerfMaterialLoss {
    let density = density_g_cm3.unwrap_or(DEFAULT_DENSITY_G_CM3);
    let kerf_cm = kerf_width_mm / 10.0;
    let thickness_cm = thickness_mm / 10.0;
    let length_cm = cutting_length_m * 100.0;

    let linear_area_loss_cm2 = kerf_cm * length_cm;
    let volume_loss_cm3 = linear_area_loss_cm2 * thickness_cm;
    KerfMaterialLoss {
        linear_area_loss_cm2,
        volume_loss_cm3,
        mass_loss_kg: volume_loss_cm3 * density / 1000.0,
    }
}

/// [`calculate_kerf_material_loss`] with the density of `material`.
pub fn kerf_material_loss_for(
    material: SheetMaterial,
    kerf_width_mm: f64,
    cutting_length_m: f64,
    thickness_mm: f64,
) -> KerfMaterialLoss {
    calculate_kerf_material_loss(kerf_width_mm, cutting_length_m, thickness_mm, Some(material.density_g_cm3()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mild_steel_3mm_2mm_nozzle() {
        assert_eq!(get_kerf_width(SheetMaterial::MildSteel, 3.0, D2_0), Lookup::Found(0.32));
    }

    #[test]
    fn test_closest_key_tolerance_is_strict() {
        // 3.4 matches the 3mm row, 3.5 is exactly 0.5 away from 3 and 1.5 from 5
        assert_eq!(get_kerf_width(SheetMaterial::MildSteel, 3.4, D2_0).found(), Some(0.32));
        assert!(!get_kerf_width(SheetMaterial::MildSteel, 3.5, D2_0).is_found());
        assert!(!get_kerf_width(SheetMaterial::MildSteel, 4.0, D2_0).is_found());
        // 0.75 is within tolerance of both 0.5 and 1; the thinner row wins
        assert_eq!(get_kerf_width(SheetMaterial::MildSteel, 0.75, D1_0).found(), Some(0.10));
    }

    #[test]
    fn test_missing_nozzle_is_not_found() {
        assert!(!get_kerf_width(SheetMaterial::MildSteel, 1.0, D3_0).is_found());
        assert!(!get_kerf_width(SheetMaterial::CopperBrass, 12.0, D3_0).is_found());
    }

    #[test]
    fn test_every_row_is_sorted_and_positive() {
        for m in SheetMaterial::ALL {
            let rows = kerf_rows(m);
            assert!(rows.windows(2).all(|w| w[0].thickness_mm < w[1].thickness_mm));
            for r in rows {
                assert!(r.widths.iter().all(|(_, w)| *w > 0.0));
                assert!(r.widths.windows(2).all(|w| w[0].1 < w[1].1), "wider nozzle, wider kerf");
            }
        }
    }

    #[test]
    fn test_material_loss_geometry() {
        // 0.32mm × 10m × 3mm: 0.032cm × 1000cm = 32cm², × 0.3cm = 9.6cm³
        let loss = calculate_kerf_material_loss(0.32, 10.0, 3.0, None);
        assert!((loss.linear_area_loss_cm2 - 32.0).abs() < 1e-9);
        assert!((loss.volume_loss_cm3 - 9.6).abs() < 1e-9);
        assert!((loss.mass_loss_kg - 9.6 * 7.85 / 1000.0).abs() < 1e-12);

        let al = kerf_material_loss_for(SheetMaterial::Aluminum, 0.32, 10.0, 3.0);
        assert!((al.mass_loss_kg - 9.6 * 2.7 / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_nozzle_guide_and_parse() {
        assert_eq!(recommended_nozzles(1.0), [D1_0, D1_5]);
        assert_eq!(recommended_nozzles(4.0), [D2_0, D2_5]);
        assert_eq!(recommended_nozzles(25.0), [D3_5, D4_0]);
        assert_eq!(Nozzle::from_str_flexible("2.0mm_nozzle").unwrap(), D2_0);
        assert_eq!(Nozzle::from_str_flexible("2.5").unwrap(), D2_5);
        assert!(Nozzle::from_str_flexible("2.2").is_err());
    }

    #[test]
    fn test_process_ranges() {
        assert_eq!(CuttingProcess::FiberLaser.kerf_range(1.0).typical, 0.12);
        assert_eq!(CuttingProcess::Co2Laser.kerf_range(5.0).typical, 0.45);
        assert_eq!(CuttingProcess::Plasma.kerf_range(20.0).typical, 4.5);
        assert_eq!(laser_power_factor(2.0), 0.95);
        assert_eq!(laser_power_factor(15.0), 1.10);
    }
}
