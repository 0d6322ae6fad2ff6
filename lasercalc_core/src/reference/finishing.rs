//! # Finishing Reference Data
//!
//! Deburring minutes per meter of edge by method, material and thickness,
//! edge quality multipliers, cut quality adjustments, handling time per part
//! and additional finishing operations.
//!
//! Only mild steel, stainless and aluminum are tabulated. Copper/brass
//! lookups return [`Lookup::NotFound`].
//!
//! ## Thickness Buckets
//!
//! | Bucket   | Range                 |
//! |----------|-----------------------|
//! | 0.5-2mm  | t ≤ 2                 |
//! | 2-5mm    | 2 < t ≤ 5             |
//! | 5-10mm   | 5 < t ≤ 10            |
//! | 10-20mm  | 10 < t ≤ 25           |
//!
//! The heaviest bucket also serves plate between 20 and 25 mm.

use serde::{Deserialize, Serialize};

use crate::lookup::{Lookup, RangeValue};
use crate::materials::SheetMaterial;

/// Thickest plate the deburr table is used for (mm)
pub const MAX_FINISHING_THICKNESS_MM: f64 = 25.0;

/// Minutes for a standard dimensional inspection per part
pub const INSPECTION_OP_MINUTES: f64 = 5.0;

/// Default price of an automated deburring machine ($)
pub const DEFAULT_AUTOMATED_EQUIPMENT_COST: f64 = 25_000.0;

/// Deburring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishingMethod {
    /// Hand tools
    Manual,
    /// Belt sander or grinder
    #[default]
    Powered,
    /// Deburring machine
    Automated,
}

impl FinishingMethod {
    pub const ALL: [FinishingMethod; 3] = [FinishingMethod::Manual, FinishingMethod::Powered, FinishingMethod::Automated];

    pub fn display_name(&self) -> &'static str {
        match self {
            FinishingMethod::Manual => "Manual (Hand Tools)",
            FinishingMethod::Powered => "Powered (Grinder/Sander)",
            FinishingMethod::Automated => "Automated (Machine)",
        }
    }

    /// Equipment depreciation and upkeep ($/h of finishing)
    pub fn equipment_cost_per_hour(&self) -> f64 {
        match self {
            FinishingMethod::Manual => 2.0,
            FinishingMethod::Powered => 5.0,
            FinishingMethod::Automated => 15.0,
        }
    }

    /// Belts, discs and wheels ($/m of edge)
    pub fn consumables_per_meter(&self) -> f64 {
        match self {
            FinishingMethod::Manual => 0.10,
            FinishingMethod::Powered => 0.20,
            FinishingMethod::Automated => 0.15,
        }
    }

    /// Chamfering minutes per meter of edge
    pub fn chamfer_minutes_per_meter(&self) -> RangeValue {
        match self {
            FinishingMethod::Manual => RangeValue::new(1.5, 2.5, 4.0),
            FinishingMethod::Powered => RangeValue::new(0.8, 1.5, 2.5),
            FinishingMethod::Automated => RangeValue::new(0.3, 0.6, 1.0),
        }
    }

    /// Edge radiusing minutes per meter of edge
    pub fn radius_minutes_per_meter(&self) -> RangeValue {
        match self {
            FinishingMethod::Manual => RangeValue::new(2.0, 3.5, 5.5),
            FinishingMethod::Powered => RangeValue::new(1.0, 2.0, 3.5),
            FinishingMethod::Automated => RangeValue::new(0.5, 1.0, 1.8),
        }
    }
}

impl std::fmt::Display for FinishingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Target edge quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeQuality {
    /// Laser-cut edge, no post-processing
    #[serde(alias = "ascut")]
    AsCut,
    #[default]
    Light,
    Medium,
    High,
    Mirror,
}

impl EdgeQuality {
    pub const ALL: [EdgeQuality; 5] = [
        EdgeQuality::AsCut,
        EdgeQuality::Light,
        EdgeQuality::Medium,
        EdgeQuality::High,
        EdgeQuality::Mirror,
    ];

    /// Multiplier on the deburr baseline (0 for as-cut).
    pub fn finishing_time_multiplier(&self) -> f64 {
        match self {
            EdgeQuality::AsCut => 0.0,
            EdgeQuality::Light => 1.0,
            EdgeQuality::Medium => 1.5,
            EdgeQuality::High => 2.5,
            EdgeQuality::Mirror => 4.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EdgeQuality::AsCut => "Laser-cut edge, no post-processing",
            EdgeQuality::Light => "Remove sharp edges and major burrs",
            EdgeQuality::Medium => "Smooth edges, remove all burrs and dross",
            EdgeQuality::High => "Polished edges, uniform appearance",
            EdgeQuality::Mirror => "Mirror-polished edges",
        }
    }
}

/// Edge quality the laser actually delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutQuality {
    /// Nitrogen cutting, optimal parameters
    #[serde(alias = "excellentCut")]
    Excellent,
    /// Standard parameters, minimal dross
    #[default]
    #[serde(alias = "goodCut")]
    Good,
    /// Some dross, slight irregularities
    #[serde(alias = "fairCut")]
    Fair,
    /// Heavy dross, rough edges
    #[serde(alias = "poorCut")]
    Poor,
}

impl CutQuality {
    /// Extra deburring a worse cut needs (0.5 to 2.0, 1.0 is baseline).
    pub fn finishing_multiplier(&self) -> f64 {
        match self {
            CutQuality::Excellent => 0.5,
            CutQuality::Good => 1.0,
            CutQuality::Fair => 1.3,
            CutQuality::Poor => 2.0,
        }
    }

    pub fn edge_roughness(&self) -> &'static str {
        match self {
            CutQuality::Excellent => "3-6 µm Ra",
            CutQuality::Good => "6-12 µm Ra",
            CutQuality::Fair => "12-25 µm Ra",
            CutQuality::Poor => ">25 µm Ra",
        }
    }
}

/// Largest dimension of the part, for handling time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSize {
    /// Under 300 mm
    Small,
    /// 300-1000 mm
    #[default]
    Medium,
    /// 1000-2000 mm
    Large,
    /// Over 2000 mm
    Xlarge,
}

impl PartSize {
    /// Handling and fixturing minutes per part
    pub fn handling_minutes(&self) -> RangeValue {
        match self {
            PartSize::Small => RangeValue::new(0.5, 1.0, 2.0),
            PartSize::Medium => RangeValue::new(1.0, 2.0, 3.0),
            PartSize::Large => RangeValue::new(2.0, 4.0, 6.0),
            PartSize::Xlarge => RangeValue::new(4.0, 8.0, 12.0),
        }
    }
}

/// Secondary operation after deburring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalOp {
    /// Wire brush or grinding of oxide scale
    OxideRemoval,
    /// Solvent wipe
    Cleaning,
    Chamfering,
    Radiusing,
    /// Dimensional inspection
    Inspection,
}

impl AdditionalOp {
    /// Typical minutes this operation adds to a part.
    ///
    /// Oxide removal, cleaning and inspection are per part; chamfering and
    /// radiusing scale with edge length.
    pub fn minutes(&self, method: FinishingMethod, edge_length_m: f64) -> f64 {
        match self {
            AdditionalOp::OxideRemoval => 3.0,
            AdditionalOp::Cleaning => 1.0,
            AdditionalOp::Chamfering => method.chamfer_minutes_per_meter().typical * edge_length_m,
            AdditionalOp::Radiusing => method.radius_minutes_per_meter().typical * edge_length_m,
            AdditionalOp::Inspection => INSPECTION_OP_MINUTES,
        }
    }
}

/// Thickness bucket of the deburr table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeburrBucket {
    #[serde(rename = "0.5-2mm")]
    UpTo2,
    #[serde(rename = "2-5mm")]
    From2To5,
    #[serde(rename = "5-10mm")]
    From5To10,
    #[serde(rename = "10-20mm")]
    Over10,
}

impl DeburrBucket {
    pub fn for_thickness(thickness_mm: f64) -> Option<DeburrBucket> {
        if !thickness_mm.is_finite() || thickness_mm <= 0.0 || thickness_mm > MAX_FINISHING_THICKNESS_MM {
            return None;
        }
        Some(if thickness_mm <= 2.0 {
            DeburrBucket::UpTo2
        } else if thickness_mm <= 5.0 {
            DeburrBucket::From2To5
        } else if thickness_mm <= 10.0 {
            DeburrBucket::From5To10
        } else {
            DeburrBucket::Over10
        })
    }

    fn index(&self) -> usize {
        match self {
            DeburrBucket::UpTo2 => 0,
            DeburrBucket::From2To5 => 1,
            DeburrBucket::From5To10 => 2,
            DeburrBucket::Over10 => 3,
        }
    }
}

type DeburrRows = [RangeValue; 4];

const fn r(min: f64, typical: f64, max: f64) -> RangeValue {
    RangeValue::new(min, typical, max)
}

static MANUAL_MILD: DeburrRows = [r(0.5, 0.8, 1.2), r(0.8, 1.2, 1.8), r(1.2, 1.8, 2.5), r(1.8, 2.5, 3.5)];
static MANUAL_STAINLESS: DeburrRows = [r(0.6, 1.0, 1.5), r(1.0, 1.5, 2.2), r(1.5, 2.2, 3.0), r(2.2, 3.0, 4.0)];
static MANUAL_ALUMINUM: DeburrRows = [r(0.4, 0.6, 1.0), r(0.6, 1.0, 1.5), r(1.0, 1.5, 2.2), r(1.5, 2.2, 3.0)];

static POWERED_MILD: DeburrRows = [r(0.3, 0.5, 0.8), r(0.5, 0.8, 1.2), r(0.8, 1.2, 1.8), r(1.2, 1.8, 2.5)];
static POWERED_STAINLESS: DeburrRows = [r(0.4, 0.6, 1.0), r(0.6, 1.0, 1.5), r(1.0, 1.5, 2.2), r(1.5, 2.2, 3.0)];
static POWERED_ALUMINUM: DeburrRows = [r(0.2, 0.4, 0.6), r(0.4, 0.6, 1.0), r(0.6, 1.0, 1.5), r(1.0, 1.5, 2.2)];

static AUTOMATED_MILD: DeburrRows = [r(0.1, 0.2, 0.3), r(0.2, 0.3, 0.5), r(0.3, 0.5, 0.8), r(0.5, 0.8, 1.2)];
static AUTOMATED_STAINLESS: DeburrRows = [r(0.15, 0.25, 0.4), r(0.25, 0.4, 0.6), r(0.4, 0.6, 1.0), r(0.6, 1.0, 1.5)];
static AUTOMATED_ALUMINUM: DeburrRows = [r(0.08, 0.15, 0.25), r(0.15, 0.25, 0.4), r(0.25, 0.4, 0.6), r(0.4, 0.6, 1.0)];

fn deburr_rows(method: FinishingMethod, material: SheetMaterial) -> Option<&'static DeburrRows> {
    use FinishingMethod::*;
    use SheetMaterial::*;

    match (method, material) {
        (Manual, MildSteel) => Some(&MANUAL_MILD),
        (Manual, StainlessSteel) => Some(&MANUAL_STAINLESS),
        (Manual, Aluminum) => Some(&MANUAL_ALUMINUM),
        (Powered, MildSteel) => Some(&POWERED_MILD),
        (Powered, StainlessSteel) => Some(&POWERED_STAINLESS),
        (Powered, Aluminum) => Some(&POWERED_ALUMINUM),
        (Automated, MildSteel) => Some(&AUTOMATED_MILD),
        (Automated, StainlessSteel) => Some(&AUTOMATED_STAINLESS),
        (Automated, Aluminum) => Some(&AUTOMATED_ALUMINUM),
        (_, CopperBrass) => None,
    }
}

/// Deburr minutes per meter of edge.
pub fn deburr_time_per_meter(method: FinishingMethod, material: SheetMaterial, thickness_mm: f64) -> Lookup<RangeValue> {
    let Some(rows) = deburr_rows(method, material) else {
        return Lookup::not_found(
            "deburr time",
            format!("{} is not tabulated for finishing", material.display_name()),
        );
    };
    let Some(bucket) = DeburrBucket::for_thickness(thickness_mm) else {
        return Lookup::not_found(
            "deburr time",
            format!("Thickness {}mm is outside the 0-25mm table", thickness_mm),
        );
    };
    tracing::debug!(material = material.code(), ?method, ?bucket, "deburr bucket");
    Lookup::Found(rows[bucket.index()])
}

/// Deburr and handling minutes for one part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishingTimeEstimate {
    pub deburr_time_minutes: f64,
    pub handling_time_minutes: f64,
    pub total_time_minutes: f64,
}

/// Base finishing estimate before the cut-quality adjustment.
///
/// `deburr = edge length × typical minutes/m × quality multiplier`, plus a
/// fixed handling time for the part size.
pub fn estimate_finishing_time(
    edge_length_m: f64,
    material: SheetMaterial,
    thickness_mm: f64,
    method: FinishingMethod,
    quality: EdgeQuality,
    part_size: PartSize,
) -> Lookup<FinishingTimeEstimate> {
    deburr_time_per_meter(method, material, thickness_mm).map(|row| {
        let deburr_time_minutes = edge_length_m * row.typical * quality.finishing_time_multiplier();
        let handling_time_minutes = part_size.handling_minutes().typical;
        FinishingTimeEstimate {
            deburr_time_minutes,
            handling_time_minutes,
            total_time_minutes: deburr_time_minutes + handling_time_minutes,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_scenario() {
        // 300mm perimeter bracket, 3mm mild steel, powered, light
        let e = estimate_finishing_time(
            0.3,
            SheetMaterial::MildSteel,
            3.0,
            FinishingMethod::Powered,
            EdgeQuality::Light,
            PartSize::Small,
        )
        .found()
        .unwrap();
        assert!((e.deburr_time_minutes - 0.24).abs() < 1e-9);
        assert_eq!(e.handling_time_minutes, 1.0);
        assert!((e.total_time_minutes - 1.24).abs() < 1e-9);
    }

    #[test]
    fn test_as_cut_has_only_handling() {
        let e = estimate_finishing_time(
            10.0,
            SheetMaterial::StainlessSteel,
            8.0,
            FinishingMethod::Manual,
            EdgeQuality::AsCut,
            PartSize::Large,
        )
        .found()
        .unwrap();
        assert_eq!(e.deburr_time_minutes, 0.0);
        assert_eq!(e.total_time_minutes, 4.0);
    }

    #[test]
    fn test_buckets() {
        assert_eq!(DeburrBucket::for_thickness(2.0), Some(DeburrBucket::UpTo2));
        assert_eq!(DeburrBucket::for_thickness(5.0), Some(DeburrBucket::From2To5));
        assert_eq!(DeburrBucket::for_thickness(10.0), Some(DeburrBucket::From5To10));
        assert_eq!(DeburrBucket::for_thickness(25.0), Some(DeburrBucket::Over10));
        assert_eq!(DeburrBucket::for_thickness(25.5), None);
        assert_eq!(DeburrBucket::for_thickness(-1.0), None);
    }

    #[test]
    fn test_copper_not_tabulated() {
        let miss = deburr_time_per_meter(FinishingMethod::Powered, SheetMaterial::CopperBrass, 3.0);
        assert!(!miss.is_found());
        assert!(miss.require().is_err());
    }

    #[test]
    fn test_automated_is_fastest() {
        for material in [SheetMaterial::MildSteel, SheetMaterial::StainlessSteel, SheetMaterial::Aluminum] {
            let t = |m| deburr_time_per_meter(m, material, 6.0).found().unwrap().typical;
            assert!(t(FinishingMethod::Automated) < t(FinishingMethod::Powered));
            assert!(t(FinishingMethod::Powered) < t(FinishingMethod::Manual));
        }
    }

    #[test]
    fn test_additional_op_minutes() {
        assert_eq!(AdditionalOp::OxideRemoval.minutes(FinishingMethod::Manual, 2.0), 3.0);
        assert_eq!(AdditionalOp::Inspection.minutes(FinishingMethod::Manual, 2.0), 5.0);
        assert!((AdditionalOp::Chamfering.minutes(FinishingMethod::Powered, 2.0) - 3.0).abs() < 1e-12);
        assert!((AdditionalOp::Radiusing.minutes(FinishingMethod::Automated, 1.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_cut_quality_accepts_legacy_names() {
        let q: CutQuality = serde_json::from_str("\"poorCut\"").unwrap();
        assert_eq!(q, CutQuality::Poor);
        let q: EdgeQuality = serde_json::from_str("\"ascut\"").unwrap();
        assert_eq!(q, EdgeQuality::AsCut);
    }
}
