//! # Setup Time Reference Data
//!
//! Minutes for each of the five setup components, keyed by a complexity
//! enum, plus the operator-experience and job-familiarity multipliers.
//!
//! ```text
//! adjusted = (programming + loading + machine prep + inspection + fixture)
//!            × experience × familiarity
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::reference::setup::*;
//!
//! let t = calculate_setup_time(
//!     ProgrammingComplexity::Moderate,
//!     MaterialSize::Medium,
//!     MachineChange::FullSetup,
//!     InspectionLevel::Standard,
//!     FixtureComplexity::None,
//!     OperatorExperience::Intermediate,
//!     JobFamiliarity::FirstTime,
//! );
//! assert_eq!(t.base_total, 50.0);
//! assert_eq!(t.adjusted_total, 75.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::lookup::RangeValue;

/// Setup labor rate used when the caller gives none ($/h, programmer/specialist)
pub const DEFAULT_SETUP_LABOR_RATE: f64 = 35.0;

/// Batch sizes shown in the per-part setup comparison
pub const COMPARISON_BATCH_SIZES: [u32; 6] = [1, 5, 10, 25, 50, 100];

/// Programming and nesting effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgrammingComplexity {
    /// Import DXF, basic nesting
    Simple,
    /// Manual nesting, parameter adjustment
    #[default]
    Moderate,
    /// Complex nesting, multiple materials
    Complex,
    /// Custom programming, special features
    VeryComplex,
}

impl ProgrammingComplexity {
    pub fn minutes(&self) -> RangeValue {
        match self {
            ProgrammingComplexity::Simple => RangeValue::new(5.0, 10.0, 15.0),
            ProgrammingComplexity::Moderate => RangeValue::new(10.0, 20.0, 30.0),
            ProgrammingComplexity::Complex => RangeValue::new(20.0, 40.0, 60.0),
            ProgrammingComplexity::VeryComplex => RangeValue::new(40.0, 80.0, 120.0),
        }
    }
}

/// Sheet size being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSize {
    /// Under 1 m²
    Small,
    /// 1-2 m²
    #[default]
    Medium,
    /// 2-4 m²
    Large,
    /// Over 4 m² or heavy plate
    Xlarge,
}

impl MaterialSize {
    pub fn minutes(&self) -> RangeValue {
        match self {
            MaterialSize::Small => RangeValue::new(2.0, 3.0, 5.0),
            MaterialSize::Medium => RangeValue::new(3.0, 5.0, 8.0),
            MaterialSize::Large => RangeValue::new(5.0, 10.0, 15.0),
            MaterialSize::Xlarge => RangeValue::new(10.0, 20.0, 30.0),
        }
    }
}

/// What changes on the machine since the previous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineChange {
    /// Same material and thickness
    NoChange,
    NozzleChange,
    /// Switch assist gas
    GasChange,
    /// New thickness, refocus
    FocusAdjust,
    /// Complete changeover
    #[default]
    FullSetup,
}

impl MachineChange {
    pub fn minutes(&self) -> RangeValue {
        match self {
            MachineChange::NoChange => RangeValue::new(1.0, 2.0, 3.0),
            MachineChange::NozzleChange => RangeValue::new(3.0, 5.0, 8.0),
            MachineChange::GasChange => RangeValue::new(2.0, 4.0, 6.0),
            MachineChange::FocusAdjust => RangeValue::new(2.0, 4.0, 6.0),
            MachineChange::FullSetup => RangeValue::new(8.0, 15.0, 25.0),
        }
    }
}

/// First article inspection depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionLevel {
    /// Repeat jobs
    None,
    /// Visual check only
    Quick,
    /// Basic dimensional check
    #[default]
    Standard,
    /// Full dimensional inspection
    Detailed,
}

impl InspectionLevel {
    pub fn minutes(&self) -> RangeValue {
        match self {
            InspectionLevel::None => RangeValue::fixed(0.0),
            InspectionLevel::Quick => RangeValue::new(2.0, 3.0, 5.0),
            InspectionLevel::Standard => RangeValue::new(5.0, 10.0, 15.0),
            InspectionLevel::Detailed => RangeValue::new(15.0, 30.0, 45.0),
        }
    }
}

/// Fixturing needed for small parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureComplexity {
    #[default]
    None,
    /// Magnetic strips or simple clamps
    Simple,
    /// Custom fixture positioning
    Moderate,
    /// Multi-part fixturing
    Complex,
}

impl FixtureComplexity {
    pub fn minutes(&self) -> RangeValue {
        match self {
            FixtureComplexity::None => RangeValue::fixed(0.0),
            FixtureComplexity::Simple => RangeValue::new(3.0, 5.0, 8.0),
            FixtureComplexity::Moderate => RangeValue::new(8.0, 15.0, 25.0),
            FixtureComplexity::Complex => RangeValue::new(25.0, 45.0, 70.0),
        }
    }
}

/// Operator skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorExperience {
    Novice,
    #[default]
    Intermediate,
    Experienced,
    Expert,
}

impl OperatorExperience {
    pub fn factor(&self) -> f64 {
        match self {
            OperatorExperience::Novice => 1.5,
            OperatorExperience::Intermediate => 1.0,
            OperatorExperience::Experienced => 0.75,
            OperatorExperience::Expert => 0.6,
        }
    }
}

/// How often the shop has run this job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFamiliarity {
    #[default]
    FirstTime,
    Occasional,
    Regular,
    /// Exact repeat with a saved program
    Repeat,
}

impl JobFamiliarity {
    pub fn factor(&self) -> f64 {
        match self {
            JobFamiliarity::FirstTime => 1.5,
            JobFamiliarity::Occasional => 1.2,
            JobFamiliarity::Regular => 0.9,
            JobFamiliarity::Repeat => 0.6,
        }
    }
}

/// Component minutes (typical column) and totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetupTimeBreakdown {
    pub programming_time: f64,
    pub loading_time: f64,
    pub machine_prep_time: f64,
    pub inspection_time: f64,
    pub fixture_time: f64,
    /// Sum of the five components
    pub base_total: f64,
    /// Base total × experience × familiarity
    pub adjusted_total: f64,
}

/// Sum the typical component times and apply the combined
/// experience × familiarity multiplier.
pub fn calculate_setup_time(
    programming: ProgrammingComplexity,
    material_size: MaterialSize,
    machine_change: MachineChange,
    inspection: InspectionLevel,
    fixture: FixtureComplexity,
    operator: OperatorExperience,
    familiarity: JobFamiliarity,
) -> SetupTimeBreakdown {
    let programming_time = programming.minutes().typical;
    let loading_time = material_size.minutes().typical;
    let machine_prep_time = machine_change.minutes().typical;
    let inspection_time = inspection.minutes().typical;
    let fixture_time = fixture.minutes().typical;

    let base_total = programming_time + loading_time + machine_prep_time + inspection_time + fixture_time;
    let adjusted_total = base_total * operator.factor() * familiarity.factor();

    SetupTimeBreakdown {
        programming_time,
        loading_time,
        machine_prep_time,
        inspection_time,
        fixture_time,
        base_total,
        adjusted_total,
    }
}

/// Setup distributed over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetupPerPart {
    pub setup_time_per_part: f64,
    pub setup_cost_per_part: f64,
    /// Display category only (100/25/15/8/5/3), not used in the cost math
    pub setup_percentage: u32,
}

/// Display category for the share of setup in a part's cost.
pub fn setup_percentage_category(batch_quantity: u32) -> u32 {
    match batch_quantity {
        q if q >= 100 => 3,
        q if q >= 50 => 5,
        q if q >= 25 => 8,
        q if q >= 10 => 15,
        q if q >= 5 => 25,
        _ => 100,
    }
}

/// Divide setup minutes and labor cost across `batch_quantity` parts.
///
/// Callers guarantee `batch_quantity >= 1`.
pub fn calculate_setup_cost_per_part(
    total_setup_minutes: f64,
    batch_quantity: u32,
    setup_labor_rate: f64,
) -> SetupPerPart {
    let qty = f64::from(batch_quantity.max(1));
    SetupPerPart {
        setup_time_per_part: total_setup_minutes / qty,
        setup_cost_per_part: total_setup_minutes / 60.0 * setup_labor_rate / qty,
        setup_percentage: setup_percentage_category(batch_quantity),
    }
}
