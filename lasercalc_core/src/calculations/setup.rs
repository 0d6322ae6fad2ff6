//! # Setup Time Estimator
//!
//! Decomposes a job's setup into programming, loading, machine prep,
//! inspection and fixturing, applies the operator/familiarity multiplier
//! and spreads the result over the batch.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::setup::{calculate, SetupInput};
//!
//! let result = calculate(&SetupInput::default()).unwrap();
//! assert!((result.time.adjusted_total - 75.0).abs() < 1e-9);
//! assert!((result.setup_time_per_part - 7.5).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_at_least, ensure_range, CalcError, CalcResult};
use crate::reference::setup::{
    calculate_setup_cost_per_part, calculate_setup_time, FixtureComplexity, InspectionLevel, JobFamiliarity,
    MachineChange, MaterialSize, OperatorExperience, ProgrammingComplexity, SetupTimeBreakdown,
    COMPARISON_BATCH_SIZES, DEFAULT_SETUP_LABOR_RATE,
};

/// Input parameters for a setup estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub programming: ProgrammingComplexity,
    #[serde(default)]
    pub material_size: MaterialSize,
    #[serde(default)]
    pub machine_change: MachineChange,
    #[serde(default)]
    pub inspection: InspectionLevel,
    #[serde(default)]
    pub fixture: FixtureComplexity,
    #[serde(default)]
    pub operator: OperatorExperience,
    #[serde(default)]
    pub familiarity: JobFamiliarity,
    /// Parts in the batch (1 to 10000)
    pub batch_quantity: u32,
    /// Programmer/setup labor rate (10 to 150 $/h)
    pub setup_labor_rate: f64,
}

impl Default for SetupInput {
    fn default() -> Self {
        SetupInput {
            label: String::new(),
            programming: ProgrammingComplexity::Moderate,
            material_size: MaterialSize::Medium,
            machine_change: MachineChange::FullSetup,
            inspection: InspectionLevel::Standard,
            fixture: FixtureComplexity::None,
            operator: OperatorExperience::Intermediate,
            familiarity: JobFamiliarity::FirstTime,
            batch_quantity: 10,
            setup_labor_rate: DEFAULT_SETUP_LABOR_RATE,
        }
    }
}

impl SetupInput {
    pub fn validate(&self) -> CalcResult<()> {
        if self.batch_quantity == 0 || self.batch_quantity > 10_000 {
            return Err(CalcError::invalid_input(
                "batch_quantity",
                self.batch_quantity.to_string(),
                "Batch quantity must be between 1 and 10000",
            ));
        }
        ensure_range("setup_labor_rate", self.setup_labor_rate, 10.0, 150.0)?;
        Ok(())
    }
}

/// Setup efficiency band by adjusted minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupEfficiency {
    /// 15 minutes or less
    Excellent,
    /// Up to 30 minutes
    Good,
    /// Up to an hour
    Average,
    NeedsImprovement,
}

impl SetupEfficiency {
    pub fn for_minutes(adjusted_total: f64) -> Self {
        if adjusted_total <= 15.0 {
            SetupEfficiency::Excellent
        } else if adjusted_total <= 30.0 {
            SetupEfficiency::Good
        } else if adjusted_total <= 60.0 {
            SetupEfficiency::Average
        } else {
            SetupEfficiency::NeedsImprovement
        }
    }
}

/// Per-part setup at one batch size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchComparison {
    pub quantity: u32,
    pub time_per_part: f64,
    pub cost_per_part: f64,
    /// Setup minutes for the whole batch (same for every row)
    pub total_time: f64,
}

/// Setup estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupResult {
    pub time: SetupTimeBreakdown,
    pub setup_time_per_part: f64,
    pub setup_cost_per_part: f64,
    /// Display category (100/25/15/8/5/3 %), not part of the cost math
    pub setup_percentage: u32,
    /// Adjusted minutes / 60 × labor rate
    pub total_setup_cost: f64,
    pub batch_comparison: Vec<BatchComparison>,
    pub efficiency: SetupEfficiency,
    pub recommendations: Vec<String>,
}

/// Estimate setup time and cost.
pub fn calculate(input: &SetupInput) -> CalcResult<SetupResult> {
    input.validate()?;

    let time = calculate_setup_time(
        input.programming,
        input.material_size,
        input.machine_change,
        input.inspection,
        input.fixture,
        input.operator,
        input.familiarity,
    );
    tracing::debug!(base = time.base_total, adjusted = time.adjusted_total, "setup time");

    let per_part = calculate_setup_cost_per_part(time.adjusted_total, input.batch_quantity, input.setup_labor_rate);
    let total_setup_cost = time.adjusted_total / 60.0 * input.setup_labor_rate;

    let batch_comparison: Vec<BatchComparison> = COMPARISON_BATCH_SIZES
        .iter()
        .map(|&quantity| {
            let dist = calculate_setup_cost_per_part(time.adjusted_total, quantity, input.setup_labor_rate);
            BatchComparison {
                quantity,
                time_per_part: dist.setup_time_per_part,
                cost_per_part: dist.setup_cost_per_part,
                total_time: time.adjusted_total,
            }
        })
        .collect();

    let mut recommendations = Vec::new();

    if time.adjusted_total > 60.0 {
        recommendations.push(
            "Setup time exceeds 1 hour. Consider pre-staging materials and programs to reduce setup time.".to_string(),
        );
    }
    if time.programming_time > 30.0 && input.familiarity == JobFamiliarity::Regular {
        recommendations.push(
            "Programming time is high for a regular job. Consider creating saved programs for repeat work.".to_string(),
        );
    }
    if input.batch_quantity < 5 && per_part.setup_cost_per_part > 20.0 {
        recommendations.push(format!(
            "Setup cost per part is ${:.2}. Consider batching orders to reduce per-part setup costs.",
            per_part.setup_cost_per_part
        ));
    }
    if matches!(input.operator, OperatorExperience::Novice | OperatorExperience::Intermediate) {
        recommendations.push("Training operators on efficient setup procedures can reduce setup time by 20-40%.".to_string());
    }
    if input.familiarity == JobFamiliarity::FirstTime && input.programming != ProgrammingComplexity::Simple {
        recommendations.push(
            "First-time setup for complex jobs. Budget extra time for troubleshooting and parameter optimization."
                .to_string(),
        );
    }
    if matches!(input.machine_change, MachineChange::FullSetup | MachineChange::GasChange) {
        recommendations.push(
            "Full setup changeover required. Group similar jobs together to minimize changeover frequency.".to_string(),
        );
    }
    if input.batch_quantity == 1 && per_part.setup_cost_per_part > 0.0 {
        if let Some(batch10) = batch_comparison.iter().find(|b| b.quantity == 10) {
            let savings = (per_part.setup_cost_per_part - batch10.cost_per_part) / per_part.setup_cost_per_part * 100.0;
            recommendations.push(format!(
                "Single-part production. Batching 10 parts would reduce setup cost per part by {:.0}%.",
                savings
            ));
        }
    }

    Ok(SetupResult {
        time,
        setup_time_per_part: per_part.setup_time_per_part,
        setup_cost_per_part: per_part.setup_cost_per_part,
        setup_percentage: per_part.setup_percentage,
        total_setup_cost,
        batch_comparison,
        efficiency: SetupEfficiency::for_minutes(time.adjusted_total),
        recommendations,
    })
}

/// Batch size at which setup is a target share of total time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealBatchSize {
    pub ideal_batch_size: u32,
    /// Setup share actually reached at that batch size (%)
    pub setup_time_percentage: f64,
    /// Setup + cutting minutes for the batch
    pub total_time_for_batch: f64,
}

/// Solve `setup / (setup + n × cut) = target` for n, rounded up.
///
/// ```text
/// n = ⌈setup × (1 − f) / (f × cut)⌉,  f = target% / 100,  n ≥ 1
/// ```
///
/// # Errors
///
/// * `InvalidInput` if the target is not strictly between 0 and 100
/// * `DivisionByZero` if the cutting time per part is not positive
pub fn calculate_ideal_batch_size(
    setup_time_min: f64,
    cutting_time_per_part_min: f64,
    target_setup_percent: f64,
) -> CalcResult<IdealBatchSize> {
    ensure_at_least("setup_time_min", setup_time_min, 0.0)?;
    if !target_setup_percent.is_finite() || target_setup_percent <= 0.0 || target_setup_percent >= 100.0 {
        return Err(CalcError::invalid_input(
            "target_setup_percent",
            target_setup_percent.to_string(),
            "Target setup share must be between 0 and 100 (exclusive)",
        ));
    }
    if !cutting_time_per_part_min.is_finite() || cutting_time_per_part_min <= 0.0 {
        return Err(CalcError::division_by_zero(
            "cutting time per part",
            "Cutting time per part must be positive to size a batch",
        ));
    }

    let f = target_setup_percent / 100.0;
    let raw = (setup_time_min * (1.0 - f) / (f * cutting_time_per_part_min)).ceil();
    let ideal_batch_size = if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (raw as u32).max(1)
    };

    let total_time_for_batch = setup_time_min + f64::from(ideal_batch_size) * cutting_time_per_part_min;
    Ok(IdealBatchSize {
        ideal_batch_size,
        setup_time_percentage: setup_time_min / total_time_for_batch * 100.0,
        total_time_for_batch,
    })
}

/// Savings from a faster setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupScenarioComparison {
    pub time_savings_per_setup: f64,
    pub annual_time_savings: f64,
    pub cost_savings_per_setup: f64,
    pub annual_cost_savings: f64,
    pub improvement_percentage: f64,
}

/// Compare the current setup with an optimized one over a year of setups.
pub fn compare_setup_scenarios(
    current_setup_min: f64,
    optimized_setup_min: f64,
    annual_setups: u32,
    labor_rate: f64,
) -> CalcResult<SetupScenarioComparison> {
    ensure_at_least("optimized_setup_min", optimized_setup_min, 0.0)?;
    ensure_at_least("labor_rate", labor_rate, 0.0)?;
    if !current_setup_min.is_finite() || current_setup_min <= 0.0 {
        return Err(CalcError::division_by_zero(
            "current setup time",
            "Current setup time must be positive to measure an improvement",
        ));
    }

    let time_savings_per_setup = current_setup_min - optimized_setup_min;
    let annual_time_savings = time_savings_per_setup * f64::from(annual_setups);
    Ok(SetupScenarioComparison {
        time_savings_per_setup,
        annual_time_savings,
        cost_savings_per_setup: time_savings_per_setup / 60.0 * labor_rate,
        annual_cost_savings: annual_time_savings / 60.0 * labor_rate,
        improvement_percentage: time_savings_per_setup / current_setup_min * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_estimate() {
        let r = calculate(&SetupInput::default()).unwrap();
        assert!((r.total_setup_cost - 75.0 / 60.0 * 35.0).abs() < EPS);
        assert!((r.setup_cost_per_part - 4.375).abs() < EPS);
        assert_eq!(r.setup_percentage, 15);
        assert_eq!(r.efficiency, SetupEfficiency::NeedsImprovement);
        assert_eq!(
            r.batch_comparison.iter().map(|b| b.quantity).collect::<Vec<_>>(),
            vec![1, 5, 10, 25, 50, 100]
        );
        assert_eq!(
            r.recommendations,
            vec![
                "Setup time exceeds 1 hour. Consider pre-staging materials and programs to reduce setup time.".to_string(),
                "Training operators on efficient setup procedures can reduce setup time by 20-40%.".to_string(),
                "First-time setup for complex jobs. Budget extra time for troubleshooting and parameter optimization."
                    .to_string(),
                "Full setup changeover required. Group similar jobs together to minimize changeover frequency.".to_string(),
            ]
        );
    }

    #[test]
    fn test_single_part_suggests_batching() {
        let input = SetupInput {
            batch_quantity: 1,
            ..SetupInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!(r.recommendations.iter().any(|s| s.starts_with("Setup cost per part is $43.75")));
        assert!(r.recommendations.iter().any(|s| s.ends_with("by 90%.")));
    }

    #[test]
    fn test_cost_per_part_strictly_decreases() {
        let mut last = f64::INFINITY;
        for qty in [1, 2, 3, 10, 100, 10_000] {
            let r = calculate(&SetupInput {
                batch_quantity: qty,
                ..SetupInput::default()
            })
            .unwrap();
            assert!(r.setup_cost_per_part < last);
            last = r.setup_cost_per_part;
        }
    }

    #[test]
    fn test_efficiency_bands() {
        assert_eq!(SetupEfficiency::for_minutes(15.0), SetupEfficiency::Excellent);
        assert_eq!(SetupEfficiency::for_minutes(30.0), SetupEfficiency::Good);
        assert_eq!(SetupEfficiency::for_minutes(60.0), SetupEfficiency::Average);
        assert_eq!(SetupEfficiency::for_minutes(60.1), SetupEfficiency::NeedsImprovement);
    }

    #[test]
    fn test_ideal_batch_size() {
        // 60 min setup, 2 min/part, 10% target: 60 × 0.9 / 0.2 = 270
        let b = calculate_ideal_batch_size(60.0, 2.0, 10.0).unwrap();
        assert_eq!(b.ideal_batch_size, 270);
        assert!((b.total_time_for_batch - 600.0).abs() < EPS);
        assert!((b.setup_time_percentage - 10.0).abs() < EPS);

        // Rounds up, never below one part
        assert_eq!(calculate_ideal_batch_size(10.0, 3.0, 10.0).unwrap().ideal_batch_size, 30);
        assert_eq!(calculate_ideal_batch_size(0.0, 3.0, 10.0).unwrap().ideal_batch_size, 1);
    }

    #[test]
    fn test_ideal_batch_size_guards() {
        assert_eq!(
            calculate_ideal_batch_size(60.0, 0.0, 10.0).unwrap_err().error_code(),
            "DIVISION_BY_ZERO"
        );
        assert!(calculate_ideal_batch_size(60.0, 2.0, 0.0).is_err());
        assert!(calculate_ideal_batch_size(60.0, 2.0, 100.0).is_err());
    }

    #[test]
    fn test_compare_scenarios() {
        let c = compare_setup_scenarios(60.0, 45.0, 200, 40.0).unwrap();
        assert_eq!(c.time_savings_per_setup, 15.0);
        assert_eq!(c.annual_time_savings, 3000.0);
        assert!((c.cost_savings_per_setup - 10.0).abs() < EPS);
        assert!((c.annual_cost_savings - 2000.0).abs() < EPS);
        assert!((c.improvement_percentage - 25.0).abs() < EPS);
        assert!(compare_setup_scenarios(0.0, 0.0, 10, 40.0).is_err());
    }
}
