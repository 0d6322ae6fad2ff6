//! # Finishing Guide
//!
//! Post-cut deburring, handling and secondary operation time and cost for a
//! part, adjusted for the edge quality the laser actually delivered.
//!
//! ```text
//! deburr   = edge m × minutes/m × edge quality multiplier × cut quality multiplier
//! total    = deburr + handling + additional operations
//! cost     = total h × (labor rate + equipment $/h) + edge m × consumables $/m
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_at_least, ensure_range, CalcError, CalcResult};
use crate::lookup::percent_of;
use crate::materials::SheetMaterial;
use crate::reference::finishing::{
    estimate_finishing_time, AdditionalOp, CutQuality, EdgeQuality, FinishingMethod, PartSize,
    DEFAULT_AUTOMATED_EQUIPMENT_COST,
};

/// Input parameters for the finishing guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishingInput {
    #[serde(default)]
    pub label: String,
    /// Edge length per part (0.1 to 100 m)
    pub edge_length_m: f64,
    /// Mild steel, stainless or aluminum
    pub material: SheetMaterial,
    /// Thickness (0.5 to 25 mm)
    pub thickness_mm: f64,
    #[serde(default)]
    pub method: FinishingMethod,
    #[serde(default)]
    pub quality: EdgeQuality,
    #[serde(default)]
    pub part_size: PartSize,
    #[serde(default)]
    pub additional_ops: Vec<AdditionalOp>,
    /// Finishing labor rate (10 to 100 $/h)
    pub labor_rate: f64,
    #[serde(default)]
    pub cut_quality: CutQuality,
}

impl Default for FinishingInput {
    fn default() -> Self {
        FinishingInput {
            label: String::new(),
            edge_length_m: 1.5,
            material: SheetMaterial::MildSteel,
            thickness_mm: 3.0,
            method: FinishingMethod::Powered,
            quality: EdgeQuality::Light,
            part_size: PartSize::Medium,
            additional_ops: Vec::new(),
            labor_rate: 25.0,
            cut_quality: CutQuality::Good,
        }
    }
}

impl FinishingInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("edge_length_m", self.edge_length_m, 0.1, 100.0)?;
        ensure_range("thickness_mm", self.thickness_mm, 0.5, 25.0)?;
        ensure_range("labor_rate", self.labor_rate, 10.0, 100.0)?;
        if self.material == SheetMaterial::CopperBrass {
            return Err(CalcError::invalid_input(
                "material",
                self.material.code(),
                "Finishing times are tabulated for mild steel, stainless steel and aluminum",
            ));
        }
        Ok(())
    }
}

/// One operation's share of the finishing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBreakdownRow {
    pub operation: String,
    pub minutes: f64,
    pub percentage: f64,
}

/// Finishing time and cost for one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishingResult {
    /// Deburr minutes after the cut quality adjustment
    pub deburr_time_min: f64,
    pub handling_time_min: f64,
    pub additional_ops_time_min: f64,
    pub total_time_min: f64,
    pub total_time_h: f64,

    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub consumables_cost: f64,
    pub total_cost: f64,
    pub cost_per_meter: f64,

    pub time_breakdown: Vec<TimeBreakdownRow>,
    /// Description of the requested edge quality
    pub quality_level: String,

    pub recommendations: Vec<String>,
    pub cost_saving_opportunities: Vec<String>,
}

/// Calculate finishing time and cost.
pub fn calculate(input: &FinishingInput) -> CalcResult<FinishingResult> {
    input.validate()?;

    let base = estimate_finishing_time(
        input.edge_length_m,
        input.material,
        input.thickness_mm,
        input.method,
        input.quality,
        input.part_size,
    )
    .require()?;

    let deburr_time_min = base.deburr_time_minutes * input.cut_quality.finishing_multiplier();
    let handling_time_min = base.handling_time_minutes;
    let additional_ops_time_min: f64 = input
        .additional_ops
        .iter()
        .map(|op| op.minutes(input.method, input.edge_length_m))
        .sum();

    let total_time_min = deburr_time_min + handling_time_min + additional_ops_time_min;
    let total_time_h = total_time_min / 60.0;

    let labor_cost = total_time_h * input.labor_rate;
    let equipment_cost = total_time_h * input.method.equipment_cost_per_hour();
    let consumables_cost = input.edge_length_m * input.method.consumables_per_meter();
    let total_cost = labor_cost + equipment_cost + consumables_cost;
    let cost_per_meter = total_cost / input.edge_length_m;

    let mut time_breakdown = vec![
        TimeBreakdownRow {
            operation: "Deburring".to_string(),
            minutes: deburr_time_min,
            percentage: percent_of(deburr_time_min, total_time_min),
        },
        TimeBreakdownRow {
            operation: "Handling & Setup".to_string(),
            minutes: handling_time_min,
            percentage: percent_of(handling_time_min, total_time_min),
        },
    ];
    if additional_ops_time_min > 0.0 {
        time_breakdown.push(TimeBreakdownRow {
            operation: "Additional Operations".to_string(),
            minutes: additional_ops_time_min,
            percentage: percent_of(additional_ops_time_min, total_time_min),
        });
    }

    let mut recommendations = Vec::new();
    let mut cost_saving_opportunities = Vec::new();

    if matches!(input.cut_quality, CutQuality::Poor | CutQuality::Fair) {
        recommendations.push(
            "Cut quality is affecting finishing time. Optimize laser cutting parameters to reduce dross and improve edge quality."
                .to_string(),
        );
        cost_saving_opportunities.push(
            "Improving cut quality from \"fair\" to \"good\" can meaningfully reduce finishing time; compare scenarios with your own parameters."
                .to_string(),
        );
    }
    if input.method == FinishingMethod::Manual && input.edge_length_m > 5.0 {
        cost_saving_opportunities.push(
            "Consider powered deburring tools for longer edges to reduce manual touch time.".to_string(),
        );
    }
    if input.method == FinishingMethod::Powered && total_time_min > 60.0 {
        cost_saving_opportunities.push(
            "High finishing volume. Automated deburring equipment may be worth evaluating; run the equipment ROI with your volumes and rates."
                .to_string(),
        );
    }
    if matches!(input.quality, EdgeQuality::High | EdgeQuality::Mirror) {
        recommendations.push(format!(
            "High-quality finish requires {}x baseline time. Ensure customer requirements justify the cost.",
            input.quality.finishing_time_multiplier()
        ));
    }
    if input.quality == EdgeQuality::AsCut && !input.additional_ops.is_empty() {
        recommendations.push(
            "Additional operations selected with \"as-cut\" quality level. Consider if finishing is actually needed."
                .to_string(),
        );
    }
    if input.material == SheetMaterial::StainlessSteel && matches!(input.quality, EdgeQuality::High | EdgeQuality::Medium) {
        recommendations.push(
            "Stainless steel finishing: Consider passivation for corrosion resistance in addition to mechanical finishing."
                .to_string(),
        );
    }
    if input.material == SheetMaterial::Aluminum && input.quality != EdgeQuality::AsCut {
        recommendations.push(
            "Aluminum is softer and often easier to finish than steel. Measured finishing times may come in below these estimates."
                .to_string(),
        );
    }
    if cost_per_meter > 10.0 {
        recommendations.push(format!(
            "Finishing cost is ${:.2} per meter. Review if edge requirements can be relaxed or process optimized.",
            cost_per_meter
        ));
    }
    if total_time_min > 30.0 {
        recommendations.push(
            "Finishing time is significant. Consider it early in the quoting process to ensure accurate pricing."
                .to_string(),
        );
    }
    if input.additional_ops.contains(&AdditionalOp::Chamfering) && input.additional_ops.contains(&AdditionalOp::Radiusing) {
        recommendations.push(
            "Both chamfering and radiusing selected. Clarify edge requirements with customer as typically only one is needed."
                .to_string(),
        );
    }

    cost_saving_opportunities
        .push("Use nitrogen assist gas during cutting for cleaner edges requiring less finishing".to_string());
    if input.quality != EdgeQuality::AsCut {
        cost_saving_opportunities.push(
            "Train operators on efficient finishing techniques to improve consistency and reduce time".to_string(),
        );
    }

    Ok(FinishingResult {
        deburr_time_min,
        handling_time_min,
        additional_ops_time_min,
        total_time_min,
        total_time_h,
        labor_cost,
        equipment_cost,
        consumables_cost,
        total_cost,
        cost_per_meter,
        time_breakdown,
        quality_level: input.quality.description().to_string(),
        recommendations,
        cost_saving_opportunities,
    })
}

/// One method in a finishing method comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub method: FinishingMethod,
    pub name: String,
    pub time_min: f64,
    /// Labor cost only
    pub cost: f64,
    /// Percent above the cheapest method
    pub cost_difference_percent: f64,
}

/// Run manual, powered and automated deburring for the same part.
pub fn compare_finishing_methods(
    edge_length_m: f64,
    material: SheetMaterial,
    thickness_mm: f64,
    quality: EdgeQuality,
    part_size: PartSize,
    labor_rate: f64,
) -> CalcResult<Vec<MethodComparison>> {
    let mut rows = Vec::with_capacity(FinishingMethod::ALL.len());
    for method in FinishingMethod::ALL {
        let estimate = estimate_finishing_time(edge_length_m, material, thickness_mm, method, quality, part_size).require()?;
        rows.push(MethodComparison {
            method,
            name: method.display_name().to_string(),
            time_min: estimate.total_time_minutes,
            cost: estimate.total_time_minutes / 60.0 * labor_rate,
            cost_difference_percent: 0.0,
        });
    }

    let lowest = rows.iter().map(|r| r.cost).fold(f64::INFINITY, f64::min);
    if lowest <= 0.0 {
        return Err(CalcError::division_by_zero(
            "lowest finishing cost",
            "Cheapest method costs nothing; check the labor rate",
        ));
    }
    for row in &mut rows {
        row.cost_difference_percent = (row.cost - lowest) / lowest * 100.0;
    }
    Ok(rows)
}

/// Payback of an automated deburring machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishingEquipmentRoi {
    pub current_monthly_cost: f64,
    pub automated_monthly_cost: f64,
    pub monthly_savings: f64,
    pub payback_months: f64,
    pub annual_savings: f64,
    pub roi_percent: f64,
}

/// Compare the monthly finishing cost of the current method against an
/// automated machine, for a medium part at light edge quality.
///
/// `equipment_cost` defaults to 25000.
///
/// # Errors
///
/// * `InvalidInput` if the current method is already automated
/// * `DivisionByZero` if automation does not save money (no payback)
pub fn calculate_finishing_equipment_roi(
    current_method: FinishingMethod,
    monthly_edge_m: f64,
    material: SheetMaterial,
    thickness_mm: f64,
    labor_rate: f64,
    equipment_cost: Option<f64>,
) -> CalcResult<FinishingEquipmentRoi> {
    if current_method == FinishingMethod::Automated {
        return Err(CalcError::invalid_input(
            "current_method",
            "automated",
            "Current method must be manual or powered",
        ));
    }
    ensure_at_least("monthly_edge_m", monthly_edge_m, 0.0)?;
    let equipment_cost = equipment_cost.unwrap_or(DEFAULT_AUTOMATED_EQUIPMENT_COST);
    ensure_at_least("equipment_cost", equipment_cost, 0.0)?;

    let per_meter = |method| {
        estimate_finishing_time(1.0, material, thickness_mm, method, EdgeQuality::Light, PartSize::Medium)
            .map(|e| e.total_time_minutes)
            .require()
    };
    let current_hours = monthly_edge_m * per_meter(current_method)? / 60.0;
    let automated_hours = monthly_edge_m * per_meter(FinishingMethod::Automated)? / 60.0;

    let current_monthly_cost = current_hours * labor_rate;
    let automated_monthly_cost =
        automated_hours * labor_rate + automated_hours * FinishingMethod::Automated.equipment_cost_per_hour();
    let monthly_savings = current_monthly_cost - automated_monthly_cost;

    if monthly_savings <= 0.0 {
        tracing::warn!(monthly_savings, "automated finishing does not pay back");
        return Err(CalcError::division_by_zero(
            "monthly savings",
            "Automated finishing does not reduce monthly cost, so it never pays back",
        ));
    }

    let annual_savings = monthly_savings * 12.0;
    Ok(FinishingEquipmentRoi {
        current_monthly_cost,
        automated_monthly_cost,
        monthly_savings,
        payback_months: equipment_cost / monthly_savings,
        annual_savings,
        roi_percent: if equipment_cost > 0.0 {
            annual_savings / equipment_cost * 100.0
        } else {
            0.0
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_guide() {
        let r = calculate(&FinishingInput::default()).unwrap();
        // 1.5 m × 0.8 min/m × 1.0 × 1.0 + 2 min handling
        assert!((r.deburr_time_min - 1.2).abs() < EPS);
        assert_eq!(r.handling_time_min, 2.0);
        assert_eq!(r.additional_ops_time_min, 0.0);
        assert!((r.total_time_min - 3.2).abs() < EPS);
        assert!((r.labor_cost - 3.2 / 60.0 * 25.0).abs() < EPS);
        assert!((r.equipment_cost - 3.2 / 60.0 * 5.0).abs() < EPS);
        assert!((r.consumables_cost - 0.3).abs() < EPS);
        assert_eq!(r.time_breakdown.len(), 2);
        let share: f64 = r.time_breakdown.iter().map(|row| row.percentage).sum();
        assert!((share - 100.0).abs() < 1e-9);
        assert_eq!(r.quality_level, "Remove sharp edges and major burrs");
    }

    #[test]
    fn test_poor_cut_and_extra_ops() {
        let input = FinishingInput {
            cut_quality: CutQuality::Poor,
            additional_ops: vec![AdditionalOp::Chamfering, AdditionalOp::Radiusing, AdditionalOp::Inspection],
            ..FinishingInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!((r.deburr_time_min - 2.4).abs() < EPS);
        // chamfer 1.5 × 1.5 + radius 2.0 × 1.5 + 5
        assert!((r.additional_ops_time_min - 10.25).abs() < EPS);
        assert_eq!(r.time_breakdown[2].operation, "Additional Operations");
        assert!(r.recommendations[0].starts_with("Cut quality is affecting"));
        assert!(r.recommendations.iter().any(|s| s.starts_with("Both chamfering and radiusing")));
    }

    #[test]
    fn test_cost_increases_with_edge_length() {
        let mut last = 0.0;
        for edge in [0.1, 0.5, 1.0, 5.0, 20.0, 100.0] {
            let r = calculate(&FinishingInput {
                edge_length_m: edge,
                ..FinishingInput::default()
            })
            .unwrap();
            assert!(r.total_cost > last);
            last = r.total_cost;
        }
    }

    #[test]
    fn test_copper_is_rejected() {
        let input = FinishingInput {
            material: SheetMaterial::CopperBrass,
            ..FinishingInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_compare_methods() {
        let rows =
            compare_finishing_methods(2.0, SheetMaterial::MildSteel, 3.0, EdgeQuality::Light, PartSize::Medium, 30.0)
                .unwrap();
        assert_eq!(
            rows.iter().map(|r| r.method).collect::<Vec<_>>(),
            vec![FinishingMethod::Manual, FinishingMethod::Powered, FinishingMethod::Automated]
        );
        assert_eq!(rows[2].cost_difference_percent, 0.0);
        assert!(rows[0].cost_difference_percent > rows[1].cost_difference_percent);
    }

    #[test]
    fn test_equipment_roi() {
        let roi = calculate_finishing_equipment_roi(
            FinishingMethod::Manual,
            1000.0,
            SheetMaterial::StainlessSteel,
            15.0,
            30.0,
            None,
        )
        .unwrap();
        // manual 3.0 + 2 = 5 min/m; automated 1.0 + 2 = 3 min/m
        assert!((roi.current_monthly_cost - 2500.0).abs() < 1e-6);
        assert!((roi.automated_monthly_cost - 2250.0).abs() < 1e-6);
        assert!((roi.monthly_savings - 250.0).abs() < 1e-6);
        assert!((roi.payback_months - 100.0).abs() < 1e-6);
        assert!((roi.roi_percent - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_roi_without_savings_is_guarded() {
        // Cheap labor: the $15/h machine never pays back
        let err =
            calculate_finishing_equipment_roi(FinishingMethod::Powered, 500.0, SheetMaterial::Aluminum, 1.0, 10.0, None)
                .unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_BY_ZERO");
    }
}
