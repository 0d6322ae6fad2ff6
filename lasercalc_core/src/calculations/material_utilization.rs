//! # Material Utilization
//!
//! Rectangular grid nesting of identical rectangular parts on a sheet.
//!
//! Each part occupies `part + kerf + spacing` in both directions inside the
//! sheet less its edge margin. The normal and 90° rotated grids are both
//! tried when rotation is allowed and the one with more parts wins (ties go
//! to the normal orientation).
//!
//! Irregular shapes and true mixed-orientation nesting are out of reach of a
//! grid; the "mixed" alternative is a rough estimate, `⌊0.8·n + 0.3·r⌋`.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::material_utilization::{calculate, MaterialUtilizationInput};
//!
//! let result = calculate(&MaterialUtilizationInput::default()).unwrap();
//! assert_eq!(result.layout.parts_per_sheet, 203);
//! assert_eq!(result.sheets_required, 1);
//! ```

use serde::{Deserialize, Serialize};

use super::{PrioritizedRecommendation, Priority};
use crate::errors::{ensure_range, CalcError, CalcResult};
use crate::materials::StockMaterial;

/// Input parameters for a nesting estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUtilizationInput {
    #[serde(default)]
    pub label: String,
    /// 100 to 10,000 mm
    pub sheet_length_mm: f64,
    /// 100 to 10,000 mm
    pub sheet_width_mm: f64,
    /// 1 to 5000 mm
    pub part_length_mm: f64,
    /// 1 to 5000 mm
    pub part_width_mm: f64,
    /// 1 to 10,000
    pub quantity: u32,
    /// 0 to 10 mm
    pub kerf_mm: f64,
    /// 0 to 100 mm
    pub edge_margin_mm: f64,
    /// 0 to 50 mm
    pub part_spacing_mm: f64,
    pub allow_rotation: bool,
    pub material: StockMaterial,
    /// 0.5 to 50 mm
    pub thickness_mm: f64,
    /// 0.1 to 1000 $/kg
    pub material_price_per_kg: f64,
    /// 0 to 1000 $/kg
    pub scrap_value_per_kg: f64,
}

impl Default for MaterialUtilizationInput {
    fn default() -> Self {
        MaterialUtilizationInput {
            label: String::new(),
            sheet_length_mm: 3000.0,
            sheet_width_mm: 1500.0,
            part_length_mm: 200.0,
            part_width_mm: 100.0,
            quantity: 50,
            kerf_mm: 0.3,
            edge_margin_mm: 5.0,
            part_spacing_mm: 2.0,
            allow_rotation: true,
            material: StockMaterial::MildSteel,
            thickness_mm: 3.0,
            material_price_per_kg: 3.0,
            scrap_value_per_kg: 0.5,
        }
    }
}

impl MaterialUtilizationInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("sheet_length_mm", self.sheet_length_mm, 100.0, 10_000.0)?;
        ensure_range("sheet_width_mm", self.sheet_width_mm, 100.0, 10_000.0)?;
        ensure_range("part_length_mm", self.part_length_mm, 1.0, 5000.0)?;
        ensure_range("part_width_mm", self.part_width_mm, 1.0, 5000.0)?;
        ensure_range("quantity", self.quantity as f64, 1.0, 10_000.0)?;
        ensure_range("kerf_mm", self.kerf_mm, 0.0, 10.0)?;
        ensure_range("edge_margin_mm", self.edge_margin_mm, 0.0, 100.0)?;
        ensure_range("part_spacing_mm", self.part_spacing_mm, 0.0, 50.0)?;
        ensure_range("thickness_mm", self.thickness_mm, 0.5, 50.0)?;
        ensure_range("material_price_per_kg", self.material_price_per_kg, 0.1, 1000.0)?;
        ensure_range("scrap_value_per_kg", self.scrap_value_per_kg, 0.0, 1000.0)?;
        Ok(())
    }

    fn usable_area(&self) -> (f64, f64) {
        (
            self.sheet_length_mm - 2.0 * self.edge_margin_mm,
            self.sheet_width_mm - 2.0 * self.edge_margin_mm,
        )
    }

    fn pitch(&self) -> (f64, f64) {
        (
            self.part_length_mm + self.kerf_mm + self.part_spacing_mm,
            self.part_width_mm + self.kerf_mm + self.part_spacing_mm,
        )
    }
}

/// Columns along the sheet length and rows along its width.
fn grid(usable: (f64, f64), pitch: (f64, f64)) -> (u32, u32) {
    let cols = (usable.0 / pitch.0).floor().max(0.0) as u32;
    let rows = (usable.1 / pitch.1).floor().max(0.0) as u32;
    (cols, rows)
}

/// One placed part, lower-left corner in sheet coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
}

/// The chosen grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestingLayout {
    pub parts_per_sheet: u32,
    pub rows: u32,
    pub cols: u32,
    pub rotated: bool,
    /// Placed part size along the sheet length and width
    pub part_size_mm: (f64, f64),
    /// Grid pitch along the sheet length and width
    pub pitch_mm: (f64, f64),
    pub edge_margin_mm: f64,
}

impl NestingLayout {
    /// Part positions row by row.
    pub fn placements(&self) -> impl Iterator<Item = PartPlacement> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| PartPlacement {
                x: self.edge_margin_mm + col as f64 * self.pitch_mm.0,
                y: self.edge_margin_mm + row as f64 * self.pitch_mm.1,
                width: self.part_size_mm.0,
                height: self.part_size_mm.1,
                rotated: self.rotated,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeLayout {
    pub description: String,
    /// Parts area over usable area (%)
    pub utilization_rate: f64,
    pub parts_per_sheet: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUtilizationResult {
    /// Parts area over full sheet area (%)
    pub utilization_rate: f64,
    pub waste_rate: f64,
    pub sheets_required: u32,

    pub sheet_area_mm2: f64,
    pub part_area_mm2: f64,
    pub used_area_mm2: f64,
    pub waste_area_mm2: f64,

    pub sheet_weight_kg: f64,
    pub used_weight_kg: f64,
    pub waste_weight_kg: f64,
    pub total_material_weight_kg: f64,

    pub total_material_cost: f64,
    /// Net of scrap recovery
    pub material_cost_per_part: f64,
    pub waste_cost: f64,
    pub scrap_value: f64,
    pub net_material_cost: f64,

    pub layout: NestingLayout,
    /// Sorted by utilization, best first
    pub alternative_layouts: Vec<AlternativeLayout>,
    pub recommendations: Vec<PrioritizedRecommendation>,
}

/// Nest the parts and cost the sheets.
///
/// # Errors
///
/// * `InvalidInput` when the edge margins leave no usable sheet
/// * `CalculationFailed` when not a single part fits
pub fn calculate(input: &MaterialUtilizationInput) -> CalcResult<MaterialUtilizationResult> {
    input.validate()?;

    let usable = input.usable_area();
    if usable.0 <= 0.0 || usable.1 <= 0.0 {
        return Err(CalcError::invalid_input(
            "edge_margin_mm",
            input.edge_margin_mm.to_string(),
            "Edge margins leave no usable sheet area",
        ));
    }
    let pitch = input.pitch();

    let (cols_normal, rows_normal) = grid(usable, pitch);
    let (cols_rotated, rows_rotated) = grid(usable, (pitch.1, pitch.0));
    let parts_normal = cols_normal * rows_normal;
    let parts_rotated = cols_rotated * rows_rotated;

    let rotated = input.allow_rotation && parts_rotated > parts_normal;
    let layout = if rotated {
        NestingLayout {
            parts_per_sheet: parts_rotated,
            rows: rows_rotated,
            cols: cols_rotated,
            rotated: true,
            part_size_mm: (input.part_width_mm, input.part_length_mm),
            pitch_mm: (pitch.1, pitch.0),
            edge_margin_mm: input.edge_margin_mm,
        }
    } else {
        NestingLayout {
            parts_per_sheet: parts_normal,
            rows: rows_normal,
            cols: cols_normal,
            rotated: false,
            part_size_mm: (input.part_length_mm, input.part_width_mm),
            pitch_mm: pitch,
            edge_margin_mm: input.edge_margin_mm,
        }
    };
    tracing::debug!(
        parts_normal,
        parts_rotated,
        rotated = layout.rotated,
        "nesting grid"
    );

    let parts_per_sheet = layout.parts_per_sheet;
    if parts_per_sheet == 0 {
        return Err(CalcError::calculation_failed(
            "material_utilization",
            "Part does not fit on the sheet with the given margins, kerf and spacing",
        ));
    }
    let sheets_required = input.quantity.div_ceil(parts_per_sheet);

    let sheet_area_mm2 = input.sheet_length_mm * input.sheet_width_mm;
    let part_area_mm2 = input.part_length_mm * input.part_width_mm;
    let used_area_mm2 = part_area_mm2 * parts_per_sheet as f64;
    let waste_area_mm2 = sheet_area_mm2 - used_area_mm2;
    let utilization_rate = used_area_mm2 / sheet_area_mm2 * 100.0;
    let waste_rate = 100.0 - utilization_rate;

    let sheets = sheets_required as f64;
    let sheet_weight_kg = sheet_area_mm2 * input.thickness_mm / 1e9 * input.material.density_kg_m3();
    let used_weight_kg = sheet_weight_kg * utilization_rate / 100.0;
    let waste_weight_kg = sheet_weight_kg - used_weight_kg;
    let total_material_weight_kg = sheet_weight_kg * sheets;

    let total_material_cost = total_material_weight_kg * input.material_price_per_kg;
    let waste_cost = waste_weight_kg * sheets * input.material_price_per_kg;
    let scrap_value = waste_weight_kg * sheets * input.scrap_value_per_kg;
    let net_material_cost = total_material_cost - scrap_value;

    let alternative_layouts = alternative_layouts(usable, part_area_mm2, parts_normal, parts_rotated);
    let recommendations = nesting_recommendations(input, utilization_rate, parts_per_sheet, sheets_required, waste_cost);

    Ok(MaterialUtilizationResult {
        utilization_rate,
        waste_rate,
        sheets_required,
        sheet_area_mm2,
        part_area_mm2,
        used_area_mm2,
        waste_area_mm2,
        sheet_weight_kg,
        used_weight_kg,
        waste_weight_kg,
        total_material_weight_kg,
        total_material_cost,
        material_cost_per_part: net_material_cost / input.quantity as f64,
        waste_cost,
        scrap_value,
        net_material_cost,
        layout,
        alternative_layouts,
        recommendations,
    })
}

fn alternative_layouts(
    usable: (f64, f64),
    part_area_mm2: f64,
    parts_normal: u32,
    parts_rotated: u32,
) -> Vec<AlternativeLayout> {
    let usable_area = usable.0 * usable.1;
    let utilization = |parts: u32| part_area_mm2 * parts as f64 / usable_area * 100.0;
    let parts_mixed = (parts_normal as f64 * 0.8 + parts_rotated as f64 * 0.3).floor() as u32;

    let mut alternatives = vec![
        AlternativeLayout {
            description: "Standard orientation (no rotation)".to_string(),
            utilization_rate: utilization(parts_normal),
            parts_per_sheet: parts_normal,
        },
        AlternativeLayout {
            description: "Rotated 90° orientation".to_string(),
            utilization_rate: utilization(parts_rotated),
            parts_per_sheet: parts_rotated,
        },
        AlternativeLayout {
            description: "Mixed orientation (rough estimate, requires nesting software)".to_string(),
            utilization_rate: utilization(parts_mixed),
            parts_per_sheet: parts_mixed,
        },
    ];
    alternatives.sort_by(|a, b| b.utilization_rate.total_cmp(&a.utilization_rate));
    alternatives
}

fn nesting_recommendations(
    input: &MaterialUtilizationInput,
    utilization_rate: f64,
    parts_per_sheet: u32,
    sheets_required: u32,
    waste_cost: f64,
) -> Vec<PrioritizedRecommendation> {
    let mut recs = Vec::new();
    let mut push = |title: &str, description: String, potential_savings: f64, priority: Priority| {
        recs.push(PrioritizedRecommendation {
            title: title.to_string(),
            description,
            potential_savings,
            priority,
        })
    };
    let waste_rate = 100.0 - utilization_rate;

    if utilization_rate < 70.0 {
        push(
            "Optimize Part Orientation",
            format!(
                "Current utilization is {:.1}%. Part rotation, adjusted spacing or dedicated nesting software may reduce waste.",
                utilization_rate
            ),
            waste_cost * 0.3,
            Priority::High,
        );
    }

    if waste_rate > 25.0 {
        push(
            "Consider Different Sheet Sizes",
            format!(
                "{:.1}% waste detected. Sheet sizes closer to your part dimensions could significantly reduce waste. Ask your supplier about available sizes.",
                waste_rate
            ),
            waste_cost * 0.4,
            Priority::High,
        );
    }

    if input.kerf_mm > 0.5 {
        let kerf_waste_mm3 = input.quantity as f64 * input.part_length_mm * input.part_width_mm * input.kerf_mm;
        let kerf_waste_kg = kerf_waste_mm3 / 1e9 * input.material.density_kg_m3();
        push(
            "Optimize Cutting Process",
            format!(
                "Your kerf width ({}mm) is relatively wide. Finer cutting processes or optimized parameters may reduce material loss.",
                input.kerf_mm
            ),
            kerf_waste_kg * input.material_price_per_kg,
            Priority::Medium,
        );
    }

    let empty_positions = sheets_required * parts_per_sheet - input.quantity;
    if input.quantity < parts_per_sheet * 2 && empty_positions > 0 {
        push(
            "Increase Batch Size",
            format!(
                "Your batch size ({} parts) leaves {} empty positions on the last sheet. Consider ordering in multiples of {}.",
                input.quantity, empty_positions, parts_per_sheet
            ),
            0.0,
            Priority::Low,
        );
    }

    if input.part_spacing_mm > 3.0 {
        push(
            "Implement Common Cut Lines",
            "Adjacent parts can sometimes share cutting paths, which reduces cutting length and kerf waste. Check whether your geometry and quality requirements permit it."
                .to_string(),
            waste_cost * 0.15,
            Priority::Medium,
        );
    }

    if input.scrap_value_per_kg < input.material_price_per_kg * 0.3 {
        push(
            "Improve Scrap Recycling Program",
            format!(
                "Your scrap value is {:.0}% of material cost. Better sorting and recycling agreements may recover more of the waste cost.",
                input.scrap_value_per_kg / input.material_price_per_kg * 100.0
            ),
            waste_cost * 0.4,
            Priority::Low,
        );
    }

    recs.sort_by_key(|r| r.priority);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_grid() {
        let r = calculate(&MaterialUtilizationInput::default()).unwrap();
        // normal 14 × 14 = 196, rotated 2990 / 102.3 = 29 cols × 1490 / 202.3 = 7 rows
        assert_eq!(r.layout.cols, 29);
        assert_eq!(r.layout.rows, 7);
        assert!(r.layout.rotated);
        assert_eq!(r.layout.parts_per_sheet, 203);
        assert_eq!(r.sheets_required, 1);
        assert!((r.utilization_rate - 203.0 * 20_000.0 / 4_500_000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_and_costs() {
        let r = calculate(&MaterialUtilizationInput::default()).unwrap();
        // 3000 × 1500 × 3 mm of steel
        assert!((r.sheet_weight_kg - 0.0135 * 7850.0).abs() < 1e-9);
        assert!((r.used_weight_kg + r.waste_weight_kg - r.sheet_weight_kg).abs() < 1e-9);
        assert!((r.net_material_cost - (r.total_material_cost - r.scrap_value)).abs() < 1e-9);
        assert!((r.material_cost_per_part - r.net_material_cost / 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_wins() {
        let input = MaterialUtilizationInput {
            sheet_length_mm: 1000.0,
            sheet_width_mm: 500.0,
            part_length_mm: 400.0,
            part_width_mm: 150.0,
            edge_margin_mm: 0.0,
            kerf_mm: 0.0,
            part_spacing_mm: 0.0,
            ..MaterialUtilizationInput::default()
        };
        let r = calculate(&input).unwrap();
        // normal: 2 × 3 = 6, rotated: 6 × 1 = 6, tie keeps normal
        assert!(!r.layout.rotated);

        let taller = MaterialUtilizationInput {
            part_length_mm: 450.0,
            part_width_mm: 240.0,
            ..input
        };
        let r = calculate(&taller).unwrap();
        // normal: 2 × 2 = 4, rotated: 4 × 1 = 4
        assert_eq!(r.layout.parts_per_sheet, 4);

        let no_rotate = MaterialUtilizationInput {
            part_length_mm: 100.0,
            part_width_mm: 600.0,
            allow_rotation: false,
            ..taller
        };
        assert_eq!(calculate(&no_rotate).unwrap_err().error_code(), "CALCULATION_FAILED");
        let rotate = MaterialUtilizationInput {
            allow_rotation: true,
            ..no_rotate
        };
        let r = calculate(&rotate).unwrap();
        assert!(r.layout.rotated);
        assert_eq!(r.layout.parts_per_sheet, 5);
    }

    #[test]
    fn test_placements() {
        let r = calculate(&MaterialUtilizationInput::default()).unwrap();
        let placements: Vec<PartPlacement> = r.layout.placements().collect();
        assert_eq!(placements.len(), 203);
        assert_eq!(placements[0].x, 5.0);
        assert_eq!(placements[0].y, 5.0);
        assert!(placements[0].rotated);
        assert_eq!(placements[0].width, 100.0);
        assert!((placements[1].x - (5.0 + 102.3)).abs() < 1e-9);
        assert!((placements[29].y - (5.0 + 202.3)).abs() < 1e-9);
    }

    #[test]
    fn test_alternatives_sorted() {
        let r = calculate(&MaterialUtilizationInput::default()).unwrap();
        assert_eq!(r.alternative_layouts.len(), 3);
        assert!(r
            .alternative_layouts
            .windows(2)
            .all(|w| w[0].utilization_rate >= w[1].utilization_rate));
    }

    #[test]
    fn test_margins_swallow_sheet() {
        let input = MaterialUtilizationInput {
            sheet_length_mm: 150.0,
            sheet_width_mm: 150.0,
            edge_margin_mm: 80.0,
            ..MaterialUtilizationInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_batch_recommendation() {
        let r = calculate(&MaterialUtilizationInput::default()).unwrap();
        let batch = r
            .recommendations
            .iter()
            .find(|x| x.title == "Increase Batch Size")
            .unwrap();
        assert!(batch.description.contains("153 empty positions"));
        assert!(r.recommendations.windows(2).all(|w| w[0].priority <= w[1].priority));
    }
}
