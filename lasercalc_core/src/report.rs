//! # Report Export
//!
//! Turns a calculation's input and result into labelled rows for printing.
//! Any `Serialize` value works: top-level fields become rows, nested values
//! are formatted inline.
//!
//! ```rust
//! use lasercalc_core::calculations::{CalculationItem, SetupInput};
//! use lasercalc_core::report::Report;
//!
//! let item = CalculationItem::Setup(SetupInput::default());
//! let outcome = item.evaluate().unwrap();
//! let report = Report::for_item(&item, &outcome).unwrap();
//!
//! assert!(report.id.starts_with("LCP-"));
//! assert!(report.render_text().contains("Batch quantity"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::calculations::{CalculationItem, CalculationOutcome};
use crate::errors::{CalcError, CalcResult};

pub const DISCLAIMER: &str = "Estimates are based on typical shop data and the inputs shown. \
Verify against actual machine performance before quoting.";

/// `"totalCost"` → `"Total Cost"`, `"cost_per_part"` → `"Cost per part"`.
pub fn format_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c == '_' {
            spaced.push(' ');
        } else if c.is_uppercase() {
            spaced.push(' ');
            spaced.push(c);
        } else {
            spaced.push(c);
        }
    }

    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display form of a JSON value.
///
/// Integral numbers print without decimals, everything else with two.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    format!("{:.2}", f)
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

/// A printable calculation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// `LCP-<YYYYMMDD>-<8 hex>`
    pub id: String,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub inputs: Vec<ReportRow>,
    pub results: Vec<ReportRow>,
    pub recommendations: Vec<String>,
}

impl Report {
    pub fn from_outcome<I: Serialize, R: Serialize>(
        title: impl Into<String>,
        input: &I,
        result: &R,
        recommendations: Vec<String>,
    ) -> CalcResult<Self> {
        let generated_at = Utc::now();
        Ok(Report {
            id: report_id(generated_at),
            title: title.into(),
            generated_at,
            inputs: rows(input)?,
            results: rows(result)?,
            recommendations,
        })
    }

    /// Report for a worksheet item and its outcome. The `type` tag is
    /// dropped from both tables; recommendations get their own section.
    pub fn for_item(item: &CalculationItem, outcome: &CalculationOutcome) -> CalcResult<Self> {
        let title = if item.label().is_empty() {
            item.display_name().to_string()
        } else {
            format!("{} - {}", item.display_name(), item.label())
        };
        let mut report = Report::from_outcome(title, item, outcome, outcome.recommendations())?;
        report.inputs.retain(|r| r.label != "Type" && r.label != "Label");
        report.results.retain(|r| {
            r.label != "Type" && r.label != "Recommendations" && r.label != "Alerts"
        });
        Ok(report)
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let width = self
            .inputs
            .iter()
            .chain(&self.results)
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&format!("LaserCalc Pro | {}\n", self.title));
        out.push_str(&format!(
            "Report ID: {}   Generated: {}\n",
            self.id,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        push_table(&mut out, "Input Parameters", &self.inputs, width);
        push_table(&mut out, "Calculation Results", &self.results, width);

        if !self.recommendations.is_empty() {
            out.push_str("\nRecommendations\n");
            for (i, rec) in self.recommendations.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, rec));
            }
        }

        out.push('\n');
        out.push_str(DISCLAIMER);
        out.push('\n');
        out
    }
}

fn report_id(at: DateTime<Utc>) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("LCP-{}-{}", at.format("%Y%m%d"), &hex[..8].to_uppercase())
}

fn rows<T: Serialize>(value: &T) -> CalcResult<Vec<ReportRow>> {
    let json = serde_json::to_value(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;
    let rows = match json {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| ReportRow {
                label: format_key(key),
                value: format_value(value),
            })
            .collect(),
        other => vec![ReportRow {
            label: "Value".to_string(),
            value: format_value(&other),
        }],
    };
    Ok(rows)
}

fn push_table(out: &mut String, heading: &str, rows: &[ReportRow], width: usize) {
    out.push('\n');
    out.push_str(heading);
    out.push('\n');
    out.push_str(&"-".repeat(heading.len()));
    out.push('\n');
    for row in rows {
        out.push_str(&format!("  {:<width$}  {}\n", row.label, row.value, width = width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{EnergyInput, QuotationInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_format_key() {
        assert_eq!(format_key("totalCost"), "Total Cost");
        assert_eq!(format_key("cost_per_part"), "Cost per part");
        assert_eq!(format_key("_leading"), "Leading");
        assert_eq!(format_key(""), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(12)), "12");
        assert_eq!(format_value(&json!(2000.0)), "2000");
        assert_eq!(format_value(&json!(1.23456)), "1.23");
        assert_eq!(format_value(&json!(true)), "Yes");
        assert_eq!(format_value(&json!(false)), "No");
        assert_eq!(format_value(&json!(null)), "-");
        assert_eq!(format_value(&json!(["a", 1.5])), "a, 1.50");
        assert_eq!(format_value(&json!({"k": 1})), "{\"k\":1}");
    }

    #[test]
    fn test_report_id_shape() {
        let at = DateTime::parse_from_rfc3339("2026-03-09T10:00:00Z").unwrap().with_timezone(&Utc);
        let id = report_id(at);
        assert!(id.starts_with("LCP-20260309-"));
        let suffix = &id["LCP-20260309-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_outcome_rows() {
        let report = Report::from_outcome("Custom", &json!({"partCount": 4}), &json!({"unit_cost": 2.5}), vec![])
            .unwrap();
        assert_eq!(
            report.inputs,
            vec![ReportRow {
                label: "Part Count".to_string(),
                value: "4".to_string()
            }]
        );
        assert_eq!(report.results[0].value, "2.50");
    }

    #[test]
    fn test_for_item_strips_tags() {
        let item = CalculationItem::Quotation(QuotationInput {
            label: "Bracket run".to_string(),
            ..QuotationInput::default()
        });
        let outcome = item.evaluate().unwrap();
        let report = Report::for_item(&item, &outcome).unwrap();

        assert_eq!(report.title, "Quotation Margin - Bracket run");
        assert!(report.inputs.iter().all(|r| r.label != "Type"));
        assert!(report.results.iter().all(|r| r.label != "Recommendations"));
        assert_eq!(report.recommendations, outcome.recommendations());
    }

    #[test]
    fn test_render_text_sections() {
        let item = CalculationItem::Energy(EnergyInput::default());
        let outcome = item.evaluate().unwrap();
        let text = Report::for_item(&item, &outcome).unwrap().render_text();

        assert!(text.starts_with("LaserCalc Pro | Energy Cost"));
        assert!(text.contains("Input Parameters"));
        assert!(text.contains("Calculation Results"));
        assert!(text.contains("Rated power kw"));
        assert!(text.ends_with(&format!("{}\n", DISCLAIMER)));
    }
}
