//! # Worksheet Data Structures
//!
//! The `Worksheet` struct is the root container for a job's calculations.
//! Worksheets serialize to `.lcw` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Worksheet
//! ├── meta: WorksheetMetadata (version, estimator, job info, timestamps)
//! ├── settings: ShopSettings (rates and defaults for new inputs)
//! └── items: HashMap<Uuid, CalculationItem> (all calculations)
//! ```
//!
//! ## Shop Settings
//!
//! A JSON input may omit any field. [`ShopSettings::item_from_json`] starts
//! from the calculator's default input, overwrites the shop-wide rates, then
//! applies the caller's fields on top:
//!
//! ```rust
//! use lasercalc_core::calculations::CalculationItem;
//! use lasercalc_core::worksheet::ShopSettings;
//!
//! let settings = ShopSettings { electricity_rate: 0.20, ..ShopSettings::default() };
//! let json = serde_json::json!({ "type": "energy", "rated_power_kw": 8.0 });
//! let item = settings.item_from_json(json).unwrap();
//!
//! match item {
//!     CalculationItem::Energy(e) => {
//!         assert_eq!(e.rated_power_kw, 8.0);
//!         assert_eq!(e.electricity_rate, 0.20);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::quotation::{PaymentTerms, RiskFactor};
use crate::calculations::{CalculationItem, CalculationOutcome};
use crate::errors::{CalcError, CalcResult};
use crate::reference::setup::DEFAULT_SETUP_LABOR_RATE;

/// Current schema version for .lcw files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root worksheet container.
///
/// Items are stored in a flat UUID-keyed map so a report can reference a
/// calculation by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    pub meta: WorksheetMetadata,
    pub settings: ShopSettings,
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Worksheet {
    /// Create a new empty worksheet.
    ///
    /// ```rust
    /// use lasercalc_core::worksheet::Worksheet;
    ///
    /// let ws = Worksheet::new("Dana", "Q-2291", "Northside Fab");
    /// assert_eq!(ws.meta.customer, "Northside Fab");
    /// ```
    pub fn new(estimator: impl Into<String>, job_id: impl Into<String>, customer: impl Into<String>) -> Self {
        let now = Utc::now();
        Worksheet {
            meta: WorksheetMetadata {
                version: SCHEMA_VERSION.to_string(),
                estimator: estimator.into(),
                job_id: job_id.into(),
                customer: customer.into(),
                created: now,
                modified: now,
            },
            settings: ShopSettings::default(),
            items: HashMap::new(),
        }
    }

    /// Add a calculation and return its id.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Mutable access marks the worksheet as modified.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Evaluate every item, ordered by label then type so output is stable.
    ///
    /// A failing item does not stop the run; its error is returned in place.
    pub fn evaluate_all(&self) -> Vec<WorksheetEntry> {
        let mut ids: Vec<&Uuid> = self.items.keys().collect();
        ids.sort_by(|a, b| {
            let (ia, ib) = (&self.items[*a], &self.items[*b]);
            ia.label()
                .cmp(ib.label())
                .then_with(|| ia.calc_type().cmp(ib.calc_type()))
                .then_with(|| a.cmp(b))
        });

        ids.into_iter()
            .map(|id| {
                let item = &self.items[id];
                let outcome = item.evaluate();
                if let Err(e) = &outcome {
                    tracing::warn!(%id, calc_type = item.calc_type(), error = %e, "worksheet item failed");
                }
                WorksheetEntry {
                    id: *id,
                    label: item.label().to_string(),
                    calc_type: item.calc_type().to_string(),
                    outcome,
                }
            })
            .collect()
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::new("", "", "")
    }
}

/// One evaluated worksheet item.
#[derive(Debug, Clone, Serialize)]
pub struct WorksheetEntry {
    pub id: Uuid,
    pub label: String,
    pub calc_type: String,
    pub outcome: CalcResult<CalculationOutcome>,
}

/// Worksheet metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    /// Person preparing the estimate
    pub estimator: String,
    /// Job or quote number
    pub job_id: String,
    pub customer: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Shop-wide rates applied to new calculation inputs.
///
/// The defaults equal the calculators' own defaults, so an untouched
/// settings file changes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    /// Machine cost per hour used for pierce time ($/h)
    pub machine_hourly_cost: f64,
    /// Operator rate for cutting and finishing labor ($/h)
    pub operator_labor_rate: f64,
    /// Programmer/setup labor rate ($/h)
    pub setup_labor_rate: f64,
    /// $/kWh
    pub electricity_rate: f64,
    /// Assist gas for cutting and piercing ($/m³)
    pub cutting_gas_price_per_m3: f64,
    /// Use the alloy's density for kerf loss instead of steel's 7.85 g/cm³
    pub kerf_use_material_density: bool,
    pub target_margin_percent: f64,
    pub payment_terms: PaymentTerms,
    pub risk_factor: RiskFactor,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            machine_hourly_cost: 60.0,
            operator_labor_rate: 25.0,
            setup_labor_rate: DEFAULT_SETUP_LABOR_RATE,
            electricity_rate: 0.12,
            cutting_gas_price_per_m3: 1.5,
            kerf_use_material_density: false,
            target_margin_percent: 30.0,
            payment_terms: PaymentTerms::Net30,
            risk_factor: RiskFactor::Medium,
        }
    }
}

impl ShopSettings {
    /// Overwrite the shop-wide fields of an input.
    pub fn apply(&self, item: &mut CalculationItem) {
        match item {
            CalculationItem::Pierce(i) => {
                i.hourly_cost = self.machine_hourly_cost;
                i.gas_price_per_m3 = self.cutting_gas_price_per_m3;
            }
            CalculationItem::Kerf(i) => i.use_material_density = self.kerf_use_material_density,
            CalculationItem::Setup(i) => i.setup_labor_rate = self.setup_labor_rate,
            CalculationItem::Finishing(i) => i.labor_rate = self.operator_labor_rate,
            CalculationItem::HourlyRate(i) => {
                i.electricity_rate = self.electricity_rate;
                i.gas_price_per_m3 = self.cutting_gas_price_per_m3;
            }
            CalculationItem::Quotation(i) => {
                i.target_margin_percent = self.target_margin_percent;
                i.payment_terms = self.payment_terms;
                i.risk_factor = self.risk_factor;
            }
            CalculationItem::LaserCutting(i) => {
                i.electricity_rate = self.electricity_rate;
                i.labor_rate = self.operator_labor_rate;
                i.gas_price_per_m3 = self.cutting_gas_price_per_m3;
            }
            CalculationItem::Welding(i) => i.electricity_rate = self.electricity_rate,
            CalculationItem::Marking(i) => i.electricity_rate = self.electricity_rate,
            CalculationItem::PricePerMeter(i) => {
                i.electricity_rate = self.electricity_rate;
                i.labor_rate = self.operator_labor_rate;
            }
            CalculationItem::Energy(i) => i.electricity_rate = self.electricity_rate,
            CalculationItem::Overhead(_)
            | CalculationItem::Cnc(_)
            | CalculationItem::MaterialUtilization(_)
            | CalculationItem::Roi(_) => {}
        }
    }

    /// Default input for a `type` tag with these settings applied.
    pub fn template(&self, calc_type: &str) -> CalcResult<CalculationItem> {
        let mut item = CalculationItem::default_for(calc_type).ok_or_else(|| {
            CalcError::invalid_input(
                "type",
                calc_type,
                format!("Unknown calculation type; expected one of {}", CalculationItem::TYPES.join(", ")),
            )
        })?;
        self.apply(&mut item);
        Ok(item)
    }

    /// Build an input from partial JSON: template fields first, caller's
    /// fields on top. The object must carry a `type` tag.
    pub fn item_from_json(&self, value: serde_json::Value) -> CalcResult<CalculationItem> {
        let fields = match value {
            serde_json::Value::Object(fields) => fields,
            other => return Err(CalcError::invalid_input("input", other.to_string(), "Expected a JSON object")),
        };
        let calc_type = fields
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CalcError::missing_field("type"))?
            .to_string();

        let template = self.template(&calc_type)?;
        let mut merged = serde_json::to_value(&template).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        if let serde_json::Value::Object(base) = &mut merged {
            for (key, value) in fields {
                base.insert(key, value);
            }
        }

        serde_json::from_value(merged).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid {} input: {}", calc_type, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{EnergyInput, PierceInput, QuotationInput};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_worksheet_creation() {
        let ws = Worksheet::new("Dana", "Q-2291", "Northside Fab");
        assert_eq!(ws.meta.estimator, "Dana");
        assert_eq!(ws.meta.job_id, "Q-2291");
        assert_eq!(ws.meta.version, SCHEMA_VERSION);
        assert_eq!(ws.item_count(), 0);
    }

    #[test]
    fn test_add_remove_item() {
        let mut ws = Worksheet::default();
        let id = ws.add_item(CalculationItem::Pierce(PierceInput::default()));
        assert!(ws.get_item(&id).is_some());
        assert!(ws.remove_item(&id).is_some());
        assert_eq!(ws.item_count(), 0);
        assert!(ws.remove_item(&id).is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut ws = Worksheet::new("Dana", "Q-2291", "Northside Fab");
        ws.add_item(CalculationItem::Energy(EnergyInput::default()));
        let json = serde_json::to_string_pretty(&ws).unwrap();
        assert!(json.contains("\"type\": \"energy\""));

        let back: Worksheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.meta.customer, "Northside Fab");
        assert_eq!(back.items.len(), 1);
    }

    #[test]
    fn test_default_settings_leave_defaults_alone() {
        let settings = ShopSettings::default();
        for calc_type in CalculationItem::TYPES {
            assert_eq!(settings.template(calc_type).unwrap(), CalculationItem::default_for(calc_type).unwrap());
        }
    }

    #[test]
    fn test_settings_feed_quotation() {
        let settings = ShopSettings {
            target_margin_percent: 22.0,
            risk_factor: RiskFactor::High,
            ..ShopSettings::default()
        };
        let item = settings
            .item_from_json(serde_json::json!({ "type": "quotation", "base_cost": 500.0 }))
            .unwrap();
        let expected = CalculationItem::Quotation(QuotationInput {
            base_cost: 500.0,
            target_margin_percent: 22.0,
            risk_factor: RiskFactor::High,
            ..QuotationInput::default()
        });
        assert_eq!(item, expected);
    }

    #[test]
    fn test_caller_fields_win_over_settings() {
        let settings = ShopSettings {
            electricity_rate: 0.30,
            ..ShopSettings::default()
        };
        let item = settings
            .item_from_json(serde_json::json!({ "type": "energy", "electricity_rate": 0.08 }))
            .unwrap();
        match item {
            CalculationItem::Energy(e) => assert_eq!(e.electricity_rate, 0.08),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_item_from_json_errors() {
        let settings = ShopSettings::default();
        let missing = settings.item_from_json(serde_json::json!({ "base_cost": 1.0 })).unwrap_err();
        assert_eq!(missing.error_code(), "MISSING_FIELD");

        let unknown = settings.item_from_json(serde_json::json!({ "type": "beam" })).unwrap_err();
        assert_eq!(unknown.error_code(), "INVALID_INPUT");

        let bad = settings
            .item_from_json(serde_json::json!({ "type": "kerf", "nozzle": "9mm" }))
            .unwrap_err();
        assert_eq!(bad.error_code(), "SERIALIZATION_ERROR");

        let not_object = settings.item_from_json(serde_json::json!([1, 2])).unwrap_err();
        assert_eq!(not_object.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_evaluate_all_keeps_failures() {
        let mut ws = Worksheet::default();
        ws.add_item(CalculationItem::Quotation(QuotationInput {
            label: "A bad quote".to_string(),
            target_margin_percent: 100.0,
            ..QuotationInput::default()
        }));
        ws.add_item(CalculationItem::Pierce(PierceInput {
            label: "B plate".to_string(),
            ..PierceInput::default()
        }));

        let entries = ws.evaluate_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "A bad quote");
        assert!(entries[0].outcome.is_err());
        assert!(entries[1].outcome.is_ok());
    }

    #[test]
    fn test_settings_feed_price_per_meter() {
        let settings = ShopSettings {
            electricity_rate: 0.20,
            operator_labor_rate: 40.0,
            ..ShopSettings::default()
        };
        match settings.template("price_per_meter").unwrap() {
            CalculationItem::PricePerMeter(i) => {
                assert_eq!(i.electricity_rate, 0.20);
                assert_eq!(i.labor_rate, 40.0);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: ShopSettings = serde_json::from_str(r#"{ "setup_labor_rate": 48.0 }"#).unwrap();
        assert_eq!(settings.setup_labor_rate, 48.0);
        assert_eq!(settings.electricity_rate, 0.12);
    }
}
