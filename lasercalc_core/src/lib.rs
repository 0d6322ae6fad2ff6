//! # lasercalc_core - Manufacturing Cost Engine
//!
//! `lasercalc_core` is the computational heart of LaserCalc Pro: the cost
//! formulas a laser cutting and fabrication shop uses to estimate pierce
//! time, kerf loss, setup and finishing labor, machine hourly rates,
//! overhead allocation, quotation margins and machining cost.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions from input to result
//! - **JSON-First**: every input, result and error implements Serialize/Deserialize
//! - **Rich Errors**: a failed calculation is a typed [`CalcError`], never a panic
//! - **Total Lookups**: reference tables answer [`Lookup::NotFound`] instead of
//!   silently returning zero
//!
//! ## Quick Start
//!
//! ```rust
//! use lasercalc_core::calculations::pierce::{calculate, PierceInput};
//! use lasercalc_core::materials::SheetMaterial;
//!
//! let input = PierceInput {
//!     material: SheetMaterial::MildSteel,
//!     thickness_mm: 6.0,
//!     hole_count: 40,
//!     ..PierceInput::default()
//! };
//! let result = calculate(&input).unwrap();
//! assert!(result.total_pierce_time_min > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Every calculator plus the [`CalculationItem`] wrapper
//! - [`reference`] - Piercing, kerf, setup and finishing reference tables
//! - [`materials`] - Sheet, stock, weld and marking material definitions
//! - [`lookup`] - `Lookup`, `Estimate` and `RangeValue` helpers
//! - [`worksheet`] - Job worksheet container and shop settings
//! - [`report`] - Report rows and plain-text rendering
//! - [`file_io`] - Atomic worksheet saves and locking
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod lookup;
pub mod materials;
pub mod reference;
pub mod report;
pub mod worksheet;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutcome};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_settings, load_worksheet, save_worksheet, FileLock};
pub use lookup::{Estimate, Lookup, RangeValue};
pub use report::Report;
pub use worksheet::{ShopSettings, Worksheet, WorksheetMetadata};
