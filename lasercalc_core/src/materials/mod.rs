//! # Materials
//!
//! Material enums and physical properties used by the calculators.
//!
//! ## Material Families
//!
//! - **Sheet** ([`SheetMaterial`]): keys of the piercing, kerf and finishing
//!   reference tables (mild steel, stainless, aluminum, copper/brass)
//! - **Stock** ([`StockMaterial`]): materials bought by weight, with density
//!   and fiber laser cutting properties
//! - **Weld** ([`WeldMaterial`]): alloys supported by the laser welding calculator
//! - **Marking** ([`MarkingMaterial`]): substrates of the laser marking speed table
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::materials::{SheetMaterial, StockMaterial};
//!
//! let sheet = SheetMaterial::from_str_flexible("stainless").unwrap();
//! assert_eq!(sheet.code(), "stainless_steel");
//!
//! let stock = StockMaterial::Aluminum;
//! assert_eq!(stock.density_kg_m3(), 2700.0);
//! ```

pub mod marking;
pub mod sheet;
pub mod stock;
pub mod weld;

pub use marking::MarkingMaterial;
pub use sheet::SheetMaterial;
pub use stock::{LaserCuttingProperties, StockMaterial};
pub use weld::WeldMaterial;
