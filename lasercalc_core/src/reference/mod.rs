//! # Reference Tables
//!
//! Immutable shop reference data and the bucketing helpers that index it.
//!
//! ## Modules
//!
//! - [`piercing`]: seconds per pierce by material and thickness bucket
//! - [`kerf`]: kerf width by material, thickness and nozzle
//! - [`setup`]: setup component minutes and skill/familiarity factors
//! - [`finishing`]: deburr minutes per meter, edge and cut quality factors
//!
//! ## Bucketing Policy
//!
//! Range tables (piercing, finishing) put a value on a bucket's upper edge
//! into that bucket (`≤` semantics). The kerf table is keyed by discrete
//! thicknesses and matches the first key within 0.5 mm instead.
//!
//! All lookups return [`Lookup`](crate::lookup::Lookup).

pub mod finishing;
pub mod kerf;
pub mod piercing;
pub mod setup;

pub use finishing::{AdditionalOp, CutQuality, EdgeQuality, FinishingMethod, PartSize};
pub use kerf::Nozzle;
pub use piercing::{AssistGas, PierceBucket, PierceStrategy};
