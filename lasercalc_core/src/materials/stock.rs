//! Stock materials priced by weight
//!
//! Used by the laser cutting, CNC machining and sheet nesting calculators,
//! which all turn a volume into a mass and the mass into a material cost.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lookup::Lookup;

/// Raw material bought by the kilogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockMaterial {
    #[serde(alias = "steel")]
    MildSteel,
    #[serde(alias = "stainless")]
    StainlessSteel,
    Aluminum,
    Copper,
    Brass,
    Plastic,
}

impl StockMaterial {
    pub const ALL: [StockMaterial; 6] = [
        StockMaterial::MildSteel,
        StockMaterial::StainlessSteel,
        StockMaterial::Aluminum,
        StockMaterial::Copper,
        StockMaterial::Brass,
        StockMaterial::Plastic,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StockMaterial::MildSteel => "mild_steel",
            StockMaterial::StainlessSteel => "stainless_steel",
            StockMaterial::Aluminum => "aluminum",
            StockMaterial::Copper => "copper",
            StockMaterial::Brass => "brass",
            StockMaterial::Plastic => "plastic",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "mild_steel" | "steel" | "carbon_steel" => Ok(StockMaterial::MildSteel),
            "stainless_steel" | "stainless" | "ss" => Ok(StockMaterial::StainlessSteel),
            "aluminum" | "aluminium" | "al" => Ok(StockMaterial::Aluminum),
            "copper" | "cu" => Ok(StockMaterial::Copper),
            "brass" => Ok(StockMaterial::Brass),
            "plastic" | "polymer" => Ok(StockMaterial::Plastic),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StockMaterial::MildSteel => "Mild Steel",
            StockMaterial::StainlessSteel => "Stainless Steel",
            StockMaterial::Aluminum => "Aluminum",
            StockMaterial::Copper => "Copper",
            StockMaterial::Brass => "Brass",
            StockMaterial::Plastic => "Plastic",
        }
    }

    /// Density in kg/m³
    pub fn density_kg_m3(&self) -> f64 {
        match self {
            StockMaterial::MildSteel => 7850.0,
            StockMaterial::StainlessSteel => 7900.0,
            StockMaterial::Aluminum => 2700.0,
            StockMaterial::Copper => 8960.0,
            StockMaterial::Brass => 8500.0,
            StockMaterial::Plastic => 1200.0,
        }
    }

    /// Laser cutting behaviour for metals. Plastics are not cut on a fiber laser.
    pub fn laser_properties(&self) -> Lookup<LaserCuttingProperties> {
        let props = match self {
            StockMaterial::StainlessSteel => LaserCuttingProperties {
                base_speed_mm_min: 800.0,
                reflectivity: 0.6,
                default_price_per_kg: 5.0,
            },
            StockMaterial::Aluminum => LaserCuttingProperties {
                base_speed_mm_min: 1200.0,
                reflectivity: 0.9,
                default_price_per_kg: 8.0,
            },
            StockMaterial::Copper => LaserCuttingProperties {
                base_speed_mm_min: 600.0,
                reflectivity: 0.95,
                default_price_per_kg: 15.0,
            },
            StockMaterial::MildSteel => LaserCuttingProperties {
                base_speed_mm_min: 1000.0,
                reflectivity: 0.5,
                default_price_per_kg: 3.0,
            },
            StockMaterial::Brass => LaserCuttingProperties {
                base_speed_mm_min: 700.0,
                reflectivity: 0.85,
                default_price_per_kg: 10.0,
            },
            StockMaterial::Plastic => {
                return Lookup::not_found(
                    "laser cutting properties",
                    format!("{} is not a fiber laser material", self.display_name()),
                )
            }
        };
        Lookup::Found(props)
    }
}

impl std::fmt::Display for StockMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Fiber laser cutting properties of a metal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserCuttingProperties {
    /// Cutting speed in mm/min at 1 kW through 1 mm
    pub base_speed_mm_min: f64,
    /// Beam reflectivity, 0-1
    pub reflectivity: f64,
    /// Typical market price ($/kg)
    pub default_price_per_kg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steel_alias() {
        let m: StockMaterial = serde_json::from_str("\"steel\"").unwrap();
        assert_eq!(m, StockMaterial::MildSteel);
        let m: StockMaterial = serde_json::from_str("\"mild_steel\"").unwrap();
        assert_eq!(m, StockMaterial::MildSteel);
    }

    #[test]
    fn test_plastic_has_no_laser_properties() {
        assert!(!StockMaterial::Plastic.laser_properties().is_found());
        for m in StockMaterial::ALL.iter().filter(|m| **m != StockMaterial::Plastic) {
            assert!(m.laser_properties().is_found(), "{} should be tabulated", m);
        }
    }
}
