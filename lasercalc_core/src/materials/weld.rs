//! Laser welding materials

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Alloy being welded. Grades matter here because filler-free laser welding
/// speed differs noticeably between e.g. 304 and 316.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldMaterial {
    MildSteel,
    #[serde(rename = "stainless_steel_304")]
    StainlessSteel304,
    #[serde(rename = "stainless_steel_316")]
    StainlessSteel316,
    #[serde(rename = "aluminum_5052")]
    Aluminum5052,
    #[serde(rename = "aluminum_6061")]
    Aluminum6061,
    Titanium,
    Copper,
    Brass,
    GalvanizedSteel,
}

impl WeldMaterial {
    pub const ALL: [WeldMaterial; 9] = [
        WeldMaterial::MildSteel,
        WeldMaterial::StainlessSteel304,
        WeldMaterial::StainlessSteel316,
        WeldMaterial::Aluminum5052,
        WeldMaterial::Aluminum6061,
        WeldMaterial::Titanium,
        WeldMaterial::Copper,
        WeldMaterial::Brass,
        WeldMaterial::GalvanizedSteel,
    ];

    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "mild_steel" | "steel" => Ok(WeldMaterial::MildSteel),
            "stainless_steel_304" | "ss304" | "304" => Ok(WeldMaterial::StainlessSteel304),
            "stainless_steel_316" | "ss316" | "316" => Ok(WeldMaterial::StainlessSteel316),
            "aluminum_5052" | "5052" => Ok(WeldMaterial::Aluminum5052),
            "aluminum_6061" | "6061" => Ok(WeldMaterial::Aluminum6061),
            "titanium" | "ti" => Ok(WeldMaterial::Titanium),
            "copper" => Ok(WeldMaterial::Copper),
            "brass" => Ok(WeldMaterial::Brass),
            "galvanized_steel" | "galvanized" => Ok(WeldMaterial::GalvanizedSteel),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WeldMaterial::MildSteel => "Mild Steel",
            WeldMaterial::StainlessSteel304 => "Stainless Steel 304",
            WeldMaterial::StainlessSteel316 => "Stainless Steel 316",
            WeldMaterial::Aluminum5052 => "Aluminum 5052",
            WeldMaterial::Aluminum6061 => "Aluminum 6061",
            WeldMaterial::Titanium => "Titanium",
            WeldMaterial::Copper => "Copper",
            WeldMaterial::Brass => "Brass",
            WeldMaterial::GalvanizedSteel => "Galvanized Steel",
        }
    }

    /// Spot weld dwell time in seconds per spot.
    pub fn spot_time_s(&self, thickness_mm: f64) -> f64 {
        let row: [f64; 4] = match self {
            WeldMaterial::MildSteel | WeldMaterial::GalvanizedSteel => [0.5, 1.0, 1.5, 2.5],
            WeldMaterial::StainlessSteel304 | WeldMaterial::StainlessSteel316 => [0.6, 1.2, 1.8, 3.0],
            WeldMaterial::Aluminum5052 | WeldMaterial::Aluminum6061 => [0.4, 0.8, 1.2, 2.0],
            WeldMaterial::Titanium => [0.8, 1.5, 2.5, 4.0],
            WeldMaterial::Copper | WeldMaterial::Brass => [0.7, 1.3, 2.0, 3.5],
        };
        if thickness_mm <= 1.0 {
            row[0]
        } else if thickness_mm <= 2.0 {
            row[1]
        } else if thickness_mm <= 4.0 {
            row[2]
        } else {
            row[3]
        }
    }

    /// Reflective metals need 1.5 kW for the speed a steel gets from 1 kW.
    pub fn power_reference_w(&self) -> f64 {
        match self {
            WeldMaterial::Copper | WeldMaterial::Brass => 1500.0,
            _ => 1000.0,
        }
    }
}

impl std::fmt::Display for WeldMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_names_serialize() {
        let json = serde_json::to_string(&WeldMaterial::StainlessSteel316).unwrap();
        assert_eq!(json, "\"stainless_steel_316\"");
        let m: WeldMaterial = serde_json::from_str("\"aluminum_5052\"").unwrap();
        assert_eq!(m, WeldMaterial::Aluminum5052);
    }

    #[test]
    fn test_spot_time_buckets() {
        assert_eq!(WeldMaterial::MildSteel.spot_time_s(1.0), 0.5);
        assert_eq!(WeldMaterial::MildSteel.spot_time_s(1.5), 1.0);
        assert_eq!(WeldMaterial::Titanium.spot_time_s(4.0), 2.5);
        assert_eq!(WeldMaterial::Copper.spot_time_s(6.0), 3.5);
    }
}
