//! Sheet materials for the laser cost-center tools
//!
//! Piercing, kerf and finishing tables are keyed by these four material
//! families. Copper and brass share one row because their laser behaviour
//! (high reflectivity, slow pierce) is close enough for quoting.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Material family used by the piercing, kerf and finishing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetMaterial {
    /// Carbon / mild steel
    MildSteel,
    /// Austenitic stainless (304/316)
    StainlessSteel,
    /// Aluminum alloys
    Aluminum,
    /// Copper and brass
    CopperBrass,
}

impl SheetMaterial {
    /// All sheet materials for UI selection
    pub const ALL: [SheetMaterial; 4] = [
        SheetMaterial::MildSteel,
        SheetMaterial::StainlessSteel,
        SheetMaterial::Aluminum,
        SheetMaterial::CopperBrass,
    ];

    /// Table key (e.g., "mild_steel")
    pub fn code(&self) -> &'static str {
        match self {
            SheetMaterial::MildSteel => "mild_steel",
            SheetMaterial::StainlessSteel => "stainless_steel",
            SheetMaterial::Aluminum => "aluminum",
            SheetMaterial::CopperBrass => "copper_brass",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "mild_steel" | "mildsteel" | "steel" | "carbon_steel" | "ms" => Ok(SheetMaterial::MildSteel),
            "stainless_steel" | "stainless" | "ss" | "inox" => Ok(SheetMaterial::StainlessSteel),
            "aluminum" | "aluminium" | "al" => Ok(SheetMaterial::Aluminum),
            "copper_brass" | "copper" | "brass" | "cu" => Ok(SheetMaterial::CopperBrass),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SheetMaterial::MildSteel => "Mild Steel",
            SheetMaterial::StainlessSteel => "Stainless Steel",
            SheetMaterial::Aluminum => "Aluminum",
            SheetMaterial::CopperBrass => "Copper/Brass",
        }
    }

    /// Nominal density in g/cm³.
    ///
    /// Copper/brass uses the brass figure (8.5); pure copper is 8.96.
    pub fn density_g_cm3(&self) -> f64 {
        match self {
            SheetMaterial::MildSteel => 7.85,
            SheetMaterial::StainlessSteel => 7.9,
            SheetMaterial::Aluminum => 2.7,
            SheetMaterial::CopperBrass => 8.5,
        }
    }
}

impl std::fmt::Display for SheetMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_parse() {
        assert_eq!(SheetMaterial::from_str_flexible("Mild Steel").unwrap(), SheetMaterial::MildSteel);
        assert_eq!(SheetMaterial::from_str_flexible("aluminium").unwrap(), SheetMaterial::Aluminum);
        assert_eq!(SheetMaterial::from_str_flexible("brass").unwrap(), SheetMaterial::CopperBrass);
        assert!(SheetMaterial::from_str_flexible("titanium").is_err());
    }

    #[test]
    fn test_serde_uses_table_keys() {
        for m in SheetMaterial::ALL {
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{}\"", m.code()));
        }
    }
}
