//! Laser marking and engraving substrates

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Surface being marked. Covers organics and ceramics as well as metals,
/// since a marking laser works on far more than the cutting table does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingMaterial {
    StainlessSteel,
    Aluminum,
    Brass,
    Copper,
    Titanium,
    Plastics,
    CoatedMetal,
    AnodizedAluminum,
    Wood,
    Leather,
    Acrylic,
    Glass,
    Ceramic,
}

impl MarkingMaterial {
    pub const ALL: [MarkingMaterial; 13] = [
        MarkingMaterial::StainlessSteel,
        MarkingMaterial::Aluminum,
        MarkingMaterial::Brass,
        MarkingMaterial::Copper,
        MarkingMaterial::Titanium,
        MarkingMaterial::Plastics,
        MarkingMaterial::CoatedMetal,
        MarkingMaterial::AnodizedAluminum,
        MarkingMaterial::Wood,
        MarkingMaterial::Leather,
        MarkingMaterial::Acrylic,
        MarkingMaterial::Glass,
        MarkingMaterial::Ceramic,
    ];

    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "stainless_steel" | "stainless" => Ok(MarkingMaterial::StainlessSteel),
            "aluminum" | "aluminium" => Ok(MarkingMaterial::Aluminum),
            "brass" => Ok(MarkingMaterial::Brass),
            "copper" => Ok(MarkingMaterial::Copper),
            "titanium" | "ti" => Ok(MarkingMaterial::Titanium),
            "plastics" | "plastic" | "abs" => Ok(MarkingMaterial::Plastics),
            "coated_metal" | "powder_coated" => Ok(MarkingMaterial::CoatedMetal),
            "anodized_aluminum" | "anodized" => Ok(MarkingMaterial::AnodizedAluminum),
            "wood" => Ok(MarkingMaterial::Wood),
            "leather" => Ok(MarkingMaterial::Leather),
            "acrylic" | "pmma" => Ok(MarkingMaterial::Acrylic),
            "glass" => Ok(MarkingMaterial::Glass),
            "ceramic" => Ok(MarkingMaterial::Ceramic),
            _ => Err(CalcError::material_not_found(s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MarkingMaterial::StainlessSteel => "Stainless Steel",
            MarkingMaterial::Aluminum => "Aluminum",
            MarkingMaterial::Brass => "Brass",
            MarkingMaterial::Copper => "Copper",
            MarkingMaterial::Titanium => "Titanium",
            MarkingMaterial::Plastics => "Plastics (ABS, PC, PVC)",
            MarkingMaterial::CoatedMetal => "Coated Metal",
            MarkingMaterial::AnodizedAluminum => "Anodized Aluminum",
            MarkingMaterial::Wood => "Wood",
            MarkingMaterial::Leather => "Leather",
            MarkingMaterial::Acrylic => "Acrylic",
            MarkingMaterial::Glass => "Glass",
            MarkingMaterial::Ceramic => "Ceramic",
        }
    }
}

impl std::fmt::Display for MarkingMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(MarkingMaterial::from_str_flexible("Anodized").unwrap(), MarkingMaterial::AnodizedAluminum);
        assert_eq!(MarkingMaterial::from_str_flexible("coated-metal").unwrap(), MarkingMaterial::CoatedMetal);
        assert!(MarkingMaterial::from_str_flexible("granite").is_err());
    }

    #[test]
    fn test_snake_case_serialization() {
        let json = serde_json::to_string(&MarkingMaterial::AnodizedAluminum).unwrap();
        assert_eq!(json, "\"anodized_aluminum\"");
    }
}
