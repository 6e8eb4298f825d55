//! Reference tables shared by the payload builders.

/// Cross-section properties of a steel sheet pile profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetPileProfile {
    pub label: &'static str,
    /// Specific tip area of a single sheet [m²].
    pub area_tip_specific: f64,
    /// Specific shaft area of a single sheet per unit length [m²/m].
    pub area_shaft_specific: f64,
}

const fn profile(label: &'static str, area_tip_specific: f64, area_shaft_specific: f64) -> SheetPileProfile {
    SheetPileProfile {
        label,
        area_tip_specific,
        area_shaft_specific,
    }
}

pub static SHEETPILE_REFERENCE_PROFILES: [SheetPileProfile; 36] = [
    profile("AZ12-770", 0.00925, 1.86),
    profile("AZ13-770", 0.00969, 1.86),
    profile("AZ14-770", 0.01013, 1.86),
    profile("AZ12-700", 0.00862, 1.72),
    profile("AZ13-700", 0.00943, 1.72),
    profile("AZ14-700", 0.01023, 1.72),
    profile("AZ17-700", 0.00931, 1.86),
    profile("AZ18-700", 0.00975, 1.86),
    profile("AZ19-700", 0.01019, 1.86),
    profile("AZ20-700", 0.01064, 1.86),
    profile("AZ24-700", 0.01219, 1.94),
    profile("AZ26-700", 0.0131, 1.94),
    profile("AZ28-700", 0.01402, 1.94),
    profile("AZ36-700N", 0.01511, 2.06),
    profile("AZ38-700N", 0.0161, 2.06),
    profile("AZ40-700N", 0.01709, 2.06),
    profile("AZ42-700N", 0.01811, 2.06),
    profile("AZ44-700N", 0.0191, 2.06),
    profile("AZ46-700N", 0.02009, 2.06),
    profile("AZ48-700", 0.02019, 2.04),
    profile("AZ50-700", 0.02118, 2.04),
    profile("AZ52-700", 0.02217, 2.04),
    profile("PU18-1", 0.00925, 1.74),
    profile("PU18+1", 0.01034, 1.74),
    profile("PU22-1", 0.01043, 1.80),
    profile("PU22+1", 0.01152, 1.80),
    profile("PU28-1", 0.01241, 1.86),
    profile("PU28+1", 0.01353, 1.86),
    profile("PU32-1", 0.014, 1.84),
    profile("PU32+1", 0.01508, 1.84),
    profile("PU12", 0.00842, 1.60),
    profile("PU12S", 0.00905, 1.60),
    profile("PU22", 0.01097, 1.80),
    profile("PU18", 0.0098, 1.74),
    profile("PU32", 0.01454, 1.84),
    profile("PU28", 0.01297, 1.86),
];

/// CUR 166-1997 soil parameters for one reference location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilReference {
    pub location: &'static str,
    /// `"driving"` or `"vibrate"`.
    pub method: &'static str,
    /// `"vertical"` or `"horizontal"`.
    pub vibration_direction: &'static str,
    /// Reference velocity Uo [mm/s].
    pub uo: f64,
    /// Barkan damping α [1/m].
    pub alpha: f64,
    /// Variation coefficient Vo [-].
    pub vo: f64,
}

const fn soil(
    location: &'static str,
    method: &'static str,
    vibration_direction: &'static str,
    uo: f64,
    alpha: f64,
    vo: f64,
) -> SoilReference {
    SoilReference {
        location,
        method,
        vibration_direction,
        uo,
        alpha,
        vo,
    }
}

pub static SOIL_REFERENCE: [SoilReference; 16] = [
    // CUR 166-1997 table 5.16, driving tubular piles
    soil("Amsterdam", "driving", "vertical", 0.03, 0.03, 0.6),
    soil("Maasvlakte", "driving", "vertical", 0.04, 0.02, 0.6),
    soil("Rotterdam", "driving", "vertical", 0.017, 0.03, 0.6),
    soil("Rotterdam", "driving", "horizontal", 0.026, 0.03, 0.6),
    // CUR 166-1997 table 5.17, vibrating steel sheets (up to 14 m)
    soil("Amsterdam", "vibrate", "vertical", 1.1, 0.02, 0.9),
    soil("Amsterdam", "vibrate", "horizontal", 1.6, 0.02, 1.5),
    soil("Eindhoven", "vibrate", "vertical", 1.9, 0.02, 1.1),
    soil("Eindhoven", "vibrate", "horizontal", 2.6, 0.02, 0.8),
    soil("Groningen", "vibrate", "vertical", 1.7, 0.02, 1.8),
    soil("Groningen", "vibrate", "horizontal", 0.9, 0.02, 0.5),
    soil("Den Haag", "vibrate", "vertical", 1.9, 0.02, 1.1),
    soil("Den Haag", "vibrate", "horizontal", 2.6, 0.02, 0.8),
    soil("Rotterdam", "vibrate", "vertical", 1.1, 0.02, 0.9),
    soil("Rotterdam", "vibrate", "horizontal", 1.6, 0.02, 1.5),
    soil("Tiel", "vibrate", "vertical", 1.1, 0.02, 0.9),
    soil("Tiel", "vibrate", "horizontal", 1.6, 0.02, 1.5),
];

/// Sheet pile profile by exact (case-sensitive) label.
pub fn sheet_pile_profile(label: &str) -> Option<&'static SheetPileProfile> {
    SHEETPILE_REFERENCE_PROFILES.iter().find(|p| p.label == label)
}

/// Soil reference row matching all three keys exactly.
pub fn soil_reference(
    location: &str,
    method: &str,
    vibration_direction: &str,
) -> Option<&'static SoilReference> {
    SOIL_REFERENCE.iter().find(|row| {
        row.location == location
            && row.method == method
            && row.vibration_direction == vibration_direction
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_pile_labels_are_unique() {
        for (i, a) in SHEETPILE_REFERENCE_PROFILES.iter().enumerate() {
            assert!(
                SHEETPILE_REFERENCE_PROFILES[i + 1..]
                    .iter()
                    .all(|b| b.label != a.label),
                "duplicate label {}",
                a.label
            );
        }
    }

    #[test]
    fn sheet_pile_lookup_is_case_sensitive() {
        assert_eq!(sheet_pile_profile("PU12S").unwrap().area_tip_specific, 0.00905);
        assert!(sheet_pile_profile("pu12s").is_none());
    }

    #[test]
    fn soil_reference_requires_all_keys() {
        let row = soil_reference("Rotterdam", "driving", "horizontal").unwrap();
        assert_eq!(row.uo, 0.026);
        assert!(soil_reference("Maasvlakte", "driving", "horizontal").is_none());
        for method in ["driving", "vibrate"] {
            for direction in ["vertical", "horizontal"] {
                assert!(soil_reference("Utrecht", method, direction).is_none());
            }
        }
    }
}
