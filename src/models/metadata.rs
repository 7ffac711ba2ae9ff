//! Enumerations shared by every provider: price brackets and atmospheres.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Price bracket of an establishment.
///
/// A merged place may span several brackets, so places hold a list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLevel {
    Free,
    Low,
    Medium,
    High,
    VeryHigh,
    Unknown,
}

impl PriceLevel {
    pub fn is_known(&self) -> bool {
        !matches!(self, PriceLevel::Unknown)
    }

    /// Maps a Google Maps `PRICE_LEVEL_*` value.
    pub fn from_gmaps(value: &str) -> Self {
        match value {
            "PRICE_LEVEL_FREE" => PriceLevel::Free,
            "PRICE_LEVEL_INEXPENSIVE" => PriceLevel::Low,
            "PRICE_LEVEL_MODERATE" => PriceLevel::Medium,
            "PRICE_LEVEL_EXPENSIVE" => PriceLevel::High,
            "PRICE_LEVEL_VERY_EXPENSIVE" => PriceLevel::VeryHigh,
            _ => PriceLevel::Unknown,
        }
    }

    /// Maps a single Tripadvisor dollar bracket (`$` to `$$$$`).
    pub fn from_dollars(value: &str) -> Self {
        match value.trim() {
            "$" => PriceLevel::Low,
            "$$" => PriceLevel::Medium,
            "$$$" => PriceLevel::High,
            "$$$$" => PriceLevel::VeryHigh,
            _ => PriceLevel::Unknown,
        }
    }
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PriceLevel::Free => "FREE",
            PriceLevel::Low => "LOW",
            PriceLevel::Medium => "MEDIUM",
            PriceLevel::High => "HIGH",
            PriceLevel::VeryHigh => "VERY_HIGH",
            PriceLevel::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Occasion or audience a place is suited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Atmosphere {
    Solo,
    Couples,
    Family,
    Friends,
    Business,
    Groups,
    Sport,
    Unknown,
}

impl Atmosphere {
    /// Maps a Tripadvisor trip type label ("Solo travel", "Couples", ...).
    pub fn from_trip_type(label: &str) -> Self {
        label.parse().unwrap_or(Atmosphere::Unknown)
    }
}

impl FromStr for Atmosphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Solo travel" | "SOLO" => Ok(Atmosphere::Solo),
            "Couples" | "COUPLES" => Ok(Atmosphere::Couples),
            "Family" | "FAMILY" => Ok(Atmosphere::Family),
            "Friends getaway" | "FRIENDS" => Ok(Atmosphere::Friends),
            "Business" | "BUSINESS" => Ok(Atmosphere::Business),
            "GROUPS" => Ok(Atmosphere::Groups),
            "SPORT" => Ok(Atmosphere::Sport),
            _ => Err(format!("Unknown atmosphere '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gmaps_price_levels() {
        assert_eq!(PriceLevel::from_gmaps("PRICE_LEVEL_MODERATE"), PriceLevel::Medium);
        assert_eq!(PriceLevel::from_gmaps("PRICE_LEVEL_UNSPECIFIED"), PriceLevel::Unknown);
        assert_eq!(PriceLevel::from_gmaps(""), PriceLevel::Unknown);
    }

    #[test]
    fn test_dollar_price_levels() {
        assert_eq!(PriceLevel::from_dollars(" $$ "), PriceLevel::Medium);
        assert_eq!(PriceLevel::from_dollars("$$$$"), PriceLevel::VeryHigh);
        assert_eq!(PriceLevel::from_dollars("cheap"), PriceLevel::Unknown);
    }

    #[test]
    fn test_price_level_serialization() {
        let json = serde_json::to_string(&PriceLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"VERY_HIGH\"");
    }

    #[test]
    fn test_trip_types() {
        assert_eq!(Atmosphere::from_trip_type("Friends getaway"), Atmosphere::Friends);
        assert_eq!(Atmosphere::from_trip_type("Backpacking"), Atmosphere::Unknown);
    }
}
