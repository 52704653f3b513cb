use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AdvisoryError;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// States covered by the dashboard. Each one is scoped to a representative
/// city for weather lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Region {
    Punjab,
    Haryana,
    #[serde(rename = "Uttar Pradesh")]
    UttarPradesh,
    #[serde(rename = "Madhya Pradesh")]
    MadhyaPradesh,
    Rajasthan,
    Maharashtra,
    Gujarat,
    #[serde(rename = "Andhra Pradesh")]
    AndhraPradesh,
    Karnataka,
    #[serde(rename = "Tamil Nadu")]
    TamilNadu,
}

impl Region {
    pub const ALL: [Region; 10] = [
        Region::Punjab,
        Region::Haryana,
        Region::UttarPradesh,
        Region::MadhyaPradesh,
        Region::Rajasthan,
        Region::Maharashtra,
        Region::Gujarat,
        Region::AndhraPradesh,
        Region::Karnataka,
        Region::TamilNadu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Punjab => "Punjab",
            Region::Haryana => "Haryana",
            Region::UttarPradesh => "Uttar Pradesh",
            Region::MadhyaPradesh => "Madhya Pradesh",
            Region::Rajasthan => "Rajasthan",
            Region::Maharashtra => "Maharashtra",
            Region::Gujarat => "Gujarat",
            Region::AndhraPradesh => "Andhra Pradesh",
            Region::Karnataka => "Karnataka",
            Region::TamilNadu => "Tamil Nadu",
        }
    }

    /// City whose conditions stand in for the whole state.
    pub fn weather_city(self) -> &'static str {
        match self {
            Region::Punjab => "Ludhiana",
            Region::Haryana => "Chandigarh",
            Region::UttarPradesh => "Lucknow",
            Region::MadhyaPradesh => "Bhopal",
            Region::Rajasthan => "Jaipur",
            Region::Maharashtra => "Mumbai",
            Region::Gujarat => "Ahmedabad",
            Region::AndhraPradesh => "Vijayawada",
            Region::Karnataka => "Bangalore",
            Region::TamilNadu => "Chennai",
        }
    }

    /// Resolve a state name or its weather city, case-insensitively.
    pub fn for_location(location: &str) -> Result<Self, AdvisoryError> {
        let wanted = location.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(wanted) || r.weather_city().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AdvisoryError::invalid("region", location))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AdvisoryError::invalid("region", s))
    }
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Crop {
    Wheat,
    Rice,
    Maize,
    Sugarcane,
    Cotton,
    Soybean,
    Mustard,
    Jowar,
}

impl Crop {
    pub const ALL: [Crop; 8] = [
        Crop::Wheat,
        Crop::Rice,
        Crop::Maize,
        Crop::Sugarcane,
        Crop::Cotton,
        Crop::Soybean,
        Crop::Mustard,
        Crop::Jowar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Crop::Wheat => "Wheat",
            Crop::Rice => "Rice",
            Crop::Maize => "Maize",
            Crop::Sugarcane => "Sugarcane",
            Crop::Cotton => "Cotton",
            Crop::Soybean => "Soybean",
            Crop::Mustard => "Mustard",
            Crop::Jowar => "Jowar",
        }
    }

    pub fn group(self) -> CropGroup {
        match self {
            Crop::Wheat => CropGroup::Wheat,
            Crop::Rice => CropGroup::Rice,
            Crop::Maize | Crop::Jowar => CropGroup::Millets,
            Crop::Sugarcane => CropGroup::Sugarcane,
            Crop::Cotton => CropGroup::Cotton,
            Crop::Soybean | Crop::Mustard => CropGroup::Pulses,
        }
    }

    pub fn profile(self) -> CropProfile {
        self.group().profile()
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Crop {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Crop::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AdvisoryError::invalid("crop", s))
    }
}

// ---------------------------------------------------------------------------
// Agronomic profiles
// ---------------------------------------------------------------------------

/// Agronomic group several catalog crops share a water profile with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CropGroup {
    Wheat,
    Rice,
    Millets,
    Sugarcane,
    Cotton,
    Pulses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WaterPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CropProfile {
    /// Minimum acceptable soil moisture, percent.
    pub moisture_floor: f64,
    /// Degrees Celsius above which evaporation losses grow.
    pub temp_max: f64,
    /// Relative humidity percentage below which the crop is stressed.
    pub humidity_min: f64,
    pub priority: WaterPriority,
    /// Litres per acre for every moisture point below the requirement.
    pub liters_per_point: f64,
}

impl CropGroup {
    pub fn profile(self) -> CropProfile {
        use WaterPriority::*;
        let (moisture_floor, temp_max, humidity_min, priority, liters_per_point) = match self {
            CropGroup::Rice => (60.0, 32.0, 70.0, High, 12.0),
            CropGroup::Wheat => (45.0, 28.0, 50.0, Medium, 8.0),
            CropGroup::Cotton => (50.0, 35.0, 60.0, Medium, 9.0),
            CropGroup::Sugarcane => (70.0, 33.0, 65.0, High, 11.0),
            CropGroup::Millets => (35.0, 38.0, 45.0, Low, 6.0),
            CropGroup::Pulses => (40.0, 34.0, 55.0, Low, 6.0),
        };
        CropProfile {
            moisture_floor,
            temp_max,
            humidity_min,
            priority,
            liters_per_point,
        }
    }
}
