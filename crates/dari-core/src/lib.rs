use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

mod display;
mod export;
pub use display::{create_listing_table, create_stat_table, format_run_summary, StatRow};
pub use export::{read_csv, write_csv, write_json};

pub type Result<T> = std::result::Result<T, DariError>;

/// Sentinel used for location fields that could not be determined.
pub const UNSPECIFIED: &str = "Non spécifié";

#[derive(Debug, thiserror::Error)]
pub enum DariError {
    #[error("Scraping error: {0}")]
    Scraping(String),
    #[error("Invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Property categories handled by the collector. Serialized as the integer
/// codes used in the exported datasets: 0 = house, 1 = apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PropertyType {
    House,
    Apartment,
}

impl PropertyType {
    pub fn as_index(&self) -> u8 {
        match self {
            PropertyType::House => 0,
            PropertyType::Apartment => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PropertyType::House),
            1 => Some(PropertyType::Apartment),
            _ => None,
        }
    }
}

impl Serialize for PropertyType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_index())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let index = u8::deserialize(deserializer)?;
        PropertyType::from_index(index)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown property type code: {}", index)))
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::House => write!(f, "Maison"),
            PropertyType::Apartment => write!(f, "Appartement"),
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "house" | "houses" | "maison" | "maisons" => Ok(PropertyType::House),
            "1" | "apartment" | "apartments" | "appartement" | "appartements" => {
                Ok(PropertyType::Apartment)
            }
            _ => Err(format!(
                "Invalid property type: {}. Valid options are: house/maison, apartment/appartement",
                s
            )),
        }
    }
}

/// One extracted listing. Field order fixes the column order of the CSV
/// exports, so reordering fields here is a breaking change for downstream
/// consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub price: u64,
    pub surface_totale: u32,
    pub nombre_chambres: u32,
    pub nombre_salle_bain: u32,
    pub etage: Option<u32>,
    #[serde(with = "flag_serde")]
    pub parking: bool,
    #[serde(with = "flag_serde")]
    pub piscine: bool,
    #[serde(with = "flag_serde")]
    pub jardin: bool,
    #[serde(with = "flag_serde")]
    pub balcon: bool,
    #[serde(with = "flag_serde")]
    pub terrasse: bool,
    #[serde(with = "flag_serde")]
    pub ascenseur: bool,
    #[serde(with = "flag_serde")]
    pub climatisation: bool,
    #[serde(with = "flag_serde")]
    pub chauffage: bool,
    #[serde(with = "flag_serde")]
    pub vue_panoramique: bool,
    #[serde(with = "flag_serde")]
    pub neuf: bool,
    #[serde(with = "flag_serde")]
    pub haut_standing: bool,
    pub gouvernorat: String,
    pub delegation: String,
    pub url: Url,
    pub description: String,
    pub area: String,
}

impl Listing {
    /// A listing with every field at its schema default. Extraction starts
    /// from here and overwrites what it finds on the page, so a returned
    /// record is always fully populated.
    pub fn new(url: Url, property_type: PropertyType) -> Self {
        Self {
            property_type,
            price: 0,
            surface_totale: 0,
            nombre_chambres: 0,
            nombre_salle_bain: 1,
            // Houses are always ground floor; for apartments the floor
            // stays unknown until detected, which is not the same as 0.
            etage: match property_type {
                PropertyType::House => Some(0),
                PropertyType::Apartment => None,
            },
            parking: false,
            piscine: false,
            jardin: false,
            balcon: false,
            terrasse: false,
            ascenseur: false,
            climatisation: false,
            chauffage: false,
            vue_panoramique: false,
            neuf: false,
            haut_standing: false,
            gouvernorat: UNSPECIFIED.to_string(),
            delegation: UNSPECIFIED.to_string(),
            url,
            description: String::new(),
            area: UNSPECIFIED.to_string(),
        }
    }
}

// The exported datasets encode booleans as 0/1 columns.
mod flag_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "expected 0 or 1 for flag column, got {}",
                other
            ))),
        }
    }
}
