//! Cleaning Configuration

use crate::corrections::{default_corrections, CorrectionRule};
use serde::{Deserialize, Serialize};

/// One raw -> canonical column rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

impl RenameRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Exact-string substitution applied to a derived text value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

/// Neighborhood derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodConfig {
    /// Free-text address column
    pub address_column: String,
    /// Derived neighborhood column
    pub output_column: String,
    /// Known extraction errors fixed after matching
    pub substitutions: Vec<Substitution>,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            address_column: "endereco".to_string(),
            output_column: "bairro".to_string(),
            substitutions: vec![Substitution {
                from: "ap 21 - Gonzaga".to_string(),
                to: "Gonzaga".to_string(),
            }],
        }
    }
}

/// Cleaning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Raw -> canonical names, applied in order
    pub rename: Vec<RenameRule>,
    /// Listing identifier; first occurrence wins
    pub dedup_key: String,
    /// Replacement for missing cells, applied after deduplication
    pub fill_value: String,
    /// Columns reduced to their digits and cast to integers
    pub int_columns: Vec<String>,
    /// Ordered outlier corrections, applied after coercion
    pub corrections: Vec<CorrectionRule>,
    /// Neighborhood extraction
    pub neighborhood: NeighborhoodConfig,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            rename: vec![
                RenameRule::new("condominio", "nrCondominio"),
                RenameRule::new("iptu", "nrIptu"),
                RenameRule::new("floorSize", "nrArea(m2)"),
                RenameRule::new("numberOfRooms", "nrQuartos"),
                RenameRule::new("numberOfBathroomsTotal", "nrBanheiros"),
                RenameRule::new("numberOfParkingSpaces", "nrVagas"),
                RenameRule::new("floorLevel", "nrAndar"),
                RenameRule::new("numberOfSuites", "nrSuites"),
            ],
            dedup_key: "codigo_zapimoveis".to_string(),
            fill_value: "0".to_string(),
            int_columns: [
                "nrPreco",
                "nrCondominio",
                "nrIptu",
                "nrArea(m2)",
                "nrQuartos",
                "nrBanheiros",
                "nrVagas",
                "nrAndar",
                "nrSuites",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            corrections: default_corrections(),
            neighborhood: NeighborhoodConfig::default(),
        }
    }
}
