//! Feature Selection Configuration

use serde::{Deserialize, Serialize};

/// Feature selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Column to predict
    pub target: String,
    /// Identifier, date and free-text columns never used as predictors
    pub excluded: Vec<String>,
    /// Cross-validation folds
    pub cv_folds: usize,
    /// Smallest subset the elimination may stop at
    pub min_features: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            target: "nrPreco".to_string(),
            excluded: [
                "codigo_zapimoveis",
                "dtCriacao",
                "codigo_anunciante",
                "imobiliaria",
                "dtColeta",
                "endereco",
                "bairro",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            cv_folds: 5,
            min_features: 1,
        }
    }
}
