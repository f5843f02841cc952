use serde::{Deserialize, Serialize};

/// Configuration from vault.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database filename inside the data directory
    #[serde(default = "default_store_file")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default filename for `fv export`
    #[serde(default = "default_export_file")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show media summaries on feed cards
    #[serde(default = "default_true")]
    pub show_media: bool,
    /// Maximum card text rows before truncation
    #[serde(default = "default_card_rows")]
    pub card_rows: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file: default_store_file(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            file: default_export_file(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_media: true,
            card_rows: default_card_rows(),
        }
    }
}

fn default_store_file() -> String {
    "feedvault.db".to_string()
}

fn default_export_file() -> String {
    "feedvault-export.json".to_string()
}

fn default_card_rows() -> usize {
    6
}

fn default_true() -> bool {
    true
}
