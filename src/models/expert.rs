use serde::{Deserialize, Serialize};

/// Unique identifier for experts in the directory
pub type ExpertId = String;

/// A single advisory expert as published in the directory.
///
/// Records are read-mostly from the engine's perspective; onboarding and
/// editing happen through the import path, not through consultations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expert {
    pub id: ExpertId,
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub languages: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_minute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

impl Expert {
    /// Case-insensitive substring match against name or specialty.
    /// An empty term matches every expert.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.specialty.to_lowercase().contains(&needle)
    }

    /// True if the expert speaks any of the given language tags (ANY match).
    /// An empty selection matches every expert.
    pub fn speaks_any(&self, selected: &[String]) -> bool {
        if selected.is_empty() {
            return true;
        }
        self.languages
            .iter()
            .any(|lang| selected.iter().any(|sel| sel.eq_ignore_ascii_case(lang)))
    }

    /// Published rate, treating "rate not published" as zero for ordering.
    pub fn price_or_zero(&self) -> f64 {
        self.price_per_minute.unwrap_or(0.0)
    }
}
