//! Generation model catalog.
//!
//! The catalog is an immutable ordered list of model descriptors with
//! embedded daily limits and per-minute token capacities. Selection order
//! depends on transcript complexity: large transcripts prefer models
//! tagged for large chunks, everything else runs on the default order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a model variant is best suited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredUse {
    /// General-purpose workhorse.
    Default,
    /// High token-per-minute capacity; handles 5k/10k-line chunks.
    LargeChunk,
    /// High daily request limit; many small calls.
    HighVolume,
}

impl fmt::Display for PreferredUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredUse::Default => write!(f, "default"),
            PreferredUse::LargeChunk => write!(f, "large_chunk"),
            PreferredUse::HighVolume => write!(f, "high_volume"),
        }
    }
}

impl FromStr for PreferredUse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(PreferredUse::Default),
            "large_chunk" => Ok(PreferredUse::LargeChunk),
            "high_volume" => Ok(PreferredUse::HighVolume),
            other => Err(format!("invalid preferred use: '{other}'")),
        }
    }
}

/// Static description of one model variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Provider-side model identifier (e.g., "gemini-2.0-flash").
    pub name: String,
    /// Maximum requests per calendar day.
    pub daily_request_limit: u32,
    /// Selection priority; lower = tried first within a preference order.
    pub priority: u32,
    /// Provider-side tokens-per-minute capacity, enforced by the rate governor.
    pub tokens_per_minute: u64,
    pub preferred_use: PreferredUse,
}

/// Ordered, immutable set of model descriptors.
///
/// Serializes as a plain array (`[[models]]` in TOML); deserialization
/// goes through [`ModelCatalog::new`] so catalog order is always
/// normalized by priority regardless of file order.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl Serialize for ModelCatalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.models.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModelCatalog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ModelCatalog::new(Vec::<ModelDescriptor>::deserialize(deserializer)?))
    }
}

impl ModelCatalog {
    /// Build a catalog from descriptors. Order is normalized by priority
    /// so config files may list models in any order.
    pub fn new(mut models: Vec<ModelDescriptor>) -> Self {
        models.sort_by_key(|m| m.priority);
        Self { models }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Look up a descriptor by model name.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Whether any model in the catalog can absorb large chunks.
    pub fn has_large_chunk_model(&self) -> bool {
        self.models
            .iter()
            .any(|m| m.preferred_use == PreferredUse::LargeChunk)
    }

    /// Models in default preference order: catalog priority, unchanged.
    pub fn default_order(&self) -> Vec<&ModelDescriptor> {
        self.models.iter().collect()
    }

    /// Models in large-transcript preference order: large-chunk variants
    /// first (by priority), then the rest.
    pub fn large_chunk_order(&self) -> Vec<&ModelDescriptor> {
        let mut order: Vec<&ModelDescriptor> = self.models.iter().collect();
        order.sort_by_key(|m| {
            (
                m.preferred_use != PreferredUse::LargeChunk,
                m.priority,
            )
        });
        order
    }
}

impl Default for ModelCatalog {
    /// The stock Gemini free-tier catalog.
    fn default() -> Self {
        Self::new(vec![
            ModelDescriptor {
                name: "gemini-2.0-flash".to_string(),
                daily_request_limit: 1500,
                priority: 1,
                tokens_per_minute: 1_000_000,
                preferred_use: PreferredUse::Default,
            },
            ModelDescriptor {
                name: "gemini-2.0-flash-lite".to_string(),
                daily_request_limit: 1500,
                priority: 2,
                tokens_per_minute: 1_000_000,
                preferred_use: PreferredUse::HighVolume,
            },
            ModelDescriptor {
                name: "gemini-1.5-pro".to_string(),
                daily_request_limit: 50,
                priority: 3,
                tokens_per_minute: 2_000_000,
                preferred_use: PreferredUse::LargeChunk,
            },
        ])
    }
}
