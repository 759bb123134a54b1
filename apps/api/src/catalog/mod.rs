//! Tier Catalog — the single source of truth for which markers a report tier needs and
//! which sections its narrative contains.
//!
//! The table is hand-curated and built once on first access. Tier progression is
//! additive: every tier carries the markers and sections of the tiers below it.

mod tiers;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bumped whenever a marker set or section template changes.
pub const CATALOG_VERSION: &str = "2025.1";

/// A purchasable report level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierId {
    Snapshot,
    Core,
    Performance,
    Elite,
}

impl TierId {
    pub const ALL: [TierId; 4] = [
        TierId::Snapshot,
        TierId::Core,
        TierId::Performance,
        TierId::Elite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierId::Snapshot => "snapshot",
            TierId::Core => "core",
            TierId::Performance => "performance",
            TierId::Elite => "elite",
        }
    }

    /// Resolves a tier selector, falling back to `Snapshot` for unknown or missing values.
    pub fn parse_lenient(selector: Option<&str>) -> TierId {
        selector
            .and_then(|s| s.parse().ok())
            .unwrap_or(TierId::Snapshot)
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown report tier: '{0}'")]
pub struct UnknownTierError(pub String);

impl FromStr for TierId {
    type Err = UnknownTierError;

    /// Accepts the canonical ids plus the `methylation+` spellings used by older links.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(TierId::Snapshot),
            "core" => Ok(TierId::Core),
            "performance" | "methylation+" | "methylation-plus" | "methylation_plus" => {
                Ok(TierId::Performance)
            }
            "elite" => Ok(TierId::Elite),
            _ => Err(UnknownTierError(s.to_string())),
        }
    }
}

/// A marker the tier's narrative draws on. `gene` is context for the model only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerSpec {
    pub id: &'static str,
    pub gene: &'static str,
}

/// One required report section and the one-line guidance rendered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionSpec {
    pub title: &'static str,
    pub guidance: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierDefinition {
    pub id: TierId,
    pub label: &'static str,
    /// Markers in priority order. Ids are unique within a tier.
    pub required_markers: Vec<MarkerSpec>,
    /// Sections in the order the report must present them.
    pub sections: Vec<SectionSpec>,
}

impl TierDefinition {
    #[cfg(test)]
    pub fn requires(&self, marker_id: &str) -> bool {
        self.required_markers.iter().any(|m| m.id == marker_id)
    }
}

static CATALOG: OnceLock<Vec<TierDefinition>> = OnceLock::new();

/// All tiers, lowest first.
pub fn all_tiers() -> &'static [TierDefinition] {
    CATALOG.get_or_init(tiers::build_catalog)
}

/// Returns the definition for a known tier id.
pub fn lookup(id: TierId) -> &'static TierDefinition {
    // build_catalog emits exactly one definition per TierId, in TierId::ALL order
    &all_tiers()[id as usize]
}

/// Strict lookup from a raw selector string.
pub fn lookup_str(selector: &str) -> Result<&'static TierDefinition, UnknownTierError> {
    selector.parse::<TierId>().map(lookup)
}
