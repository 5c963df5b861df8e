//! Tier/level classification types.
//!
//! A level is a balance-threshold classification of a token holder, used
//! for bid eligibility gating and discount matching. Tiers are owned by a
//! setter per token in the external level registry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, AssetId};

/// A named balance-threshold tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Tier label (compared byte-for-byte).
    pub label: String,
    /// Minimum balance to qualify for this tier.
    pub threshold: Decimal,
}

/// An optional per-listing eligibility gate.
///
/// A bid is only accepted when the spender's balance in `token` meets the
/// registry's required balance for `label` under `setter`. An unknown
/// label requires 0 and therefore always passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequirement {
    /// Who configured the tier list this requirement refers to.
    pub setter: ActorId,
    /// The token whose balance is classified.
    pub token: AssetId,
    /// Required tier label.
    pub label: String,
}

impl std::fmt::Display for LevelRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} by {}", self.label, self.token, self.setter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_display() {
        let req = LevelRequirement {
            setter: ActorId([1u8; 32]),
            token: AssetId(3),
            label: "gold".into(),
        };
        let s = format!("{req}");
        assert!(s.contains("gold"));
        assert!(s.contains("asset:3"));
    }

    #[test]
    fn level_serde_roundtrip() {
        let level = Level {
            label: "silver".into(),
            threshold: Decimal::new(100, 0),
        };
        let json = serde_json::to_string(&level).unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(level, back);
    }
}
