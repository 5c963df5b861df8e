//! Configuration for the settlement engine.

use serde::{Deserialize, Serialize};

use crate::ActorId;

/// Configuration for a single settlement engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only actor allowed to drive the engine's operations. The
    /// registry authenticates end users; the engine trusts it blindly.
    pub registry: ActorId,
    /// The ledger account holding all escrowed currency and items.
    pub escrow_account: ActorId,
}

impl EngineConfig {
    #[must_use]
    pub fn new(registry: ActorId, escrow_account: ActorId) -> Self {
        Self {
            registry,
            escrow_account,
        }
    }
}
