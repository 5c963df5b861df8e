//! # opensettle-ledger
//!
//! **External collaborator plane**: the interfaces the settlement core
//! moves value and reads eligibility through, plus in-memory reference
//! implementations.
//!
//! ## Architecture
//!
//! The core never owns balances or tier lists — it orchestrates four
//! collaborators, each modeled as a synchronous, non-reentrant trait:
//!
//! 1. **[`TokenLedger`]**: the transfer primitive for currencies and item
//!    tokens ([`transfer_reporting`] adds the fee-aware received-amount
//!    variant)
//! 2. **[`ValueConverter`]**: currency → common settlement unit
//! 3. **[`LevelRegistry`]**: balance-threshold tier classification
//! 4. **[`ListingRegistry`]**: burn-signal sink for exhausted listings
//!
//! The in-memory implementations ([`InMemoryLedger`],
//! [`FixedRateConverter`], [`TieredLevelRegistry`], [`RecordingRegistry`])
//! back the integration tests and any single-process deployment.

pub mod converter;
pub mod levels;
pub mod registry;
pub mod token_ledger;

pub use converter::{FixedRateConverter, ValueConverter};
pub use levels::{LevelRegistry, TieredLevelRegistry};
pub use registry::{ListingRegistry, RecordingRegistry};
pub use token_ledger::{InMemoryLedger, TokenLedger, transfer_reporting};
