//! # opensettle-types
//!
//! Shared types, errors, and configuration for the **OpenSettle**
//! marketplace settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ListingId`], [`ActorId`], [`AssetId`], [`EventId`], [`SettlementId`]
//! - **Bid model**: [`Bid`], [`Ask`]
//! - **Lot model**: [`ItemLot`], [`LotEntry`], [`LotStatus`]
//! - **Level model**: [`Level`], [`LevelRequirement`]
//! - **Discount model**: [`Discount`]
//! - **Events**: [`SettlementEvent`], [`EventEnvelope`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`SettleError`] with `OS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod bid;
pub mod config;
pub mod constants;
pub mod discount;
pub mod error;
pub mod event;
pub mod ids;
pub mod level;
pub mod lot;

// Re-export all primary types at crate root for ergonomic imports:
//   use opensettle_types::{Bid, ItemLot, Discount, SettleError, ...};

pub use bid::*;
pub use config::*;
pub use discount::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use level::*;
pub use lot::*;

// Constants are accessed via `opensettle_types::constants::FOO`
// (not re-exported to avoid name collisions).
