//! # opensettle-core
//!
//! **Settlement plane**: discount selection and the atomic settlement
//! core for OpenSettle.
//!
//! ## Architecture
//!
//! The [`SettlementEngine`] orchestrates the escrow plane (bid book, item
//! vault, listing arena) against the external collaborators (token
//! ledger, value oracle, tier registry, listing registry):
//!
//! ```text
//! registry → SettlementEngine.{set_ask, set_items, set_bid, remove_bid,
//!                              accept_bid, set_discount, set_level_requirement}
//!          → BidBook / ItemVault / DiscountEngine → TokenLedger
//! ```
//!
//! Every operation is all-or-nothing; a bid whose converted value meets
//! the ask finalizes inside the same call. The engine emits an
//! append-only audit trail of [`SettlementEvent`]s.
//!
//! [`SettlementEvent`]: opensettle_types::SettlementEvent

pub mod discount;
pub mod engine;

pub use discount::{best_discount, register_discount};
pub use engine::SettlementEngine;
