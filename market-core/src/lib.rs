//! Ticket Marketplace Ledger Core
//!
//! Tracks event inventory, primary ticket sales, peer-to-peer resale
//! listings, and the money owed to sellers, resellers, and the
//! marketplace operator.
//!
//! # Architecture
//!
//! - **Inventory model**: pure validation over events, bulks, and holdings
//! - **Commission policy**: exact integer fee split, remainder to the seller
//! - **Withdrawal ledger**: pull-payment pending balances, reset before payout
//! - **Market engine**: the single owner of all mutable state; every
//!   mutation is funneled through it
//!
//! # Invariants
//!
//! - Ticket conservation: sold == Σ(holdings) for every bulk, always
//! - Value conservation: fee + net == proceeds exactly, refunds included
//! - All-or-nothing: a rejected operation moves no counter
//! - Pull-payment: balances are zeroed before any payout is attempted

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod commission;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod payouts;
pub mod types;

// Re-exports
pub use commission::{CommissionPolicy, FeeSplit};
pub use engine::Market;
pub use error::{Error, Result};
pub use payouts::PayoutLedger;
pub use types::{
    AccountId, BulkSpec, Event, EventId, EventView, Holding, Money, NewEvent, OwnedTickets,
    ResaleListing, ResaleOffer, TicketAvailability, TicketBulk, Units,
};
