//! Core types for the ticket marketplace ledger
//!
//! All types are designed for:
//! - Exact arithmetic (integer smallest-currency-unit amounts, no floats)
//! - Memory safety (no unsafe code)
//! - Cheap copies across the engine boundary (read views are owned data)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency amount in the smallest unit (wei-scale values fit in u128)
pub type Money = u128;

/// Ticket count
pub type Units = u64;

/// Event identifier (sequential, 1-based, never reused)
pub type EventId = u64;

/// Opaque caller identity (wallet address, account number, etc.)
///
/// Equality-comparable key, not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A marketplace event
///
/// Created once, immutable thereafter except through its owned bulks.
/// Events live for the process lifetime and are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Sequential identifier (1-based)
    pub id: EventId,

    /// Event name
    pub name: String,

    /// Event description
    pub description: String,

    /// Start time (seconds since Unix epoch)
    pub start_time: i64,

    /// End time (seconds since Unix epoch, >= start_time)
    pub end_time: i64,

    /// Account that created the event
    pub creator: AccountId,
}

/// A fixed-size primary allocation of identical tickets
///
/// Keyed by (event id, ticket type). The issued amount is fixed at
/// creation and never increases; only `sold` moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBulk {
    /// Event this bulk belongs to
    pub event_id: EventId,

    /// Type label, unique within the event, case-sensitive, non-empty
    pub ticket_type: String,

    /// Total amount issued (fixed at creation)
    pub issued: Units,

    /// Price per unit in the smallest currency unit (fixed at creation)
    pub price: Money,

    /// Bulk description
    pub description: String,

    /// Units sold from the primary allocation
    pub sold: Units,
}

/// Per-owner ticket counters for one bulk
///
/// Invariant: the sum over all owners never exceeds the bulk's issued
/// amount, and `held_for_sale` is non-zero only while a listing exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Units held and not offered for resale
    pub held_not_for_sale: Units,

    /// Units currently backing a resale listing
    pub held_for_sale: Units,
}

impl Holding {
    /// Total units this owner holds for the bulk
    pub fn total(&self) -> Units {
        self.held_not_for_sale + self.held_for_sale
    }

    /// True once both counters are zero
    pub fn is_empty(&self) -> bool {
        self.held_not_for_sale == 0 && self.held_for_sale == 0
    }
}

/// An owner's offer to resell held tickets
///
/// Exists only while `amount_on_sale > 0`; removed, not zeroed, once
/// fully sold or edited to zero. At most one per (bulk, owner).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResaleListing {
    /// Event of the underlying bulk
    pub event_id: EventId,

    /// Ticket type of the underlying bulk
    pub ticket_type: String,

    /// Selling account
    pub owner: AccountId,

    /// Asking price per unit (may differ from the bulk price)
    pub price: Money,

    /// Units on sale
    pub amount_on_sale: Units,
}

/// Bulk definition supplied to event creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSpec {
    /// Type label, unique within the event
    pub ticket_type: String,

    /// Amount to issue (must be positive)
    pub amount: Units,

    /// Price per unit (non-negative)
    pub price: Money,

    /// Bulk description
    pub description: String,
}

/// Event creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event name (non-empty)
    pub name: String,

    /// Event description
    pub description: String,

    /// Start time (seconds since Unix epoch)
    pub start_time: i64,

    /// End time (seconds since Unix epoch, >= start_time)
    pub end_time: i64,

    /// Primary ticket allocations (at least one)
    pub bulks: Vec<BulkSpec>,
}

/// Read view of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    /// Event id
    pub id: EventId,
    /// Event name
    pub name: String,
    /// Event description
    pub description: String,
    /// Start time (seconds since Unix epoch)
    pub start_time: i64,
    /// End time (seconds since Unix epoch)
    pub end_time: i64,
    /// Creator account
    pub creator: AccountId,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            creator: event.creator.clone(),
        }
    }
}

/// Read view of a bulk's remaining primary inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAvailability {
    /// Ticket type
    pub ticket_type: String,
    /// Price per unit from the primary allocation
    pub price: Money,
    /// Units still available from the primary allocation
    pub available: Units,
    /// Bulk description
    pub description: String,
}

/// Read view of an active resale listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResaleOffer {
    /// Ticket type
    pub ticket_type: String,
    /// Selling account
    pub owner: AccountId,
    /// Asking price per unit
    pub price: Money,
    /// Units on sale
    pub amount_on_sale: Units,
}

/// Read view of one owner's tickets for a bulk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedTickets {
    /// Event id
    pub event_id: EventId,
    /// Ticket type
    pub ticket_type: String,
    /// Units held and not on sale
    pub held_not_for_sale: Units,
    /// Units currently listed for resale
    pub held_for_sale: Units,
}
