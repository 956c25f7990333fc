//! Pure validation and arithmetic over bulks and holdings
//!
//! Every function here is total: no side effects, no partial state. The
//! engine calls these before touching any counter, so a rejection always
//! leaves the ledger untouched.

use crate::types::{Holding, NewEvent, TicketBulk, Units};
use crate::{Error, Result};
use std::collections::HashSet;

/// Units still purchasable from the primary allocation
///
/// Resale stock is carved out of owners' holdings and is already counted
/// in `sold`, so it never returns to the primary pool.
pub fn available_for_sale(bulk: &TicketBulk) -> Units {
    bulk.issued.saturating_sub(bulk.sold)
}

/// Check that `amount` units can be reserved from the primary allocation
pub fn can_reserve(bulk: &TicketBulk, amount: Units) -> Result<()> {
    if amount == 0 {
        return Err(Error::InvalidInput(
            "Ticket amount must be positive".to_string(),
        ));
    }

    let available = available_for_sale(bulk);
    if amount > available {
        return Err(Error::InsufficientInventory(format!(
            "Requested {} tickets of type '{}' but only {} available",
            amount, bulk.ticket_type, available
        )));
    }

    Ok(())
}

/// Check that an owner can put `amount` units of a bulk on sale
///
/// The amount may draw from units already listed: an edit fully replaces
/// the listing, so the bound is the owner's total holding.
pub fn can_list_for_resale(holding: &Holding, amount: Units) -> Result<()> {
    if amount > holding.total() {
        return Err(Error::InsufficientInventory(format!(
            "Cannot list {} tickets, caller holds {}",
            amount,
            holding.total()
        )));
    }

    Ok(())
}

/// Validate an event creation request
pub fn validate_new_event(request: &NewEvent) -> Result<()> {
    if request.name.trim().is_empty() {
        return Err(Error::InvalidInput("Event name must not be empty".to_string()));
    }

    if request.end_time < request.start_time {
        return Err(Error::InvalidInput(format!(
            "Event end time {} precedes start time {}",
            request.end_time, request.start_time
        )));
    }

    if request.bulks.is_empty() {
        return Err(Error::InvalidInput(
            "Event must define at least one ticket bulk".to_string(),
        ));
    }

    let mut seen_types = HashSet::new();
    for bulk in &request.bulks {
        if bulk.ticket_type.is_empty() {
            return Err(Error::InvalidInput(
                "Ticket type must not be empty".to_string(),
            ));
        }

        if bulk.amount == 0 {
            return Err(Error::InvalidInput(format!(
                "Ticket bulk '{}' must issue a positive amount",
                bulk.ticket_type
            )));
        }

        if !seen_types.insert(bulk.ticket_type.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Duplicate ticket type '{}' in event",
                bulk.ticket_type
            )));
        }
    }

    Ok(())
}
