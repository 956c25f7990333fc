//! Market engine orchestration layer
//!
//! This module ties together the inventory model, commission policy, and
//! withdrawal ledger into the single component that owns all mutable
//! marketplace state. Every operation validates fully before touching a
//! counter: a rejection leaves the ledger exactly as it was.

use crate::{
    commission::CommissionPolicy,
    inventory,
    payouts::PayoutLedger,
    types::{
        AccountId, Event, EventId, EventView, Holding, Money, NewEvent, OwnedTickets,
        ResaleListing, ResaleOffer, TicketAvailability, TicketBulk, Units,
    },
    Error, Result,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Key for a primary ticket allocation
type BulkKey = (EventId, String);

/// Key for an owner's holding or listing on one bulk
type OwnerKey = (EventId, String, AccountId);

/// All mutable marketplace state, owned exclusively by [`Market`]
///
/// No other component holds a mutable entry point; external collaborators
/// only ever receive owned read views.
#[derive(Debug, Default)]
struct MarketState {
    /// Event registry, keyed by sequential id
    events: BTreeMap<EventId, Event>,

    /// Primary allocations
    bulks: BTreeMap<BulkKey, TicketBulk>,

    /// Per-owner ticket counters
    holdings: BTreeMap<OwnerKey, Holding>,

    /// Active resale listings (removed, not zeroed, when fully sold)
    listings: BTreeMap<OwnerKey, ResaleListing>,

    /// Pending balances owed to sellers, resellers, buyers, and operator
    payouts: PayoutLedger,

    /// Global commission policy
    commission: CommissionPolicy,

    /// Next event id to assign (1-based)
    next_event_id: EventId,
}

/// Market engine
///
/// Mutators take the write lock, so concurrent operations against the
/// same bulk or listing serialize and the conservation invariants hold
/// after every operation. Readers take the shared lock and never observe
/// a half-applied mutation.
pub struct Market {
    state: RwLock<MarketState>,
    operator: AccountId,
}

impl Market {
    /// Create a market with the given operator account and commission policy
    pub fn new(operator: AccountId, commission: CommissionPolicy) -> Self {
        Self {
            state: RwLock::new(MarketState {
                commission,
                next_event_id: 1,
                ..Default::default()
            }),
            operator,
        }
    }

    /// The distinguished operator account
    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Create an event with its primary ticket allocations
    ///
    /// The caller becomes the event creator and receives the net proceeds
    /// of every primary sale.
    pub fn create_event(&self, caller: &AccountId, request: NewEvent) -> Result<EventId> {
        inventory::validate_new_event(&request)?;

        let mut state = self.state.write();
        let event_id = state.next_event_id;

        for spec in &request.bulks {
            state.bulks.insert(
                (event_id, spec.ticket_type.clone()),
                TicketBulk {
                    event_id,
                    ticket_type: spec.ticket_type.clone(),
                    issued: spec.amount,
                    price: spec.price,
                    description: spec.description.clone(),
                    sold: 0,
                },
            );
        }

        state.events.insert(
            event_id,
            Event {
                id: event_id,
                name: request.name,
                description: request.description,
                start_time: request.start_time,
                end_time: request.end_time,
                creator: caller.clone(),
            },
        );
        state.next_event_id += 1;

        tracing::info!(event_id, creator = %caller, "event created");
        Ok(event_id)
    }

    /// Purchase tickets from an event's primary allocation
    ///
    /// Proceeds are split between the operator and the event creator; any
    /// overpayment is credited back to the buyer's pending balance.
    /// Returns the refund credited (zero for an exact payment).
    pub fn buy_new_tickets(
        &self,
        caller: &AccountId,
        event_id: EventId,
        ticket_type: &str,
        amount: Units,
        paid: Money,
    ) -> Result<Money> {
        let mut state = self.state.write();

        let creator = state.events.get(&event_id).map(|e| e.creator.clone()).ok_or_else(|| {
            Error::NotFound(format!("Event {event_id} does not exist"))
        })?;

        let key = (event_id, ticket_type.to_string());
        let bulk = state.bulks.get(&key).ok_or_else(|| {
            Error::NotFound(format!(
                "Event {event_id} has no ticket type '{ticket_type}'"
            ))
        })?;

        inventory::can_reserve(bulk, amount)?;
        let proceeds = sale_proceeds(amount, bulk.price)?;
        if paid < proceeds {
            return Err(Error::InsufficientPayment(format!(
                "Paid {paid} but {amount} tickets cost {proceeds}"
            )));
        }

        let split = state.commission.split(proceeds);
        let refund = paid - proceeds;

        // The credits are the only fallible mutation; apply them first so
        // the counter updates below cannot leave a partial transition.
        state.payouts.credit_all(&[
            (self.operator.clone(), split.fee),
            (creator, split.net),
            (caller.clone(), refund),
        ])?;

        state
            .bulks
            .get_mut(&key)
            .expect("bulk checked above")
            .sold += amount;
        state
            .holdings
            .entry((event_id, ticket_type.to_string(), caller.clone()))
            .or_default()
            .held_not_for_sale += amount;

        tracing::info!(
            event_id,
            ticket_type,
            amount,
            buyer = %caller,
            proceeds,
            fee = split.fee,
            refund,
            "primary purchase"
        );
        Ok(refund)
    }

    /// Create, replace, or remove the caller's resale listing for a bulk
    ///
    /// Units are reclassified between `held_not_for_sale` and
    /// `held_for_sale` so their sum is unchanged. Setting the amount to
    /// zero removes the listing.
    pub fn edit_tickets_bulk(
        &self,
        caller: &AccountId,
        event_id: EventId,
        ticket_type: &str,
        new_price: Money,
        new_amount_on_sale: Units,
    ) -> Result<()> {
        let mut state = self.state.write();

        if !state.bulks.contains_key(&(event_id, ticket_type.to_string())) {
            return Err(Error::NotFound(format!(
                "Event {event_id} has no ticket type '{ticket_type}'"
            )));
        }

        let key = (event_id, ticket_type.to_string(), caller.clone());
        let current = state.holdings.get(&key).cloned().unwrap_or_default();
        inventory::can_list_for_resale(&current, new_amount_on_sale)?;

        let total = current.total();
        if new_amount_on_sale == 0 {
            state.listings.remove(&key);
            if total == 0 {
                state.holdings.remove(&key);
            } else {
                let holding = state.holdings.get_mut(&key).expect("holding checked above");
                holding.held_not_for_sale = total;
                holding.held_for_sale = 0;
            }
        } else {
            let holding = state.holdings.get_mut(&key).expect("non-zero listing implies holding");
            holding.held_for_sale = new_amount_on_sale;
            holding.held_not_for_sale = total - new_amount_on_sale;
            state.listings.insert(
                key,
                ResaleListing {
                    event_id,
                    ticket_type: ticket_type.to_string(),
                    owner: caller.clone(),
                    price: new_price,
                    amount_on_sale: new_amount_on_sale,
                },
            );
        }

        tracing::info!(
            event_id,
            ticket_type,
            owner = %caller,
            amount_on_sale = new_amount_on_sale,
            "resale listing edited"
        );
        Ok(())
    }

    /// Purchase tickets from another account's active resale listing
    ///
    /// The listing-amount check and the holding decrement happen under one
    /// write lock, so no interleaving purchase can overdraw the listing.
    /// Returns the refund credited to the buyer.
    pub fn buy_resold_tickets(
        &self,
        caller: &AccountId,
        event_id: EventId,
        ticket_type: &str,
        seller: &AccountId,
        amount: Units,
        paid: Money,
    ) -> Result<Money> {
        if amount == 0 {
            return Err(Error::InvalidInput(
                "Ticket amount must be positive".to_string(),
            ));
        }

        let mut state = self.state.write();

        let key = (event_id, ticket_type.to_string(), seller.clone());
        let listing = state.listings.get(&key).ok_or_else(|| {
            Error::NotFound(format!(
                "No active listing by {seller} for ticket type '{ticket_type}' of event {event_id}"
            ))
        })?;

        if amount > listing.amount_on_sale {
            return Err(Error::InsufficientInventory(format!(
                "Requested {} resold tickets but only {} listed",
                amount, listing.amount_on_sale
            )));
        }

        let proceeds = sale_proceeds(amount, listing.price)?;
        if paid < proceeds {
            return Err(Error::InsufficientPayment(format!(
                "Paid {paid} but {amount} resold tickets cost {proceeds}"
            )));
        }

        let split = state.commission.split(proceeds);
        let refund = paid - proceeds;

        state.payouts.credit_all(&[
            (self.operator.clone(), split.fee),
            (seller.clone(), split.net),
            (caller.clone(), refund),
        ])?;

        // Listing check and holding decrement are one atomic step under
        // the write lock held since the lookup above.
        let listing = state.listings.get_mut(&key).expect("listing checked above");
        listing.amount_on_sale -= amount;
        let drained = listing.amount_on_sale == 0;
        if drained {
            state.listings.remove(&key);
        }

        let seller_holding = state.holdings.get_mut(&key).expect("listing implies holding");
        seller_holding.held_for_sale -= amount;
        if seller_holding.is_empty() {
            state.holdings.remove(&key);
        }

        state
            .holdings
            .entry((event_id, ticket_type.to_string(), caller.clone()))
            .or_default()
            .held_not_for_sale += amount;

        tracing::info!(
            event_id,
            ticket_type,
            amount,
            seller = %seller,
            buyer = %caller,
            proceeds,
            fee = split.fee,
            refund,
            listing_drained = drained,
            "resale purchase"
        );
        Ok(refund)
    }

    /// Withdraw the caller's full pending balance
    ///
    /// The balance is zeroed before the amount is returned for payout
    /// (pull-payment). A zero balance is a successful no-op.
    pub fn withdraw(&self, caller: &AccountId) -> Result<Money> {
        let amount = self.state.write().payouts.withdraw(caller);
        if amount > 0 {
            tracing::info!(account = %caller, amount, "pending balance withdrawn");
        }
        Ok(amount)
    }

    /// Withdraw the operator's accrued commission
    ///
    /// Same pull-payment mechanism as [`Market::withdraw`], restricted to
    /// the operator account.
    pub fn withdraw_operator_commission(&self, caller: &AccountId) -> Result<Money> {
        self.require_operator(caller)?;
        self.withdraw(&self.operator)
    }

    /// Change the global commission rate (operator only)
    pub fn set_commission_rate(&self, caller: &AccountId, rate_bps: u32) -> Result<()> {
        self.require_operator(caller)?;
        let policy = CommissionPolicy::new(rate_bps)?;
        self.state.write().commission = policy;
        tracing::info!(rate_bps, "commission rate changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read operations
    // ------------------------------------------------------------------

    /// All events, ordered by id
    pub fn list_events(&self) -> Vec<EventView> {
        self.state.read().events.values().map(EventView::from).collect()
    }

    /// Events created by the caller, ordered by id
    pub fn list_my_events(&self, caller: &AccountId) -> Vec<EventView> {
        self.state
            .read()
            .events
            .values()
            .filter(|e| &e.creator == caller)
            .map(EventView::from)
            .collect()
    }

    /// Remaining primary inventory for each bulk of an event
    pub fn available_tickets(&self, event_id: EventId) -> Result<Vec<TicketAvailability>> {
        let state = self.state.read();
        Self::require_event(&state, event_id)?;

        Ok(state
            .bulks
            .values()
            .filter(|b| b.event_id == event_id)
            .map(|b| TicketAvailability {
                ticket_type: b.ticket_type.clone(),
                price: b.price,
                available: inventory::available_for_sale(b),
                description: b.description.clone(),
            })
            .collect())
    }

    /// Active resale listings for an event
    pub fn resold_tickets(&self, event_id: EventId) -> Result<Vec<ResaleOffer>> {
        let state = self.state.read();
        Self::require_event(&state, event_id)?;

        Ok(state
            .listings
            .values()
            .filter(|l| l.event_id == event_id)
            .map(|l| ResaleOffer {
                ticket_type: l.ticket_type.clone(),
                owner: l.owner.clone(),
                price: l.price,
                amount_on_sale: l.amount_on_sale,
            })
            .collect())
    }

    /// All of the caller's ticket holdings across events
    pub fn tickets_for_owner(&self, caller: &AccountId) -> Vec<OwnedTickets> {
        self.state
            .read()
            .holdings
            .iter()
            .filter(|((_, _, owner), _)| owner == caller)
            .map(|((event_id, ticket_type, _), holding)| OwnedTickets {
                event_id: *event_id,
                ticket_type: ticket_type.clone(),
                held_not_for_sale: holding.held_not_for_sale,
                held_for_sale: holding.held_for_sale,
            })
            .collect()
    }

    /// Pending balance of an account
    pub fn pending_withdrawal(&self, account: &AccountId) -> Money {
        self.state.read().payouts.pending(account)
    }

    /// Accrued operator commission (operator only)
    pub fn operator_commission(&self, caller: &AccountId) -> Result<Money> {
        self.require_operator(caller)?;
        Ok(self.state.read().payouts.pending(&self.operator))
    }

    /// Sum of all pending balances, operator included
    ///
    /// Audit view: always equals total value paid into the market minus
    /// total value withdrawn.
    pub fn total_pending(&self) -> Money {
        self.state.read().payouts.total_pending()
    }

    /// Current commission rate in basis points
    pub fn commission_rate_bps(&self) -> u32 {
        self.state.read().commission.rate_bps()
    }

    // ------------------------------------------------------------------
    // Invariant audit
    // ------------------------------------------------------------------

    /// Check ticket conservation for one bulk
    ///
    /// Verifies that the units sold equal the sum of all owners' holdings
    /// and that the units marked for sale equal the sum of the active
    /// listing amounts. Every mutation must keep both equalities true.
    pub fn check_conservation(&self, event_id: EventId, ticket_type: &str) -> Result<bool> {
        let state = self.state.read();

        let bulk = state
            .bulks
            .get(&(event_id, ticket_type.to_string()))
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Event {event_id} has no ticket type '{ticket_type}'"
                ))
            })?;

        let mut held_total: Units = 0;
        let mut held_for_sale: Units = 0;
        for ((eid, tt, _), holding) in &state.holdings {
            if *eid == event_id && tt == ticket_type {
                held_total += holding.total();
                held_for_sale += holding.held_for_sale;
            }
        }

        let listed: Units = state
            .listings
            .iter()
            .filter(|((eid, tt, _), _)| *eid == event_id && tt == ticket_type)
            .map(|(_, l)| l.amount_on_sale)
            .sum();

        Ok(bulk.sold == held_total && held_for_sale == listed && bulk.sold <= bulk.issued)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_operator(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.operator {
            return Err(Error::Unauthorized(format!(
                "{caller} is not the marketplace operator"
            )));
        }
        Ok(())
    }

    fn require_event(state: &MarketState, event_id: EventId) -> Result<()> {
        if !state.events.contains_key(&event_id) {
            return Err(Error::NotFound(format!("Event {event_id} does not exist")));
        }
        Ok(())
    }
}

/// Gross proceeds of a sale, with overflow reported as invalid input
fn sale_proceeds(amount: Units, price: Money) -> Result<Money> {
    Money::from(amount)
        .checked_mul(price)
        .ok_or_else(|| Error::InvalidInput("Sale proceeds overflow".to_string()))
}
