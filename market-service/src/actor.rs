//! Actor-based concurrency for the market engine
//!
//! Implements the single-writer pattern using Tokio actors: every
//! mutating operation travels through one bounded mailbox to one task, so
//! callers across tasks observe a total order of mutations. Reads go
//! straight to the engine's shared lock and may run concurrently with the
//! actor (see [`crate::service::MarketService`]).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        Connectivity layer (out of scope here)         │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ typed operations
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               MarketHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              MarketActor (Single Task)                │
//! │        Market::buy_new_tickets() and friends          │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::metrics::Metrics;
use crate::{Error, Result};
use market_core::{AccountId, EventId, Market, Money, NewEvent, Units};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

type CoreResult<T> = market_core::Result<T>;

/// Message sent to the market actor
pub enum MarketMessage {
    /// Create an event with its primary bulks
    CreateEvent {
        /// Caller identity
        caller: AccountId,
        /// Event definition
        request: NewEvent,
        /// Reply channel
        response: oneshot::Sender<CoreResult<EventId>>,
    },

    /// Purchase from a primary allocation
    BuyNewTickets {
        /// Caller identity
        caller: AccountId,
        /// Event id
        event_id: EventId,
        /// Ticket type label
        ticket_type: String,
        /// Units to buy
        amount: Units,
        /// Payment supplied
        paid: Money,
        /// Reply channel (refund credited)
        response: oneshot::Sender<CoreResult<Money>>,
    },

    /// Create, replace, or remove the caller's resale listing
    EditTicketsBulk {
        /// Caller identity
        caller: AccountId,
        /// Event id
        event_id: EventId,
        /// Ticket type label
        ticket_type: String,
        /// New asking price per unit
        new_price: Money,
        /// New amount on sale (zero removes the listing)
        new_amount_on_sale: Units,
        /// Reply channel
        response: oneshot::Sender<CoreResult<()>>,
    },

    /// Purchase from another account's resale listing
    BuyResoldTickets {
        /// Caller identity
        caller: AccountId,
        /// Event id
        event_id: EventId,
        /// Ticket type label
        ticket_type: String,
        /// Selling account
        seller: AccountId,
        /// Units to buy
        amount: Units,
        /// Payment supplied
        paid: Money,
        /// Reply channel (refund credited)
        response: oneshot::Sender<CoreResult<Money>>,
    },

    /// Withdraw the caller's pending balance
    Withdraw {
        /// Caller identity
        caller: AccountId,
        /// Reply channel (amount paid out)
        response: oneshot::Sender<CoreResult<Money>>,
    },

    /// Withdraw the operator commission
    WithdrawOperatorCommission {
        /// Caller identity
        caller: AccountId,
        /// Reply channel (amount paid out)
        response: oneshot::Sender<CoreResult<Money>>,
    },

    /// Change the global commission rate
    SetCommissionRate {
        /// Caller identity
        caller: AccountId,
        /// New rate in basis points
        rate_bps: u32,
        /// Reply channel
        response: oneshot::Sender<CoreResult<()>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes market messages
pub struct MarketActor {
    /// The engine
    market: Arc<Market>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<MarketMessage>,

    /// Metrics collector
    metrics: Metrics,
}

impl MarketActor {
    /// Create new actor
    pub fn new(
        market: Arc<Market>,
        mailbox: mpsc::Receiver<MarketMessage>,
        metrics: Metrics,
    ) -> Self {
        Self {
            market,
            mailbox,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, MarketMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: MarketMessage) {
        let start = Instant::now();

        match msg {
            MarketMessage::CreateEvent {
                caller,
                request,
                response,
            } => {
                let result = self.market.create_event(&caller, request);
                self.observe(&result, |m| m.record_event_created());
                let _ = response.send(result);
            }

            MarketMessage::BuyNewTickets {
                caller,
                event_id,
                ticket_type,
                amount,
                paid,
                response,
            } => {
                let result =
                    self.market
                        .buy_new_tickets(&caller, event_id, &ticket_type, amount, paid);
                self.observe(&result, |m| m.record_primary_sale(amount));
                let _ = response.send(result);
            }

            MarketMessage::EditTicketsBulk {
                caller,
                event_id,
                ticket_type,
                new_price,
                new_amount_on_sale,
                response,
            } => {
                let result = self.market.edit_tickets_bulk(
                    &caller,
                    event_id,
                    &ticket_type,
                    new_price,
                    new_amount_on_sale,
                );
                self.observe(&result, |_| {});
                let _ = response.send(result);
            }

            MarketMessage::BuyResoldTickets {
                caller,
                event_id,
                ticket_type,
                seller,
                amount,
                paid,
                response,
            } => {
                let result = self.market.buy_resold_tickets(
                    &caller,
                    event_id,
                    &ticket_type,
                    &seller,
                    amount,
                    paid,
                );
                self.observe(&result, |m| m.record_resale(amount));
                let _ = response.send(result);
            }

            MarketMessage::Withdraw { caller, response } => {
                let result = self.market.withdraw(&caller);
                if let Ok(amount) = &result {
                    if *amount > 0 {
                        self.metrics.record_withdrawal();
                    }
                }
                let _ = response.send(result);
            }

            MarketMessage::WithdrawOperatorCommission { caller, response } => {
                let result = self.market.withdraw_operator_commission(&caller);
                if let Ok(amount) = &result {
                    if *amount > 0 {
                        self.metrics.record_withdrawal();
                    }
                }
                let _ = response.send(result);
            }

            MarketMessage::SetCommissionRate {
                caller,
                rate_bps,
                response,
            } => {
                let result = self.market.set_commission_rate(&caller, rate_bps);
                self.observe(&result, |_| {});
                let _ = response.send(result);
            }

            MarketMessage::Shutdown => {
                // Handled in main loop
            }
        }

        self.metrics
            .record_operation_duration(start.elapsed().as_secs_f64());
    }

    /// Record success metrics or the rejection counter
    fn observe<T>(&self, result: &CoreResult<T>, on_success: impl FnOnce(&Metrics)) {
        match result {
            Ok(_) => on_success(&self.metrics),
            Err(err) => {
                tracing::debug!(%err, "operation rejected");
                self.metrics.record_rejection();
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct MarketHandle {
    sender: mpsc::Sender<MarketMessage>,
}

impl MarketHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<MarketMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<CoreResult<T>>) -> MarketMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        let result = rx
            .await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?;
        Ok(result?)
    }

    /// Create an event
    pub async fn create_event(&self, caller: AccountId, request: NewEvent) -> Result<EventId> {
        self.request(|response| MarketMessage::CreateEvent {
            caller,
            request,
            response,
        })
        .await
    }

    /// Purchase from a primary allocation; returns the refund credited
    pub async fn buy_new_tickets(
        &self,
        caller: AccountId,
        event_id: EventId,
        ticket_type: impl Into<String>,
        amount: Units,
        paid: Money,
    ) -> Result<Money> {
        self.request(|response| MarketMessage::BuyNewTickets {
            caller,
            event_id,
            ticket_type: ticket_type.into(),
            amount,
            paid,
            response,
        })
        .await
    }

    /// Create, replace, or remove the caller's resale listing
    pub async fn edit_tickets_bulk(
        &self,
        caller: AccountId,
        event_id: EventId,
        ticket_type: impl Into<String>,
        new_price: Money,
        new_amount_on_sale: Units,
    ) -> Result<()> {
        self.request(|response| MarketMessage::EditTicketsBulk {
            caller,
            event_id,
            ticket_type: ticket_type.into(),
            new_price,
            new_amount_on_sale,
            response,
        })
        .await
    }

    /// Purchase from a resale listing; returns the refund credited
    pub async fn buy_resold_tickets(
        &self,
        caller: AccountId,
        event_id: EventId,
        ticket_type: impl Into<String>,
        seller: AccountId,
        amount: Units,
        paid: Money,
    ) -> Result<Money> {
        self.request(|response| MarketMessage::BuyResoldTickets {
            caller,
            event_id,
            ticket_type: ticket_type.into(),
            seller,
            amount,
            paid,
            response,
        })
        .await
    }

    /// Withdraw the caller's pending balance
    pub async fn withdraw(&self, caller: AccountId) -> Result<Money> {
        self.request(|response| MarketMessage::Withdraw { caller, response })
            .await
    }

    /// Withdraw the operator commission
    pub async fn withdraw_operator_commission(&self, caller: AccountId) -> Result<Money> {
        self.request(|response| MarketMessage::WithdrawOperatorCommission { caller, response })
            .await
    }

    /// Change the global commission rate (operator only)
    pub async fn set_commission_rate(&self, caller: AccountId, rate_bps: u32) -> Result<()> {
        self.request(|response| MarketMessage::SetCommissionRate {
            caller,
            rate_bps,
            response,
        })
        .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(MarketMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the market actor
pub fn spawn_market_actor(
    market: Arc<Market>,
    metrics: Metrics,
    mailbox_capacity: usize,
) -> MarketHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = MarketActor::new(market, rx, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    MarketHandle::new(tx)
}
