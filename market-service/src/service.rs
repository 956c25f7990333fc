//! Service orchestration layer
//!
//! Ties together the engine, the actor, configuration, and metrics into a
//! high-level API. Mutations travel through the single-writer actor;
//! reads go straight to the engine's shared lock, so they run
//! concurrently with each other and observe only fully applied mutations.
//!
//! # Example
//!
//! ```no_run
//! use market_service::{Config, MarketService};
//!
//! #[tokio::main]
//! async fn main() -> market_service::Result<()> {
//!     let config = Config::default();
//!     let service = MarketService::new(config)?;
//!
//!     let events = service.list_events();
//!     assert!(events.is_empty());
//!
//!     service.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_market_actor, MarketHandle},
    metrics::Metrics,
    Config, Result,
};
use market_core::{
    AccountId, CommissionPolicy, EventId, EventView, Market, Money, NewEvent, OwnedTickets,
    ResaleOffer, TicketAvailability, Units,
};
use std::sync::Arc;

/// Main market service interface
pub struct MarketService {
    /// Actor handle for mutations
    handle: MarketHandle,

    /// Direct engine access (for reads)
    market: Arc<Market>,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl MarketService {
    /// Build the engine and spawn the actor from configuration
    pub fn new(config: Config) -> Result<Self> {
        let commission = CommissionPolicy::new(config.commission_rate_bps)?;
        let market = Arc::new(Market::new(
            AccountId::new(config.operator_account.clone()),
            commission,
        ));

        let metrics = Metrics::new()?;
        let handle = spawn_market_actor(market.clone(), metrics.clone(), config.mailbox_capacity);

        Ok(Self {
            handle,
            market,
            metrics,
            config,
        })
    }

    /// Clone of the actor handle for concurrent callers
    pub fn handle(&self) -> MarketHandle {
        self.handle.clone()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ------------------------------------------------------------------
    // Mutations (serialized through the actor)
    // ------------------------------------------------------------------

    /// Create an event
    pub async fn create_event(&self, caller: AccountId, request: NewEvent) -> Result<EventId> {
        self.handle.create_event(caller, request).await
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
        self.handle
            .buy_new_tickets(caller, event_id, ticket_type, amount, paid)
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
        self.handle
            .edit_tickets_bulk(caller, event_id, ticket_type, new_price, new_amount_on_sale)
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
        self.handle
            .buy_resold_tickets(caller, event_id, ticket_type, seller, amount, paid)
            .await
    }

    /// Withdraw the caller's pending balance
    pub async fn withdraw(&self, caller: AccountId) -> Result<Money> {
        self.handle.withdraw(caller).await
    }

    /// Withdraw the operator commission
    pub async fn withdraw_operator_commission(&self, caller: AccountId) -> Result<Money> {
        self.handle.withdraw_operator_commission(caller).await
    }

    /// Change the global commission rate (operator only)
    pub async fn set_commission_rate(&self, caller: AccountId, rate_bps: u32) -> Result<()> {
        self.handle.set_commission_rate(caller, rate_bps).await
    }

    // ------------------------------------------------------------------
    // Reads (concurrent, via the engine's shared lock)
    // ------------------------------------------------------------------

    /// All events
    pub fn list_events(&self) -> Vec<EventView> {
        self.market.list_events()
    }

    /// Events created by the caller
    pub fn list_my_events(&self, caller: &AccountId) -> Vec<EventView> {
        self.market.list_my_events(caller)
    }

    /// Remaining primary inventory for an event
    pub fn available_tickets(&self, event_id: EventId) -> Result<Vec<TicketAvailability>> {
        Ok(self.market.available_tickets(event_id)?)
    }

    /// Active resale listings for an event
    pub fn resold_tickets(&self, event_id: EventId) -> Result<Vec<ResaleOffer>> {
        Ok(self.market.resold_tickets(event_id)?)
    }

    /// The caller's ticket holdings
    pub fn tickets_for_owner(&self, caller: &AccountId) -> Vec<OwnedTickets> {
        self.market.tickets_for_owner(caller)
    }

    /// Pending balance of an account
    pub fn pending_withdrawal(&self, account: &AccountId) -> Money {
        self.market.pending_withdrawal(account)
    }

    /// Accrued operator commission (operator only)
    pub fn operator_commission(&self, caller: &AccountId) -> Result<Money> {
        Ok(self.market.operator_commission(caller)?)
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> Result<()> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::BulkSpec;

    fn vip_request() -> NewEvent {
        NewEvent {
            name: "Test Event".to_string(),
            description: "This is a test event".to_string(),
            start_time: 1_700_000_000,
            end_time: 1_700_003_600,
            bulks: vec![BulkSpec {
                ticket_type: "VIP".to_string(),
                amount: 10,
                price: 200,
                description: "VIP ticket".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_service_creation() {
        let service = MarketService::new(Config::default()).unwrap();
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_reads_reflect_actor_writes() {
        let service = MarketService::new(Config::default()).unwrap();
        let creator = AccountId::new("creator");

        let event_id = service
            .create_event(creator.clone(), vip_request())
            .await
            .unwrap();

        assert_eq!(service.list_events().len(), 1);
        assert_eq!(service.list_my_events(&creator).len(), 1);
        assert_eq!(
            service.available_tickets(event_id).unwrap()[0].available,
            10
        );

        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_commission_rate_from_config() {
        let config = Config {
            commission_rate_bps: 250,
            ..Default::default()
        };
        let service = MarketService::new(config).unwrap();
        let operator = AccountId::new("operator");
        let buyer = AccountId::new("buyer");

        let event_id = service
            .create_event(AccountId::new("creator"), vip_request())
            .await
            .unwrap();
        service
            .buy_new_tickets(buyer, event_id, "VIP", 4, 800)
            .await
            .unwrap();

        // 2.5% of 800
        assert_eq!(service.operator_commission(&operator).unwrap(), 20);

        service.shutdown().await.unwrap();
    }
}
