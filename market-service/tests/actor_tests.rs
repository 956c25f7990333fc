//! Concurrency tests for the market actor
//!
//! Many tasks hammer the same bulk, listing, or balance through cloned
//! handles; afterwards the ledger must show no oversell, no listing
//! overdraw, and no double payout.

use market_core::{AccountId, BulkSpec, Money, NewEvent, Units};
use market_service::{Config, MarketService};

const PRICE: Money = 1_000;

fn event_with_bulk(amount: Units) -> NewEvent {
    NewEvent {
        name: "Stress Event".to_string(),
        description: "Concurrency test event".to_string(),
        start_time: 1_700_000_000,
        end_time: 1_700_007_200,
        bulks: vec![BulkSpec {
            ticket_type: "GA".to_string(),
            amount,
            price: PRICE,
            description: "General admission".to_string(),
        }],
    }
}

#[tokio::test]
async fn concurrent_primary_purchases_never_oversell() {
    let service = MarketService::new(Config::default()).unwrap();
    let event_id = service
        .create_event(AccountId::new("creator"), event_with_bulk(10))
        .await
        .unwrap();

    // 25 buyers race for 10 tickets, one each
    let mut tasks = Vec::new();
    for i in 0..25 {
        let handle = service.handle();
        tasks.push(tokio::spawn(async move {
            handle
                .buy_new_tickets(AccountId::new(format!("buyer-{i}")), event_id, "GA", 1, PRICE)
                .await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(service.available_tickets(event_id).unwrap()[0].available, 0);
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_resale_purchases_never_overdraw_listing() {
    let service = MarketService::new(Config::default()).unwrap();
    let seller = AccountId::new("seller");
    let event_id = service
        .create_event(AccountId::new("creator"), event_with_bulk(20))
        .await
        .unwrap();

    service
        .buy_new_tickets(seller.clone(), event_id, "GA", 8, 8 * PRICE)
        .await
        .unwrap();
    service
        .edit_tickets_bulk(seller.clone(), event_id, "GA", 2 * PRICE, 5)
        .await
        .unwrap();

    // 12 buyers race for the 5 listed tickets
    let mut tasks = Vec::new();
    for i in 0..12 {
        let handle = service.handle();
        let seller = seller.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .buy_resold_tickets(
                    AccountId::new(format!("buyer-{i}")),
                    event_id,
                    "GA",
                    seller,
                    1,
                    2 * PRICE,
                )
                .await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    // Listing fully drained and removed
    assert!(service.resold_tickets(event_id).unwrap().is_empty());

    let seller_tickets = service.tickets_for_owner(&seller);
    assert_eq!(seller_tickets[0].held_not_for_sale, 3);
    assert_eq!(seller_tickets[0].held_for_sale, 0);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_withdrawals_pay_out_at_most_once() {
    let service = MarketService::new(Config::default()).unwrap();
    let buyer = AccountId::new("buyer");
    let event_id = service
        .create_event(AccountId::new("creator"), event_with_bulk(10))
        .await
        .unwrap();

    // Overpay so the buyer accrues a refund of 3 * PRICE
    service
        .buy_new_tickets(buyer.clone(), event_id, "GA", 2, 5 * PRICE)
        .await
        .unwrap();
    assert_eq!(service.pending_withdrawal(&buyer), 3 * PRICE);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = service.handle();
        let buyer = buyer.clone();
        tasks.push(tokio::spawn(
            async move { handle.withdraw(buyer).await },
        ));
    }

    let mut total_paid: Money = 0;
    for task in tasks {
        total_paid += task.await.unwrap().unwrap();
    }

    // Exactly one withdrawal saw the balance; the rest were no-ops
    assert_eq!(total_paid, 3 * PRICE);
    assert_eq!(service.pending_withdrawal(&buyer), 0);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn read_after_write_consistency_through_the_handle() {
    let service = MarketService::new(Config::default()).unwrap();
    let buyer = AccountId::new("buyer");
    let event_id = service
        .create_event(AccountId::new("creator"), event_with_bulk(10))
        .await
        .unwrap();

    for bought in 1..=5u64 {
        service
            .buy_new_tickets(buyer.clone(), event_id, "GA", 1, PRICE)
            .await
            .unwrap();

        // Every read after a completed mutation reflects it
        let available = service.available_tickets(event_id).unwrap()[0].available;
        assert_eq!(available, 10 - bought);
        let owned = &service.tickets_for_owner(&buyer)[0];
        assert_eq!(owned.held_not_for_sale, bought);
    }

    service.shutdown().await.unwrap();
}
