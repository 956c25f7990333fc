//! Property-based tests for marketplace ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Fee split exactness: fee + net == proceeds for every amount and rate
//! - Ticket conservation: sold == Σ(holdings) under random operations
//! - Value conservation: Σ(pending) == paid in - withdrawn
//! - Pull-payment idempotence: a second withdrawal returns zero
//! - Listing bound: amount on sale never exceeds the owner's holding

use market_core::{
    AccountId, BulkSpec, CommissionPolicy, Market, Money, NewEvent, Units,
};
use proptest::prelude::*;

const TICKET_PRICE: Money = 1_000;
const ISSUED: Units = 50;

/// Payment large enough to cover any purchase in the generated sequences;
/// the excess comes back as a refund and stays inside the ledger.
const GENEROUS_PAYMENT: Money = 1_000_000_000;

/// Strategy for generating commission rates in basis points
fn rate_strategy() -> impl Strategy<Value = u32> {
    0u32..=10_000
}

/// Strategy for generating sale proceeds
fn proceeds_strategy() -> impl Strategy<Value = Money> {
    prop_oneof![
        Just(0u128),
        0u128..1_000_000,
        0u128..1_000_000_000_000_000_000_000_000u128,
    ]
}

/// One random marketplace operation over a small fixed set of accounts
#[derive(Debug, Clone)]
enum Op {
    BuyNew { buyer: usize, amount: Units },
    List { owner: usize, amount: Units, price: Money },
    BuyResold { buyer: usize, seller: usize, amount: Units },
    Withdraw { account: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4, 1u64..8).prop_map(|(buyer, amount)| Op::BuyNew { buyer, amount }),
        (0usize..4, 0u64..8, 1u128..5_000).prop_map(|(owner, amount, price)| Op::List {
            owner,
            amount,
            price
        }),
        (0usize..4, 0usize..4, 1u64..8).prop_map(|(buyer, seller, amount)| Op::BuyResold {
            buyer,
            seller,
            amount
        }),
        (0usize..4).prop_map(|account| Op::Withdraw { account }),
    ]
}

fn accounts() -> Vec<AccountId> {
    (0..4).map(|i| AccountId::new(format!("account-{i}"))).collect()
}

fn market_with_event() -> (Market, u64) {
    let market = Market::new(AccountId::new("operator"), CommissionPolicy::default());
    let event_id = market
        .create_event(
            &AccountId::new("creator"),
            NewEvent {
                name: "Concert".to_string(),
                description: "Property test event".to_string(),
                start_time: 1_700_000_000,
                end_time: 1_700_007_200,
                bulks: vec![BulkSpec {
                    ticket_type: "GA".to_string(),
                    amount: ISSUED,
                    price: TICKET_PRICE,
                    description: "General admission".to_string(),
                }],
            },
        )
        .unwrap();
    (market, event_id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: fee + net == proceeds exactly, for every rate
    #[test]
    fn prop_fee_split_is_exact(proceeds in proceeds_strategy(), rate in rate_strategy()) {
        let policy = CommissionPolicy::new(rate).unwrap();
        let split = policy.split(proceeds);
        prop_assert_eq!(split.fee + split.net, proceeds);
    }

    /// Property: the fee is the floored share of the proceeds
    #[test]
    fn prop_fee_is_floored_share(proceeds in 0u128..1_000_000_000_000, rate in rate_strategy()) {
        let policy = CommissionPolicy::new(rate).unwrap();
        let split = policy.split(proceeds);
        prop_assert_eq!(split.fee, proceeds * Money::from(rate) / 10_000);
    }

    /// Property: buying k units at price u paying v >= k*u refunds exactly
    /// v - k*u and splits exactly k*u between operator and creator
    #[test]
    fn prop_overpayment_refund_is_exact(
        amount in 1u64..=10,
        price in 0u128..1_000_000_000,
        overpay in 0u128..1_000_000_000,
    ) {
        let market = Market::new(AccountId::new("operator"), CommissionPolicy::default());
        let creator = AccountId::new("creator");
        let buyer = AccountId::new("buyer");

        let event_id = market.create_event(&creator, NewEvent {
            name: "Show".to_string(),
            description: String::new(),
            start_time: 0,
            end_time: 0,
            bulks: vec![BulkSpec {
                ticket_type: "GA".to_string(),
                amount: 10,
                price,
                description: String::new(),
            }],
        }).unwrap();

        let proceeds = Money::from(amount) * price;
        let paid = proceeds + overpay;
        let refund = market.buy_new_tickets(&buyer, event_id, "GA", amount, paid).unwrap();

        prop_assert_eq!(refund, overpay);
        prop_assert_eq!(market.pending_withdrawal(&buyer), overpay);
        let operator_share = market.pending_withdrawal(&AccountId::new("operator"));
        let creator_share = market.pending_withdrawal(&creator);
        prop_assert_eq!(operator_share + creator_share, proceeds);
    }

    /// Property: conservation holds after any operation sequence
    ///
    /// Ticket side: sold == Σ(holdings) and Σ(held_for_sale) == Σ(listed).
    /// Money side: Σ(pending) == everything paid in minus everything
    /// withdrawn, no matter which operations were rejected along the way.
    #[test]
    fn prop_conservation_under_random_ops(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (market, event_id) = market_with_event();
        let accounts = accounts();

        let mut paid_in: Money = 0;
        let mut withdrawn: Money = 0;

        for op in ops {
            match op {
                Op::BuyNew { buyer, amount } => {
                    if market
                        .buy_new_tickets(&accounts[buyer], event_id, "GA", amount, GENEROUS_PAYMENT)
                        .is_ok()
                    {
                        paid_in += GENEROUS_PAYMENT;
                    }
                }
                Op::List { owner, amount, price } => {
                    let _ = market.edit_tickets_bulk(&accounts[owner], event_id, "GA", price, amount);
                }
                Op::BuyResold { buyer, seller, amount } => {
                    if market
                        .buy_resold_tickets(
                            &accounts[buyer],
                            event_id,
                            "GA",
                            &accounts[seller],
                            amount,
                            GENEROUS_PAYMENT,
                        )
                        .is_ok()
                    {
                        paid_in += GENEROUS_PAYMENT;
                    }
                }
                Op::Withdraw { account } => {
                    withdrawn += market.withdraw(&accounts[account]).unwrap();
                }
            }

            prop_assert!(market.check_conservation(event_id, "GA").unwrap());
            prop_assert_eq!(market.total_pending(), paid_in - withdrawn);
        }
    }

    /// Property: a withdrawal pays at most what was credited, and a second
    /// withdrawal immediately after returns zero
    #[test]
    fn prop_withdraw_idempotence(purchases in prop::collection::vec(1u64..5, 1..6)) {
        let (market, event_id) = market_with_event();
        let buyer = AccountId::new("account-0");

        let mut credited: Money = 0;
        for amount in purchases {
            let overpaid = Money::from(amount) * TICKET_PRICE + 17;
            if let Ok(refund) = market.buy_new_tickets(&buyer, event_id, "GA", amount, overpaid) {
                credited += refund;
            }
        }

        let first = market.withdraw(&buyer).unwrap();
        let second = market.withdraw(&buyer).unwrap();

        prop_assert_eq!(first, credited);
        prop_assert_eq!(second, 0);
    }

    /// Property: a listing never exceeds the owner's holding, whatever
    /// amount the edit requests
    #[test]
    fn prop_listing_bound(held in 1u64..=20, requested in 0u64..=40) {
        let (market, event_id) = market_with_event();
        let owner = AccountId::new("account-0");

        market
            .buy_new_tickets(&owner, event_id, "GA", held, Money::from(held) * TICKET_PRICE)
            .unwrap();

        let result = market.edit_tickets_bulk(&owner, event_id, "GA", TICKET_PRICE, requested);
        prop_assert_eq!(result.is_ok(), requested <= held);

        let offers = market.resold_tickets(event_id).unwrap();
        let listed: Units = offers.iter().map(|o| o.amount_on_sale).sum();
        prop_assert!(listed <= held);
        prop_assert!(market.check_conservation(event_id, "GA").unwrap());
    }
}
