//! Multi-Marketplace Sweep Simulation.
//!
//! Demonstrates the full trade-execution lifecycle including adapter
//! registration, fee configuration, mixed-venue batches, partial failure
//! handling and refund reconciliation.

use rust_decimal_macros::dec;
use sweep_core::*;

const OWNER: Address = Address(1);
const ENGINE: Address = Address(2);
const GATEWAY: Address = Address(3);
const FEE_RECIPIENT: Address = Address(9);
const SELLER: Address = Address(10);
const POOL_OWNER: Address = Address(12);
const BUYER: Address = Address(20);
const BAYC: Address = Address(30);
const POOL_COLL: Address = Address(40);
const USDC: Address = Address(99);

const LISTING: Address = Address(100);
const LISTING_SELECTOR: Selector = Selector(0x4091_ae2d);
const POOL: Address = Address(101);
const POOL_SELECTOR: Selector = Selector(0x96b5_a755);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Multi-Marketplace Sweep Engine Simulation");
    println!("Heterogeneous Venues, Single Batch, Full Reconciliation\n");

    scenario_1_multi_market_sweep();
    scenario_2_partial_sweep();
    scenario_3_atomic_revert();
    scenario_4_token_leg_sweep();

    println!("\nAll simulations completed successfully.");
}

/// Fresh engine with a listing venue and a swap pool registered.
fn demo_engine() -> Engine {
    let mut engine = Engine::new(OWNER, ENGINE, EngineConfig::default());
    engine.set_time(Timestamp::from_millis(1_000));

    engine
        .add_function(
            OWNER,
            Box::new(ListingMarket::new(LISTING, "listing")),
            LISTING_SELECTOR,
        )
        .unwrap();

    let mut pool_market = SwapPoolMarket::new(POOL, "swap-pool");
    pool_market.add_pool(
        POOL_COLL,
        Pool {
            owner: POOL_OWNER,
            spot_price: Amount::new(dec!(10)),
            delta: dec!(0.5),
        },
    );
    engine.add_function(OWNER, Box::new(pool_market), POOL_SELECTOR).unwrap();

    let ledger = engine.ledger_mut();
    ledger.register_collection(BAYC, CollectionKind::Erc721);
    ledger.register_collection(POOL_COLL, CollectionKind::Erc721);
    for id in [TokenId(2491), TokenId(6092)] {
        ledger.mint_asset(BAYC, id, SELLER, 1).unwrap();
    }
    for id in [TokenId(8167), TokenId(8168)] {
        ledger.mint_asset(POOL_COLL, id, POOL_OWNER, 1).unwrap();
    }
    ledger.mint_native(BUYER, Amount::new(dec!(600)));

    engine
}

fn listing_order(token_id: TokenId, price: Amount) -> CanonicalOrder {
    CanonicalOrder {
        signer: SELLER,
        recipient: BUYER,
        collection: BAYC,
        collection_kind: CollectionKind::Erc721,
        token_ids: vec![token_id],
        amounts: vec![1],
        price,
        currency: Currency::Native,
        start_time: Timestamp::from_millis(0),
        end_time: Timestamp::from_millis(0),
        signature: Bytes(vec![0x1b; 65]),
    }
}

fn listing_trade(token_id: TokenId, price: Amount) -> TradeDescriptor {
    TradeDescriptor {
        adapter: LISTING,
        selector: LISTING_SELECTOR,
        value: price,
        max_fee_bp: None,
        orders: vec![listing_order(token_id, price)],
        orders_extra_data: vec![Bytes::empty()],
        extra_data: Bytes::empty(),
        token_transfers: Vec::new(),
    }
}

fn pool_trade(token_id: TokenId, ceiling: Amount) -> TradeDescriptor {
    TradeDescriptor {
        adapter: POOL,
        selector: POOL_SELECTOR,
        value: ceiling,
        max_fee_bp: None,
        orders: vec![CanonicalOrder {
            signer: Address::ZERO,
            recipient: BUYER,
            collection: POOL_COLL,
            collection_kind: CollectionKind::Erc721,
            token_ids: vec![token_id],
            amounts: vec![1],
            price: ceiling,
            currency: Currency::Native,
            start_time: Timestamp::from_millis(0),
            end_time: Timestamp::from_millis(0),
            signature: Bytes::empty(),
        }],
        orders_extra_data: vec![Bytes::empty()],
        extra_data: Bytes::empty(),
        token_transfers: Vec::new(),
    }
}

/// Two venues, three trades, everything settles.
fn scenario_1_multi_market_sweep() {
    println!("Scenario 1: Multi-Market Sweep\n");

    let mut engine = demo_engine();

    let trades = vec![
        listing_trade(TokenId(2491), Amount::new(dec!(78.69))),
        listing_trade(TokenId(6092), Amount::new(dec!(81))),
        pool_trade(TokenId(8167), Amount::new(dec!(10))),
    ];
    let value: Amount = trades.iter().map(|t| t.value).sum();

    let result = engine
        .execute(BUYER, value, &[], &trades, BUYER, BUYER, false)
        .unwrap();

    println!("  Trades: {}, succeeded: {}", result.trade_count, result.success_count);
    println!("  Buyer BAYC holdings: {}", engine.ledger().holdings(BAYC, BUYER));
    println!("  Buyer pool holdings: {}", engine.ledger().holdings(POOL_COLL, BUYER));
    println!("  Refund: {}\n", result.refunded_native);
}

/// Duplicated batch: the second half fails because the assets are gone.
fn scenario_2_partial_sweep() {
    println!("Scenario 2: Partial Sweep\n");

    let mut engine = demo_engine();

    let mut trades = vec![
        listing_trade(TokenId(2491), Amount::new(dec!(78.69))),
        listing_trade(TokenId(6092), Amount::new(dec!(81))),
        pool_trade(TokenId(8167), Amount::new(dec!(10))),
    ];
    trades.extend(trades.clone());
    let value: Amount = trades.iter().map(|t| t.value).sum();

    let before = engine.ledger().native_balance(BUYER);
    let result = engine
        .execute(BUYER, value, &[], &trades, BUYER, BUYER, false)
        .unwrap();
    let after = engine.ledger().native_balance(BUYER);

    println!("  Trades: {}, succeeded: {}", result.trade_count, result.success_count);
    println!("  Buyer spent: {}", before.sub(after));
    println!("  Failed trades refunded: {}\n", result.refunded_native);
}

/// Same duplicated batch in atomic mode: everything unwinds.
fn scenario_3_atomic_revert() {
    println!("Scenario 3: Atomic Revert\n");

    let mut engine = demo_engine();

    let mut trades = vec![
        listing_trade(TokenId(2491), Amount::new(dec!(78.69))),
        pool_trade(TokenId(8167), Amount::new(dec!(10))),
    ];
    trades.extend(trades.clone());
    let value: Amount = trades.iter().map(|t| t.value).sum();

    let before = engine.ledger().native_balance(BUYER);
    let result = engine.execute(BUYER, value, &[], &trades, BUYER, BUYER, true);

    println!("  Batch reverted: {}", result.is_err());
    if let Err(err) = result {
        println!("  Error: {}", err);
    }
    println!(
        "  Buyer balance unchanged: {}",
        engine.ledger().native_balance(BUYER) == before
    );
    println!("  Buyer holdings: {}\n", engine.ledger().holdings(BAYC, BUYER));
}

/// Fungible-token settlement through the gateway, with a protocol fee.
fn scenario_4_token_leg_sweep() {
    println!("Scenario 4: Token-Leg Sweep via Gateway\n");

    let mut engine = demo_engine();
    let gateway = TokenGateway::new(GATEWAY);
    engine.set_gateway(OWNER, GATEWAY).unwrap();
    engine.set_fee(OWNER, LISTING, Bps(250), FEE_RECIPIENT).unwrap();
    engine.approve(OWNER, LISTING, USDC).unwrap();

    let price = Amount::new(dec!(95));
    engine.ledger_mut().mint_token(USDC, BUYER, Amount::new(dec!(100)));
    engine
        .ledger_mut()
        .approve(USDC, BUYER, GATEWAY, Amount::new(dec!(100)));

    let mut order = listing_order(TokenId(2491), price);
    order.currency = Currency::Token(USDC);
    let legs = vec![TokenTransfer::new(Amount::new(dec!(100)), USDC)];
    let trades = vec![
        TradeDescriptor {
            adapter: LISTING,
            selector: LISTING_SELECTOR,
            value: Amount::ZERO,
            max_fee_bp: None,
            orders: vec![order],
            orders_extra_data: vec![Bytes::empty()],
            extra_data: Bytes::empty(),
            token_transfers: legs.clone(),
        },
        // native leg in the same batch so the 250bp fee shows up
        listing_trade(TokenId(6092), Amount::new(dec!(81))),
    ];
    let value = Amount::new(dec!(81)).add(Amount::new(dec!(81)).mul(dec!(0.025)));

    let result = gateway
        .execute(&mut engine, BUYER, value, &legs, &trades, BUYER, false)
        .unwrap();

    println!("  Trades: {}, succeeded: {}", result.trade_count, result.success_count);
    println!("  Seller USDC: {}", engine.ledger().token_balance(USDC, SELLER));
    println!("  Buyer USDC returned: {}", engine.ledger().token_balance(USDC, BUYER));
    println!(
        "  Fee recipient native: {}",
        engine.ledger().native_balance(FEE_RECIPIENT)
    );
    println!(
        "  Gateway residue: {} (allowance revoked: {})\n",
        engine.ledger().token_balance(USDC, GATEWAY),
        engine
            .ledger()
            .allowance(USDC, GATEWAY, ENGINE)
            .is_zero()
    );
}
