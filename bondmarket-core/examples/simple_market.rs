//! Simple prediction market example
//!
//! This example walks one binary market through its whole life: creation,
//! curation, trading on the bonding curve, an optimistic oracle report,
//! finalization and redemption.

use anyhow::Result;
use bondmarket_core::{
    utils::*, FactoryKind, MarketParams, Protocol, ProtocolConfig, NO, UNIT, YES,
};

#[tokio::main]
async fn main() -> Result<()> {
    println!("🎯 Simple Prediction Market Example");
    println!("═══════════════════════════════════\n");

    let start = parse_timestamp("2025-01-01T00:00:00Z")?;
    let end = parse_timestamp("2025-02-01T00:00:00Z")?;
    let deadline = parse_timestamp("2025-02-08T00:00:00Z")?;

    // 1. Deploy the protocol with the default adapters
    println!("1. Deploying the protocol...");
    let config = ProtocolConfig::default();
    let admin = config.admin;
    let mut protocol = Protocol::new(config)?;
    for adapter in protocol.adapters() {
        println!(
            "   {} adapter: bonds {} / {}, liveness {}s",
            adapter.config.category,
            format_amount(adapter.config.reporter_bond),
            format_amount(adapter.config.disputer_bond),
            adapter.config.liveness
        );
    }
    println!();

    // 2. The creator funds a binary market with L = 100
    println!("2. Creating a binary market...");
    let creator = Address::from_label("creator");
    protocol.deposit(creator, 1_000 * UNIT)?;
    let factory = protocol.factory(FactoryKind::Binary).address;
    protocol.approve(creator, factory, 100 * UNIT)?;

    let oracle_adapter = protocol
        .adapter("crypto")
        .map(|a| a.address)
        .ok_or_else(|| anyhow::anyhow!("crypto adapter missing"))?;
    let params = MarketParams {
        question: "Will it rain tomorrow in San Francisco?".to_string(),
        metadata_uri: "ipfs://sf-rain".to_string(),
        creator,
        oracle_adapter,
        fee_router: protocol.fees.address,
        market_key: MarketKey::from_label("sf-rain"),
        fee_bps: 100,
        liquidity: 100 * UNIT,
        start_time: start,
        end_time: end,
        resolution_deadline: deadline,
    };
    let (market_id, market) = protocol.create_binary(params, start)?;
    println!("   Market #{market_id} at {market}");
    println!("   Trading: {} → {}", format_timestamp(start), format_timestamp(end));
    println!();

    // 3. A council member approves it for display
    println!("3. Curating...");
    let curator = Address::from_label("curator");
    protocol.set_council_member(&admin, curator, true)?;
    protocol.approve_market(&curator, &market, start)?;
    println!("   Curation status: {}", protocol.status_of(&market)?);
    println!();

    // 4. Trade
    println!("4. Trading...");
    let alice = Address::from_label("alice");
    let bob = Address::from_label("bob");
    for trader in [alice, bob] {
        protocol.deposit(trader, 100 * UNIT)?;
        protocol.approve(trader, market, u128::MAX)?;
    }

    let quote = protocol.buy(&market, alice, YES, 10 * UNIT, 21 * UNIT, start + 60)?;
    println!(
        "   Alice buys 10 YES: cost {} + fee {} = {}",
        format_amount(quote.cost),
        format_amount(quote.fee),
        format_amount(quote.total)
    );
    let quote = protocol.buy(&market, bob, NO, 5 * UNIT, 11 * UNIT, start + 120)?;
    println!("   Bob buys 5 NO for {}", format_amount(quote.total));

    let m = protocol.market(&market)?;
    println!("   price(YES) = {}", format_amount(m.price(YES)?));
    println!("   price(NO)  = {}", format_amount(m.price(NO)?));
    let probabilities = m.implied_probabilities()?;
    println!(
        "   implied: YES {} / NO {}",
        format_amount(probabilities[YES]),
        format_amount(probabilities[NO])
    );
    println!("   Status: {}", m.get_status(start + 120));
    println!();

    // 5. Close and report
    println!("5. Closing and reporting...");
    protocol.close(&market, end)?;
    let reporter = Address::from_label("reporter");
    protocol.deposit(reporter, 100 * UNIT)?;
    protocol.report(reporter, &market, YES as i128, end + 60)?;
    println!("   Oracle status: {}", protocol.oracle_status(&market)?);

    let ready_at = protocol
        .adapter_for(&market)?
        .ready_at(&market)
        .unwrap_or(end);
    let resolution = protocol.finalize(&market, ready_at)?;
    println!("   Finalized at {}: {:?}", format_timestamp(ready_at), resolution);
    println!("   Status: {}", protocol.market(&market)?.get_status(ready_at));
    println!();

    // 6. Redeem
    println!("6. Redeeming...");
    for (name, holder) in [("Alice", alice), ("Bob", bob), ("Creator", creator)] {
        let paid = protocol.redeem(&market, holder)?;
        println!("   {name} receives {}", format_amount(paid));
    }
    let surplus = protocol.withdraw_surplus(&market, &creator)?;
    println!("   Creator withdraws surplus {}", format_amount(surplus));
    let fees = protocol.distribute_fees()?;
    println!("   Fees distributed to treasury: {}", format_amount(fees));
    println!();

    println!("✅ Example completed successfully!");
    println!(
        "   Collateral left in market: {}",
        format_amount(protocol.market(&market)?.collateral_held())
    );

    Ok(())
}
