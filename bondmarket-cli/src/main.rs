//! # Bondmarket CLI
//!
//! Command-line interface for creating, trading and settling bonding-curve
//! prediction markets. All protocol state lives in a JSON file that every
//! command loads, updates and writes back only when the command succeeds.

use anyhow::{bail, Context, Result};
use bondmarket_core::{
    utils::*, FactoryKind, Market, MarketParams, MarketVariant, Protocol, ProtocolConfig,
    Party, Resolution, Ruling, LONG, NO, SHORT, UNIT, YES,
};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bondmarket")]
#[command(about = "Bonding-curve prediction markets with optimistic oracle settlement")]
#[command(version)]
struct Cli {
    /// Protocol state file
    #[arg(long, global = true, default_value = "bondmarket.json")]
    state: PathBuf,
    /// Pin the clock (Unix seconds or RFC 3339) instead of using the system time
    #[arg(long, global = true, value_parser = timestamp_arg)]
    now: Option<u64>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a fresh protocol into the state file
    Init {
        /// JSON protocol configuration (defaults to the crypto/sports/trends presets)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overwrite an existing state file without asking
        #[arg(long)]
        force: bool,
    },
    /// Wrap native value into collateral
    Wrap {
        #[arg(long = "as")]
        actor: String,
        #[arg(value_parser = amount_arg)]
        amount: u128,
    },
    /// Unwrap collateral back into native value
    Unwrap {
        #[arg(long = "as")]
        actor: String,
        #[arg(value_parser = amount_arg)]
        amount: u128,
    },
    /// Show collateral and share balances
    Balance {
        /// Account label or 0x address
        account: String,
        /// Also show outcome shares in this market
        #[arg(short, long)]
        market: Option<String>,
    },
    /// Create a YES/NO market
    CreateBinary(CreateArgs),
    /// Create a market with one outcome per label
    CreateMulti {
        #[command(flatten)]
        create: CreateArgs,
        /// Outcome labels, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        outcomes: Vec<String>,
    },
    /// Create a LONG/SHORT market over a numeric range
    CreateScalar {
        #[command(flatten)]
        create: CreateArgs,
        #[arg(long, allow_hyphen_values = true)]
        lower: i128,
        #[arg(long, allow_hyphen_values = true)]
        upper: i128,
    },
    /// Quote a trade without executing it
    Quote {
        market: String,
        outcome: String,
        #[arg(value_parser = amount_arg)]
        shares: u128,
        /// Quote a sell instead of a buy
        #[arg(long)]
        sell: bool,
    },
    /// Buy outcome shares
    Buy {
        #[arg(long = "as")]
        actor: String,
        market: String,
        outcome: String,
        #[arg(value_parser = amount_arg)]
        shares: u128,
        /// Reject the trade if it costs more than this, fee included
        #[arg(long, value_parser = amount_arg)]
        max_cost: Option<u128>,
    },
    /// Sell outcome shares back to the curve
    Sell {
        #[arg(long = "as")]
        actor: String,
        market: String,
        outcome: String,
        #[arg(value_parser = amount_arg)]
        shares: u128,
        /// Reject the trade if it pays less than this, after fees
        #[arg(long, value_parser = amount_arg, default_value = "0")]
        min_payout: u128,
    },
    /// Close a market whose trading window has ended
    Close { market: String },
    /// Post a bonded report for a closed market
    Report {
        #[arg(long = "as")]
        actor: String,
        market: String,
        /// Outcome index, yes/no/long/short, or a scalar value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Dispute the live report of a market
    Dispute {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Finalize an undisputed report after liveness and resolve the market
    Finalize { market: String },
    /// Record the arbiter's ruling on a disputed market
    Rule {
        #[arg(long = "as")]
        actor: String,
        market: String,
        /// Final value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// The disputer wins the bonds (otherwise the reporter does)
        #[arg(long)]
        overturn: bool,
    },
    /// Apply the arbiter's ruling and resolve a disputed market
    Adjudicate { market: String },
    /// Redeem every share held in a resolved market
    Redeem {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Withdraw the liquidity provider's surplus from a resolved market
    WithdrawSurplus {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Approve a pending market for display
    Approve {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Flag a market
    Flag {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Send a flagged market back to review
    Reset {
        #[arg(long = "as")]
        actor: String,
        market: String,
    },
    /// Add or remove a council member
    Council {
        #[arg(long = "as")]
        actor: String,
        member: String,
        /// Remove instead of add
        #[arg(long)]
        remove: bool,
    },
    /// Authorize or revoke a factory on an oracle adapter
    SetFactory {
        #[arg(long = "as")]
        actor: String,
        category: String,
        /// binary, multi or scalar
        factory: String,
        #[arg(long)]
        revoke: bool,
    },
    /// Send accrued trading fees to the fee recipient
    DistributeFees,
    /// Show market information
    Info { market: String },
    /// List all markets
    List,
    /// Print the default protocol configuration
    DefaultConfig,
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long = "as")]
    actor: String,
    #[arg(short, long)]
    question: String,
    /// Unique market key (any text; hashed to 32 bytes)
    #[arg(short, long)]
    key: String,
    /// Oracle adapter category
    #[arg(long, default_value = "crypto")]
    category: String,
    #[arg(long, default_value = "")]
    metadata: String,
    /// Trading fee in basis points
    #[arg(long, default_value_t = 100)]
    fee_bps: u16,
    /// Liquidity parameter L
    #[arg(long, value_parser = amount_arg, default_value = "100")]
    liquidity: u128,
    /// Trading opens (defaults to now)
    #[arg(long, value_parser = timestamp_arg)]
    start: Option<u64>,
    #[arg(long, value_parser = timestamp_arg)]
    end: u64,
    #[arg(long, value_parser = timestamp_arg)]
    deadline: u64,
}

fn amount_arg(text: &str) -> std::result::Result<u128, String> {
    parse_amount(text).map_err(|e| e.to_string())
}

fn timestamp_arg(text: &str) -> std::result::Result<u64, String> {
    parse_timestamp(text).map_err(|e| e.to_string())
}

/// An account given as a `0x` address or as a label hashed into one.
fn parse_account(text: &str) -> Result<Address> {
    if text.starts_with("0x") {
        return text
            .parse()
            .with_context(|| format!("invalid address {text}"));
    }
    Ok(Address::from_label(text))
}

/// A market given as a `0x` address or as `<binary|multi|scalar>:<id>`.
fn resolve_market(protocol: &Protocol, text: &str) -> Result<Address> {
    if let Some((kind, id)) = text.split_once(':') {
        let id: u64 = id.parse().with_context(|| format!("invalid market id in {text}"))?;
        return Ok(protocol.factory(parse_kind(kind)?).market_of(id)?);
    }
    let address: Address = text
        .parse()
        .with_context(|| format!("invalid market reference {text}"))?;
    protocol.market(&address)?;
    Ok(address)
}

fn parse_kind(text: &str) -> Result<FactoryKind> {
    match text.to_lowercase().as_str() {
        "binary" => Ok(FactoryKind::Binary),
        "multi" => Ok(FactoryKind::Multi),
        "scalar" => Ok(FactoryKind::Scalar),
        other => bail!("unknown market kind {other:?} (expected binary, multi or scalar)"),
    }
}

/// Outcome index from a number, a binary/scalar side name or a multi label.
fn parse_outcome(market: &Market, text: &str) -> Result<usize> {
    if let Ok(index) = text.parse::<usize>() {
        return Ok(index);
    }
    let lower = text.to_lowercase();
    let named = match (&market.variant, lower.as_str()) {
        (MarketVariant::Binary, "yes") => Some(YES),
        (MarketVariant::Binary, "no") => Some(NO),
        (MarketVariant::Scalar { .. }, "long") => Some(LONG),
        (MarketVariant::Scalar { .. }, "short") => Some(SHORT),
        (MarketVariant::Multi { labels }, _) => labels.iter().position(|l| l.to_lowercase() == lower),
        _ => None,
    };
    named.with_context(|| format!("unknown outcome {text:?}"))
}

/// A reported value: a scalar number, or an outcome for the other variants.
fn parse_value(market: &Market, text: &str) -> Result<i128> {
    match market.variant {
        MarketVariant::Scalar { .. } => text
            .parse()
            .with_context(|| format!("invalid scalar value {text}")),
        _ => Ok(parse_outcome(market, text)? as i128),
    }
}

async fn load(path: &Path) -> Result<Protocol> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read state file {} (run `bondmarket init` first)", path.display()))?;
    Protocol::from_json(&json).with_context(|| format!("corrupt state file {}", path.display()))
}

async fn save(path: &Path, protocol: &Protocol) -> Result<()> {
    let json = protocol.to_json()?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write state file {}", path.display()))?;
    debug!(path = %path.display(), "state saved");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn divider() {
    println!("{}", "═".repeat(50).bright_black());
}

fn print_market(protocol: &Protocol, market: &Market, now: u64) -> Result<()> {
    divider();
    println!("{}: {}", "Market".yellow().bold(), market.address.to_string().cyan());
    println!("{}: {}", "Question".yellow().bold(), market.question);
    println!("{}: {} #{}", "Variant".yellow().bold(), market.variant.tag(), market.market_id);
    if let MarketVariant::Scalar {
        lower_bound,
        upper_bound,
    } = market.variant
    {
        println!("{}: [{lower_bound}, {upper_bound}]", "Range".yellow().bold());
    }
    println!("{}: {}", "Status".yellow().bold(), market.get_status(now));
    println!("{}: {}", "Curation".yellow().bold(), protocol.status_of(&market.address)?);
    println!("{}: {}", "Oracle".yellow().bold(), protocol.oracle_status(&market.address)?);
    println!(
        "{}: {} → {} (deadline {})",
        "Trading".yellow().bold(),
        format_timestamp(market.start_time),
        format_timestamp(market.end_time),
        format_timestamp(market.resolution_deadline)
    );
    println!(
        "{}: L = {}, fee {} bps",
        "Liquidity".yellow().bold(),
        format_amount(market.liquidity()),
        market.fee_bps
    );
    println!("{}: {}", "Collateral held".yellow().bold(), format_amount(market.collateral_held()));

    let prices = market.prices()?;
    let probabilities = market.implied_probabilities()?;
    for k in 0..market.outcome_count() {
        println!(
            "  {:<10} supply {:>14}  price {:>10}  implied {:>8}",
            market.variant.outcome_label(k).unwrap_or_default().bold(),
            format_amount(market.supplies()[k]),
            format_amount(prices[k]),
            format_amount(probabilities[k])
        );
    }
    if let Some(settlement) = market.settlement() {
        println!(
            "{}: claims {}, payout factor {}, surplus {}{}",
            "Settlement".green().bold(),
            format_amount(settlement.claims),
            format_amount(settlement.payout_factor),
            format_amount(settlement.surplus),
            if settlement.surplus_withdrawn { " (withdrawn)" } else { "" }
        );
    }
    divider();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let now = cli.now.unwrap_or_else(now_unix);
    let path = cli.state.as_path();

    match cli.command {
        Commands::Init { config, force } => {
            if path.exists() && !force {
                let overwrite = inquire::Confirm::new(&format!(
                    "{} already exists. Overwrite it?",
                    path.display()
                ))
                .with_default(false)
                .prompt()?;
                if !overwrite {
                    println!("{}", "Aborted.".yellow());
                    return Ok(());
                }
            }
            let config = match config {
                Some(file) => {
                    let json = tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("failed to read config {}", file.display()))?;
                    ProtocolConfig::from_json(&json)?
                }
                None => ProtocolConfig::default(),
            };
            let protocol = Protocol::new(config)?;
            save(path, &protocol).await?;

            println!("{}", "Protocol deployed".green().bold());
            divider();
            println!("{}: {}", "Admin".yellow().bold(), protocol.config.admin);
            println!("{}: {}", "Fee router".yellow().bold(), protocol.fees.address);
            for factory in protocol.factories() {
                println!("{}: {}", format!("{} factory", factory.kind).yellow().bold(), factory.address);
            }
            for adapter in protocol.adapters() {
                println!(
                    "{}: {} (bonds {}/{}, liveness {}s)",
                    format!("{} adapter", adapter.config.category).yellow().bold(),
                    adapter.address,
                    format_amount(adapter.config.reporter_bond),
                    format_amount(adapter.config.disputer_bond),
                    adapter.config.liveness
                );
            }
            divider();
        }

        Commands::DefaultConfig => {
            println!("{}", ProtocolConfig::default().to_json()?);
        }

        Commands::Wrap { actor, amount } => {
            let mut protocol = load(path).await?;
            let owner = parse_account(&actor)?;
            protocol.deposit(owner, amount)?;
            save(path, &protocol).await?;
            println!(
                "{}: {} {} for {}",
                "Wrapped".green().bold(),
                format_amount(amount),
                protocol.collateral.symbol,
                owner
            );
        }

        Commands::Unwrap { actor, amount } => {
            let mut protocol = load(path).await?;
            let owner = parse_account(&actor)?;
            protocol.withdraw(owner, amount)?;
            save(path, &protocol).await?;
            println!("{}: {} for {}", "Unwrapped".green().bold(), format_amount(amount), owner);
        }

        Commands::Balance { account, market } => {
            let protocol = load(path).await?;
            let owner = parse_account(&account)?;
            println!(
                "{}: {} {}",
                owner.to_string().cyan(),
                format_amount(protocol.collateral.balance_of(&owner)),
                protocol.collateral.symbol
            );
            if let Some(market) = market {
                let address = resolve_market(&protocol, &market)?;
                let m = protocol.market(&address)?;
                for (k, balance) in protocol.tokens.balances_of(&address, &owner).iter().enumerate() {
                    println!(
                        "  {:<10} {}",
                        m.variant.outcome_label(k).unwrap_or_default(),
                        format_amount(*balance)
                    );
                }
                if m.settlement().is_some() {
                    println!(
                        "  {} {}",
                        "redeemable".green(),
                        format_amount(m.redeemable(&protocol.tokens, &owner)?)
                    );
                }
            }
        }

        Commands::CreateBinary(args) => {
            create(path, args, MarketVariant::Binary, now).await?;
        }

        Commands::CreateMulti { create: args, outcomes } => {
            let labels = outcomes.into_iter().map(|s| s.trim().to_string()).collect();
            create(path, args, MarketVariant::Multi { labels }, now).await?;
        }

        Commands::CreateScalar { create: args, lower, upper } => {
            let variant = MarketVariant::Scalar {
                lower_bound: lower,
                upper_bound: upper,
            };
            create(path, args, variant, now).await?;
        }

        Commands::Quote {
            market,
            outcome,
            shares,
            sell,
        } => {
            let protocol = load(path).await?;
            let address = resolve_market(&protocol, &market)?;
            let m = protocol.market(&address)?;
            let outcome = parse_outcome(m, &outcome)?;
            let quote = if sell {
                m.quote_sell(outcome, shares)?
            } else {
                m.quote_buy(outcome, shares)?
            };
            println!(
                "{} {} {}: cost {} fee {} → {} {}",
                (if sell { "Sell" } else { "Buy" }).bold(),
                format_amount(shares),
                m.variant.outcome_label(outcome).unwrap_or_default(),
                format_amount(quote.cost),
                format_amount(quote.fee),
                if sell { "receive" } else { "pay" },
                format_amount(quote.total).cyan()
            );
        }

        Commands::Buy {
            actor,
            market,
            outcome,
            shares,
            max_cost,
        } => {
            let mut protocol = load(path).await?;
            let trader = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let m = protocol.market(&address)?;
            let outcome = parse_outcome(m, &outcome)?;
            let quote = m.quote_buy(outcome, shares)?;
            // wallet-style approve-then-buy for exactly the quoted amount
            protocol.approve(trader, address, quote.total)?;
            let quote = protocol.buy(&address, trader, outcome, shares, max_cost.unwrap_or(u128::MAX), now)?;
            save(path, &protocol).await?;
            println!(
                "{}: {} shares of outcome {} for {} (fee {})",
                "Bought".green().bold(),
                format_amount(shares),
                outcome,
                format_amount(quote.total),
                format_amount(quote.fee)
            );
        }

        Commands::Sell {
            actor,
            market,
            outcome,
            shares,
            min_payout,
        } => {
            let mut protocol = load(path).await?;
            let trader = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let outcome = parse_outcome(protocol.market(&address)?, &outcome)?;
            let quote = protocol.sell(&address, trader, outcome, shares, min_payout, now)?;
            save(path, &protocol).await?;
            println!(
                "{}: {} shares of outcome {} for {} (fee {})",
                "Sold".green().bold(),
                format_amount(shares),
                outcome,
                format_amount(quote.total),
                format_amount(quote.fee)
            );
        }

        Commands::Close { market } => {
            let mut protocol = load(path).await?;
            let address = resolve_market(&protocol, &market)?;
            protocol.close(&address, now)?;
            save(path, &protocol).await?;
            println!("{}: {}", "Closed".green().bold(), address);
        }

        Commands::Report { actor, market, value } => {
            let mut protocol = load(path).await?;
            let reporter = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let value = parse_value(protocol.market(&address)?, &value)?;
            protocol.report(reporter, &address, value, now)?;
            save(path, &protocol).await?;
            let adapter = protocol.adapter_for(&address)?;
            println!(
                "{}: value {} bonded with {}, disputable until {}",
                "Reported".green().bold(),
                value,
                format_amount(adapter.config.reporter_bond),
                format_timestamp(adapter.ready_at(&address).unwrap_or(now))
            );
        }

        Commands::Dispute { actor, market } => {
            let mut protocol = load(path).await?;
            let disputer = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            protocol.dispute(disputer, &address, now)?;
            save(path, &protocol).await?;
            println!("{}: {} awaits adjudication", "Disputed".yellow().bold(), address);
        }

        Commands::Finalize { market } => {
            let mut protocol = load(path).await?;
            let address = resolve_market(&protocol, &market)?;
            let resolution = protocol.finalize(&address, now)?;
            save(path, &protocol).await?;
            print_resolution(&protocol, &address, resolution)?;
        }

        Commands::Rule {
            actor,
            market,
            value,
            overturn,
        } => {
            let mut protocol = load(path).await?;
            let arbiter = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let value = parse_value(protocol.market(&address)?, &value)?;
            let ruling = if overturn {
                Ruling::overturn(value)
            } else {
                Ruling {
                    final_value: value,
                    bond_winner: Party::Reporter,
                }
            };
            protocol.rule(&arbiter, &address, ruling)?;
            save(path, &protocol).await?;
            println!("{}: {:?} for {}", "Ruling recorded".green().bold(), ruling, address);
        }

        Commands::Adjudicate { market } => {
            let mut protocol = load(path).await?;
            let address = resolve_market(&protocol, &market)?;
            let resolution = protocol.settle_dispute(&address, now)?;
            save(path, &protocol).await?;
            print_resolution(&protocol, &address, resolution)?;
        }

        Commands::Redeem { actor, market } => {
            let mut protocol = load(path).await?;
            let holder = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let paid = protocol.redeem(&address, holder)?;
            save(path, &protocol).await?;
            println!("{}: {} paid to {}", "Redeemed".green().bold(), format_amount(paid), holder);
        }

        Commands::WithdrawSurplus { actor, market } => {
            let mut protocol = load(path).await?;
            let caller = parse_account(&actor)?;
            let address = resolve_market(&protocol, &market)?;
            let amount = protocol.withdraw_surplus(&address, &caller)?;
            save(path, &protocol).await?;
            println!("{}: {}", "Surplus withdrawn".green().bold(), format_amount(amount));
        }

        Commands::Approve { actor, market } => {
            curate(path, &actor, &market, now, Protocol::approve_market).await?;
        }

        Commands::Flag { actor, market } => {
            curate(path, &actor, &market, now, Protocol::flag_market).await?;
        }

        Commands::Reset { actor, market } => {
            curate(path, &actor, &market, now, Protocol::reset_market).await?;
        }

        Commands::Council {
            actor,
            member,
            remove,
        } => {
            let mut protocol = load(path).await?;
            let caller = parse_account(&actor)?;
            let member = parse_account(&member)?;
            protocol.set_council_member(&caller, member, !remove)?;
            save(path, &protocol).await?;
            let verb = if remove { "removed from" } else { "added to" };
            println!("{} {verb} the council", member.to_string().cyan());
        }

        Commands::SetFactory {
            actor,
            category,
            factory,
            revoke,
        } => {
            let mut protocol = load(path).await?;
            let caller = parse_account(&actor)?;
            let factory = protocol.factory(parse_kind(&factory)?).address;
            protocol.set_factory(&caller, &category, factory, !revoke)?;
            save(path, &protocol).await?;
            let verb = if revoke { "revoked on" } else { "authorized on" };
            println!("Factory {factory} {verb} the {category} adapter");
        }

        Commands::DistributeFees => {
            let mut protocol = load(path).await?;
            let amount = protocol.distribute_fees()?;
            save(path, &protocol).await?;
            println!(
                "{}: {} to {}",
                "Fees distributed".green().bold(),
                format_amount(amount),
                protocol.fees.recipient
            );
        }

        Commands::Info { market } => {
            let protocol = load(path).await?;
            let address = resolve_market(&protocol, &market)?;
            print_market(&protocol, protocol.market(&address)?, now)?;
        }

        Commands::List => {
            let protocol = load(path).await?;
            if protocol.market_count() == 0 {
                println!("{}", "No markets yet.".bright_black());
                return Ok(());
            }
            for m in protocol.markets() {
                let curation = protocol.status_of(&m.address)?;
                let overdue = if m.is_resolution_overdue(now) {
                    " overdue".red().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{}:{:<3} {} [{}]{} {}",
                    m.variant.tag(),
                    m.market_id,
                    m.address.to_string().cyan(),
                    curation,
                    overdue,
                    m.question
                );
            }
        }
    }

    Ok(())
}

async fn create(path: &Path, args: CreateArgs, variant: MarketVariant, now: u64) -> Result<()> {
    let mut protocol = load(path).await?;
    let creator = parse_account(&args.actor)?;
    let oracle_adapter = protocol
        .adapter(&args.category)
        .map(|a| a.address)
        .with_context(|| format!("no oracle adapter for category {:?}", args.category))?;
    let params = MarketParams {
        question: args.question,
        metadata_uri: args.metadata,
        creator,
        oracle_adapter,
        fee_router: protocol.fees.address,
        market_key: MarketKey::from_label(&args.key),
        fee_bps: args.fee_bps,
        liquidity: args.liquidity,
        start_time: args.start.unwrap_or(now),
        end_time: args.end,
        resolution_deadline: args.deadline,
    };

    let kind = match variant {
        MarketVariant::Binary => FactoryKind::Binary,
        MarketVariant::Multi { .. } => FactoryKind::Multi,
        MarketVariant::Scalar { .. } => FactoryKind::Scalar,
    };
    // the factory pulls the seed liquidity from the creator
    let factory = protocol.factory(kind).address;
    protocol.approve(creator, factory, params.liquidity)?;
    let (id, address) = match variant {
        MarketVariant::Binary => protocol.create_binary(params, now)?,
        MarketVariant::Multi { labels } => protocol.create_multi(params, labels, now)?,
        MarketVariant::Scalar {
            lower_bound,
            upper_bound,
        } => protocol.create_scalar(params, lower_bound, upper_bound, now)?,
    };
    save(path, &protocol).await?;

    println!("{}", "Market Created Successfully!".green().bold());
    println!("{}: {kind}:{id}", "Reference".yellow().bold());
    print_market(&protocol, protocol.market(&address)?, now)
}

async fn curate(
    path: &Path,
    actor: &str,
    market: &str,
    now: u64,
    action: fn(&mut Protocol, &Address, &Address, u64) -> bondmarket_core::Result<()>,
) -> Result<()> {
    let mut protocol = load(path).await?;
    let caller = parse_account(actor)?;
    let address = resolve_market(&protocol, market)?;
    action(&mut protocol, &caller, &address, now)?;
    save(path, &protocol).await?;
    println!(
        "{}: {} is now {}",
        "Curation".green().bold(),
        address,
        protocol.status_of(&address)?
    );
    Ok(())
}

fn print_resolution(protocol: &Protocol, address: &Address, resolution: Resolution) -> Result<()> {
    let market = protocol.market(address)?;
    let text = match resolution {
        Resolution::Outcome(k) => format!(
            "{} won",
            market.variant.outcome_label(k).unwrap_or_else(|| k.to_string())
        ),
        Resolution::Scalar { value, ratio } => format!(
            "value {value}, LONG pays {} / SHORT pays {}",
            format_amount(ratio),
            format_amount(UNIT - ratio)
        ),
    };
    println!("{}: {}", "Resolved".green().bold(), text);
    if let Some(settlement) = market.settlement() {
        if settlement.payout_factor < UNIT {
            println!(
                "{}: claims exceed collateral, payouts scaled by {}",
                "Warning".red().bold(),
                format_amount(settlement.payout_factor)
            );
        }
    }
    Ok(())
}
