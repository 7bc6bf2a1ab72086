//! Bakehouse CLI - Cart management and checkout.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! bh-cli cart show
//!
//! # Add a product (prompts before replacing a cart of another order type)
//! bh-cli cart add --product-id p1 --name "Carrot cake" --price 45.00 -v size=M
//!
//! # Change a quantity by line position or line ID (0 removes the line)
//! bh-cli cart update '#1' 3
//!
//! # Submit the cart
//! bh-cli checkout --name Ana --phone "+55 11 99999-0000" --date 2026-12-24
//! ```
//!
//! # Commands
//!
//! - `cart show|add|update|remove|clear` - Manage the persisted cart
//! - `checkout` - Submit the cart to the entity API

#![cfg_attr(not(test), forbid(unsafe_code))]

use bakehouse_core::OrderType;
use bakehouse_storefront::config::StorefrontConfig;
use bakehouse_storefront::state::AppState;
use chrono::{NaiveDate, NaiveTime};
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "bh-cli")]
#[command(author, version, about = "Bakehouse cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    #[command(group(ArgGroup::new("schedule").required(true).args(["date", "pickup_time"])))]
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer phone number
        #[arg(short, long)]
        phone: String,

        /// Notes for the bakery
        #[arg(long)]
        notes: Option<String>,

        /// Ready date for a scheduled order (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Pickup time for a same-day order (HH:MM)
        #[arg(long, value_parser = parse_time)]
        pickup_time: Option<NaiveTime>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product
    Add {
        /// Catalog product ID
        #[arg(long)]
        product_id: String,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price (e.g. 12.50)
        #[arg(long)]
        price: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Variation as name=value (repeatable)
        #[arg(short, long = "variation")]
        variations: Vec<String>,

        /// Order type (`scheduled_order`, `same_day_pickup`); defaults to the cart's
        #[arg(long, value_parser = parse_order_type)]
        order_type: Option<OrderType>,

        /// Replace a cart of another order type without asking
        #[arg(long, conflicts_with = "no")]
        yes: bool,

        /// Keep a cart of another order type without asking
        #[arg(long)]
        no: bool,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Line ID, or `#N` for the N-th line
        line: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Line ID, or `#N` for the N-th line
        line: String,
    },
    /// Empty the cart
    Clear,
}

fn parse_order_type(s: &str) -> Result<OrderType, String> {
    s.parse()
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,bakehouse_core=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let mut state = AppState::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state)?,
            CartAction::Add {
                product_id,
                name,
                price,
                image,
                quantity,
                variations,
                order_type,
                yes,
                no,
            } => {
                let input = commands::cart::AddInput {
                    product_id,
                    name,
                    price,
                    image,
                    quantity,
                    variations,
                    order_type,
                    answer: commands::cart::ConflictAnswer::from_flags(yes, no),
                };
                commands::cart::add(&mut state, input)?;
            }
            CartAction::Update { line, quantity } => {
                commands::cart::update(&mut state, &line, quantity)?;
            }
            CartAction::Remove { line } => commands::cart::remove(&mut state, &line)?,
            CartAction::Clear => commands::cart::clear(&mut state),
        },
        Commands::Checkout {
            name,
            phone,
            notes,
            date,
            pickup_time,
        } => {
            commands::checkout::submit(&mut state, name, phone, notes, date, pickup_time).await?;
        }
    }
    Ok(())
}
