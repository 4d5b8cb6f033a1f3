//! RekurStore CLI - accounts and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (a verification code is shown in the terminal)
//! rekur register -e you@example.com
//!
//! # Sign in / out
//! rekur login -e you@example.com
//! rekur logout
//! rekur whoami
//!
//! # Buy something and get a WhatsApp link for the admin
//! rekur buy --product "Plan X" --price "Rp 10.000"
//!
//! # Show where to send money for each payment method
//! rekur payment-methods
//! ```
//!
//! Configuration comes from `REKURSTORE_*` environment variables (or `.env`).
//! Set `RUST_LOG` to adjust logging.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rekurstore_core::{CatalogEntry, PaymentMethod};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "rekur")]
#[command(author, version, about = "RekurStore from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign in
    Login {
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Buy a product
    Buy {
        /// Product name
        #[arg(long)]
        product: String,

        /// Product category (`PPOB` for top-ups)
        #[arg(long, default_value = "Streaming")]
        category: String,

        /// Display price, e.g. "Rp 10.000"
        #[arg(long)]
        price: String,

        /// Phone number or customer ID to deliver to
        #[arg(short, long)]
        destination: Option<String>,

        /// Contact email (defaults to the signed-in account)
        #[arg(short, long)]
        email: Option<String>,

        /// Payment method (QRIS, BCA, Mandiri, BRI, DANA, OVO, `GoPay`, `ShopeePay`)
        #[arg(short, long)]
        method: Option<PaymentMethod>,
    },
    /// List payment methods
    PaymentMethods,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rekurstore_storefront=info,rekurstore_cli=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        ui::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Register { email } => commands::account::register(email).await?,
        Commands::Login { email } => commands::account::login(email).await?,
        Commands::Logout => commands::account::logout()?,
        Commands::Whoami => commands::account::whoami()?,
        Commands::Buy {
            product,
            category,
            price,
            destination,
            email,
            method,
        } => {
            let entry = CatalogEntry::new(product, category, price);
            let args = commands::shop::BuyArgs {
                destination,
                contact_email: email,
                method,
            };
            commands::shop::buy(entry, args).await?;
        }
        Commands::PaymentMethods => commands::shop::payment_methods()?,
    }
    Ok(())
}
