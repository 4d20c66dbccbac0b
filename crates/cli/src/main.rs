//! Unishop CLI - the storefront from the terminal.
//!
//! Each invocation loads the persisted cart and session from the data
//! directory, applies one action, and writes state back.
//!
//! # Usage
//!
//! ```bash
//! # Browse and fill the cart
//! unishop products
//! unishop cart add 1
//! unishop cart set 1 3
//! unishop cart show
//!
//! # Check out with M-Pesa
//! unishop checkout --full-name "Andy Gitau" --address "12 Moi Avenue" \
//!     --city Nairobi --postal-code 00100 --country Kenya --payment mpesa
//!
//! # Account
//! unishop login -e andy@unishop.com -p 's3cure-pass'
//! unishop whoami
//! unishop logout
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unishop_core::{PaymentMethod, ProductId};
use unishop_storefront::config::StorefrontConfig;
use unishop_storefront::error::AppError;

mod commands;

#[derive(Parser)]
#[command(name = "unishop")]
#[command(author, version, about = "Unishop storefront CLI")]
struct Cli {
    /// Directory holding the persisted cart and session (overrides `UNISHOP_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products from the catalog
    Products,
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the current cart
    Checkout(CheckoutArgs),
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password to confirm it
        #[arg(short, long)]
        repeat_password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage the account itself
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a catalog product (or one more of it)
    Add { product_id: ProductId },
    /// Set a line's quantity (clamped to 1-10)
    Set {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { product_id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Change username, email or password
    Update {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Upload a new profile picture
    Upload { path: PathBuf },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Permanently delete the account
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Checkout form values. Missing values are reported by the wizard.
#[derive(Args)]
struct CheckoutArgs {
    #[arg(long, default_value = "")]
    full_name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    postal_code: String,
    #[arg(long, default_value = "")]
    country: String,
    /// `bank-card`, `mpesa`, `paypal` or `simulated`
    #[arg(long, default_value = "simulated")]
    payment: PaymentMethod,
    #[arg(long, default_value = "")]
    name_on_card: String,
    #[arg(long, default_value = "")]
    card_number: String,
    #[arg(long, default_value = "")]
    expiry: String,
    #[arg(long, default_value = "")]
    cvv: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", AppError::from(e).user_message());
            std::process::exit(1);
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "unishop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let code = match run(cli.command, config).await {
        Ok(()) => 0,
        Err(e) => {
            e.report();
            eprintln!("Error: {}", e.user_message());
            1
        }
    };

    // Flush pending Sentry events before exiting
    drop(sentry_guard);
    std::process::exit(code);
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), AppError> {
    let mut ctx = commands::Context::open(config)?;

    match command {
        Commands::Products => commands::catalog::list(&ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { product_id } => commands::cart::add(&mut ctx, product_id).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&mut ctx, product_id, quantity)?,
            CartAction::Remove { product_id } => commands::cart::remove(&mut ctx, product_id)?,
            CartAction::Clear => commands::cart::clear(&mut ctx)?,
        },
        Commands::Checkout(args) => {
            commands::checkout::run(&mut ctx, &args.into_form())?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&mut ctx, &email, password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            repeat_password,
        } => {
            commands::account::register(&mut ctx, username, email, password, repeat_password)
                .await?;
        }
        Commands::Logout => commands::account::logout(&mut ctx)?,
        Commands::Whoami => commands::account::whoami(&ctx),
        Commands::Profile { action } => match action {
            ProfileAction::Update {
                username,
                email,
                password,
            } => commands::account::update_profile(&mut ctx, username, email, password).await?,
            ProfileAction::Upload { path } => {
                commands::account::upload_picture(&mut ctx, &path).await?;
            }
        },
        Commands::Account { action } => match action {
            AccountAction::Delete { yes } => commands::account::delete(&mut ctx, yes).await?,
        },
        Commands::ForgotPassword { email } => {
            commands::account::forgot_password(&mut ctx, &email).await?;
        }
    }
    Ok(())
}

impl CheckoutArgs {
    fn into_form(self) -> commands::checkout::CheckoutForm {
        commands::checkout::CheckoutForm {
            full_name: self.full_name,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            payment: self.payment,
            name_on_card: self.name_on_card,
            card_number: self.card_number,
            expiry: self.expiry,
            cvv: self.cvv,
        }
    }
}
