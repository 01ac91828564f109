use clap::Parser;
use miette::{IntoDiagnostic, Result};
use shophub_checkout::application::checkout::{CheckoutOrchestrator, Collaborators};
use shophub_checkout::bootstrap::init_tracing;
use shophub_checkout::config::CheckoutConfig;
use shophub_checkout::domain::cart::CartOwner;
use shophub_checkout::domain::checkout::CheckoutSession;
use shophub_checkout::domain::identifiers;
use shophub_checkout::error::CheckoutError;
use shophub_checkout::infrastructure::pos::PosClient;
use shophub_checkout::interfaces::terminal::form::CheckoutForm;
use shophub_checkout::interfaces::terminal::gateway::TerminalGateway;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Checkout form (JSON) with customer and shipping details
    form: PathBuf,

    /// Cart session id. A fresh guest session is used when omitted.
    #[arg(long)]
    session_id: Option<String>,

    /// Signed-in customer id owning the cart
    #[arg(long)]
    user_id: Option<String>,

    /// POS backend base URL (overrides POS_API_URL)
    #[arg(long)]
    pos_url: Option<String>,

    /// Hosted payment public key (overrides PAYSTACK_PUBLIC_KEY)
    #[arg(long)]
    public_key: Option<String>,

    /// Currency code (overrides CHECKOUT_CURRENCY)
    #[arg(long)]
    currency: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let form = CheckoutForm::from_reader(File::open(&cli.form).into_diagnostic()?)
        .into_diagnostic()?;

    // Reject incomplete forms before touching the backend
    let mut probe = CheckoutSession::new();
    form.apply(&mut probe);
    probe.validate_details().into_diagnostic()?;

    let mut config = CheckoutConfig::from_env().into_diagnostic()?;
    if let Some(url) = cli.pos_url {
        config = config.with_pos_api_url(url);
    }
    if let Some(key) = cli.public_key {
        config = config.with_payment_public_key(key);
    }
    if let Some(currency) = cli.currency {
        config = config.with_currency(currency);
    }

    let mut owner = CartOwner::guest(cli.session_id.unwrap_or_else(identifiers::guest_session_id));
    if let Some(user_id) = cli.user_id {
        owner = owner.with_user(user_id);
    }

    let pos = PosClient::new(config.clone()).into_diagnostic()?;
    let collaborators = Collaborators {
        carts: Box::new(pos.clone()),
        taxes: Box::new(pos.clone()),
        gateway: Box::new(TerminalGateway::new(
            config.payment_public_key.clone(),
            BufReader::new(tokio::io::stdin()),
            tokio::io::stderr(),
        )),
        verifier: Box::new(pos.clone()),
        orders: Box::new(pos),
    };

    let mut checkout = match CheckoutOrchestrator::begin(owner, collaborators, config).await {
        Ok(checkout) => checkout,
        Err(CheckoutError::EmptyCart) => {
            eprintln!("Your cart is empty. Add items to the cart before checking out.");
            return Err(CheckoutError::EmptyCart).into_diagnostic();
        }
        Err(e) => return Err(e).into_diagnostic(),
    };

    form.apply(checkout.session_mut());
    checkout.next().into_diagnostic()?;
    checkout.next().into_diagnostic()?;

    let totals = checkout.totals();
    eprintln!("Subtotal: {}", totals.subtotal.rounded());
    eprintln!("Shipping: {}", totals.shipping.rounded());
    if checkout.tax().enabled() {
        eprintln!("{}: {}", checkout.tax().label(), totals.tax.rounded());
    }
    eprintln!("Total:    {}", totals.total.rounded());

    let confirmation = match checkout.place_order().await {
        Ok(confirmation) => confirmation,
        Err(CheckoutError::PaymentNotCompleted(status)) => {
            eprintln!("Payment was not completed ({status}). Your cart has not been changed.");
            return Err(CheckoutError::PaymentNotCompleted(status)).into_diagnostic();
        }
        Err(e) => return Err(e).into_diagnostic(),
    };

    if !confirmation.cart_cleared {
        eprintln!("Note: your order is confirmed but the cart could not be emptied.");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &confirmation).into_diagnostic()?;
    writeln!(out).into_diagnostic()?;

    Ok(())
}
