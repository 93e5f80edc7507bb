use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pixelpost_core::{load_registry, CapiClient, CapiResponse, EventInput, SendOptions};

#[derive(Parser)]
#[command(name = "pixelpost", version, about = "Server-side Conversions API event sender")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one event to a configured destination
    Send {
        /// Event type to report
        #[arg(long, value_enum)]
        event: EventKind,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Monetary value of the event
        #[arg(long)]
        value: Option<f64>,
        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
        /// Page URL the event originated from
        #[arg(long)]
        source_url: Option<String>,
        /// Dedup id shared with the browser pixel
        #[arg(long)]
        event_id: Option<String>,
        /// Named destination (registry default when omitted)
        #[arg(long)]
        destination: Option<String>,
        /// Route into the test-events console
        #[arg(long)]
        test_code: Option<String>,
    },
    /// Fire a verification event at the test-events console
    TestEvent {
        #[arg(long)]
        email: Option<String>,
        /// Test event code from the events manager
        #[arg(long)]
        code: String,
        #[arg(long)]
        destination: Option<String>,
    },
    /// List configured destinations
    Destinations,
}

#[derive(Clone, Copy, ValueEnum)]
enum EventKind {
    PageView,
    Lead,
    ViewContent,
    AddToCart,
    InitiateCheckout,
    Purchase,
    UpsellPurchase,
    RebillSuccess,
    Subscribe,
    AddPaymentInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = load_registry().context("load destination configuration")?;

    match cli.cmd {
        Command::Send {
            event,
            email,
            phone,
            first_name,
            last_name,
            value,
            currency,
            order_id,
            source_url,
            event_id,
            destination,
            test_code,
        } => {
            let client = CapiClient::new(registry)?;
            let input = EventInput {
                email,
                phone,
                first_name,
                last_name,
                value,
                currency,
                order_id,
                event_source_url: source_url,
                event_id,
                ..Default::default()
            };
            let options = SendOptions {
                destination,
                test_event_code: test_code,
            };
            let response = dispatch(&client, event, &input, &options).await?;
            print_ack(&response);
        }
        Command::TestEvent {
            email,
            code,
            destination,
        } => {
            let client = CapiClient::new(registry)?;
            let input = EventInput {
                email,
                ..Default::default()
            };
            let response = client
                .test_event(&input, &code, destination.as_deref())
                .await?;
            print_ack(&response);
        }
        Command::Destinations => {
            for name in registry.names() {
                if registry.default_name() == Some(name) {
                    println!("{} (default)", name);
                } else {
                    println!("{}", name);
                }
            }
        }
    }

    Ok(())
}

async fn dispatch(
    client: &CapiClient,
    event: EventKind,
    input: &EventInput,
    options: &SendOptions,
) -> Result<CapiResponse> {
    let response = match event {
        EventKind::PageView => client.track_page_view(input, options).await,
        EventKind::Lead => client.track_lead(input, options).await,
        EventKind::ViewContent => client.track_view_content(input, options).await,
        EventKind::AddToCart => client.track_add_to_cart(input, options).await,
        EventKind::InitiateCheckout => client.track_initiate_checkout(input, options).await,
        EventKind::Purchase => client.track_purchase(input, options).await,
        EventKind::UpsellPurchase => client.track_upsell_purchase(input, options).await,
        EventKind::RebillSuccess => client.track_rebill_success(input, options).await,
        EventKind::Subscribe => client.track_subscribe(input, options).await,
        EventKind::AddPaymentInfo => client.track_add_payment_info(input, options).await,
    }?;
    Ok(response)
}

fn print_ack(response: &CapiResponse) {
    println!(
        "events received: {} (fbtrace {})",
        response.events_received, response.fbtrace_id
    );
    for message in &response.messages {
        println!("  {}", message);
    }
}
