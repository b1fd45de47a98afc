//! tiffin: terminal client for the ordering backend.
//!
//! Thin wiring over the engine crates: fetch + print order views, track one
//! order live, run the kitchen feed, or fire a single transition. All real
//! behavior lives in the libraries; this file is argument parsing and
//! printing.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use tfn_api::{ApiClient, ApiConfig, OrderBackend, RestBackend};
use tfn_cache::{HistoryRange, OrderCache};
use tfn_dispatch::{DispatchOutcome, Dispatcher};
use tfn_lifecycle::{next_action, OrderAction};
use tfn_schemas::{paise_to_rupees, Order, OrderStatus, Role};
use tfn_watch::{OrderFeedHandler, OrderWatch, StoreWatch};

#[derive(Parser)]
#[command(name = "tiffin")]
#[command(about = "Tiffin order lifecycle client", long_about = None)]
struct Cli {
    /// Backend base URL; defaults to TIFFIN_API_URL, then localhost:3000.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the order list for a role
    Orders {
        #[arg(long, value_enum, default_value_t = RoleArg::Customer)]
        role: RoleArg,

        /// History scope
        #[arg(long, value_enum, default_value_t = RangeArg::Today)]
        history: RangeArg,
    },

    /// Track one order live until it reaches a terminal status
    Watch {
        order_id: i64,
    },

    /// Live kitchen feed: current queue plus pushed new orders and updates
    Kitchen,

    /// Execute one status transition
    Act {
        order_id: i64,

        /// confirm | prepare | ready | verify | complete | cancel
        action: String,

        /// 4-digit pickup code (verify only)
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Customer,
    Store,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Customer => Role::Customer,
            RoleArg::Store => Role::Store,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RangeArg {
    Today,
    All,
}

impl From<RangeArg> for HistoryRange {
    fn from(r: RangeArg) -> Self {
        match r {
            RangeArg::Today => HistoryRange::Today,
            RangeArg::All => HistoryRange::All,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let cfg = match &cli.api_url {
        Some(url) => ApiConfig::new(url),
        None => ApiConfig::from_env(),
    };
    let client = ApiClient::new(cfg).context("building HTTP client")?;
    let backend = Arc::new(RestBackend::new(client));

    match cli.cmd {
        Commands::Orders { role, history } => cmd_orders(backend, role.into(), history.into()).await,
        Commands::Watch { order_id } => cmd_watch(backend, order_id).await,
        Commands::Kitchen => cmd_kitchen(backend).await,
        Commands::Act {
            order_id,
            action,
            code,
        } => cmd_act(backend, order_id, &action, code.as_deref()).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

// ---------------------------------------------------------------------------
// tiffin orders
// ---------------------------------------------------------------------------

async fn cmd_orders(backend: Arc<RestBackend>, role: Role, range: HistoryRange) -> Result<()> {
    let dispatcher = Dispatcher::new(backend, role);
    dispatcher
        .refresh()
        .await
        .map_err(|e| anyhow!(e.display_message()))?;

    let cache = dispatcher.cache();
    let cache = cache.lock().expect("cache poisoned");

    println!("Active ({role}):");
    for order in cache.active() {
        println!("  {}", order_line(order));
    }

    println!("History:");
    for order in cache.history(range) {
        println!("  {}", order_line(order));
    }
    println!(
        "Delivered total: {}",
        rupees(cache.delivered_total(range))
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// tiffin watch
// ---------------------------------------------------------------------------

async fn cmd_watch(backend: Arc<RestBackend>, order_id: i64) -> Result<()> {
    let order = backend
        .fetch_order(order_id)
        .await
        .map_err(|e| anyhow!(e.display_message()))?;
    println!("{}", order_line(&order));

    let mut watch = OrderWatch::open(backend.client(), order_id, order.order_status);
    info!(order_id, subscription = %watch.subscription_id(), "tracking order");

    while watch.status_changed().await {
        let reconnecting = !watch.is_connected() && !watch.is_closed();
        let marker = if reconnecting { " (reconnecting)" } else { "" };
        println!("  -> {}{marker}", watch.status());
    }

    println!("Order #{order_id} finished: {}", watch.status());
    Ok(())
}

// ---------------------------------------------------------------------------
// tiffin kitchen
// ---------------------------------------------------------------------------

/// Feeds store pushes straight into the session cache and narrates them.
struct KitchenFeed {
    cache: Arc<Mutex<OrderCache>>,
}

impl OrderFeedHandler for KitchenFeed {
    fn on_new_order(&self, order: Order) {
        println!("NEW   {}", order_line(&order));
        self.cache
            .lock()
            .expect("cache poisoned")
            .merge_new_order(order);
    }

    fn on_order_update(&self, order_id: i64, status: OrderStatus) {
        println!("UPDATE #{order_id} -> {status}");
        self.cache
            .lock()
            .expect("cache poisoned")
            .patch_status(order_id, status);
    }
}

async fn cmd_kitchen(backend: Arc<RestBackend>) -> Result<()> {
    let dispatcher = Dispatcher::new(Arc::clone(&backend) as Arc<dyn OrderBackend>, Role::Store);
    dispatcher
        .refresh()
        .await
        .map_err(|e| anyhow!(e.display_message()))?;

    {
        let cache = dispatcher.cache();
        let cache = cache.lock().expect("cache poisoned");
        println!("Kitchen queue ({} orders):", cache.active().len());
        for order in cache.active() {
            println!("  {}", order_line(order));
        }
    }

    let watch = StoreWatch::open(
        backend.client(),
        KitchenFeed {
            cache: dispatcher.cache(),
        },
    );
    println!("Watching for orders (Ctrl-C to stop)");

    tokio::signal::ctrl_c().await.context("signal handler")?;
    watch.close();
    Ok(())
}

// ---------------------------------------------------------------------------
// tiffin act
// ---------------------------------------------------------------------------

async fn cmd_act(
    backend: Arc<RestBackend>,
    order_id: i64,
    action: &str,
    code: Option<&str>,
) -> Result<()> {
    let action: OrderAction = action.parse()?;
    let dispatcher = Dispatcher::new(backend, Role::Store);
    dispatcher
        .refresh()
        .await
        .map_err(|e| anyhow!(e.display_message()))?;

    match dispatcher.dispatch(order_id, action, code).await {
        Ok(DispatchOutcome::Applied {
            new_status,
            terminal,
        }) => {
            println!("Order #{order_id} -> {new_status}");
            if terminal {
                println!("Order finished; live tracking for it will close.");
            }
            Ok(())
        }
        Ok(DispatchOutcome::AlreadyApplied) => {
            println!("Order #{order_id} already there; nothing to do");
            Ok(())
        }
        Err(err) => Err(anyhow!(err.display_message())),
    }
}

// ---------------------------------------------------------------------------
// Printing helpers
// ---------------------------------------------------------------------------

fn rupees(paise: i64) -> String {
    format!("₹{:.2}", paise_to_rupees(paise))
}

fn order_line(order: &Order) -> String {
    let items = order.items_summary();
    let items = if items.is_empty() { "-".to_string() } else { items };
    let next = next_action(&order.order_status)
        .map(|n| format!("  [{}]", n.label))
        .unwrap_or_default();
    format!(
        "#{} {} {} {} ({}){next}",
        order.order_id,
        order.order_date.format("%H:%M"),
        order.order_status,
        rupees(order.total_price),
        items,
    )
}
