//! # Cart Demo
//!
//! End-to-end walk through the engine: restores the saved cart, loads the
//! shipping policy from the configured source, adds a few items and prints
//! the totals.
//!
//! ## Usage
//! ```bash
//! # Use settings.toml from the platform config directory
//! cargo run --bin cart-demo
//!
//! # Explicit settings file (exits with an error if it cannot be loaded)
//! cargo run --bin cart-demo -- ./settings.toml
//!
//! # Local site settings document, no persistence
//! SHOPCART_SOURCE_FILE=./site.json SHOPCART_STORAGE_ENABLED=false cargo run --bin cart-demo
//! ```

use std::path::PathBuf;

use shopcart_core::{CartSnapshot, ItemKey, Money, ShippingMethod};
use shopcart_engine::{
    init_tracing, CartService, CartStore, EngineResult, EngineSettings, LoadOutcome,
    ShippingConfigLoader,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Cart demo failed");
        std::process::exit(1);
    }
}

async fn run() -> EngineResult<()> {
    // An explicitly named settings file must load; the platform default may
    // be missing or stale
    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => EngineSettings::load(Some(path))?,
        None => EngineSettings::load_or_default(None),
    };

    let store = CartStore::restore(settings.storage_backend(), settings.cart_limits())
        .with_shipping_method(settings.cart.default_shipping_method);
    let (cart, service) = CartService::spawn(store);

    let loader =
        ShippingConfigLoader::with_timeout(settings.config_source(), settings.request_timeout());
    let load = loader.activate(cart.clone());

    // Totals are usable before the policy arrives; shipping is just unknown
    let snapshot = cart
        .add_item(ItemKey::new("tshirt-basic"), Money::from_cents(1999), 2)
        .await?;
    report("after first add", &snapshot);

    cart.add_item(
        ItemKey::with_variant("hoodie", "L"),
        Money::from_cents(4500),
        1,
    )
    .await?;

    match load.await {
        Ok(LoadOutcome::Loaded(_)) => info!("Shipping policy available"),
        Ok(outcome) => info!(?outcome, "Shipping policy not available"),
        Err(e) => error!(error = %e, "Shipping load task failed"),
    }

    report("standard", &cart.snapshot_for(ShippingMethod::Standard).await?);
    report("express", &cart.snapshot_for(ShippingMethod::Express).await?);

    cart.shutdown().await?;
    if let Err(e) = service.await {
        error!(error = %e, "Cart service task failed");
    }
    Ok(())
}

fn report(label: &str, snapshot: &CartSnapshot) {
    let shipping = snapshot
        .shipping_cost
        .map(|cost| cost.to_string())
        .unwrap_or_else(|| "calculated at checkout".to_string());
    let total = snapshot
        .total
        .map(|total| total.to_string())
        .unwrap_or_else(|| "pending".to_string());

    info!(
        label,
        items = snapshot.item_count,
        quantity = snapshot.total_quantity,
        subtotal = %snapshot.subtotal,
        shipping = %shipping,
        total = %total,
        state = %snapshot.shipping,
        "Cart totals"
    );

    if let Some(missing) = snapshot.amount_to_free_shipping {
        info!(label, missing = %missing, "Add more for free shipping");
    }
}
