//! # Cart Service
//!
//! Runs a [`CartStore`] on its own task so UI code and the shipping loader
//! can mutate the cart concurrently without sharing locks.
//!
//! ## Actor Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Service                                   │
//! │                                                                         │
//! │  CartHandle (clone) ──┐                                                 │
//! │  CartHandle (clone) ──┼──► mpsc::Sender<Request> ──► CartService::run   │
//! │  Loader task ─────────┘                               │                 │
//! │                                                       │ owns CartStore  │
//! │            oneshot reply ◄────────────────────────────┤                 │
//! │                                                       │                 │
//! │            watch::Receiver<CartSnapshot> ◄────────────┘ (every commit)  │
//! │                                                                         │
//! │  Requests are handled one at a time, in arrival order. A mutation is   │
//! │  fully applied before the next request is read.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shopcart_core::{
    CartItem, CartResult, CartSnapshot, ItemKey, Money, ShippingConfig, ShippingMethod,
};

use crate::error::{EngineError, EngineResult};
use crate::observer::{CartObserver, SubscriptionId, WatchObserver};
use crate::store::{CartCommand, CartStore};

/// Pending requests before senders wait.
const REQUEST_BUFFER: usize = 64;

// =============================================================================
// Requests
// =============================================================================

enum Request {
    Apply {
        command: CartCommand,
        reply: oneshot::Sender<CartResult<CartSnapshot>>,
    },
    Snapshot {
        method: Option<ShippingMethod>,
        reply: oneshot::Sender<CartSnapshot>,
    },
    Items {
        reply: oneshot::Sender<Vec<CartItem>>,
    },
    Subscribe {
        observer: Arc<dyn CartObserver>,
        reply: oneshot::Sender<SubscriptionId>,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

// =============================================================================
// Cart Service
// =============================================================================

/// Task that exclusively owns the cart store.
pub struct CartService {
    store: CartStore,
    request_rx: mpsc::Receiver<Request>,
}

impl CartService {
    /// Moves `store` onto a new task.
    ///
    /// Returns the handle used to talk to it and the task's join handle,
    /// which yields the store back after shutdown.
    pub fn spawn(mut store: CartStore) -> (CartHandle, JoinHandle<CartStore>) {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_BUFFER);
        let (watch_tx, watch_rx) = watch::channel(store.snapshot());
        store.subscribe(Arc::new(WatchObserver::new(watch_tx)));

        let service = CartService { store, request_rx };
        let task = tokio::spawn(service.run());

        let handle = CartHandle {
            request_tx,
            watch_rx,
        };
        (handle, task)
    }

    async fn run(mut self) -> CartStore {
        info!(items = self.store.items().len(), "Cart service started");

        while let Some(request) = self.request_rx.recv().await {
            match request {
                Request::Apply { command, reply } => {
                    let result = self.store.apply(command);
                    // Caller may have given up waiting; the change stands
                    let _ = reply.send(result);
                }
                Request::Snapshot { method, reply } => {
                    let snapshot = match method {
                        Some(method) => self.store.snapshot_for(method),
                        None => self.store.snapshot(),
                    };
                    let _ = reply.send(snapshot);
                }
                Request::Items { reply } => {
                    let _ = reply.send(self.store.items().to_vec());
                }
                Request::Subscribe { observer, reply } => {
                    let _ = reply.send(self.store.subscribe(observer));
                }
                Request::Unsubscribe { id, reply } => {
                    let _ = reply.send(self.store.unsubscribe(id));
                }
                Request::Shutdown => {
                    debug!("Cart service received shutdown");
                    break;
                }
            }
        }

        info!("Cart service stopped");
        self.store
    }
}

// =============================================================================
// Cart Handle
// =============================================================================

/// Cloneable access to a running [`CartService`].
///
/// Every call fails with [`EngineError::ServiceStopped`] once the service
/// has shut down.
#[derive(Clone)]
pub struct CartHandle {
    request_tx: mpsc::Sender<Request>,
    watch_rx: watch::Receiver<CartSnapshot>,
}

impl CartHandle {
    /// Applies a command on the service task.
    pub async fn apply(&self, command: CartCommand) -> EngineResult<CartSnapshot> {
        let result = self
            .request(|reply| Request::Apply { command, reply })
            .await?;
        Ok(result?)
    }

    pub async fn add_item(
        &self,
        key: ItemKey,
        unit_price: Money,
        quantity: i64,
    ) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::AddItem {
            key,
            unit_price,
            quantity,
        })
        .await
    }

    pub async fn update_quantity(&self, key: ItemKey, quantity: i64) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::UpdateQuantity { key, quantity }).await
    }

    pub async fn remove_item(&self, key: ItemKey) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::RemoveItem { key }).await
    }

    pub async fn clear(&self) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::Clear).await
    }

    pub async fn set_shipping_config(
        &self,
        config: Option<ShippingConfig>,
    ) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::SetShippingConfig(config)).await
    }

    pub async fn set_shipping_method(&self, method: ShippingMethod) -> EngineResult<CartSnapshot> {
        self.apply(CartCommand::SetShippingMethod(method)).await
    }

    /// Current totals with the selected shipping method.
    pub async fn snapshot(&self) -> EngineResult<CartSnapshot> {
        self.request(|reply| Request::Snapshot {
            method: None,
            reply,
        })
        .await
    }

    /// Current totals priced with an explicit shipping method.
    pub async fn snapshot_for(&self, method: ShippingMethod) -> EngineResult<CartSnapshot> {
        self.request(|reply| Request::Snapshot {
            method: Some(method),
            reply,
        })
        .await
    }

    pub async fn items(&self) -> EngineResult<Vec<CartItem>> {
        self.request(|reply| Request::Items { reply }).await
    }

    pub async fn subscribe(&self, observer: Arc<dyn CartObserver>) -> EngineResult<SubscriptionId> {
        self.request(|reply| Request::Subscribe { observer, reply })
            .await
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> EngineResult<bool> {
        self.request(|reply| Request::Unsubscribe { id, reply }).await
    }

    /// Receiver that always holds the latest committed snapshot.
    pub fn watch(&self) -> watch::Receiver<CartSnapshot> {
        self.watch_rx.clone()
    }

    /// Asks the service to stop after the requests already queued.
    pub async fn shutdown(&self) -> EngineResult<()> {
        self.request_tx
            .send(Request::Shutdown)
            .await
            .map_err(|_| EngineError::ServiceStopped)
    }

    /// Returns true while the service task accepts requests.
    pub fn is_running(&self) -> bool {
        !self.request_tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> EngineResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| EngineError::ServiceStopped)?;
        reply_rx.await.map_err(|_| EngineError::ServiceStopped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
