//! Signal/slot system for Tether.
//!
//! Signals are how monitors, managers and the document report state changes to
//! the widgets that own them. A signal holds any number of connected slots
//! (closures); [`Signal::emit`] invokes each of them with a reference to the
//! emitted value.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Re-entrancy
//!
//! Slots are invoked after the connection table lock has been released, so a
//! slot may connect, disconnect or emit on the same signal without
//! deadlocking. A slot disconnected during an emission still receives that
//! emission; it will not receive the next one.
//!
//! # Example
//!
//! ```
//! use tether_core::Signal;
//!
//! let hovered = Signal::<bool>::new();
//! let conn_id = hovered.connect(|active| {
//!     println!("hovered: {}", active);
//! });
//!
//! hovered.emit(true);
//! hovered.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{CoreError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
/// Slots keyed by id, each tagged with its connection sequence number.
type SlotTable<Args> = Mutex<SlotMap<ConnectionId, (u64, Slot<Args>)>>;

/// A type-safe signal that can have multiple connected slots.
///
/// `Signal<Args>` is `Send + Sync`. Use `()` for signals without a payload.
pub struct Signal<Args> {
    connections: Arc<SlotTable<Args>>,
    next_seq: AtomicU64,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
            next_seq: AtomicU64::new(0),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let slot: Slot<Args> = Arc::new(slot);
        self.connections.lock().insert((seq, slot))
    }

    /// Connect a slot that is disconnected automatically when the returned
    /// guard is dropped.
    ///
    /// The guard only holds a weak reference to the connection table, so it
    /// may safely outlive the signal.
    ///
    /// ```
    /// use tether_core::Signal;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let signal = Signal::<i32>::new();
    /// let counter = Arc::new(AtomicI32::new(0));
    /// {
    ///     let counter_clone = counter.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         counter_clone.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(42);
    /// }
    /// signal.emit(43);
    /// assert_eq!(counter.load(Ordering::SeqCst), 42);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let weak: Weak<SlotTable<Args>> = Arc::downgrade(&self.connections);
        ConnectionGuard {
            disconnect: Some(Box::new(move || match weak.upgrade() {
                Some(table) => table
                    .lock()
                    .remove(id)
                    .map(|_| ())
                    .ok_or(CoreError::InvalidConnection),
                None => Err(CoreError::SignalDropped),
            })),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    #[tracing::instrument(skip_all, target = "tether_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Slot keys are reused after disconnects; order by sequence instead.
        let mut slots: Vec<(u64, Slot<Args>)> = self.connections.lock().values().cloned().collect();
        slots.sort_unstable_by_key(|(seq, _)| *seq);
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for (_, slot) in slots {
            slot(&args);
        }
    }
}

/// A connection guard that disconnects its slot when dropped.
///
/// Created via [`Signal::connect_scoped`]. The guard is type-erased so that
/// owners can store guards for signals of different payload types together.
pub struct ConnectionGuard {
    disconnect: Option<Box<dyn FnOnce() -> Result<()> + Send + Sync>>,
}

impl ConnectionGuard {
    /// Disconnect now instead of waiting for the guard to drop.
    ///
    /// Fails with [`CoreError::SignalDropped`] when the signal is already gone
    /// and with [`CoreError::InvalidConnection`] when the slot was removed by
    /// other means (for example [`Signal::disconnect_all`]).
    pub fn disconnect(mut self) -> Result<()> {
        match self.disconnect.take() {
            Some(disconnect) => disconnect(),
            None => Err(CoreError::InvalidConnection),
        }
    }
}

impl std::fmt::Debug for ConnectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("armed", &self.disconnect.is_some())
            .finish()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            let _ = disconnect();
        }
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard: Send, Sync);
