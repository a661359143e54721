//! # Modal Store
//!
//! Coordinates which overlay is on screen. At most one overlay is visible at
//! a time, and each carries only its own context.
//!
//! ```text
//!   from \ op          toggle_add_expense(t)   toggle_add_trip   open_receipt_viewer(u)
//!   ───────────────     ─────────────────────   ───────────────   ──────────────────────
//!   Closed              AddExpense(t)           AddTrip           ReceiptViewer(u)
//!   AddExpense(_)       Closed                  AddTrip           ReceiptViewer(u)
//!   AddTrip             AddExpense(t)           Closed            ReceiptViewer(u)
//!   ReceiptViewer(_)    AddExpense(t)           AddTrip           ReceiptViewer(u)
//!
//!   close_receipt_viewer: ReceiptViewer(_) -> Closed, anything else unchanged
//!   close_all:            anything -> Closed
//! ```
//!
//! Because the state is a single enum, "at most one open" and "context only
//! on its own overlay" hold by construction.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The overlay currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Overlay {
    #[default]
    Closed,

    /// Add-expense form, optionally pre-filled with a trip.
    AddExpense {
        #[serde(rename = "defaultTripName")]
        default_trip_name: Option<String>,
    },

    AddTrip,

    /// Full-size view of a receipt image.
    ReceiptViewer { url: String },
}

impl Overlay {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::AddExpense { .. } => "add_expense",
            Self::AddTrip => "add_trip",
            Self::ReceiptViewer { .. } => "receipt_viewer",
        }
    }

    pub fn is_any_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn add_expense_open(&self) -> bool {
        matches!(self, Self::AddExpense { .. })
    }

    pub fn add_trip_open(&self) -> bool {
        matches!(self, Self::AddTrip)
    }

    pub fn receipt_viewer_open(&self) -> bool {
        matches!(self, Self::ReceiptViewer { .. })
    }

    pub fn current_receipt_url(&self) -> Option<&str> {
        match self {
            Self::ReceiptViewer { url } => Some(url),
            _ => None,
        }
    }

    pub fn default_trip_name(&self) -> Option<&str> {
        match self {
            Self::AddExpense { default_trip_name } => default_trip_name.as_deref(),
            _ => None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Next state for `toggle_add_expense`. An empty trip name counts as none.
    pub fn toggle_add_expense(&self, default_trip: Option<String>) -> Overlay {
        if self.add_expense_open() {
            Self::Closed
        } else {
            Self::AddExpense {
                default_trip_name: default_trip.filter(|trip| !trip.is_empty()),
            }
        }
    }

    pub fn toggle_add_trip(&self) -> Overlay {
        if self.add_trip_open() {
            Self::Closed
        } else {
            Self::AddTrip
        }
    }

    /// Leaves any other overlay alone.
    pub fn close_receipt_viewer(&self) -> Overlay {
        if self.receipt_viewer_open() {
            Self::Closed
        } else {
            self.clone()
        }
    }
}

/// Flat view of an [`Overlay`], one flag per overlay.
///
/// Handy for UI code that binds each overlay's visibility separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalFlags {
    pub add_expense_open: bool,
    pub add_trip_open: bool,
    pub receipt_viewer_open: bool,
    pub current_receipt_url: Option<String>,
    pub default_trip_name: Option<String>,
}

impl From<&Overlay> for ModalFlags {
    fn from(overlay: &Overlay) -> Self {
        ModalFlags {
            add_expense_open: overlay.add_expense_open(),
            add_trip_open: overlay.add_trip_open(),
            receipt_viewer_open: overlay.receipt_viewer_open(),
            current_receipt_url: overlay.current_receipt_url().map(str::to_string),
            default_trip_name: overlay.default_trip_name().map(str::to_string),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Reactive container for the current [`Overlay`].
#[derive(Debug)]
pub struct ModalStore {
    state: watch::Sender<Overlay>,
}

impl ModalStore {
    pub fn new() -> Self {
        let (state, _rx) = watch::channel(Overlay::Closed);
        Self { state }
    }

    pub fn snapshot(&self) -> Overlay {
        self.state.borrow().clone()
    }

    pub fn flags(&self) -> ModalFlags {
        ModalFlags::from(&*self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Overlay> {
        self.state.subscribe()
    }

    /// Open the add-expense form (closing anything else), or close it if
    /// it's already open. The trip name is only attached when opening.
    pub fn toggle_add_expense(&self, default_trip: Option<String>) {
        self.transition("toggle_add_expense", |overlay| {
            overlay.toggle_add_expense(default_trip)
        });
    }

    pub fn toggle_add_trip(&self) {
        self.transition("toggle_add_trip", Overlay::toggle_add_trip);
    }

    /// Show a receipt, replacing whatever is open. Not a toggle.
    pub fn open_receipt_viewer(&self, url: impl Into<String>) {
        let url = url.into();
        self.transition("open_receipt_viewer", |_| Overlay::ReceiptViewer { url });
    }

    pub fn close_receipt_viewer(&self) {
        self.transition("close_receipt_viewer", Overlay::close_receipt_viewer);
    }

    pub fn close_all(&self) {
        self.transition("close_all", |_| Overlay::Closed);
    }

    /// Compute the next state from the current one under the channel lock.
    /// Subscribers are only notified if the state actually changed.
    fn transition<F>(&self, op: &'static str, next: F)
    where
        F: FnOnce(&Overlay) -> Overlay,
    {
        self.state.send_if_modified(|overlay| {
            let updated = next(&*overlay);
            if updated == *overlay {
                return false;
            }
            tracing::debug!(op, from = overlay.name(), to = updated.name(), "Overlay transition");
            *overlay = updated;
            true
        });
    }
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tokio_test::{assert_pending, assert_ready, task};

    /// (add_expense_open, add_trip_open, receipt_viewer_open)
    fn visible(store: &ModalStore) -> (bool, bool, bool) {
        let f = store.flags();
        (f.add_expense_open, f.add_trip_open, f.receipt_viewer_open)
    }

    /// One store in each reachable state.
    fn every_state() -> Vec<ModalStore> {
        let closed = ModalStore::new();

        let expense = ModalStore::new();
        expense.toggle_add_expense(None);

        let expense_with_trip = ModalStore::new();
        expense_with_trip.toggle_add_expense(Some("Paris Trip".to_string()));

        let trip = ModalStore::new();
        trip.toggle_add_trip();

        let viewer = ModalStore::new();
        viewer.open_receipt_viewer("u1");

        vec![closed, expense, expense_with_trip, trip, viewer]
    }

    // -------------------------------------------------------------------------
    // Mutual Exclusion Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_starts_closed() {
        let store = ModalStore::new();
        assert_eq!(store.snapshot(), Overlay::Closed);
        assert_eq!(store.flags(), ModalFlags::default());
    }

    #[test]
    fn test_opening_one_overlay_closes_the_others() {
        let store = ModalStore::new();

        store.toggle_add_expense(None);
        assert_eq!(visible(&store), (true, false, false));

        store.toggle_add_trip();
        assert_eq!(visible(&store), (false, true, false));

        store.open_receipt_viewer("u1");
        assert_eq!(visible(&store), (false, false, true));

        store.toggle_add_expense(None);
        assert_eq!(visible(&store), (true, false, false));
        assert_eq!(store.flags().current_receipt_url, None);
    }

    #[test]
    fn test_toggle_add_trip_twice_closes() {
        let store = ModalStore::new();

        store.toggle_add_trip();
        store.toggle_add_trip();

        assert_eq!(store.snapshot(), Overlay::Closed);
    }

    // -------------------------------------------------------------------------
    // Context Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_trip_name_attached_on_open_and_cleared_on_close() {
        let store = ModalStore::new();

        store.toggle_add_expense(Some("Paris Trip".to_string()));
        assert_eq!(store.snapshot().default_trip_name(), Some("Paris Trip"));

        store.toggle_add_expense(None);
        assert_eq!(store.snapshot(), Overlay::Closed);
        assert_eq!(store.flags().default_trip_name, None);
    }

    #[test]
    fn test_trip_name_ignored_when_closing() {
        let store = ModalStore::new();
        store.toggle_add_expense(None);

        store.toggle_add_expense(Some("Berlin".to_string()));

        assert_eq!(store.snapshot(), Overlay::Closed);
    }

    #[test]
    fn test_empty_trip_name_is_not_attached() {
        let store = ModalStore::new();
        store.toggle_add_expense(Some(String::new()));

        assert_eq!(
            store.snapshot(),
            Overlay::AddExpense {
                default_trip_name: None
            }
        );
    }

    #[test]
    fn test_other_overlay_clears_trip_name() {
        let store = ModalStore::new();
        store.toggle_add_expense(Some("Paris Trip".to_string()));

        store.toggle_add_trip();

        assert_eq!(store.flags().default_trip_name, None);
    }

    // -------------------------------------------------------------------------
    // Receipt Viewer Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_open_receipt_viewer_is_not_a_toggle() {
        let store = ModalStore::new();

        store.open_receipt_viewer("u1");
        assert!(store.snapshot().receipt_viewer_open());
        assert_eq!(store.snapshot().current_receipt_url(), Some("u1"));

        store.open_receipt_viewer("u2");
        assert!(store.snapshot().receipt_viewer_open());
        assert_eq!(store.snapshot().current_receipt_url(), Some("u2"));
    }

    #[test]
    fn test_close_receipt_viewer_clears_url() {
        let store = ModalStore::new();
        store.open_receipt_viewer("u1");

        store.close_receipt_viewer();

        assert_eq!(store.snapshot(), Overlay::Closed);
        assert_eq!(store.flags().current_receipt_url, None);
    }

    #[test]
    fn test_close_receipt_viewer_leaves_other_overlays() {
        let store = ModalStore::new();
        store.toggle_add_trip();

        store.close_receipt_viewer();

        assert_eq!(store.snapshot(), Overlay::AddTrip);
    }

    // -------------------------------------------------------------------------
    // Reset Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_close_all_from_every_state() {
        for store in every_state() {
            store.close_all();
            assert_eq!(store.snapshot(), Overlay::Closed);
            assert_eq!(store.flags(), ModalFlags::default());
        }
    }

    #[test]
    fn test_close_all_when_closed_sends_no_event() {
        let store = ModalStore::new();
        let mut rx = store.subscribe();

        store.close_all();

        let mut changed = task::spawn(rx.changed());
        assert_pending!(changed.poll());

        store.toggle_add_trip();
        assert!(changed.is_woken());
        assert_ready!(changed.poll()).unwrap();
    }

    // -------------------------------------------------------------------------
    // Snapshot Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_at_most_one_open_in_every_state() {
        for store in every_state() {
            let f = store.flags();
            let open = [f.add_expense_open, f.add_trip_open, f.receipt_viewer_open]
                .iter()
                .filter(|open| **open)
                .count();
            assert!(open <= 1);
            assert_eq!(f.current_receipt_url.is_some(), f.receipt_viewer_open);
            if f.default_trip_name.is_some() {
                assert!(f.add_expense_open);
            }
        }
    }

    #[test]
    fn test_overlay_serializes_with_kind_tag() {
        let overlay = Overlay::AddExpense {
            default_trip_name: Some("Paris Trip".to_string()),
        };
        let json = serde_json::to_value(&overlay).unwrap();

        assert_eq!(json["kind"], "addExpense");
        assert_eq!(json["defaultTripName"], "Paris Trip");
    }

    #[test]
    fn test_flags_serialize_in_camel_case() {
        let flags = ModalFlags::from(&Overlay::ReceiptViewer {
            url: "u1".to_string(),
        });
        let json = serde_json::to_value(&flags).unwrap();

        assert_eq!(json["receiptViewerOpen"], true);
        assert_eq!(json["currentReceiptUrl"], "u1");
        assert_eq!(json["addExpenseOpen"], false);
    }

    #[test]
    fn test_concurrent_toggles_never_tear() {
        let store = Arc::new(ModalStore::new());

        let expense = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    store.toggle_add_expense(Some(format!("trip-{i}")));
                }
            })
        };
        let trips = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    store.toggle_add_trip();
                }
            })
        };

        let mut rx = store.subscribe();
        for _ in 0..200 {
            let f = ModalFlags::from(&*rx.borrow_and_update());
            assert!(!(f.add_expense_open && f.add_trip_open));
            assert!(f.default_trip_name.is_none() || f.add_expense_open);
        }

        expense.join().unwrap();
        trips.join().unwrap();
    }
}
