//! Metrics for MOBIKE operations
//!
//! Provides counters for monitoring address announcements and switchovers.
//! All metrics use atomic operations for thread-safe updates.
//!
//! # Example
//!
//! ```
//! use fynx_mobike::ipsec::metrics::MobikeMetrics;
//!
//! let metrics = MobikeMetrics::new();
//!
//! metrics.record_roam_applied();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.roams_applied, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// MOBIKE metrics for monitoring
///
/// Cloning shares the counters, so one instance can be handed to every task
/// of the daemon.
#[derive(Debug, Clone, Default)]
pub struct MobikeMetrics {
    /// IKE SAs on which the peer announced MOBIKE support
    pub mobike_negotiated: Arc<AtomicU64>,

    /// Address lists announced to peers
    pub address_lists_sent: Arc<AtomicU64>,

    /// UPDATE_SA_ADDRESSES requests sent
    pub address_updates_sent: Arc<AtomicU64>,

    /// Address switchovers applied to IKE SAs
    pub roams_applied: Arc<AtomicU64>,

    /// Peer additional address lists flushed
    pub peer_address_flushes: Arc<AtomicU64>,

    /// Peer additional addresses learned
    pub peer_addresses_learned: Arc<AtomicU64>,
}

impl MobikeMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a peer announcing MOBIKE support
    pub fn record_mobike_negotiated(&self) {
        self.mobike_negotiated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an address list sent to a peer
    pub fn record_address_list_sent(&self) {
        self.address_lists_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an UPDATE_SA_ADDRESSES request
    pub fn record_address_update_sent(&self) {
        self.address_updates_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an applied address switch
    pub fn record_roam_applied(&self) {
        self.roams_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` flushes of peer address lists
    pub fn record_peer_address_flushes(&self, count: u64) {
        self.peer_address_flushes.fetch_add(count, Ordering::Relaxed);
    }

    /// Record `count` learned peer addresses
    pub fn record_peer_addresses_learned(&self, count: u64) {
        self.peer_addresses_learned.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MobikeMetricsSnapshot {
        MobikeMetricsSnapshot {
            mobike_negotiated: self.mobike_negotiated.load(Ordering::Relaxed),
            address_lists_sent: self.address_lists_sent.load(Ordering::Relaxed),
            address_updates_sent: self.address_updates_sent.load(Ordering::Relaxed),
            roams_applied: self.roams_applied.load(Ordering::Relaxed),
            peer_address_flushes: self.peer_address_flushes.load(Ordering::Relaxed),
            peer_addresses_learned: self.peer_addresses_learned.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.mobike_negotiated.store(0, Ordering::Relaxed);
        self.address_lists_sent.store(0, Ordering::Relaxed);
        self.address_updates_sent.store(0, Ordering::Relaxed);
        self.roams_applied.store(0, Ordering::Relaxed);
        self.peer_address_flushes.store(0, Ordering::Relaxed);
        self.peer_addresses_learned.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`MobikeMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MobikeMetricsSnapshot {
    /// IKE SAs on which the peer announced MOBIKE support
    pub mobike_negotiated: u64,
    /// Address lists announced to peers
    pub address_lists_sent: u64,
    /// UPDATE_SA_ADDRESSES requests sent
    pub address_updates_sent: u64,
    /// Address switchovers applied to IKE SAs
    pub roams_applied: u64,
    /// Peer additional address lists flushed
    pub peer_address_flushes: u64,
    /// Peer additional addresses learned
    pub peer_addresses_learned: u64,
}
