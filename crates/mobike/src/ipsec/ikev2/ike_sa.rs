//! IKE SA view used by the task pipeline
//!
//! Holds the parts of an established IKE SA that MOBIKE and NAT detection
//! read or change: the SPIs, the primary address pair, negotiated extensions
//! and the additional addresses announced by the peer.

use super::constants::Extension;
use crate::ipsec::nat::NatStatus;
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// IKE SA shared between the SA manager and the tasks queued on it
pub type SharedIkeSa = Arc<Mutex<IkeSa>>;

/// Peer additional address list (RFC 4555 Section 3.4)
///
/// Keeps insertion order and never holds the same address twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalAddresses {
    addrs: Vec<IpAddr>,
}

impl AdditionalAddresses {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address, returns false if it was already present
    pub fn add(&mut self, addr: IpAddr) -> bool {
        if self.addrs.contains(&addr) {
            return false;
        }
        self.addrs.push(addr);
        true
    }

    /// Remove all addresses, returns how many were removed
    pub fn flush(&mut self) -> usize {
        let removed = self.addrs.len();
        self.addrs.clear();
        removed
    }

    /// Check whether an address is present
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.addrs.contains(addr)
    }

    /// Iterate addresses in the order they were learned
    pub fn iter(&self) -> impl Iterator<Item = &IpAddr> {
        self.addrs.iter()
    }

    /// Number of addresses
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

/// IKE Security Association
#[derive(Debug, Clone)]
pub struct IkeSa {
    /// Initiator SPI
    pub initiator_spi: [u8; 8],

    /// Responder SPI
    pub responder_spi: [u8; 8],

    my_host: SocketAddr,
    other_host: SocketAddr,
    extensions: u8,
    additional_addresses: AdditionalAddresses,
    nat_status: Option<NatStatus>,
}

impl IkeSa {
    /// Create IKE SA between `my_host` and `other_host`
    pub fn new(
        initiator_spi: [u8; 8],
        responder_spi: [u8; 8],
        my_host: SocketAddr,
        other_host: SocketAddr,
    ) -> Self {
        IkeSa {
            initiator_spi,
            responder_spi,
            my_host,
            other_host,
            extensions: 0,
            additional_addresses: AdditionalAddresses::new(),
            nat_status: None,
        }
    }

    /// Wrap into a shareable handle
    pub fn into_shared(self) -> SharedIkeSa {
        Arc::new(Mutex::new(self))
    }

    /// Local endpoint of the SA
    pub fn my_host(&self) -> SocketAddr {
        self.my_host
    }

    /// Remote endpoint of the SA
    pub fn other_host(&self) -> SocketAddr {
        self.other_host
    }

    /// Replace the endpoints that are given, keep the others
    pub fn update_hosts(&mut self, me: Option<SocketAddr>, other: Option<SocketAddr>) {
        if let Some(me) = me {
            self.my_host = me;
        }
        if let Some(other) = other {
            self.other_host = other;
        }
    }

    /// Record that the peer supports an extension
    pub fn enable_extension(&mut self, extension: Extension) {
        self.extensions |= extension.bit();
    }

    /// Check whether the peer supports an extension
    pub fn supports_extension(&self, extension: Extension) -> bool {
        self.extensions & extension.bit() != 0
    }

    /// Additional addresses announced by the peer
    pub fn additional_addresses(&self) -> &AdditionalAddresses {
        &self.additional_addresses
    }

    /// Mutable access to the peer's additional addresses
    pub fn additional_addresses_mut(&mut self) -> &mut AdditionalAddresses {
        &mut self.additional_addresses
    }

    /// Result of the last NAT detection on this SA
    pub fn nat_status(&self) -> Option<NatStatus> {
        self.nat_status
    }

    /// Store the result of a NAT detection
    pub fn set_nat_status(&mut self, status: NatStatus) {
        self.nat_status = Some(status);
        if status.is_nat_present() {
            self.enable_extension(Extension::NatT);
        }
    }
}
