//! NAT Detection (RFC 7296 Section 2.23)
//!
//! # NAT Detection Algorithm
//!
//! Both peers exchange NAT_DETECTION_SOURCE_IP and
//! NAT_DETECTION_DESTINATION_IP notifies containing:
//!
//! ```text
//! HASH = SHA-1(SPIi | SPIr | IP | Port)
//!
//! - NAT_DETECTION_SOURCE_IP:      hash over the sender's own address
//! - NAT_DETECTION_DESTINATION_IP: hash over the address it sends to
//! ```
//!
//! A received destination hash that differs from the hash over our own
//! address means our side is behind a NAT; a received source hash that
//! differs from the hash over the address we see the peer on means the peer
//! is.
//!
//! The [`IkeNatd`] task runs this exchange on an IKE SA. MOBIKE reuses it to
//! re-check the path after switching addresses.

use crate::ipsec::ikev2::{
    IkeMessage, NotifyType, Role, SharedIkeSa, Task, TaskStatus, TaskType,
};
use crate::ipsec::{logging, Error, Result};
use sha1::{Digest, Sha1};
use std::net::{IpAddr, SocketAddr};

/// NAT Detection Hash
///
/// SHA-1 over the SA's SPIs and one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatDetectionHash {
    /// 20-byte SHA-1 hash
    pub hash: [u8; 20],
}

impl NatDetectionHash {
    /// Hash size in bytes
    pub const SIZE: usize = 20;

    /// Compute NAT detection hash
    ///
    /// # Arguments
    ///
    /// * `spi_i` - Initiator's SPI
    /// * `spi_r` - Responder's SPI
    /// * `endpoint` - IP address (4 or 16 bytes) and UDP port (2 bytes, big-endian)
    pub fn compute(spi_i: &[u8; 8], spi_r: &[u8; 8], endpoint: SocketAddr) -> Self {
        let mut hasher = Sha1::new();

        hasher.update(spi_i);
        hasher.update(spi_r);

        match endpoint.ip() {
            IpAddr::V4(ipv4) => hasher.update(ipv4.octets()),
            IpAddr::V6(ipv6) => hasher.update(ipv6.octets()),
        }

        hasher.update(endpoint.port().to_be_bytes());

        let mut hash = [0u8; Self::SIZE];
        hash.copy_from_slice(&hasher.finalize());

        NatDetectionHash { hash }
    }

    /// Create from raw hash bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let hash: [u8; Self::SIZE] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: Self::SIZE,
            actual: bytes.len(),
        })?;
        Ok(NatDetectionHash { hash })
    }

    /// Get hash as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.hash
    }
}

/// NAT Detection Result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatStatus {
    /// No NAT detected
    NoNat,

    /// NAT on our side
    LocalNat,

    /// NAT on the peer's side
    RemoteNat,

    /// NAT on both sides
    BothNat,
}

impl NatStatus {
    /// Combine the per-side results
    pub fn from_sides(local_nat: bool, remote_nat: bool) -> Self {
        match (local_nat, remote_nat) {
            (false, false) => NatStatus::NoNat,
            (true, false) => NatStatus::LocalNat,
            (false, true) => NatStatus::RemoteNat,
            (true, true) => NatStatus::BothNat,
        }
    }

    /// Check if any NAT is present
    pub fn is_nat_present(&self) -> bool {
        !matches!(self, NatStatus::NoNat)
    }

    /// Check if local NAT is present
    pub fn has_local_nat(&self) -> bool {
        matches!(self, NatStatus::LocalNat | NatStatus::BothNat)
    }

    /// Check if remote NAT is present
    pub fn has_remote_nat(&self) -> bool {
        matches!(self, NatStatus::RemoteNat | NatStatus::BothNat)
    }
}

/// NAT detection task
pub struct IkeNatd {
    ike_sa: SharedIkeSa,
    role: Role,
}

impl IkeNatd {
    /// Create NAT detection task for an IKE SA
    pub fn new(ike_sa: SharedIkeSa, role: Role) -> Self {
        IkeNatd { ike_sa, role }
    }

    fn build_notifies(&self, message: &mut IkeMessage) {
        let sa = self.ike_sa.lock();
        let source = NatDetectionHash::compute(&sa.initiator_spi, &sa.responder_spi, sa.my_host());
        let dest = NatDetectionHash::compute(&sa.initiator_spi, &sa.responder_spi, sa.other_host());
        drop(sa);

        message.add_notify(false, NotifyType::NatDetectionSourceIp, source.hash.to_vec());
        message.add_notify(false, NotifyType::NatDetectionDestinationIp, dest.hash.to_vec());
    }

    fn process_notifies(&self, message: &IkeMessage) -> Result<()> {
        let mut sa = self.ike_sa.lock();
        let expected_source =
            NatDetectionHash::compute(&sa.initiator_spi, &sa.responder_spi, sa.other_host());
        let expected_dest =
            NatDetectionHash::compute(&sa.initiator_spi, &sa.responder_spi, sa.my_host());

        let mut source_seen = false;
        let mut source_matched = false;
        let mut dest_seen = false;
        let mut dest_matched = false;

        for notify in message.notifies() {
            match notify.notify_type {
                NotifyType::NatDetectionSourceIp => {
                    let hash = NatDetectionHash::from_bytes(&notify.data)?;
                    source_seen = true;
                    source_matched |= hash == expected_source;
                }
                NotifyType::NatDetectionDestinationIp => {
                    let hash = NatDetectionHash::from_bytes(&notify.data)?;
                    dest_seen = true;
                    dest_matched |= hash == expected_dest;
                }
                _ => {}
            }
        }

        // a peer without NAT-T support sends neither notify
        if source_seen && dest_seen {
            let status = NatStatus::from_sides(!dest_matched, !source_matched);
            logging::log_nat_status(&sa.initiator_spi, &sa.responder_spi, status);
            sa.set_nat_status(status);
        }

        Ok(())
    }
}

impl Task for IkeNatd {
    fn build(&mut self, message: &mut IkeMessage) -> Result<TaskStatus> {
        self.build_notifies(message);
        Ok(match self.role {
            Role::Initiator => TaskStatus::NeedMore,
            Role::Responder => TaskStatus::Success,
        })
    }

    fn process(&mut self, message: &IkeMessage) -> Result<TaskStatus> {
        self.process_notifies(message)?;
        Ok(match self.role {
            Role::Initiator => TaskStatus::Success,
            Role::Responder => TaskStatus::NeedMore,
        })
    }

    fn task_type(&self) -> TaskType {
        TaskType::IkeNatd
    }

    fn migrate(&mut self, ike_sa: SharedIkeSa) {
        self.ike_sa = ike_sa;
    }

    fn destroy(&mut self) {}
}
