//! Structured logging for MOBIKE operations
//!
//! Provides structured, contextual logging using the `tracing` framework.
//! Events about an IKE SA carry its SPIs; task decisions carry the task,
//! role and exchange instead.
//!
//! # Log Levels
//!
//! - **TRACE**: Task decisions per exchange
//! - **DEBUG**: Individual notifies (peer capabilities, peer addresses)
//! - **INFO**: Address switchover, NAT detection results, SA migration
//!
//! # Example
//!
//! ```no_run
//! use fynx_mobike::ipsec::logging;
//!
//! // Initialize tracing subscriber (in tests or applications)
//! tracing_subscriber::fmt()
//!     .with_env_filter("fynx_mobike::ipsec=debug")
//!     .init();
//!
//! logging::log_mobike_supported(&[0x01; 8], &[0x02; 8]);
//! ```

use crate::ipsec::ikev2::{ExchangeType, Role, TaskStatus, TaskType};
use crate::ipsec::nat::NatStatus;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info, trace};

/// Log that the peer announced MOBIKE support
pub fn log_mobike_supported(spi_i: &[u8], spi_r: &[u8]) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        "peer supports MOBIKE"
    );
}

/// Log an additional address learned from the peer
pub fn log_peer_additional_address(spi_i: &[u8], spi_r: &[u8], addr: &IpAddr) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        addr = %addr,
        "got additional MOBIKE peer address"
    );
}

/// Log a flush of the peer's additional address list
///
/// # Arguments
///
/// * `removed` - Number of addresses dropped
pub fn log_peer_addresses_flushed(spi_i: &[u8], spi_r: &[u8], removed: usize) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        removed = removed,
        "flushed additional MOBIKE peer addresses"
    );
}

/// Log the address list announced to the peer
///
/// # Arguments
///
/// * `announced` - Number of ADDITIONAL_*_ADDRESS notifies added, 0 means NO_ADDITIONAL_ADDRESSES
pub fn log_address_list_built(spi_i: &[u8], spi_r: &[u8], announced: usize) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        announced = announced,
        "built MOBIKE address list"
    );
}

/// Log a staged roam request
pub fn log_roam_staged(
    spi_i: &[u8],
    spi_r: &[u8],
    me: Option<SocketAddr>,
    other: Option<SocketAddr>,
) {
    debug!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        me = ?me,
        other = ?other,
        "MOBIKE roam staged"
    );
}

/// Log the switch of an IKE SA to a new address pair
pub fn log_sa_hosts_updated(
    spi_i: &[u8],
    spi_r: &[u8],
    old: (SocketAddr, SocketAddr),
    new: (SocketAddr, SocketAddr),
) {
    info!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        old_me = %old.0,
        old_other = %old.1,
        new_me = %new.0,
        new_other = %new.1,
        "IKE SA addresses updated"
    );
}

/// Log the outcome of a NAT detection
pub fn log_nat_status(spi_i: &[u8], spi_r: &[u8], status: NatStatus) {
    info!(
        ike_spi_i = %hex::encode(spi_i),
        ike_spi_r = %hex::encode(spi_r),
        local_nat = status.has_local_nat(),
        remote_nat = status.has_remote_nat(),
        "NAT detection completed"
    );
}

/// Log a task decision for one exchange
///
/// # Arguments
///
/// * `call` - "build" or "process"
/// * `action` - What the task did with the message
pub fn log_task_decision(
    task: TaskType,
    role: Role,
    exchange: ExchangeType,
    call: &str,
    action: &str,
    status: TaskStatus,
) {
    trace!(
        task = %task,
        role = %role,
        exchange = %exchange,
        call = call,
        action = action,
        status = ?status,
        "task decision"
    );
}

/// Log the migration of a task to a successor IKE SA
pub fn log_task_migrated(new_spi_i: &[u8], new_spi_r: &[u8], had_pending_roam: bool) {
    info!(
        new_spi_i = %hex::encode(new_spi_i),
        new_spi_r = %hex::encode(new_spi_r),
        dropped_roam = had_pending_roam,
        "MOBIKE task migrated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_functions() {
        // These tests just verify the functions compile and execute
        // Actual log output would require tracing subscriber setup
        let spi_i = [0x01; 8];
        let spi_r = [0x02; 8];
        let me: SocketAddr = "192.0.2.1:4500".parse().unwrap();
        let other: SocketAddr = "198.51.100.1:4500".parse().unwrap();

        log_mobike_supported(&spi_i, &spi_r);
        log_peer_additional_address(&spi_i, &spi_r, &"10.0.0.1".parse().unwrap());
        log_peer_addresses_flushed(&spi_i, &spi_r, 3);
        log_address_list_built(&spi_i, &spi_r, 0);
        log_roam_staged(&spi_i, &spi_r, Some(me), None);
        log_sa_hosts_updated(&spi_i, &spi_r, (me, other), (other, me));
        log_nat_status(&spi_i, &spi_r, NatStatus::BothNat);
        log_task_decision(
            TaskType::IkeMobike,
            Role::Initiator,
            ExchangeType::Informational,
            "build",
            "update_addresses",
            TaskStatus::NeedMore,
        );
        log_task_migrated(&spi_i, &spi_r, true);
    }
}
