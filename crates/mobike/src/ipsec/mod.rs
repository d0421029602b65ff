//! IKEv2 mobility and multihoming (MOBIKE)
//!
//! This module implements the MOBIKE extension of IKEv2 (RFC 4555):
//!
//! - **Capability negotiation**: MOBIKE_SUPPORTED in IKE_AUTH
//! - **Address announcement**: ADDITIONAL_IP4/IP6_ADDRESS, NO_ADDITIONAL_ADDRESSES
//! - **Address update**: UPDATE_SA_ADDRESSES in INFORMATIONAL exchanges
//! - **NAT detection**: NAT_DETECTION_*_IP re-run on the new path (RFC 7296)
//!
//! # Architecture
//!
//! ```text
//! Task manager
//!   ├── build(message)   ──┐
//!   └── process(message) ──┤
//!                          ↓
//!                    MobikeTask ── decide(role, call, leg, roam)
//!                      ├── address list  ← KernelInterface
//!                      ├── IKE SA        (hosts, extensions, peer addresses)
//!                      └── IkeNatd       (optional)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use fynx_mobike::ipsec::ikev2::{
//!     ExchangeType, IkeMessage, IkeSa, MobikeTask, NotifyType, Role, Task,
//! };
//! use fynx_mobike::ipsec::kernel::StaticKernelInterface;
//! use std::sync::Arc;
//!
//! let ike_sa = IkeSa::new(
//!     [1; 8],
//!     [2; 8],
//!     "192.0.2.1:4500".parse().unwrap(),
//!     "198.51.100.1:4500".parse().unwrap(),
//! )
//! .into_shared();
//! let kernel = Arc::new(StaticKernelInterface::new(vec![
//!     "192.0.2.1".parse().unwrap(),
//!     "203.0.113.5".parse().unwrap(),
//! ]));
//!
//! let mut task = MobikeTask::new(ike_sa.clone(), kernel, Role::Initiator);
//! task.roam(Some("203.0.113.5:4500".parse().unwrap()), None);
//!
//! let mut request = IkeMessage::request(ExchangeType::Informational, 2);
//! task.build(&mut request).unwrap();
//!
//! assert!(request.get_notify(NotifyType::UpdateSaAddresses).is_some());
//! assert_eq!(ike_sa.lock().my_host(), "203.0.113.5:4500".parse().unwrap());
//! ```
//!
//! # References
//!
//! - [RFC 4555](https://datatracker.ietf.org/doc/html/rfc4555) - IKEv2 Mobility and Multihoming Protocol
//! - [RFC 7296](https://datatracker.ietf.org/doc/html/rfc7296) - Internet Key Exchange Protocol Version 2 (IKEv2)

pub mod config;
pub mod error;
pub mod ikev2;
pub mod kernel;
pub mod logging;
pub mod metrics;
pub mod nat;

pub use config::{MobikeConfig, MobikeConfigBuilder};
pub use error::{Error, Result};
pub use ikev2::{MobikeTask, Role, Task, TaskStatus};
pub use kernel::{KernelInterface, StaticKernelInterface};
pub use metrics::{MobikeMetrics, MobikeMetricsSnapshot};
pub use nat::{IkeNatd, NatDetectionHash, NatStatus};
