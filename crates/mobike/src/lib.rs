//! MOBIKE (IKEv2 Mobility and Multihoming) for the Fynx security ecosystem.
//!
//! This crate provides the MOBIKE task of an IKEv2 daemon:
//!
//! - **Negotiation** - MOBIKE_SUPPORTED and address lists in IKE_AUTH
//! - **Roaming** - moving an established IKE SA with UPDATE_SA_ADDRESSES
//! - **NAT detection** - optional re-detection on the new path
//!
//! # Features
//!
//! - `ipsec` (default) - IKEv2 MOBIKE support
//!
//! # Example
//!
//! ```rust
//! use fynx_mobike::ipsec::ikev2::{ExchangeType, IkeMessage, IkePayload, IkeSa, MobikeTask, NotifyType, Role, Task};
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
//! let kernel = Arc::new(StaticKernelInterface::new(vec!["10.0.0.5".parse().unwrap()]));
//! let mut task = MobikeTask::new(ike_sa, kernel, Role::Initiator);
//!
//! // IKE_AUTH request carrying the first Child SA
//! let mut request = IkeMessage::request(ExchangeType::IkeAuth, 1);
//! request.add_payload(IkePayload::SA(Vec::new()));
//! task.build(&mut request).unwrap();
//!
//! assert_eq!(
//!     request.notify_types(),
//!     vec![NotifyType::MobikeSupported, NotifyType::AdditionalIp4Address]
//! );
//! ```
//!
//! # Security
//!
//! - No `unsafe` code
//! - Secret material (COOKIE2) is wiped with `zeroize`
//! - Malformed peer addresses are rejected, never truncated or padded
//!
//! # References
//!
//! - [RFC 4555](https://datatracker.ietf.org/doc/html/rfc4555) - IKEv2 Mobility and Multihoming Protocol
//! - [RFC 7296](https://datatracker.ietf.org/doc/html/rfc7296) - Internet Key Exchange Protocol Version 2 (IKEv2)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

#[cfg(feature = "ipsec")]
pub mod ipsec;
