//! IKEv2 building blocks used by MOBIKE
//!
//! This module holds the parts of RFC 7296 that the MOBIKE task (RFC 4555)
//! works against: exchange and notify constants, notify payloads, the
//! in-memory message model, the IKE SA and the task abstraction.
//!
//! # Notify Payload Format
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Protocol ID  |   SPI Size    |      Notify Message Type      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ~                Security Parameter Index (SPI)                 ~
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ~                       Notification Data                       ~
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! # References
//!
//! - [RFC 7296](https://datatracker.ietf.org/doc/html/rfc7296) - IKEv2 Protocol
//! - [RFC 4555](https://datatracker.ietf.org/doc/html/rfc4555) - IKEv2 Mobility and Multihoming Protocol

pub mod constants;
pub mod ike_sa;
pub mod message;
pub mod mobike;
pub mod payload;
pub mod task;

pub use constants::*;
pub use ike_sa::*;
pub use message::*;
pub use mobike::*;
pub use payload::*;
pub use task::*;
