//! Task interface of the IKE SA exchange pipeline
//!
//! The SA's task manager drives every queued task through each exchange: it
//! calls `build` while assembling an outgoing message and `process` on every
//! incoming one, and drops a task once it reports [`TaskStatus::Success`].

use super::ike_sa::SharedIkeSa;
use super::message::IkeMessage;
use crate::ipsec::Result;
use std::fmt;

/// Outcome of a build or process call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task needs more exchanges
    NeedMore,
    /// Task is done
    Success,
}

/// Kind of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// NAT detection (RFC 7296 Section 2.23)
    IkeNatd,
    /// MOBIKE (RFC 4555)
    IkeMobike,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::IkeNatd => f.write_str("IKE_NATD"),
            TaskType::IkeMobike => f.write_str("IKE_MOBIKE"),
        }
    }
}

/// Which side of an exchange a task runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sends the requests of the exchange
    Initiator,
    /// Answers the requests of the exchange
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Responder => f.write_str("responder"),
        }
    }
}

/// A unit of work scheduled on an IKE SA
///
/// Calls on one task are strictly sequential; `migrate` is never issued
/// while a `build` or `process` is in flight.
pub trait Task: Send {
    /// Add this task's payloads to an outgoing message
    fn build(&mut self, message: &mut IkeMessage) -> Result<TaskStatus>;

    /// Evaluate an incoming message
    fn process(&mut self, message: &IkeMessage) -> Result<TaskStatus>;

    /// Kind of this task
    fn task_type(&self) -> TaskType;

    /// Rebind the task to a successor of its IKE SA
    fn migrate(&mut self, ike_sa: SharedIkeSa);

    /// Release owned resources, safe to call more than once
    fn destroy(&mut self);
}
