//! IKEv2 Mobility and Multihoming (MOBIKE)
//!
//! Implements the MOBIKE task as defined in RFC 4555.
//!
//! # Overview
//!
//! MOBIKE rides on two unrelated exchanges:
//!
//! - **IKE_AUTH**: both peers announce MOBIKE_SUPPORTED and the list of
//!   additional addresses they can be reached on.
//! - **INFORMATIONAL**: the initiator moves the IKE SA to a new address pair
//!   with UPDATE_SA_ADDRESSES and re-announces its address list.
//!
//! ```text
//! Initiator                              Responder
//! ---------                              ---------
//! HDR, SK {IDi, AUTH, SA, TSi, TSr,
//!          N(MOBIKE_SUPPORTED),
//!          N(ADDITIONAL_*_ADDRESS)+}  -->
//!                                   <--  HDR, SK {IDr, AUTH, SA, TSi, TSr,
//!                                                 N(MOBIKE_SUPPORTED),
//!                                                 N(ADDITIONAL_*_ADDRESS)+}
//!
//! (path change)
//! HDR, SK {N(UPDATE_SA_ADDRESSES),
//!          N(NO_ADDITIONAL_ADDRESSES)} -->
//!                                   <--  HDR, SK {}
//! ```
//!
//! The task keeps no explicit state. What it does on a message follows from
//! its role, the exchange type, whether an SA payload is present and whether
//! a roam is staged; [`decide`] captures that table.
//!
//! An ADDITIONAL_*_ADDRESS list replaces whatever the peer announced before,
//! and the initiator switches the SA to the new address pair as soon as it
//! sends UPDATE_SA_ADDRESSES, without waiting for the response.
//!
//! # References
//!
//! - [RFC 4555](https://datatracker.ietf.org/doc/html/rfc4555) - IKEv2 Mobility and Multihoming Protocol

use super::constants::{ExchangeType, Extension, NotifyType};
use super::ike_sa::{IkeSa, SharedIkeSa};
use super::message::IkeMessage;
use super::payload::{additional_address_type, decode_additional_address, encode_address};
use super::task::{Role, Task, TaskStatus, TaskType};
use crate::ipsec::config::MobikeConfig;
use crate::ipsec::kernel::KernelInterface;
use crate::ipsec::metrics::MobikeMetrics;
use crate::ipsec::nat::IkeNatd;
use crate::ipsec::{logging, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

/// Exchange leg as far as MOBIKE is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// IKE_AUTH message carrying an SA payload
    AuthWithSa,
    /// INFORMATIONAL exchange
    Informational,
    /// Anything else
    Other,
}

impl Leg {
    /// Classify from exchange type and SA payload presence
    pub fn classify(exchange_type: ExchangeType, has_sa_payload: bool) -> Self {
        match exchange_type {
            ExchangeType::IkeAuth if has_sa_payload => Leg::AuthWithSa,
            ExchangeType::Informational => Leg::Informational,
            _ => Leg::Other,
        }
    }

    /// Classify a message
    pub fn of(message: &IkeMessage) -> Self {
        Self::classify(message.exchange_type(), message.has_sa_payload())
    }
}

/// Which task entry point is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// Building an outgoing message
    Build,
    /// Processing an incoming message
    Process,
}

/// What the task does with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the message alone
    None,
    /// Add MOBIKE_SUPPORTED and the address list
    AnnounceSupport,
    /// Add MOBIKE_SUPPORTED and the address list if the peer supports MOBIKE
    AnnounceIfSupported,
    /// Add UPDATE_SA_ADDRESSES and the address list, then switch addresses
    UpdateAddresses,
    /// Evaluate the MOBIKE notifies of the message
    ProcessNotifies,
}

impl Action {
    /// Short name for logging
    pub fn as_str(self) -> &'static str {
        match self {
            Action::None => "none",
            Action::AnnounceSupport => "announce_support",
            Action::AnnounceIfSupported => "announce_if_supported",
            Action::UpdateAddresses => "update_addresses",
            Action::ProcessNotifies => "process_notifies",
        }
    }
}

/// Action and reported status for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// What to do with the message
    pub action: Action,
    /// Status reported to the task manager
    pub status: TaskStatus,
}

impl Decision {
    fn new(action: Action, status: TaskStatus) -> Self {
        Decision { action, status }
    }
}

/// MOBIKE decision table
///
/// Unrelated legs never fail; they report [`TaskStatus::NeedMore`] so the
/// task stays queued for the exchange that concerns it.
pub fn decide(role: Role, call: Call, leg: Leg, roam_pending: bool) -> Decision {
    use TaskStatus::{NeedMore, Success};

    match (role, call, leg) {
        (Role::Initiator, Call::Build, Leg::AuthWithSa) => {
            Decision::new(Action::AnnounceSupport, NeedMore)
        }
        (Role::Initiator, Call::Build, _) if roam_pending => {
            Decision::new(Action::UpdateAddresses, NeedMore)
        }
        (Role::Initiator, Call::Build, _) => Decision::new(Action::None, NeedMore),

        (Role::Initiator, Call::Process, Leg::AuthWithSa) => {
            Decision::new(Action::ProcessNotifies, Success)
        }
        (Role::Initiator, Call::Process, Leg::Informational) => {
            Decision::new(Action::None, Success)
        }
        (Role::Initiator, Call::Process, Leg::Other) => Decision::new(Action::None, NeedMore),

        (Role::Responder, Call::Process, Leg::AuthWithSa | Leg::Informational) => {
            Decision::new(Action::ProcessNotifies, NeedMore)
        }
        (Role::Responder, Call::Process, Leg::Other) => Decision::new(Action::None, NeedMore),

        (Role::Responder, Call::Build, Leg::AuthWithSa) => {
            Decision::new(Action::AnnounceIfSupported, Success)
        }
        (Role::Responder, Call::Build, Leg::Informational) => {
            Decision::new(Action::None, Success)
        }
        (Role::Responder, Call::Build, Leg::Other) => Decision::new(Action::None, NeedMore),
    }
}

/// Add ADDITIONAL_*_ADDRESS notifies for every local address except the
/// SA's own, or a single NO_ADDITIONAL_ADDRESSES if there is none
///
/// Returns the number of addresses announced.
pub fn build_address_list(
    ike_sa: &IkeSa,
    kernel: &dyn KernelInterface,
    message: &mut IkeMessage,
) -> usize {
    let me = ike_sa.my_host().ip();
    let mut announced = 0;

    for addr in kernel.local_addresses() {
        // "additional" excludes the address the IKE SA runs on
        if addr == me {
            continue;
        }
        message.add_notify(false, additional_address_type(&addr), encode_address(&addr));
        announced += 1;
    }

    // an empty list has to be explicit, any address notify replaces the peer's list
    if announced == 0 {
        message.add_notify(false, NotifyType::NoAdditionalAddresses, Vec::new());
    }

    logging::log_address_list_built(&ike_sa.initiator_spi, &ike_sa.responder_spi, announced);
    announced
}

/// What a pass over a message's notifies changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    /// Peer sent MOBIKE_SUPPORTED
    pub mobike_supported: bool,
    /// Number of times the peer address list was flushed
    pub flushes: usize,
    /// Addresses added to the peer address list
    pub addresses_learned: usize,
    /// Peer sent UPDATE_SA_ADDRESSES
    pub update_requested: bool,
}

fn flush_additional_addresses(ike_sa: &mut IkeSa, outcome: &mut ProcessOutcome) {
    let removed = ike_sa.additional_addresses_mut().flush();
    outcome.flushes += 1;
    logging::log_peer_addresses_flushed(&ike_sa.initiator_spi, &ike_sa.responder_spi, removed);
}

/// Evaluate the MOBIKE notifies of a message in wire order
///
/// The first ADDITIONAL_*_ADDRESS notify flushes the peer's address list
/// once; the following ones build the new list. NO_ADDITIONAL_ADDRESSES
/// always flushes.
///
/// # Errors
///
/// Returns the decoding error of the first malformed address notify. Notifies
/// before it have already been applied.
pub fn process_payloads(ike_sa: &mut IkeSa, message: &IkeMessage) -> Result<ProcessOutcome> {
    let mut outcome = ProcessOutcome::default();
    apply_notifies(ike_sa, message, &mut outcome)?;
    Ok(outcome)
}

/// Like [`process_payloads`], but `outcome` also reflects what was applied
/// before a decoding error
fn apply_notifies(
    ike_sa: &mut IkeSa,
    message: &IkeMessage,
    outcome: &mut ProcessOutcome,
) -> Result<()> {
    let mut first = true;

    for notify in message.notifies() {
        match notify.notify_type {
            NotifyType::MobikeSupported => {
                logging::log_mobike_supported(&ike_sa.initiator_spi, &ike_sa.responder_spi);
                ike_sa.enable_extension(Extension::Mobike);
                outcome.mobike_supported = true;
            }
            kind if kind.is_additional_address() => {
                if first {
                    flush_additional_addresses(ike_sa, outcome);
                    first = false;
                }
                let addr = decode_additional_address(notify.notify_type, &notify.data)?;
                logging::log_peer_additional_address(
                    &ike_sa.initiator_spi,
                    &ike_sa.responder_spi,
                    &addr,
                );
                if ike_sa.additional_addresses_mut().add(addr) {
                    outcome.addresses_learned += 1;
                }
            }
            NotifyType::NoAdditionalAddresses => {
                flush_additional_addresses(ike_sa, outcome);
            }
            NotifyType::UpdateSaAddresses => {
                outcome.update_requested = true;
            }
            _ => {}
        }
    }

    Ok(())
}

/// MOBIKE task of one IKE SA
pub struct MobikeTask {
    ike_sa: SharedIkeSa,
    kernel: Arc<dyn KernelInterface>,
    role: Role,

    /// Local address to roam to
    me: Option<SocketAddr>,

    /// Remote address to roam to
    other: Option<SocketAddr>,

    /// COOKIE2 for return routability checks, not used yet
    cookie2: Zeroizing<Vec<u8>>,

    /// NAT detection run along address updates
    natd: Option<Box<dyn Task>>,

    /// NAT detection has to see the next informational message
    natd_pending: bool,

    metrics: Option<MobikeMetrics>,
}

impl MobikeTask {
    /// Create MOBIKE task for an IKE SA
    pub fn new(ike_sa: SharedIkeSa, kernel: Arc<dyn KernelInterface>, role: Role) -> Self {
        MobikeTask {
            ike_sa,
            kernel,
            role,
            me: None,
            other: None,
            cookie2: Zeroizing::new(Vec::new()),
            natd: None,
            natd_pending: false,
            metrics: None,
        }
    }

    /// Create the task a connection's configuration asks for
    ///
    /// Returns `None` if MOBIKE is disabled for the connection.
    pub fn from_config(
        config: &MobikeConfig,
        ike_sa: SharedIkeSa,
        kernel: Arc<dyn KernelInterface>,
        role: Role,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let task = Self::new(Arc::clone(&ike_sa), kernel, role);
        if config.nat_detection {
            Some(task.with_nat_detection(Box::new(IkeNatd::new(ike_sa, role))))
        } else {
            Some(task)
        }
    }

    /// Attach a NAT detection task, owned from now on
    pub fn with_nat_detection(mut self, natd: Box<dyn Task>) -> Self {
        self.natd = Some(natd);
        self
    }

    /// Count activity in `metrics`
    pub fn with_metrics(mut self, metrics: MobikeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Role of this task
    pub fn role(&self) -> Role {
        self.role
    }

    /// IKE SA the task currently works on
    pub fn ike_sa(&self) -> &SharedIkeSa {
        &self.ike_sa
    }

    /// Staged local and remote roam targets
    pub fn pending_addresses(&self) -> (Option<SocketAddr>, Option<SocketAddr>) {
        (self.me, self.other)
    }

    /// Check whether a roam waits for the next build
    pub fn is_roam_pending(&self) -> bool {
        self.me.is_some() || self.other.is_some()
    }

    /// Current COOKIE2 value
    pub fn cookie2(&self) -> &[u8] {
        &self.cookie2
    }

    /// Check whether a NAT detection task is attached
    pub fn has_nat_detection(&self) -> bool {
        self.natd.is_some()
    }

    /// Stage a switch to a new address pair
    ///
    /// `None` keeps that side of the SA's address pair when the roam is
    /// applied. A second call before the next build replaces the first.
    pub fn roam(&mut self, me: Option<SocketAddr>, other: Option<SocketAddr>) {
        self.me = me;
        self.other = other;

        let sa = self.ike_sa.lock();
        logging::log_roam_staged(&sa.initiator_spi, &sa.responder_spi, me, other);
    }

    fn announce_addresses(&self, message: &mut IkeMessage) {
        let sa = self.ike_sa.lock();
        build_address_list(&sa, self.kernel.as_ref(), message);
        if let Some(metrics) = &self.metrics {
            metrics.record_address_list_sent();
        }
    }

    fn announce_support(&self, message: &mut IkeMessage) {
        message.add_notify(false, NotifyType::MobikeSupported, Vec::new());
        self.announce_addresses(message);
    }

    fn update_addresses(&mut self, message: &mut IkeMessage) -> Result<()> {
        message.add_notify(false, NotifyType::UpdateSaAddresses, Vec::new());
        self.announce_addresses(message);

        let me = self.me.take();
        let other = self.other.take();
        {
            let mut sa = self.ike_sa.lock();
            let old = (sa.my_host(), sa.other_host());
            sa.update_hosts(me, other);
            logging::log_sa_hosts_updated(
                &sa.initiator_spi,
                &sa.responder_spi,
                old,
                (sa.my_host(), sa.other_host()),
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_address_update_sent();
            metrics.record_roam_applied();
        }

        // NAT detection covers the new path, so it runs after the switch
        if let Some(natd) = self.natd.as_mut() {
            natd.build(message)?;
            self.natd_pending = true;
        }
        Ok(())
    }

    fn record_outcome(&self, outcome: &ProcessOutcome) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        if outcome.mobike_supported {
            metrics.record_mobike_negotiated();
        }
        metrics.record_peer_address_flushes(outcome.flushes as u64);
        metrics.record_peer_addresses_learned(outcome.addresses_learned as u64);
    }
}

impl Task for MobikeTask {
    fn build(&mut self, message: &mut IkeMessage) -> Result<TaskStatus> {
        let leg = Leg::of(message);
        let decision = decide(self.role, Call::Build, leg, self.is_roam_pending());

        match decision.action {
            Action::AnnounceSupport => self.announce_support(message),
            Action::AnnounceIfSupported => {
                let supported = self.ike_sa.lock().supports_extension(Extension::Mobike);
                if supported {
                    self.announce_support(message);
                }
            }
            Action::UpdateAddresses => self.update_addresses(message)?,
            Action::ProcessNotifies | Action::None => {}
        }

        if self.role == Role::Responder && leg == Leg::Informational && self.natd_pending {
            if let Some(natd) = self.natd.as_mut() {
                natd.build(message)?;
            }
            self.natd_pending = false;
        }

        logging::log_task_decision(
            TaskType::IkeMobike,
            self.role,
            message.exchange_type(),
            "build",
            decision.action.as_str(),
            decision.status,
        );
        Ok(decision.status)
    }

    fn process(&mut self, message: &IkeMessage) -> Result<TaskStatus> {
        let leg = Leg::of(message);
        let decision = decide(self.role, Call::Process, leg, self.is_roam_pending());

        if decision.action == Action::ProcessNotifies {
            let mut outcome = ProcessOutcome::default();
            let applied = {
                let mut sa = self.ike_sa.lock();
                apply_notifies(&mut sa, message, &mut outcome)
            };
            self.record_outcome(&outcome);
            applied?;

            if self.role == Role::Responder && leg == Leg::Informational && outcome.update_requested
            {
                if let Some(natd) = self.natd.as_mut() {
                    natd.process(message)?;
                    self.natd_pending = true;
                }
            }
        }

        // only the response to our own update carries the peer's view of the new path
        if self.role == Role::Initiator
            && leg == Leg::Informational
            && message.is_response
            && self.natd_pending
        {
            if let Some(natd) = self.natd.as_mut() {
                natd.process(message)?;
            }
            self.natd_pending = false;
        }

        logging::log_task_decision(
            TaskType::IkeMobike,
            self.role,
            message.exchange_type(),
            "process",
            decision.action.as_str(),
            decision.status,
        );
        Ok(decision.status)
    }

    fn task_type(&self) -> TaskType {
        TaskType::IkeMobike
    }

    fn migrate(&mut self, ike_sa: SharedIkeSa) {
        let had_pending_roam = self.is_roam_pending();

        self.me = None;
        self.other = None;
        self.cookie2.zeroize();
        self.natd_pending = false;

        if let Some(natd) = self.natd.as_mut() {
            natd.migrate(Arc::clone(&ike_sa));
        }

        {
            let sa = ike_sa.lock();
            logging::log_task_migrated(&sa.initiator_spi, &sa.responder_spi, had_pending_roam);
        }
        self.ike_sa = ike_sa;
    }

    fn destroy(&mut self) {
        self.me = None;
        self.other = None;
        self.cookie2.zeroize();
        self.natd_pending = false;

        if let Some(mut natd) = self.natd.take() {
            natd.destroy();
        }
    }
}

impl Drop for MobikeTask {
    fn drop(&mut self) {
        self.destroy();
    }
}
