//! IKEv2 message model
//!
//! An [`IkeMessage`] is the decrypted view of an IKE message the task
//! pipeline works on: the exchange it belongs to and its payloads in wire
//! order. Encryption and serialization happen below this layer.

use super::constants::{ExchangeType, NotifyType, PayloadType};
use super::payload::{IkePayload, NotifyPayload};

/// Decrypted IKE message handed to tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IkeMessage {
    /// Exchange type
    pub exchange_type: ExchangeType,

    /// Message ID
    pub message_id: u32,

    /// Response flag
    pub is_response: bool,

    /// Payloads in wire order
    pub payloads: Vec<IkePayload>,
}

impl IkeMessage {
    /// Create an empty message
    pub fn new(exchange_type: ExchangeType, message_id: u32, is_response: bool) -> Self {
        IkeMessage {
            exchange_type,
            message_id,
            is_response,
            payloads: Vec::new(),
        }
    }

    /// Create an empty request
    pub fn request(exchange_type: ExchangeType, message_id: u32) -> Self {
        Self::new(exchange_type, message_id, false)
    }

    /// Create an empty response to `request`
    pub fn response_to(request: &IkeMessage) -> Self {
        Self::new(request.exchange_type, request.message_id, true)
    }

    /// Get exchange type
    pub fn exchange_type(&self) -> ExchangeType {
        self.exchange_type
    }

    /// Check whether a payload of the given type is present
    pub fn has_payload(&self, payload_type: PayloadType) -> bool {
        self.payloads
            .iter()
            .any(|payload| payload.payload_type() == payload_type)
    }

    /// Check whether the message carries a Security Association payload
    pub fn has_sa_payload(&self) -> bool {
        self.has_payload(PayloadType::SA)
    }

    /// Append a payload
    pub fn add_payload(&mut self, payload: IkePayload) {
        self.payloads.push(payload);
    }

    /// Append a status notify about the IKE SA
    pub fn add_notify(&mut self, critical: bool, notify_type: NotifyType, data: Vec<u8>) {
        let notify = NotifyPayload::status(notify_type, data).with_critical(critical);
        self.payloads.push(IkePayload::N(notify));
    }

    /// Iterate notify payloads in wire order
    pub fn notifies(&self) -> impl Iterator<Item = &NotifyPayload> {
        self.payloads.iter().filter_map(IkePayload::as_notify)
    }

    /// First notify of the given type
    pub fn get_notify(&self, notify_type: NotifyType) -> Option<&NotifyPayload> {
        self.notifies()
            .find(|notify| notify.notify_type == notify_type)
    }

    /// Notify types in wire order
    pub fn notify_types(&self) -> Vec<NotifyType> {
        self.notifies().map(|notify| notify.notify_type).collect()
    }
}
