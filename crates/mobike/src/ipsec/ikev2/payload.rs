//! IKEv2 Payload structures
//!
//! Implements the payloads the MOBIKE layer reads and writes, most notably
//! the Notify payload of RFC 7296 Section 3.10 and the address encoding of
//! RFC 4555 Section 4.

use super::constants::{NotifyType, PayloadType};
use crate::ipsec::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IKE Payload types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IkePayload {
    /// Security Association payload (proposals kept opaque)
    SA(Vec<u8>),

    /// Notify payload
    N(NotifyPayload),

    /// Payload this layer does not interpret
    Unknown {
        /// Payload type
        payload_type: PayloadType,
        /// Raw payload data (excluding header)
        data: Vec<u8>,
    },
}

impl IkePayload {
    /// Get payload type
    pub fn payload_type(&self) -> PayloadType {
        match self {
            IkePayload::SA(_) => PayloadType::SA,
            IkePayload::N(_) => PayloadType::N,
            IkePayload::Unknown { payload_type, .. } => *payload_type,
        }
    }

    /// Borrow the notify payload, if this is one
    pub fn as_notify(&self) -> Option<&NotifyPayload> {
        match self {
            IkePayload::N(notify) => Some(notify),
            _ => None,
        }
    }
}

/// Protocol ID carried in a Notify payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotifyProtocolId {
    /// Notification concerns the IKE SA itself
    None = 0,
    /// IKE (1)
    Ike = 1,
    /// AH (2)
    Ah = 2,
    /// ESP (3)
    Esp = 3,
}

impl NotifyProtocolId {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NotifyProtocolId::None),
            1 => Some(NotifyProtocolId::Ike),
            2 => Some(NotifyProtocolId::Ah),
            3 => Some(NotifyProtocolId::Esp),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Notify Payload (RFC 7296 Section 3.10)
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Next Payload  |C|  RESERVED   |         Payload Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Protocol ID  |   SPI Size    |      Notify Message Type      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// ~                Security Parameter Index (SPI)                 ~
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// ~                       Notification Data                       ~
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The critical bit lives in the generic payload header; it is kept on the
/// struct so the message layer can write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyPayload {
    /// Critical bit of the generic payload header
    pub critical: bool,

    /// Protocol the notification refers to
    pub protocol_id: NotifyProtocolId,

    /// Notify message type
    pub notify_type: NotifyType,

    /// SPI (empty for IKE SA notifications)
    pub spi: Vec<u8>,

    /// Notification data
    pub data: Vec<u8>,
}

impl NotifyPayload {
    /// Generic payload header (next payload, flags, length)
    pub const HEADER_SIZE: usize = 4;

    /// Fixed part of the payload body (protocol id, SPI size, type)
    pub const FIXED_SIZE: usize = 4;

    /// Create a status notify about the IKE SA (no SPI)
    pub fn status(notify_type: NotifyType, data: Vec<u8>) -> Self {
        NotifyPayload {
            critical: false,
            protocol_id: NotifyProtocolId::None,
            notify_type,
            spi: Vec::new(),
            data,
        }
    }

    /// Mark the payload as critical
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Parse notify payload from data (without header)
    pub fn from_payload_data(data: &[u8]) -> Result<Self> {
        if data.len() < Self::FIXED_SIZE {
            return Err(Error::BufferTooShort {
                required: Self::FIXED_SIZE,
                available: data.len(),
            });
        }

        let protocol_id = NotifyProtocolId::from_u8(data[0]).ok_or_else(|| {
            Error::InvalidPayload(format!("Unknown notify protocol id: {}", data[0]))
        })?;

        let spi_size = data[1] as usize;
        let notify_type = NotifyType::from_u16(u16::from_be_bytes([data[2], data[3]]));

        let spi_end = Self::FIXED_SIZE + spi_size;
        if data.len() < spi_end {
            return Err(Error::BufferTooShort {
                required: spi_end,
                available: data.len(),
            });
        }

        Ok(NotifyPayload {
            critical: false,
            protocol_id,
            notify_type,
            spi: data[Self::FIXED_SIZE..spi_end].to_vec(),
            data: data[spi_end..].to_vec(),
        })
    }

    /// Serialize notify payload to bytes (without header)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the SPI or the whole payload does not fit
    /// its length field.
    pub fn to_payload_data(&self) -> Result<Vec<u8>> {
        let spi_size = self.spi_size()?;
        let total = self.total_length()?;
        let mut bytes = Vec::with_capacity(total as usize - Self::HEADER_SIZE);

        bytes.push(self.protocol_id.to_u8());
        bytes.push(spi_size);
        bytes.extend_from_slice(&self.notify_type.to_u16().to_be_bytes());
        bytes.extend_from_slice(&self.spi);
        bytes.extend_from_slice(&self.data);

        Ok(bytes)
    }

    /// Get total payload length (generic header + body)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the SPI exceeds 255 bytes or the payload
    /// exceeds the 16-bit length field.
    pub fn total_length(&self) -> Result<u16> {
        self.spi_size()?;
        let total = Self::HEADER_SIZE + Self::FIXED_SIZE + self.spi.len() + self.data.len();
        u16::try_from(total).map_err(|_| {
            Error::InvalidParameter(format!(
                "notify payload of {} bytes exceeds {}",
                total,
                u16::MAX
            ))
        })
    }

    fn spi_size(&self) -> Result<u8> {
        u8::try_from(self.spi.len()).map_err(|_| {
            Error::InvalidParameter(format!(
                "notify SPI of {} bytes exceeds {}",
                self.spi.len(),
                u8::MAX
            ))
        })
    }
}

/// Notify type announcing `addr` as an additional address
pub fn additional_address_type(addr: &IpAddr) -> NotifyType {
    match addr {
        IpAddr::V4(_) => NotifyType::AdditionalIp4Address,
        IpAddr::V6(_) => NotifyType::AdditionalIp6Address,
    }
}

/// Raw network-order address bytes, no port
pub fn encode_address(addr: &IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// Decode the notification data of an ADDITIONAL_*_ADDRESS notify
///
/// # Errors
///
/// - `InvalidLength` if the data is not 4 (IPv4) or 16 (IPv6) bytes
/// - `InvalidPayload` if `notify_type` is not an additional address notify
pub fn decode_additional_address(notify_type: NotifyType, data: &[u8]) -> Result<IpAddr> {
    match notify_type {
        NotifyType::AdditionalIp4Address => {
            let octets: [u8; 4] = data.try_into().map_err(|_| Error::InvalidLength {
                expected: 4,
                actual: data.len(),
            })?;
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        NotifyType::AdditionalIp6Address => {
            let octets: [u8; 16] = data.try_into().map_err(|_| Error::InvalidLength {
                expected: 16,
                actual: data.len(),
            })?;
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        other => Err(Error::InvalidPayload(format!(
            "{} does not carry an address",
            other
        ))),
    }
}
