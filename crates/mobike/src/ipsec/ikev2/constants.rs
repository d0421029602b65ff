//! IKEv2 protocol constants from RFC 7296 and RFC 4555

use std::fmt;

/// Exchange Types (RFC 7296 Section 3.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExchangeType {
    /// IKE_SA_INIT exchange (34)
    IkeSaInit = 34,
    /// IKE_AUTH exchange (35)
    IkeAuth = 35,
    /// CREATE_CHILD_SA exchange (36)
    CreateChildSa = 36,
    /// INFORMATIONAL exchange (37)
    Informational = 37,
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeType::IkeSaInit => "IKE_SA_INIT",
            ExchangeType::IkeAuth => "IKE_AUTH",
            ExchangeType::CreateChildSa => "CREATE_CHILD_SA",
            ExchangeType::Informational => "INFORMATIONAL",
        };
        f.write_str(name)
    }
}

/// Payload Types (RFC 7296 Section 3.2)
///
/// Only the payloads the MOBIKE layer inspects get their own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadType {
    /// No next payload (0)
    None = 0,
    /// Security Association (33)
    SA = 33,
    /// Key Exchange (34)
    KE = 34,
    /// Authentication (39)
    AUTH = 39,
    /// Nonce (40)
    Nonce = 40,
    /// Notify (41)
    N = 41,
    /// Delete (42)
    D = 42,
    /// Encrypted and Authenticated (46)
    SK = 46,
}

/// Notify Message Types (RFC 7296 Section 3.10.1, RFC 4555 Section 4)
///
/// Closed set of the notify codes this stack produces or reacts to. Every
/// other code decodes to [`NotifyType::Unknown`] and is carried through
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyType {
    /// UNSUPPORTED_CRITICAL_PAYLOAD (1)
    UnsupportedCriticalPayload,
    /// INVALID_SYNTAX (7)
    InvalidSyntax,
    /// NO_PROPOSAL_CHOSEN (14)
    NoProposalChosen,
    /// AUTHENTICATION_FAILED (24)
    AuthenticationFailed,
    /// INITIAL_CONTACT (16384)
    InitialContact,
    /// NAT_DETECTION_SOURCE_IP (16388)
    NatDetectionSourceIp,
    /// NAT_DETECTION_DESTINATION_IP (16389)
    NatDetectionDestinationIp,
    /// COOKIE (16390)
    Cookie,
    /// MOBIKE_SUPPORTED (16396)
    MobikeSupported,
    /// ADDITIONAL_IP4_ADDRESS (16397)
    AdditionalIp4Address,
    /// ADDITIONAL_IP6_ADDRESS (16398)
    AdditionalIp6Address,
    /// NO_ADDITIONAL_ADDRESSES (16399)
    NoAdditionalAddresses,
    /// UPDATE_SA_ADDRESSES (16400)
    UpdateSaAddresses,
    /// COOKIE2 (16401)
    Cookie2,
    /// NO_NATS_ALLOWED (16402)
    NoNatsAllowed,
    /// Any code not listed above
    Unknown(u16),
}

impl NotifyType {
    /// Convert from the 16-bit wire value
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => NotifyType::UnsupportedCriticalPayload,
            7 => NotifyType::InvalidSyntax,
            14 => NotifyType::NoProposalChosen,
            24 => NotifyType::AuthenticationFailed,
            16384 => NotifyType::InitialContact,
            16388 => NotifyType::NatDetectionSourceIp,
            16389 => NotifyType::NatDetectionDestinationIp,
            16390 => NotifyType::Cookie,
            16396 => NotifyType::MobikeSupported,
            16397 => NotifyType::AdditionalIp4Address,
            16398 => NotifyType::AdditionalIp6Address,
            16399 => NotifyType::NoAdditionalAddresses,
            16400 => NotifyType::UpdateSaAddresses,
            16401 => NotifyType::Cookie2,
            16402 => NotifyType::NoNatsAllowed,
            other => NotifyType::Unknown(other),
        }
    }

    /// Convert to the 16-bit wire value
    pub fn to_u16(self) -> u16 {
        match self {
            NotifyType::UnsupportedCriticalPayload => 1,
            NotifyType::InvalidSyntax => 7,
            NotifyType::NoProposalChosen => 14,
            NotifyType::AuthenticationFailed => 24,
            NotifyType::InitialContact => 16384,
            NotifyType::NatDetectionSourceIp => 16388,
            NotifyType::NatDetectionDestinationIp => 16389,
            NotifyType::Cookie => 16390,
            NotifyType::MobikeSupported => 16396,
            NotifyType::AdditionalIp4Address => 16397,
            NotifyType::AdditionalIp6Address => 16398,
            NotifyType::NoAdditionalAddresses => 16399,
            NotifyType::UpdateSaAddresses => 16400,
            NotifyType::Cookie2 => 16401,
            NotifyType::NoNatsAllowed => 16402,
            NotifyType::Unknown(value) => value,
        }
    }

    /// ADDITIONAL_IP4_ADDRESS or ADDITIONAL_IP6_ADDRESS
    pub fn is_additional_address(self) -> bool {
        matches!(
            self,
            NotifyType::AdditionalIp4Address | NotifyType::AdditionalIp6Address
        )
    }
}

impl fmt::Display for NotifyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotifyType::UnsupportedCriticalPayload => "UNSUPPORTED_CRITICAL_PAYLOAD",
            NotifyType::InvalidSyntax => "INVALID_SYNTAX",
            NotifyType::NoProposalChosen => "NO_PROPOSAL_CHOSEN",
            NotifyType::AuthenticationFailed => "AUTHENTICATION_FAILED",
            NotifyType::InitialContact => "INITIAL_CONTACT",
            NotifyType::NatDetectionSourceIp => "NAT_DETECTION_SOURCE_IP",
            NotifyType::NatDetectionDestinationIp => "NAT_DETECTION_DESTINATION_IP",
            NotifyType::Cookie => "COOKIE",
            NotifyType::MobikeSupported => "MOBIKE_SUPPORTED",
            NotifyType::AdditionalIp4Address => "ADDITIONAL_IP4_ADDRESS",
            NotifyType::AdditionalIp6Address => "ADDITIONAL_IP6_ADDRESS",
            NotifyType::NoAdditionalAddresses => "NO_ADDITIONAL_ADDRESSES",
            NotifyType::UpdateSaAddresses => "UPDATE_SA_ADDRESSES",
            NotifyType::Cookie2 => "COOKIE2",
            NotifyType::NoNatsAllowed => "NO_NATS_ALLOWED",
            NotifyType::Unknown(value) => return write!(f, "NOTIFY({})", value),
        };
        f.write_str(name)
    }
}

/// IKE SA protocol extensions negotiated with the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Extension {
    /// Peer supports NAT traversal
    NatT = 0x01,
    /// Peer supports MOBIKE (RFC 4555)
    Mobike = 0x02,
}

impl Extension {
    /// Bit used in an extension set
    pub fn bit(self) -> u8 {
        self as u8
    }
}
