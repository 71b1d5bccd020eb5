/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Message types and traits for FIX protocol.
//!
//! This module provides:
//! - [`MsgType`]: Message type codes and their human-readable names
//! - [`RequestMessage`]: Capability implemented by every outgoing message variant
//! - [`ResponseMessage`]: Read-only view over a decoded inbound message

use crate::field::{Field, FieldMap, tags};
use crate::types::SeqNum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX message types known to the client.
///
/// Covers every type the client sends plus the inbound types a counterparty
/// answers with. Anything else is carried as `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Order Status Request (H).
    OrderStatusRequest,
    /// Market Data Request (V).
    MarketDataRequest,
    /// Market Data Snapshot/Full Refresh (W).
    MarketDataSnapshotFullRefresh,
    /// Market Data Incremental Refresh (X).
    MarketDataIncrementalRefresh,
    /// Market Data Request Reject (Y).
    MarketDataRequestReject,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Security List Request (x).
    SecurityListRequest,
    /// Security List (y).
    SecurityList,
    /// Order Mass Status Request (AF).
    OrderMassStatusRequest,
    /// Request For Positions (AN).
    RequestForPositions,
    /// Position Report (AO).
    PositionReport,
    /// Trade Capture Report Request (AP).
    TradeCaptureReportRequest,
    /// Trade Capture Report (AR).
    TradeCaptureReport,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    /// Creates a MsgType from its wire code (e.g., "D" for NewOrderSingle).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "H" => Self::OrderStatusRequest,
            "V" => Self::MarketDataRequest,
            "W" => Self::MarketDataSnapshotFullRefresh,
            "X" => Self::MarketDataIncrementalRefresh,
            "Y" => Self::MarketDataRequestReject,
            "j" => Self::BusinessMessageReject,
            "x" => Self::SecurityListRequest,
            "y" => Self::SecurityList,
            "AF" => Self::OrderMassStatusRequest,
            "AN" => Self::RequestForPositions,
            "AO" => Self::PositionReport,
            "AP" => Self::TradeCaptureReportRequest,
            "AR" => Self::TradeCaptureReport,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire code of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::OrderStatusRequest => "H",
            Self::MarketDataRequest => "V",
            Self::MarketDataSnapshotFullRefresh => "W",
            Self::MarketDataIncrementalRefresh => "X",
            Self::MarketDataRequestReject => "Y",
            Self::BusinessMessageReject => "j",
            Self::SecurityListRequest => "x",
            Self::SecurityList => "y",
            Self::OrderMassStatusRequest => "AF",
            Self::RequestForPositions => "AN",
            Self::PositionReport => "AO",
            Self::TradeCaptureReportRequest => "AP",
            Self::TradeCaptureReport => "AR",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns the human-readable name, or `None` for custom types.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Heartbeat => "Heartbeat",
            Self::TestRequest => "TestRequest",
            Self::ResendRequest => "ResendRequest",
            Self::Reject => "Reject",
            Self::SequenceReset => "SequenceReset",
            Self::Logout => "Logout",
            Self::ExecutionReport => "ExecutionReport",
            Self::OrderCancelReject => "OrderCancelReject",
            Self::Logon => "Logon",
            Self::NewOrderSingle => "NewOrderSingle",
            Self::OrderCancelRequest => "OrderCancelRequest",
            Self::OrderCancelReplaceRequest => "OrderCancelReplaceRequest",
            Self::OrderStatusRequest => "OrderStatusRequest",
            Self::MarketDataRequest => "MarketDataRequest",
            Self::MarketDataSnapshotFullRefresh => "MarketDataSnapshotFullRefresh",
            Self::MarketDataIncrementalRefresh => "MarketDataIncrementalRefresh",
            Self::MarketDataRequestReject => "MarketDataRequestReject",
            Self::BusinessMessageReject => "BusinessMessageReject",
            Self::SecurityListRequest => "SecurityListRequest",
            Self::SecurityList => "SecurityList",
            Self::OrderMassStatusRequest => "OrderMassStatusRequest",
            Self::RequestForPositions => "RequestForPositions",
            Self::PositionReport => "PositionReport",
            Self::TradeCaptureReportRequest => "TradeCaptureReportRequest",
            Self::TradeCaptureReport => "TradeCaptureReport",
            Self::Custom(_) => return None,
        })
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability shared by every outgoing message variant.
///
/// A variant only knows its type code and how to produce its body. Header,
/// BodyLength and CheckSum assembly is done once, by the message builder.
pub trait RequestMessage: Send + Sync {
    /// The message type written to tag 35.
    fn msg_type(&self) -> MsgType;

    /// The ordered body fields. Empty for variants without a body.
    ///
    /// Fields with empty values must be left out rather than encoded as `tag=`.
    fn body(&self) -> Vec<Field>;
}

impl<T: RequestMessage + ?Sized> RequestMessage for &T {
    fn msg_type(&self) -> MsgType {
        (**self).msg_type()
    }

    fn body(&self) -> Vec<Field> {
        (**self).body()
    }
}

impl<T: RequestMessage + ?Sized> RequestMessage for Box<T> {
    fn msg_type(&self) -> MsgType {
        (**self).msg_type()
    }

    fn body(&self) -> Vec<Field> {
        (**self).body()
    }
}

/// Separator used in place of the wire delimiter in display text.
pub const DISPLAY_SEPARATOR: char = '|';

/// Read-only view over a decoded inbound message.
///
/// Holds the decoded field mapping plus the original text with the delimiter
/// replaced by [`DISPLAY_SEPARATOR`] for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    /// Original text with a printable separator.
    text: String,
    /// Decoded fields.
    fields: FieldMap,
}

impl ResponseMessage {
    /// Creates a response message from its display text and decoded fields.
    #[must_use]
    pub fn new(text: String, fields: FieldMap) -> Self {
        Self { text, fields }
    }

    /// Returns the display text (delimiter replaced by `|`).
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.text
    }

    /// Returns the decoded fields.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Returns the first value of a field.
    #[must_use]
    pub fn field(&self, tag: u32) -> Option<&str> {
        self.fields.get(tag)
    }

    /// Returns every value of a field, in wire order.
    #[must_use]
    pub fn field_values(&self, tag: u32) -> &[String] {
        self.fields.get_all(tag)
    }

    /// Returns the raw MsgType (35) code, or an empty string if absent.
    #[must_use]
    pub fn msg_type_code(&self) -> &str {
        self.field(tags::MSG_TYPE).unwrap_or_default()
    }

    /// Returns the parsed message type, if tag 35 is present.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.field(tags::MSG_TYPE)
            .and_then(|code| code.parse().ok())
    }

    /// Returns the MsgSeqNum (34) if present and numeric.
    #[must_use]
    pub fn seq_num(&self) -> Option<SeqNum> {
        self.field(tags::MSG_SEQ_NUM)
            .and_then(|v| v.parse::<u64>().ok())
            .map(SeqNum::new)
    }
}

impl fmt::Display for ResponseMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
