/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Field types for FIX protocol messages.
//!
//! This module provides:
//! - [`tags`]: Tag number constants for every field the client reads or writes
//! - [`FIELD_NAMES`]: Static tag to name table used for diagnostics
//! - [`Field`]: An owned tag/value pair produced by outgoing message bodies
//! - [`FieldMap`]: Decoded tag to values mapping, preserving repeated tags

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Tag numbers used by the client.
pub mod tags {
    /// BeginString (8).
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength (9).
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum (10).
    pub const CHECKSUM: u32 = 10;
    /// MsgType (35).
    pub const MSG_TYPE: u32 = 35;
    /// SenderCompID (49).
    pub const SENDER_COMP_ID: u32 = 49;
    /// SenderSubID (50).
    pub const SENDER_SUB_ID: u32 = 50;
    /// TargetCompID (56).
    pub const TARGET_COMP_ID: u32 = 56;
    /// TargetSubID (57).
    pub const TARGET_SUB_ID: u32 = 57;
    /// MsgSeqNum (34).
    pub const MSG_SEQ_NUM: u32 = 34;
    /// SendingTime (52).
    pub const SENDING_TIME: u32 = 52;
    /// EncryptMethod (98).
    pub const ENCRYPT_METHOD: u32 = 98;
    /// HeartBtInt (108).
    pub const HEART_BT_INT: u32 = 108;
    /// ResetSeqNumFlag (141).
    pub const RESET_SEQ_NUM_FLAG: u32 = 141;
    /// Username (553).
    pub const USERNAME: u32 = 553;
    /// Password (554).
    pub const PASSWORD: u32 = 554;
    /// TestReqID (112).
    pub const TEST_REQ_ID: u32 = 112;
    /// BeginSeqNo (7).
    pub const BEGIN_SEQ_NO: u32 = 7;
    /// EndSeqNo (16).
    pub const END_SEQ_NO: u32 = 16;
    /// GapFillFlag (123).
    pub const GAP_FILL_FLAG: u32 = 123;
    /// NewSeqNo (36).
    pub const NEW_SEQ_NO: u32 = 36;
    /// Text (58).
    pub const TEXT: u32 = 58;
    /// MDReqID (262).
    pub const MD_REQ_ID: u32 = 262;
    /// SubscriptionRequestType (263).
    pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
    /// MarketDepth (264).
    pub const MARKET_DEPTH: u32 = 264;
    /// MDUpdateType (265).
    pub const MD_UPDATE_TYPE: u32 = 265;
    /// NoMDEntryTypes (267).
    pub const NO_MD_ENTRY_TYPES: u32 = 267;
    /// MDEntryType (269).
    pub const MD_ENTRY_TYPE: u32 = 269;
    /// NoRelatedSym (146).
    pub const NO_RELATED_SYM: u32 = 146;
    /// Symbol (55).
    pub const SYMBOL: u32 = 55;
    /// ClOrdID (11).
    pub const CL_ORD_ID: u32 = 11;
    /// Side (54).
    pub const SIDE: u32 = 54;
    /// TransactTime (60).
    pub const TRANSACT_TIME: u32 = 60;
    /// OrderQty (38).
    pub const ORDER_QTY: u32 = 38;
    /// OrdType (40).
    pub const ORD_TYPE: u32 = 40;
    /// Price (44).
    pub const PRICE: u32 = 44;
    /// StopPx (99).
    pub const STOP_PX: u32 = 99;
    /// ExpireTime (126).
    pub const EXPIRE_TIME: u32 = 126;
    /// PosMaintRptID (721).
    pub const POS_MAINT_RPT_ID: u32 = 721;
    /// Designation (494).
    pub const DESIGNATION: u32 = 494;
    /// MassStatusReqID (584).
    pub const MASS_STATUS_REQ_ID: u32 = 584;
    /// MassStatusReqType (585).
    pub const MASS_STATUS_REQ_TYPE: u32 = 585;
    /// IssueDate (225).
    pub const ISSUE_DATE: u32 = 225;
    /// PosReqID (710).
    pub const POS_REQ_ID: u32 = 710;
    /// OrderID (37).
    pub const ORDER_ID: u32 = 37;
    /// OrigClOrdID (41).
    pub const ORIG_CL_ORD_ID: u32 = 41;
    /// SecurityReqID (320).
    pub const SECURITY_REQ_ID: u32 = 320;
    /// SecurityListRequestType (559).
    pub const SECURITY_LIST_REQUEST_TYPE: u32 = 559;
}

/// Tag to name table, built at compile time and never mutated.
pub static FIELD_NAMES: &[(u32, &str)] = &[
    (tags::BEGIN_STRING, "BeginString"),
    (tags::BODY_LENGTH, "BodyLength"),
    (tags::MSG_TYPE, "MsgType"),
    (tags::SENDER_COMP_ID, "SenderCompID"),
    (tags::SENDER_SUB_ID, "SenderSubID"),
    (tags::TARGET_COMP_ID, "TargetCompID"),
    (tags::TARGET_SUB_ID, "TargetSubID"),
    (tags::MSG_SEQ_NUM, "MsgSeqNum"),
    (tags::SENDING_TIME, "SendingTime"),
    (tags::CHECKSUM, "CheckSum"),
    (tags::ENCRYPT_METHOD, "EncryptMethod"),
    (tags::HEART_BT_INT, "HeartBtInt"),
    (tags::RESET_SEQ_NUM_FLAG, "ResetSeqNumFlag"),
    (tags::USERNAME, "Username"),
    (tags::PASSWORD, "Password"),
    (tags::TEST_REQ_ID, "TestReqID"),
    (tags::BEGIN_SEQ_NO, "BeginSeqNo"),
    (tags::END_SEQ_NO, "EndSeqNo"),
    (tags::GAP_FILL_FLAG, "GapFillFlag"),
    (tags::NEW_SEQ_NO, "NewSeqNo"),
    (tags::TEXT, "Text"),
    (tags::MD_REQ_ID, "MDReqID"),
    (tags::SUBSCRIPTION_REQUEST_TYPE, "SubscriptionRequestType"),
    (tags::MARKET_DEPTH, "MarketDepth"),
    (tags::MD_UPDATE_TYPE, "MDUpdateType"),
    (tags::NO_MD_ENTRY_TYPES, "NoMDEntryTypes"),
    (tags::MD_ENTRY_TYPE, "MDEntryType"),
    (tags::NO_RELATED_SYM, "NoRelatedSym"),
    (tags::SYMBOL, "Symbol"),
    (tags::CL_ORD_ID, "ClOrdID"),
    (tags::SIDE, "Side"),
    (tags::TRANSACT_TIME, "TransactTime"),
    (tags::ORDER_QTY, "OrderQty"),
    (tags::ORD_TYPE, "OrdType"),
    (tags::PRICE, "Price"),
    (tags::STOP_PX, "StopPx"),
    (tags::EXPIRE_TIME, "ExpireTime"),
    (tags::POS_MAINT_RPT_ID, "PosMaintRptID"),
    (tags::DESIGNATION, "Designation"),
    (tags::MASS_STATUS_REQ_ID, "MassStatusReqID"),
    (tags::MASS_STATUS_REQ_TYPE, "MassStatusReqType"),
    (tags::ISSUE_DATE, "IssueDate"),
    (tags::POS_REQ_ID, "PosReqID"),
    (tags::ORDER_ID, "OrderID"),
    (tags::ORIG_CL_ORD_ID, "OrigClOrdID"),
    (tags::SECURITY_REQ_ID, "SecurityReqID"),
    (tags::SECURITY_LIST_REQUEST_TYPE, "SecurityListRequestType"),
];

/// Looks up the human-readable name of a tag.
///
/// # Arguments
/// * `tag` - The field tag number
///
/// # Returns
/// The field name, or `None` for tags outside the table.
#[must_use]
pub fn field_name(tag: u32) -> Option<&'static str> {
    FIELD_NAMES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| *name)
}

/// An owned tag/value pair.
///
/// Message bodies are built as ordered lists of fields. A field is only ever
/// constructed with a non-empty value; see [`Field::non_empty`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// The field tag number.
    pub tag: u32,
    /// The field value, never containing the delimiter.
    pub value: String,
}

impl Field {
    /// Creates a new field.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The field value
    #[inline]
    #[must_use]
    pub fn new(tag: u32, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Creates a field only if the value is non-empty.
    #[inline]
    #[must_use]
    pub fn non_empty(tag: u32, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self { tag, value })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.value)
    }
}

/// One tag and every value it carried, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldEntry {
    tag: u32,
    values: SmallVec<[String; 1]>,
}

/// Decoded mapping of tag to the ordered list of its values.
///
/// Tags are kept in first-appearance order. Repeated tags (such as entries of
/// a repeating group) keep every value in the order they were seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: SmallVec<[FieldEntry; 32]>,
    /// Tag to position in `entries`.
    index: HashMap<u32, usize>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for the given tag.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The field value
    pub fn push(&mut self, tag: u32, value: impl Into<String>) {
        let value = value.into();
        if let Some(&pos) = self.index.get(&tag) {
            self.entries[pos].values.push(value);
            return;
        }
        let mut values = SmallVec::new();
        values.push(value);
        self.index.insert(tag, self.entries.len());
        self.entries.push(FieldEntry { tag, values });
    }

    /// Returns the first value of a tag.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.get_all(tag).first().map(String::as_str)
    }

    /// Returns every value of a tag, in wire order.
    ///
    /// The slice is empty when the tag is absent.
    #[must_use]
    pub fn get_all(&self, tag: u32) -> &[String] {
        self.index
            .get(&tag)
            .map_or(&[], |&pos| self.entries[pos].values.as_slice())
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.index.contains_key(&tag)
    }

    /// Iterates over `(tag, values)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.entries.iter().map(|e| (e.tag, e.values.as_slice()))
    }

    /// Returns the number of distinct tags.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field was decoded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_lookup() {
        assert_eq!(field_name(35), Some("MsgType"));
        assert_eq!(field_name(49), Some("SenderCompID"));
        assert_eq!(field_name(559), Some("SecurityListRequestType"));
        assert_eq!(field_name(99999), None);
    }

    #[test]
    fn test_field_names_unique() {
        for (i, (tag, _)) in FIELD_NAMES.iter().enumerate() {
            assert!(
                FIELD_NAMES[i + 1..].iter().all(|(t, _)| t != tag),
                "duplicate tag {tag}"
            );
        }
    }

    #[test]
    fn test_field_non_empty() {
        assert_eq!(Field::non_empty(55, "EURUSD"), Some(Field::new(55, "EURUSD")));
        assert_eq!(Field::non_empty(55, ""), None);
        assert_eq!(Field::new(11, "ORD1").to_string(), "11=ORD1");
    }

    #[test]
    fn test_field_map_repeated_tags() {
        let mut map = FieldMap::new();
        map.push(269, "0");
        map.push(55, "EURUSD");
        map.push(269, "1");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(269), Some("0"));
        assert_eq!(map.get_all(269).to_vec(), vec!["0", "1"]);
        assert!(map.get_all(999).is_empty());
        assert!(!map.contains(999));

        let order: Vec<u32> = map.iter().map(|(tag, _)| tag).collect();
        assert_eq!(order, vec![269, 55]);
    }

    #[test]
    fn test_field_map_many_distinct_tags() {
        let mut map = FieldMap::new();
        for tag in 100_000..200_000u32 {
            map.push(tag, "x");
        }
        map.push(150_000, "y");

        assert_eq!(map.len(), 100_000);
        assert_eq!(map.get_all(150_000).to_vec(), vec!["x", "y"]);
        assert_eq!(map.iter().next().map(|(tag, _)| tag), Some(100_000));
        assert_eq!(map.iter().last().map(|(tag, _)| tag), Some(199_999));
        assert!(map.contains(199_999));
    }
}
