/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Market data and reference data requests.

use ctfix_core::field::{Field, tags};
use ctfix_core::message::{MsgType, RequestMessage};
use serde::{Deserialize, Serialize};

/// SubscriptionRequestType (263) values.
pub mod subscription {
    /// Snapshot only.
    pub const SNAPSHOT: &str = "0";
    /// Snapshot plus updates.
    pub const SNAPSHOT_PLUS_UPDATES: &str = "1";
    /// Disable a previous subscription.
    pub const UNSUBSCRIBE: &str = "2";
}

/// MDEntryType (269) values.
pub mod entry_type {
    /// Bid side.
    pub const BID: &str = "0";
    /// Offer side.
    pub const OFFER: &str = "1";
}

/// MarketDataRequest (35=V) for a single symbol.
///
/// NoMDEntryTypes (267) is derived from `md_entry_types`, and one
/// MDEntryType (269) is written per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataRequest {
    /// MDReqID (262).
    pub md_req_id: String,
    /// SubscriptionRequestType (263).
    pub subscription_request_type: String,
    /// MarketDepth (264). Zero requests the full book.
    pub market_depth: u32,
    /// MDEntryType (269) values.
    pub md_entry_types: Vec<String>,
    /// Symbol (55).
    pub symbol: String,
}

impl MarketDataRequest {
    /// Creates a snapshot-plus-updates subscription for bid and offer.
    #[must_use]
    pub fn new(md_req_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            md_req_id: md_req_id.into(),
            subscription_request_type: subscription::SNAPSHOT_PLUS_UPDATES.to_string(),
            market_depth: 0,
            md_entry_types: vec![entry_type::BID.to_string(), entry_type::OFFER.to_string()],
            symbol: symbol.into(),
        }
    }

    /// Sets SubscriptionRequestType.
    #[must_use]
    pub fn with_subscription_request_type(mut self, value: impl Into<String>) -> Self {
        self.subscription_request_type = value.into();
        self
    }

    /// Sets MarketDepth.
    #[must_use]
    pub const fn with_market_depth(mut self, depth: u32) -> Self {
        self.market_depth = depth;
        self
    }

    /// Replaces the requested entry types.
    #[must_use]
    pub fn with_entry_types<I, S>(mut self, entry_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.md_entry_types = entry_types.into_iter().map(Into::into).collect();
        self
    }
}

impl RequestMessage for MarketDataRequest {
    fn msg_type(&self) -> MsgType {
        MsgType::MarketDataRequest
    }

    fn body(&self) -> Vec<Field> {
        let entry_types: Vec<&str> = self
            .md_entry_types
            .iter()
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .collect();

        let mut fields = Vec::with_capacity(6 + entry_types.len());
        fields.extend(Field::non_empty(tags::MD_REQ_ID, self.md_req_id.as_str()));
        fields.extend(Field::non_empty(
            tags::SUBSCRIPTION_REQUEST_TYPE,
            self.subscription_request_type.as_str(),
        ));
        fields.push(Field::new(tags::MARKET_DEPTH, self.market_depth.to_string()));
        fields.push(Field::new(tags::NO_MD_ENTRY_TYPES, entry_types.len().to_string()));
        for value in entry_types {
            fields.push(Field::new(tags::MD_ENTRY_TYPE, value));
        }
        fields.push(Field::new(tags::NO_RELATED_SYM, "1"));
        fields.extend(Field::non_empty(tags::SYMBOL, self.symbol.as_str()));
        fields
    }
}

/// SecurityListRequest (35=x).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityListRequest {
    /// SecurityReqID (320).
    pub security_req_id: String,
    /// SecurityListRequestType (559). `0` requests by symbol.
    pub security_list_request_type: String,
    /// Symbol (55) filter, if any.
    pub symbol: Option<String>,
}

impl SecurityListRequest {
    /// Creates a request for every tradable symbol.
    #[must_use]
    pub fn new(security_req_id: impl Into<String>) -> Self {
        Self {
            security_req_id: security_req_id.into(),
            security_list_request_type: "0".to_string(),
            symbol: None,
        }
    }

    /// Sets SecurityListRequestType.
    #[must_use]
    pub fn with_request_type(mut self, value: impl Into<String>) -> Self {
        self.security_list_request_type = value.into();
        self
    }

    /// Restricts the list to one symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl RequestMessage for SecurityListRequest {
    fn msg_type(&self) -> MsgType {
        MsgType::SecurityListRequest
    }

    fn body(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(3);
        fields.extend(Field::non_empty(tags::SECURITY_REQ_ID, self.security_req_id.as_str()));
        fields.extend(Field::non_empty(
            tags::SECURITY_LIST_REQUEST_TYPE,
            self.security_list_request_type.as_str(),
        ));
        if let Some(symbol) = self.symbol.as_deref() {
            fields.extend(Field::non_empty(tags::SYMBOL, symbol));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctfix_core::types::{CompId, SeqNum, SessionId};
    use ctfix_tagvalue::decoder::decode_fields;
    use ctfix_tagvalue::{MessageBuilder, Validator};

    fn build(message: &impl RequestMessage) -> String {
        let session = SessionId::new(
            "FIX.4.4",
            CompId::new("SENDER").unwrap(),
            CompId::new("cServer").unwrap(),
        );
        let out = MessageBuilder::new(&session)
            .with_delimiter(b'|')
            .build(message, SeqNum::new(2));
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_market_data_request_scenario() {
        let out = build(&MarketDataRequest::new("MD_REQ_001", "EURUSD"));
        assert!(out.contains("35=V|"));
        assert!(out.contains("|262=MD_REQ_001|"));
        assert!(out.contains("|55=EURUSD|"));
        assert_eq!(Validator::new(b'|').validate(&out), Ok(()));
    }

    #[test]
    fn test_market_data_request_repeats_entry_types() {
        let out = build(&MarketDataRequest::new("MD_1", "EURUSD"));
        assert!(out.contains("|262=MD_1|263=1|264=0|267=2|269=0|269=1|146=1|55=EURUSD|"));

        let fields = decode_fields(out.as_bytes(), b'|');
        assert_eq!(fields.get_all(269).to_vec(), vec!["0", "1"]);
    }

    #[test]
    fn test_market_data_request_single_entry_type() {
        let req = MarketDataRequest::new("MD_2", "GBPUSD")
            .with_entry_types([entry_type::BID])
            .with_subscription_request_type(subscription::SNAPSHOT)
            .with_market_depth(1);
        let out = build(&req);
        assert!(out.contains("|263=0|264=1|267=1|269=0|146=1|"));
    }

    #[test]
    fn test_security_list_request_body() {
        let req = SecurityListRequest::new("SEC_1");
        assert_eq!(
            req.body(),
            vec![Field::new(320, "SEC_1"), Field::new(559, "0")]
        );

        let out = build(&req.with_symbol("EURUSD"));
        assert!(out.contains("35=x|"));
        assert!(out.contains("|320=SEC_1|559=0|55=EURUSD|"));
    }
}
