/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Order entry and position messages.

use ctfix_core::field::{Field, tags};
use ctfix_core::message::{MsgType, RequestMessage};
use ctfix_core::types::{OrdType, Side, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places written for OrderQty (38).
pub const QTY_SCALE: u32 = 2;

/// Decimal places written for Price (44).
pub const PRICE_SCALE: u32 = 5;

/// Renders a decimal with a fixed number of decimal places.
fn fixed(value: Decimal, scale: u32) -> String {
    let mut value = value;
    value.rescale(scale);
    value.to_string()
}

/// NewOrderSingle (35=D).
///
/// Price is only written for limit-like order types with a non-zero price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderSingle {
    /// ClOrdID (11).
    pub cl_ord_id: String,
    /// Symbol (55).
    pub symbol: String,
    /// Side (54).
    pub side: Side,
    /// OrderQty (38).
    pub order_qty: Decimal,
    /// OrdType (40).
    pub ord_type: OrdType,
    /// Price (44).
    pub price: Decimal,
    /// TransactTime (60). The send time is used when unset.
    pub transact_time: Option<Timestamp>,
}

impl NewOrderSingle {
    /// Creates a market order.
    #[must_use]
    pub fn market(
        cl_ord_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        order_qty: Decimal,
    ) -> Self {
        Self {
            cl_ord_id: cl_ord_id.into(),
            symbol: symbol.into(),
            side,
            order_qty,
            ord_type: OrdType::Market,
            price: Decimal::ZERO,
            transact_time: None,
        }
    }

    /// Creates a limit order.
    #[must_use]
    pub fn limit(
        cl_ord_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        order_qty: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            ord_type: OrdType::Limit,
            price,
            ..Self::market(cl_ord_id, symbol, side, order_qty)
        }
    }

    /// Sets the order type.
    #[must_use]
    pub const fn with_ord_type(mut self, ord_type: OrdType) -> Self {
        self.ord_type = ord_type;
        self
    }

    /// Sets the price.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Pins TransactTime instead of using the send time.
    #[must_use]
    pub const fn with_transact_time(mut self, transact_time: Timestamp) -> Self {
        self.transact_time = Some(transact_time);
        self
    }
}

impl RequestMessage for NewOrderSingle {
    fn msg_type(&self) -> MsgType {
        MsgType::NewOrderSingle
    }

    fn body(&self) -> Vec<Field> {
        let transact_time = self.transact_time.unwrap_or_else(Timestamp::now);

        let mut fields = Vec::with_capacity(7);
        fields.extend(Field::non_empty(tags::CL_ORD_ID, self.cl_ord_id.as_str()));
        fields.extend(Field::non_empty(tags::SYMBOL, self.symbol.as_str()));
        fields.push(Field::new(tags::SIDE, self.side.as_char().to_string()));
        fields.push(Field::new(
            tags::TRANSACT_TIME,
            transact_time.format_secs().as_str(),
        ));
        fields.push(Field::new(tags::ORDER_QTY, fixed(self.order_qty, QTY_SCALE)));
        fields.push(Field::new(tags::ORD_TYPE, self.ord_type.as_char().to_string()));
        if self.ord_type.is_limit_like() && !self.price.is_zero() {
            fields.push(Field::new(tags::PRICE, fixed(self.price, PRICE_SCALE)));
        }
        fields
    }
}

/// OrderCancelRequest (35=F).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelRequest {
    /// OrigClOrdID (41) of the order being cancelled.
    pub orig_cl_ord_id: String,
    /// OrderID (37) assigned by the counterparty, if known.
    pub order_id: Option<String>,
    /// ClOrdID (11) of this cancel request.
    pub cl_ord_id: String,
}

impl OrderCancelRequest {
    /// Creates a cancel request for the given original ClOrdID.
    #[must_use]
    pub fn new(orig_cl_ord_id: impl Into<String>, cl_ord_id: impl Into<String>) -> Self {
        Self {
            orig_cl_ord_id: orig_cl_ord_id.into(),
            order_id: None,
            cl_ord_id: cl_ord_id.into(),
        }
    }

    /// Sets the counterparty OrderID.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

impl RequestMessage for OrderCancelRequest {
    fn msg_type(&self) -> MsgType {
        MsgType::OrderCancelRequest
    }

    fn body(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(3);
        fields.extend(Field::non_empty(tags::ORIG_CL_ORD_ID, self.orig_cl_ord_id.as_str()));
        if let Some(order_id) = self.order_id.as_deref() {
            fields.extend(Field::non_empty(tags::ORDER_ID, order_id));
        }
        fields.extend(Field::non_empty(tags::CL_ORD_ID, self.cl_ord_id.as_str()));
        fields
    }
}

/// RequestForPositions (35=AN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForPositions {
    /// PosReqID (710).
    pub pos_req_id: String,
    /// PosMaintRptID (721) to restrict the report to one position.
    pub pos_maint_rpt_id: Option<String>,
}

impl RequestForPositions {
    /// Creates a request for all open positions.
    #[must_use]
    pub fn new(pos_req_id: impl Into<String>) -> Self {
        Self {
            pos_req_id: pos_req_id.into(),
            pos_maint_rpt_id: None,
        }
    }

    /// Restricts the request to a single position.
    #[must_use]
    pub fn with_pos_maint_rpt_id(mut self, id: impl Into<String>) -> Self {
        self.pos_maint_rpt_id = Some(id.into());
        self
    }
}

impl RequestMessage for RequestForPositions {
    fn msg_type(&self) -> MsgType {
        MsgType::RequestForPositions
    }

    fn body(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(2);
        fields.extend(Field::non_empty(tags::POS_REQ_ID, self.pos_req_id.as_str()));
        if let Some(id) = self.pos_maint_rpt_id.as_deref() {
            fields.extend(Field::non_empty(tags::POS_MAINT_RPT_ID, id));
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
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn build(message: &impl RequestMessage) -> String {
        let session = SessionId::new(
            "FIX.4.4",
            CompId::new("SENDER").unwrap(),
            CompId::new("cServer").unwrap(),
        )
        .with_sender_sub_id("TRADE")
        .with_target_sub_id("TRADE");
        let out = MessageBuilder::new(&session)
            .with_delimiter(b'|')
            .build(message, SeqNum::new(5));
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_limit_order_scenario() {
        let order = NewOrderSingle::limit(
            "LIMIT_ORDER_456",
            "EURUSD",
            Side::Sell,
            dec("0.1"),
            dec("1.105"),
        );
        let out = build(&order);

        assert!(out.contains("35=D|"));
        assert!(out.contains("|11=LIMIT_ORDER_456|55=EURUSD|54=2|60="));
        assert!(out.contains("|38=0.10|40=2|44=1.10500|"));
        assert_eq!(Validator::new(b'|').validate(&out), Ok(()));
    }

    #[test]
    fn test_market_order_omits_price() {
        let order = NewOrderSingle::market("MKT_1", "EURUSD", Side::Buy, dec("1000"))
            .with_price(dec("1.2"));
        let out = build(&order);
        assert!(out.contains("|38=1000.00|40=1|"));
        assert!(!out.contains("|44="));
    }

    #[test]
    fn test_limit_order_with_zero_price_omits_price() {
        let order = NewOrderSingle::limit("L", "EURUSD", Side::Buy, dec("1"), Decimal::ZERO);
        assert!(!build(&order).contains("|44="));
    }

    #[test]
    fn test_stop_limit_is_limit_like() {
        let order = NewOrderSingle::market("SL", "GBPUSD", Side::Buy, dec("2.5"))
            .with_ord_type(OrdType::StopLimit)
            .with_price(dec("1.25"));
        assert!(build(&order).contains("|40=4|44=1.25000|"));
    }

    #[test]
    fn test_transact_time_seconds_precision() {
        let order = NewOrderSingle::market("T", "EURUSD", Side::Buy, dec("1"))
            .with_transact_time(Timestamp::from_millis(1_700_000_000_123));
        let fields = decode_fields(build(&order).as_bytes(), b'|');
        assert_eq!(fields.get(60), Some("20231114-22:13:20"));
    }

    #[test]
    fn test_order_cancel_request_body() {
        let plain = OrderCancelRequest::new("ORIG_1", "CXL_1");
        assert_eq!(
            plain.body(),
            vec![Field::new(41, "ORIG_1"), Field::new(11, "CXL_1")]
        );

        let with_id = plain.with_order_id("9876");
        assert_eq!(
            with_id.body(),
            vec![
                Field::new(41, "ORIG_1"),
                Field::new(37, "9876"),
                Field::new(11, "CXL_1")
            ]
        );
        assert!(build(&with_id).contains("35=F|"));
    }

    #[test]
    fn test_request_for_positions_body() {
        let req = RequestForPositions::new("POS_REQ_001");
        assert_eq!(req.body(), vec![Field::new(710, "POS_REQ_001")]);

        let out = build(&req.with_pos_maint_rpt_id("12345"));
        assert!(out.contains("35=AN|"));
        assert!(out.contains("|710=POS_REQ_001|721=12345|"));
    }

    #[test]
    fn test_round_trip_recovers_body_fields() {
        let order =
            NewOrderSingle::limit("RT_1", "XAUUSD", Side::Buy, dec("0.25"), dec("1950.5"));
        let fields = decode_fields(build(&order).as_bytes(), b'|');
        for field in order.body() {
            if field.tag == tags::TRANSACT_TIME {
                continue;
            }
            assert_eq!(fields.get(field.tag), Some(field.value.as_str()));
        }
    }
}
