/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # ctfix
//!
//! An asynchronous FIX 4.4 client for Rust.
//!
//! ctfix builds tag=value messages with correct BodyLength and CheckSum,
//! keeps one TCP or TLS session to a FIX server, splits the incoming byte
//! stream into messages and delivers them to a channel and to application
//! callbacks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ctfix::prelude::*;
//!
//! let config = SessionConfigBuilder::new()
//!     .sender_comp_id("demo.ctrader.1234567")
//!     .target_comp_id("cServer")
//!     .sender_sub_id("QUOTE")
//!     .target_sub_id("QUOTE")
//!     .username("1234567")
//!     .password("secret")
//!     .build()?;
//!
//! let conn = ConnectionBuilder::new(config, "demo-uk-eqx-01.p.c-trader.com", 5211)
//!     .with_tls(true)
//!     .build();
//! let mut messages = conn.messages().unwrap();
//!
//! conn.connect().await?;
//! conn.send(&conn.config().logon()).await?;
//! while let Some(message) = messages.recv().await {
//!     println!("{message}");
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fundamental types, traits, and error definitions
//! - [`tagvalue`]: Tag=value encoding, decoding and validation
//! - [`messages`]: Outbound message types
//! - [`session`]: Session configuration and sequence numbers
//! - [`transport`]: Framing, TLS and dialing
//! - [`engine`]: Client connection

pub mod core {
    //! Core types, traits, and error definitions.
    pub use ctfix_core::*;
}

pub mod tagvalue {
    //! Tag=value encoding, decoding and validation.
    pub use ctfix_tagvalue::*;
}

pub mod messages {
    //! Outbound message types.
    pub use ctfix_messages::*;
}

pub mod session {
    //! Session configuration and sequence numbers.
    pub use ctfix_session::*;
}

pub mod transport {
    //! Framing, TLS and dialing.
    pub use ctfix_transport::*;
}

pub mod engine {
    //! Client connection.
    pub use ctfix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ctfix_core::{
        CompId, ConnectionError, Field, FieldMap, FixError, MsgType, OrdType, RequestMessage,
        ResponseMessage, Result, SeqNum, SessionError, SessionId, Side, Timestamp,
        ValidationError, field_name,
    };

    // Tag-value encoding
    pub use ctfix_tagvalue::{Decoder, MessageBuilder, SOH, Validator, calculate_checksum};

    // Messages
    pub use ctfix_messages::{
        Heartbeat, Logon, Logout, MarketDataRequest, NewOrderSingle, OrderCancelRequest,
        RequestForPositions, SecurityListRequest, TestRequest, generate_test_req_id,
    };

    // Session
    pub use ctfix_session::{ConnectionState, SessionConfig, SessionConfigBuilder};

    // Transport
    pub use ctfix_transport::{FrameCodec, TlsOptions};

    // Engine
    pub use ctfix_engine::{
        Application, Connection, ConnectionBuilder, SessionEvent, Subscriber,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use bytes::BytesMut;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_util::codec::Decoder as _;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_prelude_imports() {
        let _seq = SeqNum::new(1);
        let _ts = Timestamp::now();
        let _side = Side::Buy;
        assert_eq!(field_name(35), Some("MsgType"));
    }

    #[tokio::test]
    async fn test_logon_and_order_round_trip() {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = SessionConfigBuilder::new()
            .sender_comp_id("CLIENT")
            .target_comp_id("cServer")
            .sender_sub_id("TRADE")
            .target_sub_id("TRADE")
            .username("1234567")
            .password("secret")
            .build()
            .unwrap();
        let conn = ConnectionBuilder::new(config, "127.0.0.1", port).build();
        let mut messages = conn.messages().unwrap();

        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        conn.send(&conn.config().logon()).await.unwrap();
        let order = NewOrderSingle::limit(
            "ORD1",
            "1",
            Side::Buy,
            Decimal::from_str("1000").unwrap(),
            Decimal::from_str("1.1").unwrap(),
        );
        conn.send(&order).await.unwrap();

        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        let mut frames = Vec::new();
        while frames.len() < 2 {
            if let Some(frame) = codec.decode(&mut buf).unwrap() {
                frames.push(frame);
                continue;
            }
            let n = timeout(Duration::from_secs(5), sock.read_buf(&mut buf))
                .await
                .unwrap()
                .unwrap();
            assert!(n > 0);
        }

        let validator = Validator::default();
        let decoder = Decoder::default();
        for frame in &frames {
            assert_eq!(validator.validate(frame), Ok(()));
        }
        let logon = decoder.decode(&frames[0]);
        assert_eq!(logon.msg_type(), Some(MsgType::Logon));
        assert_eq!(logon.field(553), Some("1234567"));
        assert_eq!(logon.field(108), Some("30"));
        let order = decoder.decode(&frames[1]);
        assert_eq!(order.seq_num(), Some(SeqNum::new(2)));
        assert_eq!(order.field(38), Some("1000.00"));
        assert_eq!(order.field(44), Some("1.10000"));

        // server answers with a heartbeat
        let server = SessionId::new(
            "FIX.4.4",
            CompId::new("cServer").unwrap(),
            CompId::new("CLIENT").unwrap(),
        );
        let reply = MessageBuilder::new(&server).build(&Heartbeat::new(), SeqNum::new(1));
        sock.write_all(&reply).await.unwrap();

        let received = timeout(Duration::from_secs(5), messages.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.msg_type(), Some(MsgType::Heartbeat));
        assert_eq!(received.field(49), Some("cServer"));

        conn.disconnect().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }
}
