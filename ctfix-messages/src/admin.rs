/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session-level messages.

use ctfix_core::field::{Field, tags};
use ctfix_core::message::{MsgType, RequestMessage};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logon (35=A).
///
/// Body order: EncryptMethod, HeartBtInt, ResetSeqNumFlag (only when set),
/// Username, Password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logon {
    /// EncryptMethod (98). Always 0 (none) in practice.
    pub encrypt_method: u32,
    /// HeartBtInt (108) in seconds.
    pub heart_bt_int: u64,
    /// Username (553).
    pub username: String,
    /// Password (554).
    pub password: String,
    /// Writes `141=Y` when true.
    pub reset_seq_num: bool,
}

impl Logon {
    /// Creates a logon with no encryption and no sequence reset.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, heart_bt_int: u64) -> Self {
        Self {
            encrypt_method: 0,
            heart_bt_int,
            username: username.into(),
            password: password.into(),
            reset_seq_num: false,
        }
    }

    /// Requests that both sides reset sequence numbers.
    #[must_use]
    pub const fn with_reset_seq_num(mut self, reset: bool) -> Self {
        self.reset_seq_num = reset;
        self
    }

    /// Sets the encryption method.
    #[must_use]
    pub const fn with_encrypt_method(mut self, method: u32) -> Self {
        self.encrypt_method = method;
        self
    }
}

impl std::fmt::Debug for Logon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logon")
            .field("encrypt_method", &self.encrypt_method)
            .field("heart_bt_int", &self.heart_bt_int)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("reset_seq_num", &self.reset_seq_num)
            .finish()
    }
}

impl RequestMessage for Logon {
    fn msg_type(&self) -> MsgType {
        MsgType::Logon
    }

    fn body(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(5);
        fields.push(Field::new(tags::ENCRYPT_METHOD, self.encrypt_method.to_string()));
        fields.push(Field::new(tags::HEART_BT_INT, self.heart_bt_int.to_string()));
        if self.reset_seq_num {
            fields.push(Field::new(tags::RESET_SEQ_NUM_FLAG, "Y"));
        }
        fields.extend(Field::non_empty(tags::USERNAME, self.username.as_str()));
        fields.extend(Field::non_empty(tags::PASSWORD, self.password.as_str()));
        fields
    }
}

/// Heartbeat (35=0), optionally answering a TestRequest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// TestReqID (112) being acknowledged, if any.
    pub test_req_id: Option<String>,
}

impl Heartbeat {
    /// Creates a bare heartbeat.
    #[must_use]
    pub const fn new() -> Self {
        Self { test_req_id: None }
    }

    /// Creates a heartbeat that acknowledges the given TestReqID.
    #[must_use]
    pub fn reply_to(test_req_id: impl Into<String>) -> Self {
        Self {
            test_req_id: Some(test_req_id.into()),
        }
    }
}

impl RequestMessage for Heartbeat {
    fn msg_type(&self) -> MsgType {
        MsgType::Heartbeat
    }

    fn body(&self) -> Vec<Field> {
        self.test_req_id
            .as_deref()
            .and_then(|id| Field::non_empty(tags::TEST_REQ_ID, id))
            .into_iter()
            .collect()
    }
}

/// TestRequest (35=1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    /// TestReqID (112) the counterparty must echo.
    pub test_req_id: String,
}

impl TestRequest {
    /// Creates a test request with the given ID.
    #[must_use]
    pub fn new(test_req_id: impl Into<String>) -> Self {
        Self {
            test_req_id: test_req_id.into(),
        }
    }
}

impl Default for TestRequest {
    fn default() -> Self {
        Self::new(generate_test_req_id())
    }
}

impl RequestMessage for TestRequest {
    fn msg_type(&self) -> MsgType {
        MsgType::TestRequest
    }

    fn body(&self) -> Vec<Field> {
        Field::non_empty(tags::TEST_REQ_ID, self.test_req_id.as_str())
            .into_iter()
            .collect()
    }
}

/// Logout (35=5). Has no body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logout;

impl RequestMessage for Logout {
    fn msg_type(&self) -> MsgType {
        MsgType::Logout
    }

    fn body(&self) -> Vec<Field> {
        Vec::new()
    }
}

/// Generates a TestReqID from the current time in nanoseconds.
#[must_use]
pub fn generate_test_req_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("TEST{nanos}")
}
