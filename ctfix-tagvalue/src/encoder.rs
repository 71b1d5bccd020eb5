/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! FIX message encoder.
//!
//! [`MessageBuilder`] turns any [`RequestMessage`] into a complete wire
//! message. It writes the session header in a fixed order, computes
//! BodyLength and CheckSum, and terminates every field with the configured
//! delimiter:
//!
//! ```text
//! 8=BeginString|9=BodyLength|35|49|56|57|50|34|52|<body>|10=NNN|
//! ```
//!
//! Fields with an empty value are never written.

use crate::SOH;
use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, BytesMut};
use ctfix_core::field::{Field, tags};
use ctfix_core::message::RequestMessage;
use ctfix_core::types::{SeqNum, SessionId, Timestamp};

/// Renders a single field as `tag=value`, without a delimiter.
///
/// # Example
/// ```
/// use ctfix_tagvalue::encode_field;
///
/// assert_eq!(encode_field(35, "A"), "35=A");
/// assert_eq!(encode_field(553, ""), "553=");
/// ```
#[must_use]
pub fn encode_field(tag: u32, value: &str) -> String {
    let mut tag_buf = itoa::Buffer::new();
    let tag_str = tag_buf.format(tag);
    let mut out = String::with_capacity(tag_str.len() + 1 + value.len());
    out.push_str(tag_str);
    out.push('=');
    out.push_str(value);
    out
}

/// Builds outgoing FIX messages for one session.
#[derive(Debug, Clone)]
pub struct MessageBuilder<'a> {
    session: &'a SessionId,
    delimiter: u8,
}

impl<'a> MessageBuilder<'a> {
    /// Creates a builder for the given session using SOH as delimiter.
    #[must_use]
    pub const fn new(session: &'a SessionId) -> Self {
        Self {
            session,
            delimiter: SOH,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builds a message stamped with the current time.
    ///
    /// # Arguments
    /// * `message` - The variant supplying the type code and body
    /// * `seq_num` - The sequence number written to tag 34
    ///
    /// # Returns
    /// The complete message, ending with `10=NNN` and the delimiter.
    #[must_use]
    pub fn build<M: RequestMessage + ?Sized>(&self, message: &M, seq_num: SeqNum) -> BytesMut {
        self.build_at(message, seq_num, Timestamp::now())
    }

    /// Builds a message with an explicit SendingTime.
    #[must_use]
    pub fn build_at<M: RequestMessage + ?Sized>(
        &self,
        message: &M,
        seq_num: SeqNum,
        sending_time: Timestamp,
    ) -> BytesMut {
        let msg_type = message.msg_type();
        let mut seq_buf = itoa::Buffer::new();
        let seq_str = seq_buf.format(seq_num.value());
        let sending_time = sending_time.format_millis();

        let mut body = BytesMut::with_capacity(256);
        self.put_field(&mut body, tags::MSG_TYPE, msg_type.as_str().as_bytes());
        self.put_field(
            &mut body,
            tags::SENDER_COMP_ID,
            self.session.sender_comp_id.as_str().as_bytes(),
        );
        self.put_field(
            &mut body,
            tags::TARGET_COMP_ID,
            self.session.target_comp_id.as_str().as_bytes(),
        );
        self.put_field(
            &mut body,
            tags::TARGET_SUB_ID,
            self.session.target_sub_id.as_bytes(),
        );
        self.put_field(
            &mut body,
            tags::SENDER_SUB_ID,
            self.session.sender_sub_id.as_bytes(),
        );
        self.put_field(&mut body, tags::MSG_SEQ_NUM, seq_str.as_bytes());
        self.put_field(&mut body, tags::SENDING_TIME, sending_time.as_bytes());

        for Field { tag, value } in message.body() {
            self.put_field(&mut body, tag, value.as_bytes());
        }

        self.finish(&body)
    }

    /// Prepends BeginString and BodyLength, then appends the checksum.
    fn finish(&self, body: &[u8]) -> BytesMut {
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(body.len());

        let mut message = BytesMut::with_capacity(body.len() + 32);
        self.put_field(
            &mut message,
            tags::BEGIN_STRING,
            self.session.begin_string.as_bytes(),
        );
        self.put_field(&mut message, tags::BODY_LENGTH, len_str.as_bytes());
        message.put_slice(body);

        let checksum = format_checksum(calculate_checksum(&message));
        message.put_slice(b"10=");
        message.put_slice(&checksum);
        message.put_u8(self.delimiter);

        message
    }

    #[inline]
    fn put_field(&self, buf: &mut BytesMut, tag: u32, value: &[u8]) {
        if value.is_empty() {
            return;
        }
        let mut tag_buf = itoa::Buffer::new();
        buf.put_slice(tag_buf.format(tag).as_bytes());
        buf.put_u8(b'=');
        buf.put_slice(value);
        buf.put_u8(self.delimiter);
    }
}
