/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Client connection state machine.
//!
//! A [`Connection`] owns one socket at a time, the outbound sequence counter
//! and a single reader task. Sends are serialized by the write-half lock, so
//! sequence numbers go out on the wire in the order they are allocated.
//!
//! Every transport failure, whether from a read, a write or a panic inside
//! the reader task, ends the session: the state becomes `Disconnected`, the
//! error is pushed onto the error channel and subscribers receive
//! [`SessionEvent::Disconnected`]. Reconnecting is an explicit
//! [`Connection::connect`].

use crate::subscriber::{Dispatcher, SessionEvent, Subscriber};
use bytes::{BufMut, BytesMut};
use ctfix_core::error::{ConnectionError, FixError, SessionError};
use ctfix_core::field::tags;
use ctfix_core::message::{MsgType, RequestMessage, ResponseMessage};
use ctfix_core::types::{SeqNum, SessionId};
use ctfix_messages::Heartbeat;
use ctfix_session::{ConnectionState, SequenceManager, SessionConfig};
use ctfix_tagvalue::{Decoder, MessageBuilder};
use ctfix_transport::{BoxedStream, FrameCodec, TlsOptions};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::codec::Decoder as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Initial capacity of the read buffer.
const READ_BUFFER_CAPACITY: usize = 4096;

/// Transport settings fixed at build time.
#[derive(Debug, Clone)]
pub(crate) struct ConnectionOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) tls: Option<TlsOptions>,
    pub(crate) delimiter: u8,
    pub(crate) connect_timeout: Duration,
    pub(crate) max_message_size: usize,
    pub(crate) auto_heartbeat: bool,
}

impl ConnectionOptions {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// State shared between the caller and the reader task.
struct Inner {
    config: SessionConfig,
    options: ConnectionOptions,
    state: RwLock<ConnectionState>,
    sequences: SequenceManager,
    writer: tokio::sync::Mutex<Option<WriteHalf<BoxedStream>>>,
    cancel: Mutex<CancellationToken>,
    dispatcher: Dispatcher,
    errors: mpsc::Sender<ConnectionError>,
}

/// A FIX client session over one TCP or TLS connection.
///
/// Built with [`ConnectionBuilder`](crate::builder::ConnectionBuilder).
pub struct Connection {
    inner: Arc<Inner>,
    messages: Mutex<Option<mpsc::Receiver<Arc<ResponseMessage>>>>,
    errors: Mutex<Option<mpsc::Receiver<ConnectionError>>>,
}

impl Connection {
    pub(crate) fn new(
        config: SessionConfig,
        options: ConnectionOptions,
        dispatcher: Dispatcher,
        messages: mpsc::Receiver<Arc<ResponseMessage>>,
        error_capacity: usize,
    ) -> Self {
        let (errors_tx, errors_rx) = mpsc::channel(error_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                options,
                state: RwLock::new(ConnectionState::Disconnected),
                sequences: SequenceManager::new(),
                writer: tokio::sync::Mutex::new(None),
                cancel: Mutex::new(CancellationToken::new()),
                dispatcher,
                errors: errors_tx,
            }),
            messages: Mutex::new(Some(messages)),
            errors: Mutex::new(Some(errors_rx)),
        }
    }

    /// Opens the socket and starts the reader task.
    ///
    /// The outbound sequence counter is reset to 0, so the first message sent
    /// carries `34=1`. Subscribers receive [`SessionEvent::Connected`] from
    /// the reader task before any message.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] unless the connection is
    /// disconnected, or a [`ConnectionError`] if the dial fails.
    pub async fn connect(&self) -> Result<(), FixError> {
        {
            let mut state = self.inner.state.write();
            if !state.can_connect() {
                return Err(SessionError::AlreadyConnected.into());
            }
            *state = ConnectionState::Connecting;
        }

        let options = &self.inner.options;
        info!(
            address = %options.address(),
            tls = options.tls.is_some(),
            session = %self.inner.config.session_id,
            "connecting"
        );

        let stream = match ctfix_transport::connect(
            &options.host,
            options.port,
            options.tls.as_ref(),
            options.connect_timeout,
        )
        .await
        {
            Ok(stream) => stream,
            Err(err) => {
                *self.inner.state.write() = ConnectionState::Disconnected;
                error!(error = %err, "connect failed");
                self.inner.report_error(err.clone());
                return Err(err.into());
            }
        };

        let (reader, writer) = tokio::io::split(stream);
        *self.inner.writer.lock().await = Some(writer);

        let token = CancellationToken::new();
        let established = {
            let mut state = self.inner.state.write();
            if *state == ConnectionState::Connecting {
                *self.inner.cancel.lock() = token.clone();
                self.inner.sequences.reset();
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        };
        if !established {
            // disconnect() raced with the dial
            self.inner.writer.lock().await.take();
            return Err(ConnectionError::Disconnected.into());
        }

        info!(address = %options.address(), "connected");
        spawn_reader(Arc::clone(&self.inner), reader, token);
        Ok(())
    }

    /// Builds and writes one message.
    ///
    /// # Returns
    /// The sequence number the message was sent with.
    ///
    /// # Errors
    /// Returns [`SessionError::NotConnected`] when not connected,
    /// [`SessionError::UnsupportedType`] when the message type code is empty
    /// or not alphanumeric, [`SessionError::SequenceExhausted`] once the
    /// outbound counter has reached `u64::MAX`, and [`ConnectionError::Write`]
    /// when the socket write fails. A write failure also ends the session.
    pub async fn send<M: RequestMessage + ?Sized>(&self, message: &M) -> Result<SeqNum, FixError> {
        self.inner.send(message).await
    }

    /// Closes the connection.
    ///
    /// Idempotent. Only the call that actually ends a connected session
    /// notifies subscribers, with [`ConnectionError::Disconnected`].
    pub async fn disconnect(&self) {
        let mut writer = self.inner.writer.lock().await;
        let was_connected = self.inner.mark_disconnected();
        if let Some(mut half) = writer.take()
            && let Err(e) = half.shutdown().await
        {
            debug!(error = %e, "socket shutdown failed");
        }
        drop(writer);

        if was_connected {
            info!(session = %self.inner.config.session_id, "disconnected");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner
                    .dispatcher
                    .dispatch(&SessionEvent::Disconnected(ConnectionError::Disconnected))
                    .await;
            });
        }
    }

    /// Takes the receiver of incoming messages. Returns `None` after the
    /// first call.
    pub fn messages(&self) -> Option<mpsc::Receiver<Arc<ResponseMessage>>> {
        self.messages.lock().take()
    }

    /// Takes the receiver of transport errors. Returns `None` after the
    /// first call.
    pub fn errors(&self) -> Option<mpsc::Receiver<ConnectionError>> {
        self.errors.lock().take()
    }

    /// Registers an additional event subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        self.inner.dispatcher.subscribe(subscriber);
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    /// Returns true if messages can be sent.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the last outbound sequence number used.
    #[must_use]
    pub fn sequence_number(&self) -> SeqNum {
        self.inner.sequences.current()
    }

    /// Overrides the outbound counter. The next send uses `seq + 1`.
    pub fn set_sequence_number(&self, seq: u64) {
        info!(seq, "outbound sequence number set");
        self.inner.sequences.set(seq);
    }

    /// Returns the MsgSeqNum of the last incoming message, 0 if none.
    #[must_use]
    pub fn last_received_sequence_number(&self) -> SeqNum {
        self.inner.sequences.last_received()
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns the session identity.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.config.session_id
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.inner.config.session_id)
            .field("address", &self.inner.options.address())
            .field("state", &self.state())
            .field("sequence_number", &self.sequence_number())
            .finish()
    }
}

impl Inner {
    async fn send<M: RequestMessage + ?Sized>(&self, message: &M) -> Result<SeqNum, FixError> {
        let mut guard = self.writer.lock().await;
        let token = {
            let state = self.state.read();
            if !state.is_connected() {
                return Err(SessionError::NotConnected.into());
            }
            self.cancel.lock().clone()
        };
        let Some(writer) = guard.as_mut() else {
            return Err(SessionError::NotConnected.into());
        };

        let msg_type = message.msg_type();
        let code = msg_type.as_str();
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(SessionError::UnsupportedType {
                msg_type: code.to_string(),
            }
            .into());
        }

        let delimiter = self.options.delimiter;
        let Some(seq) = self.sequences.allocate() else {
            return Err(SessionError::SequenceExhausted.into());
        };
        let mut wire: BytesMut = MessageBuilder::new(&self.config.session_id)
            .with_delimiter(delimiter)
            .build(message, seq);
        if wire.last() != Some(&delimiter) {
            wire.put_u8(delimiter);
        }

        let result = async {
            writer.write_all(&wire).await?;
            writer.flush().await
        }
        .await;
        drop(guard);

        match result {
            Ok(()) => {
                debug!(msg_type = code, seq = seq.value(), len = wire.len(), "message sent");
                Ok(seq)
            }
            Err(e) => {
                let err = ConnectionError::Write(e.to_string());
                self.fail(&token, err.clone()).await;
                Err(err.into())
            }
        }
    }

    /// Moves to `Disconnected` and cancels the current session.
    /// Returns true if the session was connected.
    fn mark_disconnected(&self) -> bool {
        let mut state = self.state.write();
        let was_connected = state.is_connected();
        *state = ConnectionState::Disconnected;
        self.cancel.lock().cancel();
        was_connected
    }

    /// Ends the session owning `token`, if it is still the live one.
    ///
    /// A session's token is cancelled under the state lock when it leaves
    /// `Connected`, so an uncancelled token always belongs to the current
    /// connected session.
    fn end_session(&self, token: &CancellationToken) -> bool {
        let mut state = self.state.write();
        if token.is_cancelled() || !state.is_connected() {
            return false;
        }
        *state = ConnectionState::Disconnected;
        token.cancel();
        true
    }

    /// Pushes an error without waiting for channel capacity.
    fn report_error(&self, err: ConnectionError) {
        match self.errors.try_send(err) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(error = %dropped, "error channel full, dropping error");
            }
        }
    }

    /// Ends the session owning `token` because of a transport failure.
    ///
    /// Does nothing if that session already ended, so a stale reader cannot
    /// tear down a newer connection.
    async fn fail(&self, token: &CancellationToken, err: ConnectionError) {
        let mut writer = self.writer.lock().await;
        if !self.end_session(token) {
            return;
        }
        error!(error = %err, session = %self.config.session_id, "connection failed");
        if let Some(mut half) = writer.take() {
            let _ = half.shutdown().await;
        }
        drop(writer);

        self.report_error(err.clone());
        self.dispatcher
            .dispatch(&SessionEvent::Disconnected(err))
            .await;
    }

    async fn handle_frame(&self, decoder: &Decoder, frame: &[u8]) {
        let message = Arc::new(decoder.decode(frame));
        if let Some(seq) = message.seq_num() {
            self.sequences.record_incoming(seq);
        }
        debug!(
            msg_type = message.msg_type_code(),
            len = frame.len(),
            "message received"
        );

        if self.options.auto_heartbeat && message.msg_type() == Some(MsgType::TestRequest) {
            let test_req_id = message.field(tags::TEST_REQ_ID).unwrap_or_default();
            if let Err(e) = self.send(&Heartbeat::reply_to(test_req_id)).await {
                warn!(error = %e, "failed to answer test request");
            }
        }

        self.dispatcher
            .dispatch(&SessionEvent::Message(message))
            .await;
    }

    /// Reads until cancelled or until the transport fails.
    ///
    /// Returns the failure, or `None` if the loop was cancelled.
    async fn read_loop(
        &self,
        mut reader: ReadHalf<BoxedStream>,
        token: &CancellationToken,
    ) -> Option<ConnectionError> {
        self.dispatcher.dispatch(&SessionEvent::Connected).await;

        let decoder = Decoder::new(self.options.delimiter);
        let mut codec = FrameCodec::new()
            .with_delimiter(self.options.delimiter)
            .with_max_message_size(self.options.max_message_size);
        let mut buf = BytesMut::with_capacity(READ_BUFFER_CAPACITY);

        loop {
            if token.is_cancelled() {
                return None;
            }

            let read = tokio::select! {
                biased;
                () = token.cancelled() => return None,
                read = reader.read_buf(&mut buf) => read,
            };
            match read {
                Ok(0) => return Some(ConnectionError::Closed),
                Ok(_) => {}
                Err(e) => return Some(ConnectionError::Read(e.to_string())),
            }

            loop {
                match codec.decode(&mut buf) {
                    Ok(Some(frame)) => {
                        self.handle_frame(&decoder, &frame).await;
                        if token.is_cancelled() {
                            return None;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => return Some(ConnectionError::Framing(e.to_string())),
                }
            }
        }
    }
}

/// Spawns the reader task and a supervisor that turns a panic into
/// [`ConnectionError::InternalFault`].
fn spawn_reader(inner: Arc<Inner>, reader: ReadHalf<BoxedStream>, token: CancellationToken) {
    let task_inner = Arc::clone(&inner);
    let task_token = token.clone();
    let handle = tokio::spawn(async move {
        if let Some(err) = task_inner.read_loop(reader, &task_token).await {
            task_inner.fail(&task_token, err).await;
        }
        debug!("reader task finished");
    });

    tokio::spawn(async move {
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_panic() => {
                let reason = panic_message(e.into_panic());
                error!(reason = %reason, "reader task panicked");
                inner
                    .fail(&token, ConnectionError::InternalFault(reason))
                    .await;
            }
            Err(e) => {
                inner
                    .fail(&token, ConnectionError::InternalFault(e.to_string()))
                    .await;
            }
        }
    });
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::application::Application;
    use crate::builder::ConnectionBuilder;
    use async_trait::async_trait;
    use bytes::BytesMut;
    use ctfix_core::error::{ConnectionError, FixError, SessionError};
    use ctfix_core::field::Field;
    use ctfix_core::message::{MsgType, RequestMessage, ResponseMessage};
    use ctfix_core::types::{CompId, SeqNum, SessionId};
    use ctfix_messages::{Heartbeat, Logout, TestRequest};
    use ctfix_session::{ConnectionState, SessionConfig};
    use ctfix_tagvalue::decoder::decode_fields;
    use ctfix_tagvalue::{MessageBuilder, SOH, Validator};
    use ctfix_transport::FrameCodec;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_util::codec::Decoder as _;

    const WAIT: Duration = Duration::from_secs(5);

    fn config() -> SessionConfig {
        let session_id = SessionId::new(
            "FIX.4.4",
            CompId::new("CLIENT").unwrap(),
            CompId::new("cServer").unwrap(),
        )
        .with_sender_sub_id("QUOTE")
        .with_target_sub_id("QUOTE");
        SessionConfig::new(session_id, "user", "pass")
    }

    fn server_session() -> SessionId {
        SessionId::new(
            "FIX.4.4",
            CompId::new("cServer").unwrap(),
            CompId::new("CLIENT").unwrap(),
        )
    }

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// Reads the next complete frame from the peer socket.
    async fn read_frame(sock: &mut TcpStream, codec: &mut FrameCodec, buf: &mut BytesMut) -> String {
        loop {
            if let Some(frame) = codec.decode(buf).unwrap() {
                return String::from_utf8_lossy(&frame).into_owned();
            }
            let n = sock.read_buf(buf).await.unwrap();
            assert!(n > 0, "peer closed before a full frame arrived");
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Seen {
        Connected,
        Message(String),
        Disconnected(ConnectionError),
    }

    struct Probe {
        tx: mpsc::UnboundedSender<Seen>,
        panic_on: Option<&'static str>,
    }

    #[async_trait]
    impl Application for Probe {
        async fn on_connected(&self, _session_id: &SessionId) {
            let _ = self.tx.send(Seen::Connected);
        }

        async fn on_message(&self, message: &ResponseMessage, _session_id: &SessionId) {
            if self.panic_on == Some(message.msg_type_code()) {
                panic!("application failed on {}", message.msg_type_code());
            }
            let _ = self.tx.send(Seen::Message(message.msg_type_code().to_string()));
        }

        async fn on_disconnected(&self, reason: &ConnectionError, _session_id: &SessionId) {
            let _ = self.tx.send(Seen::Disconnected(reason.clone()));
        }
    }

    fn probe(panic_on: Option<&'static str>) -> (Probe, mpsc::UnboundedReceiver<Seen>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Probe { tx, panic_on }, rx)
    }

    struct NoType;

    impl RequestMessage for NoType {
        fn msg_type(&self) -> MsgType {
            MsgType::Custom(String::new())
        }

        fn body(&self) -> Vec<Field> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", 1).build();
        let err = conn.send(&Heartbeat::new()).await.unwrap_err();
        assert!(matches!(err, FixError::Session(SessionError::NotConnected)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();

        conn.connect().await.unwrap();
        let (_sock, _) = listener.accept().await.unwrap();
        assert!(conn.is_connected());

        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, FixError::Session(SessionError::AlreadyConnected)));
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_dial_failure_returns_to_disconnected() {
        let (listener, port) = listener().await;
        drop(listener);

        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();
        let mut errors = conn.errors().unwrap();

        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, FixError::Connection(ConnectionError::Dial { .. })));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(matches!(
            errors.try_recv(),
            Ok(ConnectionError::Dial { .. })
        ));
    }

    #[tokio::test]
    async fn test_sequence_numbers_increase_from_one() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();
        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        let logon = conn.config().logon();
        assert_eq!(conn.send(&logon).await.unwrap(), SeqNum::new(1));
        assert_eq!(conn.send(&Heartbeat::new()).await.unwrap(), SeqNum::new(2));
        assert_eq!(conn.send(&TestRequest::new("T1")).await.unwrap(), SeqNum::new(3));

        let validator = Validator::default();
        for expected in ["1", "2", "3"] {
            let frame = timeout(WAIT, read_frame(&mut sock, &mut codec, &mut buf))
                .await
                .unwrap();
            assert_eq!(validator.validate(&frame), Ok(()));
            let fields = decode_fields(frame.as_bytes(), SOH);
            assert_eq!(fields.get(34), Some(expected));
            assert_eq!(fields.get(49), Some("CLIENT"));
            assert_eq!(fields.get(50), Some("QUOTE"));
        }
        assert_eq!(conn.sequence_number(), SeqNum::new(3));

        conn.set_sequence_number(10);
        conn.send(&Logout).await.unwrap();
        let frame = timeout(WAIT, read_frame(&mut sock, &mut codec, &mut buf))
            .await
            .unwrap();
        assert_eq!(decode_fields(frame.as_bytes(), SOH).get(34), Some("11"));

        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();
        conn.connect().await.unwrap();
        let (_sock, _) = listener.accept().await.unwrap();

        let err = conn.send(&NoType).await.unwrap_err();
        assert!(matches!(
            err,
            FixError::Session(SessionError::UnsupportedType { .. })
        ));
        assert_eq!(conn.sequence_number(), SeqNum::new(0));
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_exhausted_sequence_is_rejected() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();
        conn.connect().await.unwrap();
        let (_sock, _) = listener.accept().await.unwrap();

        conn.set_sequence_number(u64::MAX);
        let err = conn.send(&Heartbeat::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FixError::Session(SessionError::SequenceExhausted)
        ));
        assert_eq!(conn.sequence_number(), SeqNum::new(u64::MAX));
        assert!(conn.is_connected());
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_messages_reach_channel_and_application() {
        let (listener, port) = listener().await;
        let (app, mut seen) = probe(None);
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_application(app)
            .build();
        let mut messages = conn.messages().unwrap();
        assert!(conn.messages().is_none());

        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        let session = server_session();
        let builder = MessageBuilder::new(&session);
        let mut wire = BytesMut::new();
        wire.extend_from_slice(&builder.build(&Heartbeat::new(), SeqNum::new(1)));
        wire.extend_from_slice(&builder.build(&TestRequest::new("X"), SeqNum::new(2)));
        sock.write_all(&wire).await.unwrap();

        let first = timeout(WAIT, messages.recv()).await.unwrap().unwrap();
        let second = timeout(WAIT, messages.recv()).await.unwrap().unwrap();
        assert_eq!(first.msg_type_code(), "0");
        assert_eq!(second.msg_type_code(), "1");
        assert_eq!(second.field(112), Some("X"));
        assert!(second.message().contains("|112=X|"));

        assert_eq!(timeout(WAIT, seen.recv()).await.unwrap(), Some(Seen::Connected));
        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Message("0".to_string()))
        );
        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Message("1".to_string()))
        );
        assert_eq!(conn.last_received_sequence_number(), SeqNum::new(2));

        conn.disconnect().await;
        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Disconnected(ConnectionError::Disconnected))
        );
    }

    #[tokio::test]
    async fn test_peer_close_ends_session() {
        let (listener, port) = listener().await;
        let (app, mut seen) = probe(None);
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_application(app)
            .build();
        let mut errors = conn.errors().unwrap();

        conn.connect().await.unwrap();
        let (sock, _) = listener.accept().await.unwrap();
        drop(sock);

        let err = timeout(WAIT, errors.recv()).await.unwrap().unwrap();
        assert_eq!(err, ConnectionError::Closed);
        assert_eq!(timeout(WAIT, seen.recv()).await.unwrap(), Some(Seen::Connected));
        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Disconnected(ConnectionError::Closed))
        );
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        let err = conn.send(&Heartbeat::new()).await.unwrap_err();
        assert!(matches!(err, FixError::Session(SessionError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_allows_reconnect() {
        let (listener, port) = listener().await;
        let (app, mut seen) = probe(None);
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_application(app)
            .build();

        conn.connect().await.unwrap();
        let (_first, _) = listener.accept().await.unwrap();
        assert_eq!(timeout(WAIT, seen.recv()).await.unwrap(), Some(Seen::Connected));
        conn.send(&Heartbeat::new()).await.unwrap();

        conn.disconnect().await;
        conn.disconnect().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Disconnected(ConnectionError::Disconnected))
        );

        conn.connect().await.unwrap();
        let (_second, _) = listener.accept().await.unwrap();
        assert_eq!(timeout(WAIT, seen.recv()).await.unwrap(), Some(Seen::Connected));
        assert_eq!(conn.send(&Heartbeat::new()).await.unwrap(), SeqNum::new(1));
        conn.disconnect().await;

        // exactly one disconnect notification per session
        assert_eq!(
            timeout(WAIT, seen.recv()).await.unwrap(),
            Some(Seen::Disconnected(ConnectionError::Disconnected))
        );
        assert!(seen.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_session_failure_leaves_new_session_alone() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port).build();
        let mut errors = conn.errors().unwrap();

        conn.connect().await.unwrap();
        let (first, _) = listener.accept().await.unwrap();
        let old_token = conn.inner.cancel.lock().clone();
        conn.disconnect().await;
        assert!(old_token.is_cancelled());

        conn.connect().await.unwrap();
        let (_second, _) = listener.accept().await.unwrap();
        drop(first);

        // late failure reports from the first session's reader
        conn.inner.fail(&old_token, ConnectionError::Closed).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(conn.is_connected());
        assert!(errors.try_recv().is_err());
        assert_eq!(conn.send(&Heartbeat::new()).await.unwrap(), SeqNum::new(1));
        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_test_request_is_answered_when_enabled() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_auto_heartbeat(true)
            .build();
        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        let session = server_session();
        let request = MessageBuilder::new(&session).build(&TestRequest::new("PING"), SeqNum::new(1));
        sock.write_all(&request).await.unwrap();

        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        let frame = timeout(WAIT, read_frame(&mut sock, &mut codec, &mut buf))
            .await
            .unwrap();
        let fields = decode_fields(frame.as_bytes(), SOH);
        assert_eq!(fields.get(35), Some("0"));
        assert_eq!(fields.get(112), Some("PING"));
        assert_eq!(fields.get(34), Some("1"));

        conn.disconnect().await;
    }

    #[tokio::test]
    async fn test_application_panic_is_reported_as_internal_fault() {
        let (listener, port) = listener().await;
        let (app, _seen) = probe(Some("5"));
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_application(app)
            .build();
        let mut errors = conn.errors().unwrap();

        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        let session = server_session();
        let logout = MessageBuilder::new(&session).build(&Logout, SeqNum::new(1));
        sock.write_all(&logout).await.unwrap();

        let err = timeout(WAIT, errors.recv()).await.unwrap().unwrap();
        assert!(matches!(err, ConnectionError::InternalFault(ref reason) if reason.contains("application failed")));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let (listener, port) = listener().await;
        let conn = ConnectionBuilder::new(config(), "127.0.0.1", port)
            .with_delimiter(b'|')
            .build();
        let mut messages = conn.messages().unwrap();
        conn.connect().await.unwrap();
        let (mut sock, _) = listener.accept().await.unwrap();

        conn.send(&Heartbeat::new()).await.unwrap();
        let mut codec = FrameCodec::new().with_delimiter(b'|');
        let mut buf = BytesMut::new();
        let frame = timeout(WAIT, read_frame(&mut sock, &mut codec, &mut buf))
            .await
            .unwrap();
        assert!(frame.starts_with("8=FIX.4.4|9="));
        assert_eq!(Validator::new(b'|').validate(&frame), Ok(()));

        sock.write_all(frame.as_bytes()).await.unwrap();
        let echoed = timeout(WAIT, messages.recv()).await.unwrap().unwrap();
        assert_eq!(echoed.msg_type_code(), "0");

        conn.disconnect().await;
    }
}
