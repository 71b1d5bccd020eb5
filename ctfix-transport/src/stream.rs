/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! TCP dialer with optional TLS upgrade.

use crate::tls::TlsOptions;
use ctfix_core::error::ConnectionError;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// A bidirectional byte stream, plain or encrypted.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

/// Type-erased connection stream.
pub type BoxedStream = Box<dyn AsyncStream>;

/// Opens a connection to `host:port`.
///
/// The timeout bounds the whole operation, TLS handshake included.
///
/// # Arguments
/// * `host` - Host name or IP address
/// * `port` - TCP port
/// * `tls` - TLS options, or `None` for a plain socket
/// * `connect_timeout` - Upper bound for dial and handshake
///
/// # Errors
/// Returns [`ConnectionError::DialTimeout`] when the timeout elapses,
/// [`ConnectionError::Dial`] when the socket cannot be opened and
/// [`ConnectionError::Tls`] when the handshake fails.
pub async fn connect(
    host: &str,
    port: u16,
    tls: Option<&TlsOptions>,
    connect_timeout: Duration,
) -> Result<BoxedStream, ConnectionError> {
    let address = format!("{host}:{port}");
    let timeout_ms = u64::try_from(connect_timeout.as_millis()).unwrap_or(u64::MAX);

    match timeout(connect_timeout, dial(&address, host, tls)).await {
        Ok(result) => result,
        Err(_) => Err(ConnectionError::DialTimeout {
            address,
            timeout_ms,
        }),
    }
}

async fn dial(
    address: &str,
    host: &str,
    tls: Option<&TlsOptions>,
) -> Result<BoxedStream, ConnectionError> {
    let tcp = TcpStream::connect(address)
        .await
        .map_err(|e| ConnectionError::Dial {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
    if let Err(e) = tcp.set_nodelay(true) {
        debug!(address, error = %e, "failed to set TCP_NODELAY");
    }

    let Some(options) = tls else {
        info!(address, "TCP connection established");
        return Ok(Box::new(tcp));
    };

    let connector = options.connector()?;
    let server_name = options.server_name(host)?;
    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| ConnectionError::Tls(format!("handshake failed: {e}")))?;

    info!(address, "TLS connection established");
    Ok(Box::new(stream))
}
