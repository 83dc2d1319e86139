//! Non-blocking tungstenite client transport.
//!
//! `open` performs the handshake synchronously under the connect timeout,
//! switches the socket to non-blocking mode and queues `TransportOpened`. The event loop calls
//! [`WsTransport::poll`] to drain inbound frames into session events.

use std::collections::VecDeque;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace, warn};
use tungstenite::client::IntoClientRequest;
use tungstenite::error::UrlError;
use tungstenite::protocol::CloseFrame;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, HandshakeError, Message, WebSocket};
use webterm_core::{Generation, SessionEvent, Transport, WebTermError};

use crate::error::Result;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

struct Connection {
    socket: Socket,
    generation: Generation,
    close_frame: Option<(u16, String)>,
}

pub struct WsTransport {
    connection: Option<Connection>,
    pending: VecDeque<SessionEvent>,
    connect_timeout: Duration,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self {
            connection: None,
            pending: VecDeque::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl WsTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound on TCP connect and on each blocking step of the handshake.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Drain queued and newly read events, in arrival order.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        self.read_available();
        self.pending.drain(..).collect()
    }

    fn read_available(&mut self) {
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        let generation = conn.generation;

        loop {
            match conn.socket.read() {
                Ok(Message::Text(text)) => self.pending.push_back(SessionEvent::TransportMessage {
                    generation,
                    data: text.as_bytes().to_vec(),
                }),
                Ok(Message::Binary(bytes)) => {
                    self.pending.push_back(SessionEvent::TransportMessage {
                        generation,
                        data: bytes.to_vec(),
                    });
                }
                Ok(Message::Close(frame)) => {
                    conn.close_frame = frame.map(|CloseFrame { code, reason }| {
                        (u16::from(code), reason.as_str().to_owned())
                    });
                    trace!(%generation, "close frame received");
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(WsError::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {
                    // Flush any queued pong or close reply.
                    match conn.socket.flush() {
                        Ok(()) => {}
                        Err(WsError::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {}
                        Err(error) => trace!(%error, "flush after read failed"),
                    }
                    return;
                }
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    let (code, reason) = conn
                        .close_frame
                        .take()
                        .map_or((None, String::new()), |(code, reason)| (Some(code), reason));
                    debug!(%generation, ?code, "server closed the connection");
                    self.pending.push_back(SessionEvent::TransportClosed {
                        generation,
                        code,
                        reason,
                    });
                    self.connection = None;
                    return;
                }
                Err(error) => {
                    let message = error.to_string();
                    self.pending.push_back(SessionEvent::TransportError {
                        generation,
                        message: message.clone(),
                    });
                    self.pending.push_back(SessionEvent::TransportClosed {
                        generation,
                        code: None,
                        reason: message,
                    });
                    self.connection = None;
                    return;
                }
            }
        }
    }
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{host} resolved to no address"))
    }))
}

fn connect_socket(url: &str, timeout: Duration) -> Result<Socket> {
    let request = url.into_client_request()?;
    let uri = request.uri();
    let host = uri
        .host()
        .ok_or(WsError::Url(UrlError::NoHostName))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_owned();
    let port = uri
        .port_u16()
        .unwrap_or(if uri.scheme_str() == Some("wss") { 443 } else { 80 });

    let stream = connect_tcp(&host, port, timeout)?;
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let (mut socket, response) = tungstenite::client_tls_with_config(request, stream, None, None)
        .map_err(|error| match error {
            HandshakeError::Failure(error) => error,
            // A read timeout surfaces as an interrupted handshake.
            HandshakeError::Interrupted(_) => WsError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("handshake with {host}:{port} timed out"),
            )),
        })?;
    trace!(status = %response.status(), "handshake complete");

    let stream = match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream,
        MaybeTlsStream::Rustls(stream) => &mut stream.sock,
        _ => {
            return Err(io::Error::other("unsupported websocket stream").into());
        }
    };
    stream.set_read_timeout(None)?;
    stream.set_write_timeout(None)?;
    stream.set_nonblocking(true)?;
    Ok(socket)
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str, generation: Generation) -> webterm_core::Result<()> {
        self.close();
        let socket = connect_socket(url, self.connect_timeout)
            .map_err(|error| WebTermError::transport_open(error.to_string()))?;
        debug!(%url, %generation, "websocket connected");
        self.connection = Some(Connection {
            socket,
            generation,
            close_frame: None,
        });
        self.pending
            .push_back(SessionEvent::TransportOpened { generation });
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> webterm_core::Result<()> {
        let Some(conn) = self.connection.as_mut() else {
            return Err(WebTermError::NotConnected);
        };
        // The server reads text frames only.
        let message = Message::text(String::from_utf8_lossy(bytes).into_owned());
        match conn.socket.send(message) {
            Ok(()) => Ok(()),
            // The frame is queued; the next poll flushes it.
            Err(WsError::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {
                trace!(generation = %conn.generation, "send buffered");
                Ok(())
            }
            Err(error) => Err(WebTermError::transport_send(error.to_string())),
        }
    }

    fn close(&mut self) {
        let Some(mut conn) = self.connection.take() else {
            return;
        };
        debug!(generation = %conn.generation, "closing websocket");
        if let Err(error) = conn.socket.close(None) {
            trace!(%error, "close handshake not sent");
        }
        match conn.socket.flush() {
            Ok(()) | Err(WsError::ConnectionClosed) => {}
            Err(WsError::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {}
            Err(error) => warn!(%error, "flush during close failed"),
        }
        // Events already read for this connection are stale now.
        self.pending.clear();
    }
}
