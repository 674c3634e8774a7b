//! TCP log sink: newline-delimited JSON records over a plain socket.
//!
//! Counterpart of the MySQL sink for the log-shipping uplink. The remote
//! side is a line-oriented JSON-per-record ingester; each unit becomes one
//! serialized [`LogRecord`] terminated by `\n`. No session setup is needed,
//! so the default no-op [`Sink::initialize`] applies.

use std::fmt;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::Sink;
use crate::config::TargetDescriptor;
use crate::error::SinkError;
use crate::shipper::LogRecord;

/// TCP-backed [`Sink`] shipping one JSON line per log record.
pub struct TcpLogSink {
    target: TargetDescriptor,
    stream: Option<TcpStream>,
}

impl fmt::Debug for TcpLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpLogSink")
            .field("target", &self.target.addr())
            .field("connected", &self.stream.is_some())
            .finish()
    }
}

impl TcpLogSink {
    /// Creates a disconnected sink for the given target.
    #[must_use]
    pub fn new(target: TargetDescriptor) -> Self {
        Self {
            target,
            stream: None,
        }
    }
}

/// Serializes a record into its wire form: one JSON object plus `\n`.
///
/// # Errors
///
/// Returns [`SinkError::Fatal`] when the record cannot be serialized;
/// serialization does not depend on connectivity, so retrying is pointless.
pub fn encode(record: &LogRecord) -> Result<Vec<u8>, SinkError> {
    let mut buf = serde_json::to_vec(record).map_err(|e| SinkError::Fatal(e.to_string()))?;
    buf.push(b'\n');
    Ok(buf)
}

impl Sink for TcpLogSink {
    type Unit = LogRecord;

    fn name(&self) -> &'static str {
        "log-shipper"
    }

    async fn connect(&mut self) -> Result<(), SinkError> {
        self.stream = None;
        let stream = TcpStream::connect(self.target.addr())
            .await
            .map_err(|e| SinkError::from_io(&e))?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, unit: &Self::Unit) -> Result<(), SinkError> {
        let buf = encode(unit)?;
        let Some(stream) = self.stream.as_mut() else {
            return Err(SinkError::ConnectionLost("no live connection".to_string()));
        };
        let written = async {
            stream.write_all(&buf).await?;
            stream.flush().await
        }
        .await;
        if let Err(e) = written {
            self.stream = None;
            return Err(SinkError::from_io(&e));
        }
        Ok(())
    }

    /// Reads the socket while idle; the ingester never sends data, so
    /// EOF or a read error means the link dropped.
    async fn watch_link(&mut self) -> SinkError {
        let Some(stream) = self.stream.as_mut() else {
            return SinkError::ConnectionLost("no live connection".to_string());
        };
        let mut buf = [0u8; 512];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => return SinkError::ConnectionLost("closed by peer".to_string()),
                Ok(_) => {}
                Err(e) => return SinkError::from_io(&e),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    fn record() -> LogRecord {
        LogRecord::new("info", "app", serde_json::json!("backend up"))
    }

    #[test]
    fn encode_terminates_with_newline() {
        let Ok(buf) = encode(&record()) else {
            panic!("encode failed");
        };
        assert_eq!(buf.last(), Some(&b'\n'));
        // Exactly one line per record
        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn encode_produces_expected_fields() {
        let Ok(buf) = encode(&record()) else {
            panic!("encode failed");
        };
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&buf) else {
            panic!("wire form is not valid JSON");
        };
        assert_eq!(value["level"], "info");
        assert_eq!(value["label"], "app");
        assert_eq!(value["message"], "backend up");
        let Some(ts) = value["timestamp"].as_str() else {
            panic!("timestamp missing");
        };
        assert!(ts.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
    }

    #[tokio::test]
    async fn ships_one_json_line_over_loopback() {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };

        let server = tokio::spawn(async move {
            let Ok((socket, _)) = listener.accept().await else {
                panic!("accept failed");
            };
            let mut lines = tokio::io::BufReader::new(socket).lines();
            lines.next_line().await
        });

        let mut sink = TcpLogSink::new(TargetDescriptor {
            host: addr.ip().to_string(),
            port: addr.port(),
            user: None,
            password: None,
            database: None,
        });
        assert!(sink.connect().await.is_ok());
        assert!(sink.send(&record()).await.is_ok());

        let Ok(Ok(Some(line))) = server.await else {
            panic!("server did not read a line");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) else {
            panic!("received line is not JSON");
        };
        assert_eq!(value["message"], "backend up");
    }

    #[tokio::test]
    async fn connect_refused_is_retryable() {
        // Bind then drop to obtain a port with nothing listening.
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        drop(listener);

        let mut sink = TcpLogSink::new(TargetDescriptor {
            host: addr.ip().to_string(),
            port: addr.port(),
            user: None,
            password: None,
            database: None,
        });
        match sink.connect().await {
            Err(err) => assert!(!err.is_fatal()),
            Ok(()) => panic!("connect to dead port succeeded"),
        }
    }

    #[tokio::test]
    async fn watch_link_reports_peer_close() {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };

        let mut sink = TcpLogSink::new(TargetDescriptor {
            host: addr.ip().to_string(),
            port: addr.port(),
            user: None,
            password: None,
            database: None,
        });
        assert!(sink.connect().await.is_ok());

        // Accept, then tear the server side down entirely.
        let Ok((socket, _)) = listener.accept().await else {
            panic!("accept failed");
        };
        drop(socket);
        drop(listener);

        let err = sink.watch_link().await;
        assert!(!err.is_fatal(), "idle drop must be retryable");
    }

    #[tokio::test]
    async fn watch_link_without_connection_is_retryable() {
        let mut sink = TcpLogSink::new(TargetDescriptor {
            host: "localhost".to_string(),
            port: 5000,
            user: None,
            password: None,
            database: None,
        });
        let err = sink.watch_link().await;
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn send_without_connection_is_retryable() {
        let mut sink = TcpLogSink::new(TargetDescriptor {
            host: "localhost".to_string(),
            port: 5000,
            user: None,
            password: None,
            database: None,
        });
        match sink.send(&record()).await {
            Err(err) => assert!(!err.is_fatal()),
            Ok(()) => panic!("send without connection succeeded"),
        }
    }
}
