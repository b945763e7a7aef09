//! Line-delimited JSON transport
//!
//! Each input line is one inbound message. An object of the form
//! `{"presence": {...}}` is a presence notification; anything else is handed
//! to the object server as a message, including lines that are not JSON at
//! all (they decode to a string and get a "missing command" response).
//! Responses are written one JSON object per line.

use std::io;

use serde_json::Value;
use tivo_proxy::{StatusEvent, TransportEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Classify one input line
pub fn decode_line(line: &str) -> TransportEvent {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(mut obj)) if obj.len() == 1 && obj.contains_key("presence") => {
            TransportEvent::Presence(obj.remove("presence").unwrap_or(Value::Null))
        }
        Ok(value) => TransportEvent::Message(value),
        Err(e) => {
            debug!("Input line is not JSON ({}); passing through as text", e);
            TransportEvent::Message(Value::String(line.to_string()))
        }
    }
}

/// Feed input lines to the server as transport events
///
/// Reports `Connected` first. At end of input, reports `Disconnected` and
/// asks the server to shut down. Invalid UTF-8 is decoded lossily so one bad
/// line cannot end the session.
pub async fn read_events<R>(mut reader: R, events: mpsc::Sender<TransportEvent>) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    if events
        .send(TransportEvent::Status(StatusEvent::connected()))
        .await
        .is_err()
    {
        return Ok(());
    }

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim();
        if line.is_empty() {
            continue;
        }
        if events.send(decode_line(line)).await.is_err() {
            return Ok(());
        }
    }

    info!("End of input");
    let _ = events
        .send(TransportEvent::Status(StatusEvent::disconnected()))
        .await;
    let _ = events.send(TransportEvent::Shutdown).await;
    Ok(())
}

/// Write every published response as one line
pub async fn publish_responses<W>(writer: &mut W, mut responses: mpsc::Receiver<Value>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = responses.recv().await {
        let mut line = response.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
