//! Newline-delimited JSON transport for the router.
//!
//! One envelope per input line, one response object per output line. Deferred
//! responses are written when they resolve, so output order may differ from
//! input order; an `id` on the envelope is copied onto its response.
//!
//! Once the output side is gone nothing more can be answered, so serving
//! stops even if input is still arriving.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::dispatch::MessageRouter;
use super::protocol::{Envelope, Reply, Response};

/// Serve `reader` until EOF, writing responses to `writer`.
///
/// Waits for every deferred response before returning. Returns the writer's
/// error if output failed.
pub async fn serve<R, W>(router: Arc<MessageRouter>, reader: R, writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(write_lines(writer, out_rx));
    let mut pending = JoinSet::new();

    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = out_tx.closed() => {
                tracing::warn!("output closed, no longer reading requests");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope = match Envelope::parse(line) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed line");
                continue;
            }
        };
        let id = envelope.id.clone();

        match router.dispatch(&envelope) {
            Reply::Immediate(response) => send(&out_tx, id, response),
            Reply::Deferred(future) => {
                let out_tx = out_tx.clone();
                pending.spawn(async move {
                    let response = future.await;
                    send(&out_tx, id, response);
                });
            }
            Reply::NoResponse => {}
        }
    }

    while let Some(joined) = pending.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "deferred response task failed");
        }
    }

    drop(out_tx);
    writer_task
        .await
        .map_err(|e| std::io::Error::other(format!("writer task failed: {e}")))?
}

fn send(out_tx: &mpsc::UnboundedSender<String>, id: Option<Value>, response: Response) {
    match encode(id, &response) {
        Ok(line) => {
            if out_tx.send(line).is_err() {
                tracing::warn!("output closed, response dropped");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to encode response"),
    }
}

/// Encode a response as one line, copying `id` onto it when present.
fn encode(id: Option<Value>, response: &Response) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(response)?;
    if let (Some(id), Value::Object(map)) = (id, &mut value) {
        map.insert("id".to_string(), id);
    }
    serde_json::to_string(&value)
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
