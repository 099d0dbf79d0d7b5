//! Request/response messages between the CLI and the daemon.
//!
//! One request per connection: the client writes `IPC_MAGIC` followed by a
//! JSON [`Request`], shuts down its write half, then reads a JSON
//! [`Response`] until the daemon closes the stream.

use crate::config::APP_NAME;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const IPC_MAGIC: &[u8] = b"CLRG\x00\x01";
pub const MAX_IPC_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
const CLIENT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    Query { query: String },
    Run { query: String, rank: usize, action: String },
    Insert { text: String },
    Remove { text: String },
    Clear,
    SetHistoryLimit { limit: u32 },
    SetPersistent { enabled: bool },
    SetFuzzy { enabled: bool },
    Status,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionView {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub rank: usize,
    pub text: String,
    pub subtitle: String,
    pub actions: Vec<ActionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub entries: usize,
    pub history_limit: usize,
    pub persistent: bool,
    pub fuzzy: bool,
    pub history_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Items(Vec<ItemView>),
    Status(Status),
    Done,
    Error(String),
}

pub fn socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(format!("{}.sock", APP_NAME))
}

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    let mut msg = Vec::with_capacity(IPC_MAGIC.len() + body.len());
    msg.extend_from_slice(IPC_MAGIC);
    msg.extend_from_slice(&body);

    writer.write_all(&msg).await?;
    writer.shutdown().await?;
    Ok(())
}

pub async fn read_message<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let mut buf = Vec::new();
    reader
        .take(MAX_IPC_MESSAGE_SIZE as u64 + IPC_MAGIC.len() as u64 + 1)
        .read_to_end(&mut buf)
        .await?;

    if buf.len() > MAX_IPC_MESSAGE_SIZE + IPC_MAGIC.len() {
        anyhow::bail!("IPC message too large");
    }
    let Some(body) = buf.strip_prefix(IPC_MAGIC) else {
        anyhow::bail!("Bad IPC magic");
    };
    serde_json::from_slice(body).context("Malformed IPC message")
}

/// Sends one request to the daemon and waits for its answer.
#[cfg(unix)]
pub async fn send(request: &Request) -> Result<Response> {
    send_to(&socket_path(), request).await
}

#[cfg(unix)]
pub async fn send_to(sock_path: &std::path::Path, request: &Request) -> Result<Response> {
    use tokio::net::UnixStream;
    use tokio::time::timeout;

    let mut stream = timeout(CLIENT_TIMEOUT, UnixStream::connect(sock_path))
        .await
        .context("Connection timeout")?
        .context("Failed to connect to daemon, is `clipring daemon` running?")?;

    let (mut rx, mut tx) = stream.split();
    write_message(&mut tx, request).await?;

    timeout(CLIENT_TIMEOUT, read_message(&mut rx))
        .await
        .context("Daemon did not answer")?
}

#[cfg(not(unix))]
pub async fn send(_request: &Request) -> Result<Response> {
    anyhow::bail!("IPC is only supported on unix platforms")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn message_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let request = Request::Run {
            query: "foo".into(),
            rank: 2,
            action: "cp".into(),
        };

        write_message(&mut a, &request).await.unwrap();
        let received: Request = read_message(&mut b).await.unwrap();
        assert_eq!(received, request);
    }

    #[tokio::test]
    async fn missing_magic_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        a.write_all(br#""Status""#).await.unwrap();
        a.shutdown().await.unwrap();

        assert!(read_message::<_, Request>(&mut b).await.is_err());
    }
}
