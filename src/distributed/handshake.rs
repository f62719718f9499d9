//! The framing of the rendezvous handshake: a big endian length header followed by a JSON body.

use std::{io, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time,
};

use crate::error::Result;

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();
const MAX_FRAME_SIZE: usize = 64 * 1024;

/// The messages exchanged while a group is being established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handshake {
    Join { rank: usize, world_size: usize },
    Ready { world_size: usize },
    Reject { reason: String },
}

impl Handshake {
    pub fn kind(&self) -> &'static str {
        match self {
            Handshake::Join { .. } => "join",
            Handshake::Ready { .. } => "ready",
            Handshake::Reject { .. } => "reject",
        }
    }
}

/// Both ends of a handshake connection.
pub struct HandshakeChannel<S> {
    stream: S,
    buf: Vec<u8>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> HandshakeChannel<S> {
    /// Creates a new `HandshakeChannel`.
    ///
    /// # Arguments
    /// * `stream` - The underlying bidirectional stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    /// Sends `msg` through the inner stream.
    pub async fn send(&mut self, msg: &Handshake) -> Result<()> {
        let Self { stream, buf } = self;

        buf.clear();
        buf.resize(LEN_TYPE_SIZE, 0);
        serde_json::to_writer(&mut *buf, msg)?;

        let header = ((buf.len() - LEN_TYPE_SIZE) as LenType).to_be_bytes();
        buf[..LEN_TYPE_SIZE].copy_from_slice(&header);

        stream.write_all(buf).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Waits to receive the next message from the inner stream.
    pub async fn recv(&mut self) -> Result<Handshake> {
        let mut size_buf = [0; LEN_TYPE_SIZE];
        self.stream.read_exact(&mut size_buf).await?;
        let len = LenType::from_be_bytes(size_buf) as usize;

        if len > MAX_FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("handshake frame of {len} bytes exceeds the {MAX_FRAME_SIZE} bytes limit"),
            )
            .into());
        }

        self.buf.resize(len, 0);
        self.stream.read_exact(&mut self.buf).await?;

        Ok(serde_json::from_slice(&self.buf)?)
    }
}

impl HandshakeChannel<TcpStream> {
    /// Whether the peer hung up.
    ///
    /// A joined peer stays silent until it is released, so the connection only becomes readable
    /// once it is closed. If nothing shows up within `grace` the peer is considered alive.
    pub async fn is_closed(&self, grace: Duration) -> bool {
        let mut byte = [0; 1];
        matches!(
            time::timeout(grace, self.stream.peek(&mut byte)).await,
            Ok(Ok(0) | Err(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use tokio::io;

    use super::*;
    use crate::error::TrainErr;

    #[tokio::test]
    async fn send_recv() {
        let (one, two) = io::duplex(256);
        let mut one = HandshakeChannel::new(one);
        let mut two = HandshakeChannel::new(two);

        let msg = Handshake::Join {
            rank: 1,
            world_size: 2,
        };
        one.send(&msg).await.unwrap();

        assert_eq!(two.recv().await.unwrap(), msg);
    }

    #[tokio::test]
    async fn oversized_frames_are_refused() {
        let (mut raw, other) = io::duplex(256);
        let mut channel = HandshakeChannel::new(other);

        let header = ((MAX_FRAME_SIZE + 1) as LenType).to_be_bytes();
        raw.write_all(&header).await.unwrap();

        let err = channel.recv().await.unwrap_err();
        assert!(matches!(err, TrainErr::Io(e) if e.kind() == std::io::ErrorKind::InvalidData));
    }

    #[tokio::test]
    async fn garbage_bodies_fail_to_decode() {
        let (mut raw, other) = io::duplex(256);
        let mut channel = HandshakeChannel::new(other);

        let body = b"not json";
        raw.write_all(&(body.len() as LenType).to_be_bytes())
            .await
            .unwrap();
        raw.write_all(body).await.unwrap();

        assert!(matches!(channel.recv().await, Err(TrainErr::Json(_))));
    }

    #[tokio::test]
    async fn hung_up_peers_are_detected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let alive = TcpStream::connect(addr).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();
        let channel = HandshakeChannel::new(accepted);
        let grace = Duration::from_millis(100);

        assert!(!channel.is_closed(grace).await);

        drop(alive);
        assert!(channel.is_closed(grace).await);
    }
}
