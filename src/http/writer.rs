use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Headers that lead the block, in this order. Anything else follows sorted.
const LEADING_HEADERS: [&str; 4] = ["Server", "Content-Type", "Content-Length", "Connection"];

pub fn serialize_response(resp: &Response) -> Bytes {
    let mut buf = BytesMut::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    // Headers
    let mut rest: Vec<_> = resp
        .headers
        .iter()
        .filter(|(k, _)| !LEADING_HEADERS.contains(&k.as_str()))
        .collect();
    rest.sort();

    let leading = LEADING_HEADERS
        .iter()
        .filter_map(|k| resp.headers.get_key_value(*k));

    for (k, v) in leading.chain(rest) {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    // Body
    buf.put_slice(&resp.body);

    buf.freeze()
}

/// Serialized response plus how much of it is still unsent.
pub struct ResponseWriter {
    buffer: Bytes,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    /// Writes everything left. Only one write is in flight at a time.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.buffer.has_remaining() {
            let n = stream.write(self.buffer.chunk()).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.buffer.advance(n);
        }

        stream.flush().await
    }
}
