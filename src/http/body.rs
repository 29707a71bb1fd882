//! Fixed-length body reads.
//!
//! The head is read with a delimiter search, so the shared buffer may already
//! hold part (or all) of the body. Those bytes count toward the declared
//! length; only the shortfall is read from the connection.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ConnectionError;

/// Most buffer space reserved per read while receiving a body.
const BODY_CHUNK: usize = 64 * 1024;

/// Reads one chunk into `buffer`, bounded by `read_timeout` when set.
///
/// Returns the number of bytes read; `0` means the peer closed.
pub async fn read_some<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    read_timeout: Option<Duration>,
) -> Result<usize, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let n = match read_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.read_buf(buffer))
            .await
            .map_err(|_| ConnectionError::ReadTimeout)??,
        None => stream.read_buf(buffer).await?,
    };
    Ok(n)
}

/// Splits exactly `length` body bytes off the front of `buffer`, reading
/// from `stream` until enough are buffered.
///
/// Anything read past `length` stays in `buffer` for the next request.
/// The caller bounds `length`; the buffer grows one chunk at a time.
pub async fn read_body<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    length: usize,
    read_timeout: Option<Duration>,
) -> Result<Bytes, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    while buffer.len() < length {
        buffer.reserve((length - buffer.len()).min(BODY_CHUNK));

        let incomplete = ConnectionError::IncompleteBody {
            expected: length,
            received: buffer.len(),
        };
        match read_some(stream, buffer, read_timeout).await {
            Ok(0) => return Err(incomplete),
            Ok(_) => {}
            Err(ConnectionError::ReadTimeout) => return Err(ConnectionError::ReadTimeout),
            Err(err) => {
                tracing::debug!(error = %err, "read failed while receiving body");
                return Err(incomplete);
            }
        }
    }

    Ok(buffer.split_to(length).freeze())
}
