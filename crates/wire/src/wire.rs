// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing: 4-byte big-endian length prefix followed
//! by the JSON payload.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Request, Response};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to serialize message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("message exceeds maximum frame size ({0} bytes)")]
    FrameTooLarge(usize),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum single-message frame size accepted on either side of the
/// socket; guards against a misbehaving peer claiming an enormous length.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Serialize a value to raw JSON bytes (no length prefix).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a value from raw JSON bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `data` behind a 4-byte big-endian length prefix.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(data.len()));
    }
    let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame, returning the payload without the
/// prefix.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read one [`Request`] frame from the wire.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let bytes = read_message(reader).await?;
    decode(&bytes)
}

/// Write one [`Response`] frame to the wire.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    write_message(writer, &bytes).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
