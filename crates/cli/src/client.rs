// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over the supervisor's length-prefixed JSON socket.
//! One connection per request, mirroring the one-shot-connection shape
//! of an administrative CLI talking to a long-lived daemon.

use std::path::{Path, PathBuf};

use de_wire::{read_message, write_message, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to the supervisor socket at {path:?}: {source}")]
    Connect { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Protocol(#[from] de_wire::ProtocolError),

    #[error("unexpected response from supervisor: {0:?}")]
    Unexpected(Response),
}

pub struct SupervisorClient {
    socket: PathBuf,
}

impl SupervisorClient {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self { socket: socket.into() }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket
    }

    /// Send one request and read back exactly one response. Opens a
    /// fresh connection per call: administrative RPCs are infrequent
    /// and this avoids holding a long-lived handle open across retries.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket.clone(), source })?;
        let bytes = de_wire::encode(request)?;
        write_message(&mut stream, &bytes).await?;
        let reply = read_message(&mut stream).await?;
        Ok(de_wire::decode(&reply)?)
    }

    /// Send a request expecting `Response::Text`, unwrapping it to a
    /// plain `String`; any other shape (including `Error`) is surfaced
    /// to the caller so `main` can render it consistently.
    pub async fn send_text(&self, request: &Request) -> Result<String, ClientError> {
        match self.send(request).await? {
            Response::Text { body } => Ok(body),
            Response::Ok => Ok("OK".to_string()),
            Response::Pong => Ok("pong".to_string()),
            Response::Error { message } => Ok(format!("ERROR, {message}")),
            other @ Response::StopResult { .. } => Err(ClientError::Unexpected(other)),
        }
    }
}
