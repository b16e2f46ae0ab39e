// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::ProcessError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("source identity error: {0}")]
    Identity(#[from] de_core::IdentityError),

    #[error("channel {0:?} already exists")]
    ChannelAlreadyExists(String),

    #[error("no channel named {0:?}")]
    ChannelNotFound(String),

    /// A previously-exhausted one-shot source worker cannot be reused.
    #[error("source for channel {channel:?} already completed (exit code 0)")]
    SourceAlreadyCompleted { channel: String },

    #[error("workflow for channel {channel:?} is invalid: {reason}")]
    WorkflowInvalid { channel: String, reason: String },

    #[error(transparent)]
    DataSpace(#[from] de_dataspace::DataSpaceError),

    #[error(transparent)]
    Bus(#[from] de_bus::BusError),

    #[error(transparent)]
    Module(#[from] de_modules::ModuleError),

    #[error("module {0:?} referenced by the workflow plan was not declared")]
    UnknownModule(String),
}
