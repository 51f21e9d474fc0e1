// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the broker

use ces_core::ListenerId;
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("subscribe filter names no events")]
    InvalidFilter,
    #[error("subscribe filter names {count} events, at most {max} allowed")]
    TooManyEvents { count: usize, max: usize },
    #[error("listener already subscribed: {0}")]
    AlreadySubscribed(ListenerId),
    #[error("listener not subscribed: {0}")]
    NotFound(ListenerId),
}

/// Errors returned to broker callers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("listener not found: {0}")]
    NotFound(ListenerId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("broker dispatch loop stopped")]
    Stopped,
    #[error("broker must be started inside a Tokio runtime")]
    NoRuntime,
}
