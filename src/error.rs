// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("failed to create CRD {name}: {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to get CRD {name}: {source}")]
    FetchFailed {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("CRD {name} name conflict: {reason}")]
    NameConflict { name: String, reason: String },

    #[error("timed out after {timeout:?} waiting for CRD {name} to be established")]
    Timeout { name: String, timeout: Duration },

    #[error("registration of CRD {name} was cancelled")]
    Cancelled { name: String },

    #[error("Invalid registration context: {0}")]
    InvalidContext(String),

    #[error("Failed to build scheme: {0}")]
    SchemeBuildFailed(String),

    #[error("Failed to load client configuration: {0}")]
    KubeconfigError(String),

    #[error("Codec error: {0}")]
    CodecError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid op mask: {0}")]
    InvalidOpMask(String),
}

impl KitError {
    /// True for errors that end a readiness wait without a server verdict.
    pub fn is_timeout(&self) -> bool {
        matches!(self, KitError::Timeout { .. } | KitError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, KitError>;
