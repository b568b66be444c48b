// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// CRD readiness polling defaults
pub mod crd {
    /// Default interval between readiness checks, in milliseconds
    pub const POLL_INTERVAL_MILLIS: u64 = 500;
    /// Default per-CRD readiness budget, in seconds
    pub const TIMEOUT_SECS: u64 = 60;

    pub const ESTABLISHED: &str = "Established";
    pub const NAMES_ACCEPTED: &str = "NamesAccepted";
    pub const CONDITION_TRUE: &str = "True";
    pub const CONDITION_FALSE: &str = "False";

    /// Status reason returned by the API server when a create collides
    pub const REASON_ALREADY_EXISTS: &str = "AlreadyExists";
}

/// REST client defaults
pub mod client {
    pub const API_PATH: &str = "/apis";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Environment variables read by the opkit binary
pub mod env {
    pub const POLL_INTERVAL_MS: &str = "OPKIT_POLL_INTERVAL_MS";
    pub const TIMEOUT_SECS: &str = "OPKIT_TIMEOUT_SECS";
    pub const CRD_FILE: &str = "OPKIT_CRD_FILE";
}
