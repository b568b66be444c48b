// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operator kit: CRD registration and REST clients for custom API groups.

pub mod client;
pub mod registrar;
pub mod resource;
pub mod scheme;

pub use client::{build_client, build_client_in_cluster, ClientConfig, RestClient};
pub use registrar::{
    ensure_all, ensure_all_report, ensure_all_with_cancel, wait_for_established, Outcome,
    RegistrationReport,
};
pub use resource::{Context, CrdDescriptor, Scope};
pub use scheme::{AddToScheme, NegotiatedSerializer, Scheme};
