// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD registration and readiness polling.
//!
//! Every descriptor is created first, then each one is polled until the API
//! server reports it `Established`. Failures for one CRD never stop work on
//! the others; the last failure seen is what [`ensure_all`] reports.

use crate::constants::crd::{
    CONDITION_FALSE, CONDITION_TRUE, ESTABLISHED, NAMES_ACCEPTED, REASON_ALREADY_EXISTS,
};
use crate::error::{KitError, Result};
use crate::kit::resource::{Context, CrdDescriptor};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{api::PostParams, Api};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Final state of one CRD after a registration run
#[derive(Debug)]
pub enum Outcome {
    Ready,
    Failed(KitError),
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready)
    }
}

/// Where the most recently observed failure is kept
#[derive(Debug, Clone, Copy)]
enum ErrorSlot {
    Outcome(usize),
    Create(usize),
}

/// Per-CRD results of a registration run
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Exactly one outcome per CRD, in input order
    pub outcomes: Vec<(String, Outcome)>,
    /// Create failures of CRDs that were still waited on afterwards
    pub create_errors: Vec<(String, KitError)>,
    last_error: Option<ErrorSlot>,
}

impl RegistrationReport {
    pub fn is_success(&self) -> bool {
        self.last_error.is_none()
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Names of the CRDs that became established, in input order
    pub fn ready(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_ready())
            .map(|(name, _)| name.as_str())
    }

    /// The failure observed last, whichever CRD it belongs to
    pub fn last_error(&self) -> Option<&KitError> {
        match self.last_error? {
            ErrorSlot::Outcome(i) => match &self.outcomes.get(i)?.1 {
                Outcome::Failed(e) => Some(e),
                Outcome::Ready => None,
            },
            ErrorSlot::Create(i) => self.create_errors.get(i).map(|(_, e)| e),
        }
    }

    /// Collapse into the last observed error, if any
    pub fn into_result(mut self) -> Result<()> {
        let error = match self.last_error {
            None => None,
            Some(ErrorSlot::Outcome(i)) if i < self.outcomes.len() => {
                match self.outcomes.swap_remove(i).1 {
                    Outcome::Failed(e) => Some(e),
                    Outcome::Ready => None,
                }
            }
            Some(ErrorSlot::Create(i)) if i < self.create_errors.len() => {
                Some(self.create_errors.swap_remove(i).1)
            }
            Some(_) => None,
        };
        error.map_or(Ok(()), Err)
    }

    fn record_create_failure(&mut self, name: String, error: KitError) {
        warn!("{}", error);
        self.create_errors.push((name, error));
        self.last_error = Some(ErrorSlot::Create(self.create_errors.len() - 1));
    }

    /// Mark the outcome at `index` as the latest failure before it is settled
    fn observe_failure_at(&mut self, index: usize, error: &KitError) {
        warn!("{}", error);
        self.last_error = Some(ErrorSlot::Outcome(index));
    }

    fn settle(&mut self, name: String, result: Result<()>) {
        let outcome = match result {
            Ok(()) => Outcome::Ready,
            Err(e) => {
                let index = self.outcomes.len();
                self.observe_failure_at(index, &e);
                Outcome::Failed(e)
            }
        };
        self.outcomes.push((name, outcome));
    }
}

/// Create all CRDs and wait until each one is established.
///
/// Returns the last error observed, or `Ok` if every CRD became ready.
pub async fn ensure_all(ctx: &Context, resources: &[CrdDescriptor]) -> Result<()> {
    ensure_all_with_cancel(ctx, resources, &CancellationToken::new()).await
}

/// Like [`ensure_all`], stopping early once `cancel` fires.
///
/// A create or wait in flight at that moment, and every CRD after it, is
/// reported as cancelled.
pub async fn ensure_all_with_cancel(
    ctx: &Context,
    resources: &[CrdDescriptor],
    cancel: &CancellationToken,
) -> Result<()> {
    ensure_all_report(ctx, resources, cancel)
        .await
        .into_result()
}

/// Run a registration and return the outcome for every CRD
pub async fn ensure_all_report(
    ctx: &Context,
    resources: &[CrdDescriptor],
    cancel: &CancellationToken,
) -> RegistrationReport {
    let crds: Api<CustomResourceDefinition> = Api::all(ctx.api_ext_client().clone());
    let mut report = RegistrationReport::default();

    info!("Registering {} CRDs", resources.len());
    // CRDs cancelled before or during their create are not waited on
    let mut cancelled: Vec<Option<KitError>> = Vec::with_capacity(resources.len());
    for (index, resource) in resources.iter().enumerate() {
        let name = resource.name();
        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(KitError::Cancelled { name: name.clone() }),
            res = create_crd(&crds, resource) => res,
        };
        match created {
            Ok(()) => cancelled.push(None),
            Err(e @ KitError::Cancelled { .. }) => {
                report.observe_failure_at(index, &e);
                cancelled.push(Some(e));
            }
            Err(e) => {
                report.record_create_failure(name, e);
                cancelled.push(None);
            }
        }
    }

    for (resource, skipped) in resources.iter().zip(cancelled) {
        let name = resource.name();
        match skipped {
            Some(e) => report.outcomes.push((name, Outcome::Failed(e))),
            None => {
                let result =
                    wait_for_established(&crds, &name, ctx.interval(), ctx.timeout(), cancel)
                        .await;
                report.settle(name, result);
            }
        }
    }

    info!(
        "CRD registration finished: {} of {} ready",
        report.ready().count(),
        report.outcomes.len()
    );
    report
}

/// Create a CRD, treating an existing one as success
#[instrument(skip(crds, resource), fields(crd = %resource.name()))]
async fn create_crd(
    crds: &Api<CustomResourceDefinition>,
    resource: &CrdDescriptor,
) -> Result<()> {
    let name = resource.name();

    match crds
        .create(&PostParams::default(), &resource.to_definition())
        .await
    {
        Ok(_) => {
            info!("Created CRD {}", name);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.reason == REASON_ALREADY_EXISTS || err.code == 409 => {
            debug!("CRD {} already exists", name);
            Ok(())
        }
        Err(source) => Err(KitError::CreateFailed { name, source }),
    }
}

/// Poll a CRD until it is established, its names are rejected, the timeout
/// elapses or `cancel` fires
#[instrument(skip(crds, cancel))]
pub async fn wait_for_established(
    crds: &Api<CustomResourceDefinition>,
    name: &str,
    interval: Duration,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(KitError::Cancelled { name: name.to_string() }),
        res = timeout(budget, poll_until_established(crds, name, interval)) => match res {
            Ok(result) => result,
            Err(_) => Err(KitError::Timeout {
                name: name.to_string(),
                timeout: budget,
            }),
        },
    }
}

async fn poll_until_established(
    crds: &Api<CustomResourceDefinition>,
    name: &str,
    interval: Duration,
) -> Result<()> {
    loop {
        let crd = crds.get(name).await.map_err(|source| KitError::FetchFailed {
            name: name.to_string(),
            source,
        })?;

        match readiness(&crd) {
            Readiness::Established => {
                info!("CRD {} is established", name);
                return Ok(());
            }
            Readiness::NameConflict(reason) => {
                return Err(KitError::NameConflict {
                    name: name.to_string(),
                    reason,
                });
            }
            Readiness::Pending => {
                debug!("CRD {} not yet established, waiting {:?}", name, interval);
            }
        }

        sleep(interval).await;
    }
}

#[derive(Debug, PartialEq)]
enum Readiness {
    Established,
    NameConflict(String),
    Pending,
}

/// Inspect conditions in server order; the first decisive one wins
fn readiness(crd: &CustomResourceDefinition) -> Readiness {
    let conditions = crd
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default();

    for condition in conditions {
        match (condition.type_.as_str(), condition.status.as_str()) {
            (ESTABLISHED, CONDITION_TRUE) => return Readiness::Established,
            (NAMES_ACCEPTED, CONDITION_FALSE) => {
                let reason = match (&condition.reason, &condition.message) {
                    (Some(reason), Some(message)) => format!("{}: {}", reason, message),
                    (Some(reason), None) => reason.clone(),
                    (None, Some(message)) => message.clone(),
                    (None, None) => "unknown reason".to_string(),
                };
                return Readiness::NameConflict(reason);
            }
            _ => {}
        }
    }

    Readiness::Pending
}
