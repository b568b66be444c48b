// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD descriptors and the registration context

use crate::constants::crd::{POLL_INTERVAL_MILLIS, TIMEOUT_SECS};
use crate::error::{KitError, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    CustomResourceDefinitionVersion, CustomResourceValidation, JSONSchemaProps,
};
use kube::{api::ObjectMeta, Client, Resource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether instances of a custom resource live in a namespace
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Namespaced => "Namespaced",
            Scope::Cluster => "Cluster",
        }
    }
}

/// Description of a custom resource type to register with the API server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrdDescriptor {
    pub singular: String,
    pub plural: String,
    pub group: String,
    pub version: String,
    pub scope: Scope,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
}

impl CrdDescriptor {
    pub fn new(
        singular: impl Into<String>,
        plural: impl Into<String>,
        group: impl Into<String>,
        version: impl Into<String>,
        scope: Scope,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
            group: group.into(),
            version: version.into(),
            scope,
            kind: kind.into(),
            short_names: Vec::new(),
        }
    }

    pub fn with_short_names<I, S>(mut self, short_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.short_names = short_names.into_iter().map(Into::into).collect();
        self
    }

    /// Derive a descriptor from a statically typed resource such as a
    /// `#[derive(CustomResource)]` type. The singular name is the lowercased kind.
    pub fn for_resource<K>(scope: Scope) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        let kind = K::kind(&());
        Self::new(
            kind.to_lowercase(),
            K::plural(&()),
            K::group(&()),
            K::version(&()),
            scope,
            kind,
        )
    }

    /// Name of the CRD object on the API server: `<plural>.<group>`
    pub fn name(&self) -> String {
        format!("{}.{}", self.plural, self.group)
    }

    /// Build the apiextensions/v1 CRD for this descriptor.
    ///
    /// The single version is served and stored, and its schema keeps unknown
    /// fields so instance payloads are passed through unvalidated.
    pub fn to_definition(&self) -> CustomResourceDefinition {
        let short_names = (!self.short_names.is_empty()).then(|| self.short_names.clone());

        CustomResourceDefinition {
            metadata: ObjectMeta {
                name: Some(self.name()),
                ..Default::default()
            },
            spec: CustomResourceDefinitionSpec {
                group: self.group.clone(),
                names: CustomResourceDefinitionNames {
                    kind: self.kind.clone(),
                    plural: self.plural.clone(),
                    singular: Some(self.singular.clone()),
                    short_names,
                    ..Default::default()
                },
                scope: self.scope.as_str().to_string(),
                versions: vec![CustomResourceDefinitionVersion {
                    name: self.version.clone(),
                    served: true,
                    storage: true,
                    schema: Some(CustomResourceValidation {
                        open_api_v3_schema: Some(JSONSchemaProps {
                            type_: Some("object".to_string()),
                            x_kubernetes_preserve_unknown_fields: Some(true),
                            ..Default::default()
                        }),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            },
            status: None,
        }
    }
}

/// Clients and timing shared by every registration call
#[derive(Clone)]
pub struct Context {
    client: Client,
    api_ext_client: Client,
    interval: Duration,
    timeout: Duration,
}

impl Context {
    /// Build a context, rejecting a zero interval or a timeout shorter than it
    pub fn new(
        client: Client,
        api_ext_client: Client,
        interval: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(KitError::InvalidContext(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if timeout < interval {
            return Err(KitError::InvalidContext(format!(
                "timeout {:?} is shorter than poll interval {:?}",
                timeout, interval
            )));
        }

        Ok(Self {
            client,
            api_ext_client,
            interval,
            timeout,
        })
    }

    /// Context using one client for both the cluster and extension APIs
    /// with the default interval and timeout
    pub fn with_defaults(client: Client) -> Result<Self> {
        Self::new(
            client.clone(),
            client,
            Duration::from_millis(POLL_INTERVAL_MILLIS),
            Duration::from_secs(TIMEOUT_SECS),
        )
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn api_ext_client(&self) -> &Client {
        &self.api_ext_client
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
