// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! REST client creation for custom resource API groups

use crate::constants::client::{API_PATH, CONTENT_TYPE_JSON};
use crate::error::{KitError, Result};
use crate::kit::scheme::{AddToScheme, NegotiatedSerializer, Scheme};
use http::{header, Request};
use kube::{
    api::{Api, DynamicObject},
    core::GroupVersion,
    Client, Config as KConfig,
};
use tracing::{debug, info, instrument};

/// Connection settings for a [`RestClient`].
///
/// [`build_client`] fills in everything but the underlying kube config.
#[derive(Clone)]
pub struct ClientConfig {
    pub kube: KConfig,
    pub group_version: Option<GroupVersion>,
    pub api_path: String,
    pub content_type: String,
    pub serializer: Option<NegotiatedSerializer>,
}

impl ClientConfig {
    pub fn new(kube: KConfig) -> Self {
        Self {
            kube,
            group_version: None,
            api_path: String::new(),
            content_type: String::new(),
            serializer: None,
        }
    }

    /// Load the service account credentials mounted into the current pod
    pub fn incluster() -> Result<Self> {
        let kube = KConfig::incluster().map_err(|e| {
            KitError::KubeconfigError(format!("Failed to load in-cluster config: {}", e))
        })?;
        Ok(Self::new(kube))
    }
}

impl From<KConfig> for ClientConfig {
    fn from(kube: KConfig) -> Self {
        Self::new(kube)
    }
}

/// Build a client for `group/version` using the in-cluster credentials
pub fn build_client_in_cluster(
    group: &str,
    version: &str,
    registrar: &impl AddToScheme,
) -> Result<(RestClient, Scheme)> {
    let mut config = ClientConfig::incluster()?;
    build_client(&mut config, group, version, registrar)
}

/// Build a client for `group/version` from an explicit configuration.
///
/// The configuration is updated in place. Must be called from within a
/// Tokio runtime.
#[instrument(skip(config, registrar))]
pub fn build_client(
    config: &mut ClientConfig,
    group: &str,
    version: &str,
    registrar: &impl AddToScheme,
) -> Result<(RestClient, Scheme)> {
    let scheme = configure(config, group, version, registrar)?;
    let client = Client::try_from(config.kube.clone())?;
    let rest_client = RestClient::with_client(client, config)?;

    info!("Created REST client for {}", rest_client.base_path());
    Ok((rest_client, scheme))
}

/// Register the scheme and fill the REST settings of `config`
fn configure(
    config: &mut ClientConfig,
    group: &str,
    version: &str,
    registrar: &impl AddToScheme,
) -> Result<Scheme> {
    let mut scheme = Scheme::new();
    registrar.add_to_scheme(&mut scheme).map_err(|e| match e {
        KitError::SchemeBuildFailed(_) => e,
        other => KitError::SchemeBuildFailed(other.to_string()),
    })?;
    debug!("Registered {} types for {}/{}", scheme.len(), group, version);

    config.group_version = Some(GroupVersion::gv(group, version));
    config.api_path = API_PATH.to_string();
    config.content_type = CONTENT_TYPE_JSON.to_string();
    config.serializer = Some(NegotiatedSerializer::new(CONTENT_TYPE_JSON, scheme.clone()));

    Ok(scheme)
}

/// Client for the resources of a single API group version
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    group_version: GroupVersion,
    base_path: String,
    content_type: String,
    serializer: NegotiatedSerializer,
}

impl RestClient {
    /// Wrap an existing kube client using the REST settings of `config`
    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self> {
        let (Some(group_version), Some(serializer)) =
            (config.group_version.clone(), config.serializer.clone())
        else {
            return Err(KitError::KubeconfigError(
                "client configuration has no group/version or serializer".to_string(),
            ));
        };

        let base_path = format!(
            "{}/{}/{}",
            config.api_path.trim_end_matches('/'),
            group_version.group,
            group_version.version
        );

        Ok(Self {
            client,
            group_version,
            base_path,
            content_type: config.content_type.clone(),
            serializer,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn serializer(&self) -> &NegotiatedSerializer {
        &self.serializer
    }

    /// Root of this client, e.g. `/apis/example.com/v1alpha`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn resource_path(
        &self,
        plural: &str,
        namespace: Option<&str>,
        name: Option<&str>,
    ) -> String {
        let mut path = self.base_path.clone();
        if let Some(ns) = namespace {
            path.push_str("/namespaces/");
            path.push_str(ns);
        }
        path.push('/');
        path.push_str(plural);
        if let Some(name) = name {
            path.push('/');
            path.push_str(name);
        }
        path
    }

    /// Dynamic API handle for a registered kind
    pub fn api(&self, kind: &str, namespace: Option<&str>) -> Result<Api<DynamicObject>> {
        let resource = self
            .serializer
            .scheme()
            .lookup_kind(&self.group_version.group, &self.group_version.version, kind)
            .ok_or_else(|| {
                KitError::CodecError(format!(
                    "{} is not registered for {}",
                    kind,
                    self.group_version.api_version()
                ))
            })?;

        Ok(match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, resource),
            None => Api::all_with(self.client.clone(), resource),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        plural: &str,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        let request = Request::get(self.resource_path(plural, namespace, Some(name)))
            .header(header::ACCEPT, &self.content_type)
            .body(Vec::new())
            .map_err(kube::Error::HttpError)?;

        let body = self.client.request_text(request).await?;
        self.serializer.decode(&body)
    }

    #[instrument(skip(self, object))]
    pub async fn create(
        &self,
        plural: &str,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let request = Request::post(self.resource_path(plural, namespace, None))
            .header(header::ACCEPT, &self.content_type)
            .header(header::CONTENT_TYPE, &self.content_type)
            .body(self.serializer.encode(object)?)
            .map_err(kube::Error::HttpError)?;

        let body = self.client.request_text(request).await?;
        self.serializer.decode(&body)
    }
}
