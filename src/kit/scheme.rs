// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Type registry used by REST clients to encode and decode objects

use crate::error::{KitError, Result};
use kube::{
    api::{ApiResource, DynamicObject, GroupVersionKind},
    Resource,
};
use std::collections::HashMap;

/// Maps group/version/kind triples to the API resources they are served as
#[derive(Debug, Clone, Default)]
pub struct Scheme {
    types: HashMap<GroupVersionKind, ApiResource>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a statically typed resource
    pub fn add_known_type<K>(&mut self) -> Result<()>
    where
        K: Resource<DynamicType = ()>,
    {
        self.add_api_resource(ApiResource::erase::<K>(&()))
    }

    /// Register a resource by its API description.
    ///
    /// Registering the same kind twice is fine as long as the plural matches.
    pub fn add_api_resource(&mut self, resource: ApiResource) -> Result<()> {
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);

        if let Some(existing) = self.types.get(&gvk) {
            if existing.plural != resource.plural {
                return Err(KitError::SchemeBuildFailed(format!(
                    "{} is already registered as {}, cannot register it as {}",
                    resource.kind, existing.plural, resource.plural
                )));
            }
        }

        self.types.insert(gvk, resource);
        Ok(())
    }

    pub fn lookup(&self, gvk: &GroupVersionKind) -> Option<&ApiResource> {
        self.types.get(gvk)
    }

    pub fn lookup_kind(&self, group: &str, version: &str, kind: &str) -> Option<&ApiResource> {
        self.lookup(&GroupVersionKind::gvk(group, version, kind))
    }

    /// Check an `apiVersion`/`kind` pair as found in a serialized object
    pub fn recognizes(&self, api_version: &str, kind: &str) -> bool {
        let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
        self.lookup_kind(group, version, kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Something that can register its types into a [`Scheme`]
pub trait AddToScheme {
    fn add_to_scheme(&self, scheme: &mut Scheme) -> Result<()>;
}

impl<F> AddToScheme for F
where
    F: Fn(&mut Scheme) -> Result<()>,
{
    fn add_to_scheme(&self, scheme: &mut Scheme) -> Result<()> {
        self(scheme)
    }
}

/// JSON codec restricted to the types of a scheme
#[derive(Debug, Clone)]
pub struct NegotiatedSerializer {
    content_type: String,
    scheme: Scheme,
}

impl NegotiatedSerializer {
    pub fn new(content_type: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            content_type: content_type.into(),
            scheme,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn encode(&self, object: &DynamicObject) -> Result<Vec<u8>> {
        self.check(object)?;
        Ok(serde_json::to_vec(object)?)
    }

    pub fn decode(&self, body: &str) -> Result<DynamicObject> {
        let object: DynamicObject = serde_json::from_str(body)?;
        self.check(&object)?;
        Ok(object)
    }

    fn check(&self, object: &DynamicObject) -> Result<()> {
        let Some(types) = object.types.as_ref() else {
            return Err(KitError::CodecError(
                "object has no apiVersion/kind".to_string(),
            ));
        };

        if !self.scheme.recognizes(&types.api_version, &types.kind) {
            return Err(KitError::CodecError(format!(
                "{} {} is not registered in the scheme",
                types.api_version, types.kind
            )));
        }

        Ok(())
    }
}
