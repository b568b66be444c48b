// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::crd::{POLL_INTERVAL_MILLIS, TIMEOUT_SECS};
use crate::constants::env;
use crate::kit::CrdDescriptor;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Registration settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// YAML file listing the CRDs to register
    pub crd_file: PathBuf,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let crd_file = std::env::var(env::CRD_FILE)
            .with_context(|| format!("{} environment variable not set", env::CRD_FILE))?;

        Ok(Config {
            crd_file: PathBuf::from(crd_file),
            poll_interval: Duration::from_millis(parse_or(
                env::POLL_INTERVAL_MS,
                POLL_INTERVAL_MILLIS,
            )?),
            timeout: Duration::from_secs(parse_or(env::TIMEOUT_SECS, TIMEOUT_SECS)?),
        })
    }

    /// Read the CRD descriptors listed in `crd_file`
    pub fn load_descriptors(&self) -> Result<Vec<CrdDescriptor>> {
        let raw = std::fs::read_to_string(&self.crd_file)
            .with_context(|| format!("failed to read {}", self.crd_file.display()))?;
        parse_descriptors(&raw)
            .with_context(|| format!("failed to parse {}", self.crd_file.display()))
    }
}

pub fn parse_descriptors(raw: &str) -> Result<Vec<CrdDescriptor>> {
    Ok(serde_yaml::from_str(raw)?)
}

fn parse_or(var: &str, default: u64) -> Result<u64> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a whole number, got {:?}", var, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::Scope;

    #[test]
    fn test_parse_descriptors() {
        let raw = r#"
- singular: objectstoreuser
  plural: objectstoreusers
  group: ceph.rook.io
  version: v1
  scope: Namespaced
  kind: ObjectStoreUser
  shortNames: [osu]
- singular: objectstore
  plural: objectstores
  group: ceph.rook.io
  version: v1
  scope: Cluster
  kind: ObjectStore
"#;
        let descriptors = parse_descriptors(raw).unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name(), "objectstoreusers.ceph.rook.io");
        assert_eq!(descriptors[0].short_names, vec!["osu"]);
        assert_eq!(descriptors[1].scope, Scope::Cluster);
        assert!(descriptors[1].short_names.is_empty());
    }

    #[test]
    fn test_parse_descriptors_rejects_bad_scope() {
        let raw = r#"
- singular: x
  plural: xs
  group: example.com
  version: v1
  scope: Global
  kind: X
"#;
        assert!(parse_descriptors(raw).is_err());
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or("OPKIT_TEST_UNSET_VARIABLE", 42).unwrap(), 42);
    }
}
