//! Cluster parameters: defaults, YAML config files, and validation.
//!
//! Values layer as built-in defaults, then an optional config file, then
//! command-line overrides. Validation collects every problem instead of
//! stopping at the first one.

use super::error::{Error, Result, ValidationError};
use crate::templates::cluster;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_CLUSTER_SIZE: u32 = 3;
pub const DEFAULT_NUM_AGENTS: u32 = 1;
pub const DEFAULT_GO_VERSION: &str = "go1.8.3.linux-amd64";
pub const DEFAULT_USERNAME: &str = "ubuntu";
pub const DEFAULT_DOMAIN: &str = "sandbox.pilosa.com";
pub const DEFAULT_DEDICATED_DOMAIN: &str = "sandbox-dedicated.pilosa.com";
pub const DEFAULT_REPLICAS: u32 = 1;
pub const DEFAULT_PILOSA_VERSION: &str = "v0.4.0";

/// CloudFormation's per-template resource limit.
pub const MAX_TEMPLATE_RESOURCES: usize = 500;

/// How Pilosa gets onto each node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum InstallMethod {
    /// Build from source with the Go toolchain
    #[default]
    Source,
    /// Download a release tarball
    Binary,
    /// Install a release .deb package
    Package,
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Binary => write!(f, "binary"),
            Self::Package => write!(f, "package"),
        }
    }
}

/// Inputs to the cluster template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterParams {
    /// Number of Pilosa nodes
    pub cluster_size: u32,

    /// Number of agent (load generation) nodes
    pub num_agents: u32,

    /// Go release archive name, e.g. go1.8.3.linux-amd64
    pub go_version: String,

    /// OS user that owns the installation
    pub username: String,

    /// Public DNS domain the cluster lives under
    pub domain: String,

    /// Pilosa replication factor
    pub replicas: u32,

    /// Pilosa installation method
    pub install: InstallMethod,

    /// Pilosa release tag for binary and package installs
    pub pilosa_version: String,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            cluster_size: DEFAULT_CLUSTER_SIZE,
            num_agents: DEFAULT_NUM_AGENTS,
            go_version: DEFAULT_GO_VERSION.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            replicas: DEFAULT_REPLICAS,
            install: InstallMethod::default(),
            pilosa_version: DEFAULT_PILOSA_VERSION.to_string(),
        }
    }
}

/// Parse a cluster config file from disk.
pub fn parse_config_file(path: &Path) -> Result<ClusterParams> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
    parse_config(&content)
}

/// Parse a cluster config from a YAML string. Missing keys take defaults.
pub fn parse_config(yaml: &str) -> Result<ClusterParams> {
    Ok(serde_yaml_ng::from_str(yaml)?)
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

/// Check that `domain` is a DNS name usable for hosted zones.
pub fn check_domain(domain: &str) -> Option<ValidationError> {
    if matches(
        r"^(?i)([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
        domain,
    ) {
        return None;
    }
    Some(ValidationError {
        field: "domain",
        message: format!("'{domain}' is not a DNS name"),
    })
}

/// Validate cluster params. Returns a list of errors (empty = valid).
pub fn validate_config(params: &ClusterParams) -> Vec<ValidationError> {
    let mut errors = check_domain(&params.domain).into_iter().collect::<Vec<_>>();
    let mut fail = |field: &'static str, message: String| {
        errors.push(ValidationError { field, message });
    };

    if !matches(r"^[a-z_][a-z0-9_-]{0,31}$", &params.username) {
        fail("username", format!("'{}' is not a valid user name", params.username));
    }

    if !matches(r"^go\d+(\.\d+)*((rc|beta)\d+)?\.linux-[a-z0-9]+$", &params.go_version) {
        fail(
            "go_version",
            format!(
                "'{}' does not look like a Go linux archive (e.g. {})",
                params.go_version, DEFAULT_GO_VERSION
            ),
        );
    }

    if params.replicas == 0 {
        fail("replicas", "must be at least 1".to_string());
    } else if params.cluster_size > 0 && params.replicas > params.cluster_size {
        fail(
            "replicas",
            format!(
                "{} replicas exceed cluster size {}",
                params.replicas, params.cluster_size
            ),
        );
    }

    if params.install != InstallMethod::Source
        && !matches(r"^v\d+\.\d+\.\d+(-[0-9A-Za-z.]+)?$", &params.pilosa_version)
    {
        fail(
            "pilosa_version",
            format!(
                "'{}' is not a release tag (e.g. {})",
                params.pilosa_version, DEFAULT_PILOSA_VERSION
            ),
        );
    }

    let total = cluster::expected_resource_count(params);
    if total > MAX_TEMPLATE_RESOURCES {
        fail(
            "cluster_size",
            format!(
                "{} nodes and {} agents need {} resources, over the limit of {}",
                params.cluster_size, params.num_agents, total, MAX_TEMPLATE_RESOURCES
            ),
        );
    }

    errors
}

/// Validate, turning any findings into `Error::Invalid`.
pub fn ensure_valid(params: &ClusterParams) -> Result<()> {
    let errors = validate_config(params);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Invalid(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[ValidationError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_defaults() {
        let p = ClusterParams::default();
        assert_eq!(p.cluster_size, 3);
        assert_eq!(p.num_agents, 1);
        assert_eq!(p.go_version, "go1.8.3.linux-amd64");
        assert_eq!(p.username, "ubuntu");
        assert_eq!(p.domain, "sandbox.pilosa.com");
        assert_eq!(p.replicas, 1);
        assert_eq!(p.install, InstallMethod::Source);
        assert!(validate_config(&p).is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
cluster_size: 5
replicas: 2
install: binary
"#;
        let p = parse_config(yaml).unwrap();
        assert_eq!(p.cluster_size, 5);
        assert_eq!(p.replicas, 2);
        assert_eq!(p.install, InstallMethod::Binary);
        assert_eq!(p.num_agents, DEFAULT_NUM_AGENTS);
        assert_eq!(p.domain, DEFAULT_DOMAIN);
    }

    #[test]
    fn test_parse_empty_config_is_default() {
        let p = parse_config("{}").unwrap();
        assert_eq!(p, ClusterParams::default());
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = parse_config("cluster_sise: 4\n").unwrap_err();
        assert!(err.to_string().contains("cluster_sise"));
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        assert!(parse_config("cluster_size: three\n").is_err());
        assert!(parse_config("num_agents: -1\n").is_err());
    }

    #[test]
    fn test_parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.yaml");
        std::fs::write(&path, "num_agents: 4\nusername: pilosa\n").unwrap();
        let p = parse_config_file(&path).unwrap();
        assert_eq!(p.num_agents, 4);
        assert_eq!(p.username, "pilosa");
    }

    #[test]
    fn test_parse_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_config_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_bad_domain() {
        let p = ClusterParams {
            domain: "not a domain".into(),
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["domain"]);

        let p = ClusterParams {
            domain: String::new(),
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["domain"]);
    }

    #[test]
    fn test_bad_username() {
        let p = ClusterParams {
            username: "Root; rm -rf /".into(),
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["username"]);
    }

    #[test]
    fn test_go_versions() {
        for ok in ["go1.8.3.linux-amd64", "go1.9.linux-arm64", "go1.10rc1.linux-amd64"] {
            let p = ClusterParams {
                go_version: ok.into(),
                ..Default::default()
            };
            assert!(validate_config(&p).is_empty(), "{ok} should be accepted");
        }
        let p = ClusterParams {
            go_version: "1.8.3".into(),
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["go_version"]);
    }

    #[test]
    fn test_replicas_zero() {
        let p = ClusterParams {
            replicas: 0,
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["replicas"]);
    }

    #[test]
    fn test_replicas_exceed_cluster() {
        let p = ClusterParams {
            cluster_size: 2,
            replicas: 3,
            ..Default::default()
        };
        let errors = validate_config(&p);
        assert_eq!(fields(&errors), vec!["replicas"]);
        assert!(errors[0].message.contains("exceed cluster size 2"));
    }

    #[test]
    fn test_empty_cluster_allowed() {
        let p = ClusterParams {
            cluster_size: 0,
            num_agents: 0,
            ..Default::default()
        };
        assert!(validate_config(&p).is_empty());
    }

    #[test]
    fn test_release_tag_only_checked_for_prebuilt() {
        let mut p = ClusterParams {
            pilosa_version: "latest".into(),
            ..Default::default()
        };
        assert!(validate_config(&p).is_empty());
        p.install = InstallMethod::Package;
        assert_eq!(fields(&validate_config(&p)), vec!["pilosa_version"]);
    }

    #[test]
    fn test_resource_limit() {
        let p = ClusterParams {
            cluster_size: 200,
            num_agents: 0,
            ..Default::default()
        };
        let errors = validate_config(&p);
        assert_eq!(fields(&errors), vec!["cluster_size"]);
        assert!(errors[0].message.contains("over the limit of 500"));
    }

    #[test]
    fn test_collects_all_errors() {
        let p = ClusterParams {
            domain: "bad domain".into(),
            username: "Bad".into(),
            replicas: 0,
            ..Default::default()
        };
        assert_eq!(fields(&validate_config(&p)), vec!["domain", "username", "replicas"]);
        assert!(matches!(ensure_valid(&p), Err(Error::Invalid(e)) if e.len() == 3));
    }

    #[test]
    fn test_install_method_display() {
        assert_eq!(InstallMethod::Source.to_string(), "source");
        assert_eq!(InstallMethod::Package.to_string(), "package");
    }
}
