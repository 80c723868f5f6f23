//! Template generation: dispatch to the variant builders.

use super::config::{self, ClusterParams};
use super::error::{Error, Result};
use super::types::Template;
use crate::templates::{cluster, dedicated, production, sandbox};
use std::fmt;

/// Which template to build, with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    Cluster(ClusterParams),
    Sandbox { domain: String },
    Dedicated { domain: String },
    Production,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster(_) => write!(f, "cluster"),
            Self::Sandbox { .. } => write!(f, "sandbox"),
            Self::Dedicated { .. } => write!(f, "dedicated"),
            Self::Production => write!(f, "production"),
        }
    }
}

fn ensure_domain(domain: &str) -> Result<()> {
    match config::check_domain(domain) {
        Some(e) => Err(Error::Invalid(vec![e])),
        None => Ok(()),
    }
}

/// Validate the inputs and build the template.
pub fn generate(variant: &Variant) -> Result<Template> {
    let template = match variant {
        Variant::Cluster(params) => {
            config::ensure_valid(params)?;
            cluster::build(params)?
        }
        Variant::Sandbox { domain } => {
            ensure_domain(domain)?;
            sandbox::build(domain)?
        }
        Variant::Dedicated { domain } => {
            ensure_domain(domain)?;
            dedicated::build(domain)?
        }
        Variant::Production => production::build()?,
    };
    tracing::info!(
        variant = %variant,
        parameters = template.parameters.len(),
        resources = template.resources.len(),
        "generated template"
    );
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cluster() {
        let t = generate(&Variant::Cluster(ClusterParams::default())).unwrap();
        assert_eq!(t.resource_ids_of("AWS::EC2::Instance").count(), 4);
    }

    #[test]
    fn test_generate_cluster_rejects_invalid() {
        let p = ClusterParams {
            replicas: 0,
            ..Default::default()
        };
        let err = generate(&Variant::Cluster(p)).unwrap_err();
        assert!(matches!(err, Error::Invalid(ref e) if e[0].field == "replicas"));
    }

    #[test]
    fn test_generate_sandbox() {
        let t = generate(&Variant::Sandbox {
            domain: "sandbox.pilosa.com".into(),
        })
        .unwrap();
        assert_eq!(t.resources.len(), 1);
    }

    #[test]
    fn test_generate_dedicated() {
        let t = generate(&Variant::Dedicated {
            domain: config::DEFAULT_DEDICATED_DOMAIN.into(),
        })
        .unwrap();
        assert_eq!(t.resource_ids_of("AWS::EC2::Subnet").count(), 4);
    }

    #[test]
    fn test_generate_bad_domain() {
        let err = generate(&Variant::Sandbox {
            domain: "no spaces.com".into(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn test_generate_production() {
        let t = generate(&Variant::Production).unwrap();
        assert_eq!(t.parameters.len(), 1);
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(Variant::Production.to_string(), "production");
        assert_eq!(Variant::Cluster(ClusterParams::default()).to_string(), "cluster");
    }
}
