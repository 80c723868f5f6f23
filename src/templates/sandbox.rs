//! Public hosted zone for sandbox clusters.

use crate::core::error::Result;
use crate::core::types::Template;
use crate::resources::route53::HostedZone;

pub const PUBLIC_ZONE: &str = "SandboxPublicHostedZone";

/// Add the public zone for `domain`. Cluster record sets point at it by name.
pub fn add_public_zone(t: &mut Template, domain: &str) -> Result<()> {
    t.add_resource(PUBLIC_ZONE, HostedZone::public(domain))
}

pub fn build(domain: &str) -> Result<Template> {
    let mut t = Template::new(format!("Sandbox public hosted zone {domain}"));
    add_public_zone(&mut t, domain)?;
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sandbox_zone() {
        let t = build("sandbox.pilosa.com").unwrap();
        assert_eq!(t.resources.len(), 1);
        assert!(t.parameters.is_empty());
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(
            v["Resources"][PUBLIC_ZONE],
            json!({"Type": "AWS::Route53::HostedZone", "Properties": {"Name": "sandbox.pilosa.com"}})
        );
    }

    #[test]
    fn test_sandbox_custom_domain() {
        let v = serde_json::to_value(build("test.example.org").unwrap()).unwrap();
        assert_eq!(v["Resources"][PUBLIC_ZONE]["Properties"]["Name"], "test.example.org");
    }
}
