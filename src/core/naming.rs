//! Index-parameterized names: logical ids, hostnames, and DNS record names.

use super::types::Expr;

/// Parameter holding the cluster's DNS label.
pub const CLUSTER_NAME_PARAM: &str = "ClusterName";

/// Which kind of machine an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Node,
    Agent,
}

impl Role {
    /// Hostname label prefix (`node0`, `agent0`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Agent => "agent",
        }
    }

    pub fn instance_id(self, index: u32) -> String {
        match self {
            Self::Node => format!("PilosaInstance{index}"),
            Self::Agent => format!("PilosaAgentInstance{index}"),
        }
    }

    pub fn public_record_id(self, index: u32) -> String {
        match self {
            Self::Node => format!("PilosaPublicRecordSet{index}"),
            Self::Agent => format!("AgentPublicRecordSet{index}"),
        }
    }

    pub fn private_record_id(self, index: u32) -> String {
        match self {
            Self::Node => format!("PilosaPrivateRecordSet{index}"),
            Self::Agent => format!("AgentPrivateRecordSet{index}"),
        }
    }
}

/// `node{i}.{cluster}.{domain}` with a concrete cluster name.
pub fn hostname(role: Role, index: u32, cluster: &str, domain: &str) -> String {
    format!("{}{index}.{cluster}.{domain}", role.label())
}

/// Hostname with the cluster name left as an `Fn::Sub` reference, for use
/// inside boot scripts.
pub fn sub_hostname(role: Role, index: u32, domain: &str) -> String {
    hostname(role, index, &format!("${{{CLUSTER_NAME_PARAM}}}"), domain)
}

/// Fully qualified record name (trailing dot), joined from the cluster
/// name parameter.
pub fn record_name(role: Role, index: u32, domain: &str) -> Expr {
    Expr::concat(vec![
        format!("{}{index}.", role.label()).into(),
        Expr::reference(CLUSTER_NAME_PARAM),
        format!(".{domain}.").into(),
    ])
}

/// Fully qualified zone name: `{domain}.`
pub fn zone_name(domain: &str) -> String {
    format!("{domain}.")
}
