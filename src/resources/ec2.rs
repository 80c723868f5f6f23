//! EC2 resource properties: networking, security groups, instances.

use crate::core::types::{as_string, Expr};
use serde::Serialize;

/// Root device of the AMIs the cluster boots from.
pub const ROOT_DEVICE: &str = "/dev/sda1";

/// CIDR matching every IPv4 address.
pub const ANYWHERE: &str = "0.0.0.0/0";

// ============================================================================
// Networking
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub cidr_block: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_tenancy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dns_hostnames: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dns_support: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub cidr_block: String,
    pub vpc_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternetGateway {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayAttachment {
    pub vpc_id: Expr,
    pub internet_gateway_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTable {
    pub vpc_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    pub gateway_id: Expr,
    pub destination_cidr_block: String,
    pub route_table_id: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociation {
    pub subnet_id: Expr,
    pub route_table_id: Expr,
}

// ============================================================================
// Security groups
// ============================================================================

/// One inbound rule, either from a CIDR or from another security group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IngressRule {
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<Expr>,
}

impl IngressRule {
    /// Single TCP port open to a CIDR block.
    pub fn tcp_from_cidr(port: u16, cidr: &str) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr_ip: Some(cidr.to_string()),
            source_security_group_id: None,
        }
    }

    /// Single TCP port open to members of a security group.
    pub fn tcp_from_group(port: u16, group: Expr) -> Self {
        Self {
            ip_protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr_ip: None,
            source_security_group_id: Some(group),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub group_description: String,
    pub security_group_ingress: Vec<IngressRule>,
    pub vpc_id: Expr,
}

/// A standalone ingress rule attached to an existing group. Used for
/// self-referencing rules, which cannot be declared inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupIngress {
    pub group_id: Expr,

    #[serde(flatten)]
    pub rule: IngressRule,
}

// ============================================================================
// Instances
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EbsBlockDevice {
    pub volume_size: Expr,
    pub volume_type: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub ebs: EbsBlockDevice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub group_set: Vec<Expr>,
    pub associate_public_ip_address: bool,
    #[serde(serialize_with = "as_string")]
    pub device_index: u32,
    pub delete_on_termination: bool,
    pub subnet_id: Expr,
}

impl NetworkInterface {
    /// Primary interface with a public address in `subnet`.
    pub fn public_primary(security_group: Expr, subnet: Expr) -> Self {
        Self {
            group_set: vec![security_group],
            associate_public_ip_address: true,
            device_index: 0,
            delete_on_termination: true,
            subnet_id: subnet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub image_id: Expr,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_device_mappings: Vec<BlockDeviceMapping>,

    pub instance_type: Expr,
    pub key_name: Expr,
    pub iam_instance_profile: Expr,
    pub network_interfaces: Vec<NetworkInterface>,
    pub user_data: Expr,
}
