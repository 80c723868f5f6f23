//! Route53 resource properties: hosted zones and record sets.

use crate::core::types::{as_string, Expr};
use serde::Serialize;

/// TTL of per-instance A records.
pub const INSTANCE_RECORD_TTL: u32 = 300;

/// Association between a private hosted zone and a VPC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostedZoneVpc {
    #[serde(rename = "VPCId")]
    pub vpc_id: Expr,

    #[serde(rename = "VPCRegion")]
    pub vpc_region: Expr,
}

/// A hosted zone. Zones with VPC associations are private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostedZone {
    #[serde(rename = "Name")]
    pub name: Expr,

    #[serde(rename = "VPCs", skip_serializing_if = "Vec::is_empty")]
    pub vpcs: Vec<HostedZoneVpc>,
}

impl HostedZone {
    pub fn public(name: impl Into<Expr>) -> Self {
        Self {
            name: name.into(),
            vpcs: Vec::new(),
        }
    }
}

/// How a record set names its zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ZoneRef {
    /// A zone created in the same template
    #[serde(rename = "HostedZoneId")]
    Id(Expr),
    /// An existing zone, by fully qualified name (trailing dot)
    #[serde(rename = "HostedZoneName")]
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Ns,
    Mx,
    Txt,
    Cname,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSet {
    #[serde(flatten)]
    pub zone: ZoneRef,

    #[serde(rename = "Name")]
    pub name: Expr,

    #[serde(rename = "Type")]
    pub record_type: RecordType,

    #[serde(rename = "TTL", serialize_with = "as_string")]
    pub ttl: u32,

    #[serde(rename = "ResourceRecords")]
    pub resource_records: Vec<Expr>,
}

impl RecordSet {
    /// Record with literal values.
    pub fn literal(zone: ZoneRef, name: Expr, record_type: RecordType, ttl: u32, values: &[&str]) -> Self {
        Self {
            zone,
            name,
            record_type,
            ttl,
            resource_records: values.iter().map(|v| Expr::from(*v)).collect(),
        }
    }
}
