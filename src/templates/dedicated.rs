//! Sandbox zone plus a dedicated-tenancy VPC with four public subnets.

use super::sandbox;
use crate::core::error::Result;
use crate::core::types::{Expr, Resource, Template};
use crate::resources::ec2::{
    GatewayAttachment, InternetGateway, Route, RouteTable, Subnet, SubnetRouteTableAssociation,
    Vpc, ANYWHERE,
};

pub const VPC: &str = "DedicatedVPC";
pub const GATEWAY: &str = "InternetGateway";
pub const GATEWAY_ATTACHMENT: &str = "AttachGateway";
pub const ROUTE_TABLE: &str = "RouteTable";
pub const ROUTE: &str = "Route";

const VPC_CIDR: &str = "10.0.0.0/16";

/// Subnet suffixes; subnet `n` (1-based) gets `10.0.n.0/24`.
const SUBNETS: [char; 4] = ['B', 'C', 'D', 'E'];

pub fn subnet_id(suffix: char) -> String {
    format!("DedicatedSubnet{suffix}")
}

pub fn association_id(suffix: char) -> String {
    format!("SubnetRouteTableAssociation{suffix}")
}

pub fn build(domain: &str) -> Result<Template> {
    let mut t = Template::new(format!("Dedicated-tenancy sandbox network for {domain}"));
    sandbox::add_public_zone(&mut t, domain)?;

    t.add_resource(
        VPC,
        Vpc {
            cidr_block: VPC_CIDR.to_string(),
            instance_tenancy: Some("dedicated".to_string()),
            enable_dns_hostnames: Some(true),
            enable_dns_support: Some(true),
        },
    )?;

    for (n, suffix) in (1..).zip(SUBNETS) {
        t.add_resource(
            &subnet_id(suffix),
            Subnet {
                cidr_block: format!("10.0.{n}.0/24"),
                vpc_id: Expr::reference(VPC),
            },
        )?;
    }

    t.add_resource(GATEWAY, InternetGateway {})?;
    t.add_resource(
        GATEWAY_ATTACHMENT,
        GatewayAttachment {
            vpc_id: Expr::reference(VPC),
            internet_gateway_id: Expr::reference(GATEWAY),
        },
    )?;
    t.add_resource(
        ROUTE_TABLE,
        RouteTable {
            vpc_id: Expr::reference(VPC),
        },
    )?;
    t.add_resource(
        ROUTE,
        Resource::from(Route {
            gateway_id: Expr::reference(GATEWAY),
            destination_cidr_block: ANYWHERE.to_string(),
            route_table_id: Expr::reference(ROUTE_TABLE),
        })
        .depends_on(GATEWAY_ATTACHMENT),
    )?;

    for suffix in SUBNETS {
        t.add_resource(
            &association_id(suffix),
            SubnetRouteTableAssociation {
                subnet_id: Expr::reference(subnet_id(suffix)),
                route_table_id: Expr::reference(ROUTE_TABLE),
            },
        )?;
    }

    Ok(t)
}
