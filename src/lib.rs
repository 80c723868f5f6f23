//! pilosa-cfn: CloudFormation templates for Pilosa clusters.
//!
//! Builds stacks of EC2 nodes and agents, their DNS records, and the
//! sandbox and production zones they live in.

pub mod cli;
pub mod core;
pub mod resources;
pub mod templates;
