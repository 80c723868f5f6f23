//! Resource builders: typed provider properties for each AWS service.
//!
//! Property structs serialize to the provider's schema directly. Boot
//! scripts for instances live in `userdata`.

pub mod ec2;
pub mod iam;
pub mod route53;
pub mod userdata;
