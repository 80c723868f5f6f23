//! CloudFormation template model.
//!
//! Defines the template document, its parameters and resources, and the
//! `Expr` value type that covers literal strings and the intrinsic functions
//! the generators need. Everything serializes to the provider's JSON shape;
//! maps are order-preserving so output follows insertion order.

use super::error::{Error, Result};
use crate::resources::{ec2, iam, route53};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Template format version accepted by CloudFormation.
pub const FORMAT_VERSION: &str = "2010-09-09";

// ============================================================================
// Expressions
// ============================================================================

/// A property value: a literal or an intrinsic function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    /// `{"Ref": id}`
    Ref(String),
    /// `{"Fn::GetAtt": [id, attribute]}`
    GetAtt(String, String),
    /// `{"Fn::Join": [separator, [parts...]]}`
    Join(String, Vec<Expr>),
    /// `{"Fn::Sub": template}`
    Sub(String),
    /// `{"Fn::Base64": value}`
    Base64(Box<Expr>),
}

impl Expr {
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Ref(id.into())
    }

    pub fn get_att(id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt(id.into(), attribute.into())
    }

    /// Concatenate parts with no separator.
    pub fn concat(parts: Vec<Expr>) -> Self {
        Self::Join(String::new(), parts)
    }

    /// `Fn::Base64` of `Fn::Sub`, the usual shape for instance user data.
    pub fn base64_sub(template: impl Into<String>) -> Self {
        Self::Base64(Box::new(Self::Sub(template.into())))
    }

    /// `AWS::Region` pseudo parameter.
    pub fn region() -> Self {
        Self::Ref("AWS::Region".to_string())
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Literal(s) => serializer.serialize_str(s),
            Self::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Self::GetAtt(id, attr) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id, attr])?;
                map.end()
            }
            Self::Join(sep, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(sep, parts))?;
                map.end()
            }
            Self::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
            Self::Base64(inner) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Base64", inner)?;
                map.end()
            }
        }
    }
}

/// Serialize a number the way the provider schema types it: as a string.
pub(crate) fn as_string<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

// ============================================================================
// Parameters
// ============================================================================

/// Parameter value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    Number,
}

/// A stack parameter supplied at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub description: String,

    #[serde(rename = "Type")]
    pub param_type: ParameterType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_description: Option<String>,
}

impl Parameter {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            param_type: ParameterType::String,
            default: None,
            allowed_pattern: None,
            constraint_description: None,
        }
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            param_type: ParameterType::Number,
            default: None,
            allowed_pattern: None,
            constraint_description: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Reject values at deploy time unless they match `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<String>, constraint: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self.constraint_description = Some(constraint.into());
        self
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Provider resource type plus its properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum ResourceProperties {
    #[serde(rename = "AWS::EC2::VPC")]
    Vpc(ec2::Vpc),
    #[serde(rename = "AWS::EC2::Subnet")]
    Subnet(ec2::Subnet),
    #[serde(rename = "AWS::EC2::InternetGateway")]
    InternetGateway(ec2::InternetGateway),
    #[serde(rename = "AWS::EC2::VPCGatewayAttachment")]
    GatewayAttachment(ec2::GatewayAttachment),
    #[serde(rename = "AWS::EC2::RouteTable")]
    RouteTable(ec2::RouteTable),
    #[serde(rename = "AWS::EC2::Route")]
    Route(ec2::Route),
    #[serde(rename = "AWS::EC2::SubnetRouteTableAssociation")]
    SubnetRouteTableAssociation(ec2::SubnetRouteTableAssociation),
    #[serde(rename = "AWS::EC2::SecurityGroup")]
    SecurityGroup(ec2::SecurityGroup),
    #[serde(rename = "AWS::EC2::SecurityGroupIngress")]
    SecurityGroupIngress(ec2::SecurityGroupIngress),
    #[serde(rename = "AWS::EC2::Instance")]
    Instance(ec2::Instance),
    #[serde(rename = "AWS::Route53::HostedZone")]
    HostedZone(route53::HostedZone),
    #[serde(rename = "AWS::Route53::RecordSet")]
    RecordSet(route53::RecordSet),
    #[serde(rename = "AWS::IAM::Role")]
    Role(iam::Role),
    #[serde(rename = "AWS::IAM::InstanceProfile")]
    InstanceProfile(iam::InstanceProfile),
}

impl ResourceProperties {
    /// Provider type name, e.g. `AWS::EC2::Instance`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Vpc(_) => "AWS::EC2::VPC",
            Self::Subnet(_) => "AWS::EC2::Subnet",
            Self::InternetGateway(_) => "AWS::EC2::InternetGateway",
            Self::GatewayAttachment(_) => "AWS::EC2::VPCGatewayAttachment",
            Self::RouteTable(_) => "AWS::EC2::RouteTable",
            Self::Route(_) => "AWS::EC2::Route",
            Self::SubnetRouteTableAssociation(_) => "AWS::EC2::SubnetRouteTableAssociation",
            Self::SecurityGroup(_) => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress(_) => "AWS::EC2::SecurityGroupIngress",
            Self::Instance(_) => "AWS::EC2::Instance",
            Self::HostedZone(_) => "AWS::Route53::HostedZone",
            Self::RecordSet(_) => "AWS::Route53::RecordSet",
            Self::Role(_) => "AWS::IAM::Role",
            Self::InstanceProfile(_) => "AWS::IAM::InstanceProfile",
        }
    }
}

macro_rules! impl_from_properties {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ResourceProperties {
                fn from(p: $ty) -> Self {
                    Self::$variant(p)
                }
            }

            impl From<$ty> for Resource {
                fn from(p: $ty) -> Self {
                    Resource::new(ResourceProperties::$variant(p))
                }
            }
        )*
    };
}

impl_from_properties! {
    Vpc => ec2::Vpc,
    Subnet => ec2::Subnet,
    InternetGateway => ec2::InternetGateway,
    GatewayAttachment => ec2::GatewayAttachment,
    RouteTable => ec2::RouteTable,
    Route => ec2::Route,
    SubnetRouteTableAssociation => ec2::SubnetRouteTableAssociation,
    SecurityGroup => ec2::SecurityGroup,
    SecurityGroupIngress => ec2::SecurityGroupIngress,
    Instance => ec2::Instance,
    HostedZone => route53::HostedZone,
    RecordSet => route53::RecordSet,
    Role => iam::Role,
    InstanceProfile => iam::InstanceProfile,
}

/// A template resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(flatten)]
    pub properties: ResourceProperties,

    /// Logical ids that must be created first
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(properties: ResourceProperties) -> Self {
        Self {
            properties,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }
}

// ============================================================================
// Template
// ============================================================================

/// A complete CloudFormation template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    pub resources: IndexMap<String, Resource>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            parameters: IndexMap::new(),
            resources: IndexMap::new(),
        }
    }
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Add a parameter. Logical ids must be unique.
    pub fn add_parameter(&mut self, id: &str, parameter: Parameter) -> Result<()> {
        if self.parameters.contains_key(id) || self.resources.contains_key(id) {
            return Err(Error::DuplicateId {
                kind: "parameter",
                id: id.to_string(),
            });
        }
        self.parameters.insert(id.to_string(), parameter);
        Ok(())
    }

    /// Add a resource. Logical ids must be unique across parameters and resources.
    pub fn add_resource(&mut self, id: &str, resource: impl Into<Resource>) -> Result<()> {
        if self.resources.contains_key(id) || self.parameters.contains_key(id) {
            return Err(Error::DuplicateId {
                kind: "resource",
                id: id.to_string(),
            });
        }
        let resource = resource.into();
        tracing::debug!(id, kind = resource.properties.type_name(), "added resource");
        self.resources.insert(id.to_string(), resource);
        Ok(())
    }

    /// Logical ids of every resource of the given provider type, in order.
    pub fn resource_ids_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.properties.type_name() == type_name)
            .map(|(id, _)| id.as_str())
    }
}
