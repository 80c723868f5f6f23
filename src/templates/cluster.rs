//! Pilosa cluster: nodes, agents, DNS records, and the IAM/network glue
//! they share.

use crate::core::config::ClusterParams;
use crate::core::error::Result;
use crate::core::naming::{self, Role, CLUSTER_NAME_PARAM};
use crate::core::types::{Expr, Parameter, Template};
use crate::resources::ec2::{
    BlockDeviceMapping, EbsBlockDevice, IngressRule, Instance, NetworkInterface, SecurityGroup,
    SecurityGroupIngress, ANYWHERE, ROOT_DEVICE,
};
use crate::resources::iam::{InstanceProfile, PolicyDocument, Role as IamRole};
use crate::resources::route53::{
    HostedZone, HostedZoneVpc, RecordSet, RecordType, ZoneRef, INSTANCE_RECORD_TTL,
};
use crate::resources::userdata::{self, INTERNAL_PORT, PILOSA_PORT};

pub const VPC: &str = "VPC";
pub const SUBNET: &str = "Subnet";
pub const AMI: &str = "AMI";
pub const KEY_PAIR: &str = "KeyPair";
pub const INSTANCE_TYPE: &str = "InstanceType";
pub const AGENT_INSTANCE_TYPE: &str = "AgentInstanceType";
pub const VOLUME_SIZE: &str = "VolumeSize";
pub const VOLUME_TYPE: &str = "VolumeType";

pub const ROLE: &str = "PilosaRole";
pub const INSTANCE_PROFILE: &str = "PilosaInstanceProfile";
pub const PRIVATE_ZONE: &str = "PilosaZone";
pub const SECURITY_GROUP: &str = "PilosaInstanceSecurityGroup";
pub const INGRESS: &str = "PilosaIngress";
pub const INTERNAL_INGRESS: &str = "PilosaInternalIngress";

/// Resources every cluster template carries regardless of size.
pub const FIXED_RESOURCES: usize = 6;

/// Instance, public record, private record.
pub const RESOURCES_PER_MACHINE: usize = 3;

const SSH_PORT: u16 = 22;

/// Number of resources `build` will emit for `params`.
pub fn expected_resource_count(params: &ClusterParams) -> usize {
    let machines = params.cluster_size as usize + params.num_agents as usize;
    FIXED_RESOURCES + RESOURCES_PER_MACHINE * machines
}

/// Build the cluster template. Params are assumed validated.
pub fn build(params: &ClusterParams) -> Result<Template> {
    if params.cluster_size == 0 {
        tracing::warn!("cluster template has no pilosa nodes");
    }

    let mut t = Template::new(format!(
        "Pilosa cluster: {} node(s), {} agent(s) under {}",
        params.cluster_size, params.num_agents, params.domain
    ));

    add_parameters(&mut t, &params.domain)?;
    add_shared_resources(&mut t, &params.domain)?;

    for i in 0..params.cluster_size {
        add_machine(&mut t, params, Role::Node, i)?;
    }
    for i in 0..params.num_agents {
        add_machine(&mut t, params, Role::Agent, i)?;
    }

    Ok(t)
}

fn add_parameters(t: &mut Template, domain: &str) -> Result<()> {
    t.add_parameter(VPC, Parameter::string("VPC to use for pilosa instance"))?;
    t.add_parameter(SUBNET, Parameter::string("Subnet to use for pilosa instance"))?;
    t.add_parameter(
        AMI,
        Parameter::string("AMI to use for pilosa instance").with_default("ami-e3c3b8f4"),
    )?;
    t.add_parameter(KEY_PAIR, Parameter::string("Key pair to use for sudoer user"))?;
    t.add_parameter(
        INSTANCE_TYPE,
        Parameter::string("Instance type of pilosa").with_default("m3.medium"),
    )?;
    t.add_parameter(
        AGENT_INSTANCE_TYPE,
        Parameter::string("Instance type of agent nodes").with_default("c4.large"),
    )?;
    t.add_parameter(
        CLUSTER_NAME_PARAM,
        Parameter::string(format!(
            "Unique name for this pilosa cluster. Used in DNS (node0.{{name}}.{domain})"
        ))
        .with_default("cluster0")
        .with_pattern(
            "[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?",
            "must be a lowercase DNS label",
        ),
    )?;
    t.add_parameter(
        VOLUME_SIZE,
        Parameter::number("Space (in GB) of the root EBS volume for pilosa instances.")
            .with_default("10"),
    )?;
    t.add_parameter(
        VOLUME_TYPE,
        Parameter::string("AWS volume type of the root EBS volume for pilosa instances.")
            .with_default("gp2"),
    )?;
    Ok(())
}

fn add_shared_resources(t: &mut Template, domain: &str) -> Result<()> {
    t.add_resource(
        ROLE,
        IamRole {
            assume_role_policy_document: PolicyDocument::assume_role_for("ec2.amazonaws.com"),
        },
    )?;
    t.add_resource(
        INSTANCE_PROFILE,
        InstanceProfile {
            roles: vec![Expr::reference(ROLE)],
        },
    )?;
    t.add_resource(
        PRIVATE_ZONE,
        HostedZone {
            name: Expr::concat(vec![
                Expr::reference(CLUSTER_NAME_PARAM),
                format!(".{domain}").into(),
            ]),
            vpcs: vec![HostedZoneVpc {
                vpc_id: Expr::reference(VPC),
                vpc_region: Expr::region(),
            }],
        },
    )?;
    t.add_resource(
        SECURITY_GROUP,
        SecurityGroup {
            group_description: "Enable SSH access via port 22".to_string(),
            security_group_ingress: vec![IngressRule::tcp_from_cidr(SSH_PORT, ANYWHERE)],
            vpc_id: Expr::reference(VPC),
        },
    )?;
    for (id, port) in [(INGRESS, PILOSA_PORT), (INTERNAL_INGRESS, INTERNAL_PORT)] {
        t.add_resource(
            id,
            SecurityGroupIngress {
                group_id: Expr::reference(SECURITY_GROUP),
                rule: IngressRule::tcp_from_group(port, Expr::reference(SECURITY_GROUP)),
            },
        )?;
    }
    Ok(())
}

fn instance(params: &ClusterParams, role: Role, index: u32) -> Instance {
    let (instance_type, block_device_mappings, script) = match role {
        Role::Node => (
            INSTANCE_TYPE,
            vec![BlockDeviceMapping {
                device_name: ROOT_DEVICE.to_string(),
                ebs: EbsBlockDevice {
                    volume_size: Expr::reference(VOLUME_SIZE),
                    volume_type: Expr::reference(VOLUME_TYPE),
                },
            }],
            userdata::node_script(params, index),
        ),
        Role::Agent => (AGENT_INSTANCE_TYPE, Vec::new(), userdata::agent_script(params)),
    };

    Instance {
        image_id: Expr::reference(AMI),
        block_device_mappings,
        instance_type: Expr::reference(instance_type),
        key_name: Expr::reference(KEY_PAIR),
        iam_instance_profile: Expr::reference(INSTANCE_PROFILE),
        network_interfaces: vec![NetworkInterface::public_primary(
            Expr::reference(SECURITY_GROUP),
            Expr::reference(SUBNET),
        )],
        user_data: Expr::base64_sub(script),
    }
}

/// Instance plus its public and private A records.
fn add_machine(t: &mut Template, params: &ClusterParams, role: Role, index: u32) -> Result<()> {
    let instance_id = role.instance_id(index);
    t.add_resource(&instance_id, instance(params, role, index))?;

    t.add_resource(
        &role.public_record_id(index),
        RecordSet {
            zone: ZoneRef::Name(naming::zone_name(&params.domain)),
            name: naming::record_name(role, index, &params.domain),
            record_type: RecordType::A,
            ttl: INSTANCE_RECORD_TTL,
            resource_records: vec![Expr::get_att(&instance_id, "PublicIp")],
        },
    )?;
    t.add_resource(
        &role.private_record_id(index),
        RecordSet {
            zone: ZoneRef::Id(Expr::reference(PRIVATE_ZONE)),
            name: naming::record_name(role, index, &params.domain),
            record_type: RecordType::A,
            ttl: INSTANCE_RECORD_TTL,
            resource_records: vec![Expr::get_att(&instance_id, "PrivateIp")],
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::InstallMethod;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn build_json(params: &ClusterParams) -> Value {
        serde_json::to_value(build(params).unwrap()).unwrap()
    }

    #[test]
    fn test_default_cluster_shape() {
        let p = ClusterParams::default();
        let t = build(&p).unwrap();
        assert_eq!(t.parameters.len(), 9);
        assert_eq!(t.resources.len(), expected_resource_count(&p));
        assert_eq!(t.resources.len(), 6 + 3 * 4);
        assert_eq!(t.resource_ids_of("AWS::EC2::Instance").count(), 4);
        assert_eq!(t.resource_ids_of("AWS::Route53::RecordSet").count(), 8);
    }

    #[test]
    fn test_shared_resource_order() {
        let t = build(&ClusterParams::default()).unwrap();
        let ids: Vec<&str> = t.resources.keys().take(9).map(String::as_str).collect();
        assert_eq!(
            ids,
            vec![
                ROLE,
                INSTANCE_PROFILE,
                PRIVATE_ZONE,
                SECURITY_GROUP,
                INGRESS,
                INTERNAL_INGRESS,
                "PilosaInstance0",
                "PilosaPublicRecordSet0",
                "PilosaPrivateRecordSet0",
            ]
        );
    }

    #[test]
    fn test_parameters() {
        let v = build_json(&ClusterParams::default());
        let params = &v["Parameters"];
        assert_eq!(params["AMI"]["Default"], "ami-e3c3b8f4");
        assert_eq!(params["InstanceType"]["Default"], "m3.medium");
        assert_eq!(params["AgentInstanceType"]["Default"], "c4.large");
        assert_eq!(params["ClusterName"]["Default"], "cluster0");
        assert_eq!(params["VolumeSize"]["Type"], "Number");
        assert_eq!(params["VolumeSize"]["Default"], "10");
        assert_eq!(params["VolumeType"]["Default"], "gp2");
        assert!(params["VPC"].get("Default").is_none());
        assert_eq!(
            params["ClusterName"]["Description"],
            "Unique name for this pilosa cluster. Used in DNS (node0.{name}.sandbox.pilosa.com)"
        );
    }

    #[test]
    fn test_private_zone() {
        let v = build_json(&ClusterParams::default());
        let zone = &v["Resources"]["PilosaZone"]["Properties"];
        assert_eq!(
            zone["Name"],
            json!({"Fn::Join": ["", [{"Ref": "ClusterName"}, ".sandbox.pilosa.com"]]})
        );
        assert_eq!(zone["VPCs"][0]["VPCId"], json!({"Ref": "VPC"}));
    }

    #[test]
    fn test_security_rules() {
        let v = build_json(&ClusterParams::default());
        let res = &v["Resources"];
        assert_eq!(
            res["PilosaInstanceSecurityGroup"]["Properties"]["SecurityGroupIngress"][0]["FromPort"],
            22
        );
        assert_eq!(res["PilosaIngress"]["Properties"]["FromPort"], 10101);
        assert_eq!(res["PilosaInternalIngress"]["Properties"]["ToPort"], 12000);
        assert_eq!(
            res["PilosaInternalIngress"]["Properties"]["SourceSecurityGroupId"],
            json!({"Ref": "PilosaInstanceSecurityGroup"})
        );
    }

    #[test]
    fn test_node_instance() {
        let v = build_json(&ClusterParams::default());
        let inst = &v["Resources"]["PilosaInstance1"];
        assert_eq!(inst["Type"], "AWS::EC2::Instance");
        let props = &inst["Properties"];
        assert_eq!(props["InstanceType"], json!({"Ref": "InstanceType"}));
        assert_eq!(props["BlockDeviceMappings"][0]["DeviceName"], "/dev/sda1");
        assert_eq!(
            props["BlockDeviceMappings"][0]["Ebs"]["VolumeSize"],
            json!({"Ref": "VolumeSize"})
        );
        assert_eq!(props["IamInstanceProfile"], json!({"Ref": "PilosaInstanceProfile"}));
        let script = props["UserData"]["Fn::Base64"]["Fn::Sub"].as_str().unwrap();
        assert!(script.contains("bind = \"node1.${ClusterName}.sandbox.pilosa.com:10101\""));
    }

    #[test]
    fn test_agent_instance() {
        let v = build_json(&ClusterParams::default());
        let props = &v["Resources"]["PilosaAgentInstance0"]["Properties"];
        assert_eq!(props["InstanceType"], json!({"Ref": "AgentInstanceType"}));
        assert!(props.get("BlockDeviceMappings").is_none());
        let script = props["UserData"]["Fn::Base64"]["Fn::Sub"].as_str().unwrap();
        assert!(script.contains("github.com/pilosa/pdk"));
    }

    #[test]
    fn test_record_sets() {
        let v = build_json(&ClusterParams::default());
        let res = &v["Resources"];
        let public = &res["PilosaPublicRecordSet2"]["Properties"];
        assert_eq!(public["HostedZoneName"], "sandbox.pilosa.com.");
        assert_eq!(public["TTL"], "300");
        assert_eq!(public["Type"], "A");
        assert_eq!(
            public["ResourceRecords"],
            json!([{"Fn::GetAtt": ["PilosaInstance2", "PublicIp"]}])
        );
        let private = &res["AgentPrivateRecordSet0"]["Properties"];
        assert_eq!(private["HostedZoneId"], json!({"Ref": "PilosaZone"}));
        assert_eq!(
            private["Name"],
            json!({"Fn::Join": ["", ["agent0.", {"Ref": "ClusterName"}, ".sandbox.pilosa.com."]]})
        );
        assert_eq!(
            private["ResourceRecords"],
            json!([{"Fn::GetAtt": ["PilosaAgentInstance0", "PrivateIp"]}])
        );
    }

    #[test]
    fn test_custom_domain() {
        let p = ClusterParams {
            domain: "example.net".into(),
            ..Default::default()
        };
        let v = build_json(&p);
        assert_eq!(
            v["Resources"]["PilosaPublicRecordSet0"]["Properties"]["HostedZoneName"],
            "example.net."
        );
    }

    #[test]
    fn test_install_method_reaches_user_data() {
        let p = ClusterParams {
            install: InstallMethod::Package,
            ..Default::default()
        };
        let v = build_json(&p);
        let script = v["Resources"]["PilosaInstance0"]["Properties"]["UserData"]["Fn::Base64"]
            ["Fn::Sub"]
            .as_str()
            .unwrap();
        assert!(script.contains("dpkg -i"));
    }

    #[test]
    fn test_empty_cluster() {
        let p = ClusterParams {
            cluster_size: 0,
            num_agents: 0,
            ..Default::default()
        };
        let t = build(&p).unwrap();
        assert_eq!(t.resources.len(), FIXED_RESOURCES);
    }

    proptest! {
        #[test]
        fn prop_groups_match_counts(nodes in 0u32..12, agents in 0u32..6) {
            let p = ClusterParams {
                cluster_size: nodes,
                num_agents: agents,
                ..Default::default()
            };
            let t = build(&p).unwrap();
            prop_assert_eq!(t.resources.len(), expected_resource_count(&p));

            let instances: Vec<&str> = t.resource_ids_of("AWS::EC2::Instance").collect();
            let expected: Vec<String> = (0..nodes)
                .map(|i| format!("PilosaInstance{i}"))
                .chain((0..agents).map(|i| format!("PilosaAgentInstance{i}")))
                .collect();
            prop_assert_eq!(instances, expected.iter().map(String::as_str).collect::<Vec<_>>());

            let v = serde_json::to_value(&t).unwrap();
            let res = &v["Resources"];
            for (role, count) in [(Role::Node, nodes), (Role::Agent, agents)] {
                for i in 0..count {
                    let label = format!("{}{}.", role.label(), i);
                    for id in [role.public_record_id(i), role.private_record_id(i)] {
                        let first = &res[id.as_str()]["Properties"]["Name"]["Fn::Join"][1][0];
                        prop_assert_eq!(first.as_str(), Some(label.as_str()));
                    }
                }
                let past_end = role.instance_id(count);
                prop_assert!(!t.resources.contains_key(&past_end));
            }

            for i in 0..nodes {
                let id = Role::Node.instance_id(i);
                let script = res[id.as_str()]["Properties"]["UserData"]["Fn::Base64"]["Fn::Sub"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let bind = format!("bind = \"node{}.${{ClusterName}}.sandbox.pilosa.com:{}\"", i, PILOSA_PORT);
                prop_assert!(script.contains(&bind));
                let hosts = script
                    .lines()
                    .find_map(|l| l.strip_prefix("hosts = ["))
                    .unwrap_or_default()
                    .to_string();
                let entries = hosts.matches(&format!(":{}\"", PILOSA_PORT)).count();
                prop_assert_eq!(entries, nodes as usize);
            }
        }
    }
}
