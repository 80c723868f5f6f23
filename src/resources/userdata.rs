//! Boot scripts for Pilosa nodes and agents.
//!
//! Scripts are embedded in the template through `Fn::Sub`, so the only
//! `${...}` sequences they may contain are references CloudFormation can
//! resolve (the cluster name parameter). Plain `$VAR` shell expansions pass
//! through untouched.

use crate::core::config::{ClusterParams, InstallMethod};
use crate::core::naming::{self, Role};

/// Client-facing Pilosa port.
pub const PILOSA_PORT: u16 = 10101;

/// Port for intra-cluster traffic.
pub const INTERNAL_PORT: u16 = 12000;

const RELEASES_URL: &str = "https://github.com/pilosa/pilosa/releases/download";

/// Prerequisites, Go toolchain, and GOPATH for the user. Shared by nodes and agents.
pub fn common_prelude(params: &ClusterParams) -> String {
    let goversion = &params.go_version;
    let username = &params.username;
    format!(
        r#"#!/bin/bash

# install prereqs
apt-get update
apt-get -y install git
apt-get -y install make

# install go
mkdir -p /usr/local/go
wget https://storage.googleapis.com/golang/{goversion}.tar.gz
tar -C /usr/local -xzf {goversion}.tar.gz
chown -R {username}:{username} /usr/local/go
mkdir -p /home/{username}/go/src/github.com/pilosa
mkdir -p /home/{username}/go/bin
GOPATH=/home/{username}/go
export GOPATH
PATH=$PATH:/usr/local/go/bin:$GOPATH/bin
export PATH

# set up GOPATH in .bashrc
cat >> /home/{username}/.bashrc << 'EOF'
GOPATH=/home/{username}/go
export GOPATH
PATH=$PATH:/usr/local/go/bin:$GOPATH/bin
export PATH
EOF
"#
    )
}

/// Shell that installs the `pilosa` binary onto the PATH.
pub fn install_script(method: InstallMethod, version: &str) -> String {
    match method {
        InstallMethod::Source => "go get -u github.com/pilosa/pilosa\n\
             cd $GOPATH/src/github.com/pilosa/pilosa\n\
             make install"
            .to_string(),
        InstallMethod::Binary => {
            let dir = format!("pilosa-{version}-linux-amd64");
            format!(
                "wget {RELEASES_URL}/{version}/{dir}.tar.gz\n\
                 tar -C /tmp -xzf {dir}.tar.gz\n\
                 install -m 0755 /tmp/{dir}/pilosa /usr/local/bin/pilosa"
            )
        }
        InstallMethod::Package => {
            let deb = format!("pilosa_{}_amd64.deb", version.trim_start_matches('v'));
            format!(
                "wget {RELEASES_URL}/{version}/{deb}\n\
                 dpkg -i {deb}"
            )
        }
    }
}

fn host_list(params: &ClusterParams, port: u16) -> String {
    (0..params.cluster_size)
        .map(|i| format!("\"{}:{port}\"", naming::sub_hostname(Role::Node, i, &params.domain)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `/etc/pilosa.cfg` for node `index`.
pub fn pilosa_config(params: &ClusterParams, index: u32) -> String {
    let username = &params.username;
    let bind = naming::sub_hostname(Role::Node, index, &params.domain);
    format!(
        r#"data-dir = "/home/{username}/pilosa/data1"
bind = "{bind}:{PILOSA_PORT}"
log-path = "/home/{username}/pilosa.log"

[cluster]
replicas = {replicas}
internal-port = {INTERNAL_PORT}
type = "http"
hosts = [{hosts}]
internal-hosts = [{internal_hosts}]"#,
        replicas = params.replicas,
        hosts = host_list(params, PILOSA_PORT),
        internal_hosts = host_list(params, INTERNAL_PORT),
    )
}

/// Full boot script for Pilosa node `index`.
pub fn node_script(params: &ClusterParams, index: u32) -> String {
    let username = &params.username;
    format!(
        r#"{common}
# update open file limits
cat >> /etc/security/limits.conf << 'EOF'
* soft nofile 262144
* hard nofile 262144
* hard memlock unlimited
* soft memlock unlimited
EOF

# install pilosa
{install}

# set up pilosa config file
cat > /etc/pilosa.cfg << 'EOF'
{config}
EOF

# clean up root's mess
chown -R {username}:{username} /home/{username}

# all output should go to pilosa.log - pilosa.out should be empty
sudo -u {username} PATH=$PATH nohup pilosa server --config=/etc/pilosa.cfg &> /home/{username}/pilosa.out &
"#,
        common = common_prelude(params),
        install = install_script(params.install, &params.pilosa_version),
        config = pilosa_config(params, index),
    )
}

/// Full boot script for an agent. Agents always build the PDK from source.
pub fn agent_script(params: &ClusterParams) -> String {
    let username = &params.username;
    format!(
        r#"{common}
apt-get -y install gcc
apt-get -y install libpcap-dev

# install pdk
go get -u github.com/pilosa/pdk
cd $GOPATH/src/github.com/pilosa/pdk
make install

# clean up root's mess
chown -R {username}:{username} /home/{username}
"#,
        common = common_prelude(params),
    )
}
