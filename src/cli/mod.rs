//! CLI subcommands: cluster, sandbox, dedicated, production, validate,
//! user-data, schema, completions.

use crate::core::codegen::{self, Variant};
use crate::core::config::{self, ClusterParams, InstallMethod};
use crate::core::error::{Error, Result, ValidationError};
use crate::core::render::{self, Format};
use crate::resources::userdata;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pilosa-cfn",
    version,
    about = "Generate CloudFormation templates for Pilosa clusters and their DNS zones"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Cluster inputs. Positionals override the config file, which overrides
/// built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// Number of Pilosa nodes [default: 3]
    pub cluster_size: Option<u32>,

    /// Number of agent nodes [default: 1]
    pub num_agents: Option<u32>,

    /// Go release archive name [default: go1.8.3.linux-amd64]
    pub go_version: Option<String>,

    /// OS user owning the installation [default: ubuntu]
    pub username: Option<String>,

    /// Public DNS domain [default: sandbox.pilosa.com]
    pub domain: Option<String>,

    /// Pilosa replication factor [default: 1]
    pub replicas: Option<u32>,

    /// YAML file with cluster parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How Pilosa is installed on nodes [default: source]
    #[arg(long, value_enum)]
    pub install: Option<InstallMethod>,

    /// Pilosa release tag for binary and package installs [default: v0.4.0]
    #[arg(long)]
    pub pilosa_version: Option<String>,
}

impl ClusterArgs {
    /// Layer defaults, config file, and command-line values.
    pub fn resolve(&self) -> Result<ClusterParams> {
        let mut params = match &self.config {
            Some(path) => config::parse_config_file(path)?,
            None => ClusterParams::default(),
        };

        if let Some(n) = self.cluster_size {
            params.cluster_size = n;
        }
        if let Some(n) = self.num_agents {
            params.num_agents = n;
        }
        if let Some(ref v) = self.go_version {
            params.go_version.clone_from(v);
        }
        if let Some(ref u) = self.username {
            params.username.clone_from(u);
        }
        if let Some(ref d) = self.domain {
            params.domain.clone_from(d);
        }
        if let Some(n) = self.replicas {
            params.replicas = n;
        }
        if let Some(m) = self.install {
            params.install = m;
        }
        if let Some(ref v) = self.pilosa_version {
            params.pilosa_version.clone_from(v);
        }

        tracing::debug!(?params, "resolved cluster parameters");
        Ok(params)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pilosa nodes and agents with DNS records
    Cluster {
        #[command(flatten)]
        cluster: ClusterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Public hosted zone for sandbox clusters
    Sandbox {
        /// Zone domain
        #[arg(default_value = config::DEFAULT_DOMAIN)]
        domain: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Sandbox zone plus a dedicated-tenancy VPC
    Dedicated {
        /// Zone domain
        #[arg(default_value = config::DEFAULT_DEDICATED_DOMAIN)]
        domain: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Production apex zone records
    Production {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate a cluster config file without generating anything
    Validate {
        /// Path to cluster config
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the boot script of one node or agent
    UserData {
        #[command(flatten)]
        cluster: ClusterArgs,

        /// Print an agent's script instead of a node's
        #[arg(long)]
        agent: bool,

        /// Node index (ignored for agents, whose scripts are identical)
        #[arg(long, default_value_t = 0)]
        index: u32,
    },

    /// Print the JSON Schema of the cluster config file
    Schema,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8) {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error if a subscriber is already set
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .without_time(),
        )
        .try_init();
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match cmd {
        Commands::Cluster { cluster, output } => {
            cmd_generate(&Variant::Cluster(cluster.resolve()?), &output, &mut stdout)
        }
        Commands::Sandbox { domain, output } => {
            cmd_generate(&Variant::Sandbox { domain }, &output, &mut stdout)
        }
        Commands::Dedicated { domain, output } => {
            cmd_generate(&Variant::Dedicated { domain }, &output, &mut stdout)
        }
        Commands::Production { output } => cmd_generate(&Variant::Production, &output, &mut stdout),
        Commands::Validate { config } => cmd_validate(&config, &mut stdout),
        Commands::UserData {
            cluster,
            agent,
            index,
        } => cmd_user_data(&cluster.resolve()?, agent, index, &mut stdout),
        Commands::Schema => cmd_schema(&mut stdout),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pilosa-cfn", &mut stdout);
            Ok(())
        }
    }
}

fn write_out(out: &mut dyn Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .map_err(|e| Error::io("write", "<stdout>", e))
}

fn cmd_generate(variant: &Variant, output: &OutputArgs, out: &mut dyn Write) -> Result<()> {
    let template = codegen::generate(variant)?;
    let text = render::render(&template, output.format)?;
    let digest = render::fingerprint(&text);

    match &output.output {
        Some(path) => {
            render::write_atomic(path, &text)?;
            tracing::info!(path = %path.display(), fingerprint = %digest, "wrote template");
            write_out(
                out,
                &format!(
                    "Wrote {} ({} resources, {})\n",
                    path.display(),
                    template.resources.len(),
                    digest
                ),
            )
        }
        None => {
            tracing::info!(fingerprint = %digest, "rendered template");
            write_out(out, &text)
        }
    }
}

fn cmd_validate(file: &Path, out: &mut dyn Write) -> Result<()> {
    let params = config::parse_config_file(file)?;
    config::ensure_valid(&params)?;
    write_out(
        out,
        &format!(
            "OK: {} ({} nodes, {} agents, {} install)\n",
            file.display(),
            params.cluster_size,
            params.num_agents,
            params.install
        ),
    )
}

fn cmd_user_data(params: &ClusterParams, agent: bool, index: u32, out: &mut dyn Write) -> Result<()> {
    config::ensure_valid(params)?;
    let script = if agent {
        if params.num_agents == 0 {
            return Err(Error::Invalid(vec![ValidationError {
                field: "num_agents",
                message: "cluster has no agents".to_string(),
            }]));
        }
        userdata::agent_script(params)
    } else {
        if index >= params.cluster_size {
            return Err(Error::Invalid(vec![ValidationError {
                field: "index",
                message: format!(
                    "node {} out of range for cluster size {}",
                    index, params.cluster_size
                ),
            }]));
        }
        userdata::node_script(params, index)
    };
    write_out(out, &script)
}

fn cmd_schema(out: &mut dyn Write) -> Result<()> {
    let schema = schemars::schema_for!(ClusterParams);
    let mut text = serde_json::to_string_pretty(&schema)?;
    text.push('\n');
    write_out(out, &text)
}
