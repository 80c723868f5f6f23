//! pilosa-cfn CLI: CloudFormation templates for Pilosa clusters.

use clap::Parser;
use pilosa_cfn::cli::{self, Cli};
use pilosa_cfn::core::error::Error;

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);
    if let Err(e) = cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        if let Error::Invalid(errors) = &e {
            for err in errors {
                eprintln!("  {}", err);
            }
        }
        std::process::exit(1);
    }
}
