use std::path::PathBuf;

use buildtool::app::Command as ClientCommand;
use buildtool::domain::entity::{BuildRequest, EnvironmentMap, SpawnRequest};
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    /// Path to a custom configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Maximum logging level the subscriber should use
    #[arg(short, long, global = true, default_value_t = Level::INFO)]
    pub verbosity: Level,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a default configuration file in the current directory
    Init,
    /// Launch a program with inherited stdio. Exit with its code if it fails.
    Spawn {
        /// Run the program in its own process group. Interrupting it is not
        /// treated as a failure.
        #[arg(short, long)]
        detached: bool,
        /// Environment variable added for the program
        #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,
        /// Program to launch
        program: String,
        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run the bundler with a named configuration
    Build {
        /// Environment variable exposed to the bundled code
        #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,
        /// Name of the configuration in the build sources directory
        name: String,
    },
}

fn parse_env_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing variable name in `{value}`")),
        Some((key, value)) => Ok((key.to_owned(), value.to_owned())),
        None => Err(format!("expected KEY=VALUE, found `{value}`")),
    }
}

impl From<Command> for ClientCommand {
    fn from(value: Command) -> Self {
        match value {
            Command::Init => Self::Init,
            Command::Spawn {
                detached,
                env,
                program,
                args,
            } => {
                let env = (!env.is_empty()).then(|| env.into_iter().collect::<EnvironmentMap>());
                Self::Spawn(
                    SpawnRequest::new(program)
                        .args(args)
                        .detached(detached)
                        .env(env),
                )
            }
            Command::Build { env, name } => {
                Self::Build(BuildRequest::new(name).env(env.into_iter().collect()))
            }
        }
    }
}
