use std::path::{self, PathBuf};
use std::sync::Arc;

use buildtool::adapter::{CommandBundler, ConsoleReporter, FileConfigurationSource};
use buildtool::app::Client;
use buildtool::config::{self, Configuration};
use buildtool::domain::BundlerInvoker;
use buildtool::process::ProcessRunner;
use snafu::{prelude::*, Whatever};
use tracing::Level;

use crate::cli::Arguments;

struct EnvironmentPath {
    /// Directory the relative paths of the configuration are resolved against.
    project: PathBuf,
    /// Directory holding the local override configuration.
    working_dir: PathBuf,
}

pub fn bootstrap(args: &Arguments) -> Result<Client, Whatever> {
    let env_path = environment(args)?;
    let configuration = configuration(args, &env_path)?;
    let invoker = invoker(&configuration, &env_path);
    let client = Client::new(ProcessRunner::new(), Arc::new(invoker), env_path.working_dir);
    Ok(client)
}

pub fn logger(verbosity: Level) -> Result<(), Whatever> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(verbosity)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Could not setup logger")?;
    Ok(())
}

fn environment(args: &Arguments) -> Result<EnvironmentPath, Whatever> {
    let working_dir =
        std::env::current_dir().whatever_context("Could not get current directory")?;

    let project = match &args.config {
        Some(path) => {
            let path = path::absolute(path)
                .whatever_context(format!("Invalid configuration path: {}", path.display()))?;
            let parent = path
                .parent()
                .whatever_context(format!("Invalid configuration path: {}", path.display()))?;
            parent.to_path_buf()
        }
        None => working_dir.clone(),
    };

    Ok(EnvironmentPath {
        project,
        working_dir,
    })
}

fn configuration(args: &Arguments, env_path: &EnvironmentPath) -> Result<Configuration, Whatever> {
    let res = match &args.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_project(&env_path.project),
    };

    res.whatever_context("Could not load configuration")
}

fn invoker(configuration: &Configuration, env_path: &EnvironmentPath) -> BundlerInvoker {
    let build_sources = env_path.project.join(&configuration.paths.build_sources);

    let source = FileConfigurationSource::new(build_sources, &env_path.working_dir)
        .with_override_file(&configuration.paths.override_file);

    let bundler = CommandBundler::new(
        configuration.bundler.program.clone(),
        configuration.bundler.args.clone(),
        &env_path.working_dir,
    );

    BundlerInvoker::new(
        Arc::new(source),
        Arc::new(bundler),
        Arc::new(ConsoleReporter::new()),
    )
}
