//! fluxinstall - render the Flux install manifests

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "fluxinstall")]
#[command(author = "fluxinstall Contributors")]
#[command(version)]
#[command(about = "Render the manifests that install Flux into a cluster", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print (or write) the manifests installing Flux
    Install {
        /// URL of the Git repository Flux syncs from
        #[arg(long, env = "FLUX_GIT_URL")]
        git_url: String,

        /// Git branch to sync
        #[arg(long, default_value = "master")]
        git_branch: String,

        /// Relative paths within the repository to look for manifests
        #[arg(long = "git-path", value_delimiter = ',')]
        git_paths: Vec<String>,

        /// Label used to mark the last applied commit
        #[arg(long, default_value = "flux")]
        git_label: String,

        /// Username used for commits made by Flux
        #[arg(long, default_value = "Flux")]
        git_user: String,

        /// Email used for commits made by Flux
        #[arg(long, env = "FLUX_GIT_EMAIL")]
        git_email: String,

        /// Never push to the repository
        #[arg(long = "git-readonly")]
        git_readonly: bool,

        /// Do not scan image registries (skips memcached)
        #[arg(long)]
        registry_disable_scanning: bool,

        /// Generate manifests from `.flux.yaml` files
        #[arg(long)]
        manifest_generation: bool,

        /// Namespace Flux is installed into
        #[arg(short, long)]
        namespace: Option<String>,

        /// Extra daemon argument, rendered as `--<arg>` (repeatable)
        #[arg(long = "add-flux-args")]
        additional_flux_args: Vec<String>,

        /// Daemon config file shipped alongside the deployment
        #[arg(long)]
        config_file: Option<PathBuf>,

        /// Ship the config file as a ConfigMap instead of a Secret
        #[arg(long = "config-as-configmap", requires = "config_file")]
        config_as_configmap: bool,

        /// Output directory (if not set, outputs to stdout)
        ///
        /// Files are written one at a time: if a write fails, the files
        /// written before it stay in the directory.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Install {
            git_url,
            git_branch,
            git_paths,
            git_label,
            git_user,
            git_email,
            git_readonly,
            registry_disable_scanning,
            manifest_generation,
            namespace,
            additional_flux_args,
            config_file,
            config_as_configmap,
            output_dir,
        } => commands::install::run(
            commands::install::InstallOptions {
                git_url,
                git_branch,
                git_paths,
                git_label,
                git_user,
                git_email,
                git_read_only: git_readonly,
                registry_scanning: !registry_disable_scanning,
                manifest_generation,
                namespace: namespace.unwrap_or_default(),
                additional_flux_args,
                config_file,
                config_as_config_map: config_as_configmap,
            },
            output_dir.as_deref(),
        ),
    };

    if let Err(err) = result {
        if let error::CliError::Template(render) = &err {
            tracing::debug!(stage = render.stage(), template = ?render.template(), "render failed");
        }
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr, filtered by `RUST_LOG`, or at debug level under `--debug`
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
