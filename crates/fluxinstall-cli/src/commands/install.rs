//! Install command - render the Flux install manifests

use console::style;
use fluxinstall_core::TemplateParameters;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CliError, Result};

/// Everything `fluxinstall install` was asked for
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub git_url: String,
    pub git_branch: String,
    pub git_paths: Vec<String>,
    pub git_label: String,
    pub git_user: String,
    pub git_email: String,
    pub git_read_only: bool,
    pub registry_scanning: bool,
    pub manifest_generation: bool,
    pub namespace: String,
    pub additional_flux_args: Vec<String>,
    pub config_file: Option<PathBuf>,
    pub config_as_config_map: bool,
}

impl InstallOptions {
    /// Check the required flags carry a usable value
    fn validate(&self) -> Result<()> {
        if self.git_url.trim().is_empty() {
            return Err(CliError::validation_with_help(
                "please supply a valid --git-url argument",
                "e.g. --git-url=git@github.com:fluxcd/flux-get-started",
            ));
        }
        if self.git_email.trim().is_empty() {
            return Err(CliError::validation_with_help(
                "please supply a valid --git-email argument",
                "the email is used for commits made by Flux",
            ));
        }
        Ok(())
    }

    /// Template parameters, with the config file already read
    fn parameters(self, config_file_content: String) -> TemplateParameters {
        TemplateParameters::builder()
            .git_url(self.git_url)
            .git_branch(self.git_branch)
            .git_paths(
                self.git_paths
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty()),
            )
            .git_label(self.git_label)
            .git_user(self.git_user)
            .git_email(self.git_email)
            .git_read_only(self.git_read_only)
            .registry_scanning(self.registry_scanning)
            .manifest_generation(self.manifest_generation)
            .namespace(self.namespace)
            .additional_flux_args(self.additional_flux_args)
            .config_file_content(config_file_content)
            .config_as_config_map(self.config_as_config_map)
            .build()
    }
}

pub fn run(options: InstallOptions, output_dir: Option<&Path>) -> Result<()> {
    options.validate()?;

    let config_file_content = match &options.config_file {
        Some(path) => {
            debug!(path = %path.display(), "reading config file");
            fs::read_to_string(path)
                .map_err(|e| CliError::io_at(format!("cannot read config file {}", path.display()), e))?
        }
        None => String::new(),
    };

    let params = options.parameters(config_file_content);
    let manifests = fluxinstall_engine::render_all(&params)?;

    if let Some(output_path) = output_dir {
        // Write to directory
        fs::create_dir_all(output_path).map_err(|e| {
            CliError::io_at(
                format!("cannot create output directory {}", output_path.display()),
                e,
            )
        })?;

        for (filename, content) in &manifests {
            let file_path = output_path.join(filename);

            fs::write(&file_path, content)
                .map_err(|e| CliError::io_at(format!("cannot write {}", file_path.display()), e))?;

            println!("{} {}", style("wrote").green(), file_path.display());
        }
    } else {
        // Output to stdout; every document starts with its own `---`
        let mut first = true;

        for (filename, content) in &manifests {
            let content = String::from_utf8_lossy(content);
            if content.trim().is_empty() {
                continue;
            }

            if !first {
                println!();
            }
            first = false;

            println!("{}", style(format!("# Source: {}", filename)).dim());
            println!("{}", content.trim_end());
        }
    }

    Ok(())
}
