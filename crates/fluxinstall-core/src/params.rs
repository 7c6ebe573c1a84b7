//! Parameter record for the install templates
//!
//! Every field is optional: the zero value of each field is a valid input and
//! the templates render well-formed manifests with all of them unset.

use serde::{Deserialize, Serialize};

/// Values the install templates can reference
///
/// Field names are serialized as-is (snake_case) and are exactly the names
/// templates use, e.g. `{{ git_url }}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParameters {
    /// Git repository URL the daemon syncs from
    pub git_url: String,

    /// Branch to sync
    pub git_branch: String,

    /// Paths within the repository holding manifests
    pub git_paths: Vec<String>,

    /// Label (sync tag) used to mark the last applied commit
    pub git_label: String,

    /// Name used for commits made by the daemon
    pub git_user: String,

    /// Email used for commits made by the daemon
    pub git_email: String,

    /// Never push to the repository
    pub git_read_only: bool,

    /// Scan image registries for new tags (requires memcached)
    pub registry_scanning: bool,

    /// Namespace the agent is installed into
    pub namespace: String,

    /// Enable manifest generation from `.flux.yaml` files
    pub manifest_generation: bool,

    /// Extra daemon arguments, rendered as `--<arg>`
    pub additional_flux_args: Vec<String>,

    /// Raw content of the daemon config file
    pub config_file_content: String,

    /// Ship the config file as a ConfigMap instead of a Secret
    pub config_as_config_map: bool,
}

impl TemplateParameters {
    /// Names of every field, as visible to templates
    pub const FIELDS: &'static [&'static str] = &[
        "git_url",
        "git_branch",
        "git_paths",
        "git_label",
        "git_user",
        "git_email",
        "git_read_only",
        "registry_scanning",
        "namespace",
        "manifest_generation",
        "additional_flux_args",
        "config_file_content",
        "config_as_config_map",
    ];

    /// Create a builder
    pub fn builder() -> TemplateParametersBuilder {
        TemplateParametersBuilder::default()
    }

    /// Whether templates may reference `name`
    pub fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// Fluent builder for [`TemplateParameters`]
#[derive(Debug, Clone, Default)]
pub struct TemplateParametersBuilder {
    params: TemplateParameters,
}

impl TemplateParametersBuilder {
    pub fn git_url(mut self, url: impl Into<String>) -> Self {
        self.params.git_url = url.into();
        self
    }

    pub fn git_branch(mut self, branch: impl Into<String>) -> Self {
        self.params.git_branch = branch.into();
        self
    }

    /// Append repository paths, keeping their order
    pub fn git_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.git_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn git_label(mut self, label: impl Into<String>) -> Self {
        self.params.git_label = label.into();
        self
    }

    pub fn git_user(mut self, user: impl Into<String>) -> Self {
        self.params.git_user = user.into();
        self
    }

    pub fn git_email(mut self, email: impl Into<String>) -> Self {
        self.params.git_email = email.into();
        self
    }

    pub fn git_read_only(mut self, read_only: bool) -> Self {
        self.params.git_read_only = read_only;
        self
    }

    pub fn registry_scanning(mut self, enabled: bool) -> Self {
        self.params.registry_scanning = enabled;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.params.namespace = namespace.into();
        self
    }

    pub fn manifest_generation(mut self, enabled: bool) -> Self {
        self.params.manifest_generation = enabled;
        self
    }

    /// Append extra daemon arguments (without the leading `--`)
    pub fn additional_flux_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params
            .additional_flux_args
            .extend(args.into_iter().map(Into::into));
        self
    }

    pub fn config_file_content(mut self, content: impl Into<String>) -> Self {
        self.params.config_file_content = content.into();
        self
    }

    pub fn config_as_config_map(mut self, as_config_map: bool) -> Self {
        self.params.config_as_config_map = as_config_map;
        self
    }

    pub fn build(self) -> TemplateParameters {
        self.params
    }
}
