//! Fill in the install templates
//!
//! Walks the template corpus, drops the templates the parameters exclude,
//! then compiles, renders and names each remaining one. The first failure
//! aborts the whole run and no partial result is returned.

use std::collections::BTreeMap;

use fluxinstall_core::{AssetSource, EmbeddedAssets, TemplateParameters, TEMPLATE_SUFFIX};
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::engine::Engine;
use crate::error::{RenderError, Result};

/// Root of the virtual template tree
pub const TEMPLATE_ROOT: &str = "/";

/// Name fragment identifying the memcached templates
const MEMCACHE_MARKER: &str = "memcache";

/// Rendered manifests keyed by output file name
pub type RenderedManifests = BTreeMap<String, Vec<u8>>;

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(Engine::default);

/// Whether `template_name` takes part in a render with `params`
///
/// memcached only backs registry scanning, and is not deployed in read-only
/// mode. Every other template is always rendered.
pub fn include(template_name: &str, params: &TemplateParameters) -> bool {
    if template_name.contains(MEMCACHE_MARKER) {
        return params.registry_scanning && !params.git_read_only;
    }
    true
}

/// Output file name for a template: the name without its `.tmpl` suffix
pub fn output_name(source_name: &str) -> String {
    source_name
        .strip_suffix(TEMPLATE_SUFFIX)
        .unwrap_or(source_name)
        .to_string()
}

/// Render the embedded install templates
///
/// Errors are returned as-is: callers that report them to users add their
/// own context, e.g. the CLI reports them as
/// `internal error filling embedded installation templates`.
///
/// # Example
///
/// ```rust
/// use fluxinstall_core::TemplateParameters;
/// use fluxinstall_engine::render_all;
///
/// let params = TemplateParameters::builder()
///     .git_url("git@github.com:fluxcd/flux-get-started")
///     .git_branch("master")
///     .git_label("flux")
///     .build();
///
/// let manifests = render_all(&params).unwrap();
/// assert!(manifests.contains_key("flux-deployment.yaml"));
/// ```
pub fn render_all(params: &TemplateParameters) -> Result<RenderedManifests> {
    render_all_from(&EmbeddedAssets::new(), &DEFAULT_ENGINE, params)
}

/// Render every included template of `assets`
pub fn render_all_from(
    assets: &dyn AssetSource,
    engine: &Engine,
    params: &TemplateParameters,
) -> Result<RenderedManifests> {
    let entries = assets.walk(TEMPLATE_ROOT).map_err(RenderError::Enumeration)?;

    let mut manifests = RenderedManifests::new();
    // Output name -> source template, to report collisions
    let mut sources: BTreeMap<String, String> = BTreeMap::new();

    for entry in entries.iter().filter(|e| !e.is_dir) {
        if !include(&entry.name, params) {
            debug!(template = %entry.name, "skipping template");
            continue;
        }

        let source = entry.read_to_string().map_err(|e| RenderError::Read {
            template: entry.name.clone(),
            source: e,
        })?;

        let name = output_name(&entry.name);
        if let Some(first) = sources.get(&name) {
            return Err(RenderError::DuplicateOutput {
                name,
                first: first.clone(),
                second: entry.name.clone(),
            });
        }

        let compiled = engine.compile(&entry.name, &source)?;
        let rendered = engine.render(&compiled, params)?;

        trace!(template = %entry.name, bytes = rendered.len(), "rendered template");
        debug!(template = %entry.name, output = %name, "rendered template");
        sources.insert(name.clone(), entry.name.clone());
        manifests.insert(name, rendered);
    }

    Ok(manifests)
}
