//! Read-only access to the bundled install templates
//!
//! Templates are compiled into the binary with `include_str!` and exposed
//! through the [`AssetSource`] trait, which yields a flat walk of a virtual
//! directory tree. The walk includes directory entries (the root `/` first),
//! so consumers must skip entries whose `is_dir` flag is set.
//!
//! # Example
//!
//! ```rust
//! use fluxinstall_core::{AssetSource, EmbeddedAssets};
//!
//! let assets = EmbeddedAssets::new();
//! for entry in assets.walk("/").unwrap() {
//!     if !entry.is_dir {
//!         println!("{} ({} bytes)", entry.name, entry.len());
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Read;

use crate::error::{CoreError, Result};

/// Suffix marking a file as a template
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// The install templates, keyed by their path under the virtual root
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        "flux-account.yaml.tmpl",
        include_str!("../templates/flux-account.yaml.tmpl"),
    ),
    (
        "flux-config.yaml.tmpl",
        include_str!("../templates/flux-config.yaml.tmpl"),
    ),
    (
        "flux-deployment.yaml.tmpl",
        include_str!("../templates/flux-deployment.yaml.tmpl"),
    ),
    (
        "flux-secret.yaml.tmpl",
        include_str!("../templates/flux-secret.yaml.tmpl"),
    ),
    (
        "memcache-dep.yaml.tmpl",
        include_str!("../templates/memcache-dep.yaml.tmpl"),
    ),
    (
        "memcache-svc.yaml.tmpl",
        include_str!("../templates/memcache-svc.yaml.tmpl"),
    ),
];

/// Trait for template corpus providers
///
/// This trait allows for different implementations:
/// - `EmbeddedAssets`: the templates bundled at build time
/// - `MemoryAssets`: in-memory files for testing
pub trait AssetSource: Send + Sync {
    /// List every entry below `root` (inclusive), directories included
    fn walk(&self, root: &str) -> Result<Vec<AssetEntry<'_>>>;
}

/// One entry of an asset walk
#[derive(Debug, Clone)]
pub struct AssetEntry<'a> {
    /// Absolute path under the virtual root (`/` for the root itself)
    pub path: String,
    /// Last path component
    pub name: String,
    /// Directory entries carry no content
    pub is_dir: bool,
    content: &'a [u8],
}

impl<'a> AssetEntry<'a> {
    fn file(path: String, content: &'a [u8]) -> Self {
        let name = base_name(&path).to_string();
        Self {
            path,
            name,
            is_dir: false,
            content,
        }
    }

    fn dir(path: String) -> Self {
        let name = base_name(&path).to_string();
        Self {
            path,
            name,
            is_dir: true,
            content: &[],
        }
    }

    /// Reader over the raw content
    pub fn reader(&self) -> impl Read + 'a {
        self.content
    }

    /// Size of the content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Read the whole content as UTF-8
    pub fn read_to_string(&self) -> Result<String> {
        if self.is_dir {
            return Err(CoreError::AssetRead {
                path: self.path.clone(),
                message: "is a directory".to_string(),
            });
        }

        let mut text = String::with_capacity(self.content.len());
        self.reader()
            .read_to_string(&mut text)
            .map_err(|e| CoreError::AssetRead {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(text)
    }
}

/// The template corpus compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    pub fn new() -> Self {
        Self
    }

    /// Number of bundled files
    pub fn len(&self) -> usize {
        EMBEDDED_TEMPLATES.len()
    }

    pub fn is_empty(&self) -> bool {
        EMBEDDED_TEMPLATES.is_empty()
    }
}

impl AssetSource for EmbeddedAssets {
    fn walk(&self, root: &str) -> Result<Vec<AssetEntry<'_>>> {
        walk_table(
            root,
            EMBEDDED_TEMPLATES
                .iter()
                .map(|&(path, content)| (path, content.as_bytes())),
        )
    }
}

/// In-memory asset provider for testing
///
/// Stores files in memory, allowing the rendering pipeline to run against a
/// substitute corpus.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (path relative to the virtual root, `/` separated)
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files
            .insert(path.trim_start_matches('/').to_string(), content.into());
        self
    }

    /// Add a text file
    pub fn with_text_file(self, path: &str, content: &str) -> Self {
        self.with_file(path, content.as_bytes().to_vec())
    }
}

impl AssetSource for MemoryAssets {
    fn walk(&self, root: &str) -> Result<Vec<AssetEntry<'_>>> {
        walk_table(
            root,
            self.files
                .iter()
                .map(|(path, content)| (path.as_str(), content.as_slice())),
        )
    }
}

fn base_name(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.rsplit('/').next().unwrap_or(path)
}

/// Walk a flat `(relative path, content)` table as a directory tree
///
/// Entries come back in lexical path order, each directory before its
/// contents.
fn walk_table<'a>(
    root: &str,
    files: impl Iterator<Item = (&'a str, &'a [u8])>,
) -> Result<Vec<AssetEntry<'a>>> {
    let prefix = root.trim_matches('/');
    let mut tree: BTreeMap<String, Option<&'a [u8]>> = BTreeMap::new();
    let mut root_is_dir = prefix.is_empty();

    for (path, content) in files {
        let rel = match prefix {
            "" => path,
            p => match path.strip_prefix(p).and_then(|r| r.strip_prefix('/')) {
                Some(rel) => {
                    root_is_dir = true;
                    rel
                }
                None if path == p => {
                    return Err(CoreError::AssetWalk {
                        root: root.to_string(),
                        message: "not a directory".to_string(),
                    });
                }
                None => continue,
            },
        };

        // Register intermediate directories
        let mut dir = String::new();
        let mut components = rel.split('/').peekable();
        while let Some(component) = components.next() {
            if components.peek().is_none() {
                break;
            }
            dir.push('/');
            dir.push_str(component);
            tree.entry(join_root(prefix, &dir)).or_insert(None);
        }

        tree.insert(join_root(prefix, &format!("/{}", rel)), Some(content));
    }

    if !root_is_dir {
        return Err(CoreError::AssetWalk {
            root: root.to_string(),
            message: "no such directory".to_string(),
        });
    }

    let mut entries = Vec::with_capacity(tree.len() + 1);
    entries.push(AssetEntry::dir(join_root(prefix, "")));
    for (path, content) in tree {
        entries.push(match content {
            Some(content) => AssetEntry::file(path, content),
            None => AssetEntry::dir(path),
        });
    }

    Ok(entries)
}

fn join_root(prefix: &str, rel: &str) -> String {
    match (prefix, rel) {
        ("", "") => "/".to_string(),
        ("", rel) => rel.to_string(),
        (prefix, rel) => format!("/{}{}", prefix, rel),
    }
}
