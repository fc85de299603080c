use crate::error::{DumpError, Result};
use crate::types::FileLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefix of cgo-generated sources, reported verbatim by the runtime
pub const GENERATED_MARKER: &str = "_cgo_";

/// Source tree a file path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RootKind {
    /// Project sources
    #[serde(rename = "PROJECT")]
    Project,
    /// Language runtime (GOROOT)
    #[serde(rename = "GOROOT")]
    Runtime,
    /// Dependency cache (GOPATH)
    #[serde(rename = "GOPATH")]
    Library,
    /// Generated cgo glue, never resolved against a root
    #[serde(rename = "CGO")]
    Generated,
}

impl RootKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RootKind::Project => "PROJECT",
            RootKind::Runtime => "GOROOT",
            RootKind::Library => "GOPATH",
            RootKind::Generated => "CGO",
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute path prefixes that can contain Go source files.
///
/// [`Environment::new`] normalizes prefixes: cleaned, forward-slashed and
/// terminated by `/`. Fields set directly or deserialized are used as given;
/// call [`Environment::normalized`] on them first. Either way a prefix only
/// matches whole directories. An empty prefix is "not configured" and never
/// matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Project source root
    #[serde(default)]
    pub root: String,
    /// GOROOT
    #[serde(default)]
    pub goroot: String,
    /// GOPATH
    #[serde(default)]
    pub gopath: String,
}

impl Environment {
    /// Create a normalized environment
    pub fn new(
        root: impl Into<String>,
        goroot: impl Into<String>,
        gopath: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            goroot: goroot.into(),
            gopath: gopath.into(),
        }
        .normalized()
    }

    /// Environment with only the project root configured
    pub fn project(root: impl Into<String>) -> Self {
        Self::new(root, "", "")
    }

    /// Returns a copy with every prefix passed through [`normalize_path`]
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            root: normalize_path(&self.root),
            goroot: normalize_path(&self.goroot),
            gopath: normalize_path(&self.gopath),
        }
    }

    /// Fill unset prefixes from `defaults`
    #[must_use]
    pub fn with_defaults(mut self, defaults: &Environment) -> Self {
        if self.root.is_empty() {
            self.root = defaults.root.clone();
        }
        if self.goroot.is_empty() {
            self.goroot = defaults.goroot.clone();
        }
        if self.gopath.is_empty() {
            self.gopath = defaults.gopath.clone();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.goroot.is_empty() && self.gopath.is_empty()
    }

    /// Configured prefix for `kind`; empty for generated sources
    pub fn root_path(&self, kind: RootKind) -> &str {
        match kind {
            RootKind::Project => &self.root,
            RootKind::Runtime => &self.goroot,
            RootKind::Library => &self.gopath,
            RootKind::Generated => "",
        }
    }

    /// Classify an absolute path into its root kind and root-relative path.
    ///
    /// Generated paths are kept verbatim. Otherwise the project, runtime and
    /// library prefixes are tried in that order and the first match is stripped.
    pub fn classify(&self, path: &str) -> Result<(RootKind, String)> {
        if path.starts_with(GENERATED_MARKER) {
            return Ok((RootKind::Generated, path.to_string()));
        }
        for kind in [RootKind::Project, RootKind::Runtime, RootKind::Library] {
            let prefix = self.root_path(kind);
            if prefix.is_empty() {
                continue;
            }
            if let Some(rest) = strip_root(path, prefix) {
                return Ok((kind, rest.trim_start_matches('/').to_string()));
            }
        }
        Err(DumpError::UnknownRoot(path.to_string()))
    }

    /// Local path of a classified location
    pub fn resolve(&self, location: &FileLocation) -> String {
        let prefix = self.root_path(location.root);
        if prefix.is_empty() {
            return location.file.clone();
        }
        let file = location.file.trim_start_matches('/');
        if prefix.ends_with('/') {
            format!("{prefix}{file}")
        } else {
            format!("{prefix}/{file}")
        }
    }
}

/// `path` below the directory `prefix`, which need not end in `/`
fn strip_root<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(prefix)?;
    if prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Clean `path` lexically, convert backslashes to slashes and append a
/// trailing slash. Empty input stays empty.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let slashed = path.replace('\\', "/");
    let absolute = slashed.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in slashed.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{joined}/"),
        (false, true) => "./".to_string(),
        (false, false) => format!("{joined}/"),
    }
}
