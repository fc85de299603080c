use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stackscope_dump::{DurationFilter, Environment};
use stackscope_highlight::{MarkupOptions, RenderOptions};
use std::path::Path;
use std::time::Duration;

pub const ENV_ROOT: &str = "STACKSCOPE_ROOT";
pub const ENV_GOROOT: &str = "STACKSCOPE_GOROOT";
pub const ENV_GOPATH: &str = "STACKSCOPE_GOPATH";
pub const ENV_MARKUP_LIMIT: &str = "STACKSCOPE_MARKUP_LIMIT";
pub const ENV_WRAP: &str = "STACKSCOPE_WRAP";

/// Markup section; highlighting is off unless a wrap size is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub limit: usize,
    pub wrap_size: i32,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            wrap_size: -1,
        }
    }
}

/// Blocked-duration bounds, in whole minutes as printed by the runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_minutes: Option<u64>,
    pub max_minutes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Roots of the local checkout used for highlighting
    pub local: Environment,

    /// Roots as seen by the process that produced the dump
    pub remote: Environment,

    pub markup: MarkupConfig,
    pub filter: FilterConfig,
    pub tab_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local: Environment::default(),
            remote: Environment::default(),
            markup: MarkupConfig::default(),
            filter: FilterConfig::default(),
            tab_width: RenderOptions::default().tab_width,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid stackscope config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Override file values with `STACKSCOPE_*` variables resolved by `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(root) = var(ENV_ROOT) {
            self.local.root = root;
        }
        if let Some(goroot) = var(ENV_GOROOT) {
            self.local.goroot = goroot;
        }
        if let Some(gopath) = var(ENV_GOPATH) {
            self.local.gopath = gopath;
        }
        if let Some(limit) = var(ENV_MARKUP_LIMIT) {
            self.markup.limit = limit
                .parse()
                .with_context(|| format!("{ENV_MARKUP_LIMIT}={limit} is not a count"))?;
        }
        if let Some(wrap) = var(ENV_WRAP) {
            self.markup.wrap_size = wrap
                .parse()
                .with_context(|| format!("{ENV_WRAP}={wrap} is not a line count"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (section, env) in [("local", &self.local), ("remote", &self.remote)] {
            for (name, prefix) in [
                ("root", &env.root),
                ("goroot", &env.goroot),
                ("gopath", &env.gopath),
            ] {
                if !prefix.is_empty() && !Path::new(prefix).has_root() {
                    anyhow::bail!("{section}.{name} must be an absolute path, got {prefix:?}");
                }
            }
        }
        if let FilterConfig {
            min_minutes: Some(min),
            max_minutes: Some(max),
        } = self.filter
        {
            if min > max {
                anyhow::bail!("filter.min_minutes ({min}) exceeds filter.max_minutes ({max})");
            }
        }
        self.render_options()
            .validate()
            .map_err(anyhow::Error::msg)?;
        Ok(())
    }

    /// Local roots, normalized
    pub fn local_env(&self) -> Environment {
        self.local.clone().normalized()
    }

    /// Remote roots, falling back to the local ones where unset
    pub fn remote_env(&self) -> Environment {
        self.remote.clone().normalized().with_defaults(&self.local_env())
    }

    pub fn markup_options(&self) -> MarkupOptions {
        MarkupOptions::new(self.markup.limit, self.markup.wrap_size)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            tab_width: self.tab_width,
            ..RenderOptions::default()
        }
    }

    pub fn duration_filter(&self) -> DurationFilter {
        let minutes = |m: u64| Duration::from_secs(m.saturating_mul(60));
        DurationFilter::new(
            self.filter.min_minutes.map(minutes),
            self.filter.max_minutes.map(minutes),
        )
    }
}
