//! Site configuration
//!
//! Loaded from `observatory.toml`:
//!
//! ```toml
//! [site]
//! title = "Pakistan Economic Observatory"
//!
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [reveal]
//! threshold = 0.15
//! root_margin = "0px"
//!
//! [[routes]]
//! path = "/"
//! label = "Project Brief"
//! icon = "compass"
//!
//! [[pages]]
//! path = "/"
//!
//! [[pages.sections]]
//! id = "hero"
//! height = 720
//! threshold = 0.05
//! ```
//!
//! Every table is optional; missing ones fall back to [`SiteConfig::default`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::nav::{NavIcon, NavRoute};
use crate::page::{PageSpec, SectionSpec};
use crate::reveal::RevealOptions;

/// Default config file name
pub const CONFIG_FILE: &str = "observatory.toml";

/// Complete site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteMetadata,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Defaults for every section without its own overrides
    #[serde(default)]
    pub reveal: RevealOptions,
    #[serde(default = "default_routes")]
    pub routes: Vec<NavRoute>,
    #[serde(default = "default_pages")]
    pub pages: Vec<PageSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    "Pakistan Economic Observatory".to_string()
}

/// Size of the simulated browser window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    800.0
}

fn default_routes() -> Vec<NavRoute> {
    vec![
        NavRoute::new("/", "Project Brief", NavIcon::Compass),
        NavRoute::new("/visualization", "Visualization", NavIcon::Activity),
        NavRoute::new("/team", "Team", NavIcon::UsersRound),
    ]
}

fn default_pages() -> Vec<PageSpec> {
    vec![PageSpec::new("/")
        .section(SectionSpec::new("hero", 720.0).threshold(0.05))
        .section(SectionSpec::new("capability", 640.0))
        .section(SectionSpec::new("pipeline", 560.0))
        .section(SectionSpec::new("provenance", 520.0))
        .section(SectionSpec::new("narratives", 600.0))
        .section(SectionSpec::new("submission", 420.0))]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteMetadata::default(),
            viewport: ViewportConfig::default(),
            reveal: RevealOptions::default(),
            routes: default_routes(),
            pages: default_pages(),
        }
    }
}

impl SiteConfig {
    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|source| SiteError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sections configured for `path`
    pub fn page(&self, path: &str) -> Option<&PageSpec> {
        self.pages.iter().find(|p| p.path == path)
    }

    /// Check the rules serde cannot express
    pub fn validate(&self) -> Result<()> {
        let ViewportConfig { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(invalid(format!("viewport must be positive, got {width}x{height}")));
        }

        self.reveal
            .observer_init()
            .map_err(|err| invalid(format!("[reveal]: {err}")))?;

        let mut seen = HashSet::new();
        for route in &self.routes {
            check_path(&route.path, "route")?;
            if route.label.trim().is_empty() {
                return Err(invalid(format!("route {} has an empty label", route.path)));
            }
            if !seen.insert(route.path.as_str()) {
                return Err(invalid(format!("duplicate route path {}", route.path)));
            }
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            check_path(&page.path, "page")?;
            if !seen.insert(page.path.as_str()) {
                return Err(invalid(format!("duplicate page path {}", page.path)));
            }

            let mut ids = HashSet::new();
            for section in &page.sections {
                if !ids.insert(section.id.as_str()) {
                    return Err(invalid(format!(
                        "page {} repeats section id {}",
                        page.path, section.id
                    )));
                }
                if !(section.height.is_finite() && section.height > 0.0) {
                    return Err(invalid(format!(
                        "section {}#{} has non-positive height {}",
                        page.path, section.id, section.height
                    )));
                }
                section
                    .reveal_options(&self.reveal)
                    .observer_init()
                    .map_err(|err| {
                        invalid(format!("section {}#{}: {err}", page.path, section.id))
                    })?;
            }
        }

        Ok(())
    }
}

fn check_path(path: &str, what: &str) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(invalid(format!("{what} path {path:?} must start with '/'")))
    }
}

fn invalid(message: String) -> SiteError {
    SiteError::InvalidConfig(message)
}
