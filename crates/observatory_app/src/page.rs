//! Page sections
//!
//! A page is a vertical stack of sections laid out below the navigation
//! header. Each section gets its own element and its own [`RevealTracker`].

use observatory_core::Rect;
use observatory_layout::{ElementId, Host, LayoutError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reveal::{RevealOptions, RevealTracker};

/// Height of the fixed navigation header; sections start below it
pub const HEADER_HEIGHT: f32 = 64.0;

/// One revealable block of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    pub height: f32,
    /// Overrides the site-wide reveal threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    /// Overrides the site-wide root margin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_margin: Option<String>,
}

impl SectionSpec {
    pub fn new(id: impl Into<String>, height: f32) -> Self {
        Self {
            id: id.into(),
            height,
            threshold: None,
            root_margin: None,
        }
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = Some(root_margin.into());
        self
    }

    /// Site defaults with this section's overrides applied
    pub fn reveal_options(&self, defaults: &RevealOptions) -> RevealOptions {
        RevealOptions {
            threshold: self.threshold.unwrap_or(defaults.threshold),
            root_margin: self
                .root_margin
                .clone()
                .unwrap_or_else(|| defaults.root_margin.clone()),
        }
    }
}

/// Sections shown for one route path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub path: String,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

impl PageSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }

    /// Total height of the stacked sections
    pub fn height(&self) -> f32 {
        self.sections.iter().map(|s| s.height).sum()
    }
}

/// Reveal flag of one mounted section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionVisibility {
    pub id: String,
    /// `None` until the first frame after mounting
    pub visible: Option<bool>,
}

#[derive(Debug)]
struct MountedSection {
    id: String,
    element: ElementId,
    tracker: RevealTracker,
}

/// Sections of the current page, mounted into a host
#[derive(Debug)]
pub struct MountedPage {
    path: String,
    sections: Vec<MountedSection>,
}

impl MountedPage {
    /// Mount `page`'s sections below the header and start tracking them
    ///
    /// `None` mounts an empty page. If a tracker cannot start, everything
    /// mounted so far is torn down before the error is returned.
    pub fn mount(
        host: &mut Host,
        path: &str,
        page: Option<&PageSpec>,
        defaults: &RevealOptions,
    ) -> Result<Self, LayoutError> {
        let mut mounted = Self {
            path: path.to_string(),
            sections: Vec::new(),
        };
        let Some(page) = page else {
            debug!(%path, "no sections configured");
            return Ok(mounted);
        };

        let (width, _) = host.viewport().size();
        let mut y = HEADER_HEIGHT;
        for spec in &page.sections {
            let element = host.mount_element(
                format!("{}#{}", page.path, spec.id),
                Rect::new(0.0, y, width, spec.height),
            );
            y += spec.height;

            let mut tracker = RevealTracker::new(spec.reveal_options(defaults));
            tracker.attach(element);
            let started = tracker.mount(host);
            mounted.sections.push(MountedSection {
                id: spec.id.clone(),
                element,
                tracker,
            });
            if let Err(err) = started {
                mounted.unmount(host);
                return Err(err);
            }
        }

        debug!(%path, sections = mounted.sections.len(), "page mounted");
        Ok(mounted)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Element of the section with the given id
    pub fn element(&self, id: &str) -> Option<ElementId> {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.element)
    }

    /// Reveal flag per section, in page order
    pub fn visibility(&self, host: &Host) -> Vec<SectionVisibility> {
        self.sections
            .iter()
            .map(|s| SectionVisibility {
                id: s.id.clone(),
                visible: s.tracker.is_visible(host),
            })
            .collect()
    }

    /// Stop every tracker, then remove the section elements
    pub fn unmount(&mut self, host: &mut Host) {
        for mut section in self.sections.drain(..) {
            section.tracker.unmount(host);
            host.unmount_element(section.element);
        }
        debug!(path = %self.path, "page unmounted");
    }
}
