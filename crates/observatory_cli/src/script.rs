//! Scripted session steps for `observatory simulate`

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use observatory_app::{SiteApp, SiteSnapshot};

/// One user action
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `nav:/path` - push a location
    Navigate(String),
    /// `link:N` - click the Nth nav link
    Follow(usize),
    /// `brand` - click the brand link
    Brand,
    /// `scroll:DY` - scroll by DY pixels
    Scroll(f32),
    Back,
    Forward,
    /// `frame` - let a frame pass without input
    Frame,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (s, None),
        };

        let step = match (verb, arg) {
            ("nav", Some(path)) => Step::Navigate(path.to_string()),
            ("link", Some(index)) => Step::Follow(
                index
                    .parse()
                    .with_context(|| format!("invalid link index '{index}'"))?,
            ),
            ("scroll", Some(dy)) => Step::Scroll(
                dy.parse()
                    .with_context(|| format!("invalid scroll amount '{dy}'"))?,
            ),
            ("brand", None) => Step::Brand,
            ("back", None) => Step::Back,
            ("forward", None) => Step::Forward,
            ("frame", None) => Step::Frame,
            _ => bail!(
                "unknown step '{s}' (expected nav:/path, link:N, scroll:DY, brand, back, forward or frame)"
            ),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Navigate(path) => write!(f, "nav:{path}"),
            Step::Follow(index) => write!(f, "link:{index}"),
            Step::Brand => f.write_str("brand"),
            Step::Scroll(dy) => write!(f, "scroll:{dy}"),
            Step::Back => f.write_str("back"),
            Step::Forward => f.write_str("forward"),
            Step::Frame => f.write_str("frame"),
        }
    }
}

impl Step {
    /// Apply the step and run one frame
    pub fn run(&self, app: &mut SiteApp) -> Result<SiteSnapshot> {
        match self {
            Step::Navigate(path) => app.navigate(path),
            Step::Follow(index) => {
                if !app.follow(*index) {
                    tracing::warn!(index, "no nav link at index");
                }
            }
            Step::Brand => app.follow_brand(),
            Step::Scroll(dy) => app.scroll_by(*dy),
            Step::Back => {
                app.back();
            }
            Step::Forward => {
                app.forward();
            }
            Step::Frame => {}
        }
        app.frame()?;
        Ok(app.snapshot())
    }
}

/// One line per snapshot
pub fn format_snapshot(step: &Step, snapshot: &SiteSnapshot) -> String {
    let mut line = format!(
        "[{:>3}] {:<16} {:<16} y={:<7} active={}",
        snapshot.frame,
        step.to_string(),
        snapshot.path,
        snapshot.offset.1,
        snapshot.active.as_deref().unwrap_or("-"),
    );
    for section in &snapshot.sections {
        let mark = match section.visible {
            Some(true) => "+",
            Some(false) => "-",
            None => "?",
        };
        line.push_str(&format!(" {mark}{}", section.id));
    }
    line
}
