//! Site adapters: per-site navigation and extraction rules
//!
//! The adapter set is closed. Each [`SiteId`] maps to one static
//! [`SiteAdapter`], and an [`AdapterRegistry`] maps target hosts to site ids.

mod avenue;
mod dealabs;
mod registry;
mod vinted;

pub use avenue::AvenueDeLaBrique;
pub use dealabs::Dealabs;
pub use registry::AdapterRegistry;
pub use vinted::Vinted;

use crate::extract::ExtractContext;
use crate::model::{DealRecord, PageKind};
use scraper::Html;
use std::fmt;
use url::Url;

/// How a site's pages must be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Needs a full browser session (client-side rendering, bot checks)
    Browser,

    /// Server-rendered markup, a plain HTTP GET is enough
    Static,
}

/// Site-specific navigation and extraction rules
pub trait SiteAdapter: Send + Sync {
    fn id(&self) -> SiteId;

    /// Classifies a target URL of this site
    fn page_kind(&self, url: &Url) -> PageKind;

    fn render_mode(&self) -> RenderMode;

    /// Selector whose presence means the page content has rendered
    fn ready_selector(&self, kind: PageKind) -> &'static str;

    /// Selector of a cookie-consent button to dismiss, if the site shows one
    fn consent_selector(&self) -> Option<&'static str> {
        None
    }

    /// Whether titles must contain the configured keyword
    fn filters_by_keyword(&self) -> bool {
        true
    }

    /// Maps a parsed page to candidate records
    ///
    /// Implementations skip cards missing a link or a price; the caller applies
    /// the remaining acceptance rules.
    fn extract(&self, document: &Html, kind: PageKind, ctx: &ExtractContext<'_>) -> Vec<DealRecord>;

    /// Navigation steps for a page of the given kind
    fn navigation_plan(&self, kind: PageKind) -> NavigationPlan {
        NavigationPlan {
            kind,
            ready_selector: self.ready_selector(kind),
            consent_selector: self.consent_selector(),
            scroll: kind == PageKind::Listing,
        }
    }
}

/// What the browser driver must do after navigating to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPlan {
    pub kind: PageKind,
    pub ready_selector: &'static str,
    pub consent_selector: Option<&'static str>,

    /// Scroll to trigger lazy loading before reading the content
    pub scroll: bool,
}

/// Identity of a supported site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteId {
    Dealabs,
    Vinted,
    AvenueDeLaBrique,
}

impl SiteId {
    pub const ALL: [SiteId; 3] = [SiteId::Dealabs, SiteId::Vinted, SiteId::AvenueDeLaBrique];

    /// Name used in config files and in the `source` field of records
    pub fn name(&self) -> &'static str {
        match self {
            SiteId::Dealabs => "dealabs",
            SiteId::Vinted => "vinted",
            SiteId::AvenueDeLaBrique => "avenuedelabrique",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|site| site.name() == name)
    }

    /// Host patterns served by this site
    pub fn default_domains(&self) -> &'static [&'static str] {
        match self {
            SiteId::Dealabs => &["*.dealabs.com"],
            SiteId::Vinted => &["*.vinted.fr"],
            SiteId::AvenueDeLaBrique => &["*.avenuedelabrique.com"],
        }
    }

    pub fn adapter(&self) -> &'static dyn SiteAdapter {
        match self {
            SiteId::Dealabs => &Dealabs,
            SiteId::Vinted => &Vinted,
            SiteId::AvenueDeLaBrique => &AvenueDeLaBrique,
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
