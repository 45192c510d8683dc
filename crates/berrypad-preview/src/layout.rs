//! Component registry and layout regions.
//!
//! Both are generic over the host's widget handle type `H`; the pipeline
//! never inspects handles, it only hands them back.

use std::collections::BTreeMap;

use smol_str::SmolStr;

/// Name to handle lookup. Names are unique.
#[derive(Debug, Clone)]
pub struct ComponentRegistry<H> {
    components: BTreeMap<SmolStr, H>,
}

impl<H> Default for ComponentRegistry<H> {
    fn default() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }
}

impl<H> ComponentRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `name`. Returns false, leaving the existing
    /// handle in place, if the name is taken.
    pub fn register(&mut self, name: impl Into<SmolStr>, handle: H) -> bool {
        let name = name.into();
        if self.components.contains_key(&name) {
            tracing::debug!(
                target: "berrypad::layout",
                component = %name,
                "component already registered"
            );
            return false;
        }
        self.components.insert(name, handle);
        true
    }

    pub fn get(&self, name: &str) -> Option<&H> {
        self.components.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut H> {
        self.components.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<H> {
        self.components.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Fixed window regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Toolbar,
    Statusbar,
    Sidebar,
    Editor,
    Preview,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Toolbar,
        Region::Statusbar,
        Region::Sidebar,
        Region::Editor,
        Region::Preview,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Toolbar => "toolbar",
            Region::Statusbar => "statusbar",
            Region::Sidebar => "sidebar",
            Region::Editor => "editor",
            Region::Preview => "preview",
        }
    }

    pub fn anchor(self) -> Anchor {
        match self {
            Region::Toolbar => Anchor::Top,
            Region::Statusbar => Anchor::Bottom,
            Region::Sidebar => Anchor::Left,
            Region::Editor => Anchor::MainLeft,
            Region::Preview => Anchor::MainRight,
        }
    }
}

/// Where a region sits in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    MainLeft,
    MainRight,
}

#[derive(Debug, Clone)]
struct Section<H> {
    container: H,
    visible: bool,
}

/// Region containers with visibility.
#[derive(Debug, Clone)]
pub struct Layout<H> {
    sections: BTreeMap<Region, Section<H>>,
}

impl<H> Default for Layout<H> {
    fn default() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }
}

impl<H> Layout<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `container` for `region`, visible. Returns the replaced one.
    pub fn add(&mut self, region: Region, container: H) -> Option<H> {
        self.sections
            .insert(
                region,
                Section {
                    container,
                    visible: true,
                },
            )
            .map(|old| old.container)
    }

    pub fn container(&self, region: Region) -> Option<&H> {
        self.sections.get(&region).map(|s| &s.container)
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.sections.get(&region).is_some_and(|s| s.visible)
    }

    /// Set visibility. Returns false if the region has no container.
    pub fn set_visible(&mut self, region: Region, visible: bool) -> bool {
        match self.sections.get_mut(&region) {
            Some(section) => {
                section.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn show(&mut self, region: Region) -> bool {
        self.set_visible(region, true)
    }

    pub fn hide(&mut self, region: Region) -> bool {
        self.set_visible(region, false)
    }

    /// Flip the preview region, returning its new visibility.
    pub fn toggle_preview(&mut self) -> bool {
        let visible = !self.is_visible(Region::Preview);
        self.set_visible(Region::Preview, visible);
        self.is_visible(Region::Preview)
    }

    /// Visible regions in display order.
    pub fn visible_regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.sections
            .iter()
            .filter(|(_, s)| s.visible)
            .map(|(region, _)| *region)
    }
}
