//! The node search menu opened by right-clicking the canvas.

use api::Command;
use glam::DVec2;
use log::debug;
use node::{GridCell, NodeType, ScreenPoint};
use std::collections::BTreeMap;
use std::collections::HashSet;

pub const NO_SEARCH_RESULTS: &str = "No search results";

/// One category of the filtered catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuSection {
    pub category: String,
    pub expanded: bool,
    pub entries: Vec<String>,
}

/// What the menu body shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuContents {
    Sections(Vec<MenuSection>),
    /// Nothing matched; render [`NO_SEARCH_RESULTS`].
    NoResults,
}

/// Where to draw the menu so that it stays inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuPlacement {
    /// Top-left corner in screen space.
    pub origin: ScreenPoint,
    /// The menu opens to the left of the cursor.
    pub flip_x: bool,
    /// The menu opens above the cursor.
    pub flip_y: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NodeSearchMenu {
    open: bool,
    anchor: GridCell,
    screen_anchor: ScreenPoint,
    search_term: String,
    /// Categories the user expanded or collapsed by hand since the term last changed.
    toggled: HashSet<String>,
}

impl NodeSearchMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn anchor(&self) -> GridCell {
        self.anchor
    }

    pub fn screen_anchor(&self) -> ScreenPoint {
        self.screen_anchor
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn open(&mut self, anchor: GridCell, screen_anchor: ScreenPoint) {
        debug!("search menu opened at {anchor:?}");
        self.open = true;
        self.anchor = anchor;
        self.screen_anchor = screen_anchor;
        self.search_term.clear();
        self.toggled.clear();
    }

    pub fn close(&mut self) {
        if self.open {
            debug!("search menu closed");
        }
        self.open = false;
        self.search_term.clear();
        self.toggled.clear();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.toggled.clear();
        }
    }

    /// Flip a section against its automatic expansion state.
    pub fn toggle_section(&mut self, category: &str) {
        if !self.toggled.remove(category) {
            self.toggled.insert(category.to_string());
        }
    }

    /// Filter and group the catalog for the current search term.
    ///
    /// Sections keep the catalog's category order. With an empty term every
    /// entry is listed and every section starts collapsed; otherwise only
    /// names containing the term (case-insensitively) are kept and their
    /// sections are expanded.
    pub fn contents(&self, catalog: &[NodeType]) -> MenuContents {
        let term = self.search_term.to_lowercase();
        let mut order: Vec<&str> = Vec::new();
        let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for node_type in catalog {
            if !term.is_empty() && !node_type.name.to_lowercase().contains(&term) {
                continue;
            }
            let category = node_type.category.as_str();
            let entries = grouped.entry(category).or_insert_with(|| {
                order.push(category);
                Vec::new()
            });
            entries.push(node_type.name.clone());
        }

        if order.is_empty() {
            return MenuContents::NoResults;
        }

        let sections = order
            .into_iter()
            .map(|category| {
                let auto_expanded = !term.is_empty();
                MenuSection {
                    category: category.to_string(),
                    expanded: auto_expanded != self.toggled.contains(category),
                    entries: grouped.remove(category).unwrap_or_default(),
                }
            })
            .collect();
        MenuContents::Sections(sections)
    }

    /// Position the menu next to its anchor, flipping an axis when the menu
    /// would overflow `canvas_size` on that side.
    pub fn placement(&self, canvas_size: DVec2, menu_size: DVec2) -> MenuPlacement {
        let anchor = self.screen_anchor.0;
        let flip_x = anchor.x + menu_size.x > canvas_size.x;
        let flip_y = anchor.y + menu_size.y > canvas_size.y;
        let origin = DVec2::new(
            if flip_x { anchor.x - menu_size.x } else { anchor.x },
            if flip_y { anchor.y - menu_size.y } else { anchor.y },
        );
        MenuPlacement {
            origin: ScreenPoint(origin),
            flip_x,
            flip_y,
        }
    }

    /// Create `type_name` at the anchor cell and close.
    pub fn select(&mut self, type_name: &str) -> Vec<Command> {
        if !self.open {
            return Vec::new();
        }
        let command = Command::CreateNode {
            type_name: type_name.to_string(),
            x: self.anchor.x(),
            y: self.anchor.y(),
        };
        self.close();
        vec![command]
    }
}
