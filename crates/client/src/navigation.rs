//! Navigation menu filtering by module grant.
//!
//! Items and groups the grant does not satisfy are removed, not disabled.

use serde::{Deserialize, Serialize};

use tollgate_auth::{AccessGrant, AccessQuery, has_access};
use tollgate_core::ModuleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    /// Any one of these modules makes the item visible; empty means always visible.
    #[serde(default)]
    pub required_access: Vec<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    pub label: String,
    #[serde(default)]
    pub required_access: Vec<ModuleId>,
    pub items: Vec<NavItem>,
}

impl NavItem {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            required_access: Vec::new(),
        }
    }

    pub fn requires(mut self, modules: impl IntoIterator<Item = ModuleId>) -> Self {
        self.required_access = modules.into_iter().collect();
        self
    }
}

impl NavGroup {
    pub fn new(label: impl Into<String>, items: Vec<NavItem>) -> Self {
        Self {
            label: label.into(),
            required_access: Vec::new(),
            items,
        }
    }

    pub fn requires(mut self, modules: impl IntoIterator<Item = ModuleId>) -> Self {
        self.required_access = modules.into_iter().collect();
        self
    }
}

fn visible(grant: &AccessGrant, required: &[ModuleId]) -> bool {
    required.is_empty() || has_access(grant, AccessQuery::from(required))
}

/// Groups and items `grant` may see. A group disappears when its own
/// requirement fails or when none of its items survive.
pub fn filter_navigation(groups: &[NavGroup], grant: &AccessGrant) -> Vec<NavGroup> {
    groups
        .iter()
        .filter(|group| visible(grant, &group.required_access))
        .filter_map(|group| {
            let items: Vec<NavItem> = group
                .items
                .iter()
                .filter(|item| visible(grant, &item.required_access))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| NavGroup {
                items,
                ..group.clone()
            })
        })
        .collect()
}
