//! Module access grants and the `has_access` predicate.

use std::collections::BTreeSet;

use serde::Serialize;

use tollgate_core::{ModuleAccess, ModuleId};

/// Where a grant came from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// Embedded in the credential; resolved with no network cost.
    Embedded,
    /// Fetched from the permission oracle.
    Oracle,
    /// No usable source; the grant is empty.
    #[default]
    Unavailable,
}

/// The set of feature modules one account may use.
///
/// An empty grant means "no access", never "unknown, so allow".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessGrant {
    modules: BTreeSet<ModuleId>,
    names: Vec<String>,
    source: GrantSource,
}

impl AccessGrant {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn embedded(modules: impl IntoIterator<Item = ModuleId>) -> Self {
        Self {
            modules: modules.into_iter().collect(),
            names: Vec::new(),
            source: GrantSource::Embedded,
        }
    }

    pub fn from_oracle(access: ModuleAccess) -> Self {
        Self {
            modules: access.access.into_iter().collect(),
            names: access.access_names,
            source: GrantSource::Oracle,
        }
    }

    pub fn contains(&self, module: ModuleId) -> bool {
        self.modules.contains(&module)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().copied()
    }

    /// Display names reported by the oracle, if any.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn source(&self) -> GrantSource {
        self.source
    }
}

/// What a guard asks for: one module, or any of several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccessQuery {
    One(ModuleId),
    /// Satisfied when **any** listed module is granted (OR semantics).
    Any(Vec<ModuleId>),
}

impl AccessQuery {
    pub fn is_satisfied_by(&self, grant: &AccessGrant) -> bool {
        match self {
            AccessQuery::One(module) => grant.contains(*module),
            AccessQuery::Any(modules) => modules.iter().any(|m| grant.contains(*m)),
        }
    }
}

impl From<ModuleId> for AccessQuery {
    fn from(value: ModuleId) -> Self {
        AccessQuery::One(value)
    }
}

impl From<u32> for AccessQuery {
    fn from(value: u32) -> Self {
        AccessQuery::One(ModuleId::new(value))
    }
}

impl From<Vec<ModuleId>> for AccessQuery {
    fn from(value: Vec<ModuleId>) -> Self {
        AccessQuery::Any(value)
    }
}

impl From<&[ModuleId]> for AccessQuery {
    fn from(value: &[ModuleId]) -> Self {
        AccessQuery::Any(value.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for AccessQuery {
    fn from(value: [u32; N]) -> Self {
        AccessQuery::Any(value.into_iter().map(ModuleId::new).collect())
    }
}

/// Whether `grant` satisfies `query`.
///
/// - No IO
/// - An empty grant satisfies nothing
/// - An empty `Any` list is never satisfied
pub fn has_access(grant: &AccessGrant, query: impl Into<AccessQuery>) -> bool {
    query.into().is_satisfied_by(grant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[u32]) -> Vec<ModuleId> {
        raw.iter().copied().map(ModuleId::new).collect()
    }

    #[test]
    fn embedded_grant_example() {
        let grant = AccessGrant::embedded(ids(&[1, 3]));
        assert!(has_access(&grant, 1));
        assert!(!has_access(&grant, 2));
        assert!(has_access(&grant, [2, 3]));
        assert_eq!(grant.source(), GrantSource::Embedded);
    }

    #[test]
    fn empty_any_list_is_denied() {
        let grant = AccessGrant::embedded(ids(&[1, 2, 3]));
        assert!(!has_access(&grant, Vec::<ModuleId>::new()));
    }

    #[test]
    fn oracle_grant_keeps_names() {
        let grant = AccessGrant::from_oracle(ModuleAccess {
            access: ids(&[4, 9]),
            access_names: vec!["shipments".into(), "billing".into()],
        });
        assert_eq!(grant.source(), GrantSource::Oracle);
        assert_eq!(grant.names(), ["shipments".to_string(), "billing".to_string()]);
        assert_eq!(grant.modules().collect::<Vec<_>>(), ids(&[4, 9]));
    }

    proptest! {
        /// `has_access(grant, [a, b])` holds exactly when a or b is granted.
        #[test]
        fn any_query_is_a_disjunction(
            granted in prop::collection::btree_set(0u32..16, 0..8),
            a in 0u32..16,
            b in 0u32..16,
        ) {
            let grant = AccessGrant::embedded(granted.iter().copied().map(ModuleId::new));
            let expected = granted.contains(&a) || granted.contains(&b);
            prop_assert_eq!(has_access(&grant, [a, b]), expected);
        }

        /// The empty grant denies every single and multi-module query.
        #[test]
        fn empty_grant_denies_everything(query in prop::collection::vec(any::<u32>(), 0..6)) {
            let grant = AccessGrant::empty();
            prop_assert!(!has_access(&grant, ids(&query)));
            for id in query {
                prop_assert!(!has_access(&grant, id));
            }
        }
    }
}
