//! Route classification shared by the edge and client tiers.
//!
//! Both tiers must classify a path identically: divergence produces redirect
//! loops (one tier sends the caller somewhere the other tier bounces back)
//! or bypasses. They therefore both call [`RouteRules::classify`] and never
//! carry their own copy of the tables.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Coarse class of a request path. Derived per request, never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    Public,
    OnboardingFlow,
    SuspendedNotice,
    Protected,
}

impl RouteClass {
    /// Only protected routes are subject to credential and status checks.
    pub fn is_gated(&self) -> bool {
        matches!(self, RouteClass::Protected)
    }
}

/// Route tables driving classification and redirect targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRules {
    /// Paths that are public only when matched exactly (e.g. `/`).
    pub public_paths: Vec<String>,
    /// Subtrees that are public in full (assets, proxy API routes).
    pub public_prefixes: Vec<String>,
    /// Root of the onboarding flow; also the redirect target for accounts
    /// that still need setup.
    pub onboarding_prefix: String,
    pub setup_fee_path: String,
    pub suspended_path: String,
    /// Page that starts an external payment; the client gate never blocks it.
    pub subscribe_path: String,
    /// Protected entry point reached once activation completes.
    pub entry_path: String,
    /// Safe default for every fail-closed redirect.
    pub fallback_path: String,
    /// Protected subtrees blocked for accounts that have not paid yet.
    pub payment_gated_prefixes: Vec<String>,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            public_paths: vec![
                "/".to_string(),
                "/login".to_string(),
                "/register".to_string(),
                "/forgot-password".to_string(),
                "/reset-password".to_string(),
                "/health".to_string(),
                "/favicon.ico".to_string(),
            ],
            public_prefixes: vec![
                "/api".to_string(),
                "/assets".to_string(),
                "/static".to_string(),
            ],
            onboarding_prefix: "/onboarding".to_string(),
            setup_fee_path: "/onboarding/setup-fee".to_string(),
            suspended_path: "/suspended".to_string(),
            subscribe_path: "/subscribe".to_string(),
            entry_path: "/dashboard".to_string(),
            fallback_path: "/".to_string(),
            payment_gated_prefixes: vec!["/dashboard".to_string()],
        }
    }
}

impl RouteRules {
    /// Classify a literal request path. Pure function of `path` and the tables.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize(path);
        let path = path.as_str();

        if self.public_paths.iter().any(|p| normalize(p) == path) {
            return RouteClass::Public;
        }
        if within(path, &self.onboarding_prefix) {
            return RouteClass::OnboardingFlow;
        }
        if within(path, &self.suspended_path) {
            return RouteClass::SuspendedNotice;
        }
        if self.public_prefixes.iter().any(|p| within(path, p)) {
            return RouteClass::Public;
        }
        RouteClass::Protected
    }

    /// Whether `path` falls inside a subtree blocked for unpaid accounts.
    pub fn is_payment_gated(&self, path: &str) -> bool {
        let path = normalize(path);
        self.payment_gated_prefixes.iter().any(|p| within(&path, p))
    }

    pub fn is_subscribe_path(&self, path: &str) -> bool {
        within(&normalize(path), &self.subscribe_path)
    }

    pub fn is_suspended_notice(&self, path: &str) -> bool {
        within(&normalize(path), &self.suspended_path)
    }
}

/// Classify with the built-in tables.
pub fn classify_route(path: &str) -> RouteClass {
    static DEFAULT_RULES: OnceLock<RouteRules> = OnceLock::new();
    DEFAULT_RULES.get_or_init(RouteRules::default).classify(path)
}

/// Canonical form of a request path, the one a downstream router would serve:
/// query and fragment stripped, empty segments collapsed, `.` and `..`
/// (including their `%2e` spellings) resolved. Always starts with `/`.
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let mut segments: Vec<&str> = Vec::new();
    for segment in path[..end].split('/') {
        match dot_segment(segment) {
            Some(DotSegment::Current) => {}
            Some(DotSegment::Parent) => {
                segments.pop();
            }
            None if segment.is_empty() => {}
            None => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

enum DotSegment {
    Current,
    Parent,
}

fn dot_segment(segment: &str) -> Option<DotSegment> {
    let is_dot = |s: &str| s == "." || s.eq_ignore_ascii_case("%2e");
    if is_dot(segment) {
        return Some(DotSegment::Current);
    }
    let parent = ["..", ".%2e", "%2e.", "%2e%2e"];
    parent
        .iter()
        .any(|p| segment.eq_ignore_ascii_case(p))
        .then_some(DotSegment::Parent)
}

/// Segment-aware prefix match: `/dashboard` covers `/dashboard/x` but not `/dashboards`.
fn within(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_tables_classify_known_paths() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("/"), RouteClass::Public);
        assert_eq!(rules.classify("/login"), RouteClass::Public);
        assert_eq!(rules.classify("/api/shipments/42"), RouteClass::Public);
        assert_eq!(rules.classify("/onboarding"), RouteClass::OnboardingFlow);
        assert_eq!(rules.classify("/onboarding/setup-fee"), RouteClass::OnboardingFlow);
        assert_eq!(rules.classify("/suspended"), RouteClass::SuspendedNotice);
        assert_eq!(rules.classify("/dashboard/anything"), RouteClass::Protected);
        assert_eq!(rules.classify("/subscribe"), RouteClass::Protected);
        assert_eq!(rules.classify("/account/profile"), RouteClass::Protected);
    }

    #[test]
    fn exact_public_paths_do_not_cover_subtrees() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("/login/../dashboard"), RouteClass::Protected);
        assert_eq!(rules.classify("/health/details"), RouteClass::Protected);
    }

    #[test]
    fn prefixes_match_whole_segments_only() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("/onboardingx"), RouteClass::Protected);
        assert_eq!(rules.classify("/apis"), RouteClass::Protected);
        assert!(rules.is_payment_gated("/dashboard"));
        assert!(rules.is_payment_gated("/dashboard/billing"));
        assert!(!rules.is_payment_gated("/dashboards"));
    }

    #[test]
    fn query_fragment_and_trailing_slash_are_ignored() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("/suspended/"), RouteClass::SuspendedNotice);
        assert_eq!(rules.classify("/login?next=/dashboard"), RouteClass::Public);
        assert_eq!(rules.classify("/onboarding#step-2"), RouteClass::OnboardingFlow);
        assert_eq!(rules.classify(""), RouteClass::Public);
        assert!(rules.is_subscribe_path("/subscribe?plan=pro"));
    }

    #[test]
    fn dot_segments_cannot_escape_into_public_or_onboarding_subtrees() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("/api/../dashboard/billing"), RouteClass::Protected);
        assert_eq!(rules.classify("/onboarding/../dashboard/billing"), RouteClass::Protected);
        assert_eq!(rules.classify("/assets/./../settings"), RouteClass::Protected);
        assert_eq!(rules.classify("/api/%2e%2e/dashboard"), RouteClass::Protected);
        assert_eq!(rules.classify("/static/.%2E/suspended"), RouteClass::SuspendedNotice);
        assert!(rules.is_payment_gated("/onboarding/../dashboard/billing"));
        assert!(rules.is_payment_gated("/api/../dashboard"));
    }

    #[test]
    fn doubled_slashes_are_collapsed_before_matching() {
        let rules = RouteRules::default();
        assert_eq!(rules.classify("//dashboard/billing"), RouteClass::Protected);
        assert!(rules.is_payment_gated("//dashboard/billing"));
        assert!(rules.is_payment_gated("/dashboard//billing"));
        assert_eq!(rules.classify("//onboarding///setup-fee"), RouteClass::OnboardingFlow);
        assert_eq!(normalize("/a//b/./c/../d/"), "/a/b/d");
        assert_eq!(normalize("/../.."), "/");
    }

    #[test]
    fn free_function_uses_default_tables() {
        assert_eq!(classify_route("/dashboard"), RouteClass::Protected);
        assert_eq!(classify_route("/suspended"), RouteClass::SuspendedNotice);
    }

    proptest! {
        /// Classification is deterministic and agrees between the free function
        /// and the default tables for arbitrary path strings.
        #[test]
        fn classification_is_a_pure_function(path in "(/[a-z\\-]{0,12}){0,4}[/?#]?[a-z=]{0,6}") {
            let rules = RouteRules::default();
            prop_assert_eq!(rules.classify(&path), rules.classify(&path));
            prop_assert_eq!(rules.classify(&path), classify_route(&path));
        }

        /// A path classifies exactly like its canonical form, and the
        /// canonical form has no empty or dot segments left.
        #[test]
        fn classification_matches_canonical_form(path in "(/{1,2}(\\.{1,2}|[a-z\\-]{1,10})){0,6}/?") {
            let rules = RouteRules::default();
            let canonical = normalize(&path);
            prop_assert_eq!(rules.classify(&path), rules.classify(&canonical));
            prop_assert_eq!(rules.is_payment_gated(&path), rules.is_payment_gated(&canonical));
            prop_assert!(!canonical.contains("//"));
            prop_assert!(canonical.split('/').all(|seg| seg != "." && seg != ".."));
        }

        /// Anything below the dashboard is gated and classified as protected.
        #[test]
        fn dashboard_subtree_is_protected_and_payment_gated(rest in "(/[a-z0-9]{1,8}){0,4}") {
            let rules = RouteRules::default();
            let path = format!("/dashboard{rest}");
            prop_assert_eq!(rules.classify(&path), RouteClass::Protected);
            prop_assert!(rules.is_payment_gated(&path));
        }
    }
}
