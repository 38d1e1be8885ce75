use serde::Serialize;

use tollgate_auth::{AccessGrant, AccessQuery};

/// Page-level guard result: render the page, or a denial panel naming what
/// was required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum PageAccess {
    Render,
    Denied { required: AccessQuery },
}

impl PageAccess {
    pub fn is_render(&self) -> bool {
        matches!(self, PageAccess::Render)
    }
}

pub fn guard_page(grant: &AccessGrant, required: impl Into<AccessQuery>) -> PageAccess {
    let required = required.into();
    if required.is_satisfied_by(grant) {
        PageAccess::Render
    } else {
        PageAccess::Denied { required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::ModuleId;

    #[test]
    fn renders_when_any_required_module_is_granted() {
        let grant = AccessGrant::embedded([ModuleId::new(2), ModuleId::new(7)]);
        assert!(guard_page(&grant, 7u32).is_render());
        assert!(guard_page(&grant, [1u32, 2]).is_render());
    }

    #[test]
    fn denial_carries_the_requirement() {
        let grant = AccessGrant::embedded([ModuleId::new(2)]);
        assert_eq!(
            guard_page(&grant, [4u32, 5]),
            PageAccess::Denied {
                required: AccessQuery::Any(vec![ModuleId::new(4), ModuleId::new(5)])
            }
        );
        assert!(!guard_page(&AccessGrant::empty(), 2u32).is_render());
    }
}
