//! Stock plan modifiers

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Forces replacement when an existing value changes.
/// Creation (null state) and unknown plans never trigger it.
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this value forces a new resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        let settled = !matches!(request.state_value, Dynamic::Null | Dynamic::Unknown)
            && !matches!(response.plan_value, Dynamic::Unknown);
        if settled && *request.state_value != response.plan_value {
            response.requires_replace = true;
        }
    }
}

/// Keeps the prior state value for a computed attribute whose plan is unknown
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value stays unchanged".to_string()
    }

    fn modify(&self, request: PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        if matches!(response.plan_value, Dynamic::Unknown)
            && !matches!(request.state_value, Dynamic::Null | Dynamic::Unknown)
        {
            response.plan_value = request.state_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn run(modifier: &dyn PlanModifier, state: Dynamic, plan: Dynamic) -> PlanModifierResponse {
        let path = AttributePath::new("field");
        let mut response = PlanModifierResponse {
            plan_value: plan,
            requires_replace: false,
        };
        modifier.modify(
            PlanModifierRequest {
                config_value: &Dynamic::Null,
                state_value: &state,
                path: &path,
            },
            &mut response,
        );
        response
    }

    fn s(v: &str) -> Dynamic {
        Dynamic::String(v.to_string())
    }

    #[test]
    fn requires_replace_on_change() {
        assert!(run(&RequiresReplace, s("dev1"), s("dev2")).requires_replace);
        assert!(!run(&RequiresReplace, s("dev1"), s("dev1")).requires_replace);
    }

    #[test]
    fn requires_replace_skips_create_and_unknown() {
        assert!(!run(&RequiresReplace, Dynamic::Null, s("dev1")).requires_replace);
        assert!(!run(&RequiresReplace, s("dev1"), Dynamic::Unknown).requires_replace);
    }

    #[test]
    fn use_state_for_unknown_preserves_state() {
        let response = run(&UseStateForUnknown, s("/ndus/1"), Dynamic::Unknown);
        assert_eq!(response.plan_value, s("/ndus/1"));
        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_keeps_known_plan() {
        let response = run(&UseStateForUnknown, s("/ndus/1"), s("/ndus/2"));
        assert_eq!(response.plan_value, s("/ndus/2"));

        let response = run(&UseStateForUnknown, Dynamic::Null, Dynamic::Unknown);
        assert_eq!(response.plan_value, Dynamic::Unknown);
    }
}
