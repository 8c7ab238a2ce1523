//! Action dispatch path table

use super::error::EngineError;
use super::identifier::{IdSlot, ResourceIdentifier};
use super::registry::ResourceKind;

/// Action type whose action string is already the full path
pub const RAW_ACTION: &str = "raw_action";

/// Which resource an action type targets and the identifier slot naming the instance
#[derive(Debug, Clone, Copy)]
pub struct ActionTarget {
    pub type_name: &'static str,
    pub kind: ResourceKind,
    pub slot: IdSlot,
}

const fn target(type_name: &'static str, kind: ResourceKind, slot: IdSlot) -> ActionTarget {
    ActionTarget {
        type_name,
        kind,
        slot,
    }
}

static ACTION_TABLE: &[ActionTarget] = &[
    target("NDU", ResourceKind::Ndu, IdSlot::Device),
    // the port is named by parent_col_id here
    target("NDU Port", ResourceKind::NduPort, IdSlot::Parent),
    target("NDU TOM", ResourceKind::NduTom, IdSlot::Col),
    target("NDU XR", ResourceKind::NduXr, IdSlot::Col),
    target("NDU EDFA", ResourceKind::NduEdfa, IdSlot::Col),
    target("NDU Line PTP", ResourceKind::NduLinePtp, IdSlot::Col),
    target("NDU Carrier", ResourceKind::NduCarrier, IdSlot::Col),
    target("Module", ResourceKind::Module, IdSlot::Device),
    target("Line PTP", ResourceKind::ModuleLinePtp, IdSlot::Col),
    target("Carrier", ResourceKind::ModuleCarrier, IdSlot::Col),
    target("DSC", ResourceKind::Dsc, IdSlot::Col),
    target("DSCG", ResourceKind::Dscg, IdSlot::Col),
    target("Ethernet Client", ResourceKind::ModuleEthernet, IdSlot::Col),
    target("Host", ResourceKind::Host, IdSlot::Device),
    target("Host Port", ResourceKind::HostPort, IdSlot::Col),
    target("Network", ResourceKind::Network, IdSlot::Device),
];

pub fn action_target(type_name: &str) -> Option<&'static ActionTarget> {
    ACTION_TABLE.iter().find(|t| t.type_name == type_name)
}

/// Every accepted action type name, `raw_action` included
pub fn action_type_names() -> Vec<&'static str> {
    ACTION_TABLE
        .iter()
        .map(|t| t.type_name)
        .chain(std::iter::once(RAW_ACTION))
        .collect()
}

/// Maps `(type, identifier, action)` to the path an action is posted to
pub fn action_path(
    type_name: &str,
    identifier: &ResourceIdentifier,
    action: &str,
) -> Result<String, EngineError> {
    if action.is_empty() {
        return Err(EngineError::MissingActionName);
    }
    if type_name == RAW_ACTION {
        return Ok(action.to_string());
    }

    let target = action_target(type_name)
        .ok_or_else(|| EngineError::UnsupportedResourceType(type_name.to_string()))?;
    let descriptor = target.kind.descriptor();

    let instance = identifier
        .slot(target.slot)
        .ok_or(EngineError::IncompleteIdentifier {
            kind: target.kind,
            field: target.slot.field_name(),
        })?
        .to_string();

    // Re-key the identifier so the target slot names the instance
    let mut addressed = identifier.clone();
    match descriptor.leaf_slot() {
        IdSlot::Device => addressed.device_id = Some(instance),
        _ => addressed.col_id = Some(instance),
    }
    if target.slot == IdSlot::Parent {
        addressed.parent_col_id = identifier.grand_parent_col_id.clone();
        addressed.grand_parent_col_id = None;
    }

    let path = descriptor.instance_path(&addressed)?;
    Ok(format!("{}/{}", path, action))
}

/// Positional path of a resource, used for PUT and DELETE
pub fn positional_path(
    kind: ResourceKind,
    identifier: &ResourceIdentifier,
) -> Result<String, EngineError> {
    kind.descriptor().instance_path(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(fields: &[(&str, &str)]) -> ResourceIdentifier {
        let mut id = ResourceIdentifier::default();
        for (k, v) in fields {
            let v = Some(v.to_string());
            match *k {
                "device" => id.device_id = v,
                "gp" => id.grand_parent_col_id = v,
                "parent" => id.parent_col_id = v,
                "col" => id.col_id = v,
                _ => unreachable!(),
            }
        }
        id
    }

    #[test]
    fn ndu_port_action_uses_parent_col_id() {
        let id = identifier(&[("device", "d1"), ("parent", "2")]);
        assert_eq!(
            action_path("NDU Port", &id, "retry").unwrap(),
            "/ndus/d1/ports/2/retry"
        );
    }

    #[test]
    fn device_level_actions() {
        let id = identifier(&[("device", "d1")]);
        assert_eq!(action_path("NDU", &id, "coldStart").unwrap(), "/ndus/d1/coldStart");
        assert_eq!(action_path("Module", &id, "warmStart").unwrap(), "/modules/d1/warmStart");
        assert_eq!(
            action_path("Host", &id, "flushLldpHostDb").unwrap(),
            "/hosts/d1/flushLldpHostDb"
        );
    }

    #[test]
    fn dsc_action_needs_full_chain() {
        let id = identifier(&[("device", "m1"), ("gp", "1"), ("parent", "2"), ("col", "5")]);
        assert_eq!(
            action_path("DSC", &id, "factoryReset").unwrap(),
            "/modules/m1/linePtps/1/carriers/2/dscs/5/factoryReset"
        );

        let partial = identifier(&[("device", "m1"), ("col", "5")]);
        assert!(matches!(
            action_path("DSC", &partial, "factoryReset"),
            Err(EngineError::IncompleteIdentifier { .. })
        ));
    }

    #[test]
    fn raw_action_is_returned_verbatim() {
        let path = action_path(RAW_ACTION, &ResourceIdentifier::default(), "/ndus/n1/adopt").unwrap();
        assert_eq!(path, "/ndus/n1/adopt");
    }

    #[test]
    fn unknown_type_and_empty_action_fail() {
        let id = identifier(&[("device", "d1")]);
        assert!(matches!(
            action_path("Router", &id, "retry"),
            Err(EngineError::UnsupportedResourceType(t)) if t == "Router"
        ));
        assert!(matches!(
            action_path("NDU", &id, ""),
            Err(EngineError::MissingActionName)
        ));
        assert!(matches!(
            action_path(RAW_ACTION, &id, ""),
            Err(EngineError::MissingActionName)
        ));
    }

    #[test]
    fn type_names_are_matched_exactly() {
        let id = identifier(&[("device", "d1")]);
        tokio_test::assert_err!(action_path("ndu", &id, "coldStart"));
        assert!(action_type_names().contains(&"NDU Port"));
        assert!(action_type_names().contains(&RAW_ACTION));
    }

    #[test]
    fn edfa_put_path() {
        let id = identifier(&[("device", "dev1"), ("parent", "3"), ("col", "7")]);
        assert_eq!(
            positional_path(ResourceKind::NduEdfa, &id).unwrap(),
            "/ndus/dev1/ports/3/edfa/7"
        );
    }
}
