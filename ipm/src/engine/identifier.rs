//! Hierarchical addressing values.
//!
//! An identifier may carry several addressing fields at once. Which one is
//! used is decided by the read-path resolver, never here.

use serde::{Deserialize, Serialize};

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Identifier slots that fill path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSlot {
    Device,
    GrandParent,
    Parent,
    Col,
}

impl IdSlot {
    pub fn field_name(self) -> &'static str {
        match self {
            IdSlot::Device => "device_id",
            IdSlot::GrandParent => "grand_parent_col_id",
            IdSlot::Parent => "parent_col_id",
            IdSlot::Col => "col_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub device_id: Option<String>,
    pub grand_parent_col_id: Option<String>,
    pub parent_col_id: Option<String>,
    pub col_id: Option<String>,
    pub aid: Option<String>,
    pub id: Option<String>,
    pub href: Option<String>,
}

impl ResourceIdentifier {
    pub fn has_device_id(&self) -> bool {
        is_set(&self.device_id)
    }

    pub fn has_grand_parent_col_id(&self) -> bool {
        is_set(&self.grand_parent_col_id)
    }

    pub fn has_parent_col_id(&self) -> bool {
        is_set(&self.parent_col_id)
    }

    pub fn has_col_id(&self) -> bool {
        is_set(&self.col_id)
    }

    pub fn has_aid(&self) -> bool {
        is_set(&self.aid)
    }

    pub fn has_id(&self) -> bool {
        is_set(&self.id)
    }

    pub fn has_href(&self) -> bool {
        is_set(&self.href)
    }

    /// Value of a path slot, if set
    pub fn slot(&self, slot: IdSlot) -> Option<&str> {
        let value = match slot {
            IdSlot::Device => &self.device_id,
            IdSlot::GrandParent => &self.grand_parent_col_id,
            IdSlot::Parent => &self.parent_col_id,
            IdSlot::Col => &self.col_id,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Single-level identifier for top-level devices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentifier {
    pub device_id: Option<String>,
    pub href: Option<String>,
}

impl DeviceIdentifier {
    pub fn has_device_id(&self) -> bool {
        is_set(&self.device_id)
    }

    pub fn has_href(&self) -> bool {
        is_set(&self.href)
    }
}

impl From<DeviceIdentifier> for ResourceIdentifier {
    fn from(id: DeviceIdentifier) -> Self {
        ResourceIdentifier {
            device_id: id.device_id,
            href: id.href,
            ..Default::default()
        }
    }
}
