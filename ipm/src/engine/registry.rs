//! One descriptor per addressable resource kind.
//!
//! Both the action path table and the read-path resolver build their paths
//! from these descriptors.

use std::fmt;

use super::error::EngineError;
use super::identifier::{IdSlot, ResourceIdentifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Ndu,
    NduPort,
    NduTom,
    NduXr,
    NduEdfa,
    NduLinePtp,
    NduCarrier,
    Module,
    ModuleLinePtp,
    ModuleCarrier,
    Dsc,
    Dscg,
    ModuleEthernet,
    Host,
    HostPort,
    Network,
    NetworkLeafModule,
    TransportCapacity,
    NetworkConnection,
    Event,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 20] = [
        ResourceKind::Ndu,
        ResourceKind::NduPort,
        ResourceKind::NduTom,
        ResourceKind::NduXr,
        ResourceKind::NduEdfa,
        ResourceKind::NduLinePtp,
        ResourceKind::NduCarrier,
        ResourceKind::Module,
        ResourceKind::ModuleLinePtp,
        ResourceKind::ModuleCarrier,
        ResourceKind::Dsc,
        ResourceKind::Dscg,
        ResourceKind::ModuleEthernet,
        ResourceKind::Host,
        ResourceKind::HostPort,
        ResourceKind::Network,
        ResourceKind::NetworkLeafModule,
        ResourceKind::TransportCapacity,
        ResourceKind::NetworkConnection,
        ResourceKind::Event,
    ];

    pub fn descriptor(self) -> Descriptor {
        use ResourceKind::*;

        match self {
            Ndu => Descriptor::top(self, "/ndus"),
            NduPort => Descriptor::nested(self, "/ndus", &[], "ports", Some("portAid")),
            NduTom => Descriptor::nested(self, "/ndus", &[PORT], "tom", Some("tomAid")),
            NduXr => Descriptor::nested(self, "/ndus", &[PORT], "xr", Some("xrAid")),
            NduEdfa => Descriptor::nested(self, "/ndus", &[PORT], "edfa", Some("edfaAid")),
            NduLinePtp => {
                Descriptor::nested(self, "/ndus", &[PORT], "linePtps", Some("linePtpAid"))
            }
            NduCarrier => Descriptor::nested(
                self,
                "/ndus",
                &[PORT_OF_LINE_PTP, LINE_PTP],
                "carrier",
                Some("carrierAid"),
            ),
            Module => Descriptor::top(self, "/modules"),
            ModuleLinePtp => {
                Descriptor::nested(self, "/modules", &[], "linePtps", Some("linePtpAid"))
            }
            ModuleCarrier => {
                Descriptor::nested(self, "/modules", &[LINE_PTP], "carriers", Some("carrierAid"))
            }
            Dsc => Descriptor::nested(
                self,
                "/modules",
                &[LINE_PTP_OF_CARRIER, CARRIER],
                "dscs",
                Some("dscAid"),
            ),
            Dscg => Descriptor::nested(
                self,
                "/modules",
                &[LINE_PTP_OF_CARRIER, CARRIER],
                "dscgs",
                Some("dscgAid"),
            ),
            ModuleEthernet => {
                Descriptor::nested(self, "/modules", &[], "ethernetClients", Some("clientAid"))
            }
            Host => Descriptor::top(self, "/hosts"),
            HostPort => Descriptor::nested(self, "/hosts", &[], "ports", Some("portAid")),
            Network => Descriptor::top(self, "/xr-networks"),
            NetworkLeafModule => {
                Descriptor::nested(self, "/xr-networks", &[], "leafModules", None)
            }
            TransportCapacity => Descriptor::top(self, "/transport-capacities"),
            NetworkConnection => Descriptor::top(self, "/network-connections"),
            Event => Descriptor::top(self, "/events"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An ancestor collection and the identifier slot naming the instance in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub collection: &'static str,
    pub slot: IdSlot,
}

const PORT: Segment = Segment {
    collection: "ports",
    slot: IdSlot::Parent,
};
const PORT_OF_LINE_PTP: Segment = Segment {
    collection: "ports",
    slot: IdSlot::GrandParent,
};
const LINE_PTP: Segment = Segment {
    collection: "linePtps",
    slot: IdSlot::Parent,
};
const LINE_PTP_OF_CARRIER: Segment = Segment {
    collection: "linePtps",
    slot: IdSlot::GrandParent,
};
const CARRIER: Segment = Segment {
    collection: "carriers",
    slot: IdSlot::Parent,
};

#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub kind: ResourceKind,
    /// Top-level collection, e.g. `/ndus`
    pub root: &'static str,
    /// Segments between the device and the leaf collection, outermost first
    pub ancestors: &'static [Segment],
    /// Leaf collection under the device; `None` for top-level kinds
    pub leaf: Option<&'static str>,
    /// State field holding the Aid, for kinds that have one
    pub aid_field: Option<&'static str>,
}

impl Descriptor {
    fn top(kind: ResourceKind, root: &'static str) -> Self {
        Self {
            kind,
            root,
            ancestors: &[],
            leaf: None,
            aid_field: None,
        }
    }

    fn nested(
        kind: ResourceKind,
        root: &'static str,
        ancestors: &'static [Segment],
        leaf: &'static str,
        aid_field: Option<&'static str>,
    ) -> Self {
        Self {
            kind,
            root,
            ancestors,
            leaf: Some(leaf),
            aid_field,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.leaf.is_none()
    }

    /// Slot naming one instance within the collection
    pub fn leaf_slot(&self) -> IdSlot {
        if self.is_top_level() {
            IdSlot::Device
        } else {
            IdSlot::Col
        }
    }

    /// Depth of the hierarchy below the device
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    fn require<'a>(
        &self,
        identifier: &'a ResourceIdentifier,
        slot: IdSlot,
    ) -> Result<&'a str, EngineError> {
        identifier
            .slot(slot)
            .ok_or(EngineError::IncompleteIdentifier {
                kind: self.kind,
                field: slot.field_name(),
            })
    }

    /// Collection the resource lives in, with every ancestor id filled in
    pub fn collection_path(&self, identifier: &ResourceIdentifier) -> Result<String, EngineError> {
        let Some(leaf) = self.leaf else {
            return Ok(self.root.to_string());
        };

        let mut path = format!("{}/{}", self.root, self.require(identifier, IdSlot::Device)?);
        for segment in self.ancestors {
            path.push('/');
            path.push_str(segment.collection);
            path.push('/');
            path.push_str(self.require(identifier, segment.slot)?);
        }
        path.push('/');
        path.push_str(leaf);
        Ok(path)
    }

    /// Positional path of one instance: collection path plus its col id (or device id)
    pub fn instance_path(&self, identifier: &ResourceIdentifier) -> Result<String, EngineError> {
        let leaf = self.require(identifier, self.leaf_slot())?;
        Ok(format!("{}/{}", self.collection_path(identifier)?, leaf))
    }
}
