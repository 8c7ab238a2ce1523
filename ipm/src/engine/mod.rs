//! Addressing, path synthesis and state population for IPM resources.
//!
//! Read flow: identifier -> [`resolve`] -> transport -> [`normalize`] -> [`populate`].
//! Action flow: identifier + action name -> [`path`] -> transport.

mod error;
mod identifier;
mod normalize;
mod operation;
mod path;
mod populate;
mod registry;
mod resolve;

pub use error::EngineError;
pub use identifier::{DeviceIdentifier, IdSlot, ResourceIdentifier};
pub use normalize::{decode, normalize, Normalized};
pub use operation::{
    create, delete, dispatch_action, fetch_all, read, update, Creation, Deletion, Dispatched,
    StateHeader, Tracked,
};
pub use path::{action_path, action_target, action_type_names, positional_path, RAW_ACTION};
pub use populate::{MergePolicy, Populate, Populator};
pub use registry::{Descriptor, ResourceKind, Segment};
pub use resolve::{expanded, filter_path, resolve_read_path, ReadPath, ReadSource, ReadTarget};
