//! Error types.
//!
//! "Nothing to do" is never an error here: identical text leaves and
//! unchanged attributes are normal, silent outcomes. Errors are reserved for
//! caller contract violations (malformed input) and host-API failures, which
//! propagate. A pass that fails midway leaves the host partially mutated;
//! host mutations are not generally idempotent, so nothing is retried.

use thiserror::Error;

use crate::descriptor::IdentityKey;
use crate::host::HostHandle;

/// Error from a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Two siblings resolved to the same identity key. Keys must be unique
    /// within one child list; silently letting the last write win would
    /// corrupt host-tree state invisibly, so this fails loudly instead.
    #[error("duplicate identity key {key} among siblings")]
    DuplicateKey { key: IdentityKey },

    /// A host primitive rejected a call.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Error from a host-environment primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host does not know how to create an element with this tag.
    #[error("unsupported tag {tag:?}")]
    UnsupportedTag { tag: String },

    /// The handle does not name a live host node.
    #[error("unknown host handle {0:?}")]
    UnknownHandle(HostHandle),

    /// An element-only operation was applied to a text node.
    #[error("host node {0:?} is not an element")]
    NotAnElement(HostHandle),

    /// A text-only operation was applied to an element.
    #[error("host node {0:?} is not a text node")]
    NotAText(HostHandle),

    /// The reference node of an insert/remove is not a child of the parent.
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild {
        parent: HostHandle,
        child: HostHandle,
    },

    /// The host rejected an attribute write.
    #[error("attribute {name:?} rejected by host: {reason}")]
    AttributeRejected { name: String, reason: String },
}
