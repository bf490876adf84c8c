//! # arbor
//!
//! Keyed tree reconciliation engine for declarative UIs.
//!
//! Compares two versions of an immutable descriptor tree and applies the
//! minimal set of mutations to a live host tree: keyed-children matching,
//! per-kind attribute diffing, and ordered mutation application through an
//! abstract host surface.
//!
//! ## Architecture
//!
//! The pipeline is a single synchronous pass:
//! ```text
//! Descriptor tree -> Reconciler -> keyed child matcher -> Applier -> HostBackend
//! ```
//!
//! The reconciler decides (mount / unmount / replace / update / move), the
//! applier is the only component that calls host mutation primitives, and an
//! optional observer watches the decision stream without influencing it.
//! Nothing is retained between passes; [`mount::RenderRoot`] is the thin
//! driver that remembers the previous tree and feeds it back in.
//!
//! ## Modules
//!
//! - [`types`] - Core types (`AttrValue`, `EventHandler`, `ChangeFlags`, ...)
//! - [`descriptor`] - Immutable descriptor trees, builders, identity keys
//! - [`reconcile`] - The differ and the keyed child matcher
//! - [`apply`] - Mutation decisions and the host mutation applier
//! - [`host`] - The `HostBackend` surface and the in-memory reference host
//! - [`observe`] - Instrumentation sinks
//! - [`mount`] - Retained render driver
//! - [`error`] - Error types

pub mod apply;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod mount;
pub mod observe;
pub mod reconcile;
pub mod types;

// Re-export commonly used items
pub use types::{AttrValue, ChangeFlags, Event, EventHandler, NodeKind, StyleMap};

pub use descriptor::{Descriptor, ElementBuilder, ElementDescriptor, IdentityKey, element, text};

pub use host::{HostBackend, HostHandle, HostOp, MemoryHost};

pub use reconcile::{
    AttrOp, AttrPatch, Reconciler, diff_attributes, reconcile, reconcile_observed,
};

pub use apply::{Applier, Mutation};

pub use observe::{CountingObserver, MutationKind, NoopObserver, ReconcileObserver};

pub use mount::RenderRoot;

pub use error::{HostError, ReconcileError};
