//! Render root - retained driver around the reconciler.
//!
//! The reconciler itself keeps nothing between passes; the caller owes it
//! the `(prev, handle)` pair the last invocation produced. [`RenderRoot`]
//! is that caller: it owns a host plus a container position, remembers the
//! previous descriptor tree and root handle, and feeds them back in on every
//! [`render`](RenderRoot::render).
//!
//! Passes are serialized structurally: `render` takes `&mut self`, and the
//! host is owned, so no other mutation path can touch the tree mid-pass.
//!
//! # Example
//!
//! ```
//! use arbor::descriptor::{element, text};
//! use arbor::mount::RenderRoot;
//!
//! let mut root = RenderRoot::in_memory();
//!
//! root.render(element("p").child(text("one")).build()).unwrap();
//! assert_eq!(root.host().snapshot(), "<p>one</p>");
//!
//! let changes = root.render(element("p").child(text("two")).build()).unwrap();
//! assert!(changes.any());
//! ```

use crate::descriptor::Descriptor;
use crate::error::ReconcileError;
use crate::host::{HostBackend, HostHandle, MemoryHost};
use crate::observe::ReconcileObserver;
use crate::reconcile::Reconciler;
use crate::types::ChangeFlags;

// =============================================================================
// Render Root
// =============================================================================

/// Owns one host container and drives reconciliation passes against it.
pub struct RenderRoot<H: HostBackend> {
    host: H,
    container: HostHandle,
    prev: Option<Descriptor>,
    root: Option<HostHandle>,
}

impl<H: HostBackend> RenderRoot<H> {
    /// Drive reconciliation under `container`, which must be a live node of
    /// `host`.
    pub fn new(host: H, container: HostHandle) -> Self {
        Self {
            host,
            container,
            prev: None,
            root: None,
        }
    }

    /// Reconcile the host tree against `next` and retain it for the
    /// following pass. Returns what the pass applied; empty flags mean the
    /// pass was a no-op.
    ///
    /// On error the host may be partially mutated and this root no longer
    /// mirrors it; rebuild from a fresh container rather than rendering
    /// again.
    pub fn render(&mut self, next: Descriptor) -> Result<ChangeFlags, ReconcileError> {
        let mut reconciler = Reconciler::new(&mut self.host);
        let root = reconciler.run(self.prev.as_ref(), Some(&next), self.root, self.container)?;
        let changes = reconciler.changes();
        self.root = root;
        self.prev = Some(next);
        Ok(changes)
    }

    /// Like [`render`](Self::render), reporting each applied decision to
    /// `observer`.
    pub fn render_observed(
        &mut self,
        next: Descriptor,
        observer: &dyn ReconcileObserver,
    ) -> Result<ChangeFlags, ReconcileError> {
        let mut reconciler = Reconciler::with_observer(&mut self.host, observer);
        let root = reconciler.run(self.prev.as_ref(), Some(&next), self.root, self.container)?;
        let changes = reconciler.changes();
        self.root = root;
        self.prev = Some(next);
        Ok(changes)
    }

    /// Unmount everything under the container.
    pub fn clear(&mut self) -> Result<ChangeFlags, ReconcileError> {
        let mut reconciler = Reconciler::new(&mut self.host);
        reconciler.run(self.prev.as_ref(), None, self.root, self.container)?;
        let changes = reconciler.changes();
        self.root = None;
        self.prev = None;
        Ok(changes)
    }

    /// Current root handle, if something is mounted.
    pub fn root(&self) -> Option<HostHandle> {
        self.root
    }

    /// The container this root renders under.
    pub fn container(&self) -> HostHandle {
        self.container
    }

    /// Read access to the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for host-side bookkeeping between passes
    /// (clearing an op log, dispatching events). Never mutate the rendered
    /// tree through this - the retained state would no longer mirror it.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Give the host back, dropping the retained state.
    pub fn into_host(self) -> H {
        self.host
    }
}

impl RenderRoot<MemoryHost> {
    /// Render root over a fresh [`MemoryHost`], mounted at its container.
    pub fn in_memory() -> Self {
        let host = MemoryHost::new();
        let container = host.container();
        Self::new(host, container)
    }
}

// =============================================================================
// Tests
// =============================================================================
