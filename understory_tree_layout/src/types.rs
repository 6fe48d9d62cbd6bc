// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layout tree: node identifiers and per-node layout state.

use alloc::string::String;
use kurbo::{Affine, Point, Vec2};

use crate::animation::AnimationHandle;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Layout state carried by every node.
///
/// The layout pass owns `local_transform` and `layout_vector`. The apply pass
/// owns `last_applied` and `animation`. `style` and `layout_offset` are user
/// data and survive every pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutState {
    /// Placement relative to the parent, as computed by the parent's layout.
    ///
    /// `None` between the start of a layout pass and the moment the parent
    /// positions this node; reads treat it as identity.
    pub local_transform: Option<Affine>,
    /// Auxiliary direction some styles attach to a node (for example the
    /// growth direction of a branch).
    pub layout_vector: Vec2,
    /// User-adjustable translation applied on top of the composed transform.
    pub layout_offset: Point,
    /// Explicit style name; `None` inherits from the parent.
    pub style: Option<String>,
    /// Transform most recently pushed to the scene; `None` reads as identity.
    pub last_applied: Option<Affine>,
    /// Handle of the in-flight transition, if any.
    pub animation: Option<AnimationHandle>,
}

impl LayoutState {
    /// Local transform, or identity when unset.
    #[inline]
    pub fn local_transform_or_identity(&self) -> Affine {
        self.local_transform.unwrap_or(Affine::IDENTITY)
    }

    /// Last applied transform, or identity when nothing has been applied yet.
    #[inline]
    pub fn last_applied_or_identity(&self) -> Affine {
        self.last_applied.unwrap_or(Affine::IDENTITY)
    }
}
