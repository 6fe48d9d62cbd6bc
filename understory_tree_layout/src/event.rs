// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene output and layout notifications.

use alloc::vec::Vec;
use kurbo::Affine;

use crate::types::NodeId;

/// Notification emitted by the apply pass and by animation ticks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LayoutEvent {
    /// A transform was pushed to the scene for `node`.
    ///
    /// Fires once per node per apply pass without animation, and once per
    /// node per frame while a transition runs.
    Applied {
        /// The node that moved.
        node: NodeId,
        /// The transform now shown.
        transform: Affine,
    },
    /// The apply pass reached every node.
    Complete,
}

/// Receiver of [`LayoutEvent`]s, called synchronously during the pass.
///
/// Implemented for any `FnMut(&LayoutEvent)`, for `Vec<LayoutEvent>`
/// (records everything), and for `()` (ignores everything).
pub trait LayoutListener {
    /// Handle one event.
    fn on_event(&mut self, event: &LayoutEvent);
}

impl<F: FnMut(&LayoutEvent)> LayoutListener for F {
    fn on_event(&mut self, event: &LayoutEvent) {
        self(event);
    }
}

impl LayoutListener for Vec<LayoutEvent> {
    fn on_event(&mut self, event: &LayoutEvent) {
        self.push(*event);
    }
}

impl LayoutListener for () {
    fn on_event(&mut self, _event: &LayoutEvent) {}
}

/// The visible scene the layout drives.
///
/// Whatever paints the diagram implements this; the layout only ever tells
/// it where a node's content goes.
pub trait Scene {
    /// Show `node` under `transform` from now on.
    fn set_transform(&mut self, node: NodeId, transform: Affine);
}

impl<F: FnMut(NodeId, Affine)> Scene for F {
    fn set_transform(&mut self, node: NodeId, transform: Affine) {
        self(node, transform);
    }
}

impl Scene for () {
    fn set_transform(&mut self, _node: NodeId, _transform: Affine) {}
}
