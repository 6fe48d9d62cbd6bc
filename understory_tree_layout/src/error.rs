// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use core::fmt;

use crate::types::NodeId;

/// Errors raised by the layout and apply passes.
///
/// Every variant is a configuration or usage error: the pass that hit it is
/// aborted and the error is handed back to the caller unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// A node resolved to a style name that is not registered.
    UnknownStyle(String),
    /// No node on the path to the root carries a style and the registry has
    /// no default (nothing has been registered yet).
    NoDefaultStyle,
    /// The identifier does not refer to a live node.
    StaleNode(NodeId),
    /// A layout tried to write a node that is not a direct child of the node
    /// being laid out.
    NotAChild {
        /// The node being laid out.
        parent: NodeId,
        /// The node the layout tried to write.
        node: NodeId,
    },
    /// The root cannot be removed from its tree.
    RootRemoval,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStyle(name) => write!(f, "layout style `{name}` is not registered"),
            Self::NoDefaultStyle => f.write_str("no layout style is registered"),
            Self::StaleNode(id) => write!(
                f,
                "node {}@gen{} is not alive",
                id.index(),
                id.generation()
            ),
            Self::NotAChild { parent, node } => write!(
                f,
                "node {} is not a direct child of node {} being laid out",
                node.index(),
                parent.index()
            ),
            Self::RootRemoval => f.write_str("the root node cannot be removed"),
        }
    }
}

impl core::error::Error for LayoutError {}

/// Errors from an [`Animator`](crate::Animator) when a transition cannot start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationError {
    /// The animator is not accepting new transitions (for example the clock
    /// driving it has been torn down).
    Unavailable,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("animator is not accepting transitions"),
        }
    }
}

impl core::error::Error for AnimationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_style() {
        let err = LayoutError::UnknownStyle("radial".into());
        assert_eq!(err.to_string(), "layout style `radial` is not registered");
    }

    #[test]
    fn display_names_both_nodes() {
        let err = LayoutError::NotAChild {
            parent: NodeId::new(0, 1),
            node: NodeId::new(4, 1),
        };
        assert_eq!(
            err.to_string(),
            "node 4 is not a direct child of node 0 being laid out"
        );
    }
}
