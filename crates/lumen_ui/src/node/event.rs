//! Node notifications delivered over channels.
//!
//! Any number of subscribers may listen; each gets its own bounded channel.
//! A subscriber that fell behind loses events (the frame never waits for
//! it); a dropped subscriber is pruned on the next emission.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::trace;

use super::NodeId;

/// Something that happened to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// The node was marked modified; its image will be regenerated.
    Changed {
        /// Affected node.
        node: NodeId,
    },
    /// The node's reported size changed.
    Resized {
        /// Affected node.
        node: NodeId,
    },
    /// The node's parent was resized or regenerated.
    ParentResized {
        /// Child of the resized parent.
        node: NodeId,
    },
    /// A child was attached.
    ChildAdded {
        /// New parent.
        parent: NodeId,
        /// Attached child.
        child: NodeId,
    },
    /// A child was detached.
    ChildRemoved {
        /// Old parent.
        parent: NodeId,
        /// Detached child.
        child: NodeId,
    },
    /// The node got a parent.
    Attached {
        /// Attached node.
        node: NodeId,
        /// Its new parent.
        parent: NodeId,
    },
    /// The node lost its parent.
    Detached {
        /// Detached node.
        node: NodeId,
        /// Its old parent.
        parent: NodeId,
    },
    /// The node and its subtree were removed from the tree.
    Removed {
        /// Root of the removed subtree.
        node: NodeId,
    },
    /// The node's global enablement flipped.
    EnabledChanged {
        /// Affected node.
        node: NodeId,
        /// New global state.
        enabled: bool,
    },
    /// The node's own visibility flag changed.
    VisibilityChanged {
        /// Affected node.
        node: NodeId,
        /// New visibility.
        visible: bool,
    },
    /// The pointer entered the node.
    Hovered {
        /// Affected node.
        node: NodeId,
    },
    /// The pointer left the node.
    Unhovered {
        /// Affected node.
        node: NodeId,
    },
    /// The primary button went down over the node.
    Pressed {
        /// Affected node.
        node: NodeId,
    },
    /// The primary button was pressed and released over the node.
    Clicked {
        /// Affected node.
        node: NodeId,
    },
    /// The node took focus.
    FocusGained {
        /// Affected node.
        node: NodeId,
    },
    /// The node lost focus.
    FocusLost {
        /// Affected node.
        node: NodeId,
    },
}

impl NodeEvent {
    /// The node the event is about (the child for structural events).
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match *self {
            Self::ChildAdded { child, .. } | Self::ChildRemoved { child, .. } => child,
            Self::Changed { node }
            | Self::Resized { node }
            | Self::ParentResized { node }
            | Self::Attached { node, .. }
            | Self::Detached { node, .. }
            | Self::Removed { node }
            | Self::EnabledChanged { node, .. }
            | Self::VisibilityChanged { node, .. }
            | Self::Hovered { node }
            | Self::Unhovered { node }
            | Self::Pressed { node }
            | Self::Clicked { node }
            | Self::FocusGained { node }
            | Self::FocusLost { node } => node,
        }
    }
}

/// Receiving side of a node event subscription.
#[derive(Debug, Clone)]
pub struct NodeEventReceiver {
    receiver: Receiver<NodeEvent>,
}

impl NodeEventReceiver {
    /// Drains all pending events.
    #[must_use]
    pub fn drain(&self) -> Vec<NodeEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event if available.
    #[must_use]
    pub fn try_recv(&self) -> Option<NodeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of events waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if events are waiting.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Sending side, owned by the tree.
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    senders: Vec<Sender<NodeEvent>>,
}

impl EventHub {
    pub fn subscribe(&mut self, capacity: usize) -> NodeEventReceiver {
        let (sender, receiver) = bounded(capacity.max(1));
        self.senders.push(sender);
        NodeEventReceiver { receiver }
    }

    pub fn has_listeners(&self) -> bool {
        !self.senders.is_empty()
    }

    pub fn emit(&mut self, event: NodeEvent) {
        self.senders.retain(|sender| match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!(?event, "node event dropped, subscriber is full");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_to_all_subscribers() {
        let mut hub = EventHub::default();
        let a = hub.subscribe(8);
        let b = hub.subscribe(8);

        hub.emit(NodeEvent::Changed { node: NodeId::new(1) });

        assert_eq!(a.drain(), vec![NodeEvent::Changed { node: NodeId::new(1) }]);
        assert_eq!(b.pending_count(), 1);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut hub = EventHub::default();
        let receiver = hub.subscribe(8);
        assert!(hub.has_listeners());

        drop(receiver);
        hub.emit(NodeEvent::Removed { node: NodeId::new(2) });
        assert!(!hub.has_listeners());
    }

    #[test]
    fn test_full_subscriber_drops_events() {
        let mut hub = EventHub::default();
        let receiver = hub.subscribe(1);

        hub.emit(NodeEvent::Hovered { node: NodeId::new(1) });
        hub.emit(NodeEvent::Unhovered { node: NodeId::new(1) });

        assert_eq!(receiver.drain(), vec![NodeEvent::Hovered { node: NodeId::new(1) }]);
        assert!(hub.has_listeners());
    }

    #[test]
    fn test_event_node() {
        let event = NodeEvent::ChildAdded {
            parent: NodeId::new(1),
            child: NodeId::new(2),
        };
        assert_eq!(event.node(), NodeId::new(2));
    }
}
