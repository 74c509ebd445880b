//! Economy events - the outbound notification queue
//!
//! Systems push events here instead of calling back into observers. The
//! front end (or the harness) drains the queue after each update.

use hamlet_logic::resource::ResourceId;
use hecs::Entity;

use super::conversion::BlockReason;
use crate::warehouse::InventoryChanged;

/// Something observable happened in the economy
#[derive(Debug, Clone, PartialEq)]
pub enum EconomyEvent {
    /// The warehouse contents or level changed
    InventoryChanged { revision: u64, total_stored: u32 },
    /// A production tick deposited at least part of its batch (or had nothing to deposit)
    TickCompleted { tick: u64, accepted: u32, wasted: u32 },
    /// A production tick had output but the warehouse took none of it
    ProductionBlocked { tick: u64, wasted: u32 },
    ConversionCompleted {
        building: Entity,
        output: ResourceId,
        amount: u32,
        quality: u32,
        /// False when the warehouse was full and the output was lost
        stored: bool,
    },
    ConversionBlocked { building: Entity, reason: BlockReason },
    ToolSwapped {
        building: Entity,
        installed: ResourceId,
        removed: ResourceId,
    },
}

impl From<InventoryChanged> for EconomyEvent {
    fn from(change: InventoryChanged) -> Self {
        EconomyEvent::InventoryChanged {
            revision: change.revision,
            total_stored: change.total_stored,
        }
    }
}

/// FIFO queue of pending events (stored in engine)
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<EconomyEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EconomyEvent) {
        self.events.push(event);
    }

    /// Append warehouse notifications in the order they were raised.
    pub fn extend_inventory(&mut self, changes: Vec<InventoryChanged>) {
        self.events.extend(changes.into_iter().map(EconomyEvent::from));
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EconomyEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_order() {
        let mut queue = EventQueue::new();
        queue.extend_inventory(vec![
            InventoryChanged { revision: 1, total_stored: 5 },
            InventoryChanged { revision: 2, total_stored: 9 },
        ]);
        queue.push(EconomyEvent::TickCompleted { tick: 1, accepted: 9, wasted: 0 });
        assert_eq!(queue.len(), 3);

        let events = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(
            events[0],
            EconomyEvent::InventoryChanged { revision: 1, total_stored: 5 }
        );
        assert!(matches!(events[2], EconomyEvent::TickCompleted { tick: 1, .. }));
    }
}
