//! Warehouse - the village's capacity-bounded resource ledger
//!
//! Capacity comes from the warehouse level. Every successful mutation
//! appends exactly one [`InventoryChanged`] to the outbox; failed calls and
//! no-op calls (zero amounts, empty batches) append nothing. The engine
//! drains the outbox into its event queue.

use std::collections::BTreeMap;

use hamlet_logic::capacity::{clamp_warehouse_level, warehouse_capacity};
use hamlet_logic::resource::{ResourceId, ResourceStack};
use log::warn;
use serde::{Deserialize, Serialize};

/// Raised once per successful warehouse mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChanged {
    /// Monotonic mutation counter
    pub revision: u64,
    pub total_stored: u32,
}

/// Result of a clamped batch deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClampedDeposit {
    pub accepted: u32,
    pub wasted: u32,
    pub any_added: bool,
}

/// Persisted warehouse state: stacks sorted by id plus the level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub stacks: Vec<ResourceStack>,
    pub level: u32,
}

#[derive(Debug, Clone)]
pub struct Warehouse {
    stock: BTreeMap<ResourceId, u32>,
    level: u32,
    revision: u64,
    outbox: Vec<InventoryChanged>,
}

impl Warehouse {
    pub fn new(level: u32) -> Self {
        Self {
            stock: BTreeMap::new(),
            level: clamp_warehouse_level(level),
            revision: 0,
            outbox: Vec::new(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn capacity(&self) -> u32 {
        warehouse_capacity(self.level)
    }

    pub fn get(&self, id: ResourceId) -> u32 {
        self.stock.get(&id).copied().unwrap_or(0)
    }

    pub fn total_stored(&self) -> u32 {
        self.total_u64().min(u32::MAX as u64) as u32
    }

    /// Capacity minus stored, zero when over capacity.
    pub fn free_space(&self) -> u32 {
        (self.capacity() as u64).saturating_sub(self.total_u64()) as u32
    }

    /// Stored stacks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = ResourceStack> + '_ {
        self.stock.iter().map(|(&id, &amount)| ResourceStack::new(id, amount))
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    pub fn try_remove(&mut self, id: ResourceId, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if self.get(id) < amount {
            return false;
        }
        self.take(id, amount);
        self.notify();
        true
    }

    /// Withdraw every stack or none. Repeated ids are summed.
    pub fn try_remove_all(&mut self, stacks: &[ResourceStack]) -> bool {
        let needed = aggregate(stacks);
        if needed.is_empty() {
            return true;
        }
        if needed.iter().any(|(&id, &amount)| (self.get(id) as u64) < amount) {
            return false;
        }
        for (id, amount) in needed {
            self.take(id, amount as u32);
        }
        self.notify();
        true
    }

    pub fn try_add(&mut self, id: ResourceId, amount: u32) -> bool {
        if id.is_none() {
            return false;
        }
        if amount == 0 {
            return true;
        }
        if self.free_space() < amount {
            return false;
        }
        self.put(id, amount);
        self.notify();
        true
    }

    /// Put back stock that was just withdrawn. Skips the capacity check,
    /// so a warehouse already over capacity ends where it started.
    pub(crate) fn restore(&mut self, id: ResourceId, amount: u32) {
        if id.is_none() || amount == 0 {
            return;
        }
        self.put(id, amount);
        self.notify();
    }

    /// Deposit the whole batch, or nothing if it doesn't fit.
    pub fn try_add_all_or_nothing(&mut self, stacks: &[ResourceStack]) -> bool {
        if stacks.iter().any(|s| s.id.is_none() && s.amount > 0) {
            return false;
        }
        let requested = aggregate(stacks);
        if requested.is_empty() {
            return true;
        }
        let total: u64 = requested.values().sum();
        if total > self.free_space() as u64 {
            return false;
        }
        for (id, amount) in requested {
            self.put(id, amount as u32);
        }
        self.notify();
        true
    }

    /// Deposit as much as fits, in the caller's stack order; the rest is wasted.
    ///
    /// Stacks with the NONE id are wasted in full.
    pub fn try_add_clamped(&mut self, stacks: &[ResourceStack]) -> ClampedDeposit {
        let mut remaining = self.free_space();
        let mut result = ClampedDeposit::default();

        for stack in stacks {
            if stack.id.is_none() {
                result.wasted = result.wasted.saturating_add(stack.amount);
                continue;
            }
            let take = stack.amount.min(remaining);
            if take > 0 {
                self.put(stack.id, take);
                remaining -= take;
                result.accepted += take;
            }
            result.wasted = result.wasted.saturating_add(stack.amount - take);
        }

        result.any_added = result.accepted > 0;
        if result.any_added {
            self.notify();
        }
        result
    }

    /// Change level (clamped). Existing stock is never truncated.
    pub fn set_level(&mut self, level: u32) {
        let level = clamp_warehouse_level(level);
        if level == self.level {
            return;
        }
        self.level = level;
        if self.total_u64() > self.capacity() as u64 {
            warn!(
                "Warehouse level {} holds {} units over capacity {}",
                level,
                self.total_u64(),
                self.capacity()
            );
        }
        self.notify();
    }

    /// Replace the entire contents in one step.
    pub fn load_snapshot(&mut self, snapshot: &WarehouseSnapshot) {
        let mut stock = BTreeMap::new();
        for stack in &snapshot.stacks {
            if stack.id.is_none() || stack.amount == 0 {
                continue;
            }
            let entry: &mut u32 = stock.entry(stack.id).or_default();
            *entry = entry.saturating_add(stack.amount);
        }
        self.stock = stock;
        self.level = clamp_warehouse_level(snapshot.level);
        if self.total_u64() > self.capacity() as u64 {
            warn!(
                "Loaded warehouse snapshot over capacity: {} / {}",
                self.total_u64(),
                self.capacity()
            );
        }
        self.notify();
    }

    pub fn snapshot(&self) -> WarehouseSnapshot {
        WarehouseSnapshot {
            stacks: self.iter().collect(),
            level: self.level,
        }
    }

    /// Hand over pending notifications.
    pub fn drain_notifications(&mut self) -> Vec<InventoryChanged> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_notifications(&self) -> usize {
        self.outbox.len()
    }

    fn total_u64(&self) -> u64 {
        self.stock.values().map(|&a| a as u64).sum()
    }

    fn put(&mut self, id: ResourceId, amount: u32) {
        let entry = self.stock.entry(id).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    fn take(&mut self, id: ResourceId, amount: u32) {
        if let Some(current) = self.stock.get_mut(&id) {
            *current -= amount.min(*current);
            if *current == 0 {
                self.stock.remove(&id);
            }
        }
    }

    fn notify(&mut self) {
        self.revision += 1;
        let event = InventoryChanged {
            revision: self.revision,
            total_stored: self.total_stored(),
        };
        self.outbox.push(event);
    }
}

impl Default for Warehouse {
    fn default() -> Self {
        Self::new(1)
    }
}

fn aggregate(stacks: &[ResourceStack]) -> BTreeMap<ResourceId, u64> {
    let mut totals = BTreeMap::new();
    for stack in stacks.iter().filter(|s| s.amount > 0) {
        *totals.entry(stack.id).or_insert(0u64) += stack.amount as u64;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_logic::constants::resources::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn stocked(level: u32, stacks: &[(ResourceId, u32)]) -> Warehouse {
        let mut w = Warehouse::new(level);
        for &(id, amount) in stacks {
            assert!(w.try_add(id, amount));
        }
        w.drain_notifications();
        w
    }

    #[test]
    fn test_clamped_deposit_fills_to_capacity() {
        let mut w = stocked(1, &[(WOOD, 195)]);
        let result = w.try_add_clamped(&[ResourceStack::new(WOOD, 10)]);
        assert_eq!(result.accepted, 5);
        assert_eq!(result.wasted, 5);
        assert!(result.any_added);
        assert_eq!(w.get(WOOD), 200);
        assert_eq!(w.drain_notifications().len(), 1);
    }

    #[test]
    fn test_clamped_deposit_priority_follows_order() {
        let mut w = stocked(1, &[(STONE, 190)]);
        let result = w.try_add_clamped(&[
            ResourceStack::new(WOOD, 6),
            ResourceStack::new(STONE, 6),
            ResourceStack::new(FIBER, 6),
        ]);
        assert_eq!(result.accepted, 10);
        assert_eq!(result.wasted, 8);
        assert_eq!(w.get(WOOD), 6);
        assert_eq!(w.get(STONE), 194);
        assert_eq!(w.get(FIBER), 0);
    }

    #[test]
    fn test_clamped_deposit_when_full() {
        let mut w = stocked(1, &[(WOOD, 200)]);
        let result = w.try_add_clamped(&[ResourceStack::new(STONE, 3)]);
        assert_eq!(result, ClampedDeposit { accepted: 0, wasted: 3, any_added: false });
        assert_eq!(w.pending_notifications(), 0);
    }

    #[test]
    fn test_clamped_none_is_wasted() {
        let mut w = Warehouse::new(1);
        let result = w.try_add_clamped(&[
            ResourceStack::new(ResourceId::NONE, 4),
            ResourceStack::new(WOOD, 3),
        ]);
        assert_eq!(result.accepted, 3);
        assert_eq!(result.wasted, 4);
    }

    #[test]
    fn test_try_add_respects_free_space() {
        let mut w = stocked(1, &[(WOOD, 198)]);
        assert!(!w.try_add(STONE, 3));
        assert_eq!(w.get(STONE), 0);
        assert!(w.try_add(STONE, 2));
        assert_eq!(w.free_space(), 0);
        assert!(!w.try_add(ResourceId::NONE, 0));
    }

    #[test]
    fn test_try_remove() {
        let mut w = stocked(1, &[(WOOD, 5)]);
        assert!(!w.try_remove(WOOD, 6));
        assert_eq!(w.get(WOOD), 5);
        assert!(w.try_remove(WOOD, 5));
        assert!(w.is_empty(), "zeroed entries are removed");
        assert_eq!(w.drain_notifications().len(), 1);
    }

    #[test]
    fn test_remove_all_is_atomic() {
        let mut w = stocked(1, &[(WOOD, 4), (FIBER, 5)]);
        let recipe = [ResourceStack::new(WOOD, 5), ResourceStack::new(FIBER, 2)];
        assert!(!w.try_remove_all(&recipe));
        assert_eq!(w.get(WOOD), 4);
        assert_eq!(w.get(FIBER), 5);

        // Duplicate ids are summed before checking.
        let dup = [ResourceStack::new(WOOD, 3), ResourceStack::new(WOOD, 2)];
        assert!(!w.try_remove_all(&dup));

        assert!(w.try_remove_all(&[ResourceStack::new(WOOD, 4), ResourceStack::new(FIBER, 2)]));
        assert_eq!(w.get(WOOD), 0);
        assert_eq!(w.get(FIBER), 3);
        assert_eq!(w.drain_notifications().len(), 1);
    }

    #[test]
    fn test_all_or_nothing() {
        let mut w = stocked(1, &[(WOOD, 190)]);
        let batch = [ResourceStack::new(STONE, 6), ResourceStack::new(FIBER, 6)];
        assert!(!w.try_add_all_or_nothing(&batch));
        assert_eq!(w.total_stored(), 190);
        assert_eq!(w.pending_notifications(), 0);

        let batch = [ResourceStack::new(STONE, 5), ResourceStack::new(FIBER, 5)];
        assert!(w.try_add_all_or_nothing(&batch));
        assert_eq!(w.total_stored(), 200);
        assert_eq!(w.drain_notifications().len(), 1);
    }

    #[test]
    fn test_empty_calls_do_not_notify() {
        let mut w = Warehouse::new(1);
        assert!(w.try_add_all_or_nothing(&[]));
        assert!(w.try_remove_all(&[]));
        assert!(w.try_add(WOOD, 0));
        assert!(w.try_remove(WOOD, 0));
        let result = w.try_add_clamped(&[]);
        assert!(!result.any_added);
        assert_eq!(w.pending_notifications(), 0);
    }

    #[test]
    fn test_set_level_never_truncates() {
        let mut w = Warehouse::new(2);
        assert!(w.try_add(WOOD, 400));
        w.set_level(1);
        assert_eq!(w.get(WOOD), 400);
        assert_eq!(w.free_space(), 0);
        assert!(!w.try_add(WOOD, 1));
        w.set_level(99);
        assert_eq!(w.level(), 7);
        assert_eq!(w.capacity(), 5400);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let w = stocked(3, &[(STONE, 20), (WOOD, 10)]);
        let snapshot = w.snapshot();
        assert_eq!(snapshot.stacks[0], ResourceStack::new(WOOD, 10));
        assert_eq!(snapshot.level, 3);

        let mut restored = Warehouse::new(1);
        restored.load_snapshot(&snapshot);
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.drain_notifications().len(), 1);
    }

    #[test]
    fn test_snapshot_over_capacity_is_accepted() {
        let mut w = Warehouse::new(1);
        w.load_snapshot(&WarehouseSnapshot {
            stacks: vec![ResourceStack::new(WOOD, 300), ResourceStack::new(STONE, 0)],
            level: 1,
        });
        assert_eq!(w.total_stored(), 300);
        assert_eq!(w.free_space(), 0);
        assert_eq!(w.get(STONE), 0);
        assert_eq!(w.iter().count(), 1);
    }

    #[test]
    fn test_restore_ignores_capacity() {
        let mut w = Warehouse::new(1);
        w.load_snapshot(&WarehouseSnapshot {
            stacks: vec![ResourceStack::new(WOOD, 200), ResourceStack::new(STONE, 1)],
            level: 1,
        });
        w.drain_notifications();
        assert!(w.try_remove(STONE, 1));
        assert!(!w.try_add(STONE, 1));
        w.restore(STONE, 1);
        assert_eq!(w.get(STONE), 1);
        assert_eq!(w.total_stored(), 201);
        assert_eq!(w.drain_notifications().len(), 2);
    }

    #[test]
    fn test_revisions_increase() {
        let mut w = Warehouse::new(1);
        w.try_add(WOOD, 1);
        w.try_add(WOOD, 1);
        w.try_remove(WOOD, 1);
        let revs: Vec<u64> = w.drain_notifications().iter().map(|n| n.revision).collect();
        assert_eq!(revs, vec![1, 2, 3]);
    }

    #[test]
    fn test_random_sequences_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = [WOOD, STONE, FIBER, CLAY, ORE];

        for _ in 0..50 {
            let mut w = Warehouse::new(rng.gen_range(1..=7));
            for _ in 0..200 {
                let id = ids[rng.gen_range(0..ids.len())];
                match rng.gen_range(0..4) {
                    0 => {
                        w.try_add(id, rng.gen_range(0..300));
                    }
                    1 => {
                        w.try_remove(id, rng.gen_range(0..100));
                    }
                    2 => {
                        let batch: Vec<ResourceStack> = (0..rng.gen_range(0..5))
                            .map(|_| ResourceStack::new(ids[rng.gen_range(0..ids.len())], rng.gen_range(0..200)))
                            .collect();
                        let free_before = w.free_space();
                        let requested: u32 = batch.iter().map(|s| s.amount).sum();
                        let result = w.try_add_clamped(&batch);
                        assert_eq!(result.accepted + result.wasted, requested);
                        assert_eq!(result.accepted, requested.min(free_before));
                    }
                    _ => {
                        let batch: Vec<ResourceStack> = (0..rng.gen_range(1..4))
                            .map(|_| ResourceStack::new(ids[rng.gen_range(0..ids.len())], rng.gen_range(1..150)))
                            .collect();
                        let before = w.snapshot();
                        if !w.try_add_all_or_nothing(&batch) {
                            assert_eq!(w.snapshot(), before);
                        }
                    }
                }
                assert!(w.total_stored() <= w.capacity());
                assert!(w.iter().all(|s| s.amount > 0));
            }
        }
    }
}
