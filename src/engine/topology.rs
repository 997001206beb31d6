use std::collections::{HashMap, HashSet};

use crate::model::{Slot, Zone};

use super::EngineError;

/// Position of a slot inside the declared-order topology.
#[derive(Debug, Clone, Copy)]
struct SlotAddress {
    zone: usize,
    area: usize,
    slot: usize,
}

/// Owns the zone → area → slot graph. Zones live in a `Vec` because
/// declared order is contractual (first-available selection and
/// analytics both walk it); the maps are secondary indexes only.
#[derive(Default)]
pub struct Topology {
    zones: Vec<Zone>,
    zone_index: HashMap<String, usize>,
    slot_index: HashMap<String, SlotAddress>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Admin ────────────────────────────────────────────────────

    /// Install a zone, or replace the record in place when the id is
    /// already present. Area and slot ids owned by a *different* zone
    /// are rejected so id uniqueness survives every successful call.
    pub fn insert_zone(&mut self, zone: Zone) -> Result<(), EngineError> {
        let mut area_ids = HashSet::new();
        let mut slot_ids = HashSet::new();
        for area in &zone.areas {
            if !area_ids.insert(area.id.as_str()) {
                return Err(EngineError::MalformedInput("duplicate area id in zone"));
            }
            for slot in &area.slots {
                if !slot_ids.insert(slot.id.as_str()) {
                    return Err(EngineError::MalformedInput("duplicate slot id in zone"));
                }
            }
        }
        for other in self.zones.iter().filter(|z| z.id != zone.id) {
            for area in &other.areas {
                if area_ids.contains(area.id.as_str()) {
                    return Err(EngineError::MalformedInput(
                        "area id already owned by another zone",
                    ));
                }
                for slot in &area.slots {
                    if slot_ids.contains(slot.id.as_str()) {
                        return Err(EngineError::MalformedInput(
                            "slot id already owned by another zone",
                        ));
                    }
                }
            }
        }

        match self.zone_index.get(&zone.id).copied() {
            Some(idx) => self.zones[idx] = zone,
            None => {
                self.zone_index.insert(zone.id.clone(), self.zones.len());
                self.zones.push(zone);
            }
        }
        self.reindex_slots();
        Ok(())
    }

    fn reindex_slots(&mut self) {
        self.slot_index.clear();
        for (zi, zone) in self.zones.iter().enumerate() {
            for (ai, area) in zone.areas.iter().enumerate() {
                for (si, slot) in area.slots.iter().enumerate() {
                    self.slot_index.insert(
                        slot.id.clone(),
                        SlotAddress {
                            zone: zi,
                            area: ai,
                            slot: si,
                        },
                    );
                }
            }
        }
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zone_index.get(zone_id).map(|&idx| &self.zones[idx])
    }

    pub fn contains_zone(&self, zone_id: &str) -> bool {
        self.zone_index.contains_key(zone_id)
    }

    /// O(1) slot lookup through the secondary index.
    pub fn find_slot(&self, slot_id: &str) -> Option<&Slot> {
        let addr = self.slot_index.get(slot_id)?;
        Some(&self.zones[addr.zone].areas[addr.area].slots[addr.slot])
    }

    /// Free slots of a zone in declared order: areas as declared, slots
    /// as declared within each area. The order decides first-available
    /// selection.
    pub fn available_slots_in_zone(&self, zone_id: &str) -> Result<Vec<&Slot>, EngineError> {
        let zone = self
            .zone(zone_id)
            .ok_or_else(|| EngineError::NotFound(zone_id.to_string()))?;
        Ok(zone
            .areas
            .iter()
            .flat_map(|area| area.slots.iter())
            .filter(|slot| slot.available)
            .collect())
    }

    /// First free slot of a zone, `None` when the zone is unknown or
    /// full. Adjacency fallback uses this so dangling adjacency ids
    /// fall through silently.
    pub fn first_available_in_zone(&self, zone_id: &str) -> Option<&Slot> {
        self.zone(zone_id)?
            .areas
            .iter()
            .flat_map(|area| area.slots.iter())
            .find(|slot| slot.available)
    }

    /// Count regardless of availability. Unknown zones count 0 so
    /// utilization stays a total function.
    pub fn total_slots_in_zone(&self, zone_id: &str) -> usize {
        self.zone(zone_id).map_or(0, Zone::total_slots)
    }

    /// Stored adjacency list, declared order.
    pub fn adjacent_zones(&self, zone_id: &str) -> Result<&[String], EngineError> {
        self.zone(zone_id)
            .map(|zone| zone.adjacent.as_slice())
            .ok_or_else(|| EngineError::NotFound(zone_id.to_string()))
    }

    /// Record mutual adjacency between two existing zones.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), EngineError> {
        let ai = *self
            .zone_index
            .get(a)
            .ok_or_else(|| EngineError::NotFound(a.to_string()))?;
        let bi = *self
            .zone_index
            .get(b)
            .ok_or_else(|| EngineError::NotFound(b.to_string()))?;
        let b_id = self.zones[bi].id.clone();
        self.zones[ai].add_adjacent(b_id);
        let a_id = self.zones[ai].id.clone();
        self.zones[bi].add_adjacent(a_id);
        Ok(())
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// The one post-load mutation the topology accepts.
    pub fn set_slot_availability(
        &mut self,
        slot_id: &str,
        available: bool,
    ) -> Result<(), EngineError> {
        let addr = *self
            .slot_index
            .get(slot_id)
            .ok_or_else(|| EngineError::NotFound(slot_id.to_string()))?;
        self.zones[addr.zone].areas[addr.area].slots[addr.slot].available = available;
        Ok(())
    }
}
