use serde::{Deserialize, Serialize};

/// Milliseconds since the engine's monotonic epoch — the only time type.
/// Only ordering and subtraction are meaningful.
pub type Ms = i64;

/// Lifecycle state of a parking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Requested,
    Allocated,
    Occupied,
    Released,
    Cancelled,
}

impl RequestState {
    /// The lifecycle transition table. Everything not listed here is
    /// rejected; rollback restores state through a separate path that
    /// does not consult this table.
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Requested, Allocated)
                | (Requested, Cancelled)
                | (Allocated, Occupied)
                | (Allocated, Cancelled)
                | (Occupied, Released)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Released | RequestState::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Requested => "requested",
            RequestState::Allocated => "allocated",
            RequestState::Occupied => "occupied",
            RequestState::Released => "released",
            RequestState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Topology ─────────────────────────────────────────────────────

/// A single parking unit. `available` is the only field that mutates
/// after topology load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub area_id: String,
    pub zone_id: String,
    pub available: bool,
}

impl Slot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            area_id: String::new(),
            zone_id: String::new(),
            available: true,
        }
    }
}

/// A sub-partition of a zone holding an ordered run of slots. Slot
/// order is significant: first-available selection walks it as
/// declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub zone_id: String,
    pub slots: Vec<Slot>,
}

impl Area {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            zone_id: String::new(),
            slots: Vec::new(),
        }
    }

    pub fn add_slot(&mut self, mut slot: Slot) {
        slot.area_id = self.id.clone();
        slot.zone_id = self.zone_id.clone();
        self.slots.push(slot);
    }

    /// Append `count` slots with generated ids (`{area}-S001`, …),
    /// numbering on from whatever the area already holds.
    pub fn add_slots(&mut self, count: usize) {
        let start = self.slots.len() + 1;
        for n in start..start + count {
            self.add_slot(Slot::new(format!("{}-S{n:03}", self.id)));
        }
    }

    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn available_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.available).count()
    }
}

/// A top-level parking sector: an ordered run of areas plus a stored
/// adjacency list consulted one hop outward during allocation.
/// Adjacency symmetry is convention, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub areas: Vec<Area>,
    pub adjacent: Vec<String>,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            areas: Vec::new(),
            adjacent: Vec::new(),
        }
    }

    pub fn add_area(&mut self, mut area: Area) {
        area.zone_id = self.id.clone();
        for slot in &mut area.slots {
            slot.zone_id = self.id.clone();
        }
        self.areas.push(area);
    }

    pub fn add_adjacent(&mut self, zone_id: impl Into<String>) {
        let zone_id = zone_id.into();
        if !self.adjacent.contains(&zone_id) {
            self.adjacent.push(zone_id);
        }
    }

    pub fn total_slots(&self) -> usize {
        self.areas.iter().map(Area::total_slots).sum()
    }

    pub fn available_slots(&self) -> usize {
        self.areas.iter().map(Area::available_slots).sum()
    }

    /// Occupancy percentage; 0 for an empty zone so utilization stays
    /// total over any topology.
    pub fn utilization(&self) -> f64 {
        let total = self.total_slots();
        if total == 0 {
            return 0.0;
        }
        let occupied = total - self.available_slots();
        occupied as f64 / total as f64 * 100.0
    }
}

/// A registered vehicle. Opaque to the engine: `preferred_zone_id` is
/// carried for the host and is not consulted during allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub license_plate: String,
    pub preferred_zone_id: String,
}

impl Vehicle {
    pub fn new(
        id: impl Into<String>,
        license_plate: impl Into<String>,
        preferred_zone_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            license_plate: license_plate.into(),
            preferred_zone_id: preferred_zone_id.into(),
        }
    }
}

// ── Requests ─────────────────────────────────────────────────────

/// A vehicle's ask for a slot, flowing through the request lifecycle.
/// Requests are never deleted; terminal-state records stay queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingRequest {
    pub id: String,
    pub vehicle_id: String,
    pub requested_zone_id: String,
    pub state: RequestState,
    pub allocated_slot_id: Option<String>,
    pub allocated_zone_id: Option<String>,
    pub requested_at: Ms,
    pub allocated_at: Option<Ms>,
    pub occupied_at: Option<Ms>,
    pub released_at: Option<Ms>,
    pub cancelled_at: Option<Ms>,
    pub cross_zone: bool,
    pub cross_zone_penalty: u32,
}

impl ParkingRequest {
    pub fn new(
        id: impl Into<String>,
        vehicle_id: impl Into<String>,
        requested_zone_id: impl Into<String>,
        requested_at: Ms,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_id: vehicle_id.into(),
            requested_zone_id: requested_zone_id.into(),
            state: RequestState::Requested,
            allocated_slot_id: None,
            allocated_zone_id: None,
            requested_at,
            allocated_at: None,
            occupied_at: None,
            released_at: None,
            cancelled_at: None,
            cross_zone: false,
            cross_zone_penalty: 0,
        }
    }

    /// In flight: not yet released or cancelled.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Occupied-to-released span, when both ends exist.
    pub fn parking_duration_ms(&self) -> Option<Ms> {
        match (self.occupied_at, self.released_at) {
            (Some(occupied), Some(released)) => Some(released - occupied),
            _ => None,
        }
    }
}

/// Audit record for one successful allocation — enough to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: String,
    pub request_id: String,
    pub slot_id: String,
    pub previous_slot_available: bool,
    pub previous_request_state: RequestState,
    pub at: Ms,
}

// ── Query result types ───────────────────────────────────────────

/// Success payload of a mutating façade operation: the updated request
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub request: ParkingRequest,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    pub rolled_back: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneUsage {
    pub zone_id: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_requests: usize,
    pub in_flight_requests: usize,
    pub completed_requests: usize,
    pub cancelled_requests: usize,
    pub average_parking_duration_ms: f64,
    /// Per-zone occupancy, in declared zone order.
    pub zone_utilization: Vec<ZoneUsage>,
    /// Up to three zone ids, highest utilization first; ties keep
    /// declared order.
    pub peak_usage_zones: Vec<String>,
    pub cross_zone_allocations: usize,
}

/// Per-zone row for the read side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone_id: String,
    pub name: String,
    pub total_slots: usize,
    pub available_slots: usize,
    pub utilization: f64,
    pub adjacent_zones: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_lifecycle() {
        use RequestState::*;
        let all = [Requested, Allocated, Occupied, Released, Cancelled];
        let allowed = [
            (Requested, Allocated),
            (Requested, Cancelled),
            (Allocated, Occupied),
            (Allocated, Cancelled),
            (Occupied, Released),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states() {
        assert!(RequestState::Released.is_terminal());
        assert!(RequestState::Cancelled.is_terminal());
        assert!(!RequestState::Requested.is_terminal());
        assert!(!RequestState::Allocated.is_terminal());
        assert!(!RequestState::Occupied.is_terminal());
    }

    #[test]
    fn area_generates_slot_ids_in_order() {
        let mut area = Area::new("a1", "Level 1");
        area.add_slots(3);
        let ids: Vec<&str> = area.slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a1-S001", "a1-S002", "a1-S003"]);
        // Numbering continues across calls.
        area.add_slots(1);
        assert_eq!(area.slots[3].id, "a1-S004");
    }

    #[test]
    fn zone_stamps_ownership_through_areas() {
        let mut area = Area::new("a1", "Level 1");
        area.add_slots(2);
        let mut zone = Zone::new("z1", "North");
        zone.add_area(area);
        assert_eq!(zone.areas[0].zone_id, "z1");
        assert!(zone.areas[0].slots.iter().all(|s| s.zone_id == "z1"));
    }

    #[test]
    fn zone_utilization_math() {
        let mut area = Area::new("a1", "Level 1");
        area.add_slots(4);
        let mut zone = Zone::new("z1", "North");
        zone.add_area(area);
        assert_eq!(zone.utilization(), 0.0);

        zone.areas[0].slots[0].available = false;
        assert_eq!(zone.utilization(), 25.0);

        let empty = Zone::new("z2", "Empty");
        assert_eq!(empty.utilization(), 0.0);
    }

    #[test]
    fn adjacency_deduplicates() {
        let mut zone = Zone::new("z1", "North");
        zone.add_adjacent("z2");
        zone.add_adjacent("z3");
        zone.add_adjacent("z2");
        assert_eq!(zone.adjacent, vec!["z2", "z3"]);
    }

    #[test]
    fn request_serialization_roundtrip() {
        let mut request = ParkingRequest::new("REQ-1", "veh-1", "z1", 42);
        request.state = RequestState::Allocated;
        request.allocated_slot_id = Some("a1-S001".into());
        request.allocated_at = Some(43);
        let json = serde_json::to_string(&request).unwrap();
        let decoded: ParkingRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, decoded);
        assert!(json.contains(r#""state":"allocated""#));
    }

    #[test]
    fn parking_duration_requires_both_timestamps() {
        let mut request = ParkingRequest::new("REQ-1", "veh-1", "z1", 0);
        assert_eq!(request.parking_duration_ms(), None);
        request.occupied_at = Some(100);
        assert_eq!(request.parking_duration_ms(), None);
        request.released_at = Some(450);
        assert_eq!(request.parking_duration_ms(), Some(350));
    }
}
