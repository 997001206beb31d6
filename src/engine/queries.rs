use std::cmp::Ordering;

use crate::model::{
    Analytics, OperationRecord, ParkingRequest, RequestState, Slot, Vehicle, Zone, ZoneSummary,
    ZoneUsage,
};

use super::{Engine, EngineError};

impl Engine {
    /// Derive the analytics snapshot from current state. Nothing is
    /// cached, so the numbers stay consistent under allocation,
    /// release, cancel, and rollback.
    pub fn analytics(&self) -> Analytics {
        let mut total_requests = 0;
        let mut in_flight_requests = 0;
        let mut completed_requests = 0;
        let mut cancelled_requests = 0;
        let mut cross_zone_allocations = 0;
        let mut duration_sum = 0i64;
        let mut duration_count = 0usize;

        for request in self.registry.iter() {
            total_requests += 1;
            match request.state {
                RequestState::Released => completed_requests += 1,
                RequestState::Cancelled => cancelled_requests += 1,
                _ => in_flight_requests += 1,
            }
            if request.cross_zone {
                cross_zone_allocations += 1;
            }
            if let Some(duration) = request.parking_duration_ms() {
                duration_sum += duration;
                duration_count += 1;
            }
        }

        let average_parking_duration_ms = if duration_count == 0 {
            0.0
        } else {
            duration_sum as f64 / duration_count as f64
        };

        let zone_utilization: Vec<ZoneUsage> = self
            .topology
            .zones()
            .iter()
            .map(|zone| ZoneUsage {
                zone_id: zone.id.clone(),
                percent: zone.utilization(),
            })
            .collect();

        // Stable sort keeps declared order for equal utilization.
        let mut ranked: Vec<&ZoneUsage> = zone_utilization.iter().collect();
        ranked.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(Ordering::Equal));
        let peak_usage_zones = ranked
            .into_iter()
            .take(3)
            .map(|usage| usage.zone_id.clone())
            .collect();

        Analytics {
            total_requests,
            in_flight_requests,
            completed_requests,
            cancelled_requests,
            average_parking_duration_ms,
            zone_utilization,
            peak_usage_zones,
            cross_zone_allocations,
        }
    }

    // ── Read queries ─────────────────────────────────────────────

    pub fn zones(&self) -> &[Zone] {
        self.topology.zones()
    }

    pub fn zone_summaries(&self) -> Vec<ZoneSummary> {
        self.topology
            .zones()
            .iter()
            .map(|zone| ZoneSummary {
                zone_id: zone.id.clone(),
                name: zone.name.clone(),
                total_slots: zone.total_slots(),
                available_slots: zone.available_slots(),
                utilization: zone.utilization(),
                adjacent_zones: zone.adjacent.clone(),
            })
            .collect()
    }

    /// Vehicles in registration order.
    pub fn vehicles(&self) -> Vec<&Vehicle> {
        self.vehicle_order
            .iter()
            .filter_map(|id| self.vehicles.get(id))
            .collect()
    }

    /// Requests in creation order, terminal records included.
    pub fn requests(&self) -> Vec<&ParkingRequest> {
        self.registry.iter().collect()
    }

    pub fn request(&self, request_id: &str) -> Option<&ParkingRequest> {
        self.registry.get(request_id)
    }

    pub fn find_slot(&self, slot_id: &str) -> Option<&Slot> {
        self.topology.find_slot(slot_id)
    }

    /// Free slots of a zone in declared order — the order allocation
    /// itself would pick from. Unknown zone is an error.
    pub fn available_slots_in_zone(&self, zone_id: &str) -> Result<Vec<&Slot>, EngineError> {
        self.topology.available_slots_in_zone(zone_id)
    }

    /// Slot count regardless of availability; 0 for unknown zones.
    pub fn total_slots_in_zone(&self, zone_id: &str) -> usize {
        self.topology.total_slots_in_zone(zone_id)
    }

    /// Not-yet-undone allocations in the order they happened.
    pub fn operation_history(&self) -> &[OperationRecord] {
        self.undo.entries()
    }

    pub fn can_rollback(&self) -> bool {
        !self.undo.is_empty()
    }
}
