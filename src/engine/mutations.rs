use metrics::{counter, gauge};

use crate::model::{OperationRecord, Outcome, ParkingRequest, RequestState, RollbackReport};
use crate::observability;

use super::{Engine, EngineError};

impl Engine {
    /// Intake. Always succeeds for well-formed ids; the vehicle and
    /// zone need not exist yet, unknown ids surface on `allocate`.
    pub fn create_request(
        &mut self,
        vehicle_id: &str,
        requested_zone_id: &str,
    ) -> Result<Outcome, EngineError> {
        if vehicle_id.trim().is_empty() {
            return Err(EngineError::MalformedInput("vehicle id must not be empty"));
        }
        if requested_zone_id.trim().is_empty() {
            return Err(EngineError::MalformedInput("zone id must not be empty"));
        }

        let id = self.ids.request_id();
        let request = ParkingRequest::new(&id, vehicle_id, requested_zone_id, self.clock.now_ms());
        let outcome = Outcome {
            message: format!("request {id} created for vehicle {vehicle_id}"),
            request: request.clone(),
        };
        self.registry.insert(request);
        counter!(observability::REQUESTS_TOTAL).increment(1);
        Ok(outcome)
    }

    /// Bind a `Requested` request to a slot: first free slot of the
    /// requested zone in declared order, else the first adjacent zone
    /// (stored order) that has one. Failure leaves the request, the
    /// topology, and the undo log untouched.
    pub fn allocate(&mut self, request_id: &str) -> Result<Outcome, EngineError> {
        let request = self.registry.guard(request_id, RequestState::Allocated)?;
        let previous_request_state = request.state;
        let zone_id = request.requested_zone_id.clone();
        if !self.topology.contains_zone(&zone_id) {
            return Err(EngineError::NotFound(zone_id));
        }

        // Selection. Adjacency ids that resolve to no zone are skipped;
        // dangling references are the host's doing.
        let choice = match self.topology.first_available_in_zone(&zone_id) {
            Some(slot) => Some((slot.id.clone(), slot.zone_id.clone(), slot.available, false)),
            None => self
                .topology
                .adjacent_zones(&zone_id)?
                .iter()
                .find_map(|adjacent| self.topology.first_available_in_zone(adjacent))
                .map(|slot| (slot.id.clone(), slot.zone_id.clone(), slot.available, true)),
        };
        let Some((slot_id, slot_zone_id, previous_slot_available, cross_zone)) = choice else {
            return Err(EngineError::NoAvailableSlots(zone_id));
        };

        // Commit. The guard already validated the transition, so from
        // here on nothing can fail; the transition match below only
        // exists to unwind the slot flip if that ever stops being true.
        let now = self.clock.now_ms();
        self.topology.set_slot_availability(&slot_id, false)?;
        let request = match self.registry.transition(request_id, RequestState::Allocated, now) {
            Ok(request) => request,
            Err(err) => {
                let _ = self
                    .topology
                    .set_slot_availability(&slot_id, previous_slot_available);
                return Err(err);
            }
        };

        let penalty = if cross_zone {
            self.config.cross_zone_penalty
        } else {
            0
        };
        request.allocated_slot_id = Some(slot_id.clone());
        request.allocated_zone_id = Some(slot_zone_id.clone());
        request.cross_zone = cross_zone;
        request.cross_zone_penalty = penalty;
        let request = request.clone();

        self.undo.push(OperationRecord {
            id: self.ids.operation_id(),
            request_id: request_id.to_string(),
            slot_id: slot_id.clone(),
            previous_slot_available,
            previous_request_state,
            at: now,
        });

        counter!(
            observability::ALLOCATIONS_TOTAL,
            "cross_zone" => if cross_zone { "true" } else { "false" }
        )
        .increment(1);
        gauge!(observability::UNDO_DEPTH).set(self.undo.len() as f64);

        let message = if cross_zone {
            format!(
                "allocated slot {slot_id} in adjacent zone {slot_zone_id} (cross-zone penalty {penalty})"
            )
        } else {
            format!("allocated slot {slot_id} in zone {slot_zone_id}")
        };
        Ok(Outcome { request, message })
    }

    /// The vehicle entered its allocated slot. No slot change — the
    /// slot is already held.
    pub fn occupy(&mut self, request_id: &str) -> Result<Outcome, EngineError> {
        let now = self.clock.now_ms();
        let request = self
            .registry
            .transition(request_id, RequestState::Occupied, now)?
            .clone();
        let slot_id = request.allocated_slot_id.clone().unwrap_or_default();
        Ok(Outcome {
            request,
            message: format!("vehicle parked in slot {slot_id}"),
        })
    }

    /// The vehicle left; the slot goes back into circulation.
    pub fn release(&mut self, request_id: &str) -> Result<Outcome, EngineError> {
        let now = self.clock.now_ms();
        let request = self
            .registry
            .transition(request_id, RequestState::Released, now)?
            .clone();
        if let Some(slot_id) = &request.allocated_slot_id {
            // Slot gone means the host replaced topology underneath us;
            // nothing left to restore.
            let _ = self.topology.set_slot_availability(slot_id, true);
        }
        let slot_id = request.allocated_slot_id.clone().unwrap_or_default();
        Ok(Outcome {
            request,
            message: format!("slot {slot_id} released"),
        })
    }

    /// Abandon a request. An `Allocated` request gives its slot back;
    /// `allocated_slot_id` stays set as a historical record.
    pub fn cancel(&mut self, request_id: &str) -> Result<Outcome, EngineError> {
        let request = self.registry.guard(request_id, RequestState::Cancelled)?;
        let slot_to_free = if request.state == RequestState::Allocated {
            request.allocated_slot_id.clone()
        } else {
            None
        };
        let now = self.clock.now_ms();
        let request = self
            .registry
            .transition(request_id, RequestState::Cancelled, now)?
            .clone();
        let message = match &slot_to_free {
            Some(slot_id) => {
                let _ = self.topology.set_slot_availability(slot_id, true);
                format!("request {request_id} cancelled, slot {slot_id} freed")
            }
            None => format!("request {request_id} cancelled"),
        };
        Ok(Outcome { request, message })
    }

    /// Undo up to `k` allocations, newest first: each popped record
    /// restores the slot's recorded availability and the request's
    /// pre-operation state. Never a structured failure — asking for
    /// more than the log holds undoes everything and reports the
    /// actual count.
    pub fn rollback(&mut self, k: usize) -> RollbackReport {
        let mut rolled_back = 0;
        while rolled_back < k {
            let Some(record) = self.undo.pop() else { break };
            // Best-effort on the slot: it may have been replaced away
            // by a topology re-add. The request is restored regardless.
            let _ = self
                .topology
                .set_slot_availability(&record.slot_id, record.previous_slot_available);
            self.registry
                .restore_after_undo(&record.request_id, record.previous_request_state);
            rolled_back += 1;
        }
        if rolled_back > 0 {
            counter!(observability::ROLLBACKS_TOTAL).increment(rolled_back as u64);
        }
        gauge!(observability::UNDO_DEPTH).set(self.undo.len() as f64);
        RollbackReport { rolled_back }
    }
}
