use std::collections::HashMap;

use crate::model::{Ms, ParkingRequest, RequestState};

use super::EngineError;

/// Request records keyed by id, enumerable in creation order. All
/// user-visible state changes go through [`transition`], which is the
/// single place the lifecycle table is enforced.
///
/// [`transition`]: RequestRegistry::transition
#[derive(Default)]
pub struct RequestRegistry {
    requests: HashMap<String, ParkingRequest>,
    order: Vec<String>,
}

impl RequestRegistry {
    pub fn insert(&mut self, request: ParkingRequest) {
        self.order.push(request.id.clone());
        self.requests.insert(request.id.clone(), request);
    }

    pub fn get(&self, id: &str) -> Option<&ParkingRequest> {
        self.requests.get(id)
    }

    pub fn expect(&self, id: &str) -> Result<&ParkingRequest, EngineError> {
        self.requests
            .get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Requests in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ParkingRequest> {
        self.order.iter().map(|id| &self.requests[id])
    }

    /// Check a transition without applying it. Lets callers validate
    /// everything up front and only then mutate, so failed operations
    /// leave no partial state behind.
    pub fn guard(&self, id: &str, to: RequestState) -> Result<&ParkingRequest, EngineError> {
        let request = self.expect(id)?;
        if !request.state.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                request_id: id.to_string(),
                from: request.state,
                to,
            });
        }
        Ok(request)
    }

    /// Apply a lifecycle transition: validate against the table, set
    /// the state, stamp the timestamp that belongs to the entered
    /// state.
    pub fn transition(
        &mut self,
        id: &str,
        to: RequestState,
        now: Ms,
    ) -> Result<&mut ParkingRequest, EngineError> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        if !request.state.can_transition_to(to) {
            return Err(EngineError::InvalidTransition {
                request_id: id.to_string(),
                from: request.state,
                to,
            });
        }
        request.state = to;
        match to {
            RequestState::Allocated => request.allocated_at = Some(now),
            RequestState::Occupied => request.occupied_at = Some(now),
            RequestState::Released => request.released_at = Some(now),
            RequestState::Cancelled => request.cancelled_at = Some(now),
            RequestState::Requested => {}
        }
        Ok(request)
    }

    /// Rollback-only restore. Deliberately bypasses the lifecycle
    /// table: undo re-applies a recorded pre-state, it is not a
    /// user-requested transition. Restoring `Requested` also clears
    /// the allocation fields so the record reads as it did before the
    /// allocation happened.
    pub(super) fn restore_after_undo(&mut self, id: &str, state: RequestState) {
        if let Some(request) = self.requests.get_mut(id) {
            request.state = state;
            if state == RequestState::Requested {
                request.allocated_slot_id = None;
                request.allocated_zone_id = None;
                request.allocated_at = None;
                request.cross_zone = false;
                request.cross_zone_penalty = 0;
            }
        }
    }
}
