mod error;
mod mutations;
mod queries;
mod registry;
mod topology;
mod undo;

pub use error::EngineError;

use std::collections::HashMap;

use crate::clock::{Clock, MonotonicClock};
use crate::ids::{IdSource, UlidIds};
use crate::model::{Vehicle, Zone};

use registry::RequestRegistry;
use topology::Topology;
use undo::UndoLog;

/// Construction-time knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Penalty reported on allocations that land in an adjacent zone.
    /// Opaque to the engine; it is stamped on the request and surfaced
    /// in the success message.
    pub cross_zone_penalty: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cross_zone_penalty: 10,
        }
    }
}

/// The façade. Every state change funnels through here: the topology
/// store owns slot availability, the registry owns request lifecycle,
/// the undo log owns rollback history. Mutations take `&mut self` —
/// the core is single-threaded and callers serialize access.
pub struct Engine {
    topology: Topology,
    registry: RequestRegistry,
    undo: UndoLog,
    vehicles: HashMap<String, Vehicle>,
    vehicle_order: Vec<String>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_parts(config, Box::new(MonotonicClock::new()), Box::new(UlidIds))
    }

    /// Full construction with injected collaborators. Hosts that need
    /// reproducible runs pass a [`StepClock`] and [`SequentialIds`].
    ///
    /// [`StepClock`]: crate::clock::StepClock
    /// [`SequentialIds`]: crate::ids::SequentialIds
    pub fn with_parts(
        config: EngineConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdSource>,
    ) -> Self {
        Self {
            topology: Topology::new(),
            registry: RequestRegistry::default(),
            undo: UndoLog::default(),
            vehicles: HashMap::new(),
            vehicle_order: Vec::new(),
            clock,
            ids,
            config,
        }
    }

    // ── Topology & vehicle admin ─────────────────────────────────

    /// Load or replace a zone. Hosts call this before traffic;
    /// re-adding an id replaces the record in place, and keeping the
    /// rest of the system consistent with a replacement (requests or
    /// log entries pointing into the old topology) is the host's
    /// problem.
    pub fn add_zone(&mut self, zone: Zone) -> Result<(), EngineError> {
        if zone.id.trim().is_empty() {
            return Err(EngineError::MalformedInput("zone id must not be empty"));
        }
        self.topology.insert_zone(zone)
    }

    /// Register or replace a vehicle.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<(), EngineError> {
        if vehicle.id.trim().is_empty() {
            return Err(EngineError::MalformedInput("vehicle id must not be empty"));
        }
        let id = vehicle.id.clone();
        if self.vehicles.insert(id.clone(), vehicle).is_none() {
            self.vehicle_order.push(id);
        }
        Ok(())
    }

    /// Declare two zones adjacent to each other (both directions).
    pub fn connect_zones(&mut self, a: &str, b: &str) -> Result<(), EngineError> {
        self.topology.connect(a, b)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
