use crate::model::RequestState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Request, zone, or slot id does not exist.
    NotFound(String),
    /// The lifecycle table forbids this transition.
    InvalidTransition {
        request_id: String,
        from: RequestState,
        to: RequestState,
    },
    /// Neither the requested zone nor any adjacent zone has a free slot.
    NoAvailableSlots(String),
    /// Empty or otherwise unusable identifier.
    MalformedInput(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::InvalidTransition {
                request_id,
                from,
                to,
            } => {
                write!(f, "request {request_id}: invalid transition {from} -> {to}")
            }
            EngineError::NoAvailableSlots(zone_id) => {
                write!(f, "no available slots in zone {zone_id} or its adjacent zones")
            }
            EngineError::MalformedInput(what) => write!(f, "malformed input: {what}"),
        }
    }
}

impl std::error::Error for EngineError {}
