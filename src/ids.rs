use ulid::Ulid;

/// Id factory for engine-generated identifiers. Ids are opaque strings;
/// only stability and uniqueness are contractual.
pub trait IdSource {
    fn request_id(&mut self) -> String;
    fn operation_id(&mut self) -> String;
}

/// Default source: `REQ-`/`OP-` prefix over a ULID, which carries the
/// monotonic-plus-random suffix the id contract asks for.
#[derive(Default)]
pub struct UlidIds;

impl IdSource for UlidIds {
    fn request_id(&mut self) -> String {
        format!("REQ-{}", Ulid::new())
    }

    fn operation_id(&mut self) -> String {
        format!("OP-{}", Ulid::new())
    }
}

/// Sequential source for deterministic hosts and tests:
/// `REQ-000001`, `OP-000001`, …
#[derive(Default)]
pub struct SequentialIds {
    requests: u64,
    operations: u64,
}

impl IdSource for SequentialIds {
    fn request_id(&mut self) -> String {
        self.requests += 1;
        format!("REQ-{:06}", self.requests)
    }

    fn operation_id(&mut self) -> String {
        self.operations += 1;
        format!("OP-{:06}", self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulid_ids_carry_prefixes_and_stay_unique() {
        let mut ids = UlidIds;
        let a = ids.request_id();
        let b = ids.request_id();
        assert!(a.starts_with("REQ-"));
        assert!(ids.operation_id().starts_with("OP-"));
        assert_ne!(a, b);
    }

    #[test]
    fn sequential_ids_count_independently() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.request_id(), "REQ-000001");
        assert_eq!(ids.request_id(), "REQ-000002");
        assert_eq!(ids.operation_id(), "OP-000001");
    }
}
