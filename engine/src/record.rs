//! Raw ingress record
//!
//! A `RawRecord` is the opaque unit the driver pulls from an ingress
//! collaborator. It carries nothing but a transport-assigned `seq` and the
//! undecoded body; C1 is the only component that looks inside the body.

/// A single input line, tagged with its arrival position.
///
/// `seq` is the sole ordering authority for output: the i-th emitted
/// decision corresponds to the i-th `RawRecord`, not to `event_time` order.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub seq: u64,
    pub body: String,
}

impl RawRecord {
    pub fn new(seq: u64, body: impl Into<String>) -> Self {
        Self {
            seq,
            body: body.into(),
        }
    }
}
