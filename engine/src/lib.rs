//! Fund-load adjudication engine
//!
//! A deterministic, stream-oriented engine that classifies fund-load
//! attempts as accepted or declined against per-customer velocity
//! policies (daily attempt count, daily/weekly accepted amount) and an
//! idempotency rule over a reused load identifier. Exactly one decision
//! is emitted per input record, in strict input order: `seq`, not event
//! time, is the sole ordering authority.
//!
//! # Architecture
//!
//! - **record**: the opaque, `seq`-tagged ingress unit
//! - **event**: parsing and normalization of a raw record (C1)
//! - **time_keys**: UTC day / ISO-Monday week bucket derivation (C2)
//! - **fingerprint**: canonical payload hashing for idempotency (C3)
//! - **idempotency**: the `load_id -> IdempotencyRecord` gate (C3)
//! - **features**: effective amount and tag derivation (C4)
//! - **window**: mutable per-customer counters and amounts (C5)
//! - **policy**: the ordered rule evaluator (C6)
//! - **commit**: verdict-to-delta translation (C7)
//! - **driver**: per-record orchestration, in `seq` order (C8)
//! - **ingress** / **egress**: transport-boundary collaborators (C9, C11)
//! - **scenario**: validated scenario/profile configuration (C10)
//! - **money**: fixed-point decimal money, scale 2
//! - **error**: fatal, non-local invariant-breach errors
//!
//! # Critical invariants
//!
//! 1. All money values are `i64` minor units at scale 2; no floating point.
//! 2. Exactly one decision is emitted per input record, in input order.
//! 3. Replays and conflicts never mutate window or idempotency state.

pub mod commit;
pub mod decision;
pub mod driver;
pub mod egress;
pub mod error;
pub mod event;
pub mod features;
pub mod fingerprint;
pub mod idempotency;
pub mod ingress;
pub mod money;
pub mod policy;
pub mod record;
pub mod scenario;
pub mod time_keys;
pub mod window;

pub use decision::{Decision, ReasonCode, Status};
pub use driver::Driver;
pub use error::EngineError;
pub use event::{Event, ParseError};
pub use money::Money;
pub use record::RawRecord;
pub use scenario::{ConfigError, Scenario, ScenarioBuilder};
