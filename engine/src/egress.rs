//! Egress collaborator and emitter (C9, C11)
//!
//! `Egress` is the trait boundary the driver hands each `Decision` to, in
//! `seq` order; emission is effect-only and never influences engine
//! state. `LineEgress` writes the minimal `{id, customer_id, accepted}`
//! contract (§6.2); `AuditEgress` writes the richer optional record to a
//! second stream. Both are line-delimited JSON via `serde_json`, matching
//! every other wire shape in this crate.

use crate::decision::Decision;
use serde::Serialize;
use std::io::{self, Write};

/// Something that accepts decisions in `seq` order. Emission is
/// effect-only: it never feeds back into engine state.
pub trait Egress {
    fn emit(&mut self, decision: &Decision) -> io::Result<()>;
}

/// Minimal output record (§6.2): `{id, customer_id, accepted}`, in field
/// order, one JSON object per line.
#[derive(Serialize)]
struct MinimalRecord<'a> {
    id: &'a str,
    customer_id: &'a str,
    accepted: bool,
}

/// Writes the minimal decision stream.
pub struct LineEgress<W: Write> {
    writer: W,
}

impl<W: Write> LineEgress<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush the underlying writer, e.g. to force a buffered stdout sink
    /// to surface before process exit.
    pub fn flush_inner(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Egress for LineEgress<W> {
    fn emit(&mut self, decision: &Decision) -> io::Result<()> {
        let record = MinimalRecord {
            id: &decision.load_id,
            customer_id: &decision.customer_id,
            accepted: decision.accepted(),
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.writer.write_all(b"\n")
    }
}

/// Richer audit record (§6.2, optional): `seq`, `reasons`,
/// `snapshot_before`, `snapshot_after`, `canonical_seq`,
/// `effective_amount`, in addition to the minimal fields.
#[derive(Serialize)]
struct AuditRecord<'a> {
    seq: u64,
    id: &'a str,
    customer_id: &'a str,
    accepted: bool,
    reasons: &'a [crate::decision::ReasonCode],
    snapshot_before: Option<crate::window::Snapshot>,
    snapshot_after: Option<crate::window::Snapshot>,
    canonical_seq: u64,
    effective_amount: Option<crate::money::Money>,
}

/// Writes the optional audit stream. Deterministic whenever enabled: the
/// same decision sequence always produces the same audit bytes.
pub struct AuditEgress<W: Write> {
    writer: W,
}

impl<W: Write> AuditEgress<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush the underlying writer.
    pub fn flush_inner(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Egress for AuditEgress<W> {
    fn emit(&mut self, decision: &Decision) -> io::Result<()> {
        let record = AuditRecord {
            seq: decision.seq,
            id: &decision.load_id,
            customer_id: &decision.customer_id,
            accepted: decision.accepted(),
            reasons: &decision.reasons,
            snapshot_before: decision.snapshot_before,
            snapshot_after: decision.snapshot_after,
            canonical_seq: decision.canonical_seq,
            effective_amount: decision.effective_amount,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.writer.write_all(b"\n")
    }
}
