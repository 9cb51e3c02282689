//! Ingress collaborator (C11)
//!
//! The engine consumes raw record blobs from an ingress collaborator; it
//! does not prescribe the transport. `Ingress` is the trait boundary;
//! `LineIngress` is the reference line-oriented adapter, reading
//! newline-delimited records from any `BufRead` and assigning `seq` in
//! read order.

use crate::record::RawRecord;
use std::io::BufRead;

/// Something that yields raw records in arrival order. `seq` must be
/// monotonic and is the sole ordering authority downstream.
pub trait Ingress {
    fn next_record(&mut self) -> Option<RawRecord>;
}

/// Reads one record per line from any `BufRead`, assigning `seq` as the
/// 0-indexed line number among non-empty lines.
pub struct LineIngress<R: BufRead> {
    reader: R,
    next_seq: u64,
}

impl<R: BufRead> LineIngress<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, next_seq: 0 }
    }
}

impl<R: BufRead> Ingress for LineIngress<R> {
    fn next_record(&mut self) -> Option<RawRecord> {
        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line).ok()?;
            if bytes_read == 0 {
                return None;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            let record = RawRecord::new(self.next_seq, trimmed.to_string());
            self.next_seq += 1;
            return Some(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn assigns_monotonic_seq_in_read_order() {
        let input = "line0\nline1\nline2\n";
        let mut ingress = LineIngress::new(Cursor::new(input));
        let r0 = ingress.next_record().unwrap();
        let r1 = ingress.next_record().unwrap();
        let r2 = ingress.next_record().unwrap();
        assert_eq!((r0.seq, r1.seq, r2.seq), (0, 1, 2));
        assert_eq!(r0.body, "line0");
        assert!(ingress.next_record().is_none());
    }

    #[test]
    fn blank_lines_are_skipped_without_consuming_a_seq() {
        let input = "a\n\nb\n";
        let mut ingress = LineIngress::new(Cursor::new(input));
        let r0 = ingress.next_record().unwrap();
        let r1 = ingress.next_record().unwrap();
        assert_eq!(r0.body, "a");
        assert_eq!(r1.body, "b");
        assert_eq!(r1.seq, 1);
    }
}
