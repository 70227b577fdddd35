//! Append-only journal of everything the exchange did.
//!
//! ## Frame Format
//!
//! Each entry encodes as:
//!
//! | Bytes | Field |
//! |-------|-------|
//! | 8 | entry sequence (LE) |
//! | 1 | record tag |
//! | n | SSZ payload (`Order`, `Trade` or `Checkpoint`) |
//!
//! [`AuditLog::encode`] concatenates frames, each prefixed with its length
//! as a u32 (LE), so an external writer can persist the log as one blob.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;
use thiserror::Error;

use crate::types::{Order, Trade};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("ssz encoding failed: {0}")]
    Encode(String),

    #[error("ssz decoding failed: {0}")]
    Decode(String),

    #[error("unknown audit record tag {0}")]
    UnknownTag(u8),

    #[error("audit frame truncated")]
    Truncated,
}

/// Book state at a point in time, with activity counters.
///
/// The state root is [`OrderBook::state_root`](crate::orderbook::OrderBook::state_root):
/// two runs that fed the same requests produce the same checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Checkpoint {
    /// Checkpoint number, starting at 1
    pub checkpoint_id: u64,

    /// Orders accepted since the exchange started
    pub orders_processed: u64,

    /// Trades executed since the exchange started
    pub trades_executed: u64,

    /// SHA-256 over resting orders in priority order
    pub state_root: [u8; 32],

    /// Exchange clock at the checkpoint
    pub timestamp: u64,
}

impl Checkpoint {
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Trades per accepted order, None before any order
    pub fn fill_rate(&self) -> Option<f64> {
        if self.orders_processed == 0 {
            None
        } else {
            Some(self.trades_executed as f64 / self.orders_processed as f64)
        }
    }
}

/// One journal record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRecord {
    /// An order after its submission (or amendment) was processed
    Accepted(Order),
    Trade(Trade),
    Cancelled(Order),
    Checkpoint(Checkpoint),
}

impl AuditRecord {
    fn tag(&self) -> u8 {
        match self {
            AuditRecord::Accepted(_) => 0,
            AuditRecord::Trade(_) => 1,
            AuditRecord::Cancelled(_) => 2,
            AuditRecord::Checkpoint(_) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub sequence: u64,
    pub record: AuditRecord,
}

fn encode_err<E: std::fmt::Debug>(e: E) -> AuditError {
    AuditError::Encode(format!("{:?}", e))
}

fn decode_err<E: std::fmt::Debug>(e: E) -> AuditError {
    AuditError::Decode(format!("{:?}", e))
}

impl AuditEntry {
    /// Encode as one frame (without the length prefix)
    pub fn encode(&self) -> Result<Vec<u8>, AuditError> {
        let payload = match &self.record {
            AuditRecord::Accepted(order) | AuditRecord::Cancelled(order) => {
                ssz_rs::serialize(order).map_err(encode_err)?
            }
            AuditRecord::Trade(trade) => ssz_rs::serialize(trade).map_err(encode_err)?,
            AuditRecord::Checkpoint(cp) => ssz_rs::serialize(cp).map_err(encode_err)?,
        };

        let mut frame = Vec::with_capacity(9 + payload.len());
        frame.extend_from_slice(&self.sequence.to_le_bytes());
        frame.push(self.record.tag());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode one frame produced by [`AuditEntry::encode`]
    pub fn decode(frame: &[u8]) -> Result<Self, AuditError> {
        if frame.len() < 9 {
            return Err(AuditError::Truncated);
        }
        let mut seq = [0u8; 8];
        seq.copy_from_slice(&frame[..8]);
        let payload = &frame[9..];

        let record = match frame[8] {
            0 => AuditRecord::Accepted(ssz_rs::deserialize::<Order>(payload).map_err(decode_err)?),
            1 => AuditRecord::Trade(ssz_rs::deserialize::<Trade>(payload).map_err(decode_err)?),
            2 => AuditRecord::Cancelled(ssz_rs::deserialize::<Order>(payload).map_err(decode_err)?),
            3 => AuditRecord::Checkpoint(
                ssz_rs::deserialize::<Checkpoint>(payload).map_err(decode_err)?,
            ),
            tag => return Err(AuditError::UnknownTag(tag)),
        };

        Ok(Self {
            sequence: u64::from_le_bytes(seq),
            record,
        })
    }
}

/// In-memory append-only journal
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its sequence (starting at 1)
    pub fn append(&mut self, record: AuditRecord) -> u64 {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(AuditEntry { sequence, record });
        sequence
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_checkpoint(&self) -> Option<&Checkpoint> {
        self.entries.iter().rev().find_map(|entry| match &entry.record {
            AuditRecord::Checkpoint(cp) => Some(cp),
            _ => None,
        })
    }

    /// Every entry as a length-prefixed frame
    pub fn encode(&self) -> Result<Vec<u8>, AuditError> {
        let mut out = Vec::new();
        for entry in &self.entries {
            let frame = entry.encode()?;
            out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            out.extend_from_slice(&frame);
        }
        Ok(out)
    }

    /// Split a blob from [`AuditLog::encode`] back into entries
    pub fn decode(mut bytes: &[u8]) -> Result<Self, AuditError> {
        let mut log = Self::new();
        while !bytes.is_empty() {
            if bytes.len() < 4 {
                return Err(AuditError::Truncated);
            }
            let mut len = [0u8; 4];
            len.copy_from_slice(&bytes[..4]);
            let len = u32::from_le_bytes(len) as usize;
            let frame = bytes.get(4..4 + len).ok_or(AuditError::Truncated)?;
            log.entries.push(AuditEntry::decode(frame)?);
            bytes = &bytes[4 + len..];
        }
        Ok(log)
    }

    /// SHA-256 of [`AuditLog::encode`]
    pub fn digest(&self) -> Result<[u8; 32], AuditError> {
        let mut hasher = Sha256::new();
        hasher.update(self.encode()?);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&hasher.finalize());
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn sample_log() -> AuditLog {
        let mut log = AuditLog::new();
        let mut order = Order::limit(3, Side::Buy, 100, 5);
        order.id = 1;
        order.sequence = 1;
        log.append(AuditRecord::Accepted(order.clone()));
        log.append(AuditRecord::Trade(Trade::new(1, 1, 2, 3, 4, Side::Sell, 100, 2, 9)));
        order.cancel();
        log.append(AuditRecord::Cancelled(order));
        log.append(AuditRecord::Checkpoint(Checkpoint {
            checkpoint_id: 1,
            orders_processed: 2,
            trades_executed: 1,
            state_root: [7u8; 32],
            timestamp: 9,
        }));
        log
    }

    #[test]
    fn test_sequences_are_contiguous() {
        let log = sample_log();
        let seqs: Vec<u64> = log.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        assert_eq!(log.last_checkpoint().map(|cp| cp.checkpoint_id), Some(1));
    }

    #[test]
    fn test_encode_decode_log() {
        let log = sample_log();
        let bytes = log.encode().unwrap();
        let decoded = AuditLog::decode(&bytes).unwrap();
        assert_eq!(decoded.entries(), log.entries());
    }

    #[test]
    fn test_frame_layout() {
        let log = sample_log();
        let frame = log.entries()[0].encode().unwrap();
        // sequence + tag + 59-byte order
        assert_eq!(frame.len(), 8 + 1 + 59);
        assert_eq!(&frame[..8], &1u64.to_le_bytes());
        assert_eq!(frame[8], 0);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(AuditEntry::decode(&[0u8; 4]), Err(AuditError::Truncated));

        let mut frame = sample_log().entries()[1].encode().unwrap();
        frame[8] = 42;
        assert_eq!(AuditEntry::decode(&frame), Err(AuditError::UnknownTag(42)));

        assert_eq!(AuditLog::decode(&[10, 0, 0, 0, 1]).unwrap_err(), AuditError::Truncated);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(sample_log().digest().unwrap(), sample_log().digest().unwrap());
        assert_ne!(sample_log().digest().unwrap(), AuditLog::new().digest().unwrap());
    }

    #[test]
    fn test_checkpoint_fill_rate() {
        let cp = Checkpoint::default();
        assert_eq!(cp.fill_rate(), None);
        assert_eq!(cp.state_root_hex().len(), 64);
    }
}
