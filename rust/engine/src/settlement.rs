use serde::{Deserialize, Serialize};

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Result of applying a finished game's outcome to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Settlement {
    /// The outcome was applied. `balance` is absent when `delta` was zero
    /// and the ledger was not contacted.
    Applied { delta: i64, balance: Option<u64> },
    /// An earlier call already settled this game.
    AlreadySettled,
}

impl Settlement {
    pub fn delta(&self) -> i64 {
        match self {
            Settlement::Applied { delta, .. } => *delta,
            Settlement::AlreadySettled => 0,
        }
    }
}

/// Which game produced a ledger movement.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Memory,
    HighLow,
    Gacha,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Memory => "memory",
            GameKind::HighLow => "high_low",
            GameKind::Gacha => "gacha",
        }
    }
}

/// One journaled ledger movement.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Unique identifier (format: YYYYMMDD-NNNNNN)
    pub id: String,
    pub user: String,
    pub game: GameKind,
    pub delta: i64,
    #[serde(default)]
    pub balance: Option<u64>,
    /// RFC3339 timestamp, filled in on write when missing
    #[serde(default)]
    pub ts: Option<String>,
}

pub fn format_settlement_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Append-only JSONL journal of settlements.
pub struct SettlementLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
    records: Vec<SettlementRecord>,
}

impl SettlementLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
            records: Vec::new(),
        })
    }

    /// Journal that only keeps records in memory.
    pub fn in_memory(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
            records: Vec::new(),
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_settlement_id(&self.date, self.seq)
    }

    pub fn record(
        &mut self,
        user: &str,
        game: GameKind,
        delta: i64,
        balance: Option<u64>,
    ) -> std::io::Result<SettlementRecord> {
        let rec = SettlementRecord {
            id: self.next_id(),
            user: user.to_string(),
            game,
            delta,
            balance,
            ts: None,
        };
        self.write(&rec)
    }

    pub fn write(&mut self, record: &SettlementRecord) -> std::io::Result<SettlementRecord> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        self.records.push(rec.clone());
        Ok(rec)
    }

    /// Records written through this logger since it was opened.
    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }
}

impl std::fmt::Debug for SettlementLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementLogger")
            .field("file_backed", &self.writer.is_some())
            .field("date", &self.date)
            .field("seq", &self.seq)
            .finish()
    }
}
