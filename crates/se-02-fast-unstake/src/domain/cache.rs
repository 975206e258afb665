//! # Scan Cache Record and Validation
//!
//! The persisted progress of a fast-unstake scan, and the pipeline that
//! decides whether a stored record can be resumed from.
//!
//! ## Validation Pipeline
//!
//! ```text
//! raw bytes
//!    │
//!    ├─ check_shape ──── isExposed: bool, checkedEras: [..] ── else Malformed
//!    ├─ check_types ──── every era a non-negative integer ──── else NotAnInteger
//!    ├─ drop_expired ─── keep era >= current - lookback, sort descending
//!    ├─ check_non_empty ─────────────────────────────────────── else Empty
//!    └─ check_contiguous ─ each era == previous - 1 ─────────── else Gap
//!    │
//!    ▼
//! Valid(record)
//! ```
//!
//! Stages short-circuit on the first failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Address, EraIndex, NetworkId};
use std::fmt;

/// Progress of one account's scan, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCacheRecord {
    /// Eras already checked, newest first, no gaps.
    pub checked_eras: Vec<EraIndex>,
    /// Whether any checked era exposed the account.
    pub is_exposed: bool,
}

impl ScanCacheRecord {
    /// Empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checked eras.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checked_eras.len()
    }

    /// Whether no era has been checked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checked_eras.is_empty()
    }

    /// Oldest checked era.
    #[must_use]
    pub fn oldest(&self) -> Option<EraIndex> {
        self.checked_eras.last().copied()
    }

    /// Whether `era` has already been checked.
    #[must_use]
    pub fn contains(&self, era: EraIndex) -> bool {
        self.checked_eras.contains(&era)
    }

    /// Record `era` as checked, keeping the list sorted newest first.
    ///
    /// Returns `false` if the era was already present.
    pub fn record_era(&mut self, era: EraIndex) -> bool {
        if self.contains(era) {
            return false;
        }
        self.checked_eras.push(era);
        self.checked_eras.sort_unstable_by(|a, b| b.cmp(a));
        true
    }

    /// Whether the whole window of `1 + lookback` eras has been checked.
    #[must_use]
    pub fn is_complete(&self, lookback: EraIndex) -> bool {
        self.len() >= window_len(lookback)
    }
}

/// Number of eras a full scan covers.
#[must_use]
pub fn window_len(lookback: EraIndex) -> usize {
    (lookback as usize).saturating_add(1)
}

/// Why a stored record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Not JSON, or missing/mistyped `isExposed` / `checkedEras`.
    Malformed,
    /// An element of `checkedEras` is not a non-negative integer era.
    NotAnInteger,
    /// Nothing left after dropping expired eras.
    Empty,
    /// Two neighbouring eras are not consecutive.
    Gap { newer: EraIndex, older: EraIndex },
}

impl InvalidReason {
    /// Metric label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            InvalidReason::Malformed => "malformed",
            InvalidReason::NotAnInteger => "not_an_integer",
            InvalidReason::Empty => "empty",
            InvalidReason::Gap { .. } => "gap",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Gap { newer, older } => write!(f, "gap between era {newer} and {older}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcome of validating a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValidation {
    /// Safe to resume from; eras are filtered and sorted.
    Valid(ScanCacheRecord),
    /// Must be discarded.
    Invalid(InvalidReason),
}

impl CacheValidation {
    /// The record, if valid.
    #[must_use]
    pub fn into_record(self) -> Option<ScanCacheRecord> {
        match self {
            CacheValidation::Valid(record) => Some(record),
            CacheValidation::Invalid(_) => None,
        }
    }
}

/// Validate a stored record against the current era and lookback window.
#[must_use]
pub fn validate(raw: &[u8], current_era: EraIndex, lookback: EraIndex) -> CacheValidation {
    let run = || -> Result<ScanCacheRecord, InvalidReason> {
        let value: Value = serde_json::from_slice(raw).map_err(|_| InvalidReason::Malformed)?;
        let (is_exposed, raw_eras) = check_shape(&value)?;
        let eras = check_types(raw_eras)?;
        let eras = drop_expired(eras, current_era, lookback);
        check_non_empty(&eras)?;
        check_contiguous(&eras)?;
        Ok(ScanCacheRecord {
            checked_eras: eras,
            is_exposed,
        })
    };

    match run() {
        Ok(record) => CacheValidation::Valid(record),
        Err(reason) => CacheValidation::Invalid(reason),
    }
}

fn check_shape(value: &Value) -> Result<(bool, &[Value]), InvalidReason> {
    let is_exposed = value
        .get("isExposed")
        .and_then(Value::as_bool)
        .ok_or(InvalidReason::Malformed)?;
    let eras = value
        .get("checkedEras")
        .and_then(Value::as_array)
        .ok_or(InvalidReason::Malformed)?;
    Ok((is_exposed, eras.as_slice()))
}

fn check_types(raw: &[Value]) -> Result<Vec<EraIndex>, InvalidReason> {
    raw.iter()
        .map(|v| as_era(v).ok_or(InvalidReason::NotAnInteger))
        .collect()
}

fn as_era(value: &Value) -> Option<EraIndex> {
    if let Some(n) = value.as_u64() {
        return EraIndex::try_from(n).ok();
    }
    // `1200.0` is an integer too
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(EraIndex::MAX) {
        Some(f as EraIndex)
    } else {
        None
    }
}

fn drop_expired(mut eras: Vec<EraIndex>, current_era: EraIndex, lookback: EraIndex) -> Vec<EraIndex> {
    let floor = current_era.saturating_sub(lookback);
    eras.retain(|era| *era >= floor);
    eras.sort_unstable_by(|a, b| b.cmp(a));
    eras
}

fn check_non_empty(eras: &[EraIndex]) -> Result<(), InvalidReason> {
    if eras.is_empty() {
        Err(InvalidReason::Empty)
    } else {
        Ok(())
    }
}

fn check_contiguous(eras: &[EraIndex]) -> Result<(), InvalidReason> {
    for pair in eras.windows(2) {
        let (newer, older) = (pair[0], pair[1]);
        if newer.checked_sub(1) != Some(older) {
            return Err(InvalidReason::Gap { newer, older });
        }
    }
    Ok(())
}

/// Storage key for an account's scan record.
#[must_use]
pub fn cache_key(network: &NetworkId, account: &Address, suffix: &str) -> String {
    format!("{network}_{suffix}_{account}")
}
