//! Calibrated Mølmer–Sørensen phases.
//!
//! Driving an XX interaction on a pair of ions leaves each ion with a
//! device-specific phase offset that must be unwound around the pulse. The
//! offsets are measured per unordered pair during calibration; which offset
//! applies to which wire depends on how the gate is oriented.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use tern_ir::QubitId;

use crate::error::{CompileError, CompileResult};

/// One calibration record: the phase offsets for an ion pair.
///
/// `phases.0` belongs to the lower-numbered ion, `phases.1` to the higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsPhaseEntry {
    /// The ion pair, in any order.
    pub pair: (u32, u32),
    /// Phase offsets for (lower ion, higher ion).
    pub phases: (f64, f64),
}

/// Calibrated MS phase offsets, keyed by unordered ion pair.
#[derive(Debug, Clone, Default)]
pub struct MsPhaseMap {
    phases: FxHashMap<(u32, u32), (f64, f64)>,
}

impl MsPhaseMap {
    /// Create an empty phase map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the phase offsets for an ion pair.
    ///
    /// `phase1` belongs to `q1` and `phase2` to `q2`; the pair may be given
    /// in either order and later inserts overwrite earlier ones.
    pub fn insert(&mut self, q1: QubitId, q2: QubitId, phase1: f64, phase2: f64) {
        if q1.0 <= q2.0 {
            self.phases.insert((q1.0, q2.0), (phase1, phase2));
        } else {
            self.phases.insert((q2.0, q1.0), (phase2, phase1));
        }
    }

    /// Look up the offsets for an oriented (control, target) pair.
    ///
    /// Returns `(control_phase, target_phase)`, swapping the stored offsets
    /// when the orientation runs against the stored order.
    pub fn lookup(&self, control: QubitId, target: QubitId) -> CompileResult<(f64, f64)> {
        let (key, swapped) = if control.0 <= target.0 {
            ((control.0, target.0), false)
        } else {
            ((target.0, control.0), true)
        };
        match self.phases.get(&key) {
            Some(&(lo, hi)) if swapped => Ok((hi, lo)),
            Some(&(lo, hi)) => Ok((lo, hi)),
            None => Err(CompileError::MissingMsPhase(control.0, target.0)),
        }
    }

    /// Check if a pair has a calibration record.
    pub fn contains(&self, q1: QubitId, q2: QubitId) -> bool {
        let key = if q1.0 <= q2.0 {
            (q1.0, q2.0)
        } else {
            (q2.0, q1.0)
        };
        self.phases.contains_key(&key)
    }

    /// Number of calibrated pairs.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Check if no pairs are calibrated.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Zero offsets for every pair among the first `n` ions.
    ///
    /// Matches an ideal device; useful for tests and simulation.
    pub fn zeros(n: u32) -> Self {
        let mut map = Self::new();
        for a in 0..n {
            for b in (a + 1)..n {
                map.insert(QubitId(a), QubitId(b), 0.0, 0.0);
            }
        }
        map
    }

    /// Export the calibration records in stored-pair order.
    pub fn entries(&self) -> Vec<MsPhaseEntry> {
        let mut out: Vec<_> = self
            .phases
            .iter()
            .map(|(&pair, &phases)| MsPhaseEntry { pair, phases })
            .collect();
        out.sort_by_key(|e| e.pair);
        out
    }
}

impl FromIterator<MsPhaseEntry> for MsPhaseMap {
    fn from_iter<T: IntoIterator<Item = MsPhaseEntry>>(iter: T) -> Self {
        let mut map = Self::new();
        for entry in iter {
            map.insert(
                QubitId(entry.pair.0),
                QubitId(entry.pair.1),
                entry.phases.0,
                entry.phases.1,
            );
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        let mut map = MsPhaseMap::new();
        map.insert(QubitId(0), QubitId(1), 0.25, -0.5);

        assert_eq!(map.lookup(QubitId(0), QubitId(1)).unwrap(), (0.25, -0.5));
        assert_eq!(map.lookup(QubitId(1), QubitId(0)).unwrap(), (-0.5, 0.25));
    }

    #[test]
    fn test_insert_reversed_pair() {
        let mut map = MsPhaseMap::new();
        map.insert(QubitId(3), QubitId(1), 0.1, 0.2);

        // 0.1 stays with ion 3 regardless of storage order
        assert_eq!(map.lookup(QubitId(3), QubitId(1)).unwrap(), (0.1, 0.2));
        assert_eq!(map.lookup(QubitId(1), QubitId(3)).unwrap(), (0.2, 0.1));
    }

    #[test]
    fn test_missing_pair() {
        let map = MsPhaseMap::zeros(2);
        let err = map.lookup(QubitId(0), QubitId(5)).unwrap_err();
        assert!(matches!(err, CompileError::MissingMsPhase(0, 5)));
    }

    #[test]
    fn test_zeros() {
        let map = MsPhaseMap::zeros(3);
        assert_eq!(map.len(), 3);
        assert_eq!(map.lookup(QubitId(2), QubitId(0)).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_entries_round_trip() {
        let mut map = MsPhaseMap::new();
        map.insert(QubitId(0), QubitId(2), 0.3, 0.4);
        map.insert(QubitId(1), QubitId(2), -0.1, 0.0);

        let json = serde_json::to_string(&map.entries()).unwrap();
        let entries: Vec<MsPhaseEntry> = serde_json::from_str(&json).unwrap();
        let back: MsPhaseMap = entries.into_iter().collect();

        assert_eq!(back.lookup(QubitId(0), QubitId(2)).unwrap(), (0.3, 0.4));
        assert_eq!(back.lookup(QubitId(2), QubitId(1)).unwrap(), (0.0, -0.1));
    }
}
