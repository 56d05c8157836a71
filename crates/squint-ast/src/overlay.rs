//! Overlay annotations on control operations.
//!
//! An overlay is an ordered key/value list attached to a `ctrl` statement:
//! timing (`coherence_len ≥ 80ns`), connectivity (`path_len ≤ 2`), field
//! coupling (`damping = η(Φ=Phi)`, `braid = D`), and Floquet scheduling
//! (`floquet_period`, `cycles`, `duty`, `phase_step`).
//!
//! Entries keep the raw source value; [`OverlayEntry::normalize`] produces
//! the tagged [`OverlayValue`] that the validator classifies and the
//! emitter consumes. Unknown keys normalize to [`OverlayValue::Unknown`]
//! and never halt compilation.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Relation written between an overlay key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOp {
    /// `≥` (or ASCII `>=`)
    Ge,
    /// `≤` (or ASCII `<=`)
    Le,
    /// `==`
    EqEq,
    /// `=`
    Assign,
    /// Bare key with no value; reads as `key = true`.
    Flag,
}

/// One `key <op> value` item of an overlay clause, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    pub key: String,
    pub op: OverlayOp,
    pub value: String,
}

impl OverlayEntry {
    pub fn new(key: impl Into<String>, op: OverlayOp, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }

    /// The entry's value in its normalized textual form: relational
    /// operators keep an ASCII prefix (`>=80ns`, `<=2`), plain assignments
    /// are the bare value, and a flag key reads `true`.
    pub fn raw(&self) -> String {
        match self.op {
            OverlayOp::Ge => format!(">={}", self.value),
            OverlayOp::Le => format!("<={}", self.value),
            OverlayOp::EqEq | OverlayOp::Assign => self.value.clone(),
            OverlayOp::Flag => "true".to_owned(),
        }
    }

    /// Normalize this entry into a tagged value.
    pub fn normalize(&self) -> OverlayValue {
        let raw = self.raw();
        match self.key.as_str() {
            "coherence_len" => raw
                .strip_prefix(">=")
                .and_then(parse_ns)
                .map_or(OverlayValue::Malformed, OverlayValue::CoherenceLenNs),
            "path_len" => raw
                .strip_prefix("<=")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .map_or(OverlayValue::Malformed, OverlayValue::PathLenMax),
            "damping" => parse_eta_phi(&raw)
                .map_or(OverlayValue::Malformed, OverlayValue::Damping),
            "braid" => OverlayValue::Braid(raw),
            "floquet_period" => parse_ns_loose(&raw)
                .filter(|&ns| ns > 0)
                .map_or(OverlayValue::Malformed, OverlayValue::FloquetPeriodNs),
            "cycles" => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|&n| n >= 1)
                .map_or(OverlayValue::Malformed, OverlayValue::Cycles),
            "duty" => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|d| *d > 0.0 && *d <= 1.0)
                .map_or(OverlayValue::Malformed, OverlayValue::Duty),
            "phase_step" => parse_deg(&raw)
                .map_or(OverlayValue::Malformed, OverlayValue::PhaseStepDeg),
            "span" => OverlayValue::SpanHint,
            "coherence_budget" => OverlayValue::CoherenceBudget,
            _ => OverlayValue::Unknown,
        }
    }
}

/// Normalized overlay value (see the validator for classification rules).
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayValue {
    CoherenceLenNs(u64),
    PathLenMax(u32),
    Damping(String),
    Braid(String),
    FloquetPeriodNs(u64),
    Cycles(u32),
    Duty(f64),
    PhaseStepDeg(f64),
    /// `span` — accepted, not enforced.
    SpanHint,
    /// `coherence_budget` — accepted, not enforced.
    CoherenceBudget,
    /// Unrecognized key.
    Unknown,
    /// Recognized key whose value did not parse.
    Malformed,
}

/// Ordered overlay clause. Empty for every non-`ctrl` operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    entries: Vec<OverlayEntry>,
}

impl Overlay {
    pub fn new(entries: Vec<OverlayEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&OverlayEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Well-formed `coherence_len ≥ N` value, if present.
    pub fn coherence_len_ns(&self) -> Option<u64> {
        match self.get("coherence_len")?.normalize() {
            OverlayValue::CoherenceLenNs(ns) => Some(ns),
            _ => None,
        }
    }

    /// Complete, well-formed Floquet schedule. All three of
    /// `floquet_period`, `cycles`, `duty` must be present and parse;
    /// a partial key set means no expansion.
    pub fn floquet(&self) -> Option<FloquetParams> {
        let period_ns = match self.get("floquet_period")?.normalize() {
            OverlayValue::FloquetPeriodNs(ns) => ns,
            _ => return None,
        };
        let cycles = match self.get("cycles")?.normalize() {
            OverlayValue::Cycles(n) => n,
            _ => return None,
        };
        let duty = match self.get("duty")?.normalize() {
            OverlayValue::Duty(d) => d,
            _ => return None,
        };
        let phase_step_deg = match self.get("phase_step").map(|e| e.normalize()) {
            Some(OverlayValue::PhaseStepDeg(deg)) => deg,
            _ => 0.0,
        };
        Some(FloquetParams {
            period_ns,
            cycles,
            duty,
            phase_step_deg,
        })
    }
}

impl Serialize for Overlay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.raw())?;
        }
        map.end()
    }
}

/// Parameters of a Floquet cycle train.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloquetParams {
    pub period_ns: u64,
    pub cycles: u32,
    pub duty: f64,
    pub phase_step_deg: f64,
}

impl FloquetParams {
    /// ON window per cycle, `round(period · duty)` ns.
    pub fn on_ns(&self) -> u64 {
        let on = (self.period_ns as f64 * self.duty).round();
        (on as u64).min(self.period_ns)
    }

    /// OFF window per cycle, the remainder of the period.
    pub fn off_ns(&self) -> u64 {
        self.period_ns - self.on_ns()
    }
}

/// Parse a strict nanosecond quantity: `80ns` (integer, suffix required).
fn parse_ns(s: &str) -> Option<u64> {
    s.trim().strip_suffix("ns")?.trim().parse::<u64>().ok()
}

/// Parse a lenient nanosecond quantity: `50ns` or a bare number.
fn parse_ns_loose(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_suffix("ns").unwrap_or(s).trim();
    let value = s.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

/// Parse a degree quantity: `12deg` or a bare number.
fn parse_deg(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix("deg").unwrap_or(s).trim();
    s.parse::<f64>().ok()
}

/// Extract the field name from `η(Φ=Phi)` or `eta(Phi=Phi)`.
pub fn parse_eta_phi(expr: &str) -> Option<String> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    for prefix in ["η(Φ=", "eta(Phi=", "η(Phi="] {
        if let Some(rest) = compact.strip_prefix(prefix) {
            let name = rest.strip_suffix(')')?;
            if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Some(name.to_owned());
            }
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, op: OverlayOp, value: &str) -> OverlayEntry {
        OverlayEntry::new(key, op, value)
    }

    #[test]
    fn coherence_len_requires_ge_and_ns() {
        assert_eq!(
            entry("coherence_len", OverlayOp::Ge, "80ns").normalize(),
            OverlayValue::CoherenceLenNs(80)
        );
        assert_eq!(
            entry("coherence_len", OverlayOp::Ge, "80").normalize(),
            OverlayValue::Malformed
        );
        assert_eq!(
            entry("coherence_len", OverlayOp::Le, "80ns").normalize(),
            OverlayValue::Malformed
        );
    }

    #[test]
    fn path_len_requires_le_integer() {
        assert_eq!(
            entry("path_len", OverlayOp::Le, "2").normalize(),
            OverlayValue::PathLenMax(2)
        );
        assert_eq!(
            entry("path_len", OverlayOp::Ge, "2").normalize(),
            OverlayValue::Malformed
        );
        assert_eq!(
            entry("path_len", OverlayOp::Le, "two").normalize(),
            OverlayValue::Malformed
        );
    }

    #[test]
    fn damping_accepts_both_spellings() {
        assert_eq!(
            entry("damping", OverlayOp::Assign, "η(Φ=Phi)").normalize(),
            OverlayValue::Damping("Phi".to_owned())
        );
        assert_eq!(
            entry("damping", OverlayOp::Assign, "eta(Phi=Psi)").normalize(),
            OverlayValue::Damping("Psi".to_owned())
        );
        assert_eq!(
            entry("damping", OverlayOp::Assign, "gamma(Phi)").normalize(),
            OverlayValue::Malformed
        );
    }

    #[test]
    fn floquet_parameters() {
        assert_eq!(
            entry("floquet_period", OverlayOp::Assign, "50ns").normalize(),
            OverlayValue::FloquetPeriodNs(50)
        );
        assert_eq!(
            entry("cycles", OverlayOp::Assign, "8").normalize(),
            OverlayValue::Cycles(8)
        );
        assert_eq!(
            entry("duty", OverlayOp::Assign, "0.4").normalize(),
            OverlayValue::Duty(0.4)
        );
        assert_eq!(
            entry("duty", OverlayOp::Assign, "1.5").normalize(),
            OverlayValue::Malformed
        );
        assert_eq!(
            entry("phase_step", OverlayOp::Assign, "12deg").normalize(),
            OverlayValue::PhaseStepDeg(12.0)
        );
    }

    #[test]
    fn floquet_schedule_requires_all_three_keys() {
        let partial = Overlay::new(vec![
            entry("floquet_period", OverlayOp::Assign, "50ns"),
            entry("cycles", OverlayOp::Assign, "8"),
        ]);
        assert_eq!(partial.floquet(), None);

        let complete = Overlay::new(vec![
            entry("floquet_period", OverlayOp::Assign, "50ns"),
            entry("cycles", OverlayOp::Assign, "8"),
            entry("duty", OverlayOp::Assign, "0.4"),
        ]);
        let params = complete.floquet().expect("schedule");
        assert_eq!(params.on_ns(), 20);
        assert_eq!(params.off_ns(), 30);
        assert_eq!(params.phase_step_deg, 0.0);
    }

    #[test]
    fn full_duty_has_no_off_window() {
        let params = FloquetParams {
            period_ns: 50,
            cycles: 2,
            duty: 1.0,
            phase_step_deg: 0.0,
        };
        assert_eq!(params.on_ns(), 50);
        assert_eq!(params.off_ns(), 0);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        assert_eq!(
            entry("chirp", OverlayOp::Assign, "fast").normalize(),
            OverlayValue::Unknown
        );
        assert_eq!(entry("span", OverlayOp::Flag, "").normalize(), OverlayValue::SpanHint);
    }

    #[test]
    fn raw_form_keeps_ascii_prefixes() {
        assert_eq!(entry("coherence_len", OverlayOp::Ge, "80ns").raw(), ">=80ns");
        assert_eq!(entry("path_len", OverlayOp::Le, "2").raw(), "<=2");
        assert_eq!(entry("braid", OverlayOp::Assign, "D").raw(), "D");
        assert_eq!(entry("span", OverlayOp::Flag, "").raw(), "true");
    }
}
