//! Human-readable simulation report (the `.sim.txt` artifact).

use crate::trace::{EventData, SimTrace};
use std::fmt::Write;

/// Render a plain-text summary of the final simulation state.
pub fn render_report(trace: &SimTrace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SEMANTIC FIELD SIMULATION");
    let _ = writeln!(out, "{}", "=".repeat(40));

    for (name, field) in &trace.fields {
        let _ = writeln!(out, "field {name}: base = {}", field.base);
    }
    for (name, defect) in &trace.defects {
        let _ = writeln!(
            out,
            "defects {name}: {} site(s), density {:.4}, phase {:.2} rad",
            defect.coords.len(),
            defect.density,
            defect.phase
        );
    }
    if let Some(obs) = &trace.latest_obs {
        let _ = writeln!(
            out,
            "observed T_eff -> {} = {} (base {} + defects {:.4} + field {:.4})",
            obs.into, obs.t_eff, obs.base, obs.defects_term, obs.field_term
        );
    }
    if let Some((window, series)) = last_hysteresis(trace) {
        if !series.is_empty() {
            let (min, max) = min_max(series);
            let _ = writeln!(
                out,
                "hysteresis trace: {window} point(s) in [{min:.4}, {max:.4}]"
            );
        }
    }
    if !trace.measurements.is_empty() {
        let pairs: Vec<String> = trace
            .measurements
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let _ = writeln!(out, "measurements: {}", pairs.join(", "));
    }

    let fields: Vec<&str> = trace.fields.keys().map(String::as_str).collect();
    let defects: Vec<&str> = trace.defects.keys().map(String::as_str).collect();
    let _ = writeln!(
        out,
        "final state: fields=[{}] defects=[{}]",
        fields.join(", "),
        defects.join(", ")
    );
    out
}

fn last_hysteresis(trace: &SimTrace) -> Option<(u32, &[f64])> {
    trace.events.iter().rev().find_map(|event| match &event.data {
        EventData::Hysteresis { window, trace } => Some((*window, trace.as_slice())),
        _ => None,
    })
}

fn min_max(series: &[f64]) -> (f64, f64) {
    series.iter().fold((f64::MAX, f64::MIN), |(min, max), &x| {
        (min.min(x), max.max(x))
    })
}
