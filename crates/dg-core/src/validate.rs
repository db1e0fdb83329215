//! Boundary validation for placement records.
//!
//! Reports structural problems without modifying anything. A `Board`
//! refuses record sets with error-severity findings; warnings are logged.

use crate::id::{DashboardId, WidgetId};
use crate::model::PlacementRecord;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The record set cannot be laid out as-is.
    Error,
    /// Layout works, but an at-rest invariant is broken.
    Warning,
}

/// A single finding about one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDiagnostic {
    pub id: WidgetId,
    pub message: String,
    pub severity: Severity,
    /// Short rule identifier (e.g. "zero-span", "overlap").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run every rule over `records` for one dashboard on a `size × size` grid.
#[must_use]
pub fn validate_records(
    records: &[PlacementRecord],
    dashboard: DashboardId,
    size: u16,
) -> Vec<RecordDiagnostic> {
    let mut diags = Vec::new();
    check_dashboard(records, dashboard, &mut diags);
    check_duplicate_ids(records, &mut diags);
    check_spans(records, size, &mut diags);
    check_overlaps(records, &mut diags);
    diags
}

/// Whether any finding is an error.
pub fn has_errors(diags: &[RecordDiagnostic]) -> bool {
    diags.iter().any(|d| d.severity == Severity::Error)
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn check_dashboard(
    records: &[PlacementRecord],
    dashboard: DashboardId,
    diags: &mut Vec<RecordDiagnostic>,
) {
    for r in records.iter().filter(|r| r.dashboard_id != dashboard) {
        diags.push(RecordDiagnostic {
            id: r.id,
            message: format!(
                "`{}` belongs to dashboard `{}`, not `{dashboard}`",
                r.id, r.dashboard_id
            ),
            severity: Severity::Error,
            rule: "foreign-dashboard",
        });
    }
}

fn check_duplicate_ids(records: &[PlacementRecord], diags: &mut Vec<RecordDiagnostic>) {
    let mut seen = HashSet::new();
    for r in records {
        if !seen.insert(r.id) {
            diags.push(RecordDiagnostic {
                id: r.id,
                message: format!("`{}` appears more than once", r.id),
                severity: Severity::Error,
                rule: "duplicate-id",
            });
        }
    }
}

fn check_spans(records: &[PlacementRecord], size: u16, diags: &mut Vec<RecordDiagnostic>) {
    for r in records {
        if r.width == 0 || r.height == 0 {
            diags.push(RecordDiagnostic {
                id: r.id,
                message: format!("`{}` has an empty span {}×{}", r.id, r.width, r.height),
                severity: Severity::Error,
                rule: "zero-span",
            });
        } else if !r.rect().fits_within(size) {
            diags.push(RecordDiagnostic {
                id: r.id,
                message: format!("`{}` at {} leaves the {size}×{size} grid", r.id, r.rect()),
                severity: Severity::Error,
                rule: "out-of-bounds",
            });
        }
    }
}

fn check_overlaps(records: &[PlacementRecord], diags: &mut Vec<RecordDiagnostic>) {
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            if a.id != b.id && a.rect().intersects(&b.rect()) {
                diags.push(RecordDiagnostic {
                    id: b.id,
                    message: format!("`{}` overlaps `{}`", b.id, a.id),
                    severity: Severity::Warning,
                    rule: "overlap",
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridRect;

    fn record(id: &str, rect: GridRect) -> PlacementRecord {
        PlacementRecord::new(
            WidgetId::intern(id),
            DashboardId::intern("validate_tests"),
            "note",
            rect,
        )
    }

    fn rules(diags: &[RecordDiagnostic]) -> Vec<&'static str> {
        diags.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn clean_layout_has_no_findings() {
        let records = vec![
            record("a", GridRect::new(0, 0, 2, 2)),
            record("b", GridRect::new(2, 0, 2, 1)),
        ];
        let diags = validate_records(&records, DashboardId::intern("validate_tests"), 4);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn zero_span_and_out_of_bounds_are_errors() {
        let records = vec![
            record("flat", GridRect::new(0, 0, 0, 1)),
            record("spill", GridRect::new(3, 3, 2, 1)),
        ];
        let diags = validate_records(&records, DashboardId::intern("validate_tests"), 4);
        assert_eq!(rules(&diags), vec!["zero-span", "out-of-bounds"]);
        assert!(has_errors(&diags));
    }

    #[test]
    fn overlap_is_a_warning() {
        let records = vec![
            record("a", GridRect::new(0, 0, 2, 2)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ];
        let diags = validate_records(&records, DashboardId::intern("validate_tests"), 4);
        assert_eq!(rules(&diags), vec!["overlap"]);
        assert!(!has_errors(&diags));
    }

    #[test]
    fn duplicate_and_foreign_records_are_errors() {
        let mut stray = record("stray", GridRect::new(3, 3, 1, 1));
        stray.dashboard_id = DashboardId::intern("elsewhere");
        let records = vec![
            record("dup", GridRect::new(0, 0, 1, 1)),
            record("dup", GridRect::new(1, 0, 1, 1)),
            stray,
        ];
        let diags = validate_records(&records, DashboardId::intern("validate_tests"), 4);
        assert_eq!(rules(&diags), vec!["foreign-dashboard", "duplicate-id"]);
    }
}
