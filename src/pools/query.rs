/// Read-side projections over a snapshot
///
/// All functions are pure: same records and arguments, same output. Ordering
/// is by effective yield descending; `sort_by` is stable, so equal yields keep
/// their input order.
use super::types::{PoolRecord, ProtocolYield};
use std::cmp::Ordering;

/// Highest `n` effective yields among records with a non-empty project
///
/// Repeated projects (e.g. one per chain) each get their own entry.
pub fn top_by_yield(records: &[PoolRecord], n: i64) -> Vec<ProtocolYield> {
    if n <= 0 {
        return Vec::new();
    }
    let limit = usize::try_from(n).unwrap_or(usize::MAX);

    let mut ranked: Vec<ProtocolYield> = records
        .iter()
        .filter(|record| record.has_project())
        .map(ProtocolYield::from_record)
        .collect();
    sort_by_yield_desc(&mut ranked);
    ranked.truncate(limit);
    ranked
}

/// Every record whose project contains `term` (case-insensitive), best yield first
///
/// The term is used literally; blank-term handling belongs to the caller.
pub fn search_by_project(records: &[PoolRecord], term: &str) -> Vec<ProtocolYield> {
    let needle = term.to_lowercase();

    let mut matches: Vec<ProtocolYield> = records
        .iter()
        .filter(|record| record.has_project() && record.project.to_lowercase().contains(&needle))
        .map(ProtocolYield::from_record)
        .collect();
    sort_by_yield_desc(&mut matches);
    matches
}

/// Effective yield of the first record whose project equals `project_name`
/// ignoring case, or 0.0 when there is none
pub fn lookup_by_exact_project(records: &[PoolRecord], project_name: &str) -> f64 {
    let wanted = project_name.to_lowercase();
    records
        .iter()
        .find(|record| record.has_project() && record.project.to_lowercase() == wanted)
        .map(PoolRecord::effective_yield_pct)
        .unwrap_or(0.0)
}

fn sort_by_yield_desc(entries: &mut [ProtocolYield]) {
    entries.sort_by(|a, b| b.apy.partial_cmp(&a.apy).unwrap_or(Ordering::Equal));
}
