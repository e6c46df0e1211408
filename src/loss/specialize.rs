//! Process-wide specialization cache for compiled loss shapes.
//!
//! Purpose
//! -------
//! Track which `(distribution shape, condition shapes)` combinations have
//! already had a loss graph compiled, so repeated fits with the same
//! shapes reuse the validated plan instead of re-deriving it, and so a
//! trace event fires exactly once per new shape.
//!
//! Key behaviors
//! -------------
//! - [`intern`]: double-checked insert under a `parking_lot` RwLock. The
//!   first caller for a key emits one `tracing::debug!` event and bumps
//!   the key's specialization counter; later callers take the read path.
//! - [`touch`]: records a reuse of an already-interned key (one per loss
//!   or gradient evaluation).
//! - Per-key counters rather than global ones, so concurrent fits with
//!   different shapes never perturb each other's statistics.
//!
//! Invariants & assumptions
//! ------------------------
//! - The cache only grows; keys are never evicted. Shape cardinality is
//!   tiny in practice (a handful of distribution/condition combinations
//!   per process).
//! - Counters are relaxed atomics: they feed diagnostics and tests, not
//!   control flow.
//!
//! Downstream usage
//! ----------------
//! - `CompiledLoss::new` interns its key(s); `value`/`grad` touch them.
use crate::{conditions::ConditionFixed, dist::DistFixed};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        OnceLock,
    },
};

/// Cache key: the static shape of one compiled loss graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecKey {
    pub dist: DistFixed,
    pub conditions: Vec<ConditionFixed>,
}

#[derive(Debug, Default)]
struct SpecEntry {
    specializations: AtomicU64,
    hits: AtomicU64,
}

static CACHE: OnceLock<RwLock<HashMap<SpecKey, SpecEntry>>> = OnceLock::new();

fn cache() -> &'static RwLock<HashMap<SpecKey, SpecEntry>> {
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Longest condition-parameter repr carried into the one-time trace event.
const PARAMS_REPR_LEN: usize = 96;

/// Truncate a condition-parameter repr for the one-time trace event.
pub(crate) fn truncate_repr(mut repr: String) -> String {
    if repr.len() > PARAMS_REPR_LEN {
        repr.truncate(PARAMS_REPR_LEN);
        repr.push_str("..");
    }
    repr
}

/// Intern `key`, compiling it on first sight.
///
/// `condition_params` is a truncated repr of the conditions' numeric
/// payloads, logged only in the first-sight trace event.
///
/// Returns `true` if this call specialized the key (first sight anywhere
/// in the process), `false` if the key was already interned.
pub fn intern(key: &SpecKey, condition_params: &str) -> bool {
    {
        let map = cache().read();
        if map.contains_key(key) {
            return false;
        }
    }
    let mut map = cache().write();
    // Double-check: another thread may have interned between the locks.
    if map.contains_key(key) {
        return false;
    }
    tracing::debug!(
        dist = key.dist.kind().name(),
        dist_fixed = ?key.dist,
        conditions = ?key.conditions,
        condition_params,
        "specializing loss graph for new shape"
    );
    let entry = SpecEntry::default();
    entry.specializations.fetch_add(1, Ordering::Relaxed);
    map.insert(key.clone(), entry);
    true
}

/// Record one reuse of an interned key. Interns the key first if needed.
pub fn touch(key: &SpecKey) {
    {
        let map = cache().read();
        if let Some(entry) = map.get(key) {
            entry.hits.fetch_add(1, Ordering::Relaxed);
            return;
        }
    }
    intern(key, "");
    let map = cache().read();
    if let Some(entry) = map.get(key) {
        entry.hits.fetch_add(1, Ordering::Relaxed);
    }
}

/// How many times `key` was specialized (0 if never seen, 1 afterwards).
pub fn times_specialized(key: &SpecKey) -> u64 {
    cache().read().get(key).map_or(0, |e| e.specializations.load(Ordering::Relaxed))
}

/// How many evaluations have reused `key` since it was interned.
pub fn times_hit(key: &SpecKey) -> u64 {
    cache().read().get(key).map_or(0, |e| e.hits.load(Ordering::Relaxed))
}

/// Total number of distinct shapes interned by this process.
pub fn specialization_count() -> usize {
    cache().read().len()
}
