//! Parser work counters, threaded through [`crate::parser::Parser`] as a
//! plain field rather than process-global state (see SPEC_FULL.md §4.11).
//! Used to validate the engine's linear-time behavior in tests.

#[derive(Debug, Default, Clone, Copy)]
pub struct ParserStats {
    clause_matches: u64,
    cache_hits: u64,
    lr_expansions: u64,
    recovery_attempts: u64,
}

impl ParserStats {
    /// Total clause-match attempts (cache hits not included) — the
    /// quantity that should scale linearly with input length.
    pub fn total_work(&self) -> u64 {
        self.clause_matches
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn lr_expansions(&self) -> u64 {
        self.lr_expansions
    }

    pub fn recovery_attempts(&self) -> u64 {
        self.recovery_attempts
    }

    pub fn reset(&mut self) {
        *self = ParserStats::default();
    }

    pub(crate) fn record_match(&mut self) {
        self.clause_matches += 1;
    }

    pub(crate) fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub(crate) fn record_lr_expansion(&mut self) {
        self.lr_expansions += 1;
    }

    pub(crate) fn record_recovery(&mut self) {
        self.recovery_attempts += 1;
    }
}
