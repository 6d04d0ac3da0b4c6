//! [`MemoEntry`]: the per-`(clause, position)` cache cell that also
//! implements the left-recursion seed-growing protocol (spec.md §4.2).
//!
//! Every field is independently interior-mutable (`Cell`/`RefCell`) rather
//! than the entry being wrapped in one exclusive lock, because the
//! expansion loop below recurses back into the parser — which, for a
//! left-recursive clause, re-enters *this very entry*. Holding a `RefMut`
//! across that recursion would deadlock (well, panic) against itself.

use std::cell::{Cell, RefCell};

use crate::clause::Clause;
use crate::match_result::MatchResult;
use crate::parser::Parser;

pub struct MemoEntry<'g> {
    result: RefCell<Option<MatchResult<'g>>>,
    in_rec_path: Cell<bool>,
    found_left_rec: Cell<bool>,
    memo_version: Cell<u32>,
    cached_in_recovery_phase: Cell<bool>,
}

impl<'g> MemoEntry<'g> {
    pub fn new() -> Self {
        MemoEntry {
            result: RefCell::new(None),
            in_rec_path: Cell::new(false),
            found_left_rec: Cell::new(false),
            memo_version: Cell::new(0),
            cached_in_recovery_phase: Cell::new(false),
        }
    }

    /// Match `clause` at `pos`, handling cache validity, left-recursion
    /// cycle detection, and seed-growing expansion.
    pub fn r#match(
        &self,
        parser: &Parser<'g>,
        clause: &'g Clause,
        pos: usize,
        bound: Option<&'g Clause>,
    ) -> MatchResult<'g> {
        // Cache validation: version must match, and either the phase
        // matches or the cached result is complete/non-mismatch/non-LR.
        if let Some(cached) = self.result.borrow().clone() {
            if self.memo_version.get() == parser.memo_version_at(pos) {
                let phase_matches = self.cached_in_recovery_phase.get() == parser.in_recovery_phase();

                // A phase-1 complete top-level result that fell short of EOF
                // must be retried once phase 2 starts, not reused.
                let is_stale_top_level_partial = !cached.is_mismatch()
                    && cached.is_complete()
                    && pos == 0
                    && cached.pos() + cached.len() < parser.input_len()
                    && !phase_matches;

                if !is_stale_top_level_partial {
                    let reusable = (!cached.is_mismatch() && cached.is_complete() && !self.found_left_rec.get())
                        || phase_matches;
                    if reusable {
                        parser.record_cache_hit();
                        return cached;
                    }
                }
            }
        }

        // Left-recursion cycle detection: a recursive re-entry into a
        // call still on the stack.
        if self.in_rec_path.get() {
            let has_seed = self.result.borrow().is_some();
            if !has_seed {
                self.found_left_rec.set(true);
                self.result.replace(Some(MatchResult::Mismatch));
                return MatchResult::LrPending;
            }
            let seed = self.result.borrow().clone().unwrap();
            if seed.is_mismatch() {
                return MatchResult::LrPending;
            }
            return seed;
        }

        self.in_rec_path.set(true);

        // Clear stale results before the expansion loop starts.
        let stale = {
            let current = self.result.borrow();
            match current.as_ref() {
                Some(_) => {
                    self.memo_version.get() != parser.memo_version_at(pos)
                        || (self.found_left_rec.get()
                            && self.cached_in_recovery_phase.get() != parser.in_recovery_phase())
                }
                None => false,
            }
        };
        if stale {
            self.result.replace(None);
        }

        loop {
            parser.record_match();
            let new_result = clause.r#match(parser, pos, bound);

            let keep_going = match self.result.borrow().as_ref() {
                Some(prev) => new_result.len() > prev.len(),
                None => true,
            };
            if !keep_going {
                break;
            }

            self.result.replace(Some(new_result));

            if !self.found_left_rec.get() {
                break;
            }

            parser.record_lr_expansion();
            parser.bump_memo_version(pos);
            self.memo_version.set(parser.memo_version_at(pos));
        }

        self.in_rec_path.set(false);
        self.memo_version.set(parser.memo_version_at(pos));
        self.cached_in_recovery_phase.set(parser.in_recovery_phase());

        if self.found_left_rec.get() {
            let result = self.result.borrow().clone().unwrap();
            if !result.is_mismatch() && !result.is_from_lr_context() {
                let marked = result.with_lr_context();
                self.result.replace(Some(marked.clone()));
                return marked;
            }
            return result;
        }

        self.result.borrow().clone().unwrap()
    }
}

impl<'g> Default for MemoEntry<'g> {
    fn default() -> Self {
        Self::new()
    }
}
