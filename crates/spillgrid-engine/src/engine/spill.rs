//! Spill bindings: a rewritten formula tied to the range it spills over.

use tracing::debug;

use super::cell_ref::CellRef;
use super::range::CellRange;
use super::rewrite::rewrite_formula;
use crate::error::{EngineError, Result};

/// A dynamic-array formula bound to its target range.
///
/// Built once per request and handed straight to a serializer; only the
/// cells it writes outlive it.
#[derive(Clone, Debug, PartialEq)]
pub struct SpillBinding {
    anchor: CellRef,
    range: CellRange,
    formula: String,
}

impl SpillBinding {
    /// Bind `formula` to `range`, anchoring it at the range's top-left cell.
    ///
    /// The formula is trimmed and run through [`rewrite_formula`]. It must
    /// start with `=`; anything else (including an empty string) fails with
    /// [`EngineError::EmptyFormula`].
    pub fn bind(range: CellRange, formula: &str) -> Result<SpillBinding> {
        let trimmed = formula.trim();
        if !trimmed.starts_with('=') {
            return Err(EngineError::EmptyFormula(formula.to_string()));
        }

        let rewritten = rewrite_formula(trimmed);
        if rewritten != trimmed {
            debug!(original = trimmed, rewritten = %rewritten, "rewrote formula for compatibility");
        }

        let binding = SpillBinding {
            anchor: range.start(),
            range,
            formula: rewritten,
        };
        debug_assert_eq!(binding.anchor, binding.range.start());
        Ok(binding)
    }

    pub fn anchor(&self) -> CellRef {
        self.anchor
    }

    pub fn range(&self) -> CellRange {
        self.range
    }

    /// The rewritten formula text, leading `=` included.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Every cell of the range except the anchor.
    pub fn members(&self) -> impl Iterator<Item = CellRef> {
        let anchor = self.anchor;
        self.range.cells().filter(move |cell| *cell != anchor)
    }
}
