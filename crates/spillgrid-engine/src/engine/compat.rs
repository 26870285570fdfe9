//! Function compatibility table.
//!
//! Functions added to Excel after the 2007 file format was frozen are stored
//! in SpreadsheetML behind a namespace prefix (`_xlfn.`). Readers that know the
//! function strip the prefix; older readers see an unknown name and keep the
//! cell text intact instead of rejecting the file. A few functions live in
//! the worksheet namespace and need `_xlfn._xlws.` instead.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

pub const XL_FN_PREFIX: &str = "_xlfn.";
pub const XL_WS_PREFIX: &str = "_xlfn._xlws.";

/// Namespace a function must be written under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionNamespace {
    /// `_xlfn.`: general future function.
    Future,
    /// `_xlfn._xlws.`: future function in the worksheet namespace.
    Worksheet,
}

impl FunctionNamespace {
    pub fn prefix(self) -> &'static str {
        match self {
            FunctionNamespace::Future => XL_FN_PREFIX,
            FunctionNamespace::Worksheet => XL_WS_PREFIX,
        }
    }
}

impl fmt::Display for FunctionNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

use FunctionNamespace::{Future, Worksheet};

// Keep this list sorted (ASCII) and upper-case.
const COMPATIBILITY_RULES: &[(&str, FunctionNamespace)] = &[
    ("ANCHORARRAY", Future),
    ("ARRAYTOTEXT", Future),
    ("BYCOL", Future),
    ("BYROW", Future),
    ("CHOOSECOLS", Future),
    ("CHOOSEROWS", Future),
    ("CONCAT", Future),
    ("DROP", Future),
    ("EXPAND", Future),
    ("FILTER", Worksheet),
    ("GROUPBY", Future),
    ("HSTACK", Future),
    ("IFNA", Future),
    ("IFS", Future),
    ("ISOMITTED", Future),
    ("LAMBDA", Future),
    ("LET", Future),
    ("MAKEARRAY", Future),
    ("MAP", Future),
    ("MAXIFS", Future),
    ("MINIFS", Future),
    ("PERCENTOF", Future),
    ("PIVOTBY", Future),
    ("RANDARRAY", Future),
    ("REDUCE", Future),
    ("SCAN", Future),
    ("SEQUENCE", Future),
    ("SINGLE", Future),
    ("SORT", Worksheet),
    ("SORTBY", Future),
    ("SWITCH", Future),
    ("TAKE", Future),
    ("TEXTAFTER", Future),
    ("TEXTBEFORE", Future),
    ("TEXTJOIN", Future),
    ("TEXTSPLIT", Future),
    ("TOCOL", Future),
    ("TOROW", Future),
    ("UNIQUE", Future),
    ("VALUETOTEXT", Future),
    ("VSTACK", Future),
    ("WRAPCOLS", Future),
    ("WRAPROWS", Future),
    ("XLOOKUP", Future),
    ("XMATCH", Future),
    ("XOR", Future),
];

fn table() -> &'static HashMap<&'static str, FunctionNamespace> {
    static TABLE: OnceLock<HashMap<&'static str, FunctionNamespace>> = OnceLock::new();
    TABLE.get_or_init(|| COMPATIBILITY_RULES.iter().copied().collect())
}

/// Look up the namespace a function name must be written under.
/// Matching is case-insensitive; `None` means the name needs no prefix.
pub fn function_namespace(name: &str) -> Option<FunctionNamespace> {
    if name.bytes().any(|b| b.is_ascii_lowercase()) {
        table().get(name.to_ascii_uppercase().as_str()).copied()
    } else {
        table().get(name).copied()
    }
}

/// All known rules, in table order.
pub fn compatibility_rules() -> impl Iterator<Item = (&'static str, FunctionNamespace)> {
    COMPATIBILITY_RULES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rules_are_sorted_unique_and_upper_case() {
        let mut prev: Option<&str> = None;
        let mut seen = HashSet::new();
        for (name, _) in COMPATIBILITY_RULES {
            if let Some(prev) = prev {
                assert!(prev < *name, "rules out of order: {prev} then {name}");
            }
            assert!(seen.insert(*name), "duplicate rule: {name}");
            assert_eq!(*name, name.to_ascii_uppercase());
            prev = Some(name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(function_namespace("unique"), Some(Future));
        assert_eq!(function_namespace("Sequence"), Some(Future));
        assert_eq!(function_namespace("sort"), Some(Worksheet));
    }

    #[test]
    fn legacy_functions_are_absent() {
        for name in ["SUM", "VLOOKUP", "IF", "INDEX", "SORTED"] {
            assert_eq!(function_namespace(name), None, "{name}");
        }
    }

    #[test]
    fn prefixes() {
        assert_eq!(Future.prefix(), "_xlfn.");
        assert_eq!(Worksheet.prefix(), "_xlfn._xlws.");
        assert_eq!(function_namespace("FILTER").map(|ns| ns.to_string()).as_deref(), Some("_xlfn._xlws."));
    }
}
