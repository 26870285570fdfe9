//! Formula rewriting for file-format compatibility.
//!
//! [`rewrite_formula`] prefixes every call to a function listed in the
//! compatibility table with its namespace (`SORT(` → `_xlfn._xlws.SORT(`).
//! [`strip_namespace_prefixes`] undoes that for display.
//!
//! Both scan the formula once, byte by byte. Text inside double-quoted string
//! literals (`""` escapes a quote) and single-quoted sheet names (`''`
//! escapes) is copied untouched, so `=COUNTIF(A:A,"SORT(")` keeps its
//! argument. Numeric literals are skipped whole so `1E5` is never mistaken
//! for an identifier.

use super::compat::{XL_FN_PREFIX, XL_WS_PREFIX, function_namespace};

fn is_ident_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Index just past the quoted run that opens at `start`.
/// An unterminated literal runs to the end of the input.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Walk the formula and report every function-call identifier as
/// `(start, end)` byte offsets. Identifiers are only reported when the byte
/// right after them is `(`.
fn for_each_call_site(formula: &str, mut visit: impl FnMut(usize, usize)) {
    let bytes = formula.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = skip_quoted(bytes, i);
        } else if b.is_ascii_digit() {
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
        } else if is_ident_start_byte(b) {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if bytes.get(i) == Some(&b'(') {
                visit(start, i);
            }
        } else {
            i += 1;
        }
    }
}

/// Prefix every call to a table function with its namespace.
///
/// Function names are matched case-insensitively and keep the case the caller
/// wrote. Calls that already carry a prefix read as a different identifier
/// and are left alone, so rewriting twice changes nothing.
pub fn rewrite_formula(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len() + 16);
    let mut copied = 0;
    for_each_call_site(formula, |start, end| {
        if let Some(namespace) = function_namespace(&formula[start..end]) {
            out.push_str(&formula[copied..start]);
            out.push_str(namespace.prefix());
            copied = start;
        }
    });
    out.push_str(&formula[copied..]);
    out
}

/// Remove `_xlfn.` / `_xlfn._xlws.` from function calls, e.g. to show a
/// stored formula the way a user typed it.
pub fn strip_namespace_prefixes(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut copied = 0;
    for_each_call_site(formula, |start, end| {
        let ident = &formula[start..end];
        let prefix_len = [XL_WS_PREFIX, XL_FN_PREFIX]
            .into_iter()
            .find(|prefix| {
                ident.len() > prefix.len()
                    && ident.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
            })
            .map(str::len);
        if let Some(prefix_len) = prefix_len {
            out.push_str(&formula[copied..start]);
            copied = start + prefix_len;
        }
    });
    out.push_str(&formula[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_worksheet_namespace_functions() {
        assert_eq!(
            rewrite_formula("=SORT(B2:B8,,-1)"),
            "=_xlfn._xlws.SORT(B2:B8,,-1)"
        );
        assert_eq!(
            rewrite_formula(r#"=FILTER(B2:B8,C2:C8="North")"#),
            r#"=_xlfn._xlws.FILTER(B2:B8,C2:C8="North")"#
        );
    }

    #[test]
    fn rewrites_future_functions() {
        assert_eq!(rewrite_formula("=UNIQUE(A1:A10)"), "=_xlfn.UNIQUE(A1:A10)");
        assert_eq!(rewrite_formula("=SEQUENCE(7)"), "=_xlfn.SEQUENCE(7)");
    }

    #[test]
    fn leaves_legacy_functions_byte_identical() {
        for formula in ["=SUM(A1:A10)", "=VLOOKUP(A1,B:C,2,FALSE)", "=A1*2", "=IF(A1>0,\"yes\",\"no\")"] {
            assert_eq!(rewrite_formula(formula), formula);
        }
    }

    #[test]
    fn rewrites_every_nested_call_site() {
        assert_eq!(
            rewrite_formula("=SORT(UNIQUE(FILTER(A2:A9,B2:B9>0)))"),
            "=_xlfn._xlws.SORT(_xlfn.UNIQUE(_xlfn._xlws.FILTER(A2:A9,B2:B9>0)))"
        );
        assert_eq!(
            rewrite_formula("=SUM(SEQUENCE(3))+SUM(SEQUENCE(4))"),
            "=SUM(_xlfn.SEQUENCE(3))+SUM(_xlfn.SEQUENCE(4))"
        );
    }

    #[test]
    fn keeps_original_case() {
        assert_eq!(rewrite_formula("=unique(a1:a3)"), "=_xlfn.unique(a1:a3)");
        assert_eq!(rewrite_formula("=Sort(A1:A3)"), "=_xlfn._xlws.Sort(A1:A3)");
    }

    #[test]
    fn ignores_string_literals() {
        assert_eq!(
            rewrite_formula(r#"=COUNTIF(A1:A9,"SORT(")"#),
            r#"=COUNTIF(A1:A9,"SORT(")"#
        );
        assert_eq!(
            rewrite_formula(r#"=CONCATENATE("say ""UNIQUE(x)""",UNIQUE(A1:A3))"#),
            r#"=CONCATENATE("say ""UNIQUE(x)""",_xlfn.UNIQUE(A1:A3))"#
        );
    }

    #[test]
    fn ignores_quoted_sheet_names() {
        assert_eq!(
            rewrite_formula("=SUM('SORT(data)'!A1:A3)"),
            "=SUM('SORT(data)'!A1:A3)"
        );
        assert_eq!(
            rewrite_formula("=UNIQUE('Bob''s'!A1:A3)"),
            "=_xlfn.UNIQUE('Bob''s'!A1:A3)"
        );
    }

    #[test]
    fn requires_call_position() {
        // A name not followed by `(` is a defined name, not a call.
        assert_eq!(rewrite_formula("=SORT+1"), "=SORT+1");
        assert_eq!(rewrite_formula("=SORT (A1:A3)"), "=SORT (A1:A3)");
        // Longer identifiers containing a table name are left alone.
        assert_eq!(rewrite_formula("=MYSORT(A1)"), "=MYSORT(A1)");
        assert_eq!(rewrite_formula("=SORT2(A1)"), "=SORT2(A1)");
    }

    #[test]
    fn skips_numeric_literals() {
        assert_eq!(rewrite_formula("=1E5+XOR(A1,B1)"), "=1E5+_xlfn.XOR(A1,B1)");
    }

    #[test]
    fn preserves_non_ascii_text() {
        assert_eq!(
            rewrite_formula("=FILTER(A2:A9,B2:B9=\"北\")"),
            "=_xlfn._xlws.FILTER(A2:A9,B2:B9=\"北\")"
        );
    }

    #[test]
    fn strip_reverses_rewrite() {
        for formula in [
            "=SORT(B2:B8,,-1)",
            "=UNIQUE(C2:C8)",
            r#"=FILTER(B2:B8,C2:C8="North")"#,
            "=SUM(SEQUENCE(7))",
        ] {
            assert_eq!(strip_namespace_prefixes(&rewrite_formula(formula)), formula);
        }
    }

    #[test]
    fn strip_ignores_literals_and_case() {
        assert_eq!(
            strip_namespace_prefixes(r#"=_XLFN.CONCAT("_xlfn.",_xlfn.SEQUENCE(1))"#),
            r#"=CONCAT("_xlfn.",SEQUENCE(1))"#
        );
    }
}
