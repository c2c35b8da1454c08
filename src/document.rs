//! Outgoing document rewriting.
//!
//! Type-name tagging adds `__typename` to every selection set below an
//! operation's root so a normalizing cache can key objects by type. The
//! subgraph client ships with it switched off, in which case documents are
//! sent exactly as written.

use std::borrow::Cow;

const TYPENAME: &[u8] = b"__typename";

/// Returns the document that will actually be sent
pub fn prepare(query: &str, add_typename: bool) -> Cow<'_, str> {
    if add_typename {
        Cow::Owned(add_typename_to_document(query))
    } else {
        Cow::Borrowed(query)
    }
}

/// Inserts `__typename` into every non-root selection set.
///
/// Fragment definitions are tagged at their top level too, operation roots
/// are not. Braces inside argument lists, strings and comments are not
/// selection sets and are left untouched.
pub fn add_typename_to_document(query: &str) -> String {
    let bytes = query.as_bytes();
    let mut out = String::with_capacity(query.len() + 64);
    let mut copied = 0;
    let mut i = 0;
    let mut parens = 0usize;
    let mut braces = 0usize;
    let mut in_fragment = false;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'"' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'{' if parens == 0 => {
                let is_root = braces == 0 && !in_fragment;
                braces += 1;
                if !is_root && !starts_with_typename(bytes, i + 1) {
                    out.push_str(&query[copied..=i]);
                    out.push_str(" __typename");
                    copied = i + 1;
                }
            }
            b'}' if parens == 0 => {
                braces = braces.saturating_sub(1);
                if braces == 0 {
                    in_fragment = false;
                }
            }
            // variable names are never keywords
            b'$' => {
                i += 1;
                while i < bytes.len() && is_name_continue(bytes[i]) {
                    i += 1;
                }
                continue;
            }
            c if braces == 0 && parens == 0 && is_name_start(c) => {
                let start = i;
                while i < bytes.len() && is_name_continue(bytes[i]) {
                    i += 1;
                }
                match &query[start..i] {
                    "fragment" => in_fragment = true,
                    "query" | "mutation" | "subscription" => in_fragment = false,
                    _ => {}
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&query[copied..]);
    out
}

/// Index just past the string literal starting at `start`
fn skip_string(bytes: &[u8], start: usize) -> usize {
    if bytes[start..].starts_with(b"\"\"\"") {
        let mut i = start + 3;
        while i < bytes.len() {
            if bytes[i] == b'\\' && bytes[i + 1..].starts_with(b"\"\"\"") {
                i += 4;
                continue;
            }
            if bytes[i..].starts_with(b"\"\"\"") {
                return i + 3;
            }
            i += 1;
        }
        return bytes.len();
    }

    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn starts_with_typename(bytes: &[u8], mut i: usize) -> bool {
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\n' | b'\r' | b',' => i += 1,
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => break,
        }
    }
    bytes[i..].starts_with(TYPENAME)
        && bytes
            .get(i + TYPENAME.len())
            .map_or(true, |&c| !is_name_continue(c))
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_disabled_is_identity() {
        let query = "query { domains(first: 5) { id name owner { id } } }";
        let prepared = prepare(query, false);
        assert!(matches!(prepared, Cow::Borrowed(_)));
        assert_eq!(prepared, query);
        assert!(!prepared.contains("__typename"));
    }

    #[test]
    fn test_root_selection_set_is_not_tagged() {
        assert_eq!(add_typename_to_document("{ domains }"), "{ domains }");
        assert_eq!(
            add_typename_to_document("query Q { domains { id } }"),
            "query Q { domains { __typename id } }"
        );
    }

    #[test]
    fn test_nested_and_fragment_sets_are_tagged() {
        let query = "query { domains { id owner { id } ...D } }\nfragment D on Domain { name }";
        assert_eq!(
            add_typename_to_document(query),
            "query { domains { __typename id owner { __typename id } ...D } }\n\
             fragment D on Domain { __typename name }"
        );
    }

    #[test]
    fn test_arguments_strings_and_comments_are_skipped() {
        let query = "query { domains(where: { name: \"a{b\" }) { id } # { not a set\n}";
        assert_eq!(
            add_typename_to_document(query),
            "query { domains(where: { name: \"a{b\" }) { __typename id } # { not a set\n}"
        );
    }

    #[test]
    fn test_existing_typename_is_not_duplicated() {
        let query = "{ domains { __typename id } }";
        assert_eq!(add_typename_to_document(query), query);

        // a field that merely starts with the same characters still gets tagged
        assert_eq!(
            add_typename_to_document("{ a { __typenameish } }"),
            "{ a { __typename __typenameish } }"
        );
    }

    #[test]
    fn test_keyword_named_variables_keep_root_untagged() {
        assert_eq!(
            add_typename_to_document("query Q($fragment: Int) { a { b } }"),
            "query Q($fragment: Int) { a { __typename b } }"
        );
        assert_eq!(
            add_typename_to_document("query Q($x: fragment = 1) { a { b } }"),
            "query Q($x: fragment = 1) { a { __typename b } }"
        );
    }

    #[test]
    fn test_block_string_argument() {
        let query = "{ a(desc: \"\"\"{ \\\"\"\" }\"\"\") { id } }";
        assert_eq!(
            add_typename_to_document(query),
            "{ a(desc: \"\"\"{ \\\"\"\" }\"\"\") { __typename id } }"
        );
    }
}
