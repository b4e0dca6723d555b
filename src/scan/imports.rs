//! Import statement scanner.
//!
//! Extracts the targets of contiguous `import <path> [as <alias>]`
//! statements at the lexical head of a file. Scanning stops at the first
//! line that is a real statement but not an import; imports appearing after
//! that line are intentionally not discovered (precision/speed trade-off
//! relied upon by change-impact callers).

use std::collections::BTreeSet;

const TRIPLE_DOUBLE: &str = "\"\"\"";
const TRIPLE_SINGLE: &str = "'''";

/// Returns the raw import targets found in `code`, sorted and deduplicated.
pub fn scan_imports(code: &str) -> Vec<String> {
    let mut found = BTreeSet::new();
    let mut long_str_delim: Option<&str> = None;

    for raw_line in code.lines() {
        let mut line = raw_line.trim();
        if let Some(idx) = line.find('#') {
            line = line[..idx].trim_end();
        }
        if line.is_empty() {
            continue;
        }

        // Inside a triple-quoted string, consume lines until the closing
        // delimiter.
        if let Some(delim) = long_str_delim {
            if line.ends_with(delim) {
                long_str_delim = None;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix(TRIPLE_DOUBLE) {
            if !rest.ends_with(TRIPLE_DOUBLE) {
                long_str_delim = Some(TRIPLE_DOUBLE);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix(TRIPLE_SINGLE) {
            if !rest.ends_with(TRIPLE_SINGLE) {
                long_str_delim = Some(TRIPLE_SINGLE);
            }
            continue;
        }
        // Bare string-literal statements.
        if line.starts_with('"') || line.starts_with('\'') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };
        // Imports only occur at the head of the file.
        if !first.starts_with("import") {
            break;
        }
        if let Some(target) = fields.next() {
            let target = target.trim_matches(|c| c == '"' || c == '\'');
            found.insert(target.to_string());
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_aliased_imports() {
        let code = "import base.b\nimport base.frontend as fe\nimport .sibling\n";
        assert_eq!(scan_imports(code), vec![".sibling", "base.b", "base.frontend"]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let code = "# header comment\n\nimport a  # trailing\n   # indented comment\nimport b\n";
        assert_eq!(scan_imports(code), vec!["a", "b"]);
    }

    #[test]
    fn stops_at_first_non_import_statement() {
        let code = "import a\nx = 1\nimport b\n";
        assert_eq!(scan_imports(code), vec!["a"]);
    }

    #[test]
    fn long_strings_are_skipped() {
        let code = concat!(
            "\"\"\"\n",
            "import not_an_import\n",
            "\"\"\"\n",
            "'''single style\n",
            "still inside\n",
            "'''\n",
            "import real\n",
        );
        assert_eq!(scan_imports(code), vec!["real"]);
    }

    #[test]
    fn one_line_long_string() {
        let code = "\"\"\"docstring on one line\"\"\"\nimport a\n";
        assert_eq!(scan_imports(code), vec!["a"]);
    }

    #[test]
    fn bare_string_statement_is_skipped() {
        let code = "\"a bare literal\"\nimport a\n";
        assert_eq!(scan_imports(code), vec!["a"]);
    }

    #[test]
    fn quoted_import_target_is_unquoted() {
        let code = "import \"base.b\"\nimport 'base.c'\n";
        assert_eq!(scan_imports(code), vec!["base.b", "base.c"]);
    }

    #[test]
    fn duplicates_collapse() {
        let code = "import a\nimport a as b\n";
        assert_eq!(scan_imports(code), vec!["a"]);
    }

    #[test]
    fn no_imports() {
        assert_eq!(scan_imports("x = 1\nimport late\n"), Vec::<String>::new());
        assert_eq!(scan_imports(""), Vec::<String>::new());
    }
}
