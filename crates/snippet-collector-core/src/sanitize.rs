//! Clean up code copied from a web page before it is stored.
//!
//! Pages often render interactive sessions and numbered listings, so the
//! copied text carries REPL prompts, shell prompts, and line numbers that
//! are not part of the code. Which cleanups run is controlled by
//! [`SanitizeSettings`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::settings::SanitizeSettings;

/// Leading prompt patterns, tried in order; only the first match is removed.
static PROMPTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Python REPL
        r"^\s*(>>>|\.\.\.)\s?",
        // Jupyter / IPython
        r"^\s*(?:In\s*\[\d+\]:|Out\s*\[\d+\]:)\s*",
        // PowerShell
        r"^\s*(?:PS(?: [A-Z]:\\[\w\s-]*)?>)\s*",
        // POSIX shell
        r"^\s*\$\s+",
        // numbered prompts, e.g. `1> `
        r"^\s*\d+>\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static prompt pattern"))
    .collect()
});

static LINE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*(?:[:|.)]\s*)?").expect("static line number pattern"));

static COMMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?://|#|--|<!--)").expect("static comment pattern"));

static TRAILING_BLANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("static trailing whitespace pattern"));

fn strip_prompt(line: &str) -> String {
    for pattern in PROMPTS.iter() {
        if pattern.is_match(line) {
            return pattern.replace(line, "").into_owned();
        }
    }
    line.to_string()
}

fn strip_line_number(line: &str) -> String {
    LINE_NUMBER.replace(line, "").into_owned()
}

/// Apply the enabled cleanups to `raw`.
///
/// Non-breaking spaces become spaces, trailing whitespace is removed from
/// every line, and the result is trimmed at the end.
pub fn sanitize_code(raw: &str, settings: &SanitizeSettings) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = raw.replace('\u{a0}', " ");
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();

    if settings.strip_prompts {
        lines = lines.iter().map(|l| strip_prompt(l)).collect();
    }
    if settings.strip_line_numbers {
        lines = lines.iter().map(|l| strip_line_number(l)).collect();
    }
    if settings.strip_comments {
        lines.retain(|l| !COMMENT_LINE.is_match(l.trim()));
    }
    if settings.strip_empty_lines {
        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
    }

    let joined = lines.join("\n");
    TRAILING_BLANKS
        .replace_all(&joined, "")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(prompts: bool, numbers: bool, comments: bool, empty: bool) -> SanitizeSettings {
        SanitizeSettings {
            strip_prompts: prompts,
            strip_line_numbers: numbers,
            strip_comments: comments,
            strip_empty_lines: empty,
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_code("", &SanitizeSettings::default()), "");
    }

    #[test]
    fn test_python_repl_prompts() {
        let raw = ">>> x = 1\n>>> for i in range(3):\n...     print(i)";
        assert_eq!(
            sanitize_code(raw, &only(true, false, false, false)),
            "x = 1\nfor i in range(3):\n    print(i)"
        );
    }

    #[test]
    fn test_shell_and_powershell_prompts() {
        let raw = "$ cargo build\nPS C:\\work> dir\nPS> ls\nIn [3]: a + b";
        assert_eq!(
            sanitize_code(raw, &only(true, false, false, false)),
            "cargo build\ndir\nls\na + b"
        );
    }

    #[test]
    fn test_line_numbers() {
        let raw = "1: fn main() {\n2|     run();\n3. }\n 10) done";
        assert_eq!(
            sanitize_code(raw, &only(false, true, false, false)),
            "fn main() {\nrun();\n}\ndone"
        );
    }

    #[test]
    fn test_comments_dropped_when_enabled() {
        let raw = "// header\nlet a = 1;\n  # note\n-- sql\n<!-- html -->\nlet b = 2;";
        assert_eq!(
            sanitize_code(raw, &only(false, false, true, false)),
            "let a = 1;\nlet b = 2;"
        );
    }

    #[test]
    fn test_leading_empty_lines_only_stripped_when_enabled() {
        let raw = "\n\n  \nbody\n\n";
        assert_eq!(sanitize_code(raw, &only(false, false, false, true)), "body");
        assert_eq!(sanitize_code(raw, &only(false, false, false, false)), "\n\n\nbody");
    }

    #[test]
    fn test_crlf_nbsp_and_trailing_whitespace() {
        let raw = "a\u{a0}=\u{a0}1;   \r\nb = 2;\t\r\n";
        assert_eq!(
            sanitize_code(raw, &only(false, false, false, false)),
            "a = 1;\nb = 2;"
        );
    }

    #[test]
    fn test_defaults_strip_prompts_and_numbers() {
        let raw = "$ echo hi\n2 echo there";
        assert_eq!(
            sanitize_code(raw, &SanitizeSettings::default()),
            "echo hi\necho there"
        );
    }
}
