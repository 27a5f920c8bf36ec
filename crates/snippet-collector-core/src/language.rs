//! Best-effort language tagging for captured code.
//!
//! Syntax highlighters mark code elements with classes such as
//! `language-rust`, `lang-js`, `prism-python`, or `hljs-go`; those win when
//! present. Otherwise a handful of content heuristics pick a tag, falling
//! back to `text`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tag used when nothing better is known.
pub const PLAIN_TEXT: &str = "text";

static CLASS_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:language|lang|prism|hljs)-(\w+)").expect("static class pattern")
});

struct Heuristic {
    language: &'static str,
    patterns: Vec<Regex>,
    /// All patterns must match, rather than any one of them.
    require_all: bool,
}

static HEURISTICS: Lazy<Vec<Heuristic>> = Lazy::new(|| {
    let compile = |ps: &[&str]| -> Vec<Regex> {
        ps.iter()
            .map(|p| Regex::new(p).expect("static heuristic pattern"))
            .collect()
    };
    vec![
        Heuristic {
            language: "cpp",
            patterns: compile(&[r"(?m)^\s*#include\s+<"]),
            require_all: false,
        },
        Heuristic {
            language: "javascript",
            patterns: compile(&[r"(?m)^\s*import\s+.+from\s+", r"function\s+\w+\s*\("]),
            require_all: false,
        },
        Heuristic {
            language: "python",
            patterns: compile(&[r"(?m)^\s*def\s+\w+\s*\(", r"(?m)^\s*class\s+\w+\s*:\s*$"]),
            require_all: false,
        },
        Heuristic {
            language: "html",
            patterns: compile(&[r"<[^>]+>", r"</?[a-zA-Z]"]),
            require_all: true,
        },
        Heuristic {
            language: "sql",
            patterns: compile(&[r"(?im)^\s*SELECT\s+"]),
            require_all: false,
        },
        Heuristic {
            language: "java",
            patterns: compile(&[r"(?m)^\s*package\s+[\w.]+;"]),
            require_all: false,
        },
    ]
});

/// Language named by the first highlighter class in `class_name`, lowercased.
pub fn language_from_class_name(class_name: &str) -> Option<String> {
    class_name
        .split_whitespace()
        .find_map(|cls| CLASS_LANGUAGE.captures(cls))
        .map(|caps| caps[1].to_lowercase())
}

/// Guess a language from the code itself.
pub fn guess_language(code: &str) -> &'static str {
    if code.is_empty() {
        return PLAIN_TEXT;
    }
    HEURISTICS
        .iter()
        .find(|h| {
            if h.require_all {
                h.patterns.iter().all(|p| p.is_match(code))
            } else {
                h.patterns.iter().any(|p| p.is_match(code))
            }
        })
        .map(|h| h.language)
        .unwrap_or(PLAIN_TEXT)
}

/// Pick a language for `code`.
///
/// `class_names` are the `class` attributes of the captured element and
/// its ancestors, innermost first. The first highlighter class found wins;
/// otherwise the content heuristics decide.
pub fn detect_language<S: AsRef<str>>(class_names: &[S], code: &str) -> String {
    class_names
        .iter()
        .find_map(|c| language_from_class_name(c.as_ref()))
        .unwrap_or_else(|| guess_language(code).to_string())
}
