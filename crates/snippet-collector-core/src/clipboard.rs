//! Text placed on the clipboard when a snippet is copied.
//!
//! With `includeMarkdownHeader` enabled, the code is wrapped in a fenced
//! block whose first line is a comment naming where the code came from,
//! written in the snippet's own comment syntax.

use crate::settings::Settings;
use crate::snippet::Snippet;

/// Line-comment (or block-comment) delimiters for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub prefix: &'static str,
    pub suffix: Option<&'static str>,
}

const SLASHES: CommentStyle = CommentStyle {
    prefix: "// ",
    suffix: None,
};
const HASH: CommentStyle = CommentStyle {
    prefix: "# ",
    suffix: None,
};
const DASHES: CommentStyle = CommentStyle {
    prefix: "-- ",
    suffix: None,
};
const PERCENT: CommentStyle = CommentStyle {
    prefix: "% ",
    suffix: None,
};
const MARKUP: CommentStyle = CommentStyle {
    prefix: "<!-- ",
    suffix: Some(" -->"),
};
const BLOCK: CommentStyle = CommentStyle {
    prefix: "/* ",
    suffix: Some(" */"),
};

/// Comment style for `language` (case-insensitive); `// ` when unknown.
pub fn comment_style(language: &str) -> CommentStyle {
    match language.to_lowercase().as_str() {
        "perl" | "ruby" | "python" | "shell" | "bash" | "sh" | "powershell" | "r" | "yaml"
        | "toml" | "elixir" => HASH,
        "sql" | "lua" | "haskell" => DASHES,
        "erlang" => PERCENT,
        "html" | "xml" | "markdown" => MARKUP,
        "css" | "scss" | "less" => BLOCK,
        _ => SLASHES,
    }
}

/// A one-line comment naming the snippet's page and URL.
pub fn source_comment(language: &str, page_title: &str, source_url: &str) -> String {
    let style = comment_style(language);
    let title = page_title.split_whitespace().collect::<Vec<_>>().join(" ");
    let url = source_url.trim();
    let content = match (title.is_empty(), url.is_empty()) {
        (false, false) => format!("{} — {}", title, url),
        (false, true) => title,
        (true, false) => url.to_string(),
        (true, true) => "Source unknown".to_string(),
    };
    match style.suffix {
        Some(suffix) => format!("{}{}{}", style.prefix, content, suffix),
        None => format!("{}{}", style.prefix, content),
    }
}

/// Clipboard text for `snippet` under `settings`.
pub fn build_clipboard_payload(snippet: &Snippet, settings: &Settings) -> String {
    if !settings.include_markdown_header {
        return snippet.code.clone();
    }
    let comment = source_comment(&snippet.language, &snippet.page_title, &snippet.source_url);
    let mut code = snippet.code.clone();
    if !code.is_empty() && !code.ends_with('\n') {
        code.push('\n');
    }
    format!("```{}\n{}\n{}```", snippet.language, comment, code)
}
