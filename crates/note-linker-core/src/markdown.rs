//! Markdown stripping and note text preparation.
//!
//! Both the embedding provider and the lexical scorer see the same
//! prepared text: the note title, a blank line, then the body with
//! Markdown formatting removed.
//!
//! # Stripping order
//!
//! Patterns run in a fixed order so later steps never see syntax that an
//! earlier step already consumed (links inside code blocks, for example):
//!
//! 1. YAML frontmatter
//! 2. Fenced code blocks (content dropped)
//! 3. Inline code (backticks dropped, content kept)
//! 4. Image embeds `![[..]]` and `![..](..)`
//! 5. Wikilinks, reduced to display text or target
//! 6. Markdown links, reduced to their text
//! 7. Heading markers
//! 8. Bold / italic markers
//! 9. Strikethrough
//! 10. Blockquote markers
//! 11. Unordered list markers
//! 12. Ordered list markers
//! 13. Horizontal rules
//! 14. HTML tags
//! 15. Runs of 3+ newlines collapsed to one blank line, then trimmed

use std::sync::LazyLock;

use regex::Regex;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n.*?\n---\n?").unwrap());
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n.*?```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());
static WIKI_EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[.*?\]\]").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());
static WIKILINK_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^|\]]*)\|([^\]]*)\]\]").unwrap());
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static STAR_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,3}(.*?)\*{1,3}").unwrap());
static UNDERSCORE_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{1,3}(.*?)_{1,3}").unwrap());
static STRIKETHROUGH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.*?)~~").unwrap());
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^>\s?").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(\s*)[-*+]\s+").unwrap());
static ORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(\s*)\d+\.\s+").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[-*_]{3,}\s*$").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip Markdown formatting, returning trimmed plain text.
///
/// ```rust
/// use note_linker_core::markdown::strip_markdown;
///
/// assert_eq!(strip_markdown("# Title\n\nSee [[Other Note|this]]."), "Title\n\nSee this.");
/// ```
pub fn strip_markdown(text: &str) -> String {
    let s = FRONTMATTER.replacen(text, 1, "");
    let s = FENCED_CODE.replace_all(&s, "");
    let s = INLINE_CODE.replace_all(&s, "${1}");
    let s = WIKI_EMBED.replace_all(&s, "");
    let s = IMAGE.replace_all(&s, "");
    let s = WIKILINK_ALIAS.replace_all(&s, "${2}");
    let s = WIKILINK.replace_all(&s, "${1}");
    let s = LINK.replace_all(&s, "${1}");
    let s = HEADING.replace_all(&s, "");
    let s = STAR_EMPHASIS.replace_all(&s, "${1}");
    let s = UNDERSCORE_EMPHASIS.replace_all(&s, "${1}");
    let s = STRIKETHROUGH.replace_all(&s, "${1}");
    let s = BLOCKQUOTE.replace_all(&s, "");
    let s = BULLET.replace_all(&s, "${1}");
    let s = ORDERED.replace_all(&s, "${1}");
    let s = RULE.replace_all(&s, "");
    let s = HTML_TAG.replace_all(&s, "");
    let s = BLANK_RUN.replace_all(&s, "\n\n");
    s.trim().to_string()
}

/// Build the text fed to embedding and lexical scoring.
///
/// Returns `title` alone when the stripped body is empty.
pub fn prepare_note_text(title: &str, content: &str) -> String {
    let body = strip_markdown(content);
    if body.is_empty() {
        title.to_string()
    } else {
        format!("{}\n\n{}", title, body)
    }
}
