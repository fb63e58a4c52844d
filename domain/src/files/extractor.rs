//! Code-block extraction from specialist replies.
//!
//! Two spellings annotate a fenced block with its target path:
//!
//! ````text
//! # src/app.py            **src/app.py**          `src/app.py`
//! ```python               ```python               ```python
//! ...                     ...                     ...
//! ```                     ```                     ```
//!
//! ```python src/app.py
//! ...
//! ```
//! ````
//!
//! The reply is first split into line tokens ([`Line`]) and then parsed by a
//! small recursive-descent parser. When a header line is followed by a fence
//! that names its own path, the fence wins. A header only counts when the
//! very next line opens a fence. Unannotated fences are consumed whole so
//! their contents are never mistaken for headers.

use crate::core::string::{normalize_path, preview};
use regex::Regex;
use std::sync::LazyLock;

/// A file found in a reply. `path` is normalized and root-relative, `content`
/// ends with exactly one newline (or is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    /// An opening or closing fence; holds the info string after the backticks.
    Fence(&'a str),
    /// A line that names a path on its own.
    Header(&'a str),
    Text,
}

fn tokenize(text: &str) -> Vec<(Line<'_>, &str)> {
    text.lines().map(|raw| (classify_line(raw), raw)).collect()
}

fn classify_line(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if let Some(info) = line.strip_prefix("```") {
        return Line::Fence(info.trim());
    }
    match header_path(line) {
        Some(path) => Line::Header(path),
        None => Line::Text,
    }
}

/// `# path`, `## path`, `` # `path` ``, `**path**` or `` `path` `` alone on a line.
fn header_path(line: &str) -> Option<&str> {
    let candidate = if line.starts_with('#') {
        let rest = line.trim_start_matches('#').trim_start();
        strip_wrapping(rest, "`").unwrap_or(rest)
    } else if let Some(inner) = strip_wrapping(line, "**") {
        inner
    } else {
        strip_wrapping(line, "`")?
    };
    let candidate = candidate.trim();
    looks_like_path(candidate).then_some(candidate)
}

fn strip_wrapping<'a>(s: &'a str, marker: &str) -> Option<&'a str> {
    s.strip_prefix(marker)?.strip_suffix(marker)
}

/// A single token ending in `.ext`, with something before the last dot.
fn looks_like_path(s: &str) -> bool {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '`' || c == '*') {
        return false;
    }
    match s.rfind('.') {
        Some(dot) if dot > 0 => {
            let ext = &s[dot + 1..];
            !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Path named on an opening fence: "<language> <path>".
fn inline_path(info: &str) -> Option<&str> {
    let mut parts = info.split_whitespace();
    let language = parts.next()?;
    let path = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let language_ok = language.chars().all(|c| c.is_alphanumeric() || c == '_');
    let path_ok = path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '/' | '\\' | '.' | '-'));
    (language_ok && path_ok && looks_like_path(path)).then_some(path)
}

struct BlockParser<'a> {
    lines: Vec<(Line<'a>, &'a str)>,
    pos: usize,
}

impl<'a> BlockParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: tokenize(text),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).map(|(line, _)| *line)
    }

    /// document := item*
    fn parse_document(&mut self) -> Vec<ParsedFile> {
        let mut files: Vec<ParsedFile> = Vec::new();
        while self.pos < self.lines.len() {
            if let Some(file) = self.parse_item() {
                if !files.iter().any(|f| f.path == file.path) {
                    files.push(file);
                }
            }
        }
        files
    }

    /// item := Header block | block | Text
    fn parse_item(&mut self) -> Option<ParsedFile> {
        match self.peek()? {
            Line::Header(path) => {
                self.pos += 1;
                match self.peek() {
                    Some(Line::Fence(info)) => {
                        let path = inline_path(info).unwrap_or(path);
                        self.parse_block(Some(path))
                    }
                    _ => None,
                }
            }
            Line::Fence(info) => self.parse_block(inline_path(info)),
            Line::Text => {
                self.pos += 1;
                None
            }
        }
    }

    /// block := Fence [nested-Fence] body* Fence [Fence]
    ///
    /// Expects `pos` on the opening fence. A block without a path is
    /// consumed and discarded.
    fn parse_block(&mut self, path: Option<&'a str>) -> Option<ParsedFile> {
        self.pos += 1;

        let nested = matches!(self.peek(), Some(Line::Fence(info)) if !info.is_empty());
        if nested {
            self.pos += 1;
        }

        let mut body = Vec::new();
        let mut closed = false;
        while let Some((line, raw)) = self.lines.get(self.pos) {
            self.pos += 1;
            if matches!(line, Line::Fence(_)) {
                closed = true;
                break;
            }
            body.push(*raw);
        }

        if nested && matches!(self.peek(), Some(Line::Fence(""))) {
            self.pos += 1;
        }

        // An unterminated block never yields a file
        if !closed {
            return None;
        }

        let path = normalize_path(path?);
        if path.is_empty() {
            return None;
        }
        Some(ParsedFile {
            path,
            content: clean_content(&body),
        })
    }
}

/// Drop stray fence lines at either end, trim surrounding blank lines and
/// terminate with a single newline.
fn clean_content(body: &[&str]) -> String {
    let mut lines = body;
    if let Some(first) = lines.first() {
        if first.trim_start().starts_with("```") {
            lines = &lines[1..];
        }
    }
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines = &lines[..lines.len() - 1];
        }
    }
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines = &lines[1..];
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines = &lines[..lines.len() - 1];
    }

    if lines.is_empty() {
        String::new()
    } else {
        let mut content = lines.join("\n");
        content.push('\n');
        content
    }
}

/// Extract path-annotated code blocks; the first occurrence of a path wins.
pub fn extract_files(text: &str) -> Vec<ParsedFile> {
    BlockParser::new(text).parse_document()
}

// ==================== Diagnostics ====================

/// Number of reply characters included in a failed-extraction diagnostic.
pub const DIAGNOSTIC_PREVIEW_CHARS: usize = 500;

/// Almost-valid shapes seen in a reply that yielded no files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearMissShape {
    /// A `## path` header not followed by a fence.
    HeaderWithoutFence,
    /// Path and opening fence on the same line.
    FenceOnHeaderLine,
    /// A fence whose info string is a `# path` comment.
    HeaderInsideFence,
}

impl NearMissShape {
    pub fn description(&self) -> &'static str {
        match self {
            NearMissShape::HeaderWithoutFence => "'##' header without fence",
            NearMissShape::FenceOnHeaderLine => "path and fence on the same line",
            NearMissShape::HeaderInsideFence => "fence opened before the '#' path",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearMiss {
    pub shape: NearMissShape,
    /// Up to three matched paths.
    pub samples: Vec<String>,
}

static HEADER_WITHOUT_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s+([^\n]+\.\w+)").unwrap());

static FENCE_ON_HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s+([^\n]+\.\w+)\s+```").unwrap());

static HEADER_INSIDE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\w+\s+#\s+([^\n]+\.\w+)").unwrap());

impl NearMissShape {
    const ALL: [NearMissShape; 3] = [
        NearMissShape::HeaderWithoutFence,
        NearMissShape::FenceOnHeaderLine,
        NearMissShape::HeaderInsideFence,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            NearMissShape::HeaderWithoutFence => &HEADER_WITHOUT_FENCE,
            NearMissShape::FenceOnHeaderLine => &FENCE_ON_HEADER_LINE,
            NearMissShape::HeaderInsideFence => &HEADER_INSIDE_FENCE,
        }
    }
}

/// Scan a reply for shapes that look like annotated blocks but did not parse.
pub fn near_misses(text: &str) -> Vec<NearMiss> {
    NearMissShape::ALL
        .into_iter()
        .filter_map(|shape| {
            let samples: Vec<String> = shape
                .pattern()
                .captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .take(3)
                .collect();
            (!samples.is_empty()).then_some(NearMiss { shape, samples })
        })
        .collect()
}

/// Start of a reply for diagnostics.
pub fn diagnostic_preview(text: &str) -> &str {
    preview(text, DIAGNOSTIC_PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(files: &[ParsedFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_comment_header() {
        let text = "Here you go:\n\n# src/a.py\n```python\nx = 1\n```\n";
        let files = extract_files(text);
        assert_eq!(
            files,
            vec![ParsedFile {
                path: "src/a.py".into(),
                content: "x = 1\n".into()
            }]
        );
    }

    #[test]
    fn test_header_variants() {
        let text = "## `pkg/b.py`\n```\nb\n```\n**c.js**\n```js\nc\n```\n`d.css`\n```css\nd\n```\n### ./e.toml\n```toml\ne\n```";
        let files = extract_files(text);
        assert_eq!(paths(&files), vec!["pkg/b.py", "c.js", "d.css", "e.toml"]);
        assert_eq!(files[1].content, "c\n");
    }

    #[test]
    fn test_inline_path_fence() {
        let text = "```python src\\models\\user.py\nclass User: pass\n```";
        let files = extract_files(text);
        assert_eq!(paths(&files), vec!["src/models/user.py"]);
        assert_eq!(files[0].content, "class User: pass\n");
    }

    #[test]
    fn test_inline_path_wins_over_header() {
        let text = "# old.py\n```python new.py\npass\n```";
        assert_eq!(paths(&extract_files(text)), vec!["new.py"]);
    }

    #[test]
    fn test_header_needs_adjacent_fence() {
        let text = "# a.py\n\n```python\nx\n```";
        assert!(extract_files(text).is_empty());
    }

    #[test]
    fn test_prose_heading_is_not_a_header() {
        let text = "# Create the file a.py\n```python\nx\n```";
        assert!(extract_files(text).is_empty());
    }

    #[test]
    fn test_unannotated_block_contents_are_skipped() {
        let text = "```\n# fake.py\n```python\nnope\n```\n";
        // The bare block swallows "# fake.py"; the remaining fence opens an unterminated block
        assert!(extract_files(text).is_empty());
    }

    #[test]
    fn test_doubly_nested_fence() {
        let text = "# a.py\n```\n```python\n\nprint('hi')\n\n```\n```\n# b.py\n```\nb\n```";
        let files = extract_files(text);
        assert_eq!(paths(&files), vec!["a.py", "b.py"]);
        assert_eq!(files[0].content, "print('hi')\n");
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let text = "# a.py\n```\nfirst\n```\n# ./a.py\n```\nsecond\n```";
        let files = extract_files(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "first\n");
    }

    #[test]
    fn test_blank_lines_trimmed_and_single_newline() {
        let text = "# a.txt\n```\n\n\nline1\n\nline2\n\n\n```";
        assert_eq!(extract_files(text)[0].content, "line1\n\nline2\n");
    }

    #[test]
    fn test_empty_block() {
        let text = "# empty.py\n```\n```";
        assert_eq!(extract_files(text)[0].content, "");
    }

    #[test]
    fn test_unterminated_block_ignored() {
        assert!(extract_files("# a.py\n```python\nx = 1\n").is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let text = "# a.py\r\n```python\r\nx = 1\r\n```\r\n";
        assert_eq!(extract_files(text)[0].content, "x = 1\n");
    }

    #[test]
    fn test_near_misses() {
        let text = "## a.py\nsome text\n# b.py ```python\n```python # c.py\n";
        let misses = near_misses(text);
        let shapes: Vec<_> = misses.iter().map(|m| m.shape).collect();
        assert!(shapes.contains(&NearMissShape::HeaderWithoutFence));
        assert!(shapes.contains(&NearMissShape::FenceOnHeaderLine));
        assert!(shapes.contains(&NearMissShape::HeaderInsideFence));
        assert!(near_misses("no code at all").is_empty());
    }

    #[test]
    fn test_near_miss_samples_are_capped() {
        let text = "## a.py\n## b.py\n## c.py\n## d.py\n";
        let misses = near_misses(text);
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].shape, NearMissShape::HeaderWithoutFence);
        assert_eq!(misses[0].samples, vec!["a.py", "b.py", "c.py"]);
    }
}
