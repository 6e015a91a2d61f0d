//! Text patterns shared by the indexer and the diagram rewriter, compiled once per process.
//!
//! Document patterns work on raw bytes with Unicode mode off, so files in any ASCII-compatible
//! encoding are scanned the same way as UTF-8 ones.

use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::sync::LazyLock;

/// Document title: a `# ` heading that opens the file, optionally after blank lines.
pub static TITLE: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?-u)\A(?:\r?\n)*# +([^\r\n]*)").unwrap());

/// Second-level heading anywhere in the document.
pub static SECTION: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?m-u)^## +([^\r\n]*)").unwrap());

/// A fenced block, from its opening fence up to and including the three backticks of the
/// closing fence.
pub static FENCE: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?m-u)^```(?:.*\n)*?^```").unwrap());

/// Language tag on the opening fence line.
pub static FENCE_TAG: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?-u)\A```([^\n]*)").unwrap());

/// One graph line: `LEFT --> RIGHT` (groups 1 and 2) or `subgraph NAME` (group 3).
pub static GRAPH_LINE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"(?m-u)^[ \t]*(?:(.*?)[ \t]*-->[ \t]*(.*?)|subgraph +(.*?))[ \t]*\r?$").unwrap()
});

/// A run of `click` directives with at least one blank line in front of it, together with
/// the newlines around it.
pub static DIRECTIVES: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"(?-u)\n+(?:\n[ \t]*click [^\n]*)+\n*").unwrap());

/// Go-style field access at the start of a template action, as in `{{.Path}}`.
pub static DOTTED_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(-?)\s*\.").unwrap());
