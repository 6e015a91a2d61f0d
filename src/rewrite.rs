//! Regenerates the `click` directives of mermaid blocks.
//!
//! Each run strips the directive block a previous run appended and builds a new one from the
//! edges currently in the graph, so rerunning never accumulates stale links.

use crate::error::LinkError;
use crate::index::{DocumentIndex, Node, SectionTable};
use crate::patterns::{DIRECTIVES, FENCE, FENCE_TAG, GRAPH_LINE};
use crate::render::LinkRenderer;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

pub const DIAGRAM_LANGUAGE: &[u8] = b"mermaid";

const FENCE_MARKER: &[u8] = b"```";

/// Result of rewriting one document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub text: Vec<u8>,
    /// Diagram blocks whose directives were regenerated.
    pub diagrams: usize,
    /// Directive lines emitted across those blocks.
    pub directives: usize,
}

pub struct DiagramRewriter<'a> {
    index: &'a DocumentIndex,
    renderer: Option<&'a LinkRenderer>,
}

impl<'a> DiagramRewriter<'a> {
    /// A rewriter without a renderer passes every block through untouched.
    pub fn new(index: &'a DocumentIndex, renderer: Option<&'a LinkRenderer>) -> Self {
        Self { index, renderer }
    }

    /// Rewrite every diagram block of `content`. `sections` is the section table of the
    /// document `content` belongs to.
    pub fn rewrite(&self, content: &[u8], sections: &SectionTable) -> Result<Rewrite, LinkError> {
        let mut out = Rewrite {
            text: Vec::with_capacity(content.len()),
            ..Rewrite::default()
        };
        let mut last = 0;

        for block in FENCE.find_iter(content) {
            out.text.extend_from_slice(&content[last..block.start()]);
            match self.rewrite_block(block.as_bytes(), sections)? {
                Some((text, directives)) => {
                    out.text.extend_from_slice(&text);
                    out.diagrams += 1;
                    out.directives += directives;
                }
                None => out.text.extend_from_slice(block.as_bytes()),
            }
            last = block.end();
        }
        out.text.extend_from_slice(&content[last..]);

        Ok(out)
    }

    /// Returns the new block and its directive count, or `None` when the block is not ours to
    /// touch.
    fn rewrite_block(
        &self,
        block: &[u8],
        sections: &SectionTable,
    ) -> Result<Option<(Vec<u8>, usize)>, LinkError> {
        if fence_tag(block) != DIAGRAM_LANGUAGE {
            return Ok(None);
        }
        let Some(renderer) = self.renderer else {
            return Ok(None);
        };

        let body = strip_directives(&block[..block.len() - FENCE_MARKER.len()]);
        let candidates = collect_candidates(&body, |name| self.lookup(name, sections).is_some());

        let mut text = if candidates.is_empty() {
            body.to_vec()
        } else {
            // the body ends in exactly one newline, then one blank line before the directives
            let mut text = trim_trailing_newlines(&body).to_vec();
            text.extend_from_slice(b"\n\n");
            for name in &candidates {
                if let Some(node) = self.lookup(name, sections) {
                    text.extend_from_slice(&renderer.directive(name, node)?);
                }
            }
            text
        };
        text.extend_from_slice(FENCE_MARKER);

        Ok(Some((text, candidates.len())))
    }

    /// Section headings of the current document shadow global names.
    fn lookup<'s>(&'s self, name: &[u8], sections: &'s SectionTable) -> Option<&'s Node> {
        let key = String::from_utf8_lossy(name);
        sections.get(&key).or_else(|| self.index.resolve(&key))
    }
}

/// Language tag of a fenced block, without surrounding whitespace.
pub fn fence_tag(block: &[u8]) -> &[u8] {
    FENCE_TAG
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map_or(&b""[..], |m| m.as_bytes().trim_ascii())
}

/// Drop every blank-line-bounded run of directives, collapsing it and the newlines around it
/// to a single newline.
pub fn strip_directives(body: &[u8]) -> Cow<'_, [u8]> {
    DIRECTIVES.replace_all(body, &b"\n"[..])
}

fn trim_trailing_newlines(body: &[u8]) -> &[u8] {
    let end = body.iter().rposition(|&b| b != b'\n').map_or(0, |i| i + 1);
    &body[..end]
}

/// Edge operands that resolve and are never declared as a `subgraph` anywhere in `body`,
/// in byte order.
pub fn collect_candidates<'b>(
    body: &'b [u8],
    resolves: impl Fn(&[u8]) -> bool,
) -> BTreeSet<&'b [u8]> {
    let mut containers: HashSet<&[u8]> = HashSet::new();
    let mut candidates = BTreeSet::new();

    for caps in GRAPH_LINE.captures_iter(body) {
        if let Some(container) = caps.get(3) {
            let name = container.as_bytes();
            if !name.is_empty() {
                containers.insert(name);
                candidates.remove(name);
            }
            continue;
        }

        for operand in [caps.get(1), caps.get(2)].into_iter().flatten() {
            let name = operand.as_bytes();
            if name.is_empty() || containers.contains(name) {
                continue;
            }
            if resolves(name) {
                candidates.insert(name);
            }
        }
    }

    candidates
}
