//! Name lookup for documents and their sections.
//!
//! Every file under the root is registered under its absolute and relative location. Markdown
//! documents are also registered under their title, and their `##` headings go into a section
//! table that only the document itself can see.

use crate::error::LinkError;
use crate::patterns::{SECTION, TITLE};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A document, or one named section of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub location: PathBuf,
    pub relative_location: String,
    /// Empty for a whole document.
    pub section_name: String,
}

impl Node {
    pub fn document(location: PathBuf, relative_location: String) -> Self {
        Self {
            location,
            relative_location,
            section_name: String::new(),
        }
    }

    /// Copy of this node pointing at one of its sections.
    pub fn section(&self, name: &str) -> Self {
        Self {
            section_name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn is_section(&self) -> bool {
        !self.section_name.is_empty()
    }
}

/// `##` headings of a single document, keyed by heading text.
#[derive(Debug, Default)]
pub struct SectionTable {
    by_heading: HashMap<String, Node>,
}

impl SectionTable {
    pub fn get(&self, heading: &str) -> Option<&Node> {
        self.by_heading.get(heading)
    }
}

/// Position of a whole-document node in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
pub struct DocumentIndex {
    nodes: Vec<Node>,
    sections: Vec<SectionTable>,
    keys: HashMap<String, NodeId>,
    titles: usize,
}

impl DocumentIndex {
    /// Index `files`, all of which must live under `root`. Markdown files are read to pick up
    /// their title and section headings; their bytes need not be UTF-8.
    pub fn build(root: &Path, files: &[PathBuf]) -> Result<Self, LinkError> {
        let mut index = Self::default();

        for path in files {
            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            let id = index.register_file(path.clone(), relative);

            if is_markdown(path) {
                let content = fs::read(path).map_err(|e| LinkError::io(path, e))?;
                index.register_headings(id, &content);
            }
        }

        Ok(index)
    }

    /// Register a file under its absolute and relative location. Later registrations win on
    /// key collisions.
    pub fn register_file(&mut self, location: PathBuf, relative_location: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.keys.insert(location.to_string_lossy().to_string(), id);
        self.keys.insert(relative_location.clone(), id);
        self.nodes.push(Node::document(location, relative_location));
        self.sections.push(SectionTable::default());
        id
    }

    /// Pick up the title and `##` headings of an already registered document. Names that are
    /// not UTF-8 are keyed by their lossy decoding.
    pub fn register_headings(&mut self, id: NodeId, content: &[u8]) {
        if let Some(caps) = TITLE.captures(content) {
            let title = heading_text(&caps[1]);
            if !title.is_empty() {
                self.keys.insert(title.to_string(), id);
                self.titles += 1;
            }
        }

        let doc = &self.nodes[id.0];
        let table = &mut self.sections[id.0];
        for caps in SECTION.captures_iter(content) {
            let heading = heading_text(&caps[1]);
            if heading.is_empty() {
                continue;
            }
            table.by_heading.insert(heading.to_string(), doc.section(&heading));
        }
    }

    /// Look a name up across locations and titles.
    pub fn resolve(&self, name: &str) -> Option<&Node> {
        self.keys.get(name).map(|id| &self.nodes[id.0])
    }

    /// Whole-document node for an absolute location.
    pub fn document(&self, location: &Path) -> Option<NodeId> {
        let key = location.to_string_lossy();
        self.keys.get(&*key).copied()
    }

    pub fn sections(&self, id: NodeId) -> &SectionTable {
        &self.sections[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn title_count(&self) -> usize {
        self.titles
    }
}

fn heading_text(raw: &[u8]) -> Cow<'_, str> {
    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => Cow::Borrowed(text.trim_end()),
        Cow::Owned(text) => Cow::Owned(text.trim_end().to_string()),
    }
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(docs: &[(&str, &str)]) -> DocumentIndex {
        let mut index = DocumentIndex::default();
        for (rel, content) in docs {
            let id = index.register_file(Path::new("/docs").join(rel), rel.to_string());
            index.register_headings(id, content.as_bytes());
        }
        index
    }

    #[test]
    fn test_resolve_by_location_and_title() {
        let index = index_with(&[("guide/setup.md", "\n# Setup Guide\n\nBody\n")]);

        let by_rel = index.resolve("guide/setup.md").unwrap();
        let by_abs = index.resolve("/docs/guide/setup.md").unwrap();
        let by_title = index.resolve("Setup Guide").unwrap();

        assert_eq!(by_rel, by_abs);
        assert_eq!(by_rel, by_title);
        assert!(!by_title.is_section());
        assert_eq!(index.title_count(), 1);
    }

    #[test]
    fn test_only_opening_heading_is_a_title() {
        let index = index_with(&[("a.md", "# First\n# Second\n"), ("b.md", "intro\n# Late\n")]);

        assert!(index.resolve("First").is_some());
        assert!(index.resolve("Second").is_none());
        assert!(index.resolve("Late").is_none());
    }

    #[test]
    fn test_sections_stay_local() {
        let index = index_with(&[
            ("a.md", "# A\n## Details\ntext\n### Deeper\n"),
            ("b.md", "# B\n"),
        ]);

        let a = index.document(Path::new("/docs/a.md")).unwrap();
        let b = index.document(Path::new("/docs/b.md")).unwrap();

        let details = index.sections(a).get("Details").unwrap();
        assert_eq!(details.section_name, "Details");
        assert_eq!(details.relative_location, "a.md");
        assert!(index.sections(a).get("Deeper").is_none());

        assert!(index.sections(b).get("Details").is_none());
        assert!(index.resolve("Details").is_none());
    }

    #[test]
    fn test_section_copy_leaves_document_untouched() {
        let doc = Node::document(PathBuf::from("/docs/a.md"), "a.md".to_string());
        let section = doc.section("Usage");

        assert_eq!(section.location, doc.location);
        assert!(section.is_section());
        assert!(!doc.is_section());
    }

    #[test]
    fn test_later_title_wins() {
        let index = index_with(&[("a.md", "# Same\n"), ("b.md", "# Same\n")]);
        assert_eq!(index.resolve("Same").unwrap().relative_location, "b.md");
        assert_eq!(index.node_count(), 2);
    }

    #[test]
    fn test_non_markdown_files_resolve_by_path() {
        let mut index = DocumentIndex::default();
        index.register_file(PathBuf::from("/docs/img/logo.png"), "img/logo.png".to_string());

        assert!(index.resolve("img/logo.png").is_some());
        assert!(index.resolve("/docs/img/logo.png").is_some());
        assert!(is_markdown(Path::new("x/readme.md")));
        assert!(!is_markdown(Path::new("x/readme.markdown")));
    }

    #[test]
    fn test_non_utf8_title_is_indexed() {
        let mut index = DocumentIndex::default();
        let id = index.register_file(PathBuf::from("/docs/cafe.md"), "cafe.md".to_string());
        index.register_headings(id, b"# Caf\xe9\n## Men\xfc\n");

        let title = String::from_utf8_lossy(b"Caf\xe9").to_string();
        assert_eq!(index.resolve(&title).unwrap().relative_location, "cafe.md");
        let section = String::from_utf8_lossy(b"Men\xfc").to_string();
        assert!(index.sections(id).get(&section).is_some());
    }

    #[test]
    fn test_title_after_crlf_blank_line() {
        let index = index_with(&[("a.md", "\r\n# Windows\r\n")]);
        assert!(index.resolve("Windows").is_some());
    }
}
