//! Link templates for `click` directives.

use crate::error::LinkError;
use crate::index::Node;
use crate::patterns::DOTTED_FIELD;
use minijinja::{Environment, UndefinedBehavior};
use std::borrow::Cow;
use std::collections::BTreeMap;

const ANCHOR: &str = "anchor";
const FILE: &str = "file";

/// Variables every template may reference. `Name` is an alias of `SectionName`.
const BUILTINS: [&str; 3] = ["Path", "SectionName", "Name"];

/// Compiled anchor/file templates together with the constants they can see.
#[derive(Debug)]
pub struct LinkRenderer {
    env: Environment<'static>,
    constants: BTreeMap<String, String>,
}

impl LinkRenderer {
    /// Compile both templates. Syntax errors and references to variables that are neither
    /// built in nor configured constants are rejected here, so rendering never meets them.
    pub fn compile(
        anchor: &str,
        file: &str,
        constants: BTreeMap<String, String>,
    ) -> Result<Self, LinkError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for (name, source) in [(ANCHOR, anchor), (FILE, file)] {
            let source = DOTTED_FIELD.replace_all(source, "{{$1 ").into_owned();
            env.add_template_owned(name, source)
                .map_err(|source| LinkError::Template { name, source })?;

            let template = env
                .get_template(name)
                .map_err(|source| LinkError::Template { name, source })?;
            let mut undeclared: Vec<String> = template.undeclared_variables(false).into_iter().collect();
            undeclared.sort();
            if let Some(variable) = undeclared
                .into_iter()
                .find(|v| !BUILTINS.contains(&v.as_str()) && !constants.contains_key(v))
            {
                return Err(LinkError::UnknownVariable { name, variable });
            }
        }

        Ok(Self { env, constants })
    }

    /// Render the href for `node`: the anchor template for sections, the file template for
    /// whole documents.
    pub fn render(&self, node: &Node) -> Result<String, LinkError> {
        let mut vars: BTreeMap<&str, &str> = BTreeMap::new();
        vars.insert("Path", &node.relative_location);
        vars.insert("SectionName", &node.section_name);
        vars.insert("Name", &node.section_name);
        // constants go in last and may shadow the built-ins
        for (key, value) in &self.constants {
            vars.insert(key, value);
        }

        let name = if node.is_section() { ANCHOR } else { FILE };
        self.env
            .get_template(name)
            .and_then(|template| template.render(&vars))
            .map_err(|source| LinkError::Template { name, source })
    }

    /// One `click` line, indented and newline-terminated. Double quotes in the node name or
    /// the href are written as `&#34;` so the line stays well formed.
    pub fn directive(&self, name: &[u8], node: &Node) -> Result<Vec<u8>, LinkError> {
        let href = self.render(node)?;

        let mut line = b"  click ".to_vec();
        line.extend_from_slice(&escape_quotes(name));
        line.extend_from_slice(b" \"");
        line.extend_from_slice(&escape_quotes(href.as_bytes()));
        line.extend_from_slice(b"\"\n");
        Ok(line)
    }
}

fn escape_quotes(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.contains(&b'"') {
        return Cow::Borrowed(raw);
    }
    let mut escaped = Vec::with_capacity(raw.len() + 8);
    for &byte in raw {
        if byte == b'"' {
            escaped.extend_from_slice(b"&#34;");
        } else {
            escaped.push(byte);
        }
    }
    Cow::Owned(escaped)
}
