//! YAML front matter: the metadata block between `---` fences at the
//! top of a Markdown post.
//!
//! Parsing is deliberately permissive. Posts written by hand carry all
//! sorts of extra keys (Jekyll plugins, old tooling), so unknown keys
//! are ignored rather than rejected, and `categories: foo` is accepted
//! alongside the list form. Rendering always produces the canonical
//! block form with unset keys omitted.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// The keys this tool reads and writes. Everything is optional; a
/// missing key is `None` or an empty list, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_credit: Option<String>,
}

// Jekyll allows `categories: foo` as shorthand for a one-element list.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// A parsed post: metadata plus the Markdown body after the fences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDocument {
    pub front: FrontMatter,
    pub body: String,
}

impl PostDocument {
    /// Render back to file form. The YAML block always comes first,
    /// followed by a blank line and the body.
    pub fn render(&self) -> Result<String, FrontMatterError> {
        let yaml = serde_yaml::to_string(&self.front)?;
        Ok(format!("---\n{yaml}---\n\n{}", self.body))
    }

    pub fn write_to(&self, path: &Path) -> Result<(), FrontMatterError> {
        fs::write(path, self.render()?)?;
        Ok(())
    }
}

/// Split raw file content into the YAML section (without fences) and
/// the body. Content that does not open with a `---` fence has no
/// front matter; the whole input is body.
pub fn split_document(content: &str) -> (Option<&str>, &str) {
    let Some(after_open) = content.strip_prefix("---") else {
        return (None, content);
    };
    let Some(rest) = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body.trim_start_matches(['\r', '\n']));
        }
        offset += line.len();
    }

    // Opening fence without a closing one: treat everything as body.
    (None, content)
}

/// Parse file content into a [`PostDocument`]. Missing front matter
/// yields the default (all-empty) metadata.
pub fn parse(content: &str) -> Result<PostDocument, FrontMatterError> {
    let (yaml, body) = split_document(content);
    let front = match yaml {
        Some(y) if !y.trim().is_empty() => serde_yaml::from_str(y)?,
        _ => FrontMatter::default(),
    };
    Ok(PostDocument {
        front,
        body: body.to_string(),
    })
}

pub fn load(path: &Path) -> Result<PostDocument, FrontMatterError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}
