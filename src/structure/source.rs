//! Field source model: where a field's value comes from and how it is
//! extracted and transformed on the way out.
//!
//! The ReadField operation applies `apply_transforms` to the raw value
//! flowing through; everything here is pure and side-effect free.

use crate::structure::node::NodeId;
use anyhow::{Context, bail};
use serde_json::Value;

/// What a source points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A FileObject or FileSet declared in the distribution.
    Distribution(NodeId),
    /// A field of another record set ("users/id").
    Field(NodeId),
}

impl Reference {
    pub fn node_id(&self) -> &NodeId {
        match self {
            Reference::Distribution(id) | Reference::Field(id) => id,
        }
    }
}

/// How the raw value is addressed inside the referenced source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// CSV column by header name.
    Column(String),
    /// A property of the file itself rather than its content rows.
    FileProperty(FileProperty),
    /// JSON path into structured content.
    JsonPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProperty {
    FullPath,
    FileName,
    Content,
    Lines,
    LineNumbers,
}

impl FileProperty {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fullpath" => Some(FileProperty::FullPath),
            "filename" => Some(FileProperty::FileName),
            "content" => Some(FileProperty::Content),
            "lines" => Some(FileProperty::Lines),
            "lineNumbers" => Some(FileProperty::LineNumbers),
            _ => None,
        }
    }
}

/// A single declared transform, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Keep the first capture group of the pattern.
    Regex(String),
    /// Substring replacement, declared as "from/to".
    Replace { from: String, to: String },
    /// Split the value into a list.
    Separator(String),
    /// Declarative format hint ("%Y-%m-%d"); applied by the runtime's
    /// type coercion, carried through untouched here.
    Format(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub reference: Reference,
    pub extract: Option<Extract>,
    pub transforms: Vec<Transform>,
}

/// Apply the declared transforms to one value.
///
/// Only string values are transformed; anything else passes through
/// untouched (type coercion is not the core's job). A regex that does
/// not match leaves the value as-is.
pub fn apply_transforms(value: &Value, transforms: &[Transform]) -> anyhow::Result<Value> {
    let mut current = value.clone();
    for transform in transforms {
        let Some(s) = current.as_str().map(str::to_owned) else {
            continue;
        };
        match transform {
            Transform::Regex(pattern) => {
                let re = regex::Regex::new(pattern)
                    .with_context(|| format!("invalid regex transform: {}", pattern))?;
                if let Some(group) = re.captures(&s).and_then(|c| c.get(1)) {
                    current = Value::String(group.as_str().to_string());
                }
            }
            Transform::Replace { from, to } => {
                current = Value::String(s.replace(from.as_str(), to));
            }
            Transform::Separator(sep) => {
                let parts: Vec<Value> = s
                    .split(sep.as_str())
                    .map(|p| Value::String(p.to_string()))
                    .collect();
                current = Value::Array(parts);
            }
            Transform::Format(_) => {}
        }
    }
    Ok(current)
}

impl Transform {
    /// Parse the "from/to" shape of a replace declaration.
    pub fn parse_replace(decl: &str) -> anyhow::Result<Self> {
        match decl.split_once('/') {
            Some((from, to)) => Ok(Transform::Replace {
                from: from.to_string(),
                to: to.to_string(),
            }),
            None => bail!("replace transform must be declared as \"from/to\": {:?}", decl),
        }
    }
}
