//! Raw source declarations as they appear in the description JSON.
//!
//! JSON shapes:
//!
//! { "distribution": "rows", "extract": { "column": "user_id" } }
//! { "field": "users/id" }
//! { "distribution": "files",
//!   "extract": { "file_property": "filename" },
//!   "transforms": [ { "regex": "^(\\d+)\\.jpg$" } ] }
//!
//! Exactly one reference (distribution | field), at most one extract
//! addressing, and each transform entry carries exactly one rule.

use crate::structure::source::{Extract, FileProperty, Reference, Source, Transform};
use crate::structure::NodeId;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    #[serde(default)]
    pub distribution: Option<String>,

    #[serde(default)]
    pub field: Option<String>,

    #[serde(default)]
    pub extract: Option<ExtractSpec>,

    #[serde(default)]
    pub transforms: Vec<TransformSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractSpec {
    /// CSV column by header name.
    #[serde(default)]
    pub column: Option<String>,

    /// "fullpath" | "filename" | "content" | "lines" | "lineNumbers"
    #[serde(default)]
    pub file_property: Option<String>,

    #[serde(default)]
    pub json_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformSpec {
    #[serde(default)]
    pub regex: Option<String>,

    /// Declared as "from/to".
    #[serde(default)]
    pub replace: Option<String>,

    #[serde(default)]
    pub separator: Option<String>,

    #[serde(default)]
    pub format: Option<String>,
}

impl SourceSpec {
    /// Validate and resolve against the declared node names.
    ///
    /// `owner` names the declaring field in error messages.
    pub fn resolve(
        &self,
        owner: &str,
        distribution_names: &BTreeSet<String>,
        field_ids: &BTreeSet<String>,
    ) -> anyhow::Result<Source> {
        let reference = match (&self.distribution, &self.field) {
            (Some(name), None) => {
                if !distribution_names.contains(name) {
                    bail!(
                        "source of `{}` references unknown distribution: {}",
                        owner,
                        name
                    );
                }
                Reference::Distribution(NodeId::new(name.clone()))
            }
            (None, Some(id)) => {
                if !field_ids.contains(id) {
                    bail!("source of `{}` references unknown field: {}", owner, id);
                }
                Reference::Field(NodeId::new(id.clone()))
            }
            _ => bail!(
                "source of `{}` must reference exactly one distribution or field",
                owner
            ),
        };

        let extract = match &self.extract {
            None => None,
            Some(e) => Some(e.resolve(owner)?),
        };

        let mut transforms = Vec::with_capacity(self.transforms.len());
        for t in &self.transforms {
            transforms.push(t.resolve(owner)?);
        }

        Ok(Source {
            reference,
            extract,
            transforms,
        })
    }
}

impl ExtractSpec {
    fn resolve(&self, owner: &str) -> anyhow::Result<Extract> {
        match (&self.column, &self.file_property, &self.json_path) {
            (Some(column), None, None) => Ok(Extract::Column(column.clone())),
            (None, Some(prop), None) => match FileProperty::parse(prop) {
                Some(p) => Ok(Extract::FileProperty(p)),
                None => bail!("source of `{}` has unknown file_property: {}", owner, prop),
            },
            (None, None, Some(path)) => Ok(Extract::JsonPath(path.clone())),
            _ => bail!(
                "source of `{}` must declare exactly one of column/file_property/json_path",
                owner
            ),
        }
    }
}

impl TransformSpec {
    fn resolve(&self, owner: &str) -> anyhow::Result<Transform> {
        match (&self.regex, &self.replace, &self.separator, &self.format) {
            (Some(pattern), None, None, None) => {
                // Compile once now so a bad pattern fails at validation
                // time, not inside the runtime's ReadField.
                regex::Regex::new(pattern)
                    .with_context(|| format!("invalid regex transform on `{}`", owner))?;
                Ok(Transform::Regex(pattern.clone()))
            }
            (None, Some(decl), None, None) => Transform::parse_replace(decl)
                .with_context(|| format!("invalid replace transform on `{}`", owner)),
            (None, None, Some(sep), None) => Ok(Transform::Separator(sep.clone())),
            (None, None, None, Some(fmt)) => Ok(Transform::Format(fmt.clone())),
            _ => bail!(
                "transform on `{}` must declare exactly one of regex/replace/separator/format",
                owner
            ),
        }
    }
}
