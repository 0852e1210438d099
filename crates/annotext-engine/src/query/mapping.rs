use crate::annotation::{Annotation, AnnotationData};
use crate::error::{DocumentError, Result};
use crate::value::{Attributes, Value, rename_keys, split_path};

const REQUIRED_FIELDS: [&str; 3] = ["type", "start", "end"];

/// Key renames, addressed by dot path from the annotation root
/// (`"attributes.href"` → `"url"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rename {
    entries: Vec<(String, String)>,
}

impl Rename {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the value at `path` to a sibling key called `new_name`.
    #[must_use]
    pub fn key(mut self, path: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.entries.push((path.into(), new_name.into()));
        self
    }

    /// Builds renames from a mapping that mirrors the annotation's shape,
    /// where each string leaf is the new name of the key it sits under:
    /// `{"attributes": {"href": "url"}}`.
    pub fn from_shape(shape: &Attributes) -> Result<Self> {
        let mut rename = Self::new();
        collect_leaves(shape, &mut Vec::new(), &mut rename.entries)?;
        Ok(rename)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves entries to paths relative to `attributes`. Entries outside
    /// `attributes` address nothing and are dropped.
    pub(crate) fn resolve(&self) -> Result<Vec<(Vec<String>, String)>> {
        let mut resolved = Vec::new();
        for (path, new_name) in &self.entries {
            let segments = split_path(path)?;
            if REQUIRED_FIELDS.contains(&segments[0]) {
                return Err(DocumentError::InvalidPath(format!(
                    "'{path}' names a required field and cannot be renamed"
                )));
            }
            if segments[0] != "attributes" || segments.len() < 2 {
                continue;
            }
            if new_name.is_empty() || new_name.contains('.') {
                return Err(DocumentError::InvalidPath(format!(
                    "'{new_name}' is not a valid key name"
                )));
            }
            let relative = segments[1..].iter().map(|s| s.to_string()).collect();
            resolved.push((relative, new_name.clone()));
        }
        Ok(resolved)
    }
}

fn collect_leaves(
    shape: &Attributes,
    prefix: &mut Vec<String>,
    out: &mut Vec<(String, String)>,
) -> Result<()> {
    for (key, value) in shape {
        prefix.push(key.clone());
        match value {
            Value::Map(nested) => collect_leaves(nested, prefix, out)?,
            Value::String(new_name) => out.push((prefix.join("."), new_name.clone())),
            _ => {
                return Err(DocumentError::InvalidPath(format!(
                    "rename target for '{}' must be a string",
                    prefix.join(".")
                )));
            }
        }
        prefix.pop();
    }
    Ok(())
}

/// Structural rewrite for [`Collection::map`](crate::Collection::map):
/// an optional retype combined with key renames, one output per input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    kind: Option<String>,
    rename: Rename,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn retype(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn rename(mut self, path: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.rename = self.rename.key(path, new_name);
        self
    }

    /// `{"type": "link", "attributes": {"href": "url"}}` retypes to `link`
    /// and renames `attributes.href` to `attributes.url`.
    pub fn from_shape(shape: &Attributes) -> Result<Self> {
        let mut mapping = Self::new();
        for (key, value) in shape {
            match (key.as_str(), value) {
                ("type", Value::String(kind)) => mapping.kind = Some(kind.clone()),
                ("attributes", Value::Map(_)) => {
                    let mut only_attributes = Attributes::new();
                    only_attributes.insert(key.clone(), value.clone());
                    mapping.rename = Rename::from_shape(&only_attributes)?;
                }
                _ => {
                    return Err(DocumentError::InvalidPath(format!(
                        "unsupported mapping key '{key}'"
                    )));
                }
            }
        }
        Ok(mapping)
    }

    pub(crate) fn compile(&self) -> Result<CompiledMapping<'_>> {
        Ok(CompiledMapping {
            kind: self.kind.as_deref(),
            renames: self.rename.resolve()?,
        })
    }
}

pub(crate) struct CompiledMapping<'a> {
    kind: Option<&'a str>,
    renames: Vec<(Vec<String>, String)>,
}

impl CompiledMapping<'_> {
    pub(crate) fn apply(&self, annotation: &Annotation) -> AnnotationData {
        let mut data = annotation.to_data();
        if let Some(kind) = self.kind {
            data.kind = kind.to_string();
        }
        if let Some(attributes) = data.attributes.as_mut() {
            rename_keys(attributes, &self.renames);
        }
        data
    }
}

/// Output of a `map_with` callback: one replacement or any number of them.
/// `MapResult::Many(vec![])` removes the source annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum MapResult {
    One(AnnotationData),
    Many(Vec<AnnotationData>),
}

impl MapResult {
    pub fn none() -> Self {
        MapResult::Many(Vec::new())
    }

    pub fn into_vec(self) -> Vec<AnnotationData> {
        match self {
            MapResult::One(data) => vec![data],
            MapResult::Many(all) => all,
        }
    }
}

impl From<AnnotationData> for MapResult {
    fn from(data: AnnotationData) -> Self {
        MapResult::One(data)
    }
}

impl From<Vec<AnnotationData>> for MapResult {
    fn from(all: Vec<AnnotationData>) -> Self {
        MapResult::Many(all)
    }
}
