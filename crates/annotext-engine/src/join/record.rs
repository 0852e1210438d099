use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::annotation::Annotation;

/// One joined group: the primary annotation plus, for every joined alias,
/// the annotations matched to it (possibly none).
///
/// Records are snapshots resolved from the document when they are handed
/// out; they do not change when the document does.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRecord {
    pub(crate) primary_alias: String,
    pub(crate) primary: Annotation,
    pub(crate) joined: Vec<(String, Vec<Annotation>)>,
}

impl JoinRecord {
    pub fn primary_alias(&self) -> &str {
        &self.primary_alias
    }

    pub fn primary(&self) -> &Annotation {
        &self.primary
    }

    /// Matches under a joined alias, `None` if the alias is not part of the
    /// join.
    pub fn get(&self, alias: &str) -> Option<&[Annotation]> {
        self.joined
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, annotations)| annotations.as_slice())
    }

    /// Matches under a joined alias, empty if there are none.
    pub fn joined(&self, alias: &str) -> &[Annotation] {
        self.get(alias).unwrap_or_default()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.joined.iter().map(|(name, _)| name.as_str())
    }
}

/// Serializes as `{ primary_alias: annotation, alias: [annotations], .. }`.
impl Serialize for JoinRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.joined.len() + 1))?;
        map.serialize_entry(&self.primary_alias, &self.primary)?;
        for (alias, annotations) in &self.joined {
            map.serialize_entry(alias, annotations)?;
        }
        map.end()
    }
}
