use crate::annotation::AnnotationId;

/// What a transform callback changed, so views can follow along.
///
/// `update` pairs an old identity with the identity that replaced it;
/// `remove` lists identities that were deleted. Every identity the callback
/// replaced or removed, under any alias, belongs here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub update: Vec<(AnnotationId, AnnotationId)>,
    pub remove: Vec<AnnotationId>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_update(mut self, old: AnnotationId, new: AnnotationId) -> Self {
        self.update.push((old, new));
        self
    }

    #[must_use]
    pub fn with_removal(mut self, id: AnnotationId) -> Self {
        self.remove.push(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.remove.is_empty()
    }

    pub fn extend(&mut self, other: Changeset) {
        self.update.extend(other.update);
        self.remove.extend(other.remove);
    }

    /// Swaps updated identities in place and drops removed ones, keeping
    /// order and never introducing duplicates.
    pub(crate) fn apply_to_ids(&self, ids: &mut Vec<AnnotationId>) {
        for (old, new) in &self.update {
            for id in ids.iter_mut() {
                if id == old {
                    *id = *new;
                }
            }
        }
        ids.retain(|id| !self.remove.contains(id));

        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(*id));
    }
}
