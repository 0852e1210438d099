//! N-way joins across aliased collections, and the transform pass that
//! edits the document per joined group.
//!
//! A join stores identities only: one row per primary annotation, with one
//! identity sequence per joined alias. Records handed to predicates and
//! transform callbacks are resolved from the document on demand, so they
//! always carry current positions.

pub mod changeset;
pub mod record;

pub use changeset::Changeset;
pub use record::JoinRecord;

use std::convert::Infallible;

use crate::annotation::{Annotation, AnnotationId};
use crate::editing::Document;
use crate::error::{DocumentError, Result};
use crate::query::Collection;

#[derive(Debug, Clone, PartialEq, Eq)]
struct JoinRow {
    primary: AnnotationId,
    /// One sequence per joined alias, parallel to `Join::aliases`
    joined: Vec<Vec<AnnotationId>>,
}

impl JoinRow {
    fn holds(&self, id: AnnotationId) -> bool {
        self.primary == id || self.joined.iter().any(|ids| ids.contains(&id))
    }
}

/// Records grouping each primary annotation with its matches from one or
/// more joined collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    primary_alias: String,
    aliases: Vec<String>,
    rows: Vec<JoinRow>,
}

impl Join {
    pub(crate) fn first<F>(
        doc: &Document,
        primary: &Collection,
        other: &Collection,
        predicate: F,
    ) -> Result<Self>
    where
        F: Fn(&Annotation, &Annotation) -> bool,
    {
        let primary_alias = primary.name().ok_or(DocumentError::UnaliasedCollection)?;
        let alias = other.name().ok_or(DocumentError::UnaliasedCollection)?;
        if alias == primary_alias {
            return Err(DocumentError::DuplicateAlias(alias.to_string()));
        }

        let candidates = other.annotations(doc);
        let rows = primary
            .annotations(doc)
            .into_iter()
            .map(|left| JoinRow {
                primary: left.id(),
                joined: vec![
                    candidates
                        .iter()
                        .filter(|right| predicate(left, right))
                        .map(|right| right.id())
                        .collect(),
                ],
            })
            .collect();

        Ok(Self {
            primary_alias: primary_alias.to_string(),
            aliases: vec![alias.to_string()],
            rows,
        })
    }

    /// Adds `other` under its alias to every record. The predicate sees the
    /// record accumulated so far, so it can compare against the primary
    /// (`record.primary()`) or any earlier alias. Existing aliases are left
    /// as they are.
    pub fn join<F>(mut self, doc: &Document, other: &Collection, predicate: F) -> Result<Self>
    where
        F: Fn(&JoinRecord, &Annotation) -> bool,
    {
        let alias = other.name().ok_or(DocumentError::UnaliasedCollection)?;
        if alias == self.primary_alias || self.aliases.iter().any(|a| a == alias) {
            return Err(DocumentError::DuplicateAlias(alias.to_string()));
        }

        let candidates = other.annotations(doc);
        let matches: Vec<Vec<AnnotationId>> = self
            .rows
            .iter()
            .map(|row| match self.resolve_row(doc, row) {
                Some(record) => candidates
                    .iter()
                    .filter(|right| predicate(&record, right))
                    .map(|right| right.id())
                    .collect(),
                None => Vec::new(),
            })
            .collect();

        for (row, ids) in self.rows.iter_mut().zip(matches) {
            row.joined.push(ids);
        }
        self.aliases.push(alias.to_string());
        Ok(self)
    }

    pub fn primary_alias(&self) -> &str {
        &self.primary_alias
    }

    /// Joined aliases in the order they were added.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves every record against the document.
    pub fn records(&self, doc: &Document) -> Vec<JoinRecord> {
        self.rows
            .iter()
            .filter_map(|row| self.resolve_row(doc, row))
            .collect()
    }

    fn resolve_row(&self, doc: &Document, row: &JoinRow) -> Option<JoinRecord> {
        let primary = doc.annotation(row.primary)?.clone();
        let joined = self
            .aliases
            .iter()
            .zip(&row.joined)
            .map(|(alias, ids)| {
                let annotations = ids
                    .iter()
                    .filter_map(|id| doc.annotation(*id))
                    .cloned()
                    .collect();
                (alias.clone(), annotations)
            })
            .collect();
        Some(JoinRecord {
            primary_alias: self.primary_alias.clone(),
            primary,
            joined,
        })
    }

    // ============ Transform ============

    /// Runs `f` once per record, in order, with mutable access to the
    /// document, then reconciles the join against the changeset `f`
    /// returns.
    ///
    /// Reconciliation works on identities only; positions are whatever the
    /// document's own edit remapping produced. Updates swap the old identity
    /// for the new one everywhere it appears, including primaries and
    /// records not yet visited. Removals drop the identity from every
    /// sequence; removing a primary drops its record. Identities that left
    /// the document without being reported are pruned too.
    ///
    /// Returns the changesets of the whole pass merged, for reconciling
    /// other collections over the same document.
    pub fn transform<F>(&mut self, doc: &mut Document, mut f: F) -> Changeset
    where
        F: FnMut(&mut Document, &JoinRecord) -> Changeset,
    {
        let Ok(changeset) =
            self.try_transform(doc, |doc, record| Ok::<_, Infallible>(f(doc, record)));
        changeset
    }

    /// Fallible [`transform`](Self::transform).
    ///
    /// Not transactional: when `f` fails, the error is returned unchanged,
    /// and any document edits made by earlier calls, or by the failing call
    /// before it returned, stay in place. Undoing them is the caller's
    /// responsibility.
    pub fn try_transform<F, E>(
        &mut self,
        doc: &mut Document,
        mut f: F,
    ) -> std::result::Result<Changeset, E>
    where
        F: FnMut(&mut Document, &JoinRecord) -> std::result::Result<Changeset, E>,
    {
        let mut merged = Changeset::new();
        let mut index = 0;
        while index < self.rows.len() {
            let Some(record) = self.resolve_row(doc, &self.rows[index]) else {
                log::debug!(
                    "primary {} left the document, dropping record",
                    self.rows[index].primary
                );
                self.rows.remove(index);
                continue;
            };

            let changeset = f(doc, &record)?;
            let removed = self.reconcile(doc, &changeset);
            index = index + 1 - removed.iter().filter(|&&row| row <= index).count();
            merged.extend(changeset);
        }
        Ok(merged)
    }

    /// Applies a changeset to every row. Returns the positions (before
    /// removal) of the rows that were dropped.
    fn reconcile(&mut self, doc: &Document, changeset: &Changeset) -> Vec<usize> {
        for (old, new) in &changeset.update {
            if !self.rows.iter().any(|row| row.holds(*old)) {
                log::warn!("{}", DocumentError::UnresolvedJoinReference(*old));
                continue;
            }
            if !doc.contains(*new) {
                log::warn!("{}", DocumentError::UnresolvedJoinReference(*new));
                continue;
            }
            for row in &mut self.rows {
                if row.primary == *old {
                    row.primary = *new;
                }
            }
        }
        for id in &changeset.remove {
            if !self.rows.iter().any(|row| row.holds(*id)) {
                log::warn!("{}", DocumentError::UnresolvedJoinReference(*id));
            }
        }

        let mut removed = Vec::new();
        for (position, row) in self.rows.iter_mut().enumerate() {
            for ids in &mut row.joined {
                changeset.apply_to_ids(ids);
                ids.retain(|id| doc.contains(*id));
            }
            if changeset.remove.contains(&row.primary) || !doc.contains(row.primary) {
                removed.push(position);
            }
        }

        for position in removed.iter().rev() {
            self.rows.remove(*position);
        }
        if !removed.is_empty() {
            log::debug!("dropped {} record(s) whose primary was removed", removed.len());
        }
        removed
    }
}
