//! Data rows: identity, provenance and shared row content
//!
//! A [`DataRow`] wraps a list-specific payload (trait, equipment, skill,
//! spell or note) with the fields every list shares. Rows are compared by
//! content through [`TreeItem::is_equivalent_to`], which ignores identity
//! and provenance, so a fresh clone is equivalent to its source until one
//! of them is edited.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt::Debug;

use super::feature::Feature;
use super::prereq::PrereqList;
use super::row_tree::{DetachedRow, RowTree, TreeItem};
use crate::error::DomainError;
use crate::ids::RowId;

/// List-specific content carried by a [`DataRow`].
pub trait RowPayload: Debug + Clone + PartialEq + Serialize + DeserializeOwned {
    fn is_container(&self) -> bool;
}

/// Where a cloned row came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub based_on_id: RowId,
    /// SHA-256 hex digest of the source row's content at clone time
    pub based_on_hash: String,
}

/// A default another skill or attribute provides for a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefault {
    /// `"skill"`, `"parry"`, `"block"` or an attribute key such as `"dx"`
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub specialization: String,
    #[serde(default)]
    pub modifier: i32,
}

impl SkillDefault {
    pub fn new(kind: impl Into<String>, modifier: i32) -> Self {
        Self {
            kind: kind.into(),
            name: String::new(),
            specialization: String::new(),
            modifier,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn prereqs_are_default(prereqs: &PrereqList) -> bool {
    *prereqs == PrereqList::default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRow<P> {
    pub id: RowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "prereqs_are_default")]
    pub prereqs: PrereqList,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<SkillDefault>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    pub data: P,
}

impl<P: RowPayload> DataRow<P> {
    pub fn new(data: P) -> Self {
        Self {
            id: RowId::new(),
            provenance: None,
            notes: String::new(),
            categories: BTreeSet::new(),
            prereqs: PrereqList::default(),
            defaults: Vec::new(),
            features: Vec::new(),
            disabled: false,
            data,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_prereqs(mut self, prereqs: PrereqList) -> Self {
        self.prereqs = prereqs;
        self
    }

    pub fn with_default(mut self, default: SkillDefault) -> Self {
        self.defaults.push(default);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Wraps the row as a detached tree node with no children.
    pub fn detached(self) -> DetachedRow<Self> {
        DetachedRow::new(self)
    }

    pub fn set_disabled(&mut self, disabled: bool) -> bool {
        if self.disabled == disabled {
            return false;
        }
        self.disabled = disabled;
        true
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> bool {
        let notes = notes.into();
        if self.notes == notes {
            return false;
        }
        self.notes = notes;
        true
    }
}

impl<P: RowPayload> TreeItem for DataRow<P> {
    fn row_id(&self) -> RowId {
        self.id
    }

    fn can_have_children(&self) -> bool {
        self.data.is_container()
    }

    fn is_equivalent_to(&self, other: &Self) -> bool {
        self.notes == other.notes
            && self.categories == other.categories
            && self.prereqs == other.prereqs
            && self.defaults == other.defaults
            && self.features == other.features
            && self.disabled == other.disabled
            && self.data == other.data
    }
}

/// True when the row or any of its ancestors is disabled.
pub fn is_effectively_disabled<P: RowPayload>(tree: &RowTree<DataRow<P>>, id: RowId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .any(|row| tree.get(row).is_some_and(|r| r.disabled))
}

// =============================================================================
// Content hashing and cloning
// =============================================================================

/// Serialized view used for hashing: content and children, without
/// identity, provenance or open state.
#[derive(Serialize)]
struct HashedRow<'a, P> {
    notes: &'a str,
    categories: &'a BTreeSet<String>,
    prereqs: &'a PrereqList,
    defaults: &'a [SkillDefault],
    features: &'a [Feature],
    disabled: bool,
    data: &'a P,
    children: Vec<HashedRow<'a, P>>,
}

impl<'a, P: RowPayload> HashedRow<'a, P> {
    fn from_detached(row: &'a DetachedRow<DataRow<P>>) -> Self {
        Self {
            notes: &row.row.notes,
            categories: &row.row.categories,
            prereqs: &row.row.prereqs,
            defaults: &row.row.defaults,
            features: &row.row.features,
            disabled: row.row.disabled,
            data: &row.row.data,
            children: row.children.iter().map(HashedRow::from_detached).collect(),
        }
    }
}

/// SHA-256 hex digest of a detached row's content, children included.
pub fn content_hash<P: RowPayload>(row: &DetachedRow<DataRow<P>>) -> Result<String, DomainError> {
    let bytes = serde_json::to_vec(&HashedRow::from_detached(row))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Deep copy of a subtree with fresh ids. Every copied row records the row
/// it was cloned from and that row's content hash.
pub fn clone_subtree<P: RowPayload>(
    tree: &RowTree<DataRow<P>>,
    id: RowId,
) -> Result<DetachedRow<DataRow<P>>, DomainError> {
    let mut copy = tree
        .detach_clone(id)
        .ok_or_else(|| DomainError::not_found("Row", id.to_string()))?;
    reidentify(&mut copy)?;
    Ok(copy)
}

fn reidentify<P: RowPayload>(row: &mut DetachedRow<DataRow<P>>) -> Result<(), DomainError> {
    let hash = content_hash(row)?;
    row.row.provenance = Some(Provenance {
        based_on_id: row.row.id,
        based_on_hash: hash,
    });
    row.row.id = RowId::new();
    for child in &mut row.children {
        reidentify(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::note::NoteData;
    use crate::entities::feature::BonusAttribute;
    use crate::entities::modifier::TraitModifier;
    use crate::entities::trait_row::{ContainerType, TraitData};

    fn note(text: &str) -> DataRow<NoteData> {
        DataRow::new(NoteData::new(text))
    }

    fn trait_tree() -> (RowTree<DataRow<TraitData>>, RowId, RowId) {
        let group = DataRow::new(TraitData::container("Group", ContainerType::Group));
        let child = DataRow::new(TraitData::new("Acute Vision", 2).with_levels(3, 2));
        let group_id = group.id;
        let child_id = child.id;
        let tree = RowTree::from_detached(vec![group.detached().with_child(child.detached())])
            .expect("tree");
        (tree, group_id, child_id)
    }

    #[test]
    fn clone_is_equivalent_and_records_provenance() {
        let (tree, group_id, child_id) = trait_tree();
        let copy = clone_subtree(&tree, group_id).expect("clone");

        assert_ne!(copy.id(), group_id);
        assert_ne!(copy.children[0].id(), child_id);
        let provenance = copy.row.provenance.as_ref().expect("provenance");
        assert_eq!(provenance.based_on_id, group_id);
        assert_eq!(provenance.based_on_hash.len(), 64);

        let source = tree.detach_clone(group_id).expect("source");
        assert!(copy.is_equivalent_to(&source));
    }

    type TraitCopy = DetachedRow<DataRow<TraitData>>;

    #[test]
    fn mutating_any_field_of_a_clone_breaks_equivalence() {
        let edits: [(&str, fn(&mut TraitCopy)); 8] = [
            ("levels", |copy| copy.children[0].row.data.levels = 4),
            ("notes", |copy| {
                assert!(copy.row.set_notes("Keep an eye out"));
            }),
            ("categories", |copy| {
                copy.row.categories.insert("Physical".to_string());
            }),
            ("features", |copy| {
                copy.row
                    .features
                    .push(Feature::attribute_bonus(BonusAttribute::Per, 1.0));
            }),
            ("modifiers", |copy| {
                copy.row
                    .data
                    .modifiers
                    .push(TraitModifier::percentage("Extended", 20));
            }),
            ("disabled", |copy| {
                assert!(copy.row.set_disabled(true));
            }),
            ("nested child notes", |copy| {
                assert!(copy.children[0].row.set_notes("Telescopic"));
            }),
            ("nested child removed", |copy| {
                copy.children.clear();
            }),
        ];

        let (tree, group_id, _) = trait_tree();
        let source = tree.detach_clone(group_id).expect("source");
        for (field, edit) in edits {
            let mut copy = clone_subtree(&tree, group_id).expect("clone");
            assert!(copy.is_equivalent_to(&source), "fresh clone for {field}");
            edit(&mut copy);
            assert!(!copy.is_equivalent_to(&source), "edited {field}");
        }
    }

    #[test]
    fn identity_and_provenance_do_not_affect_equivalence() {
        let (tree, group_id, _) = trait_tree();
        let first = clone_subtree(&tree, group_id).expect("clone");
        let mut second = clone_subtree(&tree, group_id).expect("clone");
        assert_ne!(first.id(), second.id());
        assert_ne!(first.children[0].id(), second.children[0].id());
        assert!(first.is_equivalent_to(&second));

        second.row.provenance = None;
        second.children[0].row.provenance = Some(Provenance {
            based_on_id: RowId::new(),
            based_on_hash: "0".repeat(64),
        });
        assert!(first.is_equivalent_to(&second));
        assert!(second.is_equivalent_to(&first));
    }

    #[test]
    fn content_hash_ignores_identity() {
        let a = note("Bring rope").detached();
        let b = note("Bring rope").detached();
        let c = note("Bring chain").detached();
        assert_eq!(content_hash(&a).expect("hash"), content_hash(&b).expect("hash"));
        assert_ne!(content_hash(&a).expect("hash"), content_hash(&c).expect("hash"));
    }

    #[test]
    fn disabled_state_is_inherited() {
        let (mut tree, group_id, child_id) = trait_tree();
        assert!(!is_effectively_disabled(&tree, child_id));
        if let Some(group) = tree.get_mut(group_id) {
            assert!(group.set_disabled(true));
            assert!(!group.set_disabled(true));
        }
        assert!(is_effectively_disabled(&tree, child_id));
    }

    #[test]
    fn clone_of_unknown_row_is_not_found() {
        let (tree, _, _) = trait_tree();
        let result = clone_subtree(&tree, RowId::new());
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
