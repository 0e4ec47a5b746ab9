// Standard Library Imports
use std::collections::BTreeSet;

// External Crate Imports
use ahash::HashMap;
use molgraph::{
    AtomIndex, BondIndex, Sgroup, SgroupIndex,
    sgroup::{Bracket, SgroupAttribute, SgroupType},
};

/// Sgroups under construction, kept in declaration order and looked up by their record-local id. Parent links stay as
/// ids until `finish`, so a group can name a parent that hasn't been described yet.
#[derive(Debug, Default)]
pub(crate) struct SgroupArena {
    drafts: Vec<SgroupDraft>,
    ids: HashMap<u32, usize>,
}

#[derive(Debug)]
pub(crate) struct SgroupDraft {
    id: u32,
    kind: Option<SgroupType>,
    pub(crate) atoms: BTreeSet<AtomIndex>,
    pub(crate) bonds: BTreeSet<BondIndex>,
    pub(crate) parents: BTreeSet<u32>,
    pub(crate) brackets: Vec<Bracket>,
    pub(crate) attributes: Vec<SgroupAttribute>,
}

impl SgroupArena {
    /// Starts a fresh group under `id`. A group that was already declared is wiped, but keeps its original position.
    pub(crate) fn declare(&mut self, id: u32, kind: Option<SgroupType>) {
        let draft = SgroupDraft::new(id, kind);
        match self.ids.get(&id) {
            Some(&slot) => self.drafts[slot] = draft,
            None => {
                self.ids.insert(id, self.drafts.len());
                self.drafts.push(draft);
            }
        }
    }

    pub(crate) fn contains(&self, id: u32) -> bool {
        self.ids.contains_key(&id)
    }

    /// The group declared under `id`, or a new untyped one
    pub(crate) fn get_or_insert(&mut self, id: u32) -> &mut SgroupDraft {
        if !self.contains(id) {
            self.declare(id, None);
        }
        let slot = self.ids[&id];
        &mut self.drafts[slot]
    }

    /// Whether making `parent` a parent of `child` would close a loop in the hierarchy
    pub(crate) fn creates_cycle(&self, child: u32, parent: u32) -> bool {
        let mut seen = BTreeSet::new();
        let mut pending = vec![parent];
        while let Some(id) = pending.pop() {
            if id == child {
                return true;
            }
            if seen.insert(id) {
                let parents = self.ids.get(&id).map(|&slot| &self.drafts[slot].parents);
                pending.extend(parents.into_iter().flatten());
            }
        }
        false
    }

    /// Converts every draft into its typed form. Parent ids become indices into the molecule's list of groups, where
    /// these groups will start at `base`.
    pub(crate) fn finish(self, base: usize) -> Vec<Sgroup> {
        let Self { drafts, ids } = self;
        drafts
            .into_iter()
            .map(|draft| {
                let mut sgroup = Sgroup::downcast(draft.id, draft.kind, draft.attributes);
                sgroup.atoms = draft.atoms;
                sgroup.bonds = draft.bonds;
                sgroup.brackets = draft.brackets;
                sgroup.parents = draft
                    .parents
                    .iter()
                    .filter_map(|parent| ids.get(parent))
                    .map(|&slot| SgroupIndex::new(base + slot))
                    .collect();
                sgroup
            })
            .collect()
    }
}

impl SgroupDraft {
    fn new(id: u32, kind: Option<SgroupType>) -> Self {
        Self {
            id,
            kind,
            atoms: BTreeSet::new(),
            bonds: BTreeSet::new(),
            parents: BTreeSet::new(),
            brackets: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub(crate) const fn kind(&self) -> Option<SgroupType> {
        self.kind
    }
}

// Module Tests ========================================================================================================
