/// Column state: the in-memory grouping of leads by stage.
///
/// Column vectors are shared-immutable (`Arc<Vec<Lead>>`) so observers can
/// detect "nothing changed" by pointer identity. Mutations swap in freshly
/// built vectors for the affected columns only; a column sequence handed out
/// earlier is never edited in place.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::Lead;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    columns: BTreeMap<i64, Arc<Vec<Lead>>>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replacement, keyed by stage id (the successful load path).
    pub fn replace_all(&mut self, columns: BTreeMap<i64, Vec<Lead>>) {
        self.columns = columns
            .into_iter()
            .map(|(stage_id, leads)| (stage_id, Arc::new(leads)))
            .collect();
    }

    pub fn column(&self, stage_id: i64) -> Option<&Arc<Vec<Lead>>> {
        self.columns.get(&stage_id)
    }

    /// Columns in stage-id order, for rendering.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Arc<Vec<Lead>>)> {
        self.columns.iter().map(|(id, col)| (*id, col))
    }

    /// The stage whose column currently holds `lead_id`, if any.
    pub fn stage_of(&self, lead_id: i64) -> Option<i64> {
        self.columns
            .iter()
            .find(|(_, leads)| leads.iter().any(|l| l.id == lead_id))
            .map(|(stage_id, _)| *stage_id)
    }

    pub fn find_lead(&self, lead_id: i64) -> Option<&Lead> {
        self.columns
            .values()
            .find_map(|leads| leads.iter().find(|l| l.id == lead_id))
    }

    pub fn total_leads(&self) -> usize {
        self.columns.values().map(|leads| leads.len()).sum()
    }

    /// Move a lead from one column to another, inserting immediately before
    /// `insert_before` when that lead is present in the destination, else
    /// appending. Returns `false` without touching any column when the move
    /// is a no-op (`from == to`, or the lead is not in `from_stage`).
    pub fn move_lead(
        &mut self,
        lead_id: i64,
        from_stage: i64,
        to_stage: i64,
        insert_before: Option<i64>,
    ) -> bool {
        if from_stage == to_stage {
            return false;
        }
        let Some(from_col) = self.columns.get(&from_stage) else {
            return false;
        };
        let Some(idx) = from_col.iter().position(|l| l.id == lead_id) else {
            return false;
        };

        let mut from_next = from_col.as_ref().clone();
        let lead = from_next.remove(idx);

        let mut to_next = self
            .columns
            .get(&to_stage)
            .map(|col| col.as_ref().clone())
            .unwrap_or_default();
        let at = insert_before.and_then(|id| to_next.iter().position(|l| l.id == id));
        match at {
            Some(i) => to_next.insert(i, lead),
            None => to_next.push(lead),
        }

        self.columns.insert(from_stage, Arc::new(from_next));
        self.columns.insert(to_stage, Arc::new(to_next));
        true
    }

    /// Relocate `lead_id` to the position currently held by `target_lead_id`
    /// within the same column. Returns `false` when either id is absent from
    /// the column, or the two ids already share a position.
    pub fn reorder_lead(&mut self, stage_id: i64, lead_id: i64, target_lead_id: i64) -> bool {
        if lead_id == target_lead_id {
            return false;
        }
        let Some(col) = self.columns.get(&stage_id) else {
            return false;
        };
        let Some(old_idx) = col.iter().position(|l| l.id == lead_id) else {
            return false;
        };
        let Some(new_idx) = col.iter().position(|l| l.id == target_lead_id) else {
            return false;
        };
        if old_idx == new_idx {
            return false;
        }

        let mut next = col.as_ref().clone();
        let lead = next.remove(old_idx);
        next.insert(new_idx, lead);
        self.columns.insert(stage_id, Arc::new(next));
        true
    }

    /// Drop a lead from whichever column holds it (the successful delete
    /// path; no reload needed since a deletion cannot be partially wrong).
    pub fn remove_lead(&mut self, lead_id: i64) -> bool {
        let Some(stage_id) = self.stage_of(lead_id) else {
            return false;
        };
        let col = &self.columns[&stage_id];
        let next: Vec<Lead> = col.iter().filter(|l| l.id != lead_id).cloned().collect();
        self.columns.insert(stage_id, Arc::new(next));
        true
    }
}
