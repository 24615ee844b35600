/// Drag reconciler: keeps column state consistent with an in-progress drag.
///
/// The rendering layer identifies droppable elements with string tags
/// (`col-{stage_id}` for column space, `lead-{id}` for cards) and feeds the
/// three lifecycle signals here. Cross-column moves are applied eagerly on
/// drag-over so the board already shows the pending drop; persistence is
/// deferred to drag-end and reported back to the caller as a `DragOutcome`.
/// Malformed or foreign tags never error, they make the phase a no-op.
use crate::board::BoardState;

pub const COLUMN_TAG_PREFIX: &str = "col-";
pub const CARD_TAG_PREFIX: &str = "lead-";

/// A decoded droppable element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Column(i64),
    Card(i64),
}

impl DragTarget {
    /// `None` for anything that is not a well-formed column or card tag.
    pub fn parse(raw: &str) -> Option<DragTarget> {
        if let Some(rest) = raw.strip_prefix(COLUMN_TAG_PREFIX) {
            return rest.parse().ok().map(DragTarget::Column);
        }
        if let Some(rest) = raw.strip_prefix(CARD_TAG_PREFIX) {
            return rest.parse().ok().map(DragTarget::Card);
        }
        None
    }

    /// The string tag the rendering layer attaches to the element.
    pub fn tag(&self) -> String {
        match self {
            DragTarget::Column(stage_id) => format!("{}{}", COLUMN_TAG_PREFIX, stage_id),
            DragTarget::Card(lead_id) => format!("{}{}", CARD_TAG_PREFIX, lead_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging { lead_id: i64, origin_stage: i64 },
}

/// What the caller must do after a drag-end or drag-cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The gesture never resolved to a draggable lead; nothing to do.
    Ignored,
    /// The drag settled locally (same-column reorder or no-op); no remote
    /// call is made, in-column order is not persisted remotely.
    Completed,
    /// The lead crossed a stage boundary; issue exactly one update setting
    /// its stage to `stage_id`.
    Persist { lead_id: i64, stage_id: i64 },
    /// Optimistic state may be inconsistent; discard it with a full reload.
    Reload,
}

/// State machine for one drag gesture. `Idle` between gestures,
/// `Dragging` from drag-start to the matching drag-end/cancel.
///
/// Every membership question ("which column holds lead X right now") is
/// re-derived from the board passed into each call, never from a snapshot
/// taken at drag-start; drag-over mutations continuously change the answer.
#[derive(Debug, Default)]
pub struct DragReconciler {
    state: DragState,
}

impl DragReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dragged lead's id, for the floating drag preview.
    pub fn active_lead(&self) -> Option<i64> {
        match self.state {
            DragState::Dragging { lead_id, .. } => Some(lead_id),
            DragState::Idle => None,
        }
    }

    /// Begin a gesture. Stays `Idle` when the tag is not a card tag or the
    /// lead is not on the board.
    pub fn drag_start(&mut self, board: &BoardState, raw_id: &str) {
        let Some(DragTarget::Card(lead_id)) = DragTarget::parse(raw_id) else {
            log::debug!("[drag] ignoring drag-start with unresolvable id {:?}", raw_id);
            return;
        };
        let Some(origin_stage) = board.stage_of(lead_id) else {
            log::debug!("[drag] ignoring drag-start for unknown lead {}", lead_id);
            return;
        };
        self.state = DragState::Dragging { lead_id, origin_stage };
    }

    /// Hover update. Applies the cross-column move eagerly so the visual
    /// position already reflects the pending drop: inserted immediately
    /// before the hovered card, or appended when hovering empty column
    /// space. Purely local; never issues a remote call.
    pub fn drag_over(&mut self, board: &mut BoardState, over: Option<&str>) {
        let DragState::Dragging { lead_id, .. } = self.state else {
            return;
        };
        let Some(target) = over.and_then(DragTarget::parse) else {
            return;
        };
        let Some(from_stage) = board.stage_of(lead_id) else {
            return;
        };

        let (to_stage, insert_before) = match target {
            DragTarget::Column(stage_id) => (stage_id, None),
            DragTarget::Card(other_id) => {
                let Some(stage_id) = board.stage_of(other_id) else {
                    return;
                };
                (stage_id, Some(other_id))
            }
        };
        if to_stage == from_stage {
            return;
        }
        board.move_lead(lead_id, from_stage, to_stage, insert_before);
    }

    /// Finish the gesture. Re-resolves the lead's current column after all
    /// drag-over mutations and reports the single follow-up action.
    pub fn drag_end(&mut self, board: &mut BoardState, over: Option<&str>) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let DragState::Dragging { lead_id, origin_stage } = state else {
            return DragOutcome::Ignored;
        };

        // Dropped outside any droppable area: no rollback computation,
        // just resync from the authoritative store.
        let Some(over) = over else {
            return DragOutcome::Reload;
        };

        let Some(current_stage) = board.stage_of(lead_id) else {
            return DragOutcome::Ignored;
        };

        if current_stage != origin_stage {
            // Cross-column: drag-over already moved it visually, the caller
            // persists the stage change with one update call.
            return DragOutcome::Persist { lead_id, stage_id: current_stage };
        }

        if let Some(DragTarget::Card(target_id)) = DragTarget::parse(over) {
            board.reorder_lead(current_stage, lead_id, target_id);
        }
        DragOutcome::Completed
    }

    /// Abort the gesture (escape key, interrupted pointer). Always answered
    /// with a reload; the optimistic state may no longer match intent.
    pub fn drag_cancel(&mut self) -> DragOutcome {
        self.state = DragState::Idle;
        DragOutcome::Reload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Lead;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn make_lead(id: i64) -> Lead {
        Lead {
            id,
            name: format!("Lead {}", id),
            expected_revenue: 0.0,
            contact_name: None,
            email_from: None,
            phone: None,
            description: None,
            date_deadline: None,
            tag_ids: Vec::new(),
            user_id: None,
        }
    }

    fn make_board(columns: Vec<(i64, Vec<i64>)>) -> BoardState {
        let mut board = BoardState::new();
        board.replace_all(
            columns
                .into_iter()
                .map(|(stage_id, ids)| {
                    (stage_id, ids.into_iter().map(make_lead).collect::<Vec<_>>())
                })
                .collect::<BTreeMap<_, _>>(),
        );
        board
    }

    fn ids(board: &BoardState, stage_id: i64) -> Vec<i64> {
        board
            .column(stage_id)
            .map(|col| col.iter().map(|l| l.id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(DragTarget::parse("col-3"), Some(DragTarget::Column(3)));
        assert_eq!(DragTarget::parse("lead-7"), Some(DragTarget::Card(7)));
        assert_eq!(DragTarget::parse("lead-"), None);
        assert_eq!(DragTarget::parse("lead-x"), None);
        assert_eq!(DragTarget::parse("card-7"), None);
        assert_eq!(DragTarget::parse(""), None);
    }

    #[test]
    fn test_tag_round_trips() {
        assert_eq!(DragTarget::Column(3).tag(), "col-3");
        assert_eq!(DragTarget::parse(&DragTarget::Card(12).tag()), Some(DragTarget::Card(12)));
    }

    #[test]
    fn test_drag_start_malformed_stays_idle() {
        let board = make_board(vec![(1, vec![10])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "col-1");
        assert_eq!(drag.active_lead(), None);
        drag.drag_start(&board, "lead-999");
        assert_eq!(drag.active_lead(), None);
        drag.drag_start(&board, "lead-10");
        assert_eq!(drag.active_lead(), Some(10));
    }

    #[test]
    fn test_drag_over_moves_into_empty_column() {
        let mut board = make_board(vec![(1, vec![10, 11]), (2, vec![])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("col-2"));
        assert_eq!(ids(&board, 1), vec![11]);
        assert_eq!(ids(&board, 2), vec![10]);
    }

    #[test]
    fn test_drag_over_inserts_before_hovered_card() {
        let mut board = make_board(vec![(1, vec![10]), (2, vec![20, 21])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("lead-21"));
        assert_eq!(ids(&board, 2), vec![20, 10, 21]);
    }

    #[test]
    fn test_drag_over_same_column_is_noop() {
        let mut board = make_board(vec![(1, vec![10, 11])]);
        let before = board.column(1).unwrap().clone();
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("lead-11"));
        drag.drag_over(&mut board, Some("col-1"));
        assert!(Arc::ptr_eq(&before, board.column(1).unwrap()));
    }

    #[test]
    fn test_drag_over_unresolvable_is_noop() {
        let mut board = make_board(vec![(1, vec![10]), (2, vec![20])]);
        let before = board.clone();
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, None);
        drag.drag_over(&mut board, Some("garbage"));
        drag.drag_over(&mut board, Some("lead-999"));
        assert_eq!(before, board);
    }

    #[test]
    fn test_drag_end_cross_stage_persists_once() {
        let mut board = make_board(vec![(1, vec![10, 11]), (2, vec![])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("col-2"));
        let outcome = drag.drag_end(&mut board, Some("col-2"));
        assert_eq!(outcome, DragOutcome::Persist { lead_id: 10, stage_id: 2 });
        assert_eq!(ids(&board, 1), vec![11]);
        assert_eq!(ids(&board, 2), vec![10]);
        assert_eq!(drag.active_lead(), None);
    }

    #[test]
    fn test_drag_end_same_stage_reorders_locally() {
        let mut board = make_board(vec![(1, vec![10, 11, 12])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        let outcome = drag.drag_end(&mut board, Some("lead-12"));
        assert_eq!(outcome, DragOutcome::Completed);
        assert_eq!(ids(&board, 1), vec![11, 12, 10]);
    }

    #[test]
    fn test_drag_end_same_stage_over_column_is_noop() {
        let mut board = make_board(vec![(1, vec![10, 11])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        let outcome = drag.drag_end(&mut board, Some("col-1"));
        assert_eq!(outcome, DragOutcome::Completed);
        assert_eq!(ids(&board, 1), vec![10, 11]);
    }

    #[test]
    fn test_drag_end_without_target_reloads() {
        let mut board = make_board(vec![(1, vec![10]), (2, vec![])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("col-2"));
        assert_eq!(drag.drag_end(&mut board, None), DragOutcome::Reload);
    }

    #[test]
    fn test_drag_end_while_idle_is_ignored() {
        let mut board = make_board(vec![(1, vec![10])]);
        let mut drag = DragReconciler::new();
        assert_eq!(drag.drag_end(&mut board, Some("lead-10")), DragOutcome::Ignored);
    }

    #[test]
    fn test_drag_cancel_always_reloads() {
        let mut board = make_board(vec![(1, vec![10]), (2, vec![])]);
        let mut drag = DragReconciler::new();
        drag.drag_start(&board, "lead-10");
        drag.drag_over(&mut board, Some("col-2"));
        assert_eq!(drag.drag_cancel(), DragOutcome::Reload);
        assert_eq!(drag.active_lead(), None);
    }
}
