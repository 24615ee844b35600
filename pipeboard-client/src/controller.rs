/// Board controller: owns the column state and the drag reconciler,
/// mediates every remote intent, and exposes loading/error display state.
///
/// Stage fetches fan out concurrently and commit all-or-nothing: if any
/// stage fails, the previous board survives untouched and the error flag is
/// set for a retry affordance. Drag gestures stay purely local until
/// drag-end, which issues at most one persistence call; a failure there is
/// logged and answered with a forced reload, never a blocking error.
use futures_util::future::join_all;
use pipeboard_core::board::BoardState;
use pipeboard_core::drag::{DragOutcome, DragReconciler};
use pipeboard_core::types::{LeadForm, Stage};
use std::collections::BTreeMap;

use crate::api::{LeadStore, RequestError};

pub struct BoardController<S: LeadStore> {
    store: S,
    stages: Vec<Stage>,
    board: BoardState,
    drag: DragReconciler,
    loading: bool,
    error: Option<String>,
}

impl<S: LeadStore> BoardController<S> {
    pub fn new(store: S, stages: Vec<Stage>) -> Self {
        Self {
            store,
            stages,
            board: BoardState::new(),
            drag: DragReconciler::new(),
            loading: false,
            error: None,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The dragged lead's id, for the floating drag preview.
    pub fn active_lead(&self) -> Option<i64> {
        self.drag.active_lead()
    }

    /// Fetch every configured stage concurrently and replace the board
    /// wholesale. Idempotent; last successful call wins. On any failure the
    /// board keeps its previous value and `error()` carries the message.
    pub async fn load_all(&mut self) {
        self.loading = true;
        self.error = None;

        let fetches: Vec<_> = self
            .stages
            .iter()
            .map(|stage| self.store.list_leads(&stage.name))
            .collect();
        let results = join_all(fetches).await;
        self.loading = false;

        let mut columns = BTreeMap::new();
        for (stage, result) in self.stages.iter().zip(results) {
            match result {
                Ok(leads) => {
                    columns.insert(stage.stage_id, leads);
                }
                Err(e) => {
                    log::error!("[board] Failed to load stage \"{}\": {}", stage.name, e);
                    self.error = Some(e.to_string());
                    return;
                }
            }
        }
        self.board.replace_all(columns);
    }

    /// Create a lead in `stage_id`, then re-sync; the remote store assigns
    /// the id, the board never synthesizes one locally.
    pub async fn create_lead(&mut self, mut form: LeadForm, stage_id: i64) -> Result<(), RequestError> {
        form.stage_id = Some(stage_id);
        let id = self.store.create_lead(&form).await?;
        log::debug!("[board] Created lead {} in stage {}", id, stage_id);
        self.load_all().await;
        Ok(())
    }

    /// Partial edit outside the drag flow, then re-sync.
    pub async fn update_lead(&mut self, id: i64, form: LeadForm) -> Result<(), RequestError> {
        self.store.update_lead(id, &form).await?;
        self.load_all().await;
        Ok(())
    }

    /// Delete remotely, then drop the lead from its column locally. No
    /// reload: a confirmed deletion cannot be partially wrong.
    pub async fn delete_lead(&mut self, id: i64) -> Result<(), RequestError> {
        self.store.delete_lead(id).await?;
        self.board.remove_lead(id);
        Ok(())
    }

    pub fn drag_start(&mut self, raw_id: &str) {
        self.drag.drag_start(&self.board, raw_id);
    }

    pub fn drag_over(&mut self, over: Option<&str>) {
        self.drag.drag_over(&mut self.board, over);
    }

    /// Finish a drag. Issues at most one update (the stage reassignment);
    /// persistence failure forces a reload instead of surfacing, since the
    /// gesture has already completed visually.
    pub async fn drag_end(&mut self, over: Option<&str>) {
        match self.drag.drag_end(&mut self.board, over) {
            DragOutcome::Persist { lead_id, stage_id } => {
                if let Err(e) = self.store.update_lead(lead_id, &LeadForm::stage_change(stage_id)).await {
                    log::error!("[drag] Failed to persist stage change for lead {}: {}", lead_id, e);
                    self.load_all().await;
                }
            }
            DragOutcome::Reload => self.load_all().await,
            DragOutcome::Completed | DragOutcome::Ignored => {}
        }
    }

    pub async fn drag_cancel(&mut self) {
        if let DragOutcome::Reload = self.drag.drag_cancel() {
            self.load_all().await;
        }
    }
}
