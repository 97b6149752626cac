//! Stateful wrapper around [`MergeState`].

use std::sync::Arc;

use tracing::{debug, info};
use twinpane_types::{Edit, MergeConfig, Side, Text};
use twinpane_view::{decorate_pane, deleted_chunks, Aligner, Decoration, DeletedSegment, PaneLayout, Viewport};

use crate::cache::DeletionCache;
use crate::error::MergeResult;
use crate::state::{accept_chunk, reject_chunk, Applied, Effect, MergeState, Transaction};

/// Owns the current [`MergeState`] of a document pair and the state a host
/// keeps alongside it: rendered deletions and committed spacers.
#[derive(Clone, Debug)]
pub struct MergeController {
    state: MergeState,
    deletions: DeletionCache,
    aligner: Aligner,
}

impl MergeController {
    pub fn new(original: Text, doc: Text, config: MergeConfig) -> MergeResult<Self> {
        let deletions = DeletionCache::new(config.deletion_cache_capacity);
        let aligner = Aligner::from_config(&config);
        let state = MergeState::new(original, doc, config)?;
        info!(chunks = state.chunks().len(), "merge session started");
        Ok(Self {
            state,
            deletions,
            aligner,
        })
    }

    pub fn state(&self) -> &MergeState {
        &self.state
    }

    pub fn aligner(&self) -> &Aligner {
        &self.aligner
    }

    pub fn deletions(&self) -> &DeletionCache {
        &self.deletions
    }

    /// Apply a transaction. On error the current state is kept.
    pub fn dispatch(&mut self, tr: Transaction) -> MergeResult<Applied> {
        let (next, applied) = self.state.apply(tr)?;
        for description in &applied.original {
            self.aligner.map(Side::A, description);
        }
        if let Some(description) = &applied.doc {
            self.aligner.map(Side::B, description);
        }
        if applied.reconfigured {
            let config = next.config();
            self.deletions = DeletionCache::new(config.deletion_cache_capacity);
            self.aligner = Aligner::from_config(config);
        } else if applied.chunks_changed {
            self.deletions.retain_live(next.chunks());
        }
        self.state = next;
        Ok(applied)
    }

    /// Copy the B text of the chunk covering `pos` into A. Returns `false`
    /// if no chunk covers `pos`.
    pub fn accept_chunk(&mut self, pos: usize) -> MergeResult<bool> {
        let Some(tr) = accept_chunk(&self.state, pos) else {
            return Ok(false);
        };
        self.dispatch(tr)?;
        debug!(pos, "accepted chunk");
        Ok(true)
    }

    /// Revert the chunk covering `pos` in B to its A text. Returns `false`
    /// if no chunk covers `pos`.
    pub fn reject_chunk(&mut self, pos: usize) -> MergeResult<bool> {
        let Some(tr) = reject_chunk(&self.state, pos) else {
            return Ok(false);
        };
        self.dispatch(tr)?;
        debug!(pos, "rejected chunk");
        Ok(true)
    }

    /// Edit document B.
    pub fn edit(&mut self, edit: Edit) -> MergeResult<Applied> {
        self.dispatch(Transaction::edit(edit))
    }

    /// Replace the whole of document A.
    pub fn set_original(&mut self, text: impl Into<String>) -> MergeResult<Applied> {
        let edit = Edit::replace(0, self.state.original().len(), text);
        self.dispatch(Transaction::effect(Effect::UpdateOriginal(edit)))
    }

    /// Expand the collapsed span starting at `pos`.
    pub fn uncollapse(&mut self, pos: usize) -> MergeResult<Applied> {
        self.dispatch(Transaction::effect(Effect::Uncollapse(pos)))
    }

    pub fn reconfigure(&mut self, config: MergeConfig) -> MergeResult<Applied> {
        self.dispatch(Transaction::effect(Effect::Reconfigure(config)))
    }

    /// Rendered original text for every chunk that replaced or removed
    /// something, in chunk order.
    pub fn deleted_views(&mut self) -> Vec<Arc<[DeletedSegment]>> {
        let chunks = Arc::clone(self.state.chunks());
        chunks
            .iter()
            .filter(|c| c.from_a != c.to_a)
            .map(|c| self.deletions.get_or_render(c, self.state.original()))
            .collect()
    }

    /// Everything the unified view of document B renders inside `viewport`.
    pub fn unified_decorations(&self, viewport: Viewport) -> Vec<Decoration> {
        let state = &self.state;
        let mut out = decorate_pane(state.doc(), state.chunks(), state.config(), viewport, true);
        out.extend(deleted_chunks(state.chunks(), state.config()));
        if let Some(collapse) = state.collapse() {
            out.extend(collapse.ranges().iter().copied().map(Decoration::from));
        }
        out
    }

    /// Everything the `side` pane of a side-by-side view renders inside
    /// `viewport`, including committed spacers.
    pub fn pane_decorations(&self, side: Side, viewport: Viewport) -> Vec<Decoration> {
        let state = &self.state;
        let config = state.config().for_side(side);
        let mut out = decorate_pane(state.text(side), state.chunks(), &config, viewport, false);
        if let Some(collapse) = state.collapse_of(side) {
            out.extend(collapse.ranges().iter().copied().map(Decoration::from));
        }
        out.extend(self.aligner.committed().side(side).iter().copied().map(Decoration::from));
        out
    }

    /// Realign two measured panes. Returns whether a new spacer set was
    /// committed.
    pub fn align(&mut self, a: &PaneLayout, b: &PaneLayout) -> bool {
        self.aligner.update(a, b, self.state.chunks())
    }
}
