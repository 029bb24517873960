// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Descriptor state: contributor slots, hover slots, and their transitions.
//!
//! ## Overview
//!
//! [`TooltipState`] is the single place descriptors live. It is changed only by
//! applying a [`Transaction`], which carries document/selection change flags and
//! a list of [`Effect`]s. After each transaction it publishes two lists:
//!
//! - [`TooltipState::hovered`]: the current descriptor of every hover slot, in
//!   registration order.
//! - [`TooltipState::shown`]: every contributor's descriptor followed by the
//!   merged hover container (see [`hover_host`](crate::hover_host)).
//!
//! A list that did not change keeps its allocation, which lets
//! [`ViewReconciler`](crate::reconcile::ViewReconciler) skip matching.
//!
//! ## Hover slots
//!
//! A [`HoverSlot`] moves through these transitions, in priority order:
//!
//! 1. With `hide_on_change`, any document or selection change clears it.
//! 2. An [`Effect::SetHover`] for the slot replaces its value.
//! 3. A document change remaps the anchor; an anchor inside deleted text clears it.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::hover_host;
use crate::surface::{Assoc, ChangeMapper, MapMode, Surface};
use crate::types::{Tooltip, TooltipList};

/// Handle of a plain descriptor contributor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SourceId(pub(crate) usize);

/// Handle of an installed hover source.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct HoverSourceId(pub(crate) usize);

impl HoverSourceId {
    /// Registration index of the source.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A declared state mutation.
pub enum Effect<S> {
    /// Replace a contributor's descriptor.
    SetTooltip(SourceId, Option<Tooltip<S>>),
    /// Show or clear a hover slot.
    SetHover(HoverSourceId, Option<Tooltip<S>>),
}

impl<S> core::fmt::Debug for Effect<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SetTooltip(id, t) => f.debug_tuple("SetTooltip").field(id).field(t).finish(),
            Self::SetHover(id, t) => f.debug_tuple("SetHover").field(id).field(t).finish(),
        }
    }
}

/// One state update.
pub struct Transaction<'a, S> {
    /// Position mapping of the document edit, if the document changed.
    pub changes: Option<&'a dyn ChangeMapper>,
    /// The selection changed.
    pub selection_changed: bool,
    /// Effects, applied in order.
    pub effects: Vec<Effect<S>>,
}

impl<S> Default for Transaction<'_, S> {
    fn default() -> Self {
        Self {
            changes: None,
            selection_changed: false,
            effects: Vec::new(),
        }
    }
}

impl<'a, S> Transaction<'a, S> {
    /// An empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a document edit.
    #[must_use]
    pub fn with_changes(mut self, changes: &'a dyn ChangeMapper) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Mark the selection as changed.
    #[must_use]
    pub fn with_selection_changed(mut self) -> Self {
        self.selection_changed = true;
        self
    }

    /// Append an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect<S>) -> Self {
        self.effects.push(effect);
        self
    }

    /// True if the transaction edits the document.
    pub fn doc_changed(&self) -> bool {
        self.changes.is_some()
    }
}

impl<S> core::fmt::Debug for Transaction<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("doc_changed", &self.doc_changed())
            .field("selection_changed", &self.selection_changed)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

/// The current descriptor of one hover source.
pub struct HoverSlot<S> {
    current: Option<Tooltip<S>>,
    hide_on_change: bool,
}

impl<S> core::fmt::Debug for HoverSlot<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoverSlot")
            .field("current", &self.current)
            .field("hide_on_change", &self.hide_on_change)
            .finish()
    }
}

impl<S> HoverSlot<S> {
    /// An empty slot.
    pub fn new(hide_on_change: bool) -> Self {
        Self {
            current: None,
            hide_on_change,
        }
    }

    /// The current descriptor.
    pub fn current(&self) -> Option<&Tooltip<S>> {
        self.current.as_ref()
    }

    /// Apply `tr` to the slot identified by `id`. Returns true if the value was replaced.
    pub fn apply(&mut self, id: HoverSourceId, tr: &Transaction<'_, S>) -> bool {
        if self.current.is_some()
            && self.hide_on_change
            && (tr.doc_changed() || tr.selection_changed)
        {
            self.current = None;
            return true;
        }

        let set = tr.effects.iter().find_map(|effect| match effect {
            Effect::SetHover(target, value) if *target == id => Some(value),
            _ => None,
        });
        if let Some(value) = set {
            let changed = self.current.is_some() || value.is_some();
            self.current = value.clone();
            return changed;
        }

        let remapped = match (&self.current, tr.changes) {
            (Some(current), Some(changes)) => Some(remap(current, changes)),
            _ => None,
        };
        match remapped {
            Some(next) => {
                if next.is_none() {
                    log::trace!("hover anchor deleted, clearing {id:?}");
                }
                self.current = next;
                true
            }
            None => false,
        }
    }
}

fn remap<S>(tooltip: &Tooltip<S>, changes: &dyn ChangeMapper) -> Option<Tooltip<S>> {
    let pos = changes.map_pos(tooltip.pos, Assoc::Before, MapMode::TrackDel)?;
    let mut moved = tooltip.clone();
    moved.pos = pos;
    moved.end = tooltip
        .end
        .map(|end| changes.map_pos(end, Assoc::Before, MapMode::Simple).unwrap_or(pos));
    Some(moved)
}

/// Every descriptor of one surface.
pub struct TooltipState<S> {
    sources: Vec<Option<Tooltip<S>>>,
    hover: Vec<HoverSlot<S>>,
    shown: TooltipList<S>,
    hovered: TooltipList<S>,
}

impl<S> core::fmt::Debug for TooltipState<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TooltipState")
            .field("sources", &self.sources)
            .field("hover", &self.hover)
            .field("shown", &self.shown.len())
            .finish_non_exhaustive()
    }
}

impl<S> Default for TooltipState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TooltipState<S> {
    /// State with no contributors and no hover sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            hover: Vec::new(),
            shown: Rc::from(Vec::new()),
            hovered: Rc::from(Vec::new()),
        }
    }

    /// Open a new contributor slot.
    pub fn add_source(&mut self) -> SourceId {
        self.sources.push(None);
        SourceId(self.sources.len() - 1)
    }

    /// Open a new hover slot.
    pub fn add_hover(&mut self, hide_on_change: bool) -> HoverSourceId {
        self.hover.push(HoverSlot::new(hide_on_change));
        HoverSourceId(self.hover.len() - 1)
    }

    /// Descriptors to display: contributors, then the hover container.
    pub fn shown(&self) -> &TooltipList<S> {
        &self.shown
    }

    /// Current hover descriptors in registration order.
    pub fn hovered(&self) -> &TooltipList<S> {
        &self.hovered
    }

    /// A contributor's descriptor.
    pub fn tooltip(&self, id: SourceId) -> Option<&Tooltip<S>> {
        self.sources.get(id.0)?.as_ref()
    }

    /// A hover slot's descriptor.
    pub fn hover(&self, id: HoverSourceId) -> Option<&Tooltip<S>> {
        self.hover.get(id.0)?.current()
    }
}

impl<S: Surface + 'static> TooltipState<S> {
    /// Apply a transaction. Returns true if [`Self::shown`] changed.
    pub fn apply(&mut self, tr: &Transaction<'_, S>) -> bool {
        let mut plain_changed = false;
        for effect in &tr.effects {
            if let Effect::SetTooltip(id, value) = effect {
                let Some(slot) = self.sources.get_mut(id.0) else {
                    log::debug!("ignoring effect for unknown {id:?}");
                    continue;
                };
                plain_changed |= slot.is_some() || value.is_some();
                *slot = value.clone();
            }
        }

        let mut hover_changed = false;
        for (i, slot) in self.hover.iter_mut().enumerate() {
            hover_changed |= slot.apply(HoverSourceId(i), tr);
        }

        if hover_changed {
            self.hovered = self.hover.iter().filter_map(|s| s.current().cloned()).collect();
        }
        if !(plain_changed || hover_changed) {
            return false;
        }
        self.shown = self
            .sources
            .iter()
            .flatten()
            .cloned()
            .chain(hover_host::merge(&self.hovered))
            .collect();
        true
    }
}
