// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View reconciliation: keep live views in step with a descriptor list.
//!
//! ## Matching
//!
//! - A list that is the same allocation as the previous one skips matching:
//!   every view receives an update and no remeasure is needed.
//! - Otherwise each new descriptor is matched to a previous one by
//!   [`CreatorKey`](crate::types::CreatorKey). When several previous descriptors
//!   share a key the last one wins. A matched view is reused and updated; an
//!   unmatched descriptor gets a fresh view from the caller's `create` callback.
//! - Previous views that were not reused are destroyed.
//!
//! A view can only move into one new slot. If two new descriptors resolve to the
//! same previous view, the second one gets a fresh view.
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::Size;
//! use understory_tooltip::reconcile::{Mounted, ViewReconciler};
//! use understory_tooltip::state::TooltipState;
//! use understory_tooltip::types::{
//!     Frame, Tooltip, TooltipClass, TooltipCreator, TooltipList, TooltipView, ViewUpdate,
//! };
//!
//! struct Dot;
//! impl TooltipView<()> for Dot {
//!     fn size(&self) -> Size { Size::new(4.0, 4.0) }
//! }
//!
//! let creator = TooltipCreator::new(|_: &()| Dot);
//! let make = |t: &Tooltip<()>| Mounted::new(t.creator.create(&()), Frame::offscreen(TooltipClass::TOOLTIP));
//!
//! let first: TooltipList<()> = Rc::from([Tooltip::new(1, creator.clone())]);
//! let mut views = ViewReconciler::new(first, make);
//!
//! // Same creator at a new offset: the view survives.
//! let state = TooltipState::new();
//! let update = ViewUpdate { surface: &(), state: &state, doc_changed: true, selection_changed: false };
//! let moved: TooltipList<()> = Rc::from([Tooltip::new(5, creator)]);
//! assert!(views.reconcile(&moved, &update, make));
//! assert_eq!(views.len(), 1);
//! assert_eq!(views.tooltips()[0].pos, 5);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::types::{Frame, Tooltip, TooltipList, TooltipView, ViewUpdate};

/// A live view together with its frame.
pub struct Mounted<S> {
    /// The view.
    pub view: Box<dyn TooltipView<S>>,
    /// Its positioned root element.
    pub frame: Frame,
}

impl<S> Mounted<S> {
    /// Pair a view with its initial frame.
    pub fn new(view: Box<dyn TooltipView<S>>, frame: Frame) -> Self {
        Self { view, frame }
    }
}

impl<S> core::fmt::Debug for Mounted<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mounted")
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

/// Owns the views created for a descriptor list.
///
/// `views()[i]` always belongs to `tooltips()[i]`.
pub struct ViewReconciler<S> {
    tooltips: TooltipList<S>,
    views: Vec<Mounted<S>>,
    generation: u64,
}

impl<S> Default for ViewReconciler<S> {
    fn default() -> Self {
        Self {
            tooltips: Rc::from(Vec::new()),
            views: Vec::new(),
            generation: 0,
        }
    }
}

impl<S> core::fmt::Debug for ViewReconciler<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewReconciler")
            .field("tooltips", &self.tooltips)
            .field("views", &self.views)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<S> ViewReconciler<S> {
    /// Create views for every descriptor in `tooltips`.
    pub fn new(tooltips: TooltipList<S>, mut create: impl FnMut(&Tooltip<S>) -> Mounted<S>) -> Self {
        let views = tooltips.iter().map(&mut create).collect();
        Self {
            tooltips,
            views,
            generation: 0,
        }
    }

    /// The descriptor list the views currently reflect.
    pub fn tooltips(&self) -> &[Tooltip<S>] {
        &self.tooltips
    }

    /// The live views, aligned with [`Self::tooltips`].
    pub fn views(&self) -> &[Mounted<S>] {
        &self.views
    }

    /// Mutable access to the live views.
    pub fn views_mut(&mut self) -> &mut [Mounted<S>] {
        &mut self.views
    }

    /// Descriptors and mutable views at once, for the layout write phase.
    pub fn split_mut(&mut self) -> (&[Tooltip<S>], &mut [Mounted<S>]) {
        (&self.tooltips, &mut self.views)
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True if there are no live views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Bumped every time the descriptor list is replaced.
    ///
    /// Two lists of the same length are told apart by this counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<S: 'static> ViewReconciler<S> {
    /// Bring the views in line with `input`.
    ///
    /// Returns true when the set may have changed and positions must be
    /// measured again.
    pub fn reconcile(
        &mut self,
        input: &TooltipList<S>,
        update: &ViewUpdate<'_, S>,
        mut create: impl FnMut(&Tooltip<S>) -> Mounted<S>,
    ) -> bool {
        if Rc::ptr_eq(input, &self.tooltips) {
            for mounted in &mut self.views {
                mounted.view.update(update);
            }
            return false;
        }

        let mut previous: Vec<Option<Mounted<S>>> =
            core::mem::take(&mut self.views).into_iter().map(Some).collect();
        let mut views = Vec::with_capacity(input.len());
        let mut reused = 0_usize;
        for tip in input.iter() {
            let mut known = None;
            for (i, other) in self.tooltips.iter().enumerate() {
                if other.key() == tip.key() {
                    known = Some(i);
                }
            }
            match known.and_then(|i| previous[i].take()) {
                Some(mut mounted) => {
                    mounted.view.update(update);
                    views.push(mounted);
                    reused += 1;
                }
                None => views.push(create(tip)),
            }
        }
        for mut stale in previous.into_iter().flatten() {
            stale.view.destroy();
        }
        log::trace!(
            "reconciled {} tooltips ({reused} reused, {} created)",
            input.len(),
            input.len() - reused
        );

        self.tooltips = Rc::clone(input);
        self.views = views;
        self.generation += 1;
        true
    }

    /// Destroy every live view and forget the descriptor list.
    pub fn destroy_all(&mut self) {
        for mut mounted in self.views.drain(..) {
            mounted.view.destroy();
        }
        self.tooltips = Rc::from(Vec::new());
        self.generation += 1;
    }
}
