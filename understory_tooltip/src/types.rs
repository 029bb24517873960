// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: descriptors, creator keys, views, frames, and style classes.
//!
//! ## Overview
//!
//! A [`Tooltip`] is a declarative request: an anchor offset, an optional range end,
//! side preferences, and a [`TooltipCreator`] that builds the live [`TooltipView`].
//! Descriptors are matched across updates by the creator's [`CreatorKey`], never by
//! content, so a tooltip keeps its view while its anchor moves.
//!
//! Every view lives next to a [`Frame`]: the root element the
//! [`layout`](crate::layout) pass positions and the host renders.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::Any;
use core::sync::atomic::{AtomicU64, Ordering};

use kurbo::{Point, Size};

use crate::config::OUTSIDE;
use crate::layout::Positioning;
use crate::state::TooltipState;

/// Identity token of a [`TooltipCreator`].
///
/// Minted once when the creator is built and shared by all of its clones.
/// Two descriptors denote the same tooltip exactly when their keys are equal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CreatorKey(u64);

impl CreatorKey {
    /// Key shared by every hover container, so the container view always matches itself.
    pub const HOVER_HOST: Self = Self(0);

    fn mint() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type CreateFn<S> = dyn Fn(&S) -> Box<dyn TooltipView<S>>;

/// Builds the live view for a descriptor.
///
/// Cloning a creator keeps its [`CreatorKey`]; building a new one with
/// [`TooltipCreator::new`] always mints a fresh key.
pub struct TooltipCreator<S> {
    key: CreatorKey,
    create: Rc<CreateFn<S>>,
}

impl<S> TooltipCreator<S> {
    /// Wrap a view constructor and mint a fresh identity for it.
    pub fn new<V, F>(f: F) -> Self
    where
        V: TooltipView<S>,
        F: Fn(&S) -> V + 'static,
    {
        let create: Rc<CreateFn<S>> =
            Rc::new(move |surface: &S| -> Box<dyn TooltipView<S>> { Box::new(f(surface)) });
        Self {
            key: CreatorKey::mint(),
            create,
        }
    }

    pub(crate) fn keyed(key: CreatorKey, create: Rc<CreateFn<S>>) -> Self {
        Self { key, create }
    }

    /// The identity token of this creator.
    pub fn key(&self) -> CreatorKey {
        self.key
    }

    /// Build a new view for `surface`.
    pub fn create(&self, surface: &S) -> Box<dyn TooltipView<S>> {
        (self.create)(surface)
    }
}

impl<S> Clone for TooltipCreator<S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            create: Rc::clone(&self.create),
        }
    }
}

impl<S> core::fmt::Debug for TooltipCreator<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TooltipCreator")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Describes a tooltip anchored at a document offset.
pub struct Tooltip<S> {
    /// Document offset the tooltip is attached to.
    pub pos: usize,
    /// End of the annotated range, if different from `pos`.
    pub end: Option<usize>,
    /// Constructor for the tooltip's view; its key is the descriptor's identity.
    pub creator: TooltipCreator<S>,
    /// Prefer placing the tooltip above the anchor. Defaults to below.
    pub above: bool,
    /// Keep the preferred side even when it overflows the viewport.
    pub strict_side: bool,
}

impl<S> Tooltip<S> {
    /// Create a descriptor anchored at `pos`, shown below the anchor.
    pub fn new(pos: usize, creator: TooltipCreator<S>) -> Self {
        Self {
            pos,
            end: None,
            creator,
            above: false,
            strict_side: false,
        }
    }

    /// Set the end of the annotated range.
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the preferred side.
    pub fn with_above(mut self, above: bool) -> Self {
        self.above = above;
        self
    }

    /// Honor the preferred side even when it overflows.
    pub fn with_strict_side(mut self, strict: bool) -> Self {
        self.strict_side = strict;
        self
    }

    /// Identity of this descriptor.
    pub fn key(&self) -> CreatorKey {
        self.creator.key()
    }

    /// End of the annotated range, falling back to `pos`.
    pub fn range_end(&self) -> usize {
        self.end.unwrap_or(self.pos)
    }
}

impl<S> Clone for Tooltip<S> {
    fn clone(&self) -> Self {
        Self {
            pos: self.pos,
            end: self.end,
            creator: self.creator.clone(),
            above: self.above,
            strict_side: self.strict_side,
        }
    }
}

impl<S> core::fmt::Debug for Tooltip<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tooltip")
            .field("pos", &self.pos)
            .field("end", &self.end)
            .field("key", &self.creator.key)
            .field("above", &self.above)
            .field("strict_side", &self.strict_side)
            .finish()
    }
}

/// An immutable descriptor list.
///
/// Lists are shared, and an unchanged list is the same allocation:
/// [`ViewReconciler`](crate::reconcile::ViewReconciler) relies on pointer identity
/// to skip matching.
pub type TooltipList<S> = Rc<[Tooltip<S>]>;

/// Which side of an offset the pointer sits on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    /// The pointer is before the offset.
    Before,
    /// The pointer is after the offset.
    After,
}

impl Side {
    /// `-1` for [`Side::Before`], `1` for [`Side::After`].
    pub fn sign(self) -> i8 {
        match self {
            Self::Before => -1,
            Self::After => 1,
        }
    }

    /// The opposite side.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }
}

/// Text direction of the surface or of a bidi run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

bitflags::bitflags! {
    /// Style markers applied to rendered frames, for external theming.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TooltipClass: u8 {
        /// Every top-level tooltip.
        const TOOLTIP = 0b0000_0001;
        /// Placed above its anchor.
        const ABOVE   = 0b0000_0010;
        /// Placed below its anchor.
        const BELOW   = 0b0000_0100;
        /// The merged hover container.
        const HOVER   = 0b0000_1000;
        /// A section inside the hover container.
        const SECTION = 0b0001_0000;
    }
}

impl TooltipClass {
    /// Stable class names for the set flags, in flag order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::TOOLTIP, "tooltip"),
            (Self::ABOVE, "tooltip-above"),
            (Self::BELOW, "tooltip-below"),
            (Self::HOVER, "tooltip-hover"),
            (Self::SECTION, "tooltip-section"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
    }
}

/// The positioned root element of a view.
///
/// Only the [`layout`](crate::layout) write phase moves a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// Top-left corner, in the coordinate space named by `positioning`.
    pub origin: Point,
    /// Coordinate space of `origin`.
    pub positioning: Positioning,
    /// Style markers.
    pub classes: TooltipClass,
}

impl Frame {
    /// A frame parked at the off-screen sentinel.
    pub fn offscreen(classes: TooltipClass) -> Self {
        Self {
            origin: Point::new(0.0, OUTSIDE),
            positioning: Positioning::Fixed,
            classes,
        }
    }

    /// True while the frame sits at the off-screen sentinel.
    pub fn is_offscreen(&self) -> bool {
        self.origin.y == OUTSIDE
    }

    pub(crate) fn hide(&mut self) {
        self.origin.y = OUTSIDE;
    }
}

/// Context passed to [`TooltipView::update`].
pub struct ViewUpdate<'a, S> {
    /// The surface the views are attached to.
    pub surface: &'a S,
    /// Descriptor state after the update.
    pub state: &'a TooltipState<S>,
    /// The document changed.
    pub doc_changed: bool,
    /// The selection changed.
    pub selection_changed: bool,
}

impl<S> core::fmt::Debug for ViewUpdate<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewUpdate")
            .field("doc_changed", &self.doc_changed)
            .field("selection_changed", &self.selection_changed)
            .finish_non_exhaustive()
    }
}

/// The live, mutable object bound to one descriptor.
///
/// Implementors report their content size; the owning manager keeps the
/// [`Frame`] and calls the hooks below. All hooks default to no-ops.
pub trait TooltipView<S>: Any {
    /// Current content size, read during the measure phase.
    fn size(&self) -> Size;

    /// Extra style markers for this view's frame.
    fn classes(&self) -> TooltipClass {
        TooltipClass::empty()
    }

    /// Called once the view is attached to the surface.
    fn mount(&mut self, _surface: &S) {}

    /// Called on every state update while the view is alive.
    fn update(&mut self, _update: &ViewUpdate<'_, S>) {}

    /// Called after the layout pass positioned the view.
    fn positioned(&mut self) {}

    /// Called when the view's descriptor disappears; the frame is detached.
    fn destroy(&mut self) {}
}

impl<S: 'static> dyn TooltipView<S> {
    /// Downcast to a concrete view type.
    pub fn downcast_ref<T: TooltipView<S>>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}
