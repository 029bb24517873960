// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hover container: every active hover descriptor as one stacked tooltip.
//!
//! All hover sources share a single top-level tooltip. [`merge`] builds its
//! descriptor from the current hover list:
//!
//! - `pos` is the smallest constituent anchor.
//! - `end` is the largest constituent end, or `None` if none has one.
//! - `above` comes from the first constituent.
//!
//! The descriptor's creator always carries
//! [`CreatorKey::HOVER_HOST`](crate::types::CreatorKey::HOVER_HOST), so the
//! container view survives any change of its contents. [`HoverHost`] then keeps
//! one section per constituent, in list order, with its own nested
//! [`ViewReconciler`].

use alloc::boxed::Box;
use alloc::rc::Rc;

use kurbo::{Point, Size};

use crate::layout::Positioning;
use crate::reconcile::{Mounted, ViewReconciler};
use crate::surface::Surface;
use crate::types::{
    CreatorKey, Frame, Tooltip, TooltipClass, TooltipCreator, TooltipList, TooltipView, ViewUpdate,
};

/// The merged descriptor for `hovered`, or `None` when it is empty.
pub fn merge<S: Surface + 'static>(hovered: &TooltipList<S>) -> Option<Tooltip<S>> {
    let first = hovered.first()?;
    let pos = hovered.iter().map(|t| t.pos).fold(first.pos, usize::min);
    let end = hovered.iter().filter_map(|t| t.end).max();
    let list = Rc::clone(hovered);
    let creator = TooltipCreator::keyed(
        CreatorKey::HOVER_HOST,
        Rc::new(move |surface: &S| -> Box<dyn TooltipView<S>> {
            Box::new(HoverHost::new(surface, Rc::clone(&list)))
        }),
    );
    Some(Tooltip {
        pos,
        end,
        creator,
        above: first.above,
        strict_side: false,
    })
}

/// Container view stacking one section per hover descriptor.
pub struct HoverHost<S> {
    sections: ViewReconciler<S>,
    mounted: bool,
}

impl<S> core::fmt::Debug for HoverHost<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoverHost")
            .field("sections", &self.sections.len())
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl<S: Surface + 'static> HoverHost<S> {
    /// Build sections for `hovered`. They are mounted with the container.
    pub fn new(surface: &S, hovered: TooltipList<S>) -> Self {
        Self {
            sections: ViewReconciler::new(hovered, |t| section(surface, t, false)),
            mounted: false,
        }
    }

    /// Section frames and views, top to bottom.
    ///
    /// Section origins are offsets inside the container.
    pub fn sections(&self) -> impl Iterator<Item = (&Frame, &dyn TooltipView<S>)> {
        self.sections.views().iter().map(|m| (&m.frame, &*m.view))
    }

    /// Descriptors the sections belong to.
    pub fn tooltips(&self) -> &[Tooltip<S>] {
        self.sections.tooltips()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True if the container holds no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn stack(&mut self) {
        let mut y = 0.0;
        for mounted in self.sections.views_mut() {
            mounted.frame.origin = Point::new(0.0, y);
            y += mounted.view.size().height;
        }
    }
}

fn section<S: 'static>(surface: &S, tooltip: &Tooltip<S>, mounted: bool) -> Mounted<S> {
    let mut view = tooltip.creator.create(surface);
    if mounted {
        view.mount(surface);
    }
    let frame = Frame {
        origin: Point::ZERO,
        positioning: Positioning::Fixed,
        classes: TooltipClass::SECTION | view.classes(),
    };
    Mounted::new(view, frame)
}

impl<S: Surface + 'static> TooltipView<S> for HoverHost<S> {
    fn size(&self) -> Size {
        self.sections
            .views()
            .iter()
            .map(|m| m.view.size())
            .fold(Size::ZERO, |acc, s| {
                Size::new(acc.width.max(s.width), acc.height + s.height)
            })
    }

    fn classes(&self) -> TooltipClass {
        TooltipClass::HOVER
    }

    fn mount(&mut self, surface: &S) {
        for m in self.sections.views_mut() {
            m.view.mount(surface);
        }
        self.mounted = true;
    }

    fn update(&mut self, update: &ViewUpdate<'_, S>) {
        let mounted = self.mounted;
        let surface = update.surface;
        self.sections
            .reconcile(update.state.hovered(), update, |t| section(surface, t, mounted));
    }

    fn positioned(&mut self) {
        self.stack();
        for m in self.sections.views_mut() {
            m.view.positioned();
        }
    }

    fn destroy(&mut self) {
        self.sections.destroy_all();
        self.mounted = false;
    }
}
