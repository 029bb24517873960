// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-phase tooltip layout: measure, then write.
//!
//! ## Protocol
//!
//! [`measure`] only reads: the surface rectangle, each anchor's rectangle, each
//! view's size, the viewport and the text direction, all in one snapshot
//! ([`MeasuredFrame`]). [`place`] is a pure function of that snapshot, and
//! [`apply`] only writes frames. Keeping reads and writes apart lets hosts with
//! incremental layout batch them without forced reflows.
//!
//! ## Placement
//!
//! Per descriptor, in list order:
//!
//! 1. An anchor that is not rendered or lies outside the surface hides the view.
//!    A caret on the surface's left or right edge still counts as inside.
//! 2. Horizontally the view starts at the anchor and is clamped to the viewport
//!    (right edge for left-to-right text, left edge for right-to-left text).
//! 3. Vertically it goes on the preferred side, flipping when that side
//!    overflows the viewport unless `strict_side` is set.
//! 4. If the result intersects an already placed view, it moves flush against the
//!    first one it hits, further away from the anchor.
//!
//! Step 4 shifts once. The shifted rectangle is not tested again, so a dense
//! stack can still overlap.
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_tooltip::layout::{MeasuredFrame, place};
//! use understory_tooltip::types::{Direction, Tooltip, TooltipCreator, TooltipView};
//!
//! struct Box20;
//! impl TooltipView<()> for Box20 {
//!     fn size(&self) -> Size { Size::new(20.0, 20.0) }
//! }
//!
//! let tips = [
//!     Tooltip::new(0, TooltipCreator::new(|_: &()| Box20)),
//!     Tooltip::new(0, TooltipCreator::new(|_: &()| Box20)),
//! ];
//! let anchor = Rect::new(10.0, 10.0, 10.0, 26.0);
//! let measured = MeasuredFrame {
//!     editor: Rect::new(0.0, 0.0, 300.0, 300.0),
//!     pos: vec![Some(anchor), Some(anchor)],
//!     size: vec![Size::new(20.0, 20.0); 2],
//!     viewport: Size::new(800.0, 600.0),
//!     direction: Direction::Ltr,
//!     generation: 0,
//! };
//! let placed = place(&measured, &tips);
//! let (a, b) = (placed[0].unwrap(), placed[1].unwrap());
//! assert_eq!(a.rect.y0, 26.0);
//! // The second view is pushed below the first.
//! assert_eq!(b.rect.y0, a.rect.y1);
//! ```

use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::reconcile::{Mounted, ViewReconciler};
use crate::surface::Surface;
use crate::types::{Direction, Tooltip, TooltipClass};

/// Coordinate space frames are written in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Positioning {
    /// Viewport coordinates.
    #[default]
    Fixed,
    /// Coordinates relative to the surface's top-left corner, for platforms
    /// where fixed positioning is unreliable.
    EditorRelative,
}

impl Positioning {
    /// Pick the positioning mode for `surface`.
    pub fn detect<S: Surface>(surface: &S) -> Self {
        if surface.fixed_positioning_reliable() {
            Self::Fixed
        } else {
            Self::EditorRelative
        }
    }
}

/// One consistent geometry snapshot, consumed by a single write.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredFrame {
    /// Surface rectangle.
    pub editor: Rect,
    /// Anchor rectangle per descriptor; `None` when not rendered.
    pub pos: Vec<Option<Rect>>,
    /// Size per view.
    pub size: Vec<Size>,
    /// Viewport size.
    pub viewport: Size,
    /// Surface text direction.
    pub direction: Direction,
    /// [`ViewReconciler::generation`] of the list the snapshot was taken for.
    pub generation: u64,
}

/// Where one tooltip ended up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placed {
    /// Viewport rectangle of the view.
    pub rect: Rect,
    /// Placed above the anchor.
    pub above: bool,
}

/// Read phase: snapshot all geometry needed to place `views`.
pub fn measure<S: Surface + 'static>(surface: &S, views: &ViewReconciler<S>) -> MeasuredFrame {
    MeasuredFrame {
        editor: surface.surface_rect(),
        pos: views.tooltips().iter().map(|t| surface.coords_at_pos(t.pos)).collect(),
        size: views.views().iter().map(|m| m.view.size()).collect(),
        viewport: surface.viewport(),
        direction: surface.text_direction(),
        generation: views.generation(),
    }
}

/// Compute placements from a snapshot. `None` means hidden.
pub fn place<S>(measured: &MeasuredFrame, tooltips: &[Tooltip<S>]) -> Vec<Option<Placed>> {
    let editor = measured.editor;
    let mut others: Vec<Rect> = Vec::new();
    let mut out = Vec::with_capacity(tooltips.len());
    for (i, tooltip) in tooltips.iter().enumerate() {
        let Some(pos) = measured.pos.get(i).copied().flatten() else {
            out.push(None);
            continue;
        };
        if pos.y1 <= editor.y0 || pos.y0 >= editor.y1 || pos.x1 < editor.x0 || pos.x0 > editor.x1 {
            out.push(None);
            continue;
        }
        let size = measured.size.get(i).copied().unwrap_or(Size::ZERO);
        let (width, height) = (size.width, size.height);

        let left = match measured.direction {
            Direction::Ltr => pos.x0.min(measured.viewport.width - width),
            Direction::Rtl => (pos.x0 - width).max(0.0),
        };
        let right = left + width;

        let mut above = tooltip.above;
        let overflows = if above {
            pos.y0 - height < 0.0
        } else {
            pos.y1 + height > measured.viewport.height
        };
        if !tooltip.strict_side && overflows {
            above = !above;
        }

        let mut top = if above { pos.y0 - height } else { pos.y1 };
        if let Some(hit) = others
            .iter()
            .find(|r| r.x0 < right && r.x1 > left && r.y0 < top + height && r.y1 > top)
        {
            top = if above { hit.y0 - height } else { hit.y1 };
        }

        let rect = Rect::new(left, top, right, top + height);
        others.push(rect);
        out.push(Some(Placed { rect, above }));
    }
    out
}

/// Write phase: move frames, toggle side classes and notify views.
pub fn apply<S: 'static>(
    measured: &MeasuredFrame,
    placements: &[Option<Placed>],
    views: &mut [Mounted<S>],
    positioning: Positioning,
) {
    let editor_origin = measured.editor.origin().to_vec2();
    for (placed, mounted) in placements.iter().zip(views.iter_mut()) {
        let Some(placed) = placed else {
            mounted.frame.hide();
            continue;
        };
        let origin = placed.rect.origin();
        mounted.frame.origin = match positioning {
            Positioning::Fixed => origin,
            Positioning::EditorRelative => origin - editor_origin,
        };
        mounted.frame.positioning = positioning;
        mounted.frame.classes.set(TooltipClass::ABOVE, placed.above);
        mounted.frame.classes.set(TooltipClass::BELOW, !placed.above);
        mounted.view.positioned();
    }
}

/// Schedules and runs layout passes for one surface.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    positioning: Positioning,
    in_view: bool,
    requested: bool,
}

impl LayoutEngine {
    /// Create an engine writing frames in `positioning` space.
    pub fn new(positioning: Positioning) -> Self {
        Self {
            positioning,
            in_view: true,
            requested: false,
        }
    }

    /// The coordinate space frames are written in.
    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    /// True when a measure pass is due.
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Request a pass if there is something to place and the surface is, or
    /// just was, visible. The second case hides tooltips as the surface
    /// scrolls out of view.
    pub fn maybe_measure<S: Surface>(&mut self, surface: &S, has_tooltips: bool) {
        if !has_tooltips {
            return;
        }
        let in_view = surface.in_view();
        if in_view || self.in_view {
            self.requested = true;
        }
        self.in_view = in_view;
    }

    /// Read phase of a requested pass.
    pub fn read<S: Surface + 'static>(&mut self, surface: &S, views: &ViewReconciler<S>) -> Option<MeasuredFrame> {
        if !self.requested {
            return None;
        }
        self.requested = false;
        Some(measure(surface, views))
    }

    /// Write phase. A snapshot taken for a different list is dropped and a new
    /// pass requested.
    pub fn write<S: 'static>(&mut self, measured: &MeasuredFrame, reconciler: &mut ViewReconciler<S>) {
        let generation = reconciler.generation();
        let (tooltips, views) = reconciler.split_mut();
        if measured.generation != generation
            || measured.pos.len() != tooltips.len()
            || measured.size.len() != views.len()
        {
            log::debug!(
                "dropping stale measurement (generation {}, current {generation})",
                measured.generation
            );
            self.requested = true;
            return;
        }
        let placements = place(measured, tooltips);
        apply(measured, &placements, views, self.positioning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TooltipState;
    use crate::testing::{GridSurface, Log, label, log};
    use crate::types::{Frame, TooltipList, ViewUpdate};
    use alloc::rc::Rc;
    use alloc::vec;

    fn tips(l: &Log, specs: &[(bool, bool)]) -> Vec<Tooltip<()>> {
        specs
            .iter()
            .map(|&(above, strict)| {
                Tooltip::new(0, label("t", l))
                    .with_above(above)
                    .with_strict_side(strict)
            })
            .collect()
    }

    fn frame(anchors: Vec<Option<Rect>>, sizes: Vec<Size>) -> MeasuredFrame {
        MeasuredFrame {
            editor: Rect::new(0.0, 0.0, 800.0, 600.0),
            pos: anchors,
            size: sizes,
            viewport: Size::new(800.0, 600.0),
            direction: Direction::Ltr,
            generation: 0,
        }
    }

    fn caret(x: f64, y: f64) -> Rect {
        Rect::new(x, y, x, y + 16.0)
    }

    fn overlaps(a: Rect, b: Rect) -> bool {
        a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
    }

    #[test]
    fn unrendered_or_outside_anchor_is_hidden() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false)]);
        let mut m = frame(vec![None, Some(caret(900.0, 10.0))], vec![Size::new(40.0, 20.0); 2]);
        m.editor = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert!(place(&m, &t).iter().all(Option::is_none));
    }

    #[test]
    fn ltr_clamps_right_edge_to_viewport() {
        let l = log();
        let t = tips(&l, &[(false, false)]);
        let m = frame(vec![Some(caret(790.0, 10.0))], vec![Size::new(40.0, 20.0)]);
        let p = place(&m, &t)[0].unwrap();
        assert_eq!(p.rect, Rect::new(760.0, 26.0, 800.0, 46.0));
        assert!(!p.above);
    }

    #[test]
    fn rtl_ends_at_anchor_and_clamps_left_edge() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false)]);
        let mut m = frame(
            vec![Some(caret(100.0, 10.0)), Some(caret(20.0, 200.0))],
            vec![Size::new(40.0, 20.0); 2],
        );
        m.direction = Direction::Rtl;
        let p = place(&m, &t);
        assert_eq!(p[0].unwrap().rect.x0, 60.0);
        assert_eq!(p[1].unwrap().rect.x0, 0.0);
    }

    #[test]
    fn flips_when_preferred_side_overflows() {
        let l = log();
        let t = tips(&l, &[(false, false), (true, false)]);
        let m = frame(
            vec![Some(caret(10.0, 580.0)), Some(caret(300.0, 5.0))],
            vec![Size::new(40.0, 30.0); 2],
        );
        let p = place(&m, &t);
        let below_first = p[0].unwrap();
        assert!(below_first.above);
        assert_eq!(below_first.rect.y1, 580.0);
        let above_first = p[1].unwrap();
        assert!(!above_first.above);
        assert_eq!(above_first.rect.y0, 21.0);
    }

    #[test]
    fn strict_side_never_flips() {
        let l = log();
        let t = tips(&l, &[(false, true)]);
        let m = frame(vec![Some(caret(10.0, 580.0))], vec![Size::new(40.0, 30.0)]);
        let p = place(&m, &t)[0].unwrap();
        assert!(!p.above);
        assert_eq!(p.rect.y0, 596.0);
    }

    #[test]
    fn later_tooltip_moves_away_from_anchor() {
        let l = log();
        let below = tips(&l, &[(false, false), (false, false)]);
        let m = frame(vec![Some(caret(50.0, 100.0)); 2], vec![Size::new(40.0, 20.0); 2]);
        let p = place(&m, &below);
        let (a, b) = (p[0].unwrap().rect, p[1].unwrap().rect);
        assert!(!overlaps(a, b));
        assert_eq!(b.y0, a.y1);
        assert!(b.y0 > a.y0);

        let above = tips(&l, &[(true, false), (true, false)]);
        let p = place(&m, &above);
        let (a, b) = (p[0].unwrap().rect, p[1].unwrap().rect);
        assert!(!overlaps(a, b));
        assert_eq!(b.y1, a.y0);
        assert!(b.y0 < a.y0);
    }

    #[test]
    fn disjoint_tooltips_are_not_moved() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false)]);
        let m = frame(
            vec![Some(caret(10.0, 100.0)), Some(caret(300.0, 100.0))],
            vec![Size::new(40.0, 20.0); 2],
        );
        let p = place(&m, &t);
        assert_eq!(p[0].unwrap().rect.y0, 116.0);
        assert_eq!(p[1].unwrap().rect.y0, 116.0);
    }

    // Known limitation: only the first collision is resolved.
    #[test]
    fn single_shift_can_leave_residual_overlap() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false), (false, false)]);
        let m = frame(vec![Some(caret(50.0, 100.0)); 3], vec![Size::new(40.0, 20.0); 3]);
        let p = place(&m, &t);
        let (b, c) = (p[1].unwrap().rect, p[2].unwrap().rect);
        assert_eq!(c.y0, 136.0);
        assert!(overlaps(b, c));
    }

    #[test]
    fn apply_writes_frames_and_notifies() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false)]);
        let mut views: Vec<Mounted<()>> = t
            .iter()
            .map(|tip| Mounted::new(tip.creator.create(&()), Frame::offscreen(TooltipClass::TOOLTIP)))
            .collect();
        let mut m = frame(vec![Some(caret(150.0, 100.0)), None], vec![Size::new(40.0, 20.0); 2]);
        m.editor = Rect::new(100.0, 50.0, 700.0, 550.0);
        let placements = place(&m, &t);

        apply(&m, &placements, &mut views, Positioning::EditorRelative);

        let shown = views[0].frame;
        assert_eq!(shown.origin, kurbo::Point::new(50.0, 66.0));
        assert_eq!(shown.positioning, Positioning::EditorRelative);
        assert!(shown.classes.contains(TooltipClass::TOOLTIP | TooltipClass::BELOW));
        assert!(!shown.classes.contains(TooltipClass::ABOVE));
        assert!(views[1].frame.is_offscreen());
        assert_eq!(*l.borrow(), ["positioned t"]);
    }

    #[test]
    fn positioning_follows_platform() {
        let mut s = GridSurface::new(4);
        assert_eq!(Positioning::detect(&s), Positioning::Fixed);
        s.fixed_ok = false;
        assert_eq!(Positioning::detect(&s), Positioning::EditorRelative);
    }

    #[test]
    fn caret_on_surface_edge_is_shown() {
        let l = log();
        let t = tips(&l, &[(false, false), (false, false)]);
        let mut m = frame(
            vec![Some(caret(0.0, 0.0)), Some(caret(400.0, 40.0))],
            vec![Size::new(40.0, 20.0); 2],
        );
        m.editor = Rect::new(0.0, 0.0, 400.0, 300.0);
        let p = place(&m, &t);
        assert_eq!(p[0].unwrap().rect.origin(), kurbo::Point::new(0.0, 16.0));
        assert_eq!(p[1].unwrap().rect.origin(), kurbo::Point::new(400.0, 56.0));

        // Anything past the edge stays hidden.
        m.pos = vec![Some(caret(-0.5, 0.0)), Some(caret(400.5, 40.0))];
        assert!(place(&m, &t).iter().all(Option::is_none));
    }

    #[test]
    fn measure_requests_follow_visibility() {
        let mut s = GridSurface::new(4);
        let mut engine = LayoutEngine::new(Positioning::Fixed);
        let views = ViewReconciler::<GridSurface>::default();

        engine.maybe_measure(&s, false);
        assert!(!engine.is_requested());

        engine.maybe_measure(&s, true);
        assert!(engine.is_requested());
        assert!(engine.read(&s, &views).is_some());
        assert!(!engine.is_requested());

        // Scrolled out: one more pass so the tooltips get hidden, then none.
        s.rect = Rect::new(0.0, -500.0, 400.0, -200.0);
        engine.maybe_measure(&s, true);
        assert!(engine.read(&s, &views).is_some());
        engine.maybe_measure(&s, true);
        assert!(!engine.is_requested());
    }

    fn offscreen(t: &Tooltip<GridSurface>, s: &GridSurface) -> Mounted<GridSurface> {
        Mounted::new(t.creator.create(s), Frame::offscreen(TooltipClass::TOOLTIP))
    }

    #[test]
    fn measurement_of_other_length_is_dropped() {
        let l = log();
        let s = GridSurface::new(4);
        let list: TooltipList<GridSurface> = Rc::from(vec![Tooltip::new(1, label("t", &l))]);
        let mut views = ViewReconciler::new(list, |t| offscreen(t, &s));
        let mut engine = LayoutEngine::new(Positioning::Fixed);
        let m = frame(Vec::new(), Vec::new());

        engine.write(&m, &mut views);

        assert!(views.views()[0].frame.is_offscreen());
        assert!(engine.is_requested());
    }

    #[test]
    fn measurement_of_replaced_list_is_dropped() {
        let l = log();
        let s = GridSurface::new(300);
        let state = TooltipState::new();
        let update = ViewUpdate {
            surface: &s,
            state: &state,
            doc_changed: false,
            selection_changed: false,
        };
        let first: TooltipList<GridSurface> = Rc::from(vec![Tooltip::new(1, label("old", &l))]);
        let mut views = ViewReconciler::new(first, |t| offscreen(t, &s));
        let mut engine = LayoutEngine::new(Positioning::Fixed);
        engine.maybe_measure(&s, true);
        let measured = engine.read(&s, &views).unwrap();

        // Replaced by a list of the same length before the write.
        let second: TooltipList<GridSurface> = Rc::from(vec![Tooltip::new(30, label("new", &l))]);
        views.reconcile(&second, &update, |t| offscreen(t, &s));
        engine.write(&measured, &mut views);

        assert!(views.views()[0].frame.is_offscreen());
        assert!(engine.is_requested());

        let fresh = engine.read(&s, &views).unwrap();
        engine.write(&fresh, &mut views);
        assert_eq!(views.views()[0].frame.origin, kurbo::Point::new(240.0, 16.0));
    }
}
