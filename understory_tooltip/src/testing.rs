// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test fixtures: a single-line monospace surface and recording views.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Point, Rect, Size};

use crate::surface::{Assoc, ChangeMapper, MapMode, Surface};
use crate::types::{Direction, TooltipCreator, TooltipView, ViewUpdate};

pub(crate) const CHAR_WIDTH: f64 = 8.0;
pub(crate) const LINE_HEIGHT: f64 = 16.0;

/// One line of `len` characters starting at `origin`.
#[derive(Clone, Debug)]
pub(crate) struct GridSurface {
    pub(crate) origin: Point,
    pub(crate) len: usize,
    pub(crate) rect: Rect,
    pub(crate) viewport: Size,
    pub(crate) rtl: bool,
    pub(crate) fixed_ok: bool,
}

impl GridSurface {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            len,
            rect: Rect::new(0.0, 0.0, 400.0, 300.0),
            viewport: Size::new(800.0, 600.0),
            rtl: false,
            fixed_ok: true,
        }
    }

    /// A point just inside the left edge of `pos`.
    pub(crate) fn point_at(&self, pos: usize) -> Point {
        Point::new(self.x_of(pos) + 1.0, self.origin.y + 1.0)
    }

    fn x_of(&self, pos: usize) -> f64 {
        self.origin.x + pos as f64 * CHAR_WIDTH
    }
}

impl Surface for GridSurface {
    fn surface_rect(&self) -> Rect {
        self.rect
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
        if pos > self.len {
            return None;
        }
        let x = self.x_of(pos);
        Some(Rect::new(x, self.origin.y, x, self.origin.y + LINE_HEIGHT))
    }

    fn pos_at_coords(&self, point: Point) -> Option<usize> {
        if !self.rect.contains(point) {
            return None;
        }
        if point.y < self.origin.y || point.y > self.origin.y + LINE_HEIGHT {
            return None;
        }
        // Nearest character boundary.
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Test columns are small and non-negative."
        )]
        let col = ((point.x - self.origin.x) / CHAR_WIDTH + 0.5).max(0.0) as usize;
        Some(col.min(self.len))
    }

    fn range_rects(&self, from: usize, to: usize) -> Vec<Rect> {
        vec![Rect::new(
            self.x_of(from),
            self.origin.y,
            self.x_of(to),
            self.origin.y + LINE_HEIGHT,
        )]
    }

    fn direction_at(&self, _pos: usize) -> Direction {
        if self.rtl {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    fn default_character_width(&self) -> f64 {
        CHAR_WIDTH
    }

    fn fixed_positioning_reliable(&self) -> bool {
        self.fixed_ok
    }
}

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A view that records its lifecycle hooks.
#[derive(Debug)]
pub(crate) struct Label {
    pub(crate) text: String,
    pub(crate) size: Size,
    log: Log,
}

impl Label {
    pub(crate) fn new(text: &str, size: Size, log: &Log) -> Self {
        Self {
            text: String::from(text),
            size,
            log: Rc::clone(log),
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{hook} {}", self.text));
    }
}

impl<S> TooltipView<S> for Label {
    fn size(&self) -> Size {
        self.size
    }

    fn mount(&mut self, _surface: &S) {
        self.record("mount");
    }

    fn update(&mut self, _update: &ViewUpdate<'_, S>) {
        self.record("update");
    }

    fn positioned(&mut self) {
        self.record("positioned");
    }

    fn destroy(&mut self) {
        self.record("destroy");
    }
}

/// A creator for a 40x20 [`Label`] with `text`.
pub(crate) fn label<S: 'static>(text: &str, log: &Log) -> TooltipCreator<S> {
    let text = String::from(text);
    let log = Rc::clone(log);
    TooltipCreator::new(move |_: &S| Label::new(&text, Size::new(40.0, 20.0), &log))
}

/// Text of a boxed view, if it is a [`Label`].
pub(crate) fn text_of<S: 'static>(view: &dyn TooltipView<S>) -> Option<&str> {
    view.downcast_ref::<Label>().map(|l| l.text.as_str())
}

/// Inserts `len` characters at `at`, or deletes `at..at + len` when `delete`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Edit {
    pub(crate) at: usize,
    pub(crate) len: usize,
    pub(crate) delete: bool,
}

impl Edit {
    pub(crate) fn insert(at: usize, len: usize) -> Self {
        Self { at, len, delete: false }
    }

    pub(crate) fn delete(at: usize, len: usize) -> Self {
        Self { at, len, delete: true }
    }
}

impl ChangeMapper for Edit {
    fn map_pos(&self, pos: usize, assoc: Assoc, mode: MapMode) -> Option<usize> {
        if self.delete {
            let end = self.at + self.len;
            if pos <= self.at {
                Some(pos)
            } else if pos >= end {
                Some(pos - self.len)
            } else if mode == MapMode::TrackDel {
                None
            } else {
                Some(self.at)
            }
        } else if pos < self.at || (pos == self.at && assoc == Assoc::Before) {
            Some(pos)
        } else {
            Some(pos + self.len)
        }
    }
}
