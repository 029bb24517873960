// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain tooltips: reconcile, measure, write.
//!
//! Two contributors publish tooltips on the same line. The layout pass keeps
//! them apart, and moving one anchor reuses its view.
//!
//! Run:
//! - `cargo run -p understory_tooltip_demos --example tooltip_layout`

use kurbo::{Point, Rect, Size};
use understory_tooltip::host::TooltipHost;
use understory_tooltip::surface::Surface;
use understory_tooltip::types::{Tooltip, TooltipCreator, TooltipView};

/// A single line of 8px characters in an 800x600 window.
struct Line;

impl Surface for Line {
    fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }
    fn viewport(&self) -> Size {
        Size::new(800.0, 600.0)
    }
    fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
        let x = pos as f64 * 8.0;
        Some(Rect::new(x, 100.0, x, 116.0))
    }
    fn pos_at_coords(&self, p: Point) -> Option<usize> {
        (100.0..=116.0).contains(&p.y).then(|| (p.x / 8.0).round() as usize)
    }
    fn range_rects(&self, from: usize, to: usize) -> Vec<Rect> {
        vec![Rect::new(from as f64 * 8.0, 100.0, to as f64 * 8.0, 116.0)]
    }
    fn default_character_width(&self) -> f64 {
        8.0
    }
}

struct Note(&'static str);

impl TooltipView<Line> for Note {
    fn size(&self) -> Size {
        Size::new(self.0.len() as f64 * 8.0 + 16.0, 24.0)
    }
    fn mount(&mut self, _surface: &Line) {
        println!("  mount {:?}", self.0);
    }
    fn destroy(&mut self) {
        println!("  destroy {:?}", self.0);
    }
}

fn main() {
    let surface = Line;
    let mut host = TooltipHost::new(&surface);
    let lint = host.register_source();
    let info = host.register_source();
    let lint_note = TooltipCreator::new(|_: &Line| Note("unused variable"));
    let info_note = TooltipCreator::new(|_: &Line| Note("fn main()"));

    println!("== Publish ==");
    host.set_tooltip(&surface, lint, Some(Tooltip::new(4, lint_note.clone())), 0);
    host.set_tooltip(&surface, info, Some(Tooltip::new(6, info_note)), 0);
    assert!(host.run_layout(&surface));
    for (t, frame, view) in host.views() {
        println!("  pos {} at {:?} size {:?} {:?}", t.pos, frame.origin, view.size(), frame.classes);
    }
    let frames: Vec<_> = host.views().map(|(_, f, v)| Rect::from_origin_size(f.origin, v.size())).collect();
    assert!(frames[0].intersect(frames[1]).area() == 0.0);

    println!("== Move the lint anchor ==");
    host.set_tooltip(&surface, lint, Some(Tooltip::new(40, lint_note)), 10);
    assert!(host.run_layout(&surface));
    let (t, frame, _) = host.views().next().unwrap();
    println!("  pos {} at {:?}", t.pos, frame.origin);
    assert_eq!(frame.origin, Point::new(320.0, 116.0));

    println!("== Clear ==");
    host.set_tooltip(&surface, lint, None, 20);
    host.set_tooltip(&surface, info, None, 20);
    assert!(host.is_empty());
}
