// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Several hover sources share one container.
//!
//! A "diagnostics" source covers offsets 2..4 and a "types" source covers 0..4.
//! Resting on offset 1 shows types only; moving to 3 keeps it and adds the
//! diagnostics section above it, in registration order.
//!
//! Run:
//! - `cargo run -p understory_tooltip_demos --example hover_merge`

use kurbo::{Point, Rect, Size};
use understory_tooltip::config::HoverConfig;
use understory_tooltip::error::ResolveError;
use understory_tooltip::host::{HoverTooltip, TooltipHost, hover_tooltip};
use understory_tooltip::surface::Surface;
use understory_tooltip::trigger::{PointerSample, Resolution};
use understory_tooltip::types::{Side, Tooltip, TooltipCreator, TooltipView};

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
        Some(Rect::new(x, 0.0, x, 16.0))
    }
    fn pos_at_coords(&self, p: Point) -> Option<usize> {
        (0.0..=16.0).contains(&p.y).then(|| (p.x / 8.0).round() as usize)
    }
    fn range_rects(&self, from: usize, to: usize) -> Vec<Rect> {
        vec![Rect::new(from as f64 * 8.0, 0.0, to as f64 * 8.0, 16.0)]
    }
    fn default_character_width(&self) -> f64 {
        8.0
    }
}

struct Section(&'static str);

impl TooltipView<Line> for Section {
    fn size(&self) -> Size {
        Size::new(160.0, 18.0)
    }
}

fn source(name: &'static str, from: usize, to: usize) -> HoverTooltip<Line> {
    let creator = TooltipCreator::new(move |_: &Line| Section(name));
    hover_tooltip(
        move |_: &Line, pos: usize, _: Side| -> Result<Resolution<Line>, ResolveError> {
            Ok(if (from..=to).contains(&pos) {
                Resolution::ready(Tooltip::new(from, creator.clone()).with_end(to))
            } else {
                Resolution::none()
            })
        },
        HoverConfig::default(),
    )
}

fn sections(host: &TooltipHost<Line>) -> Vec<&'static str> {
    host.hover_container()
        .map(|c| {
            c.sections()
                .filter_map(|(_, v)| v.downcast_ref::<Section>().map(|s| s.0))
                .collect()
        })
        .unwrap_or_default()
}

fn main() {
    let surface = Line;
    let mut host = TooltipHost::new(&surface);
    host.install(source("diagnostics", 2, 4));
    host.install(source("types", 0, 4));

    println!("== Rest on offset 1 ==");
    host.pointer_move(&surface, PointerSample::content(Point::new(9.0, 8.0)), 0);
    host.advance(&surface, 750);
    println!("  sections {:?}", sections(&host));
    assert_eq!(sections(&host), ["types"]);

    println!("== Move to offset 3 ==");
    host.pointer_move(&surface, PointerSample::content(Point::new(25.0, 8.0)), 800);
    host.advance(&surface, 1550);
    println!("  sections {:?}", sections(&host));
    assert_eq!(sections(&host), ["diagnostics", "types"]);

    host.run_layout(&surface);
    for (t, frame, view) in host.views() {
        println!("  container {}..{:?} at {:?} size {:?}", t.pos, t.end, frame.origin, view.size());
    }
    let (merged, _, _) = host.views().next().unwrap();
    assert_eq!((merged.pos, merged.end), (0, Some(4)));

    println!("== Leave ==");
    host.pointer_leave(&surface, 2000);
    assert!(host.is_empty());
}
