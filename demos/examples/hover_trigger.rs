// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover with an asynchronous resolver.
//!
//! The resolver answers through a channel. The host hands back a
//! `ResolveTask`, which this example polls by hand once the answer is sent.
//! A second request issued while the first is still pending wins.
//!
//! Run:
//! - `cargo run -p understory_tooltip_demos --example hover_trigger`

use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::oneshot;
use futures_util::FutureExt;
use kurbo::{Point, Rect, Size};
use understory_tooltip::config::HoverConfig;
use understory_tooltip::error::ResolveError;
use understory_tooltip::host::{TooltipHost, hover_tooltip};
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

struct Doc(usize);

impl TooltipView<Line> for Doc {
    fn size(&self) -> Size {
        Size::new(100.0, 20.0)
    }
}

type Answer = Result<Option<Tooltip<Line>>, ResolveError>;

fn main() {
    let surface = Line;
    let replies: Rc<RefCell<Vec<oneshot::Sender<Answer>>>> = Rc::default();
    let queued = Rc::clone(&replies);
    let mut host = TooltipHost::new(&surface);
    let id = host.install(hover_tooltip(
        move |_: &Line, pos: usize, side: Side| -> Result<Resolution<Line>, ResolveError> {
            println!("  resolve {pos} ({side:?})");
            let (tx, rx) = oneshot::channel();
            queued.borrow_mut().push(tx);
            Ok(Resolution::pending(async move {
                rx.await.unwrap_or(Err(ResolveError::Canceled))
            }))
        },
        HoverConfig::default().with_hover_delay(300),
    ));
    let plain = host.register_source();

    println!("== Rest over offset 5 ==");
    host.pointer_move(&surface, PointerSample::content(Point::new(41.0, 8.0)), 0);
    let first = host.advance(&surface, 300).pop().unwrap();
    println!("  phase {:?}", host.phase(id));

    println!("== Unrelated update while resolving ==");
    host.set_tooltip(&surface, plain, None, 310);
    let deadline = host.next_deadline().unwrap();
    println!("  retry at {deadline}");
    let second = host.advance(&surface, deadline).pop().unwrap();

    println!("== Answers arrive out of order ==");
    let mut senders = replies.borrow_mut().drain(..).collect::<Vec<_>>().into_iter();
    let (old, new) = (senders.next().unwrap(), senders.next().unwrap());
    let _ = new.send(Ok(Some(Tooltip::new(5, TooltipCreator::new(|_: &Line| Doc(2))))));
    let _ = old.send(Ok(Some(Tooltip::new(5, TooltipCreator::new(|_: &Line| Doc(1))))));

    for task in [second, first] {
        let completion = task.now_or_never().unwrap();
        println!("  completion {:?}", completion.ticket);
        host.complete(&surface, completion, 400);
    }

    let container = host.hover_container().unwrap();
    let answers: Vec<_> = container
        .sections()
        .filter_map(|(_, v)| v.downcast_ref::<Doc>().map(|d| d.0))
        .collect();
    println!("  shown answers {answers:?}, phase {:?}", host.phase(id));
    assert_eq!(answers, [2]);
}
