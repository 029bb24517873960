// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_tooltip::layout::{MeasuredFrame, place};
use understory_tooltip::reconcile::{Mounted, ViewReconciler};
use understory_tooltip::state::TooltipState;
use understory_tooltip::types::{
    Direction, Frame, Tooltip, TooltipClass, TooltipCreator, TooltipList, TooltipView, ViewUpdate,
};

struct Block(Size);

impl TooltipView<()> for Block {
    fn size(&self) -> Size {
        self.0
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn creators(n: usize) -> Vec<TooltipCreator<()>> {
    (0..n)
        .map(|_| TooltipCreator::new(|_: &()| Block(Size::new(120.0, 40.0))))
        .collect()
}

fn tooltips(creators: &[TooltipCreator<()>]) -> Vec<Tooltip<()>> {
    creators
        .iter()
        .enumerate()
        .map(|(i, c)| Tooltip::new(i, c.clone()).with_above(i % 2 == 0))
        .collect()
}

/// Every anchor on the same caret: worst case for collision shifting.
fn stacked(n: usize) -> MeasuredFrame {
    MeasuredFrame {
        editor: Rect::new(0.0, 0.0, 1600.0, 1200.0),
        pos: vec![Some(Rect::new(400.0, 600.0, 400.0, 616.0)); n],
        size: vec![Size::new(120.0, 40.0); n],
        viewport: Size::new(1600.0, 1200.0),
        direction: Direction::Ltr,
        generation: 0,
    }
}

fn scattered(n: usize, seed: u64) -> MeasuredFrame {
    let mut rng = Rng::new(seed);
    let pos = (0..n)
        .map(|_| {
            let x = rng.next_f64() * 1600.0;
            let y = rng.next_f64() * 1200.0;
            Some(Rect::new(x, y, x, y + 16.0))
        })
        .collect();
    MeasuredFrame {
        pos,
        ..stacked(n)
    }
}

fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("place");
    for &n in &[8usize, 64, 512] {
        let tips = tooltips(&creators(n));
        group.throughput(Throughput::Elements(n as u64));
        let frame = stacked(n);
        group.bench_function(format!("stacked_n{}", n), |b| {
            b.iter(|| black_box(place(black_box(&frame), &tips)))
        });
        let frame = scattered(n, 0x9E37_79B9_7F4A_7C15);
        group.bench_function(format!("scattered_n{}", n), |b| {
            b.iter(|| black_box(place(black_box(&frame), &tips)))
        });
    }
    group.finish();
}

fn mount(t: &Tooltip<()>) -> Mounted<()> {
    Mounted::new(t.creator.create(&()), Frame::offscreen(TooltipClass::TOOLTIP))
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let state = TooltipState::new();
    let update = ViewUpdate {
        surface: &(),
        state: &state,
        doc_changed: true,
        selection_changed: false,
    };
    for &n in &[8usize, 64, 256] {
        let pool = creators(n);
        let before: TooltipList<()> = Rc::from(tooltips(&pool));
        // Drop every third descriptor and add as many fresh ones.
        let mut churned: Vec<Tooltip<()>> = tooltips(&pool)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 3 != 0)
            .map(|(_, t)| t)
            .collect();
        churned.extend(tooltips(&creators(n / 3 + 1)));
        let after: TooltipList<()> = Rc::from(churned);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("identical_n{}", n), |b| {
            b.iter_batched(
                || ViewReconciler::new(Rc::clone(&before), mount),
                |mut views| black_box(views.reconcile(&before, &update, mount)),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("churn_n{}", n), |b| {
            b.iter_batched(
                || ViewReconciler::new(Rc::clone(&before), mount),
                |mut views| black_box(views.reconcile(&after, &update, mount)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_place, bench_reconcile);
criterion_main!(benches);
