// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover trigger: decide when to ask for a tooltip from pointer movement alone.
//!
//! ## States
//!
//! - Idle: no hover tooltip, nothing scheduled.
//! - Armed: a hover deadline or a settle deadline is set.
//! - Resolving: an asynchronous resolver call is outstanding.
//! - Active: the slot holds a tooltip.
//!
//! ## Driving
//!
//! The trigger never reads a clock. The host passes `now` in milliseconds to
//! every call, asks [`HoverTrigger::next_deadline`] when to wake it, and then
//! calls [`HoverTrigger::advance`].
//!
//! - Moving the pointer arms the hover deadline (once; later moves only update
//!   the sample) and dismisses the active or pending range when the pointer
//!   leaves it.
//! - When the deadline fires the trigger checks the pointer has rested for the
//!   full delay, rescheduling for the remainder if not, and then resolves the
//!   offset under the pointer.
//! - A state update while a request is outstanding drops the request and retries
//!   after a short settle delay.
//!
//! ## Async resolvers
//!
//! A resolver may answer with a future. The trigger tags it with a
//! [`RequestTicket`] and hands it back as a [`ResolveTask`] for the host to
//! drive. When the host reports the [`Completion`], a result whose ticket is no
//! longer current is discarded; futures are never cancelled.

use alloc::vec::Vec;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use kurbo::Point;

use crate::config::{HoverConfig, RANGE_MARGIN, SETTLE_DELAY};
use crate::error::{DiagnosticSink, ResolveError};
use crate::state::HoverSourceId;
use crate::surface::Surface;
use crate::types::{Direction, Side, Tooltip};

/// One pointer position report.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerSample {
    /// Viewport position of the pointer.
    pub point: Point,
    /// The pointer is over the surface's content area.
    pub in_content: bool,
    /// The pointer is over a rendered tooltip.
    pub over_tooltip: bool,
}

impl PointerSample {
    /// The pointer over content at `point`.
    pub fn content(point: Point) -> Self {
        Self {
            point,
            in_content: true,
            over_tooltip: false,
        }
    }

    /// The pointer over a tooltip at `point`.
    pub fn over_tooltip(point: Point) -> Self {
        Self {
            point,
            in_content: false,
            over_tooltip: true,
        }
    }
}

/// Observable phase of a trigger.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TriggerPhase {
    /// Nothing shown or scheduled.
    Idle,
    /// Waiting for a deadline.
    Armed,
    /// Waiting for an asynchronous resolver.
    Resolving,
    /// A tooltip is shown.
    Active,
}

/// Identifies one asynchronous resolver call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RequestTicket {
    source: HoverSourceId,
    generation: u64,
}

impl RequestTicket {
    /// The hover source that issued the request.
    pub fn source(self) -> HoverSourceId {
        self.source
    }
}

/// An outstanding asynchronous resolver call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PendingHoverRequest {
    /// Offset that was resolved.
    pub pos: usize,
    /// Ticket the result must carry to be accepted.
    pub ticket: RequestTicket,
}

/// Future produced by an asynchronous resolver.
pub type ResolveFuture<S> = LocalBoxFuture<'static, Result<Option<Tooltip<S>>, ResolveError>>;

/// What a resolver returns for one offset.
pub enum Resolution<S> {
    /// Answered synchronously.
    Ready(Option<Tooltip<S>>),
    /// Answered later.
    Pending(ResolveFuture<S>),
}

impl<S> Resolution<S> {
    /// No tooltip here.
    pub fn none() -> Self {
        Self::Ready(None)
    }

    /// Show `tooltip`.
    pub fn ready(tooltip: Tooltip<S>) -> Self {
        Self::Ready(Some(tooltip))
    }

    /// Answer with `future`.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<Tooltip<S>>, ResolveError>> + 'static,
    {
        Self::Pending(future.boxed_local())
    }
}

impl<S> From<Option<Tooltip<S>>> for Resolution<S> {
    fn from(value: Option<Tooltip<S>>) -> Self {
        Self::Ready(value)
    }
}

impl<S> core::fmt::Debug for Resolution<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ready(t) => f.debug_tuple("Ready").field(t).finish(),
            Self::Pending(_) => f.debug_tuple("Pending").finish_non_exhaustive(),
        }
    }
}

/// Computes the hover tooltip for an offset.
///
/// Implemented for closures of the same shape.
pub trait HoverResolver<S> {
    /// Resolve the tooltip for `pos`, approached from `side`.
    fn resolve(&mut self, surface: &S, pos: usize, side: Side) -> Result<Resolution<S>, ResolveError>;
}

impl<S, F> HoverResolver<S> for F
where
    F: FnMut(&S, usize, Side) -> Result<Resolution<S>, ResolveError>,
{
    fn resolve(&mut self, surface: &S, pos: usize, side: Side) -> Result<Resolution<S>, ResolveError> {
        self(surface, pos, side)
    }
}

/// Result of a [`ResolveTask`], to be passed back to the trigger.
pub struct Completion<S> {
    /// Ticket of the request.
    pub ticket: RequestTicket,
    /// What the resolver produced.
    pub result: Result<Option<Tooltip<S>>, ResolveError>,
}

impl<S> core::fmt::Debug for Completion<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Completion")
            .field("ticket", &self.ticket)
            .field("result", &self.result)
            .finish()
    }
}

/// An asynchronous resolver call for the host to drive.
#[must_use = "a resolve task does nothing unless polled"]
pub struct ResolveTask<S> {
    ticket: RequestTicket,
    future: ResolveFuture<S>,
}

impl<S> ResolveTask<S> {
    /// Ticket of the request.
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }
}

impl<S> Future for ResolveTask<S> {
    type Output = Completion<S>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ticket = self.ticket;
        self.future
            .poll_unpin(cx)
            .map(|result| Completion { ticket, result })
    }
}

impl<S> core::fmt::Debug for ResolveTask<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolveTask")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// What the host should do after a trigger call.
pub enum HoverAction<S> {
    /// Put the tooltip in this source's hover slot.
    Show(Tooltip<S>),
    /// Clear this source's hover slot.
    Hide,
    /// Drive this resolver call and report its completion.
    Spawn(ResolveTask<S>),
}

impl<S> core::fmt::Debug for HoverAction<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Show(t) => f.debug_tuple("Show").field(t).finish(),
            Self::Hide => f.write_str("Hide"),
            Self::Spawn(task) => f.debug_tuple("Spawn").field(task).finish(),
        }
    }
}

/// Pointer-driven state machine of one hover source.
#[derive(Clone, Debug)]
pub struct HoverTrigger {
    source: HoverSourceId,
    hover_delay: u64,
    last_move: Option<PointerSample>,
    last_move_time: u64,
    hover_deadline: Option<u64>,
    settle_deadline: Option<u64>,
    pending: Option<PendingHoverRequest>,
    generation: u64,
}

impl HoverTrigger {
    /// A trigger feeding `source`.
    pub fn new(source: HoverSourceId, config: &HoverConfig) -> Self {
        Self {
            source,
            hover_delay: config.hover_delay,
            last_move: None,
            last_move_time: 0,
            hover_deadline: None,
            settle_deadline: None,
            pending: None,
            generation: 0,
        }
    }

    /// The hover source this trigger feeds.
    pub fn source(&self) -> HoverSourceId {
        self.source
    }

    /// Current phase, given whether the source's slot holds a tooltip.
    pub fn phase(&self, active: bool) -> TriggerPhase {
        if active {
            TriggerPhase::Active
        } else if self.pending.is_some() {
            TriggerPhase::Resolving
        } else if self.next_deadline().is_some() {
            TriggerPhase::Armed
        } else {
            TriggerPhase::Idle
        }
    }

    /// The outstanding asynchronous request, if any.
    pub fn pending(&self) -> Option<PendingHoverRequest> {
        self.pending
    }

    /// Earliest time [`Self::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.hover_deadline, self.settle_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Record a pointer move.
    ///
    /// `active` is the source's current tooltip. Returns [`HoverAction::Hide`]
    /// when the pointer left its range.
    pub fn pointer_move<S: Surface>(
        &mut self,
        surface: &S,
        sample: PointerSample,
        now: u64,
        active: Option<&Tooltip<S>>,
    ) -> Option<HoverAction<S>> {
        self.last_move = Some(sample);
        self.last_move_time = now;
        if self.hover_deadline.is_none() {
            self.hover_deadline = Some(now + self.hover_delay);
        }

        let range = match (active, self.pending) {
            (Some(t), _) if !sample.over_tooltip => (t.pos, t.range_end()),
            (Some(t), Some(_)) => (t.pos, t.range_end()),
            (None, Some(p)) => (p.pos, p.pos),
            _ => return None,
        };
        let (pos, end) = range;
        let inside = if pos == end {
            surface.pos_at_coords(sample.point) == Some(pos)
        } else {
            is_over_range(surface, pos, end, sample.point, RANGE_MARGIN)
        };
        if inside {
            return None;
        }

        if self.pending.take().is_some() {
            log::trace!("pointer left pending hover at {pos}");
        }
        if active.is_some() {
            log::debug!("pointer left hover range {pos}..{end}");
            Some(HoverAction::Hide)
        } else {
            None
        }
    }

    /// The pointer left the surface.
    pub fn pointer_leave<S>(&mut self, active: bool) -> Option<HoverAction<S>> {
        self.hover_deadline = None;
        active.then_some(HoverAction::Hide)
    }

    /// Notify the trigger of any state update. An outstanding request is
    /// dropped and retried after the settle delay.
    pub fn on_state_update(&mut self, now: u64) {
        if self.pending.take().is_some() {
            log::trace!("state changed while resolving, retrying in {SETTLE_DELAY}ms");
            self.settle_deadline = Some(now + SETTLE_DELAY);
        }
    }

    /// Run every deadline that is due at `now`.
    pub fn advance<S: Surface>(
        &mut self,
        surface: &S,
        now: u64,
        active: bool,
        resolver: &mut dyn HoverResolver<S>,
        sink: &dyn DiagnosticSink,
    ) -> Vec<HoverAction<S>> {
        let mut out = Vec::new();
        let mut active = active;
        if self.settle_deadline.is_some_and(|d| d <= now) {
            if let Some(action) = self.start_hover(surface, resolver, sink) {
                active |= matches!(action, HoverAction::Show(_));
                out.push(action);
            }
            // The restart already resolved at the last sample.
            if self.hover_deadline.is_some_and(|d| d <= now) {
                self.hover_deadline = None;
            }
        }
        if self.hover_deadline.is_some_and(|d| d <= now) {
            out.extend(self.check_hover(surface, now, active, resolver, sink));
        }
        out
    }

    /// Accept the result of a [`ResolveTask`].
    pub fn complete<S>(&mut self, completion: Completion<S>, sink: &dyn DiagnosticSink) -> Option<HoverAction<S>> {
        let Completion { ticket, result } = completion;
        let current = self.pending.is_some_and(|p| p.ticket == ticket);
        match result {
            Err(err) => {
                sink.report("hover tooltip", &err);
                if current {
                    self.pending = None;
                }
                None
            }
            Ok(_) if !current => {
                log::debug!("discarding stale hover result {ticket:?}");
                None
            }
            Ok(tooltip) => {
                self.pending = None;
                tooltip.map(HoverAction::Show)
            }
        }
    }

    /// Cancel all deadlines.
    pub fn destroy(&mut self) {
        self.hover_deadline = None;
        self.settle_deadline = None;
        self.pending = None;
    }

    fn check_hover<S: Surface>(
        &mut self,
        surface: &S,
        now: u64,
        active: bool,
        resolver: &mut dyn HoverResolver<S>,
        sink: &dyn DiagnosticSink,
    ) -> Option<HoverAction<S>> {
        self.hover_deadline = None;
        if active || self.pending.is_some() {
            return None;
        }
        let rested = now.saturating_sub(self.last_move_time);
        if rested < self.hover_delay {
            self.hover_deadline = Some(now + (self.hover_delay - rested));
            return None;
        }
        self.start_hover(surface, resolver, sink)
    }

    fn start_hover<S: Surface>(
        &mut self,
        surface: &S,
        resolver: &mut dyn HoverResolver<S>,
        sink: &dyn DiagnosticSink,
    ) -> Option<HoverAction<S>> {
        self.settle_deadline = None;
        let sample = self.last_move?;
        if !sample.in_content {
            return None;
        }
        let pos = surface.pos_at_coords(sample.point)?;
        let rect = surface.coords_at_pos(pos)?;
        let slack = surface.default_character_width();
        let p = sample.point;
        if p.y < rect.y0 || p.y > rect.y1 || p.x < rect.x0 - slack || p.x > rect.x1 + slack {
            log::trace!("pointer too far from offset {pos}");
            return None;
        }

        let mut side = if p.x < (rect.x0 + rect.x1) / 2.0 {
            Side::Before
        } else {
            Side::After
        };
        if surface.direction_at(pos) == Direction::Rtl {
            side = side.flip();
        }

        match resolver.resolve(surface, pos, side) {
            Err(err) => {
                sink.report("hover tooltip", &err);
                None
            }
            Ok(Resolution::Ready(tooltip)) => tooltip.map(HoverAction::Show),
            Ok(Resolution::Pending(future)) => {
                self.generation += 1;
                let ticket = RequestTicket {
                    source: self.source,
                    generation: self.generation,
                };
                self.pending = Some(PendingHoverRequest { pos, ticket });
                log::debug!("resolving hover at {pos} asynchronously");
                Some(HoverAction::Spawn(ResolveTask { ticket, future }))
            }
        }
    }
}

/// True if `point` is within `margin` of the text between `from` and `to`.
pub fn is_over_range<S: Surface>(surface: &S, from: usize, to: usize, point: Point, margin: f64) -> bool {
    surface.range_rects(from, to).iter().any(|r| {
        let dist = (r.y0 - point.y)
            .max(point.y - r.y1)
            .max(r.x0 - point.x)
            .max(point.x - r.x1);
        dist <= margin
    })
}
