// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-surface tooltip plugin.
//!
//! [`TooltipHost`] ties the pieces together for one surface:
//!
//! - a [`TooltipState`] holding contributor and hover descriptors,
//! - one [`HoverTrigger`] per installed [`hover_tooltip`] source,
//! - a [`ViewReconciler`] for the top-level views,
//! - a [`LayoutEngine`] that positions them.
//!
//! ## Driving the host
//!
//! The host is sans-IO. The embedding toolkit forwards input and time:
//!
//! - state updates through [`TooltipHost::dispatch`] (or the
//!   [`set_tooltip`](TooltipHost::set_tooltip) shortcut),
//! - pointer input through [`pointer_move`](TooltipHost::pointer_move) and
//!   [`pointer_leave`](TooltipHost::pointer_leave),
//! - timers by waking at [`next_deadline`](TooltipHost::next_deadline) and
//!   calling [`advance`](TooltipHost::advance),
//! - resolver futures returned from `advance`, whose output goes back through
//!   [`complete`](TooltipHost::complete),
//! - layout with [`measure`](TooltipHost::measure) and
//!   [`write`](TooltipHost::write) when [`is_layout_requested`](TooltipHost::is_layout_requested),
//!   or both at once with [`run_layout`](TooltipHost::run_layout).
//!
//! ```
//! use kurbo::{Point, Rect, Size};
//! use understory_tooltip::config::HoverConfig;
//! use understory_tooltip::error::ResolveError;
//! use understory_tooltip::host::{TooltipHost, hover_tooltip};
//! use understory_tooltip::surface::Surface;
//! use understory_tooltip::trigger::{PointerSample, Resolution};
//! use understory_tooltip::types::{Side, Tooltip, TooltipCreator, TooltipView};
//!
//! // A one-line surface with 10px characters.
//! struct Line;
//! impl Surface for Line {
//!     fn surface_rect(&self) -> Rect { Rect::new(0.0, 0.0, 200.0, 100.0) }
//!     fn viewport(&self) -> Size { Size::new(200.0, 100.0) }
//!     fn coords_at_pos(&self, pos: usize) -> Option<Rect> {
//!         let x = pos as f64 * 10.0;
//!         Some(Rect::new(x, 0.0, x, 14.0))
//!     }
//!     fn pos_at_coords(&self, p: Point) -> Option<usize> {
//!         (p.y <= 14.0).then(|| (p.x / 10.0).round() as usize)
//!     }
//!     fn range_rects(&self, from: usize, to: usize) -> Vec<Rect> {
//!         vec![Rect::new(from as f64 * 10.0, 0.0, to as f64 * 10.0, 14.0)]
//!     }
//!     fn default_character_width(&self) -> f64 { 10.0 }
//! }
//!
//! struct Info;
//! impl TooltipView<Line> for Info {
//!     fn size(&self) -> Size { Size::new(60.0, 20.0) }
//! }
//!
//! let info = TooltipCreator::new(|_: &Line| Info);
//! let mut host = TooltipHost::new(&Line);
//! host.install(hover_tooltip(
//!     move |_: &Line, pos: usize, _: Side| -> Result<Resolution<Line>, ResolveError> {
//!         Ok(Resolution::ready(Tooltip::new(pos, info.clone())))
//!     },
//!     HoverConfig::default(),
//! ));
//!
//! host.pointer_move(&Line, PointerSample::content(Point::new(31.0, 5.0)), 0);
//! assert_eq!(host.next_deadline(), Some(750));
//! let tasks = host.advance(&Line, 750);
//! assert!(tasks.is_empty());
//! assert_eq!(host.len(), 1);
//!
//! assert!(host.run_layout(&Line));
//! let (tooltip, frame, _) = host.views().next().unwrap();
//! assert_eq!(tooltip.pos, 3);
//! assert_eq!(frame.origin, Point::new(30.0, 14.0));
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use crate::config::HoverConfig;
use crate::error::{DiagnosticSink, LogSink};
use crate::hover_host::HoverHost;
use crate::layout::{LayoutEngine, MeasuredFrame, Positioning};
use crate::reconcile::{Mounted, ViewReconciler};
use crate::state::{Effect, HoverSourceId, SourceId, TooltipState, Transaction};
use crate::surface::Surface;
use crate::trigger::{Completion, HoverAction, HoverResolver, HoverTrigger, PointerSample, ResolveTask, TriggerPhase};
use crate::types::{CreatorKey, Frame, Tooltip, TooltipClass, TooltipView, ViewUpdate};

/// A hover source ready to be installed with [`TooltipHost::install`].
pub struct HoverTooltip<S> {
    resolver: Box<dyn HoverResolver<S>>,
    config: HoverConfig,
}

impl<S> core::fmt::Debug for HoverTooltip<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoverTooltip")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Bundle a resolver with its options into an installable hover source.
pub fn hover_tooltip<S, R>(resolver: R, config: HoverConfig) -> HoverTooltip<S>
where
    R: HoverResolver<S> + 'static,
{
    HoverTooltip {
        resolver: Box::new(resolver),
        config,
    }
}

struct HoverSource<S> {
    trigger: HoverTrigger,
    resolver: Box<dyn HoverResolver<S>>,
}

/// Tooltip plugin for one surface.
pub struct TooltipHost<S> {
    state: TooltipState<S>,
    sources: Vec<HoverSource<S>>,
    manager: ViewReconciler<S>,
    layout: LayoutEngine,
    sink: Box<dyn DiagnosticSink>,
}

impl<S> core::fmt::Debug for TooltipHost<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TooltipHost")
            .field("state", &self.state)
            .field("sources", &self.sources.len())
            .field("views", &self.manager.len())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<S: Surface + 'static> TooltipHost<S> {
    /// Create a host reporting resolver failures through [`LogSink`].
    pub fn new(surface: &S) -> Self {
        Self::with_sink(surface, LogSink)
    }

    /// Create a host reporting resolver failures to `sink`.
    pub fn with_sink(surface: &S, sink: impl DiagnosticSink + 'static) -> Self {
        let state = TooltipState::new();
        let manager = ViewReconciler::new(Rc::clone(state.shown()), |t| create_tooltip(surface, t));
        let layout = LayoutEngine::new(Positioning::detect(surface));
        log::debug!("tooltip host created with {:?} positioning", layout.positioning());
        Self {
            state,
            sources: Vec::new(),
            manager,
            layout,
            sink: Box::new(sink),
        }
    }

    /// Open a slot for plain descriptors.
    pub fn register_source(&mut self) -> SourceId {
        self.state.add_source()
    }

    /// Install a hover source.
    pub fn install(&mut self, hover: HoverTooltip<S>) -> HoverSourceId {
        let id = self.state.add_hover(hover.config.hide_on_change);
        self.sources.push(HoverSource {
            trigger: HoverTrigger::new(id, &hover.config),
            resolver: hover.resolver,
        });
        id
    }

    /// Descriptor state.
    pub fn state(&self) -> &TooltipState<S> {
        &self.state
    }

    /// Phase of a hover source's trigger.
    pub fn phase(&self, id: HoverSourceId) -> Option<TriggerPhase> {
        let source = self.sources.get(id.index())?;
        Some(source.trigger.phase(self.state.hover(id).is_some()))
    }

    /// Apply a state update and bring the views in line with it.
    pub fn dispatch(&mut self, surface: &S, tr: Transaction<'_, S>, now: u64) {
        self.state.apply(&tr);
        for source in &mut self.sources {
            source.trigger.on_state_update(now);
        }
        let update = ViewUpdate {
            surface,
            state: &self.state,
            doc_changed: tr.doc_changed(),
            selection_changed: tr.selection_changed,
        };
        let shown = Rc::clone(self.state.shown());
        if self.manager.reconcile(&shown, &update, |t| create_tooltip(surface, t)) {
            self.layout.maybe_measure(surface, !self.manager.is_empty());
        }
    }

    /// Set or clear a contributor's descriptor.
    pub fn set_tooltip(&mut self, surface: &S, id: SourceId, tooltip: Option<Tooltip<S>>, now: u64) {
        self.dispatch(surface, Transaction::new().with_effect(Effect::SetTooltip(id, tooltip)), now);
    }

    /// Set or clear a hover slot directly.
    pub fn set_hover(&mut self, surface: &S, id: HoverSourceId, tooltip: Option<Tooltip<S>>, now: u64) {
        self.dispatch(surface, Transaction::new().with_effect(Effect::SetHover(id, tooltip)), now);
    }

    /// Forward a pointer move over the surface or one of its tooltips.
    pub fn pointer_move(&mut self, surface: &S, sample: PointerSample, now: u64) {
        let mut actions = Vec::new();
        for source in &mut self.sources {
            let id = source.trigger.source();
            let active = self.state.hover(id);
            if let Some(action) = source.trigger.pointer_move(surface, sample, now, active) {
                actions.push((id, action));
            }
        }
        let tasks = self.run(surface, actions, now);
        debug_assert!(tasks.is_empty(), "pointer moves never start resolvers");
    }

    /// Forward the pointer leaving the surface.
    pub fn pointer_leave(&mut self, surface: &S, now: u64) {
        let mut actions = Vec::new();
        for source in &mut self.sources {
            let id = source.trigger.source();
            if let Some(action) = source.trigger.pointer_leave(self.state.hover(id).is_some()) {
                actions.push((id, action));
            }
        }
        let tasks = self.run(surface, actions, now);
        debug_assert!(tasks.is_empty(), "leaving never starts resolvers");
    }

    /// Earliest time [`Self::advance`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.sources.iter().filter_map(|s| s.trigger.next_deadline()).min()
    }

    /// Run due deadlines. Returns resolver futures the caller must drive and
    /// feed back through [`Self::complete`].
    pub fn advance(&mut self, surface: &S, now: u64) -> Vec<ResolveTask<S>> {
        let mut actions = Vec::new();
        for source in &mut self.sources {
            let id = source.trigger.source();
            let active = self.state.hover(id).is_some();
            let due = source
                .trigger
                .advance(surface, now, active, &mut *source.resolver, &*self.sink);
            actions.extend(due.into_iter().map(|action| (id, action)));
        }
        self.run(surface, actions, now)
    }

    /// Deliver the output of a [`ResolveTask`].
    pub fn complete(&mut self, surface: &S, completion: Completion<S>, now: u64) {
        let id = completion.ticket.source();
        let Some(source) = self.sources.get_mut(id.index()) else {
            log::debug!("completion for unknown {id:?}");
            return;
        };
        if let Some(action) = source.trigger.complete(completion, &*self.sink) {
            let tasks = self.run(surface, vec![(id, action)], now);
            debug_assert!(tasks.is_empty(), "completions never start resolvers");
        }
    }

    /// The surface scrolled or resized.
    pub fn scroll(&mut self, surface: &S) {
        self.layout.maybe_measure(surface, !self.manager.is_empty());
    }

    /// True when a layout pass is due.
    pub fn is_layout_requested(&self) -> bool {
        self.layout.is_requested()
    }

    /// Read phase of a requested layout pass.
    pub fn measure(&mut self, surface: &S) -> Option<MeasuredFrame> {
        self.layout.read(surface, &self.manager)
    }

    /// Write phase for a snapshot from [`Self::measure`].
    pub fn write(&mut self, measured: &MeasuredFrame) {
        self.layout.write(measured, &mut self.manager);
    }

    /// Measure and write in one go. Returns false if no pass was requested.
    pub fn run_layout(&mut self, surface: &S) -> bool {
        let Some(measured) = self.measure(surface) else {
            return false;
        };
        self.write(&measured);
        true
    }

    /// Number of top-level views.
    pub fn len(&self) -> usize {
        self.manager.len()
    }

    /// True if no tooltip is displayed.
    pub fn is_empty(&self) -> bool {
        self.manager.is_empty()
    }

    /// Top-level descriptors with their frames and views.
    pub fn views(&self) -> impl Iterator<Item = (&Tooltip<S>, &Frame, &dyn TooltipView<S>)> {
        self.manager
            .tooltips()
            .iter()
            .zip(self.manager.views())
            .map(|(t, m)| (t, &m.frame, &*m.view))
    }

    /// The hover container, if any hover tooltip is active.
    pub fn hover_container(&self) -> Option<&HoverHost<S>> {
        self.views()
            .find(|(t, _, _)| t.key() == CreatorKey::HOVER_HOST)
            .and_then(|(_, _, view)| view.downcast_ref::<HoverHost<S>>())
    }

    /// Tear down: cancel deadlines and destroy every view.
    pub fn destroy(&mut self) {
        for source in &mut self.sources {
            source.trigger.destroy();
        }
        self.manager.destroy_all();
        log::debug!("tooltip host destroyed");
    }

    fn run(&mut self, surface: &S, actions: Vec<(HoverSourceId, HoverAction<S>)>, now: u64) -> Vec<ResolveTask<S>> {
        let mut tr = Transaction::new();
        let mut tasks = Vec::new();
        for (id, action) in actions {
            match action {
                HoverAction::Show(tooltip) => tr.effects.push(Effect::SetHover(id, Some(tooltip))),
                HoverAction::Hide => tr.effects.push(Effect::SetHover(id, None)),
                HoverAction::Spawn(task) => tasks.push(task),
            }
        }
        if !tr.effects.is_empty() {
            self.dispatch(surface, tr, now);
        }
        tasks
    }
}

fn create_tooltip<S: 'static>(surface: &S, tooltip: &Tooltip<S>) -> Mounted<S> {
    let mut view = tooltip.creator.create(surface);
    let frame = Frame::offscreen(TooltipClass::TOOLTIP | view.classes());
    view.mount(surface);
    Mounted::new(view, frame)
}
