// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tooltip --heading-base-level=0

//! Understory Tooltip: a host-agnostic, `no_std` tooltip manager for text surfaces.
//!
//! ## Overview
//!
//! Tooltips are floating views anchored to document offsets. Any number of
//! contributors publish declarative [`Tooltip`](crate::types::Tooltip)
//! descriptors; this crate keeps one live view per descriptor, positions the
//! views next to their anchors without overlapping each other, and runs the
//! pointer-driven hover workflow that asks resolvers for tooltips on demand.
//! It does not render anything and does not read a clock.
//!
//! ## Pieces
//!
//! - [`ViewReconciler`](crate::reconcile::ViewReconciler): matches a new
//!   descriptor list against the live views by
//!   [`CreatorKey`](crate::types::CreatorKey), reusing views whose creator is
//!   unchanged and destroying the rest.
//! - [`LayoutEngine`](crate::layout::LayoutEngine): two-phase layout. A
//!   read-only measure pass snapshots geometry; a write pass places frames,
//!   clamps them to the viewport, flips sides that overflow, and moves later
//!   tooltips away from earlier ones.
//! - [`HoverTrigger`](crate::trigger::HoverTrigger): turns pointer samples and
//!   host-supplied timestamps into resolver calls, dismissals and stale-result
//!   rejection.
//! - [`HoverHost`](crate::hover_host::HoverHost): the container that stacks
//!   every active hover tooltip into one top-level view.
//! - [`TooltipHost`](crate::host::TooltipHost): the per-surface plugin tying
//!   the above to a [`TooltipState`](crate::state::TooltipState).
//!
//! ## Workflow
//!
//! 1) Implement [`Surface`](crate::surface::Surface) for your text widget so the
//!    crate can ask for anchor and viewport geometry.
//! 2) Create a [`TooltipHost`](crate::host::TooltipHost), register plain
//!    sources and install [`hover_tooltip`](crate::host::hover_tooltip) sources.
//! 3) Forward state updates, pointer input and timer wake-ups. Drive any
//!    [`ResolveTask`](crate::trigger::ResolveTask) futures on your executor and
//!    hand their output back.
//! 4) When a layout pass is requested, measure then write, and render each
//!    view at its [`Frame`](crate::types::Frame).
//!
//! Resolver failures are never fatal; they go to a
//! [`DiagnosticSink`](crate::error::DiagnosticSink), by default the
//! [`log`] facade.
//!
//! This crate is `no_std` and uses `alloc`.
//!
//!

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod host;
pub mod hover_host;
pub mod layout;
pub mod reconcile;
pub mod state;
pub mod surface;
pub mod trigger;
pub mod types;

#[cfg(test)]
mod testing;
