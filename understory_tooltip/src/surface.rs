// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host collaborators: the editing surface and document change mapping.
//!
//! This crate does not know how text is laid out. The host answers geometry
//! queries through [`Surface`] and maps offsets through edits with
//! [`ChangeMapper`]. All rectangles are in viewport coordinates.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::types::Direction;

/// The interactive text surface tooltips attach to.
pub trait Surface {
    /// Bounding rectangle of the surface.
    fn surface_rect(&self) -> Rect;

    /// Size of the viewport the surface is displayed in.
    fn viewport(&self) -> Size;

    /// On-screen rectangle of `pos`, or `None` if it is not currently rendered.
    fn coords_at_pos(&self, pos: usize) -> Option<Rect>;

    /// Document offset under `point`, or `None` outside the text.
    fn pos_at_coords(&self, point: Point) -> Option<usize>;

    /// Rectangles covering the rendered text between `from` and `to`.
    fn range_rects(&self, from: usize, to: usize) -> Vec<Rect>;

    /// Base text direction of the surface.
    fn text_direction(&self) -> Direction {
        Direction::Ltr
    }

    /// Direction of the bidi run containing `pos`.
    fn direction_at(&self, _pos: usize) -> Direction {
        self.text_direction()
    }

    /// Typical character advance, used as the horizontal hover tolerance.
    fn default_character_width(&self) -> f64;

    /// False on platforms where viewport-fixed positioning is unreliable
    /// (touch browsers), in which case tooltips are placed relative to the surface.
    fn fixed_positioning_reliable(&self) -> bool {
        true
    }

    /// True while the surface intersects the viewport.
    fn in_view(&self) -> bool {
        let r = self.surface_rect();
        let v = self.viewport();
        r.x1 > 0.0 && r.y1 > 0.0 && r.x0 < v.width && r.y0 < v.height
    }
}

/// Which neighbor an offset sticks to when text is inserted at it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Assoc {
    /// Stay before inserted text.
    Before,
    /// Move after inserted text.
    After,
}

/// How deletions affect mapped offsets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MapMode {
    /// Always produce an offset.
    Simple,
    /// Produce `None` when the offset was inside deleted content.
    TrackDel,
}

/// Maps document offsets through one edit.
pub trait ChangeMapper {
    /// Map `pos` through the change. With [`MapMode::Simple`] this never returns `None`.
    fn map_pos(&self, pos: usize, assoc: Assoc, mode: MapMode) -> Option<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct At(Rect);

    impl Surface for At {
        fn surface_rect(&self) -> Rect {
            self.0
        }
        fn viewport(&self) -> Size {
            Size::new(100.0, 100.0)
        }
        fn coords_at_pos(&self, _pos: usize) -> Option<Rect> {
            None
        }
        fn pos_at_coords(&self, _point: Point) -> Option<usize> {
            None
        }
        fn range_rects(&self, _from: usize, _to: usize) -> Vec<Rect> {
            Vec::new()
        }
        fn default_character_width(&self) -> f64 {
            7.0
        }
    }

    #[test]
    fn in_view_tracks_viewport_overlap() {
        assert!(At(Rect::new(10.0, 10.0, 50.0, 50.0)).in_view());
        assert!(At(Rect::new(-20.0, 90.0, 20.0, 200.0)).in_view());
        assert!(!At(Rect::new(0.0, -80.0, 50.0, 0.0)).in_view());
        assert!(!At(Rect::new(0.0, 100.0, 50.0, 300.0)).in_view());
    }
}
