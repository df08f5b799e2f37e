//! Formation spatial model.
//!
//! Each team owns a four-edge axis-aligned region of the pitch. Formation
//! slots are normalized `(sx, sy)` in `[-1, 1]^2` (left to right, back to
//! front) and map to world coordinates by linear interpolation between the
//! edges. Tactical shape changes (width, depth, pushing up) are pure edge
//! manipulation; the slots themselves never move.

use serde::{Deserialize, Serialize};

use super::field::{Field, Side};
use super::geometry::{lerp, Vec2};
use super::physics_constants::formation as consts;

/// A team's region of the pitch, expressed as four independent edges in
/// world coordinates. `back` and `front` are x-edges (back is nearest the
/// own goal), `left` and `right` are y-edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationRegion {
    back: f32,
    front: f32,
    left: f32,
    right: f32,
    defending_side: Side,
}

impl FormationRegion {
    pub fn new(back: f32, front: f32, left: f32, right: f32, defending_side: Side) -> Self {
        Self { back, front, left, right, defending_side }
    }

    /// Default kickoff shape: the region spans from 22 m off the own goal
    /// line to just short of halfway, 30 m each side of the center line.
    pub fn kickoff(field: &Field, defending_side: Side) -> Self {
        let goal_x = field.goal_line_x(defending_side);
        let sign = defending_side.sign();
        Self {
            back: goal_x - sign * consts::KICKOFF_BACK_OFFSET,
            front: sign * consts::KICKOFF_FRONT_OFFSET,
            left: -consts::KICKOFF_SIDE_SPAN,
            right: consts::KICKOFF_SIDE_SPAN,
            defending_side,
        }
    }

    #[inline]
    pub fn back(&self) -> f32 {
        self.back
    }

    #[inline]
    pub fn front(&self) -> f32 {
        self.front
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.left
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.right
    }

    #[inline]
    pub fn defending_side(&self) -> Side {
        self.defending_side
    }

    pub fn set_back(&mut self, x: f32) {
        self.back = x;
    }

    pub fn set_front(&mut self, x: f32) {
        self.front = x;
    }

    pub fn set_left(&mut self, y: f32) {
        self.left = y;
    }

    pub fn set_right(&mut self, y: f32) {
        self.right = y;
    }

    /// Shift the whole region.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.back += dx;
        self.front += dx;
        self.left += dy;
        self.right += dy;
    }

    /// Set the side edges symmetrically from a tactical width in `[0, 1]`:
    /// 0 is the narrowest legal shape (18 m per side), 1 the widest (32 m).
    pub fn set_tactical_width(&mut self, width: f32) {
        let span = lerp(consts::WIDTH_SPAN_MIN, consts::WIDTH_SPAN_MAX, width.clamp(0.0, 1.0));
        self.left = -span;
        self.right = span;
    }

    /// Map a normalized slot to world coordinates. `sy = -1` lands on the
    /// back edge, `sx = -1` on the left edge; the mapping is linear.
    pub fn slot_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        let ty = (sy + 1.0) * 0.5;
        let tx = (sx + 1.0) * 0.5;
        Vec2::new(
            self.back + (self.front - self.back) * ty,
            self.left + (self.right - self.left) * tx,
        )
    }

    /// Inverse of `slot_to_world`. Degenerate (zero-span) axes map to the
    /// slot center.
    pub fn world_to_slot(&self, world: Vec2) -> (f32, f32) {
        let x_span = self.front - self.back;
        let y_span = self.right - self.left;
        let ty = if x_span.abs() < 1e-6 { 0.5 } else { (world.x - self.back) / x_span };
        let tx = if y_span.abs() < 1e-6 { 0.5 } else { (world.y - self.left) / y_span };
        (tx * 2.0 - 1.0, ty * 2.0 - 1.0)
    }
}
