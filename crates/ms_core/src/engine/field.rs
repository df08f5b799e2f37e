//! Pitch model: dimensions, marked areas, goals, and constraint helpers.
//!
//! World coordinates are centered on the center spot: `x` runs goal to goal
//! (negative toward the left goal), `y` runs touchline to touchline. A
//! `Field` is immutable after construction; everything is precomputed in
//! meters from the yard/foot figures in `FieldConfig`.

use serde::{Deserialize, Serialize};

use super::config::{FieldConfig, FOOT_M, YARD_M};
use super::geometry::{Rect, Vec2};

/// The side of the pitch a team defends. `Left` defends the goal at
/// negative `x` and attacks toward positive `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1 for the left half, +1 for the right half.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Unit vector pointing at the goal this side attacks.
    #[inline]
    pub fn attack_direction(self) -> Vec2 {
        match self {
            Side::Left => Vec2::new(1.0, 0.0),
            Side::Right => Vec2::new(-1.0, 0.0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Where a point sits relative to the field of play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryClass {
    InPlay,
    /// Past a touchline; `positive_y` tells which one.
    OffTouchline { positive_y: bool },
    /// Past a goal line; `inside_goal_mouth` is true when the crossing point
    /// is between the posts (a goal or a save, not a goal kick/corner).
    OffGoalLine { side: Side, inside_goal_mouth: bool },
}

/// Immutable pitch geometry in meters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    length: f32,
    width: f32,
    bounds: Rect,
    goal_width: f32,
    goal_height: f32,
    goal_depth: f32,
    penalty_area_left: Rect,
    penalty_area_right: Rect,
    goal_area_left: Rect,
    goal_area_right: Rect,
    goal_left: Rect,
    goal_right: Rect,
    center_circle_radius: f32,
    penalty_arc_radius: f32,
    penalty_spot_left: Vec2,
    penalty_spot_right: Vec2,
}

impl Field {
    pub fn new(cfg: &FieldConfig) -> Self {
        let length = cfg.length_yd * YARD_M;
        let width = cfg.width_yd * YARD_M;
        let half_length = length * 0.5;

        let pa_len = cfg.penalty_area_length_yd * YARD_M;
        let pa_wid = cfg.penalty_area_width_yd * YARD_M;
        let ga_len = cfg.goal_area_length_yd * YARD_M;
        let ga_wid = cfg.goal_area_width_yd * YARD_M;
        let goal_width = cfg.goal_width_yd * YARD_M;
        let goal_depth = cfg.goal_depth_yd * YARD_M;

        let area = |goal_line_x: f32, depth: f32, w: f32, sign: f32| {
            Rect::new(
                Vec2::new(goal_line_x, -w * 0.5),
                Vec2::new(goal_line_x + sign * depth, w * 0.5),
            )
        };

        Self {
            length,
            width,
            bounds: Rect::from_center_size(Vec2::ZERO, length, width),
            goal_width,
            goal_height: cfg.goal_height_ft * FOOT_M,
            goal_depth,
            penalty_area_left: area(-half_length, pa_len, pa_wid, 1.0),
            penalty_area_right: area(half_length, pa_len, pa_wid, -1.0),
            goal_area_left: area(-half_length, ga_len, ga_wid, 1.0),
            goal_area_right: area(half_length, ga_len, ga_wid, -1.0),
            goal_left: area(-half_length, goal_depth, goal_width, -1.0),
            goal_right: area(half_length, goal_depth, goal_width, 1.0),
            center_circle_radius: cfg.center_circle_radius_yd * YARD_M,
            // The penalty arc shares the center circle's radius.
            penalty_arc_radius: cfg.center_circle_radius_yd * YARD_M,
            penalty_spot_left: Vec2::new(-half_length + cfg.penalty_spot_yd * YARD_M, 0.0),
            penalty_spot_right: Vec2::new(half_length - cfg.penalty_spot_yd * YARD_M, 0.0),
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn half_length(&self) -> f32 {
        self.length * 0.5
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn center_spot(&self) -> Vec2 {
        Vec2::ZERO
    }

    #[inline]
    pub fn center_circle_radius(&self) -> f32 {
        self.center_circle_radius
    }

    #[inline]
    pub fn goal_width(&self) -> f32 {
        self.goal_width
    }

    #[inline]
    pub fn goal_height(&self) -> f32 {
        self.goal_height
    }

    /// X coordinate of the goal line on the given side.
    #[inline]
    pub fn goal_line_x(&self, side: Side) -> f32 {
        side.sign() * self.half_length()
    }

    /// Center of the goal mouth on the given side.
    #[inline]
    pub fn goal_center(&self, side: Side) -> Vec2 {
        Vec2::new(self.goal_line_x(side), 0.0)
    }

    pub fn penalty_area(&self, side: Side) -> Rect {
        match side {
            Side::Left => self.penalty_area_left,
            Side::Right => self.penalty_area_right,
        }
    }

    pub fn goal_area(&self, side: Side) -> Rect {
        match side {
            Side::Left => self.goal_area_left,
            Side::Right => self.goal_area_right,
        }
    }

    /// The goal frame footprint behind the goal line.
    pub fn goal_rect(&self, side: Side) -> Rect {
        match side {
            Side::Left => self.goal_left,
            Side::Right => self.goal_right,
        }
    }

    pub fn penalty_spot(&self, side: Side) -> Vec2 {
        match side {
            Side::Left => self.penalty_spot_left,
            Side::Right => self.penalty_spot_right,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains(p)
    }

    /// Classify a ground-plane point against the boundary lines. Touchline
    /// crossings win over goal-line crossings for corner-ish points, matching
    /// the order a referee resolves them.
    pub fn classify(&self, p: Vec2) -> BoundaryClass {
        if p.y.abs() > self.half_width() {
            return BoundaryClass::OffTouchline { positive_y: p.y > 0.0 };
        }
        if p.x.abs() > self.half_length() {
            let side = if p.x < 0.0 { Side::Left } else { Side::Right };
            return BoundaryClass::OffGoalLine {
                side,
                inside_goal_mouth: p.y.abs() <= self.goal_width * 0.5,
            };
        }
        BoundaryClass::InPlay
    }

    /// Nearest in-bounds point.
    pub fn clamp_to_bounds(&self, p: Vec2) -> Vec2 {
        self.bounds.clamp_point(p)
    }

    /// Push a point out of the penalty arc in front of the given penalty
    /// area. Points inside the penalty area itself are untouched (the arc is
    /// only the part of the circle outside the area). Used to place walls
    /// and lurkers legally at penalties.
    pub fn clamp_outside_penalty_arc(&self, p: Vec2, side: Side) -> Vec2 {
        if self.penalty_area(side).contains(p) {
            return p;
        }
        let spot = self.penalty_spot(side);
        let offset = p - spot;
        let dist = offset.length();
        if dist >= self.penalty_arc_radius {
            return p;
        }
        let dir = if dist < 1e-6 {
            // Degenerate: push straight up the pitch, away from the goal.
            side.attack_direction()
        } else {
            offset.normalized()
        };
        spot + dir * self.penalty_arc_radius
    }

    /// Push a point out of the center circle, radially from the center spot.
    /// A point exactly on the spot is pushed toward its own half (sign of
    /// `own_half_sign`, -1 left / +1 right).
    pub fn clamp_outside_center_circle(&self, p: Vec2, own_half_sign: f32) -> Vec2 {
        let dist = p.length();
        if dist >= self.center_circle_radius {
            return p;
        }
        let dir = if dist < 1e-6 {
            Vec2::new(if own_half_sign < 0.0 { -1.0 } else { 1.0 }, 0.0)
        } else {
            p.normalized()
        };
        dir * self.center_circle_radius
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new(&FieldConfig::default())
    }
}
