//! Collision helpers for a flat rectangular field
//!
//! Everything is circle distance: no impulses, no continuous sweeps.

use glam::Vec2;

use super::state::Field;

/// Which walls a point touched or crossed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    /// Left or right wall
    pub x: bool,
    /// Top or bottom wall
    pub y: bool,
}

impl WallContact {
    #[inline]
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Whether `a` is strictly closer than `radius` to `b`
#[inline]
pub fn within_reach(a: Vec2, b: Vec2, radius: f32) -> bool {
    distance(a, b) < radius
}

/// Check if two circles overlap
#[inline]
pub fn circles_collide(pos1: Vec2, radius1: f32, pos2: Vec2, radius2: f32) -> bool {
    distance(pos1, pos2) < radius1 + radius2
}

/// Check if a point lies inside (or on) a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).length_squared() <= radius * radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n, with `normal` unit length.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check whether a moving circle will overlap a stationary one after `steps` ticks
pub fn predict_circle_collision(
    moving_pos: Vec2,
    velocity: Vec2,
    moving_radius: f32,
    stationary_pos: Vec2,
    stationary_radius: f32,
    steps: f32,
) -> bool {
    let future = moving_pos + velocity * steps;
    circles_collide(future, moving_radius, stationary_pos, stationary_radius)
}

/// Walls at or beyond which `pos` lies
pub fn wall_contact(pos: Vec2, field: &Field) -> WallContact {
    WallContact {
        x: pos.x <= 0.0 || pos.x >= field.width,
        y: pos.y <= 0.0 || pos.y >= field.height,
    }
}

/// Bounce a point-mass off the field walls
///
/// Each axis flips independently, so a corner hit reflects both components.
/// With `clamp` the position is pulled back onto the wall it crossed.
pub fn bounce_off_walls(pos: &mut Vec2, vel: &mut Vec2, field: &Field, clamp: bool) -> WallContact {
    let contact = wall_contact(*pos, field);
    if contact.x {
        *vel = reflect_velocity(*vel, Vec2::X);
    }
    if contact.y {
        *vel = reflect_velocity(*vel, Vec2::Y);
    }
    if clamp && contact.any() {
        *pos = field.clamp(*pos);
    }
    contact
}
