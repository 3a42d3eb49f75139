//! Planar geometry shared by actors, weapons and projectiles.
//!
//! Coordinates follow screen conventions: the origin sits in the upper-left
//! corner and the y axis grows downwards.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Dimensions of the playable screen area measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates a new bounds descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent of the screen.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the screen.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre point of the screen.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Reports whether the point lies on the screen, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Reports whether the point lies strictly inside the screen grown by
    /// `margin` on every side.
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        -margin < point.x
            && point.x < self.width + margin
            && -margin < point.y
            && point.y < self.height + margin
    }

    /// Clamps a point onto the screen.
    #[must_use]
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            clamp(point.x, 0.0, self.width),
            clamp(point.y, 0.0, self.height),
        )
    }

    /// Moves a rectangle the minimum distance required to keep it on screen.
    ///
    /// Rectangles larger than the screen are centred on it.
    #[must_use]
    pub fn clamp_rect(&self, rect: Rect) -> Rect {
        let size = rect.size();
        let x = if size.x >= self.width {
            (self.width - size.x) / 2.0
        } else {
            clamp(rect.min().x, 0.0, self.width - size.x)
        };
        let y = if size.y >= self.height {
            (self.height - size.y) / 2.0
        } else {
            clamp(rect.min().y, 0.0, self.height - size.y)
        };
        Rect::from_min_size(Vec2::new(x, y), size)
    }
}

/// Axis-aligned rectangle used for hitboxes and trigger regions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its upper-left corner and size.
    #[must_use]
    pub const fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    /// Creates a square with side length `side` centred on `center`.
    #[must_use]
    pub fn square(center: Vec2, side: f32) -> Self {
        Self::from_center(center, Vec2::splat(side))
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Lower-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Returns a copy of the rectangle recentred on `center`.
    #[must_use]
    pub fn with_center(self, center: Vec2) -> Self {
        Self::from_center(center, self.size)
    }

    /// Reports whether two rectangles overlap with a non-zero area.
    ///
    /// Rectangles that merely share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
    }

    /// Reports whether the point lies inside the rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }
}

/// Facing information derived from a source and a target position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aim {
    /// Unit vector from source to target.
    pub direction: Vec2,
    /// Sprite rotation in degrees, folded into `-90.0..=90.0`.
    pub angle_degrees: f32,
    /// Whether the sprite must be mirrored horizontally before rotating.
    pub flip: bool,
}

/// Clamps `value` into `min..=max`, preferring `min` when the range is empty.
#[must_use]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(value.min(max))
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit direction and distance from `from` to `to`.
///
/// Coincident points yield a zero direction and a zero distance.
#[must_use]
pub fn vec_from_points(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let length = delta.length();
    if length == 0.0 {
        return (Vec2::ZERO, 0.0);
    }
    (delta / length, length)
}

/// Unit vector pointing along `radians`.
#[must_use]
pub fn unit_from_angle(radians: f32) -> Vec2 {
    Vec2::new(radians.cos(), radians.sin())
}

/// Computes the facing from `source` towards `target`.
///
/// When both points coincide the normalised `fallback` is used instead.
/// The angle is measured against a y-up axis so renderers can rotate sprites
/// directly, and is folded so that sprites never render upside down.
#[must_use]
pub fn aim_info(source: Vec2, target: Vec2, fallback: Vec2) -> Aim {
    let (mut direction, length) = vec_from_points(source, target);
    if length == 0.0 {
        direction = fallback.normalize_or_zero();
    }

    let mut angle_degrees = (-direction.y).atan2(direction.x).to_degrees();
    let mut flip = false;
    if angle_degrees < -90.0 {
        angle_degrees += 180.0;
        flip = true;
    } else if angle_degrees > 90.0 {
        angle_degrees -= 180.0;
        flip = true;
    }

    Aim {
        direction,
        angle_degrees,
        flip,
    }
}
