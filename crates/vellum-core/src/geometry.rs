//! Basic geometric types shared by the layout resolvers and renderers.

/// A 2-D position in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point.
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point.
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point.
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point.
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the Euclidean distance from the origin.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// The dimensions of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size.
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size.
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new size with the maximum width and height of both sizes.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new size grown by the given insets on all sides.
    pub fn add_insets(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Multiplies both dimensions by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Padding or margin values for the four sides of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with the same value on all four sides.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Returns a copy with the top inset replaced.
    pub fn with_top(self, top: f32) -> Self {
        Self { top, ..self }
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Sum of the left and right insets.
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

/// An axis-aligned rectangle described by its min and max corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left origin and a size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            min_x: origin.x(),
            min_y: origin.y(),
            max_x: origin.x() + size.width(),
            max_y: origin.y() + size.height(),
        }
    }

    /// Creates bounds centered on a point with the given size.
    pub fn from_center_size(center: Point, size: Size) -> Self {
        let half_w = size.width() / 2.0;
        let half_h = size.height() / 2.0;
        Self {
            min_x: center.x() - half_w,
            min_y: center.y() - half_h,
            max_x: center.x() + half_w,
            max_y: center.y() + half_h,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds.
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds.
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner.
    pub fn origin(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the center point.
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Converts these bounds to a size.
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Merges two bounds into one containing both.
    pub fn merge(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x(),
            min_y: self.min_y + offset.y(),
            max_x: self.max_x + offset.x(),
            max_y: self.max_y + offset.y(),
        }
    }

    /// Grows the bounds outward by the given insets.
    pub fn expand(self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Shrinks the bounds inward by the given insets.
    pub fn shrink(self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x + insets.left(),
            min_y: self.min_y + insets.top(),
            max_x: self.max_x - insets.right(),
            max_y: self.max_y - insets.bottom(),
        }
    }

    /// True if `other` lies entirely within these bounds.
    ///
    /// Uses a small epsilon so boxes that share an edge with their container
    /// still count as contained.
    pub fn contains(self, other: Self) -> bool {
        const EPSILON: f32 = 1e-3;
        other.min_x >= self.min_x - EPSILON
            && other.min_y >= self.min_y - EPSILON
            && other.max_x <= self.max_x + EPSILON
            && other.max_y <= self.max_y + EPSILON
    }

    /// True if the interiors of the two bounds overlap.
    ///
    /// Touching edges do not count as an overlap.
    pub fn intersects(self, other: Self) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            0.0f32..500.0,
            0.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::from_origin_size(Point::new(x, y), Size::new(w, h)))
    }

    proptest! {
        /// A merged bounds always contains both inputs.
        #[test]
        fn merge_contains_both(a in bounds_strategy(), b in bounds_strategy()) {
            let merged = a.merge(b);
            prop_assert!(merged.contains(a));
            prop_assert!(merged.contains(b));
        }

        /// Translation preserves size.
        #[test]
        fn translate_preserves_size(
            b in bounds_strategy(),
            dx in -500.0f32..500.0,
            dy in -500.0f32..500.0,
        ) {
            let moved = b.translate(Point::new(dx, dy));
            prop_assert!((moved.width() - b.width()).abs() < 1e-3);
            prop_assert!((moved.height() - b.height()).abs() < 1e-3);
        }
    }
}
