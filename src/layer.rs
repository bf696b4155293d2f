use crate::geometry;
use crate::rect::Rect;
use cgmath::{EuclideanSpace, Matrix3, Point2, SquareMatrix, Vector2};

/// The visual layer backing every view.
///
/// The bridge only ever reads geometry from layers; contents and drawing belong to the
/// rendering backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Layer bounds, in the layer’s own coordinate system.
    ///
    /// The origin is usually zero but may be offset (e.g. by a scrolling container).
    pub bounds: Rect,

    /// Where the bounds origin sits in the parent’s coordinate system.
    pub position: Point2<f64>,

    /// Layer affine transform, applied about the bounds origin.
    pub transform: Matrix3<f64>,

    /// Layer opacity. A fully transparent layer is treated as invisible.
    pub opacity: f64,

    /// If true, the layer and its sublayers are not shown.
    pub hidden: bool,
}

impl Default for Layer {
    fn default() -> Self {
        Layer {
            bounds: Rect::zero(),
            position: Point2::new(0., 0.),
            transform: Matrix3::identity(),
            opacity: 1.,
            hidden: false,
        }
    }
}

impl Layer {
    /// Creates a layer occupying `frame` in its parent’s coordinate system.
    pub fn new(frame: Rect) -> Layer {
        let mut layer = Layer::default();
        layer.set_frame(frame);
        layer
    }

    /// Moves and resizes the layer so that it occupies `frame` in its parent.
    ///
    /// The layer transform is left untouched.
    pub fn set_frame(&mut self, frame: Rect) {
        self.position = frame.origin;
        self.bounds.size = frame.size;
    }

    /// Returns the layer’s bounding box in its parent’s coordinate system.
    pub fn frame(&self) -> Rect {
        geometry::transform_rect(&self.to_parent(), self.bounds)
    }

    /// The matrix mapping local points to the parent coordinate system.
    pub fn to_parent(&self) -> Matrix3<f64> {
        geometry::translation(self.position.to_vec())
            * self.transform
            * geometry::translation(-self.bounds.origin.to_vec())
    }

    /// Whether the layer would show up on screen at all.
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.opacity > 0.
    }

    /// Sets a translation-only transform.
    pub fn translate(&mut self, offset: Vector2<f64>) {
        self.transform = geometry::translation(offset);
    }
}
