//! Conversions between view and window coordinate spaces.
//!
//! Matrices are 2D affine transforms in homogeneous coordinates (column-major, as cgmath has
//! them).

use crate::error::BridgeError;
use crate::hierarchy::Hierarchy;
use crate::rect::Rect;
use crate::view::ViewId;
use cgmath::{Matrix3, Point2, SquareMatrix, Vector2, Vector3};

/// A translation by `offset`.
pub fn translation(offset: Vector2<f64>) -> Matrix3<f64> {
    Matrix3::new(1., 0., 0., 0., 1., 0., offset.x, offset.y, 1.)
}

/// A scale about the origin.
pub fn scale(sx: f64, sy: f64) -> Matrix3<f64> {
    Matrix3::new(sx, 0., 0., 0., sy, 0., 0., 0., 1.)
}

/// A counter-clockwise rotation about the origin.
pub fn rotation(radians: f64) -> Matrix3<f64> {
    let (sin, cos) = radians.sin_cos();
    Matrix3::new(cos, sin, 0., -sin, cos, 0., 0., 0., 1.)
}

pub fn transform_point(matrix: &Matrix3<f64>, point: Point2<f64>) -> Point2<f64> {
    let v = *matrix * Vector3::new(point.x, point.y, 1.);
    Point2::new(v.x, v.y)
}

/// Transforms a rectangle and returns the bounding box of the result.
pub fn transform_rect(matrix: &Matrix3<f64>, rect: Rect) -> Rect {
    let corners = rect.corners();
    let points = [
        transform_point(matrix, corners[0]),
        transform_point(matrix, corners[1]),
        transform_point(matrix, corners[2]),
        transform_point(matrix, corners[3]),
    ];
    Rect::bounding(&points).unwrap_or(rect)
}

/// Inverts a matrix, or returns None if its determinant is (nearly) zero.
pub fn invert(matrix: &Matrix3<f64>, epsilon: f64) -> Option<Matrix3<f64>> {
    if matrix.determinant().abs() < epsilon {
        return None;
    }
    matrix.invert()
}

impl Hierarchy {
    /// The matrix mapping points in the view’s space to its window’s space.
    fn to_window_matrix(&self, id: ViewId) -> Result<Matrix3<f64>, BridgeError> {
        let chain = self.parent_chain(id)?;
        match chain.last() {
            Some(root) if self.window_with_content(*root).is_some() => (),
            _ => return Err(BridgeError::Unattached(id)),
        }

        let mut matrix = Matrix3::identity();
        for view in chain.iter().rev() {
            let layer = self.layer(*view).ok_or(BridgeError::NoSuchView(*view))?;
            matrix = matrix * layer.to_parent();
        }
        Ok(matrix)
    }

    fn from_window_matrix(&self, id: ViewId) -> Result<Matrix3<f64>, BridgeError> {
        let matrix = self.to_window_matrix(id)?;
        invert(&matrix, self.config.epsilon).ok_or(BridgeError::NonInvertible(id))
    }

    /// Converts a point from the view’s space to its window’s space.
    pub fn convert_to_window_point(
        &self,
        id: ViewId,
        point: Point2<f64>,
    ) -> Result<Point2<f64>, BridgeError> {
        Ok(transform_point(&self.to_window_matrix(id)?, point))
    }

    /// Converts a point from the window’s space to the view’s space.
    pub fn convert_from_window_point(
        &self,
        id: ViewId,
        point: Point2<f64>,
    ) -> Result<Point2<f64>, BridgeError> {
        Ok(transform_point(&self.from_window_matrix(id)?, point))
    }

    /// Converts a rectangle to window space. Returns the bounding box if the view is rotated.
    pub fn convert_to_window_rect(&self, id: ViewId, rect: Rect) -> Result<Rect, BridgeError> {
        Ok(transform_rect(&self.to_window_matrix(id)?, rect))
    }

    pub fn convert_from_window_rect(&self, id: ViewId, rect: Rect) -> Result<Rect, BridgeError> {
        Ok(transform_rect(&self.from_window_matrix(id)?, rect))
    }

    /// Converts a point between the spaces of two views in the same window.
    ///
    /// Views in different windows have no common space; this reports `to` as unattached.
    pub fn convert_point(
        &self,
        point: Point2<f64>,
        from: ViewId,
        to: ViewId,
    ) -> Result<Point2<f64>, BridgeError> {
        let from_window = self.window_of(from).ok_or(BridgeError::Unattached(from))?;
        if self.window_of(to) != Some(from_window) {
            return Err(BridgeError::Unattached(to));
        }
        let in_window = self.convert_to_window_point(from, point)?;
        self.convert_from_window_point(to, in_window)
    }
}
