//! Keyframe interpolation helpers.
//!
//! CONSTANT holds the left key, LINEAR blends component-wise (quaternions via
//! shortest-arc NLERP) and BEZIER uses auto-clamped handles derived from the
//! neighbouring keys.

pub mod functions;

pub use functions::{interpolate_segment, linear_value, nlerp_quat};
