use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local translate/rotate/scale channels of a DAG node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformChannels {
	/// X Y Z
	pub translation: Vec3,
	/// Euler angles in radians, XYZ order
	pub rotation: Vec3,
	/// X Y Z
	pub scale: Vec3,
}

impl Default for TransformChannels {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl TransformChannels {
	pub const IDENTITY: Self = Self {
		translation: Vec3::ZERO,
		rotation: Vec3::ZERO,
		scale: Vec3::ONE,
	};

	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_translation(mut self, translation: Vec3) -> Self {
		self.translation = translation;
		self
	}

	pub fn with_rotation(mut self, rotation: Vec3) -> Self {
		self.rotation = rotation;
		self
	}

	pub fn with_scale(mut self, scale: Vec3) -> Self {
		self.scale = scale;
		self
	}

	pub fn is_identity(&self) -> bool {
		*self == Self::IDENTITY
	}

	pub fn to_matrix(&self) -> Mat4 {
		Mat4::from_scale_rotation_translation(
			self.scale,
			Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
			self.translation,
		)
	}

	/// Decompose an affine matrix. Shear is lost.
	pub fn from_matrix(mat: Mat4) -> Self {
		let (scale, rotation, translation) = mat.to_scale_rotation_translation();
		let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
		Self {
			translation,
			rotation: Vec3::new(x, y, z),
			scale,
		}
	}
}

/// Whether `mat` can be inverted without blowing up.
pub fn is_invertible(mat: &Mat4) -> bool {
	mat.determinant().abs() > f32::EPSILON
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use super::*;

	#[test]
	fn identity_matrix() {
		assert_eq!(TransformChannels::IDENTITY.to_matrix(), Mat4::IDENTITY);
		assert!(TransformChannels::default().is_identity());
	}

	#[test]
	fn decompose_recovers_channels() {
		let channels = TransformChannels::new()
			.with_translation(Vec3::new(1.0, -2.0, 3.5))
			.with_rotation(Vec3::new(0.3, FRAC_PI_2 * 0.5, -0.7))
			.with_scale(Vec3::new(2.0, 1.0, 0.5));

		let back = TransformChannels::from_matrix(channels.to_matrix());
		assert!(back.to_matrix().abs_diff_eq(channels.to_matrix(), 1e-5));
		assert!(back.translation.abs_diff_eq(channels.translation, 1e-5));
		assert!(back.scale.abs_diff_eq(channels.scale, 1e-5));
	}

	#[test]
	fn singular_matrix_is_not_invertible() {
		let flat = TransformChannels::new().with_scale(Vec3::new(1.0, 0.0, 1.0));
		assert!(!is_invertible(&flat.to_matrix()));
		assert!(is_invertible(&Mat4::IDENTITY));
	}
}
