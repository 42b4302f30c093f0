use glam::{Affine3A, Mat4};
use smallvec::SmallVec;

use crate::errors::{AnimationError, Result};
use crate::scene::{NodeId, NodeTransformTable, SceneGraph};

/// A binding of joint nodes to one or more meshes.
#[derive(Debug, Clone)]
pub struct Skin {
    pub name: String,

    // Joint list: ordered, joints[i] is joint index i in the vertex data.
    pub joints: Vec<NodeId>,

    // Inverse Bind Matrices, one per joint.
    // Static data, transforms vertices from mesh space into joint space.
    pub inverse_bind_matrices: Vec<Affine3A>,

    /// Meshes deformed by this skin.
    pub meshes: SmallVec<[usize; 2]>,
}

impl Skin {
    /// A skin whose inverse bind matrices default to identity, as glTF
    /// specifies when the accessor is absent.
    #[must_use]
    pub fn new(name: &str, joints: Vec<NodeId>) -> Self {
        let count = joints.len();
        Self::with_inverse_bind_matrices(name, joints, vec![Affine3A::IDENTITY; count])
    }

    #[must_use]
    pub fn with_inverse_bind_matrices(
        name: &str,
        joints: Vec<NodeId>,
        inverse_bind_matrices: Vec<Affine3A>,
    ) -> Self {
        Self {
            name: name.to_string(),
            joints,
            inverse_bind_matrices,
            meshes: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn bound_to(mut self, mesh: usize) -> Self {
        self.meshes.push(mesh);
        self
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Load-time checks: joint budget, one inverse bind matrix per joint, and
    /// every joint present in the graph.
    pub fn validate(&self, graph: &SceneGraph, joint_budget: usize) -> Result<()> {
        if self.joints.len() > joint_budget {
            return Err(AnimationError::JointBudgetExceeded {
                skin: self.name.clone(),
                joints: self.joints.len(),
                budget: joint_budget,
            });
        }

        if self.inverse_bind_matrices.len() != self.joints.len() {
            return Err(AnimationError::InvalidSkin {
                skin: self.name.clone(),
                reason: format!(
                    "{} inverse bind matrices for {} joints",
                    self.inverse_bind_matrices.len(),
                    self.joints.len()
                ),
            });
        }

        if let Some(joint) = self.joints.iter().find(|&&j| !graph.contains(j)) {
            return Err(AnimationError::InvalidSkin {
                skin: self.name.clone(),
                reason: format!("joint {joint:?} is not in the scene graph"),
            });
        }

        Ok(())
    }
}

/// Fixed-capacity joint matrix array consumed by the skinning shader.
///
/// Slots past `len` stay identity so the whole buffer can be uploaded as is.
#[derive(Debug, Clone)]
pub struct JointMatrixBuffer {
    matrices: Box<[Mat4]>,
    len: usize,
}

impl JointMatrixBuffer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Matrices of the skin's joints, in joint order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices[..self.len]
    }

    /// The whole fixed-size array, including unused identity slots.
    #[inline]
    #[must_use]
    pub fn as_padded(&self) -> &[Mat4] {
        &self.matrices
    }
}

/// Fills `buffer` with `global[joints[j]] * inverse_bind[j]` for every joint.
///
/// Fails with [`AnimationError::JointBudgetExceeded`] instead of truncating
/// when the skin does not fit; the buffer is left untouched in that case.
/// Globals are read from `pose`, i.e. the animated pose of this frame.
pub fn compute_joint_matrices(
    skin: &Skin,
    pose: &NodeTransformTable,
    buffer: &mut JointMatrixBuffer,
) -> Result<()> {
    let count = skin.joints.len();
    if count > buffer.capacity() {
        return Err(AnimationError::JointBudgetExceeded {
            skin: skin.name.clone(),
            joints: count,
            budget: buffer.capacity(),
        });
    }

    for (slot, (&joint, ibm)) in buffer
        .matrices
        .iter_mut()
        .zip(skin.joints.iter().zip(&skin.inverse_bind_matrices))
    {
        let joint_world = pose.global(joint).copied().unwrap_or(Affine3A::IDENTITY);
        *slot = Mat4::from(joint_world * *ibm);
    }

    // Slots released by a previously larger skin go back to identity.
    for slot in &mut buffer.matrices[count..buffer.len.max(count)] {
        *slot = Mat4::IDENTITY;
    }
    buffer.len = count;

    Ok(())
}
