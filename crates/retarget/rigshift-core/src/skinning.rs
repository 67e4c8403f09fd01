//! Reference mesh binders used by the auto-rig path.

use nalgebra::Vector3;
use tracing::debug;

use crate::error::RigError;
use crate::host::{BoneWeight, Mesh, MeshBinder, SkinBinding};
use crate::skeleton::{Bone, Skeleton};

/// Distance from `p` to the bone's head-tail segment.
fn segment_distance(p: &Vector3<f32>, bone: &Bone) -> f32 {
    let a = Vector3::from(bone.head);
    let b = Vector3::from(bone.tail);
    let ab = b - a;
    let len2 = ab.norm_squared();
    let t = if len2 > f32::EPSILON {
        ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).norm()
}

fn no_bones(mesh: &Mesh, skeleton: &Skeleton) -> RigError {
    RigError::Binding {
        mesh: mesh.name.clone(),
        reason: format!("skeleton '{}' has no bones", skeleton.name),
    }
}

/// Smooth weights: every bone within `radius_factor × skeleton extent` of a
/// vertex influences it in inverse proportion to distance.
///
/// Fails when a vertex has no bone in reach, which is what happens when the
/// skeleton and mesh are at very different scales.
#[derive(Debug, Clone, Copy)]
pub struct ProximityBinder {
    pub radius_factor: f32,
}

impl Default for ProximityBinder {
    fn default() -> Self {
        Self { radius_factor: 0.35 }
    }
}

impl MeshBinder for ProximityBinder {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn bind(&self, mesh: &Mesh, skeleton: &Skeleton) -> Result<SkinBinding, RigError> {
        if skeleton.is_empty() {
            return Err(no_bones(mesh, skeleton));
        }
        let radius = skeleton.extent().max(f32::EPSILON) * self.radius_factor;

        let mut weights = Vec::with_capacity(mesh.vertices.len());
        for (vi, v) in mesh.vertices.iter().enumerate() {
            let p = Vector3::from(*v);
            let mut influences: Vec<BoneWeight> = skeleton
                .bones()
                .iter()
                .filter_map(|bone| {
                    let d = segment_distance(&p, bone);
                    (d <= radius).then(|| BoneWeight {
                        bone: bone.name.clone(),
                        weight: 1.0 / (d + 1e-4),
                    })
                })
                .collect();
            if influences.is_empty() {
                return Err(RigError::Binding {
                    mesh: mesh.name.clone(),
                    reason: format!("vertex {vi} has no bone within {radius:.3}"),
                });
            }
            let total: f32 = influences.iter().map(|w| w.weight).sum();
            for w in &mut influences {
                w.weight /= total;
            }
            weights.push(influences);
        }

        debug!("proximity-bound '{}' ({} vertices)", mesh.name, weights.len());
        Ok(SkinBinding {
            skeleton: skeleton.name.clone(),
            weights,
        })
    }
}

/// Rigid fallback: each vertex follows its nearest bone with full weight.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeBinder;

impl MeshBinder for EnvelopeBinder {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn bind(&self, mesh: &Mesh, skeleton: &Skeleton) -> Result<SkinBinding, RigError> {
        if skeleton.is_empty() {
            return Err(no_bones(mesh, skeleton));
        }
        let weights = mesh
            .vertices
            .iter()
            .map(|v| {
                let p = Vector3::from(*v);
                let nearest = skeleton
                    .bones()
                    .iter()
                    .map(|b| (b, segment_distance(&p, b)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(b, _)| b.name.clone())
                    .unwrap_or_default();
                vec![BoneWeight {
                    bone: nearest,
                    weight: 1.0,
                }]
            })
            .collect();
        Ok(SkinBinding {
            skeleton: skeleton.name.clone(),
            weights,
        })
    }
}
