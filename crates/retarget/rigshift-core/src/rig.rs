//! Humanoid rig generation for meshes that arrive without a skeleton.
//!
//! Bones are placed at fixed fractions of the mesh's vertical extent (Z up),
//! centred on the bounding box in X and Y:
//!
//! | joint  | height |
//! |--------|--------|
//! | foot   | 0.05   |
//! | knee   | 0.25   |
//! | hips   | 0.50   |
//! | spine  | 0.60   |
//! | chest  | 0.75   |
//! | neck   | 0.85   |
//! | head   | 0.95   |
//!
//! Legs sit `0.08 × height` either side of the centre line; arms extend along X
//! from the chest in steps of the `0.15 × height` shoulder width.

use tracing::{debug, info};

use crate::error::RigError;
use crate::host::Mesh;
use crate::skeleton::{BoneDef, Skeleton};

pub const AUTO_RIG_NAME: &str = "AutoRig_Armature";

const FOOT: f32 = 0.05;
const KNEE: f32 = 0.25;
const HIPS: f32 = 0.5;
const SPINE: f32 = 0.6;
const CHEST: f32 = 0.75;
const NECK: f32 = 0.85;
const HEAD: f32 = 0.95;
const SHOULDER_WIDTH: f32 = 0.15;
const HIP_WIDTH: f32 = 0.08;
const FOOT_LENGTH: f32 = 0.1;

/// Axis-aligned bounds of a set of vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// Bounds of every vertex of every mesh; `None` without vertices.
    pub fn enclosing<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Option<Self> {
        let mut verts = meshes.into_iter().flat_map(|m| m.vertices.iter());
        let first = *verts.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for v in verts {
            for axis in 0..3 {
                b.min[axis] = b.min[axis].min(v[axis]);
                b.max[axis] = b.max[axis].max(v[axis]);
            }
        }
        Some(b)
    }

    pub fn height(&self) -> f32 {
        self.max[2] - self.min[2]
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }
}

/// Build a humanoid skeleton sized to `mesh`.
pub fn build_humanoid(mesh: &Mesh) -> Result<Skeleton, RigError> {
    let bounds = Bounds::enclosing([mesh]).ok_or_else(|| RigError::Binding {
        mesh: mesh.name.clone(),
        reason: "mesh has no vertices".into(),
    })?;
    humanoid_in(&bounds).map_err(|reason| RigError::Binding {
        mesh: mesh.name.clone(),
        reason,
    })
}

/// Build a humanoid skeleton filling `bounds`.
pub fn humanoid_in(bounds: &Bounds) -> Result<Skeleton, String> {
    let height = bounds.height();
    if height.is_nan() || height <= f32::EPSILON {
        return Err(format!("mesh has no vertical extent ({height})"));
    }
    info!("mesh height {height:.3}; building humanoid rig");

    let [cx, cy, _] = bounds.center();
    let z = |frac: f32| bounds.min[2] + height * frac;
    let at = |x: f32, y: f32, frac: f32| [cx + x, cy + y, z(frac)];
    let top = [cx, cy, bounds.max[2]];

    let mut defs = vec![
        BoneDef::new("Hips").head_tail(at(0.0, 0.0, HIPS), at(0.0, 0.0, SPINE)),
        BoneDef::new("Spine")
            .parent("Hips")
            .head_tail(at(0.0, 0.0, SPINE), at(0.0, 0.0, CHEST)),
        BoneDef::new("Chest")
            .parent("Spine")
            .head_tail(at(0.0, 0.0, CHEST), at(0.0, 0.0, NECK)),
        BoneDef::new("Neck")
            .parent("Chest")
            .head_tail(at(0.0, 0.0, NECK), at(0.0, 0.0, HEAD)),
        BoneDef::new("Head").parent("Neck").head_tail(at(0.0, 0.0, HEAD), top),
    ];

    let hip = height * HIP_WIDTH;
    let shoulder = height * SHOULDER_WIDTH;
    for (side, sign) in [("Left", 1.0_f32), ("Right", -1.0)] {
        let x = sign * hip;
        defs.push(
            BoneDef::new(format!("{side}UpLeg"))
                .parent("Hips")
                .head_tail(at(x, 0.0, HIPS), at(x, 0.0, KNEE)),
        );
        defs.push(
            BoneDef::new(format!("{side}Leg"))
                .parent(format!("{side}UpLeg"))
                .head_tail(at(x, 0.0, KNEE), at(x, 0.0, FOOT)),
        );
        defs.push(
            BoneDef::new(format!("{side}Foot"))
                .parent(format!("{side}Leg"))
                .head_tail(at(x, 0.0, FOOT), at(x, -height * FOOT_LENGTH, FOOT)),
        );

        // Shoulder, upper arm, forearm and hand as spans along X.
        let arm = [
            ("Shoulder", "Chest".to_string(), 0.5, 1.0),
            ("Arm", format!("{side}Shoulder"), 1.0, 1.5),
            ("ForeArm", format!("{side}Arm"), 1.5, 2.0),
            ("Hand", format!("{side}ForeArm"), 2.0, 2.2),
        ];
        for (part, parent, from, to) in arm {
            defs.push(
                BoneDef::new(format!("{side}{part}"))
                    .parent(parent)
                    .head_tail(
                        at(sign * shoulder * from, 0.0, CHEST),
                        at(sign * shoulder * to, 0.0, CHEST),
                    ),
            );
        }
    }

    let skeleton = Skeleton::new(AUTO_RIG_NAME, defs).map_err(|e| e.to_string())?;
    debug!("humanoid rig has {} bones", skeleton.len());
    Ok(skeleton)
}
