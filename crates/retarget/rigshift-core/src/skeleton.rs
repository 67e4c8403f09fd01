//! Bone hierarchy model.
//!
//! A `Skeleton` owns its bones; a bone refers to its parent by index into the
//! skeleton's bone list. Rest data (head/tail in armature space, Z-up) is only
//! read by skinning and root-height heuristics; pose channels are expressed
//! relative to rest, so an identity pose *is* the rest pose.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::RigError;

/// Index of the vertical axis in armature space.
pub const UP_AXIS: usize = 2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    #[default]
    Quaternion,
    /// Euler angles applied X, then Y, then Z.
    EulerXyz,
}

/// Bone description used to build a skeleton (parent given by name).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub head: [f32; 3],
    #[serde(default = "default_tail")]
    pub tail: [f32; 3],
    #[serde(default)]
    pub rotation_mode: RotationMode,
}

fn default_tail() -> [f32; 3] {
    [0.0, 0.0, 0.1]
}

impl BoneDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            head: [0.0; 3],
            tail: default_tail(),
            rotation_mode: RotationMode::default(),
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn head_tail(mut self, head: [f32; 3], tail: [f32; 3]) -> Self {
        self.head = head;
        self.tail = tail;
        self
    }

    pub fn rotation_mode(mut self, mode: RotationMode) -> Self {
        self.rotation_mode = mode;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    pub rotation_mode: RotationMode,
}

impl Bone {
    pub fn length(&self) -> f32 {
        let d = [
            self.tail[0] - self.head[0],
            self.tail[1] - self.head[1],
            self.tail[2] - self.head[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub name: String,
    bones: Vec<Bone>,
    index: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton, resolving parents by name.
    ///
    /// Fails when names repeat, a parent is unknown, or the parent graph has a cycle.
    pub fn new(
        name: impl Into<String>,
        defs: impl IntoIterator<Item = BoneDef>,
    ) -> Result<Self, RigError> {
        let name = name.into();
        let defs: Vec<BoneDef> = defs.into_iter().collect();

        let mut index = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if index.insert(def.name.clone(), i).is_some() {
                return Err(RigError::InvalidSkeleton {
                    reason: format!("duplicate bone name '{}' in '{}'", def.name, name),
                });
            }
        }

        let mut bones = Vec::with_capacity(defs.len());
        for def in defs {
            let parent = match &def.parent {
                Some(p) => Some(*index.get(p).ok_or_else(|| RigError::InvalidSkeleton {
                    reason: format!("bone '{}' references unknown parent '{p}'", def.name),
                })?),
                None => None,
            };
            bones.push(Bone {
                name: def.name,
                parent,
                head: def.head,
                tail: def.tail,
                rotation_mode: def.rotation_mode,
            });
        }

        // Walking up from any bone must terminate within `len` steps.
        for (start, bone) in bones.iter().enumerate() {
            let mut cur = bone.parent;
            let mut steps = 0usize;
            while let Some(p) = cur {
                steps += 1;
                if p == start || steps > bones.len() {
                    return Err(RigError::InvalidSkeleton {
                        reason: format!("parent cycle through bone '{}'", bone.name),
                    });
                }
                cur = bones[p].parent;
            }
        }

        Ok(Self { name, bones, index })
    }

    /// Skeleton with no bones (the "nothing to map onto" case).
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    pub fn bone(&self, idx: usize) -> Option<&Bone> {
        self.bones.get(idx)
    }

    /// Exact (case-sensitive) lookup.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// First bone, in skeleton order, whose name equals `name` ignoring ASCII case.
    pub fn find_case_insensitive(&self, name: &str) -> Option<&Bone> {
        self.bones
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|b| b.parent.is_none())
    }

    pub fn to_defs(&self) -> Vec<BoneDef> {
        self.bones
            .iter()
            .map(|b| BoneDef {
                name: b.name.clone(),
                parent: b.parent.map(|p| self.bones[p].name.clone()),
                head: b.head,
                tail: b.tail,
                rotation_mode: b.rotation_mode,
            })
            .collect()
    }

    /// Largest axis-aligned extent of all heads and tails (0 for an empty skeleton).
    pub fn extent(&self) -> f32 {
        let mut lo = [f32::INFINITY; 3];
        let mut hi = [f32::NEG_INFINITY; 3];
        for b in &self.bones {
            for p in [b.head, b.tail] {
                for k in 0..3 {
                    lo[k] = lo[k].min(p[k]);
                    hi[k] = hi[k].max(p[k]);
                }
            }
        }
        if self.bones.is_empty() {
            return 0.0;
        }
        (0..3).map(|k| hi[k] - lo[k]).fold(0.0, f32::max)
    }
}
