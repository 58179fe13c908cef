//! Static world layout: a flat list of box and cylinder colliders, each on a
//! named collision layer. Loaded from JSON and turned into a `StaticIndex`.

use anyhow::{Result, bail};
use collision_static::{Aabb, CylinderY, ShapeRef, StaticIndex, layers};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::read_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerName {
    #[default]
    Default,
    Actor,
    Thin,
}

impl LayerName {
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            LayerName::Default => layers::DEFAULT,
            LayerName::Actor => layers::ACTOR,
            LayerName::Thin => layers::THIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ColliderSpec {
    Box {
        min: [f32; 3],
        max: [f32; 3],
        #[serde(default)]
        layer: LayerName,
    },
    Cylinder {
        center: [f32; 3],
        radius: f32,
        half_height: f32,
        #[serde(default)]
        layer: LayerName,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldLayout {
    #[serde(default)]
    pub name: String,
    /// Character feet position at start.
    #[serde(default)]
    pub spawn: [f32; 3],
    #[serde(default)]
    pub colliders: Vec<ColliderSpec>,
}

impl WorldLayout {
    pub fn validate(&self) -> Result<()> {
        for (i, c) in self.colliders.iter().enumerate() {
            match c {
                ColliderSpec::Box { min, max, .. } => {
                    if (0..3).any(|k| min[k] > max[k]) {
                        bail!("collider {i}: box min exceeds max");
                    }
                }
                ColliderSpec::Cylinder {
                    radius,
                    half_height,
                    ..
                } => {
                    if *radius <= 0.0 || *half_height <= 0.0 {
                        bail!("collider {i}: cylinder extents must be positive");
                    }
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn spawn(&self) -> Vec3 {
        Vec3::from(self.spawn)
    }

    /// Build the runtime index; collider ids follow list order.
    #[must_use]
    pub fn build_index(&self) -> StaticIndex {
        let mut idx = StaticIndex::new();
        for c in &self.colliders {
            match *c {
                ColliderSpec::Box { min, max, layer } => {
                    idx.push(
                        layer.index(),
                        ShapeRef::Box(Aabb {
                            min: Vec3::from(min),
                            max: Vec3::from(max),
                        }),
                    );
                }
                ColliderSpec::Cylinder {
                    center,
                    radius,
                    half_height,
                    layer,
                } => {
                    idx.push(
                        layer.index(),
                        ShapeRef::Cyl(CylinderY {
                            center: Vec3::from(center),
                            radius,
                            half_height,
                        }),
                    );
                }
            }
        }
        idx
    }
}

/// Load and validate a world layout JSON file.
pub fn load_world(path: impl AsRef<Path>) -> Result<WorldLayout> {
    let layout: WorldLayout = read_json(path)?;
    layout.validate()?;
    Ok(layout)
}
