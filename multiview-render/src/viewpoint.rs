//! Viewpoint requests and sampling
//!
//! A viewpoint is a rotation increment (radians about X, Y and Z, applied in
//! that order) that the renderer applies to the mesh before capturing a
//! frame. Sources come in two mutually exclusive flavours:
//!
//! - explicit: a caller-supplied, ordered list replayed as-is
//! - generated: a count, with every angle drawn uniformly from `[0, 2π)` at
//!   the moment the viewpoint is consumed

use multiview_core::{rotation_from_xyz, Error, Result};
use nalgebra::Rotation3;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

/// Number of generated viewpoints when nothing else is requested
pub const DEFAULT_VIEWPOINT_COUNT: usize = 9;

/// Rotation increment about the X, Y and Z axes, in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Viewpoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Validate a loosely-typed angle list; it must hold exactly three finite numbers
    pub fn from_slice(angles: &[f64]) -> Result<Self> {
        match angles {
            [x, y, z] if angles.iter().all(|a| a.is_finite()) => {
                Ok(Self::new(*x as f32, *y as f32, *z as f32))
            }
            [_, _, _] => Err(Error::Precondition(format!(
                "viewpoint angles must be finite, got {:?}",
                angles
            ))),
            _ => Err(Error::Precondition(format!(
                "viewpoint must have exactly 3 angles, got {}",
                angles.len()
            ))),
        }
    }

    /// Rotation matrix `Rx * Ry * Rz`
    pub fn rotation(&self) -> Rotation3<f32> {
        rotation_from_xyz(self.x, self.y, self.z)
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Caller-facing, not yet validated description of the viewpoints.
///
/// Deserializes from either an integer count or a list of angle lists.
/// Any other JSON value lands in `Malformed` and is rejected when validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewpointRequest {
    Count(i64),
    Explicit(Vec<Vec<f64>>),
    Malformed(serde_json::Value),
}

impl Default for ViewpointRequest {
    fn default() -> Self {
        ViewpointRequest::Count(DEFAULT_VIEWPOINT_COUNT as i64)
    }
}

impl FromStr for ViewpointRequest {
    type Err = Error;

    /// Either a count (`"9"`) or `x,y,z` triples separated by `;`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(count) = s.parse::<i64>() {
            return Ok(ViewpointRequest::Count(count));
        }

        s.split(';')
            .map(str::trim)
            .filter(|triple| !triple.is_empty())
            .map(|triple| {
                triple
                    .split(',')
                    .map(|a| {
                        let a = a.trim();
                        a.parse::<f64>().map_err(|_| {
                            Error::Precondition(format!("invalid angle '{}' in '{}'", a, triple))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()
            .map(ViewpointRequest::Explicit)
    }
}

enum Mode {
    Explicit(Vec<Viewpoint>),
    Generated {
        count: usize,
        rng: Box<dyn RngCore>,
        angles: Uniform<f32>,
    },
}

/// Ordered, finite sequence of viewpoints
pub struct ViewpointSource {
    mode: Mode,
}

impl ViewpointSource {
    /// Replay a fixed list in order
    pub fn explicit(viewpoints: Vec<Viewpoint>) -> Result<Self> {
        if viewpoints.is_empty() {
            return Err(Error::Precondition(
                "explicit viewpoint list must not be empty".to_string(),
            ));
        }
        if let Some(bad) = viewpoints
            .iter()
            .find(|v| !v.as_array().iter().all(|a| a.is_finite()))
        {
            return Err(Error::Precondition(format!(
                "viewpoint angles must be finite, got {:?}",
                bad
            )));
        }

        Ok(Self {
            mode: Mode::Explicit(viewpoints),
        })
    }

    /// Draw `count` viewpoints from `rng`, lazily
    pub fn generated<R>(count: usize, rng: R) -> Result<Self>
    where
        R: RngCore + 'static,
    {
        if count == 0 {
            return Err(Error::Precondition(
                "viewpoint count must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            mode: Mode::Generated {
                count,
                rng: Box::new(rng),
                angles: Uniform::new(0.0, TAU),
            },
        })
    }

    /// Validate a request. Generated sources use `seed` when given, entropy otherwise.
    pub fn from_request(request: &ViewpointRequest, seed: Option<u64>) -> Result<Self> {
        match request {
            ViewpointRequest::Count(count) => {
                let count = usize::try_from(*count)
                    .ok()
                    .filter(|c| *c > 0)
                    .ok_or_else(|| {
                        Error::Precondition(format!(
                            "viewpoint count must be a positive integer, got {}",
                            count
                        ))
                    })?;
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                Self::generated(count, rng)
            }
            ViewpointRequest::Explicit(list) => {
                let viewpoints = list
                    .iter()
                    .enumerate()
                    .map(|(i, angles)| {
                        Viewpoint::from_slice(angles).map_err(|e| match e {
                            Error::Precondition(msg) => {
                                Error::Precondition(format!("viewpoint {}: {}", i, msg))
                            }
                            other => other,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::explicit(viewpoints)
            }
            ViewpointRequest::Malformed(value) => Err(Error::Precondition(format!(
                "viewpoints must be a positive integer or a list of [x, y, z] angles, got {}",
                value
            ))),
        }
    }

    pub fn len(&self) -> usize {
        match &self.mode {
            Mode::Explicit(list) => list.len(),
            Mode::Generated { count, .. } => *count,
        }
    }

    /// Never true for a constructed source
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.mode, Mode::Generated { .. })
    }

    /// The `index`-th viewpoint.
    ///
    /// Generated sources draw fresh angles on every call, so each index must
    /// be consumed once per session.
    pub fn next(&mut self, index: usize) -> Result<Viewpoint> {
        if index >= self.len() {
            return Err(Error::InvalidData(format!(
                "viewpoint index {} out of range for {} viewpoints",
                index,
                self.len()
            )));
        }

        match &mut self.mode {
            Mode::Explicit(list) => Ok(list[index]),
            Mode::Generated { rng, angles, .. } => Ok(Viewpoint::new(
                angles.sample(rng),
                angles.sample(rng),
                angles.sample(rng),
            )),
        }
    }
}

impl fmt::Debug for ViewpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Mode::Explicit(list) => f.debug_tuple("Explicit").field(list).finish(),
            Mode::Generated { count, .. } => {
                f.debug_struct("Generated").field("count", count).finish()
            }
        }
    }
}
