//! Visual render options and the overlay applied to them

use multiview_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub type Color = [f32; 3];

pub const WHITE: Color = [1.0, 1.0, 1.0];

/// How triangle interiors are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    /// Unlit, every face filled with the mesh color
    Flat,
    /// Lambert lighting with interpolated vertex normals
    Smooth,
}

impl FromStr for Shading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" | "color" => Ok(Shading::Flat),
            "smooth" => Ok(Shading::Smooth),
            other => Err(Error::Precondition(format!(
                "unknown shading '{}', expected 'flat' or 'smooth'",
                other
            ))),
        }
    }
}

/// Visual attributes a backend session renders with.
///
/// `Default` is the backend's own built-in configuration, which differs from
/// [`RenderOptionSet::Defaults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub background: Color,
    pub show_back_face: bool,
    pub show_wireframe: bool,
    pub shading: Shading,
    pub mesh_color: Color,
    pub wireframe_color: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: [0.1, 0.1, 0.1],
            show_back_face: false,
            show_wireframe: false,
            shading: Shading::Smooth,
            mesh_color: [0.8, 0.8, 0.8],
            wireframe_color: [0.1, 0.1, 0.1],
        }
    }
}

/// One typed assignment to a [`RenderSettings`] attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOption {
    Background(Color),
    ShowBackFace(bool),
    ShowWireframe(bool),
    Shading(Shading),
    MeshColor(Color),
    WireframeColor(Color),
}

impl RenderOption {
    /// Every recognized option name
    pub const NAMES: &'static [&'static str] = &[
        "background",
        "show-back-face",
        "show-wireframe",
        "shading",
        "mesh-color",
        "wireframe-color",
    ];

    /// Parse a named option; unknown names and ill-typed values are rejected
    pub fn parse(name: &str, value: &Value) -> Result<Self> {
        let option = match name {
            "background" => RenderOption::Background(color(name, value)?),
            "show-back-face" => RenderOption::ShowBackFace(boolean(name, value)?),
            "show-wireframe" => RenderOption::ShowWireframe(boolean(name, value)?),
            "shading" => match value {
                Value::String(s) => RenderOption::Shading(s.parse()?),
                _ => return Err(invalid(name, value, "\"flat\" or \"smooth\"")),
            },
            "mesh-color" => RenderOption::MeshColor(color(name, value)?),
            "wireframe-color" => RenderOption::WireframeColor(color(name, value)?),
            _ => {
                return Err(Error::Precondition(format!(
                    "unknown render option '{}', expected one of: {}",
                    name,
                    Self::NAMES.join(", ")
                )))
            }
        };
        Ok(option)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderOption::Background(_) => "background",
            RenderOption::ShowBackFace(_) => "show-back-face",
            RenderOption::ShowWireframe(_) => "show-wireframe",
            RenderOption::Shading(_) => "shading",
            RenderOption::MeshColor(_) => "mesh-color",
            RenderOption::WireframeColor(_) => "wireframe-color",
        }
    }

    /// Assign this option to its attribute
    pub fn apply(&self, settings: &mut RenderSettings) {
        match *self {
            RenderOption::Background(c) => settings.background = c,
            RenderOption::ShowBackFace(b) => settings.show_back_face = b,
            RenderOption::ShowWireframe(b) => settings.show_wireframe = b,
            RenderOption::Shading(s) => settings.shading = s,
            RenderOption::MeshColor(c) => settings.mesh_color = c,
            RenderOption::WireframeColor(c) => settings.wireframe_color = c,
        }
    }
}

impl fmt::Display for RenderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderOption::Background(c) | RenderOption::MeshColor(c) | RenderOption::WireframeColor(c) => {
                write!(f, "{}={:?}", self.name(), c)
            }
            RenderOption::ShowBackFace(b) | RenderOption::ShowWireframe(b) => write!(f, "{}={}", self.name(), b),
            RenderOption::Shading(s) => write!(f, "{}={:?}", self.name(), s),
        }
    }
}

fn invalid(name: &str, value: &Value, expected: &str) -> Error {
    Error::Precondition(format!(
        "render option '{}' expects {}, got {}",
        name, expected, value
    ))
}

fn boolean(name: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| invalid(name, value, "a boolean"))
}

fn color(name: &str, value: &Value) -> Result<Color> {
    let expected = "an [r, g, b] array with components in [0, 1]";
    let components = value
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| invalid(name, value, expected))?;

    let mut rgb = [0.0f32; 3];
    for (slot, component) in rgb.iter_mut().zip(components) {
        *slot = component
            .as_f64()
            .filter(|c| (0.0..=1.0).contains(c))
            .ok_or_else(|| invalid(name, value, expected))? as f32;
    }
    Ok(rgb)
}

/// Split `name=value`, reading the value as JSON or else as a bare string
pub fn parse_pair(pair: &str) -> Result<(&str, Value)> {
    let (name, raw) = pair
        .split_once('=')
        .ok_or_else(|| Error::Precondition(format!("render option '{}' is not of the form name=value", pair)))?;
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.trim(), value))
}

/// Overlay applied to a session's [`RenderSettings`].
///
/// Overrides replace the defaults wholesale: any attribute not listed keeps
/// the backend's built-in value, not the value `Defaults` would have set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RenderOptionSet {
    /// White background, back faces and wireframe shown, flat shading
    #[default]
    Defaults,
    Overrides(Vec<RenderOption>),
}

impl RenderOptionSet {
    /// The options `Defaults` stands for
    pub fn default_options() -> Vec<RenderOption> {
        vec![
            RenderOption::Background(WHITE),
            RenderOption::ShowBackFace(true),
            RenderOption::ShowWireframe(true),
            RenderOption::Shading(Shading::Flat),
        ]
    }

    /// Build overrides from a JSON object; `None` means the defaults
    pub fn from_map(map: Option<&Map<String, Value>>) -> Result<Self> {
        match map {
            None => Ok(RenderOptionSet::Defaults),
            Some(map) => map
                .iter()
                .map(|(name, value)| RenderOption::parse(name, value))
                .collect::<Result<Vec<_>>>()
                .map(RenderOptionSet::Overrides),
        }
    }

    /// Build overrides from `name=value` strings.
    ///
    /// Values are read as JSON, falling back to a plain string so that
    /// `shading=flat` works without quoting.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs
            .into_iter()
            .map(|pair| {
                let (name, value) = parse_pair(pair.as_ref())?;
                RenderOption::parse(name, &value)
            })
            .collect::<Result<Vec<_>>>()
            .map(RenderOptionSet::Overrides)
    }

    /// The options this set assigns, in order
    pub fn options(&self) -> Vec<RenderOption> {
        match self {
            RenderOptionSet::Defaults => Self::default_options(),
            RenderOptionSet::Overrides(options) => options.clone(),
        }
    }

    pub fn apply(&self, settings: &mut RenderSettings) {
        for option in self.options() {
            log::debug!("render option {}", option);
            option.apply(settings);
        }
    }
}
