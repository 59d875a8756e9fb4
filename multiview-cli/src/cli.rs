//! Command line arguments and their translation into session settings

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use multiview_io::ScadOptions;
use multiview_render::{parse_pair, SessionConfig, ViewpointRequest};
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "multiview", version, about = "Render meshes from multiple viewpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a mesh file into one image per viewpoint
    Render(RenderArgs),
    /// Convert an OpenSCAD model to a mesh, optionally rendering it
    Scad(ScadArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Mesh to render (stl, obj or ply)
    pub mesh: PathBuf,

    /// Folder receiving angle_<i>.<ext> images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of random viewpoints
    #[arg(long, conflicts_with = "viewpoints")]
    pub angles: Option<i64>,

    /// Explicit rotations in radians, e.g. "0,0,0;3.14159,0,0"
    #[arg(long)]
    pub viewpoints: Option<String>,

    /// Seed for random viewpoints
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render option override, repeatable
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// JSON object of render option overrides
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Request a visible window
    #[arg(long)]
    pub visible: bool,

    /// Image extension (png, jpg or bmp)
    #[arg(long)]
    pub format: Option<String>,

    /// JSON session configuration; flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl RenderArgs {
    /// Merge the flags over the optional configuration file
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => match &self.output {
                Some(output) => SessionConfig::new(output),
                None => bail!("an output folder is required, pass -o or set output_folder in --config"),
            },
        };

        if let Some(output) = &self.output {
            config.output_folder = output.clone();
        }
        if let Some(count) = self.angles {
            config.viewpoints = ViewpointRequest::Count(count);
        }
        if let Some(viewpoints) = &self.viewpoints {
            config.viewpoints = viewpoints.parse().context("invalid --viewpoints")?;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(map) = self.render_options()? {
            config.render_options = Some(map);
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if self.visible {
            config.window.visible = true;
        }
        if let Some(format) = &self.format {
            config.image_format = format.clone();
        }

        Ok(config)
    }

    /// Overrides from `--options` with `--set` pairs layered on top
    fn render_options(&self) -> Result<Option<Map<String, Value>>> {
        let mut map = match &self.options {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let value: Value = serde_json::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                match value {
                    Value::Object(map) => Some(map),
                    _ => bail!("{} must contain a JSON object", path.display()),
                }
            }
            None => None,
        };

        for pair in &self.set {
            let (name, value) = parse_pair(pair)?;
            map.get_or_insert_with(Map::new).insert(name.to_string(), value);
        }

        Ok(map)
    }
}

#[derive(Debug, Args)]
pub struct ScadArgs {
    /// OpenSCAD model
    pub scad: PathBuf,

    /// Exported mesh; its extension selects the format
    pub output: PathBuf,

    /// Variable assignment passed to OpenSCAD, repeatable
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub define: Vec<String>,

    /// Customizer parameter file
    #[arg(long, requires = "parameter_set")]
    pub parameter_file: Option<PathBuf>,

    /// Parameter set within --parameter-file
    #[arg(long, requires = "parameter_file")]
    pub parameter_set: Option<String>,

    /// OpenSCAD executable
    #[arg(long, default_value = "openscad")]
    pub openscad: PathBuf,

    /// Also render the converted mesh into this folder with default settings
    #[arg(long, value_name = "DIR")]
    pub render_to: Option<PathBuf>,
}

impl ScadArgs {
    pub fn scad_options(&self) -> Result<ScadOptions> {
        let mut options = ScadOptions::new();
        for define in &self.define {
            let Some((name, value)) = define.split_once('=') else {
                bail!("-D expects NAME=VALUE, got '{}'", define);
            };
            options = options.variable(name.trim(), value.trim());
        }
        if let (Some(file), Some(set)) = (&self.parameter_file, &self.parameter_set) {
            options = options.parameters(file, set);
        }
        Ok(options)
    }
}
