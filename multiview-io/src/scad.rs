//! OpenSCAD wrapper for converting `.scad` models into meshes.

use crate::IoError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Inputs forwarded to OpenSCAD on top of the source and output paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScadOptions {
    /// `-D name=value` overrides, value passed verbatim as an OpenSCAD expression
    pub variables: BTreeMap<String, String>,
    /// Customizer parameter file (`-p`)
    pub parameter_file: Option<PathBuf>,
    /// Parameter set inside the parameter file (`-P`)
    pub parameter_set: Option<String>,
}

impl ScadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn parameters(mut self, file: impl Into<PathBuf>, set: impl Into<String>) -> Self {
        self.parameter_file = Some(file.into());
        self.parameter_set = Some(set.into());
        self
    }

    /// Full argument list for `openscad`.
    ///
    /// The parameter file is only passed when a parameter set is named too.
    pub fn command_args(&self, scad_path: &Path, output_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            scad_path.into(),
            "-o".into(),
            output_path.into(),
        ];

        for (name, value) in &self.variables {
            args.push("-D".into());
            args.push(format!("{}={}", name, value).into());
        }

        if let (Some(file), Some(set)) = (&self.parameter_file, &self.parameter_set) {
            args.push("-p".into());
            args.push(file.into());
            args.push("-P".into());
            args.push(set.into());
        }

        args
    }
}

/// Runs the OpenSCAD command line to export models.
pub struct ScadConverter {
    binary: PathBuf,
}

impl ScadConverter {
    /// Use `openscad` from `PATH`
    pub fn new() -> Self {
        Self::with_binary("openscad")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Convert `scad_path` into `output_path`; the format follows the output extension.
    pub fn convert(
        &self,
        scad_path: &Path,
        output_path: &Path,
        options: &ScadOptions,
    ) -> Result<PathBuf, IoError> {
        if !scad_path.is_file() {
            return Err(IoError::FileNotFound {
                path: scad_path.display().to_string(),
            });
        }

        let args = options.command_args(scad_path, output_path);
        log::info!(
            "Running {} on {} -> {}",
            self.binary.display(),
            scad_path.display(),
            output_path.display()
        );

        let output = Command::new(&self.binary).args(&args).output()?;

        if !output.status.success() {
            return Err(IoError::ToolFailed {
                tool: self.binary.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output_path.to_path_buf())
    }
}

impl Default for ScadConverter {
    fn default() -> Self {
        Self::new()
    }
}
