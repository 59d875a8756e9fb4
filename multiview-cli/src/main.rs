//! `multiview` command line tool

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, RenderArgs, ScadArgs};
use multiview_io::ScadConverter;
use multiview_render::{SessionConfig, SoftwareBackend};
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render(args) => render(&args),
        Command::Scad(args) => scad(&args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let config = args.session_config()?;
    render_with(&config, &args.mesh)
}

fn scad(args: &ScadArgs) -> Result<()> {
    let options = args.scad_options()?;
    let converter = ScadConverter::with_binary(&args.openscad);
    let mesh_path = converter
        .convert(&args.scad, &args.output, &options)
        .with_context(|| format!("failed to convert {}", args.scad.display()))?;
    println!("{}", mesh_path.display());

    if let Some(dir) = &args.render_to {
        render_with(&SessionConfig::new(dir), &mesh_path)?;
    }
    Ok(())
}

fn render_with(config: &SessionConfig, mesh: &Path) -> Result<()> {
    let mut renderer = config.build().context("invalid render configuration")?;
    let mut backend = SoftwareBackend::new();

    let report = renderer
        .render(&mut backend, mesh)
        .with_context(|| format!("failed to render {}", mesh.display()))?;

    log::info!(
        "camera at {:?} looking at {:?}, distance {:.3}",
        report.camera.eye(),
        report.camera.look_at,
        report.camera.distance
    );
    for frame in &report.frames {
        println!("{}", frame.display());
    }
    Ok(())
}
