//! Rotation Replay Example
//!
//! Replays precomputed quaternion sequences offline, then spins the same
//! slots live inside a scoped session.
//!
//! ```text
//! cargo run -p rotview-demos --bin rotation_replay -- --slots 3 --order wxyz
//! cargo run -p rotview-demos --bin rotation_replay -- --headless --frames 30
//! ```

use anyhow::Context;
use clap::Parser;
use nalgebra::{UnitQuaternion, Vector3};
use rotview_core::{AxisOrder, Quat, IDENTITY};
use rotview_visualization::{
    DebugText, HeadlessBackend, RotationViewer, ViewerConfig, VisualBackend, WindowBackend,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Replay and live-stream quaternion rotations")]
struct Args {
    /// Number of objects shown side by side
    #[arg(long)]
    slots: Option<usize>,

    /// Replay and live frame rate
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Frames per replayed sequence
    #[arg(long, default_value_t = 60)]
    frames: usize,

    /// Component order of the generated quaternions (xyzw or wxyz)
    #[arg(long)]
    order: Option<AxisOrder>,

    /// Asset shown in every slot
    #[arg(long)]
    asset: Option<String>,

    /// TOML viewer configuration; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against the in-memory backend instead of opening a window
    #[arg(long)]
    headless: bool,
}

/// End orientations of the replayed sequences, in xyzw order
const TARGETS: [Quat; 2] = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    if args.headless {
        run(HeadlessBackend::new(), config, &args)
    } else {
        run(WindowBackend::new(), config, &args)
    }
}

fn build_config(args: &Args) -> anyhow::Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig {
            slot_count: 2,
            asset: "builtin:box".to_string(),
            asset_scale: 6.0,
            ..ViewerConfig::default()
        },
    };
    if let Some(slots) = args.slots {
        config.slot_count = slots;
    }
    if let Some(order) = args.order {
        config.axis_order = order;
    }
    if let Some(asset) = &args.asset {
        config.asset = asset.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run<B: VisualBackend>(backend: B, config: ViewerConfig, args: &Args) -> anyhow::Result<()> {
    let order = config.axis_order;
    let slot_count = config.slot_count;
    let mut viewer = RotationViewer::new(backend, config)?;

    let sequences: Vec<Vec<Quat>> = (0..slot_count)
        .map(|slot| {
            interpolate(IDENTITY, TARGETS[slot % TARGETS.len()], args.frames)
                .into_iter()
                .map(|q| in_order(q, order))
                .collect()
        })
        .collect();

    let report = viewer.replay_offline(&sequences, args.fps)?;
    println!(
        "Replayed {} frames in {:.2}s ({} over budget)",
        report.frames,
        report.elapsed.as_secs_f64(),
        report.overruns
    );

    let frame = Duration::from_secs_f32(1.0 / args.fps);
    viewer.with_session(|viewer| {
        viewer.show_text(DebugText::new("live").color([1.0, 0.9, 0.2]))?;
        for step in 0..args.frames {
            let angle = step as f32 / args.frames.max(1) as f32 * std::f32::consts::TAU;
            let qs: Vec<Quat> = (0..slot_count)
                .map(|slot| {
                    let axis = if slot % 2 == 0 { Vector3::y_axis() } else { Vector3::z_axis() };
                    let q = UnitQuaternion::from_axis_angle(&axis, angle);
                    in_order([q.i, q.j, q.k, q.w], order)
                })
                .collect();
            viewer.update_all(&qs)?;
            std::thread::sleep(frame);
        }
        Ok(())
    })?;

    println!("Done");
    Ok(())
}

/// Normalized linear interpolation from `from` to `to` over `steps` frames
fn interpolate(from: Quat, to: Quat, steps: usize) -> Vec<Quat> {
    (0..steps)
        .map(|i| {
            let t = if steps > 1 { i as f32 / (steps - 1) as f32 } else { 1.0 };
            let q = UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
                from[3] + (to[3] - from[3]) * t,
                from[0] + (to[0] - from[0]) * t,
                from[1] + (to[1] - from[1]) * t,
                from[2] + (to[2] - from[2]) * t,
            ));
            [q.i, q.j, q.k, q.w]
        })
        .collect()
}

/// Rewrite an xyzw quaternion in the viewer's input order
fn in_order([x, y, z, w]: Quat, order: AxisOrder) -> Quat {
    match order {
        AxisOrder::Xyzw => [x, y, z, w],
        AxisOrder::Wxyz => [w, x, y, z],
    }
}
