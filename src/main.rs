use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client_core::input::IdleDevice;
use client_core::telemetry::init_telemetry;
use data_runtime::ConfigSet;
use data_runtime::loader::data_root;
use data_runtime::world::{WorldLayout, load_world};
use sim_core::{FileStorage, Simulation, Storage};
use threec::script::InputScript;
use threec::verify::{TOLERANCE, record_and_replay, run_playback};

#[derive(Parser)]
#[command(author, version, about = "Third-person character/camera simulation", long_about = None)]
struct Cli {
    /// Data directory holding `config/` and `worlds/`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// World layout JSON (defaults to `<data-dir>/worlds/courtyard.json`)
    #[arg(long, global = true)]
    world: Option<PathBuf>,
    /// Run in open space, without a world layout
    #[arg(long, global = true)]
    no_world: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Drive the simulation from an input script
    Run {
        script: PathBuf,
        /// Idle frames to run after the script ends
        #[arg(long, default_value_t = 0)]
        settle: u32,
    },
    /// Record a script, replay it at another frame rate and compare
    Verify {
        script: PathBuf,
        #[arg(long, default_value_t = 1.0 / 24.0)]
        replay_frame_dt: f32,
    },
    /// Replay the saved session and write its telemetry CSV
    Export {
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame_dt: f32,
    },
}

struct Env {
    data_dir: PathBuf,
    cfg: ConfigSet,
    world: Option<WorldLayout>,
}

fn load_env(cli: &Cli) -> Result<Env> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(data_root);
    let cfg = ConfigSet::load_from(&data_dir)
        .with_context(|| format!("load config from {}", data_dir.display()))?;
    let world = if cli.no_world {
        None
    } else {
        let path = cli
            .world
            .clone()
            .unwrap_or_else(|| data_dir.join("worlds").join("courtyard.json"));
        Some(load_world(&path)?)
    };
    Ok(Env {
        data_dir,
        cfg,
        world,
    })
}

fn file_storage(env: &Env) -> Rc<dyn Storage> {
    Rc::new(FileStorage::new(env.data_dir.join(&env.cfg.sim.records_dir)))
}

fn run(env: &Env, script: &Path, settle: u32) -> Result<()> {
    let script = InputScript::load(script)?;
    let mut sim = Simulation::new(env.cfg.clone(), env.world.as_ref(), Some(file_storage(env)));
    let (mut dev, dts) = script.device();
    let mut dropped = 0.0f32;
    for dt in dts {
        dropped += sim.frame(&mut dev, dt).dropped_backlog;
    }
    for _ in 0..settle {
        dropped += sim.frame(&mut IdleDevice, script.frame_dt).dropped_backlog;
    }
    let s = sim.character().state();
    let c = sim.camera().state();
    println!(
        "threec: {} frames, {} ticks, mode {:?}",
        sim.frame_count(),
        sim.tick_count(),
        sim.mode()
    );
    println!(
        "  character pos ({:.3}, {:.3}, {:.3}) yaw {:.2} grounded {}",
        s.position.x, s.position.y, s.position.z, s.yaw_deg, s.grounded
    );
    println!(
        "  camera yaw {:.2} pitch {:.2} zoom {:.2}/{:.2}",
        c.yaw_deg, c.pitch_deg, c.zoom, c.target_zoom
    );
    if dropped > 0.0 {
        println!("  dropped backlog {:.1} ms", dropped * 1000.0);
    }
    Ok(())
}

fn verify(env: &Env, script: &Path, replay_frame_dt: f32) -> Result<()> {
    if !replay_frame_dt.is_finite() || replay_frame_dt <= 0.0 {
        bail!("--replay-frame-dt must be positive");
    }
    let script = InputScript::load(script)?;
    let report = record_and_replay(&env.cfg, env.world.as_ref(), &script, replay_frame_dt)?;
    println!(
        "threec: recorded {} ticks, replayed {} ticks, max diff {:.2e} (tolerance {:.0e})",
        report.recorded_ticks, report.replayed_ticks, report.max_diff, TOLERANCE
    );
    if !report.is_match() {
        match report.first_divergence {
            Some(i) => bail!("replay diverged at tick {i}"),
            None => bail!("replay tick count differs"),
        }
    }
    println!("threec: replay matches");
    Ok(())
}

fn export(env: &Env, frame_dt: f32) -> Result<()> {
    if !frame_dt.is_finite() || frame_dt <= 0.0 {
        bail!("--frame-dt must be positive");
    }
    let mut cfg = env.cfg.clone();
    cfg.sim.export_csv = true;
    let storage = FileStorage::new(env.data_dir.join(&cfg.sim.records_dir));
    let root = storage.root().to_path_buf();
    let mut sim = Simulation::new(cfg, env.world.as_ref(), Some(Rc::new(storage)));
    let ticks = run_playback(&mut sim, frame_dt)?;
    let name = sim_core::export::csv_file_name(
        sim.character().preset_name(),
        sim.camera().preset_name(),
    );
    let path = root.join(&name);
    if !path.is_file() {
        bail!("no CSV written; is there a session in {}?", root.display());
    }
    println!("threec: {ticks} ticks replayed, wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = load_env(&cli)?;
    init_telemetry(&env.cfg.telemetry);
    match &cli.cmd {
        Cmd::Run { script, settle } => run(&env, script, *settle),
        Cmd::Verify {
            script,
            replay_frame_dt,
        } => verify(&env, script, *replay_frame_dt),
        Cmd::Export { frame_dt } => export(&env, *frame_dt),
    }
}
