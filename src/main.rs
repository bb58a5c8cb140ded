//! Weapon Uptime Calculator — CLI.

use ammo_uptime::advisory::review;
use ammo_uptime::compare::{compare_equipment, CompareSet};
use ammo_uptime::config::{
    load_profile, DEFAULT_BASE_AMMO, DEFAULT_FIRE_RATE, DEFAULT_FRAME_INTERVAL_MS,
    DEFAULT_RELOAD_SECS, DEFAULT_SIMULATION_SECONDS, DEFAULT_SPEED,
};
use ammo_uptime::model::{Equipment, WeaponConfig};
use ammo_uptime::report::{write_html_report, write_json_report};
use ammo_uptime::sim::driver::{DriveOutcome, FrameDriver};
use ammo_uptime::sim::frame::FrameStepper;
use ammo_uptime::sim::Phase;
use ammo_uptime::uptime::calculate_uptime;
use ammo_uptime::util::{ammo_bar, init_logging};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ammo-uptime")]
#[command(about = "Weapon Uptime Calculator (Magazine Cycle Model + Ammo Trajectory Simulator)")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct WeaponArgs {
    #[arg(long, value_name = "TOML", help = "Weapon profile file; flags below override it")]
    profile: Option<PathBuf>,
    #[arg(long, help = "Base magazine capacity")]
    ammo: Option<u32>,
    #[arg(long, help = "Fire rate in shots/sec")]
    fire_rate: Option<f64>,
    #[arg(long, value_name = "SECS", help = "Base reload time in seconds")]
    reload: Option<f64>,
    #[arg(long, help = "Wind-up weapon (2.55s for the first 47 shots of each magazine)")]
    wind_up: bool,
    #[arg(long, value_name = "PCT", help = "Max ammo bonus in percent")]
    ammo_bonus: Option<f64>,
    #[arg(long, value_enum)]
    equipment: Option<Equipment>,
}

#[derive(Subcommand)]
enum Commands {
    /// Steady-state uptime of one magazine cycle, with a calculation breakdown.
    Uptime {
        #[command(flatten)]
        weapon: WeaponArgs,
    },
    /// Simulate ammo over a fixed horizon for baseline and equipment variants.
    Simulate {
        #[command(flatten)]
        weapon: WeaponArgs,
        #[arg(long, default_value_t = DEFAULT_SIMULATION_SECONDS)]
        seconds: f64,
        #[arg(long, value_enum, default_value_t = CompareSet::Both)]
        compare: CompareSet,
        #[arg(long, value_name = "DIR", help = "Write report.json and html/index.html here")]
        out: Option<PathBuf>,
    },
    /// Run the simulator live against the wall clock.
    Live {
        #[command(flatten)]
        weapon: WeaponArgs,
        #[arg(long, default_value_t = 10.0, help = "Wall-clock seconds to run")]
        seconds: f64,
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: f64,
        #[arg(long, default_value_t = DEFAULT_FRAME_INTERVAL_MS)]
        interval_ms: u64,
        #[arg(long, value_name = "N", help = "Stop after N frames")]
        max_frames: Option<u64>,
    },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Uptime { weapon } => run_uptime(weapon),
        Commands::Simulate {
            weapon,
            seconds,
            compare,
            out,
        } => run_simulate(weapon, seconds, compare, out),
        Commands::Live {
            weapon,
            seconds,
            speed,
            interval_ms,
            max_frames,
        } => run_live(weapon, seconds, speed, interval_ms, max_frames),
    }
}

/// Build the weapon config from an optional profile plus flag overrides.
fn weapon_config(args: &WeaponArgs) -> Result<(String, WeaponConfig), String> {
    let (name, mut cfg) = match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            tracing::debug!("loaded profile {}", path.display());
            (profile.display_name().to_string(), profile.to_config())
        }
        None => (
            "weapon".to_string(),
            WeaponConfig::new(DEFAULT_BASE_AMMO, DEFAULT_FIRE_RATE, DEFAULT_RELOAD_SECS),
        ),
    };
    if let Some(ammo) = args.ammo {
        cfg.base_ammo = ammo;
    }
    if let Some(rate) = args.fire_rate {
        cfg.fire_rate = rate;
    }
    if let Some(reload) = args.reload {
        cfg.reload_time = reload;
    }
    if args.wind_up {
        cfg.wind_up = true;
    }
    if let Some(bonus) = args.ammo_bonus {
        cfg.ammo_bonus_pct = bonus;
    }
    if let Some(eq) = args.equipment {
        cfg = cfg.with_equipment(eq);
    }
    cfg.validate().map_err(|e| e.to_string())?;
    Ok((name, cfg))
}

fn run_uptime(args: WeaponArgs) -> Result<(), String> {
    let (name, cfg) = weapon_config(&args)?;
    let r = calculate_uptime(&cfg).map_err(|e| e.to_string())?;
    println!("Weapon: {}", name);
    println!("Uptime: {:.2}%", r.uptime);
    println!("Effective ammo: {} (base: {})", r.effective_shots, r.base_ammo);
    println!("Shooting time: {:.2}s", r.shooting_time);
    println!("Total magazine cycle: {:.2}s", r.total_time);
    println!("\nCalculation breakdown:");
    for line in r.breakdown(&cfg) {
        println!("  - {}", line);
    }
    print_advisories(&cfg)?;
    Ok(())
}

fn print_advisories(cfg: &WeaponConfig) -> Result<(), String> {
    let advisories = review(cfg).map_err(|e| e.to_string())?;
    if advisories.is_empty() {
        return Ok(());
    }
    println!("\nAdvisories:");
    for a in &advisories {
        println!("  [{}] {} — {}", a.code, a.severity.label(), a.summary);
    }
    Ok(())
}

fn run_simulate(
    args: WeaponArgs,
    seconds: f64,
    set: CompareSet,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let (name, cfg) = weapon_config(&args)?;
    let comparison = compare_equipment(&name, &cfg, seconds, set).map_err(|e| e.to_string())?;
    println!("Simulation results ({}s):", seconds);
    for v in &comparison.variants {
        println!(
            "  {}: {} shots, {:.2}s reloading, uptime {:.2}%",
            v.label, v.trajectory.total_shots, v.trajectory.reload_time, v.uptime.uptime
        );
    }
    if let Some(best) = comparison.best_by_shots() {
        println!("Most shots: {}", best.label);
    }

    if let Some(dir) = out {
        fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
        let json_path = dir.join("report.json");
        write_json_report(&comparison, &json_path)?;
        let html_dir = dir.join("html");
        write_html_report(&comparison, &html_dir)?;
        tracing::info!("wrote {} and {}", json_path.display(), html_dir.display());
    }
    Ok(())
}

fn run_live(
    args: WeaponArgs,
    seconds: f64,
    speed: f64,
    interval_ms: u64,
    max_frames: Option<u64>,
) -> Result<(), String> {
    let (name, cfg) = weapon_config(&args)?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("--seconds must be positive, got {}", seconds));
    }
    let budget = Duration::try_from_secs_f64(seconds).map_err(|e| format!("--seconds: {}", e))?;
    if max_frames == Some(0) {
        return Err("--max-frames must be at least 1".to_string());
    }
    let stepper = FrameStepper::new(&cfg, speed).map_err(|e| e.to_string())?;
    let mut driver = FrameDriver::new(stepper);
    let stop = driver.stop_handle();
    tracing::info!("live run: {} at {}x for {}s", name, speed, seconds);

    let mut last_phase: Option<Phase> = None;
    let mut frames_seen: u64 = 0;
    let outcome = driver.run_for(
        budget,
        Duration::from_millis(interval_ms),
        |r| {
            frames_seen += 1;
            if max_frames.is_some_and(|max| frames_seen >= max) {
                stop.stop();
            }
            if last_phase != Some(r.phase) {
                tracing::info!(
                    "{:>7.2}s  {}  {} {}/{}",
                    r.sample.time,
                    r.phase.label(),
                    ammo_bar(r.ammo, r.max_ammo, 30),
                    r.ammo,
                    r.max_ammo
                );
                last_phase = Some(r.phase);
            }
            if r.refund_occurred() {
                tracing::info!("{:>7.2}s  BASTION CUBE +{} AMMO", r.sample.time, r.refunded);
            }
            tracing::debug!(
                time = r.sample.time,
                phase = r.phase.label(),
                ammo = r.ammo,
                shots = r.total_shots,
                progress = r.progress.unwrap_or(0.0),
                "frame"
            );
        },
    );

    let state = driver.stepper().simulation().state();
    println!(
        "Time: {:.2}s  Shots fired: {}  Ammo: {}/{}",
        state.time,
        state.total_shots,
        state.ammo,
        driver.stepper().simulation().params().max_ammo
    );
    match outcome {
        DriveOutcome::Elapsed { frames } => {
            tracing::info!("{} frame(s), {} sample(s) kept", frames, driver.stepper().samples().len());
            Ok(())
        }
        DriveOutcome::Stopped { frames } => {
            println!("Stopped after {} frame(s)", frames);
            tracing::info!("{} sample(s) kept", driver.stepper().samples().len());
            Ok(())
        }
        DriveOutcome::Failed { frames, error } => {
            Err(format!("live run failed after {} frame(s): {}", frames, error))
        }
    }
}
