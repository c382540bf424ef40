mod render;
mod report;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;

use netsync::{LinkConditions, SyncConfig};
use server::ServerConfig;
use session::{Session, SessionConfig};

#[derive(Parser)]
#[command(name = "netsync-client")]
#[command(about = "Headless prediction and interpolation demo against a simulated server")]
struct Args {
    #[arg(long, help = "Apply snapshots as they arrive, without buffering")]
    naive: bool,

    #[arg(long, help = "Drive the local player from the snapshot timeline")]
    no_prediction: bool,

    #[arg(long, help = "Disable per-frame smoothing of interpolated positions")]
    no_smoothing: bool,

    #[arg(long, default_value_t = 100.0, help = "Render delay behind server time in ms")]
    offset_ms: f64,

    #[arg(long, default_value_t = 2.0, help = "Seconds of snapshots kept for interpolation")]
    buffer_secs: f64,

    #[arg(long, default_value_t = 60, help = "Simulation steps per second")]
    tick_rate: u32,

    #[arg(long, default_value_t = 60, help = "Server rate the snapshot buffer is sized for")]
    assumed_frame_rate: u32,

    #[arg(long, default_value_t = 144)]
    fps: u32,

    #[arg(short, long, default_value_t = 10.0, help = "Simulated seconds to run")]
    duration: f64,

    #[arg(short, long, default_value_t = 2)]
    bots: usize,

    #[arg(long, default_value_t = 3, help = "Server ticks between snapshots")]
    snapshot_interval: u32,

    #[arg(long, default_value_t = 0.0, help = "Packet loss percentage (0-100)")]
    loss_percent: f32,

    #[arg(long, default_value_t = 0, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 0, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let timestep = 1.0 / args.tick_rate.max(1) as f64;

    let sync = SyncConfig {
        network_offset_ms: args.offset_ms,
        network_buffer_size: args.buffer_secs,
        simulation_timestep: timestep,
        assumed_frame_rate: args.assumed_frame_rate,
        naive_approach: args.naive,
        client_prediction: !args.no_prediction,
        client_smoothing: !args.no_smoothing,
        ..Default::default()
    };

    let config = SessionConfig {
        server: ServerConfig {
            tick_rate: args.tick_rate,
            snapshot_interval: args.snapshot_interval,
            bot_count: args.bots,
            move_speed: sync.move_speed,
            input_timestep: timestep,
        },
        sync,
        link: LinkConditions {
            loss_percent: args.loss_percent,
            min_latency_ms: args.min_latency,
            max_latency_ms: args.max_latency.max(args.min_latency),
            jitter_ms: args.jitter,
        },
        duration: args.duration,
        frame_rate: args.fps,
        seed: args.seed,
    };

    let report = Session::new(config)?.run()?;
    log::info!("Session finished");
    println!("{}", report);

    Ok(())
}
