use anyhow::Context;
use clap::Parser;
use generator::scenario::wall_clock_ms;
use report_bridge::bridge::ReportBridge;
use report_bridge::model::ReportModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod report_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic earthquake hypocenter workflow driver")]
struct Args {
    /// Locate the configured scenario once and append a summary report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Search resolution, 0 (coarse) to 100 (dense)
    #[arg(long, default_value_t = 40.0)]
    resolution: f64,
    #[arg(long, default_value_t = 1000.0)]
    tolerance_ms: f64,
    #[arg(long, default_value_t = 5)]
    min_stations: usize,
    /// Disable data-parallel search
    #[arg(long, default_value_t = false)]
    sequential: bool,
    /// Keep the report bridge alive and sweep the record pool every second
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 9000)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.resolution,
            args.tolerance_ms,
            args.min_stations,
            !args.sequential,
        )
    };

    let runner = Arc::new(Runner::new(workflow_config.clone()).context("creating workflow runner")?);
    let bridge = ReportBridge::new(runner.clone());

    if args.offline {
        let result = runner
            .execute(&workflow_config.scenario)
            .context("running offline scenario")?;

        println!(
            "Offline run -> earthquakes {}, searches {}, {} ms",
            result.earthquake_count(),
            result.metrics.searches,
            result.elapsed_ms
        );
        for line in &result.outcomes {
            println!("  {}", line);
        }
        bridge.publish(ReportModel::from_result(&result, 0));
        bridge.publish_status("Offline workflow results ready.");

        let mut report = String::new();
        for quake in &result.earthquakes {
            report.push_str(&format!(
                "earthquake={} lat={:.4} lon={:.4} depth={:.1} origin={} mag={:.2} confidence={:.0}\n",
                quake.id,
                quake.lat,
                quake.lon,
                quake.depth_km,
                quake.origin_ms,
                quake.magnitude,
                quake.confidence_pct
            ));
        }
        let report_path = PathBuf::from("tools/data/offline_hypocenters.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        bridge.spawn(SocketAddr::from(([127, 0, 0, 1], args.port)));
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the lifecycle sweep")?;
        runtime.block_on(async {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let archived = runner.sweep(wall_clock_ms());
                        bridge.record_archived(archived);
                    }
                    result = signal::ctrl_c() => {
                        result.context("awaiting Ctrl+C to exit")?;
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
