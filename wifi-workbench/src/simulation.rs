use crate::config::cli::MobilityOpt;
use crate::config::{MobilityConfig, load_json};
use crate::util::{
    print_final_positions, print_network, print_outcomes, print_proximity, print_timeline,
    print_trace_stats, secs,
};
use anyhow::{Context, bail};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use wifi_emulator::async_rt;
use wifi_emulator::mobility::MobilityScheduler;
use wifi_emulator::network::WirelessNetwork;
use wifi_emulator::network::node::MobileNode;
use wifi_emulator::trace::tracer::MobilityTracer;

/// Lateness tolerated when running against the wall clock, where timers fire a bit late
const REAL_TIME_ALLOWED_LATENESS: Duration = Duration::from_millis(50);

pub async fn run_and_report(options: &MobilityOpt) -> anyhow::Result<()> {
    let config = MobilityConfig {
        network_graph: load_json(&options.network.network_graph)?,
        mobility: load_json(&options.mobility)?,
    };

    println!("--- Params ---");
    println!("* Network graph path: {}", options.network.network_graph.display());
    println!("* Mobility path: {}", options.mobility.display());
    println!(
        "* Clock: {}",
        if options.real_time { "real" } else { "virtual" }
    );
    if let Some(stop_after_ms) = options.stop_after_ms {
        println!("* Stop after: {stop_after_ms} ms");
    }

    let network = WirelessNetwork::initialize(config.network_graph.into())
        .context("failed to initialize network")?;
    print_network(&network);

    let tracer = Arc::new(MobilityTracer::new());
    let mut scheduler = MobilityScheduler::new(tracer.clone());

    println!("--- Trajectories ---");
    for trajectory_json in &config.mobility.trajectories {
        let node_id = trajectory_json.node.as_str();
        let initial_position = network
            .node(node_id)
            .map(|n| n.position())
            .unwrap_or_default();
        let trajectory = trajectory_json.to_trajectory(initial_position);

        scheduler
            .schedule_by_id(&network, node_id, trajectory.clone())
            .with_context(|| format!("failed to schedule trajectory for node `{node_id}`"))?;

        let steps = trajectory
            .validate()
            .map(|intervals| trajectory.applied_steps(intervals))
            .unwrap_or_default();
        println!(
            "* {node_id}: {:.2} -> {:.2} from {} to {} ({steps} steps every {} ms)",
            trajectory.start,
            trajectory.end,
            secs(trajectory.start_delay),
            secs(trajectory.end_offset()),
            trajectory.step_interval.as_millis()
        );
    }

    if let Some(stop_after_ms) = options.stop_after_ms {
        let stop_signal = scheduler.stop_signal();
        async_rt::spawn(async move {
            async_rt::time::sleep(Duration::from_millis(stop_after_ms)).await;
            tracing::info!("stopping all trajectories");
            stop_signal.cancel();
        });
    }

    let deadline = scheduler
        .deadline()
        .map(|d| d.duration_since(tracer.simulation_start()));
    let report = scheduler.join().await;
    let finished_at = tracer.elapsed();

    let stepper = tracer.stepper();
    print_timeline(&stepper);
    print_outcomes(&report);
    if let Some(deadline) = deadline {
        println!(
            "* All trajectories done at {} (deadline {})",
            secs(finished_at),
            secs(deadline)
        );
    }

    print_final_positions(&network);
    print_proximity(&network);

    println!("--- Replay log ---");
    let json_steps = serde_json::to_vec_pretty(&stepper.steps())
        .context("failed to serialize replay log")?;
    fs::write(&options.replay_log, json_steps).context("failed to store replay log")?;
    println!("* Replay log available at {}", options.replay_log.display());

    let allowed_lateness = match options.allowed_lateness_ms {
        Some(ms) => Duration::from_millis(ms),
        None if options.real_time => REAL_TIME_ALLOWED_LATENESS,
        None => Duration::ZERO,
    };
    let verified = tracer
        .verifier(allowed_lateness)
        .verify()
        .context("failed to verify mobility trace")?;
    print_trace_stats(&verified);

    let failures = report.failures().count();
    if failures > 0 {
        bail!("{failures} trajectories failed");
    }

    Ok(())
}
