use crate::config::cli::{CliOpt, Command, IperfSummaryOpt, OlsrConfigOpt};
use crate::config::load_json;
use crate::config::network::NetworkSpecJson;
use anyhow::Context;
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;
use wifi_emulator::async_rt;
use wifi_emulator::iperf::ThroughputSummary;
use wifi_emulator::network::WirelessNetwork;
use wifi_emulator::olsr::OlsrConfig;

mod config;
mod simulation;
mod util;

fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let options = CliOpt::parse();
    match &options.command {
        Command::Mobility(mobility_options) => {
            let rt = async_rt::new_rt(!mobility_options.real_time)
                .context("failed to initialize tokio")?;
            rt.block_on(simulation::run_and_report(mobility_options))
        }
        Command::OlsrConfig(olsr_options) => write_olsr_configs(olsr_options),
        Command::IperfSummary(iperf_options) => print_iperf_summary(iperf_options),
    }
}

fn write_olsr_configs(options: &OlsrConfigOpt) -> anyhow::Result<()> {
    let network_graph: NetworkSpecJson = load_json(&options.network.network_graph)?;
    let network = WirelessNetwork::initialize(network_graph.into())
        .context("failed to initialize network")?;

    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "failed to create output directory `{}`",
            options.output_dir.display()
        )
    })?;

    println!("--- OLSR configs ---");
    let adhoc_nodes = network.adhoc_nodes();
    if adhoc_nodes.is_empty() {
        println!("* No node takes part in an ad-hoc link, nothing to do");
    }

    let config = OlsrConfig::default();
    for node_id in adhoc_nodes {
        let interface = OlsrConfig::interface_name(&node_id);
        let path = options
            .output_dir
            .join(OlsrConfig::config_file_name(&node_id));
        fs::write(&path, config.render(&interface))
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        println!("* {node_id} ({interface}): {}", path.display());
    }

    Ok(())
}

fn print_iperf_summary(options: &IperfSummaryOpt) -> anyhow::Result<()> {
    let report = fs::read_to_string(&options.report)
        .with_context(|| format!("failed to read `{}`", options.report.display()))?;
    let summary = ThroughputSummary::from_report_json(&report)
        .context("failed to summarize iperf3 report")?;

    println!("--- TCP transfer ---");
    println!("* Duration: {:.2}s", summary.duration_secs);
    println!(
        "* Sent: {:.2} Mbps ({} bytes)",
        summary.sent_mbps, summary.sent_bytes
    );
    println!(
        "* Received: {:.2} Mbps ({} bytes)",
        summary.received_mbps, summary.received_bytes
    );
    println!("* Success rate: {:.2}%", summary.success_rate);

    Ok(())
}
