use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct CliOpt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move the network's nodes along their trajectories and report where they went
    Mobility(MobilityOpt),
    /// Write an OLSR daemon configuration file for every node taking part in ad-hoc links
    OlsrConfig(OlsrConfigOpt),
    /// Summarize the throughput measured by an iperf3 JSON report
    IperfSummary(IperfSummaryOpt),
}

#[derive(Parser, Debug, Clone)]
pub struct NetworkOpt {
    /// Path to the JSON file containing the network graph
    #[arg(long)]
    pub network_graph: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct MobilityOpt {
    #[command(flatten)]
    pub network: NetworkOpt,

    /// Path to the JSON file containing the trajectories
    #[arg(long)]
    pub mobility: PathBuf,

    /// Run against the wall clock, instead of the default virtual clock that skips idle periods
    #[arg(long)]
    pub real_time: bool,

    /// Where the replay log of the run should be stored
    #[arg(long, default_value = "replay-log.json")]
    pub replay_log: PathBuf,

    /// Stop all trajectories after this many milliseconds, even if they have not finished
    #[arg(long)]
    pub stop_after_ms: Option<u64>,

    /// How late a step may be applied before the run is considered invalid
    ///
    /// Defaults to 0 for virtual time and to 50 ms for real time
    #[arg(long)]
    pub allowed_lateness_ms: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct OlsrConfigOpt {
    #[command(flatten)]
    pub network: NetworkOpt,

    /// The directory where the configuration files will be written
    #[arg(long)]
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct IperfSummaryOpt {
    /// Path to the output of `iperf3 -J`
    #[arg(long)]
    pub report: PathBuf,
}
