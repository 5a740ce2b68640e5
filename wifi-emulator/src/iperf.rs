//! Summaries of iperf3 JSON reports (`iperf3 -J`)

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IperfReportError {
    #[error("the report is not valid iperf3 JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("iperf3 reported an error: {0}")]
    Iperf(String),
    #[error("the report has no final summary")]
    MissingSummary,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThroughputSummary {
    pub sent_mbps: f64,
    pub received_mbps: f64,
    /// Received bytes as a percentage of the sent bytes, zero when nothing was sent
    pub success_rate: f64,
    pub duration_secs: f64,
    pub sent_bytes: u64,
    pub received_bytes: u64,
}

#[derive(Deserialize)]
struct Report {
    end: Option<ReportEnd>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ReportEnd {
    sum_sent: Option<StreamSum>,
    sum_received: Option<StreamSum>,
}

#[derive(Deserialize)]
struct StreamSum {
    seconds: f64,
    bytes: u64,
    bits_per_second: f64,
}

impl ThroughputSummary {
    pub fn from_report_json(json: &str) -> Result<Self, IperfReportError> {
        let report: Report = serde_json::from_str(json)?;
        if let Some(error) = report.error {
            return Err(IperfReportError::Iperf(error));
        }

        // iperf3 leaves `end` empty when the test did not run to completion
        let Some(ReportEnd {
            sum_sent: Some(sent),
            sum_received: Some(received),
        }) = report.end
        else {
            return Err(IperfReportError::MissingSummary);
        };

        let success_rate = if sent.bytes > 0 {
            received.bytes as f64 / sent.bytes as f64 * 100.0
        } else {
            0.0
        };

        Ok(Self {
            sent_mbps: sent.bits_per_second / 1_000_000.0,
            received_mbps: received.bits_per_second / 1_000_000.0,
            success_rate,
            duration_secs: sent.seconds,
            sent_bytes: sent.bytes,
            received_bytes: received.bytes,
        })
    }
}
