use std::time::Duration;
use wifi_emulator::mobility::{MobilityReport, TrajectoryOutcome};
use wifi_emulator::network::WirelessNetwork;
use wifi_emulator::network::node::MobileNode;
use wifi_emulator::network::spec::{LinkKind, NodeKind};
use wifi_emulator::trace::stepper::MobilityStepper;
use wifi_emulator::trace::verifier::VerifiedTrace;

pub fn secs(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

pub fn print_network(network: &WirelessNetwork) {
    println!("--- Network ---");
    for node in network.nodes() {
        let kind = match node.kind() {
            NodeKind::Station => "station",
            NodeKind::AccessPoint => "access point",
        };
        print!("* {}: {kind} at {:.2}", node.id(), node.position());
        if let Some(address) = node.address() {
            print!(", address {address}");
        }
        if let Some(mac) = node.mac() {
            print!(", mac {mac}");
        }
        if let Some(range) = node.range() {
            print!(", range {range} m");
        }
        if let Some(antenna_gain) = node.antenna_gain() {
            print!(", antenna gain {antenna_gain} dBi");
        }
        if let Some(wifi) = node.wifi() {
            print!(
                ", ssid {} (mode {}, channel {})",
                wifi.ssid, wifi.mode, wifi.channel
            );
        }
        println!();
    }

    if !network.links().is_empty() {
        println!("* Links:");
    }
    for link in network.links() {
        match &link.kind {
            LinkKind::Wired => println!("  * {}: wired", link.id()),
            LinkKind::AdHoc(adhoc) => println!(
                "  * {}: ad-hoc (ssid {}, mode {}, channel {})",
                link.id(),
                adhoc.ssid,
                adhoc.mode,
                adhoc.channel
            ),
        }
    }

    if let Some(propagation) = network.propagation() {
        print!(
            "* Propagation: {} (exponent {}",
            propagation.model, propagation.exponent
        );
        if let Some(noise_threshold) = propagation.noise_threshold {
            print!(", noise threshold {noise_threshold} dBm");
        }
        if let Some(fading_coefficient) = propagation.fading_coefficient {
            print!(", fading coefficient {fading_coefficient}");
        }
        println!(")");
    }

    if let Some(area) = network.area() {
        println!("* Area: {} x {} m", area.max_x, area.max_y);
    }
}

pub fn print_timeline(stepper: &MobilityStepper) {
    println!("--- Timeline ---");
    for entry in stepper.timeline() {
        println!(
            "{} {} #{}: {:.2}",
            secs(entry.relative_time),
            entry.node_id,
            entry.step,
            entry.position
        );
    }
}

pub fn print_outcomes(report: &MobilityReport) {
    println!("--- Outcomes ---");
    for trajectory in &report.trajectories {
        let outcome = match &trajectory.outcome {
            TrajectoryOutcome::Completed => "completed".to_string(),
            TrajectoryOutcome::Stopped => "stopped".to_string(),
            TrajectoryOutcome::Failed(failure) => format!("failed ({failure})"),
        };
        println!(
            "* {}: {outcome} at {}, {} steps applied",
            trajectory.node_id,
            secs(trajectory.finished_at),
            trajectory.steps_applied
        );
    }
}

pub fn print_final_positions(network: &WirelessNetwork) {
    println!("--- Final positions ---");
    for (node_id, position) in network.positions() {
        println!("* {node_id}: {position:.2}");
    }
}

/// Lists, for every station, the access points covering it, and the state of every ad-hoc link
///
/// Purely geometric: a station is covered when it lies within the access point's range
pub fn print_proximity(network: &WirelessNetwork) {
    let access_points = network.access_points();
    let adhoc_links: Vec<_> = network
        .links()
        .iter()
        .filter(|l| matches!(l.kind, LinkKind::AdHoc(_)))
        .collect();

    if access_points.is_empty() && adhoc_links.is_empty() {
        return;
    }

    println!("--- Proximity ---");
    if !access_points.is_empty() {
        for station in network.stations() {
            let mut covering = Vec::new();
            for ap in &access_points {
                let distance = station.position().distance_to(&ap.position());
                if ap.range().is_some_and(|range| distance <= range) {
                    covering.push((distance, ap.id().clone()));
                }
            }

            covering.sort_by(|(d1, id1), (d2, id2)| d1.total_cmp(d2).then_with(|| id1.cmp(id2)));
            if covering.is_empty() {
                println!("* {}: not covered by any access point", station.id());
            } else {
                let covering: Vec<_> = covering
                    .iter()
                    .map(|(distance, id)| format!("{id} ({distance:.2} m)"))
                    .collect();
                println!("* {}: covered by {}", station.id(), covering.join(", "));
            }
        }
    }

    for link in adhoc_links {
        let (Some(source), Some(target)) = (network.node(&link.source), network.node(&link.target))
        else {
            continue;
        };

        let distance = source.position().distance_to(&target.position());
        let status = if network.in_range(&link.source, &link.target) {
            "in range"
        } else {
            "out of range"
        };
        println!("* {}: {distance:.2} m, {status}", link.id());
    }
}

pub fn print_trace_stats(verified: &VerifiedTrace) {
    println!("--- Trace verification ---");
    let mut stats: Vec<_> = verified.stats_by_node.iter().collect();
    stats.sort_unstable_by_key(|(id, _)| *id);
    for (node_id, stats) in stats {
        println!(
            "* {node_id}: {} steps applied, travelled {:.2} m, ended at {:.2}",
            stats.steps_applied, stats.distance_travelled, stats.last_position
        );
    }
}
