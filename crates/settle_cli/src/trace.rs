//! Single-channel trajectories

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::config::SettleConfig;
use crate::Format;

const CHANNEL: &str = "trace";

/// State of the traced channel after one tick
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Sample {
    pub tick: usize,
    pub value: f32,
    pub velocity: f32,
    pub settled: bool,
}

/// Drive one channel from `from` toward `to` for `ticks` ticks.
///
/// Without `dt` each tick is exactly one reference step.
pub fn run(
    config: &SettleConfig,
    from: f32,
    to: f32,
    ticks: usize,
    dt: Option<f32>,
) -> Result<Vec<Sample>> {
    let mut settler = config.settler::<&str>()?;
    settler.register_channel(CHANNEL, from)?;
    settler.set_target(&CHANNEL, to)?;

    tracing::info!(
        damping_ratio = settler.config().damping_ratio(),
        "Tracing {} -> {} over {} ticks",
        from,
        to,
        ticks
    );

    let mut samples = Vec::with_capacity(ticks);
    for tick in 1..=ticks {
        let result = match dt {
            Some(dt) => settler.tick(dt),
            None => settler.step(),
        };
        result.with_context(|| format!("Tick {tick} failed"))?;

        let channel = settler
            .channel(&CHANNEL)
            .context("Traced channel disappeared")?;
        samples.push(Sample {
            tick,
            value: channel.current(),
            velocity: channel.velocity(),
            settled: channel.is_settled(settler.config()),
        });
    }

    if let Some(first) = samples.iter().find(|s| s.settled) {
        tracing::info!("Settled after {} ticks", first.tick);
    } else {
        tracing::info!("Still moving after {} ticks", ticks);
    }
    Ok(samples)
}

pub fn write(out: &mut impl Write, samples: &[Sample], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, samples)?;
            writeln!(out)?;
        }
        Format::Table => {
            writeln!(out, "{:>5}  {:>12}  {:>12}  settled", "tick", "value", "velocity")?;
            for s in samples {
                writeln!(
                    out,
                    "{:>5}  {:>12.4}  {:>12.4}  {}",
                    s.tick, s.value, s.velocity, s.settled
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trace_starts_with_reference_step() {
        let samples = run(&SettleConfig::new(), 0.0, 100.0, 120, None).unwrap();
        assert_eq!(samples.len(), 120);
        assert!((samples[0].value - 8.0).abs() < 1e-4);
        assert!((samples[119].value - 100.0).abs() < 1.0);
    }

    #[test]
    fn settled_flag_sticks_once_reached() {
        let samples = run(&SettleConfig::new(), 10.0, -10.0, 200, None).unwrap();
        let first = samples.iter().position(|s| s.settled).unwrap();
        assert!(samples[first..].iter().all(|s| s.settled));
    }

    #[test]
    fn explicit_dt_is_validated() {
        assert!(run(&SettleConfig::new(), 0.0, 1.0, 1, Some(-1.0)).is_err());
    }

    #[test]
    fn table_has_header_and_one_row_per_tick() {
        let samples = run(&SettleConfig::new(), 0.0, 1.0, 3, None).unwrap();
        let mut buf = Vec::new();
        write(&mut buf, &samples, Format::Table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with(" tick"));
    }

    #[test]
    fn json_is_an_array_of_samples() {
        let samples = run(&SettleConfig::new(), 0.0, 1.0, 2, None).unwrap();
        let mut buf = Vec::new();
        write(&mut buf, &samples, Format::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert_eq!(parsed[0]["tick"], 1);
    }
}
