//! Scroll-driven parallax layers
//!
//! Each configured layer gets one channel whose target is the scroll offset
//! scaled by the layer's speed. For every scroll stop the layers are ticked
//! until all of them settle.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::config::SettleConfig;
use crate::Format;

/// One layer's outcome at a scroll stop
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayerOffset {
    pub layer: String,
    pub offset: f32,
    pub target: f32,
}

/// All layers after settling at one scroll offset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScrollStop {
    pub scroll: f32,
    pub ticks: usize,
    pub settled: bool,
    pub layers: Vec<LayerOffset>,
}

/// Layers translate against the scroll direction.
fn layer_target(scroll: f32, speed: f32) -> f32 {
    -scroll * speed
}

pub fn run(config: &SettleConfig, scroll: &[f32], ticks_per_stop: usize) -> Result<Vec<ScrollStop>> {
    if config.layers.is_empty() {
        anyhow::bail!("No [[layers]] configured");
    }

    let mut settler = config.settler::<String>()?;
    for layer in &config.layers {
        if settler.register_channel(layer.name.clone(), 0.0)? {
            tracing::warn!("Layer {:?} is listed twice; keeping the last entry", layer.name);
        }
    }

    let mut stops = Vec::with_capacity(scroll.len());
    for &offset in scroll {
        for layer in &config.layers {
            settler
                .set_target(&layer.name, layer_target(offset, layer.speed))
                .with_context(|| format!("Bad target for layer {:?} at scroll {}", layer.name, offset))?;
        }

        let mut ticks = 0;
        while settler.has_active_channels() && ticks < ticks_per_stop {
            settler.step()?;
            ticks += 1;
        }
        let settled = !settler.has_active_channels();
        if !settled {
            tracing::warn!("Scroll stop {} did not settle within {} ticks", offset, ticks_per_stop);
        }

        let layers = settler
            .channels()
            .map(|(name, channel)| LayerOffset {
                layer: name.clone(),
                offset: channel.current(),
                target: channel.target(),
            })
            .collect();
        stops.push(ScrollStop {
            scroll: offset,
            ticks,
            settled,
            layers,
        });
    }
    Ok(stops)
}

pub fn write(out: &mut impl Write, stops: &[ScrollStop], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, stops)?;
            writeln!(out)?;
        }
        Format::Table => {
            for stop in stops {
                let status = if stop.settled { "settled" } else { "moving" };
                writeln!(out, "scroll {:.1}: {} after {} ticks", stop.scroll, status, stop.ticks)?;
                for layer in &stop.layers {
                    writeln!(
                        out,
                        "  {:<16} {:>10.3}  (target {:.3})",
                        layer.layer, layer.offset, layer.target
                    )?;
                }
            }
        }
    }
    Ok(())
}
