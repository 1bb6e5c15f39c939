//! Rainvow - real-time rainbow audio spectrum visualizer
//!
//! Listens to the default input device (or a test signal when none is
//! available) and draws one coloured bar per frequency band.

use clap::Parser;
use std::io;
use std::ops::ControlFlow;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rainvow::audio::{open_frame_source, FrameRecorder, SourceInit};
use rainvow::cli::Args;
use rainvow::render::BarRenderer;
use rainvow::session::{Pacing, VisualizerSession};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they do not break the bar line on stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.visualizer_config();
    let mut session = VisualizerSession::new(config.clone())?;

    let kind = args.source_kind()?;
    let fallback = args.fallback_kind();
    let init = open_frame_source(&kind, &config.analysis, fallback);
    match &init {
        SourceInit::Capture(_) => info!("Source: {}", kind),
        SourceInit::Fallback { reason, .. } => warn!(
            "Could not open {} ({}); using {} test signal",
            kind, reason, fallback
        ),
    }
    let mut source = init.into_frames(fallback.build(&config.analysis));

    let mut recorder = args
        .recording_config()
        .map(|recording| FrameRecorder::create(&recording, config.analysis.sample_rate_hz))
        .transpose()?;

    let mut renderer = BarRenderer::new(args.render_config());
    let mut stdout = io::stdout().lock();
    let cycle_limit = args.cycles;

    info!(
        bands = config.analysis.band_count,
        block_size = config.analysis.block_size(),
        "Press Ctrl+C to stop"
    );

    let mut drawn = 0u64;
    let cycles = session.run(&mut source, Pacing::RealTime, |frame, bars| {
        if let Some(recorder) = recorder.as_mut() {
            recorder.record(frame)?;
        }
        renderer.render(&mut stdout, bars)?;
        drawn += 1;

        Ok(match cycle_limit {
            Some(limit) if drawn >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        })
    })?;

    if let Some(mut recorder) = recorder {
        recorder.finish()?;
    }
    renderer.finish(&mut stdout)?;
    info!(cycles, "Stopped");
    Ok(())
}
