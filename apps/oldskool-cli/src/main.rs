use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use oldskool_assets::AssetBundle;
use oldskool_audio::{AudioStreamDecoder, ChipEngine, PcmReader, YmEngine};
use oldskool_common::consts::{SAMPLE_RATE, TICK_RATE_HZ};
use oldskool_kernel::{Demo, DemoOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oldskool-cli", about = "Headless tools for the oldskool demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Asset directory (font.png, logos, texture.png, music.ym)
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and how each asset resolved
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Run the demo headless and save one frame as PNG
    Render {
        /// Ticks to run before drawing
        #[arg(short, long, default_value = "120")]
        frames: u64,
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
        #[arg(long)]
        skip_intro: bool,
    },
    /// Render the music track to a WAV file
    Audio {
        #[arg(short, long, default_value = "10")]
        seconds: f64,
        #[arg(short, long, default_value = "music.wav")]
        out: PathBuf,
        /// Output gain in [0, 1]
        #[arg(long, default_value = "1.0")]
        volume: f64,
        /// Write headerless little-endian stereo PCM instead of WAV
        #[arg(long)]
        raw: bool,
        /// Track file to use instead of the asset directory's music.ym
        #[arg(long)]
        track: Option<PathBuf>,
    },
    /// Print a YM track's metadata
    Track {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { json } => info(&cli.assets, json),
        Commands::Render {
            frames,
            out,
            skip_intro,
        } => render(&cli.assets, frames, &out, skip_intro),
        Commands::Audio {
            seconds,
            out,
            volume,
            raw,
            track,
        } => {
            let data = match track {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => AssetBundle::from_dir(&cli.assets)?.music,
            };
            audio(&data, seconds, volume, raw, &out)
        }
        Commands::Track { file, json } => track(&file, json),
    }
}

fn info(assets: &Path, json: bool) -> anyhow::Result<()> {
    let bundle = AssetBundle::from_dir(assets)?;
    let images = bundle.decode_images();
    let track = match YmEngine::load(&bundle.music, SAMPLE_RATE) {
        Ok(engine) => Some(engine.info()),
        Err(e) => {
            tracing::warn!(error = %e, "music track unavailable");
            None
        }
    };
    if json {
        let report = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "images": images.report,
            "track": track,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("oldskool-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("common: {}", oldskool_common::crate_info());
    println!("render: {}", oldskool_render::crate_info());
    println!("audio: {}", oldskool_audio::crate_info());
    println!("assets: {}", oldskool_assets::crate_info());
    println!("kernel: {}", oldskool_kernel::crate_info());
    println!("asset dir: {}", assets.display());
    for r in &images.report {
        println!("  {:<18} {:?} {}x{}", r.file, r.origin, r.width, r.height);
    }
    match track {
        Some(t) => println!(
            "  music.ym           \"{}\" by {} ({} frames at {} Hz, {} ms)",
            t.title, t.author, t.frames, t.player_rate, t.duration_ms
        ),
        None => println!("  music.ym           unavailable"),
    }
    Ok(())
}

fn render(assets: &Path, frames: u64, out: &Path, skip_intro: bool) -> anyhow::Result<()> {
    let mut demo = Demo::from_dir(
        assets,
        DemoOptions {
            skip_intro,
            audio: false,
        },
    )?;
    tracing::info!(frames, skip_intro, "running demo headless");
    let dt = 1.0 / TICK_RATE_HZ;
    for _ in 0..frames {
        demo.update(dt);
    }
    let frame = demo.draw();
    image::save_buffer(
        out,
        frame.canvas.as_bytes(),
        frame.canvas.width(),
        frame.canvas.height(),
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(path = %out.display(), "frame written");
    println!(
        "Rendered tick {} ({:?}, fade {:.2}) to {}",
        demo.tick(),
        demo.phase(),
        demo.fade(),
        out.display()
    );
    demo.teardown();
    Ok(())
}

fn audio(data: &[u8], seconds: f64, volume: f64, raw: bool, out: &Path) -> anyhow::Result<()> {
    let decoder = Arc::new(AudioStreamDecoder::new(data, SAMPLE_RATE, false)?);
    decoder.set_volume(volume);
    let frames = (seconds.max(0.0) * SAMPLE_RATE as f64) as u64;
    let info = decoder.info().clone();
    tracing::info!(title = %info.title, frames, raw, "rendering audio");

    let mut reader = PcmReader::new(Arc::clone(&decoder)).take(frames * 4);
    if raw {
        let mut file = BufWriter::new(File::create(out)?);
        let written = std::io::copy(&mut reader, &mut file)?;
        println!("Wrote {} bytes of PCM to {}", written, out.display());
    } else {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(out, spec)?;
        let mut buf = [0u8; 4096];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            for pair in buf[..n].chunks_exact(2) {
                writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
            }
        }
        writer.finalize()?;
        println!("Wrote {:.1}s of \"{}\" to {}", seconds, info.title, out.display());
    }
    decoder.close();
    Ok(())
}

fn track(file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let info = YmEngine::load(&data, SAMPLE_RATE)?.info();
    tracing::debug!(file = %file.display(), "track parsed");
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("title:    {}", info.title);
        println!("author:   {}", info.author);
        println!("comment:  {}", info.comment);
        println!("frames:   {} at {} Hz", info.frames, info.player_rate);
        println!("duration: {} ms", info.duration_ms);
    }
    Ok(())
}
