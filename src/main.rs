//! recap-audio CLI - narration post-production from the command line

use clap::{Parser, Subcommand};
use recap_audio::{
    audio::{load_wav, read_blob, read_wav_header},
    pipeline::{artifact_filename, Artifact},
    text::{clean_script, segment, to_srt},
    Config, Error, RecapPipeline, Result,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "recap-audio",
    about = "Speed, master and caption synthesized narration",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the render commands
#[derive(clap::Args)]
struct RenderArgs {
    /// Base64 PCM16 file from the speech synthesizer
    #[arg(short, long, conflicts_with = "wav")]
    input: Option<PathBuf>,

    /// Existing WAV file to re-master instead of a base64 blob
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Configuration file path (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playback speed (overrides config)
    #[arg(short, long)]
    speed: Option<f64>,

    /// Skip compressor and EQ (the limiter still runs)
    #[arg(long)]
    no_mastering: bool,

    /// Fit the narration to this many seconds (overrides speed)
    #[arg(long)]
    sync_to: Option<f64>,

    /// Title used for output filenames
    #[arg(short, long)]
    title: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render narration to WAV + SRT
    Render {
        #[command(flatten)]
        args: RenderArgs,

        /// Narration script file used for subtitles
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Render audio only (voice audition)
    Preview {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Time subtitles for a script against a known duration
    Subtitles {
        /// Narration script file
        #[arg(short, long)]
        script: PathBuf,

        /// Total duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Output SRT path (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print cues as JSON instead of SRT
        #[arg(long)]
        json: bool,
    },

    /// Print the header of a WAV file
    Inspect {
        /// WAV file
        file: PathBuf,
    },

    /// Generate default configuration file
    InitConfig {
        /// Output path for config file
        #[arg(short, long, default_value = "recap.yaml")]
        output: PathBuf,
    },

    /// Show information about the system
    Info,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) if p.extension().is_some_and(|e| e == "json") => Config::load_json(p),
        Some(p) => Config::load(p),
        None => Ok(Config::default()),
    }
}

fn build_pipeline(args: &RenderArgs) -> Result<RecapPipeline> {
    let mut cfg = load_config(args.config.as_deref())?;

    if let Some(speed) = args.speed {
        cfg.effects.speed = speed;
    }
    if args.no_mastering {
        cfg.effects.mastering_enabled = false;
    }
    if let Some(target) = args.sync_to {
        cfg.sync.target_duration = Some(target);
    }
    if let Some(title) = &args.title {
        cfg.output.title = title.clone();
    }

    RecapPipeline::new(cfg)
}

fn save(artifact: &Artifact, dir: &Path) -> Result<()> {
    let path = artifact.save_to(dir)?;
    log::info!("Wrote {} ({}, {} bytes)", path.display(), artifact.mime_type, artifact.len());
    println!("✓ {}", path.display());
    Ok(())
}

fn run_render(args: &RenderArgs, script: &str, preview: bool) -> Result<()> {
    let pipeline = build_pipeline(args)?;
    std::fs::create_dir_all(&args.out_dir)?;

    let output = match (&args.input, &args.wav) {
        (Some(input), _) => {
            let blob = read_blob(input)?;
            if preview {
                return save(&pipeline.preview(&blob)?, &args.out_dir);
            }
            pipeline.process(&blob, script)?
        }
        (None, Some(wav)) => {
            let source = load_wav(wav)?;
            pipeline.process_buffer(&source, script)?
        }
        (None, None) => {
            return Err(Error::Config("either --input or --wav is required".into()));
        }
    };

    log::info!("Duration: {}", output.duration_formatted());
    log::info!("Speed: {:.3}x", output.speed);
    log::info!("Processing time: {:.2}s", output.processing_time);
    log::info!("Real-time factor: {:.3}x", output.rtf());

    save(&output.audio, &args.out_dir)?;
    if !preview {
        if let Some(srt) = &output.subtitles {
            save(srt, &args.out_dir)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { args, script } => {
            log::info!("recap-audio render");
            log::info!("==================");

            let script = match script {
                Some(path) => std::fs::read_to_string(path)?,
                None => String::new(),
            };
            if let Err(e) = run_render(&args, &script, false) {
                if e.is_fatal_stage_error() {
                    log::error!("Render aborted, no artifacts were written");
                }
                return Err(e);
            }
        }

        Commands::Preview { args } => {
            log::info!("recap-audio preview");
            run_render(&args, "", true)?;
        }

        Commands::Subtitles {
            script,
            duration,
            output,
            json,
        } => {
            let text = std::fs::read_to_string(&script)?;
            let segments = segment(&clean_script(&text), duration);
            log::info!("{} cue(s) over {:.3}s", segments.len(), duration);

            let rendered = if json {
                serde_json::to_string_pretty(&segments)?
            } else {
                to_srt(&segments)
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("✓ Subtitles saved to: {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Inspect { file } => {
            if !file.exists() {
                return Err(Error::FileNotFound(file.display().to_string()));
            }
            let bytes = std::fs::read(&file)?;
            let header = read_wav_header(&bytes)?;

            println!("File: {}", file.display());
            println!("Format tag: {}", header.format_tag);
            println!("Channels: {}", header.channel_count);
            println!("Sample rate: {} Hz", header.sample_rate);
            println!("Byte rate: {}", header.byte_rate);
            println!("Block align: {}", header.block_align);
            println!("Bits per sample: {}", header.bits_per_sample);
            println!("Frames: {}", header.frame_count());
            println!("Duration: {:.3}s", header.duration());
            if header.riff_len as usize + 8 != bytes.len() {
                log::warn!(
                    "RIFF size field says {} bytes, file has {}",
                    header.riff_len as usize + 8,
                    bytes.len()
                );
            }
        }

        Commands::InitConfig { output } => {
            log::info!("Creating default configuration...");

            Config::create_default(&output)?;

            println!("✓ Configuration saved to: {}", output.display());
        }

        Commands::Info => {
            let defaults = Config::default();

            println!("recap-audio - narration post-production");
            println!("========================================");
            println!("Version: {}", recap_audio::VERSION);
            println!("Platform: {}", std::env::consts::OS);
            println!("Architecture: {}", std::env::consts::ARCH);
            println!();
            println!("Input PCM: {} Hz, {} channel(s), 16-bit LE", recap_audio::SAMPLE_RATE, recap_audio::CHANNELS);
            println!("Default speed: {:.2}x", defaults.effects.speed);
            println!("Mastering chain: compressor -> high shelf -> peaking EQ -> limiter");
            println!("Outputs: {} + {}", artifact_filename(&defaults.output.title, "wav"), artifact_filename(&defaults.output.title, "srt"));
            println!();
            println!("CPU Cores: {}", num_cpus::get());
            println!("Physical Cores: {}", num_cpus::get_physical());
        }
    }

    Ok(())
}
