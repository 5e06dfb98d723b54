use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kawara", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single frame and print its scene as JSON.
    Frame(FrameArgs),
    /// Evaluate a frame range and print one scene per line (JSON Lines).
    Range(RangeArgs),
    /// Check a show document without evaluating anything.
    Validate(ValidateArgs),
    /// Print the 128-bit digest of one evaluated frame.
    Fingerprint(FingerprintArgs),
    /// Print the whole-show audio plan as JSON.
    Audio(AudioArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Indent the JSON for reading.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame (0-based, inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// One past the last frame; the show's duration when omitted.
    #[arg(long)]
    end: Option<u64>,

    /// Evaluate every Nth frame.
    #[arg(long, default_value_t = 1)]
    step: u64,

    /// Fan evaluation out across CPU cores.
    #[arg(long)]
    parallel: bool,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,
}

#[derive(Parser, Debug)]
struct AudioArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Indent the JSON for reading.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Range(args) => cmd_range(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::Audio(args) => cmd_audio(args),
    }
}

fn read_show_json(path: &Path) -> anyhow::Result<kawara::Show> {
    let f = File::open(path).with_context(|| format!("open show '{}'", path.display()))?;
    let r = BufReader::new(f);
    let show: kawara::Show = serde_json::from_reader(r).with_context(|| "parse show JSON")?;
    Ok(show)
}

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, contents)
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let show = read_show_json(&args.in_path)?;
    let eval = kawara::Evaluator::new(&show)?;
    let scene = eval.evaluate(kawara::FrameIndex(args.frame))?;

    let mut json = if args.pretty {
        serde_json::to_string_pretty(&scene)
    } else {
        serde_json::to_string(&scene)
    }
    .with_context(|| "serialize scene JSON")?;
    json.push('\n');

    write_output(args.out.as_deref(), &json)
}

fn cmd_range(args: RangeArgs) -> anyhow::Result<()> {
    let show = read_show_json(&args.in_path)?;
    let eval = kawara::Evaluator::new(&show)?;

    let end = args.end.unwrap_or(show.duration_in_frames);
    let range = kawara::FrameRange::new(kawara::FrameIndex(args.start), kawara::FrameIndex(end))?;
    let scenes = if args.parallel {
        eval.evaluate_range_parallel(range, args.step)?
    } else {
        eval.evaluate_range(range, args.step)?
    };

    let mut lines = String::new();
    for scene in &scenes {
        lines.push_str(&serde_json::to_string(scene).with_context(|| "serialize scene JSON")?);
        lines.push('\n');
    }

    write_output(args.out.as_deref(), &lines)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let show = read_show_json(&args.in_path)?;
    show.validate()?;
    eprintln!(
        "ok: {} frames at {:.3} fps",
        show.duration_in_frames,
        show.fps.as_f64()
    );
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<()> {
    let show = read_show_json(&args.in_path)?;
    let eval = kawara::Evaluator::new(&show)?;
    let digest = eval.fingerprint(kawara::FrameIndex(args.frame))?;
    println!("{}", digest.to_hex());
    Ok(())
}

fn cmd_audio(args: AudioArgs) -> anyhow::Result<()> {
    let show = read_show_json(&args.in_path)?;
    let eval = kawara::Evaluator::new(&show)?;

    let mut json = if args.pretty {
        serde_json::to_string_pretty(eval.audio_plan())
    } else {
        serde_json::to_string(eval.audio_plan())
    }
    .with_context(|| "serialize audio plan JSON")?;
    json.push('\n');

    write_output(None, &json)
}
