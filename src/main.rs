use anyhow::Context;
use clap::Parser;
use snappost::{init_logging, ExportOptions, Job, PostProcessor};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Motion program to post-process, as a JSON job description.
    #[arg()]
    job: PathBuf,

    /// Options file (.json or .toml). Applied before `--options`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Post-processor argument string, e.g. "--inches --segments 20".
    #[arg(long, allow_hyphen_values = true)]
    options: Option<String>,

    /// File holding a base64-encoded PNG for the header thumbnail.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Log progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn load_options(args: &Args) -> anyhow::Result<ExportOptions> {
    match (&args.config, &args.options) {
        (Some(_), Some(_)) => Err(anyhow::anyhow!(
            "--config and --options cannot be combined"
        )),
        (Some(path), None) => ExportOptions::load_from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display())),
        (None, Some(options)) => {
            ExportOptions::from_arg_string(options).context("Failed to parse --options")
        }
        (None, None) => Ok(ExportOptions::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(if args.verbose { Level::INFO } else { Level::WARN })?;

    let job_text = std::fs::read_to_string(&args.job)
        .with_context(|| format!("Failed to read {}", args.job.display()))?;
    let job = Job::from_json_str(&job_text)
        .with_context(|| format!("Invalid job description in {}", args.job.display()))?;

    let options = load_options(&args)?;
    let mut post = PostProcessor::from_options(&options)?;
    if let Some(path) = &args.preview {
        let preview = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preview {}", path.display()))?;
        post = post.with_preview(preview.trim());
    }

    let gcode = post.export(&job)?;
    print!("{}", gcode);
    Ok(())
}
