use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use confticket::{
    DisplayMode, Field, GithubPolicy, NamePolicy, SubmitOutcome, TicketSettings, TicketWidget,
    ValidationConfig,
};

#[derive(Parser, Debug)]
#[command(name = "confticket", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate one field value and print the result as JSON.
    Validate(ValidateArgs),
    /// Fill in the form, submit it and write the ticket PNG.
    Ticket(TicketArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// full-name, email or github-username.
    #[arg(long)]
    field: Field,

    /// Raw value as typed by the registrant.
    #[arg(long, allow_hyphen_values = true)]
    value: String,

    /// first or full.
    #[arg(long, default_value = "full")]
    name_policy: NamePolicy,

    /// require_at, no_at or flexible.
    #[arg(long, default_value = "flexible")]
    github_policy: GithubPolicy,
}

#[derive(Parser, Debug)]
struct TicketArgs {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, default_value = "")]
    github: String,

    /// JPG or PNG avatar, at most 500 KiB.
    #[arg(long)]
    avatar: Option<PathBuf>,

    /// Settings JSON (validation policies, canvas, font, event copy, seed).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file; overrides the one in the settings.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file; overrides the one in the settings.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Ticket number seed; overrides the one in the settings.
    #[arg(long)]
    seed: Option<u64>,

    /// How submit errors are reported.
    #[arg(long)]
    display_mode: Option<DisplayMode>,

    /// Output PNG path. Defaults to the export file name in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the current frame without submitting, valid or not.
    #[arg(long, default_value_t = false)]
    preview: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Ticket(args) => cmd_ticket(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = ValidationConfig {
        name_validation: args.name_policy,
        github_validation: args.github_policy,
        ..ValidationConfig::default()
    };
    let result = confticket::validate(args.field, &args.value, &config);
    let json = serde_json::to_string_pretty(&result).context("serialize validation result")?;
    println!("{json}");
    Ok(())
}

fn cmd_ticket(args: TicketArgs) -> anyhow::Result<()> {
    let mut settings = match &args.config {
        Some(path) => TicketSettings::from_path(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => TicketSettings::default(),
    };
    if args.font.is_some() {
        settings.font_path = args.font.clone();
    }
    if args.bold_font.is_some() {
        settings.bold_font_path = args.bold_font.clone();
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(mode) = args.display_mode {
        settings.validation.display_mode = mode;
    }

    let mut widget = TicketWidget::from_settings(&settings)?;
    for (field, value) in [
        (Field::FullName, &args.name),
        (Field::Email, &args.email),
        (Field::GithubUsername, &args.github),
    ] {
        widget.set_field(field, value.as_str())?;
        widget.blur(field)?;
    }

    if let Some(path) = &args.avatar {
        load_avatar(&mut widget, path)?;
    }

    let (file_name, bytes) = if args.preview {
        let bytes = confticket::encode_png(widget.frame())?;
        (confticket::export_file_name(&widget.state().full_name), bytes)
    } else {
        match widget.submit()? {
            SubmitOutcome::Accepted { ticket_number } => {
                eprintln!("ticket #{ticket_number}");
            }
            SubmitOutcome::Rejected { feedback, .. } => {
                for item in &feedback {
                    eprintln!("{}", item.message());
                }
                anyhow::bail!("ticket submission rejected");
            }
            SubmitOutcome::AlreadySubmitted => {}
        }
        let exported = widget.export_png()?;
        (exported.file_name, exported.bytes)
    };

    let out = args.out.unwrap_or_else(|| PathBuf::from(&file_name));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, bytes).with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn load_avatar(widget: &mut TicketWidget, path: &Path) -> anyhow::Result<()> {
    let mime = confticket::mime_for_path(path)
        .with_context(|| format!("unknown image type for '{}'", path.display()))?;
    let bytes =
        std::fs::read(path).with_context(|| format!("read avatar '{}'", path.display()))?;
    widget
        .load_avatar(mime, &bytes)
        .with_context(|| format!("load avatar '{}'", path.display()))?;
    Ok(())
}
