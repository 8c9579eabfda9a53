use std::path::{Path, PathBuf};

use bulletin_tools::pipeline::{self, ExportFormat};
use bulletin_tools::views::{self, GroupBy, ValueKind};
use bulletin_tools::{BulletinError, GradeTable, Layout, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| BulletinError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Load(args) => execute_load(args),
        Command::View(args) => execute_view(args),
    }
}

fn execute_load(args: LoadArgs) -> Result<()> {
    let table = load(&args.source)?;
    let format = match args.format {
        Some(format) => format.into(),
        None => ExportFormat::detect(&args.output)?,
    };
    pipeline::export_table(&table, &args.output, format)
}

fn execute_view(args: ViewArgs) -> Result<()> {
    let table = load(&args.source)?;
    let skill = args.skill.as_deref();
    let kind = if args.normalized {
        ValueKind::Normalized
    } else {
        ValueKind::Weighted
    };

    let json = match args.view {
        ViewKind::Skills => serde_json::to_string_pretty(&views::skills_distribution(&table))?,
        ViewKind::Evolution => {
            serde_json::to_string_pretty(&views::results_evolution(&table, skill))?
        }
        ViewKind::Overview => serde_json::to_string_pretty(&views::overview(
            &table,
            args.by.into(),
            skill,
            kind,
        ))?,
        ViewKind::Student => {
            let student = match &args.student {
                Some(student) => student.clone(),
                None => first_student(&table)?,
            };
            let results = views::student_results(&table, &student, skill, kind)?;
            serde_json::to_string_pretty(&results)?
        }
    };

    println!("{json}");
    Ok(())
}

fn load(source: &SourceArgs) -> Result<GradeTable> {
    let layout = match &source.layout {
        Some(path) => load_layout(path)?,
        None => Layout::default(),
    };
    pipeline::load_table(&source.input, &layout)
}

fn load_layout(path: &Path) -> Result<Layout> {
    if !path.exists() {
        return Err(BulletinError::MissingInput(path.to_path_buf()));
    }
    Layout::from_json_file(path)
}

fn first_student(table: &GradeTable) -> Result<String> {
    table
        .records()
        .iter()
        .map(|record| record.observation.name.clone())
        .min()
        .ok_or_else(|| BulletinError::UnknownStudent(String::new()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn spreadsheet grade records into normalized tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a grade workbook and export the enriched table.
    Load(LoadArgs),
    /// Print one of the view aggregations as JSON.
    View(ViewArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Grade workbook (xls, xlsx, xlsb or ods).
    #[arg(long)]
    input: PathBuf,

    /// Optional JSON file overriding the default workbook layout.
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(clap::Args)]
struct LoadArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file path.
    #[arg(long)]
    output: PathBuf,

    /// Output format; derived from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// View to compute.
    #[arg(value_enum)]
    view: ViewKind,

    #[command(flatten)]
    source: SourceArgs,

    /// Restrict the view to one skill.
    #[arg(long)]
    skill: Option<String>,

    /// Student of the `student` view; defaults to the first name in order.
    #[arg(long)]
    student: Option<String>,

    /// Grouping of the `overview` view.
    #[arg(long, value_enum, default_value = "name")]
    by: GroupKey,

    /// Use normalized instead of weighted results.
    #[arg(long)]
    normalized: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Xlsx => ExportFormat::Excel,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ViewKind {
    Skills,
    Evolution,
    Overview,
    Student,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GroupKey {
    Name,
    Code,
}

impl From<GroupKey> for GroupBy {
    fn from(key: GroupKey) -> Self {
        match key {
            GroupKey::Name => GroupBy::Name,
            GroupKey::Code => GroupBy::Code,
        }
    }
}
