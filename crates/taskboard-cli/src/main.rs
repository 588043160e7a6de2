//! taskboard - タスク API のコマンドラインクライアント
//!
//! `--demo` を付けると HTTP の代わりにメモリ上の Gateway を使う。

mod output;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use taskboard_core::domain::{parse_due_date, validation::PHOTO_MIME_TYPES};
use taskboard_core::impls::InMemoryTaskGateway;
use taskboard_core::ports::TaskGateway;
use taskboard_core::prefs::{FilePreferenceStore, Locale, Preferences, ThemeMode};
use taskboard_core::{
    AppConfig, CreateTask, FilterPatch, HttpTaskClient, PhotoUpload, SortDirection, SortField,
    Task, TaskId, TaskPriority, TaskSort, TaskStatus, TaskStore, UpdateTask,
};

use output::OutputMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "taskboard: client for the task API", long_about = None)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Path to a TOML config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use an in-memory gateway seeded with sample tasks.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tasks (filtered and sorted).
    List(ListArgs),
    /// Show one task.
    Show { id: String },
    /// Show aggregate statistics.
    Stats,
    /// Show tasks grouped by status.
    Board,
    /// Create a task.
    Create(CreateArgs),
    /// Update fields of a task.
    Update(UpdateArgs),
    /// Delete a task.
    Delete { id: String },
    /// Flip the completed flag of a task.
    Toggle { id: String },
    /// Move a task to another status.
    Status { id: String, status: TaskStatus },
    /// Show the incomplete task with the nearest due date.
    Nearest,
    /// Show or change the theme preference.
    Theme {
        mode: Option<ThemeMode>,
        /// Cycle light → dark → system.
        #[arg(long, conflicts_with = "mode")]
        toggle: bool,
    },
    /// Show or change the locale preference.
    Locale { locale: Option<Locale> },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    status: Option<TaskStatus>,
    #[arg(long)]
    priority: Option<TaskPriority>,
    /// Only completed tasks.
    #[arg(long, conflicts_with = "pending")]
    completed: bool,
    /// Only tasks that are not completed.
    #[arg(long)]
    pending: bool,
    /// Case-insensitive text in title or description.
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_due_date)]
    due_from: Option<DateTime<Utc>>,
    #[arg(long, value_parser = parse_due_date)]
    due_to: Option<DateTime<Utc>>,
    #[arg(long, default_value = "created_at")]
    sort: SortField,
    /// Ascending order (default is descending).
    #[arg(long)]
    asc: bool,
}

#[derive(Args, Debug)]
struct CreateArgs {
    title: String,
    #[arg(long)]
    description: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD.
    #[arg(long, value_parser = parse_due_date)]
    due: Option<DateTime<Utc>>,
    #[arg(long)]
    priority: Option<TaskPriority>,
    #[arg(long)]
    status: Option<TaskStatus>,
    /// Image file to attach.
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_due_date, conflicts_with = "clear_due")]
    due: Option<DateTime<Utc>>,
    /// Remove the due date.
    #[arg(long)]
    clear_due: bool,
    #[arg(long)]
    priority: Option<TaskPriority>,
    #[arg(long)]
    status: Option<TaskStatus>,
    #[arg(long)]
    photo: Option<PathBuf>,
}

impl ListArgs {
    fn filter_patch(&self) -> FilterPatch {
        let completed = match (self.completed, self.pending) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        FilterPatch::new()
            .status(self.status)
            .priority(self.priority)
            .completed(completed)
            .search(self.search.clone())
            .due_date_from(self.due_from)
            .due_date_to(self.due_to)
    }

    fn task_sort(&self) -> TaskSort {
        let direction = if self.asc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        TaskSort::new(self.sort, direction)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("taskboard_core=warn,taskboard=info"));

    let format = env::var("TASKBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // stdout はコマンドの出力に使うのでログは stderr
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "taskboard", "taskboard")
}

fn config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

fn read_photo(path: &Path) -> anyhow::Result<PhotoUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "jpg" | "jpeg" => PHOTO_MIME_TYPES[0],
        "png" => PHOTO_MIME_TYPES[1],
        "gif" => PHOTO_MIME_TYPES[2],
        "webp" => PHOTO_MIME_TYPES[3],
        _ => "application/octet-stream",
    };
    Ok(PhotoUpload::new(file_name, mime_type, bytes))
}

/// `--demo` 用の初期データ
fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let task = |id: &str, title: &str, status: TaskStatus, priority: TaskPriority, age_days| {
        let created = now - Duration::days(age_days);
        Task {
            id: TaskId::new(id),
            title: title.to_string(),
            description: None,
            due_date: None,
            photo: None,
            completed: status == TaskStatus::Done,
            created_at: created,
            updated_at: created,
            status,
            priority,
        }
    };

    let mut write_report = task("1", "Write quarterly report", TaskStatus::Todo, TaskPriority::High, 3);
    write_report.description = Some("Numbers for Q3, draft by Friday".to_string());
    write_report.due_date = Some(now + Duration::days(2));

    let mut review = task("2", "Review pull requests", TaskStatus::InProgress, TaskPriority::Medium, 2);
    review.due_date = Some(now - Duration::days(1));

    let mut groceries = task("3", "Buy groceries", TaskStatus::Done, TaskPriority::Low, 1);
    groceries.description = Some("Milk, bread, coffee".to_string());

    vec![groceries, review, write_report]
}

fn gateway(cli: &Cli, config: &AppConfig) -> anyhow::Result<Arc<dyn TaskGateway>> {
    if cli.demo {
        debug!("using in-memory gateway");
        let gateway = InMemoryTaskGateway::new().seeded(demo_tasks(Utc::now()));
        return Ok(Arc::new(gateway));
    }
    debug!(base_url = %config.api.base_url, "using HTTP gateway");
    Ok(Arc::new(HttpTaskClient::new(&config.api)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_dir().join("config.toml"));
    let config = AppConfig::load(Some(config_path.as_path()))
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    match &cli.command {
        Commands::Theme { mode: theme, toggle } => {
            let prefs = preferences(&config);
            let current = match (theme, toggle) {
                (Some(theme), _) => {
                    prefs.set_theme(*theme)?;
                    *theme
                }
                (None, true) => prefs.toggle_theme()?,
                (None, false) => prefs.theme(),
            };
            return output::print_preference(mode, "theme", current.as_str());
        }
        Commands::Locale { locale } => {
            let prefs = preferences(&config);
            let current = match locale {
                Some(locale) => {
                    prefs.set_locale(*locale)?;
                    *locale
                }
                None => prefs.locale(env::var("LANG").ok().as_deref()),
            };
            return output::print_preference(mode, "locale", current.as_str());
        }
        _ => {}
    }

    let store = TaskStore::new(gateway(&cli, &config)?);

    match cli.command {
        Commands::List(args) => {
            store.load_tasks().await?;
            store.set_filter(args.filter_patch());
            store.set_sort(args.task_sort());
            output::print_tasks(mode, &store.filtered_and_sorted())?;
        }
        Commands::Show { id } => {
            let task = store.gateway().get_task(&TaskId::new(id)).await?;
            output::print_task(mode, &task)?;
        }
        Commands::Stats => {
            store.load_tasks().await?;
            output::print_stats(mode, &store.stats())?;
        }
        Commands::Board => {
            store.load_tasks().await?;
            output::print_board(mode, &store.tasks_by_status())?;
        }
        Commands::Create(args) => {
            let mut data = CreateTask::new(args.title);
            data.description = args.description;
            data.due_date = args.due;
            data.priority = args.priority;
            data.status = args.status;
            if let Some(path) = args.photo.as_deref() {
                data.photo = Some(read_photo(path)?);
            }
            let task = store.create_task(&data).await?;
            output::print_task(mode, &task)?;
        }
        Commands::Update(args) => {
            let mut data = UpdateTask::new(TaskId::new(args.id));
            data.title = args.title;
            data.description = args.description;
            data.due_date = match (args.due, args.clear_due) {
                (_, true) => Some(None),
                (Some(due), false) => Some(Some(due)),
                (None, false) => None,
            };
            data.priority = args.priority;
            data.status = args.status;
            if let Some(path) = args.photo.as_deref() {
                data.photo = Some(read_photo(path)?);
            }
            let task = store.update_task(&data).await?;
            output::print_task(mode, &task)?;
        }
        Commands::Delete { id } => {
            let id = TaskId::new(id);
            store.delete_task(&id).await?;
            output::print_deleted(mode, &id)?;
        }
        Commands::Toggle { id } => {
            store.load_tasks().await?;
            let id = TaskId::new(id);
            match store.toggle_task_completion(&id).await? {
                Some(task) => output::print_task(mode, &task)?,
                None => anyhow::bail!("task {id} not found"),
            }
        }
        Commands::Status { id, status } => {
            let task = store.change_task_status(&TaskId::new(id), status).await?;
            output::print_task(mode, &task)?;
        }
        Commands::Nearest => {
            let task = store.nearest_deadline_task().await?;
            output::print_nearest(mode, task.as_ref())?;
        }
        Commands::Theme { .. } | Commands::Locale { .. } => {}
    }

    Ok(())
}

fn preferences(config: &AppConfig) -> Preferences<FilePreferenceStore> {
    Preferences::new(FilePreferenceStore::new(config_dir().join("prefs.json")))
        .with_defaults(config.ui.default_theme, config.ui.default_locale)
}
