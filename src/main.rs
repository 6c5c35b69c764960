use anyhow::{anyhow, Context, Result};
use campus_kit::config::config::Config;
use campus_kit::data::filter::json_text;
use campus_kit::{
    AsyncExecutor, FileStorage, Filter, Pagination, Persisted, SortOrder, SortState,
};
use crossterm::style::Stylize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

mod table_display;

use table_display::display_page;

/// Fuzzy matches scoring at or below this are dropped
const FUZZY_THRESHOLD: i64 = 0;

/// View settings remembered per catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ViewState {
    query: String,
    sort_key: Option<String>,
    sort_order: SortOrder,
    page: usize,
}

#[derive(Debug, Default)]
struct Options {
    file: Option<PathBuf>,
    query: Option<String>,
    field: Option<String>,
    fuzzy: bool,
    sort: Option<String>,
    descending: bool,
    page: Option<usize>,
    page_size: Option<usize>,
    notes_field: Option<String>,
    columns: Vec<String>,
}

fn print_help() {
    println!("{}", "campus-kit - browse a JSON course catalog".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  campus-kit [OPTIONS] FILE.json");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}      - Keep records matching Q", "--query Q".green());
    println!("  {}      - Match only against field F", "--field F".green());
    println!("  {}        - Fuzzy instead of substring match", "--fuzzy".green());
    println!("  {}     - Sort by field KEY", "--sort KEY".green());
    println!("  {}         - Sort descending", "--desc".green());
    println!("  {}       - Show page N", "--page N".green());
    println!("  {}  - Items per page", "--page-size N".green());
    println!(
        "  {} - Show cleaned notes and parsed gross amount",
        "--notes-field F".green()
    );
    println!("  {} - Comma-separated columns to show", "--columns A,B".green());
    println!(
        "  {} - Write a commented default config file",
        "--generate-config".green()
    );
    println!();
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn parse_number(args: &[String], flag: &str) -> Result<Option<usize>> {
    flag_value(args, flag)
        .map(|v| {
            v.parse::<usize>()
                .with_context(|| format!("{} expects a number, got {:?}", flag, v))
        })
        .transpose()
}

fn parse_options(args: &[String]) -> Result<Options> {
    let value_flags = [
        "--query",
        "--field",
        "--sort",
        "--page",
        "--page-size",
        "--notes-field",
        "--columns",
    ];

    // The data file is the first argument that is neither a flag nor a flag's value
    let file = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, arg)| {
            !arg.starts_with("--") && !value_flags.contains(&args[i - 1].as_str())
        })
        .map(|(_, arg)| PathBuf::from(arg));

    Ok(Options {
        file,
        query: flag_value(args, "--query"),
        field: flag_value(args, "--field"),
        fuzzy: args.iter().any(|a| a == "--fuzzy"),
        sort: flag_value(args, "--sort"),
        descending: args.iter().any(|a| a == "--desc"),
        page: parse_number(args, "--page")?,
        page_size: parse_number(args, "--page-size")?,
        notes_field: flag_value(args, "--notes-field"),
        columns: flag_value(args, "--columns")
            .map(|c| {
                c.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    })
}

async fn load_catalog(path: PathBuf) -> Result<Vec<Value>> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => Ok(items),
        _ => Err(anyhow!("{} must contain a JSON array", path.display())),
    }
}

fn view_key(path: &Path) -> String {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("view:{}", path.display())
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

async fn run(args: Vec<String>, config: Config) -> Result<()> {
    let options = parse_options(&args)?;
    let file = options
        .file
        .clone()
        .ok_or_else(|| anyhow!("No catalog file given (try --help)"))?;

    let executor = AsyncExecutor::new();
    let Some(items) = executor.execute(load_catalog(file.clone())).await else {
        return Err(anyhow!(executor.error().unwrap_or_default()));
    };
    tracing::info!(target: "catalog", "Loaded {} records from {}", items.len(), file.display());

    let mut remembered = if config.storage.remember_view {
        let storage = FileStorage::new(config.storage_dir()?)?;
        Some(Persisted::new(storage, view_key(&file), ViewState::default()))
    } else {
        None
    };
    let saved = remembered
        .as_ref()
        .map(|p| p.get().clone())
        .unwrap_or_default();

    let field = options.field.clone();
    let mut filter = if options.fuzzy {
        Filter::fuzzy(move |v: &Value| json_text(v, field.as_deref()), FUZZY_THRESHOLD)
    } else {
        Filter::contains_ignore_case(move |v: &Value| json_text(v, field.as_deref()))
    };
    filter.set_query(options.query.clone().unwrap_or(saved.query));
    let filtered = filter.apply(&items).to_vec();

    let sort_key = options.sort.clone().or(saved.sort_key);
    let sort_order = match (&options.sort, options.descending) {
        (_, true) => SortOrder::Descending,
        (Some(_), false) => SortOrder::Ascending,
        (None, false) => saved.sort_order,
    };
    let sort = SortState::with_default(sort_key, sort_order);
    let sorted = sort.sorted(&filtered);

    let mut pagination = Pagination::new(options.page_size.unwrap_or(config.pagination.page_size));
    pagination.sync(sorted.len());
    pagination.go_to_page(options.page.unwrap_or(saved.page.max(1)));

    display_page(
        pagination.current_items(&sorted),
        &options.columns,
        options.notes_field.as_deref(),
        &pagination,
    );

    if let Some(remembered) = remembered.as_mut() {
        remembered.set(ViewState {
            query: filter.query().to_string(),
            sort_key: sort.key().cloned(),
            sort_order: sort.order(),
            page: pagination.current_page(),
        });
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({}), using defaults", e);
        Config::default()
    });
    campus_kit::utils::logging::init_tracing(&config.logging.filter);

    let result = if args.iter().any(|a| a == "--generate-config") {
        generate_config()
    } else {
        run(args, config).await
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
