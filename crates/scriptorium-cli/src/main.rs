use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use scriptorium_core::{AppConfig, Database, ExitCode, ScriptoriumError};
use scriptorium_science::ingest::error_kind;
use scriptorium_science::{
    BatchSummary, Doi, ExportFormat, IdentityResolver, IngestOutcome, ScienceError,
    find_possible_duplicates,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "scriptorium",
    about = "Local-first research paper library",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SCRIPTORIUM_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a single document.
    Ingest { path: PathBuf },

    /// Import every supported document in a directory.
    Import {
        dir: PathBuf,
        #[arg(long)]
        recursive: bool,
    },

    /// List papers, newest first.
    List {
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show one paper with its authors, files, tags and note.
    Show {
        #[arg(required_unless_present = "doi", conflicts_with = "doi")]
        id: Option<String>,
        #[arg(long)]
        doi: Option<String>,
    },

    /// Full-text search over titles, abstracts and DOIs.
    Search {
        query: String,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Report pairs of papers that look like duplicates.
    DedupReport {
        /// Minimum score in [0, 1]; defaults to dedup.default_threshold.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Tag management.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Per-paper markdown notes.
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Project management.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Export the whole library (bibtex, ieee, markdown, csv).
    Export {
        format: String,
        /// Write to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Rebuild the full-text index.
    Reindex,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

// ─── Tag Actions ────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum TagAction {
    /// Tag a paper.
    Add { paper_id: String, name: String },
    /// List tags of a paper, or every tag with its usage count.
    List { paper_id: Option<String> },
}

// ─── Note Actions ───────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum NoteAction {
    /// Replace the note of a paper.
    Set { paper_id: String, content: String },
    /// Print the note of a paper.
    Get { paper_id: String },
}

// ─── Project Actions ────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project.
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List projects.
    List,
    /// Add a paper to a project.
    Add { project_id: i64, paper_id: String },
    /// List the papers of a project.
    Papers { project_id: i64 },
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("SCRIPTORIUM_JSON").as_deref() == Ok("1");

    // Logs go to stderr so JSON on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command, json_output, start) {
        let code = exit_code_of(&err);
        if json_output {
            let envelope = json!({
                "status": "error",
                "error": { "kind": kind_of(&err), "message": format!("{err:#}") },
                "meta": { "duration_ms": start.elapsed().as_millis() }
            });
            println!("{envelope:#}");
        } else {
            eprintln!("error: {err:#}");
        }
        std::process::exit(code.into());
    }
}

fn run(command: Commands, json_output: bool, start: Instant) -> Result<()> {
    // Load config (honors SCRIPTORIUM_LIBRARY_PATH if set)
    let mut config = AppConfig::load()?;
    if let Ok(lib_path) = std::env::var("SCRIPTORIUM_LIBRARY_PATH") {
        config.set_library_path(lib_path.into());
    }
    debug!(library = %config.library_path().display(), "config loaded");

    match command {
        // ── Ingest ─────────────────────────────────────────────────────────

        Commands::Ingest { path } => {
            let db = open_db(&config)?;
            let resolver = IdentityResolver::from_config(&config.ingest);
            let outcome = resolver.ingest_file(&db, &path, &db)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({"status":"ok","data":outcome.result(),"meta":{"duration_ms":dur}}))?;
            } else {
                print_outcome(&outcome);
            }
        }

        Commands::Import { dir, recursive } => {
            let db = open_db(&config)?;
            let resolver = IdentityResolver::from_config(&config.ingest);
            let recursive = recursive || config.ingest.recursive_import;
            let entries = resolver.ingest_directory(&db, &dir, recursive, &db)?;
            let summary = BatchSummary::from_entries(&entries);
            let dur = start.elapsed().as_millis();

            if json_output {
                let items: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|entry| match &entry.outcome {
                        Ok(outcome) => json!({
                            "path": entry.path.display().to_string(),
                            "result": outcome.result(),
                        }),
                        Err(err) => json!({
                            "path": entry.path.display().to_string(),
                            "error": { "kind": error_kind(err), "message": err.to_string() },
                        }),
                    })
                    .collect();
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": items, "summary": summary },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for entry in &entries {
                    match &entry.outcome {
                        Ok(outcome) => print_outcome(outcome),
                        Err(err) => println!("failed    {}: {err}", entry.path.display()),
                    }
                }
                println!(
                    "\n{} ingested, {} skipped, {} failed",
                    summary.ingested, summary.skipped, summary.failed
                );
            }
        }

        // ── Browse ─────────────────────────────────────────────────────────

        Commands::List { limit, offset, year } => {
            let db = open_db(&config)?;
            let papers = db.list_papers(limit, offset, year)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                let total = db.count_papers()?;
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": papers, "total": total, "limit": limit, "offset": offset },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if papers.is_empty() {
                println!("No papers in library. Use `scriptorium ingest` to add documents.");
            } else {
                for paper in &papers {
                    let year = paper.year.map(|y| y.to_string()).unwrap_or_default();
                    let doi = paper.doi.as_deref().unwrap_or("");
                    println!("{}  {:<50}  {:<4}  {doi}", short_id(&paper.id), paper.title, year);
                }
            }
        }

        Commands::Show { id, doi } => {
            let db = open_db(&config)?;
            let entry = match (id, doi) {
                (_, Some(raw)) => {
                    let doi = Doi::parse(&raw)?;
                    db.find_paper_by_doi(&doi.bare)?
                        .ok_or_else(|| ScriptoriumError::NotFound(format!("doi {}", doi.bare)))?
                }
                (Some(id), None) => db.paper_with_authors(&id)?,
                (None, None) => {
                    return Err(ScriptoriumError::InvalidArgument("paper id or --doi required".into()).into());
                }
            };
            let paper_id = entry.paper.id.clone();
            let files = db.list_files(&paper_id)?;
            let tags = db.list_tags(&paper_id)?;
            let note = db.get_note(&paper_id)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": { "paper": entry, "files": files, "tags": tags, "note": note },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                let paper = &entry.paper;
                println!("{}", paper.title);
                println!("  id:      {}", paper.id);
                if let Some(doi) = &paper.doi {
                    println!("  doi:     {doi}");
                }
                if let Some(year) = paper.year {
                    println!("  year:    {year}");
                }
                if !paper.venue.is_empty() {
                    println!("  venue:   {}", paper.venue);
                }
                if !entry.authors.is_empty() {
                    println!("  authors: {}", entry.author_names().collect::<Vec<_>>().join(", "));
                }
                if !tags.is_empty() {
                    println!("  tags:    {}", tags.join(", "));
                }
                for file in &files {
                    println!("  v{}  {}  {}", file.version, &file.content_hash[..12], file.file_path);
                }
                if !note.is_empty() {
                    println!("\n{note}");
                }
            }
        }

        Commands::Search { query, limit } => {
            let db = open_db(&config)?;
            let results = db.search(&query, limit)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": results, "total": results.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if results.is_empty() {
                println!("No results for: {query}");
            } else {
                println!("Found {} results:", results.len());
                for hit in &results {
                    println!("  {}  {}", short_id(&hit.id), hit.title);
                }
            }
        }

        // ── Duplicates ─────────────────────────────────────────────────────

        Commands::DedupReport { threshold } => {
            let db = open_db(&config)?;
            let threshold = threshold.unwrap_or(config.dedup.default_threshold);
            let candidates = find_possible_duplicates(&db, threshold)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": candidates, "total": candidates.len(), "threshold": threshold },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if candidates.is_empty() {
                println!("No possible duplicates at threshold {threshold}.");
            } else {
                for c in &candidates {
                    println!("{:.3}  {}  {}", c.score, short_id(&c.paper_1_id), c.paper_1_title);
                    println!("       {}  {}", short_id(&c.paper_2_id), c.paper_2_title);
                }
            }
        }

        // ── Tags / notes / projects ────────────────────────────────────────

        Commands::Tag { action } => {
            let db = open_db(&config)?;
            match action {
                TagAction::Add { paper_id, name } => {
                    let tag = db.add_tag(&paper_id, &name)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":{"tag":tag},"meta":{"duration_ms":dur}}))?;
                    } else {
                        match tag {
                            Some(tag) => println!("Tagged {} with '{}'", short_id(&paper_id), tag.name),
                            None => println!("Empty tag name ignored"),
                        }
                    }
                }
                TagAction::List { paper_id: Some(paper_id) } => {
                    let tags = db.list_tags(&paper_id)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":{"items":tags},"meta":{"duration_ms":dur}}))?;
                    } else {
                        for tag in &tags {
                            println!("  {tag}");
                        }
                    }
                }
                TagAction::List { paper_id: None } => {
                    let tags = db.list_all_tags()?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        let items: Vec<_> = tags
                            .iter()
                            .map(|(name, count)| json!({"name": name, "count": count}))
                            .collect();
                        print_json(&json!({"status":"ok","data":{"items":items},"meta":{"duration_ms":dur}}))?;
                    } else if tags.is_empty() {
                        println!("No tags yet.");
                    } else {
                        for (name, count) in &tags {
                            println!("  {name:<30} {count}");
                        }
                    }
                }
            }
        }

        Commands::Note { action } => {
            let db = open_db(&config)?;
            match action {
                NoteAction::Set { paper_id, content } => {
                    let note = db.set_note(&paper_id, &content)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":note,"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("Note saved for {}", short_id(&paper_id));
                    }
                }
                NoteAction::Get { paper_id } => {
                    let note = db.get_note(&paper_id)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({
                            "status":"ok",
                            "data":{"paper_id":paper_id,"content_md":note},
                            "meta":{"duration_ms":dur}
                        }))?;
                    } else {
                        println!("{note}");
                    }
                }
            }
        }

        Commands::Project { action } => {
            let db = open_db(&config)?;
            match action {
                ProjectAction::Create { name, description } => {
                    let project = db.create_project(&name, &description)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":project,"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("Created project {} '{}'", project.id, project.name);
                    }
                }
                ProjectAction::List => {
                    let projects = db.list_projects()?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":{"items":projects},"meta":{"duration_ms":dur}}))?;
                    } else if projects.is_empty() {
                        println!("No projects yet.");
                    } else {
                        for project in &projects {
                            println!("  {:>4}  {}", project.id, project.name);
                        }
                    }
                }
                ProjectAction::Add { project_id, paper_id } => {
                    db.add_paper_to_project(project_id, &paper_id)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({
                            "status":"ok",
                            "data":{"project_id":project_id,"paper_id":paper_id},
                            "meta":{"duration_ms":dur}
                        }))?;
                    } else {
                        println!("Added {} to project {project_id}", short_id(&paper_id));
                    }
                }
                ProjectAction::Papers { project_id } => {
                    let papers = db.list_papers_in_project(project_id)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&json!({"status":"ok","data":{"items":papers},"meta":{"duration_ms":dur}}))?;
                    } else {
                        for paper in &papers {
                            println!("  {}  {}", short_id(&paper.id), paper.title);
                        }
                    }
                }
            }
        }

        // ── Export / maintenance ───────────────────────────────────────────

        Commands::Export { format, output } => {
            let format: ExportFormat = format.parse()?;
            let db = open_db(&config)?;
            let rendered = scriptorium_science::export_library(&db, format)?;
            let dur = start.elapsed().as_millis();

            match &output {
                Some(path) => std::fs::write(path, &rendered)?,
                None if !json_output => print!("{rendered}"),
                None => {}
            }
            if json_output {
                let content = if output.is_some() { None } else { Some(&rendered) };
                print_json(&json!({
                    "status": "ok",
                    "data": {
                        "format": format.name(),
                        "output": output.as_ref().map(|p| p.display().to_string()),
                        "content": content,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if let Some(path) = &output {
                eprintln!("Wrote {format} export to {}", path.display());
            }
        }

        Commands::Reindex => {
            let db = open_db(&config)?;
            let indexed = db.rebuild_index()?;
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&json!({"status":"ok","data":{"indexed":indexed},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Indexed {indexed} papers");
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::List => {
                let values = config_key_values(&config);
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&json!({"status":"ok","data":values,"meta":{"duration_ms":dur}}))?;
                } else {
                    for (key, value) in &values {
                        println!("{key} = {value}");
                    }
                }
            }
            ConfigAction::Get { key } => {
                let values = config_key_values(&config);
                let dur = start.elapsed().as_millis();
                let value = values
                    .get(key.as_str())
                    .ok_or_else(|| ScriptoriumError::NotFound(format!("config key {key}")))?;
                if json_output {
                    print_json(&json!({"status":"ok","data":{"key":key,"value":value},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("{value}");
                }
            }
        },

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("scriptorium v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(config: &AppConfig) -> Result<Database> {
    Ok(Database::open(&config.database_path())?)
}

fn print_outcome(outcome: &IngestOutcome) {
    let result = outcome.result();
    let label = if outcome.is_ingested() { "ingested" } else { "skipped" };
    println!(
        "{label:<9} {}  v{}  {}",
        short_id(&result.paper_id),
        result.version,
        result.title
    );
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn config_key_values(config: &AppConfig) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    map.insert("library_path", config.library_path().to_string_lossy().to_string());
    map.insert("database_path", config.database_path().to_string_lossy().to_string());
    map.insert("ingest.max_pages", config.ingest.max_pages.to_string());
    map.insert("ingest.max_chars", config.ingest.max_chars.to_string());
    map.insert("ingest.recursive_import", config.ingest.recursive_import.to_string());
    map.insert("dedup.default_threshold", config.dedup.default_threshold.to_string());
    map
}

fn exit_code_of(err: &anyhow::Error) -> ExitCode {
    if let Some(err) = err.downcast_ref::<ScienceError>() {
        err.exit_code()
    } else if let Some(err) = err.downcast_ref::<ScriptoriumError>() {
        err.exit_code()
    } else {
        ExitCode::GeneralError
    }
}

fn kind_of(err: &anyhow::Error) -> &'static str {
    if let Some(err) = err.downcast_ref::<ScienceError>() {
        return error_kind(err);
    }
    match err.downcast_ref::<ScriptoriumError>() {
        Some(ScriptoriumError::NotFound(_)) => "not_found",
        Some(ScriptoriumError::UnsupportedFormat(_)) => "unsupported_format",
        Some(ScriptoriumError::InvalidArgument(_)) => "invalid_argument",
        Some(ScriptoriumError::Conflict(_)) => "conflict",
        _ => "error",
    }
}
