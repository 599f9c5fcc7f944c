//! Unihandex CLI - Command-line interface for the Unihan character property store

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use unihandex::query::{DATASET_KEY, QueryEngine};
use unihandex::{DirectorySource, FieldCatalog, Importer, UnihanStore, config};

#[derive(Parser)]
#[command(name = "unihandex")]
#[command(version = "0.0.1")]
#[command(about = "Unihan character property store - forward and reverse lookup over Han character data")]
#[command(long_about = r#"
Unihandex imports the Unicode Unihan database into SQLite, enabling:
  • Forward lookup: character -> property values
  • Reverse lookup: value pattern -> matching characters
  • Field-filtered queries over any Unihan property

Example usage:
  unihandex install --data-dir ./data/unihan
  unihandex lookup 好 --field kDefinition
  unihandex reverse "good%" --field kDefinition
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter unihandex.toml and gitignore entry
    Init {
        /// Project root to initialize
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Import Unihan source files into the database
    Install {
        /// Directory holding the Unihan .txt source files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Path to the database file
        #[arg(short = 'D', long)]
        database: Option<PathBuf>,

        /// Source file to import (repeatable; defaults to all)
        #[arg(long = "file")]
        files: Vec<String>,

        /// Field to keep (repeatable; defaults to all fields of the selected files)
        #[arg(long = "field")]
        fields: Vec<String>,
    },

    /// Look up one character's property values
    Lookup {
        /// Character or U+XXXX code point tag
        character: String,

        /// Path to the database file
        #[arg(short = 'D', long)]
        database: Option<PathBuf>,

        /// Field to return (repeatable; defaults to all)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Find characters whose property values match a LIKE pattern
    Reverse {
        /// SQL LIKE pattern, e.g. "good%" ('%' any run, '_' one character)
        pattern: String,

        /// Path to the database file
        #[arg(short = 'D', long)]
        database: Option<PathBuf>,

        /// Field to search (repeatable; defaults to all)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show bootstrap state and store statistics
    Status {
        /// Path to the database file
        #[arg(short = 'D', long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let catalog = FieldCatalog::unihan();

    match cli.command {
        Commands::Init { path, force } => {
            let config_path = path.join(config::default_config_path());
            let db_path = config::default_database_path_in(&path);

            let cfg = config::UnihandexConfig {
                database: Some(db_path.display().to_string()),
                data_dir: None,
            };
            config::write_config(&config_path, &cfg, force)?;
            config::ensure_gitignore(&path)?;

            println!("✅ Wrote {}", config_path.display());
            println!("🗄️  Database will live at: {}", db_path.display());
        }

        Commands::Install {
            data_dir,
            database,
            files,
            fields,
        } => {
            let cfg = config::load_config(None)?.unwrap_or_default();
            let data_dir = data_dir
                .or_else(|| cfg.data_dir.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));
            let db_path = resolve_database(database, &cfg);

            config::ensure_db_dir(&db_path)?;
            let mut store = UnihanStore::open(&db_path)?;
            let resolver = DirectorySource::new(&data_dir);

            println!("🚀 Importing Unihan data");
            println!("📂 Data dir: {}", data_dir.display());
            println!("🗄️  Database: {}", db_path.display());

            let file_refs = as_strs(&files);
            let field_refs = as_strs(&fields);
            let report = Importer::new(&mut store, &catalog, &resolver).install(
                file_refs.as_deref(),
                field_refs.as_deref(),
            )?;

            println!("\n✅ Import complete!");
            println!("{}", report);
        }

        Commands::Lookup {
            character,
            database,
            fields,
            format,
        } => {
            let cfg = config::load_config(None)?.unwrap_or_default();
            let db_path = resolve_database(database, &cfg);
            let store = UnihanStore::open(&db_path)?;
            let engine = QueryEngine::new(&store, &catalog);

            let field_refs = as_strs(&fields);
            let response = engine.lookup_response(&character, field_refs.as_deref())?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                match response.get(DATASET_KEY) {
                    None => println!("∅ No properties found for '{}'.", character),
                    Some(matches) => {
                        println!("🔍 {}", display_request(&character));
                        for (field, value) in matches.as_object().into_iter().flatten() {
                            println!("  {}: {}", field, value.as_str().unwrap_or_default());
                        }
                    }
                }
            }
        }

        Commands::Reverse {
            pattern,
            database,
            fields,
            format,
        } => {
            let cfg = config::load_config(None)?.unwrap_or_default();
            let db_path = resolve_database(database, &cfg);
            let store = UnihanStore::open(&db_path)?;
            let engine = QueryEngine::new(&store, &catalog);

            let field_refs = as_strs(&fields);
            let response = engine.reverse_response(&pattern, field_refs.as_deref())?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                match response.get(DATASET_KEY) {
                    None => println!("∅ No matches for pattern '{}'.", pattern),
                    Some(matches) => {
                        for (character, fields) in matches.as_object().into_iter().flatten() {
                            println!("🔍 {}", character);
                            for (field, value) in fields.as_object().into_iter().flatten() {
                                println!("  {}: {}", field, value.as_str().unwrap_or_default());
                            }
                        }
                    }
                }
            }
        }

        Commands::Status { database } => {
            let cfg = config::load_config(None)?.unwrap_or_default();
            let db_path = resolve_database(database, &cfg);
            let store = UnihanStore::open(&db_path)?;

            let all_fields: Vec<&str> = catalog.all_fields().into_iter().collect();
            let bootstrapped = store.is_bootstrapped(all_fields.iter().copied())?;

            println!("📊 Unihandex Status ({})", db_path.display());
            println!("------------------------------------");
            if bootstrapped {
                println!("✅ Bootstrapped (all {} catalog fields)", all_fields.len());
            } else {
                println!("❌ Not bootstrapped - run `unihandex install` first");
            }
            println!("{}", store.stats()?);
        }
    }

    Ok(())
}

/// Flag wins over config, config wins over the built-in default
fn resolve_database(flag: Option<PathBuf>, cfg: &config::UnihandexConfig) -> PathBuf {
    flag.or_else(|| cfg.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| config::default_database_path_in(Path::new(".")))
}

/// `好` or `U+597D` -> `好 (U+597D)` for display
fn display_request(request: &str) -> String {
    let character = if request.starts_with("U+") {
        unihandex::conversion::from_ucn(request).ok()
    } else {
        let mut chars = request.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };
    match character {
        Some(c) => format!("{} ({})", c, unihandex::conversion::to_ucn(c)),
        None => request.to_string(),
    }
}

/// Repeatable clap args arrive as Vec<String>; the library wants Option<&[&str]>
fn as_strs(values: &[String]) -> Option<Vec<&str>> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(String::as_str).collect())
    }
}
