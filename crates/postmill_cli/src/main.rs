//! Operator CLI for the post store.
//!
//! # Responsibility
//! - Open (and initialize) a store from a JSON config before every command.
//! - Inspect posts, the topic pool and the generation gate from a shell.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use postmill_core::{default_log_level, init_logging, NewPost, PostStore, StoreConfig};
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "postmill", version, about = "Inspect and initialize a postmill store")]
struct Cli {
    /// JSON config with `db_path`, `testing_mode` and `topics`.
    #[arg(short, long, env = "POSTMILL_CONFIG")]
    config: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "POSTMILL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create schema, seed topics when the pool is empty, report the seed count.
    Init,
    /// Show post count, remaining topics and the generation gate.
    Status,
    /// Print a random unused topic without consuming it.
    NextTopic,
    /// Consume a random unused topic and print it.
    ClaimTopic,
    /// List published posts, newest first.
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Print one published post as JSON.
    Show { slug: String },
    /// Store a post from a JSON document on disk.
    Save {
        /// File with `title`, `slug`, `content` and optional
        /// `meta_description`, `books_html`, `topic_used`.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

impl Cli {
    fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        init_logging(cli.log_level(), log_dir)?;
    }

    let (store, inserted) = open_store(&cli.config)?;

    match cli.command {
        Command::Init => {
            println!(
                "initialized {} (seeded {inserted} topics)",
                store.config().db_path.display()
            );
        }
        Command::Status => {
            println!("posts: {}", store.get_total_posts()?);
            println!("unused topics: {}", store.count_unused_topics()?);
            match store.next_generation_at()? {
                None => println!("generation: allowed"),
                Some(opens_at) => {
                    println!("generation: blocked until {}", format_instant(opens_at));
                }
            }
        }
        Command::NextTopic => match store.get_next_topic()? {
            Some(topic) => println!("{}\t{}", topic.id, topic.topic),
            None => println!("no unused topics"),
        },
        Command::ClaimTopic => match store.claim_next_topic()? {
            Some(topic) => println!("{}\t{}", topic.id, topic.topic),
            None => println!("no unused topics"),
        },
        Command::Recent { limit, offset } => {
            for post in store.get_recent_posts(limit, offset)? {
                println!(
                    "{}\t{}\t{}",
                    format_instant(post.created_at),
                    post.slug,
                    post.title
                );
            }
        }
        Command::Show { slug } => match store.get_post_by_slug(&slug)? {
            Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
            None => println!("no published post with slug `{slug}`"),
        },
        Command::Save { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let doc: PostDocument = serde_json::from_str(&raw)?;
            let id = store.save_post(&doc.as_new_post())?;
            println!("saved post {id} as `{}`", doc.slug);
        }
    }

    Ok(())
}

/// Loads the config and runs `initialize` so every command sees a migrated,
/// seeded store. Returns the number of topics seeded by this call.
fn open_store(config_path: &Path) -> Result<(PostStore, usize), Box<dyn Error>> {
    let store = PostStore::new(StoreConfig::load(config_path)?);
    let inserted = store.initialize()?;
    Ok((store, inserted))
}

#[derive(Debug, Deserialize)]
struct PostDocument {
    title: String,
    slug: String,
    content: String,
    meta_description: Option<String>,
    books_html: Option<String>,
    topic_used: Option<String>,
}

impl PostDocument {
    fn as_new_post(&self) -> NewPost<'_> {
        NewPost {
            title: &self.title,
            slug: &self.slug,
            meta_description: self.meta_description.as_deref(),
            content: &self.content,
            books_html: self.books_html.as_deref(),
            topic_used: self.topic_used.as_deref(),
        }
    }
}

fn format_instant(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map_or_else(|| epoch_ms.to_string(), |at| at.to_rfc3339())
}
