//! Job board command line
//!
//! Browses the jobs API page by page and manages bookmarks saved under the
//! configured data directory.

use clap::{Parser, Subcommand};
use common::{AdditionalInfo, Job, JobId};
use jobs_core::config::{self, ConfigError, Settings};
use jobs_core::{
    BookmarkError, BookmarkState, BookmarkStore, FetchError, FileStore, JobList, JobSource,
    JobsClient, LoadOutcome, StorageWriteError, logging,
};
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;

#[derive(Parser)]
#[command(name = "jobs")]
#[command(version)]
#[command(about = "Browse job listings and keep bookmarks offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List jobs, following pagination
    Jobs {
        /// How many pages to load at most
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show every detail of one job
    Show { page: u32, id: String },
    /// Bookmark a job, or remove it if already saved
    Bookmark { page: u32, id: String },
    /// List saved jobs
    Bookmarks,
    /// Remove every saved job
    ClearBookmarks,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Bookmark(#[from] BookmarkError),

    #[error(transparent)]
    Clear(#[from] StorageWriteError),

    #[error("no job with id {id} on page {page}")]
    NotFound { page: u32, id: String },
}

type Bookmarks = BookmarkState<FileStore>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match config::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("❌ {}", CliError::from(err));
            return ExitCode::FAILURE;
        }
    };
    logging::init_tracing(&settings.log.filter);

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<(), CliError> {
    let client = JobsClient::from_settings(&settings.api);
    let bookmarks = BookmarkState::new(BookmarkStore::new(FileStore::new(
        &settings.storage.data_dir,
    )));
    // Unreadable bookmarks must not block browsing.
    if let Err(err) = bookmarks.reload().await {
        eprintln!("⚠️  {} ({err})", bookmarks.last_error().unwrap_or_default());
    }

    match command {
        Command::Jobs { pages } => list_jobs(client, settings, &bookmarks, pages).await,
        Command::Show { page, id } => {
            let job = find_job(&client, page, &id).await?;
            print_details(&job, bookmarks.is_bookmarked(&job.id));
            Ok(())
        }
        Command::Bookmark { page, id } => {
            let job = find_job(&client, page, &id).await?;
            if bookmarks.toggle(&job).await? {
                println!("🔖 Saved: {} at {}", job.title, job.company);
            } else {
                println!("🗑️  Removed: {} at {}", job.title, job.company);
            }
            Ok(())
        }
        Command::Bookmarks => {
            let saved = bookmarks.jobs();
            println!("🔖 {} saved", plural(saved.len(), "job"));
            for job in &saved {
                println!("{}", summary_line(job, true));
            }
            if saved.is_empty() {
                println!("No bookmarked jobs yet. Bookmark jobs to see them here!");
            }
            Ok(())
        }
        Command::ClearBookmarks => {
            bookmarks.store().clear().await?;
            println!("🧹 Cleared all bookmarks");
            Ok(())
        }
    }
}

async fn list_jobs(
    client: JobsClient,
    settings: &Settings,
    bookmarks: &Bookmarks,
    pages: u32,
) -> Result<(), CliError> {
    let list = JobList::with_threshold(client, settings.listing.page_threshold);

    let mut outcome = list.load_first_page().await;
    for _ in 1..pages {
        if !list.has_more() || outcome == LoadOutcome::Failed {
            break;
        }
        outcome = list.load_more().await;
    }
    list.close();
    debug!(state = ?list.state(), pages = list.page() - 1, "finished listing");

    for job in list.jobs() {
        println!("{}", summary_line(&job, bookmarks.is_bookmarked(&job.id)));
    }
    if let Some(message) = list.error_message() {
        eprintln!("⚠️  {message}");
    } else if list.is_empty() {
        println!("No jobs available at the moment.");
    }
    println!("📊 {} listed", plural(list.len(), "job"));
    Ok(())
}

async fn find_job(client: &JobsClient, page: u32, id: &str) -> Result<Job, CliError> {
    let key = parse_id(id).key();
    client
        .fetch_page(page)
        .await?
        .into_iter()
        .find(|job| job.id.key() == key)
        .ok_or_else(|| CliError::NotFound {
            page,
            id: id.to_string(),
        })
}

fn parse_id(raw: &str) -> JobId {
    raw.parse::<i64>()
        .map(JobId::Number)
        .unwrap_or_else(|_| JobId::from(raw))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn summary_line(job: &Job, bookmarked: bool) -> String {
    let marker = if bookmarked { "★" } else { " " };
    format!(
        "{marker} [{}] {} at {} | {} | {}",
        job.id, job.title, job.company, job.location, job.salary
    )
}

fn total_shares(info: &AdditionalInfo) -> u64 {
    info.shares.saturating_add(info.fb_shares)
}

fn print_details(job: &Job, bookmarked: bool) {
    println!("{}", summary_line(job, bookmarked));
    println!("   📞 {}", job.phone);
    println!("   🧰 {} | {} | {}", job.job_type, job.experience, job.requirements);
    println!("   👥 Openings: {} | Role: {} | Category: {}", job.openings, job.role, job.category);
    println!("   💸 Fees: {}", job.fees);
    if !job.expires_on.is_empty() {
        println!("   ⏳ Expires: {}", job.expires_on);
    }

    let info = &job.additional_info;
    println!(
        "   👀 {} views, {} shares, {} applications{}",
        info.views,
        total_shares(info),
        info.applications,
        if info.is_premium { " (premium)" } else { "" }
    );
    if !info.tags.is_empty() {
        let tags: Vec<&str> = info.tags.iter().map(|tag| tag.value.as_str()).collect();
        println!("   🏷️  {}", tags.join(", "));
    }
    for attribute in info.attributes.values() {
        println!("   • {}: {}", attribute.name, attribute.value);
    }

    let company = &job.company_details;
    if !company.call_start_time.is_empty() {
        println!("   🕘 Call between {} and {}", company.call_start_time, company.call_end_time);
    }
    if !job.description.is_empty() {
        println!("\n{}", job.description);
    }
}
