use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use transcripts::{
    LocateRequest, MeetingDescriptor, TranscriptDescriptor, TranscriptService, TranscriptsConfig,
};

const PREVIEW_CHARS: usize = 500;

#[derive(Parser)]
#[command(name = "transcripts-cli")]
#[command(about = "Find and download Google Meet transcripts")]
#[command(
    long_about = "A command-line interface for finding meeting transcripts.\n\n\
    Lists meetings from your calendar, locates the transcript documents saved to\n\
    your drive, prints their text and downloads them."
)]
struct Cli {
    /// TOML file with the transcript settings.
    ///
    /// Missing sections fall back to their defaults. Google credentials can
    /// also come from GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET.
    #[arg(short, long, value_name = "FILE", env = "TRANSCRIPTS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent meetings that have a conferencing link
    Meetings {
        /// How many months back to look
        #[arg(short, long, value_name = "MONTHS")]
        months_back: Option<u32>,

        /// Only meetings whose title matches this text
        #[arg(short, long, value_name = "TEXT")]
        query: Option<String>,
    },

    /// Show one calendar meeting
    Meeting {
        /// Calendar event id, as shown by 'meetings'
        id: String,
    },

    /// Extract the meeting code from a conferencing link
    ParseLink {
        url: String,
    },

    /// Find transcripts in the transcripts folder
    ///
    /// With a date, results closest to that date come first.
    Transcripts {
        /// Meeting code, e.g. abc-defg-hij
        #[arg(short, long)]
        code: Option<String>,

        /// Meeting title to match against file names
        #[arg(short, long)]
        title: Option<String>,

        /// YYYY-MM-DD or YYYY-MM-DDTHH:MM
        #[arg(short, long, value_parser = parse_local)]
        date: Option<NaiveDateTime>,
    },

    /// Transcripts modified between two instants, anywhere in drive
    Range {
        /// RFC 3339 timestamp or YYYY-MM-DD (UTC midnight)
        #[arg(value_parser = parse_instant)]
        start: DateTime<Utc>,

        #[arg(value_parser = parse_instant)]
        end: DateTime<Utc>,
    },

    /// List transcripts in a named folder
    Folder {
        name: String,
    },

    /// Print the text of a transcript
    Text {
        /// Drive file id, as shown by 'transcripts'
        file_id: String,
    },

    /// Download a transcript
    ///
    /// Native documents are saved as .docx. Without --output the file lands in
    /// the download directory under its drive name.
    Download {
        file_id: String,

        /// Destination file or existing directory
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Pick a meeting and transcript from menus, then download it
    Interactive,
}

fn parse_local(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("unrecognized date '{}'", value))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| parse_local(value).map(|dt| dt.and_utc()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcripts=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Link parsing needs no Google session
    if let Commands::ParseLink { url } = &cli.command {
        return handle_parse_link(url);
    }

    let config = TranscriptsConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load transcript settings")?;
    let session = transcripts::google::connect(&config)
        .await
        .context("Failed to connect to Google")?;
    let service = TranscriptService::new(session, config);

    match cli.command {
        Commands::Meetings { months_back, query } => {
            handle_meetings(&service, months_back, query).await?
        }
        Commands::Meeting { id } => handle_meeting(&service, &id).await?,
        Commands::ParseLink { .. } => {}
        Commands::Transcripts { code, title, date } => {
            let request = LocateRequest { code, title, date };
            let found = service.locate_transcripts(&request).await?;
            print_transcripts(&found);
        }
        Commands::Range { start, end } => {
            if start > end {
                bail!("start must not be after end");
            }
            let found = service.transcripts_between(start, end).await?;
            print_transcripts(&found);
        }
        Commands::Folder { name } => {
            let found = service.folder_transcripts(&name).await?;
            print_transcripts(&found);
        }
        Commands::Text { file_id } => handle_text(&service, &file_id).await?,
        Commands::Download { file_id, output } => {
            let path = service.download(&file_id, output.as_deref()).await?;
            println!("Saved to {}", path.display());
        }
        Commands::Interactive => handle_interactive(&service).await?,
    }

    Ok(())
}

fn format_start(meeting: &MeetingDescriptor) -> String {
    match &meeting.start {
        Some(start) => match start.time_of_day() {
            Some(_) => start.local().format("%Y-%m-%d %H:%M").to_string(),
            None => format!("{} (all day)", start.date()),
        },
        None => "no date".to_string(),
    }
}

fn print_meetings(meetings: &[MeetingDescriptor]) {
    if meetings.is_empty() {
        println!("No meetings found.");
        return;
    }
    for (i, meeting) in meetings.iter().enumerate() {
        println!("{:>3}. {}  {}", i + 1, format_start(meeting), meeting.title);
        println!("     {}", meeting.meet_url());
    }
}

fn print_transcripts(transcripts: &[TranscriptDescriptor]) {
    if transcripts.is_empty() {
        println!("No transcripts found.");
        return;
    }
    for (i, transcript) in transcripts.iter().enumerate() {
        let date = transcript
            .meeting_date
            .as_ref()
            .map(|d| d.raw.as_str())
            .unwrap_or("undated");
        println!("{:>3}. {} [{}]", i + 1, transcript.name, transcript.file_id);
        println!("     {}", date);
        if let Some(link) = &transcript.web_view_link {
            println!("     {}", link);
        }
    }
}

async fn handle_meetings(
    service: &TranscriptService,
    months_back: Option<u32>,
    query: Option<String>,
) -> anyhow::Result<()> {
    let meetings = match query {
        Some(title) => service.search_meetings(&title, months_back).await?,
        None => service.list_meetings(months_back).await?,
    };
    print_meetings(&meetings);
    Ok(())
}

async fn handle_meeting(service: &TranscriptService, id: &str) -> anyhow::Result<()> {
    let meeting = service
        .get_meeting(id)
        .await?
        .ok_or_else(|| anyhow!("No meeting with a conferencing link has id {}", id))?;

    println!("{}", meeting.title);
    println!("  When:  {}", format_start(&meeting));
    println!("  Code:  {}", meeting.meeting_code());
    println!("  Link:  {}", meeting.meet_url());
    if let Some(organizer) = &meeting.organizer {
        println!("  Organizer: {}", organizer);
    }
    if !meeting.attendees.is_empty() {
        println!("  Attendees: {}", meeting.attendees.join(", "));
    }
    Ok(())
}

fn handle_parse_link(url: &str) -> anyhow::Result<()> {
    match transcripts::link::parse(url) {
        Some(link) => {
            println!("Meeting code: {}", link.code);
            println!("Canonical URL: {}", link.url());
            for (name, value) in &link.query_params {
                println!("  {} = {}", name, value);
            }
        }
        None => println!("Not a Google Meet link."),
    }
    Ok(())
}

async fn handle_text(service: &TranscriptService, file_id: &str) -> anyhow::Result<()> {
    match service.get_text(file_id).await? {
        Some(text) => {
            if text.degraded {
                eprintln!("Warning: document reader unavailable, text may be garbled");
            }
            println!("{}", text.text);
        }
        None => bail!("No text could be read from {}", file_id),
    }
    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask for a 1-based index into a list of `len` items. Empty input cancels.
fn choose(message: &str, len: usize) -> anyhow::Result<Option<usize>> {
    loop {
        let answer = prompt(message)?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("Enter a number between 1 and {}.", len),
        }
    }
}

async fn handle_interactive(service: &TranscriptService) -> anyhow::Result<()> {
    println!("1. Choose from recent meetings");
    println!("2. Paste a meeting link");
    let meeting = match prompt("Select an option: ")?.as_str() {
        "1" => {
            let meetings = service.list_meetings(None).await?;
            print_meetings(&meetings);
            if meetings.is_empty() {
                return Ok(());
            }
            match choose("Meeting number (empty to quit): ", meetings.len())? {
                Some(i) => meetings[i].clone(),
                None => return Ok(()),
            }
        }
        "2" => {
            let url = prompt("Meeting link: ")?;
            service
                .meeting_from_link(&url)
                .ok_or_else(|| anyhow!("Not a Google Meet link: {}", url))?
        }
        other => bail!("Unknown option '{}'", other),
    };

    println!("Searching transcripts for '{}'...", meeting.title);
    let found = service.transcripts_for_meeting(&meeting).await?;
    print_transcripts(&found);
    if found.is_empty() {
        return Ok(());
    }

    let Some(i) = choose("Transcript number (empty to quit): ", found.len())? else {
        return Ok(());
    };
    let transcript = &found[i];

    let path = service.download_for_meeting(transcript, &meeting).await?;
    println!("Saved to {}", path.display());

    match service.get_text(&transcript.file_id).await? {
        Some(text) => {
            let preview: String = text.text.chars().take(PREVIEW_CHARS).collect();
            println!("\n{}", preview);
            if text.text.chars().count() > PREVIEW_CHARS {
                println!("...");
            }
        }
        None => println!("No preview available."),
    }
    Ok(())
}
