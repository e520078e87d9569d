mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use canvas::Config;
use canvas::api::DEFAULT_LATEST_COUNT;

#[derive(Parser)]
#[command(name = "canvas")]
#[command(about = "Render and manage articles of a CMS-backed technical blog")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown-like article body from a file
    Render {
        /// Input file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,
    },
    /// Fetch an article by slug and render it as an HTML page
    Article {
        slug: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List articles
    Articles {
        /// Only articles in this section (by slug)
        #[arg(long)]
        section: Option<String>,

        /// Only the N most recent articles (5 when N is omitted)
        #[arg(long, value_name = "N", num_args = 0..=1, conflicts_with = "section")]
        latest: Option<Option<usize>>,

        /// Only the featured article
        #[arg(long, conflicts_with_all = ["section", "latest"])]
        featured: bool,
    },
    /// List sections
    Sections,
    /// Sign in and remember the session
    Login {
        /// Username or email
        identifier: String,

        #[arg(long, env = "CANVAS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        username: String,
        email: String,

        #[arg(long, env = "CANVAS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Community ideas
    Ideas {
        #[command(subcommand)]
        command: Option<IdeasCommand>,
    },
    /// Saved articles
    Bookmarks {
        #[command(subcommand)]
        command: Option<BookmarksCommand>,
    },
    /// Content administration (admins only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    Html,
    Json,
}

#[derive(Subcommand)]
pub enum IdeasCommand {
    /// Approved ideas, most voted first
    List,
    /// Ideas you submitted
    Mine,
    /// Submit an idea for review
    Submit {
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long, default_value = "general")]
        category: String,
    },
    /// Vote for an idea
    Vote { document_id: String },
}

#[derive(Subcommand)]
pub enum BookmarksCommand {
    /// Your saved articles
    List,
    /// Save an article
    Add { slug: String },
    /// Remove a saved article
    Remove { slug: String },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// All articles with their document ids
    Articles,
    /// Delete an article
    DeleteArticle { document_id: String },
    /// Create an article, or update one with --update
    Publish(PublishArgs),
    /// All ideas regardless of status
    Ideas,
    /// Approve or reject an idea
    IdeaStatus {
        document_id: String,

        #[arg(value_parser = ["pending", "approved", "rejected"])]
        status: String,
    },
    /// Sections with their document ids
    Sections,
    /// Create a section, or update one with --update
    Section(SectionArgs),
    /// Delete a section
    DeleteSection { document_id: String },
}

#[derive(clap::Args)]
pub struct PublishArgs {
    /// Article body
    pub file: PathBuf,

    #[arg(long)]
    pub title: String,

    /// Defaults to a slug derived from the title
    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long, default_value = "")]
    pub excerpt: String,

    #[arg(long, default_value = "")]
    pub author: String,

    #[arg(long, default_value = "")]
    pub author_bio: String,

    #[arg(long, default_value = "5 min read")]
    pub read_time: String,

    /// Section document id
    #[arg(long)]
    pub section: Option<String>,

    #[arg(long, default_value = "")]
    pub subsection: String,

    #[arg(long, default_value = "")]
    pub image_url: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    #[arg(long)]
    pub featured: bool,

    /// Document id of the article to update
    #[arg(long)]
    pub update: Option<String>,
}

#[derive(clap::Args)]
pub struct SectionArgs {
    pub name: String,

    /// Defaults to a slug derived from the name
    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value_t = 0)]
    pub order: i64,

    /// Document id of the section to update
    #[arg(long)]
    pub update: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?.with_env_overrides();
    log::info!("using CMS at {}", config.api.base_url);

    match cli.command {
        Command::Render {
            input,
            output,
            format,
        } => commands::render(&config, &input, output.as_deref(), format),
        Command::Article { slug, output } => commands::article(&config, &slug, output.as_deref()),
        Command::Articles {
            section,
            latest,
            featured,
        } => {
            let latest = latest.map(|count| count.unwrap_or(DEFAULT_LATEST_COUNT));
            commands::articles(&config, section.as_deref(), latest, featured)
        }
        Command::Sections => commands::sections(&config),
        Command::Login {
            identifier,
            password,
        } => commands::login(&config, &identifier, &password),
        Command::Register {
            username,
            email,
            password,
        } => commands::register(&config, &username, &email, &password),
        Command::Logout => commands::logout(&config),
        Command::Whoami => commands::whoami(&config),
        Command::Ideas { command } => {
            commands::ideas(&config, command.unwrap_or(IdeasCommand::List))
        }
        Command::Bookmarks { command } => {
            commands::bookmarks(&config, command.unwrap_or(BookmarksCommand::List))
        }
        Command::Admin { command } => commands::admin(&config, command),
    }
}
