use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use microblog_client::client::ApiClient;
use microblog_client::comments::CommentThreads;
use microblog_client::config::Config;
use microblog_client::feed::Feed;
use microblog_client::models::{Comment, Post};
use microblog_client::session::{Session, SessionStore};
use microblog_client::validate::{ImageAttachment, LoginForm, NewPost, RegisterForm};

#[derive(Parser)]
#[command(name = "microblog", version, about = "Client for a microblogging REST API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store its session locally
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
        /// Avatar image file
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Remove the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the post feed
    Feed {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Show each post's comment thread as well
        #[arg(long)]
        comments: bool,
    },
    /// Create a post
    Post {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: String,
        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Comment on a post
    Comment {
        post_id: u64,
        #[arg(long)]
        body: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let client = ApiClient::new(&config).context("Failed to build API client")?;
    let store = SessionStore::new(&config.session_file);

    match cli.command {
        Command::Login { username, password } => {
            let form = LoginForm { username, password };
            form.validate()?;
            let session = client.login(&form).await?;
            store.save(&session).await?;
            println!("Signed in as {} (@{})", session.user.name, session.user.username);
        }
        Command::Register {
            name,
            username,
            email,
            password,
            password_confirmation,
            image,
        } => {
            let form = RegisterForm {
                name,
                username,
                email,
                password,
                password_confirmation,
                image: read_attachment(image).await?,
            };
            form.validate()?;
            let session = client.register(&form).await?;
            store.save(&session).await?;
            println!("Registered as {} (@{})", session.user.name, session.user.username);
        }
        Command::Logout => {
            store.clear().await?;
            println!("Signed out");
        }
        Command::Whoami => match store.load().await? {
            Some(session) => {
                println!("{} (@{})", session.user.name, session.user.username);
            }
            None => println!("Not signed in"),
        },
        Command::Feed { pages, comments } => {
            run_feed(&client, pages, comments).await?;
        }
        Command::Post { title, body, image } => {
            let new_post = NewPost {
                title,
                body,
                image: read_attachment(image).await?,
            };
            new_post.validate()?;
            let session = require_session(&store).await?;
            let post = client.create_post(&session, &new_post).await?;
            println!("Created post #{}", post.id);
        }
        Command::Comment { post_id, body } => {
            let body = microblog_client::validate::validate_comment(&body)?;
            let session = require_session(&store).await?;
            let mut threads = CommentThreads::new(client);
            let comment = threads.submit(Some(&session), post_id, &body).await?;
            println!("Added comment #{} to post #{}", comment.id, post_id);
        }
    }

    Ok(())
}

async fn run_feed(client: &ApiClient, pages: u32, with_comments: bool) -> Result<()> {
    let mut feed = Feed::new(client.clone());
    let mut threads = CommentThreads::new(client.clone());

    for _ in 0..pages {
        match feed.load_next().await {
            Ok(page) => {
                for post in &page.posts {
                    print_post(post);
                    if with_comments && post.comments_count > 0 {
                        threads.toggle(post.id).await?;
                        for comment in threads.comments(post.id).unwrap_or(&[]) {
                            print_comment(comment);
                        }
                    }
                }
            }
            Err(microblog_client::error::FeedError::NoMorePages) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if feed.cache().next_token().is_some() {
        println!("-- more posts available, rerun with --pages {} --", pages + 1);
    }
    Ok(())
}

fn print_post(post: &Post) {
    println!("#{} {} (@{}) - {}", post.id, post.author.name, post.author.username, post.created_at);
    if let Some(title) = &post.title {
        println!("  {title}");
    }
    println!("  {}", post.body);
    if let Some(url) = post.display_image() {
        println!("  [image] {url}");
    }
    println!("  {} comments", post.comments_count);
    println!();
}

fn print_comment(comment: &Comment) {
    println!("    > {} (@{}): {}", comment.author.name, comment.author.username, comment.body);
}

async fn require_session(store: &SessionStore) -> Result<Session> {
    match store.load().await? {
        Some(session) => Ok(session),
        None => bail!("not signed in - run `microblog login` first"),
    }
}

async fn read_attachment(path: Option<PathBuf>) -> Result<Option<ImageAttachment>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Some(ImageAttachment { file_name, bytes }))
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,microblog_client=info"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
