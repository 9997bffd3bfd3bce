use adapter::{ApiConfig, CreateOutcome, OfflineClient};
use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::{Comment, Post, QueuedEntity};
use std::sync::Arc;
use std::time::Duration;
use storage::Db;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "client")]
struct Cli {
    #[arg(long, env = "POSTBOX_BASE_URL", default_value = "http://127.0.0.1:3001")]
    base_url: String,

    #[arg(long, env = "POSTBOX_CLIENT_DB", default_value = "sqlite://data/client.db")]
    db: String,

    /// Per-request timeout; 0 disables it.
    #[arg(long, env = "POSTBOX_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Posts,
    Comments {
        #[arg(long)]
        post: Option<String>,
    },
    /// Show one post (requires connectivity).
    Post { id: String },
    NewPost {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        content: String,
    },
    NewComment {
        #[arg(long)]
        post: String,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        text: String,
    },
    Publish { id: String },
    Unpublish { id: String },
    Approve { id: String },
    Unapprove { id: String },
    DeletePost { id: String },
    DeleteComment { id: String },
    /// Deliver queued writes now.
    Flush,
    Queue,
    /// Probe the API periodically and flush whenever it comes back.
    Watch {
        #[arg(long, env = "POSTBOX_POLL_SECS", default_value_t = 10)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = Db::new(&cli.db)
        .await
        .with_context(|| format!("Failed to open local store: {}", cli.db))?;
    let timeout = (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs));
    let client = OfflineClient::new(ApiConfig::http(&cli.base_url, Arc::new(store), timeout)?);

    match cli.command {
        Command::Posts => {
            let posts = client.posts().list().await;
            let comments = client.comments().list().await;
            println!("{} post(s):", posts.len());
            for p in posts {
                let count = comments.iter().filter(|c| c.post_id == p.id).count();
                let state = match p.published {
                    Some(false) => " [draft]",
                    _ => "",
                };
                println!(
                    "  - [{}] {} by {} ({} comment(s)){}",
                    p.id, p.title, p.author, count, state
                );
            }
        }
        Command::Comments { post } => {
            let comments: Vec<Comment> = client
                .comments()
                .list()
                .await
                .into_iter()
                .filter(|c| post.as_ref().map_or(true, |id| &c.post_id == id))
                .collect();
            println!("{} comment(s):", comments.len());
            for c in comments {
                let state = match c.approved {
                    Some(true) => " [approved]",
                    _ => "",
                };
                println!("  - [{}] {}: {}{}", c.id, c.author, c.text, state);
            }
        }
        Command::Post { id } => {
            let p = client.posts().get_by_id(&id).await?;
            println!("{}\n{} · {}\n\n{}", p.title, p.author, p.date, p.content);
        }
        Command::NewPost {
            title,
            author,
            content,
        } => {
            let outcome = client
                .posts()
                .create(Post::draft(title, author, content))
                .await?;
            report_create(outcome, |p: &Post| p.id.clone());
        }
        Command::NewComment { post, author, text } => {
            let outcome = client
                .comments()
                .create(Comment::draft(post, author, text))
                .await?;
            report_create(outcome, |c: &Comment| c.id.clone());
        }
        Command::Publish { id } => set_published(&client, &id, true).await?,
        Command::Unpublish { id } => set_published(&client, &id, false).await?,
        Command::Approve { id } => set_approved(&client, &id, true).await?,
        Command::Unapprove { id } => set_approved(&client, &id, false).await?,
        Command::DeletePost { id } => {
            client.posts().remove(&id).await?;
            println!("Post {} deleted", id);
        }
        Command::DeleteComment { id } => {
            client.comments().remove(&id).await?;
            println!("Comment {} deleted", id);
        }
        Command::Flush => {
            let report = client.flush().await;
            println!(
                "Delivered {}/{}, {} still pending",
                report.delivered, report.attempted, report.remaining
            );
        }
        Command::Queue => {
            let pending = client.pending().await;
            println!("{} pending operation(s):", pending.len());
            for op in pending {
                let summary = match &op.payload {
                    QueuedEntity::Post(p) => format!("post \"{}\"", p.title),
                    QueuedEntity::Comment(c) => format!("comment on {}", c.post_id),
                };
                println!("  - POST {} [{}] {}", op.url, op.payload.id(), summary);
            }
        }
        Command::Watch { interval_secs } => {
            let cancel_token = CancellationToken::new();
            let (task, _handle) = client.start_with_cancel_token(
                Duration::from_secs(interval_secs.max(1)),
                cancel_token.clone(),
            );

            tokio::signal::ctrl_c().await?;
            println!("Stopping...");
            cancel_token.cancel();
            task.await?;
        }
    }

    Ok(())
}

fn report_create<E>(outcome: CreateOutcome<E>, id: impl Fn(&E) -> String) {
    match outcome {
        CreateOutcome::Created(entity) => println!("Created {}", id(&entity)),
        CreateOutcome::Queued => println!("Server unreachable, saved for later sync"),
    }
}

async fn set_published(client: &OfflineClient, id: &str, published: bool) -> anyhow::Result<()> {
    let mut post = client.posts().get_by_id(id).await?;
    post.published = Some(published);
    client.posts().update(&post).await?;
    println!(
        "Post {} {}",
        id,
        if published { "published" } else { "unpublished" }
    );
    Ok(())
}

async fn set_approved(client: &OfflineClient, id: &str, approved: bool) -> anyhow::Result<()> {
    let mut comment = client.comments().get_by_id(id).await?;
    comment.approved = Some(approved);
    client.comments().update(&comment).await?;
    println!(
        "Comment {} {}",
        id,
        if approved { "approved" } else { "unapproved" }
    );
    Ok(())
}
