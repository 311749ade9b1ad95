use anyhow::Context;
use api_shared::SignupReq;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use storyforge_cli::commands::{self, SceneSpec};
use storyforge_cli::play::run_session;
use storyforge_cli::StoryClient;
use storyforge_core::connections::render_svg;
use storyforge_core::transfer::{export_file_name, read_story_file, write_story_file};
use storyforge_core::{ErrorKind, Position, StoryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storyforge")]
#[command(about = "Write, inspect and play branching stories")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a story file with an opening scene
    New {
        /// Output file (defaults to the title-derived export name)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a scene to a story file
    Scene {
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Canvas position as X,Y
        #[arg(long, value_parser = commands::parse_position)]
        at: Option<Position>,
        /// Mark the scene as an ending
        #[arg(long)]
        end: bool,
        /// Add a choice on this scene id leading to the new scene
        #[arg(long, requires = "choice")]
        from: Option<String>,
        /// Label of the linking choice
        #[arg(long, requires = "from")]
        choice: Option<String>,
    },
    /// Read a story interactively
    Play { file: PathBuf },
    /// Summarise a story's structure
    Inspect { file: PathBuf },
    /// Print connection paths, or write them as SVG
    Routes {
        file: PathBuf,
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Talk to a Storyforge server
    Remote {
        /// Server base URL
        #[arg(long, env = "STORYFORGE_URL", default_value = "http://localhost:3000")]
        url: String,
        /// Session token from `remote login`
        #[arg(long, env = "STORYFORGE_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Create an account
    Signup {
        email: String,
        password: String,
        name: String,
        #[arg(long, env = "STORYFORGE_ANON_KEY", hide_env_values = true)]
        anon_key: Option<String>,
    },
    /// Sign in and print a session token
    Login { email: String, password: String },
    /// Revoke the current session token
    Logout,
    /// List stored stories
    List,
    /// Download a story to a file
    Pull {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Upload a story file
    Push { file: PathBuf },
    /// Delete a stored story
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyforge=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::New {
            out,
            title,
            description,
        }) => {
            let story =
                commands::new_story(title.as_deref(), description.as_deref(), chrono::Utc::now());
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(&story.title)));
            write_story_file(&path, &story)?;
            println!("Created {} ({})", path.display(), story.id);
        }
        Some(Commands::Scene {
            file,
            title,
            content,
            at,
            end,
            from,
            choice,
        }) => {
            let story = read_story_file(&file)?;
            let spec = SceneSpec {
                title,
                content,
                position: at,
                end,
                link_from: from.zip(choice),
            };
            let (story, scene_id) = commands::add_scene(story, &spec, chrono::Utc::now())?;
            write_story_file(&file, &story)?;
            println!("Added scene {scene_id}");
        }
        Some(Commands::Play { file }) => {
            let story = read_story_file(&file)?;
            run_session(&story, io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Inspect { file }) => {
            let story = read_story_file(&file)?;
            print!("{}", commands::inspect_report(&story));
        }
        Some(Commands::Routes { file, svg }) => {
            let story = read_story_file(&file)?;
            match svg {
                Some(path) => {
                    std::fs::write(&path, render_svg(&story.nodes))
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", commands::routes_listing(&story)),
            }
        }
        Some(Commands::Remote { url, token, action }) => {
            let client = StoryClient::new(url).with_token(token);
            if let Err(e) = remote(&client, action).await {
                eprintln!("{}", e.user_message());
                if e.kind() == ErrorKind::Auth {
                    eprintln!("Sign in again with `storyforge remote login` and set STORYFORGE_TOKEN.");
                }
                return Err(e.into());
            }
        }
        None => {
            println!("Use 'storyforge --help' for commands");
        }
    }

    Ok(())
}

async fn remote(client: &StoryClient, action: RemoteAction) -> Result<(), StoryError> {
    match action {
        RemoteAction::Signup {
            email,
            password,
            name,
            anon_key,
        } => {
            let req = SignupReq {
                email,
                password,
                name,
            };
            let user = client.signup(&req, anon_key.as_deref()).await?;
            println!("Registered {} ({})", user.email, user.id);
        }
        RemoteAction::Login { email, password } => {
            let session = client.sign_in(&email, &password).await?;
            println!("Signed in as {}", session.user.name);
            println!("export STORYFORGE_TOKEN={}", session.access_token);
        }
        RemoteAction::Logout => {
            client.sign_out().await?;
            println!("Signed out");
        }
        RemoteAction::List => {
            let stories = client.list().await?;
            if stories.is_empty() {
                println!("No stories found.");
            }
            for meta in stories {
                println!(
                    "{}  {}  ({} scenes, updated {})",
                    meta.id,
                    meta.title,
                    meta.node_count,
                    meta.updated_at.format("%Y-%m-%d")
                );
            }
        }
        RemoteAction::Pull { id, out } => {
            let story = client.load(&id).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(&story.title)));
            write_story_file(&path, &story)?;
            println!("Saved {}", path.display());
        }
        RemoteAction::Push { file } => {
            let story = read_story_file(Path::new(&file))?;
            client.save(&story).await?;
            println!("Uploaded {} ({})", story.title, story.id);
        }
        RemoteAction::Delete { id } => {
            client.delete(&id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}
