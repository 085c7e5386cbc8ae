//! skillet - command-line client for the ladle server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;

use ladleproto::{Recipe, RecipeDraft, RecipeId, RecipeKind, RecipePatch};
use skillet::{cache, FilterState, HttpTransport, Session, SortMode};

#[derive(Parser)]
#[command(name = "skillet")]
#[command(about = "Recipe-bookmark manager client")]
#[command(version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "LADLE_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Natural,
    Newest,
    Oldest,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Natural => SortMode::Natural,
            SortArg::Newest => SortMode::NewestFirst,
            SortArg::Oldest => SortMode::OldestFirst,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes, filtered and sorted
    List {
        /// Only recipes from this platform (youtube, instagram, tiktok)
        #[arg(long)]
        platform: Option<String>,

        /// Only recipes in this category
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value = "newest")]
        sort: SortArg,
    },

    /// Bookmark a linked recipe
    Add {
        title: String,
        link: String,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value = "")]
        thumbnail: String,
    },

    /// Save a custom recipe with free-text ingredients
    Custom {
        title: String,
        ingredients: String,

        #[arg(long, default_value = "")]
        thumbnail: String,
    },

    /// Update fields of an existing recipe
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        link: Option<String>,

        /// New category; pass an empty string to clear it
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        ingredients: Option<String>,

        #[arg(long)]
        thumbnail: Option<String>,
    },

    /// Delete a recipe
    Delete { id: i64 },

    /// Import recipes from a JSON array file
    Import { file: PathBuf },

    /// Pick a random recipe from the (optionally filtered) list
    Random {
        #[arg(long)]
        platform: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Log in against a gated server
    Login { username: String, password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut session = Session::new(HttpTransport::new(&cli.server));

    match cli.command {
        Commands::List {
            platform,
            category,
            search,
            sort,
        } => {
            session.refresh().await.context("failed to load recipes")?;
            session.filters = FilterState {
                platform: parse_platform(platform)?,
                category,
                search,
                sort: sort.into(),
            };
            print_list(&session.displayed(), session.cache().len());
        }

        Commands::Add {
            title,
            link,
            category,
            thumbnail,
        } => {
            let created = session
                .create(RecipeDraft {
                    id: None,
                    title,
                    thumbnail,
                    kind: RecipeKind::Linked { link, category },
                })
                .await
                .context("failed to create recipe")?;
            println!("{} {}", "saved".bright_green(), describe(&created));
        }

        Commands::Custom {
            title,
            ingredients,
            thumbnail,
        } => {
            let created = session
                .create(RecipeDraft {
                    id: None,
                    title,
                    thumbnail,
                    kind: RecipeKind::Custom { ingredients },
                })
                .await
                .context("failed to create recipe")?;
            println!("{} {}", "saved".bright_green(), describe(&created));
        }

        Commands::Update {
            id,
            title,
            link,
            category,
            ingredients,
            thumbnail,
        } => {
            let patch = RecipePatch {
                title,
                thumbnail,
                link,
                category,
                ingredients,
            };
            let merged = session
                .update(RecipeId(id), patch)
                .await
                .context("failed to update recipe")?;
            println!("{} {}", "updated".bright_green(), describe(&merged));
        }

        Commands::Delete { id } => {
            session
                .delete(RecipeId(id))
                .await
                .context("failed to delete recipe")?;
            println!("{} {}", "deleted".bright_green(), id);
        }

        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let drafts: Vec<RecipeDraft> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON recipe array", file.display()))?;
            let count = session.import(drafts).await.context("import failed")?;
            println!(
                "{} {} recipes ({} total)",
                "imported".bright_green(),
                count,
                session.cache().len()
            );
        }

        Commands::Random { platform, category } => {
            session.refresh().await.context("failed to load recipes")?;
            session.filters = FilterState {
                platform: parse_platform(platform)?,
                category,
                ..Default::default()
            };
            let displayed = session.displayed();
            match cache::random_pick(&displayed) {
                Some(recipe) => println!("{} {}", "tonight:".bright_cyan(), describe(recipe)),
                None => println!("{}", "no recipes match".dimmed()),
            }
        }

        Commands::Login { username, password } => {
            session
                .login(&username, &password)
                .await
                .context("login failed")?;
            println!("{}", "logged in".bright_green());
        }
    }

    Ok(())
}

fn parse_platform(arg: Option<String>) -> Result<Option<ladleproto::Platform>> {
    arg.map(|p| {
        p.parse::<ladleproto::Platform>()
            .with_context(|| format!("unknown platform: {p} (youtube, instagram, tiktok)"))
    })
    .transpose()
}

fn describe(recipe: &Recipe) -> String {
    let mut line = format!("{} {}", recipe.id.to_string().dimmed(), recipe.title.bold());
    match &recipe.kind {
        RecipeKind::Linked { link, category } => {
            if let Some(platform) = recipe.platform() {
                line.push_str(&format!(" [{}]", platform.as_str().bright_yellow()));
            }
            if let Some(category) = category {
                line.push_str(&format!(" ({category})"));
            }
            line.push_str(&format!(" {}", link.bright_blue()));
        }
        RecipeKind::Custom { .. } => {
            line.push_str(&format!(" [{}]", "custom".bright_magenta()));
        }
    }
    line
}

fn print_list(displayed: &[Recipe], total: usize) {
    if displayed.is_empty() {
        println!("{}", "no recipes match".dimmed());
        return;
    }
    for recipe in displayed {
        println!("{}", describe(recipe));
    }
    if displayed.len() != total {
        println!(
            "{}",
            format!("{} of {} recipes", displayed.len(), total).dimmed()
        );
    }
}
