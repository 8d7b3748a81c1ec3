#![forbid(unsafe_code)]

//! Mounts the blog cards on one store and walks a scripted set of updates,
//! printing which components re-rendered after each flush.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tether::prelude::*;
use tether_widgets::{BlogState, PostCard, PostCardProps, PostsOwnProps, posts_card};
use tracing_subscriber::EnvFilter;

use crate::script::{Step, seed};

#[derive(Debug, Parser)]
#[command(name = "tether-demo", version, about = "Walk the Tether blog cards through scripted updates")]
struct Cli {
    /// Runtime config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial blog state (JSON).
    #[arg(long)]
    state: Option<PathBuf>,

    /// Number of scripted updates to run.
    #[arg(long, default_value_t = 5)]
    steps: usize,

    /// Post id both cards are bound to.
    #[arg(long, default_value_t = 2)]
    post: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let state = match cli.state.as_deref() {
        Some(path) => load_state(path)?,
        None => seed(),
    };
    run(&cli, config, state)
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    let config = match path {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn load_state(path: &Path) -> Result<BlogState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing state file {}", path.display()))
}

fn run(cli: &Cli, config: RuntimeConfig, state: BlogState) -> Result<()> {
    let store = Store::new(state);
    let mut host = Host::with_config(store.clone(), config);
    let posts = host.mount(posts_card(), PostsOwnProps { id: cli.post });
    let post = host.mount(PostCard, PostCardProps { id: cli.post });
    tracing::info!(posts = %posts, post = %post, "mounted blog cards");

    println!("== initial ==");
    print_view(&host, posts);
    print_view(&host, post);

    for n in 0..cli.steps {
        let step = Step::nth(n);
        let version = store.update(|state| step.apply(state));
        let report = host.flush().context("flushing render queue")?;
        println!(
            "== step {} ({step}) v{version}: {} render(s) ==",
            n + 1,
            report.render_count()
        );
        for id in &report.rendered {
            print_view(&host, *id);
        }
    }
    Ok(())
}

fn print_view(host: &Host<BlogState>, id: ComponentId) {
    if let Some(view) = host.view(id) {
        print!("{id}\n{view}");
    }
}
