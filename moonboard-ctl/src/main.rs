use std::{collections::HashSet, path::PathBuf};

use anyhow::Context;
use moonboard_client::{
    api::{self, UserId},
    tree, Comment,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON file holding the flat comment list of a post, as the board sends it
    #[structopt(short, long)]
    file: PathBuf,

    /// Mark the comments written by this user
    #[structopt(short, long)]
    viewer: Option<u64>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the reply tree
    Tree,

    /// Print counts about the thread
    Stats,
}

fn read_flat(opt: &Opt) -> anyhow::Result<Vec<api::Comment>> {
    let data = std::fs::read_to_string(&opt.file)
        .with_context(|| format!("reading {}", opt.file.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", opt.file.display()))
}

fn print_tree(tree: &[Comment], viewer: Option<UserId>) {
    let mut stack = tree.iter().rev().map(|c| (0, c)).collect::<Vec<_>>();
    while let Some((depth, c)) = stack.pop() {
        let own = match viewer == Some(c.author_id) {
            true => " (you)",
            false => "",
        };
        let liked = match c.liked_by_me {
            true => "*",
            false => "",
        };
        println!(
            "{:indent$}#{} {}{}: {} [{}{} likes]",
            "",
            c.id.0,
            c.display_name,
            own,
            c.body.replace('\n', " "),
            c.like_count,
            liked,
            indent = depth * 2,
        );
        stack.extend(c.children.iter().rev().map(|r| (depth + 1, r)));
    }
    println!("{} comments", Comment::count(tree));
}

fn print_stats(flat: &[api::Comment], tree: &[Comment]) {
    let ids = flat.iter().map(|c| c.id).collect::<HashSet<_>>();
    let orphans = flat
        .iter()
        .filter(|c| matches!(c.parent(), Some(p) if !ids.contains(&p)))
        .count();
    let mut max_depth = 0;
    let mut stack = tree.iter().map(|c| (0, c)).collect::<Vec<_>>();
    while let Some((depth, c)) = stack.pop() {
        max_depth = std::cmp::max(max_depth, depth);
        stack.extend(c.children.iter().map(|r| (depth + 1, r)));
    }
    println!("records:    {}", flat.len());
    println!("displayed:  {}", Comment::count(tree));
    println!("top-level:  {}", tree.len());
    println!("orphans:    {}", orphans);
    println!("max depth:  {}", max_depth);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let flat = read_flat(&opt)?;
    tracing::debug!(num_records = flat.len(), "read comment records");
    match opt.cmd {
        Command::Tree => print_tree(&tree::build(flat), opt.viewer.map(UserId)),
        Command::Stats => {
            let tree = tree::build(flat.clone());
            print_stats(&flat, &tree);
        }
    }

    Ok(())
}
