use crate::config::{ConfigError, load_config};
use crate::ir::{Direction, Member};
use crate::layout_dump::write_layout_dump;
use crate::visibility::CollapseState;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Lay out a family tree from a JSON member list")]
pub struct Args {
    /// Member list (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Collapse the subtree below this unit id (repeatable)
    #[arg(long = "collapse", value_name = "UNIT_ID")]
    pub collapse: Vec<String>,

    /// Layout direction: TB, TD or LR
    #[arg(short = 'd', long = "direction")]
    pub direction: Option<String>,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(token) = args.direction.as_deref() {
        config.layout.direction = parse_direction(token)?;
    }

    let input = read_input(args.input.as_deref())?;
    let members = parse_members(&input)?;
    let collapsed: CollapseState = args.collapse.iter().cloned().collect();

    let layout = crate::layout_family(&members, &collapsed, &config);
    info!(
        members = members.len(),
        units = layout.units.len(),
        edges = layout.edges.len(),
        "layout computed"
    );
    write_layout_dump(args.output.as_deref(), &layout)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn parse_direction(token: &str) -> Result<Direction, ConfigError> {
    Direction::from_token(token).ok_or_else(|| ConfigError::UnknownDirection(token.to_string()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Accepts a bare array of members or an object with a `members` array.
fn parse_members(input: &str) -> Result<Vec<Member>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MemberFile {
        List(Vec<Member>),
        Wrapped { members: Vec<Member> },
    }

    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: MemberFile = serde_json::from_str(input).context("invalid member list")?;
    Ok(match parsed {
        MemberFile::List(members) | MemberFile::Wrapped { members } => members,
    })
}
