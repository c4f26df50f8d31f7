use std::{io::Read, path::PathBuf};

use anyhow::{bail, Context as _};
use clap::{command, Arg, ArgAction, ArgMatches, Command};
use log::warn;
use serde::Serialize;

use mdcms::{
    context::{Context, DEFAULT_PAGES_DIR, DEFAULT_ROOT, ROOT_ENV},
    renderer::{render_card, render_preview},
    snapshot::save_snapshot,
    Backend, NewPage, ReadOutcome, Workspace,
};

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).help(help).required(true)
}

fn cli() -> Command {
    command!()
        .args(&[
            Arg::new("root")
                .long("root")
                .help("Content root directory. Falls back to $MDCMS_ROOT, then `content`.")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
            Arg::new("snapshot")
                .long("snapshot")
                .help("Serve a JSON snapshot read-only instead of the content root.")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
            Arg::new("pages-dir")
                .long("pages")
                .help("Root-relative directory holding pages.")
                .default_value(DEFAULT_PAGES_DIR)
                .global(true),
        ])
        .subcommand_required(true)
        .subcommand(
            Command::new("ls").about("List a directory as JSON").args(&[
                Arg::new("dir").help("Root-relative directory"),
                Arg::new("recursive")
                    .short('r')
                    .long("recursive")
                    .action(ArgAction::SetTrue),
            ]),
        )
        .subcommand(
            Command::new("tree")
                .about("Print a directory outline")
                .arg(Arg::new("dir").help("Root-relative directory")),
        )
        .subcommand(
            Command::new("cat")
                .about("Print a file")
                .arg(path_arg("path", "Root-relative file")),
        )
        .subcommand(
            Command::new("put")
                .about("Replace a file with stdin")
                .arg(path_arg("path", "Root-relative file")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a file")
                .arg(path_arg("path", "Root-relative file")),
        )
        .subcommand(
            Command::new("show")
                .about("Print the decoded document as JSON")
                .arg(path_arg("path", "Root-relative markdown file")),
        )
        .subcommand(
            Command::new("preview")
                .about("Render a document as HTML")
                .arg(path_arg("path", "Root-relative markdown file")),
        )
        .subcommand(
            Command::new("pages").about("List pages as JSON").args(&[
                Arg::new("recursive")
                    .short('r')
                    .long("recursive")
                    .action(ArgAction::SetTrue),
                Arg::new("html")
                    .long("html")
                    .help("Render listing cards instead of JSON")
                    .action(ArgAction::SetTrue),
            ]),
        )
        .subcommand(
            Command::new("new-page")
                .about("Create a page; the body is read from stdin")
                .args(&[
                    Arg::new("title").long("title").required(true),
                    Arg::new("slug").long("slug"),
                    Arg::new("author").long("author"),
                    Arg::new("draft")
                        .long("draft")
                        .help("Create the page unpublished")
                        .action(ArgAction::SetTrue),
                ]),
        )
        .subcommand(
            Command::new("export")
                .about("Write every text file under the root to a JSON snapshot")
                .arg(
                    Arg::new("out")
                        .help("Snapshot file to write")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Global args are propagated down, so the subcommand sees them wherever they were given.
fn global_arg<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> Option<&'a T> {
    matches
        .subcommand()
        .and_then(|(_, sub)| sub.get_one::<T>(name))
        .or_else(|| matches.get_one::<T>(name))
}

fn context_from(matches: &ArgMatches) -> Context {
    let root = global_arg::<PathBuf>(matches, "root")
        .cloned()
        .or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    Context {
        root,
        snapshot: global_arg::<PathBuf>(matches, "snapshot").cloned(),
        pages_dir: global_arg::<String>(matches, "pages-dir")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PAGES_DIR.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading stdin")?;
    Ok(text)
}

fn str_arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.get_one::<String>(name).map_or("", String::as_str)
}

async fn read_text(ws: &Workspace<Backend>, path: &str) -> anyhow::Result<String> {
    match ws.read(path).await {
        ReadOutcome::Found(text) => Ok(text),
        ReadOutcome::NotFound => bail!("{path}: not found"),
        ReadOutcome::Fault(e) => Err(e).with_context(|| format!("reading {path}")),
    }
}

async fn run(ws: &Workspace<Backend>, ctx: &Context, matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("ls", sub)) => {
            let entries = ws.list(str_arg(sub, "dir"), sub.get_flag("recursive")).await?;
            print_json(&entries)?;
        }
        Some(("tree", sub)) => {
            print!("{}", ws.tree(str_arg(sub, "dir")).await?.render());
        }
        Some(("cat", sub)) => {
            print!("{}", read_text(ws, str_arg(sub, "path")).await?);
        }
        Some(("put", sub)) => {
            let path = str_arg(sub, "path");
            ws.write(path, &read_stdin()?)
                .await
                .with_context(|| format!("writing {path}"))?;
        }
        Some(("rm", sub)) => {
            let path = str_arg(sub, "path");
            ws.delete(path)
                .await
                .with_context(|| format!("deleting {path}"))?;
        }
        Some(("show", sub)) => {
            let path = str_arg(sub, "path");
            let parsed = ws
                .load_document(path)
                .await
                .with_context(|| format!("loading {path}"))?;
            print_json(&parsed.document)?;
        }
        Some(("preview", sub)) => {
            let path = str_arg(sub, "path");
            let parsed = ws
                .load_document(path)
                .await
                .with_context(|| format!("loading {path}"))?;
            println!("{}", render_preview(&parsed.document));
        }
        Some(("pages", sub)) => {
            let pages = ws.pages(&ctx.pages_dir, sub.get_flag("recursive")).await?;
            if sub.get_flag("html") {
                for page in &pages {
                    println!("{}", render_card(&page.document));
                }
            } else {
                print_json(&pages)?;
            }
        }
        Some(("new-page", sub)) => {
            let page = NewPage {
                title: str_arg(sub, "title").to_string(),
                slug: sub.get_one::<String>("slug").cloned(),
                body: read_stdin()?,
                published: !sub.get_flag("draft"),
                author: sub.get_one::<String>("author").cloned(),
            };
            let document = ws.create_page(&ctx.pages_dir, page).await?;
            print_json(&document)?;
        }
        Some(("export", sub)) => {
            let Some(out) = sub.get_one::<PathBuf>("out") else {
                bail!("export needs an output file");
            };
            let snapshot = ws.snapshot().await;
            if snapshot.is_empty() {
                warn!("nothing to export under {:?}", ws.root());
            }
            save_snapshot(out, &snapshot)?;
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = cli().get_matches();
    let ctx = context_from(&matches);
    let ws = ctx.open()?;
    run(&ws, &ctx, &matches).await
}
