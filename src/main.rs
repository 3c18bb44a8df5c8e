use anyhow::{anyhow, Context, Result};
use obwatch_view::{Config, ObwatchApi, OrderbookSession, RefreshOutcome, SortKey};
use std::sync::Arc;

struct Args {
    url: Option<String>,
    search: Option<String>,
    sorts: Vec<SortKey>,
    page: usize,
    highlight: Option<String>,
}

fn print_usage(bin: &str) {
    eprintln!("Usage:");
    eprintln!(
        "  {} [--url <obwatch_url>] [--search <text>] [--sort <key>]... [--page <n>] [--highlight <nick>]",
        bin
    );
    eprintln!();
    eprintln!("  --url        ob-watcher base URL (default: $OBWATCH_URL or http://localhost:62601)");
    eprintln!("  --search     only show offers containing <text> in any column");
    eprintln!("  --sort       select a column; repeating the same column toggles");
    eprintln!("               ascending → descending → unsorted");
    eprintln!("  --page       zero-based page index (clamped to the last page)");
    eprintln!("  --highlight  flag offers by this counterparty nickname");
    eprintln!();
    eprintln!("  Sort keys:");
    eprintln!("    type, counterparty, fee, minimumSize, maximumSize,");
    eprintln!("    minerFeeContribution, bondValue");
}

fn parse_args(raw_args: &[String]) -> Result<Args> {
    let mut args = Args {
        url: None,
        search: None,
        sorts: Vec::new(),
        page: 0,
        highlight: None,
    };
    let mut i = 1;
    while i < raw_args.len() {
        let flag = raw_args[i].as_str();
        i += 1;
        let value = raw_args
            .get(i)
            .cloned()
            .ok_or_else(|| anyhow!("{} requires a value", flag))?;
        match flag {
            "--url" => args.url = Some(value),
            "--search" => args.search = Some(value),
            "--sort" => args.sorts.push(value.parse().map_err(|e: String| anyhow!(e))?),
            "--page" => {
                args.page = value
                    .parse()
                    .with_context(|| format!("invalid page '{}'", value))?
            }
            "--highlight" => args.highlight = Some(value),
            other => return Err(anyhow!("unknown argument '{}'", other)),
        }
        i += 1;
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw_args: Vec<String> = std::env::args().collect();
    let bin = raw_args.first().map(String::as_str).unwrap_or("obwatch-view");
    if raw_args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(bin);
        return Ok(());
    }
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(bin);
            std::process::exit(1);
        }
    };

    let mut config = Config::from_env()?;
    if let Some(url) = args.url {
        config.obwatch_url = url;
    }

    let api = ObwatchApi::new(&config)?;
    let mut session = OrderbookSession::new(Arc::new(api), &config);

    eprintln!("Loading orderbook from {}...", config.obwatch_url);
    if let RefreshOutcome::Failed(e) = session.open().await {
        eprintln!("{}", e.display_message());
    }

    if let Some(search) = &args.search {
        session.set_search_text(search);
    }
    for key in args.sorts {
        session.select_sort(key);
    }
    if let Some(nick) = args.highlight.as_deref() {
        session.set_highlight_identity(Some(nick));
        session.set_highlight_enabled(true);
    }
    session.set_page(args.page);

    let view = session.view();
    eprintln!(
        "{} (page {}/{})",
        view.view.summary(),
        view.view.page + 1,
        view.view.total_pages
    );
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
