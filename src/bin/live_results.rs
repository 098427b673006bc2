use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use live_results::{
    client::HttpClient,
    config::Config,
    model::Locale,
    notify::TracingNotifier,
    telemetry::{initialize_jaeger_subscriber, initialize_stdout_subscriber},
    translate::{translate_or_original, MyMemoryTranslator, MYMEMORY_ENDPOINT},
    view::{CycleOutcome, LiveResults, ResultsSnapshot},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const RENDER_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "live-results")]
#[command(about = "live election results client", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "false")]
    tracing_jaeger: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Follow the results live. Type en/hi/mr to switch language, p to pause/resume, r to refresh, q to quit
    Watch {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Fetch once and print the results as JSON
    Snapshot {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Machine-translate a text from english
    Translate {
        #[arg(long)]
        text: String,
        #[arg(long)]
        to: String,
        #[arg(long, default_value = MYMEMORY_ENDPOINT)]
        endpoint: String,
    },
}

/// Config file plus per-field overrides
#[derive(Debug, Args)]
struct ConfigArgs {
    #[arg(long)]
    config_path: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    locale: Option<String>,
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    #[arg(long)]
    expected_voters: Option<u64>,
    #[arg(long)]
    animation_duration_ms: Option<u64>,
    #[arg(long)]
    animation_steps: Option<u32>,
}

impl ConfigArgs {
    async fn load(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config_path {
            Some(path) => Config::from_path(path).await?,
            None => Config::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(locale) = &self.locale {
            config.locale = Locale::parse(locale)?;
        }
        if let Some(interval_ms) = self.poll_interval_ms {
            config.polling.interval_ms = interval_ms;
        }
        if let Some(expected_voters) = self.expected_voters {
            config.turnout.expected_voters = expected_voters;
        }
        if let Some(duration_ms) = self.animation_duration_ms {
            config.animation.duration_ms = duration_ms;
        }
        if let Some(steps) = self.animation_steps {
            config.animation.steps = steps;
        }

        config.validate()?;
        Ok(config)
    }
}

fn open_view(config: &Config) -> anyhow::Result<LiveResults> {
    let client = HttpClient::new(
        config.api.base_url.clone(),
        Duration::from_millis(config.api.request_timeout_ms),
    )?;

    Ok(LiveResults::new(
        Arc::new(client),
        Arc::new(TracingNotifier),
        config,
    ))
}

fn render(snapshot: &ResultsSnapshot) -> String {
    let mut out = String::new();
    let updated = snapshot
        .last_fetched_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    out.push_str(&format!(
        "\n[{}] {} votes | turnout {:.1}% of {} expected{} | {} | updated {}\n",
        snapshot.locale,
        snapshot.total_votes,
        snapshot.turnout_percentage,
        snapshot.expected_voters,
        if snapshot.is_animating { " ..." } else { "" },
        if snapshot.polling_enabled { "live" } else { "paused" },
        updated,
    ));

    if snapshot.is_loading {
        out.push_str("loading results...\n");
        return out;
    }

    out.push_str(&format!("{:>3}  {:<32} {:>10} {:>7}\n", "#", "party", "votes", "share"));
    for row in &snapshot.rows {
        out.push_str(&format!(
            "{:>3}  {:<32} {:>10} {:>6}%\n",
            row.rank,
            format!("{} {}", row.symbol, row.display_name),
            row.votes,
            row.percentage
        ));
    }

    out
}

async fn watch(config: Config) -> anyhow::Result<()> {
    let view = Arc::new(open_view(&config)?);
    if config.polling.auto_refresh {
        view.set_polling(true);
    } else {
        view.refresh_now().await;
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut stdout = tokio::io::stdout();
    let mut render_tick = tokio::time::interval(RENDER_INTERVAL);
    let mut last_rendered: Option<ResultsSnapshot> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = stdin.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };

                match line.trim() {
                    "" => {}
                    "q" => break,
                    "p" => view.set_polling(!view.polling_enabled()),
                    "r" => {
                        // runs in the background so rendering and ctrl-c stay responsive.
                        // A refresh already in flight absorbs this one
                        let view = view.clone();
                        tokio::spawn(async move { view.refresh_now().await });
                    }
                    other => match Locale::parse(other) {
                        Ok(locale) => view.on_locale_change(locale),
                        Err(_) => eprintln!("unknown command {:?} (en|hi|mr|p|r|q)", other),
                    },
                }
            }
            _ = render_tick.tick() => {
                let snapshot = view.get_results(view.locale());
                if last_rendered.as_ref() != Some(&snapshot) {
                    stdout.write_all(render(&snapshot).as_bytes()).await?;
                    stdout.flush().await?;
                    last_rendered = Some(snapshot);
                }
            }
        }
    }

    view.teardown();
    Ok(())
}

async fn snapshot(config: Config) -> anyhow::Result<()> {
    let view = open_view(&config)?;
    if view.refresh_now().await != CycleOutcome::Applied {
        bail!("unable to fetch live results from {}", config.api.base_url);
    }

    let snapshot = view.get_results(config.locale);
    view.teardown();

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(serde_json::to_string_pretty(&snapshot)?.as_bytes())
        .await?;
    stdout.write_all(b"\n").await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    if args.tracing_jaeger {
        initialize_jaeger_subscriber("http://localhost:4317/v1/traces")?;
    } else {
        initialize_stdout_subscriber();
    }

    match args.command {
        Commands::Watch { config } => watch(config.load().await?).await?,
        Commands::Snapshot { config } => snapshot(config.load().await?).await?,
        Commands::Translate { text, to, endpoint } => {
            let target = Locale::parse(&to)?;
            let translator = MyMemoryTranslator::new(endpoint);
            let translated = translate_or_original(&translator, &text, target).await;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(translated.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }

    Ok(())
}
