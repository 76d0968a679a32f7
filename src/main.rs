use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use econscraper::{
    config::{Indicator, Settings, UNEMPLOYMENT},
    export::export_table,
    fetch::IndicatorClient,
    ingest::run_sweep,
    report::{self, render, YearRange},
    store::Store,
};
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "World Bank indicator scraper and viewer")]
struct Cli {
    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite location (`sqlite://path` or a plain path)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Indicator API host
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every catalog entry and replace its table
    Update {
        /// Print the sweep report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored tables
    Tables,
    /// Dump one table
    Show { table: String },
    /// Key metrics for one country
    Summary {
        #[arg(long, default_value = "MX")]
        country: String,
        #[arg(long, default_value = "gdp")]
        indicator: Indicator,
        /// Observations averaged for the "recent" mean
        #[arg(long, default_value_t = 5)]
        recent: usize,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Year-by-year table across countries
    Compare {
        #[arg(long, default_value = "gdp")]
        indicator: Indicator,
        /// Comma-separated country codes; all catalog countries when omitted
        #[arg(long, value_delimiter = ',')]
        countries: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Countries ordered by their latest value
    Ranking {
        #[arg(long, default_value = "gdp")]
        indicator: Indicator,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Write one table to a Parquet file
    Export { table: String, path: PathBuf },
}

#[derive(Args, Debug, Clone, Copy)]
struct RangeArgs {
    /// First year to include
    #[arg(long)]
    from: Option<i32>,
    /// Last year to include
    #[arg(long)]
    to: Option<i32>,
}

impl RangeArgs {
    fn resolve(&self, covering: Option<YearRange>) -> Option<YearRange> {
        YearRange::resolve(self.from, self.to, covering)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = cli.database {
        settings.database = db;
    }
    if let Some(base) = cli.api_base {
        settings.api_base = base;
    }
    let store = Store::new(&settings.database);

    match cli.command {
        Command::Update { json } => {
            let base = Url::parse(&settings.api_base)
                .with_context(|| format!("parsing api base {}", settings.api_base))?;
            let client =
                IndicatorClient::new(Client::new(), base).with_per_page(settings.per_page);
            info!("updating {} indicator tables", settings.catalog.len());

            let report = run_sweep(&client, &store, &settings.catalog.entries).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} written, {} without data, {} failed",
                    report.written(),
                    report.no_data(),
                    report.failed()
                );
            }
            if report.failed() > 0 {
                bail!("{} table(s) failed to update", report.failed());
            }
        }

        Command::Tables => {
            for name in store.list_tables()? {
                println!("{}", name);
            }
        }

        Command::Show { table } => {
            print!("{}", render::render_table(&store.read(&table)?));
        }

        Command::Summary {
            country,
            indicator,
            recent,
            range,
        } => {
            let entry = settings
                .catalog
                .find(&country, indicator.code())
                .with_context(|| format!("{} / {} is not in the catalog", country, indicator))?;
            let series = store.read_series(&entry.table_name(), &entry.column_name)?;
            let Some(window) = range.resolve(YearRange::covering(&series)) else {
                println!("no data for {}", entry.table_name());
                return Ok(());
            };
            let series = window.filter(&series);
            let title = format!(
                "{} – {} ({}–{})",
                settings.catalog.display_name(&country),
                entry.column_name,
                window.from,
                window.to
            );
            print!("{}", render::render_metrics(&title, &report::key_metrics(&series, recent)));

            // Mexico's page set GDP next to unemployment on shared years
            if indicator == Indicator::GdpGrowth {
                if let Some(other) = settings.catalog.find(&country, UNEMPLOYMENT) {
                    match store.read_series(&other.table_name(), &other.column_name) {
                        Ok(unemp) => {
                            let joined = report::join_on_year(&series, &window.filter(&unemp));
                            println!();
                            print!(
                                "{}",
                                render::render_joined(
                                    (entry.column_name.as_str(), other.column_name.as_str()),
                                    &joined
                                )
                            );
                        }
                        Err(e) => warn!(error = %e, "unemployment series unavailable"),
                    }
                }
            }
        }

        Command::Compare {
            indicator,
            countries,
            range,
        } => {
            let mut all = report::load_countries(&store, &settings.catalog, indicator.code())?;
            if !countries.is_empty() {
                all.retain(|s| countries.iter().any(|c| c.eq_ignore_ascii_case(&s.code)));
            }
            if all.is_empty() {
                bail!("no stored data for {}", indicator);
            }
            let covering = YearRange::covering(all.iter().flat_map(|s| &s.records));
            if let Some(window) = range.resolve(covering) {
                all = all.iter().map(|s| s.restrict(window)).collect();
            }
            print!("{}", render::render_pivot(&report::pivot(&all)));
        }

        Command::Ranking { indicator, range } => {
            let mut all = report::load_countries(&store, &settings.catalog, indicator.code())?;
            let covering = YearRange::covering(all.iter().flat_map(|s| &s.records));
            if let Some(window) = range.resolve(covering) {
                all = all.iter().map(|s| s.restrict(window)).collect();
            }
            print!("{}", render::render_ranking(&report::ranking(&all)));
        }

        Command::Export { table, path } => {
            let rows = export_table(&store, &table, &path)?;
            println!("{} rows → {}", rows, path.display());
        }
    }

    Ok(())
}
