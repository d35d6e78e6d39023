use crate::options::Args;
use anyhow::Context;
use clap::Parser;
use std::path::Path;

mod options {
    use std::path::PathBuf;

    #[derive(Debug, clap::Parser)]
    #[command(
        name = "stockmerge",
        about = "A tool to merge two stock extracts and learn about prices and aged stock"
    )]
    pub enum Args {
        /// Join two stock extracts on their product key and compute prices and aged stock from their purchase history.
        Reconcile {
            /// The CSV export of the first source.
            #[clap(long, short = 'a')]
            source_a: PathBuf,
            /// The CSV export of the second source.
            #[clap(long, short = 'b')]
            source_b: PathBuf,
            #[clap(flatten)]
            config: Config,
            /// The file to write the merged table to.
            ///
            /// Defaults to stdout.
            #[clap(long, short = 'o', conflicts_with = "output_dir")]
            output: Option<PathBuf>,
            /// A directory to write the merged table into, using a file name with the current date and time.
            #[clap(long)]
            output_dir: Option<PathBuf>,
        },
        /// Print the header line of the merged table.
        Headers {
            #[clap(flatten)]
            config: Config,
        },
    }

    #[derive(Debug, clap::Args)]
    pub struct Config {
        /// A RON file with all options to use, defaults are used for everything it doesn't mention.
        #[clap(long, short = 'c')]
        pub config: Option<PathBuf>,
        /// The amount of purchases to consider per product and source.
        #[clap(long)]
        pub history_limit: Option<usize>,
        /// Stock bought more than this many days before the reference date is aged.
        #[clap(long)]
        pub aging_days: Option<u32>,
        #[clap(long, short = 'd')]
        pub delimiter: Option<char>,
        /// The date to compute the age of stock against, as YYYY-MM-DD. Defaults to now.
        #[clap(long)]
        pub as_of: Option<String>,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = options::Args::parse();
    match args {
        Args::Reconcile {
            source_a,
            source_b,
            config,
            output,
            output_dir,
        } => {
            let options = load_options(&config)?;
            let reference_time = reference_time(config.as_of.as_deref())?;
            let (a, b) = read_both(&source_a, &source_b)?;

            let mut buf = Vec::<u8>::new();
            let outcome = stockmerge::reconcile(
                std::io::Cursor::new(a),
                std::io::Cursor::new(b),
                &mut buf,
                reference_time,
                options.clone(),
            )?;
            log::info!(
                "Wrote {} rows, skipped {} rows without key, saw {} duplicate keys",
                outcome.rows_written,
                outcome.skipped_without_key,
                outcome.duplicate_keys
            );

            let output = output.or_else(|| {
                output_dir.map(|dir| {
                    dir.join(stockmerge::reconcile::output_file_name(
                        &options,
                        reference_time,
                    ))
                })
            });
            match output {
                Some(path) => {
                    std::fs::write(&path, &buf).with_context(|| {
                        format!("Could not write merged table to '{}'", path.display())
                    })?;
                    log::info!("Merged table written to '{}'", path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().lock().write_all(&buf)?;
                }
            }
        }
        Args::Headers { config } => {
            let options = load_options(&config)?;
            let mut out = csv::Writer::from_writer(std::io::stdout().lock());
            out.write_record(stockmerge::assemble::headers(&options))?;
            out.flush()?;
        }
    };
    Ok(())
}

fn load_options(config: &options::Config) -> anyhow::Result<stockmerge::reconcile::Options> {
    let mut options: stockmerge::reconcile::Options = match &config.config {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Could not open config file at '{}'", path.display()))?;
            ron::de::from_reader(file)
                .with_context(|| format!("Could not decode config file at '{}'", path.display()))?
        }
        None => Default::default(),
    };
    if let Some(limit) = config.history_limit {
        options.history_limit = limit;
    }
    if let Some(days) = config.aging_days {
        options.aging_days = days;
    }
    if let Some(delimiter) = config.delimiter {
        options.delimiter = delimiter;
    }
    Ok(options)
}

fn reference_time(as_of: Option<&str>) -> anyhow::Result<time::OffsetDateTime> {
    static FORMAT: &[time::format_description::FormatItem<'static>] =
        time::macros::format_description!("[year]-[month]-[day]");
    Ok(match as_of {
        Some(date) => time::Date::parse(date, FORMAT)
            .with_context(|| format!("Could not parse '{date}' as YYYY-MM-DD"))?
            .midnight()
            .assume_utc(),
        None => time::OffsetDateTime::now_utc(),
    })
}

/// Read both extracts at the same time, failing if either of them can't be read.
fn read_both(a: &Path, b: &Path) -> anyhow::Result<(Vec<u8>, Vec<u8>)> {
    let read = |p: &Path| {
        std::fs::read(p).with_context(|| format!("Could not read from CSV file at '{}'", p.display()))
    };
    std::thread::scope(|s| {
        let from_a = s.spawn(|| read(a));
        let from_b = read(b);
        let from_a = from_a
            .join()
            .map_err(|_| anyhow::anyhow!("Reading '{}' panicked", a.display()))?;
        Ok((from_a?, from_b?))
    })
}
