use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use remedi_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remedi")]
#[command(about = "Medication schedule and dose status tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the current instant (local, e.g. 2024-01-15T08:30)
    #[arg(long, global = true)]
    at: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's doses with status (default)
    Today,

    /// Show the dose schedule for another day
    Schedule {
        /// Day to view (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Show dose status counts for a day
    Summary {
        /// Day to summarize (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a medicine as taken
    Take {
        /// Medicine id from the roster
        id: String,
    },

    /// Add a medicine to the roster
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        dosage: String,

        /// Dose-time as a 12-hour string (repeat for multiple daily doses)
        #[arg(long = "time")]
        times: Vec<String>,

        /// Take as needed instead of on a schedule
        #[arg(long)]
        as_needed: bool,

        /// Time-of-day bucket (morning, afternoon, evening, night)
        #[arg(long)]
        period: Option<String>,
    },

    /// Clear every taken mark (start-of-day reset)
    Reset,

    /// Export the dose history log to CSV
    Export {
        /// Clean up processed log files after export
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        remedi_core::logging::init_with_level("debug");
    } else {
        remedi_core::logging::init();
    }

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let now = resolve_now(cli.at.as_deref())?;
    let status_config = config.status_config();

    match cli.command {
        Some(Commands::Today) | None => cmd_view(data_dir, now.date(), now, &status_config, true),
        Some(Commands::Schedule { date }) => {
            let target = parse_date(&date)?;
            cmd_view(data_dir, target, now, &status_config, false)
        }
        Some(Commands::Summary { date }) => {
            let target = match date {
                Some(d) => parse_date(&d)?,
                None => now.date(),
            };
            cmd_summary(data_dir, target, now, &status_config)
        }
        Some(Commands::Take { id }) => cmd_take(data_dir, id.as_str()),
        Some(Commands::Add {
            name,
            dosage,
            times,
            as_needed,
            period,
        }) => cmd_add(data_dir, name, dosage, times, as_needed, period),
        Some(Commands::Reset) => cmd_reset(data_dir),
        Some(Commands::Export { cleanup }) => cmd_export(data_dir, cleanup),
    }
}

fn roster_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("roster.json")
}

fn dose_log_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("log").join("doses.log")
}

/// Sample the clock once, or honor the --at override
fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .map_err(|e| Error::Other(format!("Invalid --at value '{}': {}", s, e))),
        None => Ok(Local::now().naive_local()),
    }
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::Other(format!("Invalid date '{}': {}", date, e)))
}

fn cmd_view(
    data_dir: PathBuf,
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
    today_view: bool,
) -> Result<()> {
    let roster = MedicineRoster::load(&roster_path(&data_dir))?;

    if roster.medicines.is_empty() {
        println!("No medicines in your roster. Add one with 'remedi add'.");
        return Ok(());
    }

    let mut entries = expand_doses(&roster.medicines, target_date, now, config);
    if today_view {
        relabel_missed_as_overdue(&mut entries);
    }
    sort_chronological(&mut entries);

    let header = if today_view { "TODAY" } else { "SCHEDULE" };
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} — {}", header, target_date);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for entry in &entries {
        let time = if entry.time.is_empty() {
            "--:--"
        } else {
            entry.time.as_str()
        };
        print!("  {:>9}  {}", time, entry.name);
        if !entry.dosage.is_empty() {
            print!(" {}", entry.dosage);
        }
        print!("  [{}]", entry.status);
        if entry.total_doses > 1 {
            print!("  (dose {}/{})", entry.dose_index + 1, entry.total_doses);
        }
        if let Some(period) = entry.period {
            print!("  {}", period.as_str());
        }
        println!();
    }

    let schedules = flatten_schedules(&roster.medicines);
    let summary = summarize(&schedules, target_date, now, config);
    println!();
    println!(
        "  {} scheduled: {} taken, {} {}, {} pending, {} upcoming",
        summary.total,
        summary.taken,
        summary.missed,
        if today_view { "overdue" } else { "missed" },
        summary.pending,
        summary.upcoming
    );

    if today_view && has_missed(&schedules, target_date, now, config) {
        println!("  ! Some doses are overdue");
    }

    println!();
    Ok(())
}

fn cmd_summary(
    data_dir: PathBuf,
    target_date: NaiveDate,
    now: NaiveDateTime,
    config: &StatusConfig,
) -> Result<()> {
    let roster = MedicineRoster::load(&roster_path(&data_dir))?;
    let schedules = flatten_schedules(&roster.medicines);
    let summary = summarize(&schedules, target_date, now, config);

    println!("Summary for {}", target_date);
    println!("  total:    {}", summary.total);
    println!("  taken:    {}", summary.taken);
    println!("  missed:   {}", summary.missed);
    println!("  pending:  {}", summary.pending);
    println!("  upcoming: {}", summary.upcoming);

    Ok(())
}

fn cmd_take(data_dir: PathBuf, id: &str) -> Result<()> {
    let taken_at = Utc::now();
    let mut record = None;

    MedicineRoster::update(&roster_path(&data_dir), |roster| {
        if !roster.mark_taken(id, taken_at) {
            return Err(Error::Roster(format!("No medicine with id '{}'", id)));
        }
        // mark_taken just confirmed the id exists
        if let Some(medicine) = roster.find(id) {
            record = Some(TakenRecord {
                medicine_id: medicine.id.clone(),
                name: medicine.name.clone(),
                dose_index: 0,
                taken_at,
            });
        }
        Ok(())
    })?;

    if let Some(record) = record {
        let mut sink = JsonlSink::new(dose_log_path(&data_dir));
        sink.append(&record)?;
        println!("✓ Marked {} as taken", record.name);
    }

    Ok(())
}

fn cmd_add(
    data_dir: PathBuf,
    name: String,
    dosage: String,
    times: Vec<String>,
    as_needed: bool,
    period: Option<String>,
) -> Result<()> {
    let period = period.as_deref().and_then(parse_period);

    let medicine = Medicine {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.clone(),
        dosage,
        period,
        as_needed,
        time: None,
        times,
        taken_at: None,
    };
    let id = medicine.id.clone();

    MedicineRoster::update(&roster_path(&data_dir), |roster| {
        roster.medicines.push(medicine);
        Ok(())
    })?;

    println!("✓ Added {} ({})", name, id);
    Ok(())
}

fn cmd_reset(data_dir: PathBuf) -> Result<()> {
    let mut cleared = 0;
    MedicineRoster::update(&roster_path(&data_dir), |roster| {
        cleared = roster.clear_taken();
        Ok(())
    })?;

    println!("✓ Cleared taken marks on {} medicines", cleared);
    Ok(())
}

fn cmd_export(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let log_path = dose_log_path(&data_dir);
    let csv_path = data_dir.join("history.csv");

    if !log_path.exists() {
        println!("No dose log found - nothing to export.");
        return Ok(());
    }

    let count = log_to_csv_and_archive(&log_path, &csv_path)?;

    println!("✓ Exported {} records to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let log_dir = log_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or(data_dir);
        let cleaned = remedi_core::export::cleanup_processed_logs(&log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

/// Parse a period string, ignoring unknown values with a notice
fn parse_period(s: &str) -> Option<Period> {
    match s.to_lowercase().as_str() {
        "morning" => Some(Period::Morning),
        "afternoon" => Some(Period::Afternoon),
        "evening" => Some(Period::Evening),
        "night" => Some(Period::Night),
        other => {
            eprintln!("Unknown period: {}. Ignoring.", other);
            None
        }
    }
}
