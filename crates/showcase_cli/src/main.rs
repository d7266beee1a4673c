//! CLI entry point.
//!
//! # Responsibility
//! - Without `--db`, print core linkage info as a smoke probe.
//! - With `--db`, print one sampled page as JSON lines: a header line with
//!   the effective seed and window, then one line per item.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use showcase_core::{
    init_logging, open_db, LabelPathKind, SampleKind, SamplePage, SampleRequest, SamplingConfig,
    SamplingService, SqliteSamplingRepository,
};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "showcase_cli")]
#[command(version, about = "Seeded random sampling over a showcase catalog", long_about = None)]
struct Args {
    /// SQLite database file; omit to print version info only
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// What to sample
    #[arg(long, value_enum, default_value_t = KindArg::Creators)]
    kind: KindArg,

    /// Seed to replay (0..=4294967295); drawn when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Offset into the seeded ordering
    #[arg(long, default_value_t = 0)]
    from: u32,

    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Label path such as `studio/ana` or `hall/main/spring`; repeatable
    #[arg(long = "filter", value_name = "SLUG")]
    filters: Vec<String>,

    /// Optional ceiling for `--count`; any count is honored when unset
    #[arg(long, env = "SHOWCASE_MAX_COUNT")]
    max_count: Option<String>,

    #[arg(long, env = "SHOWCASE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging stays off when unset
    #[arg(long, env = "SHOWCASE_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Creators,
    Programs,
    Works,
    Venues,
}

impl From<KindArg> for SampleKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Creators => Self::Creators,
            KindArg::Programs => Self::Programs,
            KindArg::Works => Self::Works,
            KindArg::Venues => Self::Venues,
        }
    }
}

#[derive(Serialize)]
struct PageHeader {
    kind: SampleKind,
    seed: u32,
    from: u32,
    count: u32,
    returned: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let Some(db_path) = args.db.as_deref() else {
        println!("showcase_core ping={}", showcase_core::ping());
        println!("showcase_core version={}", showcase_core::core_version());
        return Ok(());
    };

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args
            .log_level
            .as_deref()
            .unwrap_or_else(|| showcase_core::default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = SamplingConfig::default().with_max_count_override(args.max_count.as_deref())?;
    let kind = SampleKind::from(args.kind);
    let request = build_request(&args, kind)?;

    let mut conn = open_db(db_path)?;
    let repo = SqliteSamplingRepository::try_new(&mut conn)?;
    let mut service = SamplingService::with_config(repo, config);

    let mut out = std::io::stdout().lock();
    match kind {
        SampleKind::Creators => write_page(&mut out, kind, &service.sample_creators(&request)?)?,
        SampleKind::Programs => write_page(&mut out, kind, &service.sample_programs(&request)?)?,
        SampleKind::Works => write_page(&mut out, kind, &service.sample_works(&request)?)?,
        SampleKind::Venues => write_page(&mut out, kind, &service.sample_venues(&request)?)?,
    }
    log::logger().flush();
    Ok(())
}

fn build_request(args: &Args, kind: SampleKind) -> Result<SampleRequest, Box<dyn Error>> {
    let mut request = SampleRequest::new(args.count).starting_at(args.from);
    if let Some(seed) = args.seed {
        request = request.with_raw_seed(seed)?;
    }
    for slug in &args.filters {
        request = request.with_filter_slug(filter_kind(kind, slug), slug)?;
    }
    Ok(request)
}

/// Picks the label-path kind from the segment count; the service rejects
/// kinds the operation cannot apply.
fn filter_kind(kind: SampleKind, slug: &str) -> LabelPathKind {
    let segments = slug.split('/').count();
    match (kind, segments) {
        (_, 3) => LabelPathKind::Program,
        (SampleKind::Programs | SampleKind::Venues, _) => LabelPathKind::Venue,
        _ => LabelPathKind::Creator,
    }
}

fn write_page<T: Serialize>(
    out: &mut impl Write,
    kind: SampleKind,
    page: &SamplePage<T>,
) -> Result<(), Box<dyn Error>> {
    let header = PageHeader {
        kind,
        seed: page.seed.value(),
        from: page.window.from,
        count: page.window.count.get(),
        returned: page.items.len(),
    };
    writeln!(out, "{}", serde_json::to_string(&header)?)?;
    for item in &page.items {
        writeln!(out, "{}", serde_json::to_string(item)?)?;
    }
    Ok(())
}
