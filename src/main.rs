use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use clap::Parser;

use blkprobe::filter::FilterMode;
use blkprobe::logger::Logger;
use blkprobe::registry::{self, UsageClass};
use blkprobe::session::{ProbeOutcome, Session};
use blkprobe::tags::RequestMask;

/// Identifies what resides at the start of a block device, partition, or
/// image file: a filesystem, a RAID/container superblock, a swap area, or
/// a hibernation image, and prints its descriptive tags.
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    /// Device or image file to probe
    #[clap(value_name = "DEVICE", parse(from_os_str))]
    device: PathBuf,

    /// Byte offset of the window to probe (for a partition inside a
    /// whole-disk image)
    #[clap(short, long, default_value_t = 0)]
    offset: u64,

    /// Size of the window to probe; 0 queries the device
    #[clap(short, long, default_value_t = 0)]
    size: u64,

    /// Keep probing after the first match, printing every co-resident
    /// signature (e.g. an ISO-9660 image that also carries a vfat boot
    /// signature)
    #[clap(short, long)]
    all: bool,

    /// Probe only the named prober(s)
    #[clap(long, value_name = "NAME")]
    only_name: Vec<String>,

    /// Probe every prober except the named one(s)
    #[clap(long, value_name = "NAME")]
    not_name: Vec<String>,

    /// Probe only probers of the given usage class(es): filesystem, raid, crypto, other
    #[clap(long, value_name = "CLASS")]
    only_usage: Vec<String>,

    /// Probe every prober except the given usage class(es)
    #[clap(long, value_name = "CLASS")]
    not_usage: Vec<String>,

    /// Invert whichever filter was built from the options above
    #[clap(short, long)]
    invert: bool,

    /// Include LABEL_RAW/UUID_RAW alongside the normalized LABEL/UUID
    #[clap(long)]
    raw: bool,

    /// Suppress VERSION even when the prober has one
    #[clap(long)]
    no_version: bool,

    /// Print tags as JSON instead of NAME=VALUE lines
    #[clap(long)]
    json: bool,

    /// List the registered probers, in dispatch order, and exit
    #[clap(long)]
    list: bool,

    /// Set verbosity of the diagnostic trace (can be used multiple times)
    #[clap(short, long, parse(from_occurrences))]
    verbose: u32,

    /// Log file for the diagnostic trace
    #[clap(short, long, parse(from_os_str), value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn usage_class_from_str(s: &str) -> anyhow::Result<UsageClass>
{
    match s {
        "filesystem" => Ok(UsageClass::Filesystem),
        "raid" => Ok(UsageClass::Raid),
        "crypto" => Ok(UsageClass::Crypto),
        "other" => Ok(UsageClass::Other),
        other => Err(anyhow!("unknown usage class: {other}")),
    }
}

fn build_request_mask(args: &Args) -> RequestMask
{
    let mut mask = RequestMask::TYPE | RequestMask::USAGE | RequestMask::LABEL | RequestMask::UUID;
    if !args.no_version {
        mask |= RequestMask::VERSION;
    }
    if args.raw {
        mask |= RequestMask::LABEL_RAW;
        mask |= RequestMask::UUID_RAW;
    }
    mask
}

fn build_filter(args: &Args) -> anyhow::Result<Option<blkprobe::filter::Filter>>
{
    let registry_names = registry::names();
    let registry_usages = registry::usages();

    let mut filter = None;

    if !args.only_name.is_empty() {
        let names: Vec<&str> = args.only_name.iter().map(String::as_str).collect();
        let mut f = blkprobe::filter::Filter::new(registry_names.len());
        f.by_name(FilterMode::OnlyIn, &names, &registry_names);
        filter = Some(f);
    } else if !args.not_name.is_empty() {
        let names: Vec<&str> = args.not_name.iter().map(String::as_str).collect();
        let mut f = blkprobe::filter::Filter::new(registry_names.len());
        f.by_name(FilterMode::NotIn, &names, &registry_names);
        filter = Some(f);
    } else if !args.only_usage.is_empty() {
        let usages = args.only_usage.iter().map(|s| usage_class_from_str(s)).collect::<anyhow::Result<Vec<_>>>()?;
        let mut f = blkprobe::filter::Filter::new(registry_usages.len());
        f.by_usage(FilterMode::OnlyIn, &usages, &registry_usages);
        filter = Some(f);
    } else if !args.not_usage.is_empty() {
        let usages = args.not_usage.iter().map(|s| usage_class_from_str(s)).collect::<anyhow::Result<Vec<_>>>()?;
        let mut f = blkprobe::filter::Filter::new(registry_usages.len());
        f.by_usage(FilterMode::NotIn, &usages, &registry_usages);
        filter = Some(f);
    }

    if args.invert {
        if let Some(f) = &mut filter {
            f.invert();
        }
    }

    Ok(filter)
}

fn print_match(session: &Session, json: bool)
{
    if json {
        let mut map = serde_json::Map::new();
        for tag in session.values() {
            map.insert(tag.name.to_string(), serde_json::Value::String(tag.as_str_lossy().into_owned()));
        }
        println!("{}", serde_json::Value::Object(map));
    } else {
        for tag in session.values() {
            println!("{}={}", tag.name, tag.as_str_lossy());
        }
    }
}

fn run(args: Args) -> anyhow::Result<()>
{
    if args.list {
        for name in registry::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let log_file = match &args.log_file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .write(true)
                .open(path)
                .with_context(|| format!("{}", path.display()))?,
        ),
        None => None,
    };
    let logger = Logger::from_verbosity(args.verbose, log_file);

    let file: File = OpenOptions::new()
        .read(true)
        .open(&args.device)
        .with_context(|| format!("{}", args.device.display()))?;

    let mut session = Session::new().with_logger(logger);
    session.bind(file, args.offset, args.size)
        .with_context(|| format!("binding {}", args.device.display()))?;
    session.set_request(build_request_mask(&args));

    if let Some(filter) = build_filter(&args)? {
        session.install_filter(filter);
    }

    loop {
        match session.probe_next()? {
            ProbeOutcome::Matched => {
                print_match(&session, args.json);
                if !args.all {
                    break;
                }
            }
            ProbeOutcome::Exhausted => break,
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()>
{
    let args = Args::parse();
    run(args)
}
