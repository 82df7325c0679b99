mod algorithms;
mod models;
mod operators;
mod utilities;

use std::{
    fs::{self, File, OpenOptions},
    io::{self, prelude::*, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use algorithms::transgenetic::{self, GenerationStats, TransgeneticParams};
use models::{
    generator::{self, SyntheticFarm},
    instance::Instance,
    layout::LayoutRecord,
};
use operators::evaluation::Penalties;
use utilities::stopwatch::Stopwatch;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Settings {
    results_folder: PathBuf,
    instance_dir: Option<PathBuf>,
    instance_name: Option<String>,
    substation_capacity: Option<usize>,
    threads: Option<usize>,
    transgenetic: TransgeneticParams,
    penalties: Penalties,
    synthetic: SyntheticFarm,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            results_folder: PathBuf::from("results"),
            instance_dir: None,
            instance_name: None,
            substation_capacity: None,
            threads: None,
            transgenetic: TransgeneticParams::default(),
            penalties: Penalties::default(),
            synthetic: SyntheticFarm::default(),
        }
    }
}

fn main() {
    // RUST_LOG when set, info otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = load_settings()?;

    let threads = settings.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("failed to configure the thread pool")?;
    info!(threads, cpus = num_cpus::get(), "thread pool ready");

    let instance = load_instance(&settings)?;
    info!(
        instance = instance.name(),
        turbines = instance.n(),
        capacity = instance.capacity(),
        min_capacity = instance.min_capacity(),
        cables = instance.cables().len(),
        "instance ready"
    );

    let params = &settings.transgenetic;
    let started_at = Local::now();
    let mut stopwatch = Stopwatch::new();
    stopwatch.start();

    let mut history = Vec::with_capacity(params.generations);
    let best = transgenetic::run(&instance, settings.penalties, params, |stats, _| {
        history.push(stats.clone());
    });

    stopwatch.pause();
    let elapsed = stopwatch.read();
    let record = LayoutRecord::new(&best, params.seed, started_at, elapsed);

    let folder = settings.results_folder.join(instance.name());
    report_previous_run(&folder, &record);
    write_results(&folder, &record, &history)
        .with_context(|| format!("failed to write results to {:?}", folder))?;

    info!(
        cost = record.cost,
        cable_cost = record.cable_cost,
        crossings = record.crossings,
        fanin = record.fanin,
        elapsed_secs = elapsed,
        folder = ?folder,
        "results written"
    );

    Ok(())
}

// Results of an earlier run with the same seed are about to be replaced
fn report_previous_run(folder: &Path, record: &LayoutRecord) {
    let path = folder.join(format!("{}.dat", record.seed));
    if !path.exists() {
        return;
    }

    match LayoutRecord::load(&path) {
        Ok(previous) => info!(
            previous_cost = previous.cost,
            previous_started_at = %previous.started_at,
            improved = previous.cost > record.cost,
            "replacing an earlier run"
        ),
        Err(err) => warn!(path = ?path, "unreadable earlier run: {}", err),
    }
}

fn load_settings() -> Result<Settings> {
    let mut settings = config::Config::default();
    settings
        .merge(config::File::with_name("Config").required(false))?
        .merge(config::Environment::with_prefix("APP"))?;

    settings.try_into().context("invalid configuration")
}

fn load_instance(settings: &Settings) -> Result<Instance> {
    match (&settings.instance_dir, &settings.instance_name) {
        (Some(dir), Some(name)) => Instance::load(dir, name, settings.substation_capacity)
            .with_context(|| format!("failed to load instance {}", name)),
        _ => {
            info!(
                turbines = settings.synthetic.turbines,
                seed = settings.synthetic.seed,
                "no instance configured, scattering a synthetic farm"
            );

            generator::scatter("synthetic", &settings.synthetic, settings.substation_capacity)
                .context("failed to generate the synthetic instance")
        }
    }
}

fn write_results(folder: &Path, record: &LayoutRecord, history: &[GenerationStats]) -> Result<()> {
    record.save(get_file(folder, &format!("{}.dat", record.seed))?)?;
    record.write_edges(get_file(folder, &format!("{}.edges", record.seed))?)?;

    let mut file = get_file(folder, &format!("{}.generations", record.seed))?;
    writeln!(
        file,
        "generation,plasmids,single_branch,between_branches,updates,rollbacks,new_best,harvested,host_repository,min_cost,mean_cost,max_cost,elapsed_secs"
    )?;
    for stats in history {
        let (min, mean, max) = stats
            .costs
            .map_or((f64::NAN, f64::NAN, f64::NAN), |c| (c.min, c.mean, c.max));

        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            stats.generation + 1,
            stats.plasmids,
            stats.single_branch,
            stats.between_branches,
            stats.updates,
            stats.rollbacks,
            stats.new_best,
            stats.harvested,
            stats.host_repository,
            min,
            mean,
            max,
            stats.elapsed_secs
        )?;
    }
    file.flush()?;

    let mut file = get_file(folder, "running_time.out")?;
    write!(file, "{}", record.elapsed_secs)?;
    file.flush()?;

    Ok(())
}

fn get_file(folder: &Path, file: &str) -> io::Result<BufWriter<File>> {
    fs::create_dir_all(folder)?;
    let path = folder.join(file);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    Ok(BufWriter::new(file))
}
