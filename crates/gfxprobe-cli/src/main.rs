use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use gfxprobe_core::config::{default_config_path, ProbeConfig};

#[derive(Parser)]
#[command(name = "gfxprobe")]
#[command(about = "gfxprobe - GPU capability and driver fingerprint probe")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to the system or local gfxprobe.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every probe and print the snapshot as JSON
    Snapshot {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Show renderer, vendor, version and display vendor strings
    Identity,

    /// List advertised extensions, one per line
    Extensions,

    /// Show vendor-reported GPU memory (KB)
    Memory,

    /// Show surface configuration and driver limits
    Limits,

    /// Run the clear/finish micro-benchmark
    Benchmark {
        /// Number of benchmark runs
        #[arg(short, long, default_value_t = 1)]
        runs: u32,
    },

    /// Check whether a usable Vulkan loader is present
    Vulkan,
}

fn load_config(path: Option<&str>) -> anyhow::Result<ProbeConfig> {
    match path {
        // An explicitly requested file must be readable.
        Some(path) => ProbeConfig::load(path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path, e)),
        None => Ok(ProbeConfig::load_or_default(&default_config_path())),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn loaded(present: bool) -> &'static str {
    if present {
        "loaded"
    } else {
        "missing"
    }
}

fn main() -> anyhow::Result<()> {
    gfxprobe_common::init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    info!(
        "probing on {} (egl: {:?}, gles: {:?})",
        gfxprobe_common::platform::platform_name(),
        config.libraries.egl,
        config.libraries.gles
    );
    let probe = gfxprobe_engine::init_global(&config);

    match cli.command {
        Commands::Snapshot { pretty } => {
            let snapshot = gfxprobe_engine::collect_snapshot(probe, &config.snapshot);
            print_json(&snapshot, pretty)?;
        }

        Commands::Identity => {
            let backend = probe.context().backend();
            println!(
                "Drivers:        EGL {}, GLES {}",
                loaded(backend.has_egl()),
                loaded(backend.has_gles())
            );
            println!("Renderer:       {}", probe.renderer());
            println!("Vendor:         {}", probe.vendor());
            println!("Version:        {}", probe.version());
            println!("Display vendor: {}", probe.display_vendor());
            println!("EGL version:    {}", probe.display_version());
            match probe.context_version() {
                Some(version) => println!("Context:        {}", version),
                None => println!("Context:        unavailable"),
            }
        }

        Commands::Extensions => {
            let extensions = probe.extensions();
            if extensions.is_empty() {
                eprintln!("no extensions reported");
            }
            for ext in extensions {
                println!("{}", ext);
            }
        }

        Commands::Memory => {
            let report = probe.memory_report();
            if report.is_unknown() {
                eprintln!("no vendor memory extension available");
            }
            print_json(&report, true)?;
        }

        Commands::Limits => {
            let c = probe.configuration();
            println!(
                "Configuration:     R{} G{} B{} A{} D{} S{}",
                c.red, c.green, c.blue, c.alpha, c.depth, c.stencil
            );
            println!("Max texture size:  {}", probe.max_texture_size());
            println!("Max compute invoc: {}", probe.max_compute_invocations());
        }

        Commands::Benchmark { runs } => {
            for run in 1..=runs.max(1) {
                let result = probe.run_micro_benchmark();
                if result.did_run() {
                    println!("run {}: {:.4} ms/iteration", run, result.millis_per_iteration());
                } else {
                    println!("run {}: no context, benchmark skipped", run);
                }
            }
        }

        Commands::Vulkan => {
            let support = probe.vulkan_support();
            print_json(&support, true)?;
            if let Some((major, minor, patch)) = support.version_triple() {
                info!("Vulkan instance version {}.{}.{}", major, minor, patch);
            }
        }
    }

    Ok(())
}
