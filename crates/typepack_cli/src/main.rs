mod args;

use std::{path::Path, time::Instant};

use ansi_term::Colour;
use anyhow::Context;
use args::{InputArgs, OutputArgs, WatchArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use typepack::{BuildResult, BundleOutput, Bundler, BundlerOptions, OutputAsset};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  output: OutputArgs,

  #[clap(flatten)]
  watch: WatchArgs,
}

fn print_output_assets(outputs: Vec<OutputAsset>) {
  let mut left = 0;
  let mut right = 0;

  let mut assets = Vec::with_capacity(outputs.len());

  for output in outputs {
    let size = format!("{:.2}", output.content.len() as f64 / 1024.0);

    if size.len() > right {
      right = size.len();
    }

    if output.filename.len() > left {
      left = output.filename.len();
    }

    assets.push((output.filename, size));
  }

  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (filename, size) in assets {
    let filename_len = filename.len();

    println!(
      "{}{}{:left$} {}{}{:right$}{} kB",
      dim.paint("<DIR>/"),
      color.paint(filename),
      "",
      dim.paint("dts"),
      dim.paint(" │ size: "),
      "",
      size,
      left = left - filename_len,
      right = right - size.len()
    );
  }
}

fn print_build_result(result: BuildResult<BundleOutput>, start: Option<Instant>, silent: bool) {
  match result {
    Ok(output) => {
      if !silent {
        for warning in output.warnings {
          println!("{} {}", Colour::Yellow.paint("Warning:"), warning);
        }

        if !output.assets.is_empty() {
          print_output_assets(output.assets);
        }
      }

      match start {
        Some(start) => {
          let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
          println!(
            "\n{} Finished in {}",
            Colour::Green.paint("✔"),
            Colour::White.bold().paint(elapsed)
          );
        }
        None => println!("\n{} Finished", Colour::Green.paint("✔")),
      }
    }
    Err(errors) => {
      for error in &*errors {
        println!("{} {:#}", Colour::Red.paint("Error:"), error);
      }
    }
  }
}

fn read_config(path: &Path) -> anyhow::Result<BundlerOptions> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

fn bundler_options(args: &Commands) -> anyhow::Result<BundlerOptions> {
  let cli = BundlerOptions {
    input: (!args.input.input.is_empty())
      .then(|| args.input.input.iter().map(|p| p.to_string_lossy().into()).collect()),
    cwd: args.input.cwd.clone(),
    dir: args.output.dir.clone(),
    root: args.output.root.clone(),
    dts: args.output.no_dts.then_some(false),
    watch: args.watch.watch.then_some(true),
    debounce: args.watch.debounce,
  };
  Ok(match &args.input.config {
    Some(path) => cli.merge(read_config(path)?),
    None => cli,
  })
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Commands::parse();
  let silent = args.output.silent;

  let mut bundler = match bundler_options(&args).and_then(Bundler::new) {
    Ok(bundler) => bundler,
    Err(error) => {
      println!("{} {:#}", Colour::Red.paint("Error:"), error);
      return;
    }
  };

  if !bundler.options().watch {
    let start = Instant::now();
    print_build_result(bundler.build().await, Some(start), silent);
    return;
  }

  // Rebuilds start after the debounce window, so only their completion is reported.
  let on_build = move |result: BuildResult<BundleOutput>| {
    print_build_result(result, None, silent);
    println!("{} Waiting for changes...", Colour::White.dimmed().paint("○"));
  };
  let shutdown = async {
    if let Err(error) = tokio::signal::ctrl_c().await {
      println!("{} {}", Colour::Red.paint("Error:"), error);
    }
  };
  if let Err(error) = bundler.watch(on_build, shutdown).await {
    println!("{} {:#}", Colour::Red.paint("Error:"), error);
  }
}
