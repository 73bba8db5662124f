mod args;
mod pipeline;

use clap::Parser;
use ecosort_config::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let args = args::Args::parse();
    tracing::info!(source = %args.source_root.display(), out = %args.out_dir.display(), "preparing dataset");
    pipeline::run(&args)
}
