use clap::Parser;

use ratsel_core::bucket::TimeMS;
use ratsel_core::scheduler::Scheduler;
use ratsel_v2x::simulation::builder::SimulationBuilder;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: String,
}

fn main() {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();
    let mut builder = SimulationBuilder::new(&args.config);
    let mut scheduler = builder.build();
    let duration = scheduler.duration();
    scheduler.initialize();
    let mut now = TimeMS::default();
    while now < duration {
        now = scheduler.trigger();
    }
    scheduler.terminate();
    let elapsed = start.elapsed();
    println!("Simulation finished in {} ms.", elapsed.as_millis());
}
