use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use itertools::Itertools;
use linkflow::vcd::VcdWriter;
use linkflow_lane::testbench::Bench;
use linkflow_lane::{Generation, LaneError, LaneTrace, LinkPhase};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAX_TICKS: u64 = 1000;

fn main() -> Result<(), LaneError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut bench = Bench::with_generations(Generation::Gen4, Generation::Gen3);

    let build = Path::new("./build");
    fs::create_dir_all(build)?;
    let out = BufWriter::new(File::create(build.join("lane.vcd"))?);
    let mut vcd = VcdWriter::<_, LaneTrace>::new(out, "lane", "1ns")?;

    let mut phases = vec![LinkPhase::Disabled];
    while bench.lane.phase() != Some(LinkPhase::Active) {
        if bench.lane.cycle() >= MAX_TICKS {
            return Err(LaneError::NotReached { phase: LinkPhase::Active, ticks: MAX_TICKS });
        }
        let trace = bench.step();
        phases.extend(bench.lane.phase());
        vcd.dump(bench.lane.cycle(), trace)?;
    }
    vcd.finish()?;

    info!(ticks = bench.lane.cycle(), generation = ?bench.lane.output().generation, "link active");
    println!("{}", phases.iter().dedup().map(|phase| format!("{phase:?}")).join(" -> "));
    Ok(())
}
