use ccbench::ReportConfig;
use color_eyre::Report;

// file with one row per (variant, CBR) run
const RESULTS_FILE: &str = "tcp_congestion_control_benchmark.csv";

// folder where the figure will be saved
const PLOT_DIR: &str = ".";

fn main() -> Result<(), Report> {
    // init logging
    ccbench_plot::init_tracing();

    let mut config = ReportConfig::benchmark();
    config.set_input(RESULTS_FILE);
    config.set_output_dir(PLOT_DIR);
    ccbench_plot::generate(&config)?;
    Ok(())
}
