use ccbench::ReportConfig;
use color_eyre::Report;

// file with the fat tree results; may contain repeated header rows when the
// output of several runs is concatenated
const RESULTS_FILE: &str = "sim_results_fattree.csv";

// folder where the figure will be saved
const PLOT_DIR: &str = ".";

fn main() -> Result<(), Report> {
    // init logging
    ccbench_plot::init_tracing();

    let mut config = ReportConfig::fat_tree();
    config.set_input(RESULTS_FILE);
    config.set_output_dir(PLOT_DIR);
    ccbench_plot::generate(&config)?;
    Ok(())
}
