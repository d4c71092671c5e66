use ccbench::ReportConfig;
use color_eyre::Report;

// file with the results of all scenarios
const RESULTS_FILE: &str = "sim_results.csv";

// folder where all figures will be saved
const PLOT_DIR: &str = ".";

// print the loaded table before plotting
const PRINT_TABLE: bool = true;

fn main() -> Result<(), Report> {
    // init logging
    ccbench_plot::init_tracing();

    let mut config = ReportConfig::scenarios();
    config.set_input(RESULTS_FILE);
    config.set_output_dir(PLOT_DIR);
    config.set_print_table(PRINT_TABLE);
    ccbench_plot::generate(&config)?;
    Ok(())
}
