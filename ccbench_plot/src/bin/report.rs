use ccbench::ReportConfig;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use tracing::info;

fn main() -> Result<(), Report> {
    // init logging
    ccbench_plot::init_tracing();

    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => eyre::bail!("usage: report <config.json>"),
    };

    let config = ReportConfig::load(&path)
        .wrap_err_with(|| format!("load report config {}", path))?;
    let paths = ccbench_plot::generate(&config)?;
    info!("{} figures written", paths.len());
    Ok(())
}
