use gantry::core::GantryResult;
use gantry::di::bootstrap;
use std::path::PathBuf;

/// Rows shown from the per-package downloads report
const TOP_PACKAGES: usize = 10;

pub async fn run(config_path: Option<PathBuf>) -> GantryResult<()> {
    let container = bootstrap(config_path.as_deref())?;

    let totals = container.aggregate_stats.totals().await?;
    println!("Gallery statistics");
    println!("  unique packages:   {}", totals.unique_packages);
    println!("  package versions:  {}", totals.total_packages);
    println!("  total downloads:   {}", totals.downloads);

    if let Some(report) = container.statistics.package_downloads().await? {
        println!();
        println!("Top packages by downloads:");
        for row in report.rows.iter().take(TOP_PACKAGES) {
            println!("  {:<40} {}", row.package_id, row.downloads);
        }
        if let Some(generated_at) = report.generated_at {
            println!();
            println!("  report generated: {}", generated_at.to_rfc3339());
        }
    }

    Ok(())
}
