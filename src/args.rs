use clap::{Parser, ValueEnum};
use review_harvest::Category;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(about = "Harvests employer reviews, salaries, interviews and benefits per company")]
#[command(version)]
pub struct Args {
    /// Roster CSV listing the companies to harvest
    #[arg(default_value = "company_info.csv")]
    pub roster: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that receives one sub-directory per company
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// URL of the WebDriver server
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Category to harvest; repeat to select several (replaces the configured set)
    #[arg(short, long = "category", value_enum)]
    pub categories: Vec<CategoryArg>,

    /// Cap on pages per numbered category
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Directory for the per-process log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long)]
    pub log_stderr: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Review,
    Salary,
    Interview,
    Benefit,
    Diversity,
}

/// Convert from CLI argument category to internal category
pub fn convert_category(arg: CategoryArg) -> Category {
    match arg {
        CategoryArg::Review => Category::Review,
        CategoryArg::Salary => Category::Salary,
        CategoryArg::Interview => Category::Interview,
        CategoryArg::Benefit => Category::Benefit,
        CategoryArg::Diversity => Category::Diversity,
    }
}
