use clap::Parser;

#[derive(Parser)]
#[command(name = "stacksmith")]
#[command(version)]
#[command(about = "Synthesize AWS stack declarations into provisioning templates", long_about = None)]
pub struct Cli {
    /// Deployment configuration file
    #[arg(short, long, default_value = "config/prod.toml")]
    pub config: String,

    /// Directory the synthesized assembly is written into
    #[arg(short, long, default_value = "synth.out")]
    pub out: String,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
