use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Convert proxy share-links into a validated Clash config", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Read share links from a file, '-' for stdin")]
    pub input: Option<String>,

    #[arg(short, long, help = "Fetch subscription content from a URL")]
    pub url: Option<String>,

    #[arg(long, help = "Enumerate share links from the nodes in the settings file")]
    pub nodes: bool,

    #[arg(short, long, help = "Settings file (TOML)")]
    pub config: Option<String>,

    #[arg(short, long, help = "Output path, stdout if omitted")]
    pub output: Option<String>,

    #[arg(long, help = "Convert through the external conversion service")]
    pub remote: bool,

    #[arg(long, help = "Skip strict validation of the generated config")]
    pub skip_validate: bool,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,
}
