use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod badge;
mod convert;
mod export;
mod font;

#[derive(Debug, Parser)]
#[clap(
    name = "solstice-icons",
    about = "Generate the placeholder S0LSTICE application icons (PNG, ICO, ICNS)"
)]
struct Args {
    /// Output directory.
    #[clap(short, long, value_name = "DIR", default_value = "./icons")]
    output: PathBuf,

    /// Generate only the PNG icon
    #[clap(long)]
    png_only: bool,

    /// Generate only the ICO icon (Windows)
    #[clap(long)]
    ico_only: bool,

    /// Generate only the ICNS icon (macOS)
    #[clap(long)]
    icns_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let formats = export::Formats::from_flags(args.png_only, args.ico_only, args.icns_only);
    export::generate(&args.output, formats)
}
