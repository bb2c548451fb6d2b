use anyhow::{anyhow, Result};
use cfu2scdl::{convert_cfu, Conversion};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "cfu2scdl",
    about = "Convert a CFU budget report to raw and SCDL CSV tables"
)]
struct Opt {
    /// CFU XML file to convert
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Field separator for both tables (use ';' for French spreadsheets)
    #[structopt(short = "s", long = "separator", default_value = ",")]
    separator: char,

    /// Where to write the field-preserving table
    #[structopt(long = "raw-output", default_value = "budget_raw.csv", parse(from_os_str))]
    raw_output: PathBuf,

    /// Where to write the SCDL table
    #[structopt(
        long = "scdl-output",
        default_value = "budget_scdl.csv",
        parse(from_os_str)
    )]
    scdl_output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    // Ensure input file exists
    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    if !opt.separator.is_ascii() {
        return Err(anyhow!(
            "separator must be a single ASCII character, got {:?}",
            opt.separator
        ));
    }

    let xml = fs::read(&opt.input)?;
    let Conversion {
        raw_csv,
        scdl_csv,
        stats,
    } = convert_cfu(&xml, opt.separator as u8)?;

    fs::write(&opt.raw_output, raw_csv)?;
    fs::write(&opt.scdl_output, scdl_csv)?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
