use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};

use pete::gal::{Assembler, build_jed, tokenize};

fn main() {
    let matches = Command::new("simplegalasm")
        .version("1.0.0")
        .about("Simple GAL assembler to transform pete equations into a jed file")
        .arg(Arg::new("filename").required(true))
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let path = PathBuf::from(
        matches
            .get_one::<String>("filename")
            .expect("filename is required by clap"),
    );

    let source =
        fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?;
    let lexed = tokenize(&source)?;

    let mut assembler = Assembler::new();
    assembler.assemble(&lexed.tokens)?;
    let writer = build_jed(&assembler)?;

    // The jed file is named after the project, falling back to the input stem
    let base_name = match lexed.project_name {
        Some(name) => name,
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("cannot determine the file stem of {}", path.display()))?
            .to_string(),
    };

    let jed_path = path
        .parent()
        .unwrap_or(Path::new(""))
        .join(format!("{base_name}.jed"));
    fs::write(&jed_path, writer.to_bytes())
        .with_context(|| format!("cannot write {}", jed_path.display()))?;

    Ok(())
}
