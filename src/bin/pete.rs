use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use pete::pal::{
    Dump, NUM_INPUTS, PinEquations, PinNames, Syntax, analyze_pal, equations_file, level_equation,
    oe_equation, truthtable_file,
};

#[derive(Debug, Serialize)]
struct AnalysisReport {
    pins: Vec<PinReport>,
}

#[derive(Debug, Serialize)]
struct PinReport {
    pin: usize,
    name: String,
    kind: &'static str,
    depends_on: Vec<String>,
    oe_depends_on: Vec<String>,
    positive_minterms: usize,
    negative_minterms: usize,
    dontcare_minterms: usize,
    level_equation: Option<String>,
    oe_equation: String,
}

fn main() {
    let matches = Command::new("pete")
        .version("1.1.0")
        .about("Transform PAL EPROM dump to equations")
        .arg(
            Arg::new("pinnames")
                .short('p')
                .value_name("NAMES")
                .help("Comma separated pin names: pin1,pin2,pin3,...,pin9,pin11,pin12,pin13,...,pin19"),
        )
        .arg(
            Arg::new("andstr")
                .short('a')
                .value_name("STR")
                .default_value("&")
                .help("String to use for logical and"),
        )
        .arg(
            Arg::new("orstr")
                .short('o')
                .value_name("STR")
                .default_value("#")
                .help("String to use for logical or"),
        )
        .arg(
            Arg::new("notstr")
                .short('n')
                .value_name("STR")
                .default_value("!")
                .help("String to use for logical not"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Also write a JSON analysis report"),
        )
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

    let names = match matches.get_one::<String>("pinnames") {
        Some(list) => PinNames::from_names(list.split(',').map(str::to_string).collect())?,
        None => PinNames::default_names(),
    };

    let syntax = Syntax {
        and_str: matches
            .get_one::<String>("andstr")
            .expect("andstr has a default value")
            .clone(),
        or_str: matches
            .get_one::<String>("orstr")
            .expect("orstr has a default value")
            .clone(),
        not_str: matches
            .get_one::<String>("notstr")
            .expect("notstr has a default value")
            .clone(),
    };

    let data = fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
    let dump = Dump::new(data)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("cannot determine the file stem of {}", path.display()))?;
    let parent = path.parent().unwrap_or(Path::new(""));

    let pins = analyze_pal(&dump, &names)?;

    let truthtable_path = parent.join(format!("{stem}_pete_truthtable.txt"));
    fs::write(&truthtable_path, truthtable_file(&pins, &names, &syntax))
        .with_context(|| format!("cannot write {}", truthtable_path.display()))?;

    let equations_path = parent.join(format!("{stem}_pete_equations.pld"));
    fs::write(&equations_path, equations_file(stem, &pins, &names, &syntax))
        .with_context(|| format!("cannot write {}", equations_path.display()))?;

    if matches.get_flag("json") {
        let report = build_report(&pins, &names, &syntax);
        let report_path = parent.join(format!("{stem}_pete_analysis.json"));
        fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("cannot write {}", report_path.display()))?;
    }

    Ok(())
}

fn build_report(pins: &[PinEquations], names: &PinNames, syntax: &Syntax) -> AnalysisReport {
    let mask_names = |mask: u32| -> Vec<String> {
        (0..NUM_INPUTS)
            .filter(|&b| mask & (1 << b) != 0)
            .map(|b| names.by_addr_bit(b).to_string())
            .collect()
    };

    let pins = pins
        .iter()
        .map(|pin| {
            let kind = match &pin.level {
                Some(_) => "logic",
                None if pin.deps.seen_high => "constant-high",
                None if pin.deps.seen_low => "constant-low",
                None => "high-z",
            };

            PinReport {
                pin: pin.pin_number,
                name: names.by_pin(pin.pin_number).to_string(),
                kind,
                depends_on: mask_names(pin.deps.depends_mask),
                oe_depends_on: mask_names(pin.deps.oe_depends_mask),
                positive_minterms: pin.level.as_ref().map_or(0, |l| l.terms.pos.len()),
                negative_minterms: pin.level.as_ref().map_or(0, |l| l.terms.neg.len()),
                dontcare_minterms: pin.level.as_ref().map_or(0, |l| l.terms.dontcare.len()),
                level_equation: level_equation(pin, names, syntax),
                oe_equation: oe_equation(pin, names, syntax),
            }
        })
        .collect();

    AnalysisReport { pins }
}
