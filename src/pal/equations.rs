//! Equation generation: drives the analyzer and the minimizer per output pin
//! and renders the results in the configurable equation syntax.

use crate::qm::Solution;
use crate::simplify_minterms;

use super::analyzer::{Analyzer, Dump, LevelTerms, OeTerms, PinDependencies};
use super::error::AnalyzeError;
use super::pins::{NUM_OUTPUTS, PinNames, data_bit_to_pin};

/// Strings used for the logical operators in both output files.
#[derive(Debug, Clone)]
pub struct Syntax {
    pub and_str: String,
    pub or_str: String,
    pub not_str: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            and_str: "&".to_string(),
            or_str: "#".to_string(),
            not_str: "!".to_string(),
        }
    }
}

/// Level analysis of one pin: classified minterms and the minimized negated
/// equation (the PAL16L8 output buffer inverts, so the negated equation is
/// the native form).
#[derive(Debug, Clone)]
pub struct LevelAnalysis {
    pub terms: LevelTerms,
    pub solution: Solution,
}

/// Output-enable analysis of one pin: the positive minterms describe where
/// the pin is driven.
#[derive(Debug, Clone)]
pub struct OeAnalysis {
    pub terms: OeTerms,
    pub solution: Solution,
}

/// Everything derived from the dump for one output pin.
#[derive(Debug, Clone)]
pub struct PinEquations {
    pub data_bit: usize,
    pub pin_number: usize,
    pub deps: PinDependencies,
    /// `None` when the pin level is constant (or the pin never drives)
    pub level: Option<LevelAnalysis>,
    /// `None` when the output enable is constant
    pub oe: Option<OeAnalysis>,
}

/// Run the full analysis: dependency discovery, minterm classification and
/// minimization for all eight output pins.
pub fn analyze_pal(dump: &Dump, names: &PinNames) -> Result<Vec<PinEquations>, AnalyzeError> {
    let analyzer = Analyzer::new(dump);
    let all_deps = analyzer.discover_all();

    let mut result = Vec::with_capacity(NUM_OUTPUTS);
    for (data_bit, &deps) in all_deps.iter().enumerate() {
        let pin_number = data_bit_to_pin(data_bit);

        let level = if deps.depends_mask != 0 {
            let terms = analyzer.classify_level(data_bit, &deps, names.by_pin(pin_number))?;
            let solution = simplify_minterms(terms.var_bits.len(), &terms.neg, &terms.dontcare);
            Some(LevelAnalysis { terms, solution })
        } else {
            None
        };

        let oe = if deps.oe_depends_mask != 0 {
            let terms = analyzer.classify_oe(data_bit, &deps);
            let solution = simplify_minterms(terms.var_bits.len(), &terms.pos, &[]);
            Some(OeAnalysis { terms, solution })
        } else {
            None
        };

        result.push(PinEquations {
            data_bit,
            pin_number,
            deps,
            level,
            oe,
        });
    }

    Ok(result)
}

/// The (possibly multi-line) level equation for one pin, or `None` when the
/// pin is permanently high-z. Constant pins render with the pin negated to
/// match the PAL16L8 output polarity.
pub fn level_equation(pin: &PinEquations, names: &PinNames, syntax: &Syntax) -> Option<String> {
    let name = names.by_pin(pin.pin_number);

    match &pin.level {
        Some(analysis) => {
            let var_names: Vec<&str> = analysis
                .terms
                .var_bits
                .iter()
                .map(|&b| names.by_addr_bit(b))
                .collect();
            Some(sop_string(
                &format!("{}{name}", syntax.not_str),
                &var_names,
                &analysis.solution,
                syntax,
            ))
        }
        None if pin.deps.seen_high => Some(format!("{}{name} = 'b'0;\n", syntax.not_str)),
        None if pin.deps.seen_low => Some(format!("{}{name} = 'b'1;\n", syntax.not_str)),
        None => None,
    }
}

/// The output-enable equation for one pin. A pin without OE dependencies is
/// either always driven or always floating.
pub fn oe_equation(pin: &PinEquations, names: &PinNames, syntax: &Syntax) -> String {
    let name = names.by_pin(pin.pin_number);

    match &pin.oe {
        Some(analysis) => {
            let var_names: Vec<&str> = analysis
                .terms
                .var_bits
                .iter()
                .map(|&b| names.by_addr_bit(b))
                .collect();
            sop_string(&format!("{name}.oe"), &var_names, &analysis.solution, syntax)
        }
        None if pin.deps.seen_high || pin.deps.seen_low => format!("{name}.oe = 'b'1;\n"),
        None => format!("{name}.oe = 'b'0;\n"),
    }
}

/// Render the complete equations file: CUPL-style header, pin declarations
/// and the per-pin level and output-enable equations.
pub fn equations_file(
    project: &str,
    pins: &[PinEquations],
    names: &PinNames,
    syntax: &Syntax,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name {project};\n"));
    out.push_str("Device G16V8MA;\n");
    out.push_str("Partno ;\n");
    out.push_str("Revision ;\n");
    out.push_str("Date ;\n");
    out.push_str("Designer ;\n");
    out.push_str("Company ;\n");
    out.push_str("Assembly ;\n");
    out.push_str("Location ;\n");
    for (number, name) in names.iter() {
        out.push_str(&format!("PIN {number}={name};\n"));
    }

    for pin in pins {
        if let Some(eq) = level_equation(pin, names, syntax) {
            out.push_str(&eq);
        }
        out.push_str(&oe_equation(pin, names, syntax));
    }

    out
}

/// Render the human-readable truth-table file: per pin the positive,
/// negative and don't-care condition lists, column aligned.
pub fn truthtable_file(pins: &[PinEquations], names: &PinNames, syntax: &Syntax) -> String {
    let maxlen = names.max_len();
    let mut out = String::new();

    for pin in pins {
        let name = names.by_pin(pin.pin_number);

        match &pin.level {
            Some(analysis) => {
                let var_names: Vec<&str> = analysis
                    .terms
                    .var_bits
                    .iter()
                    .map(|&b| names.by_addr_bit(b))
                    .collect();
                let pos = conditions_list(&analysis.terms.pos, &var_names, syntax);
                let neg = conditions_list(&analysis.terms.neg, &var_names, syntax);
                let dontcare = conditions_list(&analysis.terms.dontcare, &var_names, syntax);

                out.push_str(&truthtable_section(
                    &format!(" {name}"),
                    maxlen + 1,
                    &pos,
                    maxlen,
                    syntax,
                ));
                out.push_str(&truthtable_section(
                    &format!("{}{name}", syntax.not_str),
                    maxlen + 1,
                    &neg,
                    maxlen,
                    syntax,
                ));
                if !dontcare.is_empty() {
                    out.push_str(&truthtable_section(
                        &format!("{name}_DC"),
                        maxlen + 3,
                        &dontcare,
                        maxlen,
                        syntax,
                    ));
                }
            }
            None if pin.deps.seen_high => {
                out.push_str(&format!(" {name:<9} = 1;\n"));
                out.push_str(&format!("{}{name:<9} = 0;\n", syntax.not_str));
            }
            None if pin.deps.seen_low => {
                out.push_str(&format!(" {name:<9} = 0;\n"));
                out.push_str(&format!("{}{name:<9} = 1;\n", syntax.not_str));
            }
            None => {} // permanently high-z
        }

        match &pin.oe {
            Some(analysis) => {
                let var_names: Vec<&str> = analysis
                    .terms
                    .var_bits
                    .iter()
                    .map(|&b| names.by_addr_bit(b))
                    .collect();
                let pos = conditions_list(&analysis.terms.pos, &var_names, syntax);
                let neg = conditions_list(&analysis.terms.neg, &var_names, syntax);

                out.push_str(&truthtable_section(
                    &format!(" {name}.oe"),
                    maxlen + 4,
                    &pos,
                    maxlen,
                    syntax,
                ));
                out.push_str(&truthtable_section(
                    &format!("{}{name}.oe", syntax.not_str),
                    maxlen + 4,
                    &neg,
                    maxlen,
                    syntax,
                ));
            }
            None => {
                let oe_name = format!("{name}.oe");
                if pin.deps.seen_high || pin.deps.seen_low {
                    out.push_str(&format!(" {oe_name:<12} = 1;\n"));
                    out.push_str(&format!("{}{oe_name:<12} = 0;\n", syntax.not_str));
                } else {
                    out.push_str(&format!(" {oe_name:<12} = 0;\n"));
                    out.push_str(&format!("{}{oe_name:<12} = 1;\n", syntax.not_str));
                }
            }
        }
    }

    out
}

/// Render one minimized sum of products. The first cover is used when there
/// are several equally minimal ones; its products are ordered by the
/// positions of their mask bits so the output is reproducible.
fn sop_string(resultstr: &str, pinnames: &[&str], solution: &Solution, syntax: &Syntax) -> String {
    match solution {
        Solution::Always => format!("{resultstr} = 'b'1;\n"),
        Solution::Never => format!("{resultstr} = 'b'0;\n"),
        Solution::Covers(covers) => {
            let mut result = covers[0].clone();
            result.sort_by_key(|cube| mask_bit_positions(cube.mask()));

            let and_sep = format!(" {} ", syntax.and_str);
            let mut out = String::new();

            for (i, cube) in result.iter().enumerate() {
                let mut symbols = Vec::new();
                for (bitnum, pinname) in pinnames.iter().enumerate() {
                    if cube.mask() & (1u64 << bitnum) != 0 {
                        if cube.pattern() & (1u64 << bitnum) != 0 {
                            symbols.push((*pinname).to_string());
                        } else {
                            symbols.push(format!("{}{pinname}", syntax.not_str));
                        }
                    }
                }
                let line = symbols.join(&and_sep);

                let eol = if i == result.len() - 1 { ";" } else { "" };
                if i == 0 {
                    out.push_str(&format!("{resultstr} = {line}{eol}\n"));
                } else {
                    out.push_str(&format!("  {} {line}{eol}\n", syntax.or_str));
                }
            }

            out
        }
    }
}

fn mask_bit_positions(mask: u64) -> Vec<usize> {
    (0..64).filter(|b| mask & (1 << b) != 0).collect()
}

/// One condition line per minterm; positive literals get a leading space so
/// they line up with negated ones.
fn conditions_list(minterms: &[u64], var_names: &[&str], syntax: &Syntax) -> Vec<Vec<String>> {
    minterms
        .iter()
        .map(|&minterm| {
            var_names
                .iter()
                .enumerate()
                .map(|(j, name)| {
                    if minterm & (1 << j) != 0 {
                        format!(" {name}")
                    } else {
                        format!("{}{name}", syntax.not_str)
                    }
                })
                .collect()
        })
        .collect()
}

fn truthtable_section(
    resultstr: &str,
    indent: usize,
    conditionslist: &[Vec<String>],
    name_width: usize,
    syntax: &Syntax,
) -> String {
    let mut out = String::new();

    for (li, conditions) in conditionslist.iter().enumerate() {
        let mut line = if li == 0 {
            format!("{resultstr:<indent$} = ")
        } else {
            format!("{:indent$} {} ", "", syntax.or_str)
        };

        for (ci, cond) in conditions.iter().enumerate() {
            if ci != 0 {
                line.push_str(&format!(" {} ", syntax.and_str));
            }
            if ci < conditions.len() - 1 {
                line.push_str(&format!("{:<width$}", cond, width = name_width + 1));
            } else {
                line.push_str(cond);
            }
        }

        if li < conditionslist.len() - 1 {
            out.push_str(&line);
            out.push_str(" \n");
        } else {
            out.push_str(&line);
            out.push_str(";\n");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::testutil::{bit, synth_dump};

    fn and_gate_reports() -> (Vec<PinEquations>, PinNames) {
        // D0 = A0 & A1, D0.oe = A2; all other outputs stay high-z
        let dump = synth_dump(|a| (bit(a, 0) & bit(a, 1), bit(a, 2)));
        let names = PinNames::default_names();
        let pins = analyze_pal(&dump, &names).unwrap();
        (pins, names)
    }

    #[test]
    fn test_and_gate_equations() {
        let (pins, names) = and_gate_reports();
        let syntax = Syntax::default();

        let level = level_equation(&pins[0], &names, &syntax).unwrap();
        assert_eq!(level, "!pin12 = !pin1\n  # !pin2;\n");

        let oe = oe_equation(&pins[0], &names, &syntax);
        assert_eq!(oe, "pin12.oe = pin3;\n");

        // Unused pins have no level equation and a constant-off enable
        assert_eq!(level_equation(&pins[1], &names, &syntax), None);
        assert_eq!(oe_equation(&pins[1], &names, &syntax), "pin13.oe = 'b'0;\n");
    }

    #[test]
    fn test_equations_file_layout() {
        let (pins, names) = and_gate_reports();
        let text = equations_file("testdump", &pins, &names, &Syntax::default());

        assert!(text.starts_with("Name testdump;\nDevice G16V8MA;\n"));
        assert!(text.contains("PIN 1=pin1;\n"));
        assert!(text.contains("PIN 11=pin11;\n"));
        assert!(text.contains("PIN 19=pin19;\n"));
        assert!(!text.contains("PIN 10"));
        assert!(text.contains("!pin12 = !pin1\n  # !pin2;\n"));
        assert!(text.contains("pin12.oe = pin3;\n"));
        assert!(text.contains("pin19.oe = 'b'0;\n"));
    }

    #[test]
    fn test_truthtable_file_layout() {
        let (pins, names) = and_gate_reports();
        let text = truthtable_file(&pins, &names, &Syntax::default());

        // Positive section lists the single driven-high combination
        assert!(text.contains(" pin12 =  pin1  &  pin2;\n"));
        // Negative section enumerates the three driven-low combinations
        assert!(text.contains("!pin12 = !pin1  & !pin2 \n"));
        assert!(text.contains(" # "));
        // Output enable sections
        assert!(text.contains(" pin12.oe ="));
        assert!(text.contains("!pin12.oe ="));
        // Unused pins report a constant-off enable
        assert!(text.contains(" pin13.oe     = 0;\n"));
        assert!(text.contains("!pin13.oe     = 1;\n"));
    }

    #[test]
    fn test_custom_syntax_is_used_everywhere() {
        let (pins, names) = and_gate_reports();
        let syntax = Syntax {
            and_str: "*".to_string(),
            or_str: "+".to_string(),
            not_str: "/".to_string(),
        };

        let level = level_equation(&pins[0], &names, &syntax).unwrap();
        assert_eq!(level, "/pin12 = /pin1\n  + /pin2;\n");

        let table = truthtable_file(&pins, &names, &syntax);
        assert!(table.contains("/pin12 = /pin1  * /pin2 \n"));
    }
}
