//! Assembler: equation files to GAL16V8 fuse bitmaps
//!
//! Parses PIN declarations, level equations and OE equations out of the
//! token stream, then maps each product onto one 32-fuse row of the AND
//! array. A fuse value of 1 means blown (input disconnected), 0 means the
//! input participates in the product.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::AsmError;
use super::lexer::{Token, TokenKind, kind_name};

/// Product rows per output in simple combinatorial mode.
pub const NUM_PRODUCTS: usize = 7;
/// Input columns of the AND array; each column carries a true and a
/// complemented fuse.
pub const NUM_COLUMNS: usize = 16;
/// Fuses in one product row.
pub const ROW_FUSES: usize = 2 * NUM_COLUMNS;
/// Fuses in all product rows of one output.
pub const TERM_FUSES: usize = NUM_PRODUCTS * ROW_FUSES;

/// Pin feeding each AND-array column pair, in column order.
pub const INPUT_COLUMN_PINS: [u64; NUM_COLUMNS] =
    [2, 1, 3, 18, 4, 17, 5, 16, 6, 15, 7, 14, 8, 13, 9, 11];

/// One literal of a product term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Literal {
    pub negated: bool,
    pub name: String,
}

impl Literal {
    fn to_symbol(&self) -> String {
        if self.negated {
            format!("!{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Right-hand side of an equation: a constant or a sum of products. Each
/// product is a set, so duplicate literals collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SumOfProducts {
    Constant(bool),
    Products(Vec<BTreeSet<Literal>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub negated: bool,
    pub sum: SumOfProducts,
}

#[derive(Default, Debug)]
pub struct Assembler {
    pin_name_by_number: BTreeMap<u64, String>,
    pin_number_by_name: HashMap<String, u64>,
    equations: HashMap<String, Equation>,
    oe_equations: HashMap<String, Equation>,
    pin_fusemaps: BTreeMap<usize, [bool; TERM_FUSES]>,
    pin_oe_fusemaps: BTreeMap<usize, [bool; ROW_FUSES]>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the token stream and build the fuse bitmaps for every output
    /// pin (19 down to 12).
    pub fn assemble(&mut self, tokens: &[Token]) -> Result<(), AsmError> {
        self.parse(tokens)?;
        self.build_fusemaps()
    }

    /// Per-output product-term fuses (7 rows of 32), once assembled.
    pub fn pin_fusemap(&self, pin_number: usize) -> Option<&[bool; TERM_FUSES]> {
        self.pin_fusemaps.get(&pin_number)
    }

    /// Per-output OE-term fuses (one row of 32), once assembled.
    pub fn pin_oe_fusemap(&self, pin_number: usize) -> Option<&[bool; ROW_FUSES]> {
        self.pin_oe_fusemaps.get(&pin_number)
    }

    fn parse(&mut self, tokens: &[Token]) -> Result<(), AsmError> {
        let mut i = 0;

        while i < tokens.len() {
            let mut negated = false;
            if matches!(tokens[i].kind, TokenKind::Not)
                && matches!(tokens.get(i + 1), Some(t) if matches!(t.kind, TokenKind::Identifier(_)))
            {
                negated = true;
                i += 1;
            }

            match &tokens[i].kind {
                TokenKind::KeywordPin => {
                    i = self.parse_pin_declaration(tokens, i)?;
                }
                TokenKind::Identifier(name)
                    if matches!(tokens.get(i + 1), Some(t) if matches!(t.kind, TokenKind::Equals)) =>
                {
                    let name = name.clone();
                    let (next_i, sum) = parse_sum_of_products(tokens, i + 2)?;
                    i = next_i;
                    self.equations.insert(name, Equation { negated, sum });
                }
                TokenKind::Identifier(name)
                    if matches!(tokens.get(i + 1), Some(t) if matches!(t.kind, TokenKind::Dot)) =>
                {
                    let name = name.clone();
                    let sub = tok(tokens, i + 2)?;
                    let TokenKind::Identifier(sub_name) = &sub.kind else {
                        return Err(AsmError::Syntax {
                            line: sub.line,
                            expected: "identifier after '.'",
                            found: kind_name(&sub.kind).to_string(),
                        });
                    };
                    if sub_name != "OE" && sub_name != "oe" {
                        return Err(AsmError::InvalidSubIdentifier {
                            line: sub.line,
                            name: sub_name.clone(),
                        });
                    }
                    let equals = tok(tokens, i + 3)?;
                    if !matches!(equals.kind, TokenKind::Equals) {
                        return Err(AsmError::Syntax {
                            line: equals.line,
                            expected: "'='",
                            found: kind_name(&equals.kind).to_string(),
                        });
                    }
                    let (next_i, sum) = parse_sum_of_products(tokens, i + 4)?;
                    i = next_i;
                    self.oe_equations.insert(name, Equation { negated, sum });
                }
                TokenKind::EndCmd => {} // skip over empty commands
                other => {
                    return Err(AsmError::Syntax {
                        line: tokens[i].line,
                        expected: "PIN declaration or equation",
                        found: kind_name(other).to_string(),
                    });
                }
            }

            // Skip over the closing EndCmd
            i += 1;
        }

        Ok(())
    }

    /// `PIN <number> = <name> ;`; returns the index of the closing EndCmd.
    fn parse_pin_declaration(&mut self, tokens: &[Token], i: usize) -> Result<usize, AsmError> {
        let number_tok = tok(tokens, i + 1)?;
        let TokenKind::Number(number) = number_tok.kind else {
            return Err(AsmError::Syntax {
                line: number_tok.line,
                expected: "number after PIN",
                found: kind_name(&number_tok.kind).to_string(),
            });
        };

        let equals = tok(tokens, i + 2)?;
        if !matches!(equals.kind, TokenKind::Equals) {
            return Err(AsmError::Syntax {
                line: equals.line,
                expected: "'=' after pin number",
                found: kind_name(&equals.kind).to_string(),
            });
        }

        let name_tok = tok(tokens, i + 3)?;
        let TokenKind::Identifier(name) = &name_tok.kind else {
            return Err(AsmError::Syntax {
                line: name_tok.line,
                expected: "identifier after '='",
                found: kind_name(&name_tok.kind).to_string(),
            });
        };

        let end = tok(tokens, i + 4)?;
        if !matches!(end.kind, TokenKind::EndCmd) {
            return Err(AsmError::Syntax {
                line: end.line,
                expected: "end of command after identifier",
                found: kind_name(&end.kind).to_string(),
            });
        }

        if self.pin_name_by_number.contains_key(&number) {
            return Err(AsmError::DuplicatePinNumber {
                line: number_tok.line,
                number,
            });
        }
        if self.pin_number_by_name.contains_key(name) {
            return Err(AsmError::DuplicatePinName {
                line: name_tok.line,
                name: name.clone(),
            });
        }

        self.pin_name_by_number.insert(number, name.clone());
        self.pin_number_by_name.insert(name.clone(), number);

        Ok(i + 4)
    }

    fn build_fusemaps(&mut self) -> Result<(), AsmError> {
        for pin_number in (12..=19).rev() {
            let name = self
                .pin_name_by_number
                .get(&(pin_number as u64))
                .ok_or(AsmError::MissingPinDeclaration { number: pin_number })?
                .clone();

            let mut fuses = [false; TERM_FUSES];
            let mut oe_fuses = [false; ROW_FUSES];

            if let Some(eq) = self.equations.get(&name) {
                if !self.oe_equations.contains_key(&name) {
                    // No corresponding OE equation: always enable the output
                    oe_fuses = [true; ROW_FUSES];
                }

                if !eq.negated {
                    return Err(AsmError::NonNegatedEquation { name });
                }

                match &eq.sum {
                    SumOfProducts::Constant(true) => fuses[..ROW_FUSES].fill(true),
                    SumOfProducts::Constant(false) => {}
                    SumOfProducts::Products(products) => {
                        if products.len() > NUM_PRODUCTS {
                            return Err(AsmError::TooManyProducts { name });
                        }
                        for (product_idx, product) in products.iter().enumerate() {
                            map_product(
                                &self.pin_name_by_number,
                                &name,
                                product,
                                &mut fuses[product_idx * ROW_FUSES..][..ROW_FUSES],
                            )?;
                        }
                    }
                }
            }
            // else: leave all fuses intact, which makes every product false

            if let Some(eq) = self.oe_equations.get(&name) {
                if eq.negated {
                    return Err(AsmError::NegatedOeEquation { name });
                }

                match &eq.sum {
                    SumOfProducts::Constant(true) => oe_fuses.fill(true),
                    SumOfProducts::Constant(false) => {}
                    SumOfProducts::Products(products) => {
                        if products.len() > 1 {
                            return Err(AsmError::TooManyOeProducts { name });
                        }
                        map_product(&self.pin_name_by_number, &name, &products[0], &mut oe_fuses)?;
                    }
                }
            }

            self.pin_fusemaps.insert(pin_number, fuses);
            self.pin_oe_fusemaps.insert(pin_number, oe_fuses);
        }

        Ok(())
    }
}

/// Map one product onto a 32-fuse row: a literal present in the product
/// keeps its fuse intact, everything else is blown.
fn map_product(
    pin_name_by_number: &BTreeMap<u64, String>,
    equation_name: &str,
    product: &BTreeSet<Literal>,
    row: &mut [bool],
) -> Result<(), AsmError> {
    let mut remaining = product.clone();

    for (input_idx, &input_pin) in INPUT_COLUMN_PINS.iter().enumerate() {
        let input_name = pin_name_by_number
            .get(&input_pin)
            .ok_or(AsmError::MissingPinDeclaration {
                number: input_pin as usize,
            })?;
        let fuse_idx = 2 * input_idx;

        if !remaining.remove(&Literal {
            negated: false,
            name: input_name.clone(),
        }) {
            row[fuse_idx] = true;
        }
        if !remaining.remove(&Literal {
            negated: true,
            name: input_name.clone(),
        }) {
            row[fuse_idx + 1] = true;
        }
    }

    if !remaining.is_empty() {
        return Err(AsmError::UndefinedPins {
            name: equation_name.to_string(),
            pins: remaining.iter().map(Literal::to_symbol).collect(),
        });
    }

    Ok(())
}

/// `<number>`, `0`/`1` constants, or `[!]name (&|#) ...` up to the EndCmd;
/// returns the index of the EndCmd.
fn parse_sum_of_products(tokens: &[Token], mut i: usize) -> Result<(usize, SumOfProducts), AsmError> {
    let first = tok(tokens, i)?;

    if let TokenKind::Number(number) = first.kind {
        let value = match number {
            0 => false,
            1 => true,
            _ => {
                return Err(AsmError::InvalidConstant {
                    line: first.line,
                    number,
                });
            }
        };
        i += 1;

        let end = tok(tokens, i)?;
        if !matches!(end.kind, TokenKind::EndCmd) {
            return Err(AsmError::Syntax {
                line: end.line,
                expected: "end of command after constant",
                found: kind_name(&end.kind).to_string(),
            });
        }
        return Ok((i, SumOfProducts::Constant(value)));
    }

    let mut sum: Vec<BTreeSet<Literal>> = Vec::new();
    let mut product: BTreeSet<Literal> = BTreeSet::new();

    loop {
        let t = tok(tokens, i)?;
        let negated = match &t.kind {
            TokenKind::Not => {
                i += 1;
                true
            }
            TokenKind::Identifier(_) => false,
            other => {
                return Err(AsmError::Syntax {
                    line: t.line,
                    expected: "'!' or identifier",
                    found: kind_name(other).to_string(),
                });
            }
        };

        let t = tok(tokens, i)?;
        let TokenKind::Identifier(name) = &t.kind else {
            return Err(AsmError::Syntax {
                line: t.line,
                expected: "identifier",
                found: kind_name(&t.kind).to_string(),
            });
        };
        product.insert(Literal {
            negated,
            name: name.clone(),
        });
        i += 1;

        let t = tok(tokens, i)?;
        match &t.kind {
            TokenKind::And => i += 1,
            TokenKind::Or => {
                sum.push(std::mem::take(&mut product));
                i += 1;
            }
            TokenKind::EndCmd => {
                sum.push(product);
                break;
            }
            other => {
                return Err(AsmError::Syntax {
                    line: t.line,
                    expected: "'&', '#' or end of command",
                    found: kind_name(other).to_string(),
                });
            }
        }
    }

    Ok((i, SumOfProducts::Products(sum)))
}

fn tok(tokens: &[Token], i: usize) -> Result<&Token, AsmError> {
    tokens.get(i).ok_or(AsmError::Syntax {
        line: tokens.last().map_or(0, |t| t.line),
        expected: "more input",
        found: "end of input".to_string(),
    })
}
