//! DIMACS CNF parsing and printing, plus the small `s`/`v` solution format.
//!
//! Grounded on `original_source/src/sat/dimacs.cpp`'s `parseCnf` and
//! `parseSolution`, and on `cnf.h`'s `operator<<` for the printer: a `p
//! cnf V C` header, a sorted list of unit clauses, binary clauses written
//! `a b 0` with `a <= b`, and long clauses sorted by size then
//! lexicographically.

use crate::cnf::Cnf;
use crate::error::{DawnError, DawnResult};
use crate::lit::Lit;
use std::io::{BufRead, Write};

/// Parse a DIMACS CNF file from `input`. A `p cnf` header is optional and,
/// when present, only a lower bound: the variable count grows to cover
/// whatever the highest literal actually used turns out to be, matching
/// `original_source/src/sat/dimacs.cpp`'s `while (sat.varCount() <=
/// lit.var()) sat.addVarOuter();` growth at both the header and each
/// literal.
pub fn parse_cnf(input: &mut dyn BufRead) -> DawnResult<Cnf> {
    let mut num_vars = 0u32;
    let mut clauses: Vec<Vec<Lit>> = Vec::new();
    let mut clause_buf: Vec<Lit> = Vec::new();
    let mut line_no = 0usize;

    for line in input.lines() {
        line_no += 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("p cnf") {
            let mut it = rest.split_whitespace();
            let nv: u32 = it
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| parse_err(line_no, "malformed 'p cnf' header: missing variable count"))?;
            num_vars = num_vars.max(nv);
            continue;
        }
        for tok in line.split_whitespace() {
            let x: i64 = tok
                .parse()
                .map_err(|_| parse_err(line_no, &format!("expected integer, found '{}'", tok)))?;
            if x == 0 {
                clauses.push(std::mem::take(&mut clause_buf));
            } else {
                let var = x.unsigned_abs() as u32 - 1;
                num_vars = num_vars.max(var + 1);
                clause_buf.push(Lit::from_dimacs(x));
            }
        }
    }

    if !clause_buf.is_empty() {
        return Err(parse_err(line_no, "final clause not terminated by 0"));
    }

    let mut cnf = Cnf::new(num_vars);
    for cl in clauses {
        cnf.add_clause(&cl, false);
    }
    Ok(cnf)
}

fn parse_err(line: usize, reason: &str) -> DawnError {
    DawnError::Parse {
        where_: format!("line {}", line),
        reason: reason.to_string(),
    }
}

/// Write `cnf` back out in DIMACS form: header, sorted units, binaries
/// with `a <= b`, then long clauses sorted by size then lexicographically.
pub fn print_cnf(cnf: &Cnf, out: &mut dyn Write) -> DawnResult<()> {
    writeln!(
        out,
        "p cnf {} {}",
        cnf.num_vars,
        cnf.num_units() + cnf.num_bins() + cnf.num_long()
    )?;
    if cnf.contradiction {
        writeln!(out, "0")?;
        return Ok(());
    }

    let mut units: Vec<Lit> = cnf.units.clone();
    units.sort_unstable();
    for u in units {
        writeln!(out, "{} 0", u.to_dimacs())?;
    }

    let mut bins: Vec<(Lit, Lit)> = Vec::new();
    for raw in 0..cnf.bins.len() {
        let a = Lit::new((raw / 2) as u32, raw % 2 == 1).neg();
        for &b in &cnf.bins[raw] {
            if a <= b {
                bins.push((a, b));
            }
        }
    }
    bins.sort_unstable();
    for (a, b) in bins {
        writeln!(out, "{} {} 0", a.to_dimacs(), b.to_dimacs())?;
    }

    let mut long: Vec<Vec<Lit>> = cnf
        .clauses
        .iter()
        .map(|cr| {
            let mut v = cnf.clauses.lits(cr).to_vec();
            v.sort_unstable();
            v
        })
        .collect();
    long.sort_unstable_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    for cl in long {
        for l in &cl {
            write!(out, "{} ", l.to_dimacs())?;
        }
        writeln!(out, "0")?;
    }
    Ok(())
}

/// A parsed solution: SAT with a full model, or UNSAT/UNKNOWN.
pub enum Solution {
    Sat(Vec<bool>),
    Unsat,
    Unknown,
}

/// Parse the `s .../v ...` solution format `check` reads back in.
pub fn parse_solution(input: &mut dyn BufRead, num_vars: u32) -> DawnResult<Solution> {
    let mut model = vec![false; num_vars as usize];
    let mut seen_any = false;
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("s ") {
            match rest.trim() {
                "UNSATISFIABLE" => return Ok(Solution::Unsat),
                "UNKNOWN" => return Ok(Solution::Unknown),
                "SATISFIABLE" => continue,
                other => {
                    return Err(parse_err(i + 1, &format!("unknown status '{}'", other)));
                }
            }
        } else if let Some(rest) = line.strip_prefix("v ") {
            for tok in rest.split_whitespace() {
                let x: i64 = tok
                    .parse()
                    .map_err(|_| parse_err(i + 1, &format!("expected integer, found '{}'", tok)))?;
                if x == 0 {
                    continue;
                }
                let var = x.unsigned_abs() as u32 - 1;
                if var < num_vars {
                    model[var as usize] = x > 0;
                    seen_any = true;
                }
            }
        }
    }
    if seen_any {
        Ok(Solution::Sat(model))
    } else {
        Ok(Solution::Unknown)
    }
}

/// Write the `s`/`v` solution format for a model.
pub fn print_solution(out: &mut dyn Write, solution: &Solution) -> DawnResult<()> {
    match solution {
        Solution::Sat(model) => {
            writeln!(out, "s SATISFIABLE")?;
            write!(out, "v")?;
            for (i, &val) in model.iter().enumerate() {
                let lit = if val { i as i64 + 1 } else { -(i as i64 + 1) };
                write!(out, " {}", lit)?;
            }
            writeln!(out, " 0")?;
        }
        Solution::Unsat => writeln!(out, "s UNSATISFIABLE")?,
        Solution::Unknown => writeln!(out, "s UNKNOWN")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_simple_cnf() {
        let text = "c comment\np cnf 3 2\n1 -2 0\n2 3 0\n";
        let mut cur = Cursor::new(text);
        let cnf = parse_cnf(&mut cur).unwrap();
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.num_bins(), 2);
    }

    #[test]
    fn rejects_unterminated_clause() {
        let text = "p cnf 2 1\n1 2\n";
        let mut cur = Cursor::new(text);
        assert!(parse_cnf(&mut cur).is_err());
    }

    #[test]
    fn roundtrips_through_print_and_parse() {
        let text = "p cnf 3 3\n1 0\n2 3 0\n-1 -2 3 0\n";
        let mut cur = Cursor::new(text);
        let cnf = parse_cnf(&mut cur).unwrap();
        let mut buf = Vec::new();
        print_cnf(&cnf, &mut buf).unwrap();
        let mut cur2 = Cursor::new(buf);
        let cnf2 = parse_cnf(&mut cur2).unwrap();
        assert_eq!(cnf2.num_units(), cnf.num_units());
        assert_eq!(cnf2.num_bins(), cnf.num_bins());
        assert_eq!(cnf2.num_long(), cnf.num_long());
    }
}
