//! IO for .bench (ISCAS) files

use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, BufReader, Read, Write};

use itertools::Itertools;

use crate::{Network, Signal};

use super::utils::{get_inverted_signals, sig_to_string};

/// Check the number of operands of a gate
fn check_arity(statement: &[String]) -> Result<(), String> {
    let nb_deps = statement.len() - 2;
    let ok = match statement[1].to_uppercase().as_str() {
        "BUF" | "BUFF" | "NOT" => nb_deps == 1,
        "VDD" | "VSS" | "GND" => nb_deps == 0,
        "MUX" | "MAJ" => nb_deps == 3,
        "AND" | "NAND" | "OR" | "NOR" | "XOR" | "XNOR" => nb_deps >= 1,
        _ => return Err(format!("Unknown gate type {}", statement[1])),
    };
    if ok {
        Ok(())
    } else {
        Err(format!(
            "Gate {} of type {} has {} inputs",
            statement[0], statement[1], nb_deps
        ))
    }
}

/// Create the majority gates implementing a statement
fn add_statement(ret: &mut Network, tp: &str, sigs: &[Signal]) -> Signal {
    match tp.to_uppercase().as_str() {
        "BUF" | "BUFF" => sigs[0],
        "NOT" => !sigs[0],
        "VDD" => Signal::one(),
        "VSS" | "GND" => Signal::zero(),
        "AND" => ret.and_n(sigs),
        "NAND" => !ret.and_n(sigs),
        "OR" => ret.or_n(sigs),
        "NOR" => !ret.or_n(sigs),
        "XOR" => ret.xor_n(sigs),
        "XNOR" => !ret.xor_n(sigs),
        "MUX" => {
            let a = ret.and(sigs[0], sigs[1]);
            let b = ret.and(!sigs[0], sigs[2]);
            ret.or(a, b)
        }
        "MAJ" => ret.maj(sigs[0], sigs[1], sigs[2]),
        _ => unreachable!("gate types are checked beforehand"),
    }
}

fn network_from_statements(
    statements: &[Vec<String>],
    inputs: &[String],
    outputs: &[String],
) -> Result<Network, String> {
    let mut ret = Network::new();
    ret.add_inputs(inputs.len());

    let mut name_to_sig = HashMap::new();
    for (i, name) in inputs.iter().enumerate() {
        if name_to_sig
            .insert(name.clone(), Signal::from_input(i as u32))
            .is_some()
        {
            return Err(format!("{name} is defined twice"));
        }
    }
    let mut name_to_statement = HashMap::new();
    for (i, s) in statements.iter().enumerate() {
        check_arity(s)?;
        if name_to_sig.contains_key(&s[0]) || name_to_statement.insert(s[0].as_str(), i).is_some() {
            return Err(format!("{} is defined twice", s[0]));
        }
    }

    // ABC-style naming for constant signals
    for (name, sig) in [("vdd", Signal::one()), ("gnd", Signal::zero())] {
        if !name_to_statement.contains_key(name) {
            name_to_sig.entry(name.to_string()).or_insert(sig);
        }
    }

    // Statements may come in any order: resolve their operands first
    let mut visiting = HashSet::new();
    let roots = statements.iter().map(|s| &s[0]).chain(outputs.iter());
    for root in roots {
        let mut to_visit = vec![(root.as_str(), false)];
        while let Some((name, expanded)) = to_visit.pop() {
            if name_to_sig.contains_key(name) {
                continue;
            }
            let Some(&i) = name_to_statement.get(name) else {
                return Err(format!("{name} is not generated anywhere"));
            };
            let deps = &statements[i][2..];
            if !expanded {
                if !visiting.insert(name) {
                    return Err(format!("Combinational loop through {name}"));
                }
                to_visit.push((name, true));
                to_visit.extend(deps.iter().map(|d| (d.as_str(), false)));
                continue;
            }
            let sigs: Vec<Signal> = deps.iter().map(|d| name_to_sig[d]).collect();
            let s = add_statement(&mut ret, &statements[i][1], &sigs);
            visiting.remove(name);
            name_to_sig.insert(name.to_string(), s);
        }
    }

    for o in outputs {
        ret.add_output(name_to_sig[o]);
    }
    ret.check();
    Ok(ret)
}

/// Read a network in .bench format, as used by the ISCAS benchmarks
///
/// These files describe the design with simple statements like:
/// ```text
///     # This is a comment
///     INPUT(i0)
///     INPUT(i1)
///     INPUT(i2)
///     x0 = AND(i0, i1)
///     x1 = NAND(x0, i1)
///     x2 = OR(x0, i0)
///     x3 = NOR(i0, x1)
///     x4 = XOR(x3, x2)
///     x5 = MAJ(x4, i1, i2)
///     x6 = MUX(i2, x5, x1)
///     x7 = NOT(x6)
///     x8 = gnd
///     x9 = vdd
///     OUTPUT(x7)
/// ```
/// Every gate is translated to majority gates, with local simplifications.
pub fn read_bench<R: Read>(r: R) -> Result<Network, String> {
    let mut statements = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for l in BufReader::new(r).lines() {
        let Ok(s) = l else {
            return Err("Error during file IO".to_string());
        };
        let t = s.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if !t.contains('=') {
            let parts: Vec<_> = t
                .split(&['(', ')'])
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() != 2 {
                return Err(format!("Invalid statement {t}"));
            }
            if ["INPUT", "PINPUT"].contains(&parts[0]) {
                inputs.push(parts[1].to_string());
            } else if ["OUTPUT", "POUTPUT"].contains(&parts[0]) {
                outputs.push(parts[1].to_string());
            } else {
                return Err(format!("Unknown keyword {}", parts[0]));
            }
        } else {
            let parts: Vec<_> = t
                .split(&['=', '(', ',', ')'])
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 2 {
                return Err(format!("Invalid statement {t}"));
            }
            statements.push(parts);
        }
    }
    network_from_statements(&statements, &inputs, &outputs)
}

/// Write a network in .bench format, as used by the ISCAS benchmarks
///
/// Gates are written as MAJ statements, and inverted signals get a separate NOT statement:
/// ```text
///     INPUT(i0)
///     INPUT(i1)
///     INPUT(i2)
///     OUTPUT(x0_n)
///     x0 = MAJ(i0, i1_n, i2)
///     i1_n = NOT(i1)
///     x0_n = NOT(x0)
/// ```
pub fn write_bench<W: Write>(w: &mut W, mig: &Network) -> io::Result<()> {
    writeln!(w, "# .bench (ISCAS) file")?;
    writeln!(w, "# Generated by migsat")?;
    for i in 0..mig.nb_inputs() {
        writeln!(w, "INPUT({})", mig.input(i))?;
    }
    writeln!(w)?;
    for o in mig.outputs() {
        writeln!(w, "OUTPUT({})", sig_to_string(&o))?;
    }
    writeln!(w)?;
    for i in 0..mig.nb_nodes() {
        let rep = mig.gate(i).dependencies().iter().map(sig_to_string).join(", ");
        writeln!(w, "{} = MAJ({})", mig.node(i), rep)?;
    }
    for s in get_inverted_signals(mig) {
        writeln!(w, "{}_n = NOT({})", s, s)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_bench, write_bench};
    use crate::network::generators::random::random_mig;
    use crate::sim::{simulate_comb, truth_tables};

    #[test]
    fn test_basic_readwrite() {
        let example = "# .bench (ISCAS) file
INPUT(i0)
INPUT(i1)
INPUT(i2)

OUTPUT(x0)
OUTPUT(x1)
OUTPUT(x2)
OUTPUT(x3)
OUTPUT(x4)
OUTPUT(x5)
OUTPUT(x6)
OUTPUT(x7)
OUTPUT(x9)
OUTPUT(x10)
OUTPUT(x11)

x0 = AND(i0, i1)
x1 = NAND(i0, i1)
x2 = OR(i0, i1)
x3 = NOR(i0, i1)
x4 = XOR(i0, i1)
x5 = BUF(i0)
x6 = NOT(i1)
x7 = NOT(x2)
x8 = gnd
x9 = vdd
x10 = XOR(  i0, i1, i2 )
x11 = MAJ(x10, x8, i2)
x12   =  gnd 
";
        let mig = read_bench(example.as_bytes()).unwrap();
        assert_eq!(mig.nb_inputs(), 3);
        assert_eq!(mig.nb_outputs(), 11);
        for k in 0..8 {
            let v: Vec<bool> = (0..3).map(|i| (k >> i) & 1 != 0).collect();
            let (a, b, c) = (v[0], v[1], v[2]);
            let expected = vec![
                a & b,
                !(a & b),
                a | b,
                !(a | b),
                a ^ b,
                a,
                !b,
                !(a | b),
                true,
                a ^ b ^ c,
                (a ^ b ^ c) & c,
            ];
            assert_eq!(simulate_comb(&mig, &v), expected);
        }
        let mut buf = Vec::new();
        write_bench(&mut buf, &mig).unwrap();
        String::from_utf8(buf).unwrap();
    }

    #[test]
    fn test_out_of_order() {
        let example = "INPUT(a)
INPUT(b)
INPUT(s)
OUTPUT(y)
y = MUX(s, t, b)
t = NOT(a)
";
        let mig = read_bench(example.as_bytes()).unwrap();
        for k in 0..8 {
            let v: Vec<bool> = (0..3).map(|i| (k >> i) & 1 != 0).collect();
            let expected = if v[2] { !v[0] } else { v[1] };
            assert_eq!(simulate_comb(&mig, &v), vec![expected]);
        }
    }

    #[test]
    fn test_errors() {
        let undefined = "INPUT(a)\nOUTPUT(y)\ny = AND(a, b)\n";
        assert!(read_bench(undefined.as_bytes()).is_err());
        let looping = "INPUT(a)\nOUTPUT(y)\ny = AND(a, z)\nz = OR(a, y)\n";
        assert!(read_bench(looping.as_bytes()).is_err());
        let twice = "INPUT(a)\nOUTPUT(y)\ny = NOT(a)\ny = BUF(a)\n";
        assert!(read_bench(twice.as_bytes()).is_err());
        let arity = "INPUT(a)\nOUTPUT(y)\ny = MAJ(a, a)\n";
        assert!(read_bench(arity.as_bytes()).is_err());
        let unknown = "INPUT(a)\nOUTPUT(y)\ny = FOO(a)\n";
        assert!(read_bench(unknown.as_bytes()).is_err());
    }

    #[test]
    fn test_roundtrip() {
        for seed in 0..10 {
            let mig = random_mig(5, 30, 4, seed);
            let mut buf = Vec::new();
            write_bench(&mut buf, &mig).unwrap();
            let read = read_bench(buf.as_slice()).unwrap();
            assert_eq!(read.nb_inputs(), mig.nb_inputs());
            assert_eq!(truth_tables(&read), truth_tables(&mig));
        }
    }
}
