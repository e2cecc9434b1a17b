//! Combinational equivalence checking
//!
//! Two networks are compared by building a miter, a network whose single output is
//! one exactly when the two networks disagree, and proving it unsatisfiable with a SAT solver.

use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Lit, TernaryVal};
use rustsat_kissat::Kissat;

use crate::{Network, Signal};

/// Translation of network signals to solver literals
///
/// Variable 0 is the constant, then the inputs, then the gates.
fn sig_to_lit(a: &Network, s: Signal) -> Lit {
    let v = if s.is_constant() {
        0
    } else if s.is_input() {
        1 + s.input()
    } else {
        1 + a.nb_inputs() as u32 + s.var()
    };
    if s.is_inverted() {
        Lit::negative(v)
    } else {
        Lit::positive(v)
    }
}

/// Export a network to a CNF formula, one set of clauses per majority gate
fn to_cnf(a: &Network) -> Vec<Clause> {
    let mut ret = Vec::new();
    ret.push([!sig_to_lit(a, Signal::zero())].into_iter().collect());
    for i in 0..a.nb_nodes() {
        let n = sig_to_lit(a, a.node(i));
        let deps = *a.gate(i).dependencies();
        let [x, y, z] = deps.map(|s| sig_to_lit(a, s));
        // Any two true fan-ins force the output, any two false fan-ins clear it
        for (p, q) in [(x, y), (y, z), (x, z)] {
            ret.push([!p, !q, n].into_iter().collect());
            ret.push([p, q, !n].into_iter().collect());
        }
    }
    ret
}

/// Copy the gates of a network into another, sharing the inputs; return the translated outputs
fn extend_network(a: &mut Network, b: &Network) -> Vec<Signal> {
    assert_eq!(a.nb_inputs(), b.nb_inputs());
    assert!(b.is_topo_sorted());
    let mut t = Vec::with_capacity(b.nb_nodes());
    for i in 0..b.nb_nodes() {
        let g = b.gate(i).remap_order(&t);
        t.push(a.add_canonical(g));
    }
    b.outputs().map(|o| o.remap_order(&t)).collect()
}

/// Create a network with a single output, one when the two networks differ
pub fn difference(a: &Network, b: &Network) -> Network {
    assert_eq!(a.nb_inputs(), b.nb_inputs());
    assert_eq!(a.nb_outputs(), b.nb_outputs());

    let mut eq = Network::new();
    eq.add_inputs(a.nb_inputs());
    let oa = extend_network(&mut eq, a);
    let ob = extend_network(&mut eq, b);
    let diffs: Vec<Signal> = oa
        .into_iter()
        .zip(ob)
        .map(|(sa, sb)| eq.xor(sa, sb))
        .collect();
    let out = eq.or_n(&diffs);
    eq.add_output(out);
    eq.dedup();
    eq.sweep();
    eq
}

/// Find an assignment of the inputs that sets the single output to 1
pub fn prove(a: &Network) -> Option<Vec<bool>> {
    assert_eq!(a.nb_outputs(), 1);
    let output = a.output(0);
    if output == Signal::zero() {
        return None;
    }

    let mut solver = Kissat::default();
    for clause in to_cnf(a) {
        solver
            .add_clause(clause)
            .expect("The SAT solver rejected a clause");
    }
    solver
        .add_clause([sig_to_lit(a, output)].into_iter().collect())
        .expect("The SAT solver rejected a clause");

    match solver.solve().expect("Couldn't solve SAT problem") {
        SolverResult::Unsat => None,
        SolverResult::Sat => {
            let pattern = (0..a.nb_inputs())
                .map(|i| {
                    let lit = sig_to_lit(a, a.input(i));
                    solver.lit_val(lit).unwrap_or(TernaryVal::DontCare) == TernaryVal::True
                })
                .collect();
            Some(pattern)
        }
        SolverResult::Interrupted => panic!("The SAT solver was interrupted"),
    }
}

/// Perform equivalence checking on two combinational networks
///
/// Returns a distinguishing input pattern if they are not equivalent.
pub fn check_equivalence_comb(a: &Network, b: &Network) -> Result<(), Vec<bool>> {
    let eq = difference(a, b);
    match prove(&eq) {
        None => Ok(()),
        Some(v) => Err(v),
    }
}

#[cfg(test)]
mod tests {
    use super::check_equivalence_comb;
    use crate::network::generators::adder::ripple_carry;
    use crate::sim::simulate_comb;
    use crate::Network;

    #[test]
    fn test_equiv_and() {
        let mut a = Network::new();
        let l1 = a.add_input();
        let l2 = a.add_input();
        let aa = a.and(l1, l2);
        a.add_output(aa);
        let mut b = Network::new();
        b.add_input();
        b.add_input();
        let ab = !b.or(!l2, !l1);
        b.add_output(ab);
        check_equivalence_comb(&a, &b).unwrap();
    }

    #[test]
    fn test_not_equiv() {
        let mut a = Network::new();
        let l1 = a.add_input();
        let l2 = a.add_input();
        let l3 = a.add_input();
        let x = a.maj(l1, l2, l3);
        a.add_output(x);
        let mut b = Network::new();
        b.add_inputs(3);
        let y = b.maj(l1, l2, !l3);
        b.add_output(y);
        let pattern = check_equivalence_comb(&a, &b).unwrap_err();
        assert_ne!(simulate_comb(&a, &pattern), simulate_comb(&b, &pattern));
    }

    #[test]
    fn test_equiv_adder() {
        let a = ripple_carry(4);
        let mut b = a.clone();
        b.dedup();
        b.sweep();
        check_equivalence_comb(&a, &b).unwrap();
    }
}
