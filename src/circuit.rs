//! Circuit data model and topological scheduling (spec §3, §4.1).
//!
//! The core consumes an already-parsed [`CircuitDescription`]; the
//! Verilog-like front end that produces one is out of scope (spec §1).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GcError, Result};

/// The eleven supported gate kinds and their fixed truth tables (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// `a AND b`
    And,
    /// `a OR b`
    Or,
    /// `a XOR b`
    Xor,
    /// `NOT (a AND b)`
    Nand,
    /// `NOT (a OR b)`
    Nor,
    /// `NOT (a XOR b)`
    Xnor,
    /// `a AND (NOT b)`
    AndNot,
    /// `a OR (NOT b)`
    OrNot,
    /// `NOT a`
    Not,
    /// Constant `0`, no inputs.
    Const0,
    /// Constant `1`, no inputs.
    Const1,
}

impl GateKind {
    /// Number of input wires this gate kind takes: 0 for the constants,
    /// 1 for `NOT`, 2 for every binary gate.
    pub fn arity(self) -> usize {
        match self {
            GateKind::Not => 1,
            GateKind::Const0 | GateKind::Const1 => 0,
            _ => 2,
        }
    }

    /// Evaluate this gate's fixed truth table. `inputs.len()` must equal
    /// [`arity`](Self::arity); the arity is checked once at circuit-load
    /// time (`Circuit::load`), so every call site here holds by
    /// construction rather than by runtime luck.
    pub fn eval(self, inputs: &[bool]) -> bool {
        use GateKind::*;
        match (self, inputs) {
            (And, [a, b]) => *a && *b,
            (Or, [a, b]) => *a || *b,
            (Nand, [a, b]) => !(*a && *b),
            (Nor, [a, b]) => !(*a || *b),
            (Xor, [a, b]) => a ^ b,
            (Xnor, [a, b]) => !(a ^ b),
            (AndNot, [a, b]) => *a && !*b,
            (OrNot, [a, b]) => *a || !*b,
            (Not, [a]) => !*a,
            (Const0, []) => false,
            (Const1, []) => true,
            _ => unreachable!("GateKind::eval called with an input slice of the wrong arity"),
        }
    }

    /// Parse a gate kind from its textual name (case-insensitive; both
    /// `AND-NOT` and `ANDNOT` spellings are accepted, matching the hyphen
    /// forms used in spec §3's truth-table headings).
    pub fn parse(name: &str) -> Option<GateKind> {
        use GateKind::*;
        Some(match name.to_ascii_uppercase().replace('-', "").as_str() {
            "AND" => And,
            "OR" => Or,
            "XOR" => Xor,
            "NAND" => Nand,
            "NOR" => Nor,
            "XNOR" => Xnor,
            "ANDNOT" => AndNot,
            "ORNOT" => OrNot,
            "NOT" => Not,
            "CONST0" => Const0,
            "CONST1" => Const1,
            _ => return None,
        })
    }
}

/// One gate: its output wire, kind, and ordered input wires.
#[derive(Debug, Clone)]
pub struct Gate {
    /// Name of the wire this gate produces.
    pub output: String,
    /// The gate's kind.
    pub kind: GateKind,
    /// Ordered input wire names (length == `kind.arity()`).
    pub inputs: Vec<String>,
}

/// The pre-parsed circuit description the core consumes (spec §6): an
/// ordered list of primary-input and primary-output wire names, plus a
/// mapping from (non-input) wire name to the gate that produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitDescription {
    /// Primary-input wire names, in source order.
    pub inputs: Vec<String>,
    /// Primary-output wire names, in source order.
    pub outputs: Vec<String>,
    /// wire name -> (gate kind name, ordered input wire names).
    pub gates: HashMap<String, (String, Vec<String>)>,
}

/// A validated, loaded circuit: the dependency graph is a DAG, every gate
/// kind is known, every arity matches, and every referenced wire exists.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Primary-input wire names, in source order.
    pub inputs: Vec<String>,
    /// Primary-output wire names, in source order.
    pub outputs: Vec<String>,
    gates: HashMap<String, Gate>,
}

fn validate_wire_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || !c.is_ascii_graphic()) {
        return Err(GcError::CircuitInvalid(format!(
            "wire names must be non-empty printable ASCII without whitespace, got {name:?}"
        )));
    }
    Ok(())
}

impl Circuit {
    /// Validate and load a [`CircuitDescription`] (spec §4.1 `load`).
    ///
    /// Checks performed: wire names are well-formed and unique among
    /// primary inputs; every gate kind is supported and its input count
    /// matches the kind's arity; every wire referenced as a gate input or
    /// primary output exists as either a primary input or the output of
    /// some gate; the dependency graph has no cycle (detected as a side
    /// effect of computing the topological order).
    pub fn load(desc: CircuitDescription) -> Result<Circuit> {
        for wire in desc.inputs.iter().chain(desc.outputs.iter()) {
            validate_wire_name(wire)?;
        }

        let input_set: HashSet<&str> = desc.inputs.iter().map(String::as_str).collect();
        if input_set.len() != desc.inputs.len() {
            return Err(GcError::CircuitInvalid("duplicate primary input wire name".into()));
        }

        let mut gates = HashMap::with_capacity(desc.gates.len());
        for (wire, (kind_name, gate_inputs)) in &desc.gates {
            validate_wire_name(wire)?;
            if input_set.contains(wire.as_str()) {
                return Err(GcError::CircuitInvalid(format!(
                    "wire {wire} is listed as both a primary input and a gate output"
                )));
            }
            let kind = GateKind::parse(kind_name).ok_or_else(|| {
                GcError::CircuitInvalid(format!("unsupported gate kind {kind_name:?} for wire {wire}"))
            })?;
            if gate_inputs.len() != kind.arity() {
                return Err(GcError::CircuitInvalid(format!(
                    "gate {wire} ({kind_name}) expects {} input(s), got {}",
                    kind.arity(),
                    gate_inputs.len()
                )));
            }
            for input_name in gate_inputs {
                validate_wire_name(input_name)?;
            }
            gates.insert(
                wire.clone(),
                Gate { output: wire.clone(), kind, inputs: gate_inputs.clone() },
            );
        }

        for gate in gates.values() {
            for input_name in &gate.inputs {
                if !input_set.contains(input_name.as_str()) && !gates.contains_key(input_name) {
                    return Err(GcError::CircuitInvalid(format!(
                        "gate {} references undefined wire {input_name}",
                        gate.output
                    )));
                }
            }
        }
        for output in &desc.outputs {
            if !input_set.contains(output.as_str()) && !gates.contains_key(output) {
                return Err(GcError::CircuitInvalid(format!(
                    "primary output wire {output} is not produced by any gate or listed as an input"
                )));
            }
        }

        let circuit = Circuit { inputs: desc.inputs, outputs: desc.outputs, gates };
        // Computing the topological order is also the cycle check.
        circuit.topological_order()?;
        Ok(circuit)
    }

    /// The gate producing `wire`, or `None` if `wire` is a primary input
    /// (or otherwise has no producing gate).
    pub fn gate(&self, wire: &str) -> Option<&Gate> {
        self.gates.get(wire)
    }

    /// `true` if `wire` is one of this circuit's primary-input wires.
    pub fn is_primary_input(&self, wire: &str) -> bool {
        self.inputs.iter().any(|w| w == wire)
    }

    /// Depth-first post-order topological ordering of every wire
    /// reachable from a primary output (spec §4.1): for any non-input
    /// wire `W`, every input wire of the gate producing `W` appears
    /// before `W`. Ties among peers break by the source iteration order
    /// of `outputs`, then of each gate's `inputs`.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Visited,
        }

        fn visit<'a>(
            wire: &'a str,
            circuit: &'a Circuit,
            marks: &mut HashMap<&'a str, Mark>,
            order: &mut Vec<String>,
        ) -> Result<()> {
            match marks.get(wire) {
                Some(Mark::Visited) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(GcError::CircuitInvalid(format!(
                        "dependency cycle detected through wire {wire}"
                    )));
                }
                None => {}
            }
            marks.insert(wire, Mark::Visiting);
            if let Some(gate) = circuit.gates.get(wire) {
                for input in &gate.inputs {
                    visit(input, circuit, marks, order)?;
                }
            }
            marks.insert(wire, Mark::Visited);
            order.push(wire.to_string());
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut order = Vec::new();
        for output in &self.outputs {
            visit(output, self, &mut marks, &mut order)?;
        }
        Ok(order)
    }

    /// Compute the canonical [`WireIndex`] for this circuit: the
    /// topological order, with position `i` fixed as wire `i`'s integer
    /// index in every subsequent data structure.
    pub fn wire_index(&self) -> Result<WireIndex> {
        Ok(WireIndex::new(self.topological_order()?))
    }
}

/// The bijection wire-name <-> integer index fixed by a circuit's
/// topological order (spec §3 "WireIndex"). This is the only identifier
/// that crosses the wire between parties for internal wires.
#[derive(Debug, Clone)]
pub struct WireIndex {
    names: Vec<String>,
    index_of: HashMap<String, usize>,
}

impl WireIndex {
    /// Build a `WireIndex` from an already-computed topological order.
    pub fn new(order: Vec<String>) -> Self {
        let index_of = order.iter().cloned().enumerate().map(|(i, w)| (w, i)).collect();
        WireIndex { names: order, index_of }
    }

    /// Number of wires indexed.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if no wires are indexed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The integer index of `wire`, if indexed.
    pub fn index_of(&self, wire: &str) -> Option<usize> {
        self.index_of.get(wire).copied()
    }

    /// The wire name at integer index `i`, if in range.
    pub fn name_of(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(String::as_str)
    }

    /// Iterate wire names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// One AEAD-sealed row of a garbled gate's truth table: `ciphertext-with-tag
/// ∥ nonce` (spec §3 "GarbledRow").
pub type GarbledRow = Vec<u8>;

/// A gate's complete garbled table plus the WireIndex positions of its
/// input-producing gates (spec §3 "GarbledGate").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarbledGate {
    /// AEAD-sealed rows, in shuffled (unordered) position.
    pub rows: Vec<GarbledRow>,
    /// WireIndex positions of this gate's input wires, in the gate's
    /// input order.
    pub input_indices: Vec<usize>,
}
