/*!

  Emits the Graphviz rendition of a machine, straight off the model: one node
  per state, one edge per explicit transition, one edge per state default. No
  partitioning is involved; edge labels list the key's members verbatim.

  Rendering through an external `dot` process is boundary plumbing kept at the
  bottom of this module: the graph text is piped into the child's stdin and
  the rendered bytes are collected from its stdout.

*/

use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::machine::automaton::Automaton;
use crate::machine::charset::escape_quoted;
use crate::machine::error::MachineError;


/// Customization hooks for the emitted graph.
#[derive(Clone, Debug)]
pub struct DotOptions {
  pub rankdir          : String,                   //< rank direction, left-to-right unless overridden
  pub graph_attributes : Vec<(String, String)>,    //< graph-wide attributes
  pub node_defaults    : Vec<(String, String)>,    //< default node attributes
  pub edge_defaults    : Vec<(String, String)>,    //< default edge attributes
  pub state_attributes : HashMap<String, Vec<(String, String)>>, //< per-state overrides
  pub edge_attributes  : HashMap<(String, String), Vec<(String, String)>>, //< per-(from, to) overrides
  pub preamble         : String,                   //< additional prefatory content
}

impl Default for DotOptions {
  fn default() -> Self {
    Self {
      rankdir: "LR".to_string(),
      graph_attributes: vec![],
      node_defaults: vec![],
      edge_defaults: vec![],
      state_attributes: HashMap::new(),
      edge_attributes: HashMap::new(),
      preamble: "".to_string(),
    }
  }
}


pub struct DotGenerator<'a> {
  machine: &'a Automaton,
  options: &'a DotOptions,
}

impl<'a> DotGenerator<'a> {

  pub fn new(machine: &'a Automaton, options: &'a DotOptions) -> DotGenerator<'a> {
    DotGenerator { machine, options }
  }


  pub fn write(&self, w: &mut dyn Write) -> Result<(), MachineError> {
    writeln!(w, "digraph \"{}\" {{", escape_quoted(self.machine.name()))?;
    writeln!(w, "\trankdir={};", self.options.rankdir)?;

    for (key, value) in self.options.graph_attributes.iter() {
      writeln!(w, "\t{}=\"{}\";", key, escape_quoted(value))?;
    }
    if !self.options.node_defaults.is_empty() {
      writeln!(w, "\tnode [{}];", render_attributes(&self.options.node_defaults))?;
    }
    if !self.options.edge_defaults.is_empty() {
      writeln!(w, "\tedge [{}];", render_attributes(&self.options.edge_defaults))?;
    }
    for line in self.options.preamble.lines() {
      writeln!(w, "\t{}", line)?;
    }
    writeln!(w)?;

    // The invisible root the start arrow hangs off of.
    writeln!(w, "\tinit [root=true,peripheries=0,label=\"\"];")?;
    if let Some(start) = self.machine.start_state() {
      writeln!(w, "\tinit -> \"{}\";", escape_quoted(&start.name))?;
    }
    writeln!(w)?;

    for state in self.machine.states() {
      let shape = match state.is_final {
        true  => "doublecircle",
        false => "circle"
      };

      let mut attributes = vec![("shape".to_string(), shape.to_string())];
      if let Some(extra) = self.options.state_attributes.get(&state.name) {
        attributes.extend(extra.iter().cloned());
      }
      writeln!(
        w,
        "\t\"{}\" [{}];",
        escape_quoted(&state.name),
        render_attributes(&attributes)
      )?;
    }
    writeln!(w)?;

    for state in self.machine.states() {
      for (key, transition) in state.explicit.iter() {
        self.write_edge(
          w,
          &state.name,
          &transition.end_state,
          &key.listing(),
          &transition.actions
        )?;
      }
      if let Some(transition) = &state.default {
        self.write_edge(w, &state.name, &transition.end_state, "other", &transition.actions)?;
      }
    }

    writeln!(w, "}}")?;
    Ok(())
  }


  fn write_edge(
    &self,
    w: &mut dyn Write,
    from: &str,
    to: &str,
    key_text: &str,
    actions: &[String]
  ) -> Result<(), MachineError>
  {
    // The label is the key listing, a line break, then the action list.
    let label = format!("{}\\n{}", escape_quoted(key_text), escape_quoted(&actions.join(",")));

    let mut attributes = vec![("label".to_string(), label)];
    let edge = (from.to_string(), to.to_string());
    if let Some(extra) = self.options.edge_attributes.get(&edge) {
      attributes.extend(extra.iter().cloned());
    }

    writeln!(
      w,
      "\t\"{}\" -> \"{}\" [{}];",
      escape_quoted(from),
      escape_quoted(to),
      render_attributes(&attributes)
    )?;
    Ok(())
  }


  pub fn to_dot_string(&self) -> Result<String, MachineError> {
    let mut buffer: Vec<u8> = Vec::new();
    self.write(&mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap())
  }


  /**
    Pipes the graph into a spawned `dot` and returns the rendered bytes in the
    requested output format, e.g. `png` or `svg`.
  */
  pub fn render(&self, format: &str) -> Result<Vec<u8>, MachineError> {
    let text = self.to_dot_string()?;

    let mut child = Command::new("dot")
      .arg(format!("-T{}", format))
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|error| {
        MachineError::ExternalToolFailed(format!("could not spawn dot: {}", error))
      })?;

    if let Some(mut stdin) = child.stdin.take() {
      stdin.write_all(text.as_bytes())?;
    }

    let output = child.wait_with_output()
      .map_err(|error| MachineError::ExternalToolFailed(error.to_string()))?;

    if !output.status.success() {
      return Err(MachineError::ExternalToolFailed(
        String::from_utf8_lossy(&output.stderr).into_owned()
      ));
    }

    Ok(output.stdout)
  }

}


/// `key="value", ...` with values taken as already escaped.
fn render_attributes(attributes: &[(String, String)]) -> String {
  let rendered: Vec<String> = attributes.iter()
    .map(|(key, value)| format!("{}=\"{}\"", key, value))
    .collect();
  rendered.join(", ")
}


#[cfg(test)]
mod test {
  use super::*;
  use crate::machine::encoding::Encoding;

  fn diagram_machine() -> Automaton {
    let mut machine = Automaton::new("Diagram", Encoding::Utf8);
    machine.declare_action(
      "a",
      crate::machine::action::ActionConfig::default(),
      crate::machine::action::CodeFragment::Empty
    ).unwrap();

    let mut s = machine.declare_state("s", false).unwrap();
    s.transition("abc", "t1", &["a"]).unwrap();
    s.default_transition("t2", &[]).unwrap();
    machine.declare_state("t1", true).unwrap();
    machine.declare_state("t2", false).unwrap();

    machine
  }

  fn rendered(machine: &Automaton, options: &DotOptions) -> String {
    DotGenerator::new(machine, options).to_dot_string().unwrap()
  }

  #[test]
  fn edges_carry_key_and_action_labels() {
    let machine = diagram_machine();
    let text = rendered(&machine, &DotOptions::default());

    assert!(text.contains("\"s\" -> \"t1\" [label=\"abc\\na\"];"));
    assert!(text.contains("\"s\" -> \"t2\" [label=\"other\\n\"];"));
  }

  #[test]
  fn final_states_are_double_circled() {
    let machine = diagram_machine();
    let text = rendered(&machine, &DotOptions::default());

    assert!(text.contains("\"t1\" [shape=\"doublecircle\"];"));
    assert!(text.contains("\"t2\" [shape=\"circle\"];"));
  }

  #[test]
  fn start_arrow_hangs_off_an_invisible_root() {
    let machine = diagram_machine();
    let text = rendered(&machine, &DotOptions::default());

    assert!(text.contains("digraph \"Diagram\" {"));
    assert!(text.contains("\trankdir=LR;"));
    assert!(text.contains("init [root=true,peripheries=0,label=\"\"];"));
    assert!(text.contains("init -> \"s\";"));
  }

  #[test]
  fn quotes_and_backslashes_are_escaped() {
    let mut machine = Automaton::new("Sa\"ys", Encoding::Utf8);
    let mut s = machine.declare_state("st\\art", false).unwrap();
    s.transition("\"", "st\\art", &[]).unwrap();
    let text = rendered(&machine, &DotOptions::default());

    assert!(text.contains("digraph \"Sa\\\"ys\" {"));
    assert!(text.contains("\"st\\\\art\" [shape=\"circle\"];"));
    assert!(text.contains("[label=\"\\\"\\n\"];"));
  }

  #[test]
  fn customization_hooks_are_applied() {
    let machine = diagram_machine();
    let mut options = DotOptions::default();
    options.rankdir = "TB".to_string();
    options.graph_attributes.push(("concentrate".to_string(), "true".to_string()));
    options.node_defaults.push(("fontname".to_string(), "ArialNarrow".to_string()));
    options.edge_defaults.push(("fontname".to_string(), "Courier".to_string()));
    options.state_attributes.insert(
      "t2".to_string(),
      vec![("color".to_string(), "gray".to_string())]
    );
    options.edge_attributes.insert(
      ("s".to_string(), "t1".to_string()),
      vec![("style".to_string(), "bold".to_string())]
    );
    options.preamble = "subgraph cluster_0 { }".to_string();

    let text = rendered(&machine, &options);
    assert!(text.contains("\trankdir=TB;"));
    assert!(text.contains("\tconcentrate=\"true\";"));
    assert!(text.contains("\tnode [fontname=\"ArialNarrow\"];"));
    assert!(text.contains("\tedge [fontname=\"Courier\"];"));
    assert!(text.contains("\t\"t2\" [shape=\"circle\", color=\"gray\"];"));
    assert!(text.contains("\"s\" -> \"t1\" [label=\"abc\\na\", style=\"bold\"];"));
    assert!(text.contains("\tsubgraph cluster_0 { }"));
  }
}
