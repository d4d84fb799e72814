//! Full-grid recalculation.
//!
//! A [`Pass`] first turns every stored cell into a [`Node`]: its parsed
//! formula (or final literal result) plus the in-bounds cells it references.
//! It then walks that graph with an explicit stack (Tarjan's strongly
//! connected components), so chain length is bounded by memory rather than
//! by the thread's stack.
//!
//! Tarjan emits each component only after everything it references, which
//! is exactly evaluation order. A component with more than one cell, or a
//! cell that references itself, is a loop: all of its cells get a cycle
//! error regardless of operand order. Cells that merely reference a loop
//! see a dependency error.
//!
//! Pass-scoped state lives in the pass itself and is dropped on commit, so
//! nothing leaks into the next one. Each cell is evaluated at most once.

use cellcalc_engine::engine::{
    Cell, CellError, CellRef, Content, Expr, classify, evaluate, parse,
};
use log::{debug, trace};
use std::collections::HashMap;

use super::Document;

#[derive(Debug, Clone)]
enum Slot {
    Resolved { value: f64, is_text: bool },
    Failed(CellError),
}

/// How a cell produces its value this pass.
enum Plan {
    /// Literal, empty or unparsable content: already known.
    Done(Result<(f64, bool), CellError>),
    Formula(Expr),
}

struct Node {
    cell_ref: CellRef,
    plan: Plan,
    /// Node ids of in-bounds referenced cells, in order of appearance.
    deps: Vec<usize>,
}

struct Pass<'a> {
    cells: &'a mut HashMap<CellRef, Cell>,
    rows: usize,
    cols: usize,
    ids: HashMap<CellRef, usize>,
    nodes: Vec<Node>,
    slots: Vec<Option<Slot>>,
}

const UNVISITED: usize = usize::MAX;

impl Document {
    /// Re-evaluate every cell and commit the results.
    pub fn recalculate(&mut self) {
        let mut order: Vec<CellRef> = self.cells.keys().cloned().collect();
        order.sort();

        let mut pass = Pass {
            cells: &mut self.cells,
            rows: self.rows,
            cols: self.cols,
            ids: HashMap::with_capacity(order.len()),
            nodes: Vec::with_capacity(order.len()),
            slots: Vec::new(),
        };
        pass.build(order);
        pass.run();
        pass.commit();
    }
}

impl Pass<'_> {
    /// Create a node for every stored cell and every in-bounds cell a
    /// formula references. Referenced cells that do not exist yet are
    /// created empty.
    fn build(&mut self, order: Vec<CellRef>) {
        for cell_ref in order {
            self.node_id(cell_ref);
        }

        // Nodes appended while scanning are empty cells and have no deps.
        let mut next = 0;
        while next < self.nodes.len() {
            let expression = self
                .cells
                .get(&self.nodes[next].cell_ref)
                .map(|cell| cell.expression.clone())
                .unwrap_or_default();
            let (plan, targets) = self.plan(&expression);
            let deps = targets.into_iter().map(|t| self.node_id(t)).collect();
            self.nodes[next].plan = plan;
            self.nodes[next].deps = deps;
            next += 1;
        }

        self.slots = vec![None; self.nodes.len()];
    }

    fn node_id(&mut self, cell_ref: CellRef) -> usize {
        if let Some(&id) = self.ids.get(&cell_ref) {
            return id;
        }
        let id = self.nodes.len();
        self.cells.entry(cell_ref.clone()).or_default();
        self.ids.insert(cell_ref.clone(), id);
        self.nodes.push(Node {
            cell_ref,
            plan: Plan::Done(Ok((0.0, false))),
            deps: Vec::new(),
        });
        id
    }

    /// Classify raw cell text. Returns the plan and the in-bounds cells its
    /// formula references; invalid or out-of-range references are left for
    /// [`lookup`](Self::lookup) to reject.
    fn plan(&self, expression: &str) -> (Plan, Vec<CellRef>) {
        let formula = match classify(expression) {
            Ok(Content::Empty) => return (Plan::Done(Ok((0.0, false))), Vec::new()),
            Ok(Content::Number(n)) => return (Plan::Done(Ok((n, false))), Vec::new()),
            Ok(Content::Text) => return (Plan::Done(Ok((0.0, true))), Vec::new()),
            Ok(Content::Formula(formula)) => formula,
            Err(err) => return (Plan::Done(Err(err)), Vec::new()),
        };
        match parse(formula) {
            Ok(expr) => {
                let targets = expr
                    .references()
                    .into_iter()
                    .filter_map(|addr| addr.parse::<CellRef>().ok())
                    .filter(|target| target.is_within(self.rows, self.cols))
                    .collect();
                (Plan::Formula(expr), targets)
            }
            Err(err) => (Plan::Done(Err(err)), Vec::new()),
        }
    }

    /// Iterative Tarjan over the reference graph, settling each component
    /// as it completes.
    fn run(&mut self) {
        let count = self.nodes.len();
        let mut index = vec![UNVISITED; count];
        let mut low = vec![0; count];
        let mut on_stack = vec![false; count];
        let mut component_stack: Vec<usize> = Vec::new();
        // (node, position of the next dep to visit)
        let mut frames: Vec<(usize, usize)> = Vec::new();
        let mut counter = 0;

        for root in 0..count {
            if index[root] != UNVISITED {
                continue;
            }
            index[root] = counter;
            low[root] = counter;
            counter += 1;
            component_stack.push(root);
            on_stack[root] = true;
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let node = frame.0;
                if let Some(&dep) = self.nodes[node].deps.get(frame.1) {
                    frame.1 += 1;
                    if index[dep] == UNVISITED {
                        index[dep] = counter;
                        low[dep] = counter;
                        counter += 1;
                        component_stack.push(dep);
                        on_stack[dep] = true;
                        frames.push((dep, 0));
                    } else if on_stack[dep] {
                        low[node] = low[node].min(index[dep]);
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    low[parent] = low[parent].min(low[node]);
                }
                if low[node] == index[node] {
                    let mut component = Vec::new();
                    while let Some(member) = component_stack.pop() {
                        on_stack[member] = false;
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    self.settle(&component);
                }
            }
        }
    }

    /// Resolve one strongly connected component. Everything it references
    /// outside itself is already settled.
    fn settle(&mut self, component: &[usize]) {
        let is_loop = match component {
            [single] => self.nodes[*single].deps.contains(single),
            _ => true,
        };

        if is_loop {
            for &member in component {
                let cell_ref = &self.nodes[member].cell_ref;
                trace!("{cell_ref}: on a reference loop");
                self.slots[member] = Some(Slot::Failed(CellError::Cycle(cell_ref.to_string())));
            }
            return;
        }

        for &member in component {
            let outcome = match &self.nodes[member].plan {
                Plan::Done(result) => result.clone(),
                Plan::Formula(expr) => {
                    evaluate(expr, &mut |address: &str| self.lookup(address)).map(|v| (v, false))
                }
            };
            trace!("{}: {outcome:?}", self.nodes[member].cell_ref);
            self.slots[member] = Some(match outcome {
                Ok((value, is_text)) => Slot::Resolved { value, is_text },
                Err(err) => Slot::Failed(err),
            });
        }
    }

    /// Value of a referenced cell, as seen by the formula referencing it.
    fn lookup(&self, address: &str) -> Result<f64, CellError> {
        let target: CellRef = address
            .parse()
            .map_err(|_| CellError::Ref(address.to_string()))?;
        if !target.is_within(self.rows, self.cols) {
            return Err(CellError::Ref(address.to_string()));
        }

        let slot = self.ids.get(&target).and_then(|&id| self.slots[id].as_ref());
        match slot {
            Some(Slot::Resolved { is_text: false, value }) => Ok(*value),
            Some(Slot::Resolved { is_text: true, .. }) => Err(CellError::Value(target.to_string())),
            // Unsettled targets only arise on a loop, which never gets here.
            Some(Slot::Failed(_)) | None => Err(CellError::Dependency(target.to_string())),
        }
    }

    fn commit(self) {
        let mut failed = 0usize;
        for (node, slot) in self.nodes.into_iter().zip(self.slots) {
            let (Some(cell), Some(slot)) = (self.cells.get_mut(&node.cell_ref), slot) else {
                continue;
            };
            match slot {
                Slot::Resolved { value, is_text } => {
                    cell.value = value;
                    cell.is_text = is_text;
                    cell.error = None;
                }
                Slot::Failed(err) => {
                    cell.is_text = false;
                    cell.error = Some(err);
                    failed += 1;
                }
            }
        }
        debug!(
            "Recalculated {} cells ({} in error)",
            self.cells.len(),
            failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(doc: &Document, address: &str) -> Option<&'static str> {
        doc.cell(&address.parse().unwrap()).unwrap().error_tag()
    }

    #[test]
    fn test_overlapping_loops_tag_every_member() {
        for c1 in ["=B1 + A1", "=A1 + B1"] {
            let mut doc = Document::with_dimensions(3, 5);
            doc.update_cell("B1", "=C1");
            doc.update_cell("C1", c1);
            doc.update_cell("A1", "=B1");
            doc.update_cell("D1", "=A1 * 2");
            for address in ["A1", "B1", "C1"] {
                assert_eq!(tag(&doc, address), Some("CYCLE"), "{address} with C1={c1}");
            }
            assert_eq!(tag(&doc, "D1"), Some("DEP"), "C1={c1}");
        }
    }

    #[test]
    fn test_loop_member_with_earlier_failing_operand() {
        let mut doc = Document::with_dimensions(2, 2);
        doc.update_cell("A1", "=Z9 + B1");
        doc.update_cell("B1", "=A1");
        assert_eq!(tag(&doc, "A1"), Some("CYCLE"));
        assert_eq!(tag(&doc, "B1"), Some("CYCLE"));
    }

    #[test]
    fn test_long_chain_against_visit_order() {
        const ROWS: usize = 60_000;
        let mut text = String::with_capacity(ROWS * 12);
        for row in 1..ROWS {
            text.push_str(&format!("=A{}+1\n", row + 1));
        }
        text.push_str("1\n");

        let mut doc = Document::new();
        doc.load_from_text(&text).unwrap();
        let a1 = doc.cell(&"A1".parse().unwrap()).unwrap();
        assert_eq!(a1.error_tag(), None);
        assert_eq!(a1.value, ROWS as f64);
    }

    #[test]
    fn test_long_loop_is_contained() {
        const ROWS: usize = 50_000;
        let mut text = String::with_capacity(ROWS * 12);
        for row in 1..=ROWS {
            text.push_str(&format!("=A{}\n", row % ROWS + 1));
        }

        let mut doc = Document::new();
        doc.load_from_text(&text).unwrap();
        assert_eq!(tag(&doc, "A1"), Some("CYCLE"));
        assert_eq!(tag(&doc, &format!("A{ROWS}")), Some("CYCLE"));
    }
}
