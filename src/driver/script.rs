//! Script driver: one pass over the compiler front end's AST node
//! events.

use crate::change::ChangeSet;
use crate::driver::collect_changes;
use crate::fix::{Fix, SearchCriteria};
use crate::position::ScriptPosition;
use crate::script::ScriptNode;
use tracing::warn;

struct PendingFix {
    node_kinds: Vec<String>,
    position: ScriptPosition,
    fix: Box<dyn Fix>,
}

/// Resolve `fixes` against the script AST node stream and return the
/// surviving change batch. Nodes match on kind and 1-based start
/// position.
pub fn generate_changes_script(
    content: &str,
    nodes: impl IntoIterator<Item = ScriptNode>,
    fixes: Vec<Box<dyn Fix>>,
) -> Vec<ChangeSet> {
    let mut pending: Vec<PendingFix> = Vec::new();
    let mut matched: Vec<Box<dyn Fix>> = Vec::new();

    for fix in fixes {
        match fix.search_criteria() {
            Ok(SearchCriteria::Script {
                node_kinds,
                position,
            }) => pending.push(PendingFix {
                node_kinds,
                position,
                fix,
            }),
            Ok(SearchCriteria::None) => matched.push(fix),
            Ok(SearchCriteria::Markup { .. }) => {
                warn!(
                    fix = fix.kind(),
                    "skipping markup-searched fix in script driver"
                );
            }
            Err(error) => {
                warn!(fix = fix.kind(), %error, "skipping fix without search criteria");
            }
        }
    }

    for node in nodes {
        if pending.is_empty() {
            break;
        }
        let mut idx = 0;
        while idx < pending.len() {
            let candidate = &mut pending[idx];
            if candidate.position == node.pos
                && candidate.node_kinds.iter().any(|kind| kind == &node.kind)
                && candidate.fix.visit_script_node(&node, content)
            {
                matched.push(pending.remove(idx).fix);
            } else {
                idx += 1;
            }
        }
    }

    collect_changes(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::apply_change_set;
    use crate::fix::ReplaceNodeFix;

    fn node(kind: &str, line: usize, column: usize, start: usize, end: usize) -> ScriptNode {
        ScriptNode {
            kind: kind.to_string(),
            pos: ScriptPosition::new(line, column),
            start,
            end,
        }
    }

    #[test]
    fn resolves_fix_against_matching_node() {
        let content = "sap.ui.getCore().byId(\"x\");\nother();";
        let fix = ReplaceNodeFix::new(
            ["CallExpression"],
            ScriptPosition::new(1, 1),
            "Element.getElementById(\"x\")",
        );
        let nodes = vec![
            node("CallExpression", 1, 1, 0, 26),
            node("CallExpression", 2, 1, 28, 35),
        ];
        let changes = generate_changes_script(content, nodes, vec![Box::new(fix)]);
        let output = apply_change_set(content, changes).unwrap();
        assert_eq!(output, "Element.getElementById(\"x\");\nother();");
    }

    #[test]
    fn kind_mismatch_does_not_match() {
        let content = "legacy();";
        let fix = ReplaceNodeFix::new(["PropertyAssignment"], ScriptPosition::new(1, 1), "x");
        let nodes = vec![node("CallExpression", 1, 1, 0, 8)];
        let changes = generate_changes_script(content, nodes, vec![Box::new(fix)]);
        assert!(changes.is_empty());
    }

    #[test]
    fn first_registered_fix_wins_the_race_for_a_node() {
        let content = "legacy();";
        let first = ReplaceNodeFix::new(["CallExpression"], ScriptPosition::new(1, 1), "one()");
        let second = ReplaceNodeFix::new(["CallExpression"], ScriptPosition::new(1, 1), "two()");
        let nodes = vec![node("CallExpression", 1, 1, 0, 8)];
        let changes = generate_changes_script(
            content,
            nodes,
            vec![Box::new(first), Box::new(second)],
        );
        let output = apply_change_set(content, changes).unwrap();
        assert_eq!(output, "one();");
    }
}
