//! Boolean expression tree assembled from a flat condition list.

use crate::rules::{Combinator, Condition};

/// One node of the assembled filter expression. The tree is immutable
/// once built and exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An elementary condition, tagged with its 1-based position in the
    /// original condition list.
    Leaf { position: usize, condition: Condition },
    /// Two subtrees joined by a combinator.
    Composite { combinator: Combinator, left: Box<Node>, right: Box<Node> },
}

impl Node {
    pub(crate) fn leaf(position: usize, condition: Condition) -> Self {
        Node::Leaf { position, condition }
    }

    pub(crate) fn composite(combinator: Combinator, left: Node, right: Node) -> Self {
        Node::Composite { combinator, left: Box::new(left), right: Box::new(right) }
    }

    /// Canonical parenthesized infix rendering: a leaf prints its original
    /// position, a composite prints `<left> <and|or> <right>` wrapped in
    /// parentheses unless it is the root.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut String, root: bool) {
        match self {
            Node::Leaf { position, .. } => {
                out.push_str(&position.to_string());
            }
            Node::Composite { combinator, left, right } => {
                if !root {
                    out.push('(');
                }
                left.write(out, false);
                out.push(' ');
                out.push_str(&combinator.to_string());
                out.push(' ');
                right.write(out, false);
                if !root {
                    out.push(')');
                }
            }
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SearchOperator;

    fn leaf(position: usize) -> Node {
        Node::leaf(
            position,
            Condition::new("Prop", SearchOperator::Equals, vec![Some("true".to_string())]),
        )
    }

    #[test]
    fn test_root_composite_is_not_parenthesized() {
        let node = Node::composite(Combinator::And, leaf(1), leaf(2));
        assert_eq!(node.render(), "1 and 2");
    }

    #[test]
    fn test_inner_composites_are_parenthesized() {
        let node = Node::composite(
            Combinator::Or,
            Node::composite(Combinator::And, leaf(1), leaf(2)),
            leaf(3),
        );
        assert_eq!(node.render(), "(1 and 2) or 3");
    }
}
