//! Group-aware AST assembly: reconstructs a correctly parenthesized
//! boolean expression tree from a flat condition list plus index-range
//! group descriptors.

use crate::ast::Node;
use crate::error::{Error, GroupViolation};
use crate::rules::{Combinator, Condition, Group};
use tracing::trace;

/// A live entry in the collapse sequence: a built subtree plus the
/// combinator that attaches it to whatever precedes it. For a collapsed
/// group this is the combinator of the group's first condition, preserved
/// so the group joins its left context exactly as a single condition
/// would have.
struct Slot {
    node: Node,
    combinator: Combinator,
}

/// Build the expression tree for a rule. Groups are processed innermost
/// first; within each group (and across the remaining top level) slots
/// are folded left to right using each slot's own combinator. With no
/// groups this degenerates to a plain left-associative fold.
pub(crate) fn assemble(conditions: &[Condition], groups: &[Group]) -> Result<Node, Error> {
    if conditions.is_empty() {
        return Err(Error::EmptyRule);
    }
    validate_groups(conditions.len(), groups)?;

    // Slots stay indexed by original position; a collapsed range leaves
    // holes behind and parks its result at the range head, so outer
    // groups (expressed in original positions) still resolve.
    let mut slots: Vec<Option<Slot>> = conditions
        .iter()
        .enumerate()
        .map(|(i, condition)| {
            let combinator = condition.combinator;
            Some(Slot { node: Node::leaf(i + 1, condition.clone()), combinator })
        })
        .collect();

    let mut ordered: Vec<&Group> = groups.iter().collect();
    ordered.sort_by_key(|g| (g.level, g.start));

    for group in ordered {
        trace!(start = group.start, end = group.end, level = group.level, "collapsing group");
        collapse(&mut slots, group.start - 1, group.end - 1);
    }

    collapse(&mut slots, 0, conditions.len() - 1);
    slots.into_iter().flatten().next().map(|slot| slot.node).ok_or(Error::EmptyRule)
}

/// Left-fold the live slots within `start..=end` into one slot parked at
/// the position of the leftmost live slot. Each joined slot contributes
/// its own combinator; the head slot's combinator survives unconsumed.
fn collapse(slots: &mut [Option<Slot>], start: usize, end: usize) {
    let mut head = None;
    let mut folded: Option<Slot> = None;
    for i in start..=end {
        let Some(next) = slots[i].take() else { continue };
        folded = Some(match folded {
            None => {
                head = Some(i);
                next
            }
            Some(acc) => Slot {
                node: Node::composite(next.combinator, acc.node, next.node),
                combinator: acc.combinator,
            },
        });
    }
    if let (Some(head), Some(slot)) = (head, folded) {
        slots[head] = Some(slot);
    }
}

fn validate_groups(len: usize, groups: &[Group]) -> Result<(), Error> {
    let invalid = |g: &Group, reason| Error::InvalidGroup {
        start: g.start,
        end: g.end,
        level: g.level,
        reason,
    };

    for group in groups {
        if group.start >= group.end {
            return Err(invalid(group, GroupViolation::Inverted));
        }
        if group.start < 1 || group.end > len {
            return Err(invalid(group, GroupViolation::OutOfRange));
        }
    }

    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            if a.start > b.end || b.start > a.end {
                continue;
            }
            if a.level == b.level {
                return Err(invalid(b, GroupViolation::Overlapping));
            }
            let (inner, outer) = if a.level < b.level { (a, b) } else { (b, a) };
            if !(outer.start <= inner.start && inner.end <= outer.end) {
                return Err(invalid(outer, GroupViolation::Crossing));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SearchOperator;
    use Combinator::{And, Or};

    /// One equality condition per entry; the first entry's combinator is
    /// carried but ignored by assembly.
    fn conditions(combinators: &[Combinator]) -> Vec<Condition> {
        combinators
            .iter()
            .map(|&c| {
                Condition::combined("Prop", SearchOperator::Equals, vec![Some("true".into())], c)
            })
            .collect()
    }

    fn group(start: usize, end: usize, level: u32) -> Group {
        Group { start, end, level }
    }

    fn rendered(combinators: &[Combinator], groups: &[Group]) -> String {
        assemble(&conditions(combinators), groups).unwrap().render()
    }

    #[test]
    fn test_two_operands() {
        assert_eq!(rendered(&[And, And], &[]), "1 and 2");
        assert_eq!(rendered(&[And, Or], &[]), "1 or 2");
    }

    #[test]
    fn test_single_condition() {
        assert_eq!(rendered(&[And], &[]), "1");
    }

    #[test]
    fn test_default_fold_is_left_associative() {
        assert_eq!(rendered(&[And, And, And], &[]), "(1 and 2) and 3");
        assert_eq!(rendered(&[And, Or, Or], &[]), "(1 or 2) or 3");
        assert_eq!(rendered(&[And, And, Or], &[]), "(1 and 2) or 3");
        assert_eq!(rendered(&[And, And, And, And], &[]), "((1 and 2) and 3) and 4");
        assert_eq!(rendered(&[And, Or, Or, Or], &[]), "((1 or 2) or 3) or 4");
    }

    #[test]
    fn test_group_spanning_whole_rule_matches_default_fold() {
        assert_eq!(rendered(&[And, And, Or], &[group(1, 3, 1)]), "(1 and 2) or 3");
    }

    #[test]
    fn test_leading_group_attaches_to_right_context() {
        // (1 and 2 or 3) and 4
        assert_eq!(
            rendered(&[And, And, Or, And], &[group(1, 3, 1)]),
            "((1 and 2) or 3) and 4"
        );
    }

    #[test]
    fn test_trailing_group_keeps_entry_combinator() {
        // 1 and (2 and 3 or 4)
        assert_eq!(
            rendered(&[And, And, And, Or], &[group(2, 4, 1)]),
            "1 and ((2 and 3) or 4)"
        );
    }

    #[test]
    fn test_inner_group_between_neighbors() {
        // 1 and (2 or 3 or 4) and 5
        assert_eq!(
            rendered(&[And, And, Or, Or, And], &[group(2, 4, 1)]),
            "(1 and ((2 or 3) or 4)) and 5"
        );
    }

    #[test]
    fn test_two_level_nesting() {
        // ((1 and 2) or (3 and 4)) or 5
        let groups = [group(1, 2, 1), group(3, 4, 1), group(1, 4, 2)];
        assert_eq!(
            rendered(&[And, And, Or, And, Or], &groups),
            "((1 and 2) or (3 and 4)) or 5"
        );
        // ((1 or 2) and (3 or 4)) and 5
        assert_eq!(
            rendered(&[And, Or, And, Or, And], &groups),
            "((1 or 2) and (3 or 4)) and 5"
        );
    }

    #[test]
    fn test_nested_group_inside_interior_range() {
        // 1 and ((2 or 3) and (4 or 5)) and 6
        let groups = [group(2, 3, 1), group(4, 5, 1), group(2, 5, 2)];
        assert_eq!(
            rendered(&[And, And, Or, And, Or, And], &groups),
            "(1 and ((2 or 3) and (4 or 5))) and 6"
        );
    }

    #[test]
    fn test_eight_operands_two_levels() {
        // (1 and (2 or 3) and 4) or (5 and (6 or 7) and 8)
        let groups = [group(2, 3, 1), group(6, 7, 1), group(1, 4, 2), group(5, 8, 2)];
        assert_eq!(
            rendered(&[And, And, Or, And, Or, And, Or, And], &groups),
            "((1 and (2 or 3)) and 4) or ((5 and (6 or 7)) and 8)"
        );
    }

    #[test]
    fn test_group_order_in_input_does_not_matter() {
        let shuffled = [group(5, 8, 2), group(2, 3, 1), group(1, 4, 2), group(6, 7, 1)];
        assert_eq!(
            rendered(&[And, And, Or, And, Or, And, Or, And], &shuffled),
            "((1 and (2 or 3)) and 4) or ((5 and (6 or 7)) and 8)"
        );
    }

    #[test]
    fn test_outer_group_over_already_collapsed_range() {
        let groups = [group(1, 2, 1), group(1, 2, 2)];
        assert_eq!(rendered(&[And, And, Or], &groups), "(1 and 2) or 3");
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let conds = conditions(&[And, And, Or, And, Or]);
        let groups = [group(1, 2, 1), group(3, 4, 1), group(1, 4, 2)];
        let first = assemble(&conds, &groups).unwrap();
        let second = assemble(&conds, &groups).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_empty_rule_is_rejected() {
        assert_eq!(assemble(&[], &[]).unwrap_err(), Error::EmptyRule);
    }

    #[test]
    fn test_inverted_group_is_rejected() {
        let err = assemble(&conditions(&[And, And, And]), &[group(2, 2, 1)]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGroup { start: 2, end: 2, level: 1, reason: GroupViolation::Inverted }
        );
    }

    #[test]
    fn test_out_of_range_group_is_rejected() {
        let conds = conditions(&[And, And, And]);
        let err = assemble(&conds, &[group(1, 5, 1)]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGroup { start: 1, end: 5, level: 1, reason: GroupViolation::OutOfRange }
        );
        let err = assemble(&conds, &[group(0, 2, 1)]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGroup { start: 0, end: 2, level: 1, reason: GroupViolation::OutOfRange }
        );
    }

    #[test]
    fn test_same_level_overlap_is_rejected() {
        let conds = conditions(&[And, And, And, And]);
        let err = assemble(&conds, &[group(1, 3, 1), group(2, 4, 1)]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGroup { start: 2, end: 4, level: 1, reason: GroupViolation::Overlapping }
        );
    }

    #[test]
    fn test_crossing_levels_are_rejected() {
        let conds = conditions(&[And, And, And, And]);
        let err = assemble(&conds, &[group(2, 4, 1), group(1, 3, 2)]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidGroup { start: 1, end: 3, level: 2, reason: GroupViolation::Crossing }
        );
    }
}
