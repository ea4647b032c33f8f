use tracing::trace;

use crate::{
    automaton::{Input, StateId},
    Map,
};

/// A partition of the state set into classes of provisionally
/// indistinguishable states. Block order and the order of states within a
/// block are significant; both feed into the naming of rebuilt states.
pub type Partition = Vec<Vec<StateId>>;

/// Computes the coarsest stable refinement of `seed` under the "same block
/// for every input" equivalence (Moore's algorithm).
///
/// Each round assigns every state the index of its current block, then splits
/// each block of size ≥ 2 by the signature vector of successor-block indices
/// over `inputs` in their canonical order. A missing successor contributes
/// the sentinel `-1`. Subgroups of a split block are emitted in
/// lexicographic signature order; states inside a subgroup keep the order
/// they had in the block. The loop runs until no block splits, which is
/// guaranteed since the block count never decreases and is bounded by the
/// number of states.
///
/// `successor` is the deterministic transition function of the machine being
/// minimized; both machine kinds plug in here.
pub fn refine<F>(seed: Partition, inputs: &[Input], successor: F) -> Partition
where
    F: Fn(&str, &str) -> Option<StateId>,
{
    let mut partition = seed;
    let mut round = 0usize;

    loop {
        let mut block_of: Map<StateId, i64> = Map::new();
        for (index, block) in partition.iter().enumerate() {
            for state in block {
                block_of.insert(state.clone(), index as i64);
            }
        }

        let mut refined: Partition = Vec::with_capacity(partition.len());
        let mut split = false;

        for block in &partition {
            if block.len() <= 1 {
                refined.push(block.clone());
                continue;
            }

            let mut subgroups: Map<Vec<i64>, Vec<StateId>> = Map::new();
            for state in block {
                let signature: Vec<i64> = inputs
                    .iter()
                    .map(|input| {
                        successor(state, input)
                            .and_then(|target| block_of.get(&target).copied())
                            .unwrap_or(-1)
                    })
                    .collect();
                subgroups.entry(signature).or_default().push(state.clone());
            }

            if subgroups.len() > 1 {
                split = true;
            }
            refined.extend(subgroups.into_values());
        }

        round += 1;
        trace!(round, blocks = refined.len(), "partition refinement round");

        partition = refined;
        if !split {
            return partition;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::refine;
    use crate::Map;
    use pretty_assertions::assert_eq;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn refine_splits_on_successor_blocks() {
        // a cycle A -> B -> C -> A on input "x"; C is seeded apart, so the
        // whole cycle must fall apart one state per round.
        let next: Map<(&str, &str), &str> =
            [(("A", "x"), "B"), (("B", "x"), "C"), (("C", "x"), "A")].into();
        let inputs = s(&["x"]);

        let partition = refine(vec![s(&["A", "B"]), s(&["C"])], &inputs, |q, a| {
            next.get(&(q, a)).map(|t| t.to_string())
        });

        // sig(A) = [0] (B is in block 0), sig(B) = [1] (C is in block 1)
        assert_eq!(partition, vec![s(&["A"]), s(&["B"]), s(&["C"])]);
    }

    #[test]
    fn refine_keeps_equivalent_states_together() {
        // B1 and B2 both step to C, so the seed block {B1, B2} is stable.
        let next: Map<(&str, &str), &str> = [
            (("A", "x"), "B1"),
            (("B1", "x"), "C"),
            (("B2", "x"), "C"),
            (("C", "x"), "C"),
        ]
        .into();
        let inputs = s(&["x"]);

        let partition = refine(
            vec![s(&["A"]), s(&["B1", "B2"]), s(&["C"])],
            &inputs,
            |q, a| next.get(&(q, a)).map(|t| t.to_string()),
        );

        assert_eq!(partition, vec![s(&["A"]), s(&["B1", "B2"]), s(&["C"])]);
    }

    #[test]
    fn missing_successors_use_the_sentinel() {
        // D has no outgoing edge at all, so it separates from C even though
        // both start in the same block.
        let next: Map<(&str, &str), &str> = [(("C", "x"), "C")].into();
        let inputs = s(&["x"]);

        let partition = refine(vec![s(&["C", "D"])], &inputs, |q, a| {
            next.get(&(q, a)).map(|t| t.to_string())
        });

        // signature [-1] sorts before [0]
        assert_eq!(partition, vec![s(&["D"]), s(&["C"])]);
    }
}
