use std::collections::{hash_map, HashMap};

use crate::{api, Comment};

/// Nests a flat comment list into its reply tree
///
/// Siblings keep their relative order from `flat`. A comment whose parent is
/// not in `flat` becomes a top-level comment instead of being dropped, and so
/// does one comment of every parent cycle. When an id appears more than once,
/// the first record wins.
pub fn build(flat: Vec<api::Comment>) -> Vec<Comment> {
    let mut index = HashMap::with_capacity(flat.len());
    let mut nodes = Vec::with_capacity(flat.len());
    for c in flat {
        match index.entry(c.id) {
            hash_map::Entry::Occupied(_) => {
                tracing::warn!(comment = ?c.id, "dropping comment with duplicate id");
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(nodes.len());
                nodes.push(Comment::from(c));
            }
        }
    }

    let mut parent = nodes
        .iter()
        .map(|c| c.parent_id.and_then(|p| index.get(&p).copied()))
        .collect::<Vec<Option<usize>>>();
    for (i, c) in nodes.iter().enumerate() {
        if c.parent_id.is_some() && parent[i].is_none() {
            tracing::warn!(
                comment = ?c.id,
                parent = ?c.parent_id,
                "parent not found, showing comment at the top level"
            );
        }
    }
    break_cycles(&nodes, &mut parent);

    let mut roots = Vec::new();
    let mut children = vec![Vec::new(); nodes.len()];
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    // Children are completed before their parent, so nesting needs no recursion
    let mut post_order = Vec::with_capacity(nodes.len());
    let mut stack = roots.iter().rev().map(|r| (*r, false)).collect::<Vec<_>>();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            post_order.push(i);
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|c| (*c, false)));
        }
    }
    let mut slots = nodes.into_iter().map(Some).collect::<Vec<_>>();
    for i in post_order {
        let replies = children[i]
            .iter()
            .filter_map(|c| slots[*c].take())
            .collect::<Vec<_>>();
        if let Some(node) = slots[i].as_mut() {
            node.children = replies;
        }
    }
    roots.into_iter().filter_map(|r| slots[r].take()).collect()
}

/// Detaches one node of every parent cycle, the one listed first
fn break_cycles(nodes: &[Comment], parent: &mut [Option<usize>]) {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; parent.len()];
    let mut path = Vec::new();
    for start in 0..parent.len() {
        let mut cur = Some(start);
        while let Some(i) = cur {
            if state[i] != UNSEEN {
                break;
            }
            state[i] = ON_PATH;
            path.push(i);
            cur = parent[i];
        }
        if let Some(i) = cur {
            if state[i] == ON_PATH {
                let pos = path
                    .iter()
                    .position(|p| *p == i)
                    .expect("node marked on path is not on the path");
                let first = *path[pos..]
                    .iter()
                    .min()
                    .expect("cycle has at least one node");
                tracing::warn!(
                    comment = ?nodes[first].id,
                    "comment is its own ancestor, showing it at the top level"
                );
                parent[first] = None;
            }
        }
        for p in path.drain(..) {
            state[p] = DONE;
        }
    }
}

/// The flat list a board would return for `tree`, parents listed before
/// their replies
pub fn flatten(tree: &[Comment]) -> Vec<api::Comment> {
    let mut res = Vec::with_capacity(Comment::count(tree));
    let mut stack = tree.iter().rev().collect::<Vec<_>>();
    while let Some(c) = stack.pop() {
        res.push(c.to_record());
        stack.extend(c.children.iter().rev());
    }
    res
}
