use std::{cmp::Ordering, collections::BTreeMap};

use tracing::debug;

use crate::{
    traits::LineGrouper,
    types::{Line, Region, Roi},
};

/// Groups regions whose vertical spans overlap, closing the relation transitively
///
/// Two regions share a line when the rows their bounding boxes have in common,
/// plus `tolerance`, is positive and at least `min_overlap` times the smaller
/// height. Chains of pairwise matches end up in a single line.
#[derive(Debug, Clone, Default)]
pub struct OverlapLineGrouper {
    pub min_overlap: f64,
    pub tolerance: u32,
}

impl OverlapLineGrouper {
    pub fn same_line(&self, a: &Roi, b: &Roi) -> bool {
        let shared = a.bottom().min(b.bottom()) as f64 - a.top().max(b.top()) as f64;
        let overlap = shared + self.tolerance as f64;
        let smaller = a.height.min(b.height) as f64;
        overlap > 0.0 && overlap >= smaller * self.min_overlap
    }
}

/// Disjoint-set forest over region indices
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // smaller index stays root so grouping is order independent
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

fn reading_order(a: &Roi, b: &Roi) -> Ordering {
    a.left()
        .cmp(&b.left())
        .then(a.vertical_center().total_cmp(&b.vertical_center()))
}

impl LineGrouper for OverlapLineGrouper {
    fn group(&self, regions: Vec<Region>) -> Vec<Line> {
        let count = regions.len();
        let mut by_top: Vec<usize> = (0..count).collect();
        by_top.sort_by_key(|&i| (regions[i].roi.top(), i));

        let mut sets = UnionFind::new(count);
        for (k, &i) in by_top.iter().enumerate() {
            let reach = regions[i].roi.bottom().saturating_add(self.tolerance);
            for &j in &by_top[k + 1..] {
                if regions[j].roi.top() >= reach {
                    break;
                }
                if self.same_line(&regions[i].roi, &regions[j].roi) {
                    sets.union(i, j);
                }
            }
        }

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..count {
            let root = sets.find(i);
            members.entry(root).or_default().push(i);
        }

        let mut groups: Vec<Vec<usize>> = members.into_values().collect();
        for group in &mut groups {
            group.sort_by(|&a, &b| reading_order(&regions[a].roi, &regions[b].roi).then(a.cmp(&b)));
        }

        let group_top = |group: &[usize]| {
            group.iter().map(|&i| regions[i].roi.top()).min().unwrap_or(0)
        };
        groups.sort_by(|a, b| {
            group_top(a)
                .cmp(&group_top(b))
                .then_with(|| regions[a[0]].roi.left().cmp(&regions[b[0]].roi.left()))
                .then_with(|| a[0].cmp(&b[0]))
        });

        let mut slots: Vec<Option<Region>> = regions.into_iter().map(Some).collect();
        let lines: Vec<Line> = groups
            .into_iter()
            .map(|group| Line {
                regions: group.into_iter().filter_map(|i| slots[i].take()).collect(),
            })
            .collect();

        debug!(regions = count, lines = lines.len(), "grouped regions into lines");
        lines
    }
}
