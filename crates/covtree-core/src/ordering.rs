use crate::node::PathNode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingField {
    #[default]
    Name,
    Coverage,
    Hits,
    Misses,
    Partials,
    Lines,
}

impl FromStr for OrderingField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(OrderingField::Name),
            "coverage" => Ok(OrderingField::Coverage),
            "hits" => Ok(OrderingField::Hits),
            "misses" => Ok(OrderingField::Misses),
            "partials" => Ok(OrderingField::Partials),
            "lines" => Ok(OrderingField::Lines),
            _ => Err(format!(
                "unknown ordering field '{}' (expected name, coverage, hits, misses, partials or lines)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            _ => Err(format!("unknown direction '{}' (expected asc or desc)", s)),
        }
    }
}

/// Caller-side sort of a listing. Stable, so ties keep resolution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathOrdering {
    pub field: OrderingField,
    pub direction: Direction,
}

impl PathOrdering {
    pub fn new(field: OrderingField, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn apply(&self, nodes: &mut [PathNode]) {
        nodes.sort_by(|a, b| {
            let ordering = self.compare(a, b);
            match self.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
    }

    fn compare(&self, a: &PathNode, b: &PathNode) -> Ordering {
        match self.field {
            OrderingField::Name => a.name().cmp(b.name()),
            OrderingField::Coverage => a.coverage().total_cmp(&b.coverage()),
            OrderingField::Hits => a.hits().cmp(&b.hits()),
            OrderingField::Misses => a.misses().cmp(&b.misses()),
            OrderingField::Partials => a.partials().cmp(&b.partials()),
            OrderingField::Lines => a.lines().cmp(&b.lines()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FileNode;
    use crate::totals::Totals;

    fn file(path: &str, lines: u64, hits: u64) -> PathNode {
        PathNode::File(FileNode {
            full_path: path.to_string(),
            totals: Totals::new(lines, hits, lines - hits, 0),
        })
    }

    fn names(nodes: &[PathNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_default_orders_by_name_ascending() {
        let mut nodes = vec![file("x/c.rs", 1, 1), file("a.rs", 1, 0), file("b/b.rs", 2, 1)];
        PathOrdering::default().apply(&mut nodes);
        assert_eq!(names(&nodes), vec!["a.rs", "b.rs", "c.rs"]);
    }

    #[test]
    fn test_coverage_descending() {
        let mut nodes = vec![file("low.rs", 4, 1), file("full.rs", 2, 2), file("half.rs", 4, 2)];
        PathOrdering::new(OrderingField::Coverage, Direction::Desc).apply(&mut nodes);
        assert_eq!(names(&nodes), vec!["full.rs", "half.rs", "low.rs"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut nodes = vec![file("first.rs", 3, 1), file("second.rs", 5, 1), file("third.rs", 1, 1)];
        PathOrdering::new(OrderingField::Hits, Direction::Asc).apply(&mut nodes);
        assert_eq!(names(&nodes), vec!["first.rs", "second.rs", "third.rs"]);
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!("Misses".parse::<OrderingField>(), Ok(OrderingField::Misses));
        assert_eq!("desc".parse::<Direction>(), Ok(Direction::Desc));
        assert!("size".parse::<OrderingField>().is_err());
    }
}
