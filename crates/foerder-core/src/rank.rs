/// Direction of a relevance score.
///
/// BM25 scores grow with relevance, embedding distances shrink with it.
/// Threshold checks and comparisons go through [`ScoreOrder`] so a cutoff
/// written for one convention is never applied to scores of the other.
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    HigherIsBetter,
    LowerIsBetter,
}

impl ScoreOrder {
    /// `true` when `a` is strictly more relevant than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Ordering that sorts the most relevant score first. NaN sorts as equal.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            ScoreOrder::HigherIsBetter => ord.reverse(),
            ScoreOrder::LowerIsBetter => ord,
        }
    }

    /// Whether `score` is at least as relevant as `threshold`.
    pub fn passes(self, score: f64, threshold: f64) -> bool {
        match self {
            ScoreOrder::HigherIsBetter => score >= threshold,
            ScoreOrder::LowerIsBetter => score <= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_is_better() {
        let order = ScoreOrder::HigherIsBetter;
        assert!(order.is_better(2.0, 1.0));
        assert!(!order.is_better(1.0, 1.0));
        assert!(order.passes(1.0, 1.0));
        assert!(!order.passes(0.5, 1.0));
    }

    #[test]
    fn lower_is_better() {
        let order = ScoreOrder::LowerIsBetter;
        assert!(order.is_better(0.1, 0.3));
        assert!(order.passes(0.3, 0.35));
        assert!(!order.passes(0.4, 0.35));
    }

    #[test]
    fn stable_sort_keeps_ties_in_order() {
        let mut items = vec![("a", 1.0), ("b", 3.0), ("c", 1.0), ("d", 3.0)];
        items.sort_by(|x, y| ScoreOrder::HigherIsBetter.compare(x.1, y.1));
        let names: Vec<&str> = items.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }
}
