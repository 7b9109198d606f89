use crate::merge::merge_counts;
use crate::scan::scan_text;
use rayon::prelude::*;
use trend_core::{Post, ScoreMap, SymbolUniverse};

/// Whether to aggregate a window on the calling thread or fan out over the
/// rayon pool. Results are identical either way; parallelism is purely an
/// optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    Sequential,
    Parallel,
}

/// Accumulated counts for one time window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// Ticker -> sum of scores of posts mentioning it.
    pub scores: ScoreMap,
    /// Ticker -> rocket-emoji occurrences in posts mentioning it.
    pub rockets: ScoreMap,
}

impl WindowCounts {
    /// Fold one post into the accumulator. Each distinct ticker the post
    /// mentions receives the post's full score and the post's full rocket
    /// count.
    fn absorb(&mut self, post: &Post, universe: &SymbolUniverse) {
        let scan = scan_text(&post.text, universe);
        for ticker in &scan.tickers {
            *self.scores.entry(ticker.clone()).or_insert(0) += post.score;
            *self.rockets.entry(ticker.clone()).or_insert(0) += scan.rockets;
        }
    }

    /// Pointwise-sum merge of two partial accumulations. Associative and
    /// commutative, which is what makes the parallel path safe.
    pub fn merge(mut self, other: WindowCounts) -> WindowCounts {
        self.scores = merge_counts(self.scores, other.scores);
        self.rockets = merge_counts(self.rockets, other.rockets);
        self
    }
}

/// Aggregate one window of posts into its mention-score and rocket-count
/// maps. An empty stream yields empty maps.
pub fn aggregate_window(
    posts: &[Post],
    universe: &SymbolUniverse,
    mode: Concurrency,
) -> WindowCounts {
    let counts = match mode {
        Concurrency::Sequential => {
            let mut acc = WindowCounts::default();
            for post in posts {
                acc.absorb(post, universe);
            }
            acc
        }
        Concurrency::Parallel => posts
            .par_iter()
            .fold(WindowCounts::default, |mut acc, post| {
                acc.absorb(post, universe);
                acc
            })
            .reduce(WindowCounts::default, WindowCounts::merge),
    };

    tracing::debug!(
        "aggregated {} posts into {} tickers",
        posts.len(),
        counts.scores.len()
    );
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> SymbolUniverse {
        SymbolUniverse::from_symbols(["GME", "AMC", "TSLA"])
    }

    fn posts() -> Vec<Post> {
        vec![
            Post::new("GME \u{1F680}\u{1F680}", 50),
            Post::new("$GME and AMC \u{1F680}", 10),
            Post::new("TSLA earnings play", -5),
            Post::new("no tickers here", 100),
            Post::new("GME again", 1),
        ]
    }

    #[test]
    fn test_sequential_aggregation_totals() {
        let counts = aggregate_window(&posts(), &universe(), Concurrency::Sequential);
        assert_eq!(counts.scores.get("GME"), Some(&61));
        assert_eq!(counts.scores.get("AMC"), Some(&10));
        assert_eq!(counts.scores.get("TSLA"), Some(&-5));
        assert_eq!(counts.scores.len(), 3);
        assert_eq!(counts.rockets.get("GME"), Some(&3));
        assert_eq!(counts.rockets.get("AMC"), Some(&1));
        assert_eq!(counts.rockets.get("TSLA"), Some(&0));
    }

    #[test]
    fn test_rockets_credited_to_all_co_mentioned_tickers() {
        let posts = vec![Post::new("$GME $AMC \u{1F680}\u{1F680}\u{1F680}", 7)];
        let counts = aggregate_window(&posts, &universe(), Concurrency::Sequential);
        assert_eq!(counts.rockets.get("GME"), Some(&3));
        assert_eq!(counts.rockets.get("AMC"), Some(&3));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let posts = posts();
        let sequential = aggregate_window(&posts, &universe(), Concurrency::Sequential);
        let parallel = aggregate_window(&posts, &universe(), Concurrency::Parallel);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_partition_invariance() {
        let posts = posts();
        let whole = aggregate_window(&posts, &universe(), Concurrency::Sequential);
        for split in 0..=posts.len() {
            let left = aggregate_window(&posts[..split], &universe(), Concurrency::Sequential);
            let right = aggregate_window(&posts[split..], &universe(), Concurrency::Sequential);
            assert_eq!(left.merge(right), whole);
        }
    }

    #[test]
    fn test_empty_stream_yields_empty_maps() {
        let counts = aggregate_window(&[], &universe(), Concurrency::Parallel);
        assert!(counts.scores.is_empty());
        assert!(counts.rockets.is_empty());
    }
}
