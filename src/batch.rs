use crate::config::MergerConfig;
use crate::graph::builder::TaggedLine;
use crate::merger::LineMerger;
use crate::output::MergedLine;
use log::info;
use rayon::prelude::*;

/// Merge independent batches (tiles, junction groups) in parallel, one
/// merger per batch. Results come back in batch order.
pub fn merge_batches(batches: Vec<Vec<TaggedLine>>, config: &MergerConfig) -> Vec<Vec<MergedLine>> {
    info!(
        "Merging {} batches on {} threads",
        batches.len(),
        rayon::current_num_threads()
    );
    batches
        .into_par_iter()
        .map(|batch| {
            let mut merger = LineMerger::new(config.clone());
            for line in batch {
                merger.add(line);
            }
            merger.merged_lines()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::LineAttrs;
    use geo_types::Coord;

    fn line(points: &[(f64, f64)], source_id: i64) -> TaggedLine {
        TaggedLine::new(
            points.iter().map(|&(x, y)| Coord { x, y }).collect(),
            LineAttrs {
                source_id,
                ..LineAttrs::default()
            },
        )
    }

    #[test]
    fn test_batches_match_sequential_runs() {
        let batches = vec![
            vec![line(&[(0.0, 0.0), (1.0, 0.0)], 1), line(&[(1.0, 0.0), (2.0, 0.0)], 2)],
            vec![],
            vec![line(&[(5.0, 5.0), (6.0, 6.0)], 3)],
        ];
        let config = MergerConfig::default();

        let sequential: Vec<Vec<MergedLine>> = batches
            .iter()
            .map(|batch| {
                let mut merger = LineMerger::new(config.clone());
                for l in batch {
                    merger.add(l.clone());
                }
                merger.merged_lines()
            })
            .collect();

        let parallel = merge_batches(batches, &config);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel[0].len(), 1);
        assert_eq!(parallel[0][0].source_ids, vec![1, 2]);
        assert!(parallel[1].is_empty());
    }
}
