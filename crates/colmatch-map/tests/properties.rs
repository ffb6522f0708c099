use colmatch_map::{
    CandidateQuadrants, Matcher, MatcherRegistry, QuadrantThresholds, SourceFacts, SourceScores,
    WeightUpdater,
};
use colmatch_model::{Candidate, ColumnType, Operation};
use proptest::prelude::*;

const TARGETS: [&str; 5] = ["t0", "t1", "t2", "t3", "t4"];
const MATCHERS: [&str; 3] = ["fuzzy_name", "value_distribution", "jaccard_distance"];

fn registry() -> MatcherRegistry {
    let mut registry = MatcherRegistry::new();
    registry.register(MATCHERS[0], Matcher::FuzzyName).unwrap();
    registry.register(MATCHERS[1], Matcher::ValueDistribution).unwrap();
    registry.register(MATCHERS[2], Matcher::Jaccard).unwrap();
    registry
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Accept),
        Just(Operation::Reject),
        Just(Operation::Discard),
    ]
}

fn quadrants(names: &[f64], values: &[f64], has_values: bool) -> CandidateQuadrants {
    quadrants_with(names, values, has_values, QuadrantThresholds::default())
}

fn quadrants_with(
    names: &[f64],
    values: &[f64],
    has_values: bool,
    thresholds: QuadrantThresholds,
) -> CandidateQuadrants {
    let pairs = |scores: &[f64]| SourceScores {
        source_column: "src".to_string(),
        targets: TARGETS
            .iter()
            .zip(scores)
            .map(|(t, s)| (t.to_string(), *s))
            .collect(),
    };
    CandidateQuadrants::from_scores(
        vec![SourceFacts {
            name: "src".to_string(),
            column_type: ColumnType::String,
            has_values,
        }],
        TARGETS.iter().map(|t| t.to_string()).collect(),
        Vec::new(),
        &[pairs(names)],
        &[pairs(values)],
        thresholds,
    )
}

proptest! {
    #[test]
    fn weights_stay_normalized(
        scores in prop::collection::vec(0.0f64..=1.0, 15),
        steps in prop::collection::vec((operation(), 0usize..5), 0..20),
    ) {
        let candidates: Vec<Candidate> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                Candidate::new("src", TARGETS[i % TARGETS.len()], *score, MATCHERS[i % MATCHERS.len()])
            })
            .collect();
        let mut registry = registry();
        let updater = WeightUpdater::new(&mut registry, &candidates, 0.1, 0.3);
        for (operation, target) in steps {
            updater.update_weights(&mut registry, operation, "src", TARGETS[target]);
            let weights = registry.weights();
            let sum: f64 = weights.values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(weights.values().all(|w| *w >= 0.0));
        }
    }

    #[test]
    fn strict_easy_tier_is_a_subset(
        names in prop::collection::vec(0.0f64..=1.0, 5),
        values in prop::collection::vec(0.0f64..=1.0, 5),
        has_values in any::<bool>(),
    ) {
        let q = quadrants(&names, &values, has_values);
        let strict = q.get_easy_matches("src", true);
        let loose = q.get_easy_matches("src", false);
        prop_assert!(strict.iter().all(|t| loose.contains(t)));

        let potential = q.get_potential_matches("src");
        prop_assert!(potential.iter().all(|t| !strict.contains(t)));
    }

    #[test]
    fn raising_thresholds_never_adds_easy_matches(
        names in prop::collection::vec(0.0f64..=1.0, 5),
        values in prop::collection::vec(0.0f64..=1.0, 5),
        base_name in 0.0f64..=1.0,
        base_value in 0.0f64..=1.0,
        raise_name in 0.0f64..=0.5,
        raise_value in 0.0f64..=0.5,
    ) {
        let low = QuadrantThresholds {
            column_name: base_name,
            value: base_value,
            ..QuadrantThresholds::default()
        };
        let high = QuadrantThresholds {
            column_name: base_name + raise_name,
            value: base_value + raise_value,
            ..QuadrantThresholds::default()
        };
        for very_high in [true, false] {
            let loose = quadrants_with(&names, &values, true, low).get_easy_matches("src", very_high);
            let strict = quadrants_with(&names, &values, true, high).get_easy_matches("src", very_high);
            prop_assert!(strict.len() <= loose.len());
            prop_assert!(strict.iter().all(|t| loose.contains(t)));
        }
    }

    #[test]
    fn quadrants_partition_scored_targets(
        names in prop::collection::vec(0.0f64..=1.0, 5),
        values in prop::collection::vec(0.0f64..=1.0, 5),
    ) {
        let q = quadrants(&names, &values, true);
        let mut seen: Vec<String> = Vec::new();
        for (name_high, value_high) in [(false, false), (false, true), (true, false), (true, true)] {
            for target in q.get_quadrant("src", name_high, value_high) {
                prop_assert!(!seen.contains(target));
                seen.push(target.clone());
            }
        }
        seen.sort();
        let expected: Vec<String> = TARGETS.iter().map(|t| t.to_string()).collect();
        prop_assert_eq!(seen, expected);
    }
}
