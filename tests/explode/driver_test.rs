//! Tests for the row driver under the constrained policy.

use insta::assert_snapshot;
use std::collections::{BTreeMap, BTreeSet};
use xunit::explode::{
    assemble, expand_subset, Collector, Counter, DimSet, ExplodePolicy, Exploder, GLOBAL_UNIT,
};
use xunit::model::Dimension;
use xunit::ExplodeError;

fn dim(name: &str, levels: &[(&str, &str)]) -> Dimension {
    Dimension::new(
        name,
        levels.iter().map(|(n, _)| n.to_string()).collect(),
        levels.iter().map(|(_, v)| v.to_string()).collect(),
    )
    .unwrap()
}

fn event(value: &str) -> Dimension {
    Dimension::single("event", "e", value)
}

fn spam(value: &str) -> Dimension {
    Dimension::single("spam", "is_spam", value)
}

fn age(value: &str) -> Dimension {
    Dimension::single("age", "bucket", value)
}

fn custom(attr: &str, value: &str) -> Dimension {
    Dimension::single("custom", attr, value)
}

fn geo() -> Dimension {
    dim("geo", &[("continent", "NA"), ("country", "USA"), ("state", "CA")])
}

fn platform() -> Dimension {
    dim("platform", &[("p", "Desktop"), ("p2", "Desktop Web")])
}

fn exploder() -> Exploder {
    Exploder::new(ExplodePolicy::Constrained)
}

/// Number of dimensions in a rendered XUnit.
fn num_dims(xunit: &str) -> usize {
    xunit.split(",/").count()
}

fn generated(xunits: &[String]) -> Vec<&String> {
    xunits.iter().filter(|x| x.as_str() != GLOBAL_UNIT).collect()
}

#[test]
fn test_single_dimension_global() {
    let dims = vec![Dimension::single("adim", "alpha", "a")];
    let explosion = exploder().explode(&dims, 1, true).unwrap();

    let expected: BTreeSet<String> = ["/adim/alpha=a", GLOBAL_UNIT]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(explosion.to_set(), expected);
    assert_eq!(explosion.emitted, 1);
    assert_eq!(explosion.filtered, 0);
}

#[test]
fn test_sentinel_only_in_global_mode() {
    let dims = vec![event("meetme"), age("25-34")];

    let global = exploder().explode(&dims, 3, true).unwrap();
    assert_eq!(
        global.xunits.iter().filter(|x| *x == GLOBAL_UNIT).count(),
        1
    );

    let scoped = exploder().explode(&dims, 3, false).unwrap();
    assert!(!scoped.contains(GLOBAL_UNIT));
}

#[test]
fn test_event_with_validated_spam() {
    let dims = vec![event("meetme"), spam("nonspammer-validated")];
    let explosion = exploder().explode(&dims, 3, false).unwrap();

    assert_eq!(
        explosion.xunits,
        vec![
            "/event/e=meetme",
            "/event/e=meetme,/spam/is_spam=nonspammer-validated",
        ]
    );
}

#[test]
fn test_unvalidated_spam_caps_depth_at_two() {
    let dims = vec![
        event("meetme"),
        spam("spammer-validated"),
        age("25-34"),
        geo(),
        platform(),
    ];
    let explosion = exploder().explode(&dims, 5, false).unwrap();

    assert!(explosion.xunits.iter().all(|x| num_dims(x) <= 2));
    assert!(explosion.xunits.iter().all(|x| x.contains("/event/e=meetme")));
    // {event} + {event, x} for x in age, geo(3), platform(2), spam
    assert_eq!(explosion.emitted, 1 + 1 + 3 + 2 + 1);
    assert!(explosion.contains("/event/e=meetme,/spam/is_spam=spammer-validated"));
}

#[test]
fn test_event_without_spam_uses_max_dims() {
    let dims = vec![event("meetme"), age("25-34"), geo()];
    let explosion = exploder().explode(&dims, 3, false).unwrap();

    // {event}, {event,age}, {event,geo}x3, {event,age,geo}x3
    assert_eq!(explosion.emitted, 8);
    assert!(explosion.contains("/age/bucket=25-34,/event/e=meetme,/geo/continent=NA/country=USA"));
}

#[test]
fn test_custom_dimensions_reach_one_deeper() {
    let dims = vec![
        event("meetme"),
        spam("nonspammer-validated"),
        age("25-34"),
        custom("c1_profile_view__friends", "NA"),
        custom("c2_profile_view__platform", "Web"),
    ];
    let explosion = exploder().explode(&dims, 3, false).unwrap();

    assert!(explosion
        .xunits
        .iter()
        .all(|x| x.matches("/custom/").count() <= 1));
    assert!(explosion.xunits.iter().any(|x| num_dims(x) == 4));

    assert_snapshot!(explosion.xunits.join("\n"), @r"
    /age/bucket=25-34,/custom/c1_profile_view__friends=NA,/event/e=meetme,/spam/is_spam=nonspammer-validated
    /age/bucket=25-34,/custom/c2_profile_view__platform=Web,/event/e=meetme,/spam/is_spam=nonspammer-validated
    /age/bucket=25-34,/event/e=meetme,/spam/is_spam=nonspammer-validated
    /custom/c1_profile_view__friends=NA,/event/e=meetme,/spam/is_spam=nonspammer-validated
    /custom/c2_profile_view__platform=Web,/event/e=meetme,/spam/is_spam=nonspammer-validated
    /event/e=meetme
    /event/e=meetme,/spam/is_spam=nonspammer-validated
    ");
}

#[test]
fn test_custom_with_unvalidated_spam() {
    let dims = vec![
        event("meetme"),
        spam("spammer-validated"),
        custom("c1_profile_view__friends", "NA"),
    ];
    let explosion = exploder().explode(&dims, 3, false).unwrap();

    let expected: BTreeSet<String> = [
        "/event/e=meetme",
        "/event/e=meetme,/spam/is_spam=spammer-validated",
        "/custom/c1_profile_view__friends=NA,/event/e=meetme",
        "/custom/c1_profile_view__friends=NA,/event/e=meetme,/spam/is_spam=spammer-validated",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(explosion.to_set(), expected);
}

#[test]
fn test_global_validated_spam() {
    let dims = vec![
        spam("nonspammer-validated"),
        event("meetme"),
        age("25-34"),
        geo(),
        platform(),
    ];
    let explosion = exploder().explode(&dims, 3, true).unwrap();

    // Levels: spam 1, event 1, age 1, geo 3, platform 2.
    // depth 1: 8, depth 2: all pairs = 24, depth 3 with spam: 17
    assert_eq!(explosion.emitted, 8 + 24 + 17);
    assert_eq!(explosion.len(), 8 + 24 + 17 + 1);
    assert_eq!(explosion.filtered, 0);

    for xunit in generated(&explosion.xunits) {
        if num_dims(xunit) == 3 {
            assert!(xunit.contains("/spam/is_spam=nonspammer-validated"), "{}", xunit);
        }
    }
}

#[test]
fn test_global_without_spam_caps_depth_at_two() {
    let dims = vec![event("meetme"), age("25-34"), geo(), platform()];
    let explosion = exploder().explode(&dims, 3, true).unwrap();

    // depth 1: 1 + 1 + 3 + 2, depth 2: pairs of those = 17
    assert_eq!(explosion.emitted, 7 + 17);
    assert!(generated(&explosion.xunits)
        .iter()
        .all(|x| num_dims(x) <= 2));
}

#[test]
fn test_global_zero_depth_emits_only_sentinel() {
    let dims = vec![event("meetme"), age("25-34")];
    let explosion = exploder().explode(&dims, 0, true).unwrap();
    assert_eq!(explosion.xunits, vec![GLOBAL_UNIT]);

    let dims = vec![age("25-34"), custom("c1", "x")];
    let explosion = exploder().explode(&dims, 0, true).unwrap();
    assert_eq!(explosion.xunits, vec![GLOBAL_UNIT]);
    assert_eq!(explosion.emitted, 0);
}

#[test]
fn test_missing_event_is_fatal() {
    let dims = vec![age("25-34"), spam("nonspammer-validated")];
    let err = exploder().explode(&dims, 3, false).unwrap_err();
    assert!(matches!(
        err,
        ExplodeError::MissingRequiredDimension {
            dimension: "event",
            ..
        }
    ));
}

#[test]
fn test_unsatisfiable_depth_is_fatal() {
    let dims = vec![event("meetme"), spam("nonspammer-validated")];
    let err = exploder().explode(&dims, 1, false).unwrap_err();
    assert!(matches!(
        err,
        ExplodeError::UnsatisfiableDepth {
            required: 2,
            max_depth: 1
        }
    ));
}

#[test]
fn test_permutation_invariance() {
    let dims = vec![
        event("meetme"),
        spam("nonspammer-validated"),
        age("25-34"),
        custom("c1_profile_view__friends", "NA"),
        custom("c2_profile_view__platform", "Web"),
        geo(),
        platform(),
    ];
    let mut reversed = dims.clone();
    reversed.reverse();
    let mut rotated = dims.clone();
    rotated.rotate_left(3);

    for global in [true, false] {
        let expected = exploder().explode(&dims, 3, global).unwrap();
        assert_eq!(exploder().explode(&reversed, 3, global).unwrap(), expected);
        assert_eq!(exploder().explode(&rotated, 3, global).unwrap(), expected);
    }
}

#[test]
fn test_repeatable() {
    let dims = vec![event("meetme"), spam("nonspammer-validated"), geo(), platform()];
    let exploder = exploder();
    let first = exploder.explode(&dims, 3, false).unwrap();
    let second = exploder.explode(&dims, 3, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_emitted_respect_effective_bound() {
    let dims = vec![
        event("meetme"),
        spam("nonspammer-validated"),
        age("25-34"),
        custom("c1_profile_view__friends", "NA"),
        geo(),
        platform(),
    ];
    for max_dims in 2..=4 {
        let explosion = exploder().explode(&dims, max_dims, false).unwrap();
        for xunit in &explosion.xunits {
            let bound = max_dims + usize::from(xunit.contains("/custom/"));
            assert!(num_dims(xunit) <= bound, "{} exceeds {}", xunit, bound);
        }
    }
}

#[test]
fn test_custom_sentinel() {
    let dims = vec![age("25-34")];
    let explosion = exploder()
        .with_sentinel("GLOBAL")
        .unwrap()
        .explode(&dims, 2, true)
        .unwrap();
    assert!(explosion.contains("GLOBAL"));
    assert!(!explosion.contains(GLOBAL_UNIT));
}

#[derive(Default)]
struct RecordingCollector {
    forwarded: Vec<String>,
    counters: Vec<(&'static str, u64)>,
}

impl Collector for RecordingCollector {
    fn forward(&mut self, xunit: &str) {
        self.forwarded.push(xunit.to_string());
    }

    fn incr_counter(&mut self, counter: Counter, by: u64) {
        self.counters.push((counter.name(), by));
    }
}

#[test]
fn test_collector_receives_counters() {
    let dims = vec![event("meetme"), spam("nonspammer-validated")];
    let mut collector = RecordingCollector::default();
    exploder()
        .explode_into(&dims, 3, true, &mut collector)
        .unwrap();

    assert_eq!(collector.forwarded[0], GLOBAL_UNIT);
    let exploded = collector
        .counters
        .iter()
        .find(|(name, _)| *name == "NumXUnitsExploded")
        .map(|(_, n)| *n);
    assert_eq!(exploded, Some(collector.forwarded.len() as u64 - 1));
    assert!(collector
        .counters
        .iter()
        .any(|(name, n)| *name == "NumXUnitsFiltered" && *n == 0));
}

#[test]
fn test_nothing_forwarded_on_fatal_error() {
    let dims = vec![age("25-34")];
    let mut collector = RecordingCollector::default();
    let result = exploder().explode_into(&dims, 3, false, &mut collector);

    assert!(result.is_err());
    assert!(collector.forwarded.is_empty());
    assert!(collector.counters.is_empty());
}

#[test]
fn test_xunit_count_is_product_of_levels() {
    let geo = geo();
    let platform = platform();
    let age = age("25-34");
    let dims: BTreeMap<String, &Dimension> = [&geo, &platform, &age]
        .into_iter()
        .map(|d| (d.key().into_owned(), d))
        .collect();
    let subset = DimSet::from_iter(["geo", "platform", "age"]);

    let xunits = expand_subset(&subset, &dims).unwrap();
    assert_eq!(xunits.len(), 3 * 2 * 1);
    assert!(xunits.iter().all(|x| x.num_dims() == 3));

    let assembly = assemble(&BTreeSet::from([subset]), &dims).unwrap();
    assert_eq!(assembly.xunits.len(), 6);
    assert_eq!(assembly.generated, 6);
    assert!(assembly
        .xunits
        .contains_key("/age/bucket=25-34,/geo/continent=NA/country=USA,/platform/p=Desktop"));
}
