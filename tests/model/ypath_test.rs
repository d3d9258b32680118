// tests/model/ypath_test.rs
use std::collections::BTreeSet;
use xunit::model::{Dimension, XUnitDesc, YPath};

fn geo() -> Dimension {
    Dimension::new(
        "geo",
        vec!["continent".into(), "country".into(), "state".into()],
        vec!["NA".into(), "USA".into(), "CA".into()],
    )
    .unwrap()
}

fn platform() -> Dimension {
    Dimension::new(
        "platform",
        vec!["p".into(), "p2".into()],
        vec!["Desktop".into(), "Desktop Web".into()],
    )
    .unwrap()
}

#[test]
fn test_ypath_count_matches_levels() {
    assert_eq!(geo().ypaths().count(), 3);
    assert_eq!(platform().ypaths().count(), 2);
    assert_eq!(Dimension::single("age", "bucket", "25-34").ypaths().count(), 1);
}

#[test]
fn test_ypath_grammar() {
    let platform = platform();
    let paths: Vec<String> = platform.ypaths().map(|p| p.to_string()).collect();
    assert_eq!(
        paths,
        vec!["/platform/p=Desktop", "/platform/p=Desktop/p2=Desktop Web"]
    );
}

#[test]
fn test_each_path_extends_the_previous() {
    let geo = geo();
    let paths: Vec<YPath<'_>> = geo.ypaths().collect();
    for pair in paths.windows(2) {
        assert!(pair[1].as_str().starts_with(pair[0].as_str()));
        assert_eq!(pair[1].depth(), pair[0].depth() + 1);
        assert_eq!(pair[1].dimension(), &geo);
    }
}

#[test]
fn test_equivalent_descriptors_collapse() {
    let geo = geo();
    let platform = platform();
    let g = geo.ypaths().nth(1).unwrap();
    let p = platform.ypaths().next().unwrap();

    let mut set = BTreeSet::new();
    set.insert(XUnitDesc::from_ypath(g.clone()).extend(p.clone()));
    set.insert(XUnitDesc::from_ypath(p.clone()).extend(g.clone()));
    set.insert(XUnitDesc::from_ypath(g.clone()).prepend(p.clone()));

    assert_eq!(set.len(), 1);
    let only = set.into_iter().next().unwrap();
    assert_eq!(
        only.to_string(),
        "/geo/continent=NA/country=USA,/platform/p=Desktop"
    );
}

#[test]
fn test_prepend_and_extend_positions() {
    let geo = geo();
    let platform = platform();
    let g = geo.ypaths().next().unwrap();
    let p = platform.ypaths().next().unwrap();

    let base = XUnitDesc::from_ypath(g.clone());
    assert_eq!(base.prepend(p.clone()).ypaths()[0], p);
    assert_eq!(base.extend(p.clone()).ypaths()[1], p);
    // The original is untouched.
    assert_eq!(base.num_dims(), 1);
}
