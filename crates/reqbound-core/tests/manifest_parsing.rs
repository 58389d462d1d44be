use std::fs;

use reqbound_core::config::DuplicatePolicy;
use reqbound_core::manifest::RequirementSet;
use reqbound_core::version::Version;
use reqbound_util::errors::ReqboundError;
use tempfile::TempDir;

const BASE: &str = "\
# NOTE: the upper bound for the package version is only set for CI stability, and it is dropped while installing this package
#  in case you want to preserve/enforce restrictions on the latest compatible version, add \"strict\" as an in-line comment

numpy >1.20.0
packaging >17.1
torch >=2.0.0, <2.8.0
lightning-utilities >=0.8.0, <0.15.0
typing-extensions; python_version < \"3.9\"
transformers >4.4.0, <4.52.0
scipy >1.0.0, <1.16.0  # strict
";

#[test]
fn parses_base_requirements() {
    let set = RequirementSet::parse_str(BASE, DuplicatePolicy::Reject).unwrap();
    assert_eq!(set.len(), 7);

    let names: Vec<&str> = set.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "numpy",
            "packaging",
            "torch",
            "lightning-utilities",
            "typing-extensions",
            "transformers",
            "scipy"
        ]
    );

    assert!(set.get("scipy").unwrap().strict);
    assert!(!set.get("transformers").unwrap().strict);
    assert_eq!(
        set.get("typing-extensions").unwrap().marker.as_deref(),
        Some("python_version < \"3.9\"")
    );
}

#[test]
fn comments_and_blanks_produce_no_records() {
    let set = RequirementSet::parse_str("# only a comment\n\n   \n#numpy >1\n", DuplicatePolicy::Reject)
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn lookup_is_name_normalized() {
    let set = RequirementSet::parse_str("Typing_Extensions >=4.0\n", DuplicatePolicy::Reject).unwrap();
    assert!(set.get("typing-extensions").is_some());
    assert!(set.get("TYPING.EXTENSIONS").is_some());
}

#[test]
fn render_round_trips_to_equivalent_set() {
    let set = RequirementSet::parse_str(BASE, DuplicatePolicy::Reject).unwrap();
    let rendered = set.render();
    let reparsed = RequirementSet::parse_str(&rendered, DuplicatePolicy::Reject).unwrap();
    assert_eq!(set.records(), reparsed.records());
    // Rendering is stable after the first pass.
    assert_eq!(reparsed.render(), rendered);
}

#[test]
fn render_formats_lines() {
    let set = RequirementSet::parse_str(
        "transformers>4.4.0,<4.52.0\nscipy >1.0.0,<1.16.0 # Strict\n",
        DuplicatePolicy::Reject,
    )
    .unwrap();
    assert_eq!(
        set.render(),
        "transformers >4.4.0, <4.52.0\nscipy >1.0.0, <1.16.0  # strict\n"
    );
}

#[test]
fn duplicates_rejected_by_default() {
    let err = RequirementSet::parse_str("torch >=2.0\nnumpy\ntorch <3\n", DuplicatePolicy::Reject)
        .unwrap_err();
    match err {
        ReqboundError::DuplicatePackage {
            name,
            first_line,
            line,
            ..
        } => {
            assert_eq!(name, "torch");
            assert_eq!(first_line, 1);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn duplicates_detected_across_spellings() {
    let err = RequirementSet::parse_str(
        "lightning_utilities >=0.8\nLightning-Utilities <1\n",
        DuplicatePolicy::Reject,
    )
    .unwrap_err();
    assert!(matches!(err, ReqboundError::DuplicatePackage { .. }));
}

#[test]
fn last_wins_keeps_first_position() {
    let set = RequirementSet::parse_str(
        "torch >=2.0\nnumpy\ntorch >=2.1, <3\n",
        DuplicatePolicy::LastWins,
    )
    .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.records()[0].name, "torch");
    let torch = set.get("torch").unwrap();
    assert!(torch.contains(&Version::parse("2.1.0").unwrap()));
    assert!(!torch.contains(&Version::parse("2.0.5").unwrap()));
    let (_, location) = set.iter_located().next().unwrap();
    assert_eq!(location.line, 3);
}

#[test]
fn malformed_line_aborts_with_line_number() {
    let err = RequirementSet::parse_str("numpy >1\n\ntorch >=2.0 <3\n", DuplicatePolicy::Reject)
        .unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert!(matches!(err, ReqboundError::MalformedConstraint { .. }));
}

#[test]
fn include_rejected_for_in_memory_text() {
    let err = RequirementSet::parse_str("-r base.txt\n", DuplicatePolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("includes are only supported"));
}

#[test]
fn include_error_keeps_raw_line() {
    let err = RequirementSet::parse_str("numpy\n--requirement=extra.txt  # audio\n", DuplicatePolicy::Reject)
        .unwrap_err();
    match err {
        ReqboundError::MalformedConstraint { line, text, .. } => {
            assert_eq!(line, 2);
            assert_eq!(text, "--requirement=extra.txt  # audio");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn round_trip_covers_every_line_form() {
    let cases = [
        "lightning[extra,test] >=2.0",
        "scipy ==1.11.4",
        "pandas >=1.5, <=2.2.3",
        "torch >2.0rc1, <2.8.0.dev0",
        "numpy >=1.0.post2",
        "jax >=v0.4.20",
        "torch ==2.1.0+cu118",
        "typing-extensions;python_version<\"3.9\"",
        "packaging  # strict",
        "pillow >9; sys_platform == \"linux\"  # strict",
        "Typing_Extensions.Foo <5",
    ];
    for line in cases {
        let first = RequirementSet::parse_str(line, DuplicatePolicy::Reject)
            .unwrap_or_else(|e| panic!("{line}: {e}"));
        let rendered = first.render();
        let second = RequirementSet::parse_str(&rendered, DuplicatePolicy::Reject)
            .unwrap_or_else(|e| panic!("{rendered}: {e}"));
        assert_eq!(first.records(), second.records(), "round trip of `{line}`");
        assert_eq!(second.render(), rendered, "stable render of `{line}`");
    }
}

#[test]
fn round_trip_keeps_strict_on_bare_name() {
    let set = RequirementSet::parse_str("packaging  # strict\n", DuplicatePolicy::Reject).unwrap();
    assert_eq!(set.render(), "packaging  # strict\n");
    let reparsed = RequirementSet::parse_str(&set.render(), DuplicatePolicy::Reject).unwrap();
    assert!(reparsed.get("packaging").unwrap().strict);
}

#[test]
fn duplicate_across_files_names_both_locations() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "scipy >1\nnumpy >1\n").unwrap();
    fs::write(&b, "numpy <3\n").unwrap();

    let err = RequirementSet::from_paths(&[&a, &b], DuplicatePolicy::Reject).unwrap_err();
    match &err {
        ReqboundError::DuplicatePackage {
            origin,
            first_origin,
            first_line,
            line,
            ..
        } => {
            assert!(origin.ends_with("b.txt"));
            assert_eq!(*line, 1);
            assert!(first_origin.ends_with("a.txt"));
            assert_eq!(*first_line, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains(&format!("first listed at {}:2", a.display())), "got: {message}");
}

#[test]
fn from_path_follows_includes() {
    let tmp = TempDir::new().unwrap();
    let reqs = tmp.path().join("requirements");
    fs::create_dir_all(&reqs).unwrap();
    fs::write(reqs.join("base.txt"), "numpy >1.20.0\ntorch >=2.0.0, <2.8.0\n").unwrap();
    fs::write(
        reqs.join("audio.txt"),
        "-r base.txt\n--extra-index-url https://example.invalid/simple\ntorchaudio >=2.0.0, <2.8.0\n",
    )
    .unwrap();

    let set = RequirementSet::from_path(&reqs.join("audio.txt"), DuplicatePolicy::Reject).unwrap();
    let names: Vec<&str> = set.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["numpy", "torch", "torchaudio"]);

    let origins: Vec<String> = set
        .iter_located()
        .map(|(_, loc)| loc.origin.clone())
        .collect();
    assert!(origins[0].ends_with("base.txt"));
    assert!(origins[2].ends_with("audio.txt"));
}

#[test]
fn diamond_include_loads_once() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("base.txt"), "numpy >1\n").unwrap();
    fs::write(tmp.path().join("a.txt"), "-r base.txt\nscipy >1\n").unwrap();
    fs::write(tmp.path().join("b.txt"), "-r base.txt\npandas >1\n").unwrap();
    fs::write(tmp.path().join("all.txt"), "-r a.txt\n-r b.txt\n").unwrap();

    let set = RequirementSet::from_path(&tmp.path().join("all.txt"), DuplicatePolicy::Reject).unwrap();
    assert_eq!(set.len(), 3);
}

#[test]
fn include_cycle_is_an_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "-r b.txt\n").unwrap();
    fs::write(tmp.path().join("b.txt"), "numpy\n-r a.txt\n").unwrap();

    let err = RequirementSet::from_path(&tmp.path().join("a.txt"), DuplicatePolicy::Reject).unwrap_err();
    assert!(matches!(err, ReqboundError::IncludeCycle { .. }), "got {err:?}");
}

#[test]
fn missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = RequirementSet::from_path(&tmp.path().join("nope.txt"), DuplicatePolicy::Reject)
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn collect_errors_reports_every_problem() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("reqs.txt");
    fs::write(&path, "numpy >1\ntorch >>2\nscipy 1.0\nnumpy <3\npandas >=1\n").unwrap();

    let (set, errors) = RequirementSet::collect_errors(&[&path], DuplicatePolicy::Reject);
    assert_eq!(set.len(), 2);
    let lines: Vec<Option<usize>> = errors.iter().map(|e| e.line()).collect();
    assert_eq!(lines, [Some(2), Some(3), Some(4)]);
}

#[test]
fn from_paths_merges_files() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.txt");
    fs::write(&a, "numpy >1\n").unwrap();
    fs::write(&b, "numpy <3\n").unwrap();

    assert!(RequirementSet::from_paths(&[&a, &b], DuplicatePolicy::Reject).is_err());
    let set = RequirementSet::from_paths(&[&a, &b], DuplicatePolicy::LastWins).unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.get("numpy").unwrap().min_version.is_none());
}
