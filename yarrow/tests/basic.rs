#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::float_cmp)]

use yarrow::{LoadError, Mapping, Scalar, Yaml, YamlEmitter};

#[test]
fn test_api() {
    let s = "
# from yaml-cpp example
- name: Ogre
  position: [0, 5, 0]
  powers:
    - name: Club
      damage: 10
    - name: Fist
      damage: 8
- name: Dragon
  position: [1, 0, 10]
  powers:
    - name: Fire Breath
      damage: 25
    - name: Claws
      damage: 15
- name: Wizard
  position: [5, -3, 0]
  powers:
    - name: Acid Rain
      damage: 50
    - name: Staff
      damage: 3
";
    let docs = Yaml::load_from_str(s).unwrap();
    let doc = &docs[0];

    assert_eq!(doc[0]["name"].as_str().unwrap(), "Ogre");
    assert_eq!(doc[1]["powers"][0]["damage"].as_integer().unwrap(), 25);
    assert_eq!(doc[2]["position"][1].as_integer().unwrap(), -3);

    let mut writer = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut writer);
        emitter.dump(doc).unwrap();
    }

    assert!(!writer.is_empty());
}

#[test]
fn test_coerce() {
    let s = "---
a: 1
b: 2.2
c: [1, 2]
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];
    assert_eq!(doc["a"].as_integer().unwrap(), 1i64);
    assert_eq!(doc["b"].as_floating_point().unwrap(), 2.2f64);
    assert_eq!(doc["c"][1].as_integer().unwrap(), 2i64);
    assert!(doc["d"].is_badvalue());
}

#[test]
fn test_anchor() {
    let s = "
a1: &DEFAULT
    b1: 4
    b2: d
a2: *DEFAULT
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];
    assert_eq!(doc["a2"]["b1"].as_integer().unwrap(), 4);
    assert_eq!(doc["a1"], doc["a2"]);
}

#[test]
fn test_anchor_redefinition() {
    let s = "
- &a first
- *a
- &a second
- *a
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];
    assert_eq!(doc[1].as_str().unwrap(), "first");
    assert_eq!(doc[3].as_str().unwrap(), "second");
}

#[test]
fn test_recursive_alias() {
    let s = "
a1: &DEFAULT
    b1: 4
    b2: *DEFAULT
";
    let err = Yaml::load_from_str(s).unwrap_err();
    assert!(
        matches!(&err, LoadError::RecursiveAlias { name, .. } if name == "DEFAULT"),
        "{err:?}"
    );
}

#[test]
fn test_unknown_anchor() {
    let err = Yaml::load_from_str("- *nope\n").unwrap_err();
    let LoadError::UnknownAnchor { name, marker } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(name, "nope");
    assert_eq!(marker.line(), 0);
    assert_eq!(marker.col(), 2);
    assert!(err.to_string().starts_with("unknown anchor `nope` at"));
}

#[test]
fn test_anchors_do_not_cross_documents() {
    let err = Yaml::load_from_str("--- &a 1\n--- *a\n").unwrap_err();
    assert!(matches!(err, LoadError::UnknownAnchor { .. }));
}

#[test]
fn test_scan_error() {
    let err = Yaml::load_from_str("a: [1, 2\n").unwrap_err();
    assert!(matches!(err, LoadError::Scan(_)));
}

#[test]
fn test_plain_datatype() {
    let s = "
- 'string'
- \"string\"
- string
- 123
- -321
- 1.23
- -1e4
- ~
- null
- true
- false
- !!str 0
- !!int 100
- !!float 2
- !!null ~
- !!bool true
- !!bool false
- 0xFF
# bad values
- !!int string
- !!float string
- !!bool null
- !!null val
- 0o77
- [ 0xF, 0xF ]
- +12345
- [ true, false ]
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];

    assert_eq!(doc[0].as_str().unwrap(), "string");
    assert_eq!(doc[1].as_str().unwrap(), "string");
    assert_eq!(doc[2].as_str().unwrap(), "string");
    assert_eq!(doc[3].as_integer().unwrap(), 123);
    assert_eq!(doc[4].as_integer().unwrap(), -321);
    assert_eq!(doc[5].as_floating_point().unwrap(), 1.23);
    // YAML 1.1 floats need a dot.
    assert_eq!(doc[6].as_str().unwrap(), "-1e4");
    assert!(doc[7].is_null());
    assert!(doc[8].is_null());
    assert_eq!(doc[9].as_bool().unwrap(), true);
    assert_eq!(doc[10].as_bool().unwrap(), false);
    assert_eq!(doc[11].as_str().unwrap(), "0");
    assert_eq!(doc[12].as_integer().unwrap(), 100);
    assert_eq!(doc[13].as_floating_point().unwrap(), 2.0);
    assert!(doc[14].is_null());
    assert_eq!(doc[15].as_bool().unwrap(), true);
    assert_eq!(doc[16].as_bool().unwrap(), false);
    assert_eq!(doc[17].as_integer().unwrap(), 255);
    assert!(doc[18].is_badvalue());
    assert!(doc[19].is_badvalue());
    assert!(doc[20].is_badvalue());
    assert!(doc[21].is_badvalue());
    // `0o` is not an octal prefix in YAML 1.1.
    assert_eq!(doc[22].as_str().unwrap(), "0o77");
    assert_eq!(doc[23][0].as_integer().unwrap(), 15);
    assert_eq!(doc[23][1].as_integer().unwrap(), 15);
    assert_eq!(doc[24].as_integer().unwrap(), 12345);
    assert!(doc[25][0].as_bool().unwrap());
    assert!(!doc[25][1].as_bool().unwrap());
}

#[test]
fn test_yaml_1_1_datatype() {
    let s = "
- yes
- No
- on
- OFF
- y
- 0777
- 0b1010
- 1_000
- 1:30
- 1:30.5
- 1_000.5
- .Inf
- -.inf
- 2001-12-14
- <<
- =
- 9223372036854775808
- 'yes'
- ! yes
- ! 12
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];

    assert_eq!(doc[0].as_bool(), Some(true));
    assert_eq!(doc[1].as_bool(), Some(false));
    assert_eq!(doc[2].as_bool(), Some(true));
    assert_eq!(doc[3].as_bool(), Some(false));
    assert_eq!(doc[4].as_str(), Some("y"));
    assert_eq!(doc[5].as_integer(), Some(511));
    assert_eq!(doc[6].as_integer(), Some(10));
    assert_eq!(doc[7].as_integer(), Some(1000));
    assert_eq!(doc[8].as_integer(), Some(90));
    assert_eq!(doc[9].as_floating_point(), Some(90.5));
    assert_eq!(doc[10].as_floating_point(), Some(1000.5));
    assert_eq!(doc[11].as_floating_point(), Some(f64::INFINITY));
    assert_eq!(doc[12].as_floating_point(), Some(f64::NEG_INFINITY));
    // Timestamps, merge and value keys are kept as strings.
    assert_eq!(doc[13].as_str(), Some("2001-12-14"));
    assert_eq!(doc[14].as_str(), Some("<<"));
    assert_eq!(doc[15].as_str(), Some("="));
    // Too large for an `i64`.
    assert_eq!(doc[16].as_str(), Some("9223372036854775808"));
    assert_eq!(doc[17].as_str(), Some("yes"));
    // The non-specific tag resolves as an untagged plain scalar.
    assert_eq!(doc[18].as_bool(), Some(true));
    assert_eq!(doc[19].as_integer(), Some(12));
}

#[test]
fn test_plain_datatype_with_into_methods() {
    let s = "
- 'string'
- \"string\"
- string
- 123
- -321
- 1.23
- true
- false
- !!str 0
- !!int 100
- !!float 2
- !!bool true
- !!bool false
- 0xFF
- 077
- +12345
- -.INF
- .NAN
- !!float .INF
";
    let mut out = Yaml::load_from_str(s).unwrap().into_iter();
    let mut doc = out.next().unwrap().into_iter();

    assert_eq!(doc.next().unwrap().into_string().unwrap(), "string");
    assert_eq!(doc.next().unwrap().into_string().unwrap(), "string");
    assert_eq!(doc.next().unwrap().into_string().unwrap(), "string");
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), 123);
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), -321);
    assert_eq!(doc.next().unwrap().into_floating_point().unwrap(), 1.23);
    assert_eq!(doc.next().unwrap().into_bool().unwrap(), true);
    assert_eq!(doc.next().unwrap().into_bool().unwrap(), false);
    assert_eq!(doc.next().unwrap().into_string().unwrap(), "0");
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), 100);
    assert_eq!(doc.next().unwrap().into_floating_point().unwrap(), 2.0);
    assert_eq!(doc.next().unwrap().into_bool().unwrap(), true);
    assert_eq!(doc.next().unwrap().into_bool().unwrap(), false);
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), 255);
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), 63);
    assert_eq!(doc.next().unwrap().into_integer().unwrap(), 12345);
    assert_eq!(
        doc.next().unwrap().into_floating_point().unwrap(),
        f64::NEG_INFINITY
    );
    assert!(doc.next().unwrap().into_floating_point().unwrap().is_nan());
    assert_eq!(
        doc.next().unwrap().into_floating_point().unwrap(),
        f64::INFINITY
    );
    assert!(doc.next().is_none());
}

#[test]
fn test_collection_tags() {
    let s = "
- !!seq [a]
- !!map {a: b}
- !!map [a]
- !!seq {a: b}
- !!int [1]
- !!seq a
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = &out[0];
    assert!(doc[0].is_sequence());
    assert!(doc[1].is_mapping());
    assert!(doc[2].is_badvalue());
    assert!(doc[3].is_badvalue());
    assert!(doc[4].is_badvalue());
    assert!(doc[5].is_badvalue());
}

#[test]
fn test_hash_order() {
    let s = "---
b: ~
a: ~
c: ~
";
    let out = Yaml::load_from_str(s).unwrap();
    let first = out.into_iter().next().unwrap();
    let mut iter = first.into_mapping().unwrap().into_iter();
    assert_eq!(
        Some((Yaml::Value(Scalar::String("b".into())), Yaml::Value(Scalar::Null))),
        iter.next()
    );
    assert_eq!(
        Some((Yaml::Value(Scalar::String("a".into())), Yaml::Value(Scalar::Null))),
        iter.next()
    );
    assert_eq!(
        Some((Yaml::Value(Scalar::String("c".into())), Yaml::Value(Scalar::Null))),
        iter.next()
    );
    assert_eq!(None, iter.next());
}

#[test]
fn test_integer_key() {
    let s = "
0:
    important: true
1:
    important: false
";
    let out = Yaml::load_from_str(s).unwrap();
    let first = out.into_iter().next().unwrap();
    assert_eq!(first[0]["important"].as_bool().unwrap(), true);
    assert_eq!(first[1]["important"].as_bool().unwrap(), false);
}

#[test]
fn test_complex_keys() {
    let s = "
? [a, b]
: sequence key
? {c: d}
: mapping key
";
    let out = Yaml::load_from_str(s).unwrap();
    let doc = out[0].as_mapping().unwrap();
    let seq_key = Yaml::Sequence(vec![Yaml::value_from_str("a"), Yaml::value_from_str("b")]);
    assert_eq!(doc.get(&seq_key).unwrap().as_str(), Some("sequence key"));
    let mut map_key = Mapping::new();
    map_key.insert(Yaml::value_from_str("c"), Yaml::value_from_str("d"));
    assert_eq!(
        doc.get(&Yaml::Mapping(map_key)).unwrap().as_str(),
        Some("mapping key")
    );
}

#[test]
fn test_multiple_documents() {
    let s = "
a
---
--- b
...
%YAML 1.1
---
[c]
";
    let out = Yaml::load_from_str(s).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[0].as_str(), Some("a"));
    // An empty document holds a null.
    assert!(out[1].is_null());
    assert_eq!(out[2].as_str(), Some("b"));
    assert_eq!(out[3][0].as_str(), Some("c"));
    assert!(Yaml::load_from_str("").unwrap().is_empty());
    assert!(Yaml::load_from_str("# only a comment\n").unwrap().is_empty());
}

#[test]
fn test_or() {
    let out = Yaml::load_from_str("a: ~\nb: 2\n").unwrap();
    let doc = &out[0];
    let fallback = Yaml::Value(Scalar::Integer(1));
    assert_eq!(doc["a"].borrowed_or(&fallback), &fallback);
    assert_eq!(doc["b"].clone().or(fallback.clone()).as_integer(), Some(2));
    assert_eq!(doc["c"].clone().or(fallback), Yaml::Value(Scalar::Integer(1)));
}
