use yarrow::{
    emitter::{FlowStyle, LineBreak},
    EmitterOptions, Mapping, ScalarStyle, Scalar, Tag, TagDirectives, Yaml, YamlEmitter,
};

/// Test in sequence the loader, emitter and loader with the given input.
///
/// 1. Pass the input through the loader and build a YAML object from it.
/// 2. Pass the newly created YAML object through the emitter.
/// 3. Pass the emitted string through the loader and build another YAML object from it.
/// 4. Assert that the YAML objects from 1. and 3. are the same.
/// 5. Return the string from 2. so the caller can ensure its formatting.
///
/// The assertion done in this function is purely on the contents of the YAML objects and not on
/// its presentation.
fn raw_roundtrip(input: &str, options: EmitterOptions) -> String {
    let original_docs = Yaml::load_from_str(input).unwrap();
    let mut emitted_string = String::new();
    YamlEmitter::with_options(&mut emitted_string, options)
        .dump_all(&original_docs)
        .unwrap();
    println!("original:\n{input}");
    println!("emitted:\n{emitted_string}");

    let emitted_docs = Yaml::load_from_str(&emitted_string).unwrap();
    assert_eq!(original_docs, emitted_docs);

    emitted_string
}

/// [`raw_roundtrip`] with default options.
fn roundtrip(input: &str) -> String {
    raw_roundtrip(input, EmitterOptions::default())
}

/// Options writing every collection in block style.
fn block() -> EmitterOptions {
    EmitterOptions::default().default_flow_style(FlowStyle::Block)
}

/// Dump `node` with the given options.
fn dump(node: &Yaml, options: EmitterOptions) -> String {
    let mut out = String::new();
    YamlEmitter::with_options(&mut out, options)
        .dump(node)
        .unwrap();
    out
}

fn string(s: &str) -> Yaml {
    Yaml::Value(Scalar::String(s.into()))
}

fn int(i: i64) -> Yaml {
    Yaml::Value(Scalar::Integer(i))
}

fn int_seq() -> Yaml {
    Yaml::Sequence(vec![int(1), int(2), int(3)])
}

fn sample_mapping() -> Yaml {
    let mut mapping = Mapping::new();
    mapping.insert(string("a"), string("b"));
    mapping.insert(string("c"), int_seq());
    Yaml::Mapping(mapping)
}

#[allow(clippy::similar_names)]
#[test]
fn test_emit_simple() {
    let s = "
# comment
a0 bb: val
a1:
    b1: 4
    b2: d
a2: 4 # i'm comment
a3: [1, 2, 3]
a4:
    - [a1, a2]
    - 2
";

    roundtrip(s);
}

#[test]
fn test_emit_complex() {
    let s = r"
catalogue:
  product: &coffee   { name: Coffee,    price: 2.5  ,  unit: 1l  }
  product: &cookies  { name: Cookies!,  price: 3.40 ,  unit: 400g}

products:
  *coffee :
    amount: 4
  *cookies :
    amount: 4
  [1,2,3,4]:
    array key
  2.4:
    real key
  true:
    bool key
  {}:
    empty hash key
            ";

    roundtrip(s);
}

#[test]
fn test_emit_nested() {
    let s = "
a:
  b:
    c: hello
  d: {}
e:
  - f
  - g
  - h: []
";
    assert_eq!(
        roundtrip(s),
        "a:\n  b: {c: hello}\n  d: {}\ne:\n- f\n- g\n- h: []\n"
    );
}

#[test]
fn test_emit_quotes_ambiguous_strings() {
    let s = r#"
a: "true"
b: "123"
c: ""
d: "~"
e: "yes"
f: "y"
g: "2001-12-14"
h: "1.5"
"#;
    assert_eq!(
        raw_roundtrip(s, block()),
        "a: 'true'\nb: '123'\nc: ''\nd: '~'\ne: 'yes'\nf: y\ng: '2001-12-14'\nh: '1.5'\n"
    );
}

#[test]
fn test_emit_special_strings() {
    let s = r##"
- ":"
- "{"
- "\\"
- "\n"
- "can't avoid quote"
- "a: b"
- "- a"
- " leading space"
- "#comment"
- "tab\there"
- "*alias"
- "&anchor"
- "!tag"
- "--- doc"
"##;
    assert_eq!(
        raw_roundtrip(s, block()),
        r#"- ':'
- '{'
- \
- '

  '
- can't avoid quote
- 'a: b'
- '- a'
- ' leading space'
- '#comment'
- "tab\there"
- '*alias'
- '&anchor'
- '!tag'
- '--- doc'
"#
    );
}

#[test]
fn test_emit_scalar_types() {
    let s = "
- ~
- true
- 12
- -3
- 1.5
- .inf
- -.inf
- .nan
- 0x10
";
    assert_eq!(
        raw_roundtrip(s, block()),
        "- null\n- true\n- 12\n- -3\n- 1.5\n- .inf\n- -.inf\n- .nan\n- 16\n"
    );
}

#[test]
fn test_emit_complex_keys() {
    let s = "
? [a, b]
: sequence key
? {c: d}
: mapping key
{}: empty
";
    assert_eq!(
        roundtrip(s),
        "? [a, b]\n: sequence key\n? {c: d}\n: mapping key\n{}: empty\n"
    );
}

#[test]
fn test_emit_multiple_documents() {
    assert_eq!(roundtrip("a\n---\n[b]\n--- {c: d}\n"), "a\n--- [b]\n--- {c: d}\n");
}

#[test]
fn test_emit_bad_value_as_null() {
    let node = Yaml::Sequence(vec![Yaml::BadValue]);
    assert_eq!(dump(&node, EmitterOptions::default()), "[null]\n");
}

#[test]
fn test_emit_tagged() {
    let tag = |suffix: &str| Tag {
        handle: "!".into(),
        suffix: suffix.into(),
    };
    let node = Yaml::Sequence(vec![
        Yaml::Tagged(tag("degree"), Box::new(int(45))),
        Yaml::Tagged(tag("code"), Box::new(string("123"))),
        Yaml::Tagged(
            Tag {
                handle: "tag:yaml.org,2002:".into(),
                suffix: "binary".into(),
            },
            Box::new(string("aGVsbG8=")),
        ),
    ]);
    let out = dump(&node, EmitterOptions::default());
    assert_eq!(out, "[!degree 45, !code '123', !!binary aGVsbG8=]\n");
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}

#[test]
fn test_emit_tagged_collections() {
    let s = "
foo:
  - !tag
    name: Alice
    age: 5
  - !set {a: ~}
";
    assert_eq!(
        roundtrip(s),
        "foo:\n- !tag {name: Alice, age: 5}\n- !set {a: null}\n"
    );
}

#[test]
fn test_mapvec_legal() {
    // A mapping key holding a block collection cannot be written as a simple key.
    let mut key = Mapping::new();
    key.insert(string("key"), int_seq());
    let mut mapping = Mapping::new();
    mapping.insert(
        Yaml::Mapping(key),
        Yaml::Sequence(vec![int(4), int(5), int(6)]),
    );
    let node = Yaml::Mapping(mapping);

    let out = dump(&node, EmitterOptions::default());
    assert_eq!(out, "? key: [1, 2, 3]\n: [4, 5, 6]\n");
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}

#[test]
fn test_multiline_strings() {
    let mut mapping = Mapping::new();
    mapping.insert(string("clip"), string("line one\nline two\n"));
    mapping.insert(string("strip"), string("a\nb"));
    mapping.insert(string("keep"), string("a\n\n"));
    mapping.insert(string("indented"), string("  a\nb\n"));
    let node = Yaml::Mapping(mapping);

    let out = dump(&node, block().multiline_strings(true));
    assert_eq!(
        out,
        "clip: |\n  line one\n  line two\nstrip: |-\n  a\n  b\nkeep: |+\n  a\n\nindented: |2\n    a\n  b\n"
    );
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);

    let out = dump(&node, block());
    assert!(!out.contains('|'));
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}

#[test]
fn test_default_scalar_style() {
    let node = string("123");
    let with_style = |style| EmitterOptions::default().default_scalar_style(Some(style));
    assert_eq!(dump(&node, EmitterOptions::default()), "'123'\n");
    assert_eq!(
        dump(&node, with_style(ScalarStyle::DoubleQuoted)),
        "\"123\"\n"
    );
    assert_eq!(
        dump(&node, with_style(ScalarStyle::SingleQuoted)),
        "'123'\n"
    );
    assert_eq!(dump(&node, with_style(ScalarStyle::Plain)), "'123'\n");
    assert_eq!(dump(&string("abc"), EmitterOptions::default()), "abc\n");
}

#[test]
fn test_default_flow_style() {
    let with_style = |style| EmitterOptions::default().default_flow_style(style);
    assert_eq!(dump(&int_seq(), with_style(FlowStyle::Auto)), "[1, 2, 3]\n");
    assert_eq!(dump(&int_seq(), with_style(FlowStyle::Flow)), "[1, 2, 3]\n");
    assert_eq!(
        dump(&int_seq(), with_style(FlowStyle::Block)),
        "- 1\n- 2\n- 3\n"
    );

    assert_eq!(
        dump(&sample_mapping(), with_style(FlowStyle::Auto)),
        "a: b\nc: [1, 2, 3]\n"
    );
    assert_eq!(
        dump(&sample_mapping(), with_style(FlowStyle::Flow)),
        "{a: b, c: [1, 2, 3]}\n"
    );
    assert_eq!(
        dump(&sample_mapping(), with_style(FlowStyle::Block)),
        "a: b\nc:\n- 1\n- 2\n- 3\n"
    );
}

#[test]
fn test_canonical() {
    let canonical = EmitterOptions::default().canonical(true);
    assert_eq!(dump(&int(123), canonical.clone()), "---\n!!int \"123\"\n");

    let seq = Yaml::Sequence(vec![int(1), int(2)]);
    assert_eq!(
        dump(&seq, canonical.clone()),
        "---\n!!seq [\n  !!int \"1\",\n  !!int \"2\",\n]\n"
    );
    assert_eq!(
        dump(&seq, canonical.clone().indent(4)),
        "---\n!!seq [\n    !!int \"1\",\n    !!int \"2\",\n]\n"
    );
    assert_eq!(
        dump(&seq, canonical.line_break(LineBreak::Windows)),
        "---\r\n!!seq [\r\n  !!int \"1\",\r\n  !!int \"2\",\r\n]\r\n"
    );
}

#[test]
fn test_canonical_roundtrip() {
    let s = "
a: [1, 2.5, yes]
b: {c: ~, 'd': e}
";
    raw_roundtrip(s, EmitterOptions::default().canonical(true));
}

#[test]
fn test_explicit_markers() {
    let explicit = EmitterOptions::default().explicit_start(true);
    assert_eq!(dump(&int_seq(), explicit.clone()), "--- [1, 2, 3]\n");
    assert_eq!(
        dump(&int_seq(), explicit.explicit_end(true)),
        "--- [1, 2, 3]\n...\n"
    );
}

#[test]
fn test_directives() {
    assert_eq!(
        dump(&int_seq(), EmitterOptions::default().version(Some((1, 1)))),
        "%YAML 1.1\n--- [1, 2, 3]\n"
    );

    let mut tags = TagDirectives::new();
    tags.insert("!foo!".into(), "bar".into());
    assert_eq!(
        dump(&int_seq(), EmitterOptions::default().tags(tags)),
        "%TAG !foo! bar\n--- [1, 2, 3]\n"
    );
}

#[test]
fn test_tag_shorthands() {
    let mut tags = TagDirectives::new();
    tags.insert("!e!".into(), "tag:example.com,2000:".into());
    let node = Yaml::Tagged(
        Tag {
            handle: "tag:example.com,2000:".into(),
            suffix: "point".into(),
        },
        Box::new(int_seq()),
    );
    let out = dump(&node, EmitterOptions::default().tags(tags));
    assert_eq!(
        out,
        "%TAG !e! tag:example.com,2000:\n--- !e!point [1, 2, 3]\n"
    );
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);

    // Without a matching handle, the tag is written verbatim.
    let out = dump(&node, EmitterOptions::default());
    assert_eq!(out, "!<tag:example.com,2000:point> [1, 2, 3]\n");
    let reloaded = Yaml::load_from_str(&out).unwrap().remove(0);
    let (tag, inner) = reloaded.as_tagged().unwrap();
    assert_eq!(tag.to_string(), "tag:example.com,2000:point");
    assert_eq!(*inner, int_seq());
}

#[test]
fn test_allow_unicode() {
    let node = string("\u{dc}ber");
    assert_eq!(dump(&node, EmitterOptions::default()), "\u{dc}ber\n");
    assert_eq!(
        dump(&node, EmitterOptions::default().allow_unicode(false)),
        "\"\\xdcber\"\n"
    );
}

#[test]
fn test_width() {
    let node = Yaml::Sequence(vec![string("item"); 10]);
    let out = dump(&node, EmitterOptions::default().width(20));
    assert_eq!(
        out,
        "[item, item, item, item,\n  item, item, item, item,\n  item, item]\n"
    );
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}

#[test]
fn test_long_strings_are_folded() {
    let words = "lorem ipsum dolor sit amet ".repeat(10);
    let long = words.trim_end();
    let node = Yaml::Sequence(vec![
        string(long),
        string(&format!("{long}: quoted")),
        string(&format!("{long}\t")),
    ]);
    let out = dump(&node, block());
    assert!(out.lines().count() > 6, "{out}");
    assert!(out.lines().all(|line| line.chars().count() < 100), "{out}");
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}

#[test]
fn test_deep_double_quoted_wrapping() {
    // Nested deep enough that the indentation alone is past the width.
    let mut node = Yaml::Sequence(vec![
        string("[\u{85} {"),
        string("a  b\u{85}  c"),
        string("x \u{2028} y"),
    ]);
    for key in ["d", "c", "b", "a"] {
        let mut mapping = Mapping::new();
        mapping.insert(string(key), node);
        node = Yaml::Mapping(mapping);
    }
    for flow in [FlowStyle::Block, FlowStyle::Flow] {
        let options = EmitterOptions::default()
            .indent(4)
            .width(12)
            .default_flow_style(flow)
            .default_scalar_style(Some(ScalarStyle::DoubleQuoted));
        let out = dump(&node, options);
        assert!(
            out.lines().all(|line| line.trim() != "\\\\"),
            "empty continuation line in:\n{out}"
        );
        assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node, "{out}");
    }
}

#[test]
fn test_line_separators_are_escaped() {
    let node = Yaml::Sequence(vec![
        string("a\u{2028}b"),
        string("c\u{2029}"),
        string("\u{85}d"),
    ]);
    let out = dump(&node, block());
    assert_eq!(out, "- \"a\\Lb\"\n- \"c\\P\"\n- \"\\Nd\"\n");
    assert_eq!(Yaml::load_from_str(&out).unwrap()[0], node);
}
