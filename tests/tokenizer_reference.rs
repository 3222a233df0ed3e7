//! Cross-checks the hand-written lexer against a regex description of the atom grammar

use gomod_manifest::lexer::{AtomKind, tokenize};
use regex::Regex;

const ATOM_PATTERN: &str = r#"//|"[^"]+"|[\w.\-/+]+|\(|\)|=>|\s+"#;

fn reference_atoms(input: &str) -> Vec<&str> {
    let re = Regex::new(ATOM_PATTERN).unwrap();
    re.find_iter(input).map(|m| m.as_str()).collect()
}

fn assert_same_boundaries(input: &str) {
    let expected = reference_atoms(input);
    assert_eq!(
        expected.concat(),
        input,
        "reference pattern does not cover {input:?}"
    );

    let atoms = tokenize(input).unwrap();
    let actual: Vec<&str> = atoms.iter().map(|a| a.text).collect();
    assert_eq!(actual, expected, "input: {input:?}");
}

#[test]
fn test_boundaries_match_reference() {
    let inputs = [
        "module github.com/maruel/panicparse\n\ngo 1.11\n",
        "require (\n\tgithub.com/mattn/go-colorable v0.1.1\n\tgithub.com/mgutz/ansi v0.0.0-20170206155736-9520e82c474b\n)",
        "replace example.com/me/goodbye => ../goodbye",
        "replace a v1=>b v2",
        "module (example.com/hello) // huzzaa",
        "module \"rsc.io/sampler\"\r\n",
        "require github.com/docker/docker v20.10.24+incompatible // indirect",
        "require github.com/some_org/pkg_name v1.2.3",
        "example.com//not-a-comment",
        "retract (\n\tv1.0.0 // published by mistake\n)",
        "   \t\n",
        "",
    ];
    for input in inputs {
        assert_same_boundaries(input);
    }
}

#[test]
fn test_kinds_for_reference_atoms() {
    let atoms = tokenize("replace \"a b\" => ../c // note\n").unwrap();
    let kinds: Vec<AtomKind> = atoms.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AtomKind::Word,
            AtomKind::Whitespace,
            AtomKind::Quoted,
            AtomKind::Whitespace,
            AtomKind::Arrow,
            AtomKind::Whitespace,
            AtomKind::Word,
            AtomKind::Whitespace,
            AtomKind::Comment,
            AtomKind::Whitespace,
            AtomKind::Word,
            AtomKind::Whitespace,
        ]
    );
}
