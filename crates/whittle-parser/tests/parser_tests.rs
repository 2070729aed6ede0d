//! Tree-builder integration tests.
//!
//! Structure assertions use inline snapshots of the deterministic
//! `debug_tree` rendering; the round-trip and invariant sections sweep a
//! corpus of inputs, including deliberately broken ones, since the
//! splitter must stay total on anything the reducer throws at it.

use insta::assert_snapshot;
use whittle_common::entity::{EntityId, Tree};
use whittle_common::token::TokenKind;
use whittle_lexer::strip_comments;
use whittle_parser::{debug_tree, optimize, parse, parse_to_words, parse_to_words_lang, post_process};

fn render(source: &str) -> String {
    debug_tree(&parse(source)).trim_end().to_string()
}

/// Every entity id in the tree, root included.
fn all_ids(tree: &Tree) -> Vec<EntityId> {
    tree.descendant_ids(tree.root())
}

// ── Statement splitting ────────────────────────────────────────────────

#[test]
fn two_statements_become_two_entities() {
    assert_snapshot!(render("a;b;"), @r#"
    group
      `;` head="a" tail=";"
      `;` head="b" tail=";"
    "#);
}

#[test]
fn if_statement_pairs_keyword_group_with_brace_block() {
    assert_snapshot!(render("if(x){y;}"), @r#"
    group
      pair
        group
          `if` head="if"
          `(` head="(" tail=")"
            text head="x"
        `{` head="{" tail="}"
          `;` head="y" tail=";"
    "#);
}

#[test]
fn binary_operators_split_by_precedence_and_link_operands() {
    assert_snapshot!(render("a+b*c"), @r#"
    group
      group
        group
          text head="a"
          `+` tail="+" deps=1
        group
          group
            text head="b"
            `*` tail="*" deps=1
          text head="c"
    "#);
}

#[test]
fn multiplication_depends_on_its_right_operand() {
    let tree = parse("a+b*c");
    let star = all_ids(&tree)
        .into_iter()
        .find(|&id| tree[id].token == Some(TokenKind::Star))
        .expect("a `*` entity");
    let deps = &tree[star].dependencies;
    assert_eq!(deps.len(), 1);
    assert_eq!(tree.reassemble_from(deps[0]), "c");
}

#[test]
fn try_catch_finally_group_into_one_statement() {
    let source = "try{a;}catch(E e){b;}finally{c;}";
    let tree = parse(source);
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 1, "one top-level statement");
    assert_snapshot!(render(source), @r#"
    group
      group
        pair
          `try` head="try"
          `{` head="{" tail="}"
            `;` head="a" tail=";"
        pair
          group
            `catch` head="catch"
            `(` head="(" tail=")"
              group
                text head="E "
                text head="e"
          `{` head="{" tail="}"
            `;` head="b" tail=";"
        pair
          `finally` head="finally"
          `{` head="{" tail="}"
            `;` head="c" tail=";"
    "#);
}

#[test]
fn if_else_clauses_merge() {
    let tree = parse("if(x){y;}else{z;}");
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 1);
    assert_eq!(tree.reassemble(), "if(x){y;}else{z;}");
}

#[test]
fn do_while_clauses_merge() {
    let tree = parse("do{a;}while(x);");
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 1);
    assert_eq!(tree.reassemble(), "do{a;}while(x);");
}

#[test]
fn function_signature_pairs_with_its_body() {
    assert_snapshot!(render("int f() {x;}"), @r#"
    group
      pair
        group
          group
            text head="int "
            text head="f"
          `(` head="(" tail=") "
        `{` head="{" tail="}"
          `;` head="x" tail=";"
    "#);
}

#[test]
fn contract_clauses_attach_to_the_signature() {
    let source = "int f() in{a;} out{b;} body{c;}";
    let tree = parse(source);
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 1, "contracts fold into one entity");
    assert_eq!(tree.reassemble(), source);
}

#[test]
fn every_pair_entity_has_exactly_two_children() {
    for source in [
        "if(x){y;}",
        "if(x){y;}else{z;}",
        "void f(int a) { return a; }",
        "try{a;}catch(E e){b;}finally{c;}",
        "while(x) y;",
    ] {
        let tree = parse(source);
        for id in all_ids(&tree) {
            if tree[id].is_pair {
                assert_eq!(tree[id].children.len(), 2, "pair in {source:?}");
            }
        }
    }
}

#[test]
fn pair_entities_report_pair_as_their_label() {
    let tree = parse("if(x){y;}");
    let pair = all_ids(&tree)
        .into_iter()
        .find(|&id| tree[id].is_pair)
        .expect("a pair entity");
    assert_eq!(tree.label(pair), "Pair");
    let semicolon = all_ids(&tree)
        .into_iter()
        .find(|&id| tree[id].token == Some(TokenKind::Semicolon))
        .expect("a `;` entity");
    assert_eq!(tree.label(semicolon), ";");
}

// ── Round-trip laws ────────────────────────────────────────────────────

const CORPUS: &[&str] = &[
    "",
    "a;b;",
    "a + b * c - d / e;",
    "int f(int x) { return x + 1; }\n",
    "if (x > 0) { y(); } else { z(); }\n",
    "static if(a){b;}else{c;}",
    "try { a(); } catch (Exception e) { b(); } finally { c(); }",
    "do { x--; } while (x > 0);",
    "import std.stdio;\nvoid main() { writeln(\"hi\"); }\n",
    "auto r = a .. b;",
    "auto f = (x) => x ^^ 2;",
    "s ~= `wysiwyg` ~ r\"raw\" ~ \"esc\\\"d\";",
    "char c = '\\'';",
    "x = y !is null ? a : b;",
    "#line 10 \\\n  \"f.d\"\nint x;",
    "@safe void f() {}",
    "/+ nested /+ comment +/ still +/ int x;",
    "// only a comment\n",
    "}",
    "void broken(int x { if(y",
    "\"unterminated",
    "\\q",
    "in out body;",
];

#[test]
fn reassembly_reproduces_any_input() {
    for source in CORPUS {
        let tree = parse(source);
        assert_eq!(&tree.reassemble(), source, "round trip of {source:?}");
    }
}

#[test]
fn reassembly_reproduces_stripped_input() {
    for source in CORPUS {
        let stripped = strip_comments(source);
        let tree = parse(&stripped);
        assert_eq!(tree.reassemble(), stripped, "round trip of stripped {source:?}");
    }
}

#[test]
fn reparsing_reassembled_output_is_stable() {
    for source in CORPUS {
        let tree = parse(source);
        let again = parse(&tree.reassemble());
        assert_eq!(
            debug_tree(&again),
            debug_tree(&tree),
            "reparse stability of {source:?}"
        );
    }
}

#[test]
fn empty_input_yields_childless_root() {
    let tree = parse("");
    let root = tree.root();
    assert!(tree[root].children.is_empty());
}

// ── Post-processing invariants ─────────────────────────────────────────

#[test]
fn post_processing_is_idempotent() {
    for source in CORPUS {
        let mut tree = parse(source);
        let before = debug_tree(&tree);
        let allocated = tree.len();
        let root = tree.root();
        post_process(&mut tree, root);
        assert_eq!(debug_tree(&tree), before, "structure stable for {source:?}");
        assert_eq!(tree.len(), allocated, "no new entities for {source:?}");
    }
}

#[test]
fn no_empty_or_trivial_synthetic_entities_survive() {
    for source in CORPUS {
        let tree = parse(source);
        let root = tree.root();
        for id in all_ids(&tree) {
            if id == root {
                continue;
            }
            let entity = &tree[id];
            if entity.is_synthetic()
                && entity.head.is_empty()
                && entity.tail.is_empty()
                && entity.dependencies.is_empty()
                && !entity.is_pair
            {
                assert!(
                    entity.children.len() >= 2,
                    "trivial synthetic survived in {source:?}"
                );
            }
        }
    }
}

#[test]
fn dependency_targets_stay_reachable_from_the_root() {
    for source in CORPUS {
        let tree = parse(source);
        let reachable = all_ids(&tree);
        for &id in &reachable {
            for target in &tree[id].dependencies {
                assert!(
                    reachable.contains(target),
                    "dangling dependency in {source:?}"
                );
            }
        }
    }
}

// ── Clustering ─────────────────────────────────────────────────────────

#[test]
fn optimize_bounds_fanout_at_two() {
    let source = "a;b;c;d;e;f;g;";
    let mut tree = parse(source);
    optimize(&mut tree);
    for id in all_ids(&tree) {
        assert!(tree[id].children.len() <= 2);
    }
    assert_eq!(tree.reassemble(), source);
}

#[test]
fn optimize_leaves_narrow_trees_alone() {
    let source = "a;b;";
    let mut tree = parse(source);
    let before = debug_tree(&tree);
    optimize(&mut tree);
    assert_eq!(debug_tree(&tree), before);
}

#[test]
fn optimize_balances_instead_of_leaving_stragglers() {
    // Three children split 2+1, then rebalance to depth two; five children
    // end as ((ab)(cd))e, not a comb.
    let mut tree = parse("a;b;c;");
    optimize(&mut tree);
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 2);
    assert_eq!(tree.reassemble(), "a;b;c;");
}

// ── Word splitting ─────────────────────────────────────────────────────

#[test]
fn plain_word_split_cuts_on_word_boundaries() {
    let tree = parse_to_words("foo = bar;");
    let root = tree.root();
    let texts: Vec<(String, String)> = tree[root]
        .children
        .iter()
        .map(|&id| {
            (
                tree[id].head.as_str().to_string(),
                tree[id].tail.as_str().to_string(),
            )
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            ("foo".to_string(), " = ".to_string()),
            ("bar".to_string(), ";".to_string()),
        ]
    );
}

#[test]
fn plain_word_split_handles_leading_punctuation() {
    let tree = parse_to_words("(a)");
    let root = tree.root();
    assert_eq!(tree[root].children.len(), 2);
    assert_eq!(tree.reassemble(), "(a)");
}

#[test]
fn lang_word_split_keeps_strings_whole() {
    let source = "x = \"a b\";";
    let tree = parse_to_words_lang(source);
    let root = tree.root();
    let heads: Vec<String> = tree[root]
        .children
        .iter()
        .map(|&id| tree[id].head.as_str().to_string())
        .collect();
    assert_eq!(heads, vec!["x".to_string(), "\"a b\"".to_string()]);
    assert_eq!(tree.reassemble(), source);
}

#[test]
fn word_splits_round_trip() {
    for source in CORPUS {
        assert_eq!(&parse_to_words(source).reassemble(), source);
        assert_eq!(&parse_to_words_lang(source).reassemble(), source);
    }
}
