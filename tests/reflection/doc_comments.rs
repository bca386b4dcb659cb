//! Integration tests for doc comment parsing

use flowmeta_reflection::DocComment;

#[test]
fn description_and_tags_are_separated() {
    let doc = DocComment::parse(
        "/**\n * Places an order.\n *\n * Second paragraph.\n * @param string $sku The product\n * @return void\n */",
    );
    assert!(doc.description.starts_with("Places an order."));
    assert!(doc.description.contains("Second paragraph."));
    assert_eq!(doc.tag_values("param"), ["string $sku The product"]);
    assert!(doc.is_tagged_with("return"));
    assert!(!doc.is_tagged_with("throws"));
}

#[test]
fn tags_without_values_are_recorded() {
    let doc = DocComment::parse("/**\n * @api\n * @deprecated\n */");
    assert!(doc.is_tagged_with("api"));
    assert!(doc.tag_values("deprecated").is_empty());
}

#[test]
fn empty_comment_has_no_tags() {
    let doc = DocComment::parse("");
    assert!(doc.tags.is_empty());
    assert!(doc.description.is_empty());
}
