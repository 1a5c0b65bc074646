mod common;

use common::*;
use hexgraph_core::record::{Model, RecordRef, Records};
use hexgraph_core::schema::{Attribute, Relationship, Schema};
use hexgraph_engine::{FieldSelection, Registry};

#[test]
fn test_include_multiple_posts_and_linked_array() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &records(&[&blog.post10, &blog.post20]),
        "comments,author.bio",
        FieldSelection::all(),
    );

    assert_eq!(
        lines,
        sorted(&[
            r#"<https://bio/2> <http://test.org/content> "Rails Contributor" ."#,
            "<https://bio/2> <http://test.org/author> <https://author/2> .",
            r#"<https://author/2> <http://test.org/id> "2"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
            "<https://author/2> <http://test.org/bio> <https://bio/2> .",
            "<https://author/2> <http://test.org/posts> <https://post/20> .",
            r#"<https://author/2> <http://test.org/name> "Tenderlove" ."#,
            "<https://post/10> <http://test.org/author> <https://author/1> .",
            "<https://post/10> <http://test.org/comments> <https://comment/2> .",
            "<https://post/10> <http://test.org/comments> <https://comment/1> .",
            r#"<https://post/10> <http://test.org/text> "Hello, world!!" ."#,
            r#"<https://post/10> <http://test.org/name> "Hello!!" ."#,
            "<https://post/10> <http://test.org/blog> <https://blog/999> .",
            r#"<https://author/1> <http://test.org/id> "1"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
            "<https://author/1> <http://test.org/bio> <https://bio/1> .",
            "<https://author/1> <http://test.org/posts> <https://post/30> .",
            "<https://author/1> <http://test.org/posts> <https://post/10> .",
            r#"<https://author/1> <http://test.org/name> "Steve K." ."#,
            r#"<https://bio/1> <http://test.org/content> "AMS Contributor" ."#,
            "<https://bio/1> <http://test.org/author> <https://author/1> .",
            r#"<https://comment/2> <http://test.org/text> "ZOMG ANOTHER COMMENT" ."#,
            "<https://comment/2> <http://test.org/post> <https://post/10> .",
            "<https://post/20> <http://test.org/author> <https://author/2> .",
            r#"<https://post/20> <http://test.org/text> "Body" ."#,
            r#"<https://post/20> <http://test.org/name> "New Post" ."#,
            "<https://post/20> <http://test.org/blog> <https://blog/999> .",
            r#"<https://comment/1> <http://test.org/text> "ZOMG A COMMENT" ."#,
            "<https://comment/1> <http://test.org/post> <https://post/10> .",
        ])
    );
}

#[test]
fn test_include_nested_from_singular_root() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.bio1.clone()),
        "author.posts",
        FieldSelection::all(),
    );

    assert_eq!(
        lines,
        sorted(&[
            r#"<https://author/1> <http://test.org/id> "1"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
            "<https://author/1> <http://test.org/posts> <https://post/30> .",
            "<https://author/1> <http://test.org/posts> <https://post/10> .",
            "<https://author/1> <http://test.org/bio> <https://bio/1> .",
            r#"<https://author/1> <http://test.org/name> "Steve K." ."#,
            "<https://post/30> <http://test.org/blog> <https://blog/999> .",
            r#"<https://post/30> <http://test.org/text> "Body" ."#,
            r#"<https://post/30> <http://test.org/name> "Yet Another Post" ."#,
            "<https://post/30> <http://test.org/author> <https://author/1> .",
            "<https://post/10> <http://test.org/blog> <https://blog/999> .",
            "<https://post/10> <http://test.org/comments> <https://comment/1> .",
            "<https://post/10> <http://test.org/comments> <https://comment/2> .",
            r#"<https://post/10> <http://test.org/text> "Hello, world!!" ."#,
            r#"<https://post/10> <http://test.org/name> "Hello!!" ."#,
            "<https://post/10> <http://test.org/author> <https://author/1> .",
            r#"<https://bio/1> <http://test.org/content> "AMS Contributor" ."#,
            "<https://bio/1> <http://test.org/author> <https://author/1> .",
        ])
    );
}

#[test]
fn test_multiple_references_to_same_resource() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &records(&[&blog.comment1, &blog.comment2]),
        "post",
        FieldSelection::all(),
    );

    assert_eq!(
        lines,
        sorted(&[
            r#"<https://comment/1> <http://test.org/text> "ZOMG A COMMENT" ."#,
            "<https://comment/1> <http://test.org/post> <https://post/10> .",
            r#"<https://post/10> <http://test.org/text> "Hello, world!!" ."#,
            "<https://post/10> <http://test.org/author> <https://author/1> .",
            "<https://post/10> <http://test.org/comments> <https://comment/1> .",
            "<https://post/10> <http://test.org/comments> <https://comment/2> .",
            "<https://post/10> <http://test.org/blog> <https://blog/999> .",
            r#"<https://post/10> <http://test.org/name> "Hello!!" ."#,
            r#"<https://comment/2> <http://test.org/text> "ZOMG ANOTHER COMMENT" ."#,
            "<https://comment/2> <http://test.org/post> <https://post/10> .",
        ])
    );
}

#[test]
fn test_namespaced_linked_resource() {
    let mut registry = Registry::new();
    registry
        .register(
            Schema::new("post")
                .attribute(Attribute::new("id"))
                .relationship(Relationship::many("related").predicate(p("related")))
                .shared(),
        )
        .register_as(
            "spam::unrelated_link",
            Schema::new("unrelated_link").attribute(Attribute::new("id")).shared(),
        );

    let post = Model::new("post", 123).shared();
    let link: RecordRef = Model::new("unrelated_link", 456).namespace("spam").shared();
    post.relate("related", vec![link]);

    let expected = sorted(&["<https://post/123> <http://test.org/related> <https://spam/unrelated_link/456> ."]);
    let roots = Records::Single(post);
    assert_eq!(ntriples(&registry, &roots, "", FieldSelection::all()), expected);
    // Expanding the link resolves its schema through the record namespace.
    assert_eq!(ntriples(&registry, &roots, "related", FieldSelection::all()), expected);
}

#[test]
fn test_links_without_include_do_not_expand() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.post10.clone()),
        "",
        FieldSelection::all(),
    );
    assert!(lines.contains(&"<https://post/10> <http://test.org/comments> <https://comment/1> .".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("<https://comment/1>")));
}

#[test]
fn test_empty_collection_emits_nothing() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.post20.clone()),
        "comments",
        FieldSelection::all(),
    );
    assert!(!lines.iter().any(|l| l.contains("<http://test.org/comments>")));
}

#[test]
fn test_relationships_whitelisted_via_fields() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.post10.clone()),
        "",
        FieldSelection::all().only("post", ["author"]),
    );
    assert_eq!(lines, sorted(&["<https://post/10> <http://test.org/author> <https://author/1> ."]));
}

#[test]
fn test_limit_fields_of_linked_comments() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.post10.clone()),
        "comments",
        "comment=id,post,author".parse().unwrap(),
    );
    assert!(lines.contains(&r#"<https://post/10> <http://test.org/name> "Hello!!" ."#.to_string()));
    assert!(lines.contains(&"<https://comment/1> <http://test.org/post> <https://post/10> .".to_string()));
    assert!(!lines.iter().any(|l| l.contains("ZOMG")));
}

#[test]
fn test_fields_exclude_relationship_even_when_included() {
    let blog = blog();
    let lines = ntriples(
        &registry(),
        &Records::Single(blog.post10.clone()),
        "comments",
        "post=author;comment=body".parse().unwrap(),
    );
    assert_eq!(lines, sorted(&["<https://post/10> <http://test.org/author> <https://author/1> ."]));
}

#[test]
fn test_field_key_alias() {
    let role = Model::new("role", 3).attr("name", "admin").attr("description", "Root");
    let lines = ntriples(
        &registry(),
        &Records::one(role),
        "",
        "role=slug".parse().unwrap(),
    );
    assert_eq!(lines, sorted(&[r#"<https://role/3> <http://test.org/friendly_id> "admin-3" ."#]));
}
