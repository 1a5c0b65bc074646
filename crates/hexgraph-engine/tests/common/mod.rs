//! Blog fixture shared by the integration tests: authors, posts, comments,
//! bios, blogs and roles wired into a cyclic record graph.

#![allow(dead_code)]

use hexgraph_core::record::{Model, RecordRef, Records};
use hexgraph_core::schema::{Attribute, Relationship, Schema};
use hexgraph_engine::{FieldSelection, IncludeTree, Projector, Registry, RenderOptions, Renderer};
use hexgraph_export::RdfFormat;
use std::sync::Arc;

pub const TEST: &str = "http://test.org/";

pub fn p(name: &str) -> String {
    format!("{TEST}{name}")
}

fn attr(name: &str, predicate: &str) -> Attribute {
    Attribute::new(name).predicate(p(predicate))
}

pub fn author_schema() -> Schema {
    Schema::new("author")
        .attribute(attr("id", "id"))
        .attribute(attr("name", "name"))
        .attribute(attr("birthday", "birthday"))
        .attribute(attr("active", "active"))
        .attribute(attr("roles", "roles"))
        .relationship(Relationship::many("posts").predicate(p("posts")))
        .relationship(Relationship::one("bio").predicate(p("bio")))
}

pub fn comment_schema() -> Schema {
    Schema::new("comment")
        .attribute(Attribute::new("id"))
        .attribute(attr("body", "text"))
        .relationship(Relationship::one("post").predicate(p("post")))
        .relationship(Relationship::one("author").predicate(p("author")))
}

pub fn post_schema() -> Schema {
    Schema::new("post")
        .attribute(attr("title", "name"))
        .attribute(attr("body", "text"))
        .relationship(Relationship::one("author").predicate(p("author")))
        .relationship(
            Relationship::one("blog")
                .predicate(p("blog"))
                .computed(|_, _| Records::one(Model::new("blog", 999).attr("name", "Custom blog"))),
        )
        .relationship(Relationship::many("comments").predicate(p("comments")))
}

pub fn bio_schema() -> Schema {
    Schema::new("bio")
        .attribute(Attribute::new("id"))
        .attribute(attr("content", "content"))
        .attribute(attr("rating", "rating"))
        .relationship(Relationship::one("author").predicate(p("author")))
}

pub fn blog_schema() -> Schema {
    Schema::new("blog")
        .attribute(Attribute::new("id"))
        .attribute(attr("name", "name"))
        .relationship(Relationship::one("writer").predicate(p("writer")))
        .relationship(Relationship::many("articles").predicate(p("article")))
}

pub fn role_schema() -> Schema {
    Schema::new("role")
        .attribute(Attribute::new("id"))
        .attribute(attr("name", "name"))
        .attribute(attr("description", "description"))
        .attribute(
            attr("friendly_id", "friendly_id")
                .key("slug")
                .computed(|record, _| {
                    let name = match record.read_attribute("name") {
                        hexgraph_core::Value::String(s) => s,
                        _ => String::new(),
                    };
                    let id = match record.read_attribute("id") {
                        hexgraph_core::Value::Integer(i) => i.to_string(),
                        _ => String::new(),
                    };
                    format!("{name}-{id}").into()
                }),
        )
        .relationship(Relationship::one("author").predicate(p("author")))
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(author_schema().shared())
        .register(comment_schema().shared())
        .register(post_schema().shared())
        .register(bio_schema().shared())
        .register(blog_schema().shared())
        .register(role_schema().shared())
        .register(
            Schema::new("profile")
                .attribute(attr("name", "name"))
                .attribute(attr("description", "description"))
                .shared(),
        )
        .register_as(
            "spam::unrelated_link",
            Schema::new("unrelated_link").attribute(Attribute::new("id")).shared(),
        );
    registry
}

/// Two authors, three posts, two comments and two bios.
pub struct Blog {
    pub author1: Arc<Model>,
    pub author2: Arc<Model>,
    pub bio1: Arc<Model>,
    pub bio2: Arc<Model>,
    pub post10: Arc<Model>,
    pub post20: Arc<Model>,
    pub post30: Arc<Model>,
    pub comment1: Arc<Model>,
    pub comment2: Arc<Model>,
}

fn rec(model: &Arc<Model>) -> RecordRef {
    model.clone()
}

pub fn blog() -> Blog {
    let author1 = Model::new("author", 1).attr("name", "Steve K.").shared();
    let author2 = Model::new("author", 2).attr("name", "Tenderlove").shared();
    let bio1 = Model::new("bio", 1).attr("content", "AMS Contributor").shared();
    let bio2 = Model::new("bio", 2).attr("content", "Rails Contributor").shared();
    let post10 = Model::new("post", 10)
        .attr("title", "Hello!!")
        .attr("body", "Hello, world!!")
        .shared();
    let post20 = Model::new("post", 20)
        .attr("title", "New Post")
        .attr("body", "Body")
        .shared();
    let post30 = Model::new("post", 30)
        .attr("title", "Yet Another Post")
        .attr("body", "Body")
        .shared();
    let comment1 = Model::new("comment", 1).attr("body", "ZOMG A COMMENT").shared();
    let comment2 = Model::new("comment", 2)
        .attr("body", "ZOMG ANOTHER COMMENT")
        .shared();

    post10.relate("comments", vec![rec(&comment1), rec(&comment2)]);
    post10.relate("author", rec(&author1));
    post20.relate("author", rec(&author2));
    post30.relate("author", rec(&author1));
    comment1.relate("post", rec(&post10));
    comment2.relate("post", rec(&post10));
    author1.relate("posts", vec![rec(&post10), rec(&post30)]);
    author1.relate("bio", rec(&bio1));
    author2.relate("posts", vec![rec(&post20)]);
    author2.relate("bio", rec(&bio2));
    bio1.relate("author", rec(&author1));
    bio2.relate("author", rec(&author2));

    Blog {
        author1,
        author2,
        bio1,
        bio2,
        post10,
        post20,
        post30,
        comment1,
        comment2,
    }
}

pub fn records(models: &[&Arc<Model>]) -> Records {
    Records::many(models.iter().map(|m| rec(m)))
}

/// Render as N-Triples and return the sorted lines.
pub fn ntriples(
    registry: &Registry,
    roots: &Records,
    include: &str,
    fields: FieldSelection,
) -> Vec<String> {
    let projector = Projector::new(registry)
        .include(IncludeTree::parse(include))
        .fields(fields);
    let out = Renderer::new(projector, RenderOptions::default())
        .dump(roots, RdfFormat::NTriples)
        .unwrap();
    let mut lines: Vec<String> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

pub fn sorted(lines: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
    out.sort();
    out
}
