//! End-to-end build over a small content tree.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use inkpost::build::{INDEX_FILE, NoCache, build_posts, discover, write_output};
use inkpost::config::{HighlightSection, SiteConfig};
use inkpost::highlight::Highlighter;
use inkpost::markdown::Markdown;
use inkpost::post::{NoHistory, PostParser};
use regex::Regex;

const CODE_GROUP: &str = "\
:::code-group
```ts[title=a.ts]
const a = 1;
```
```js[title=b.js]
let b = 2;
```
:::
";

fn write_post(root: &Path, slug: &str, body: &str) {
    let dir = root.join(slug);
    fs::create_dir_all(&dir).unwrap();
    let front = format!(
        "---\ntitle: Post {slug}\nslug: {slug}\ndescription: about {slug}\ndate: 2024-05-01\ntags: [rust, web]\n---\n"
    );
    fs::write(dir.join("index.md"), front + body).unwrap();
}

fn markdown() -> Markdown {
    let highlighter = Highlighter::from_config(&HighlightSection::default()).unwrap();
    Markdown::new(Arc::new(highlighter))
}

#[test]
fn test_build_links_ids_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");

    write_post(
        &content,
        "alpha",
        &format!("See [beta](../beta/index.md) and [self](../alpha/).\n\n{CODE_GROUP}"),
    );
    write_post(&content, "beta", &format!("Intro.\n\n{CODE_GROUP}"));
    write_post(&content, "gamma", "Nothing links here.\n");

    let sources = discover(&content);
    assert_eq!(sources.len(), 3);

    let config = SiteConfig::default();
    let markdown = markdown();
    let parser = PostParser::new(&markdown, &config, &NoHistory);
    let report = build_posts(&sources, &parser, &NoCache, true, false).unwrap();
    assert!(report.failures.is_empty());

    let post = |slug: &str| {
        report
            .posts
            .iter()
            .find(|p| p.metadata.slug == slug)
            .unwrap()
    };

    let alpha = post("alpha");
    let beta = post("beta");
    assert_eq!(alpha.metadata.outgoing_links.len(), 1);
    assert_eq!(alpha.metadata.outgoing_links[0].slug, "beta");
    assert_eq!(beta.metadata.incoming_links.len(), 1);
    assert_eq!(beta.metadata.incoming_links[0].title, "Post alpha");
    assert!(alpha.metadata.incoming_links.is_empty());
    assert!(post("gamma").metadata.incoming_links.is_empty());

    // Code-group ids never repeat across posts.
    let id = Regex::new(r#"id="code-group-panel-(\d+)""#).unwrap();
    let mut ids: Vec<u32> = report
        .posts
        .iter()
        .flat_map(|p| id.captures_iter(&p.html).map(|c| c[1].parse().unwrap()).collect::<Vec<_>>())
        .collect();
    assert_eq!(ids.len(), 4);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let output = dir.path().join("public");
    write_output(&report.posts, &output).unwrap();
    let html = fs::read_to_string(output.join("beta/index.html")).unwrap();
    assert_eq!(html, beta.html);

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(INDEX_FILE)).unwrap()).unwrap();
    let entries = index.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().any(|e| e["slug"] == "alpha" && e["outgoingLinks"][0]["slug"] == "beta"));
}

#[test]
fn test_build_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    for slug in ["one", "two", "three", "four"] {
        write_post(dir.path(), slug, CODE_GROUP);
    }
    let sources = discover(dir.path());

    let config = SiteConfig::default();
    let markdown = markdown();
    let parser = PostParser::new(&markdown, &config, &NoHistory);

    let first = build_posts(&sources, &parser, &NoCache, false, false).unwrap();
    let second = build_posts(&sources, &parser, &NoCache, false, false).unwrap();
    let html = |r: &inkpost::build::BuildReport| r.posts.iter().map(|p| p.html.clone()).collect::<Vec<_>>();
    assert_eq!(html(&first), html(&second));
}
