use std::collections::HashSet;
use std::fs;

const CONFIG_PATH: &str = "src/default_config.toml";
const CATALOG_PATH: &str = "src/catalog.toml";

/// Keys the embedded defaults must define; `Config::compiled_default` relies on them.
const REQUIRED_KEYS: &[(&str, &str)] = &[
    ("api", "base_url"),
    ("api", "timeout_secs"),
    ("cache", "stale_secs"),
    ("render", "default_language"),
];

/// Fields every bundled article must carry; `Catalog::bundled` falls back to an
/// empty catalog if one is missing.
const ARTICLE_FIELDS: &[&str] = &[
    "id", "title", "content", "author", "date", "read_time", "section",
];

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_PATH}");
    println!("cargo:rerun-if-changed={CATALOG_PATH}");

    check_config();
    check_catalog();
}

fn parse(path: &str) -> toml::Table {
    let content = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path}: {e}"));
    match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid {path}: {e}"),
    }
}

fn check_config() {
    let table = parse(CONFIG_PATH);
    for (section, key) in REQUIRED_KEYS {
        let present = table
            .get(*section)
            .and_then(|value| value.get(*key))
            .is_some();
        if !present {
            panic!("default_config.toml is missing `{key}` in [{section}]");
        }
    }
}

fn check_catalog() {
    let table = parse(CATALOG_PATH);
    let articles = match table.get("articles").and_then(|value| value.as_array()) {
        Some(articles) if !articles.is_empty() => articles,
        _ => panic!("catalog.toml needs at least one [[articles]] entry"),
    };

    let mut ids = HashSet::new();
    for (index, article) in articles.iter().enumerate() {
        for field in ARTICLE_FIELDS {
            if article.get(*field).and_then(|value| value.as_str()).is_none() {
                panic!("catalog.toml article {index} is missing `{field}`");
            }
        }
        let id = article.get("id").and_then(|value| value.as_str()).unwrap_or_default();
        if !ids.insert(id.to_string()) {
            panic!("catalog.toml has a duplicate article id `{id}`");
        }
    }
}
