//! Template store and placeholder engine integration tests

use std::path::PathBuf;

use registration_mailer::content::{ContentGenerator, CostTable, SportLine};
use registration_mailer::template::{
    create_template_store, ids, Formatter, Fragment, PlaceholderEngine, TemplateContext,
    TemplateError, TemplateStore,
};

fn shipped_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

#[tokio::test]
async fn test_shipped_templates_parse() {
    let store = TemplateStore::new(shipped_templates());
    store.warm(&ids::ALL).await.unwrap();

    assert_eq!(store.count(), ids::ALL.len());
    for id in ids::ALL {
        assert!(store.is_cached(id), "{} not cached", id);
    }
}

#[tokio::test]
async fn test_payment_template_drops_empty_sections() {
    let store = TemplateStore::new(shipped_templates());
    let template = store.resolve(ids::PAYMENT_UNCONFIRMED).await.unwrap();
    let engine = PlaceholderEngine::default();

    let bare = engine.render_template(&template, &TemplateContext::new());
    assert!(!bare.contains("Remarks"));
    assert!(!bare.contains("Registration Fees"));
    assert!(!bare.contains("{{"));

    let context = TemplateContext::new().with("remarks", "Paid in two parts");
    let with_remarks = engine.render_template(&template, &context);
    assert!(with_remarks.contains("Remarks"));
    assert!(with_remarks.contains("Paid in two parts"));
}

#[tokio::test]
async fn test_malformed_template_is_reported_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("broken.html"),
        "{{#if a}}{{#if b}}nested{{/if}}{{/if}}",
    )
    .unwrap();

    let store = create_template_store(&registration_mailer::config::TemplateConfig {
        dir: dir.path().to_path_buf(),
    });
    let err = store.resolve("broken").await.unwrap_err();

    assert!(matches!(err, TemplateError::Malformed { .. }));
    assert!(!store.is_cached("broken"));
}

#[tokio::test]
async fn test_missing_template_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = TemplateStore::new(dir.path());

    let err = store.resolve("signup").await.unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(ref id) if id == "signup"));
}

#[test]
fn test_empty_university_takes_else_branch() {
    let engine = PlaceholderEngine::default();
    let context = TemplateContext::new()
        .with("name", "Ada")
        .with("universityName", "");

    let rendered = engine
        .render(
            "{{#if universityName}}<p>{{universityName}}</p>{{else}}<p>Not provided yet</p>{{/if}}",
            &context,
        )
        .unwrap();

    assert_eq!(rendered, "<p>Not provided yet</p>");
}

#[test]
fn test_fragment_is_not_rescanned() {
    let engine = PlaceholderEngine::default();
    let context = TemplateContext::new()
        .with("table", Fragment::new("<tr><td>{{name}}</td></tr>"))
        .with("name", "Ada");

    let rendered = engine.render("<table>{{table}}</table>", &context).unwrap();
    assert_eq!(rendered, "<table><tr><td>{{name}}</td></tr></table>");
}

#[test]
fn test_placeholder_after_stray_css_braces_is_rendered() {
    let engine = PlaceholderEngine::default();
    let context = TemplateContext::new().with("name", "Ada");

    let rendered = engine
        .render("<style>a{{ color: red }</style><p>Hi {{name}}</p>", &context)
        .unwrap();
    assert_eq!(rendered, "<style>a{{ color: red }</style><p>Hi Ada</p>");
}

#[test]
fn test_cost_total_matches_displayed_lines() {
    let table = CostTable::new(800, Default::default(), Formatter::default());
    let sports = vec![
        SportLine {
            sport: "football".to_string(),
            players: 3,
        },
        SportLine {
            sport: "table_tennis".to_string(),
            players: 1,
        },
    ];

    let breakdown = table.breakdown(&sports);
    let displayed: u64 = breakdown.lines().iter().map(|line| line.amount).sum();
    assert_eq!(breakdown.lines()[0].amount, 3 * 800);
    assert_eq!(breakdown.total(), displayed);

    let html = table.generate(&sports);
    assert!(html.as_str().contains("Table Tennis"));
    assert!(html.as_str().contains("₹3,200"));
}
