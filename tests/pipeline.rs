use std::time::Duration;

use citemap::cli::run as run_cmd;
use citemap::config::{RunToggles, Settings};
use citemap::data::{annotations, citations};
use citemap::report;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings(dir: &TempDir, base: &str) -> Settings {
    Settings {
        contact_email: "tests@example.com".to_string(),
        annotations_base: base.to_string(),
        rest_base: base.to_string(),
        concurrency: 4,
        retry_attempts: 2,
        retry_base: Duration::from_millis(2),
        retry_max: Duration::from_millis(8),
        request_timeout: Duration::from_secs(5),
        freshness_window: Duration::from_secs(3600),
        data_dir: dir.path().join("data"),
        outputs_dir: dir.path().join("outputs"),
        toggles: RunToggles::default(),
    }
}

fn annotations_body() -> &'static str {
    r#"[
  {
    "source": "MED",
    "extId": "123",
    "annotations": [
      {
        "type": "Accession Numbers",
        "tags": [
          { "name": "PRJNA680640", "uri": "https://www.ebi.ac.uk/ena/browser/view/PRJNA680640" },
          { "name": "PRJNA12345", "uri": "https://www.ebi.ac.uk/ena/browser/view/PRJNA12345" }
        ]
      },
      {
        "type": "Accession Numbers",
        "tags": [
          { "name": "PRJNA680640", "uri": "https://www.ebi.ac.uk/ena/browser/view/PRJNA680640" }
        ]
      }
    ]
  }
]"#
}

fn citations_body() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<responseWrapper>
    <version>6.9</version>
    <hitCount>42</hitCount>
    <citationList/>
</responseWrapper>"#
}

#[tokio::test]
async fn annotation_refresh_persists_and_then_reuses_fresh_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/annotationsByArticleIds"))
        .and(query_param("articleIds", "MED:123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(annotations_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir, &server.uri());
    let pmids = vec!["123".to_string()];

    let stats = annotations::refresh(&settings, &pmids, false).await.unwrap();
    assert_eq!(stats.map(|s| s.fetched), Some(1));

    let names = std::fs::read_to_string(settings.names_artifact()).unwrap();
    assert_eq!(names, "123: PRJNA680640, PRJNA12345, PRJNA680640\n");
    let unique = std::fs::read_to_string(settings.unique_names_artifact()).unwrap();
    assert_eq!(unique, "Number of unique names: 2\n");

    // Second refresh inside the freshness window never hits the service.
    let second = annotations::refresh(&settings, &pmids, false).await.unwrap();
    assert!(second.is_none());
}

#[tokio::test]
async fn force_bypasses_the_freshness_gate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/MED/123/citations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(citations_body()))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir, &server.uri());
    let pmids = vec!["123".to_string()];

    let first = citations::refresh(&settings, &pmids, false).await.unwrap();
    assert!(first.is_some());
    let counts = std::fs::read_to_string(settings.counts_artifact()).unwrap();
    assert_eq!(counts, "123: 42\n");

    let forced = citations::refresh(&settings, &pmids, true).await.unwrap();
    assert!(forced.is_some());
}

#[tokio::test]
async fn fetched_artifacts_aggregate_into_ranked_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/annotationsByArticleIds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(annotations_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/MED/123/citations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(citations_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir, &server.uri());
    let pmids = vec!["123".to_string()];

    annotations::refresh(&settings, &pmids, false).await.unwrap();
    citations::refresh(&settings, &pmids, false).await.unwrap();

    let ranked = report::build_report(&settings, 100).unwrap();
    assert_eq!(
        ranked,
        vec![
            ("PRJNA680640".to_string(), 84),
            ("PRJNA12345".to_string(), 42),
        ]
    );

    let weights = std::fs::read_to_string(settings.report_artifact()).unwrap();
    assert_eq!(weights, "PRJNA680640: 84\nPRJNA12345: 42\n");
    let top = std::fs::read_to_string(settings.top_names_artifact()).unwrap();
    assert_eq!(top, "PRJNA680640\nPRJNA12345\n");
}

#[tokio::test]
async fn run_command_honors_disabled_fetch_and_plot_toggles() {
    let dir = tempfile::tempdir().unwrap();
    // No mock server at all: with fetch_data off the run must stay offline.
    let mut settings = test_settings(&dir, "http://127.0.0.1:1");
    settings.toggles = RunToggles {
        fetch_data: false,
        plot_data: false,
    };

    std::fs::create_dir_all(&settings.data_dir).unwrap();
    std::fs::write(
        settings.names_artifact(),
        "pmid1: GeneX, GeneY\npmid2: GeneX\n",
    )
    .unwrap();
    std::fs::write(settings.counts_artifact(), "pmid1: 10\npmid2: 5\n").unwrap();

    let pmids_path = dir.path().join("pmids.txt");
    std::fs::write(&pmids_path, "pmid1\npmid2\n").unwrap();

    let args = run_cmd::Args {
        pmids: pmids_path,
        force: false,
        top: 100,
    };
    run_cmd::run(args, settings.clone()).await.unwrap();

    let weights = std::fs::read_to_string(settings.report_artifact()).unwrap();
    assert_eq!(weights, "GeneX: 15\nGeneY: 10\n");
    assert!(!settings.plot_artifact().exists());
}
