use annotate_core_client::{ClientError, Config, RequestOptions, TextAnnotator};
use std::thread;
use tiny_http::{Header, Response, Server};

const TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// Serve one response, then shut down. Returns the URL to fetch.
fn one_shot_server(status: u16, body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("ip listener");

    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let header: Header = "Content-Type: application/json".parse().unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}/annotations.json")
}

#[test]
fn test_load_annotations_applies_and_returns_list() {
    let url = one_shot_server(
        200,
        r#"[
            {
                "@context": "http://www.w3.org/ns/anno.jsonld",
                "type": "Annotation",
                "id": "anno-1",
                "body": [
                    {"type": "TextualBody", "purpose": "highlighting", "value": "highlight-2"}
                ],
                "target": {
                    "selector": [
                        {"type": "TextQuoteSelector", "exact": "quick"},
                        {"type": "TextPositionSelector", "start": 4, "end": 9}
                    ]
                }
            },
            {
                "id": "anno-2",
                "target": {
                    "selector": [
                        {"type": "TextPositionSelector", "start": 16, "end": 19}
                    ]
                }
            }
        ]"#,
    );

    let mut annotator = TextAnnotator::new(Config::new(TEXT));
    let loaded = annotator
        .load_annotations(&url, &RequestOptions::default())
        .expect("load succeeds");

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, "anno-1");

    // The fetched set is applied and rendered.
    let stored = annotator.get_annotations();
    assert_eq!(stored.len(), 2);
    assert!(!annotator
        .manager()
        .highlighter()
        .find_annotation_spans("anno-1")
        .is_empty());
}

#[test]
fn test_http_error_applies_nothing() {
    let url = one_shot_server(500, "internal error");

    let mut annotator = TextAnnotator::new(Config::new(TEXT));
    annotator
        .set_annotations(&[serde_json::from_value(serde_json::json!({
            "id": "existing",
            "target": {"selector": [
                {"type": "TextPositionSelector", "start": 0, "end": 3}
            ]}
        }))
        .unwrap()])
        .unwrap();

    let err = annotator
        .load_annotations(&url, &RequestOptions::default())
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));

    // The previously applied set is untouched.
    assert_eq!(annotator.get_annotations().len(), 1);
    assert_eq!(annotator.get_annotations()[0].id, "existing");
}

#[test]
fn test_invalid_json_applies_nothing() {
    let url = one_shot_server(200, "not json at all");

    let mut annotator = TextAnnotator::new(Config::new(TEXT));
    let err = annotator
        .load_annotations(&url, &RequestOptions::default())
        .unwrap_err();
    assert!(matches!(err, ClientError::Json(_)));
    assert!(annotator.get_annotations().is_empty());
}

#[test]
fn test_record_without_position_selector_applies_nothing() {
    let url = one_shot_server(
        200,
        r#"[
            {
                "id": "good",
                "target": {"selector": [
                    {"type": "TextPositionSelector", "start": 4, "end": 9}
                ]}
            },
            {
                "id": "bad",
                "target": {"selector": [
                    {"type": "TextQuoteSelector", "exact": "fox"}
                ]}
            }
        ]"#,
    );

    let mut annotator = TextAnnotator::new(Config::new(TEXT));
    let err = annotator
        .load_annotations(&url, &RequestOptions::default())
        .unwrap_err();
    assert!(matches!(err, ClientError::Wire(_)));
    // No partial set: "good" was not applied either.
    assert!(annotator.get_annotations().is_empty());
}

#[test]
fn test_request_headers_are_sent() {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let url = format!("http://{addr}/annotations.json");

    let handle = thread::spawn(move || {
        let request = server.recv().expect("one request");
        let authorized = request
            .headers()
            .iter()
            .any(|h| h.field.equiv("Authorization") && h.value.as_str() == "Bearer token-1");
        let _ = request.respond(Response::from_string("[]").with_status_code(200));
        authorized
    });

    let mut annotator = TextAnnotator::new(Config::new(TEXT));
    let options = RequestOptions {
        headers: vec![("Authorization".to_string(), "Bearer token-1".to_string())],
    };
    let loaded = annotator.load_annotations(&url, &options).expect("load");
    assert!(loaded.is_empty());
    assert!(handle.join().unwrap());
}
