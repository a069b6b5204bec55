use inspector_engine::SseDecoder;

#[test]
fn decodes_events_split_across_chunks() {
    let mut decoder = SseDecoder::new();

    assert!(decoder.feed(b"data: {\"type\":\"lo").is_empty());
    assert!(decoder.feed(b"g\",\"message\":\"hi\"}\n").is_empty());
    assert!(decoder.has_pending());
    let events = decoder.feed(b"\ndata: {\"type\":\"progress\"}\n\n");

    assert_eq!(
        events,
        vec![
            r#"{"type":"log","message":"hi"}"#.to_string(),
            r#"{"type":"progress"}"#.to_string(),
        ]
    );
    assert!(!decoder.has_pending());
}

#[test]
fn handles_crlf_comments_and_other_fields() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b": keep-alive\r\nevent: message\r\nid: 7\r\ndata:{\"a\":1}\r\n\r\n");

    assert_eq!(events, vec![r#"{"a":1}"#.to_string()]);
}

#[test]
fn joins_multi_line_data_with_newlines() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"data: first\ndata: second\n\n");

    assert_eq!(events, vec!["first\nsecond".to_string()]);
}

#[test]
fn blank_lines_without_data_dispatch_nothing() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(b"\n\n\r\n").is_empty());
    assert!(!decoder.has_pending());
}
