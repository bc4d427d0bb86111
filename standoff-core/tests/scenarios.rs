use std::fs;

use standoff_core::align::AlignmentFailure;
use standoff_core::{convert_paths, ConversionConfig, Converter, Issue};

#[test]
fn test_john_met_mary() {
    let ann = "T1\tPERSON 0 4\tJohn\nT2\tPERSON 9 13\tMary\nR1\tMET Arg1:T1 Arg2:T2\n";
    let out = Converter::default().convert(None, "John met Mary.", ann);

    assert_eq!(out.records.len(), 1);
    let record = &out.records[0];
    assert_eq!(record.tokens, ["John", "met", "Mary", "."]);
    let spans: Vec<(usize, usize)> = record
        .entities
        .iter()
        .map(|e| (e.start_token, e.end_token))
        .collect();
    assert_eq!(spans, [(0, 0), (2, 2)]);
    assert_eq!(record.relations.len(), 1);
    assert_eq!((record.relations[0].head, record.relations[0].tail), (0, 1));

    let json = serde_json::to_value(record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "tokens": ["John", "met", "Mary", "."],
            "entities": [
                {"type": "PERSON", "start": 0, "end": 1},
                {"type": "PERSON", "start": 2, "end": 3}
            ],
            "relations": [{"type": "MET", "head": 0, "tail": 1}]
        })
    );
}

#[test]
fn test_discontinuous_span_to_whole_covers_gap() {
    let text = "lung (or) cyst";
    let ann = "T1\tDISEASE 0 4;10 14\tlung cyst\n";
    let config = ConversionConfig {
        char_offsets: true,
        ..Default::default()
    };
    let out = Converter::new(config).convert(None, text, ann);

    let e = &out.records[0].entities[0];
    assert_eq!((e.char_start, e.char_end), (Some(0), Some(14)));
    // lung ( or ) cyst
    assert_eq!((e.start_token, e.end_token), (0, 4));
    assert_eq!(out.report.discontinuous_resolved, 1);
}

#[test]
fn test_keep_longer_tie_keeps_earliest() {
    let text = "Alpha Beta Gamma";
    let ann = "T1\tX 0 10\tAlpha Beta\nT2\tX 5 15\t Beta Gamm\n";
    let out = Converter::default().convert(None, text, ann);

    let entities = &out.records[0].entities;
    assert_eq!(entities.len(), 1);
    assert_eq!((entities[0].start_token, entities[0].end_token), (0, 1));
    assert!(out.report.issues.contains(&Issue::Overlap { id: "T2".into() }));
}

#[test]
fn test_partial_token_span_expands_and_is_counted() {
    let ann = "T1\tX 2 6\tbeli\n";
    let out = Converter::default().convert(None, "unbelievable news", ann);

    let entities = &out.records[0].entities;
    assert_eq!(entities.len(), 1);
    assert_eq!((entities[0].start_token, entities[0].end_token), (0, 0));
    assert_eq!(out.report.counts().alignment_expanded, 1);
    assert_eq!(out.report.issues, vec![Issue::AlignmentExpanded { id: "T1".into() }]);
}

#[test]
fn test_whitespace_only_span_drops_entity_and_relations() {
    let ann = "T1\tGAP 4 6\t\nT2\tPERSON 0 4\tJohn\nR1\tNEAR Arg1:T1 Arg2:T2\n";
    let out = Converter::default().convert(None, "John  met Mary.", ann);

    let record = &out.records[0];
    assert_eq!(record.entities.len(), 1);
    assert_eq!(record.entities[0].label, "PERSON");
    assert!(record.relations.is_empty());
    assert!(out.report.issues.contains(&Issue::AlignmentFailed {
        id: "T1".into(),
        reason: AlignmentFailure::NoTokens,
    }));
    assert_eq!(out.report.counts().relations_dropped, 1);
}

#[test]
fn test_zero_length_span_is_dropped() {
    let ann = "T1\tPERSON 3 3\t\n";
    let out = Converter::default().convert(None, "John met Mary.", ann);

    assert!(out.records[0].entities.is_empty());
    assert_eq!(
        out.report.issues,
        vec![Issue::AlignmentFailed {
            id: "T1".into(),
            reason: AlignmentFailure::EmptySpan,
        }]
    );
}

#[test]
fn test_ignored_and_malformed_lines() {
    let ann = "T1\tPERSON 0 4\tJohn\nE1\tMeet:T1\nA1\tNegated E1\n#1\tAnnotatorNotes T1\tnota\nT2\tPERSON x 13\tMary\n";
    let out = Converter::default().convert(None, "John met Mary.", ann);

    assert_eq!(out.report.ignored_lines, 3);
    assert_eq!(out.report.counts().parse_errors, 1);
    assert_eq!(out.records[0].entities.len(), 1);
}

#[test]
fn test_batch_over_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("doc1.txt"), "John met Mary. Mary left.").unwrap();
    fs::write(
        dir.path().join("doc1.ann"),
        "T1\tPERSON 0 4\tJohn\nT2\tPERSON 9 13\tMary\nT3\tPERSON 15 19\tMary\nR1\tMET Arg1:T1 Arg2:T2\nR2\tSAME Arg1:T2 Arg2:T3\n",
    )
    .unwrap();
    fs::write(dir.path().join("doc2.txt"), "Acme hired Bob.").unwrap();
    fs::write(dir.path().join("doc2.a1"), "T1\tORG 0 4\tAcme\n").unwrap();
    fs::write(dir.path().join("doc3.ann"), "T1\tORG 0 4\tAcme\n").unwrap();

    let paths = vec![
        dir.path().join("doc3.ann"),
        dir.path().join("doc2.a1"),
        dir.path().join("doc1.ann"),
    ];
    let out = convert_paths(&paths, &ConversionConfig::default());

    // doc1 tem duas sentenças, doc2 uma; doc3 não tem texto
    assert_eq!(out.records.len(), 3);
    assert_eq!(out.records[0].relations.len(), 1);
    assert_eq!(out.report.converted(), 2);
    assert_eq!(out.report.failures.len(), 1);
    assert!(out.report.failures[0].document.ends_with("doc3.ann"));
    // R2 cruza a fronteira de sentença
    assert_eq!(out.report.totals().relations_dropped, 1);
}
