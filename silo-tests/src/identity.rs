use crate::fixtures::{
    IdentityLine, IdentityLineMeta, SequenceLine, SequenceLineMeta, IDENTITY_LINE_SCHEMA,
    SEQUENCE_LINE_SCHEMA,
};
use silo_core::{Connection, Database, InsertOptions};

/// Identity ids come back from the driver's generated keys, one per insert,
/// strictly increasing.
pub fn identity_generator<C: Connection>(db: &mut Database<C>) {
    db.run_script(IDENTITY_LINE_SCHEMA).expect("identity schema");
    let m = IdentityLineMeta::new();
    for expected in 1..=201i64 {
        let line = IdentityLine {
            id: 0,
            text: "test".to_owned(),
        };
        let inserted = db.insert(&m, &line).expect("insert identity line");
        assert_eq!(inserted.id, expected);
    }
}

/// Sequence ids are fetched before the insert; single threaded use yields
/// strictly increasing ids with no gaps.
pub fn sequence_generator<C: Connection>(db: &mut Database<C>) {
    db.run_script(SEQUENCE_LINE_SCHEMA).expect("sequence schema");
    let m = SequenceLineMeta::new();
    for expected in 1..=201i64 {
        let line = SequenceLine {
            id: 0,
            text: "test".to_owned(),
        };
        let inserted = db.insert(&m, &line).expect("insert sequence line");
        assert_eq!(inserted.id, expected);
    }
}

/// Disabling sequence assignment keeps the id the caller provided.
pub fn disable_sequence_assignment<C: Connection>(db: &mut Database<C>) {
    db.run_script(SEQUENCE_LINE_SCHEMA).expect("sequence schema");
    let m = SequenceLineMeta::new();
    let line = SequenceLine {
        id: 500,
        text: "explicit".to_owned(),
    };
    let options = InsertOptions {
        disable_sequence_assignment: true,
        ..InsertOptions::default()
    };
    let inserted = db
        .insert_with_options(&m, &line, options)
        .expect("insert with explicit id");
    assert_eq!(inserted.id, 500);
}

/// Multi-row inserts chunked by batch size still generate one key per row.
pub fn batch_insert_generates_keys<C: Connection>(db: &mut Database<C>) {
    db.run_script(IDENTITY_LINE_SCHEMA).expect("identity schema");
    let m = IdentityLineMeta::new();
    let lines: Vec<IdentityLine> = (0..10)
        .map(|i| IdentityLine {
            id: 0,
            text: format!("line {i}"),
        })
        .collect();
    let options = InsertOptions {
        batch_size: Some(3),
        ..InsertOptions::default()
    };
    let inserted = db
        .insert_batch_with_options(&m, &lines, options)
        .expect("batch insert");
    let ids: Vec<i64> = inserted.iter().map(|l| l.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}
