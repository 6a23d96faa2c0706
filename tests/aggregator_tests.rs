use pretty_assertions::assert_eq;
use schedtrace::aggregator::{
    build_table, process_series, rank, summary, thread_series, to_report, Series,
};
use schedtrace::commands::replay_trace;
use schedtrace::kernel::{CreationPolicy, Engine, EngineConfig, SkipStrategy};
use schedtrace::parser::RunStats;
use std::io::Cursor;

const SEC: u64 = 1_000_000_000;

/// Three processes on three cores running 5s, 3s and 1s, 1s buckets
fn three_processes() -> Engine {
    let trace = "[0ns]@0:0>swapper/0\n\
                 [0ns]@0:100>swapper/1\n\
                 [0ns]@0:101>swapper/2\n\
                 [0ns]@1:1>processA\n\
                 [0ns]@2:2>processB\n\
                 [0ns]@3:3>processC\n\
                 [0ns]#0>1\n\
                 [0ns]#1>2\n\
                 [0ns]#2>3\n\
                 [1000000000ns]#2>101\n\
                 [3000000000ns]#1>100\n\
                 [5000000000ns]#0>0\n";

    let mut engine = Engine::new(EngineConfig {
        bucket_ns: SEC,
        cores: 3,
        creation_policy: CreationPolicy::RequireSwitch,
        skip_strategy: SkipStrategy::Distribute,
        ..Default::default()
    });
    replay_trace(Cursor::new(trace), &mut engine, None).unwrap();
    engine
}

#[test]
fn test_top_one_plus_misc() {
    let engine = three_processes();
    let ranked = rank(process_series(&engine), true);

    let labels: Vec<&str> = ranked.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["processA", "processB", "processC"]);

    let table = build_table(&ranked, 1, engine.last_bucket(), SEC);

    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.columns[0].label, "processA");
    assert_eq!(table.columns[0].total_ns, 5 * SEC);
    assert_eq!(table.columns[1].label, "Misc");
    assert_eq!(table.columns[1].total_ns, 4 * SEC);
    assert_eq!(table.rows, 6);
    assert_eq!(
        table.columns[1].buckets,
        vec![2 * SEC, SEC, SEC, 0, 0, 0]
    );
    assert_eq!(table.occupancy(1, 0), 2.0);
}

#[test]
fn test_ranking_is_non_increasing() {
    let engine = three_processes();
    let ranked = rank(process_series(&engine), false);

    for pair in ranked.windows(2) {
        assert!(pair[0].total_ns >= pair[1].total_ns);
    }
    // The idle threads were never switched out
    assert_eq!(ranked.last().unwrap().pid, 0);
}

#[test]
fn test_process_histogram_sums_threads() {
    let trace = "[0ns]@7:7>db\n\
                 [0ns]@7:8>db-writer\n\
                 [0ns]@0:0>swapper/0\n\
                 [0ns]@0:100>swapper/1\n\
                 [50ns]#0>7\n\
                 [70ns]#1>8\n\
                 [150ns]#0>0\n\
                 [180ns]#1>100\n";
    let mut engine = Engine::new(EngineConfig {
        bucket_ns: 100,
        bucket_count: 10,
        cores: 2,
        creation_policy: CreationPolicy::RequireSwitch,
        ..Default::default()
    });
    replay_trace(Cursor::new(trace), &mut engine, None).unwrap();

    let series = process_series(&engine);
    let db = series.iter().find(|s| s.pid == 7).unwrap();

    assert_eq!(db.label, "db-writer");
    assert_eq!(&db.buckets[..2], &[80, 130]);
    assert_eq!(db.total_ns, 210);
    assert_eq!(db.buckets.iter().sum::<u64>(), db.total_ns);
}

#[test]
fn test_merge_by_name_before_ranking() {
    let trace = "[0ns]@1:1>sh\n\
                 [0ns]@2:2>make\n\
                 [0ns]@3:3>sh\n\
                 [0ns]@0:0>swapper/0\n\
                 [0ns]@0:100>swapper/2\n\
                 [0ns]#0>1\n\
                 [0ns]#1>2\n\
                 [0ns]#2>3\n\
                 [40ns]#0>0\n\
                 [60ns]#2>100\n";
    let mut engine = Engine::new(EngineConfig {
        bucket_ns: 100,
        bucket_count: 10,
        cores: 3,
        creation_policy: CreationPolicy::RequireSwitch,
        ..Default::default()
    });
    replay_trace(Cursor::new(trace), &mut engine, None).unwrap();

    let before = rank(process_series(&engine), false);
    assert_eq!(before[0].label, "sh");
    assert_eq!(before[0].total_ns, 60);

    engine.merge_by_name();
    let after = rank(process_series(&engine), false);

    assert_eq!(after.len(), 3);
    assert_eq!(after[0].pid, 1);
    assert_eq!(after[0].total_ns, 100);
    assert_eq!(after[0].buckets[0], 100);

    // Thread histograms are untouched by the merge
    let sh3 = engine.threads().by_tid(3).unwrap();
    assert_eq!(sh3.buckets()[0], 60);
}

#[test]
fn test_thread_series_labels() {
    let engine = three_processes();
    let series = thread_series(&engine);

    assert_eq!(series.len(), 6);
    assert_eq!(series[3].label, "processA[1]");
    assert_eq!(series[3].total_ns, 5 * SEC);

    let ranked = rank(series, true);
    assert_eq!(ranked.len(), 3);
}

#[test]
fn test_summary_is_unranked() {
    let engine = three_processes();
    let rows = summary(&engine);

    let pids: Vec<u32> = rows.iter().map(|r| r.pid).collect();
    assert_eq!(pids, vec![0, 1, 2, 3]);
    assert_eq!(rows[1].name, "processA");
    assert_eq!(rows[1].total_secs(), 5.0);
}

#[test]
fn test_report_matches_engine() {
    let engine = three_processes();
    let report = to_report(&engine, "trace.log", RunStats::default());

    assert_eq!(report.version, "1.0.0");
    assert_eq!(report.last_bucket, Some(5));
    assert_eq!(report.processes.len(), 4);

    let b = &report.processes[2];
    assert_eq!(b.name, "processB");
    assert_eq!(b.total_cpu_ns, 3 * SEC);
    assert_eq!(b.buckets, vec![SEC, SEC, SEC, 0, 0, 0]);
    assert_eq!(report.processes[0].tids, vec![0, 100, 101]);
}

#[test]
fn test_build_table_from_plain_series() {
    let ranked = vec![
        Series::new(1, 1, "a", 5 * SEC, vec![5 * SEC]),
        Series::new(2, 2, "b", 3 * SEC, vec![3 * SEC]),
        Series::new(3, 3, "c", SEC, vec![SEC]),
    ];
    let table = build_table(&ranked, 1, Some(0), 10 * SEC);

    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.columns[1].total_ns, 4 * SEC);
    assert_eq!(table.occupancy(0, 0), 0.5);
}
