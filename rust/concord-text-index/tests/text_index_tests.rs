mod common;

use std::collections::HashSet;

use common::{TestCorpus, read_lines, small_budget_params};
use concord_index_core::{KeyLocator, LocatorKind};
use concord_io::{BufferedOutput, MemoryBudget, TempRunStore};
use concord_text_index::{
    AlphaRunTokenizer, IndexBuilder, IndexBuilderParams, IndexHandle, IndexOptions, ItemStream,
    MergeStrategy, SearchOptions,
    record::Occurrence,
    write::{EntryGenerator, ExternalSorter, SortParams},
};

const RANDOM_DOCS: &[(&str, usize)] = &[("AAA", 7), ("BBB", 240), ("CCC", 1200)];

#[test]
fn test_alice_wonder_scenario() {
    let corpus = TestCorpus::from_texts(&[
        (
            "AAA",
            "Chapter One\nDown the hole\nAlice sat on the bank,\nfull of wonder.\nThe end\n",
        ),
        ("BBB", "Alice again\nno more\n\nand wonder there\n"),
    ]);
    let index = corpus.build(IndexBuilderParams::default());
    let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();

    let outcome = handle
        .search(&["alice", "wonder"], &SearchOptions::new(2), 10)
        .unwrap();
    let hits = outcome
        .hits
        .iter()
        .map(|hit| hit.to_string())
        .collect::<Vec<_>>();
    assert_eq!(hits, vec!["AAA 3"]);
    assert!(outcome.missing.is_empty());
    assert!(outcome.session.unwrap().is_exhausted());

    let outcome = handle
        .search(&["alice", "wonder"], &SearchOptions::new(1), 10)
        .unwrap();
    assert!(outcome.hits.is_empty());

    // BBB has the pair three lines apart.
    let outcome = handle
        .search(&["wonder", "alice"], &SearchOptions::new(4), 10)
        .unwrap();
    let hits = outcome
        .hits
        .iter()
        .map(|hit| hit.to_string())
        .collect::<Vec<_>>();
    assert_eq!(hits, vec!["AAA 3", "BBB 1"]);
}

#[test]
fn test_entries_match_reference() {
    let corpus = TestCorpus::random(734, RANDOM_DOCS);
    let budget = MemoryBudget::new(512);
    let docs = corpus.corpus(budget);
    let raw = corpus.dir.path().join("raw");

    let tokenizer = AlphaRunTokenizer::default();
    let mut output = BufferedOutput::create(&raw, budget, 0.5).unwrap();
    let count = EntryGenerator::new(&tokenizer, budget, 0.2)
        .generate_all(&docs, &mut output)
        .unwrap();
    output.close().unwrap();

    let mut generated = read_lines(&raw)
        .iter()
        .map(|record| {
            let occurrence = Occurrence::parse(record).unwrap();
            (
                occurrence.key.to_string(),
                occurrence.doc.to_string(),
                occurrence.line,
            )
        })
        .collect::<Vec<_>>();
    let mut expected = corpus.reference_occurrences();
    assert_eq!(count as usize, expected.len());
    generated.sort();
    expected.sort();
    assert_eq!(generated, expected);
}

#[test]
fn test_sorter_matches_full_sort() {
    let mut rng = fastrand::Rng::with_seed(90210);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("unsorted");
    let records = (0..3000)
        .map(|_| {
            let len = rng.usize(1..8);
            let key = (0..len).map(|_| rng.lowercase()).collect::<String>();
            format!("{key}:ABC{:04}", rng.u32(1..2000))
        })
        .collect::<Vec<_>>();
    std::fs::write(&input, records.join("\n") + "\n").unwrap();
    let mut expected = records.clone();
    expected.sort();

    for round in 0..12 {
        let parallel = round % 2 == 0;
        let budget = MemoryBudget::new(rng.usize(1..4000));
        let store = TempRunStore::new(Some(dir.path())).unwrap();
        let params = SortParams {
            chunk_fraction: 1.0,
            merge_fraction: 1.0,
            parallel,
        };
        let sorter = ExternalSorter::new(&store, budget, params);
        let sorted = sorter.sort(&input).unwrap().unwrap();
        assert_eq!(read_lines(sorted.path()), expected, "budget {budget:?}");
        drop(sorted);
        assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);
    }
}

#[test]
fn test_postings_round_trip() {
    let corpus = TestCorpus::random(4242, RANDOM_DOCS);
    let index = corpus.build(small_budget_params(2048, true));
    let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();

    let reference = corpus.reference_postings();
    assert_eq!(handle.key_count(), reference.len());
    let index_keys = read_lines(&index)
        .iter()
        .map(|line| line.split(':').next().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        index_keys,
        reference.iter().map(|(key, _)| key.clone()).collect::<Vec<_>>()
    );

    for (key, postings) in &reference {
        let stream = handle.item_stream(key).unwrap().unwrap();
        let decoded = stream.collect::<concord_common::Result<Vec<_>>>().unwrap();
        assert_eq!(&decoded, postings, "postings of '{key}'");
    }
}

#[test]
fn test_sequential_and_parallel_builds_agree() {
    let corpus = TestCorpus::random(11, RANDOM_DOCS);
    let parallel = std::fs::read(corpus.build(small_budget_params(1000, true))).unwrap();
    let sequential = std::fs::read(corpus.build(small_budget_params(1000, false))).unwrap();
    let roomy = std::fs::read(corpus.build(IndexBuilderParams::default())).unwrap();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel, roomy);
}

#[test]
fn test_build_cleans_temp_dir() {
    let corpus = TestCorpus::random(5, RANDOM_DOCS);
    let scratch = tempfile::tempdir().unwrap();
    let params = IndexBuilderParams {
        temp_dir: Some(scratch.path().to_path_buf()),
        ..small_budget_params(700, true)
    };
    let index = corpus.index_path();
    let summary = IndexBuilder::new(params)
        .build(&corpus.corpus(MemoryBudget::new(700)), &index)
        .unwrap();
    assert_eq!(
        summary.occurrence_count as usize,
        corpus.reference_occurrences().len()
    );
    assert_eq!(summary.key_count as usize, read_lines(&index).len());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_locators_agree() {
    let corpus = TestCorpus::random(808, RANDOM_DOCS);
    let index = corpus.build(IndexBuilderParams::default());
    let meta = IndexHandle::open(&index, &IndexOptions::default()).unwrap();
    let hashed = IndexHandle::open(
        &index,
        &IndexOptions::default().with_locator(LocatorKind::PerfectHash),
    )
    .unwrap();
    assert_eq!(hashed.locator().kind(), LocatorKind::PerfectHash);

    for (line_no, line) in read_lines(&index).iter().enumerate() {
        let (key, body) = line.split_once(':').unwrap();
        assert_eq!(meta.locator().locate(key), Some(line_no as u64 + 1));
        assert_eq!(hashed.lookup(key).unwrap().as_deref(), Some(body));
        assert_eq!(meta.lookup(key).unwrap().as_deref(), Some(body));
        assert_eq!(hashed.posting_record(key).unwrap().as_deref(), Some(line.as_str()));
    }
    for absent in ["zebra", "alic", "wonderlands", "hat"] {
        assert!(meta.lookup(absent).unwrap().is_none());
        assert!(hashed.lookup(absent).unwrap().is_none());
    }
}

#[test]
fn test_missing_keys() {
    let corpus = TestCorpus::random(21, RANDOM_DOCS);
    let index = corpus.build(IndexBuilderParams::default());
    let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();

    let outcome = handle
        .search(&["alice", "zebra", "unicorn"], &SearchOptions::new(3), 5)
        .unwrap();
    assert_eq!(outcome.missing, vec!["zebra", "unicorn"]);
    assert_eq!(outcome.terms, vec!["alice"]);
    assert!(outcome.hits.is_empty());
    assert!(outcome.session.is_none());

    // A repeated key is one term and cannot pair with itself.
    let outcome = handle
        .search(&["alice", "alice"], &SearchOptions::new(3), 5)
        .unwrap();
    assert!(outcome.session.is_none());

    let outcome = handle
        .search(&["alice", "zebra", "rabbit"], &SearchOptions::new(3), 5)
        .unwrap();
    assert_eq!(outcome.missing, vec!["zebra"]);
    assert!(outcome.session.is_some());
}

#[test]
fn test_paged_search_matches_full_search() {
    let corpus = TestCorpus::random(77, RANDOM_DOCS);
    let index = corpus.build(IndexBuilderParams::default());
    let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();
    let keys = ["alice", "rabbit", "queen", "hatter"];
    let options = SearchOptions::new(2);

    let mut full = handle.search(&keys, &options, 0).unwrap();
    assert!(full.hits.is_empty());
    let all = full.session.as_mut().unwrap().all_hits().unwrap();
    assert!(!all.is_empty());
    assert!(all.windows(2).all(|pair| pair[0] < pair[1]));

    let mut paged = handle.search(&keys, &options, 7).unwrap();
    let mut collected = paged.hits.clone();
    let session = paged.session.as_mut().unwrap();
    while !session.is_exhausted() {
        let page = session.more(7).unwrap();
        assert!(page.len() <= 7);
        collected.extend(page);
    }
    assert_eq!(collected, all);
    let distinct = collected.iter().collect::<HashSet<_>>();
    assert_eq!(distinct.len(), collected.len());
}

#[test]
fn test_merge_strategies_agree() {
    let corpus = TestCorpus::random(3, RANDOM_DOCS);
    let index = corpus.build(IndexBuilderParams::default());
    let handle = IndexHandle::open(&index, &IndexOptions::default()).unwrap();
    let key_sets: [&[&str]; 3] = [
        &["alice", "wonder"],
        &["queen", "knave", "tarts", "turtle", "gryphon"],
        &["éclair", "naïve", "dormouse", "caterpillar", "mushroom", "curious"],
    ];
    for keys in key_sets {
        for window in [1, 2, 5] {
            let heap = SearchOptions::new(window).with_strategy(MergeStrategy::Heap);
            let linear = SearchOptions::new(window).with_strategy(MergeStrategy::LinearScan);
            let mut a = handle.search(keys, &heap, 0).unwrap().session.unwrap();
            let mut b = handle.search(keys, &linear, 0).unwrap().session.unwrap();
            assert_eq!(a.all_hits().unwrap(), b.all_hits().unwrap());
        }
    }
}

#[test]
fn test_item_stream_over_index_record() {
    let corpus = TestCorpus::from_texts(&[
        ("AAA", "mock turtle\nturtle soup, turtle\n"),
        ("BBB", "\n\n\nturtle\n"),
    ]);
    let index = corpus.build(IndexBuilderParams::default());
    assert_eq!(
        read_lines(&index),
        vec!["mock:AAA1", "soup:AAA2", "turtle:AAA1,2,BBB4"]
    );
    let record = IndexHandle::open(&index, &IndexOptions::default())
        .unwrap()
        .posting_record("turtle")
        .unwrap()
        .unwrap();
    let lines = ItemStream::new(record)
        .unwrap()
        .map(|posting| posting.unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(lines, vec!["AAA 1", "AAA 2", "BBB 4"]);
}
