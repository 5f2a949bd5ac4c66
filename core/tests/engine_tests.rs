use songrec_core::{BuildOptions, Engine, Error};
use std::io::Write;
use tempfile::NamedTempFile;

const SCENARIO: &str = "artist,song,link,text\n\
A,Song1,linkA,love love love\n\
B,Song1,linkB,rain rain storm\n\
C,Song2,linkC,love storm wind\n";

fn write_csv(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

fn scenario_engine() -> Engine {
    let f = write_csv(SCENARIO);
    Engine::construct(f.path()).unwrap()
}

fn larger_catalog() -> String {
    let words = ["love", "rain", "storm", "wind", "heart", "night", "dance", "fire", "river", "dream"];
    let mut csv = String::from("extra,text,song,artist,link\n");
    for i in 0..40 {
        let lyric: Vec<&str> = (0..6).map(|j| words[(i * 3 + j * 7) % words.len()]).collect();
        csv.push_str(&format!("x,{},Track{},Artist{},http://l/{}\n", lyric.join(" "), i % 17, i % 5, i));
    }
    csv
}

#[test]
fn title_without_artist_resolves_to_first_row() {
    let result = scenario_engine().recommend("song1", 1, None).unwrap();
    assert_eq!(result.query.row, 0);
    assert_eq!(result.query.artist, "A");
    assert_eq!(result.recommendations.len(), 1);
    let rec = &result.recommendations[0];
    assert_eq!((rec.artist.as_str(), rec.title.as_str(), rec.link.as_str()), ("C", "Song2", "linkC"));
}

#[test]
fn shared_lyrics_outrank_shared_title() {
    let result = scenario_engine().recommend("Song1", 2, None).unwrap();
    let rows: Vec<usize> = result.recommendations.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![2, 1]);
    assert!(result.recommendations[0].score > result.recommendations[1].score);
}

#[test]
fn artist_disambiguates_duplicates() {
    let result = scenario_engine().recommend("song1", 1, Some("B")).unwrap();
    assert_eq!(result.query.row, 1);
    assert_eq!(result.query.artist, "B");
    assert!(result.recommendations.iter().all(|r| r.row != 1));
}

#[test]
fn query_errors() {
    let engine = scenario_engine();
    assert!(matches!(engine.recommend("", 5, None), Err(Error::Validation(_))));
    assert!(matches!(engine.recommend("   ", 5, Some("A")), Err(Error::Validation(_))));
    assert!(matches!(engine.recommend("unknown title", 5, None), Err(Error::NotFound(_))));
    assert!(matches!(engine.recommend("song2", 5, Some("A")), Err(Error::NotFound(_))));
    // A failed query leaves the engine usable.
    assert_eq!(engine.recommend("song2", 5, None).unwrap().recommendations.len(), 2);
}

#[test]
fn missing_link_column_is_fatal() {
    let f = write_csv("artist,song,text\nA,Song1,love\n");
    match Engine::construct(f.path()) {
        Err(Error::Schema { column }) => assert_eq!(column, "link"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn empty_corpus_is_fatal() {
    let f = write_csv("artist,song,link,text\n");
    assert!(matches!(Engine::construct(f.path()), Err(Error::Build(_))));
    let f = write_csv("artist,song,link,text\n,,,the\n");
    assert!(matches!(Engine::construct(f.path()), Err(Error::Build(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(Engine::construct("/definitely/not/here.csv"), Err(Error::Io(_))));
}

#[test]
fn every_entry_resolves_to_itself_by_title_and_artist() {
    let engine = Engine::from_reader(larger_catalog().as_bytes(), &BuildOptions::default()).unwrap();
    for (row, entry) in engine.catalog().entries().iter().enumerate() {
        let resolved = engine.resolve(&entry.title, Some(&entry.artist)).unwrap();
        let first = engine
            .catalog()
            .entries()
            .iter()
            .position(|e| e.title_key == entry.title_key && e.artist_key == entry.artist_key)
            .unwrap();
        assert_eq!(resolved.row, first);
        if first == row {
            assert_eq!(resolved.row, row);
        }
    }
}

#[test]
fn rankings_are_sorted_bounded_and_exclude_the_query() {
    let engine = Engine::from_reader(larger_catalog().as_bytes(), &BuildOptions::default()).unwrap();
    let n = engine.catalog().len();
    for k in [1usize, 5, 39, 50] {
        let result = engine.recommend("track3", k, None).unwrap();
        assert_eq!(result.recommendations.len(), k.min(n - 1));
        assert!(result.recommendations.iter().all(|r| r.row != result.query.row));
        for pair in result.recommendations.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].row < pair[1].row);
            }
        }
        assert!(result.recommendations.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }
}

#[test]
fn top_k_is_a_prefix_of_the_full_ranking() {
    let engine = Engine::from_reader(larger_catalog().as_bytes(), &BuildOptions::default()).unwrap();
    let full = engine.recommend("track7", 50, None).unwrap();
    let short = engine.recommend("track7", 4, None).unwrap();
    assert_eq!(&full.recommendations[..4], &short.recommendations[..]);
}

#[test]
fn rebuilding_from_the_same_data_is_deterministic() {
    let opts = BuildOptions { max_features: 25, ngram_max: 2 };
    let a = Engine::from_reader(larger_catalog().as_bytes(), &opts).unwrap();
    let b = Engine::from_reader(larger_catalog().as_bytes(), &opts).unwrap();
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.stats().vocabulary_size, 25);
    for title in ["track0", "track5", "track16"] {
        assert_eq!(a.recommend(title, 10, None).unwrap(), b.recommend(title, 10, None).unwrap());
    }
}

#[test]
fn result_serializes_without_row_ids() {
    let result = scenario_engine().recommend("song1", 1, None).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["query"], serde_json::json!({"title": "Song1", "artist": "A"}));
    let rec = &json["recommendations"][0];
    assert_eq!(rec["title"], "Song2");
    assert_eq!(rec["link"], "linkC");
    assert!(rec.get("row").is_none());
    assert!(rec["score"].as_f64().unwrap() > 0.0);
}
