use proptest::prelude::*;

use subtitler::{ReadabilityPolicy, Segment, Word, segment};

fn w(text: &str, start: f64, end: f64) -> Word {
    Word::new(text, start, end)
}

#[test]
fn long_silent_gap_splits_instead_of_stretching() -> anyhow::Result<()> {
    let words = vec![w("It", 0.0, 0.5), w("demands", 3.0, 3.7), w("that", 33.0, 33.3)];
    let policy = ReadabilityPolicy::default().with_max_segment_duration(4.0);

    let segments = segment(&words, &policy)?;

    assert!(segments.len() >= 2, "got {segments:?}");
    assert!(segments.iter().all(|s| s.duration() <= 4.0));
    assert!(segments.iter().all(|s| s.duration() > 0.0));
    Ok(())
}

#[test]
fn short_phrase_merges_into_compatible_successor() -> anyhow::Result<()> {
    let words = vec![
        w("Oh", 0.0, 0.2),
        w("well.", 0.2, 0.4),
        w("We", 0.5, 0.8),
        w("can", 0.8, 1.1),
        w("start", 1.1, 1.5),
        w("the", 1.5, 1.7),
        w("meeting", 1.7, 2.1),
        w("now.", 2.1, 2.5),
    ];
    let segments = segment(&words, &ReadabilityPolicy::default())?;

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "Oh well. We can start the meeting now.");
    assert_eq!(segments[0].start, 0.0);
    assert!(segments[0].duration() <= 4.0);
    Ok(())
}

#[test]
fn short_phrase_stays_standalone_when_merge_is_too_long() -> anyhow::Result<()> {
    let words = vec![
        w("Oh", 0.0, 0.2),
        w("well.", 0.2, 0.4),
        w("We", 1.0, 1.5),
        w("can", 1.5, 2.0),
        w("start", 2.0, 2.8),
        w("the", 2.8, 3.2),
        w("meeting", 3.2, 4.2),
        w("now.", 4.2, 5.0),
    ];
    let segments = segment(&words, &ReadabilityPolicy::default())?;

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], {
        let mut s = Segment::new(0.0, 0.4, "Oh well.");
        s.words = words[..2].to_vec();
        s
    });
    assert_eq!(segments[1].text, "We can start the meeting now.");
    assert_eq!(segments[1].end, 5.0);
    Ok(())
}

#[test]
fn recognizer_punctuation_tokens_attach_to_words() -> anyhow::Result<()> {
    let words = vec![
        w(" Well", 0.0, 0.3),
        w(",", 0.3, 0.3),
        w(" that", 0.4, 0.7),
        w(" was", 0.7, 0.9),
        w(" well-", 0.9, 1.2),
        w("known", 1.2, 1.6),
        w(" .", 1.6, 1.6),
    ];
    let segments = segment(&words, &ReadabilityPolicy::default())?;

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "Well, that was well-known.");
    Ok(())
}

#[test]
fn very_long_sentence_respects_hard_limits() -> anyhow::Result<()> {
    let policy = ReadabilityPolicy::default();
    let words: Vec<Word> = (0..60)
        .map(|i| w("syllable", i as f64 * 0.25, i as f64 * 0.25 + 0.2))
        .collect();

    let segments = segment(&words, &policy)?;

    assert!(segments.len() > 1);
    for s in &segments {
        assert!(s.duration() <= policy.max_segment_duration + 1e-9);
        assert!(s.plain_text().chars().count() <= policy.max_block_chars);
        assert!(s.lines().count() <= policy.max_lines_per_block);
    }
    let total_words: usize = segments.iter().map(|s| s.words.len()).sum();
    assert_eq!(total_words, 60);
    Ok(())
}

#[test]
fn narrower_policy_produces_narrower_lines() -> anyhow::Result<()> {
    let policy = ReadabilityPolicy::default().with_max_line_chars(20);
    let words: Vec<Word> = "the river bends twice before it reaches the old mill."
        .split(' ')
        .enumerate()
        .map(|(i, t)| w(t, i as f64 * 0.3, i as f64 * 0.3 + 0.25))
        .collect();

    let segments = segment(&words, &policy)?;

    for s in &segments {
        assert!(s.lines().all(|line| line.chars().count() <= 20), "{s:?}");
        assert!(s.lines().count() <= 2);
    }
    Ok(())
}

#[test]
fn instant_word_keeps_its_own_caption() -> anyhow::Result<()> {
    let policy = ReadabilityPolicy::default();
    let words = vec![
        w("Hello.", 10.0, 10.0),
        w("Next", 50.0, 50.4),
        w("sentence", 50.4, 50.8),
        w("here.", 50.8, 51.0),
    ];

    let segments = segment(&words, &policy)?;

    assert_eq!(segments.len(), 2, "got {segments:?}");
    assert_eq!(segments[0].text, "Hello.");
    assert_eq!(segments[0].start, 10.0);
    assert!((segments[0].end - (10.0 + policy.min_segment_duration)).abs() < 1e-9);
    assert_eq!(segments[1].text, "Next sentence here.");
    assert!(segments.iter().all(|s| s.duration() <= policy.max_segment_duration));
    Ok(())
}

#[test]
fn words_sharing_one_timing_are_laid_out_in_readable_blocks() -> anyhow::Result<()> {
    let policy = ReadabilityPolicy::default();
    let words: Vec<Word> = (0..40).map(|i| w(&format!("word{i}"), 5.0, 8.0)).collect();

    let segments = segment(&words, &policy)?;

    assert!(segments.len() > 1);
    assert_eq!(segments[0].start, 5.0);
    for s in &segments {
        assert!(s.start < s.end, "{s:?}");
        assert!(s.duration() <= policy.max_segment_duration + 1e-9, "{s:?}");
        assert!(s.plain_text().chars().count() <= policy.max_block_chars, "{s:?}");
        assert!(s.lines().count() <= policy.max_lines_per_block, "{s:?}");
        assert!(s.lines().all(|l| l.chars().count() <= policy.max_line_chars), "{s:?}");
    }
    for pair in segments.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
    let total_words: usize = segments.iter().map(|s| s.words.len()).sum();
    assert_eq!(total_words, 40);
    Ok(())
}

/// Time-ordered word streams: 1-12 letter words, each under a second, with occasional
/// punctuation and occasional very long silences. Some words have no duration, and some
/// repeat the previous word's timing the way a recognizer does when it loses alignment.
fn word_stream() -> impl Strategy<Value = Vec<Word>> {
    prop::collection::vec(
        (
            "[a-z]{1,12}",
            prop::sample::select(vec!["", "", "", "", ",", ".", "?"]),
            prop_oneof![
                8 => 0.05f64..1.0,
                1 => Just(0.0),
            ],
            prop_oneof![
                6 => 0.0f64..0.4,
                2 => 0.4f64..3.0,
                1 => 30.0f64..300.0,
            ],
            prop::bool::weighted(0.15),
        ),
        1..120,
    )
    .prop_map(|specs| {
        let mut clock = 0.0;
        let mut previous: Option<(f64, f64)> = None;
        specs
            .into_iter()
            .map(|(text, punct, duration, gap, shared)| {
                let (start, end) = match previous {
                    Some(timing) if shared => timing,
                    _ => (clock + gap, clock + gap + duration),
                };
                clock = end;
                previous = Some((start, end));
                Word::new(format!("{text}{punct}"), start, end)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn captions_never_overlap(words in word_stream()) {
        let segments = segment(&words, &ReadabilityPolicy::default()).unwrap();
        for s in &segments {
            prop_assert!(s.start < s.end, "empty caption {:?}", s);
        }
        for pair in segments.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn captions_respect_hard_limits(words in word_stream()) {
        let policy = ReadabilityPolicy::default();
        let segments = segment(&words, &policy).unwrap();
        for s in &segments {
            prop_assert!(s.duration() <= policy.max_segment_duration + 1e-9, "{:?}", s);
            prop_assert!(s.plain_text().chars().count() <= policy.max_block_chars, "{:?}", s);
        }
    }

    #[test]
    fn captions_respect_line_layout(words in word_stream()) {
        let policy = ReadabilityPolicy::default();
        let segments = segment(&words, &policy).unwrap();
        for s in &segments {
            prop_assert!(s.lines().count() <= policy.max_lines_per_block, "{:?}", s);
            for line in s.lines() {
                prop_assert!(line.chars().count() <= policy.max_line_chars, "{:?}", s);
            }
        }
    }

    #[test]
    fn every_word_lands_in_exactly_one_caption(words in word_stream()) {
        let segments = segment(&words, &ReadabilityPolicy::default()).unwrap();
        let flattened: Vec<Word> = segments.iter().flat_map(|s| s.words.clone()).collect();
        prop_assert_eq!(flattened, words);
    }

    #[test]
    fn resegmenting_own_words_is_stable(words in word_stream()) {
        let policy = ReadabilityPolicy::default();
        let first = segment(&words, &policy).unwrap();
        let flattened: Vec<Word> = first.iter().flat_map(|s| s.words.clone()).collect();
        let second = segment(&flattened, &policy).unwrap();
        prop_assert_eq!(first, second);
    }
}
