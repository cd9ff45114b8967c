// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;
use alloc::vec::Vec;

use crate::Style;
use crate::style::TabStopRuler;

use super::utils::TestEnv;

fn styled(width: i32, style: &Style, text: &str) -> TestEnv {
    let mut env = TestEnv::new(width);
    env.document.begin_style(style).unwrap();
    env.document.append_text(text).unwrap();
    env.update();
    env
}

#[test]
fn words_wrap_at_spaces() {
    let mut env = TestEnv::with_text(100, "The quick brown fox");
    env.update();
    assert_eq!(env.line_texts(), vec!["The quick ", "brown fox"]);
}

#[test]
fn long_words_break_anywhere() {
    let mut env = TestEnv::with_text(35, "abcdefghij");
    env.update();
    assert_eq!(env.line_texts(), vec!["abc", "def", "ghi", "j"]);
    let leading: Vec<_> = env
        .layout
        .lines()
        .iter()
        .map(|line| line.truncated_leading)
        .collect();
    assert_eq!(leading, vec![0, 3, 6, 9]);
}

#[test]
fn every_line_takes_at_least_one_cluster() {
    let mut env = TestEnv::with_text(5, "abc");
    env.update();
    assert_eq!(env.line_texts(), vec!["a", "b", "c"]);
}

#[test]
fn whitespace_hangs_past_the_edge() {
    let mut env = TestEnv::with_text(50, "aaa   bbb");
    env.update();
    assert_eq!(env.line_texts(), vec!["aaa   ", "bbb"]);
    assert_eq!(env.layout.lines()[0].truncated_trailing, 3);
}

#[test]
fn no_wrap_keeps_one_line() {
    let style = Style {
        word_wrap: false,
        ..Style::default()
    };
    let env = styled(30, &style, "aaaa bbbb cccc");
    assert_eq!(env.line_texts(), vec!["aaaa bbbb cccc"]);
}

#[test]
fn margins_and_first_line_indent() {
    let style = Style {
        left_margin: 10,
        right_margin: 10,
        first_line_indent: 20,
        ..Style::default()
    };
    let env = styled(100, &style, "aaaa bbbb cccc");
    assert_eq!(env.line_texts(), vec!["aaaa ", "bbbb ", "cccc"]);
    let xs: Vec<_> = env.layout.lines().iter().map(|line| line.x).collect();
    assert_eq!(xs, vec![30, 10, 10]);
}

#[test]
fn tabs_advance_to_the_next_stop() {
    let style = Style {
        tab_stop_ruler: TabStopRuler {
            pitch: 48,
            min_width: 2,
        },
        ..Style::default()
    };
    let mut env = styled(400, &style, "a\tb");
    assert_eq!(env.layout.lines().len(), 1);
    let paragraph = env.layout.cached_script_paragraph(0).unwrap();
    let runs = paragraph.script_runs();
    assert_eq!(runs.len(), 3);
    assert!(runs[1].requires_tab_expansion());
    assert_eq!(runs[1].abc.total(), 38);
    assert!(paragraph.logical_attributes()[1].is_whitespace());

    // "b" starts on the tab stop.
    assert_eq!(env.snap(50, 5).char_index, 2);
    assert_eq!(env.snap(40, 5).char_index, 1);
}

#[test]
fn narrow_tabs_skip_a_stop() {
    let style = Style {
        tab_stop_ruler: TabStopRuler {
            pitch: 40,
            min_width: 15,
        },
        ..Style::default()
    };
    let env = styled(400, &style, "abc\tx");
    let paragraph = env.layout.cached_script_paragraph(0).unwrap();
    // 30 + 10 would end on the stop at 40 but is narrower than 15.
    assert_eq!(paragraph.script_runs()[1].abc.total(), 50);
}

#[test]
fn tabs_wrap_like_whitespace() {
    let env = styled(60, &Style::default(), "abcd\tefgh");
    // The tab ends at 48 and "efgh" does not fit after it.
    assert_eq!(env.line_texts(), vec!["abcd\t", "efgh"]);
}
