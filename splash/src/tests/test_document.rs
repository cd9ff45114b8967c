// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::document::{Damage, MAX_STYLES, RunKind};
use crate::embedded::EmbeddedObject;
use crate::style::Color;
use crate::{AnnotationKey, Document, Error, Style};

use super::utils::TestObject;

const LINK: AnnotationKey<u32> = AnnotationKey::new("link");

fn kinds(document: &Document, paragraph_index: usize) -> Vec<RunKind> {
    document
        .runs(paragraph_index)
        .iter()
        .map(|run| run.kind())
        .collect()
}

fn assert_consistent(document: &Document) {
    let mut char_index = 0;
    let mut run_index = 0;
    for (index, paragraph) in document.paragraphs().iter().enumerate() {
        assert_eq!(paragraph.char_index, char_index, "paragraphs are contiguous");
        assert_eq!(paragraph.run_index, run_index, "runs are contiguous");
        let run_chars: usize = document.runs(index).iter().map(|run| run.char_count()).sum();
        assert_eq!(run_chars, paragraph.char_count, "runs cover the paragraph");
        char_index += paragraph.char_count;
        run_index += paragraph.run_count;
    }
    assert_eq!(char_index, document.char_count(), "paragraphs cover the text");
    assert_eq!(run_index, document.run_count(), "paragraphs cover the runs");
}

#[test]
fn new_document_is_one_empty_paragraph() {
    let document = Document::new();
    assert_eq!(document.paragraph_count(), 1);
    assert_eq!(document.char_count(), 0);
    assert_eq!(document.run_count(), 0);
    assert_eq!(document.style_count(), 1);
    assert_eq!(document.object_count(), 0);
    assert_eq!(document.damage(), Some(Damage::Cleared));
    assert_eq!(document.to_string(), "");
}

#[test]
fn newlines_end_paragraphs() {
    let mut document = Document::new();
    document.append_text("one\ntwo\n").unwrap();
    assert_eq!(document.paragraph_count(), 3);
    assert_eq!(document.paragraph(0).unwrap().char_count, 4);
    assert_eq!(document.paragraph(1).unwrap().char_index, 4);
    assert_eq!(document.paragraph(2).unwrap().char_count, 0);
    assert_eq!(document.to_string(), "one\ntwo\n");
    assert_consistent(&document);
}

#[test]
fn tabs_get_their_own_runs() {
    let mut document = Document::new();
    document.append_text("a\tb\u{7}c").unwrap();
    assert_eq!(document.to_string(), "a\tbc");
    assert_eq!(
        kinds(&document, 0),
        [
            RunKind::Text { char_count: 1 },
            RunKind::Tab,
            RunKind::Text { char_count: 2 }
        ]
    );
    assert_consistent(&document);
}

#[test]
fn styles_split_runs() {
    let mut document = Document::new();
    let red = Style {
        color: Color::rgb(255, 0, 0),
        ..Style::default()
    };
    document.append_text("ab").unwrap();
    document.begin_style(&red).unwrap();
    document.append_text("cd").unwrap();
    document.end_style().unwrap();
    document.append_text("ef").unwrap();

    assert_eq!(document.run_count(), 3);
    assert_eq!(document.style_count(), 2);
    assert_eq!(document.style_at(2).unwrap().color, red.color);
    assert_eq!(document.style_at(4).unwrap(), &Style::default());
    assert_eq!(document.runs(0)[2].style_index(), 0);
    assert_eq!(
        document.style_at(6),
        Err(Error::OutOfBounds { index: 6, len: 6 })
    );
}

#[test]
fn default_style_cannot_be_popped() {
    let mut document = Document::new();
    assert_eq!(document.end_style(), Err(Error::StyleStackUnderflow));
}

#[test]
fn style_table_is_bounded() {
    let mut document = Document::new();
    for size in 0..MAX_STYLES - 1 {
        let style = Style {
            left_margin: i32::try_from(size).unwrap() + 1,
            ..Style::default()
        };
        document.begin_style(&style).unwrap();
        document.end_style().unwrap();
    }
    assert_eq!(document.style_count(), MAX_STYLES);
    // Known styles are still accepted.
    document.begin_style(&Style::default()).unwrap();
    let one_too_many = Style {
        left_margin: -1,
        ..Style::default()
    };
    assert_eq!(
        document.begin_style(&one_too_many),
        Err(Error::CapacityExceeded {
            what: "styles",
            max: MAX_STYLES
        })
    );
}

#[test]
fn text_ranges_are_validated() {
    let mut document = Document::new();
    document.append_text("Hello world").unwrap();
    assert_eq!(document.text_range(6, 5).unwrap(), "world");
    assert_eq!(document.text_range(11, 0).unwrap(), "");
    assert_eq!(
        document.text_range(6, 6),
        Err(Error::InvalidRange {
            start: 6,
            len: 6,
            doc_len: 11
        })
    );
    assert!(document.text_range(usize::MAX, 2).is_err());
}

#[test]
fn objects_are_interned_by_identity() {
    let mut document = Document::new();
    let (object, _) = TestObject::new(10, 10, 0).into_parts();
    let (other, _) = TestObject::new(10, 10, 0).into_parts();
    document.append_text("a").unwrap();
    document.append_object(Rc::clone(&object)).unwrap();
    document.append_object(Rc::clone(&object)).unwrap();
    document.append_object(other).unwrap();

    assert_eq!(document.object_count(), 2);
    assert_eq!(document.char_count(), 4);
    assert_eq!(document.run_count(), 4);
    assert!(document.object_at(0).unwrap().is_none());
    let found: &Rc<dyn EmbeddedObject> = document.object_at(2).unwrap().unwrap();
    assert!(Rc::ptr_eq(found, &object));
    assert_eq!(document.runs(0)[1].object_index().unwrap(), 0);
    assert_eq!(document.runs(0)[3].object_index().unwrap(), 1);
    assert!(document.object_at(4).is_err());
}

#[test]
fn annotations_nest() {
    let mut document = Document::new();
    document.append_text("a").unwrap();
    document.begin_annotation(LINK, 1);
    document.append_text("b").unwrap();
    document.begin_annotation(LINK, 2);
    document.append_text("c").unwrap();
    assert_eq!(document.current_annotation(LINK), Some(&2));
    document.end_annotation(LINK).unwrap();
    document.append_text("d").unwrap();
    document.end_annotation(LINK).unwrap();
    document.append_text("e").unwrap();

    let values: Vec<_> = (0..5)
        .map(|index| document.annotation_at(LINK, index).unwrap().copied())
        .collect();
    assert_eq!(values, [None, Some(1), Some(2), Some(1), None]);
    assert_eq!(
        document.end_annotation(LINK),
        Err(Error::NoCurrentAnnotation { key: "link" })
    );
    assert!(document.annotation_at(LINK, 5).is_err());
}

#[test]
fn paragraph_break_splits_a_run() {
    let mut document = Document::new();
    document.append_text("Hello world").unwrap();
    let _ = document.take_damage();

    document.insert_paragraph_break(6).unwrap();
    assert_eq!(document.to_string(), "Hello \nworld");
    assert_eq!(document.paragraph_count(), 2);
    assert_eq!(kinds(&document, 0), [RunKind::Text { char_count: 7 }]);
    assert_eq!(kinds(&document, 1), [RunKind::Text { char_count: 5 }]);
    assert_eq!(document.take_damage(), Some(Damage::ParagraphsFrom(0)));
    assert_consistent(&document);
}

#[test]
fn paragraph_break_before_a_tab() {
    let mut document = Document::new();
    document.append_text("ab\tc").unwrap();
    document.insert_paragraph_break(2).unwrap();
    assert_eq!(document.to_string(), "ab\n\tc");
    assert_eq!(kinds(&document, 0), [RunKind::Text { char_count: 3 }]);
    assert_eq!(
        kinds(&document, 1),
        [RunKind::Tab, RunKind::Text { char_count: 1 }]
    );
    assert_consistent(&document);
}

#[test]
fn paragraph_break_after_an_object() {
    let mut document = Document::new();
    let (object, _) = TestObject::new(10, 10, 0).into_parts();
    document.append_object(object).unwrap();
    document.append_text("x").unwrap();
    document.insert_paragraph_break(1).unwrap();
    assert_eq!(document.paragraph_count(), 2);
    assert_eq!(
        kinds(&document, 0),
        [
            RunKind::Object { object_index: 0 },
            RunKind::Text { char_count: 1 }
        ]
    );
    assert_eq!(kinds(&document, 1), [RunKind::Text { char_count: 1 }]);
    assert_consistent(&document);
}

#[test]
fn removing_a_break_merges_paragraphs() {
    let mut document = Document::new();
    document.append_text("ab\ncd\nef").unwrap();
    let _ = document.take_damage();

    document.remove_paragraph_break(0).unwrap();
    assert_eq!(document.to_string(), "abcd\nef");
    assert_eq!(document.paragraph_count(), 2);
    assert_eq!(kinds(&document, 0), [RunKind::Text { char_count: 5 }]);
    assert_eq!(document.paragraph(1).unwrap().char_index, 5);
    assert_eq!(document.take_damage(), Some(Damage::ParagraphsFrom(0)));
    assert_consistent(&document);

    assert_eq!(
        document.remove_paragraph_break(1),
        Err(Error::OutOfBounds { index: 1, len: 1 })
    );
}

#[test]
fn breaks_shift_annotations() {
    let mut document = Document::new();
    document.append_text("ab").unwrap();
    document.begin_annotation(LINK, 7);
    document.append_text("cd").unwrap();
    document.end_annotation(LINK).unwrap();

    document.insert_paragraph_break(1).unwrap();
    assert_eq!(document.annotation_at(LINK, 2).unwrap(), None);
    assert_eq!(document.annotation_at(LINK, 3).unwrap(), Some(&7));
    assert_eq!(document.annotation_at(LINK, 4).unwrap(), Some(&7));

    document.remove_paragraph_break(0).unwrap();
    assert_eq!(document.annotation_at(LINK, 1).unwrap(), None);
    assert_eq!(document.annotation_at(LINK, 2).unwrap(), Some(&7));
}

#[test]
fn damage_keeps_the_lowest_paragraph() {
    let mut document = Document::new();
    document.append_text("a\nb\nc").unwrap();
    let _ = document.take_damage();
    assert_eq!(document.damage(), None);

    document.append_text("d").unwrap();
    assert_eq!(document.damage(), Some(Damage::ParagraphsFrom(2)));
    document.insert_paragraph_break(2).unwrap();
    assert_eq!(document.damage(), Some(Damage::ParagraphsFrom(1)));
    document.append_text("e").unwrap();
    assert_eq!(document.take_damage(), Some(Damage::ParagraphsFrom(1)));

    document.clear();
    document.append_text("f").unwrap();
    assert_eq!(document.take_damage(), Some(Damage::Cleared));
    assert_eq!(format!("{document}"), "f");
}

#[test]
fn clear_restores_the_empty_document() {
    let mut document = Document::new();
    let red = Style {
        color: Color::rgb(255, 0, 0),
        ..Style::default()
    };
    document.begin_style(&red).unwrap();
    document.append_text("a\nb").unwrap();
    document.clear();

    assert_eq!(document.paragraph_count(), 1);
    assert_eq!(document.char_count(), 0);
    assert_eq!(document.run_count(), 0);
    assert_eq!(document.style_count(), 1);
    assert_eq!(document.style(0), Some(&Style::default()));
    assert_eq!(document.current_style(), &Style::default());
    assert_eq!(document.end_style(), Err(Error::StyleStackUnderflow));
    assert_consistent(&document);
}
