//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use proptest::prelude::*;
use std::time::Instant;
use teleconsole_terminal::{
    EditorEvent, EditorEventKind, LineEditor, MemoryHistory, NoHistory, TerminalSize, echo,
};

fn type_keys(editor: &mut LineEditor, keys: &str) -> (Vec<EditorEvent>, String) {
    let mut out = String::new();
    let events = editor.process(keys, Instant::now(), &NoHistory, &mut out);
    (events, out)
}

// ===== Editing Workflows =====

#[test]
fn test_type_left_delete() {
    let mut editor = LineEditor::new();
    type_keys(&mut editor, "ab");
    let (_, echo_out) = type_keys(&mut editor, "\x1b[D");
    assert_eq!(echo_out, echo::CURSOR_LEFT);
    let (_, echo_out) = type_keys(&mut editor, "\x1b[D\x1b[3~");
    assert_eq!(echo_out, format!("{}{}", echo::CURSOR_LEFT, echo::DELETE_CHARACTER));
    assert_eq!(editor.line(), "b");
    assert_eq!(editor.cursor(), 0);
}

#[test]
fn test_insert_in_middle() {
    let mut editor = LineEditor::new();
    type_keys(&mut editor, "ac\x1b[Db");
    assert_eq!(editor.line(), "abc");
    assert_eq!(editor.cursor(), 2);
    let (events, _) = type_keys(&mut editor, "\r");
    assert_eq!(
        events,
        vec![EditorEvent::LineCompleted {
            line: "abc".to_string()
        }]
    );
}

#[test]
fn test_ss3_cursor_keys() {
    // Application cursor mode sends ESC O x; the introducer is dropped either way.
    let mut editor = LineEditor::new();
    type_keys(&mut editor, "abc\x1bOD\x1bOH");
    assert_eq!(editor.cursor(), 0);
}

#[test]
fn test_unicode_line() {
    let mut editor = LineEditor::new();
    let (events, _) = type_keys(&mut editor, "héllo wörld\x7f\r");
    assert_eq!(
        events,
        vec![EditorEvent::LineCompleted {
            line: "héllo wörl".to_string()
        }]
    );
}

#[test]
fn test_event_kinds_for_session() {
    let mut editor = LineEditor::new();
    let (events, _) = type_keys(&mut editor, "x\x1b[24;80R\x03\r\x01");
    let kinds: Vec<EditorEventKind> = events.iter().map(EditorEventKind::from).collect();
    assert_eq!(
        kinds,
        vec![
            EditorEventKind::SizeChanged,
            EditorEventKind::Interrupt,
            EditorEventKind::LineCompleted,
            EditorEventKind::Exit,
        ]
    );
    assert_eq!(editor.size(), TerminalSize::new(80, 24));
}

#[test]
fn test_history_keeps_prefix_across_recalls() {
    let mut history = MemoryHistory::default();
    history.push("git status");
    history.push("make");
    history.push("git log");
    let mut editor = LineEditor::new();
    let mut out = String::new();
    let now = Instant::now();
    editor.process("git\x1b[A\x1b[A", now, &history, &mut out);
    assert_eq!(editor.line(), "git status");
    assert_eq!(editor.cursor(), 3);
}

// ===== Properties =====

fn key_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a"),
        Just("z"),
        Just(" "),
        Just("\x7f"),
        Just("\x08"),
        Just("\x1b[C"),
        Just("\x1b[D"),
        Just("\x1b[3~"),
        Just("\x1b[2~"),
        Just("\x1b[H"),
        Just("\x1b[F"),
        Just("\x1b[1;5C"),
        Just("\x1b[1;5D"),
        Just("\x1b[A"),
        Just("\x1b[B"),
    ]
}

proptest! {
    #[test]
    fn prop_cursor_stays_within_line(keys in proptest::collection::vec(key_strategy(), 0..64)) {
        let mut history = MemoryHistory::default();
        history.push("a z");
        history.push("zz a");
        let mut editor = LineEditor::new();
        let mut out = String::new();
        let now = Instant::now();
        for key in keys {
            editor.process(key, now, &history, &mut out);
            prop_assert!(editor.cursor() <= editor.line().chars().count());
        }
    }

    #[test]
    fn prop_plain_text_reproduced(text in "[ -~]{0,80}") {
        let mut editor = LineEditor::new();
        let mut out = String::new();
        let now = Instant::now();
        let mut events = Vec::new();
        for ch in text.chars() {
            events.extend(editor.process_char(ch, now, &NoHistory, &mut out));
        }
        prop_assert!(events.is_empty());
        let events = editor.process("\r", now, &NoHistory, &mut out);
        prop_assert_eq!(events, vec![EditorEvent::LineCompleted { line: text.clone() }]);
    }
}
