use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

/// Enables raw mode so keystrokes reach the machine unbuffered and unechoed.
/// No-op when stdin is not a terminal or raw mode is already on.
pub fn enter_raw() {
    if stdin_is_tty() && !terminal::is_raw_mode_enabled().is_ok_and(|on| on) {
        terminal::enable_raw_mode().expect("failed to enable raw terminal");
    }
}

/// Restores cooked mode. No-op when raw mode is not on.
pub fn exit_raw() {
    if terminal::is_raw_mode_enabled().is_ok_and(|on| on) {
        terminal::disable_raw_mode().expect("failed to disable raw terminal");
    }
}

/// Keyboard endpoint over the interactive terminal. Key events are polled
/// without blocking and translated to the bytes an LC3 program expects.
///
/// Ctrl-C is never delivered as input; it sets the shared interrupt flag so
/// the run loop or debugger can react between instructions.
pub struct RawKeyboard {
    pending: VecDeque<u8>,
    interrupt: Arc<AtomicBool>,
}

impl RawKeyboard {
    pub fn new(interrupt: Arc<AtomicBool>) -> Self {
        RawKeyboard {
            pending: VecDeque::new(),
            interrupt,
        }
    }

    fn pump(&mut self) {
        while event::poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match (key.modifiers, key.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                    self.interrupt.store(true, Ordering::Relaxed);
                }
                (_, KeyCode::Enter) => self.pending.push_back(b'\n'),
                (_, KeyCode::Backspace) => self.pending.push_back(0x08),
                (_, KeyCode::Tab) => self.pending.push_back(b'\t'),
                (_, KeyCode::Esc) => self.pending.push_back(0x1B),
                (_, KeyCode::Char(ch)) if ch.is_ascii() => self.pending.push_back(ch as u8),
                _ => {}
            }
        }
    }
}

impl crate::runtime::Keyboard for RawKeyboard {
    fn read_byte(&mut self) -> Option<u8> {
        self.pump();
        self.pending.pop_front()
    }

    fn poll(&mut self) -> bool {
        self.pump();
        !self.pending.is_empty()
    }
}
