//! Type, hold, delete, next word: the hero heading's text cycle.

use crate::config::TypewriterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Typing,
    Holding,
    Deleting,
}

/// Visible state after one transition, and how long to wait for the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterStep {
    pub text: String,
    /// Cursor should pulse while a finished word is held.
    pub paused: bool,
    pub delay_ms: u32,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    words: Vec<Vec<char>>,
    typing_speed: u32,
    deleting_speed: u32,
    pause_time: u32,
    index: usize,
    chars: usize,
    stage: Stage,
    text: String,
}

impl Typewriter {
    /// `config.words` must be non-empty; `TypewriterConfig::from_json`
    /// guarantees that.
    pub fn new(config: &TypewriterConfig) -> Self {
        let mut words: Vec<Vec<char>> = config.words.iter().map(|w| w.chars().collect()).collect();
        if words.is_empty() {
            words.push(Vec::new());
        }
        Self {
            words,
            typing_speed: config.typing_speed,
            deleting_speed: config.deleting_speed,
            pause_time: config.pause_time,
            index: 0,
            chars: 0,
            stage: Stage::Typing,
            text: String::new(),
        }
    }

    /// Wait before the first `advance`.
    pub fn initial_delay(&self) -> u32 {
        self.typing_speed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self) -> TypewriterStep {
        let word_len = self.words[self.index].len();
        match self.stage {
            Stage::Typing if self.chars < word_len => {
                self.text.push(self.words[self.index][self.chars]);
                self.chars += 1;
                if self.chars == word_len {
                    self.hold()
                } else {
                    self.step(false, self.typing_speed)
                }
            }
            Stage::Typing => self.hold(),
            Stage::Holding => {
                self.stage = Stage::Deleting;
                self.step(false, self.deleting_speed)
            }
            Stage::Deleting => {
                if self.chars > 0 {
                    self.text.pop();
                    self.chars -= 1;
                }
                if self.chars == 0 {
                    self.stage = Stage::Typing;
                    self.index = (self.index + 1) % self.words.len();
                    self.step(false, self.typing_speed)
                } else {
                    self.step(false, self.deleting_speed)
                }
            }
        }
    }

    fn hold(&mut self) -> TypewriterStep {
        self.stage = Stage::Holding;
        self.step(true, self.pause_time)
    }

    fn step(&self, paused: bool, delay_ms: u32) -> TypewriterStep {
        TypewriterStep {
            text: self.text.clone(),
            paused,
            delay_ms,
        }
    }
}
