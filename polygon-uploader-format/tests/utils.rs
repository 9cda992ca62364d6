#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{anyhow, Error};
use polygon_uploader_format::*;

/// A prompt that answers with a fixed list of choices, remembering the reasons it was shown.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<RecoveryChoice>>>,
    pub reasons: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new<I: IntoIterator<Item = RecoveryChoice>>(answers: I) -> ScriptedPrompt {
        ScriptedPrompt {
            answers: Rc::new(RefCell::new(answers.into_iter().collect())),
            reasons: Default::default(),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.reasons.borrow().clone()
    }
}

impl RecoveryPrompt for ScriptedPrompt {
    fn ask(&mut self, reason: &str) -> Result<RecoveryChoice, Error> {
        self.reasons.borrow_mut().push(reason.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("Unexpected question: {}", reason))
    }
}

pub fn test(content: &str) -> TestDescriptor {
    TestDescriptor::from_memory(content, format!("memory: {}", content.trim()))
}

pub fn tests(count: usize) -> Vec<TestDescriptor> {
    (1..=count).map(|i| test(&format!("{}\n", i))).collect()
}

pub fn options(recovery: ErrorRecoveryPolicy) -> UploadOptions {
    UploadOptions {
        recovery,
        ..Default::default()
    }
}
