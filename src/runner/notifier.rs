//! Host test-framework reporting surface.

use crate::ScriptestError;
use std::fmt;

/// Reportable identity of one child, derivable without running it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Description {
    pub class_name: String,
    pub method_name: String,
}

impl Description {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.method_name, self.class_name)
    }
}

/// A child's failure and its cause
#[derive(Debug)]
pub struct Failure {
    pub description: Description,
    pub cause: ScriptestError,
}

impl Failure {
    pub fn new(description: Description, cause: ScriptestError) -> Self {
        Self { description, cause }
    }

    pub fn message(&self) -> String {
        self.cause.to_string()
    }
}

/// Receives lifecycle notifications for each child.
///
/// Every child gets exactly one started/finished pair and at most one
/// failure in between.
pub trait RunNotifier {
    fn fire_test_started(&mut self, description: &Description);

    fn fire_test_failure(&mut self, failure: Failure);

    fn fire_test_finished(&mut self, description: &Description);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    Started(Description),
    Failed(Description),
    Finished(Description),
}

/// Notifier that keeps every event, for hosts that report after the fact
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Vec<NotifierEvent>,
    failures: Vec<Failure>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[NotifierEvent] {
        &self.events
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Failure reported for the child named `method`, if any
    pub fn failure_for(&self, method: &str) -> Option<&Failure> {
        self.failures
            .iter()
            .find(|f| f.description.method_name == method)
    }

    pub fn started(&self) -> Vec<&str> {
        self.names(|e| match e {
            NotifierEvent::Started(d) => Some(d),
            _ => None,
        })
    }

    pub fn finished(&self) -> Vec<&str> {
        self.names(|e| match e {
            NotifierEvent::Finished(d) => Some(d),
            _ => None,
        })
    }

    fn names<'a>(&'a self, pick: impl Fn(&'a NotifierEvent) -> Option<&'a Description>) -> Vec<&'a str> {
        self.events
            .iter()
            .filter_map(pick)
            .map(|d| d.method_name.as_str())
            .collect()
    }
}

impl RunNotifier for RecordingNotifier {
    fn fire_test_started(&mut self, description: &Description) {
        self.events.push(NotifierEvent::Started(description.clone()));
    }

    fn fire_test_failure(&mut self, failure: Failure) {
        self.events
            .push(NotifierEvent::Failed(failure.description.clone()));
        self.failures.push(failure);
    }

    fn fire_test_finished(&mut self, description: &Description) {
        self.events.push(NotifierEvent::Finished(description.clone()));
    }
}
