//! Breakpoint requests as handed over by the front-end

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::{DocumentRef, LocationKind};

/// When a breakpoint condition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStyle {
    /// Break when the expression evaluates to true
    #[default]
    WhenTrue,
    /// Break when the value of the expression changes
    WhenChanged,
}

/// Breakpoint condition expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub style: ConditionStyle,
    pub expression: String,
}

impl Condition {
    pub fn when_true(expression: impl Into<String>) -> Self {
        Self {
            style: ConditionStyle::WhenTrue,
            expression: expression.into(),
        }
    }

    pub fn when_changed(expression: impl Into<String>) -> Self {
        Self {
            style: ConditionStyle::WhenChanged,
            expression: expression.into(),
        }
    }
}

/// How the hit count is compared against the pass count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassCountStyle {
    Equal,
    EqualOrGreater,
    Mod,
}

/// Break after a number of hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassCount {
    pub style: PassCountStyle,
    pub count: u32,
}

impl PassCount {
    pub fn new(style: PassCountStyle, count: u32) -> Self {
        Self { style, count }
    }
}

/// Renders as a hit condition expression: `==N`, `>=N` or `%N`
impl fmt::Display for PassCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            PassCountStyle::Equal => write!(f, "=={}", self.count),
            PassCountStyle::EqualOrGreater => write!(f, ">={}", self.count),
            PassCountStyle::Mod => write!(f, "%{}", self.count),
        }
    }
}

/// Everything the front-end says about a breakpoint it wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointRequest {
    /// Language the breakpoint is meant for
    pub language: String,
    /// Kind of location `document` refers to
    pub kind: LocationKind,
    /// Front-end reference to the location
    pub document: DocumentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_count: Option<PassCount>,
    /// Initial lifecycle state
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl BreakpointRequest {
    pub fn new(language: impl Into<String>, kind: LocationKind, document: DocumentRef) -> Self {
        Self {
            language: language.into(),
            kind,
            document,
            condition: None,
            pass_count: None,
            enabled: true,
        }
    }

    /// Request for a source file and line
    pub fn file_line(language: impl Into<String>, document: DocumentRef) -> Self {
        Self::new(language, LocationKind::FileLine, document)
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_pass_count(mut self, pass_count: PassCount) -> Self {
        self.pass_count = Some(pass_count);
        self
    }

    /// Start the breakpoint out disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
