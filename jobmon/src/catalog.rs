//! Presentation metadata for job states.
//!
//! The table is a compile-time constant: every lookup is a `match`, so adding a
//! [`JobState`] without a descriptor fails to build.
use crate::events::JobState;
use std::{fmt, str::FromStr};

/// Color class used by dashboards to tag a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Neutral,
    Primary,
    Success,
    Danger,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Neutral,
        Severity::Primary,
        Severity::Success,
        Severity::Danger,
        Severity::Warning,
        Severity::Info,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Neutral => "neutral",
            Severity::Primary => "primary",
            Severity::Success => "success",
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language the labels are rendered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    ZhCn,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported locale `{0}`")]
pub struct ParseLocaleError(String);

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "zh" | "zh-cn" | "zh-hans" => Ok(Locale::ZhCn),
            _ => Err(ParseLocaleError(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusDescriptor {
    pub state: JobState,
    pub label: &'static str,
    pub severity: Severity,
}

pub struct StatusCatalog;

impl StatusCatalog {
    /// Describe `state` with English labels.
    pub const fn describe(state: JobState) -> StatusDescriptor {
        Self::describe_in(state, Locale::En)
    }

    pub const fn describe_in(state: JobState, locale: Locale) -> StatusDescriptor {
        StatusDescriptor {
            state,
            label: label(state, locale),
            severity: severity(state),
        }
    }

    /// Every descriptor for `locale`, in [`JobState::ALL`] order.
    pub fn all(locale: Locale) -> impl Iterator<Item = StatusDescriptor> {
        JobState::ALL
            .into_iter()
            .map(move |state| Self::describe_in(state, locale))
    }
}

const fn severity(state: JobState) -> Severity {
    match state {
        JobState::Waiting => Severity::Warning,
        JobState::Running => Severity::Primary,
        JobState::Success => Severity::Success,
        JobState::Failed => Severity::Danger,
        JobState::Stopped => Severity::Info,
    }
}

const fn label(state: JobState, locale: Locale) -> &'static str {
    match locale {
        Locale::En => match state {
            JobState::Waiting => "Waiting",
            JobState::Running => "Running",
            JobState::Success => "Success",
            JobState::Failed => "Failed",
            JobState::Stopped => "Stopped",
        },
        Locale::ZhCn => match state {
            JobState::Waiting => "等待中",
            JobState::Running => "运行中",
            JobState::Success => "成功",
            JobState::Failed => "失败",
            JobState::Stopped => "中止",
        },
    }
}
