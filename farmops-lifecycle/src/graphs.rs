//! The declared status graphs.

use crate::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

/// Test case status. `pass` and `fail` can be re-run back to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseStatus {
    Draft,
    Active,
    Pass,
    Fail,
}

impl Status for TestCaseStatus {
    const INITIAL: Self = Self::Draft;
    const ALL: &'static [Self] = &[Self::Draft, Self::Active, Self::Pass, Self::Fail];

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Active],
            Self::Active => &[Self::Pass, Self::Fail],
            Self::Pass | Self::Fail => &[Self::Active],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Signing document status. `signed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Signed,
}

impl Status for DocumentStatus {
    const INITIAL: Self = Self::Pending;
    const ALL: &'static [Self] = &[Self::Pending, Self::Signed];

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Signed],
            Self::Signed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Signed => "signed",
        }
    }
}

/// Job card status. A job must be started before it can be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Closed,
}

impl Status for JobStatus {
    const INITIAL: Self = Self::Open;
    const ALL: &'static [Self] = &[Self::Open, Self::InProgress, Self::Closed];

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress],
            Self::InProgress => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

/// Tyre condition. Wear only goes one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TyreCondition {
    New,
    PartWorn,
    Scrap,
}

impl Status for TyreCondition {
    const INITIAL: Self = Self::New;
    const ALL: &'static [Self] = &[Self::New, Self::PartWorn, Self::Scrap];

    fn successors(self) -> &'static [Self] {
        match self {
            Self::New => &[Self::PartWorn],
            Self::PartWorn => &[Self::Scrap],
            Self::Scrap => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PartWorn => "part_worn",
            Self::Scrap => "scrap",
        }
    }
}

display_as_str!(TestCaseStatus, DocumentStatus, JobStatus, TyreCondition);
