//! Canonical review labels
//!
//! Every repository the bot manages carries exactly these four labels with
//! exactly these colors.

use gh_client::Label;

pub const WORK_IN_PROGRESS: &str = "work in progress";
pub const FIRST_APPROVAL: &str = "first approval";
pub const READY_FOR_REVIEW: &str = "ready for review";
pub const READY_TO_MERGE: &str = "ready to merge";

/// Template entries as (name, color)
const TEMPLATE: [(&str, &str); 4] = [
    (WORK_IN_PROGRESS, "0052cc"),
    (FIRST_APPROVAL, "bfe5bf"),
    (READY_FOR_REVIEW, "fef2c0"),
    (READY_TO_MERGE, "0e8a16"),
];

/// The fixed label template applied to every repository
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelTemplate;

impl LabelTemplate {
    /// Iterate over (name, color) pairs
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        TEMPLATE.into_iter()
    }

    /// Required color for a template label, if the name is part of the template
    pub fn color_of(&self, name: &str) -> Option<&'static str> {
        TEMPLATE
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, color)| *color)
    }

    pub fn labels(&self) -> Vec<Label> {
        self.entries()
            .map(|(name, color)| Label::new(name, color))
            .collect()
    }
}
