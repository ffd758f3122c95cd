use serde::{Deserialize, Serialize};

use super::plan::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub epic_id: Option<String>,
}

impl AcceptanceCriterion {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            story_id: None,
            epic_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stories: Vec<Story>,
}

/// Parsed design/engineering document: Epic → Story → AcceptanceCriterion/Task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedDocument {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub raw_text: String,
}

impl DedDocument {
    pub fn all_stories(&self) -> impl Iterator<Item = &Story> {
        self.epics.iter().flat_map(|e| e.stories.iter())
    }

    pub fn all_acceptance_criteria(&self) -> impl Iterator<Item = &AcceptanceCriterion> {
        self.all_stories().flat_map(|s| s.acceptance_criteria.iter())
    }

    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.all_stories().flat_map(|s| s.tasks.iter())
    }

    pub fn find_story(&self, story_id: &str) -> Option<&Story> {
        self.all_stories().find(|s| s.id == story_id)
    }
}
