//! Project templates and the catalog the generator reads them from.

use crate::error::{ScheduleError, ScheduleResult};
use crate::task::MAX_DURATION_DAYS;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const GENERAL_CONTRACTOR: &str = "general-contractor";

/// Crew assigned to sub-tasks of a phase, matched case-insensitively.
const PHASE_RESOURCES: &[(&str, &str)] = &[
    ("planning", "project-manager"),
    ("permits", "project-manager"),
    ("design", "designer"),
    ("site preparation", "excavation-crew"),
    ("excavation", "excavation-crew"),
    ("demolition", "demolition-crew"),
    ("foundation", "concrete-crew"),
    ("framing", "framing-crew"),
    ("roofing", "roofing-crew"),
    ("plumbing", "plumber"),
    ("electrical", "electrician"),
    ("hvac", "hvac-technician"),
    ("insulation", "insulation-crew"),
    ("drywall", "drywall-crew"),
    ("cabinets", "carpenter"),
    ("cabinet installation", "carpenter"),
    ("trim", "carpenter"),
    ("decking", "carpenter"),
    ("countertops", "countertop-installer"),
    ("tile", "tile-setter"),
    ("tiling", "tile-setter"),
    ("flooring", "flooring-installer"),
    ("fixtures", "plumber"),
    ("appliances", "appliance-installer"),
    ("painting", "painter"),
    ("landscaping", "landscaper"),
    ("inspection", "inspector"),
    ("final inspection", "inspector"),
    ("cleanup", GENERAL_CONTRACTOR),
];

/// Resource type for a phase name; unknown phases go to the general
/// contractor.
pub fn resource_for_phase(phase_name: &str) -> &'static str {
    let key = phase_name.trim().to_ascii_lowercase();
    PHASE_RESOURCES
        .iter()
        .find(|(phase, _)| *phase == key)
        .map(|(_, resource)| *resource)
        .unwrap_or(GENERAL_CONTRACTOR)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTemplate {
    pub name: String,
    pub estimated_duration: i64,
    /// Names of phases that must finish before this one starts.
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub order: u32,
    #[serde(default)]
    pub description: String,
}

impl PhaseTemplate {
    pub fn new(name: impl Into<String>, order: u32, estimated_duration: i64) -> Self {
        Self {
            name: name.into(),
            estimated_duration,
            dependencies: Vec::new(),
            order,
            description: String::new(),
        }
    }

    pub fn after(mut self, phase: impl Into<String>) -> Self {
        self.dependencies.push(phase.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub phases: Vec<PhaseTemplate>,
}

impl ProjectTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phases: Vec<PhaseTemplate>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            phases,
        }
    }

    pub fn total_estimated_days(&self) -> i64 {
        self.phases.iter().map(|p| p.estimated_duration).sum()
    }

    /// Phases in ascending `order`; equal orders keep declaration order.
    pub fn ordered_phases(&self) -> Vec<&PhaseTemplate> {
        let mut phases: Vec<&PhaseTemplate> = self.phases.iter().collect();
        phases.sort_by_key(|p| p.order);
        phases
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        if self.id.trim().is_empty() {
            return Err(ScheduleError::InvalidTemplate(format!(
                "template '{}' requires a non-empty id",
                self.name
            )));
        }
        let mut names = HashSet::with_capacity(self.phases.len());
        for phase in &self.phases {
            if phase.estimated_duration < 0 {
                return Err(ScheduleError::InvalidTemplate(format!(
                    "template {} phase '{}' has negative duration {}",
                    self.id, phase.name, phase.estimated_duration
                )));
            }
            if phase.estimated_duration > MAX_DURATION_DAYS {
                return Err(ScheduleError::InvalidTemplate(format!(
                    "template {} phase '{}' duration {} exceeds {MAX_DURATION_DAYS} days",
                    self.id, phase.name, phase.estimated_duration
                )));
            }
            if !names.insert(phase.name.as_str()) {
                return Err(ScheduleError::InvalidTemplate(format!(
                    "template {} repeats phase '{}'",
                    self.id, phase.name
                )));
            }
        }
        Ok(())
    }
}

/// Read-only registry of templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, ProjectTemplate>,
}

impl TemplateCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the standard residential templates.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for template in builtin_templates() {
            catalog.templates.insert(template.id.clone(), template);
        }
        catalog
    }

    /// Adds or replaces a template after validating it.
    pub fn register(&mut self, template: ProjectTemplate) -> ScheduleResult<()> {
        template.validate()?;
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> ScheduleResult<&ProjectTemplate> {
        self.templates
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownTemplate(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_templates() -> Vec<ProjectTemplate> {
    let mut kitchen = ProjectTemplate::new(
        "kitchen-remodel",
        "Kitchen Remodel",
        vec![
            PhaseTemplate::new("Planning", 1, 5).described("Measurements, layout and permits"),
            PhaseTemplate::new("Demolition", 2, 3)
                .after("Planning")
                .described("Remove cabinets, counters and flooring"),
            PhaseTemplate::new("Plumbing", 3, 4)
                .after("Demolition")
                .described("Rough-in supply and drain lines"),
            PhaseTemplate::new("Electrical", 4, 4)
                .after("Demolition")
                .described("Circuits for appliances and lighting"),
            PhaseTemplate::new("Drywall", 5, 5)
                .after("Plumbing")
                .after("Electrical")
                .described("Hang, tape and finish walls"),
            PhaseTemplate::new("Cabinets", 6, 4)
                .after("Drywall")
                .described("Install base and wall cabinets"),
            PhaseTemplate::new("Countertops", 7, 3)
                .after("Cabinets")
                .described("Template, fabricate and set counters"),
            PhaseTemplate::new("Flooring", 8, 3)
                .after("Drywall")
                .described("Lay finished floor"),
            PhaseTemplate::new("Painting", 9, 3)
                .after("Countertops")
                .after("Flooring")
                .described("Prime and paint walls and trim"),
            PhaseTemplate::new("Final Inspection", 10, 1)
                .after("Painting")
                .described("Walkthrough and punch list"),
        ],
    );
    kitchen.description = "Full kitchen renovation with new cabinets and counters".into();

    let mut bathroom = ProjectTemplate::new(
        "bathroom-remodel",
        "Bathroom Remodel",
        vec![
            PhaseTemplate::new("Planning", 1, 3),
            PhaseTemplate::new("Demolition", 2, 2).after("Planning"),
            PhaseTemplate::new("Plumbing", 3, 5).after("Demolition"),
            PhaseTemplate::new("Electrical", 4, 2).after("Demolition"),
            PhaseTemplate::new("Drywall", 5, 3).after("Plumbing").after("Electrical"),
            PhaseTemplate::new("Tile", 6, 5).after("Drywall"),
            PhaseTemplate::new("Fixtures", 7, 2).after("Tile"),
            PhaseTemplate::new("Painting", 8, 2).after("Tile"),
            PhaseTemplate::new("Final Inspection", 9, 1)
                .after("Fixtures")
                .after("Painting"),
        ],
    );
    bathroom.description = "Bathroom gut and rebuild".into();

    let mut home = ProjectTemplate::new(
        "new-home-construction",
        "New Home Construction",
        vec![
            PhaseTemplate::new("Permits", 1, 10),
            PhaseTemplate::new("Site Preparation", 2, 5).after("Permits"),
            PhaseTemplate::new("Foundation", 3, 10).after("Site Preparation"),
            PhaseTemplate::new("Framing", 4, 15).after("Foundation"),
            PhaseTemplate::new("Roofing", 5, 7).after("Framing"),
            PhaseTemplate::new("Plumbing", 6, 8).after("Framing"),
            PhaseTemplate::new("Electrical", 7, 8).after("Framing"),
            PhaseTemplate::new("HVAC", 8, 6).after("Framing"),
            PhaseTemplate::new("Insulation", 9, 4)
                .after("Roofing")
                .after("Plumbing")
                .after("Electrical")
                .after("HVAC"),
            PhaseTemplate::new("Drywall", 10, 10).after("Insulation"),
            PhaseTemplate::new("Flooring", 11, 6).after("Drywall"),
            PhaseTemplate::new("Painting", 12, 6).after("Drywall"),
            PhaseTemplate::new("Landscaping", 13, 5).after("Roofing"),
            PhaseTemplate::new("Final Inspection", 14, 2)
                .after("Flooring")
                .after("Painting")
                .after("Landscaping"),
        ],
    );
    home.description = "Single-family home from permits to occupancy".into();

    let mut deck = ProjectTemplate::new(
        "deck-addition",
        "Deck Addition",
        vec![
            PhaseTemplate::new("Permits", 1, 5),
            PhaseTemplate::new("Foundation", 2, 3).after("Permits"),
            PhaseTemplate::new("Framing", 3, 4).after("Foundation"),
            PhaseTemplate::new("Decking", 4, 3).after("Framing"),
            PhaseTemplate::new("Inspection", 5, 1).after("Decking"),
        ],
    );
    deck.description = "Attached wood deck with footings".into();

    vec![kitchen, bathroom, home, deck]
}
