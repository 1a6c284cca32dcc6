//! Turns the nested part → entry → sub-question tree into one ordered list of
//! answerable units.

use std::collections::BTreeSet;
use tracing::warn;

use crate::error::{MalformedEntry, MalformedReason};
use crate::model::{
    AnswerableUnit, EntryShape, MediaRefs, Part, QuestionSnapshot, SectionMap, SectionTag,
    TestDefinition, TestQuestionEntry, TestQuestionId, UnitKey, UnitKind,
};

/// Output of a flattening pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub units: Vec<AnswerableUnit>,
    /// Entries skipped because of an inconsistent shape or a repeated id.
    pub malformed: Vec<MalformedEntry>,
}

impl Flattened {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Flattens test content using a section map to tag each unit.
pub struct Flattener<'a> {
    sections: &'a SectionMap,
}

impl<'a> Flattener<'a> {
    #[must_use]
    pub fn new(sections: &'a SectionMap) -> Self {
        Self { sections }
    }

    /// Emits units in (part id, entry position, sub-index) order with a 1-based
    /// `global_order`.
    ///
    /// Parts are stably sorted by id, so parts sharing an id keep their input
    /// order. Malformed entries are logged, reported and skipped, and so is any
    /// entry whose id was already emitted, keeping unit keys unique.
    #[must_use]
    pub fn flatten(&self, definition: &TestDefinition) -> Flattened {
        let mut parts: Vec<&Part> = definition.parts.iter().collect();
        parts.sort_by_key(|p| p.id);

        let mut out = Emitter {
            units: Vec::new(),
            next_order: 1,
        };
        let mut seen: BTreeSet<TestQuestionId> = BTreeSet::new();
        let mut malformed = Vec::new();

        for part in parts {
            let section = self.sections.tag_for(part.id);
            for entry in &part.entries {
                let origin = Origin {
                    part,
                    section: &section,
                    entry,
                };
                let shape = match entry.shape() {
                    None => {
                        malformed.push(origin.reject(MalformedReason::ShapeMismatch));
                        continue;
                    }
                    Some(_) if seen.contains(&entry.id) => {
                        malformed.push(origin.reject(MalformedReason::DuplicateEntry));
                        continue;
                    }
                    Some(shape) => shape,
                };
                seen.insert(entry.id);

                match shape {
                    EntryShape::Single(question) => {
                        out.emit(&origin, 0, UnitKind::Single, question, None);
                    }
                    EntryShape::Group(group) => {
                        for (idx, question) in group.questions.iter().enumerate() {
                            let sub_index = u32::try_from(idx).unwrap_or(u32::MAX);
                            out.emit(
                                &origin,
                                sub_index,
                                UnitKind::Group,
                                question,
                                Some((group.passage.as_ref(), &group.media)),
                            );
                        }
                    }
                }
            }
        }

        Flattened {
            units: out.units,
            malformed,
        }
    }
}

/// Where an entry sits in the definition.
struct Origin<'a> {
    part: &'a Part,
    section: &'a SectionTag,
    entry: &'a TestQuestionEntry,
}

impl Origin<'_> {
    fn reject(&self, reason: MalformedReason) -> MalformedEntry {
        warn!(
            part_id = %self.part.id,
            entry_id = %self.entry.id,
            is_group = self.entry.is_group,
            %reason,
            "skipping malformed test entry"
        );
        MalformedEntry {
            part_id: self.part.id,
            entry_id: self.entry.id,
            is_group: self.entry.is_group,
            reason,
        }
    }
}

struct Emitter {
    units: Vec<AnswerableUnit>,
    next_order: u32,
}

impl Emitter {
    fn emit(
        &mut self,
        origin: &Origin<'_>,
        sub_index: u32,
        kind: UnitKind,
        question: &QuestionSnapshot,
        group: Option<(Option<&String>, &MediaRefs)>,
    ) {
        let (passage, group_media) = match group {
            Some((passage, media)) => (passage.cloned(), media.clone()),
            None => (None, MediaRefs::default()),
        };

        self.units.push(AnswerableUnit {
            key: UnitKey::new(origin.entry.id, sub_index),
            global_order: self.next_order,
            kind,
            part_id: origin.part.id,
            part_name: origin.part.name.clone(),
            section: origin.section.clone(),
            content: question.content.clone(),
            passage,
            group_media,
            media: question.media.clone(),
            options: question.options.clone(),
            correct_label: question.correct_label().map(str::to_owned),
        });
        self.next_order = self.next_order.saturating_add(1);
    }
}
