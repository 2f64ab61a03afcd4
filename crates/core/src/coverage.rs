//! Line coverage as seen by the mutation engine.
//!
//! The engine only needs to know which source lines some test executes; instructions on
//! lines nobody reaches are not worth mutating. [`CoverageDatabase`] is the narrow view the
//! engine consumes and [`InMemoryCoverage`] a map-backed implementation of it.

use crate::HexArray;
use crate::instruction::Instruction;
use crate::method::{ClassName, Method};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::{BTreeMap, BTreeSet};

/// A test that executed some code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestInfo {
    pub name: String,
    /// Wall-clock time of the test run in milliseconds.
    pub time_ms: u64,
}

impl TestInfo {
    pub fn new(name: impl Into<String>, time_ms: u64) -> Self {
        Self {
            name: name.into(),
            time_ms,
        }
    }
}

/// One source line of one class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassLine {
    pub class: ClassName,
    pub line: u32,
}

impl ClassLine {
    pub fn new(class: impl Into<ClassName>, line: u32) -> Self {
        Self {
            class: class.into(),
            line,
        }
    }
}

/// Static facts about a class: its name and the lines that carry code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: ClassName,
    pub code_lines: BTreeSet<u32>,
}

impl ClassInfo {
    pub fn number_of_code_lines(&self) -> usize {
        self.code_lines.len()
    }
}

/// Read-only view of a coverage run.
pub trait CoverageDatabase: Send + Sync {
    /// Class facts for the known classes among `classes`.
    fn class_info(&self, classes: &[ClassName]) -> Vec<ClassInfo>;

    /// Number of distinct lines executed by at least one test across `classes`.
    fn number_of_covered_lines(&self, classes: &[ClassName]) -> usize;

    /// Tests that executed any line of `class`, sorted and deduplicated.
    fn tests_for_class(&self, class: &ClassName) -> Vec<TestInfo>;

    /// Tests that executed exactly this line.
    fn tests_for_class_line(&self, class_line: &ClassLine) -> Vec<TestInfo>;

    /// Fingerprint of the set of tests covering `class`.
    ///
    /// Equal test sets give equal fingerprints regardless of recording order.
    fn coverage_id_for_class(&self, class: &ClassName) -> HexArray<32> {
        let names: BTreeSet<String> = self
            .tests_for_class(class)
            .into_iter()
            .map(|test| test.name)
            .collect();
        let mut hasher = Sha3_256::new();
        for name in names {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        HexArray(digest)
    }
}

/// Coverage held in ordered maps, filled by [`InMemoryCoverage::record`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryCoverage {
    classes: BTreeMap<ClassName, BTreeSet<u32>>,
    lines: BTreeMap<ClassLine, BTreeSet<TestInfo>>,
}

impl InMemoryCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a class and its code lines without marking anything covered.
    pub fn add_class(
        &mut self,
        class: impl Into<ClassName>,
        code_lines: impl IntoIterator<Item = u32>,
    ) {
        self.classes
            .entry(class.into())
            .or_default()
            .extend(code_lines);
    }

    /// Records that `test` executed `class_line`. The line becomes a code line of its
    /// class if it was not declared already.
    pub fn record(&mut self, test: TestInfo, class_line: ClassLine) {
        self.classes
            .entry(class_line.class.clone())
            .or_default()
            .insert(class_line.line);
        self.lines.entry(class_line).or_default().insert(test);
    }

    /// Whether some test executed the line.
    pub fn is_covered(&self, class_line: &ClassLine) -> bool {
        self.lines
            .get(class_line)
            .is_some_and(|tests| !tests.is_empty())
    }

    fn lines_of<'a>(
        &'a self,
        class: &'a ClassName,
    ) -> impl Iterator<Item = (&'a ClassLine, &'a BTreeSet<TestInfo>)> {
        self.lines
            .iter()
            .filter(move |(class_line, _)| &class_line.class == class)
    }
}

impl CoverageDatabase for InMemoryCoverage {
    fn class_info(&self, classes: &[ClassName]) -> Vec<ClassInfo> {
        classes
            .iter()
            .filter_map(|name| {
                self.classes.get(name).map(|lines| ClassInfo {
                    name: name.clone(),
                    code_lines: lines.clone(),
                })
            })
            .collect()
    }

    fn number_of_covered_lines(&self, classes: &[ClassName]) -> usize {
        let wanted: BTreeSet<&ClassName> = classes.iter().collect();
        self.lines
            .iter()
            .filter(|(class_line, tests)| wanted.contains(&class_line.class) && !tests.is_empty())
            .count()
    }

    fn tests_for_class(&self, class: &ClassName) -> Vec<TestInfo> {
        let tests: BTreeSet<&TestInfo> = self.lines_of(class).flat_map(|(_, tests)| tests).collect();
        tests.into_iter().cloned().collect()
    }

    fn tests_for_class_line(&self, class_line: &ClassLine) -> Vec<TestInfo> {
        self.lines
            .get(class_line)
            .map(|tests| tests.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Indices of the instructions of `method` that sit on a line no test executes.
///
/// Instructions before the first line marker have no line and are kept.
pub fn uncovered_indices(method: &Method, coverage: &dyn CoverageDatabase) -> BTreeSet<usize> {
    let class = &method.location.class;
    let mut current: Option<bool> = None;
    let mut skipped = BTreeSet::new();
    for (index, instruction) in method.instructions.iter().enumerate() {
        if let Instruction::Line(line) = instruction {
            let class_line = ClassLine::new(class.clone(), *line);
            current = Some(!coverage.tests_for_class_line(&class_line).is_empty());
        }
        if current == Some(false) {
            skipped.insert(index);
        }
    }
    tracing::debug!(
        "{} of {} instructions in {} lie on uncovered lines",
        skipped.len(),
        method.instructions.len(),
        method.location
    );
    skipped
}
