//! Record store — directory-backed point record collections.
//!
//! Layout: `<condition root>/<subject>/<n>_point.txt`, one subdirectory per
//! subject (directory name = subject id), one record file per recorded design
//! point, numbered by the recording software. Subjects are walked in lexical
//! order and points in numeric order, so collection building is
//! deterministic.
//!
//! Solution files (the solver's own persisted artifacts) are intentionally
//! not read here — external collaborators evaluate them and append to the
//! textual records through the `CorrectionSource`/`SettingsSource` hooks.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use designlab_core::domain::{DesignPoint, PointSet, SubjectId};

use crate::corrector::Correction;
use crate::records::{PointRecord, RecordError, Settings};

const RECORD_SUFFIX: &str = "_point.txt";

/// External collaborator that can correct a stored point's performance
/// (typically by loading the persisted solution and re-solving nominally).
pub trait CorrectionSource {
    fn correct(&self, subject: &SubjectId, point_index: u32) -> anyhow::Result<Correction>;
}

/// External collaborator that can recover the interface settings behind a
/// stored point whose settings line is still `unknown`.
pub trait SettingsSource {
    fn settings(&self, subject: &SubjectId, point_index: u32) -> anyhow::Result<Vec<f64>>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad record {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
    #[error("record {path} has no correction and no correction source was given")]
    MissingCorrection { path: PathBuf },
    #[error("correction source failed for {subject} point {point_index}: {source}")]
    Source {
        subject: SubjectId,
        point_index: u32,
        #[source]
        source: anyhow::Error,
    },
}

/// An attributed collection built from one condition's records.
#[derive(Debug, Clone, Default)]
pub struct ConditionData {
    /// Point → owning subjects, across the whole condition.
    pub point_owners: PointSet,
    /// Per-subject point sequences, in recording order.
    pub subject_points: BTreeMap<SubjectId, Vec<DesignPoint>>,
    /// Recording index of each (subject, point) pair, keyed in sequence
    /// order alongside `subject_points`.
    pub subject_sequence: BTreeMap<SubjectId, Vec<u32>>,
    /// Recording indices of points excluded as `SKIP` (still counted here).
    pub skipped: BTreeMap<SubjectId, Vec<u32>>,
}

impl ConditionData {
    pub fn subjects(&self) -> impl Iterator<Item = &SubjectId> {
        self.subject_points.keys()
    }

    pub fn subject_count(&self) -> usize {
        self.subject_points.len()
    }
}

/// Directory-backed store for one condition.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subject ids, lexically sorted (one per subdirectory).
    pub fn subjects(&self) -> Result<Vec<SubjectId>, StoreError> {
        let mut subjects = Vec::new();
        for entry in read_dir(&self.root)? {
            let entry = entry.map_err(|e| io_err(&self.root, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| io_err(&entry.path(), e))?
                .is_dir();
            if is_dir {
                subjects.push(SubjectId::new(entry.file_name().to_string_lossy()));
            }
        }
        subjects.sort();
        Ok(subjects)
    }

    /// Recording indices for one subject, numerically sorted.
    pub fn point_indices(&self, subject: &SubjectId) -> Result<Vec<u32>, StoreError> {
        let dir = self.subject_dir(subject);
        let mut indices = Vec::new();
        for entry in read_dir(&dir)? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(prefix) = name.strip_suffix(RECORD_SUFFIX) {
                if let Ok(index) = prefix.parse::<u32>() {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    pub fn record_path(&self, subject: &SubjectId, point_index: u32) -> PathBuf {
        self.subject_dir(subject)
            .join(format!("{point_index}{RECORD_SUFFIX}"))
    }

    pub fn read_record(
        &self,
        subject: &SubjectId,
        point_index: u32,
    ) -> Result<PointRecord, StoreError> {
        let path = self.record_path(subject, point_index);
        let text = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        PointRecord::parse(&text).map_err(|source| StoreError::Record {
            path: path.clone(),
            source,
        })
    }

    pub fn write_record(
        &self,
        subject: &SubjectId,
        point_index: u32,
        record: &PointRecord,
    ) -> Result<(), StoreError> {
        let path = self.record_path(subject, point_index);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        fs::write(&path, record.to_text()).map_err(|e| io_err(&path, e))
    }

    /// Build the collection from raw recorded performance values.
    pub fn load_raw(&self) -> Result<ConditionData, StoreError> {
        let mut data = ConditionData::default();
        for subject in self.subjects()? {
            let points = data.subject_points.entry(subject.clone()).or_default();
            let sequence = data.subject_sequence.entry(subject.clone()).or_default();
            data.skipped.entry(subject.clone()).or_default();

            for index in self.point_indices(&subject)? {
                let record = self.read_record(&subject, index)?;
                data.point_owners.add(record.point, subject.clone());
                points.push(record.point);
                sequence.push(index);
            }
        }
        Ok(data)
    }

    /// Build the collection from corrected performance values.
    ///
    /// Records without a stored correction are corrected through `source` and
    /// the result is appended to the record file, so the constrained re-solve
    /// happens at most once per point across all analysis passes. With no
    /// source, an uncorrected record is an error. `SKIP` records land in
    /// `skipped` and nowhere else.
    pub fn load_corrected(
        &self,
        source: Option<&dyn CorrectionSource>,
    ) -> Result<ConditionData, StoreError> {
        let mut data = ConditionData::default();
        for subject in self.subjects()? {
            let points = data.subject_points.entry(subject.clone()).or_default();
            let sequence = data.subject_sequence.entry(subject.clone()).or_default();
            let skipped = data.skipped.entry(subject.clone()).or_default();

            for index in self.point_indices(&subject)? {
                let mut record = self.read_record(&subject, index)?;

                if record.correction.is_none() {
                    let Some(source) = source else {
                        return Err(StoreError::MissingCorrection {
                            path: self.record_path(&subject, index),
                        });
                    };
                    let correction =
                        source
                            .correct(&subject, index)
                            .map_err(|e| StoreError::Source {
                                subject: subject.clone(),
                                point_index: index,
                                source: e,
                            })?;
                    record.correction = Some(correction);
                    self.write_record(&subject, index, &record)?;
                }

                match record.corrected_point() {
                    Some(point) => {
                        data.point_owners.add(point, subject.clone());
                        points.push(point);
                        sequence.push(index);
                    }
                    None => skipped.push(index),
                }
            }
        }
        Ok(data)
    }

    /// Backfill `unknown` settings lines through `source`. Returns the number
    /// of records rewritten.
    pub fn fill_settings(&self, source: &dyn SettingsSource) -> Result<usize, StoreError> {
        let mut rewritten = 0;
        for subject in self.subjects()? {
            for index in self.point_indices(&subject)? {
                let mut record = self.read_record(&subject, index)?;
                if record.settings != Settings::Unknown {
                    continue;
                }
                let values =
                    source
                        .settings(&subject, index)
                        .map_err(|e| StoreError::Source {
                            subject: subject.clone(),
                            point_index: index,
                            source: e,
                        })?;
                record.settings = Settings::Values(values);
                self.write_record(&subject, index, &record)?;
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    fn subject_dir(&self, subject: &SubjectId) -> PathBuf {
        self.root.join(subject.as_str())
    }
}

fn read_dir(path: &Path) -> Result<fs::ReadDir, StoreError> {
    fs::read_dir(path).map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
