//! Session Module
//! Owns every uploaded file and applies user actions to per-file state.
//!
//! The UI never mutates tables directly: each interaction becomes an
//! [`Action`], [`Session::apply`] turns it into a state change plus the
//! notices to show, and [`Session::view`] derives what a file card renders.

use crate::charts::ChartData;
use crate::config::AppConfig;
use crate::data::{DataLoader, DataProcessor, Projection, UploadedFile};
use crate::error::{Result, SweeperError};
use crate::export::{self, ConversionTarget, ExportArtifact};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::fmt;

/// Upload-order identifier of a file within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A banner shown next to a file (or for the whole session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Per-file widget state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileOptions {
    pub clean_enabled: bool,
    pub show_chart: bool,
    /// Columns kept for chart and export, in display order.
    pub selected_columns: Vec<String>,
    pub target: ConversionTarget,
}

enum TableState {
    Ready {
        /// Table as ingested, kept for [`Action::Reset`].
        original: DataFrame,
        /// Table after cleaning steps.
        working: DataFrame,
    },
    Rejected {
        reason: String,
    },
}

struct FileState {
    upload: UploadedFile,
    table: TableState,
    options: FileOptions,
    /// Notices produced by the most recent action on this file.
    last_notices: Vec<Notice>,
    artifact: Option<ExportArtifact>,
}

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCleaning(FileId, bool),
    RemoveDuplicates(FileId),
    FillMissing(FileId),
    SelectColumns(FileId, Vec<String>),
    SetShowChart(FileId, bool),
    SetTarget(FileId, ConversionTarget),
    Convert(FileId),
    Reset(FileId),
    Remove(FileId),
}

impl Action {
    pub fn file_id(&self) -> FileId {
        match self {
            Self::SetCleaning(id, _)
            | Self::RemoveDuplicates(id)
            | Self::FillMissing(id)
            | Self::SelectColumns(id, _)
            | Self::SetShowChart(id, _)
            | Self::SetTarget(id, _)
            | Self::Convert(id)
            | Self::Reset(id)
            | Self::Remove(id) => *id,
        }
    }
}

/// What an action produced.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub artifact: Option<ExportArtifact>,
}

impl Outcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            artifact: None,
        }
    }
}

/// Everything a file card needs to render.
#[derive(Debug, Clone)]
pub struct FileView {
    pub id: FileId,
    pub name: String,
    pub size_kb: f64,
    /// Set when the file could not be ingested; nothing else is populated.
    pub rejected: Option<String>,
    pub preview: Option<DataFrame>,
    /// Columns offered for selection; empty when the table has no rows.
    pub columns: Vec<String>,
    pub options: FileOptions,
    pub chart: Option<ChartData>,
    /// Standing warnings derived from the current state.
    pub warnings: Vec<Notice>,
    pub last_notices: Vec<Notice>,
    pub artifact: Option<ExportArtifact>,
}

/// All files uploaded in this run, in upload order.
pub struct Session {
    config: AppConfig,
    files: BTreeMap<FileId, FileState>,
    next_id: u64,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            files: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Ids of all files, in upload order.
    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Register an upload and ingest it once. Files that cannot be ingested
    /// stay listed with an error notice; they never affect other files.
    pub fn upload(&mut self, file: UploadedFile) -> FileId {
        let id = FileId(self.next_id);
        self.next_id += 1;

        let ingested = if file.size > self.config.max_upload_bytes {
            Err(SweeperError::FileTooLarge {
                name: file.name.clone(),
                size: file.size,
                limit: self.config.max_upload_bytes,
            })
        } else {
            DataLoader::ingest(&file, &self.config)
        };

        let (table, options, last_notices) = match ingested {
            Ok(df) => {
                let options = FileOptions {
                    selected_columns: DataProcessor::column_names(&df),
                    target: self.config.default_target,
                    ..Default::default()
                };
                let table = TableState::Ready {
                    original: df.clone(),
                    working: df,
                };
                (table, options, Vec::new())
            }
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "Rejected upload");
                let reason = err.to_string();
                let notice = Notice::error(reason.clone());
                (TableState::Rejected { reason }, FileOptions::default(), vec![notice])
            }
        };

        self.files.insert(
            id,
            FileState {
                upload: file,
                table,
                options,
                last_notices,
                artifact: None,
            },
        );
        id
    }

    /// Apply one action. Refusals (cleaning while disabled, an empty column
    /// selection) are reported as warnings; malformed requests and
    /// serialization failures are errors.
    pub fn apply(&mut self, action: Action) -> Result<Outcome> {
        let id = action.file_id();
        tracing::debug!(?action, "Applying action");

        let series_limit = self.config.chart_series_limit;
        let state = self.files.get_mut(&id).ok_or(SweeperError::UnknownFile(id))?;
        let name = state.upload.name.clone();
        let FileState {
            upload,
            table,
            options,
            last_notices,
            artifact,
        } = state;
        let tables = match table {
            TableState::Ready { original, working } => Some((original, working)),
            TableState::Rejected { .. } => None,
        };

        let outcome = match (action, tables) {
            (Action::Remove(_), _) => {
                self.files.remove(&id);
                tracing::info!(file = %name, "Removed file");
                return Ok(Outcome::notice(Notice::info(format!("Removed {}", name))));
            }
            (_, None) => return Err(SweeperError::Rejected(name)),
            (Action::SetCleaning(_, enabled), Some(_)) => {
                options.clean_enabled = enabled;
                Outcome::default()
            }
            (Action::RemoveDuplicates(_) | Action::FillMissing(_), Some(_))
                if !options.clean_enabled =>
            {
                tracing::warn!(file = %name, "Cleaning requested while disabled");
                Outcome::notice(Notice::warning(format!("Enable cleaning for {} first", name)))
            }
            (Action::RemoveDuplicates(_), Some((_, working))) => {
                let removed = DataProcessor::remove_duplicates(working)?;
                *artifact = None;
                Outcome::notice(Notice::success(format!(
                    "Duplicates removed! ({} rows dropped)",
                    removed
                )))
            }
            (Action::FillMissing(_), Some((_, working))) => {
                let filled = DataProcessor::fill_missing_numeric(working)?;
                *artifact = None;
                Outcome::notice(Notice::success(format!(
                    "Missing values have been filled! ({} cells)",
                    filled
                )))
            }
            (Action::SelectColumns(_, names), Some((_, working))) => {
                if let Some(unknown) = names.iter().find(|n| working.column(n.as_str()).is_err()) {
                    return Err(SweeperError::ColumnNotFound(unknown.clone()));
                }
                let refused = names.is_empty();
                options.selected_columns = names;
                *artifact = None;
                if refused {
                    tracing::warn!(file = %name, "Empty column selection refused");
                    Outcome::notice(Notice::warning("Please select at least one column!"))
                } else {
                    Outcome::default()
                }
            }
            (Action::SetShowChart(_, show), Some((_, working))) => {
                options.show_chart = show;
                let projected = project(working, &options.selected_columns)?;
                if show && DataProcessor::visualize_numeric(&projected, series_limit)?.is_none() {
                    Outcome::notice(Notice::warning(
                        "No numeric columns available for visualization!",
                    ))
                } else {
                    Outcome::default()
                }
            }
            (Action::SetTarget(_, target), Some(_)) => {
                options.target = target;
                *artifact = None;
                Outcome::default()
            }
            (Action::Convert(_), Some((_, working))) => {
                let projected = project(working, &options.selected_columns)?;
                let exported = export::export(&projected, upload, options.target)?;
                *artifact = Some(exported.clone());
                Outcome {
                    notices: vec![Notice::success(format!(
                        "{} converted to {}",
                        name,
                        options.target.label()
                    ))],
                    artifact: Some(exported),
                }
            }
            (Action::Reset(_), Some((original, working))) => {
                *working = original.clone();
                options.selected_columns = DataProcessor::column_names(original);
                *artifact = None;
                Outcome::notice(Notice::info(format!("{} restored to the uploaded data", name)))
            }
        };

        *last_notices = outcome.notices.clone();
        Ok(outcome)
    }

    /// Derive the render state of one file.
    pub fn view(&self, id: FileId) -> Result<FileView> {
        let state = self.files.get(&id).ok_or(SweeperError::UnknownFile(id))?;
        let mut view = FileView {
            id,
            name: state.upload.name.clone(),
            size_kb: state.upload.size_kb(),
            rejected: None,
            preview: None,
            columns: Vec::new(),
            options: state.options.clone(),
            chart: None,
            warnings: Vec::new(),
            last_notices: state.last_notices.clone(),
            artifact: state.artifact.clone(),
        };

        let working = match &state.table {
            TableState::Ready { working, .. } => working,
            TableState::Rejected { reason } => {
                view.rejected = Some(reason.clone());
                return Ok(view);
            }
        };

        view.preview = Some(DataProcessor::preview(working, self.config.preview_rows));
        if working.is_empty() {
            view.warnings
                .push(Notice::warning(format!("{} has no data!", state.upload.name)));
            return Ok(view);
        }

        view.columns = DataProcessor::column_names(working);
        if state.options.selected_columns.is_empty() {
            view.warnings
                .push(Notice::warning("Please select at least one column!"));
        }

        if state.options.show_chart {
            let projected = project(working, &state.options.selected_columns)?;
            match DataProcessor::visualize_numeric(&projected, self.config.chart_series_limit)? {
                Some(chart) => view.chart = Some(chart),
                None => view.warnings.push(Notice::warning(
                    "No numeric columns available for visualization!",
                )),
            }
        }

        Ok(view)
    }

    /// The table a conversion of `id` would export right now.
    pub fn projected_table(&self, id: FileId) -> Result<DataFrame> {
        let state = self.files.get(&id).ok_or(SweeperError::UnknownFile(id))?;
        match &state.table {
            TableState::Ready { working, .. } => project(working, &state.options.selected_columns),
            TableState::Rejected { .. } => Err(SweeperError::Rejected(state.upload.name.clone())),
        }
    }

    /// Session-wide banner: success once every uploaded file was ingested.
    pub fn summary(&self) -> Option<Notice> {
        let rejected = self
            .files
            .values()
            .filter(|f| matches!(f.table, TableState::Rejected { .. }))
            .count();

        if self.files.is_empty() {
            None
        } else if rejected == 0 {
            Some(Notice::success("🎉🥳 All files successfully processed!"))
        } else {
            Some(Notice::warning(format!(
                "{} of {} files could not be processed",
                rejected,
                self.files.len()
            )))
        }
    }
}

/// Apply the column selection; an empty selection keeps every column.
fn project(working: &DataFrame, selected: &[String]) -> Result<DataFrame> {
    let mut projected = working.clone();
    if DataProcessor::select_columns(&mut projected, selected)? == Projection::Refused {
        tracing::debug!("Empty selection, exporting all columns");
    }
    Ok(projected)
}
