use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use oradict_core::err::Result;

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, Dictionary, DictionaryQuery, DictionaryScope, RowExt},
    object::{CatalogObject, ObjectState},
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
};

use super::{load_rows, OracleSchema};

const JOBS_VIEW: &str = "ALL_SCHEDULER_JOBS";
const JOB_ARGS_VIEW: &str = "ALL_SCHEDULER_JOB_ARGS";

/// The run state reported by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Disabled,
    RetryScheduled,
    Scheduled,
    Running,
    Completed,
    Broken,
    Failed,
    Remote,
    Succeeded,
    ChainStalled,
}

impl JobState {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "DISABLED" => Self::Disabled,
            "RETRY SCHEDULED" | "RETRYSCHEDULED" => Self::RetryScheduled,
            "SCHEDULED" => Self::Scheduled,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "BROKEN" => Self::Broken,
            "FAILED" => Self::Failed,
            "REMOTE" => Self::Remote,
            "SUCCEEDED" => Self::Succeeded,
            "CHAIN_STALLED" => Self::ChainStalled,
            _ => return None,
        })
    }

    pub fn object_state(&self) -> ObjectState {
        match self {
            Self::Running => ObjectState::Active,
            Self::Broken | Self::ChainStalled | Self::Failed => ObjectState::Invalid,
            _ => ObjectState::Normal,
        }
    }
}

/// A job of the DBMS_SCHEDULER
#[derive(Debug)]
pub struct OracleSchedulerJob {
    dictionary: Dictionary,
    owner: String,
    name: String,
    sub_name: Option<String>,
    style: Option<String>,
    creator: Option<String>,
    program_name: Option<String>,
    job_type: Option<String>,
    action: RwLock<Option<String>>,
    number_of_arguments: i64,
    schedule_name: Option<String>,
    schedule_type: Option<String>,
    start_date: Option<String>,
    repeat_interval: Option<String>,
    end_date: Option<String>,
    job_class: Option<String>,
    enabled: bool,
    auto_drop: bool,
    restartable: bool,
    state: RwLock<Option<String>>,
    priority: i64,
    run_count: i64,
    max_runs: Option<i64>,
    failure_count: i64,
    max_failures: Option<i64>,
    retry_count: i64,
    last_start_date: Option<String>,
    last_run_duration: Option<String>,
    next_run_date: Option<String>,
    logging_level: Option<String>,
    system: bool,
    comments: Option<String>,
    arguments: OnceCell<Vec<Arc<OracleSchedulerJobArgument>>>,
}

impl OracleSchedulerJob {
    pub(crate) fn from_row(dictionary: Dictionary, owner: &str, row: &DataRow) -> Result<Self> {
        Ok(Self {
            dictionary,
            owner: row.get_string("OWNER").unwrap_or_else(|| owner.to_string()),
            name: row.require_string("JOB_NAME")?,
            sub_name: row.get_string("JOB_SUBNAME"),
            style: row.get_string("JOB_STYLE"),
            creator: row.get_string("JOB_CREATOR"),
            program_name: row.get_string("PROGRAM_NAME"),
            job_type: row.get_string("JOB_TYPE"),
            action: RwLock::new(row.get_string("JOB_ACTION")),
            number_of_arguments: row.get_i64("NUMBER_OF_ARGUMENTS"),
            schedule_name: row.get_string("SCHEDULE_NAME"),
            schedule_type: row.get_string("SCHEDULE_TYPE"),
            start_date: row.get_string("START_DATE"),
            repeat_interval: row.get_string("REPEAT_INTERVAL"),
            end_date: row.get_string("END_DATE"),
            job_class: row.get_string("JOB_CLASS"),
            enabled: row.get_flag("ENABLED"),
            auto_drop: row.get_flag("AUTO_DROP"),
            restartable: row.get_flag("RESTARTABLE"),
            state: RwLock::new(row.get_string_trimmed("STATE")),
            priority: row.get_i64("JOB_PRIORITY"),
            run_count: row.get_i64("RUN_COUNT"),
            max_runs: row.get_opt_i64("MAX_RUNS"),
            failure_count: row.get_i64("FAILURE_COUNT"),
            max_failures: row.get_opt_i64("MAX_FAILURES"),
            retry_count: row.get_i64("RETRY_COUNT"),
            last_start_date: row.get_string("LAST_START_DATE"),
            last_run_duration: row.get_string("LAST_RUN_DURATION"),
            next_run_date: row.get_string("NEXT_RUN_DATE"),
            logging_level: row.get_string("LOGGING_LEVEL"),
            system: row.get_flag("SYSTEM"),
            comments: row.get_string("COMMENTS"),
            arguments: OnceCell::new(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn job_type(&self) -> Option<&str> {
        self.job_type.as_deref()
    }

    pub fn number_of_arguments(&self) -> i64 {
        self.number_of_arguments
    }

    pub fn repeat_interval(&self) -> Option<&str> {
        self.repeat_interval.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// The last known scheduler state, eg `SCHEDULED`
    pub fn state(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn object_state(&self) -> ObjectState {
        self.state()
            .as_deref()
            .and_then(JobState::from_name)
            .map(|s| s.object_state())
            .unwrap_or(ObjectState::Unknown)
    }

    /// Re-reads the state of the job from the scheduler.
    /// The previous state is kept when the job is no longer listed.
    pub fn refresh_state(&self, progress: &Progress) -> Result<Option<String>> {
        progress.sub_task(&format!("Refresh state of job '{}'", self.name));

        if let Some(state) = self.query_column(progress, "STATE")? {
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
        }

        Ok(self.state())
    }

    /// The job action, loaded from the scheduler when the listing omitted it.
    /// Without a progress handle only the known action is returned.
    pub fn definition_text(&self, progress: Option<&Progress>) -> Result<Option<String>> {
        let known = self
            .action
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let progress = match (known, progress) {
            (Some(action), _) => return Ok(Some(action)),
            (None, None) => return Ok(None),
            (None, Some(progress)) => progress,
        };

        progress.sub_task(&format!("Load action for job '{}'", self.name));
        let loaded = self.query_column(progress, "JOB_ACTION")?;

        let mut action = self.action.write().unwrap_or_else(PoisonError::into_inner);
        if action.is_none() {
            *action = loaded;
        }

        Ok(action.clone())
    }

    /// Selects a column of this job's scheduler row, joining multi-line results
    fn query_column(&self, progress: &Progress, col: &str) -> Result<Option<String>> {
        let rows = self.dictionary.query(
            progress,
            &DictionaryQuery::new(JOBS_VIEW)
                .filter("OWNER", self.owner.as_str())
                .filter("JOB_NAME", self.name.as_str()),
        )?;

        let lines = rows
            .iter()
            .take_while(|_| !progress.is_cancelled())
            .filter_map(|row| row.get_string(col))
            .collect::<Vec<_>>();

        Ok(if lines.is_empty() {
            None
        } else {
            Some(lines.concat())
        })
    }

    /// The arguments of the job ordered by position, loaded once
    pub fn get_arguments(
        &self,
        progress: &Progress,
    ) -> Result<Vec<Arc<OracleSchedulerJobArgument>>> {
        self.arguments
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    &self.dictionary,
                    DictionaryQuery::new(JOB_ARGS_VIEW)
                        .filter("OWNER", self.owner.as_str())
                        .filter("JOB_NAME", self.name.as_str())
                        .order_by("ARGUMENT_POSITION"),
                    OracleSchedulerJobArgument::from_row,
                )
            })
            .map(Clone::clone)
    }

    /// The anonymous block which starts the job in a background session
    pub fn run_script(&self) -> String {
        format!(
            "BEGIN\n\tDBMS_SCHEDULER.RUN_JOB(JOB_NAME => '{}.{}', USE_CURRENT_SESSION => FALSE);\nEND;",
            self.owner, self.name
        )
    }
}

catalog_object!(OracleSchedulerJob, "job");

type P = PropertyDescriptor<OracleSchedulerJob, OracleSchema>;

lazy_static! {
    static ref SCHEDULER_JOB_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |j, _| Ok(j.name.as_str().into())),
        P::new("owner", "Owner", 9, |j, _| Ok(j.owner.as_str().into())).hidden(),
        P::new("sub_name", "Job Sub Name", 10, |j, _| Ok(j.sub_name.as_deref().into())),
        P::new("style", "Job Style", 11, |j, _| Ok(j.style.as_deref().into())),
        P::new("creator", "Job Creator", 12, |j, _| Ok(j.creator.as_deref().into())).hidden(),
        P::new("program_name", "Program Name", 16, |j, _| {
            Ok(j.program_name.as_deref().into())
        })
        .hidden(),
        P::new("job_type", "Job Type", 17, |j, _| Ok(j.job_type().into())),
        P::new("action", "Job Action", 18, |j, ctx| {
            Ok(j.definition_text(ctx.progress)?.into())
        })
        .hidden(),
        P::new("arguments", "Number Of Arguments", 19, |j, _| {
            Ok(j.number_of_arguments.into())
        })
        .hidden(),
        P::new("schedule_name", "Schedule Name", 21, |j, _| {
            Ok(j.schedule_name.as_deref().into())
        })
        .hidden(),
        P::new("schedule_type", "Schedule Type", 22, |j, _| {
            Ok(j.schedule_type.as_deref().into())
        }),
        P::new("start_date", "Start Date", 23, |j, _| Ok(j.start_date.as_deref().into())),
        P::new("repeat_interval", "Repeat Interval", 24, |j, _| {
            Ok(j.repeat_interval().into())
        }),
        P::new("end_date", "End Date", 32, |j, _| Ok(j.end_date.as_deref().into())),
        P::new("job_class", "Job Class", 33, |j, _| Ok(j.job_class.as_deref().into())).hidden(),
        P::new("enabled", "Enabled", 34, |j, _| Ok(j.enabled.into())).hidden(),
        P::new("auto_drop", "Auto Drop", 35, |j, _| Ok(j.auto_drop.into())).hidden(),
        P::new("restartable", "Restartable", 36, |j, _| Ok(j.restartable.into())).hidden(),
        P::new("state", "State", 37, |j, _| Ok(j.state().into())).hidden(),
        P::new("priority", "Job Priority", 38, |j, _| Ok(j.priority.into())).hidden(),
        P::new("run_count", "Run Count", 39, |j, _| Ok(j.run_count.into())).hidden(),
        P::new("max_runs", "Max Runs", 40, |j, _| Ok(j.max_runs.into())).hidden(),
        P::new("failure_count", "Failure Count", 41, |j, _| Ok(j.failure_count.into())).hidden(),
        P::new("max_failures", "Max Failures", 42, |j, _| Ok(j.max_failures.into())).hidden(),
        P::new("retry_count", "Retry Count", 43, |j, _| Ok(j.retry_count.into())).hidden(),
        P::new("last_start_date", "Last Start Date", 44, |j, _| {
            Ok(j.last_start_date.as_deref().into())
        })
        .hidden(),
        P::new("last_run_duration", "Last Run Duration", 45, |j, _| {
            Ok(j.last_run_duration.as_deref().into())
        })
        .hidden(),
        P::new("next_run_date", "Next Run Date", 46, |j, _| {
            Ok(j.next_run_date.as_deref().into())
        })
        .hidden(),
        P::new("logging_level", "Logging Level", 49, |j, _| {
            Ok(j.logging_level.as_deref().into())
        })
        .hidden(),
        P::new("system", "System", 53, |j, _| Ok(j.system.into())).hidden(),
        P::new("comments", "Description", 200, |j, _| Ok(j.comments().into())).hidden(),
    ];
}

impl PropertySource for OracleSchedulerJob {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        SCHEDULER_JOB_PROPERTIES.as_slice()
    }
}

/// A value passed to a scheduler job
#[derive(Debug)]
pub struct OracleSchedulerJobArgument {
    name: Option<String>,
    position: i64,
    type_name: Option<String>,
    value: Option<String>,
    out_argument: bool,
}

impl OracleSchedulerJobArgument {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.get_string_trimmed("ARGUMENT_NAME"),
            position: row.get_i64("ARGUMENT_POSITION"),
            type_name: row.get_string("ARGUMENT_TYPE"),
            value: row.get_string("VALUE"),
            out_argument: row.get_flag("OUT_ARGUMENT"),
        })
    }

    /// Positional arguments have no name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_out_argument(&self) -> bool {
        self.out_argument
    }
}

type AP = PropertyDescriptor<OracleSchedulerJobArgument, OracleSchedulerJob>;

lazy_static! {
    static ref JOB_ARGUMENT_PROPERTIES: Vec<AP> = vec![
        AP::new("name", "Name", 1, |a, _| Ok(a.name().into())),
        AP::new("position", "Position", 2, |a, _| Ok(a.position.into())),
        AP::new("type", "Type", 3, |a, _| Ok(a.type_name().into())),
        AP::new("value", "Value", 4, |a, _| Ok(a.value().into())),
        AP::new("out", "Out", 5, |a, _| Ok(a.out_argument.into())).hidden(),
    ];
}

impl PropertySource for OracleSchedulerJobArgument {
    type Scope = OracleSchedulerJob;

    fn properties() -> &'static [AP] {
        JOB_ARGUMENT_PROPERTIES.as_slice()
    }
}

/// Lists the scheduler jobs owned by a schema
pub struct SchedulerJobLoader;

impl CacheLoader for SchedulerJobLoader {
    type Owner = OracleSchema;
    type Object = OracleSchedulerJob;

    const DESCRIPTION: &'static str = "scheduler jobs";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(JOBS_VIEW)
            .filter("OWNER", owner.name())
            .order_by("JOB_NAME")
    }

    fn fetch(&self, owner: &OracleSchema, row: &DataRow) -> Result<OracleSchedulerJob> {
        OracleSchedulerJob::from_row(owner.dictionary().clone(), owner.name(), row)
    }
}
