//! Mapping between the core's types and the wire messages.
use jobmon::types::Timestamp;
use jobmon::{Error, JobId, JobRecord, JobState, Severity, StatusDescriptor, TransitionEvent};
use protobuf as pb;
use tonic::Status;

pub fn job_id(raw: String) -> Result<JobId, Status> {
    if raw.is_empty() {
        Err(Status::invalid_argument("job id must not be empty"))
    } else {
        Ok(JobId::from(raw))
    }
}

pub fn state_from_proto(raw: i32) -> Result<JobState, Status> {
    use pb::JobState::*;
    match pb::JobState::from_i32(raw) {
        Some(Waiting) => Ok(JobState::Waiting),
        Some(Running) => Ok(JobState::Running),
        Some(Success) => Ok(JobState::Success),
        Some(Failed) => Ok(JobState::Failed),
        Some(Stopped) => Ok(JobState::Stopped),
        None => Err(Status::invalid_argument(format!("unknown job state {}", raw))),
    }
}

pub fn state_to_proto(state: JobState) -> pb::JobState {
    match state {
        JobState::Waiting => pb::JobState::Waiting,
        JobState::Running => pb::JobState::Running,
        JobState::Success => pb::JobState::Success,
        JobState::Failed => pb::JobState::Failed,
        JobState::Stopped => pb::JobState::Stopped,
    }
}

fn severity_to_proto(severity: Severity) -> pb::Severity {
    match severity {
        Severity::Neutral => pb::Severity::Neutral,
        Severity::Primary => pb::Severity::Primary,
        Severity::Success => pb::Severity::Success,
        Severity::Danger => pb::Severity::Danger,
        Severity::Warning => pb::Severity::Warning,
        Severity::Info => pb::Severity::Info,
    }
}

fn unix_millis(at: Timestamp) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn job_response(record: &JobRecord) -> pb::JobResponse {
    pb::JobResponse {
        job_id: record.id().to_string(),
        state: state_to_proto(record.state()) as i32,
        created_at: unix_millis(record.created_at()),
        updated_at: unix_millis(record.updated_at()),
        history: record
            .history()
            .iter()
            .map(|entry| pb::HistoryEntry {
                state: state_to_proto(entry.state) as i32,
                at: unix_millis(entry.at),
            })
            .collect(),
    }
}

pub fn transition_event(event: &TransitionEvent, dropped: u64) -> pb::TransitionEvent {
    pb::TransitionEvent {
        job_id: event.job_id.to_string(),
        from_state: state_to_proto(event.from) as i32,
        to_state: state_to_proto(event.to) as i32,
        at: unix_millis(event.at),
        dropped,
    }
}

pub fn describe_response(descriptor: StatusDescriptor) -> pb::DescribeResponse {
    pb::DescribeResponse {
        state: state_to_proto(descriptor.state) as i32,
        label: descriptor.label.to_string(),
        severity: severity_to_proto(descriptor.severity) as i32,
    }
}

pub fn status(err: Error) -> Status {
    match &err {
        Error::UnknownJob(_) | Error::NotFound(_) => Status::not_found(err.to_string()),
        Error::DuplicateJob(_) => Status::already_exists(err.to_string()),
        Error::IllegalTransition { .. } | Error::RemovalDenied { .. } => {
            Status::failed_precondition(err.to_string())
        }
    }
}
