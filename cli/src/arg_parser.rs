use clap::{ArgEnum, Parser, Subcommand};

/// Talk to a job monitoring server
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// The address of the server
    #[clap(
        short = 's',
        long = "server",
        env = "JOBMON_SERVER",
        default_value = "http://[::1]:50051"
    )]
    pub server: String,
    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Subcommand)]
pub enum SubCommand {
    /// register a new job in the waiting state
    Create {
        /// job id, generated by the server when omitted
        job_id: Option<String>,
    },
    /// move a job to a new state
    Transition {
        job_id: String,

        #[clap(arg_enum)]
        /// state to move to
        target: State,
    },
    /// show a job and its history
    Get { job_id: String },
    /// list jobs
    List {
        #[clap(long, arg_enum)]
        /// only list jobs in this state
        state: Option<State>,
    },
    /// stop tracking a finished job
    Remove { job_id: String },
    /// show the label and color for a state
    Describe {
        #[clap(arg_enum)]
        state: State,

        #[clap(long, default_value = "en")]
        /// label language, en or zh-CN
        locale: String,
    },
    /// follow transitions as they happen
    Watch,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub enum State {
    Waiting,
    Running,
    Success,
    Failed,
    Stopped,
}

impl From<State> for protobuf::JobState {
    fn from(state: State) -> Self {
        match state {
            State::Waiting => protobuf::JobState::Waiting,
            State::Running => protobuf::JobState::Running,
            State::Success => protobuf::JobState::Success,
            State::Failed => protobuf::JobState::Failed,
            State::Stopped => protobuf::JobState::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transition() {
        let args = ArgParser::parse_from(["cli", "-s", "http://localhost:1", "transition", "J1", "running"]);
        assert_eq!(args.server, "http://localhost:1");
        assert_eq!(
            args.sub_command,
            SubCommand::Transition {
                job_id: "J1".into(),
                target: State::Running
            }
        );
    }

    #[test]
    fn list_filter_is_optional() {
        let args = ArgParser::parse_from(["cli", "list"]);
        assert_eq!(args.sub_command, SubCommand::List { state: None });
        let args = ArgParser::parse_from(["cli", "list", "--state", "failed"]);
        assert_eq!(
            args.sub_command,
            SubCommand::List {
                state: Some(State::Failed)
            }
        );
    }
}
