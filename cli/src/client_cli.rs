use protobuf::{
    monitor_client::MonitorClient, CreateRequest, DescribeRequest, GetRequest, JobResponse,
    JobState, ListRequest, RemoveRequest, StateFilter, TransitionRequest, WatchRequest,
};
use tonic::{transport::Channel, Status};

pub struct ClientCli {
    inner: MonitorClient<Channel>,
}

impl ClientCli {
    pub async fn connect(server_addr: &str) -> Result<Self, tonic::transport::Error> {
        let inner = MonitorClient::connect(server_addr.to_string()).await?;
        Ok(Self { inner })
    }

    pub async fn create_job(&mut self, job_id: Option<String>) -> Result<(), Status> {
        let request = CreateRequest {
            job_id: job_id.unwrap_or_default(),
        };
        let job = self.inner.create_job(request).await?.into_inner();
        println!("Created job id: {}", job.job_id);
        Ok(())
    }

    pub async fn transition(&mut self, job_id: String, target: JobState) -> Result<(), Status> {
        let request = TransitionRequest {
            job_id,
            target: target as i32,
        };
        let job = self.inner.transition(request).await?.into_inner();
        println!("{} is now {}", job.job_id, state_name(job.state()));
        Ok(())
    }

    pub async fn get_job(&mut self, job_id: String) -> Result<(), Status> {
        let job = self.inner.get_job(GetRequest { job_id }).await?.into_inner();
        print_job(&job);
        for entry in &job.history {
            println!("  {:>13}  {}", entry.at, state_name(entry.state()));
        }
        Ok(())
    }

    pub async fn list_jobs(&mut self, state: Option<JobState>) -> Result<(), Status> {
        let request = ListRequest {
            filter: state.map(|state| StateFilter {
                state: state as i32,
            }),
        };
        let mut stream = self.inner.list_jobs(request).await?.into_inner();
        while let Some(job) = stream.message().await? {
            print_job(&job);
        }
        Ok(())
    }

    pub async fn remove_job(&mut self, job_id: String) -> Result<(), Status> {
        self.inner
            .remove_job(RemoveRequest {
                job_id: job_id.clone(),
            })
            .await?;
        println!("Removed job id: {}", job_id);
        Ok(())
    }

    pub async fn describe(&mut self, state: JobState, locale: String) -> Result<(), Status> {
        let request = DescribeRequest {
            state: state as i32,
            locale,
        };
        let descriptor = self.inner.describe(request).await?.into_inner();
        println!(
            "{}: {} ({})",
            state_name(descriptor.state()),
            descriptor.label,
            format!("{:?}", descriptor.severity()).to_lowercase()
        );
        Ok(())
    }

    /// Print transitions until the server closes the stream
    pub async fn watch(&mut self) -> Result<(), Status> {
        let mut stream = self.inner.watch(WatchRequest {}).await?.into_inner();
        let mut dropped = 0;
        while let Some(event) = stream.message().await? {
            if event.dropped > dropped {
                eprintln!("warning: missed {} events", event.dropped - dropped);
                dropped = event.dropped;
            }
            println!(
                "{:>13}  {}  {} -> {}",
                event.at,
                event.job_id,
                state_name(event.from_state()),
                state_name(event.to_state())
            );
        }
        Ok(())
    }
}

fn print_job(job: &JobResponse) {
    println!(
        "{}\t{}\tcreated {}\tupdated {}",
        job.job_id,
        state_name(job.state()),
        job.created_at,
        job.updated_at
    );
}

fn state_name(state: JobState) -> &'static str {
    match state {
        JobState::Waiting => "waiting",
        JobState::Running => "running",
        JobState::Success => "success",
        JobState::Failed => "failed",
        JobState::Stopped => "stopped",
    }
}
