mod convert;

use futures::{Stream, StreamExt};
use jobmon::{JobId, JobMonitor, ListFilter, Locale, StatusCatalog};
use protobuf::monitor_server::Monitor;
use protobuf::{
    CreateRequest, DescribeRequest, DescribeResponse, GetRequest, JobResponse, ListRequest,
    RemoveRequest, RemoveResponse, TransitionEvent, TransitionRequest, WatchRequest,
};
use std::pin::Pin;
use tonic::{Request, Response, Status};
use tracing::debug;

/// Adapts a [`JobMonitor`] to the `jobmonitor.Monitor` gRPC service.
pub struct MonitorService {
    monitor: JobMonitor,
}

impl MonitorService {
    pub fn new(monitor: JobMonitor) -> Self {
        Self { monitor }
    }
}

#[tonic::async_trait]
impl Monitor for MonitorService {
    type ListJobsStream = Pin<Box<dyn Stream<Item = Result<JobResponse, Status>> + Send>>;
    type WatchStream = Pin<Box<dyn Stream<Item = Result<TransitionEvent, Status>> + Send>>;

    async fn create_job(
        &self,
        req: Request<CreateRequest>,
    ) -> Result<Response<JobResponse>, Status> {
        let CreateRequest { job_id } = req.into_inner();
        let job_id = if job_id.is_empty() {
            JobId::generate()
        } else {
            JobId::from(job_id)
        };
        let record = self
            .monitor
            .create(job_id)
            .await
            .map_err(convert::status)?;
        Ok(Response::new(convert::job_response(&record)))
    }

    async fn transition(
        &self,
        req: Request<TransitionRequest>,
    ) -> Result<Response<JobResponse>, Status> {
        let TransitionRequest { job_id, target } = req.into_inner();
        let job_id = convert::job_id(job_id)?;
        let target = convert::state_from_proto(target)?;
        let record = self
            .monitor
            .transition(&job_id, target)
            .await
            .map_err(convert::status)?;
        Ok(Response::new(convert::job_response(&record)))
    }

    async fn get_job(&self, req: Request<GetRequest>) -> Result<Response<JobResponse>, Status> {
        let job_id = convert::job_id(req.into_inner().job_id)?;
        let record = self.monitor.get(&job_id).await.map_err(convert::status)?;
        Ok(Response::new(convert::job_response(&record)))
    }

    async fn list_jobs(
        &self,
        req: Request<ListRequest>,
    ) -> Result<Response<Self::ListJobsStream>, Status> {
        let state = req
            .into_inner()
            .filter
            .map(|filter| convert::state_from_proto(filter.state))
            .transpose()?;
        let records = self.monitor.list(ListFilter { state }).await;
        let response_stream = records.map(|record| Ok(convert::job_response(&record)));
        Ok(Response::new(
            Box::pin(response_stream) as Self::ListJobsStream
        ))
    }

    async fn remove_job(
        &self,
        req: Request<RemoveRequest>,
    ) -> Result<Response<RemoveResponse>, Status> {
        let job_id = convert::job_id(req.into_inner().job_id)?;
        self.monitor
            .remove(&job_id)
            .await
            .map_err(convert::status)?;
        Ok(Response::new(RemoveResponse {})) // empty response on success
    }

    async fn describe(
        &self,
        req: Request<DescribeRequest>,
    ) -> Result<Response<DescribeResponse>, Status> {
        let DescribeRequest { state, locale } = req.into_inner();
        let state = convert::state_from_proto(state)?;
        let locale: Locale = locale
            .parse()
            .map_err(|err: jobmon::catalog::ParseLocaleError| {
                Status::invalid_argument(err.to_string())
            })?;
        let descriptor = StatusCatalog::describe_in(state, locale);
        Ok(Response::new(convert::describe_response(descriptor)))
    }

    async fn watch(
        &self,
        req: Request<WatchRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let subscription = self.monitor.subscribe();
        debug!(
            subscription = subscription.id(),
            peer = ?req.remote_addr(),
            "watcher subscribed"
        );

        // the subscription is dropped, and so cancelled, when the client goes away
        let event_stream = futures::stream::unfold(subscription, |mut subscription| async move {
            let event = subscription.recv().await?;
            let dropped = subscription.dropped();
            Some((Ok(convert::transition_event(&event, dropped)), subscription))
        });
        Ok(Response::new(Box::pin(event_stream) as Self::WatchStream))
    }
}
