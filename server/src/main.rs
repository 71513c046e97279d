mod args;
mod config;
mod services;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use config::{Configuration, LoggingConfiguration};
use jobmon::config::RetentionConfiguration;
use jobmon::JobMonitor;
use protobuf::monitor_server::MonitorServer;
use services::monitorservice::MonitorService;
use std::future::Future;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Configuration::load(path).await?,
        None => Configuration::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    init_logging(args.debug, &config.logging)?;

    let monitor = JobMonitor::spawn(&config.monitor);
    if let Some(retention) = config.monitor.retention {
        spawn_retention_sweep(monitor.clone(), retention);
    }

    let listener = TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("binding {}", config.server.listen))?;
    serve(listener, monitor, shutdown_signal()).await
}

fn init_logging(debug: bool, logging: &LoggingConfiguration) -> Result<()> {
    let result = if debug {
        tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_max_level(logging.level()?)
            .json()
            .try_init()
    };
    result.map_err(|err| anyhow::anyhow!(err))
}

async fn serve<F>(listener: TcpListener, monitor: JobMonitor, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    let monitor_server = MonitorServer::new(MonitorService::new(monitor));
    info!(%addr, "listening");

    Server::builder()
        .add_service(monitor_server)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
        .context("gRPC server error")?;

    info!("server stopped");
    Ok(())
}

fn spawn_retention_sweep(monitor: JobMonitor, retention: RetentionConfiguration) {
    info!(
        ttl_secs = retention.terminal_ttl_secs,
        interval_secs = retention.sweep_interval_secs,
        "terminal job retention enabled"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(retention.sweep_interval());
        loop {
            ticker.tick().await;
            let evicted = monitor
                .registry()
                .evict_terminal(retention.terminal_ttl())
                .await;
            if evicted > 0 {
                info!(evicted, "retention sweep removed terminal jobs");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "unable to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::monitor_client::MonitorClient;
    use protobuf::{
        CreateRequest, DescribeRequest, GetRequest, JobState, ListRequest, RemoveRequest,
        Severity, StateFilter, TransitionRequest, WatchRequest,
    };
    use tonic::transport::Channel;
    use tonic::Code;

    // start a server on an ephemeral port and connect a client to it
    async fn start_server() -> MonitorClient<Channel> {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let monitor = JobMonitor::spawn(&jobmon::Configuration::default());
        tokio::spawn(async move {
            let _ = serve(listener, monitor, std::future::pending()).await;
        });
        MonitorClient::connect(format!("http://{}", addr))
            .await
            .expect("channel connect")
    }

    fn transition_request(job_id: &str, target: JobState) -> TransitionRequest {
        TransitionRequest {
            job_id: job_id.into(),
            target: target as i32,
        }
    }

    #[tokio::test]
    async fn job_lifecycle() {
        let mut client = start_server().await;

        let created = client
            .create_job(CreateRequest {
                job_id: "J1".into(),
            })
            .await
            .expect("create")
            .into_inner();
        assert_eq!(created.job_id, "J1");
        assert_eq!(created.state(), JobState::Waiting);

        client
            .transition(transition_request("J1", JobState::Running))
            .await
            .expect("start");
        let finished = client
            .transition(transition_request("J1", JobState::Success))
            .await
            .expect("finish")
            .into_inner();
        let states: Vec<_> = finished.history.iter().map(|e| e.state()).collect();
        assert_eq!(
            states,
            vec![JobState::Waiting, JobState::Running, JobState::Success]
        );

        let illegal = client
            .transition(transition_request("J1", JobState::Running))
            .await
            .expect_err("success is terminal");
        assert_eq!(illegal.code(), Code::FailedPrecondition);

        client
            .remove_job(RemoveRequest {
                job_id: "J1".into(),
            })
            .await
            .expect("remove");
        let missing = client
            .get_job(GetRequest {
                job_id: "J1".into(),
            })
            .await
            .expect_err("removed");
        assert_eq!(missing.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn bad_requests() {
        let mut client = start_server().await;

        let ghost = client
            .transition(transition_request("ghost", JobState::Running))
            .await
            .expect_err("unknown job");
        assert_eq!(ghost.code(), Code::NotFound);

        client
            .create_job(CreateRequest {
                job_id: "J1".into(),
            })
            .await
            .expect("create");
        let duplicate = client
            .create_job(CreateRequest {
                job_id: "J1".into(),
            })
            .await
            .expect_err("duplicate");
        assert_eq!(duplicate.code(), Code::AlreadyExists);

        let denied = client
            .remove_job(RemoveRequest {
                job_id: "J1".into(),
            })
            .await
            .expect_err("still waiting");
        assert_eq!(denied.code(), Code::FailedPrecondition);

        let bogus_state = client
            .transition(TransitionRequest {
                job_id: "J1".into(),
                target: 42,
            })
            .await
            .expect_err("not a state");
        assert_eq!(bogus_state.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn generated_job_id() {
        let mut client = start_server().await;
        let created = client
            .create_job(CreateRequest::default())
            .await
            .expect("create")
            .into_inner();
        assert!(!created.job_id.is_empty());
    }

    #[tokio::test]
    async fn list_with_filter() {
        let mut client = start_server().await;
        for job_id in ["a", "b", "c"] {
            client
                .create_job(CreateRequest {
                    job_id: job_id.into(),
                })
                .await
                .expect("create");
        }
        client
            .transition(transition_request("b", JobState::Stopped))
            .await
            .expect("stop");

        let mut stream = client
            .list_jobs(ListRequest {
                filter: Some(StateFilter {
                    state: JobState::Waiting as i32,
                }),
            })
            .await
            .expect("list")
            .into_inner();
        let mut ids = vec![];
        while let Some(job) = stream.message().await.expect("stream error") {
            ids.push(job.job_id);
        }
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn describe_states() {
        let mut client = start_server().await;
        let running = client
            .describe(DescribeRequest {
                state: JobState::Running as i32,
                locale: "zh-CN".into(),
            })
            .await
            .expect("describe")
            .into_inner();
        assert_eq!(running.label, "运行中");
        assert_eq!(running.severity(), Severity::Primary);

        let unsupported = client
            .describe(DescribeRequest {
                state: JobState::Running as i32,
                locale: "tlh".into(),
            })
            .await
            .expect_err("unsupported locale");
        assert_eq!(unsupported.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn watch_transitions() {
        let mut client = start_server().await;
        let mut watcher = client.clone();
        let mut events = watcher
            .watch(WatchRequest {})
            .await
            .expect("watch")
            .into_inner();

        client
            .create_job(CreateRequest {
                job_id: "J1".into(),
            })
            .await
            .expect("create");
        client
            .transition(transition_request("J1", JobState::Running))
            .await
            .expect("start");

        let event = events
            .message()
            .await
            .expect("stream error")
            .expect("stream ended");
        assert_eq!(event.job_id, "J1");
        assert_eq!(event.from_state(), JobState::Waiting);
        assert_eq!(event.to_state(), JobState::Running);
        assert_eq!(event.dropped, 0);
    }
}
