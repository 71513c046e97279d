tonic::include_proto!("jobmonitor");
