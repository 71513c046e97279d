pub mod monitorservice;
