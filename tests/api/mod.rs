mod conn_tests;
mod grpc_tests;
mod user_tests;
