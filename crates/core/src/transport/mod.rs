pub mod grpc_channel;
